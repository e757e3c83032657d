//! Windows.Graphics.Capture plumbing for primeshot.
//!
//! Captures the primary monitor through the WGC API (Windows 10 1903+).
//! On non-Windows targets only the platform-neutral entry points compile,
//! and they report that capture is unavailable.
//!
//! # Windows pipeline
//!
//! ```text
//! D3D11CreateDevice (hardware, BGRA) ─► CreateDirect3D11DeviceFromDXGIDevice
//!   │
//! MonitorFromPoint(0,0, PRIMARY) ─► IGraphicsCaptureItemInterop::CreateForMonitor
//!   │
//! Direct3D11CaptureFramePool::CreateFreeThreaded (BGRA8, 1 buffer)
//!   │  GraphicsCaptureSession::StartCapture
//!   ▼
//! FrameArrived ─► staging texture ─► Map ─► FrameBuffer ─► FrameSlot (one-shot)
//! ```

#[cfg(windows)]
mod device;
#[cfg(windows)]
mod item;
#[cfg(windows)]
mod monitors;
#[cfg(windows)]
mod pump;
#[cfg(windows)]
mod readback;
#[cfg(windows)]
mod session;

#[cfg(windows)]
pub use device::CaptureDevice;
#[cfg(windows)]
pub use item::PrimaryItem;
#[cfg(windows)]
pub use monitors::detect_monitors;
#[cfg(windows)]
pub use pump::drain_message_queue;
#[cfg(windows)]
pub use readback::read_frame;
#[cfg(windows)]
pub use session::FrameSession;

#[cfg(not(windows))]
mod stub;
#[cfg(not(windows))]
pub use stub::{detect_monitors, drain_message_queue};

/// What this host supports of Windows.Graphics.Capture.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GraphicsCaptureSupport {
    /// `GraphicsCaptureSession::IsSupported()` returned true.
    pub available: bool,
}

/// Probe whether Windows Graphics Capture is available.
pub fn probe_graphics_capture_support() -> GraphicsCaptureSupport {
    #[cfg(windows)]
    {
        let available = windows::Graphics::Capture::GraphicsCaptureSession::IsSupported()
            .unwrap_or(false);
        GraphicsCaptureSupport { available }
    }
    #[cfg(not(windows))]
    {
        GraphicsCaptureSupport::default()
    }
}

/// Attach a capture stage to a raw Windows error.
#[cfg(windows)]
pub(crate) trait WinResultExt<T> {
    fn stage(
        self,
        make: fn(String) -> primeshot_common::error::CaptureError,
        op: &str,
    ) -> primeshot_common::error::CaptureResult<T>;
}

#[cfg(windows)]
impl<T> WinResultExt<T> for windows::core::Result<T> {
    fn stage(
        self,
        make: fn(String) -> primeshot_common::error::CaptureError,
        op: &str,
    ) -> primeshot_common::error::CaptureResult<T> {
        self.map_err(|e| make(format!("{op}: {e}")))
    }
}
