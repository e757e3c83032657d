use primeshot_common::error::CaptureResult;
use primeshot_platform_core::{FrameReceiver, ItemSize};

/// Abstract interface for the platform capture handshake.
///
/// One backend instance serves one request. The engine drives the calls in
/// order (`create_device`, `resolve_primary_item`, `open_session`, the
/// toggles, `start`) and always finishes with `close`.
pub trait CaptureBackend: Send {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// Create the GPU device used for capture and readback.
    fn create_device(&mut self) -> CaptureResult<()>;

    /// Resolve the primary monitor into a capture item and report its size.
    fn resolve_primary_item(&mut self) -> CaptureResult<ItemSize>;

    /// Allocate the depth-1 frame pool and session and register the frame
    /// handler. The returned receiver yields the single frame.
    fn open_session(&mut self) -> CaptureResult<FrameReceiver>;

    /// Include or exclude the cursor. Only called before `start`.
    fn set_cursor_capture_enabled(&mut self, enabled: bool) -> CaptureResult<()>;

    /// Request or waive the capture border. Only called before `start`.
    fn set_border_required(&mut self, required: bool) -> CaptureResult<()>;

    /// Begin asynchronous frame delivery.
    fn start(&mut self) -> CaptureResult<()>;

    /// Drain the calling thread's message queue while waiting.
    fn pump_messages(&mut self) {}

    /// Release every resource. Must be idempotent.
    fn close(&mut self);
}

#[cfg(windows)]
pub mod windows;
#[cfg(windows)]
pub use self::windows::WindowsBackend;

#[cfg(not(windows))]
pub mod unsupported;
#[cfg(not(windows))]
pub use self::unsupported::UnsupportedBackend;

/// Get the platform-specific backend.
pub fn get_backend() -> Box<dyn CaptureBackend> {
    #[cfg(windows)]
    {
        Box::new(WindowsBackend::new())
    }
    #[cfg(not(windows))]
    {
        Box::new(UnsupportedBackend::new())
    }
}
