//! Depth-1 frame pool, capture session, and the FrameArrived handler.

use std::sync::Arc;

use primeshot_common::error::{CaptureError, CaptureResult};
use primeshot_platform_core::{
    frame_channel, handle_frame_arrival, FrameReceiver, FrameSlot,
};
use windows::core::IInspectable;
use windows::Foundation::TypedEventHandler;
use windows::Graphics::Capture::{
    Direct3D11CaptureFrame, Direct3D11CaptureFramePool, GraphicsCaptureSession,
};
use windows::Graphics::DirectX::DirectXPixelFormat;
use windows::Graphics::SizeInt32;

use crate::device::CaptureDevice;
use crate::item::PrimaryItem;
use crate::readback::read_frame;
use crate::WinResultExt;

/// Buffers in the frame pool. One request captures one frame.
const FRAME_POOL_DEPTH: i32 = 1;

/// A capture session over the primary monitor that delivers one frame.
pub struct FrameSession {
    pool: Option<Direct3D11CaptureFramePool>,
    session: Option<GraphicsCaptureSession>,
    slot: Arc<FrameSlot>,
}

impl FrameSession {
    /// Create the frame pool and session and register the frame handler.
    ///
    /// The pool is sized from the item once; later resolution changes are
    /// not picked up.
    pub fn open(device: &CaptureDevice, item: &PrimaryItem) -> CaptureResult<(Self, FrameReceiver)> {
        let size = item.size();
        let pool = Direct3D11CaptureFramePool::CreateFreeThreaded(
            device.winrt(),
            DirectXPixelFormat::B8G8R8A8UIntNormalized,
            FRAME_POOL_DEPTH,
            SizeInt32 {
                Width: size.width as i32,
                Height: size.height as i32,
            },
        )
        .stage(CaptureError::session, "Direct3D11CaptureFramePool::CreateFreeThreaded")?;

        let session = pool
            .CreateCaptureSession(item.item())
            .stage(CaptureError::session, "CreateCaptureSession")?;

        let (slot, rx) = frame_channel();
        let slot = Arc::new(slot);

        let handler_slot = Arc::clone(&slot);
        let device = device.clone();
        pool.FrameArrived(&TypedEventHandler::new(
            move |sender: &Option<Direct3D11CaptureFramePool>, _: &Option<IInspectable>| {
                let Some(pool) = sender else {
                    return Ok(());
                };
                let outcome = handle_frame_arrival(
                    &handler_slot,
                    || pool.TryGetNextFrame(),
                    |frame: Direct3D11CaptureFrame| {
                        let delivery = read_frame(device.d3d(), &frame);
                        let _ = frame.Close();
                        delivery
                    },
                );
                tracing::debug!(?outcome, "FrameArrived");
                Ok(())
            },
        ))
        .stage(CaptureError::session, "register FrameArrived handler")?;

        Ok((
            Self {
                pool: Some(pool),
                session: Some(session),
                slot,
            },
            rx,
        ))
    }

    /// Include or exclude the mouse cursor.
    pub fn set_cursor_capture_enabled(&self, enabled: bool) -> CaptureResult<()> {
        self.live_session()?
            .SetIsCursorCaptureEnabled(enabled)
            .stage(CaptureError::session, "SetIsCursorCaptureEnabled")
    }

    /// Ask for the capture border. Older Windows builds reject this.
    pub fn set_border_required(&self, required: bool) -> CaptureResult<()> {
        self.live_session()?
            .SetIsBorderRequired(required)
            .stage(CaptureError::session, "SetIsBorderRequired")
    }

    /// Begin asynchronous frame delivery.
    pub fn start(&self) -> CaptureResult<()> {
        self.live_session()?
            .StartCapture()
            .stage(CaptureError::session, "StartCapture")?;
        tracing::info!("capture session started");
        Ok(())
    }

    /// Release the session and pool. Safe to call more than once and after
    /// a failed start.
    pub fn close(&mut self) {
        self.slot.close();
        if let Some(session) = self.session.take() {
            if let Err(e) = session.Close() {
                tracing::warn!("closing capture session: {e}");
            }
        }
        if let Some(pool) = self.pool.take() {
            if let Err(e) = pool.Close() {
                tracing::warn!("closing frame pool: {e}");
            }
        }
    }

    fn live_session(&self) -> CaptureResult<&GraphicsCaptureSession> {
        self.session
            .as_ref()
            .ok_or_else(|| CaptureError::session("capture session already closed"))
    }
}

impl Drop for FrameSession {
    fn drop(&mut self) {
        self.close();
    }
}
