use primeshot_common::error::{CaptureError, CaptureResult};
use primeshot_platform_core::{FrameReceiver, ItemSize};
use primeshot_platform_windows::{self as platform_windows, CaptureDevice, FrameSession, PrimaryItem};

use crate::backend::CaptureBackend;

/// Windows.Graphics.Capture backend.
#[derive(Default)]
pub struct WindowsBackend {
    device: Option<CaptureDevice>,
    item: Option<PrimaryItem>,
    session: Option<FrameSession>,
}

impl WindowsBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn session(&self) -> CaptureResult<&FrameSession> {
        self.session
            .as_ref()
            .ok_or_else(|| CaptureError::session("capture session not opened"))
    }
}

impl CaptureBackend for WindowsBackend {
    fn name(&self) -> &'static str {
        "windows-graphics-capture"
    }

    fn create_device(&mut self) -> CaptureResult<()> {
        if !platform_windows::probe_graphics_capture_support().available {
            return Err(CaptureError::initialization(
                "Windows.Graphics.Capture is not supported on this system",
            ));
        }
        self.device = Some(CaptureDevice::create()?);
        Ok(())
    }

    fn resolve_primary_item(&mut self) -> CaptureResult<ItemSize> {
        let item = PrimaryItem::resolve()?;
        let size = item.size();
        self.item = Some(item);
        Ok(size)
    }

    fn open_session(&mut self) -> CaptureResult<FrameReceiver> {
        let (device, item) = match (&self.device, &self.item) {
            (Some(device), Some(item)) => (device, item),
            _ => {
                return Err(CaptureError::session(
                    "device and capture item must exist before the session",
                ))
            }
        };
        let (session, rx) = FrameSession::open(device, item)?;
        self.session = Some(session);
        Ok(rx)
    }

    fn set_cursor_capture_enabled(&mut self, enabled: bool) -> CaptureResult<()> {
        self.session()?.set_cursor_capture_enabled(enabled)
    }

    fn set_border_required(&mut self, required: bool) -> CaptureResult<()> {
        self.session()?.set_border_required(required)
    }

    fn start(&mut self) -> CaptureResult<()> {
        self.session()?.start()
    }

    fn pump_messages(&mut self) {
        let dispatched = platform_windows::drain_message_queue();
        if dispatched > 0 {
            tracing::trace!(dispatched, "pumped window messages");
        }
    }

    fn close(&mut self) {
        if let Some(mut session) = self.session.take() {
            session.close();
        }
        self.item = None;
        self.device = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn close_without_session_is_repeatable() {
        let mut backend = WindowsBackend::new();
        assert!(backend.start().is_err());
        backend.close();
        backend.close();
        assert!(backend.session.is_none());
    }
}
