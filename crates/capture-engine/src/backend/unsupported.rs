use primeshot_common::error::{CaptureError, CaptureResult};
use primeshot_platform_core::{FrameReceiver, ItemSize};

use crate::backend::CaptureBackend;

/// Backend for hosts without Windows.Graphics.Capture. Every request fails
/// at device creation.
#[derive(Debug, Default)]
pub struct UnsupportedBackend;

impl UnsupportedBackend {
    pub fn new() -> Self {
        Self
    }
}

fn unsupported() -> CaptureError {
    CaptureError::initialization("screen capture requires Windows.Graphics.Capture")
}

impl CaptureBackend for UnsupportedBackend {
    fn name(&self) -> &'static str {
        "unsupported"
    }

    fn create_device(&mut self) -> CaptureResult<()> {
        Err(unsupported())
    }

    fn resolve_primary_item(&mut self) -> CaptureResult<ItemSize> {
        Err(unsupported())
    }

    fn open_session(&mut self) -> CaptureResult<FrameReceiver> {
        Err(unsupported())
    }

    fn set_cursor_capture_enabled(&mut self, _enabled: bool) -> CaptureResult<()> {
        Err(unsupported())
    }

    fn set_border_required(&mut self, _required: bool) -> CaptureResult<()> {
        Err(unsupported())
    }

    fn start(&mut self) -> CaptureResult<()> {
        Err(unsupported())
    }

    fn close(&mut self) {}
}
