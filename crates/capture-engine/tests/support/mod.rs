//! A backend that follows a script instead of talking to the compositor.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use primeshot_capture_engine::CaptureBackend;
use primeshot_common::error::{CaptureError, CaptureResult};
use primeshot_platform_core::{frame_channel, FrameBuffer, FrameReceiver, FrameSlot, ItemSize};

/// What the handler does once the session starts.
#[derive(Debug, Clone)]
pub enum FrameScript {
    /// Deliver this frame from another thread shortly after `start`.
    Deliver(FrameBuffer),
    /// Deliver a readback failure.
    Fail(String),
    /// Never fire. The channel stays open until `close`.
    Never,
    /// Drop the sender without delivering.
    CloseChannel,
}

#[derive(Debug, Clone)]
pub struct Script {
    pub fail_device: bool,
    pub fail_item: bool,
    pub fail_start: bool,
    pub reject_border: bool,
    pub frame: FrameScript,
}

impl Script {
    pub fn delivering(frame: FrameBuffer) -> Self {
        Self {
            fail_device: false,
            fail_item: false,
            fail_start: false,
            reject_border: false,
            frame: FrameScript::Deliver(frame),
        }
    }

    pub fn with_frame(mut self, frame: FrameScript) -> Self {
        self.frame = frame;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    CreateDevice,
    ResolveItem,
    OpenSession,
    CursorCapture(bool),
    BorderRequired(bool),
    Start,
    Pump,
    Close,
}

pub type CallLog = Arc<Mutex<Vec<Call>>>;

pub struct ScriptedBackend {
    script: Script,
    calls: CallLog,
    slot: Option<Arc<FrameSlot>>,
}

impl ScriptedBackend {
    pub fn new(script: Script, calls: CallLog) -> Self {
        Self {
            script,
            calls,
            slot: None,
        }
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

impl CaptureBackend for ScriptedBackend {
    fn name(&self) -> &'static str {
        "scripted"
    }

    fn create_device(&mut self) -> CaptureResult<()> {
        self.record(Call::CreateDevice);
        if self.script.fail_device {
            return Err(CaptureError::initialization("no adapter"));
        }
        Ok(())
    }

    fn resolve_primary_item(&mut self) -> CaptureResult<ItemSize> {
        self.record(Call::ResolveItem);
        if self.script.fail_item {
            return Err(CaptureError::capture_item("no primary monitor"));
        }
        let (width, height) = match &self.script.frame {
            FrameScript::Deliver(frame) => (frame.width, frame.height),
            _ => (1920, 1080),
        };
        Ok(ItemSize { width, height })
    }

    fn open_session(&mut self) -> CaptureResult<FrameReceiver> {
        self.record(Call::OpenSession);
        let (slot, rx) = frame_channel();
        self.slot = Some(Arc::new(slot));
        Ok(rx)
    }

    fn set_cursor_capture_enabled(&mut self, enabled: bool) -> CaptureResult<()> {
        self.record(Call::CursorCapture(enabled));
        Ok(())
    }

    fn set_border_required(&mut self, required: bool) -> CaptureResult<()> {
        self.record(Call::BorderRequired(required));
        if self.script.reject_border {
            return Err(CaptureError::session("border toggle not supported"));
        }
        Ok(())
    }

    fn start(&mut self) -> CaptureResult<()> {
        self.record(Call::Start);
        if self.script.fail_start {
            return Err(CaptureError::session("StartCapture failed"));
        }
        let Some(slot) = self.slot.clone() else {
            return Err(CaptureError::session("session not opened"));
        };
        match self.script.frame.clone() {
            FrameScript::Deliver(frame) => {
                std::thread::spawn(move || {
                    std::thread::sleep(Duration::from_millis(20));
                    slot.deliver(Ok(frame));
                });
            }
            FrameScript::Fail(message) => {
                slot.deliver(Err(CaptureError::texture_processing(message)));
            }
            FrameScript::Never => {}
            FrameScript::CloseChannel => slot.close(),
        }
        Ok(())
    }

    fn pump_messages(&mut self) {
        self.record(Call::Pump);
    }

    fn close(&mut self) {
        self.record(Call::Close);
        if let Some(slot) = self.slot.take() {
            slot.close();
        }
    }
}

/// A solid-colour BGRA frame with four bytes of padding per row.
pub fn solid_frame(width: u32, height: u32, bgra: [u8; 4]) -> FrameBuffer {
    let stride = width as usize * 4 + 4;
    let mut data = Vec::with_capacity(stride * height as usize);
    for _ in 0..height {
        for _ in 0..width {
            data.extend_from_slice(&bgra);
        }
        data.extend_from_slice(&[0xEE; 4]);
    }
    FrameBuffer::bgra8(data, width, height, stride)
}

/// A clean per-test scratch directory under the system temp dir.
pub fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("primeshot_test_{name}"));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}
