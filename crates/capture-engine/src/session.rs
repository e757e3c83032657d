//! Single-request capture session.
//!
//! A [`CaptureSession`] owns one backend for one request and drives it
//! through the capture handshake, waits for the frame, encodes it and
//! releases every platform resource, whatever the outcome.

use chrono::Utc;
use primeshot_common::error::{CaptureError, CaptureResult};
use primeshot_common::timing::WaitPolicy;
use primeshot_platform_core::FrameBuffer;

use crate::backend::CaptureBackend;
use crate::encoder::{encode_png, write_png_file};
use crate::request::{CaptureReport, CaptureRequest, CapturedOutput, OutputTarget};
use crate::waiter::wait_for_frame;

/// Progress of a request through the capture handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestState {
    Idle,
    DeviceReady,
    ItemResolved,
    SessionStarted,
    FrameDelivered,
    TimedOut,
    Encoded,
    EncodeFailed,
    /// Resources released. Terminal.
    Closed,
}

/// Drives one backend through one capture.
pub struct CaptureSession {
    backend: Box<dyn CaptureBackend>,
    policy: WaitPolicy,
    state: RequestState,
    history: Vec<RequestState>,
}

impl CaptureSession {
    pub fn new(backend: Box<dyn CaptureBackend>, policy: WaitPolicy) -> Self {
        Self {
            backend,
            policy,
            state: RequestState::Idle,
            history: vec![RequestState::Idle],
        }
    }

    /// Current state.
    pub fn state(&self) -> RequestState {
        self.state
    }

    /// Every state this session has passed through, in order.
    pub fn history(&self) -> &[RequestState] {
        &self.history
    }

    fn transition(&mut self, next: RequestState) {
        tracing::trace!(from = ?self.state, to = ?next, "request state");
        self.state = next;
        self.history.push(next);
    }

    /// Run the request to completion. The backend is closed exactly once
    /// before this returns, on success and on every failure path.
    pub async fn run(&mut self, request: &CaptureRequest) -> CaptureResult<CaptureReport> {
        if self.state != RequestState::Idle {
            return Err(CaptureError::session("capture session already used"));
        }

        tracing::info!(backend = self.backend.name(), "starting capture");
        let result = self.capture(request).await;

        self.backend.close();
        self.transition(RequestState::Closed);

        match &result {
            Ok(report) => tracing::info!(
                width = report.width,
                height = report.height,
                bytes = report.encoded_len,
                "capture complete"
            ),
            Err(e) => tracing::error!(code = %e.code(), "capture failed: {e}"),
        }
        result
    }

    async fn capture(&mut self, request: &CaptureRequest) -> CaptureResult<CaptureReport> {
        let frame = self.acquire_frame(request).await?;
        let captured_at = Utc::now();
        self.transition(RequestState::FrameDelivered);

        let (width, height) = (frame.width, frame.height);
        let written = encode_png(&frame).and_then(|png| match request.output() {
            OutputTarget::File(path) => {
                let len = png.len();
                write_png_file(path, &png).map(|path| (CapturedOutput::File(path), len))
            }
            OutputTarget::Memory => {
                let len = png.len();
                Ok((CapturedOutput::Memory(png), len))
            }
        });

        match written {
            Ok((output, encoded_len)) => {
                self.transition(RequestState::Encoded);
                Ok(CaptureReport {
                    width,
                    height,
                    encoded_len,
                    captured_at,
                    output,
                })
            }
            Err(e) => {
                self.transition(RequestState::EncodeFailed);
                Err(e)
            }
        }
    }

    async fn acquire_frame(&mut self, request: &CaptureRequest) -> CaptureResult<FrameBuffer> {
        let options = request.options();

        self.backend.create_device()?;
        self.transition(RequestState::DeviceReady);

        let size = self.backend.resolve_primary_item()?;
        tracing::info!(width = size.width, height = size.height, "primary monitor");
        self.transition(RequestState::ItemResolved);

        let rx = self.backend.open_session()?;

        if options.hide_cursor {
            self.backend.set_cursor_capture_enabled(false)?;
            tracing::debug!("cursor capture disabled");
        }
        if options.hide_border {
            match self.backend.set_border_required(false) {
                Ok(()) => tracing::debug!("capture border disabled"),
                Err(e) => tracing::warn!("could not disable capture border: {e}"),
            }
        }

        self.backend.start()?;
        self.transition(RequestState::SessionStarted);

        let backend = &mut self.backend;
        let frame = wait_for_frame(rx, &self.policy, || backend.pump_messages()).await;
        if matches!(&frame, Err(CaptureError::Timeout { .. })) {
            self.transition(RequestState::TimedOut);
        }
        frame
    }
}
