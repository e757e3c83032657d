//! Public capture entry points.

use std::path::Path;

use primeshot_common::error::{CaptureError, CaptureResult, ErrorCode};
use primeshot_common::timing::WaitPolicy;

use crate::backend::{get_backend, CaptureBackend};
use crate::request::{CaptureOptions, CaptureReport, CaptureRequest};
use crate::session::CaptureSession;

type BackendFactory = Box<dyn Fn() -> Box<dyn CaptureBackend> + Send + Sync>;

/// Captures the primary monitor. Each call builds a fresh backend, so
/// requests share no platform state.
pub struct ScreenCapture {
    policy: WaitPolicy,
    factory: BackendFactory,
}

impl Default for ScreenCapture {
    fn default() -> Self {
        Self::new()
    }
}

impl ScreenCapture {
    /// Use the platform backend and the default 10 s wait.
    pub fn new() -> Self {
        Self {
            policy: WaitPolicy::default(),
            factory: Box::new(get_backend),
        }
    }

    pub fn with_policy(mut self, policy: WaitPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Replace the backend constructor.
    pub fn with_backend_factory<F>(mut self, factory: F) -> Self
    where
        F: Fn() -> Box<dyn CaptureBackend> + Send + Sync + 'static,
    {
        self.factory = Box::new(factory);
        self
    }

    pub fn policy(&self) -> &WaitPolicy {
        &self.policy
    }

    /// Run one capture request.
    pub async fn capture(&self, request: &CaptureRequest) -> CaptureResult<CaptureReport> {
        request.validate()?;
        let mut session = CaptureSession::new((self.factory)(), self.policy);
        session.run(request).await
    }

    /// Run one capture request on a private single-threaded runtime.
    ///
    /// Must not be called from inside an async context.
    pub fn capture_blocking(&self, request: &CaptureRequest) -> CaptureResult<CaptureReport> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| CaptureError::initialization(format!("cannot start runtime: {e}")))?;
        runtime.block_on(self.capture(request))
    }

    /// Capture the primary monitor to a PNG file and report the result code.
    pub fn capture_to_file(&self, path: &Path, options: CaptureOptions) -> ErrorCode {
        let request = CaptureRequest::to_file(path, options);
        ErrorCode::from(&self.capture_blocking(&request))
    }

    /// Capture the primary monitor to an in-memory PNG.
    pub fn capture_to_memory(&self, options: CaptureOptions) -> Result<Vec<u8>, ErrorCode> {
        let request = CaptureRequest::to_memory(options);
        match self.capture_blocking(&request) {
            Ok(report) => report.into_png().ok_or(ErrorCode::UnknownError),
            Err(e) => Err(e.code()),
        }
    }
}
