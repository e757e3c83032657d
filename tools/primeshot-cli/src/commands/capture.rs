//! Capture the primary monitor to a file.

use primeshot_capture_engine::{CaptureRequest, OutputTarget, ScreenCapture};
use primeshot_common::error::ErrorCode;
use primeshot_common::timing::WaitPolicy;

pub async fn run(request: CaptureRequest, policy: WaitPolicy) -> anyhow::Result<ErrorCode> {
    if let OutputTarget::File(output) = request.output() {
        if output.extension().and_then(|e| e.to_str()) != Some("png") {
            tracing::warn!("output file should have a .png extension: {}", output.display());
        }
        tracing::info!("output path: {}", output.display());
    }

    let options = request.options();
    tracing::info!(
        hide_border = options.hide_border,
        hide_cursor = options.hide_cursor,
        timeout_ms = policy.timeout.as_millis() as u64,
        "capture options"
    );

    let capture = ScreenCapture::new().with_policy(policy);

    match capture.capture(&request).await {
        Ok(report) => {
            tracing::info!(
                "screenshot captured: {}x{}, {} bytes",
                report.width,
                report.height,
                report.encoded_len
            );
            Ok(ErrorCode::Success)
        }
        Err(e) => {
            let code = e.code();
            tracing::error!("capture failed with error code {}: {e}", code.as_i32());
            Ok(code)
        }
    }
}
