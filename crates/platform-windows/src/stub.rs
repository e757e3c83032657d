//! Non-Windows stand-ins so the workspace builds and tests on any host.

use primeshot_common::error::{CaptureError, CaptureResult};
use primeshot_platform_core::MonitorInfo;

/// Monitor enumeration is only available on Windows.
pub fn detect_monitors() -> CaptureResult<Vec<MonitorInfo>> {
    Err(CaptureError::initialization(
        "monitor enumeration requires Windows",
    ))
}

/// There is no message queue to drain.
pub fn drain_message_queue() -> usize {
    0
}
