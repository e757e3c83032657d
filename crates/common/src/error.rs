//! Error types and result codes shared across primeshot crates.
//!
//! Every fallible step returns [`CaptureResult`]. At the edge of a request
//! (CLI exit code, C ABI return value) the error collapses into exactly one
//! [`ErrorCode`].

use std::ffi::CStr;
use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Top-level error type for capture operations.
#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("Initialization error: {message}")]
    Initialization { message: String },

    #[error("Capture item error: {message}")]
    CaptureItem { message: String },

    #[error("Capture session error: {message}")]
    Session { message: String },

    #[error("Texture processing error: {message}")]
    TextureProcessing { message: String },

    #[error("Encoding error: {message}")]
    Encode { message: String },

    #[error("File save error: {message}")]
    FileSave { message: String },

    #[error("Timed out after {}ms waiting for a frame", .waited.as_millis())]
    Timeout { waited: Duration },

    #[error("Invalid parameter: {message}")]
    InvalidParameter { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using CaptureError.
pub type CaptureResult<T> = Result<T, CaptureError>;

impl CaptureError {
    pub fn initialization(msg: impl Into<String>) -> Self {
        Self::Initialization {
            message: msg.into(),
        }
    }

    pub fn capture_item(msg: impl Into<String>) -> Self {
        Self::CaptureItem {
            message: msg.into(),
        }
    }

    pub fn session(msg: impl Into<String>) -> Self {
        Self::Session {
            message: msg.into(),
        }
    }

    pub fn texture_processing(msg: impl Into<String>) -> Self {
        Self::TextureProcessing {
            message: msg.into(),
        }
    }

    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode {
            message: msg.into(),
        }
    }

    pub fn file_save(msg: impl Into<String>) -> Self {
        Self::FileSave {
            message: msg.into(),
        }
    }

    pub fn timeout(waited: Duration) -> Self {
        Self::Timeout { waited }
    }

    pub fn invalid_parameter(msg: impl Into<String>) -> Self {
        Self::InvalidParameter {
            message: msg.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// The result code this error surfaces as at a request boundary.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Initialization { .. } => ErrorCode::InitializationFailed,
            Self::CaptureItem { .. } => ErrorCode::CaptureItemCreationFailed,
            Self::Session { .. } => ErrorCode::CaptureSessionFailed,
            Self::TextureProcessing { .. } => ErrorCode::TextureProcessingFailed,
            Self::Encode { .. } | Self::FileSave { .. } | Self::Io(_) => {
                ErrorCode::FileSaveFailed
            }
            Self::Timeout { .. } => ErrorCode::TimeoutError,
            Self::InvalidParameter { .. } => ErrorCode::InvalidParameter,
            Self::Config { .. } | Self::Json(_) | Self::Other(_) => ErrorCode::UnknownError,
        }
    }
}

/// Terminal outcome of one capture request.
///
/// The discriminants are part of the C ABI and of the CLI exit codes, so
/// they must never be renumbered.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    Success = 0,
    InitializationFailed = 1,
    CaptureItemCreationFailed = 2,
    CaptureSessionFailed = 3,
    TextureProcessingFailed = 4,
    FileSaveFailed = 5,
    TimeoutError = 6,
    InvalidParameter = 97,
    NotImplemented = 98,
    UnknownError = 99,
}

impl ErrorCode {
    pub const ALL: [ErrorCode; 10] = [
        Self::Success,
        Self::InitializationFailed,
        Self::CaptureItemCreationFailed,
        Self::CaptureSessionFailed,
        Self::TextureProcessingFailed,
        Self::FileSaveFailed,
        Self::TimeoutError,
        Self::InvalidParameter,
        Self::NotImplemented,
        Self::UnknownError,
    ];

    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Look up a code by its numeric value. Unknown values map to `None`.
    pub fn from_i32(value: i32) -> Option<Self> {
        Self::ALL.into_iter().find(|code| code.as_i32() == value)
    }

    pub fn is_success(self) -> bool {
        self == Self::Success
    }

    /// Human-readable description, NUL-terminated for C callers.
    pub fn description_cstr(self) -> &'static CStr {
        match self {
            Self::Success => c"Operation completed successfully",
            Self::InitializationFailed => c"Failed to initialize capture system",
            Self::CaptureItemCreationFailed => c"Failed to create capture item for monitor",
            Self::CaptureSessionFailed => c"Failed to start capture session",
            Self::TextureProcessingFailed => c"Failed to process captured texture",
            Self::FileSaveFailed => c"Failed to save screenshot to file",
            Self::TimeoutError => c"Timeout waiting for frame capture",
            Self::InvalidParameter => c"Invalid parameter provided",
            Self::NotImplemented => c"Feature not yet implemented",
            Self::UnknownError => c"Unknown error occurred",
        }
    }

    /// Human-readable description.
    pub fn description(self) -> &'static str {
        self.description_cstr().to_str().unwrap_or_default()
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.description(), self.as_i32())
    }
}

impl From<&CaptureError> for ErrorCode {
    fn from(err: &CaptureError) -> Self {
        err.code()
    }
}

impl<T> From<&CaptureResult<T>> for ErrorCode {
    fn from(result: &CaptureResult<T>) -> Self {
        match result {
            Ok(_) => ErrorCode::Success,
            Err(err) => err.code(),
        }
    }
}
