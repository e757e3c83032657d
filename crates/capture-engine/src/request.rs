//! Capture requests and their results.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use primeshot_common::config::CaptureDefaults;
use primeshot_common::error::{CaptureError, CaptureResult};

/// Where the encoded PNG goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    /// Write to this file, creating parent directories and replacing any
    /// existing file.
    File(PathBuf),
    /// Return the bytes to the caller.
    Memory,
}

/// Session toggles applied before capture starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureOptions {
    /// Ask the compositor to drop the capture border (best-effort).
    pub hide_border: bool,
    /// Leave the mouse cursor out of the frame.
    pub hide_cursor: bool,
}

impl Default for CaptureOptions {
    fn default() -> Self {
        Self {
            hide_border: true,
            hide_cursor: true,
        }
    }
}

impl From<&CaptureDefaults> for CaptureOptions {
    fn from(defaults: &CaptureDefaults) -> Self {
        Self {
            hide_border: defaults.hide_border,
            hide_cursor: defaults.hide_cursor,
        }
    }
}

/// One capture invocation. Immutable for the request's lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureRequest {
    output: OutputTarget,
    options: CaptureOptions,
}

impl CaptureRequest {
    pub fn to_file(path: impl Into<PathBuf>, options: CaptureOptions) -> Self {
        Self {
            output: OutputTarget::File(path.into()),
            options,
        }
    }

    pub fn to_memory(options: CaptureOptions) -> Self {
        Self {
            output: OutputTarget::Memory,
            options,
        }
    }

    pub fn output(&self) -> &OutputTarget {
        &self.output
    }

    pub fn options(&self) -> CaptureOptions {
        self.options
    }

    /// Reject requests that can never succeed before touching the GPU.
    pub fn validate(&self) -> CaptureResult<()> {
        if let OutputTarget::File(path) = &self.output {
            if path.as_os_str().is_empty() {
                return Err(CaptureError::invalid_parameter("output path is empty"));
            }
            if path.file_name().is_none() {
                return Err(CaptureError::invalid_parameter(format!(
                    "output path {} does not name a file",
                    path.display()
                )));
            }
        }
        Ok(())
    }
}

/// Where a successful capture ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CapturedOutput {
    File(PathBuf),
    Memory(Vec<u8>),
}

/// Summary of a successful capture.
#[derive(Debug, Clone)]
pub struct CaptureReport {
    /// Pixel width of the encoded image.
    pub width: u32,
    /// Pixel height of the encoded image.
    pub height: u32,
    /// Length of the PNG stream in bytes.
    pub encoded_len: usize,
    /// When the frame was delivered.
    pub captured_at: DateTime<Utc>,
    pub output: CapturedOutput,
}

impl CaptureReport {
    pub fn path(&self) -> Option<&Path> {
        match &self.output {
            CapturedOutput::File(path) => Some(path),
            CapturedOutput::Memory(_) => None,
        }
    }

    /// Take the PNG bytes of a memory capture.
    pub fn into_png(self) -> Option<Vec<u8>> {
        match self.output {
            CapturedOutput::Memory(bytes) => Some(bytes),
            CapturedOutput::File(_) => None,
        }
    }
}
