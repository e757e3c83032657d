//! primeshot common utilities
//!
//! Shared infrastructure for all primeshot crates:
//! - Error types, result aliases, and the stable result codes
//! - Wait timing for frame delivery
//! - Tracing/logging initialization
//! - Configuration loading

pub mod config;
pub mod error;
pub mod logging;
pub mod timing;

pub use config::*;
pub use error::*;
pub use timing::*;
