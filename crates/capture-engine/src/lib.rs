//! primeshot capture engine
//!
//! Captures a single frame of the primary monitor through
//! Windows.Graphics.Capture and encodes it as PNG, either to a file or to
//! memory.
//!
//! # Flow
//!
//! ```text
//! ScreenCapture::capture(request)
//!   └─ CaptureSession::run
//!        ├─ backend: device → primary item → frame pool + session → toggles → start
//!        ├─ waiter:  one-shot frame channel vs. deadline, pumping messages
//!        ├─ encoder: BGRA (pitched) → RGB PNG → file or bytes
//!        └─ backend.close()  (always, exactly once)
//! ```

pub mod api;
pub mod backend;
pub mod encoder;
pub mod request;
pub mod session;
pub mod waiter;

pub use api::ScreenCapture;
pub use backend::{get_backend, CaptureBackend};
pub use request::*;
pub use session::{CaptureSession, RequestState};
