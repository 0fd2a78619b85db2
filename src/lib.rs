//! Convert tabular data locked inside PDFs into editable spreadsheets.
//!
//! The pipeline: load (and, if needed, decrypt) the uploaded PDF, normalize
//! it into an extraction payload, send that to a structured-extraction
//! service, and hand back a canonical headers-plus-rows table ready for
//! editing and xlsx export. Guest callers are rate limited; the
//! [`session::ConversionSession`] state machine drives the whole flow and
//! owns the password retry loop.

pub mod config;
pub mod error;
pub mod export;
pub mod extract;
pub mod limiter;
pub mod payload;
pub mod pdf;
pub mod session;
pub mod table;

pub use error::{Error, Result};
