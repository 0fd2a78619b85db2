//! PDF handling: loading, password decryption, and per-page text extraction.

#[cfg(test)]
pub(crate) mod fixtures;
mod loader;
mod text;

pub use loader::{PdfLoadResult, load};
pub use text::{PdfPage, extract_pages};
