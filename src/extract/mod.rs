//! The structured-extraction service client.
//!
//! The service does the actual table recognition; this module owns the wire
//! contract, response normalization, and the guest quota gate around the
//! call.

mod client;
mod wire;

pub use client::{ExtractionClient, ExtractionService, HttpExtractionService};
pub use wire::{ExtractionRequest, ExtractionResponse};
