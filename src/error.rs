//! Error types for the conversion pipeline.
//!
//! Each subsystem owns a focused error enum; the top-level [`Error`] aggregates
//! them for callers that drive a whole conversion. Password handling is not an
//! error: the loader reports it through `PdfLoadResult` so the session can
//! re-prompt without unwinding.

/// Top-level error type aggregating all subsystem errors.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("File error: {0}")]
    File(#[from] FileError),

    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    #[error("Extraction error: {0}")]
    Extract(#[from] ExtractError),

    #[error("Export error: {0}")]
    Export(#[from] ExportError),
}

/// Errors from configuration loading and validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Errors reading the input file at the binary boundary.
#[derive(Debug, thiserror::Error)]
pub enum FileError {
    #[error("Failed to read {path}: {reason}")]
    ReadFailed { path: String, reason: String },

    #[error("Not a PDF file: {name}")]
    NotPdf { name: String },
}

/// Errors from PDF parsing and text extraction.
#[derive(Debug, thiserror::Error)]
pub enum PdfError {
    #[error("Failed to parse PDF: {0}")]
    Parse(String),

    /// The document parsed fine but yielded no extractable text. Terminal:
    /// retrying the same bytes cannot succeed.
    #[error("No extractable text found in the document")]
    EmptyDocument,
}

/// Errors from the structured-extraction service call.
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    /// Guest quota exhausted. The message is shown to the user verbatim.
    #[error("{0}")]
    RateLimited(String),

    /// The service answered but found no table in the document.
    #[error("No tabular data was found in the document")]
    EmptyResult,

    /// The service answered with something that cannot be normalized into a
    /// headers-plus-rows table.
    #[error("Extraction response is not a valid table: {reason}")]
    InvalidShape { reason: String },

    /// Transport failure, non-success status, or timeout. Never retried.
    #[error("Extraction service request failed: {reason}")]
    Upstream { reason: String },
}

impl ExtractError {
    /// Whether this failure should surface the quota/upgrade prompt.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, ExtractError::RateLimited(_))
    }
}

/// Errors writing the spreadsheet.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("Failed to build workbook: {0}")]
    Workbook(#[from] rust_xlsxwriter::XlsxError),
}

pub type Result<T> = std::result::Result<T, Error>;
