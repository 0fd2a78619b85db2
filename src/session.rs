//! The conversion session: one file, one pipeline, one canonical state
//! machine.
//!
//! A session walks Upload → Loading → (PasswordPrompt loop) → Preview, or
//! lands in Error with a user-facing message. Password problems never reach
//! Error: the session keeps the original buffer and re-prompts until the
//! caller supplies the right password or cancels. A generation counter
//! supersedes in-flight work when a new file arrives or the session resets;
//! stale results are discarded, never queued.

use std::fmt;

use crate::export;
use crate::extract::ExtractionClient;
use crate::payload::{self, PayloadStrategy};
use crate::pdf::{self, PdfLoadResult};
use crate::table::ExtractedTable;

/// A file handed to the session. Bytes are owned: the caller's handle may
/// be gone by the time a password retry needs them.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }
}

/// Where the session currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversionStep {
    /// Waiting for a file.
    Upload,
    /// Pipeline running: load, normalize, extract.
    Loading,
    /// The document is encrypted; waiting for a password or a cancel.
    PasswordPrompt,
    /// Extraction finished; the table is available for editing and export.
    Preview,
    /// Terminal failure with a user-facing message. Only `reset` leaves it.
    Error,
}

impl fmt::Display for ConversionStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConversionStep::Upload => "upload",
            ConversionStep::Loading => "loading",
            ConversionStep::PasswordPrompt => "password_prompt",
            ConversionStep::Preview => "preview",
            ConversionStep::Error => "error",
        };
        write!(f, "{name}")
    }
}

/// Terminal failure surfaced to the user. `rate_limited` drives the
/// upgrade prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionError {
    pub message: String,
    pub rate_limited: bool,
}

pub struct ConversionSession {
    client: ExtractionClient,
    strategy: PayloadStrategy,
    is_logged_in: bool,
    forwarded_for: Option<String>,

    step: ConversionStep,
    file: Option<UploadedFile>,
    source_name: Option<String>,
    invalid_password: bool,
    table: Option<ExtractedTable>,
    error: Option<SessionError>,
    generation: u64,
}

impl ConversionSession {
    pub fn new(
        client: ExtractionClient,
        strategy: PayloadStrategy,
        is_logged_in: bool,
        forwarded_for: Option<String>,
    ) -> Self {
        Self {
            client,
            strategy,
            is_logged_in,
            forwarded_for,
            step: ConversionStep::Upload,
            file: None,
            source_name: None,
            invalid_password: false,
            table: None,
            error: None,
            generation: 0,
        }
    }

    pub fn step(&self) -> ConversionStep {
        self.step
    }

    pub fn table(&self) -> Option<&ExtractedTable> {
        self.table.as_ref()
    }

    /// Mutable access for preview edits.
    pub fn table_mut(&mut self) -> Option<&mut ExtractedTable> {
        self.table.as_mut()
    }

    pub fn error(&self) -> Option<&SessionError> {
        self.error.as_ref()
    }

    /// True when the last submitted password was wrong; drives the inline
    /// notice next to the prompt.
    pub fn invalid_password(&self) -> bool {
        self.invalid_password
    }

    /// Download name for the previewed table, derived from the uploaded
    /// file's name.
    pub fn export_name(&self) -> Option<String> {
        self.source_name
            .as_deref()
            .map(export::output_filename)
    }

    /// Start converting a new file, superseding any previous attempt.
    pub async fn convert(&mut self, file: UploadedFile) {
        self.generation = self.generation.wrapping_add(1);
        self.table = None;
        self.error = None;
        self.invalid_password = false;
        self.source_name = Some(file.name.clone());
        tracing::info!(file = %file.name, size = file.bytes.len(), "starting conversion");
        self.file = Some(file);
        self.attempt(None).await;
    }

    /// Retry the pending encrypted document with a password. The password
    /// lives only for the duration of the attempt.
    pub async fn submit_password(&mut self, password: impl Into<String>) {
        if self.step != ConversionStep::PasswordPrompt {
            tracing::warn!(step = %self.step, "submit_password outside password prompt ignored");
            return;
        }
        self.attempt(Some(password.into())).await;
    }

    /// Abandon the pending encrypted document and return to Upload.
    pub fn cancel_password(&mut self) {
        if self.step != ConversionStep::PasswordPrompt {
            return;
        }
        self.file = None;
        self.source_name = None;
        self.invalid_password = false;
        self.step = ConversionStep::Upload;
    }

    /// Return to the initial state, discarding everything. Idempotent.
    pub fn reset(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        self.file = None;
        self.source_name = None;
        self.invalid_password = false;
        self.table = None;
        self.error = None;
        self.step = ConversionStep::Upload;
    }

    async fn attempt(&mut self, password: Option<String>) {
        let token = self.generation;
        let Some(file) = self.file.take() else {
            self.fail("No file selected", false);
            return;
        };
        self.step = ConversionStep::Loading;

        let buffer = match pdf::load(&file.bytes, password.as_deref()) {
            PdfLoadResult::PasswordRequired => {
                self.invalid_password = false;
                self.step = ConversionStep::PasswordPrompt;
                self.file = Some(file);
                return;
            }
            PdfLoadResult::InvalidPassword => {
                tracing::debug!(file = %file.name, "password rejected, re-prompting");
                self.invalid_password = true;
                self.step = ConversionStep::PasswordPrompt;
                self.file = Some(file);
                return;
            }
            PdfLoadResult::Corrupted(reason) => {
                self.fail(
                    format!("The file could not be read as a PDF: {reason}"),
                    false,
                );
                return;
            }
            PdfLoadResult::Loaded(buffer) => buffer,
        };
        self.invalid_password = false;

        let payload = match payload::normalize(&buffer, &file.mime_type, self.strategy) {
            Ok(payload) => payload,
            Err(e) => {
                self.fail(e.to_string(), false);
                return;
            }
        };
        // The original upload is no longer needed; only its name survives
        // for the download filename.
        drop(file);

        let result = self
            .client
            .extract(&payload, self.is_logged_in, self.forwarded_for.as_deref())
            .await;

        // With exclusive access the generation cannot move during the await;
        // this check only becomes live when the session is driven through
        // shared interior mutability (e.g. behind a lock that is released
        // while the extraction runs).
        if self.generation != token {
            tracing::debug!("discarding result of superseded attempt");
            return;
        }

        match result {
            Ok(table) => {
                tracing::info!(step = %ConversionStep::Preview, rows = table.row_count(), "conversion finished");
                self.table = Some(table);
                self.step = ConversionStep::Preview;
            }
            Err(e) => {
                let rate_limited = e.is_rate_limited();
                self.fail(e.to_string(), rate_limited);
            }
        }
    }

    fn fail(&mut self, message: impl Into<String>, rate_limited: bool) {
        let message = message.into();
        tracing::warn!(%message, rate_limited, "conversion failed");
        self.error = Some(SessionError {
            message,
            rate_limited,
        });
        self.step = ConversionStep::Error;
    }
}
