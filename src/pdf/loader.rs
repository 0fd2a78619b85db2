//! Loading and password decryption of uploaded PDF buffers.

use lopdf::Document;

/// Outcome of a single load attempt. Password problems are ordinary outcomes
/// here, not errors, so the session can re-prompt without unwinding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PdfLoadResult {
    /// Parseable document, decrypted if it was protected. The buffer is ready
    /// for text extraction or data-URI encoding with no password attached.
    Loaded(Vec<u8>),
    /// The document is encrypted and no password was supplied.
    PasswordRequired,
    /// A password was supplied but did not decrypt the document.
    InvalidPassword,
    /// The bytes are not a parseable PDF.
    Corrupted(String),
}

/// Parse `buffer` and, when the document is encrypted, decrypt it with
/// `password`. Successful decryption re-saves the document without its
/// `/Encrypt` entry so every downstream consumer sees a plain PDF. The input
/// buffer is never retained beyond this call.
pub fn load(buffer: &[u8], password: Option<&str>) -> PdfLoadResult {
    let mut doc = match Document::load_mem(buffer) {
        Ok(doc) => doc,
        Err(e) => {
            tracing::debug!(error = %e, "PDF parse failed");
            return PdfLoadResult::Corrupted(e.to_string());
        }
    };

    if !doc.is_encrypted() {
        return PdfLoadResult::Loaded(buffer.to_vec());
    }

    let Some(password) = password else {
        return PdfLoadResult::PasswordRequired;
    };

    if let Err(e) = doc.decrypt(password) {
        return match e {
            lopdf::Error::Decryption(_) => PdfLoadResult::InvalidPassword,
            other => PdfLoadResult::Corrupted(other.to_string()),
        };
    }

    // Strip the encryption dictionary before re-saving; the decrypted
    // object streams must not be advertised as encrypted.
    doc.trailer.remove(b"Encrypt");

    let mut decrypted = Vec::with_capacity(buffer.len());
    match doc.save_to(&mut decrypted) {
        Ok(()) => PdfLoadResult::Loaded(decrypted),
        Err(e) => PdfLoadResult::Corrupted(e.to_string()),
    }
}
