//! Normalization of a decrypted PDF buffer into the extraction payload.
//!
//! Exactly one strategy is active per deployment, selected by configuration:
//! ship the whole document as a base64 data URI, or extract plain text
//! locally and ship only that. Plain text is much smaller on the wire but
//! loses layout; the service compensates.

use std::str::FromStr;

use crate::error::PdfError;
use crate::pdf;

/// Payload strategy selected at deployment time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PayloadStrategy {
    /// Whole document as `data:<mime>;base64,...`.
    DataUri,
    /// Locally extracted text, pages separated by blank lines.
    #[default]
    PlainText,
}

impl FromStr for PayloadStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "data-uri" => Ok(PayloadStrategy::DataUri),
            "plain-text" => Ok(PayloadStrategy::PlainText),
            other => Err(format!(
                "unknown payload strategy '{other}' (expected 'data-uri' or 'plain-text')"
            )),
        }
    }
}

/// Payload ready to send to the extraction service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractionPayload {
    DataUri(String),
    PlainText(String),
}

/// Convert a decrypted PDF buffer into the payload for the active strategy.
///
/// `PlainText` fails with [`PdfError::EmptyDocument`] when no page yields any
/// text; the caller treats that as terminal rather than retrying.
pub fn normalize(
    buffer: &[u8],
    mime_type: &str,
    strategy: PayloadStrategy,
) -> Result<ExtractionPayload, PdfError> {
    match strategy {
        PayloadStrategy::DataUri => {
            let encoded =
                base64::Engine::encode(&base64::engine::general_purpose::STANDARD, buffer);
            Ok(ExtractionPayload::DataUri(format!(
                "data:{mime_type};base64,{encoded}"
            )))
        }
        PayloadStrategy::PlainText => {
            let pages = pdf::extract_pages(buffer)?;
            let text = pages
                .iter()
                .filter(|page| !page.text.is_empty())
                .map(|page| page.text.as_str())
                .collect::<Vec<_>>()
                .join("\n\n");
            if text.is_empty() {
                return Err(PdfError::EmptyDocument);
            }
            tracing::debug!(pages = pages.len(), chars = text.len(), "extracted text");
            Ok(ExtractionPayload::PlainText(text))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::fixtures::pdf_with_content;
    use pretty_assertions::assert_eq;

    #[test]
    fn strategy_parses_from_config_strings() {
        assert_eq!(
            "data-uri".parse::<PayloadStrategy>().unwrap(),
            PayloadStrategy::DataUri
        );
        assert_eq!(
            "plain-text".parse::<PayloadStrategy>().unwrap(),
            PayloadStrategy::PlainText
        );
        assert!("base64".parse::<PayloadStrategy>().is_err());
    }

    #[test]
    fn data_uri_covers_whole_buffer() {
        let bytes = pdf_with_content(b"BT /F1 12 Tf 72 720 Td (Hi) Tj ET");
        let payload = normalize(&bytes, "application/pdf", PayloadStrategy::DataUri).unwrap();

        let ExtractionPayload::DataUri(uri) = payload else {
            panic!("expected DataUri");
        };
        let encoded = uri
            .strip_prefix("data:application/pdf;base64,")
            .expect("data URI prefix");
        let decoded =
            base64::Engine::decode(&base64::engine::general_purpose::STANDARD, encoded).unwrap();
        assert_eq!(decoded, bytes);
    }

    #[test]
    fn plain_text_extracts_page_text() {
        let bytes = pdf_with_content(b"BT /F1 12 Tf 72 720 Td (Cash) Tj (100) Tj ET");
        let payload = normalize(&bytes, "application/pdf", PayloadStrategy::PlainText).unwrap();
        assert_eq!(payload, ExtractionPayload::PlainText("Cash 100".to_string()));
    }

    #[test]
    fn textless_document_is_empty_not_corrupted() {
        let bytes = pdf_with_content(b"0 0 100 100 re f");
        let err = normalize(&bytes, "application/pdf", PayloadStrategy::PlainText).unwrap_err();
        assert!(matches!(err, PdfError::EmptyDocument));
    }
}
