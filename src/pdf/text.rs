//! Per-page text extraction from PDF content streams.
//!
//! Walks each page's decoded content stream and collects the string operands
//! of the text-showing operators. Runs are joined with single spaces; layout
//! reconstruction is deliberately out of scope because the extraction service
//! does the table recognition.

use lopdf::{Document, Object, ObjectId};

use crate::error::PdfError;

/// Text extracted from one page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfPage {
    /// 1-based page number.
    pub page_number: u32,
    pub text: String,
}

/// Extract the text of every page, in page order. A page whose content
/// stream cannot be decoded yields empty text rather than failing the whole
/// document.
pub fn extract_pages(buffer: &[u8]) -> Result<Vec<PdfPage>, PdfError> {
    let doc = Document::load_mem(buffer).map_err(|e| PdfError::Parse(e.to_string()))?;

    let pages = doc.get_pages();
    let mut page_numbers: Vec<u32> = pages.keys().copied().collect();
    page_numbers.sort_unstable();

    let mut out = Vec::with_capacity(page_numbers.len());
    for page_number in page_numbers {
        let Some(&object_id) = pages.get(&page_number) else {
            continue;
        };
        let text = match page_text(&doc, object_id) {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(page = page_number, error = %e, "skipping unreadable page");
                String::new()
            }
        };
        out.push(PdfPage { page_number, text });
    }
    Ok(out)
}

fn page_text(doc: &Document, object_id: ObjectId) -> Result<String, PdfError> {
    let raw = doc
        .get_page_content(object_id)
        .map_err(|e| PdfError::Parse(e.to_string()))?;
    let content =
        lopdf::content::Content::decode(&raw).map_err(|e| PdfError::Parse(e.to_string()))?;

    let mut runs: Vec<String> = Vec::new();
    for op in &content.operations {
        match op.operator.as_ref() {
            "Tj" | "'" => {
                if let Some(Object::String(bytes, _)) = op.operands.first() {
                    push_run(&mut runs, bytes);
                }
            }
            "\"" => {
                // aw ac string
                if let Some(Object::String(bytes, _)) = op.operands.get(2) {
                    push_run(&mut runs, bytes);
                }
            }
            "TJ" => {
                if let Some(Object::Array(items)) = op.operands.first() {
                    for item in items {
                        if let Object::String(bytes, _) = item {
                            push_run(&mut runs, bytes);
                        }
                    }
                }
            }
            _ => {}
        }
    }
    Ok(runs.join(" "))
}

fn push_run(runs: &mut Vec<String>, bytes: &[u8]) {
    // Non-UTF-8 strings are font-encoded glyph indices; without the font's
    // cmap they are unrecoverable, so they are dropped.
    if let Ok(s) = std::str::from_utf8(bytes) {
        let trimmed = s.trim();
        if !trimmed.is_empty() {
            runs.push(trimmed.to_string());
        }
    }
}
