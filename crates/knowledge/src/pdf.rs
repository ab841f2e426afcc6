//! PDF text extraction.

use docqa_core::{AppError, AppResult};

/// An uploaded file as received from a client.
#[derive(Debug, Clone)]
pub struct PdfUpload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Whether an upload should be treated as a PDF.
///
/// The file name extension decides; a `application/pdf` content type is
/// accepted for uploads without a usable name.
pub fn is_pdf(file_name: &str, content_type: Option<&str>) -> bool {
    let by_name = file_name.to_ascii_lowercase().ends_with(".pdf");
    let by_type = content_type
        .map(|ct| ct.trim().eq_ignore_ascii_case("application/pdf"))
        .unwrap_or(false);
    by_name || (by_type && !file_name.contains('.'))
}

/// Extract the text of a PDF, trimmed.
///
/// Parsing runs on a blocking thread.
pub async fn extract_text(bytes: Vec<u8>) -> AppResult<String> {
    let size = bytes.len();
    let text = tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&bytes))
        .await
        .map_err(|e| AppError::Extraction(format!("PDF extraction task failed: {}", e)))?
        .map_err(|e| AppError::Extraction(format!("PDF extraction error: {}", e)))?;

    tracing::debug!(bytes = size, chars = text.len(), "Extracted PDF text");
    Ok(text.trim().to_string())
}
