//! PDF text-layer extraction

use std::path::Path;

/// Extracts the text layer of every page, whitespace collapsed
///
/// Returns an empty string (logged) when the file is missing, cannot be decoded,
/// or the decoder panics on a malformed document.
#[cfg(feature = "pdf")]
pub fn extract_pdf_text(path: &Path) -> String {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!("Cannot read PDF {}: {}", path.display(), e);
            return String::new();
        }
    };

    match std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem(&bytes)) {
        Ok(Ok(text)) => super::collapse_whitespace(&text),
        Ok(Err(e)) => {
            tracing::warn!("Failed extracting text from {}: {}", path.display(), e);
            String::new()
        }
        Err(_) => {
            tracing::warn!("PDF decoder panicked on {}", path.display());
            String::new()
        }
    }
}

#[cfg(not(feature = "pdf"))]
pub fn extract_pdf_text(path: &Path) -> String {
    tracing::warn!(
        "Built without the `pdf` feature; skipping {}",
        path.display()
    );
    String::new()
}
