use std::path::Path;

use base64::Engine as _;

use crate::{LedgerError, ResultLedger};

/// Reads `path` and encodes it as a `data:<mime>;base64,...` URI.
pub(crate) async fn read_data_uri(path: &Path) -> ResultLedger<String> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|source| LedgerError::ImageRead {
            path: path.to_path_buf(),
            source,
        })?;
    tracing::debug!(path = %path.display(), bytes = bytes.len(), "receipt image read");
    Ok(encode_data_uri(mime_type(path), &bytes))
}

pub(crate) fn encode_data_uri(mime: &str, bytes: &[u8]) -> String {
    let payload = base64::engine::general_purpose::STANDARD.encode(bytes);
    format!("data:{mime};base64,{payload}")
}

/// Guesses the MIME type from the file extension.
pub(crate) fn mime_type(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("svg") => "image/svg+xml",
        Some("bmp") => "image/bmp",
        Some("pdf") => "application/pdf",
        _ => "application/octet-stream",
    }
}
