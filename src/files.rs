//! Local file access for multipart uploads.

use std::path::Path;

const FALLBACK_MIME: &str = "application/octet-stream";

/// Contents and best-effort MIME type of a local file, or `None` when the
/// file cannot be read.
pub fn sniff(path: &Path) -> Option<(Vec<u8>, String)> {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "upload file not readable");
            return None;
        }
    };

    let mime = new_mime_guess::from_path(path)
        .first_raw()
        .unwrap_or(FALLBACK_MIME)
        .to_string();

    Some((bytes, mime))
}
