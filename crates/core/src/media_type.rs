//! Content-type lookup for published files.

use std::path::Path;

/// Fallback for extensions the table does not recognize.
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Derive a content type from a file name's extension.
///
/// Delegates to the standard extension table rather than maintaining one
/// by hand. Unknown or missing extensions fall back to a generic
/// octet-stream type.
pub fn content_type_for(path: impl AsRef<Path>) -> &'static str {
    mime_guess::from_path(path.as_ref())
        .first_raw()
        .unwrap_or(OCTET_STREAM)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn common_web_extensions() {
        assert_eq!(content_type_for("index.html"), "text/html");
        assert_eq!(content_type_for("style.css"), "text/css");
        assert_eq!(content_type_for("data.json"), "application/json");
        assert!(content_type_for("js/app.js").contains("javascript"));
    }

    #[test]
    fn unknown_extension_falls_back_to_octet_stream() {
        assert_eq!(content_type_for("artifact.wasmx"), OCTET_STREAM);
        assert_eq!(content_type_for("LICENSE"), OCTET_STREAM);
    }
}
