//! MIME type detection utilities.
//!
//! The table covers what a browser-side inference demo actually requests:
//! markup, scripts (including `.mjs` module scripts, which default platform
//! tables often mislabel), styles, wasm, model blobs, images, media, fonts.

use std::path::Path;

/// Common MIME type constants.
pub mod types {
    // Text
    pub const HTML: &str = "text/html; charset=utf-8";
    pub const PLAIN: &str = "text/plain; charset=utf-8";
    pub const CSS: &str = "text/css; charset=utf-8";
    pub const JAVASCRIPT: &str = "text/javascript; charset=utf-8";
    pub const JSON: &str = "application/json";
    pub const XML: &str = "application/xml";
    pub const MARKDOWN: &str = "text/markdown; charset=utf-8";

    // Binary
    pub const OCTET_STREAM: &str = "application/octet-stream";
    pub const WASM: &str = "application/wasm";
    pub const PDF: &str = "application/pdf";

    // Images
    pub const PNG: &str = "image/png";
    pub const JPEG: &str = "image/jpeg";
    pub const GIF: &str = "image/gif";
    pub const WEBP: &str = "image/webp";
    pub const SVG: &str = "image/svg+xml";
    pub const ICO: &str = "image/x-icon";

    // Audio / video
    pub const MP3: &str = "audio/mpeg";
    pub const WAV: &str = "audio/wav";
    pub const MP4: &str = "video/mp4";
    pub const WEBM: &str = "video/webm";

    // Fonts
    pub const WOFF: &str = "font/woff";
    pub const WOFF2: &str = "font/woff2";
    pub const TTF: &str = "font/ttf";
    pub const OTF: &str = "font/otf";
}

/// Guess MIME type from file extension.
///
/// Returns a full MIME type string suitable for an HTTP Content-Type header.
pub fn from_path(path: &Path) -> &'static str {
    from_extension(path.extension().and_then(|e| e.to_str()))
}

/// Guess MIME type from file extension string.
pub fn from_extension(ext: Option<&str>) -> &'static str {
    use types::*;

    let Some(ext) = ext else {
        return OCTET_STREAM;
    };

    match ext.to_ascii_lowercase().as_str() {
        "html" | "htm" => HTML,
        "txt" => PLAIN,
        "css" => CSS,
        // Module scripts must be served as JavaScript or the browser refuses
        // to execute the import
        "js" | "mjs" | "cjs" => JAVASCRIPT,
        "json" | "map" => JSON,
        "xml" => XML,
        "md" => MARKDOWN,

        "wasm" => WASM,
        "pdf" => PDF,
        // Model weights and tensors served to the in-browser runtime
        "onnx" | "ort" | "bin" | "pb" | "tflite" => OCTET_STREAM,

        "png" => PNG,
        "jpg" | "jpeg" => JPEG,
        "gif" => GIF,
        "webp" => WEBP,
        "svg" => SVG,
        "ico" => ICO,

        "mp3" => MP3,
        "wav" => WAV,
        "mp4" => MP4,
        "webm" => WEBM,

        "woff" => WOFF,
        "woff2" => WOFF2,
        "ttf" => TTF,
        "otf" => OTF,

        _ => OCTET_STREAM,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_script_extension_is_javascript() {
        assert_eq!(from_path(Path::new("yolo.mjs")), types::JAVASCRIPT);
        assert_eq!(from_extension(Some("mjs")), types::JAVASCRIPT);
    }

    #[test]
    fn test_common_types() {
        assert_eq!(from_path(Path::new("index.html")), types::HTML);
        assert_eq!(from_path(Path::new("style.css")), types::CSS);
        assert_eq!(from_path(Path::new("app.js")), types::JAVASCRIPT);
        assert_eq!(from_path(Path::new("rt.wasm")), types::WASM);
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(from_path(Path::new("PHOTO.JPG")), types::JPEG);
        assert_eq!(from_path(Path::new("Main.MJS")), types::JAVASCRIPT);
    }

    #[test]
    fn test_unknown_and_missing_extension() {
        assert_eq!(from_path(Path::new("model.xyz")), types::OCTET_STREAM);
        assert_eq!(from_path(Path::new("Makefile")), types::OCTET_STREAM);
        assert_eq!(from_extension(None), types::OCTET_STREAM);
    }

    #[test]
    fn test_model_blobs_are_binary() {
        assert_eq!(from_path(Path::new("pose.onnx")), types::OCTET_STREAM);
        assert_eq!(from_path(Path::new("weights.bin")), types::OCTET_STREAM);
    }
}
