//! URL to filesystem path resolution.

use std::path::{Path, PathBuf};

/// Resolve a request URL to a file under `root`, handling `index.html`
/// for directories.
///
/// Returns `None` for anything that is not a readable file inside the
/// served tree.
pub fn resolve_path(url: &str, root: &Path) -> Option<PathBuf> {
    let clean = normalize_url(url);

    // Reject traversal attempts before touching the filesystem
    if clean.contains("..") {
        return None;
    }

    let local = root.join(&clean);

    // Canonicalize and verify the result is still under the serve root.
    // Catches symlinks and anything the substring check above missed.
    // `root` is canonicalized at startup (ServeConfig::from_cli).
    let canonical = local.canonicalize().ok()?;
    if !canonical.starts_with(root) {
        return None;
    }

    if canonical.is_file() {
        return Some(canonical);
    }

    if canonical.is_dir() {
        let index = canonical.join("index.html");
        if index.is_file() {
            return Some(index);
        }
    }

    None
}

/// Normalize URL: percent-decode, strip query string, trim slashes
fn normalize_url(url: &str) -> String {
    use percent_encoding::percent_decode_str;

    let decoded = percent_decode_str(url)
        .decode_utf8()
        .map(std::borrow::Cow::into_owned)
        .unwrap_or_default();

    let path = decoded.split('?').next().unwrap_or(&decoded);
    path.trim_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn fixture() -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().canonicalize().unwrap();
        fs::write(root.join("index.html"), "<html></html>").unwrap();
        fs::create_dir(root.join("js")).unwrap();
        fs::write(root.join("js").join("main.mjs"), "export {}").unwrap();
        (dir, root)
    }

    #[test]
    fn test_root_serves_index() {
        let (_dir, root) = fixture();
        assert_eq!(resolve_path("/", &root), Some(root.join("index.html")));
    }

    #[test]
    fn test_nested_file() {
        let (_dir, root) = fixture();
        assert_eq!(
            resolve_path("/js/main.mjs", &root),
            Some(root.join("js").join("main.mjs"))
        );
    }

    #[test]
    fn test_query_string_stripped() {
        let (_dir, root) = fixture();
        assert_eq!(
            resolve_path("/index.html?v=2", &root),
            Some(root.join("index.html"))
        );
    }

    #[test]
    fn test_percent_encoding_decoded() {
        let (_dir, root) = fixture();
        fs::write(root.join("my page.html"), "<html></html>").unwrap();
        assert_eq!(
            resolve_path("/my%20page.html", &root),
            Some(root.join("my page.html"))
        );
    }

    #[test]
    fn test_missing_file_is_none() {
        let (_dir, root) = fixture();
        assert_eq!(resolve_path("/nope.html", &root), None);
    }

    #[test]
    fn test_traversal_rejected() {
        let (_dir, root) = fixture();
        assert_eq!(resolve_path("/../secrets", &root), None);
        assert_eq!(resolve_path("/js/../../etc/passwd", &root), None);
        // Encoded dots decode to ".." and must still be rejected
        assert_eq!(resolve_path("/%2e%2e/secrets", &root), None);
    }

    #[test]
    fn test_directory_without_index_is_none() {
        let (_dir, root) = fixture();
        assert_eq!(resolve_path("/js", &root), None);
    }
}
