//! Filesystem change detection by modification-time scan.
//!
//! [`latest_mtime`] performs one full synchronous traversal of the watched
//! tree and returns the newest modification time it saw. [`WatchState`] keeps
//! the baseline between polls and answers "did anything change since last
//! time". The two are deliberately separate: the traversal is swappable (an
//! OS-notification backend would satisfy the same contract) while the
//! baseline logic stays put.

use std::ffi::OsStr;
use std::path::Path;
use std::time::SystemTime;

use jwalk::WalkDir;

/// Directory names never descended into, matched per path segment.
/// Exact-segment matching on purpose: a directory named `a.git.b` is watched.
const EXCLUDED_DIRS: &[&str] = &[".git"];

/// Scan the tree under `root` and return the newest file modification time.
///
/// Returns `None` when no readable regular file exists under `root`.
/// Entries that vanish or turn unreadable mid-scan are skipped; a scan
/// never fails as a whole.
pub fn latest_mtime(root: &Path) -> Option<SystemTime> {
    WalkDir::new(root)
        .skip_hidden(false)
        .process_read_dir(|_, _, _, children| {
            children.retain(|entry| {
                entry
                    .as_ref()
                    .map(|e| !is_excluded_name(&e.file_name))
                    // Unreadable entries are kept here and dropped below,
                    // so one bad entry can't hide its siblings
                    .unwrap_or(true)
            });
        })
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .filter_map(|e| e.metadata().ok()?.modified().ok())
        .max()
}

fn is_excluded_name(name: &OsStr) -> bool {
    let name = name.to_str().unwrap_or_default();
    EXCLUDED_DIRS.contains(&name)
}

/// Baseline for change detection: the newest modification time seen so far.
///
/// Owned exclusively by the watch loop; lives for the process lifetime.
#[derive(Debug, Default)]
pub struct WatchState {
    last_seen: Option<SystemTime>,
}

impl WatchState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a scan result. Returns `true` only on a strict increase over
    /// the stored baseline.
    ///
    /// The very first observation establishes the baseline without reporting
    /// a change, so files written before startup never trigger a spurious
    /// reload.
    pub fn observe(&mut self, latest: Option<SystemTime>) -> bool {
        let Some(latest) = latest else {
            // Empty or unreadable tree: keep the old baseline
            return false;
        };

        match self.last_seen {
            None => {
                self.last_seen = Some(latest);
                false
            }
            Some(prev) if latest > prev => {
                self.last_seen = Some(latest);
                true
            }
            Some(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::time::Duration;

    fn mtime_of(path: &Path) -> SystemTime {
        fs::metadata(path).unwrap().modified().unwrap()
    }

    #[test]
    fn test_empty_tree_has_no_mtime() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(latest_mtime(dir.path()), None);
    }

    #[test]
    fn test_latest_mtime_is_max_over_tree() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("index.html"), "<html></html>").unwrap();
        fs::create_dir(dir.path().join("js")).unwrap();
        fs::write(dir.path().join("js").join("main.mjs"), "export {}").unwrap();

        let expected = mtime_of(&dir.path().join("index.html"))
            .max(mtime_of(&dir.path().join("js").join("main.mjs")));
        assert_eq!(latest_mtime(dir.path()), Some(expected));
    }

    #[test]
    fn test_scan_is_monotonic() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.txt"), "a").unwrap();

        let first = latest_mtime(dir.path()).unwrap();
        let second = latest_mtime(dir.path()).unwrap();
        assert!(second >= first);
    }

    #[test]
    fn test_git_directory_is_excluded() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join(".git")).unwrap();
        fs::write(dir.path().join(".git").join("config"), "[core]").unwrap();

        // The only file lives under .git, so the scan sees nothing
        assert_eq!(latest_mtime(dir.path()), None);
    }

    #[test]
    fn test_git_lookalike_segment_is_watched() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("a.git.b")).unwrap();
        let file = dir.path().join("a.git.b").join("notes.txt");
        fs::write(&file, "kept").unwrap();

        assert_eq!(latest_mtime(dir.path()), Some(mtime_of(&file)));
    }

    #[test]
    fn test_other_dotfiles_are_watched() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join(".env");
        fs::write(&file, "PORT=8080").unwrap();

        assert_eq!(latest_mtime(dir.path()), Some(mtime_of(&file)));
    }

    // ------------------------------------------------------------------
    // WatchState
    // ------------------------------------------------------------------

    fn t(secs: u64) -> SystemTime {
        SystemTime::UNIX_EPOCH + Duration::from_secs(secs)
    }

    #[test]
    fn test_first_observation_sets_baseline_silently() {
        let mut state = WatchState::new();
        assert!(!state.observe(Some(t(100))));
    }

    #[test]
    fn test_unchanged_scan_is_a_noop() {
        let mut state = WatchState::new();
        state.observe(Some(t(100)));
        assert!(!state.observe(Some(t(100))));
        assert!(!state.observe(Some(t(100))));
    }

    #[test]
    fn test_strict_increase_triggers() {
        let mut state = WatchState::new();
        state.observe(Some(t(100)));
        assert!(state.observe(Some(t(101))));
        // Same value again: already seen
        assert!(!state.observe(Some(t(101))));
    }

    #[test]
    fn test_coalescing_multiple_changes_one_trigger() {
        let mut state = WatchState::new();
        state.observe(Some(t(100)));
        // N distinct files changed within one poll window surface as a
        // single max-mtime observation
        assert!(state.observe(Some(t(105))));
        assert!(!state.observe(Some(t(105))));
    }

    #[test]
    fn test_older_mtime_never_triggers() {
        let mut state = WatchState::new();
        state.observe(Some(t(100)));
        assert!(!state.observe(Some(t(90))));
        // Baseline kept, so only a real increase triggers
        assert!(state.observe(Some(t(101))));
    }

    #[test]
    fn test_empty_scan_keeps_baseline() {
        let mut state = WatchState::new();
        state.observe(Some(t(100)));
        assert!(!state.observe(None));
        assert!(!state.observe(Some(t(100))));
    }

    #[test]
    fn test_scan_feeds_state() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.txt"), "a").unwrap();

        let mut state = WatchState::new();
        assert!(!state.observe(latest_mtime(dir.path())));
        // Nothing changed between scans
        assert!(!state.observe(latest_mtime(dir.path())));
    }
}
