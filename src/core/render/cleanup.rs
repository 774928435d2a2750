//! Temp artifact cleanup.
//!
//! Acquisition of the per-request temp paths is paired with guaranteed
//! release: the guard deletes its files when dropped, no matter which
//! control-flow branch dropped it (validation skip, engine failure, stream
//! completion, or client disconnect).

use std::io::ErrorKind;
use std::path::PathBuf;

use tracing::{debug, warn};

/// Deletes a render request's temporary files exactly once, on drop.
///
/// Deletion is idempotent: a file that was never created, or is already
/// gone, is not an error. Other removal failures are logged rather than
/// propagated; there is no caller left to handle them on the drop path.
#[derive(Debug)]
pub struct TempFileGuard {
    paths: Vec<PathBuf>,
}

impl TempFileGuard {
    pub fn new(paths: Vec<PathBuf>) -> Self {
        Self { paths }
    }
}

impl Drop for TempFileGuard {
    fn drop(&mut self) {
        for path in &self.paths {
            match std::fs::remove_file(path) {
                Ok(()) => debug!(path = %path.display(), "removed temp file"),
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => warn!(path = %path.display(), error = %e, "failed to remove temp file"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guard_removes_files_on_drop() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.ass");
        let b = dir.path().join("b.mp4");
        std::fs::write(&a, "track").unwrap();
        std::fs::write(&b, "video").unwrap();

        let guard = TempFileGuard::new(vec![a.clone(), b.clone()]);
        assert!(a.exists() && b.exists());
        drop(guard);
        assert!(!a.exists());
        assert!(!b.exists());
    }

    #[test]
    fn test_guard_tolerates_absent_files() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("never-created.mp4");
        let guard = TempFileGuard::new(vec![missing]);
        drop(guard); // must not panic
    }

    #[test]
    fn test_guard_leaves_unrelated_files_alone() {
        let dir = tempfile::tempdir().unwrap();
        let mine = dir.path().join("mine.ass");
        let other = dir.path().join("other.ass");
        std::fs::write(&mine, "x").unwrap();
        std::fs::write(&other, "y").unwrap();

        drop(TempFileGuard::new(vec![mine.clone()]));
        assert!(!mine.exists());
        assert!(other.exists());
    }
}
