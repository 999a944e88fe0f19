//! Working directory change guard.
//!
//! The recursive walker is the only code that changes the process working
//! directory. Every change goes through a `CwdGuard`, which puts the previous
//! directory back when it is dropped, on success and error paths alike.

use std::env;
use std::io;
use std::path::{Path, PathBuf};

/// A guard that restores the working directory when dropped.
#[derive(Debug)]
pub struct CwdGuard {
    /// The directory to restore
    original: PathBuf,
    /// Set once the directory has been restored
    restored: bool,
}

impl CwdGuard {
    /// Change to `new_dir`, remembering the current directory.
    pub fn new(new_dir: impl AsRef<Path>) -> io::Result<Self> {
        let original = env::current_dir()?;
        env::set_current_dir(new_dir.as_ref())?;

        Ok(Self {
            original,
            restored: false,
        })
    }

    /// Remember the current directory without changing it.
    pub fn save_current() -> io::Result<Self> {
        Ok(Self {
            original: env::current_dir()?,
            restored: false,
        })
    }

    /// The directory that will be restored.
    pub fn original(&self) -> &Path {
        &self.original
    }

    /// Restore the original directory now, reporting failure.
    ///
    /// Drop becomes a no-op afterwards.
    pub fn restore_now(&mut self) -> io::Result<()> {
        if !self.restored {
            env::set_current_dir(&self.original)?;
            self.restored = true;
        }
        Ok(())
    }
}

impl Drop for CwdGuard {
    fn drop(&mut self) {
        if !self.restored {
            // nothing useful to do with an error here
            let _ = env::set_current_dir(&self.original);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::TempDir;

    fn canonical_cwd() -> PathBuf {
        env::current_dir().unwrap().canonicalize().unwrap()
    }

    #[test]
    #[serial]
    fn test_guard_restores_on_drop() {
        let original = canonical_cwd();
        let temp = TempDir::new().unwrap();
        {
            let _guard = CwdGuard::new(temp.path()).unwrap();
            assert_eq!(canonical_cwd(), temp.path().canonicalize().unwrap());
        }
        assert_eq!(canonical_cwd(), original);
    }

    #[test]
    #[serial]
    fn test_guard_restores_on_panic() {
        let original = canonical_cwd();
        let temp = TempDir::new().unwrap();
        let result = std::panic::catch_unwind(|| {
            let _guard = CwdGuard::new(temp.path()).unwrap();
            panic!("boom");
        });
        assert!(result.is_err());
        assert_eq!(canonical_cwd(), original);
    }

    #[test]
    #[serial]
    fn test_failed_change_leaves_cwd_alone() {
        let original = canonical_cwd();
        let temp = TempDir::new().unwrap();
        assert!(CwdGuard::new(temp.path().join("missing")).is_err());
        assert_eq!(canonical_cwd(), original);
    }

    #[test]
    #[serial]
    fn test_restore_now() {
        let original = canonical_cwd();
        let temp = TempDir::new().unwrap();
        let mut guard = CwdGuard::new(temp.path()).unwrap();
        guard.restore_now().unwrap();
        assert_eq!(canonical_cwd(), original);
        assert_eq!(guard.original().canonicalize().unwrap(), original);
    }

    #[test]
    #[serial]
    fn test_save_current() {
        let original = canonical_cwd();
        let temp = TempDir::new().unwrap();
        {
            let _guard = CwdGuard::save_current().unwrap();
            env::set_current_dir(temp.path()).unwrap();
        }
        assert_eq!(canonical_cwd(), original);
    }
}
