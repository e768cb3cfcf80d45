// ── Advisory per-bridge lockfile ──
//
// A zero-content marker file next to the state file signals "an
// operation on this bridge is in progress". Acquisition is fail-fast:
// if the marker exists the caller gets a lock-held error and must not
// proceed. There is no expiry -- a lock left behind by a crashed
// invocation stays until `reset` removes it.

use std::fs::OpenOptions;
use std::io::ErrorKind;
use std::path::PathBuf;

use tracing::debug;

use crate::error::CoreError;
use crate::store::BridgeStore;

/// Guard for an acquired bridge lock.
///
/// Released explicitly via [`release`](Self::release); dropping the
/// guard removes the marker as a best-effort backstop (a killed process
/// still leaves a stale lock behind).
#[derive(Debug)]
pub struct BridgeLock {
    path: PathBuf,
    released: bool,
}

impl BridgeLock {
    /// Acquire the lock for `bridge`, failing fast when already held.
    ///
    /// An existing marker file is left untouched.
    pub fn acquire(store: &BridgeStore, bridge: &str) -> Result<Self, CoreError> {
        let path = store.lock_path(bridge);
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(_) => {
                debug!(bridge, "acquired bridge lock");
                Ok(Self {
                    path,
                    released: false,
                })
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => Err(CoreError::LockHeld {
                bridge: bridge.into(),
            }),
            Err(e) => Err(CoreError::Io(e)),
        }
    }

    /// Release the lock, removing the marker file.
    pub fn release(mut self) -> Result<(), CoreError> {
        self.released = true;
        std::fs::remove_file(&self.path)?;
        Ok(())
    }

    /// Remove a lockfile regardless of who created it.
    ///
    /// Returns whether a lockfile existed.
    pub fn reset(store: &BridgeStore, bridge: &str) -> Result<bool, CoreError> {
        match std::fs::remove_file(store.lock_path(bridge)) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(CoreError::Io(e)),
        }
    }
}

impl Drop for BridgeLock {
    fn drop(&mut self) {
        if !self.released {
            let _ = std::fs::remove_file(&self.path);
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn acquire_conflict_leaves_lockfile_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let store = BridgeStore::at(dir.path()).unwrap();

        let held = BridgeLock::acquire(&store, "living").unwrap();
        let second = BridgeLock::acquire(&store, "living");
        assert!(
            matches!(second, Err(CoreError::LockHeld { ref bridge }) if bridge == "living"),
            "expected LockHeld, got: {second:?}"
        );
        assert!(store.lock_path("living").exists());

        held.release().unwrap();
        assert!(!store.lock_path("living").exists());
    }

    #[test]
    fn drop_removes_marker() {
        let dir = tempfile::tempdir().unwrap();
        let store = BridgeStore::at(dir.path()).unwrap();

        {
            let _guard = BridgeLock::acquire(&store, "living").unwrap();
            assert!(store.lock_path("living").exists());
        }
        assert!(!store.lock_path("living").exists());
    }

    #[test]
    fn reset_reports_whether_lock_existed() {
        let dir = tempfile::tempdir().unwrap();
        let store = BridgeStore::at(dir.path()).unwrap();

        assert!(!BridgeLock::reset(&store, "living").unwrap());
        std::fs::write(store.lock_path("living"), "").unwrap();
        assert!(BridgeLock::reset(&store, "living").unwrap());
        assert!(!store.lock_path("living").exists());
    }

    #[test]
    fn locks_are_per_bridge() {
        let dir = tempfile::tempdir().unwrap();
        let store = BridgeStore::at(dir.path()).unwrap();

        let _a = BridgeLock::acquire(&store, "a").unwrap();
        assert!(BridgeLock::acquire(&store, "b").is_ok());
    }
}
