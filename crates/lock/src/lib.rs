#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! The Lock Manager (spec §4.6): exclusive per-host mutual exclusion for
//! any operation that mutates the store or journal, backed by a single
//! file containing the holder's process id, with stale-lock detection.

use spm_errors::Error;
use std::path::{Path, PathBuf};
use sysinfo::{Pid, System};
use tracing::{debug, warn};

/// Holds the lock file path; [`LockGuard`] released via `Drop` releases
/// it on every exit path, success or failure, as spec §4.6 requires.
pub struct LockManager {
    path: PathBuf,
}

/// RAII guard representing a held lock; unlinks the lock file on drop.
#[must_use = "the lock is released when this guard is dropped"]
pub struct LockGuard {
    path: PathBuf,
}

impl LockManager {
    #[must_use]
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Acquire the lock, reclaiming a stale one if its recorded holder
    /// is no longer alive (spec §4.6 steps 1–3).
    ///
    /// # Errors
    ///
    /// Returns [`Error::LockHeld`] if a live process holds the lock.
    pub fn acquire(&self) -> Result<LockGuard, Error> {
        loop {
            match std::fs::read_to_string(&self.path) {
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    self.write_self()?;
                    return Ok(LockGuard {
                        path: self.path.clone(),
                    });
                }
                Err(e) => return Err(e.into()),
                Ok(contents) => {
                    let holder: u32 = contents.trim().parse().unwrap_or(0);
                    if holder != 0 && process_is_alive(holder) {
                        return Err(Error::LockHeld(holder));
                    }
                    warn!(pid = holder, "reclaiming stale lock");
                    let _ = std::fs::remove_file(&self.path);
                    // Loop and retry acquisition from scratch.
                }
            }
        }
    }

    fn write_self(&self) -> Result<(), Error> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, std::process::id().to_string())?;
        debug!(path = %self.path.display(), pid = std::process::id(), "acquired lock");
        Ok(())
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}

/// A zero-signal liveness check: true if a process with `pid` exists.
fn process_is_alive(pid: u32) -> bool {
    let mut system = System::new();
    system.refresh_processes(sysinfo::ProcessesToUpdate::Some(&[Pid::from_u32(pid)]), true);
    system.process(Pid::from_u32(pid)).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn acquire_creates_lock_file_with_own_pid() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lock");
        let manager = LockManager::new(path.clone());

        let guard = manager.acquire().unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents.trim(), std::process::id().to_string());
        drop(guard);
        assert!(!path.exists());
    }

    #[test]
    fn second_acquire_fails_while_first_is_held() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lock");
        let manager = LockManager::new(path);

        let _guard = manager.acquire().unwrap();
        let err = manager.acquire().unwrap_err();
        assert!(matches!(err, Error::LockHeld(_)));
    }

    #[test]
    fn stale_lock_with_dead_pid_is_reclaimed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lock");
        // pid 1 belongs to init/launchd and is never this test process,
        // but a genuinely dead pid is simulated with a very large value
        // unlikely to be assigned on a test host.
        std::fs::write(&path, "999999999").unwrap();

        let manager = LockManager::new(path.clone());
        let guard = manager.acquire().unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents.trim(), std::process::id().to_string());
        drop(guard);
    }
}
