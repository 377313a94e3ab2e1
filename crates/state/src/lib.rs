#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! The State Journal (spec §4.5): a durable record of installed
//! `{package, version}` pairs with their recorded digest, install
//! timestamp, and pin flag.
//!
//! Persistence uses the write-temp-then-rename pattern:
//! `state.toml.tmp` is written and fsynced, then renamed over
//! `state.toml`. Per spec §9 ("process-global mutable state"), nothing
//! here caches the journal across operations — load it fresh inside
//! the locked region of each operation and save it before releasing the
//! lock.

use serde::{Deserialize, Serialize};
use spm_errors::{Error, StateError};
use spm_types::{InstalledEntry, NO_DIGEST};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// In-memory view of the journal: package -> version -> entry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Journal {
    #[serde(flatten)]
    packages: BTreeMap<String, BTreeMap<String, InstalledEntry>>,
}

impl Journal {
    /// Load the journal from `path`. An absent file is an empty journal
    /// (spec §4.5: "An absent or empty file is equivalent to an empty
    /// journal").
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be parsed.
    pub async fn load(path: &Path) -> Result<Self, Error> {
        match fs::read_to_string(path).await {
            Ok(contents) if contents.trim().is_empty() => Ok(Self::default()),
            Ok(contents) => {
                toml::from_str(&contents).map_err(|e| {
                    StateError::Parse {
                        message: e.to_string(),
                    }
                    .into()
                })
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }

    /// Persist the journal to `path` via write-temp-then-rename.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or either filesystem operation
    /// fails.
    pub async fn save_atomic(&self, path: &Path) -> Result<(), Error> {
        let text = toml::to_string_pretty(self).map_err(|e| StateError::Save {
            message: e.to_string(),
        })?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        let tmp_path = tmp_path(path);
        fs::write(&tmp_path, &text).await?;
        fs::rename(&tmp_path, path).await?;
        debug!(path = %path.display(), "saved state journal");
        Ok(())
    }

    /// Record an installed version, overwriting any prior entry for the
    /// same `(package, version)`.
    pub fn record(&mut self, package: &str, version: &str, digest: Option<&str>, pin: bool) {
        let entry = InstalledEntry {
            digest: digest.unwrap_or(NO_DIGEST).to_string(),
            installed_at: now_unix(),
            pin,
        };
        self.packages
            .entry(package.to_string())
            .or_default()
            .insert(version.to_string(), entry);
    }

    /// Remove a single `(package, version)` entry. If it was the last
    /// version recorded for `package`, the package's key is removed too
    /// (spec §4.8 step 7).
    pub fn forget(&mut self, package: &str, version: &str) {
        if let Some(versions) = self.packages.get_mut(package) {
            versions.remove(version);
            if versions.is_empty() {
                self.packages.remove(package);
            }
        }
    }

    /// Set or clear the pin flag on a recorded version.
    ///
    /// # Errors
    ///
    /// Returns [`Error::VersionNotFound`] if the pair is not recorded.
    pub fn set_pin(&mut self, package: &str, version: &str, pin: bool) -> Result<(), Error> {
        let entry = self
            .packages
            .get_mut(package)
            .and_then(|versions| versions.get_mut(version))
            .ok_or_else(|| Error::VersionNotFound {
                package: package.to_string(),
                version: version.to_string(),
            })?;
        entry.pin = pin;
        Ok(())
    }

    /// All versions recorded for `package`, oldest-key-first.
    #[must_use]
    pub fn installed_versions(&self, package: &str) -> Vec<(&str, &InstalledEntry)> {
        self.packages
            .get(package)
            .map(|versions| versions.iter().map(|(v, e)| (v.as_str(), e)).collect())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn get(&self, package: &str, version: &str) -> Option<&InstalledEntry> {
        self.packages.get(package)?.get(version)
    }

    #[must_use]
    pub fn contains(&self, package: &str, version: &str) -> bool {
        self.get(package, version).is_some()
    }

    #[must_use]
    pub fn packages(&self) -> impl Iterator<Item = &str> {
        self.packages.keys().map(String::as_str)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    PathBuf::from(tmp)
}

fn now_unix() -> i64 {
    chrono::Utc::now().timestamp()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_file_is_empty_journal() {
        let dir = tempfile::tempdir().unwrap();
        let journal = Journal::load(&dir.path().join("state.toml")).await.unwrap();
        assert!(journal.is_empty());
    }

    #[tokio::test]
    async fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.toml");

        let mut journal = Journal::default();
        journal.record("foo", "1.0", Some("deadbeef"), false);
        journal.save_atomic(&path).await.unwrap();

        assert!(path.exists());
        assert!(!tmp_path(&path).exists());

        let reloaded = Journal::load(&path).await.unwrap();
        assert!(reloaded.contains("foo", "1.0"));
        assert_eq!(reloaded.get("foo", "1.0").unwrap().digest, "deadbeef");
    }

    #[tokio::test]
    async fn forget_last_version_removes_package_key() {
        let mut journal = Journal::default();
        journal.record("foo", "1.0", None, false);
        journal.forget("foo", "1.0");
        assert_eq!(journal.packages().count(), 0);
    }

    #[tokio::test]
    async fn pin_unknown_version_fails() {
        let mut journal = Journal::default();
        let err = journal.set_pin("foo", "1.0", true).unwrap_err();
        assert!(matches!(err, Error::VersionNotFound { .. }));
    }

    #[tokio::test]
    async fn pin_round_trips() {
        let mut journal = Journal::default();
        journal.record("foo", "1.0", None, false);
        journal.set_pin("foo", "1.0", true).unwrap();
        assert!(journal.get("foo", "1.0").unwrap().pin);
    }
}
