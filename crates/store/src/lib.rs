#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! The content-addressed per-version artifact store (spec §3 "Store
//! Layout", §4.7–§4.9 atomic publish protocol).
//!
//! Layout under the store root:
//!
//! ```text
//! <store>/<package>/<version>/      artifact directory
//! <store>/<package>/<version>.tmp/  staging area during install/build
//! <store>/<package>/current         symlink to the active version
//! ```
//!
//! Publishing a version is two renames: extract into `<version>.tmp`,
//! then `rename()` it to `<version>` (atomic within the same
//! filesystem), then unlink-and-relink `current`. Both steps are
//! single syscalls, so a crash can only ever leave either the old or
//! the new state visible, never a half-written one.

mod archive;

pub use archive::{create, extract};

use spm_errors::{Error, StorageError};
use std::path::{Path, PathBuf};

/// The artifact store rooted at a fixed directory (spec §3).
pub struct Store {
    root: PathBuf,
}

impl Store {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn package_dir(&self, package: &str) -> PathBuf {
        self.root.join(package)
    }

    #[must_use]
    pub fn version_dir(&self, package: &str, version: &str) -> PathBuf {
        self.package_dir(package).join(version)
    }

    #[must_use]
    pub fn staging_dir(&self, package: &str, version: &str) -> PathBuf {
        self.package_dir(package).join(format!("{version}.tmp"))
    }

    #[must_use]
    pub fn current_link(&self, package: &str) -> PathBuf {
        self.package_dir(package).join("current")
    }

    /// Whether `version` is already present as a published artifact
    /// directory for `package`.
    pub async fn has_version(&self, package: &str, version: &str) -> bool {
        tokio::fs::try_exists(self.version_dir(package, version))
            .await
            .unwrap_or(false)
    }

    /// Extract `archive_path` into the staging directory for
    /// `package`/`version`, replacing any previous staging attempt.
    ///
    /// # Errors
    ///
    /// Propagates [`StorageError::ExtractionFailed`] and I/O errors.
    pub async fn stage(
        &self,
        package: &str,
        version: &str,
        archive_path: &Path,
    ) -> Result<PathBuf, Error> {
        let staging = self.staging_dir(package, version);
        if tokio::fs::try_exists(&staging).await.unwrap_or(false) {
            tokio::fs::remove_dir_all(&staging).await?;
        }
        extract(archive_path, &staging).await?;
        Ok(staging)
    }

    /// Atomically publish a staged version by renaming `<version>.tmp`
    /// to `<version>` (spec §4.7 step "rename the staging directory
    /// into place").
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::AtomicPublishFailed`] if the rename
    /// fails (e.g. staging and final directories are on different
    /// filesystems).
    pub async fn publish(&self, package: &str, version: &str) -> Result<(), Error> {
        let staging = self.staging_dir(package, version);
        let target = self.version_dir(package, version);
        tokio::fs::create_dir_all(self.package_dir(package)).await?;
        tokio::fs::rename(&staging, &target).await.map_err(|e| {
            StorageError::AtomicPublishFailed(format!(
                "rename {} -> {}: {e}",
                staging.display(),
                target.display()
            ))
        })?;
        Ok(())
    }

    /// Repoint the `current` symlink for `package` at `version`,
    /// unlinking any prior symlink first (spec §4.8 "switch"; also
    /// used by the final step of `install`).
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::AtomicPublishFailed`] if the symlink
    /// cannot be created.
    pub async fn set_current(&self, package: &str, version: &str) -> Result<(), Error> {
        let link = self.current_link(package);
        if tokio::fs::try_exists(&link).await.unwrap_or(false) {
            tokio::fs::remove_file(&link).await?;
        }
        tokio::fs::symlink(version, &link)
            .await
            .map_err(|e| StorageError::AtomicPublishFailed(e.to_string()))?;
        Ok(())
    }

    /// Read which version `current` points at, if any.
    pub async fn current_version(&self, package: &str) -> Option<String> {
        let link = self.current_link(package);
        let target = tokio::fs::read_link(&link).await.ok()?;
        target.file_name()?.to_str().map(str::to_string)
    }

    /// Remove a published version directory. If `current` points at
    /// it, the symlink is removed too (spec §4.8 step "unlink `current`
    /// if it pointed at the removed version").
    ///
    /// # Errors
    ///
    /// Propagates I/O errors from the removal.
    pub async fn remove_version(&self, package: &str, version: &str) -> Result<(), Error> {
        if self.current_version(package).await.as_deref() == Some(version) {
            let link = self.current_link(package);
            if tokio::fs::try_exists(&link).await.unwrap_or(false) {
                tokio::fs::remove_file(&link).await?;
            }
        }

        let dir = self.version_dir(package, version);
        if tokio::fs::try_exists(&dir).await.unwrap_or(false) {
            tokio::fs::remove_dir_all(&dir).await?;
        }
        Ok(())
    }

    /// Discard a staging directory left behind by a failed install,
    /// without touching the published version or `current` (spec §4.7
    /// crash-recovery note: stray `.tmp` directories are inert and can
    /// be swept on the next run).
    ///
    /// # Errors
    ///
    /// Propagates I/O errors from the removal.
    pub async fn discard_staging(&self, package: &str, version: &str) -> Result<(), Error> {
        let staging = self.staging_dir(package, version);
        if tokio::fs::try_exists(&staging).await.unwrap_or(false) {
            tokio::fs::remove_dir_all(&staging).await?;
        }
        Ok(())
    }

    /// List published versions for `package` by reading its store
    /// subdirectory, ignoring `current` and any `.tmp` staging
    /// directories.
    ///
    /// # Errors
    ///
    /// Propagates I/O errors other than "package directory absent",
    /// which yields an empty list.
    pub async fn published_versions(&self, package: &str) -> Result<Vec<String>, Error> {
        let dir = self.package_dir(package);
        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut versions = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            if name == "current" || name.ends_with(".tmp") {
                continue;
            }
            if entry.file_type().await?.is_dir() {
                versions.push(name.to_string());
            }
        }
        versions.sort();
        Ok(versions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn sample_tree(dir: &Path) {
        std::fs::create_dir_all(dir.join("bin")).unwrap();
        std::fs::write(dir.join("bin/hello"), b"#!/bin/sh\necho hi\n").unwrap();
        std::fs::write(dir.join("manifest.pkg"), b"[metadata]\nname = hello\n").unwrap();
    }

    #[tokio::test]
    async fn publish_and_set_current_roundtrip() {
        let temp = tempfile::tempdir().unwrap();
        let payload = tempfile::tempdir().unwrap();
        sample_tree(payload.path());

        let archive_path: PathBuf = temp.path().join("hello-1.0.archive");
        archive::create(payload.path(), &archive_path).await.unwrap();

        let store = Store::new(temp.path().join("store"));
        store.stage("hello", "1.0", &archive_path).await.unwrap();
        store.publish("hello", "1.0").await.unwrap();
        assert!(store.has_version("hello", "1.0").await);

        store.set_current("hello", "1.0").await.unwrap();
        assert_eq!(
            store.current_version("hello").await.as_deref(),
            Some("1.0")
        );

        let extracted = store.version_dir("hello", "1.0").join("bin/hello");
        assert!(extracted.exists());
    }

    #[tokio::test]
    async fn switch_repoints_current() {
        let temp = tempfile::tempdir().unwrap();
        let store = Store::new(temp.path().join("store"));

        for version in ["1.0", "2.0"] {
            let payload = tempfile::tempdir().unwrap();
            sample_tree(payload.path());
            let archive_path = temp.path().join(format!("hello-{version}.archive"));
            archive::create(payload.path(), &archive_path).await.unwrap();
            store.stage("hello", version, &archive_path).await.unwrap();
            store.publish("hello", version).await.unwrap();
        }

        store.set_current("hello", "1.0").await.unwrap();
        store.set_current("hello", "2.0").await.unwrap();
        assert_eq!(
            store.current_version("hello").await.as_deref(),
            Some("2.0")
        );
    }

    #[tokio::test]
    async fn remove_version_unlinks_current_when_matching() {
        let temp = tempfile::tempdir().unwrap();
        let payload = tempfile::tempdir().unwrap();
        sample_tree(payload.path());
        let archive_path = temp.path().join("hello-1.0.archive");
        archive::create(payload.path(), &archive_path).await.unwrap();

        let store = Store::new(temp.path().join("store"));
        store.stage("hello", "1.0", &archive_path).await.unwrap();
        store.publish("hello", "1.0").await.unwrap();
        store.set_current("hello", "1.0").await.unwrap();

        store.remove_version("hello", "1.0").await.unwrap();
        assert!(!store.has_version("hello", "1.0").await);
        assert_eq!(store.current_version("hello").await, None);
    }

    #[tokio::test]
    async fn published_versions_ignores_current_and_staging() {
        let temp = tempfile::tempdir().unwrap();
        let payload = tempfile::tempdir().unwrap();
        sample_tree(payload.path());
        let archive_path = temp.path().join("hello-1.0.archive");
        archive::create(payload.path(), &archive_path).await.unwrap();

        let store = Store::new(temp.path().join("store"));
        store.stage("hello", "1.0", &archive_path).await.unwrap();
        store.publish("hello", "1.0").await.unwrap();
        store.set_current("hello", "1.0").await.unwrap();
        store.stage("hello", "2.0", &archive_path).await.unwrap();

        let versions = store.published_versions("hello").await.unwrap();
        assert_eq!(versions, vec!["1.0".to_string()]);
    }

    #[tokio::test]
    async fn published_versions_absent_package_is_empty() {
        let temp = tempfile::tempdir().unwrap();
        let store = Store::new(temp.path().join("store"));
        let versions = store.published_versions("ghost").await.unwrap();
        assert!(versions.is_empty());
    }
}
