#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! The Index Store (spec §4 item 3): loads, caches, and queries the
//! remote package index. Read-only during operations (spec §3
//! "Ownership").

use spm_errors::{Error, NetworkError};
use spm_net::NetClient;
use spm_types::Index;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::info;

/// An Index Store bound to a fixed cache path and remote URL.
pub struct IndexStore {
    cache_path: PathBuf,
    remote_url: String,
}

impl IndexStore {
    #[must_use]
    pub fn new(cache_path: PathBuf, remote_url: String) -> Self {
        Self {
            cache_path,
            remote_url,
        }
    }

    /// Load the cached index from disk without touching the network. An
    /// absent cache file yields an empty index.
    ///
    /// # Errors
    ///
    /// Returns an error if the cache file exists but cannot be parsed.
    pub async fn load(&self) -> Result<Index, Error> {
        match fs::read_to_string(&self.cache_path).await {
            Ok(contents) => {
                let index: Index = toml::from_str(&contents)
                    .map_err(|e| NetworkError::IndexParseFailed(e.to_string()))?;
                Ok(index)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Index::default()),
            Err(e) => Err(e.into()),
        }
    }

    /// Refresh the cached index from the remote URL, replacing it
    /// atomically (spec §6: "atomically replaced on refresh").
    ///
    /// # Errors
    ///
    /// Returns an error on fetch, parse, or write failure.
    pub async fn refresh(&self, client: &NetClient) -> Result<Index, Error> {
        let text = spm_net::fetch_index_text(client, &self.remote_url).await?;
        let index: Index =
            toml::from_str(&text).map_err(|e| NetworkError::IndexParseFailed(e.to_string()))?;

        if let Some(parent) = self.cache_path.parent() {
            fs::create_dir_all(parent).await?;
        }
        let tmp_path = self.cache_path.with_extension("tmp");
        fs::write(&tmp_path, &text).await?;
        fs::rename(&tmp_path, &self.cache_path).await?;
        info!(packages = index.packages.len(), "refreshed package index");

        Ok(index)
    }

    #[must_use]
    pub fn cache_path(&self) -> &Path {
        &self.cache_path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_cache_yields_empty_index() {
        let dir = tempfile::tempdir().unwrap();
        let store = IndexStore::new(dir.path().join("index.toml"), "https://example.invalid".into());
        let index = store.load().await.unwrap();
        assert!(index.packages.is_empty());
    }

    #[tokio::test]
    async fn round_trips_written_cache() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index.toml");
        tokio::fs::write(
            &path,
            r#"
            [foo]
            author = "a"
            license = "MIT"
            description = "d"

            [[foo.versions]]
            version = "1.0"
            url = "https://example.invalid/foo-1.0.archive"
            "#,
        )
        .await
        .unwrap();

        let store = IndexStore::new(path, "https://example.invalid".into());
        let index = store.load().await.unwrap();
        assert!(index.get("foo").is_some());
    }
}
