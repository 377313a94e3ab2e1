//! Gzip-compressed tar archive handling for artifacts (spec §6:
//! "compressed tar-style container").

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use spm_errors::{Error, StorageError};
use std::path::{Component, Path};
use tar::Archive;

/// Extract `archive_path` into `dest`, rejecting entries that attempt
/// path traversal outside of `dest`.
///
/// # Errors
///
/// Returns [`StorageError::ExtractionFailed`] on malformed archives or
/// path-traversal attempts; propagates I/O errors otherwise.
pub async fn extract(archive_path: &Path, dest: &Path) -> Result<(), Error> {
    tokio::fs::create_dir_all(dest).await?;

    let archive_path = archive_path.to_path_buf();
    let dest = dest.to_path_buf();

    tokio::task::spawn_blocking(move || {
        let file = std::fs::File::open(&archive_path)
            .map_err(|e| StorageError::ExtractionFailed(e.to_string()))?;
        let decoder = GzDecoder::new(file);
        let mut archive = Archive::new(decoder);
        archive.set_preserve_permissions(true);
        archive.set_unpack_xattrs(false);

        for entry in archive
            .entries()
            .map_err(|e| StorageError::ExtractionFailed(e.to_string()))?
        {
            let mut entry = entry.map_err(|e| StorageError::ExtractionFailed(e.to_string()))?;
            let path = entry
                .path()
                .map_err(|e| StorageError::ExtractionFailed(e.to_string()))?;

            if path.components().any(|c| c == Component::ParentDir) {
                return Err(StorageError::ExtractionFailed(
                    "archive contains path traversal".to_string(),
                )
                .into());
            }

            entry
                .unpack_in(&dest)
                .map_err(|e| StorageError::ExtractionFailed(e.to_string()))?;
        }

        Ok::<(), Error>(())
    })
    .await
    .map_err(|e| Error::internal(format!("extraction task panicked: {e}")))??;

    Ok(())
}

/// Recursively archive `src` into a gzip-compressed tar at
/// `archive_path` (used by `spm build`, spec §4.9).
///
/// # Errors
///
/// Propagates I/O errors encountered while walking `src` or writing the
/// archive.
pub async fn create(src: &Path, archive_path: &Path) -> Result<(), Error> {
    if let Some(parent) = archive_path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    let src = src.to_path_buf();
    let archive_path = archive_path.to_path_buf();

    tokio::task::spawn_blocking(move || {
        let file = std::fs::File::create(&archive_path)?;
        let encoder = GzEncoder::new(file, Compression::default());
        let mut builder = tar::Builder::new(encoder);
        builder.mode(tar::HeaderMode::Deterministic);
        builder.follow_symlinks(false);
        builder.append_dir_all(".", &src)?;
        builder.finish()?;
        Ok::<(), Error>(())
    })
    .await
    .map_err(|e| Error::internal(format!("archive creation task panicked: {e}")))??;

    Ok(())
}
