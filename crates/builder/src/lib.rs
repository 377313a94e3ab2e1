#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Packages a local working tree into an installable artifact archive
//! (spec §4.9 "build(name)").
//!
//! The working directory must contain the three conventional inputs
//! spec §4.9 names, with a concrete layout (the spec leaves the exact
//! filesystem convention unspecified, so this fixes one):
//!
//! ```text
//! ./manifest.pkg   the package manifest (spec §3/§6)
//! ./bin/<name>     one launcher template per manifest binary name
//! ./payload/       the rest of the artifact's file tree
//! ```
//!
//! `bin/*` and `payload/*` are merged into the artifact root (alongside
//! the manifest, at the same relative layout the store later unpacks),
//! then the whole tree is archived with [`spm_store::create`].

use spm_errors::Error;
use spm_types::MANIFEST_RELATIVE_PATH;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Build `<name>.archive` from the conventional inputs found in `source_dir`,
/// writing it to `output_dir` (or `source_dir` if `output_dir` is `None`).
///
/// # Errors
///
/// Returns [`Error::InvalidArguments`] if any of the three conventional
/// inputs is missing, if the manifest fails to parse, or if a declared
/// binary has no matching launcher template. Propagates I/O and
/// archive-creation errors otherwise.
pub async fn build(name: &str, source_dir: &Path, output_dir: Option<&Path>) -> Result<PathBuf, Error> {
    let manifest_path = source_dir.join(MANIFEST_RELATIVE_PATH);
    let bin_dir = source_dir.join("bin");
    let payload_dir = source_dir.join("payload");

    require_exists(&manifest_path, "manifest.pkg")?;
    require_exists(&bin_dir, "bin/")?;
    require_exists(&payload_dir, "payload/")?;

    let manifest = spm_manifest::load_file(&manifest_path).await?;
    info!(package = %manifest.name, version = %manifest.version, "building archive");

    let staging = tempfile::tempdir().map_err(Error::from)?;
    let staging_path = staging.path();

    tokio::fs::copy(&manifest_path, staging_path.join(MANIFEST_RELATIVE_PATH)).await?;

    for binary in &manifest.binaries {
        let template = bin_dir.join(binary);
        if !template.exists() {
            return Err(Error::InvalidArguments(format!(
                "manifest declares binary `{binary}` but bin/{binary} is missing"
            )));
        }
        let dest = staging_path.join(binary);
        tokio::fs::copy(&template, &dest).await?;
        set_executable(&dest).await?;
    }

    copy_tree(&payload_dir, staging_path).await?;

    let output_dir = output_dir.unwrap_or(source_dir);
    tokio::fs::create_dir_all(output_dir).await?;
    let archive_path = output_dir.join(format!("{name}.archive"));

    spm_store::create(staging_path, &archive_path).await?;
    debug!(path = %archive_path.display(), "archive written");

    Ok(archive_path)
}

fn require_exists(path: &Path, label: &str) -> Result<(), Error> {
    if path.exists() {
        Ok(())
    } else {
        Err(Error::InvalidArguments(format!(
            "build requires {label} in the current directory (missing {})",
            path.display()
        )))
    }
}

#[cfg(unix)]
async fn set_executable(path: &Path) -> Result<(), Error> {
    use std::os::unix::fs::PermissionsExt;
    let mut perms = tokio::fs::metadata(path).await?.permissions();
    perms.set_mode(perms.mode() | 0o111);
    tokio::fs::set_permissions(path, perms).await?;
    Ok(())
}

#[cfg(not(unix))]
async fn set_executable(_path: &Path) -> Result<(), Error> {
    Ok(())
}

/// Recursively copy every entry under `src` into `dest`, merging with
/// whatever `dest` already contains (the manifest and launcher binaries
/// staged ahead of this call).
fn copy_tree<'a>(
    src: &'a Path,
    dest: &'a Path,
) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<(), Error>> + Send + 'a>> {
    Box::pin(async move {
        let mut entries = tokio::fs::read_dir(src).await?;
        while let Some(entry) = entries.next_entry().await? {
            let file_type = entry.file_type().await?;
            let dest_path = dest.join(entry.file_name());
            if file_type.is_dir() {
                tokio::fs::create_dir_all(&dest_path).await?;
                copy_tree(&entry.path(), &dest_path).await?;
            } else {
                tokio::fs::copy(entry.path(), &dest_path).await?;
            }
        }
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn write_manifest(dir: &Path) {
        tokio::fs::write(
            dir.join(MANIFEST_RELATIVE_PATH),
            r#"
[metadata]
name = hello
version = 1.0
authors = Jane Doe
license = MIT
binaries
  hello

[description]
summary = says hello

[specs]

[sandbox]
network = false
graphical = false
device = false

[install]
"#,
        )
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn builds_archive_from_conventional_layout() {
        let dir = tempfile::tempdir().unwrap();
        write_manifest(dir.path()).await;
        tokio::fs::create_dir_all(dir.path().join("bin")).await.unwrap();
        tokio::fs::write(dir.path().join("bin/hello"), b"#!/bin/sh\necho hi\n")
            .await
            .unwrap();
        tokio::fs::create_dir_all(dir.path().join("payload/share"))
            .await
            .unwrap();
        tokio::fs::write(dir.path().join("payload/share/readme"), b"hi")
            .await
            .unwrap();

        let archive = build("hello-1.0", dir.path(), None).await.unwrap();
        assert!(archive.exists());
        assert_eq!(archive.file_name().unwrap(), "hello-1.0.archive");
    }

    #[tokio::test]
    async fn missing_manifest_is_invalid_arguments() {
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::create_dir_all(dir.path().join("bin")).await.unwrap();
        tokio::fs::create_dir_all(dir.path().join("payload")).await.unwrap();

        let err = build("hello", dir.path(), None).await.unwrap_err();
        assert!(matches!(err, Error::InvalidArguments(_)));
    }

    #[tokio::test]
    async fn missing_declared_binary_is_invalid_arguments() {
        let dir = tempfile::tempdir().unwrap();
        write_manifest(dir.path()).await;
        tokio::fs::create_dir_all(dir.path().join("bin")).await.unwrap();
        tokio::fs::create_dir_all(dir.path().join("payload")).await.unwrap();

        let err = build("hello", dir.path(), None).await.unwrap_err();
        assert!(matches!(err, Error::InvalidArguments(_)));
    }
}
