#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! The Integrity Service (spec §4.3): streams a file through SHA-256 in
//! bounded-size chunks and produces a lowercase hex digest, plus a
//! convenience verifier against an expected digest.

use sha2::{Digest, Sha256};
use spm_errors::{Error, StorageError};
use std::path::Path;
use tokio::fs::File;
use tokio::io::AsyncReadExt;

/// Chunk size for streaming hash computation; bounds memory use on large
/// artifacts (spec §4.3: "bounded-size chunks").
const CHUNK_SIZE: usize = 64 * 1024;

/// Stream `path` through SHA-256 and return the lowercase hex digest.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or read.
pub async fn digest_file(path: &Path) -> Result<String, Error> {
    let mut file = File::open(path)
        .await
        .map_err(|_| StorageError::PathNotFound(path.display().to_string()))?;

    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; CHUNK_SIZE];

    loop {
        let n = file.read(&mut buffer).await?;
        if n == 0 {
            break;
        }
        hasher.update(&buffer[..n]);
    }

    Ok(hex::encode(hasher.finalize()))
}

/// Verify that `path` hashes to `expected` (lowercase hex SHA-256).
///
/// # Errors
///
/// Returns [`StorageError::ChecksumMismatch`] if the digests differ, or
/// any error `digest_file` can return.
pub async fn verify_file(path: &Path, expected: &str) -> Result<(), Error> {
    let actual = digest_file(path).await?;
    if actual.eq_ignore_ascii_case(expected) {
        Ok(())
    } else {
        Err(StorageError::ChecksumMismatch {
            expected: expected.to_string(),
            actual,
        }
        .into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncWriteExt;

    #[tokio::test]
    async fn digest_matches_known_vector() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty");
        File::create(&path).await.unwrap();

        let digest = digest_file(&path).await.unwrap();
        assert_eq!(
            digest,
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[tokio::test]
    async fn verify_rejects_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data");
        let mut f = File::create(&path).await.unwrap();
        f.write_all(b"hello world").await.unwrap();
        f.flush().await.unwrap();

        let err = verify_file(&path, "0000").await.unwrap_err();
        assert!(matches!(
            err,
            spm_errors::Error::Storage(spm_errors::StorageError::ChecksumMismatch { .. })
        ));
    }

    #[tokio::test]
    async fn verify_accepts_match() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data");
        let mut f = File::create(&path).await.unwrap();
        f.write_all(b"hello world").await.unwrap();
        f.flush().await.unwrap();

        let digest = digest_file(&path).await.unwrap();
        verify_file(&path, &digest).await.unwrap();
    }
}
