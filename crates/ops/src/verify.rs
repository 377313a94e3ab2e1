//! `verify` (spec §4.9): recompute a published artifact's manifest
//! digest and compare it against the journal's recorded digest. Purely
//! read-only, so no lock is taken (spec §5).

use crate::context::OpsCtx;
use spm_errors::Error;
use spm_state::Journal;
use spm_types::{NO_DIGEST, MANIFEST_RELATIVE_PATH};

/// # Errors
///
/// [`Error::PackageNotInstalled`] if `package` has no `current` link;
/// [`Error::VerificationFailed`] if the recomputed digest does not
/// match the journal's recorded digest (comparison is skipped, and
/// verification trivially passes, for the [`NO_DIGEST`] sentinel).
pub async fn verify(ctx: &OpsCtx, package: &str) -> Result<(), Error> {
    let current = ctx
        .store
        .current_version(package)
        .await
        .ok_or_else(|| Error::PackageNotInstalled(package.to_string()))?;

    let journal = Journal::load(&ctx.config.journal_path()).await?;
    let entry = journal
        .get(package, &current)
        .ok_or_else(|| Error::VersionNotFound {
            package: package.to_string(),
            version: current.clone(),
        })?;

    if entry.digest == NO_DIGEST {
        return Ok(());
    }

    let manifest_path = ctx
        .store
        .version_dir(package, &current)
        .join(MANIFEST_RELATIVE_PATH);
    let actual = spm_hash::digest_file(&manifest_path).await?;

    if actual.eq_ignore_ascii_case(&entry.digest) {
        Ok(())
    } else {
        Err(Error::VerificationFailed {
            package: package.to_string(),
            version: current,
        })
    }
}
