//! `switch` (spec §4.9): the only operation that repoints `current`
//! outside of `install` itself (spec §9 open question 2).

use crate::context::OpsCtx;
use spm_errors::Error;
use spm_lock::LockManager;
use spm_state::Journal;

/// Repoint `package`'s `current` link at `version`, which must already
/// be recorded in the journal.
///
/// # Errors
///
/// Returns [`Error::VersionNotFound`] if `version` is not installed for
/// `package`.
pub async fn switch(ctx: &OpsCtx, package: &str, version: &str) -> Result<(), Error> {
    let _guard = LockManager::new(ctx.config.lock_path()).acquire()?;
    let journal = Journal::load(&ctx.config.journal_path()).await?;

    if !journal.contains(package, version) {
        return Err(Error::VersionNotFound {
            package: package.to_string(),
            version: version.to_string(),
        });
    }

    ctx.store.set_current(package, version).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use spm_config::Config;

    #[tokio::test]
    async fn switch_to_unknown_version_fails() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.paths.journal_path = Some(dir.path().join("journal.toml"));
        config.paths.store_path = Some(dir.path().join("store"));
        config.paths.lock_path = Some(dir.path().join("lock"));
        let ctx = OpsCtx::new(config, None).unwrap();

        let err = switch(&ctx, "foo", "9.9").await.unwrap_err();
        assert!(matches!(err, Error::VersionNotFound { .. }));
    }
}
