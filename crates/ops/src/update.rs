//! `update`, `pin`, `unpin`, and `outdated` (spec §4.9).

use crate::context::OpsCtx;
use crate::install::install_plan;
use crate::remove::remove_versions;
use crate::types::{OutdatedEntry, UpdateReport};
use spm_errors::Error;
use spm_lock::LockManager;
use spm_state::Journal;
use spm_types::Index;

/// For every package the journal knows about, upgrade its `current`
/// version to the index maximum if it is strictly newer and the
/// current version is not pinned (spec §4.9 "update").
///
/// # Errors
///
/// Propagates resolver/install/remove errors from the inner steps. A
/// failure mid-loop leaves already-updated packages updated; the
/// journal is only saved once, after every package has been visited.
pub async fn update(ctx: &OpsCtx) -> Result<UpdateReport, Error> {
    let _guard = LockManager::new(ctx.config.lock_path()).acquire()?;
    let index = ctx.index_store.load().await?;
    let mut journal = Journal::load(&ctx.config.journal_path()).await?;

    let mut report = UpdateReport::default();

    for package in journal.packages().map(str::to_string).collect::<Vec<_>>() {
        let Some(current) = ctx.store.current_version(&package).await else {
            report.unchanged += 1;
            continue;
        };
        let Some(max_record) = max_available(&index, &package) else {
            report.unchanged += 1;
            continue;
        };

        let pinned = journal
            .get(&package, &current)
            .is_some_and(|entry| entry.pin);
        let current_version = spm_types::Version::new(current.clone());

        if pinned || max_record.version <= current_version {
            report.unchanged += 1;
            continue;
        }

        remove_versions(ctx, &mut journal, &package, &[current.clone()]).await?;
        let plan = vec![(package.clone(), max_record.version.clone())];
        install_plan(ctx, &index, &mut journal, &plan).await?;

        report
            .updated
            .push((package, current, max_record.version.to_string()));
    }

    journal.save_atomic(&ctx.config.journal_path()).await?;
    Ok(report)
}

fn max_available<'a>(index: &'a Index, package: &str) -> Option<&'a spm_types::VersionRecord> {
    index
        .get(package)?
        .versions
        .iter()
        .max_by(|a, b| a.version.cmp(&b.version))
}

/// Set the pin flag on an explicit `(package, version)` pair.
///
/// # Errors
///
/// Returns [`Error::VersionNotFound`] if the pair is not recorded.
pub async fn pin(ctx: &OpsCtx, package: &str, version: &str) -> Result<(), Error> {
    let _guard = LockManager::new(ctx.config.lock_path()).acquire()?;
    let mut journal = Journal::load(&ctx.config.journal_path()).await?;
    journal.set_pin(package, version, true)?;
    journal.save_atomic(&ctx.config.journal_path()).await
}

/// Clear the pin flag on `package`'s currently published version.
///
/// # Errors
///
/// Returns [`Error::PackageNotInstalled`] if `package` has no `current`
/// link.
pub async fn unpin(ctx: &OpsCtx, package: &str) -> Result<(), Error> {
    let _guard = LockManager::new(ctx.config.lock_path()).acquire()?;
    let mut journal = Journal::load(&ctx.config.journal_path()).await?;

    let current = ctx
        .store
        .current_version(package)
        .await
        .ok_or_else(|| Error::PackageNotInstalled(package.to_string()))?;

    journal.set_pin(package, &current, false)?;
    journal.save_atomic(&ctx.config.journal_path()).await
}

/// Read-only diff of journal current versions vs index maxima; takes no
/// lock (spec §5: readers do not acquire the lock).
///
/// # Errors
///
/// Propagates index/journal load errors.
pub async fn outdated(ctx: &OpsCtx) -> Result<Vec<OutdatedEntry>, Error> {
    let index = ctx.index_store.load().await?;
    let journal = Journal::load(&ctx.config.journal_path()).await?;

    let mut entries = Vec::new();
    for package in journal.packages() {
        let Some(current) = ctx.store.current_version(package).await else {
            continue;
        };
        let Some(max_record) = max_available(&index, package) else {
            continue;
        };
        if max_record.version > spm_types::Version::new(current.clone()) {
            entries.push(OutdatedEntry {
                package: package.to_string(),
                current,
                latest: max_record.version.to_string(),
            });
        }
    }
    Ok(entries)
}
