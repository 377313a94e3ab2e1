//! Remove protocol (spec §4.8).

use crate::context::OpsCtx;
use crate::types::RemoveReport;
use spm_errors::Error;
use spm_lock::LockManager;
use spm_state::Journal;
use spm_types::{PackageSpec, MANIFEST_RELATIVE_PATH};
use std::collections::HashSet;

/// Acquire the lock, remove every targeted version of `spec`, and save
/// the journal.
///
/// # Errors
///
/// Returns [`Error::PackageNotInstalled`] if `spec.name` has no journal
/// entry, [`Error::VersionNotFound`] if an explicit version was given
/// but is not recorded, and propagates I/O errors from the removal.
pub async fn remove(ctx: &OpsCtx, spec: &PackageSpec) -> Result<RemoveReport, Error> {
    let _guard = LockManager::new(ctx.config.lock_path()).acquire()?;
    let mut journal = Journal::load(&ctx.config.journal_path()).await?;

    let targets = target_versions(&journal, spec)?;
    let report = remove_versions(ctx, &mut journal, &spec.name, &targets).await?;

    journal.save_atomic(&ctx.config.journal_path()).await?;
    Ok(report)
}

/// Resolve which versions a `remove` call should target: the single
/// supplied version, if any, verified as recorded; otherwise every
/// version the journal has for the package (spec §4.8 step 3).
///
/// # Errors
///
/// [`Error::PackageNotInstalled`] / [`Error::VersionNotFound`].
pub fn target_versions(journal: &Journal, spec: &PackageSpec) -> Result<Vec<String>, Error> {
    if journal.installed_versions(&spec.name).is_empty() {
        return Err(Error::PackageNotInstalled(spec.name.clone()));
    }

    match &spec.version {
        Some(version) => {
            if journal.contains(&spec.name, version.as_str()) {
                Ok(vec![version.to_string()])
            } else {
                Err(Error::VersionNotFound {
                    package: spec.name.clone(),
                    version: version.to_string(),
                })
            }
        }
        None => Ok(journal
            .installed_versions(&spec.name)
            .into_iter()
            .map(|(v, _)| v.to_string())
            .collect()),
    }
}

/// Remove `targets` of `package`, assuming the caller holds the lock
/// and owns `journal` for the duration (also used by `update`, which
/// removes the superseded version within the same locked region as the
/// install that replaces it).
///
/// # Errors
///
/// Propagates I/O errors from the sandbox remove helper and the store.
pub async fn remove_versions(
    ctx: &OpsCtx,
    journal: &mut Journal,
    package: &str,
    targets: &[String],
) -> Result<RemoveReport, Error> {
    ctx.events.emit_phase(format!("removing {package}"));

    let mut candidate_binaries: HashSet<String> = HashSet::new();
    for version in targets {
        if let Ok(manifest) = load_version_manifest(ctx, package, version).await {
            candidate_binaries.extend(manifest.binaries);
        }
        ctx.store.remove_version(package, version).await?;
        journal.forget(package, version);
    }

    let survivors = surviving_binaries(ctx, journal).await;
    for binary in &candidate_binaries {
        if !survivors.contains(binary) {
            remove_launcher(&ctx.config.bin_dir(), binary).await?;
        }
    }

    if journal.installed_versions(package).is_empty() {
        let _ = tokio::fs::remove_dir_all(ctx.store.package_dir(package)).await;
    }

    Ok(RemoveReport {
        package: package.to_string(),
        removed_versions: targets.to_vec(),
    })
}

async fn load_version_manifest(
    ctx: &OpsCtx,
    package: &str,
    version: &str,
) -> Result<spm_types::Manifest, Error> {
    let path = ctx.store.version_dir(package, version).join(MANIFEST_RELATIVE_PATH);
    spm_manifest::load_file(&path).await
}

/// Every binary name still declared by a remaining journal entry, used
/// to decide which launcher scripts a removal should take down with it
/// (spec §3 lifecycle: "removed when the last version declaring the
/// binary is removed").
async fn surviving_binaries(ctx: &OpsCtx, journal: &Journal) -> HashSet<String> {
    let mut survivors = HashSet::new();
    for package in journal.packages().map(str::to_string).collect::<Vec<_>>() {
        for (version, _) in journal.installed_versions(&package) {
            if let Ok(manifest) = load_version_manifest(ctx, &package, version).await {
                survivors.extend(manifest.binaries);
            }
        }
    }
    survivors
}

use spm_events::EventEmitter;

async fn remove_launcher(bin_dir: &std::path::Path, binary: &str) -> Result<(), Error> {
    let path = bin_dir.join(binary);
    if tokio::fs::try_exists(&path).await.unwrap_or(false) {
        tokio::fs::remove_file(&path).await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_versions_unknown_package_fails() {
        let journal = Journal::default();
        let err = target_versions(&journal, &PackageSpec::parse("foo")).unwrap_err();
        assert!(matches!(err, Error::PackageNotInstalled(_)));
    }

    #[test]
    fn target_versions_unknown_version_fails() {
        let mut journal = Journal::default();
        journal.record("foo", "1.0", None, false);
        let err = target_versions(&journal, &PackageSpec::parse("foo=2.0")).unwrap_err();
        assert!(matches!(err, Error::VersionNotFound { .. }));
    }

    #[test]
    fn target_versions_defaults_to_all_recorded() {
        let mut journal = Journal::default();
        journal.record("foo", "1.0", None, false);
        journal.record("foo", "1.1", None, false);
        let targets = target_versions(&journal, &PackageSpec::parse("foo")).unwrap();
        assert_eq!(targets.len(), 2);
    }
}
