//! Install protocol (spec §4.7).

use crate::context::OpsCtx;
use crate::types::{InstallOutcome, InstallReport};
use spm_errors::Error;
use spm_events::{Event, EventEmitter};
use spm_index::IndexStore;
use spm_lock::LockManager;
use spm_resolver::Plan;
use spm_state::Journal;
use spm_types::{Index, PackageSpec, Requirement, Version, MANIFEST_RELATIVE_PATH};
use std::collections::BTreeMap;

/// Synthetic package name used to resolve several command-line specs in
/// one pass, so conflicting requirements on a shared dependency are
/// caught the same way spec §8 scenario 2 describes (spec §4.2's
/// resolver only takes a single root; this builds one on the fly).
const SYNTHETIC_ROOT: &str = "\0spm-install-root";

/// Resolve an install plan covering every entry in `specs` at once.
///
/// # Errors
///
/// Propagates [`spm_resolver`] errors (cycle, conflict, unsatisfiable
/// requirement, unknown package).
pub fn resolve_plan(index: &Index, specs: &[PackageSpec]) -> Result<Plan, Error> {
    let mut depends = BTreeMap::new();
    for spec in specs {
        let requirement = match &spec.version {
            Some(v) => format!("={v}"),
            None => String::new(),
        };
        depends.insert(spec.name.clone(), requirement);
    }

    let mut scratch = index.clone();
    scratch.packages.insert(
        SYNTHETIC_ROOT.to_string(),
        spm_types::PackageEntry {
            author: String::new(),
            license: String::new(),
            description: String::new(),
            versions: vec![spm_types::VersionRecord {
                version: Version::new("0"),
                url: String::new(),
                sha256: None,
                depends,
            }],
        },
    );

    let plan = spm_resolver::resolve(&scratch, SYNTHETIC_ROOT, &Requirement::Any)?;
    Ok(plan
        .into_iter()
        .filter(|(name, _)| name != SYNTHETIC_ROOT)
        .collect())
}

/// Acquire the lock, resolve `specs`, install every step of the plan
/// that is not already installed, and save the journal (spec §4.7
/// steps 1–6).
///
/// # Errors
///
/// Returns [`spm_errors::Error::LockHeld`] if another operation holds
/// the lock, resolver errors if `specs` cannot be resolved, and any
/// error from steps 4b–4j otherwise. On failure the journal is not
/// saved and at most a stray `.tmp` staging directory is left behind.
pub async fn install(ctx: &OpsCtx, specs: &[PackageSpec]) -> Result<InstallReport, Error> {
    let _guard = LockManager::new(ctx.config.lock_path()).acquire()?;

    let index = ctx.index_store.load().await?;
    let mut journal = Journal::load(&ctx.config.journal_path()).await?;

    let plan = resolve_plan(&index, specs)?;
    let report = install_plan(ctx, &index, &mut journal, &plan).await?;

    journal.save_atomic(&ctx.config.journal_path()).await?;
    Ok(report)
}

/// Install every step of an already-resolved plan, assuming the caller
/// holds the lock and owns `journal` for the duration (used directly by
/// `update`, which installs and removes within one locked region).
///
/// # Errors
///
/// See [`install`].
pub async fn install_plan(
    ctx: &OpsCtx,
    index: &Index,
    journal: &mut Journal,
    plan: &Plan,
) -> Result<InstallReport, Error> {
    let mut outcomes = Vec::new();

    for (package, version) in plan {
        if journal.contains(package, version.as_str())
            && ctx.store.has_version(package, version.as_str()).await
        {
            ctx.events.emit(Event::InstallSkipped {
                package: package.clone(),
                version: version.to_string(),
            });
            outcomes.push(InstallOutcome {
                package: package.clone(),
                version: version.to_string(),
                skipped: true,
            });
            continue;
        }

        install_one(ctx, index, journal, package, version).await?;
        ctx.events.emit(Event::InstallFinished {
            package: package.clone(),
            version: version.to_string(),
        });
        outcomes.push(InstallOutcome {
            package: package.clone(),
            version: version.to_string(),
            skipped: false,
        });
    }

    Ok(InstallReport { installed: outcomes })
}

async fn install_one(
    ctx: &OpsCtx,
    index: &Index,
    journal: &mut Journal,
    package: &str,
    version: &Version,
) -> Result<(), Error> {
    let entry = index
        .get(package)
        .ok_or_else(|| Error::PackageNotFound(package.to_string()))?;
    let record = entry.find(version).ok_or_else(|| spm_errors::Error::VersionNotFound {
        package: package.to_string(),
        version: version.to_string(),
    })?;

    ctx.events
        .emit_phase(format!("installing {package}={version}"));

    let cache_dir = ctx.config.cache_path();
    tokio::fs::create_dir_all(&cache_dir).await?;
    let archive_path = cache_dir.join(format!("{package}-{version}.archive"));

    if !tokio::fs::try_exists(&archive_path).await.unwrap_or(false) {
        spm_net::download_to_file(&ctx.net, &record.url, &archive_path, ctx.events.as_ref())
            .await
            .map_err(|e| wrap_download_error(package, version, e))?;
    }

    if let Some(expected) = &record.sha256 {
        if let Err(e) = spm_hash::verify_file(&archive_path, expected).await {
            let _ = tokio::fs::remove_file(&archive_path).await;
            return Err(e);
        }
    }

    let staging = ctx.store.stage(package, version.as_str(), &archive_path).await?;
    let manifest = spm_manifest::load_file(&staging.join(MANIFEST_RELATIVE_PATH)).await?;

    spm_sandbox::run_install(
        &ctx.config.sandbox_helper(),
        &staging,
        &manifest.sandbox,
        &manifest.install,
        ctx.events.as_ref(),
    )
    .await?;

    ctx.store.publish(package, version.as_str()).await?;
    ctx.store.set_current(package, version.as_str()).await?;

    for binary in &manifest.binaries {
        write_launcher(&ctx.config.bin_dir(), package, binary).await?;
    }

    journal.record(package, version.as_str(), record.sha256.as_deref(), false);
    Ok(())
}

fn wrap_download_error(package: &str, version: &Version, e: Error) -> Error {
    tracing::warn!(package, %version, "download failed: {e}");
    e
}

/// Write a launcher script at `<bin_dir>/<binary>` that re-enters the
/// engine's `run` path (spec §4.7 step i, §9 open question 3: shared
/// across packages, last-writer-wins, undetected).
async fn write_launcher(bin_dir: &std::path::Path, package: &str, binary: &str) -> Result<(), Error> {
    tokio::fs::create_dir_all(bin_dir).await?;
    let path = bin_dir.join(binary);
    let body = format!("#!/bin/sh\nexec spm run {package} {binary} \"$@\"\n");
    tokio::fs::write(&path, body).await.map_err(|e| {
        spm_errors::StorageError::PermissionError(format!("{}: {e}", path.display())).into()
    })?;
    set_executable(&path).await
}

#[cfg(unix)]
async fn set_executable(path: &std::path::Path) -> Result<(), Error> {
    use std::os::unix::fs::PermissionsExt;
    let mut perms = tokio::fs::metadata(path).await?.permissions();
    perms.set_mode(perms.mode() | 0o755);
    tokio::fs::set_permissions(path, perms)
        .await
        .map_err(|e| spm_errors::StorageError::PermissionError(e.to_string()).into())
}

#[cfg(not(unix))]
async fn set_executable(_path: &std::path::Path) -> Result<(), Error> {
    Ok(())
}

/// Exposed so `update` can look at the freshly loaded index without
/// each call site re-reading the [`IndexStore`] separately.
pub async fn load_index(index_store: &IndexStore) -> Result<Index, Error> {
    index_store.load().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use spm_types::{PackageEntry, VersionRecord};

    fn sample_index() -> Index {
        let mut index = Index::default();
        index.packages.insert(
            "a".to_string(),
            PackageEntry {
                author: "x".into(),
                license: "MIT".into(),
                description: String::new(),
                versions: vec![VersionRecord {
                    version: Version::new("1.0"),
                    url: String::new(),
                    sha256: None,
                    depends: BTreeMap::from([("c".to_string(), ">=1.0".to_string())]),
                }],
            },
        );
        index.packages.insert(
            "b".to_string(),
            PackageEntry {
                author: "x".into(),
                license: "MIT".into(),
                description: String::new(),
                versions: vec![VersionRecord {
                    version: Version::new("1.0"),
                    url: String::new(),
                    sha256: None,
                    depends: BTreeMap::from([("c".to_string(), "=1.0".to_string())]),
                }],
            },
        );
        index.packages.insert(
            "c".to_string(),
            PackageEntry {
                author: "x".into(),
                license: "MIT".into(),
                description: String::new(),
                versions: vec![
                    VersionRecord {
                        version: Version::new("1.0"),
                        url: String::new(),
                        sha256: None,
                        depends: BTreeMap::new(),
                    },
                    VersionRecord {
                        version: Version::new("1.1"),
                        url: String::new(),
                        sha256: None,
                        depends: BTreeMap::new(),
                    },
                ],
            },
        );
        index
    }

    #[test]
    fn resolves_single_spec() {
        let mut index = Index::default();
        index.packages.insert(
            "foo".to_string(),
            PackageEntry {
                author: "a".into(),
                license: "MIT".into(),
                description: String::new(),
                versions: vec![VersionRecord {
                    version: Version::new("1.0"),
                    url: String::new(),
                    sha256: None,
                    depends: BTreeMap::new(),
                }],
            },
        );
        let plan = resolve_plan(&index, &[PackageSpec::parse("foo")]).unwrap();
        assert_eq!(plan, vec![("foo".to_string(), Version::new("1.0"))]);
    }

    #[test]
    fn combined_spec_conflict_is_detected() {
        let index = sample_index();
        let err = resolve_plan(&index, &[PackageSpec::parse("a"), PackageSpec::parse("b")])
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Resolver(spm_errors::ResolverError::VersionConflict { .. })
        ));
    }
}
