//! Read-only operations that never acquire the lock (spec §5):
//! `search`, `info`, `list`, `deps`, `refresh`.

use crate::context::OpsCtx;
use crate::types::{ListEntry, PackageInfoReport, SearchEntry};
use spm_errors::Error;
use spm_state::Journal;
use spm_types::{Index, PackageSpec, Requirement};
use std::collections::BTreeMap;

/// Fetch the index from the remote URL and atomically replace the
/// local cache (spec §6).
///
/// # Errors
///
/// Propagates network and parse errors.
pub async fn refresh(ctx: &OpsCtx) -> Result<Index, Error> {
    ctx.index_store.refresh(&ctx.net).await
}

/// Case-insensitive substring match over package name and description.
///
/// # Errors
///
/// Propagates index load errors.
pub async fn search(ctx: &OpsCtx, query: &str) -> Result<Vec<SearchEntry>, Error> {
    let index = ctx.index_store.load().await?;
    let query = query.to_ascii_lowercase();

    Ok(index
        .packages
        .iter()
        .filter(|(name, entry)| {
            name.to_ascii_lowercase().contains(&query)
                || entry.description.to_ascii_lowercase().contains(&query)
        })
        .map(|(name, entry)| SearchEntry {
            package: name.clone(),
            description: entry.description.clone(),
        })
        .collect())
}

/// # Errors
///
/// Returns [`Error::PackageNotFound`] if `package` is absent from the
/// index.
pub async fn info(ctx: &OpsCtx, package: &str) -> Result<PackageInfoReport, Error> {
    let index = ctx.index_store.load().await?;
    let entry = index
        .get(package)
        .ok_or_else(|| Error::PackageNotFound(package.to_string()))?;

    let journal = Journal::load(&ctx.config.journal_path()).await?;
    let installed_versions = journal
        .installed_versions(package)
        .into_iter()
        .map(|(v, _)| v.to_string())
        .collect();
    let current_version = ctx.store.current_version(package).await;

    Ok(PackageInfoReport {
        package: package.to_string(),
        author: entry.author.clone(),
        license: entry.license.clone(),
        description: entry.description.clone(),
        available_versions: entry.versions.iter().map(|v| v.version.to_string()).collect(),
        installed_versions,
        current_version,
    })
}

/// Every installed `(package, version)`, flagging which is `current`
/// and which is pinned.
///
/// # Errors
///
/// Propagates journal load errors.
pub async fn list(ctx: &OpsCtx) -> Result<Vec<ListEntry>, Error> {
    let journal = Journal::load(&ctx.config.journal_path()).await?;
    let mut entries = Vec::new();

    for package in journal.packages() {
        let current = ctx.store.current_version(package).await;
        for (version, installed) in journal.installed_versions(package) {
            entries.push(ListEntry {
                package: package.to_string(),
                version: version.to_string(),
                current: current.as_deref() == Some(version),
                pinned: installed.pin,
            });
        }
    }
    Ok(entries)
}

/// The dependency constraint map of `spec`'s resolved version (the
/// explicit version if given, else the index maximum).
///
/// # Errors
///
/// [`Error::PackageNotFound`] / resolver's [`Error::Resolver`]
/// `NoSatisfyingVersion` variant if no version matches.
pub async fn deps(ctx: &OpsCtx, spec: &PackageSpec) -> Result<BTreeMap<String, String>, Error> {
    let index = ctx.index_store.load().await?;
    let entry = index
        .get(&spec.name)
        .ok_or_else(|| Error::PackageNotFound(spec.name.clone()))?;

    let requirement = match &spec.version {
        Some(v) => Requirement::Exact(v.clone()),
        None => Requirement::Any,
    };

    let record = entry
        .satisfying(&requirement)
        .max_by(|a, b| a.version.cmp(&b.version))
        .ok_or_else(|| spm_errors::ResolverError::NoSatisfyingVersion {
            package: spec.name.clone(),
            requirement: requirement.to_string(),
        })?;

    Ok(record.depends.clone())
}
