//! Package index data model (spec §3 "Package Index").

use crate::version::{Requirement, Version};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single available version of a package, as published in the index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionRecord {
    pub version: Version,
    pub url: String,
    /// Lowercase hex SHA-256; absent means "no digest to verify against".
    #[serde(default)]
    pub sha256: Option<String>,
    /// Dependency constraint map: package name -> requirement string.
    #[serde(default)]
    pub depends: BTreeMap<String, String>,
}

impl VersionRecord {
    #[must_use]
    pub fn dependency_requirements(&self) -> Vec<(String, Requirement)> {
        self.depends
            .iter()
            .map(|(name, req)| (name.clone(), Requirement::from(req.as_str())))
            .collect()
    }
}

/// Everything the index knows about one package name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageEntry {
    pub author: String,
    pub license: String,
    pub description: String,
    pub versions: Vec<VersionRecord>,
}

impl PackageEntry {
    /// Versions satisfying `requirement`, in no particular order.
    #[must_use]
    pub fn satisfying<'a>(
        &'a self,
        requirement: &'a Requirement,
    ) -> impl Iterator<Item = &'a VersionRecord> + 'a {
        self.versions
            .iter()
            .filter(move |v| requirement.matches(&v.version))
    }

    /// Look up the version record whose version string exactly matches
    /// `version` (spec §3 invariant: version strings are unique within
    /// an entry) — an exact-string match, the same notion `=X`
    /// requirements use, not [`Version`]'s segment-wise equality.
    #[must_use]
    pub fn find(&self, version: &Version) -> Option<&VersionRecord> {
        self.versions
            .iter()
            .find(|v| v.version.as_str() == version.as_str())
    }
}

/// The full remote package index: name -> entry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Index {
    #[serde(flatten)]
    pub packages: BTreeMap<String, PackageEntry>,
}

impl Index {
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&PackageEntry> {
        self.packages.get(name)
    }
}
