//! Report types returned by operations, rendered by the CLI front-end
//! either as plain text or (with `--json`) as serialized structures.

use serde::Serialize;

/// One package's outcome within an `install` call.
#[derive(Debug, Clone, Serialize)]
pub struct InstallOutcome {
    pub package: String,
    pub version: String,
    pub skipped: bool,
}

#[derive(Debug, Clone, Serialize, Default)]
pub struct InstallReport {
    pub installed: Vec<InstallOutcome>,
}

#[derive(Debug, Clone, Serialize, Default)]
pub struct RemoveReport {
    pub package: String,
    pub removed_versions: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Default)]
pub struct UpdateReport {
    pub updated: Vec<(String, String, String)>,
    pub unchanged: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct OutdatedEntry {
    pub package: String,
    pub current: String,
    pub latest: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ListEntry {
    pub package: String,
    pub version: String,
    pub current: bool,
    pub pinned: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchEntry {
    pub package: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PackageInfoReport {
    pub package: String,
    pub author: String,
    pub license: String,
    pub description: String,
    pub available_versions: Vec<String>,
    pub installed_versions: Vec<String>,
    pub current_version: Option<String>,
}
