//! Package manifest data model (spec §3 "Package Manifest", §6).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The sandbox profile embedded in a manifest, controlling the namespace
/// bindings and shares used for install and run (spec §4.4).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SandboxProfile {
    #[serde(default)]
    pub network: bool,
    #[serde(default)]
    pub graphical: bool,
    #[serde(default)]
    pub device: bool,
    #[serde(default)]
    pub extra_paths: Vec<String>,
}

/// The fixed relative path of the manifest inside every artifact.
pub const MANIFEST_RELATIVE_PATH: &str = "manifest.pkg";

/// A parsed package manifest (spec §3, §6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    pub name: String,
    pub version: String,
    pub authors: String,
    pub license: String,
    pub summary: String,
    #[serde(default)]
    pub long_description: String,
    #[serde(default)]
    pub depends: BTreeMap<String, String>,
    #[serde(default)]
    pub binaries: Vec<String>,
    #[serde(default)]
    pub sandbox: SandboxProfile,
    #[serde(default)]
    pub install: Vec<String>,
}
