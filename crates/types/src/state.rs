//! State journal record types (spec §3 "State Journal", §4.5).

use serde::{Deserialize, Serialize};

/// Sentinel recorded when a version was published without a digest
/// (spec §4.5: "the sentinel `none`").
pub const NO_DIGEST: &str = "none";

/// One installed `(package, version)` entry in the journal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstalledEntry {
    pub digest: String,
    /// Unix timestamp (seconds) of the install.
    pub installed_at: i64,
    #[serde(default)]
    pub pin: bool,
}
