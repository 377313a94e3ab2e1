//! Centralized, non-configurable filesystem paths (spec §7
//! "Well-known filesystem paths").
//!
//! Actual values are conventional, not normative, per the spec — they
//! are all overridable through [`crate::PathConfig`].

pub const PREFIX: &str = "/var/lib/spm";

pub const STORE_DIR: &str = "/var/lib/spm/store";
pub const CACHE_DIR: &str = "/var/lib/spm/cache";
pub const INDEX_CACHE_PATH: &str = "/var/lib/spm/index.toml";
pub const JOURNAL_PATH: &str = "/var/lib/spm/journal.toml";
pub const LOCK_PATH: &str = "/var/lib/spm/spm.lock";
pub const SANDBOX_HELPER: &str = "bwrap";
pub const DEFAULT_INDEX_URL: &str = "https://index.example.invalid/index.toml";

/// Directory launcher scripts are written into (spec §4.7 step i);
/// must be on `PATH` for published binaries to be runnable directly.
pub const BIN_DIR: &str = "/usr/bin";

/// Local record of the engine's own version, consulted and rewritten by
/// `upgrade` (spec §4.9).
pub const LOCAL_VERSION_PATH: &str = "/usr/lib/spm/VERSION";

/// Canonical install path for the engine binary itself.
pub const ENGINE_INSTALL_PATH: &str = "/usr/lib/spm/spm";

/// Canonical install path for the sandbox helper binary.
pub const SANDBOX_HELPER_INSTALL_PATH: &str = "/usr/lib/spm/bwrap";

/// Remote URL serving the engine's current released version string.
pub const ENGINE_VERSION_URL: &str = "https://index.example.invalid/spm-version.txt";

/// Remote URL template for the engine binary artifact itself.
pub const ENGINE_ARTIFACT_URL: &str = "https://index.example.invalid/spm-latest.tar.gz";

/// Remote URL template for the sandbox helper binary artifact.
pub const SANDBOX_HELPER_ARTIFACT_URL: &str = "https://index.example.invalid/bwrap-latest";
