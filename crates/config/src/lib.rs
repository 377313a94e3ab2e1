#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Layered configuration (spec §7 "Well-known filesystem paths" and the
//! ambient-stack addition of a configuration file): defaults, overlaid
//! by a TOML config file, overlaid by environment variables, overlaid
//! by CLI flags (applied by the caller after [`Config::load`] returns).

pub mod constants;

use serde::{Deserialize, Serialize};
use spm_errors::Error;
use std::path::{Path, PathBuf};

/// General behavioral settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub color: ColorChoice,
    pub json: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            color: ColorChoice::Auto,
            json: false,
        }
    }
}

/// Matches clap's own `--color` vocabulary so the CLI layer can forward
/// its flag value directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorChoice {
    Always,
    Auto,
    Never,
}

/// Network behavior for the index fetcher and downloader.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    pub index_url: String,
    pub timeout_secs: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            index_url: constants::DEFAULT_INDEX_URL.to_string(),
            timeout_secs: 30,
        }
    }
}

/// Filesystem layout overrides (spec §7: "all... conventional, not
/// normative"). `None` means fall back to [`constants`].
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct PathConfig {
    pub store_path: Option<PathBuf>,
    pub cache_path: Option<PathBuf>,
    pub index_cache_path: Option<PathBuf>,
    pub journal_path: Option<PathBuf>,
    pub lock_path: Option<PathBuf>,
    pub sandbox_helper: Option<String>,
}

/// Top-level configuration, merged defaults → file → environment.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub network: NetworkConfig,
    #[serde(default)]
    pub paths: PathConfig,
}

impl Config {
    /// `~/.config/spm/config.toml`, the default config file location.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the home directory cannot be
    /// determined.
    pub fn default_path() -> Result<PathBuf, Error> {
        let home = dirs::home_dir()
            .ok_or_else(|| Error::Config("cannot determine home directory".to_string()))?;
        Ok(home.join(".config").join("spm").join("config.toml"))
    }

    /// Load configuration, applying environment overrides, from an
    /// explicit path if given, else the default path if it exists,
    /// else built-in defaults.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if a present file cannot be read,
    /// parsed, or if an environment variable holds an invalid value.
    pub async fn load(explicit_path: Option<&Path>) -> Result<Self, Error> {
        let mut config = match explicit_path {
            Some(path) => Self::load_from_file(path).await?,
            None => {
                let default_path = Self::default_path()?;
                if tokio::fs::try_exists(&default_path).await.unwrap_or(false) {
                    Self::load_from_file(&default_path).await?
                } else {
                    Self::default()
                }
            }
        };
        config.merge_env()?;
        Ok(config)
    }

    /// Load and parse a config file from an explicit path.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the file cannot be read or parsed.
    pub async fn load_from_file(path: &Path) -> Result<Self, Error> {
        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| Error::Config(format!("reading {}: {e}", path.display())))?;
        toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("parsing {}: {e}", path.display())))
    }

    /// Apply `SPM_*` environment variable overrides.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if a recognized variable holds a value
    /// that cannot be parsed into its expected type.
    pub fn merge_env(&mut self) -> Result<(), Error> {
        if let Ok(value) = std::env::var("SPM_COLOR") {
            self.general.color = match value.as_str() {
                "always" => ColorChoice::Always,
                "auto" => ColorChoice::Auto,
                "never" => ColorChoice::Never,
                other => {
                    return Err(Error::Config(format!(
                        "SPM_COLOR: expected always/auto/never, got `{other}`"
                    )))
                }
            };
        }

        if let Ok(value) = std::env::var("SPM_JSON") {
            self.general.json = matches!(value.as_str(), "1" | "true" | "yes");
        }

        if let Ok(value) = std::env::var("SPM_INDEX_URL") {
            self.network.index_url = value;
        }

        if let Ok(value) = std::env::var("SPM_NETWORK_TIMEOUT_SECS") {
            self.network.timeout_secs = value
                .parse()
                .map_err(|_| Error::Config(format!("SPM_NETWORK_TIMEOUT_SECS: invalid `{value}`")))?;
        }

        if let Ok(value) = std::env::var("SPM_STORE_PATH") {
            self.paths.store_path = Some(PathBuf::from(value));
        }

        Ok(())
    }

    #[must_use]
    pub fn store_path(&self) -> PathBuf {
        self.paths
            .store_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(constants::STORE_DIR))
    }

    #[must_use]
    pub fn cache_path(&self) -> PathBuf {
        self.paths
            .cache_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(constants::CACHE_DIR))
    }

    #[must_use]
    pub fn index_cache_path(&self) -> PathBuf {
        self.paths
            .index_cache_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(constants::INDEX_CACHE_PATH))
    }

    #[must_use]
    pub fn journal_path(&self) -> PathBuf {
        self.paths
            .journal_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(constants::JOURNAL_PATH))
    }

    #[must_use]
    pub fn lock_path(&self) -> PathBuf {
        self.paths
            .lock_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(constants::LOCK_PATH))
    }

    #[must_use]
    pub fn sandbox_helper(&self) -> String {
        self.paths
            .sandbox_helper
            .clone()
            .unwrap_or_else(|| constants::SANDBOX_HELPER.to_string())
    }

    #[must_use]
    pub fn bin_dir(&self) -> PathBuf {
        PathBuf::from(constants::BIN_DIR)
    }

    #[must_use]
    pub fn local_version_path(&self) -> PathBuf {
        PathBuf::from(constants::LOCAL_VERSION_PATH)
    }

    #[must_use]
    pub fn engine_install_path(&self) -> PathBuf {
        PathBuf::from(constants::ENGINE_INSTALL_PATH)
    }

    #[must_use]
    pub fn sandbox_helper_install_path(&self) -> PathBuf {
        PathBuf::from(constants::SANDBOX_HELPER_INSTALL_PATH)
    }

    /// Serialize and write the configuration to `path`, creating parent
    /// directories as needed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if serialization or the write fails.
    pub async fn save_to(&self, path: &Path) -> Result<(), Error> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| Error::Config(format!("creating {}: {e}", parent.display())))?;
        }
        let text = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("serializing config: {e}")))?;
        tokio::fs::write(path, text)
            .await
            .map_err(|e| Error::Config(format!("writing {}: {e}", path.display())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_well_known_paths() {
        let config = Config::default();
        assert_eq!(config.store_path(), PathBuf::from(constants::STORE_DIR));
        assert_eq!(config.lock_path(), PathBuf::from(constants::LOCK_PATH));
        assert_eq!(config.general.color, ColorChoice::Auto);
    }

    #[tokio::test]
    async fn load_from_file_overrides_defaults() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("config.toml");
        tokio::fs::write(
            &path,
            r#"
[network]
index_url = "https://mirror.example/index.toml"
timeout_secs = 10

[paths]
store_path = "/srv/spm/store"
"#,
        )
        .await
        .unwrap();

        let config = Config::load_from_file(&path).await.unwrap();
        assert_eq!(config.network.index_url, "https://mirror.example/index.toml");
        assert_eq!(config.network.timeout_secs, 10);
        assert_eq!(config.store_path(), PathBuf::from("/srv/spm/store"));
    }

    #[test]
    fn merge_env_overrides_color() {
        std::env::set_var("SPM_COLOR", "never");
        let mut config = Config::default();
        config.merge_env().unwrap();
        assert_eq!(config.general.color, ColorChoice::Never);
        std::env::remove_var("SPM_COLOR");
    }

    #[test]
    fn merge_env_rejects_invalid_color() {
        std::env::set_var("SPM_COLOR", "rainbow");
        let mut config = Config::default();
        let err = config.merge_env().unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        std::env::remove_var("SPM_COLOR");
    }

    #[tokio::test]
    async fn save_then_load_roundtrips() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("nested").join("config.toml");
        let mut config = Config::default();
        config.network.timeout_secs = 99;
        config.save_to(&path).await.unwrap();

        let reloaded = Config::load_from_file(&path).await.unwrap();
        assert_eq!(reloaded.network.timeout_secs, 99);
    }
}
