//! Command line interface definition (spec §6 "CLI surface").

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "spm")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Linux user-space package manager engine")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalArgs,
}

/// Global flags available for every subcommand.
#[derive(Parser)]
pub struct GlobalArgs {
    /// Emit machine-readable JSON instead of text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable debug-level logging.
    #[arg(long, global = true)]
    pub debug: bool,

    /// Color output control.
    #[arg(long, global = true, value_enum)]
    pub color: Option<ColorArg>,

    /// Use an alternate config file.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum ColorArg {
    Always,
    Auto,
    Never,
}

impl From<ColorArg> for spm_config::ColorChoice {
    fn from(value: ColorArg) -> Self {
        match value {
            ColorArg::Always => Self::Always,
            ColorArg::Auto => Self::Auto,
            ColorArg::Never => Self::Never,
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch the package index and replace the local cache.
    Refresh,

    /// Install one or more package specs.
    Install {
        /// `<package>` or `<package>=<version>`.
        specs: Vec<String>,
    },

    /// Remove an installed package.
    Remove {
        spec: String,

        /// Accepted for CLI symmetry; removal never prompts non-interactively.
        #[arg(long)]
        yes: bool,
    },

    /// Upgrade every installed package not pinned to a newer index version.
    Update,

    /// Repoint a package's `current` link at an already-installed version.
    Switch { package: String, version: String },

    /// Self-update the engine and sandbox helper binaries.
    Upgrade,

    /// Run a binary from an installed package inside the sandbox.
    Run {
        /// `<package>` or `<package>=<version>`.
        spec: String,
        binary: String,
        #[arg(trailing_var_arg = true)]
        args: Vec<String>,
    },

    /// Build a package archive from a conventional source layout.
    Build {
        name: String,

        #[arg(long, value_name = "DIR")]
        source_dir: Option<PathBuf>,

        #[arg(long, value_name = "DIR")]
        output_dir: Option<PathBuf>,
    },

    /// Search the index by name or description.
    Search { query: String },

    /// Show everything the index and journal know about a package.
    Info { package: String },

    /// List every installed package and version.
    List,

    /// Remove every cached archive.
    Clean,

    /// Pin a package to an installed version so `update` skips it.
    Pin { package: String, version: String },

    /// Clear the pin on a package's current version.
    Unpin { package: String },

    /// List installed packages with a newer version available.
    Outdated,

    /// Recompute and compare a package's manifest digest.
    Verify { package: String },

    /// Show a package version's dependency map.
    Deps {
        /// `<package>` or `<package>=<version>`.
        spec: String,
    },
}

impl Commands {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Commands::Refresh => "refresh",
            Commands::Install { .. } => "install",
            Commands::Remove { .. } => "remove",
            Commands::Update => "update",
            Commands::Switch { .. } => "switch",
            Commands::Upgrade => "upgrade",
            Commands::Run { .. } => "run",
            Commands::Build { .. } => "build",
            Commands::Search { .. } => "search",
            Commands::Info { .. } => "info",
            Commands::List => "list",
            Commands::Clean => "clean",
            Commands::Pin { .. } => "pin",
            Commands::Unpin { .. } => "unpin",
            Commands::Outdated => "outdated",
            Commands::Verify { .. } => "verify",
            Commands::Deps { .. } => "deps",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_install_with_multiple_specs() {
        let cli = Cli::parse_from(["spm", "install", "foo", "bar=1.0"]);
        match cli.command {
            Commands::Install { specs } => assert_eq!(specs, vec!["foo", "bar=1.0"]),
            _ => panic!("expected install"),
        }
    }

    #[test]
    fn parses_run_with_trailing_args() {
        let cli = Cli::parse_from(["spm", "run", "foo", "bin", "--", "-x", "1"]);
        match cli.command {
            Commands::Run { spec, binary, args } => {
                assert_eq!(spec, "foo");
                assert_eq!(binary, "bin");
                assert_eq!(args, vec!["-x", "1"]);
            }
            _ => panic!("expected run"),
        }
    }

    #[test]
    fn global_flags_parse_before_subcommand() {
        let cli = Cli::parse_from(["spm", "--json", "--debug", "list"]);
        assert!(cli.global.json);
        assert!(cli.global.debug);
        assert!(matches!(cli.command, Commands::List));
    }
}
