#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Sandbox profile and invocation (spec §4.4).
//!
//! This crate does not reimplement namespace isolation itself (spec §9
//! design note "Sandbox as a program, not a library") — it builds an
//! argument vector for an external namespace-isolation helper (the
//! `bwrap` convention) and hands it to [`spm_process`] to run, trusting
//! its exit status.

use spm_errors::{Error, SandboxError};
use spm_events::{EventEmitter, EventSender};
use spm_process::Invocation;
use spm_types::SandboxProfile;
use std::path::{Path, PathBuf};

/// Fixed in-sandbox mount point for the artifact root (spec §4.4:
/// "a fixed in-sandbox mount point").
pub const SANDBOX_ARTIFACT_ROOT: &str = "/pkg";

/// A single filesystem bind to request from the helper.
enum Bind {
    ReadOnly(PathBuf),
    ReadWrite(PathBuf),
    ReadWriteMapped(PathBuf, PathBuf),
    Proc,
    Dev,
    Tmpfs(&'static str),
}

/// Builds the argv for the namespace-isolation helper.
pub struct SandboxCommand {
    helper: String,
    binds: Vec<Bind>,
    share_net: bool,
    share_ipc: bool,
    envs: Vec<(String, String)>,
    chdir: Option<PathBuf>,
}

impl SandboxCommand {
    /// Start building an invocation against `artifact_root`, applying
    /// the fixed default policy plus `profile`'s overrides (spec §4.4).
    #[must_use]
    pub fn new(helper: &str, artifact_root: &Path, profile: &SandboxProfile) -> Self {
        let mut cmd = Self {
            helper: helper.to_string(),
            binds: Vec::new(),
            share_net: profile.network,
            share_ipc: false,
            envs: Vec::new(),
            chdir: Some(PathBuf::from(SANDBOX_ARTIFACT_ROOT)),
        };

        for system_dir in ["/usr", "/lib", "/bin", "/sbin", "/etc"] {
            if Path::new(system_dir).exists() {
                cmd.binds.push(Bind::ReadOnly(PathBuf::from(system_dir)));
            }
        }
        if Path::new("/lib64").exists() {
            cmd.binds.push(Bind::ReadOnly(PathBuf::from("/lib64")));
        }

        cmd.binds.push(Bind::ReadWriteMapped(
            artifact_root.to_path_buf(),
            PathBuf::from(SANDBOX_ARTIFACT_ROOT),
        ));

        cmd.binds.push(Bind::Proc);
        cmd.binds.push(Bind::Dev);
        cmd.binds.push(Bind::Tmpfs("/tmp"));

        if profile.graphical {
            if Path::new("/tmp/.X11-unix").exists() {
                cmd.binds
                    .push(Bind::ReadOnly(PathBuf::from("/tmp/.X11-unix")));
            }
            cmd.share_ipc = true;
            if let Ok(display) = std::env::var("DISPLAY") {
                cmd.envs.push(("DISPLAY".to_string(), display));
            }
        }

        if profile.device && Path::new("/dev").exists() {
            cmd.binds.push(Bind::ReadWrite(PathBuf::from("/dev")));
        }

        for extra in &profile.extra_paths {
            cmd.binds.push(Bind::ReadWrite(PathBuf::from(extra)));
        }

        cmd
    }

    fn build_argv(&self, trailing: Vec<String>) -> Vec<String> {
        let mut argv = vec![self.helper.clone()];

        argv.push("--unshare-all".to_string());
        if self.share_net {
            argv.push("--share-net".to_string());
        }
        if self.share_ipc {
            argv.push("--share-ipc".to_string());
        }
        argv.push("--die-with-parent".to_string());

        for bind in &self.binds {
            match bind {
                Bind::ReadOnly(p) => {
                    argv.push("--ro-bind".to_string());
                    argv.push(p.display().to_string());
                    argv.push(p.display().to_string());
                }
                Bind::ReadWrite(p) => {
                    argv.push("--bind".to_string());
                    argv.push(p.display().to_string());
                    argv.push(p.display().to_string());
                }
                Bind::ReadWriteMapped(src, dst) => {
                    argv.push("--bind".to_string());
                    argv.push(src.display().to_string());
                    argv.push(dst.display().to_string());
                }
                Bind::Proc => {
                    argv.push("--proc".to_string());
                    argv.push("/proc".to_string());
                }
                Bind::Dev => {
                    argv.push("--dev".to_string());
                    argv.push("/dev".to_string());
                }
                Bind::Tmpfs(mount) => {
                    argv.push("--tmpfs".to_string());
                    argv.push((*mount).to_string());
                }
            }
        }

        for (key, value) in &self.envs {
            argv.push("--setenv".to_string());
            argv.push(key.clone());
            argv.push(value.clone());
        }

        if let Some(chdir) = &self.chdir {
            argv.push("--chdir".to_string());
            argv.push(chdir.display().to_string());
        }

        argv.extend(trailing);
        argv
    }

    fn to_invocation(&self, trailing: Vec<String>) -> Invocation {
        let argv = self.build_argv(trailing);
        Invocation::new(argv)
    }
}

/// Run the manifest's install commands under the sandbox (spec §4.4
/// "Install mode"). An empty command list does nothing and reports
/// success.
///
/// # Errors
///
/// [`SandboxError::InstallScriptFailed`] on non-zero exit status;
/// process-level errors propagate from [`spm_process`].
pub async fn run_install(
    helper: &str,
    artifact_root: &Path,
    profile: &SandboxProfile,
    commands: &[String],
    events: Option<&EventSender>,
) -> Result<(), Error> {
    if commands.is_empty() {
        return Ok(());
    }

    let joined = commands.join(" && ");
    events.emit_phase(format!("running install commands in {}", artifact_root.display()));

    let cmd = SandboxCommand::new(helper, artifact_root, profile);
    let invocation = cmd.to_invocation(vec!["sh".to_string(), "-c".to_string(), joined]);
    let status = spm_process::run(&invocation, events).await?;

    if !status.success() {
        let code = status.code().unwrap_or(-1);
        return Err(SandboxError::InstallScriptFailed(code).into());
    }
    Ok(())
}

/// Run a declared binary at its fixed in-sandbox path with the caller's
/// extra arguments (spec §4.4 "Run mode"). The binary's exit status is
/// the caller's responsibility to propagate.
///
/// # Errors
///
/// Process-level errors propagate from [`spm_process`].
pub async fn run_binary(
    helper: &str,
    artifact_root: &Path,
    profile: &SandboxProfile,
    binary: &str,
    args: &[String],
    events: Option<&EventSender>,
) -> Result<std::process::ExitStatus, Error> {
    let cmd = SandboxCommand::new(helper, artifact_root, profile);
    let in_sandbox_path = format!("{SANDBOX_ARTIFACT_ROOT}/{binary}");
    let mut trailing = vec![in_sandbox_path];
    trailing.extend(args.iter().cloned());

    let invocation = cmd.to_invocation(trailing);
    spm_process::run(&invocation, events).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_profile_unshares_net() {
        let profile = SandboxProfile::default();
        let cmd = SandboxCommand::new("bwrap", Path::new("/tmp/pkg"), &profile);
        let argv = cmd.build_argv(vec!["sh".to_string()]);
        assert!(argv.contains(&"--unshare-all".to_string()));
        assert!(!argv.contains(&"--share-net".to_string()));
    }

    #[test]
    fn network_profile_shares_net() {
        let profile = SandboxProfile {
            network: true,
            ..Default::default()
        };
        let cmd = SandboxCommand::new("bwrap", Path::new("/tmp/pkg"), &profile);
        let argv = cmd.build_argv(vec!["sh".to_string()]);
        assert!(argv.contains(&"--share-net".to_string()));
    }

    #[test]
    fn extra_paths_are_bound_read_write() {
        let profile = SandboxProfile {
            extra_paths: vec!["/opt/stuff".to_string()],
            ..Default::default()
        };
        let cmd = SandboxCommand::new("bwrap", Path::new("/tmp/pkg"), &profile);
        let argv = cmd.build_argv(vec!["sh".to_string()]);
        let idx = argv.iter().position(|a| a == "--bind").unwrap();
        assert!(argv[idx..].iter().any(|a| a == "/opt/stuff"));
    }

    #[tokio::test]
    async fn empty_install_commands_is_noop() {
        let profile = SandboxProfile::default();
        run_install("bwrap", Path::new("/tmp/pkg"), &profile, &[], None)
            .await
            .unwrap();
    }
}
