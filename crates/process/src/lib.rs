#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! The Process Executor (spec §4.1): spawns external helpers (the
//! sandbox tool, the archive extractor, the downloader) and reports an
//! exit status. Has no retry policy — that discipline lives one layer
//! up, in the lifecycle controller.

use spm_errors::{Error, ProcessError};
use spm_events::{Event, EventEmitter, EventSender};
use std::path::Path;
use std::process::ExitStatus;
use tokio::process::Command;
use tracing::debug;

/// A command to run: argv plus optional working directory and extra
/// environment variables.
#[derive(Debug, Clone)]
pub struct Invocation {
    pub argv: Vec<String>,
    pub cwd: Option<std::path::PathBuf>,
    pub envs: Vec<(String, String)>,
}

impl Invocation {
    #[must_use]
    pub fn new(argv: Vec<String>) -> Self {
        Self {
            argv,
            cwd: None,
            envs: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_cwd(mut self, cwd: impl AsRef<Path>) -> Self {
        self.cwd = Some(cwd.as_ref().to_path_buf());
        self
    }

    #[must_use]
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.envs.push((key.into(), value.into()));
        self
    }
}

/// Resolve the first argv element against `PATH` if it contains no path
/// separator; otherwise use it verbatim (spec §4.1).
fn resolve_executable(program: &str) -> Result<std::path::PathBuf, Error> {
    if program.contains(std::path::MAIN_SEPARATOR) {
        return Ok(std::path::PathBuf::from(program));
    }
    which::which(program).map_err(|_| ProcessError::SpawnError(program.to_string()).into())
}

/// Fork, replace the child image, wait for termination, and return the
/// exit status. Inherits stdout/stderr unless the caller has redirected
/// them upstream.
///
/// # Errors
///
/// [`ProcessError::SpawnError`] if the executable cannot be resolved or
/// spawned; [`ProcessError::WaitError`] if the child is killed by a
/// signal before it can report a status.
pub async fn run(invocation: &Invocation, events: Option<&EventSender>) -> Result<ExitStatus, Error> {
    let program = invocation
        .argv
        .first()
        .ok_or_else(|| Error::InvalidArguments("empty argument vector".to_string()))?;
    let resolved = resolve_executable(program)?;

    debug!(program = %resolved.display(), args = ?invocation.argv[1..], "spawning process");
    events.emit_debug(format!("running {}", invocation.argv.join(" ")));

    let mut command = Command::new(&resolved);
    command.args(&invocation.argv[1..]);
    if let Some(cwd) = &invocation.cwd {
        command.current_dir(cwd);
    }
    for (key, value) in &invocation.envs {
        command.env(key, value);
    }

    let mut child = command
        .spawn()
        .map_err(|e| ProcessError::SpawnError(format!("{program}: {e}")))?;

    let status = child
        .wait()
        .await
        .map_err(|e| ProcessError::WaitError(e.to_string()))?;

    if status.code().is_none() {
        return Err(ProcessError::WaitError(format!(
            "{program} terminated by signal"
        ))
        .into());
    }

    Ok(status)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn runs_true_successfully() {
        let inv = Invocation::new(vec!["true".to_string()]);
        let status = run(&inv, None).await.unwrap();
        assert!(status.success());
    }

    #[tokio::test]
    async fn reports_nonzero_exit() {
        let inv = Invocation::new(vec!["false".to_string()]);
        let status = run(&inv, None).await.unwrap();
        assert!(!status.success());
    }

    #[tokio::test]
    async fn unknown_executable_is_spawn_error() {
        let inv = Invocation::new(vec!["spm-definitely-not-a-real-binary".to_string()]);
        let err = run(&inv, None).await.unwrap_err();
        assert!(matches!(
            err,
            Error::Process(ProcessError::SpawnError(_))
        ));
    }
}
