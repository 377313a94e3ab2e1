use thiserror::Error;

/// Errors from invoking the namespace-isolation helper.
#[derive(Debug, Error)]
pub enum SandboxError {
    #[error("sandbox helper not found on PATH: {0}")]
    HelperNotFound(String),

    #[error("install script failed with status {0}")]
    InstallScriptFailed(i32),

    #[error("sandboxed run failed with status {0}")]
    RunFailed(i32),

    #[error("sandbox helper terminated by signal")]
    Terminated,
}
