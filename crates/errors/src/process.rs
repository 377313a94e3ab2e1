use thiserror::Error;

/// Errors from the Process Executor (spec §4.1).
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("executable not found: {0}")]
    SpawnError(String),

    #[error("child terminated by signal: {0}")]
    WaitError(String),
}
