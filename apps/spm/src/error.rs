//! CLI-level error wrapper: the top-level `main` handler is the only
//! place that turns an error into process exit status 1 (spec §6 exit
//! codes).

use std::fmt;

#[derive(Debug)]
pub enum CliError {
    Ops(spm_errors::Error),
    Config(spm_errors::Error),
    InvalidArguments(String),
    Io(std::io::Error),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Ops(e) | CliError::Config(e) => write!(f, "{e}"),
            CliError::InvalidArguments(msg) => write!(f, "invalid arguments: {msg}"),
            CliError::Io(e) => write!(f, "I/O error: {e}"),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Ops(e) | CliError::Config(e) => Some(e),
            CliError::Io(e) => Some(e),
            CliError::InvalidArguments(_) => None,
        }
    }
}

impl From<spm_errors::Error> for CliError {
    fn from(e: spm_errors::Error) -> Self {
        CliError::Ops(e)
    }
}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        CliError::Io(e)
    }
}
