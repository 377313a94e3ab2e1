use thiserror::Error;

/// Errors from loading or saving the state journal.
#[derive(Debug, Error)]
pub enum StateError {
    #[error("journal parse error: {message}")]
    Parse { message: String },

    #[error("journal save error: {message}")]
    Save { message: String },
}
