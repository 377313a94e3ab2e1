use thiserror::Error;

/// Errors from fetching the index or downloading artifacts.
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("HTTP {status}: {message}")]
    HttpStatus { status: u16, message: String },

    #[error("download failed: {0}")]
    DownloadFailed(String),

    #[error("index fetch failed: {0}")]
    IndexFetchFailed(String),

    #[error("index parse failed: {0}")]
    IndexParseFailed(String),
}
