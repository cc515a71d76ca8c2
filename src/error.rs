use thiserror::Error;

/// Shown when the pasted link cannot be parsed as an absolute URL.
pub const INVALID_URL_MESSAGE: &str = "Invalid URL";

/// Shown for every metadata fetch failure, whatever the cause.
pub const FETCH_FAILED_MESSAGE: &str = "An error occurred while fetching data. Please try again.";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),
    #[error("environment variable {name} has invalid value {value:?}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("metadata request failed: {0}")]
    Request(#[source] reqwest::Error),
    #[error("metadata API answered with status {0}")]
    Status(reqwest::StatusCode),
    #[error("metadata response could not be decoded: {0}")]
    Decode(#[source] reqwest::Error),
    #[error("metadata request was abandoned before it settled")]
    Abandoned,
}

#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("download request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("download server answered with status {0}")]
    Status(reqwest::StatusCode),
    #[error("download ended after {received} of {expected} bytes")]
    Truncated { expected: u64, received: u64 },
    #[error("could not write download: {0}")]
    Io(#[from] std::io::Error),
}
