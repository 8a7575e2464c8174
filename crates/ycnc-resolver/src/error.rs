//! Fetch error types.

use thiserror::Error;

/// Why a channel page did not yield a name.
///
/// The resolver turns every one of these into an unresolved (`None`) result;
/// they exist so the failure can be logged with its cause.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Request failed before a response body was read.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Channel URL could not be built.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Server answered with a non-success status.
    #[error("Unexpected status {status} for {url}")]
    Status { status: u16, url: String },

    /// Page had no usable `<title>`.
    #[error("No channel name found in page for {0}")]
    NoTitle(String),
}

impl FetchError {
    /// Whether the server reported the channel as missing.
    pub fn is_not_found(&self) -> bool {
        matches!(self, FetchError::Status { status: 404, .. })
    }
}

/// Result type for fetch operations.
pub type Result<T> = std::result::Result<T, FetchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_404_is_not_found() {
        let status = |status| FetchError::Status {
            status,
            url: "https://www.youtube.com/@foo".to_string(),
        };
        assert!(status(404).is_not_found());
        assert!(!status(500).is_not_found());
        assert!(!FetchError::NoTitle("@foo".to_string()).is_not_found());
    }
}
