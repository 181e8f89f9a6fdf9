//! Error types for the fetch client.

/// Errors that can occur when fetching a page.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The request URL could not be parsed.
    #[error("invalid url {url}: {reason}")]
    InvalidUrl { url: String, reason: String },
    /// The request did not complete within the configured timeout.
    #[error("request to {url} timed out")]
    Timeout { url: String },
    /// The request failed before a response was received (DNS, connect, TLS, body read).
    #[error("request to {url} failed: {source}")]
    RequestFailed {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    /// The HTTP client could not be constructed (TLS backend, invalid user agent).
    #[error("could not build HTTP client: {0}")]
    Build(#[source] reqwest::Error),
    /// The server returned a non-success status with a body snippet.
    #[error("request to {url} failed with status {status}")]
    HttpStatus {
        url: String,
        status: u16,
        body: String,
    },
}

impl Error {
    /// Whether retrying the same request may succeed.
    ///
    /// Timeouts, connection-level failures, 429 and 5xx responses are transient.
    /// Everything else (bad URL, 4xx) is final.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::InvalidUrl { .. } | Self::Build(_) => false,
            Self::Timeout { .. } | Self::RequestFailed { .. } => true,
            Self::HttpStatus { status, .. } => *status == 429 || *status >= 500,
        }
    }

    /// The URL the failed request was sent to, if a request was attempted.
    pub fn url(&self) -> Option<&str> {
        match self {
            Self::InvalidUrl { url, .. }
            | Self::Timeout { url }
            | Self::RequestFailed { url, .. }
            | Self::HttpStatus { url, .. } => Some(url),
            Self::Build(_) => None,
        }
    }
}
