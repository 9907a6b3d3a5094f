use thiserror::Error;

/// The remote store could not be reached or refused the request.
///
/// Every variant means the same thing to callers: no stations and no data
/// are available right now. The registry and the series cache turn this
/// into empty results instead of passing it to the presentation layer.
#[derive(Debug, Error)]
pub enum RemoteUnavailable {
    #[error("WebDAV access token is not configured")]
    NotConfigured,

    #[error("Failed to build HTTP client")]
    ClientBuild(#[source] reqwest::Error),

    #[error("Request to {url} timed out")]
    Timeout {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Access to {url} was denied with status {status}")]
    Unauthorized {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("Network request failed for {0}")]
    NetworkRequest(String, #[source] reqwest::Error),

    #[error("HTTP request failed for {url} with status {status}")]
    HttpStatus {
        url: String,
        status: reqwest::StatusCode,
        #[source]
        source: reqwest::Error,
    },

    #[error("Invalid HTTP method: {0}")]
    InvalidMethod(String),

    #[error("Remote file '{0}' not found")]
    NotFound(String),

    #[error("Failed to parse folder listing from {url}")]
    InvalidListing {
        url: String,
        #[source]
        source: quick_xml::Error,
    },
}

impl RemoteUnavailable {
    /// Maps a transport-level failure, separating timeouts from other errors.
    pub(crate) fn from_request(url: &str, error: reqwest::Error) -> Self {
        if error.is_timeout() {
            RemoteUnavailable::Timeout {
                url: url.to_string(),
                source: error,
            }
        } else {
            RemoteUnavailable::NetworkRequest(url.to_string(), error)
        }
    }
}
