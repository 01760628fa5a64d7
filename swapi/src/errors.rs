use thiserror::Error;

/// Transport failures surfaced to the view. Never retried automatically.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("not found: {url}")]
    NotFound { url: String },

    #[error("failed to fetch {url}: {status}")]
    Status { url: String, status: reqwest::StatusCode },

    #[error("network error while fetching {url}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("unexpected response from {url}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to build HTTP client")]
    Client(#[source] reqwest::Error),
}

impl FetchError {
    /// Map a non-success status to the matching variant.
    pub(crate) fn from_status(url: &str, status: reqwest::StatusCode) -> Self {
        if status == reqwest::StatusCode::NOT_FOUND {
            Self::NotFound {
                url: url.to_string(),
            }
        } else {
            Self::Status {
                url: url.to_string(),
                status,
            }
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

pub type Result<T> = std::result::Result<T, FetchError>;
