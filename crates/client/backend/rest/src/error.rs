use board_runtime::BackendError;
use thiserror::Error;

/// Transport-level failures of the REST backend.
#[derive(Debug, Error)]
pub enum RestError {
    #[error("failed to build HTTP client")]
    Client(#[source] reqwest::Error),

    #[error("request to {url} failed")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} answered {status}: {body}")]
    Status {
        url: String,
        status: u16,
        body: String,
    },

    #[error("could not decode response from {url}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

impl From<RestError> for BackendError {
    fn from(error: RestError) -> Self {
        match error {
            RestError::Status { status, body, .. } => BackendError::rejected(status, body),
            RestError::Decode { url, source } => {
                BackendError::Malformed(format!("{url}: {source}"))
            }
            RestError::Client(source) | RestError::Request { source, .. } => {
                BackendError::network(source.to_string())
            }
        }
    }
}
