//! Error types surfaced by the runtime API.
//!
//! Routine gesture rejections are not errors; they come back as
//! [`PlaceOutcome::Rejected`](super::PlaceOutcome::Rejected) and
//! [`MergeOutcome::Rejected`](super::MergeOutcome::Rejected). What remains
//! here is worker plumbing and collaborator failures.
use board_core::ConfigError;
use thiserror::Error;
use tokio::sync::oneshot;

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("board worker command channel closed")]
    CommandChannelClosed,

    #[error("board worker reply channel closed")]
    ReplyChannelClosed(#[source] oneshot::error::RecvError),

    #[error("board worker join failed")]
    WorkerJoin(#[source] tokio::task::JoinError),

    #[error("runtime requires a backend to be configured before building")]
    MissingBackend,

    #[error("invalid board configuration")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// Failure reported by the inventory source or the merge RPC.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum BackendError {
    /// The request never produced a response.
    #[error("backend unreachable: {0}")]
    Network(String),

    /// The backend answered with a failure status.
    #[error("backend rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("malformed backend response: {0}")]
    Malformed(String),
}

impl BackendError {
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    pub fn rejected(status: u16, message: impl Into<String>) -> Self {
        Self::Rejected {
            status,
            message: message.into(),
        }
    }
}
