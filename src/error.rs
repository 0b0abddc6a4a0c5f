use thiserror::Error;

/// Crate-wide error type for the protocol layer.
///
/// Following the taxonomy in the spec: vote=NO, transport failure, and
/// deadline-exceeded are *not* represented here — they are ordinary outcomes
/// of an RPC call (see [`crate::rpc::client::CallOutcome`]) and a legitimate
/// driver decision (vote), never a Rust error. `TwoPcError` is reserved for
/// local durability failures and protocol violations.
///
/// `rpc::wire` folds `serde_json::Error` into `std::io::Error` itself (it
/// has to: its callers speak `io::Result` against `AsyncRead`/`AsyncWrite`,
/// and `rpc::server` matches on `io::ErrorKind::UnexpectedEof`), so there is
/// no `#[from] serde_json::Error` conversion here — it would never fire.
#[derive(Debug, Error)]
pub enum TwoPcError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("protocol violation: {0}")]
    Protocol(String),

    #[error("unknown participant index: {0}")]
    UnknownParticipant(usize),
}

#[derive(Debug, Error)]
#[error("{0}")]
pub struct StorageError(pub String);

pub type Result<T> = std::result::Result<T, TwoPcError>;
