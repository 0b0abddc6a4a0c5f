use serde::{Deserialize, Serialize};

/// Opaque, client-chosen transaction identifier (§3).
pub type TxId = String;

/// The six protocol RPCs plus the two test-only failure-injection calls,
/// carried as one tagged JSON envelope per §6A.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum RpcRequest {
    Initialize { tx_id: TxId },
    Prepare { tx_id: TxId },
    Commit { tx_id: TxId },
    Abort { tx_id: TxId },
    FetchCommit { tx_id: TxId },
    RestrictDbAccess,
    AllowDbAccess,
}

impl RpcRequest {
    pub fn tx_id(&self) -> Option<&str> {
        match self {
            RpcRequest::Initialize { tx_id }
            | RpcRequest::Prepare { tx_id }
            | RpcRequest::Commit { tx_id }
            | RpcRequest::Abort { tx_id }
            | RpcRequest::FetchCommit { tx_id } => Some(tx_id),
            RpcRequest::RestrictDbAccess | RpcRequest::AllowDbAccess => None,
        }
    }
}

/// Responses. `Error` covers §7's "protocol violation" class — the
/// connection stays open, the caller just gets an explicit error back.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum RpcResponse {
    Ack,
    Vote { yes: bool },
    CommitStatus { committed: bool },
    Error { message: String },
}

impl RpcResponse {
    pub fn is_yes_vote(&self) -> bool {
        matches!(self, RpcResponse::Vote { yes: true })
    }
}
