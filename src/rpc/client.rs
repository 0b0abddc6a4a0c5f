//! Outbound RPC calls with a per-call deadline (§5, §6A).
//!
//! Every call is reconnect-per-call: the simplest crash-safe choice, and the
//! one that keeps a hung peer from pinning a long-lived socket. The caller
//! gets back one of three outcomes, never a bare `Result` — the driver code
//! in `coordinator::driver` and `participant::recovery` reacts to the
//! trichotomy directly instead of pattern-matching an error type.

use std::net::SocketAddr;
use std::time::Duration;

use tokio::net::TcpStream;

use crate::rpc::message::{RpcRequest, RpcResponse};
use crate::rpc::wire;

/// The outcome of one outbound RPC call.
#[derive(Debug)]
pub enum CallOutcome {
    /// The peer replied within the deadline.
    Ok(RpcResponse),
    /// Connection refused, reset, or otherwise failed before a full response
    /// was read.
    TransportError(String),
    /// The call did not complete within the deadline.
    DeadlineExceeded,
}

impl CallOutcome {
    pub fn is_ok(&self) -> bool {
        matches!(self, CallOutcome::Ok(_))
    }
}

/// Sends `request` to `addr` and waits up to `deadline` for a response.
pub async fn call(addr: SocketAddr, request: &RpcRequest, deadline: Duration) -> CallOutcome {
    match tokio::time::timeout(deadline, send_and_receive(addr, request)).await {
        Ok(Ok(response)) => CallOutcome::Ok(response),
        Ok(Err(e)) => CallOutcome::TransportError(e.to_string()),
        Err(_) => CallOutcome::DeadlineExceeded,
    }
}

async fn send_and_receive(
    addr: SocketAddr,
    request: &RpcRequest,
) -> std::io::Result<RpcResponse> {
    let mut stream = TcpStream::connect(addr).await?;
    wire::write_message(&mut stream, request).await?;
    wire::read_message(&mut stream).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn transport_error_on_connection_refused() {
        // Port 1 is reserved and nothing listens there in this test environment.
        let addr: SocketAddr = "127.0.0.1:1".parse().unwrap();
        let outcome = call(
            addr,
            &RpcRequest::Initialize {
                tx_id: "tx1".into(),
            },
            Duration::from_millis(200),
        )
        .await;
        assert!(matches!(
            outcome,
            CallOutcome::TransportError(_) | CallOutcome::DeadlineExceeded
        ));
    }
}
