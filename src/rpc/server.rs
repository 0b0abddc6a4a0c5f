//! Generic accept-loop RPC server, grounded on the teacher's
//! `start_server`/`handle_connection` pair (`src/server.rs`): bind a
//! listener, accept in a loop, spawn one task per connection, read frames
//! off that connection until the peer disconnects.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tokio::net::{TcpListener, TcpStream};

use crate::rpc::message::{RpcRequest, RpcResponse};
use crate::rpc::wire;

pub type HandlerFuture = Pin<Box<dyn Future<Output = RpcResponse> + Send>>;

/// Implemented by each side's service object. `handle` owns the full
/// request -> mutation -> response path, including WAL writes.
pub trait RpcHandler: Send + Sync + 'static {
    fn handle(self: Arc<Self>, request: RpcRequest) -> HandlerFuture;
}

/// Runs the accept loop until the listener errors out (or the process
/// exits). Returns only on a fatal accept error.
pub async fn serve<H: RpcHandler>(
    listener: TcpListener,
    handler: Arc<H>,
    log_prefix: impl Into<String>,
) -> std::io::Result<()> {
    let log_prefix = log_prefix.into();
    loop {
        let (socket, _) = listener.accept().await?;
        let handler = Arc::clone(&handler);
        let log_prefix = log_prefix.clone();
        tokio::spawn(async move {
            if let Err(e) = handle_connection(socket, handler).await {
                eprintln!("{log_prefix} connection error: {e}");
            }
        });
    }
}

async fn handle_connection<H: RpcHandler>(
    mut socket: TcpStream,
    handler: Arc<H>,
) -> std::io::Result<()> {
    loop {
        let request: RpcRequest = match wire::read_message(&mut socket).await {
            Ok(request) => request,
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => return Ok(()),
            Err(e) => return Err(e),
        };
        let response = Arc::clone(&handler).handle(request).await;
        wire::write_message(&mut socket, &response).await?;
    }
}
