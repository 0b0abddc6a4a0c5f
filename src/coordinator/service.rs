//! Ties together the coordinator's store, driver, and RPC surface.
//!
//! The coordinator only serves one RPC over the network: `FetchCommit`
//! (§4.2). `Run` is not a network RPC — per `original_source/coordinator.py`
//! and `test_scenarios.py`, a transaction is started by an in-process call
//! on the coordinator object (a CLI, a test driver), never by a peer dialing
//! in. The debug `Prepare`/`Commit`/`Abort` handlers the original exposes on
//! its gRPC service (an artifact of reusing one proto service for both
//! roles) are intentionally not wired up here (§9, Open Question 3).

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;

use crate::error::Result;
use crate::rpc::message::{RpcRequest, RpcResponse};
use crate::rpc::server::{HandlerFuture, RpcHandler};

use super::config::CoordinatorConfig;
use super::driver::CoordinatorDriver;
use super::store::CoordinatorStore;

pub struct CoordinatorService {
    store: Arc<CoordinatorStore>,
    driver: Arc<CoordinatorDriver>,
    listen_addr: SocketAddr,
}

impl CoordinatorService {
    /// Opens the store (replaying its WAL) and runs startup recovery before
    /// returning, per §4.1/§4.4.
    pub async fn open(config: CoordinatorConfig) -> Result<Self> {
        let listen_addr = config.listen_addr;
        let store = Arc::new(CoordinatorStore::open(&config.wal_path)?);
        let driver = Arc::new(CoordinatorDriver::new(Arc::clone(&store), config));
        driver.recover().await?;
        Ok(Self {
            store,
            driver,
            listen_addr,
        })
    }

    /// Drives transaction `tx_id` to completion (COMMITTED or ABORTED).
    pub async fn run_transaction(&self, tx_id: &str) -> Result<()> {
        self.driver.run(tx_id).await
    }

    pub fn is_committed(&self, tx_id: &str) -> bool {
        self.store.is_committed(tx_id)
    }

    /// Binds the listener and serves `FetchCommit` until the process exits
    /// or the listener errors. Returns the bound address (useful in tests
    /// that bind to port 0).
    pub async fn serve(self: Arc<Self>) -> std::io::Result<()> {
        let listener = TcpListener::bind(self.listen_addr).await?;
        crate::rpc::server::serve(listener, self, "[coordinator]").await
    }

    pub async fn bind(&self) -> std::io::Result<TcpListener> {
        TcpListener::bind(self.listen_addr).await
    }

    pub async fn serve_on(self: Arc<Self>, listener: TcpListener) -> std::io::Result<()> {
        crate::rpc::server::serve(listener, self, "[coordinator]").await
    }
}

impl RpcHandler for CoordinatorService {
    fn handle(self: Arc<Self>, request: RpcRequest) -> HandlerFuture {
        Box::pin(async move {
            match request {
                RpcRequest::FetchCommit { tx_id } => RpcResponse::CommitStatus {
                    committed: self.store.is_committed(&tx_id),
                },
                other => RpcResponse::Error {
                    message: format!("coordinator does not serve {other:?} over RPC"),
                },
            }
        })
    }
}
