//! Ties together the participant's store, recovery, and RPC surface.

use std::sync::Arc;

use tokio::net::TcpListener;

use crate::error::Result;
use crate::rpc::message::{RpcRequest, RpcResponse};
use crate::rpc::message::TxId;
use crate::rpc::server::{HandlerFuture, RpcHandler};

use super::config::ParticipantConfig;
use super::recovery;
use super::store::ParticipantStore;

pub struct ParticipantService {
    store: Arc<ParticipantStore>,
    config: ParticipantConfig,
}

impl ParticipantService {
    /// Opens the store (replaying its WAL) and runs startup recovery (§4.6)
    /// before returning.
    pub async fn open(config: ParticipantConfig) -> Result<Self> {
        let store = Arc::new(ParticipantStore::open(&config.wal_path)?);
        recovery::recover(&store, config.coordinator_addr, config.fetch_commit_deadline).await?;
        Ok(Self { store, config })
    }

    pub fn is_committed(&self, tx_id: &str) -> bool {
        self.store.is_committed(tx_id)
    }

    pub fn state_of(&self, tx_id: &str) -> Option<super::state::ParticipantState> {
        self.store.get(tx_id)
    }

    pub async fn bind(&self) -> std::io::Result<TcpListener> {
        TcpListener::bind(self.config.listen_addr).await
    }

    pub async fn serve_on(self: Arc<Self>, listener: TcpListener) -> std::io::Result<()> {
        let prefix = format!("[participant {}]", self.config.name);
        crate::rpc::server::serve(listener, self, prefix).await
    }

    fn arm_init_timer(self: &Arc<Self>, tx_id: TxId) {
        let store = Arc::clone(&self.store);
        let timeout = self.config.init_timeout;
        let name = self.config.name.clone();
        tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            match store.expire_if_still_initialized(&tx_id) {
                Ok(()) => {
                    if matches!(
                        store.get(&tx_id),
                        Some(super::state::ParticipantState::Aborted)
                    ) {
                        eprintln!("[participant {name}] init timer aborted {tx_id}");
                    }
                }
                Err(e) => eprintln!("[participant {name}] init timer error for {tx_id}: {e}"),
            }
        });
    }
}

impl RpcHandler for ParticipantService {
    fn handle(self: Arc<Self>, request: RpcRequest) -> HandlerFuture {
        Box::pin(async move {
            match request {
                RpcRequest::Initialize { tx_id } => match self.store.initialize_if_absent(&tx_id) {
                    Ok(true) => {
                        self.arm_init_timer(tx_id);
                        RpcResponse::Ack
                    }
                    Ok(false) => RpcResponse::Ack,
                    Err(e) => RpcResponse::Error {
                        message: e.to_string(),
                    },
                },
                RpcRequest::Prepare { tx_id } => match self.store.prepare(&tx_id) {
                    Ok(yes) => RpcResponse::Vote { yes },
                    Err(e) => RpcResponse::Error {
                        message: e.to_string(),
                    },
                },
                RpcRequest::Commit { tx_id } => match self.store.commit(&tx_id) {
                    Ok(()) => RpcResponse::Ack,
                    Err(e) => RpcResponse::Error {
                        message: e.to_string(),
                    },
                },
                RpcRequest::Abort { tx_id } => match self.store.abort(&tx_id) {
                    Ok(()) => RpcResponse::Ack,
                    Err(e) => RpcResponse::Error {
                        message: e.to_string(),
                    },
                },
                RpcRequest::RestrictDbAccess => {
                    self.store.restrict_db_access();
                    RpcResponse::Ack
                }
                RpcRequest::AllowDbAccess => {
                    self.store.allow_db_access();
                    RpcResponse::Ack
                }
                RpcRequest::FetchCommit { .. } => RpcResponse::Error {
                    message: "FetchCommit is served by the coordinator, not a participant".into(),
                },
            }
        })
    }
}
