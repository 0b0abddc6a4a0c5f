//! The coordinator's state-machine driver: `Run`, `Commit`, `Abort`, and
//! startup `recover` (§4.3, §4.4). This is the one part of the crate with no
//! direct teacher analogue — the teacher is a single-process embedded
//! database with no outbound RPC fan-out — so it is written fresh in the
//! teacher's `Result`-propagating, serialize-everything-under-one-lock style.

use std::sync::Arc;
use std::time::Duration;

use crate::error::Result;
use crate::rpc::client::{self, CallOutcome};
use crate::rpc::message::{RpcRequest, TxId};

use super::config::CoordinatorConfig;
use super::state::CoordinatorState;
use super::store::CoordinatorStore;

pub struct CoordinatorDriver {
    store: Arc<CoordinatorStore>,
    config: CoordinatorConfig,
}

impl CoordinatorDriver {
    pub fn new(store: Arc<CoordinatorStore>, config: CoordinatorConfig) -> Self {
        Self { store, config }
    }

    fn deadline(&self) -> Duration {
        self.config.deadline
    }

    /// Drives `tx_id` through INITIALIZE -> PREPARE -> COMMIT/ABORT (§4.3).
    pub async fn run(&self, tx_id: &str) -> Result<()> {
        self.store.set_initialized(tx_id)?;

        for addr in &self.config.participants {
            let outcome = client::call(
                *addr,
                &RpcRequest::Initialize {
                    tx_id: tx_id.to_string(),
                },
                self.deadline(),
            )
            .await;
            if !outcome.is_ok() {
                eprintln!("[coordinator] Initialize failed for {tx_id} on {addr}, aborting");
                return self.abort(tx_id).await;
            }
        }

        self.store.set_started(tx_id)?;

        let mut all_yes = true;
        for addr in &self.config.participants {
            let outcome = client::call(
                *addr,
                &RpcRequest::Prepare {
                    tx_id: tx_id.to_string(),
                },
                self.deadline(),
            )
            .await;
            match outcome {
                CallOutcome::Ok(response) if response.is_yes_vote() => {}
                CallOutcome::Ok(_) => {
                    eprintln!("[coordinator] {tx_id}: participant {addr} voted NO");
                    all_yes = false;
                    break;
                }
                CallOutcome::TransportError(e) => {
                    eprintln!("[coordinator] {tx_id}: Prepare transport error on {addr}: {e}");
                    all_yes = false;
                    break;
                }
                CallOutcome::DeadlineExceeded => {
                    eprintln!("[coordinator] {tx_id}: Prepare timed out on {addr}");
                    all_yes = false;
                    break;
                }
            }
        }

        if all_yes {
            self.commit(tx_id).await
        } else {
            self.abort(tx_id).await
        }
    }

    /// Commits `tx_id`, re-entrant for recovery (§4.3's "critical design
    /// decision"): participants already in `committed_to` are skipped, and a
    /// transport failure or deadline on an individual Commit call just
    /// leaves that participant out of `committed_to` for the next pass.
    pub async fn commit(&self, tx_id: &str) -> Result<()> {
        let already_committing = matches!(
            self.store.get(tx_id).map(|r| r.state),
            Some(CoordinatorState::Committing)
        );
        if !already_committing {
            self.store.set_committing_empty(tx_id)?;
        }

        let committed_to = self.store.get(tx_id).map(|r| r.committed_to).unwrap_or_default();
        for (i, addr) in self.config.participants.iter().enumerate() {
            if committed_to.contains(&i) {
                continue;
            }
            let outcome = client::call(
                *addr,
                &RpcRequest::Commit {
                    tx_id: tx_id.to_string(),
                },
                self.deadline(),
            )
            .await;
            match outcome {
                CallOutcome::Ok(_) => {
                    self.store.record_committed_to(tx_id, i)?;
                }
                CallOutcome::TransportError(e) => {
                    eprintln!("[coordinator] {tx_id}: Commit transport error on {addr}: {e}, will retry on recovery");
                }
                CallOutcome::DeadlineExceeded => {
                    eprintln!("[coordinator] {tx_id}: Commit timed out on {addr}, will retry on recovery");
                }
            }
        }

        let final_committed_to = self.store.get(tx_id).map(|r| r.committed_to).unwrap_or_default();
        if final_committed_to.len() == self.config.participants.len() {
            self.store.set_committed(tx_id)?;
            eprintln!("[coordinator] {tx_id}: COMMITTED");
        }
        Ok(())
    }

    /// Aborts `tx_id`. Abort delivery is advisory (§4.3 step 2): transport
    /// errors and deadlines are logged and ignored, never retried.
    pub async fn abort(&self, tx_id: &str) -> Result<()> {
        self.store.set_aborting(tx_id)?;
        for addr in &self.config.participants {
            let outcome = client::call(
                *addr,
                &RpcRequest::Abort {
                    tx_id: tx_id.to_string(),
                },
                self.deadline(),
            )
            .await;
            if let CallOutcome::TransportError(e) = outcome {
                eprintln!("[coordinator] {tx_id}: Abort transport error on {addr} (ignored): {e}");
            }
        }
        self.store.set_aborted(tx_id)?;
        eprintln!("[coordinator] {tx_id}: ABORTED");
        Ok(())
    }

    /// Startup recovery (§4.4), run once after the store has replayed its
    /// WAL. COMMITTING transactions resume commit delivery; ABORTING
    /// transactions resume abort delivery; INITIALIZED/STARTED transactions
    /// are aborted since their participants will time out locally anyway;
    /// terminal states are left alone.
    pub async fn recover(&self) -> Result<()> {
        let committing = self.store.tx_ids_in_state(CoordinatorState::Committing);
        for tx_id in committing {
            self.resume(&tx_id).await?;
        }
        let aborting = self.store.tx_ids_in_state(CoordinatorState::Aborting);
        for tx_id in aborting {
            self.abort(&tx_id).await?;
        }
        let mut stuck: Vec<TxId> = self.store.tx_ids_in_state(CoordinatorState::Initialized);
        stuck.extend(self.store.tx_ids_in_state(CoordinatorState::Started));
        for tx_id in stuck {
            self.abort(&tx_id).await?;
        }
        Ok(())
    }

    async fn resume(&self, tx_id: &str) -> Result<()> {
        eprintln!("[coordinator] recovering COMMITTING transaction {tx_id}");
        self.commit(tx_id).await
    }
}
