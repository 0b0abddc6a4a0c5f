//! Participant startup recovery (§4.6), run once after the WAL has been
//! replayed into the store. PREPARED is the one state where the participant
//! promised to commit but does not know the outcome, so it must ask the
//! coordinator (never itself — see the `original_source/participant.py`
//! self-dial anomaly documented in §9's Open Question and SPEC_FULL.md §1).

use std::net::SocketAddr;
use std::time::Duration;

use crate::error::Result;
use crate::rpc::client::{self, CallOutcome};
use crate::rpc::message::RpcRequest;
use crate::rpc::message::RpcResponse;

use super::state::ParticipantState;
use super::store::ParticipantStore;

pub async fn recover(
    store: &ParticipantStore,
    coordinator_addr: SocketAddr,
    fetch_commit_deadline: Duration,
) -> Result<()> {
    for tx_id in store.tx_ids_in_state(ParticipantState::Prepared) {
        let outcome = client::call(
            coordinator_addr,
            &RpcRequest::FetchCommit {
                tx_id: tx_id.clone(),
            },
            fetch_commit_deadline,
        )
        .await;
        match outcome {
            CallOutcome::Ok(RpcResponse::CommitStatus { committed: true }) => {
                store.commit(&tx_id)?;
                eprintln!("[participant] {tx_id}: recovered as COMMITTED");
            }
            CallOutcome::Ok(_) => {
                store.abort(&tx_id)?;
                eprintln!("[participant] {tx_id}: recovered as ABORTED");
            }
            CallOutcome::TransportError(e) => {
                eprintln!(
                    "[participant] {tx_id}: FetchCommit transport error during recovery ({e}), remains PREPARED"
                );
            }
            CallOutcome::DeadlineExceeded => {
                eprintln!(
                    "[participant] {tx_id}: FetchCommit timed out during recovery, remains PREPARED"
                );
            }
        }
    }

    // §4.6: a record still INITIALIZED at recovery time never got its init
    // timer running (the process restarted before it could fire), so it is
    // treated as if the timer had expired.
    for tx_id in store.tx_ids_in_state(ParticipantState::Initialized) {
        store.expire_if_still_initialized(&tx_id)?;
    }

    Ok(())
}
