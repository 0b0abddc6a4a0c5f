//! The coordinator's durable state: an in-memory table guarded by a single
//! `parking_lot::Mutex` that also owns the WAL, so every mutation appends
//! before it applies (§4.1, §5). Grounded on the teacher's `Connection`
//! (`src/connection.rs`), which likewise owns its WAL and table behind one
//! lock for the lifetime of the process.

use std::collections::{BTreeSet, HashMap};
use std::path::Path;

use parking_lot::Mutex;

use crate::error::Result;
use crate::rpc::message::TxId;
use crate::storage::wal::LineWal;

use super::state::{CoordinatorRecord, CoordinatorState};
use super::wal::{format_record, parse_record};

struct Inner {
    table: HashMap<TxId, CoordinatorRecord>,
    wal: LineWal,
}

pub struct CoordinatorStore {
    inner: Mutex<Inner>,
}

impl CoordinatorStore {
    /// Opens the store, replaying any existing WAL into the table (§4.1 step
    /// 1) before returning. Replay is last-writer-wins per TxId and is safe
    /// to run against a WAL written by a crashed prior process.
    pub fn open<P: AsRef<Path>>(wal_path: P) -> Result<Self> {
        let mut wal = LineWal::open(wal_path)?;
        let mut table = HashMap::new();
        for line in wal.read_all()? {
            let (tx_id, state, committed_to) = parse_record(&line)?;
            table.insert(tx_id, CoordinatorRecord { state, committed_to });
        }
        wal.truncate()?;
        Ok(Self {
            inner: Mutex::new(Inner { table, wal }),
        })
    }

    pub fn get(&self, tx_id: &str) -> Option<CoordinatorRecord> {
        self.inner.lock().table.get(tx_id).cloned()
    }

    /// TxIds currently in `state`, used by recovery (§4.4) to find
    /// COMMITTING/ABORTING transactions to resume.
    pub fn tx_ids_in_state(&self, state: CoordinatorState) -> Vec<TxId> {
        self.inner
            .lock()
            .table
            .iter()
            .filter(|(_, record)| record.state == state)
            .map(|(tx_id, _)| tx_id.clone())
            .collect()
    }

    /// Appends the WAL line and applies it to the table. Callers that need
    /// to read-then-write (`record_committed_to`, `set_committed`) must hold
    /// `inner` across both the read and this call — acquiring and releasing
    /// the lock twice would let a concurrent mutation of the same `tx_id`
    /// land in the gap and be silently lost, violating §5's requirement
    /// that the `committed_to` update is atomic per acknowledgment.
    fn apply_locked(
        inner: &mut Inner,
        tx_id: &str,
        state: CoordinatorState,
        committed_to: BTreeSet<usize>,
    ) -> Result<()> {
        let line = format_record(tx_id, state, &committed_to);
        inner.wal.append(&line)?;
        inner
            .table
            .insert(tx_id.to_string(), CoordinatorRecord { state, committed_to });
        Ok(())
    }

    fn log_and_apply(
        &self,
        tx_id: &str,
        state: CoordinatorState,
        committed_to: BTreeSet<usize>,
    ) -> Result<()> {
        let mut inner = self.inner.lock();
        Self::apply_locked(&mut inner, tx_id, state, committed_to)
    }

    pub fn set_initialized(&self, tx_id: &str) -> Result<()> {
        self.log_and_apply(tx_id, CoordinatorState::Initialized, BTreeSet::new())
    }

    pub fn set_started(&self, tx_id: &str) -> Result<()> {
        self.log_and_apply(tx_id, CoordinatorState::Started, BTreeSet::new())
    }

    pub fn set_committing_empty(&self, tx_id: &str) -> Result<()> {
        self.log_and_apply(tx_id, CoordinatorState::Committing, BTreeSet::new())
    }

    /// Extends `committed_to` with `participant_index` and re-logs the
    /// `COMMITTING` record. Logged between individual Commit calls per the
    /// §4.3 "critical design decision" so recovery can retry exactly the
    /// participants still missing. The set update and the WAL append happen
    /// under one lock acquisition so the updated `committed_to` is never
    /// observable to a concurrent reader before it is durable.
    pub fn record_committed_to(&self, tx_id: &str, participant_index: usize) -> Result<()> {
        let mut inner = self.inner.lock();
        let committed_to = {
            let record = inner
                .table
                .entry(tx_id.to_string())
                .or_insert_with(|| CoordinatorRecord::new(CoordinatorState::Committing));
            record.committed_to.insert(participant_index);
            record.committed_to.clone()
        };
        Self::apply_locked(&mut inner, tx_id, CoordinatorState::Committing, committed_to)
    }

    pub fn set_committed(&self, tx_id: &str) -> Result<()> {
        let mut inner = self.inner.lock();
        let committed_to = inner
            .table
            .get(tx_id)
            .map(|r| r.committed_to.clone())
            .unwrap_or_default();
        Self::apply_locked(&mut inner, tx_id, CoordinatorState::Committed, committed_to)
    }

    pub fn set_aborting(&self, tx_id: &str) -> Result<()> {
        self.log_and_apply(tx_id, CoordinatorState::Aborting, BTreeSet::new())
    }

    pub fn set_aborted(&self, tx_id: &str) -> Result<()> {
        self.log_and_apply(tx_id, CoordinatorState::Aborted, BTreeSet::new())
    }

    /// Used by the `FetchCommit` RPC handler (§4.2): true iff the
    /// transaction's current state is COMMITTED.
    pub fn is_committed(&self, tx_id: &str) -> bool {
        matches!(
            self.get(tx_id).map(|r| r.state),
            Some(CoordinatorState::Committed)
        )
    }
}
