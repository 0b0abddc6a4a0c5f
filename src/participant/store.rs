//! The participant's durable state (§4.1, §5), mirroring
//! `coordinator::store::CoordinatorStore` but with the simpler
//! `tx_id,state` record and an extra, deliberately *non*-durable
//! `db_access_restricted` flag: the failure-injection toggle is process
//! runtime state, not a transaction fact, so it lives outside the WAL-backed
//! mutex and is never logged or replayed (matches
//! `original_source/participant.py`, where `db_access_restricted` is a plain
//! instance attribute, not a sqlite column).

use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;

use crate::error::Result;
use crate::rpc::message::TxId;
use crate::storage::wal::LineWal;

use super::state::ParticipantState;
use super::wal::{format_record, parse_record};

struct Inner {
    table: HashMap<TxId, ParticipantState>,
    wal: LineWal,
}

pub struct ParticipantStore {
    inner: Mutex<Inner>,
    db_access_restricted: AtomicBool,
}

impl ParticipantStore {
    pub fn open<P: AsRef<Path>>(wal_path: P) -> Result<Self> {
        let mut wal = LineWal::open(wal_path)?;
        let mut table = HashMap::new();
        for line in wal.read_all()? {
            let (tx_id, state) = parse_record(&line)?;
            table.insert(tx_id, state);
        }
        wal.truncate()?;
        Ok(Self {
            inner: Mutex::new(Inner { table, wal }),
            db_access_restricted: AtomicBool::new(false),
        })
    }

    pub fn get(&self, tx_id: &str) -> Option<ParticipantState> {
        self.inner.lock().table.get(tx_id).copied()
    }

    pub fn tx_ids_in_state(&self, state: ParticipantState) -> Vec<TxId> {
        self.inner
            .lock()
            .table
            .iter()
            .filter(|(_, s)| **s == state)
            .map(|(tx_id, _)| tx_id.clone())
            .collect()
    }

    /// Appends the WAL line and applies it to the table. Callers that need
    /// to check the existing state first must hold `inner` across both the
    /// check and this call (see `initialize_if_absent`,
    /// `expire_if_still_initialized`, `prepare`) — a separate lock/unlock
    /// around the check would let a concurrent mutation land in between and
    /// silently clobber it.
    fn apply_locked(inner: &mut Inner, tx_id: &str, state: ParticipantState) -> Result<()> {
        let line = format_record(tx_id, state);
        inner.wal.append(&line)?;
        inner.table.insert(tx_id.to_string(), state);
        Ok(())
    }

    fn log_and_apply(&self, tx_id: &str, state: ParticipantState) -> Result<()> {
        let mut inner = self.inner.lock();
        Self::apply_locked(&mut inner, tx_id, state)
    }

    /// Initialize is idempotent: a record is created as INITIALIZED only if
    /// absent (§4.2); an existing record, of any state, is left untouched.
    /// Returns `true` if a new record was created (the caller should arm the
    /// init timer only in that case). Check and write happen under one lock
    /// acquisition so a concurrent Prepare/expire can't interleave between
    /// the existence check and the insert.
    pub fn initialize_if_absent(&self, tx_id: &str) -> Result<bool> {
        let mut inner = self.inner.lock();
        if inner.table.contains_key(tx_id) {
            return Ok(false);
        }
        Self::apply_locked(&mut inner, tx_id, ParticipantState::Initialized)?;
        Ok(true)
    }

    /// The init-timer firing (§4.5): aborts the transaction only if it is
    /// still INITIALIZED — a Prepare that arrived in the meantime must not
    /// be clobbered. The state check and the abort write happen under one
    /// lock acquisition, not two, so a concurrent Prepare can't land a
    /// PREPARED transition in the gap and have this silently stomp it back
    /// to ABORTED.
    pub fn expire_if_still_initialized(&self, tx_id: &str) -> Result<()> {
        let mut inner = self.inner.lock();
        if matches!(inner.table.get(tx_id), Some(ParticipantState::Initialized)) {
            Self::apply_locked(&mut inner, tx_id, ParticipantState::Aborted)?;
        }
        Ok(())
    }

    /// Prepare (§4.5): votes YES and transitions INITIALIZED -> PREPARED, or
    /// returns the existing YES for an already-PREPARED transaction without
    /// re-logging. Votes NO (no mutation) otherwise, including when db
    /// access is restricted or the transaction is unknown. The read of the
    /// current state and the PREPARED write happen under one lock
    /// acquisition so a concurrent init-timer expiry can't race between
    /// them.
    pub fn prepare(&self, tx_id: &str) -> Result<bool> {
        if self.db_access_restricted.load(Ordering::SeqCst) {
            return Ok(false);
        }
        let mut inner = self.inner.lock();
        match inner.table.get(tx_id).copied() {
            Some(ParticipantState::Prepared) => Ok(true),
            Some(ParticipantState::Initialized) => {
                Self::apply_locked(&mut inner, tx_id, ParticipantState::Prepared)?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// Commit (§4.5): unconditional, idempotent.
    pub fn commit(&self, tx_id: &str) -> Result<()> {
        self.log_and_apply(tx_id, ParticipantState::Committed)
    }

    /// Abort (§4.5): unconditional, idempotent, even for an unknown TxId
    /// (Open Question 2 — matches the original's unconditional write).
    pub fn abort(&self, tx_id: &str) -> Result<()> {
        self.log_and_apply(tx_id, ParticipantState::Aborted)
    }

    pub fn is_committed(&self, tx_id: &str) -> bool {
        matches!(self.get(tx_id), Some(ParticipantState::Committed))
    }

    pub fn restrict_db_access(&self) {
        self.db_access_restricted.store(true, Ordering::SeqCst);
    }

    pub fn allow_db_access(&self) {
        self.db_access_restricted.store(false, Ordering::SeqCst);
    }

    pub fn is_db_access_restricted(&self) -> bool {
        self.db_access_restricted.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initialize_is_idempotent_on_existing_record() {
        let dir = tempfile::tempdir().unwrap();
        let store = ParticipantStore::open(dir.path().join("p.wal")).unwrap();
        assert!(store.initialize_if_absent("tx1").unwrap());
        store.prepare("tx1").unwrap();
        assert!(!store.initialize_if_absent("tx1").unwrap());
        assert_eq!(store.get("tx1"), Some(ParticipantState::Prepared));
    }

    #[test]
    fn prepare_votes_no_when_db_access_restricted() {
        let dir = tempfile::tempdir().unwrap();
        let store = ParticipantStore::open(dir.path().join("p.wal")).unwrap();
        store.initialize_if_absent("tx1").unwrap();
        store.restrict_db_access();
        assert_eq!(store.prepare("tx1").unwrap(), false);
        assert_eq!(store.get("tx1"), Some(ParticipantState::Initialized));
    }

    #[test]
    fn re_prepare_on_prepared_returns_yes_without_mutation() {
        let dir = tempfile::tempdir().unwrap();
        let store = ParticipantStore::open(dir.path().join("p.wal")).unwrap();
        store.initialize_if_absent("tx1").unwrap();
        assert!(store.prepare("tx1").unwrap());
        assert!(store.prepare("tx1").unwrap());
        assert_eq!(store.get("tx1"), Some(ParticipantState::Prepared));
    }

    #[test]
    fn prepare_on_unknown_tx_votes_no() {
        let dir = tempfile::tempdir().unwrap();
        let store = ParticipantStore::open(dir.path().join("p.wal")).unwrap();
        assert_eq!(store.prepare("ghost").unwrap(), false);
    }

    #[test]
    fn commit_and_abort_are_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = ParticipantStore::open(dir.path().join("p.wal")).unwrap();
        store.commit("tx6").unwrap();
        store.commit("tx6").unwrap();
        assert!(store.is_committed("tx6"));
    }

    #[test]
    fn abort_on_unknown_tx_stores_aborted() {
        let dir = tempfile::tempdir().unwrap();
        let store = ParticipantStore::open(dir.path().join("p.wal")).unwrap();
        store.abort("ghost").unwrap();
        assert_eq!(store.get("ghost"), Some(ParticipantState::Aborted));
    }

    #[test]
    fn expire_only_acts_on_still_initialized() {
        let dir = tempfile::tempdir().unwrap();
        let store = ParticipantStore::open(dir.path().join("p.wal")).unwrap();
        store.initialize_if_absent("tx1").unwrap();
        store.prepare("tx1").unwrap();
        store.expire_if_still_initialized("tx1").unwrap();
        assert_eq!(store.get("tx1"), Some(ParticipantState::Prepared));
    }

    #[test]
    fn replay_recovers_prepared_state() {
        let dir = tempfile::tempdir().unwrap();
        let wal_path = dir.path().join("p.wal");
        {
            let store = ParticipantStore::open(&wal_path).unwrap();
            store.initialize_if_absent("tx1").unwrap();
            store.prepare("tx1").unwrap();
        }
        let store = ParticipantStore::open(&wal_path).unwrap();
        assert_eq!(store.get("tx1"), Some(ParticipantState::Prepared));
    }
}
