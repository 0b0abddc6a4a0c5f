use std::collections::BTreeSet;

use crate::error::TwoPcError;

/// Coordinator-side transaction state (§3, §4.3).
///
/// `INITIALIZED -> STARTED -> (COMMITTING | ABORTING) -> (COMMITTED | ABORTED)`.
/// States never regress (invariant 1).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinatorState {
    Initialized,
    Started,
    Committing,
    Committed,
    Aborting,
    Aborted,
}

impl CoordinatorState {
    pub fn as_str(&self) -> &'static str {
        match self {
            CoordinatorState::Initialized => "INITIALIZED",
            CoordinatorState::Started => "STARTED",
            CoordinatorState::Committing => "COMMITTING",
            CoordinatorState::Committed => "COMMITTED",
            CoordinatorState::Aborting => "ABORTING",
            CoordinatorState::Aborted => "ABORTED",
        }
    }

    pub fn parse(s: &str) -> Result<Self, TwoPcError> {
        match s {
            "INITIALIZED" => Ok(CoordinatorState::Initialized),
            "STARTED" => Ok(CoordinatorState::Started),
            "COMMITTING" => Ok(CoordinatorState::Committing),
            "COMMITTED" => Ok(CoordinatorState::Committed),
            "ABORTING" => Ok(CoordinatorState::Aborting),
            "ABORTED" => Ok(CoordinatorState::Aborted),
            other => Err(TwoPcError::Protocol(format!(
                "unknown coordinator state {other:?} in WAL record"
            ))),
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, CoordinatorState::Committed | CoordinatorState::Aborted)
    }
}

/// The coordinator's per-transaction record (§3).
///
/// `committed_to` uses a `BTreeSet` rather than a `HashSet` purely so the
/// logged `committed_to` field (§6) serializes in a stable, human-diffable
/// order; it carries no ordering semantics of its own.
#[derive(Debug, Clone)]
pub struct CoordinatorRecord {
    pub state: CoordinatorState,
    pub committed_to: BTreeSet<usize>,
}

impl CoordinatorRecord {
    pub fn new(state: CoordinatorState) -> Self {
        Self {
            state,
            committed_to: BTreeSet::new(),
        }
    }
}
