use crate::error::TwoPcError;

/// Participant-side transaction state (§3, §4.5).
///
/// `INITIALIZED -> (PREPARED | ABORTED) -> (COMMITTED | ABORTED)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParticipantState {
    Initialized,
    Prepared,
    Committed,
    Aborted,
}

impl ParticipantState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParticipantState::Initialized => "INITIALIZED",
            ParticipantState::Prepared => "PREPARED",
            ParticipantState::Committed => "COMMITTED",
            ParticipantState::Aborted => "ABORTED",
        }
    }

    pub fn parse(s: &str) -> Result<Self, TwoPcError> {
        match s {
            "INITIALIZED" => Ok(ParticipantState::Initialized),
            "PREPARED" => Ok(ParticipantState::Prepared),
            "COMMITTED" => Ok(ParticipantState::Committed),
            "ABORTED" => Ok(ParticipantState::Aborted),
            other => Err(TwoPcError::Protocol(format!(
                "unknown participant state {other:?} in WAL record"
            ))),
        }
    }
}
