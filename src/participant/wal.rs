//! Participant WAL record format: `tx_id,state` (§6).

use crate::error::TwoPcError;
use crate::rpc::message::TxId;

use super::state::ParticipantState;

pub fn format_record(tx_id: &str, state: ParticipantState) -> String {
    format!("{tx_id},{}", state.as_str())
}

pub fn parse_record(line: &str) -> Result<(TxId, ParticipantState), TwoPcError> {
    let mut parts = line.splitn(2, ',');
    let tx_id = parts
        .next()
        .ok_or_else(|| TwoPcError::Protocol(format!("malformed participant WAL line: {line:?}")))?
        .to_string();
    let state_str = parts
        .next()
        .ok_or_else(|| TwoPcError::Protocol(format!("malformed participant WAL line: {line:?}")))?;
    Ok((tx_id, ParticipantState::parse(state_str)?))
}
