//! Coordinator WAL record format: `tx_id,state,committed_to` (§6), where
//! `committed_to` is a comma-separated list of participant indices, or an
//! empty field when absent.

use std::collections::BTreeSet;

use crate::error::TwoPcError;
use crate::rpc::message::TxId;

use super::state::CoordinatorState;

pub fn format_record(tx_id: &str, state: CoordinatorState, committed_to: &BTreeSet<usize>) -> String {
    let committed_to_str = committed_to
        .iter()
        .map(|i| i.to_string())
        .collect::<Vec<_>>()
        .join(",");
    format!("{tx_id},{},{committed_to_str}", state.as_str())
}

pub fn parse_record(line: &str) -> Result<(TxId, CoordinatorState, BTreeSet<usize>), TwoPcError> {
    let mut parts = line.splitn(3, ',');
    let tx_id = parts
        .next()
        .ok_or_else(|| TwoPcError::Protocol(format!("malformed coordinator WAL line: {line:?}")))?
        .to_string();
    let state_str = parts
        .next()
        .ok_or_else(|| TwoPcError::Protocol(format!("malformed coordinator WAL line: {line:?}")))?;
    let state = CoordinatorState::parse(state_str)?;
    let committed_to_str = parts.next().unwrap_or("");
    let committed_to = if committed_to_str.is_empty() {
        BTreeSet::new()
    } else {
        committed_to_str
            .split(',')
            .map(|s| {
                s.parse::<usize>().map_err(|_| {
                    TwoPcError::Protocol(format!("malformed committed_to entry {s:?} in {line:?}"))
                })
            })
            .collect::<Result<BTreeSet<usize>, TwoPcError>>()?
    };
    Ok((tx_id, state, committed_to))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_empty_committed_to_as_trailing_empty_field() {
        let line = format_record("tx1", CoordinatorState::Committing, &BTreeSet::new());
        assert_eq!(line, "tx1,COMMITTING,");
    }

    #[test]
    fn formats_committed_to_as_comma_separated_indices() {
        let mut committed_to = BTreeSet::new();
        committed_to.insert(0);
        committed_to.insert(2);
        let line = format_record("tx1", CoordinatorState::Committing, &committed_to);
        assert_eq!(line, "tx1,COMMITTING,0,2");
    }

    #[test]
    fn round_trips_through_parse() {
        let mut committed_to = BTreeSet::new();
        committed_to.insert(1);
        let line = format_record("tx7", CoordinatorState::Committing, &committed_to);
        let (tx_id, state, parsed) = parse_record(&line).unwrap();
        assert_eq!(tx_id, "tx7");
        assert_eq!(state, CoordinatorState::Committing);
        assert_eq!(parsed, committed_to);
    }

    #[test]
    fn rejects_unknown_state() {
        assert!(parse_record("tx1,BOGUS,").is_err());
    }
}
