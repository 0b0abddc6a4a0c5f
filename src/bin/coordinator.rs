//! Coordinator entry point.
//!
//! Usage: `tpc-coordinator <listen_addr> <wal_path> <participant_addr>...`
//!
//! No CLI framework is used, matching the teacher's bare `src/bin/server.rs`.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use two_phase_commit::CoordinatorConfig;
use two_phase_commit::CoordinatorService;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = std::env::args().skip(1);
    let listen_addr: SocketAddr = args
        .next()
        .ok_or("usage: tpc-coordinator <listen_addr> <wal_path> <participant_addr>...")?
        .parse()?;
    let wal_path: PathBuf = args
        .next()
        .ok_or("usage: tpc-coordinator <listen_addr> <wal_path> <participant_addr>...")?
        .into();
    let participants: Vec<SocketAddr> = args
        .map(|a| a.parse())
        .collect::<Result<_, _>>()?;
    if participants.is_empty() {
        return Err("at least one participant address is required".into());
    }

    let config = CoordinatorConfig::new(listen_addr, participants, wal_path);
    let service = Arc::new(CoordinatorService::open(config).await?);
    eprintln!("[coordinator] listening on {listen_addr}");
    service.serve().await?;
    Ok(())
}
