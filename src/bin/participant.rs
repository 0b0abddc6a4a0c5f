//! Participant entry point.
//!
//! Usage: `tpc-participant <listen_addr> <name> <coordinator_addr> <wal_path>`
//!
//! No CLI framework is used, matching the teacher's bare `src/bin/server.rs`.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use two_phase_commit::ParticipantConfig;
use two_phase_commit::ParticipantService;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = std::env::args().skip(1);
    let usage = "usage: tpc-participant <listen_addr> <name> <coordinator_addr> <wal_path>";
    let listen_addr: SocketAddr = args.next().ok_or(usage)?.parse()?;
    let name = args.next().ok_or(usage)?;
    let coordinator_addr: SocketAddr = args.next().ok_or(usage)?.parse()?;
    let wal_path: PathBuf = args.next().ok_or(usage)?.into();

    let config = ParticipantConfig::new(listen_addr, name, coordinator_addr, wal_path);
    let service = Arc::new(ParticipantService::open(config).await?);
    eprintln!("[participant] listening on {listen_addr}");
    let listener = service.bind().await?;
    service.serve_on(listener).await?;
    Ok(())
}
