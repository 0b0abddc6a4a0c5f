//! Builder-style coordinator configuration, grounded on the teacher's
//! `ConnectionConfig` (`src/connection.rs`).

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// The default per-call deadline (§5): 10 seconds.
pub const DEFAULT_DEADLINE: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct CoordinatorConfig {
    /// Address the coordinator's RPC server listens on.
    pub listen_addr: SocketAddr,
    /// Ordered list of participant endpoints (§3). Index = position here;
    /// immutable after startup (§5).
    pub participants: Vec<SocketAddr>,
    /// Per-call deadline applied to every outbound RPC.
    pub deadline: Duration,
    /// Path to the coordinator's WAL file.
    pub wal_path: PathBuf,
}

impl CoordinatorConfig {
    pub fn new(listen_addr: SocketAddr, participants: Vec<SocketAddr>, wal_path: PathBuf) -> Self {
        Self {
            listen_addr,
            participants,
            deadline: DEFAULT_DEADLINE,
            wal_path,
        }
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }
}
