//! Builder-style participant configuration, grounded on the teacher's
//! `ConnectionConfig` (`src/connection.rs`).

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Default init-timer duration (§4.5, §5): 10 seconds.
pub const DEFAULT_INIT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct ParticipantConfig {
    /// Address this participant's RPC server listens on.
    pub listen_addr: SocketAddr,
    /// Human-readable name, used only in log lines.
    pub name: String,
    /// The coordinator's address, used for `FetchCommit` during recovery.
    pub coordinator_addr: SocketAddr,
    /// Path to this participant's WAL file.
    pub wal_path: PathBuf,
    /// How long an INITIALIZED transaction waits before the local timer
    /// aborts it (§4.5).
    pub init_timeout: Duration,
    /// Deadline applied to the `FetchCommit` call made during recovery.
    pub fetch_commit_deadline: Duration,
}

impl ParticipantConfig {
    pub fn new(
        listen_addr: SocketAddr,
        name: impl Into<String>,
        coordinator_addr: SocketAddr,
        wal_path: PathBuf,
    ) -> Self {
        Self {
            listen_addr,
            name: name.into(),
            coordinator_addr,
            wal_path,
            init_timeout: DEFAULT_INIT_TIMEOUT,
            fetch_commit_deadline: crate::coordinator::config::DEFAULT_DEADLINE,
        }
    }

    pub fn with_init_timeout(mut self, timeout: Duration) -> Self {
        self.init_timeout = timeout;
        self
    }

    pub fn with_fetch_commit_deadline(mut self, deadline: Duration) -> Self {
        self.fetch_commit_deadline = deadline;
        self
    }
}
