//! Telemetry record types

use serde::Serialize;

use crate::controller::poller::PollStats;

/// One status snapshot, written as a single JSONL line.
#[derive(Debug, Clone, Serialize)]
pub struct StatusRecord {
    /// RFC 3339 timestamp of the snapshot
    pub timestamp: String,
    /// Controller family that produced the stats
    pub family: String,
    /// Poll counters at the time of the snapshot
    pub stats: PollStats,
}

impl StatusRecord {
    /// Creates a record stamped with the current time.
    #[must_use]
    pub fn now(family: &str, stats: PollStats) -> Self {
        Self {
            timestamp: chrono::Utc::now().to_rfc3339(),
            family: family.to_string(),
            stats,
        }
    }
}
