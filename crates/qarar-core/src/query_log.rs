//! Query log collection
//!
//! Analysis sessions read query records from a `QueryLogSource`. `QueryLog`
//! is the in-memory implementation: executors append to it and sessions take
//! ordered snapshots of it.

use parking_lot::RwLock;
use std::sync::Arc;
use std::time::Duration;

use crate::QueryRecord;

/// A source of executed queries, read by analysis sessions
pub trait QueryLogSource {
    /// Whether query collection is enabled.
    ///
    /// Analysis refuses to run against a disabled source.
    fn is_enabled(&self) -> bool;

    /// All queries recorded so far, in execution order
    fn snapshot(&self) -> Vec<QueryRecord>;
}

#[derive(Debug, Default)]
struct QueryLogState {
    enabled: bool,
    entries: Vec<QueryRecord>,
}

/// Shared in-memory query log.
///
/// Clones share the same underlying entries, so an executor and a session
/// can hold separate handles to one log.
#[derive(Debug, Clone, Default)]
pub struct QueryLog {
    state: Arc<RwLock<QueryLogState>>,
}

impl QueryLog {
    /// Create a new query log
    pub fn new(enabled: bool) -> Self {
        Self {
            state: Arc::new(RwLock::new(QueryLogState {
                enabled,
                entries: Vec::new(),
            })),
        }
    }

    /// Create a log pre-filled with records (enabled)
    pub fn with_records(records: Vec<QueryRecord>) -> Self {
        Self {
            state: Arc::new(RwLock::new(QueryLogState {
                enabled: true,
                entries: records,
            })),
        }
    }

    /// Record an executed query. Dropped when collection is disabled.
    pub fn record(&self, sql: impl Into<String>, duration: Duration) {
        let mut state = self.state.write();
        if !state.enabled {
            return;
        }
        let record = QueryRecord::from_duration(sql, duration);
        tracing::trace!(
            duration_ms = record.time_ms(),
            position = state.entries.len(),
            "recording query"
        );
        state.entries.push(record);
    }

    /// Enable or disable collection
    pub fn set_enabled(&self, enabled: bool) {
        self.state.write().enabled = enabled;
    }

    /// Clear all entries
    pub fn clear(&self) {
        let mut state = self.state.write();
        tracing::debug!(entries_cleared = state.entries.len(), "clearing query log");
        state.entries.clear();
    }

    /// Get the number of entries
    pub fn len(&self) -> usize {
        self.state.read().entries.len()
    }

    /// Check if the log is empty
    pub fn is_empty(&self) -> bool {
        self.state.read().entries.is_empty()
    }
}

impl QueryLogSource for QueryLog {
    fn is_enabled(&self) -> bool {
        self.state.read().enabled
    }

    fn snapshot(&self) -> Vec<QueryRecord> {
        self.state.read().entries.clone()
    }
}
