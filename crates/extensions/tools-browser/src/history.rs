//! Bounded record of executed actions.

use std::collections::{HashMap, VecDeque};

use parking_lot::RwLock;
use serde::Serialize;

use pagepilot_protocols::ActionExecutionResult;

/// Default number of entries kept across all sessions.
pub const DEFAULT_HISTORY_CAPACITY: usize = 100;

/// One recorded action.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    /// Per-session, starting at 1, never reused within a session.
    pub sequence: u64,
    pub session_id: String,
    pub result: ActionExecutionResult,
}

/// Aggregates over the retained entries of one session.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStats {
    pub total_actions: usize,
    pub successful: usize,
    pub failed: usize,
    /// Mean duration in milliseconds.
    pub average_duration_ms: f64,
    /// Actions that needed more than one attempt.
    pub retried: usize,
}

#[derive(Default)]
struct Inner {
    entries: VecDeque<HistoryEntry>,
    sequences: HashMap<String, u64>,
}

/// Process-wide circular buffer of action results, shared via `Arc`.
/// The oldest entry is evicted once capacity is exceeded.
///
/// Sequence counters are kept per session and outlive eviction, so a session
/// whose entries were all evicted still continues its numbering. One counter
/// per session seen stays allocated until [`clear_session`](Self::clear_session)
/// or [`clear`](Self::clear) runs; long-lived processes should clear sessions
/// they are done with.
pub struct ActionHistory {
    inner: RwLock<Inner>,
    capacity: usize,
}

impl ActionHistory {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_HISTORY_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: RwLock::new(Inner::default()),
            capacity: capacity.max(1),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Record `result` and return its sequence number within the session.
    pub fn add_entry(&self, result: ActionExecutionResult, session_id: &str) -> u64 {
        let mut inner = self.inner.write();
        let counter = inner.sequences.entry(session_id.to_string()).or_insert(0);
        *counter += 1;
        let sequence = *counter;

        inner.entries.push_back(HistoryEntry {
            sequence,
            session_id: session_id.to_string(),
            result,
        });
        while inner.entries.len() > self.capacity {
            inner.entries.pop_front();
        }
        sequence
    }

    /// Entries of one session, oldest first.
    pub fn get_by_session(&self, session_id: &str) -> Vec<HistoryEntry> {
        self.inner
            .read()
            .entries
            .iter()
            .filter(|e| e.session_id == session_id)
            .cloned()
            .collect()
    }

    /// The last `n` entries across all sessions, oldest first.
    pub fn get_recent(&self, n: usize) -> Vec<HistoryEntry> {
        let inner = self.inner.read();
        let skip = inner.entries.len().saturating_sub(n);
        inner.entries.iter().skip(skip).cloned().collect()
    }

    /// Failed entries, optionally restricted to one session.
    pub fn get_failures(&self, session_id: Option<&str>) -> Vec<HistoryEntry> {
        self.inner
            .read()
            .entries
            .iter()
            .filter(|e| !e.result.success)
            .filter(|e| session_id.is_none_or(|s| e.session_id == s))
            .cloned()
            .collect()
    }

    /// Zeroed for sessions with no retained entries.
    pub fn get_session_stats(&self, session_id: &str) -> SessionStats {
        let inner = self.inner.read();
        let mut stats = SessionStats::default();
        let mut total_duration = 0u64;
        for entry in inner.entries.iter().filter(|e| e.session_id == session_id) {
            stats.total_actions += 1;
            if entry.result.success {
                stats.successful += 1;
            } else {
                stats.failed += 1;
            }
            if entry.result.attempts_count > 1 {
                stats.retried += 1;
            }
            total_duration += entry.result.duration;
        }
        if stats.total_actions > 0 {
            stats.average_duration_ms = total_duration as f64 / stats.total_actions as f64;
        }
        stats
    }

    pub fn len(&self) -> usize {
        self.inner.read().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().entries.is_empty()
    }

    /// Sessions holding a sequence counter, including fully evicted ones.
    pub fn tracked_sessions(&self) -> usize {
        self.inner.read().sequences.len()
    }

    /// Drop every entry and reset all sequence counters.
    pub fn clear(&self) {
        let mut inner = self.inner.write();
        inner.entries.clear();
        inner.sequences.clear();
    }

    /// Drop one session's entries and reset its sequence counter.
    pub fn clear_session(&self, session_id: &str) {
        let mut inner = self.inner.write();
        inner.entries.retain(|e| e.session_id != session_id);
        inner.sequences.remove(session_id);
    }
}

impl Default for ActionHistory {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use pagepilot_protocols::action::ClickParameters;
    use pagepilot_protocols::{
        ActionCommand, ActionError, ActionParameters, DetectedChanges, ElementTarget,
    };

    fn result(session: &str, success: bool, millis: u64) -> ActionExecutionResult {
        let cmd = ActionCommand::new(
            ElementTarget::selector("#buy"),
            ActionParameters::Click(ClickParameters::default()),
            session,
        );
        let duration = Duration::from_millis(millis);
        if success {
            ActionExecutionResult::succeeded(cmd, DetectedChanges::default(), duration)
        } else {
            ActionExecutionResult::failed(cmd, ActionError::not_found("#buy"), duration)
        }
    }

    const A: &str = "0b8f5a6e-1111-4c2d-8e3f-000000000001";
    const B: &str = "0b8f5a6e-2222-4c2d-8e3f-000000000002";

    #[test]
    fn test_sequences_are_per_session() {
        let history = ActionHistory::new();
        assert_eq!(history.add_entry(result(A, true, 10), A), 1);
        assert_eq!(history.add_entry(result(B, true, 10), B), 1);
        assert_eq!(history.add_entry(result(A, false, 10), A), 2);
        assert_eq!(history.get_by_session(A).len(), 2);
        assert_eq!(history.len(), 3);
    }

    #[test]
    fn test_eviction_is_global_fifo() {
        let history = ActionHistory::with_capacity(3);
        history.add_entry(result(A, true, 1), A);
        history.add_entry(result(B, true, 2), B);
        history.add_entry(result(A, true, 3), A);
        history.add_entry(result(B, true, 4), B);

        assert_eq!(history.len(), 3);
        let a = history.get_by_session(A);
        assert_eq!(a.len(), 1);
        assert_eq!(a[0].sequence, 2);
        // Eviction never rewinds a counter.
        assert_eq!(history.add_entry(result(A, true, 5), A), 3);
    }

    #[test]
    fn test_recent_and_failures() {
        let history = ActionHistory::new();
        history.add_entry(result(A, true, 1), A);
        history.add_entry(result(A, false, 2), A);
        history.add_entry(result(B, false, 3), B);

        let recent = history.get_recent(2);
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].session_id, A);
        assert_eq!(recent[1].session_id, B);
        assert_eq!(history.get_recent(10).len(), 3);

        assert_eq!(history.get_failures(None).len(), 2);
        assert_eq!(history.get_failures(Some(B)).len(), 1);
    }

    #[test]
    fn test_session_stats() {
        let history = ActionHistory::new();
        history.add_entry(result(A, true, 100), A);
        history.add_entry(result(A, true, 300).with_attempts(2), A);
        history.add_entry(result(A, false, 200), A);

        let stats = history.get_session_stats(A);
        assert_eq!(stats.total_actions, 3);
        assert_eq!(stats.successful, 2);
        assert_eq!(stats.failed, 1);
        assert_eq!(stats.retried, 1);
        assert_eq!(stats.average_duration_ms, 200.0);

        assert_eq!(history.get_session_stats(B), SessionStats::default());
    }

    #[test]
    fn test_clear_session_resets_counter() {
        let history = ActionHistory::new();
        history.add_entry(result(A, true, 1), A);
        history.add_entry(result(B, true, 1), B);
        history.clear_session(A);

        assert!(history.get_by_session(A).is_empty());
        assert_eq!(history.get_by_session(B).len(), 1);
        assert_eq!(history.add_entry(result(A, true, 1), A), 1);

        history.clear();
        assert!(history.is_empty());
        assert_eq!(history.add_entry(result(B, true, 1), B), 1);
    }

    #[test]
    fn test_counters_outlive_eviction_until_cleared() {
        let history = ActionHistory::with_capacity(1);
        history.add_entry(result(A, true, 1), A);
        history.add_entry(result(B, true, 1), B);

        assert!(history.get_by_session(A).is_empty());
        assert_eq!(history.tracked_sessions(), 2);

        history.clear_session(A);
        assert_eq!(history.tracked_sessions(), 1);
        history.clear();
        assert_eq!(history.tracked_sessions(), 0);
    }
}
