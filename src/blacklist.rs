// src/blacklist.rs
// Failed-attempt counter and blacklist escalation, persisted in the
// key-value store. Timestamps are milliseconds of the page clock.

use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::store::KeyValueStore;

const BLACKLIST_KEY: &str = "blacklist";
const FAILED_ATTEMPTS_KEY: &str = "failed_attempts";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct AttemptReason {
    pub reason: String,
    pub timestamp: u64,
}

/// Per-client failure counter. Exists only below the escalation threshold;
/// the threshold-th attempt converts it into a [`BlacklistEntry`].
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct FailedAttemptRecord {
    pub count: u32,
    #[serde(default)]
    pub reasons: Vec<AttemptReason>,
    #[serde(default)]
    pub first_attempt: u64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct BlacklistEntry {
    pub added: u64,
    pub expires: u64,
    #[serde(default)]
    pub reasons: Vec<AttemptReason>,
}

impl BlacklistEntry {
    pub fn is_active(&self, now_ms: u64) -> bool {
        now_ms < self.expires
    }
}

/// Result of recording one failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptOutcome {
    Recorded { count: u32 },
    Escalated,
}

/// Owner of the attempt/blacklist state machine. Constructed once per
/// page-load context; storage faults degrade to empty state throughout.
/// Concurrent tabs share the persisted maps without locking and can lose
/// updates to each other; the store is best-effort, not authoritative.
pub struct BlacklistStore<'a, S: KeyValueStore> {
    store: &'a S,
    max_failed_attempts: u32,
    blacklist_duration_secs: u64,
}

impl<'a, S: KeyValueStore> BlacklistStore<'a, S> {
    pub fn new(store: &'a S, cfg: &Config) -> Self {
        BlacklistStore {
            store,
            max_failed_attempts: cfg.max_failed_attempts,
            blacklist_duration_secs: cfg.blacklist_duration_secs,
        }
    }

    /// Read-only check against the persisted blacklist: an expired entry is
    /// treated as absent. Never mutates; expired entries are swept by
    /// [`cleanup_expired`](Self::cleanup_expired).
    pub fn is_blacklisted(&self, client_id: &str) -> bool {
        self.is_blacklisted_at(client_id, now_ms())
    }

    pub(crate) fn is_blacklisted_at(&self, client_id: &str, now_ms: u64) -> bool {
        self.load_blacklist()
            .get(client_id)
            .map(|entry| entry.is_active(now_ms))
            .unwrap_or(false)
    }

    /// Appends one `{reason, timestamp}` to the client's attempt record and
    /// persists the map. The threshold-th call escalates: the record is
    /// removed and a blacklist entry carrying its reasons is created.
    pub fn record_failed_attempt(&self, client_id: &str, reason: &str) -> AttemptOutcome {
        self.record_failed_attempt_at(client_id, reason, now_ms())
    }

    pub(crate) fn record_failed_attempt_at(
        &self,
        client_id: &str,
        reason: &str,
        now_ms: u64,
    ) -> AttemptOutcome {
        let mut attempts = self.load_attempts();
        let mut record = attempts
            .remove(client_id)
            .unwrap_or_else(|| FailedAttemptRecord {
                count: 0,
                reasons: Vec::new(),
                first_attempt: now_ms,
            });
        record.count += 1;
        record.reasons.push(AttemptReason {
            reason: reason.to_string(),
            timestamp: now_ms,
        });

        if record.count >= self.max_failed_attempts {
            let mut blacklist = self.load_blacklist();
            blacklist.insert(
                client_id.to_string(),
                BlacklistEntry {
                    added: now_ms,
                    expires: now_ms + self.blacklist_duration_secs * 1000,
                    reasons: record.reasons,
                },
            );
            self.save_blacklist(&blacklist);
            self.save_attempts(&attempts);
            AttemptOutcome::Escalated
        } else {
            let count = record.count;
            attempts.insert(client_id.to_string(), record);
            self.save_attempts(&attempts);
            AttemptOutcome::Recorded { count }
        }
    }

    /// Sweeps expired entries and rewrites storage. Runs once per page-load
    /// lifecycle, at flow construction. Returns the number removed.
    pub fn cleanup_expired(&self) -> usize {
        self.cleanup_expired_at(now_ms())
    }

    pub(crate) fn cleanup_expired_at(&self, now_ms: u64) -> usize {
        let mut blacklist = self.load_blacklist();
        let before = blacklist.len();
        blacklist.retain(|_, entry| entry.is_active(now_ms));
        let removed = before - blacklist.len();
        if removed > 0 {
            self.save_blacklist(&blacklist);
        }
        removed
    }

    /// The active entry for a client, if any. Never mutates.
    pub fn active_entry(&self, client_id: &str, now_ms: u64) -> Option<BlacklistEntry> {
        self.load_blacklist()
            .remove(client_id)
            .filter(|entry| entry.is_active(now_ms))
    }

    pub(crate) fn attempt_record(&self, client_id: &str) -> Option<FailedAttemptRecord> {
        self.load_attempts().remove(client_id)
    }

    fn load_blacklist(&self) -> HashMap<String, BlacklistEntry> {
        load_map(self.store, BLACKLIST_KEY)
    }

    fn save_blacklist(&self, blacklist: &HashMap<String, BlacklistEntry>) {
        save_map(self.store, BLACKLIST_KEY, blacklist);
    }

    fn load_attempts(&self) -> HashMap<String, FailedAttemptRecord> {
        load_map(self.store, FAILED_ATTEMPTS_KEY)
    }

    fn save_attempts(&self, attempts: &HashMap<String, FailedAttemptRecord>) {
        save_map(self.store, FAILED_ATTEMPTS_KEY, attempts);
    }
}

/// Missing key, unreadable store, or corrupt JSON all land as an empty map.
fn load_map<T: for<'de> Deserialize<'de>>(
    store: &impl KeyValueStore,
    key: &str,
) -> HashMap<String, T> {
    store
        .get(key)
        .ok()
        .flatten()
        .and_then(|raw| serde_json::from_slice(&raw).ok())
        .unwrap_or_default()
}

fn save_map<T: Serialize>(store: &impl KeyValueStore, key: &str, map: &HashMap<String, T>) {
    if let Ok(raw) = serde_json::to_vec(map) {
        let _ = store.set(key, &raw);
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
