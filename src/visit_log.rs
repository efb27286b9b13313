// src/visit_log.rs
// Bounded log of recent bot visits, persisted in the key-value store.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::store::KeyValueStore;

const BOT_VISITS_KEY: &str = "bot_visits";

/// Newest records win; the log never grows past this.
pub const VISIT_LOG_LIMIT: usize = 100;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct BotVisit {
    pub timestamp: u64,
    pub user_agent: String,
    pub reason: String,
    /// Fingerprint summary, the derived client identifier in practice.
    pub fingerprint: String,
}

/// Appends one visit record, dropping the oldest past the limit. Storage
/// faults are swallowed; the log is informational only.
pub fn record_bot_visit(
    store: &impl KeyValueStore,
    user_agent: &str,
    reason: &str,
    fingerprint: &str,
) {
    record_bot_visit_at(store, user_agent, reason, fingerprint, now_ms());
}

pub(crate) fn record_bot_visit_at(
    store: &impl KeyValueStore,
    user_agent: &str,
    reason: &str,
    fingerprint: &str,
    now_ms: u64,
) {
    let mut visits = recent_visits(store);
    visits.push(BotVisit {
        timestamp: now_ms,
        user_agent: user_agent.to_string(),
        reason: reason.to_string(),
        fingerprint: fingerprint.to_string(),
    });
    if visits.len() > VISIT_LOG_LIMIT {
        let excess = visits.len() - VISIT_LOG_LIMIT;
        visits.drain(..excess);
    }
    if let Ok(raw) = serde_json::to_vec(&visits) {
        let _ = store.set(BOT_VISITS_KEY, &raw);
    }
}

/// Oldest-first list of recorded visits; empty on any storage fault.
pub fn recent_visits(store: &impl KeyValueStore) -> Vec<BotVisit> {
    store
        .get(BOT_VISITS_KEY)
        .ok()
        .flatten()
        .and_then(|raw| serde_json::from_slice(&raw).ok())
        .unwrap_or_default()
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
