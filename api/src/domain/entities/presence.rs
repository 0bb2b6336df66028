//! Presence domain entity
//!
//! A TTL-keyed set of browser sessions. A session counts as online while its
//! last heartbeat is younger than the TTL.

use std::collections::HashMap;

/// Sessions older than this are considered gone
pub const PRESENCE_TTL_MS: i64 = 30_000;

#[derive(Debug, Clone)]
pub struct PresenceSet {
    ttl_ms: i64,
    last_seen: HashMap<String, i64>,
}

impl Default for PresenceSet {
    fn default() -> Self {
        Self::new(PRESENCE_TTL_MS)
    }
}

impl PresenceSet {
    pub fn new(ttl_ms: i64) -> Self {
        Self {
            ttl_ms,
            last_seen: HashMap::new(),
        }
    }

    /// Record a heartbeat for a session
    pub fn heartbeat(&mut self, session_id: &str, now: i64) {
        self.last_seen.insert(session_id.to_string(), now);
    }

    /// Number of sessions seen within the TTL
    pub fn online(&self, now: i64) -> usize {
        self.last_seen
            .values()
            .filter(|&&seen| !self.is_expired(seen, now))
            .count()
    }

    /// Drop expired sessions, returning how many were removed
    pub fn sweep(&mut self, now: i64) -> usize {
        let ttl_ms = self.ttl_ms;
        let before = self.last_seen.len();
        self.last_seen.retain(|_, seen| now.saturating_sub(*seen) <= ttl_ms);
        before - self.last_seen.len()
    }

    pub fn len(&self) -> usize {
        self.last_seen.len()
    }

    fn is_expired(&self, seen: i64, now: i64) -> bool {
        now.saturating_sub(seen) > self.ttl_ms
    }
}
