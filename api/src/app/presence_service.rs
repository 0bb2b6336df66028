//! Presence service
//!
//! Tracks which browser sessions are currently looking at the board. Clients
//! send a heartbeat periodically; a background task sweeps expired sessions.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;

use crate::app::now_millis;
use crate::domain::entities::PresenceSet;
use crate::error::DomainError;

/// How often expired sessions are pruned
pub const SWEEP_INTERVAL: Duration = Duration::from_secs(10);

const MAX_SESSION_ID_LEN: usize = 128;

#[derive(Default)]
pub struct PresenceService {
    sessions: RwLock<PresenceSet>,
}

impl PresenceService {
    /// Record a heartbeat and return the current online count
    pub async fn heartbeat(&self, session_id: &str, now: i64) -> Result<usize, DomainError> {
        validate_session_id(session_id)?;

        let mut sessions = self.sessions.write().await;
        sessions.heartbeat(session_id, now);
        Ok(sessions.online(now))
    }

    pub async fn online(&self, now: i64) -> usize {
        self.sessions.read().await.online(now)
    }

    /// Drop expired sessions, returning how many were removed
    pub async fn sweep(&self, now: i64) -> usize {
        let mut sessions = self.sessions.write().await;
        let removed = sessions.sweep(now);
        if removed > 0 {
            tracing::debug!(removed, remaining = sessions.len(), "Swept stale presence sessions");
        }
        removed
    }

    /// Spawn the periodic sweep
    pub fn spawn_sweeper(self: Arc<Self>, every: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            loop {
                ticker.tick().await;
                self.sweep(now_millis()).await;
            }
        })
    }
}

fn validate_session_id(session_id: &str) -> Result<(), DomainError> {
    let valid = !session_id.is_empty()
        && session_id.len() <= MAX_SESSION_ID_LEN
        && session_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');

    if valid {
        Ok(())
    } else {
        Err(DomainError::Validation(format!(
            "Invalid session id: {}",
            session_id
        )))
    }
}
