//! Sessions waiting for their login code between send-code and login.

use phone_lookup::Session;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Entry in the pending-login store with expiration tracking.
struct PendingEntry {
    session: Session,
    expires_at: Instant,
}

/// In-memory store of sessions with a login code outstanding, keyed by
/// phone number.
///
/// Entries expire after the configured TTL. Expired or replaced sessions are
/// closed, never handed out.
#[derive(Clone)]
pub struct PendingLogins {
    entries: Arc<RwLock<HashMap<String, PendingEntry>>>,
    ttl: Duration,
}

impl PendingLogins {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    /// Spawn a background task that periodically closes expired sessions.
    pub fn spawn_cleanup(&self) -> tokio::task::JoinHandle<()> {
        let store = self.clone();
        let interval = self.ttl.min(Duration::from_secs(60));

        info!("Pending login store initialized (ttl={:?})", self.ttl);

        tokio::spawn(async move {
            loop {
                tokio::time::sleep(interval).await;
                store.purge_expired().await;
            }
        })
    }

    /// Keep `session` until its login completes or the TTL passes.
    pub async fn park(&self, session: Session) {
        let phone_number = session.phone_number().to_string();
        let entry = PendingEntry {
            session,
            expires_at: Instant::now() + self.ttl,
        };

        let replaced = self.entries.write().await.insert(phone_number.clone(), entry);

        debug!(phone_number = %phone_number, "Parked pending login");
        if let Some(old) = replaced {
            old.session.close().await;
        }
    }

    /// Remove and return the live session for `phone_number`.
    pub async fn take(&self, phone_number: &str) -> Option<Session> {
        let entry = self.entries.write().await.remove(phone_number)?;

        if entry.expires_at <= Instant::now() {
            debug!(phone_number = %phone_number, "Pending login expired");
            entry.session.close().await;
            return None;
        }
        Some(entry.session)
    }

    /// Number of sessions currently parked.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Close and drop every expired session. Returns how many were removed.
    pub async fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let expired: Vec<PendingEntry> = {
            let mut entries = self.entries.write().await;
            let keys: Vec<String> = entries
                .iter()
                .filter(|(_, entry)| entry.expires_at <= now)
                .map(|(key, _)| key.clone())
                .collect();
            keys.iter().filter_map(|key| entries.remove(key)).collect()
        };

        let removed = expired.len();
        for entry in expired {
            entry.session.close().await;
        }
        if removed > 0 {
            debug!("Cleaned up {} expired pending logins", removed);
        }
        removed
    }
}
