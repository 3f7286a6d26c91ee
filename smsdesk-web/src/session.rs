//! Server-side session store with signed cookies
//!
//! Sessions live in an in-memory map keyed by a random UUID; the browser
//! only ever holds `<id>.<signature>` where the signature is a SHA-256 over
//! the configured secret and the id. A tampered or unknown cookie simply
//! fails lookup, and expired entries are dropped on access.

use crate::config::SessionConfig;
use sha2::{Digest, Sha256};
use smsdesk_client::Session;
use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};
use uuid::Uuid;

/// Cookie name the dashboard uses
pub const SESSION_COOKIE: &str = "smsdesk_session";

struct StoredSession {
    session: Session,
    expires_at: Instant,
}

/// In-memory session registry
pub struct SessionStore {
    secret: String,
    lifetime: Duration,
    sessions: RwLock<HashMap<Uuid, StoredSession>>,
}

impl SessionStore {
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            secret: config.secret.clone(),
            lifetime: Duration::from_secs(config.lifetime_minutes * 60),
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Store a fresh session and return the cookie value for it
    pub fn issue(&self, session: Session) -> String {
        let id = Uuid::new_v4();
        let expires_at = Instant::now() + self.lifetime;
        self.sessions
            .write()
            .expect("session store poisoned")
            .insert(id, StoredSession { session, expires_at });
        format!("{}.{}", id, self.sign(&id))
    }

    /// Resolve a cookie value back to a session
    ///
    /// Returns `None` for malformed values, bad signatures, unknown ids and
    /// expired sessions; expired entries are removed on the way out.
    pub fn resolve(&self, cookie_value: &str) -> Option<Session> {
        let (id_part, signature) = cookie_value.split_once('.')?;
        let id = Uuid::parse_str(id_part).ok()?;
        if !constant_time_eq(signature.as_bytes(), self.sign(&id).as_bytes()) {
            return None;
        }

        let mut sessions = self.sessions.write().expect("session store poisoned");
        match sessions.get(&id) {
            Some(stored) if stored.expires_at > Instant::now() => {
                Some(stored.session.clone())
            }
            Some(_) => {
                sessions.remove(&id);
                None
            }
            None => None,
        }
    }

    /// Drop a session (logout)
    pub fn revoke(&self, cookie_value: &str) {
        if let Some((id_part, _)) = cookie_value.split_once('.') {
            if let Ok(id) = Uuid::parse_str(id_part) {
                self.sessions
                    .write()
                    .expect("session store poisoned")
                    .remove(&id);
            }
        }
    }

    pub fn active_count(&self) -> usize {
        self.sessions.read().expect("session store poisoned").len()
    }

    fn sign(&self, id: &Uuid) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.secret.as_bytes());
        hasher.update(b":");
        hasher.update(id.as_bytes());
        hex::encode(hasher.finalize())
    }
}

/// Compare signatures without early exit on the first mismatching byte
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use smsdesk_client::UserAccount;

    fn store() -> SessionStore {
        SessionStore::new(&SessionConfig {
            secret: "test-secret".into(),
            lifetime_minutes: 60,
        })
    }

    fn session() -> Session {
        Session::new(
            "jwt-token",
            UserAccount {
                id: "1".into(),
                name: "Admin".into(),
                email: "admin@example.com".into(),
                role: None,
            },
        )
    }

    #[test]
    fn test_issue_and_resolve_round_trip() {
        let store = store();
        let cookie = store.issue(session());
        let resolved = store.resolve(&cookie).expect("session resolves");
        assert_eq!(resolved.token(), "jwt-token");
        assert_eq!(store.active_count(), 1);
    }

    #[test]
    fn test_tampered_signature_rejected() {
        let store = store();
        let cookie = store.issue(session());
        let (id, _) = cookie.split_once('.').unwrap();
        let forged = format!("{id}.{}", "0".repeat(64));
        assert!(store.resolve(&forged).is_none());
    }

    #[test]
    fn test_cookie_signed_with_other_secret_rejected() {
        let store_a = store();
        let store_b = SessionStore::new(&SessionConfig {
            secret: "other-secret".into(),
            lifetime_minutes: 60,
        });
        let cookie = store_a.issue(session());
        assert!(store_b.resolve(&cookie).is_none());
    }

    #[test]
    fn test_malformed_cookie_rejected() {
        let store = store();
        assert!(store.resolve("garbage").is_none());
        assert!(store.resolve("not-a-uuid.abcdef").is_none());
        assert!(store.resolve("").is_none());
    }

    #[test]
    fn test_expired_session_removed_on_access() {
        let store = SessionStore::new(&SessionConfig {
            secret: "test-secret".into(),
            lifetime_minutes: 0,
        });
        let cookie = store.issue(session());
        assert!(store.resolve(&cookie).is_none());
        assert_eq!(store.active_count(), 0);
    }

    #[test]
    fn test_revoke_drops_session() {
        let store = store();
        let cookie = store.issue(session());
        store.revoke(&cookie);
        assert!(store.resolve(&cookie).is_none());
        assert_eq!(store.active_count(), 0);
    }
}
