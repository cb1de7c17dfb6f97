// ABOUTME: Server-side session state keyed by an opaque cookie token
// ABOUTME: LRU-bounded in-memory store with inactivity expiry plus the per-request session handle
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 NutriFind

//! # Sessions
//!
//! Each browser gets a random UUID token in the `nutrifind_session` cookie on
//! first contact. The token maps to a [`Session`] held in [`SessionStore`]:
//! an `LruCache` behind a `tokio::sync::RwLock`, bounded in size and expiring
//! entries that have been idle longer than the configured TTL. Sessions are
//! never persisted; a restart logs everybody out.

/// Cookie parsing and `Set-Cookie` construction
pub mod cookies;
/// Axum middleware and request extractor
pub mod middleware;

pub use middleware::{session_middleware, SessionHandle};

use crate::config::SessionConfig;
use crate::constants::session as session_constants;
use crate::models::{NutritionTotals, UserProfile};
use cookies::{expired_cookie, SessionCookieConfig};
use lru::LruCache;
use std::num::NonZeroUsize;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

/// Per-browser state
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    /// Logged-in user, if any
    pub username: Option<String>,
    /// Profile snapshot taken at login and refreshed after edits
    pub user_info: Option<UserProfile>,
    /// Totals from the most recent analysis, kept for tracking
    pub last_analysis: Option<NutritionTotals>,
}

impl Session {
    /// True once a login has succeeded
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.username.is_some()
    }
}

#[derive(Debug)]
struct SessionEntry {
    session: Session,
    expires_at: Instant,
}

impl SessionEntry {
    fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

/// Bounded in-memory session map
pub struct SessionStore {
    entries: RwLock<LruCache<String, SessionEntry>>,
    ttl: Duration,
    secure_cookie: bool,
}

impl SessionStore {
    const DEFAULT_CAPACITY: NonZeroUsize =
        match NonZeroUsize::new(session_constants::DEFAULT_MAX_ENTRIES) {
            Some(n) => n,
            None => unreachable!(),
        };

    /// Create a store from configuration
    #[must_use]
    pub fn new(config: &SessionConfig) -> Self {
        let capacity = NonZeroUsize::new(config.max_entries).unwrap_or(Self::DEFAULT_CAPACITY);
        Self {
            entries: RwLock::new(LruCache::new(capacity)),
            ttl: Duration::from_secs(config.ttl_secs.min(session_constants::MAX_TTL_SECS)),
            secure_cookie: config.secure_cookie,
        }
    }

    /// Expiry for a session active now
    fn deadline(&self) -> Instant {
        let now = Instant::now();
        now.checked_add(self.ttl).unwrap_or(now)
    }

    /// Start an empty session and return its token
    pub async fn create(&self) -> String {
        let token = Uuid::new_v4().to_string();
        let entry = SessionEntry {
            session: Session::default(),
            expires_at: self.deadline(),
        };
        let mut entries = self.entries.write().await;
        if let Some((evicted, _)) = entries.push(token.clone(), entry) {
            if evicted != token {
                debug!("Session store full; evicted least recently used session");
            }
        }
        token
    }

    /// Refresh a live session's expiry; expired sessions are removed
    pub async fn touch(&self, token: &str) -> bool {
        let mut entries = self.entries.write().await;
        let live = entries.get_mut(token).map(|entry| {
            if entry.is_expired() {
                false
            } else {
                entry.expires_at = self.deadline();
                true
            }
        });
        match live {
            Some(true) => true,
            Some(false) => {
                entries.pop(token);
                debug!("Session expired after inactivity");
                false
            }
            None => false,
        }
    }

    /// Copy of the session state, if the token is live
    pub async fn get(&self, token: &str) -> Option<Session> {
        let mut entries = self.entries.write().await;
        let live = entries
            .get(token)
            .map(|entry| (!entry.is_expired()).then(|| entry.session.clone()));
        match live {
            Some(Some(session)) => Some(session),
            Some(None) => {
                entries.pop(token);
                None
            }
            None => None,
        }
    }

    /// Whether the token names a live session, without refreshing it
    pub async fn contains(&self, token: &str) -> bool {
        self.entries
            .read()
            .await
            .peek(token)
            .is_some_and(|entry| !entry.is_expired())
    }

    /// Mutate a live session in place
    pub async fn update<R>(&self, token: &str, f: impl FnOnce(&mut Session) -> R) -> Option<R> {
        let mut entries = self.entries.write().await;
        let entry = entries.get_mut(token).filter(|entry| !entry.is_expired())?;
        entry.expires_at = self.deadline();
        Some(f(&mut entry.session))
    }

    /// Move a live session to a fresh token; the old token stops working
    pub async fn rotate(&self, token: &str) -> Option<String> {
        let mut entries = self.entries.write().await;
        let mut entry = entries.pop(token).filter(|entry| !entry.is_expired())?;
        entry.expires_at = self.deadline();
        let fresh = Uuid::new_v4().to_string();
        entries.push(fresh.clone(), entry);
        Some(fresh)
    }

    /// Remove a session; returns whether it existed
    pub async fn destroy(&self, token: &str) -> bool {
        self.entries.write().await.pop(token).is_some()
    }

    /// Drop every expired session, returning how many were removed
    pub async fn purge_expired(&self) -> usize {
        let mut entries = self.entries.write().await;
        let expired: Vec<String> = entries
            .iter()
            .filter(|(_, entry)| entry.is_expired())
            .map(|(token, _)| token.clone())
            .collect();
        for token in &expired {
            entries.pop(token);
        }
        expired.len()
    }

    /// Number of stored sessions, including not yet purged expired ones
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// True when no sessions are stored
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// `Set-Cookie` carrying a session token
    #[must_use]
    pub fn cookie_for(&self, token: &str) -> SessionCookieConfig {
        SessionCookieConfig::new(session_constants::COOKIE_NAME, token, self.ttl.as_secs())
            .secure(self.secure_cookie)
    }

    /// `Set-Cookie` removing the session cookie
    #[must_use]
    pub fn expired_cookie(&self) -> SessionCookieConfig {
        expired_cookie(session_constants::COOKIE_NAME, self.secure_cookie)
    }
}
