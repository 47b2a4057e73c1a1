//! Server-side sessions.
//!
//! The browser only ever holds an opaque random token; the user it belongs
//! to lives in this process. Sessions expire after a period of inactivity.

use axum::http::{HeaderMap, header};
use moka::future::Cache;
use moka::policy::EvictionPolicy;
use std::fmt;
use std::time::Duration;
use tracing::{debug, trace};
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "treasuregram_session";

/// A live session bound to one user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub user_id: i32,
}

#[derive(Clone)]
pub struct SessionStore {
    sessions: Cache<String, i32>,
    ttl: Duration,
}

impl SessionStore {
    /// When `capacity` is reached, the least recently used session is
    /// dropped to make room for a new login.
    pub fn new(capacity: u64, ttl: Duration) -> Self {
        let sessions = Cache::builder()
            .max_capacity(capacity)
            .eviction_policy(EvictionPolicy::lru())
            .time_to_idle(ttl)
            .build();

        Self { sessions, ttl }
    }

    /// Start a new session for `user_id` under a fresh token.
    pub async fn create(&self, user_id: i32) -> Session {
        let token = Uuid::new_v4().simple().to_string();
        self.sessions.insert(token.clone(), user_id).await;
        debug!("Session created for user {}", user_id);

        Session { token, user_id }
    }

    /// The user a token belongs to, if the session is still alive.
    pub async fn user_id(&self, token: &str) -> Option<i32> {
        self.sessions.get(token).await
    }

    /// Approximate number of live sessions.
    pub fn active_count(&self) -> u64 {
        self.sessions.entry_count()
    }

    pub async fn destroy(&self, token: &str) {
        trace!("Destroying session");
        self.sessions.invalidate(token).await;
    }

    /// `Set-Cookie` value that hands `session` to the browser.
    pub fn cookie(&self, session: &Session) -> String {
        format!(
            "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
            SESSION_COOKIE,
            session.token,
            self.ttl.as_secs()
        )
    }

    /// `Set-Cookie` value that removes the session cookie.
    pub fn expired_cookie(&self) -> String {
        format!("{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0", SESSION_COOKIE)
    }
}

// Tokens are credentials, so never print the entries.
impl fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionStore")
            .field("entries", &self.sessions.entry_count())
            .field("ttl", &self.ttl)
            .finish()
    }
}

/// Session token carried by the request's `Cookie` header, if any.
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|cookies| cookies.split(';'))
        .filter_map(|cookie| cookie.trim().split_once('='))
        .find(|(name, value)| *name == SESSION_COOKIE && !value.is_empty())
        .map(|(_, value)| value.to_string())
}
