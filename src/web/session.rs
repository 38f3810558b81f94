//! Password gate sessions.
//!
//! Sessions live in memory only and are lost on restart.

use axum::http::{header, HeaderMap};
use rand::distributions::Alphanumeric;
use rand::Rng;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

pub const SESSION_COOKIE: &str = "heartz_session";

/// Lifetime of a dashboard session (12 hours).
pub const SESSION_TTL: Duration = Duration::from_secs(12 * 60 * 60);

const TOKEN_LEN: usize = 32;

/// Live session tokens shared across handlers, keyed to their issue time.
///
/// Expired tokens are rejected on lookup and dropped whenever a new session
/// starts, so the map only holds sessions younger than the TTL.
#[derive(Clone)]
pub struct SessionStore {
    tokens: Arc<RwLock<HashMap<String, Instant>>>,
    ttl: Duration,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::with_ttl(SESSION_TTL)
    }
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            tokens: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    /// Start a new session and return its token.
    pub async fn create(&self) -> String {
        let token = new_token();
        let now = Instant::now();
        let mut tokens = self.tokens.write().await;
        tokens.retain(|_, issued| now.duration_since(*issued) < self.ttl);
        tokens.insert(token.clone(), now);
        token
    }

    pub async fn is_valid(&self, token: &str) -> bool {
        match self.tokens.read().await.get(token) {
            Some(issued) => issued.elapsed() < self.ttl,
            None => false,
        }
    }

    pub async fn revoke(&self, token: &str) {
        self.tokens.write().await.remove(token);
    }

    /// Number of tokens currently held, expired or not.
    #[cfg(test)]
    pub(crate) async fn len(&self) -> usize {
        self.tokens.read().await.len()
    }
}

fn new_token() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(TOKEN_LEN)
        .map(char::from)
        .collect()
}

/// Extract the session token from the request's `Cookie` headers.
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.to_string())
        .filter(|value| !value.is_empty())
}

pub fn session_cookie(token: &str) -> String {
    format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        SESSION_COOKIE,
        token,
        SESSION_TTL.as_secs()
    )
}

pub fn expired_session_cookie() -> String {
    format!("{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0", SESSION_COOKIE)
}

/// Compare a submitted password without short-circuiting on the first mismatch.
pub fn password_matches(expected: &str, given: &str) -> bool {
    let (a, b) = (expected.as_bytes(), given.as_bytes());
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
