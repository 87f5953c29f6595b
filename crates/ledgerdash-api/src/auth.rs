//! Session handling
//!
//! Sessions live in memory and map an opaque cookie token to the signed-in
//! user until they expire. Handlers receive the identity through the
//! `CurrentUser` extractor; nothing below the HTTP layer reads ambient
//! session state.

use axum::extract::FromRequestParts;
use axum::http::header;
use axum::http::request::Parts;
use chrono::{DateTime, Duration, Utc};
use ledgerdash_core::UserId;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::{ApiError, AppState};

/// Name of the session cookie
pub const SESSION_COOKIE: &str = "ledgerdash_session";

/// A signed-in user
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub user_id: UserId,
    pub username: String,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// Token -> session table shared by all requests
#[derive(Debug, Clone)]
pub struct SessionStore {
    inner: Arc<RwLock<HashMap<String, Session>>>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    /// How long a new session stays valid
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Start a session and return its token. Expired sessions are dropped first.
    pub async fn create(&self, user_id: UserId, username: &str) -> String {
        let token = ledgerdash_utils::generate_token();
        let now = Utc::now();
        let mut sessions = self.inner.write().await;

        let before = sessions.len();
        sessions.retain(|_, session| !session.is_expired(now));
        if sessions.len() < before {
            log::debug!(target: "ledgerdash::auth", "Pruned {} expired sessions", before - sessions.len());
        }

        sessions.insert(
            token.clone(),
            Session {
                user_id,
                username: username.to_string(),
                expires_at: now + self.ttl,
            },
        );
        log::info!(target: "ledgerdash::auth", "User {} ({}) signed in", username, user_id);
        token
    }

    /// Look up a live session; an expired one is removed and not returned
    pub async fn get(&self, token: &str) -> Option<Session> {
        let now = Utc::now();
        {
            let sessions = self.inner.read().await;
            match sessions.get(token) {
                Some(session) if !session.is_expired(now) => return Some(session.clone()),
                Some(_) => {}
                None => return None,
            }
        }

        if let Some(session) = self.inner.write().await.remove(token) {
            log::info!(target: "ledgerdash::auth", "Session of {} expired", session.username);
        }
        None
    }

    /// Number of sessions held, expired ones included until pruned
    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }

    pub async fn remove(&self, token: &str) -> Option<Session> {
        let removed = self.inner.write().await.remove(token);
        if let Some(ref session) = removed {
            log::info!(target: "ledgerdash::auth", "User {} signed out", session.username);
        }
        removed
    }
}

/// `Set-Cookie` value for a fresh session lasting `ttl`
pub fn session_cookie(token: &str, ttl: Duration) -> String {
    format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        SESSION_COOKIE,
        token,
        ttl.num_seconds().max(0)
    )
}

/// `Set-Cookie` value that clears the session cookie
pub fn expired_session_cookie() -> String {
    format!("{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0", SESSION_COOKIE)
}

/// Pull the session token out of the request's `Cookie` headers
pub fn session_token(headers: &axum::http::HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, token)| token.to_string())
        .filter(|token| !token.is_empty())
}

/// Identity of the user making the request
#[derive(Debug, Clone, PartialEq)]
pub struct CurrentUser {
    pub id: UserId,
    pub username: String,
}

#[axum::async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = session_token(&parts.headers).ok_or(ApiError::LoginRequired)?;
        let session = state.sessions.get(&token).await.ok_or(ApiError::LoginRequired)?;
        Ok(CurrentUser {
            id: session.user_id,
            username: session.username,
        })
    }
}
