//! Carrier credentials and bearer token caching.
//!
//! Each carrier client owns one [`TokenCache`]. The cache lock is held across
//! the refresh call, so concurrent callers on the same client wait for the
//! single in-flight refresh and reuse its token.

use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Duration, Utc};
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::FetchError;

/// Tokens are treated as expired this long before their stated expiry.
pub const EXPIRY_SKEW_SECS: i64 = 60;

// ============================================================================
// Credentials
// ============================================================================

/// Client-credentials pair for a carrier OAuth endpoint.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// API key / client id / consumer key.
    pub client_id: String,
    /// API secret / client secret / consumer secret.
    pub client_secret: String,
}

impl Credentials {
    /// Creates a credentials pair.
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }

    /// Returns true if both halves are non-blank.
    pub fn is_complete(&self) -> bool {
        !self.client_id.trim().is_empty() && !self.client_secret.trim().is_empty()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}

// ============================================================================
// Access Token
// ============================================================================

/// A bearer token with an absolute expiry.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken {
    /// The raw token.
    pub token: String,
    /// When the carrier says the token stops working.
    pub expires_at: DateTime<Utc>,
}

impl AccessToken {
    /// Creates a token that expires `expires_in_secs` from now.
    ///
    /// Negative lifetimes expire immediately; lifetimes past chrono's range
    /// saturate at the latest representable instant.
    pub fn new(token: impl Into<String>, expires_in_secs: i64) -> Self {
        let now = Utc::now();
        let expires_at = Duration::try_seconds(expires_in_secs.max(0))
            .and_then(|lifetime| now.checked_add_signed(lifetime))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        Self {
            token: token.into(),
            expires_at,
        }
    }

    /// Returns true if the token is expired or about to expire.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// Returns true if the token is expired at `now`, counting the skew.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now + Duration::seconds(EXPIRY_SKEW_SECS) >= self.expires_at
    }

    /// Returns the `Authorization` header value.
    pub fn bearer_header(&self) -> String {
        format!("Bearer {}", self.token)
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("token", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

// ============================================================================
// Token Cache
// ============================================================================

/// Single-flight cache for one client's bearer token.
#[derive(Debug, Default)]
pub struct TokenCache {
    slot: Mutex<Option<AccessToken>>,
    refreshes: AtomicU64,
}

impl TokenCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached token, refreshing it first if missing or expired.
    pub async fn get_or_refresh<F, Fut>(&self, refresh: F) -> Result<AccessToken, FetchError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<AccessToken, FetchError>>,
    {
        let mut slot = self.slot.lock().await;
        if let Some(token) = slot.as_ref().filter(|t| !t.is_expired()) {
            return Ok(token.clone());
        }

        debug!("Refreshing bearer token");
        let token = refresh().await?;
        self.refreshes.fetch_add(1, Ordering::Relaxed);
        *slot = Some(token.clone());
        Ok(token)
    }

    /// Refreshes unconditionally and stores the new token.
    pub async fn force_refresh<F, Fut>(&self, refresh: F) -> Result<AccessToken, FetchError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<AccessToken, FetchError>>,
    {
        let mut slot = self.slot.lock().await;
        let token = refresh().await?;
        self.refreshes.fetch_add(1, Ordering::Relaxed);
        *slot = Some(token.clone());
        Ok(token)
    }

    /// Drops the cached token.
    pub async fn invalidate(&self) {
        *self.slot.lock().await = None;
    }

    /// Returns the cached token without refreshing.
    pub async fn current(&self) -> Option<AccessToken> {
        self.slot.lock().await.clone()
    }

    /// Number of successful refreshes so far.
    pub fn refresh_count(&self) -> u64 {
        self.refreshes.load(Ordering::Relaxed)
    }
}

// ============================================================================
// Tests
// ============================================================================
