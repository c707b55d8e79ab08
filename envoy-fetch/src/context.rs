//! Fetch context shared by carrier clients.
//!
//! The context bundles the HTTP client and fetch settings. It is built once
//! by the caller and passed down to each client constructor, so tests can
//! construct clients against their own context without process-wide state.

use std::sync::Arc;

use crate::error::HttpError;
use crate::http::{HttpClient, HttpSettings};

/// Default number of concurrent per-number requests within one carrier.
pub const DEFAULT_MAX_CONCURRENT_REQUESTS: usize = 4;

// ============================================================================
// Fetch Settings
// ============================================================================

/// Settings for fetch operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchSettings {
    /// HTTP timeouts.
    pub http: HttpSettings,
    /// Upper bound on in-flight tracking requests per carrier batch.
    pub max_concurrent_requests: usize,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            http: HttpSettings::default(),
            max_concurrent_requests: DEFAULT_MAX_CONCURRENT_REQUESTS,
        }
    }
}

// ============================================================================
// Fetch Context
// ============================================================================

/// Context handed to carrier client constructors.
#[derive(Clone)]
pub struct FetchContext {
    /// HTTP client with tracing and timeouts.
    pub http: Arc<HttpClient>,
    /// Fetch settings.
    pub settings: FetchSettings,
}

impl FetchContext {
    /// Creates a context with default settings.
    pub fn new() -> Result<Self, HttpError> {
        Self::builder().build()
    }

    /// Creates a builder for customizing the context.
    pub fn builder() -> FetchContextBuilder {
        FetchContextBuilder::new()
    }

    /// Per-carrier request concurrency, never zero.
    pub fn concurrency(&self) -> usize {
        self.settings.max_concurrent_requests.max(1)
    }
}

impl std::fmt::Debug for FetchContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FetchContext")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Fetch Context Builder
// ============================================================================

/// Builder for constructing a `FetchContext`.
#[derive(Debug, Default)]
pub struct FetchContextBuilder {
    http: Option<Arc<HttpClient>>,
    settings: FetchSettings,
}

impl FetchContextBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses an existing HTTP client instead of building one from settings.
    #[must_use]
    pub fn http(mut self, http: Arc<HttpClient>) -> Self {
        self.http = Some(http);
        self
    }

    /// Sets the fetch settings.
    #[must_use]
    pub fn settings(mut self, settings: FetchSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Sets the HTTP timeouts.
    #[must_use]
    pub fn http_settings(mut self, http: HttpSettings) -> Self {
        self.settings.http = http;
        self
    }

    /// Sets the per-carrier request concurrency.
    #[must_use]
    pub fn max_concurrent_requests(mut self, limit: usize) -> Self {
        self.settings.max_concurrent_requests = limit;
        self
    }

    /// Builds the fetch context.
    pub fn build(self) -> Result<FetchContext, HttpError> {
        let http = match self.http {
            Some(http) => http,
            None => Arc::new(HttpClient::with_settings(&self.settings.http)?),
        };
        Ok(FetchContext {
            http,
            settings: self.settings,
        })
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_builder() {
        let ctx = FetchContext::builder()
            .http_settings(HttpSettings {
                timeout_secs: 60,
                ..HttpSettings::default()
            })
            .max_concurrent_requests(8)
            .build()
            .unwrap();

        assert_eq!(ctx.settings.http.timeout_secs, 60);
        assert_eq!(ctx.concurrency(), 8);
    }

    #[test]
    fn test_default_context() {
        let ctx = FetchContext::new().unwrap();
        assert_eq!(ctx.settings, FetchSettings::default());
        assert_eq!(ctx.concurrency(), DEFAULT_MAX_CONCURRENT_REQUESTS);
    }

    #[test]
    fn test_zero_concurrency_clamped() {
        let ctx = FetchContext::builder()
            .max_concurrent_requests(0)
            .build()
            .unwrap();
        assert_eq!(ctx.concurrency(), 1);
    }
}
