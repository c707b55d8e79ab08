//! UPS API client.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use base64::Engine;
use base64::prelude::BASE64_STANDARD;
use chrono::Utc;
use envoy_core::{Carrier, Parcel};
use envoy_fetch::{
    AccessToken, CarrierClient, Credentials, FetchContext, FetchError, HttpClient, HttpError,
    TokenCache, track_each,
};
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde::Deserialize;
use tracing::{debug, instrument};
use url::Url;

use super::error::UpsError;
use super::parser::parse_tracking_response;
use crate::common::{bearer_headers, header_value, into_auth_error, read_body, seconds_or_string};

// ============================================================================
// Constants
// ============================================================================

/// UPS API base URL.
const UPS_API_BASE: &str = "https://onlinetools.ups.com";

/// OAuth token endpoint.
const TOKEN_ENDPOINT: &str = "/security/v1/oauth/token";

/// Path segments of the tracking details endpoint.
const TRACK_SEGMENTS: &[&str] = &["api", "track", "v1", "details"];

/// Query parameters sent with every tracking request.
const TRACK_QUERY: &[(&str, &str)] = &[
    ("locale", "en_US"),
    ("returnSignature", "false"),
    ("returnMilestones", "false"),
    ("returnPOD", "false"),
];

/// Value of the `transactionSrc` header.
const TRANSACTION_SOURCE: &str = "envoy";

/// Hosts the UPS client may contact.
pub const UPS_DOMAINS: &[&str] = &["onlinetools.ups.com"];

static TRANSACTION_SEQ: AtomicU64 = AtomicU64::new(0);

// ============================================================================
// Token Types
// ============================================================================

/// OAuth token response.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(deserialize_with = "seconds_or_string")]
    expires_in: i64,
    #[serde(default)]
    status: Option<String>,
}

// ============================================================================
// Request Helpers
// ============================================================================

/// Builds the tracking details URL for one number.
pub fn tracking_url(tracking_number: &str) -> Result<Url, HttpError> {
    let mut url = Url::parse(UPS_API_BASE).map_err(|e| HttpError::InvalidUrl(e.to_string()))?;
    url.path_segments_mut()
        .map_err(|()| HttpError::InvalidUrl(UPS_API_BASE.to_string()))?
        .pop_if_empty()
        .extend(TRACK_SEGMENTS)
        .push(tracking_number);
    url.query_pairs_mut().extend_pairs(TRACK_QUERY);
    Ok(url)
}

/// Returns a transaction id unique within this process.
pub fn transaction_id() -> String {
    let seq = TRANSACTION_SEQ.fetch_add(1, Ordering::Relaxed);
    format!("envoy{:x}{seq:04x}", Utc::now().timestamp_millis())
}

fn basic_auth(credentials: &Credentials) -> String {
    let pair = format!("{}:{}", credentials.client_id, credentials.client_secret);
    format!("Basic {}", BASE64_STANDARD.encode(pair))
}

// ============================================================================
// API Client
// ============================================================================

/// UPS Tracking API client.
#[derive(Debug)]
pub struct UpsClient {
    http: HttpClient,
    credentials: Credentials,
    tokens: TokenCache,
    concurrency: usize,
}

impl UpsClient {
    /// Creates a client from the shared fetch context.
    pub fn new(ctx: &FetchContext, credentials: Credentials) -> Self {
        Self {
            http: ctx.http.restricted_to(UPS_DOMAINS),
            credentials,
            tokens: TokenCache::new(),
            concurrency: ctx.concurrency(),
        }
    }

    /// Exchanges the client id and secret for a bearer token.
    #[instrument(skip(self))]
    async fn request_token(&self) -> Result<AccessToken, FetchError> {
        if !self.credentials.is_complete() {
            return Err(FetchError::MissingCredentials(Carrier::UPS));
        }

        let url = format!("{UPS_API_BASE}{TOKEN_ENDPOINT}");
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, header_value(&basic_auth(&self.credentials))?);
        let form = [("grant_type", "client_credentials")];

        let response = self.http.post_form(&url, headers, &form).await?;
        let body = read_body(Carrier::UPS, response)
            .await
            .map_err(into_auth_error)?;

        let token: TokenResponse = serde_json::from_str(&body)
            .map_err(|e| UpsError::TokenRejected(format!("Invalid token response: {e}")))?;
        if token.access_token.is_empty() {
            return Err(UpsError::TokenRejected("empty access token".into()).into());
        }
        if let Some(status) = token
            .status
            .as_deref()
            .filter(|s| !s.eq_ignore_ascii_case("approved"))
        {
            return Err(UpsError::TokenRejected(format!("token status {status}")).into());
        }

        debug!(expires_in = token.expires_in, "UPS token issued");
        Ok(AccessToken::new(token.access_token, token.expires_in))
    }

    /// Tracks one number with an already-issued token.
    #[instrument(skip(self, token), fields(tracking_number = %tracking_number))]
    async fn track_one(
        &self,
        token: &AccessToken,
        tracking_number: String,
    ) -> Result<Parcel, FetchError> {
        let url = tracking_url(&tracking_number)?;
        let mut headers = bearer_headers(token)?;
        headers.insert("transid", header_value(&transaction_id())?);
        headers.insert("transactionsrc", HeaderValue::from_static(TRANSACTION_SOURCE));

        let response = self.http.get_with_headers(url.as_str(), headers).await?;
        let body = match read_body(Carrier::UPS, response).await {
            Ok(body) => body,
            Err(FetchError::Status {
                status: 404,
                message,
                ..
            }) => return Err(UpsError::NotFound(message).into()),
            Err(err) => {
                if err.is_auth() {
                    self.tokens.invalidate().await;
                }
                return Err(err);
            }
        };

        let data = parse_tracking_response(&tracking_number, &body)?;
        Ok(Parcel::new(Carrier::UPS, tracking_number).with_data(data))
    }
}

#[async_trait]
impl CarrierClient for UpsClient {
    fn carrier(&self) -> Carrier {
        Carrier::UPS
    }

    async fn authenticate(&self) -> Result<(), FetchError> {
        self.tokens
            .force_refresh(|| self.request_token())
            .await
            .map(|_| ())
    }

    #[instrument(skip(self, tracking_numbers), fields(carrier = "UPS", count = tracking_numbers.len()))]
    async fn track(&self, tracking_numbers: &[String]) -> Result<Vec<Parcel>, FetchError> {
        let token = self.tokens.get_or_refresh(|| self.request_token()).await?;
        let parcels = track_each(Carrier::UPS, tracking_numbers, self.concurrency, |tn| {
            self.track_one(&token, tn)
        })
        .await;
        Ok(parcels)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracking_url() {
        let url = tracking_url("1Z5338FF0107231059").unwrap();
        assert_eq!(
            url.as_str(),
            "https://onlinetools.ups.com/api/track/v1/details/1Z5338FF0107231059\
             ?locale=en_US&returnSignature=false&returnMilestones=false&returnPOD=false"
        );
    }

    #[test]
    fn test_transaction_ids_are_unique() {
        let a = transaction_id();
        let b = transaction_id();
        assert_ne!(a, b);
        assert!(a.starts_with("envoy"));
        assert!(a.len() <= 32);
    }

    #[test]
    fn test_basic_auth() {
        let header = basic_auth(&Credentials::new("id", "secret"));
        assert_eq!(header, "Basic aWQ6c2VjcmV0");
    }

    #[test]
    fn test_token_response_string_expiry() {
        let token: TokenResponse = serde_json::from_str(
            r#"{"token_type":"Bearer","issued_at":"1740000000000","client_id":"x",
                "access_token":"eyJraWQi","expires_in":"14399","status":"approved"}"#,
        )
        .unwrap();
        assert_eq!(token.expires_in, 14399);
        assert_eq!(token.status.as_deref(), Some("approved"));
    }

    #[tokio::test]
    async fn test_missing_credentials_fail_batch() {
        let client = UpsClient::new(&FetchContext::new().unwrap(), Credentials::new("id", ""));
        assert_eq!(client.id(), "ups.api");
        let err = client
            .track(&["1Z5338FF0107231059".to_string()])
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::MissingCredentials(Carrier::UPS)));
    }
}
