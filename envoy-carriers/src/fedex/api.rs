//! FedEx API client.

use async_trait::async_trait;
use envoy_core::{Carrier, Parcel};
use envoy_fetch::{
    AccessToken, CarrierClient, Credentials, FetchContext, FetchError, HttpClient, TokenCache,
    track_each,
};
use reqwest::header::{HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use super::error::FedexError;
use super::parser::parse_tracking_response;
use crate::common::{bearer_headers, into_auth_error, read_body, seconds_or_string};

// ============================================================================
// Constants
// ============================================================================

/// FedEx API base URL.
const FEDEX_API_BASE: &str = "https://apis.fedex.com";

/// OAuth token endpoint.
const TOKEN_ENDPOINT: &str = "/oauth/token";

/// Track by tracking number endpoint.
const TRACK_ENDPOINT: &str = "/track/v1/trackingnumbers";

/// Hosts the FedEx client may contact.
pub const FEDEX_DOMAINS: &[&str] = &["apis.fedex.com"];

// ============================================================================
// Request / Token Types
// ============================================================================

/// Track API request body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackingRequest {
    tracking_info: Vec<TrackingInfo>,
    include_detailed_scans: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TrackingInfo {
    tracking_number_info: TrackingNumberInfo,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TrackingNumberInfo {
    tracking_number: String,
}

impl TrackingRequest {
    /// Builds a request for one tracking number with detailed scans.
    pub fn single(tracking_number: &str) -> Self {
        Self {
            tracking_info: vec![TrackingInfo {
                tracking_number_info: TrackingNumberInfo {
                    tracking_number: tracking_number.to_string(),
                },
            }],
            include_detailed_scans: true,
        }
    }
}

/// OAuth token response.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(deserialize_with = "seconds_or_string")]
    expires_in: i64,
}

// ============================================================================
// API Client
// ============================================================================

/// FedEx Track API client.
#[derive(Debug)]
pub struct FedexClient {
    http: HttpClient,
    credentials: Credentials,
    tokens: TokenCache,
    concurrency: usize,
}

impl FedexClient {
    /// Creates a client from the shared fetch context.
    pub fn new(ctx: &FetchContext, credentials: Credentials) -> Self {
        Self {
            http: ctx.http.restricted_to(FEDEX_DOMAINS),
            credentials,
            tokens: TokenCache::new(),
            concurrency: ctx.concurrency(),
        }
    }

    /// Exchanges the API key and secret for a bearer token.
    #[instrument(skip(self))]
    async fn request_token(&self) -> Result<AccessToken, FetchError> {
        if !self.credentials.is_complete() {
            return Err(FetchError::MissingCredentials(Carrier::FedEx));
        }

        let url = format!("{FEDEX_API_BASE}{TOKEN_ENDPOINT}");
        let form = [
            ("grant_type", "client_credentials"),
            ("client_id", self.credentials.client_id.as_str()),
            ("client_secret", self.credentials.client_secret.as_str()),
        ];

        let response = self.http.post_form(&url, HeaderMap::new(), &form).await?;
        let body = read_body(Carrier::FedEx, response)
            .await
            .map_err(into_auth_error)?;

        let token: TokenResponse = serde_json::from_str(&body)
            .map_err(|e| FedexError::TokenRejected(format!("Invalid token response: {e}")))?;
        if token.access_token.is_empty() {
            return Err(FedexError::TokenRejected("empty access token".into()).into());
        }

        debug!(expires_in = token.expires_in, "FedEx token issued");
        Ok(AccessToken::new(token.access_token, token.expires_in))
    }

    /// Tracks one number with an already-issued token.
    #[instrument(skip(self, token), fields(tracking_number = %tracking_number))]
    async fn track_one(
        &self,
        token: &AccessToken,
        tracking_number: String,
    ) -> Result<Parcel, FetchError> {
        let url = format!("{FEDEX_API_BASE}{TRACK_ENDPOINT}");
        let mut headers = bearer_headers(token)?;
        headers.insert("x-locale", HeaderValue::from_static("en_US"));

        let response = self
            .http
            .post_json(&url, headers, &TrackingRequest::single(&tracking_number))
            .await?;
        let body = match read_body(Carrier::FedEx, response).await {
            Ok(body) => body,
            Err(err) => {
                if err.is_auth() {
                    self.tokens.invalidate().await;
                }
                return Err(err);
            }
        };

        let data = parse_tracking_response(&tracking_number, &body)?;
        Ok(Parcel::new(Carrier::FedEx, tracking_number).with_data(data))
    }
}

#[async_trait]
impl CarrierClient for FedexClient {
    fn carrier(&self) -> Carrier {
        Carrier::FedEx
    }

    async fn authenticate(&self) -> Result<(), FetchError> {
        self.tokens
            .force_refresh(|| self.request_token())
            .await
            .map(|_| ())
    }

    #[instrument(skip(self, tracking_numbers), fields(carrier = "FedEx", count = tracking_numbers.len()))]
    async fn track(&self, tracking_numbers: &[String]) -> Result<Vec<Parcel>, FetchError> {
        let token = self.tokens.get_or_refresh(|| self.request_token()).await?;
        let parcels = track_each(Carrier::FedEx, tracking_numbers, self.concurrency, |tn| {
            self.track_one(&token, tn)
        })
        .await;
        Ok(parcels)
    }
}

// ============================================================================
// Tests
// ============================================================================
