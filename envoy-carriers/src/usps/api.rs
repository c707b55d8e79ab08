//! USPS API client.

use async_trait::async_trait;
use envoy_core::{Carrier, Parcel};
use envoy_fetch::{
    AccessToken, CarrierClient, Credentials, FetchContext, FetchError, HttpClient, TokenCache,
    track_each,
};
use reqwest::header::HeaderMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use super::error::UspsError;
use super::parser::parse_tracking_response;
use crate::common::{into_auth_error, read_body, seconds_or_string};

/// USPS API base URL.
const USPS_API_BASE: &str = "https://apis.usps.com";

/// OAuth token endpoint.
const TOKEN_ENDPOINT: &str = "/oauth2/v3/token";

/// Tracking endpoint; the number is appended.
const TRACK_ENDPOINT: &str = "/tracking/v3/tracking";

/// OAuth scope requested and required on the issued token.
const TRACKING_SCOPE: &str = "tracking";

/// Hosts the USPS client may contact.
pub const USPS_DOMAINS: &[&str] = &["apis.usps.com"];

#[derive(Debug, Serialize)]
struct TokenRequest<'a> {
    grant_type: &'a str,
    client_id: &'a str,
    client_secret: &'a str,
    scope: &'a str,
}

/// OAuth token response.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(deserialize_with = "seconds_or_string")]
    expires_in: i64,
    #[serde(default)]
    status: String,
    #[serde(default)]
    scope: String,
}

impl TokenResponse {
    /// Returns why the token is unusable, if it is.
    fn rejection(&self) -> Option<String> {
        if self.access_token.is_empty() {
            Some("empty access token".to_string())
        } else if !self.status.eq_ignore_ascii_case("approved") {
            Some(format!("token status {:?}", self.status))
        } else if !self.scope.contains(TRACKING_SCOPE) {
            Some(format!("token scope {:?} lacks {TRACKING_SCOPE}", self.scope))
        } else {
            None
        }
    }
}

/// Builds the detail tracking URL for one number.
pub fn tracking_url(tracking_number: &str) -> String {
    format!("{USPS_API_BASE}{TRACK_ENDPOINT}/{tracking_number}?expand=DETAIL")
}

/// USPS Tracking v3 API client.
#[derive(Debug)]
pub struct UspsClient {
    http: HttpClient,
    credentials: Credentials,
    tokens: TokenCache,
    concurrency: usize,
}

impl UspsClient {
    /// Creates a client from the shared fetch context.
    pub fn new(ctx: &FetchContext, credentials: Credentials) -> Self {
        Self {
            http: ctx.http.restricted_to(USPS_DOMAINS),
            credentials,
            tokens: TokenCache::new(),
            concurrency: ctx.concurrency(),
        }
    }

    #[instrument(skip(self))]
    async fn request_token(&self) -> Result<AccessToken, FetchError> {
        if !self.credentials.is_complete() {
            return Err(FetchError::MissingCredentials(Carrier::USPS));
        }

        let url = format!("{USPS_API_BASE}{TOKEN_ENDPOINT}");
        let request = TokenRequest {
            grant_type: "client_credentials",
            client_id: &self.credentials.client_id,
            client_secret: &self.credentials.client_secret,
            scope: TRACKING_SCOPE,
        };

        let response = self.http.post_json(&url, HeaderMap::new(), &request).await?;
        let body = read_body(Carrier::USPS, response)
            .await
            .map_err(into_auth_error)?;

        let token: TokenResponse = serde_json::from_str(&body)
            .map_err(|e| UspsError::TokenRejected(format!("Invalid token response: {e}")))?;
        if let Some(reason) = token.rejection() {
            return Err(UspsError::TokenRejected(reason).into());
        }

        debug!(expires_in = token.expires_in, "USPS token issued");
        Ok(AccessToken::new(token.access_token, token.expires_in))
    }

    #[instrument(skip(self, token), fields(tracking_number = %tracking_number))]
    async fn track_one(
        &self,
        token: &AccessToken,
        tracking_number: String,
    ) -> Result<Parcel, FetchError> {
        let url = tracking_url(&tracking_number);
        let response = self
            .http
            .get_with_auth(&url, &token.bearer_header())
            .await?;
        let body = match read_body(Carrier::USPS, response).await {
            Ok(body) => body,
            Err(FetchError::Status {
                status: 404,
                message,
                ..
            }) => return Err(UspsError::NotFound(message).into()),
            Err(err) => {
                if err.is_auth() {
                    self.tokens.invalidate().await;
                }
                return Err(err);
            }
        };

        let data = parse_tracking_response(&body)?;
        Ok(Parcel::new(Carrier::USPS, tracking_number).with_data(data))
    }
}

#[async_trait]
impl CarrierClient for UspsClient {
    fn carrier(&self) -> Carrier {
        Carrier::USPS
    }

    async fn authenticate(&self) -> Result<(), FetchError> {
        self.tokens
            .force_refresh(|| self.request_token())
            .await
            .map(|_| ())
    }

    #[instrument(skip(self, tracking_numbers), fields(carrier = "USPS", count = tracking_numbers.len()))]
    async fn track(&self, tracking_numbers: &[String]) -> Result<Vec<Parcel>, FetchError> {
        let token = self.tokens.get_or_refresh(|| self.request_token()).await?;
        let parcels = track_each(Carrier::USPS, tracking_numbers, self.concurrency, |tn| {
            self.track_one(&token, tn)
        })
        .await;
        Ok(parcels)
    }
}
