//! Carrier client trait.
//!
//! A carrier client authenticates with one carrier's API and turns a batch
//! of that carrier's tracking numbers into normalized [`Parcel`]s. The
//! [`Tracker`](crate::tracker::Tracker) owns one client per carrier and only
//! ever hands a client numbers classified to its carrier.

use std::future::Future;

use async_trait::async_trait;
use envoy_core::{Carrier, Parcel};
use futures::stream::{self, StreamExt};
use tracing::{debug, warn};

use crate::error::FetchError;

// ============================================================================
// Carrier Client Trait
// ============================================================================

/// A tracking API client for one carrier.
///
/// ## Contract
///
/// - `track` fails as a whole only when the client cannot authenticate.
/// - A failure for one tracking number is reported on that number's
///   [`Parcel::error`] and does not affect its siblings.
/// - Every returned parcel carries the carrier's deep link.
///
/// ## Implementing a Client
///
/// ```ignore
/// #[async_trait]
/// impl CarrierClient for AcmeClient {
///     fn carrier(&self) -> Carrier {
///         Carrier::Acme
///     }
///
///     async fn authenticate(&self) -> Result<(), FetchError> {
///         self.tokens.force_refresh(|| self.request_token()).await.map(|_| ())
///     }
///
///     async fn track(&self, numbers: &[String]) -> Result<Vec<Parcel>, FetchError> {
///         let token = self.tokens.get_or_refresh(|| self.request_token()).await?;
///         Ok(track_each(Carrier::Acme, numbers, 4, |tn| self.track_one(&token, tn)).await)
///     }
/// }
/// ```
#[async_trait]
pub trait CarrierClient: Send + Sync {
    /// The carrier this client serves.
    fn carrier(&self) -> Carrier;

    /// Identifier used in logs (e.g., "fedex.api").
    fn id(&self) -> String {
        format!("{}.api", self.carrier().cli_name())
    }

    /// Obtains a fresh bearer credential, replacing any cached one.
    async fn authenticate(&self) -> Result<(), FetchError>;

    /// Tracks a batch of this carrier's numbers.
    ///
    /// Authenticates lazily if no valid credential is cached.
    async fn track(&self, tracking_numbers: &[String]) -> Result<Vec<Parcel>, FetchError>;
}

// ============================================================================
// Per-Number Fan-Out
// ============================================================================

/// Runs `fetch_one` for every number with at most `limit` in flight.
///
/// Output order follows input order. A per-number error becomes a parcel
/// carrying that error, so the batch always yields one parcel per number.
pub async fn track_each<F, Fut>(
    carrier: Carrier,
    tracking_numbers: &[String],
    limit: usize,
    fetch_one: F,
) -> Vec<Parcel>
where
    F: Fn(String) -> Fut,
    Fut: Future<Output = Result<Parcel, FetchError>>,
{
    stream::iter(tracking_numbers.iter().cloned())
        .map(|tn| {
            let fut = fetch_one(tn.clone());
            async move {
                match fut.await {
                    Ok(parcel) => {
                        debug!(carrier = %carrier, tracking_number = %tn, "Tracked");
                        parcel
                    }
                    Err(error) => {
                        warn!(carrier = %carrier, tracking_number = %tn, error = %error, "Tracking failed");
                        Parcel::failed(carrier, tn, error.to_string())
                    }
                }
            }
        })
        .buffered(limit.max(1))
        .collect()
        .await
}

// ============================================================================
// Tests
// ============================================================================
