//! Trait definitions for Envoy.
//!
//! The tracking pipeline reads and writes parcels through [`ParcelStore`]
//! only; the storage engine behind it is up to the implementor.

use crate::models::Parcel;

/// Keyed parcel storage, keyed by tracking number.
pub trait ParcelStore: Send + Sync {
    /// Error type produced by the backing storage.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Returns every stored parcel.
    fn all(&self) -> Result<Vec<Parcel>, Self::Error>;

    /// Inserts the parcel if its tracking number is new, otherwise updates it.
    fn upsert(&self, parcel: &Parcel) -> Result<(), Self::Error>;

    /// Removes the parcel with the same tracking number.
    ///
    /// Returns true if something was removed.
    fn delete(&self, parcel: &Parcel) -> Result<bool, Self::Error>;

    /// Upserts many parcels.
    ///
    /// Default implementation upserts one by one and stops at the first error.
    fn upsert_all<'a, I>(&self, parcels: I) -> Result<usize, Self::Error>
    where
        I: IntoIterator<Item = &'a Parcel>,
        Self: Sized,
    {
        let mut count = 0;
        for parcel in parcels {
            self.upsert(parcel)?;
            count += 1;
        }
        Ok(count)
    }
}
