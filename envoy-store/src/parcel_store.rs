//! JSON-file parcel database.
//!
//! All parcels live in one JSON array on disk and in a map keyed by tracking
//! number in memory. Every mutation rewrites the file before returning, so a
//! crash never leaves the file behind the last successful call.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use envoy_core::{Parcel, ParcelStore};
use tracing::{debug, info};

use crate::error::StoreError;
use crate::persistence::{default_database_path, load_json_if_exists, save_json};

type ParcelMap = BTreeMap<String, Parcel>;

// ============================================================================
// Merge Rules
// ============================================================================

/// Folds an incoming parcel into the stored one.
///
/// - A user-assigned name survives an incoming parcel with the default name.
/// - An error-only result keeps the stored data and records the error.
/// - A parcel with neither data nor error only contributes its name.
pub fn merge_parcel(stored: &Parcel, incoming: &Parcel) -> Parcel {
    let mut merged = incoming.clone();

    if incoming.has_default_name() && !stored.has_default_name() {
        merged.name.clone_from(&stored.name);
    }

    if incoming.is_empty() {
        merged.data.clone_from(&stored.data);
        merged.error.clone_from(&stored.error);
        merged.updated_at = stored.updated_at;
    } else if !incoming.has_data() && stored.has_data() {
        merged.data.clone_from(&stored.data);
    }

    if merged.tracking_url.is_none() {
        merged.tracking_url.clone_from(&stored.tracking_url);
    }

    merged
}

// ============================================================================
// JSON Parcel Store
// ============================================================================

/// Parcel database backed by a JSON file.
#[derive(Debug)]
pub struct JsonParcelStore {
    path: PathBuf,
    parcels: RwLock<ParcelMap>,
}

impl JsonParcelStore {
    /// Opens the database at `path`, starting empty if the file is missing.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let stored: Vec<Parcel> = load_json_if_exists(&path)?.unwrap_or_default();

        info!(path = %path.display(), parcels = stored.len(), "Opened parcel database");
        let parcels = stored
            .into_iter()
            .map(|p| (p.tracking_number.clone(), p))
            .collect();

        Ok(Self {
            path,
            parcels: RwLock::new(parcels),
        })
    }

    /// Opens the database at the default path.
    pub fn open_default() -> Result<Self, StoreError> {
        Self::open(default_database_path())
    }

    /// Returns the database file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the parcel with this tracking number.
    pub fn get(&self, tracking_number: &str) -> Result<Option<Parcel>, StoreError> {
        Ok(self.read()?.get(tracking_number).cloned())
    }

    /// Returns the number of stored parcels.
    pub fn len(&self) -> Result<usize, StoreError> {
        Ok(self.read()?.len())
    }

    /// Returns true if nothing is stored.
    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.read()?.is_empty())
    }

    /// Renames a stored parcel. A blank name resets it to the tracking number.
    pub fn rename(&self, tracking_number: &str, name: &str) -> Result<Parcel, StoreError> {
        let mut parcels = self.write()?;
        let previous = parcels
            .get(tracking_number)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(tracking_number.to_string()))?;

        let renamed = previous.clone().with_name(name);
        parcels.insert(tracking_number.to_string(), renamed.clone());
        if let Err(e) = self.flush(&parcels) {
            parcels.insert(tracking_number.to_string(), previous);
            return Err(e);
        }

        debug!(tracking_number, name = %renamed.name, "Renamed parcel");
        Ok(renamed)
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, ParcelMap>, StoreError> {
        self.parcels.read().map_err(|_| StoreError::Poisoned)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, ParcelMap>, StoreError> {
        self.parcels.write().map_err(|_| StoreError::Poisoned)
    }

    fn flush(&self, parcels: &ParcelMap) -> Result<(), StoreError> {
        let list: Vec<&Parcel> = parcels.values().collect();
        save_json(&self.path, &list)
    }
}

impl ParcelStore for JsonParcelStore {
    type Error = StoreError;

    fn all(&self) -> Result<Vec<Parcel>, StoreError> {
        Ok(self.read()?.values().cloned().collect())
    }

    fn upsert(&self, parcel: &Parcel) -> Result<(), StoreError> {
        let mut parcels = self.write()?;
        let key = parcel.tracking_number.clone();

        let merged = match parcels.get(&key) {
            Some(stored) => merge_parcel(stored, parcel),
            None => parcel.clone(),
        };
        let previous = parcels.insert(key.clone(), merged);

        if let Err(e) = self.flush(&parcels) {
            match previous {
                Some(previous) => parcels.insert(key, previous),
                None => parcels.remove(&key),
            };
            return Err(e);
        }

        debug!(tracking_number = %parcel.tracking_number, "Upserted parcel");
        Ok(())
    }

    fn delete(&self, parcel: &Parcel) -> Result<bool, StoreError> {
        let mut parcels = self.write()?;
        let Some(removed) = parcels.remove(&parcel.tracking_number) else {
            return Ok(false);
        };

        if let Err(e) = self.flush(&parcels) {
            parcels.insert(removed.tracking_number.clone(), removed);
            return Err(e);
        }

        debug!(tracking_number = %parcel.tracking_number, "Deleted parcel");
        Ok(true)
    }
}
