//! Consolidated health/status reporting.
//!
//! [`HealthReporter`] is a read-only consumer of the store, safe to poll
//! from monitoring or UI code: it never fails, folding any underlying
//! fault into the snapshot instead.

use super::{ConfigStore, KeyStore};
use crate::records::metadata::Metadata;
use crate::records::{DatabaseRecord, PrinterRecord, SystemSettingRecord};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, instrument};

/// Point-in-time health snapshot. Derived, never persisted.
#[derive(Debug, Clone, Serialize)]
pub struct HealthSnapshot {
    /// Metadata marks the store initialized.
    pub is_initialized: bool,
    /// All namespace segments exist and the store is initialized.
    pub is_structure_valid: bool,
    /// `is_initialized && is_structure_valid`.
    pub is_healthy: bool,
    /// Schema version from metadata.
    pub version: String,
    /// Decodable database records.
    pub database_count: usize,
    /// Decodable printer records.
    pub printer_count: usize,
    /// Decodable system setting records.
    pub setting_count: usize,
    /// Entries skipped across all listings because they were malformed.
    pub skipped_entries: usize,
    /// Last metadata write; epoch sentinel when missing or unparsable.
    pub last_modified: DateTime<Utc>,
    /// First error encountered while assembling the snapshot, if any.
    pub error: Option<String>,
}

/// Read-only health view over a [`ConfigStore`].
pub struct HealthReporter<'a, S: KeyStore> {
    store: &'a ConfigStore<S>,
}

impl<'a, S: KeyStore> HealthReporter<'a, S> {
    /// Wraps a store for health polling.
    pub fn new(store: &'a ConfigStore<S>) -> Self {
        Self { store }
    }

    /// Computes the current health snapshot. Never fails.
    #[instrument(skip(self))]
    pub async fn get_health(&self) -> HealthSnapshot {
        let is_initialized = self.store.is_initialized().await;
        let is_structure_valid = self.store.validate_structure().await;

        let mut error: Option<String> = None;

        let metadata = match self.store.metadata().await {
            Ok(meta) => meta,
            Err(e) => {
                error = Some(e.to_string());
                Metadata::from_entries(&Default::default())
            }
        };

        let mut skipped = 0;
        let database_count = tally(
            self.store.list_records::<DatabaseRecord>().await,
            &mut skipped,
            &mut error,
        );
        let printer_count = tally(
            self.store.list_records::<PrinterRecord>().await,
            &mut skipped,
            &mut error,
        );
        let setting_count = tally(
            self.store.list_records::<SystemSettingRecord>().await,
            &mut skipped,
            &mut error,
        );

        let snapshot = HealthSnapshot {
            is_initialized,
            is_structure_valid,
            is_healthy: is_initialized && is_structure_valid,
            version: metadata.version,
            database_count,
            printer_count,
            setting_count,
            skipped_entries: skipped,
            last_modified: metadata.last_modified,
            error,
        };
        debug!(healthy = snapshot.is_healthy, "Computed health snapshot.");
        snapshot
    }
}

/// Folds one listing into the running counts, capturing the first fault.
fn tally<R>(
    listing: crate::errors::Result<super::RecordListing<R>>,
    skipped: &mut usize,
    error: &mut Option<String>,
) -> usize {
    match listing {
        Ok(listing) => {
            *skipped += listing.skipped;
            listing.records.len()
        }
        Err(e) => {
            if error.is_none() {
                *error = Some(e.to_string());
            }
            0
        }
    }
}
