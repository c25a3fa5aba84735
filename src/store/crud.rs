//! Typed CRUD over the record namespaces.
//!
//! All mutations run under the store's write guard for the whole
//! read-modify-write sequence, so singleton-flag enforcement (one main
//! database, one default printer per zone) is never observable half-done.

use super::paths;
use super::{codec, ConfigStore, KeyStore};
use crate::errors::{Error, Result};
use crate::records::metadata::keys as meta_keys;
use crate::records::{Record, RecordKind};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

/// Result of listing a record namespace: the decodable records plus a
/// count of entries skipped because their payload was malformed.
#[derive(Debug, Clone)]
pub struct RecordListing<R> {
    /// Successfully decoded records, in key order.
    pub records: Vec<R>,
    /// Entries whose payload could not be decoded.
    pub skipped: usize,
}

impl<S: KeyStore> ConfigStore<S> {
    /// Creates a record, generating a unique id when none is set, and
    /// enforces the singleton-flag invariants before the write lands.
    ///
    /// # Errors
    ///
    /// `DuplicateId` when the given id already exists, `Validation` when
    /// a data-model invariant fails, plus propagated key-store faults.
    #[instrument(skip(self, record))]
    pub async fn create_record<R: Record>(&self, mut record: R) -> Result<String> {
        let _write = self.write_guard()?;
        let segment = paths::segment_for(R::KIND);

        if record.id().is_empty() {
            record.set_id(Uuid::new_v4().to_string());
            debug!("Generated id {} for new {} record.", record.id(), R::KIND);
        } else {
            let taken = self
                .keys()
                .get_value(segment, record.id())
                .map_err(|e| self.fail("create_record", e))?
                .is_some();
            if taken {
                return Err(self.fail(
                    "create_record",
                    Error::DuplicateId {
                        kind: R::KIND.name(),
                        id: record.id().to_string(),
                    },
                ));
            }
        }

        record.stamp_created(self.now());
        record.validate().map_err(|e| self.fail("create_record", e))?;
        self.check_conflicts_unlocked(&record)
            .map_err(|e| self.fail("create_record", e))?;
        self.enforce_singleton_unlocked(&record)
            .map_err(|e| self.fail("create_record", e))?;

        self.keys()
            .set_value(segment, record.id(), &codec::encode(&record))
            .map_err(|e| self.fail("create_record", e))?;
        self.update_main_pointer_unlocked(&record)
            .map_err(|e| self.fail("create_record", e))?;
        self.touch_unlocked()
            .map_err(|e| self.fail("create_record", e))?;

        info!("Created {} record {}.", R::KIND, record.id());
        Ok(record.id().to_string())
    }

    /// Fetches one record by id.
    ///
    /// # Errors
    ///
    /// `NotFound` when absent, `MalformedRecord` when the stored payload
    /// cannot be decoded.
    #[instrument(skip(self))]
    pub async fn get_record<R: Record>(&self, id: &str) -> Result<R> {
        let _read = self.read_guard()?;
        let segment = paths::segment_for(R::KIND);
        let payload = self
            .keys()
            .get_value(segment, id)
            .map_err(|e| self.fail("get_record", e))?
            .ok_or_else(|| {
                self.fail(
                    "get_record",
                    Error::NotFound {
                        kind: R::KIND.name(),
                        id: id.to_string(),
                    },
                )
            })?;
        codec::decode(&payload, id).map_err(|e| self.fail("get_record", e))
    }

    /// Lists every record of a kind. Individually malformed entries are
    /// skipped, reported to the error sink, and counted; the listing
    /// itself never fails over one bad payload.
    ///
    /// # Errors
    ///
    /// Propagates key-store faults (unavailable medium, missing segment).
    #[instrument(skip(self))]
    pub async fn list_records<R: Record>(&self) -> Result<RecordListing<R>> {
        let _read = self.read_guard()?;
        self.list_unlocked()
    }

    /// Replaces an existing record. Behaves like create minus id
    /// generation, re-applying singleton-invariant enforcement.
    ///
    /// # Errors
    ///
    /// `NotFound` when the id does not exist, `Validation` on invariant
    /// failure, plus propagated key-store faults.
    #[instrument(skip(self, record))]
    pub async fn update_record<R: Record>(&self, id: &str, mut record: R) -> Result<()> {
        let _write = self.write_guard()?;
        let segment = paths::segment_for(R::KIND);

        let exists = self
            .keys()
            .get_value(segment, id)
            .map_err(|e| self.fail("update_record", e))?
            .is_some();
        if !exists {
            return Err(self.fail(
                "update_record",
                Error::NotFound {
                    kind: R::KIND.name(),
                    id: id.to_string(),
                },
            ));
        }

        record.set_id(id.to_string());
        record.stamp_modified(self.now());
        record.validate().map_err(|e| self.fail("update_record", e))?;
        self.check_conflicts_unlocked(&record)
            .map_err(|e| self.fail("update_record", e))?;
        self.enforce_singleton_unlocked(&record)
            .map_err(|e| self.fail("update_record", e))?;

        self.keys()
            .set_value(segment, id, &codec::encode(&record))
            .map_err(|e| self.fail("update_record", e))?;
        self.update_main_pointer_unlocked(&record)
            .map_err(|e| self.fail("update_record", e))?;
        self.touch_unlocked()
            .map_err(|e| self.fail("update_record", e))?;

        info!("Updated {} record {}.", R::KIND, id);
        Ok(())
    }

    /// Deletes a record by id. Absent ids always raise `NotFound` so
    /// callers can distinguish "never existed" from "deleted".
    ///
    /// # Errors
    ///
    /// `NotFound` when absent, plus propagated key-store faults.
    #[instrument(skip(self))]
    pub async fn delete_record<R: Record>(&self, id: &str) -> Result<()> {
        let _write = self.write_guard()?;
        let segment = paths::segment_for(R::KIND);

        let exists = self
            .keys()
            .get_value(segment, id)
            .map_err(|e| self.fail("delete_record", e))?
            .is_some();
        if !exists {
            return Err(self.fail(
                "delete_record",
                Error::NotFound {
                    kind: R::KIND.name(),
                    id: id.to_string(),
                },
            ));
        }

        self.keys()
            .delete_key(segment, id)
            .map_err(|e| self.fail("delete_record", e))?;

        if R::KIND == RecordKind::Database {
            let pointer = self
                .keys()
                .get_value(paths::METADATA, meta_keys::MAIN_DATABASE_ID)
                .map_err(|e| self.fail("delete_record", e))?;
            if pointer.as_deref() == Some(id) {
                self.keys()
                    .delete_key(paths::METADATA, meta_keys::MAIN_DATABASE_ID)
                    .map_err(|e| self.fail("delete_record", e))?;
            }
        }

        self.touch_unlocked()
            .map_err(|e| self.fail("delete_record", e))?;
        info!("Deleted {} record {}.", R::KIND, id);
        Ok(())
    }

    pub(crate) fn list_unlocked<R: Record>(&self) -> Result<RecordListing<R>> {
        let segment = paths::segment_for(R::KIND);
        let mut records = Vec::new();
        let mut skipped = 0;
        for key in self.keys().list_child_keys(segment)? {
            let Some(payload) = self.keys().get_value(segment, &key)? else {
                continue;
            };
            match codec::decode::<R>(&payload, &key) {
                Ok(record) => records.push(record),
                Err(e) => {
                    skipped += 1;
                    warn!("Skipping malformed {} entry '{}'.", R::KIND, key);
                    let _ = self.fail("list_records", e);
                }
            }
        }
        debug!(
            "Listed {} {} records ({} skipped).",
            records.len(),
            R::KIND,
            skipped
        );
        Ok(RecordListing { records, skipped })
    }

    fn check_conflicts_unlocked<R: Record>(&self, record: &R) -> Result<()> {
        for other in &self.list_unlocked::<R>()?.records {
            if other.id() == record.id() {
                continue;
            }
            if let Some(reason) = record.conflicts_with(other) {
                return Err(Error::Validation(reason));
            }
        }
        Ok(())
    }

    /// Clears the primary flag on every other active record claiming the
    /// same singleton group, before the incoming record is written.
    fn enforce_singleton_unlocked<R: Record>(&self, record: &R) -> Result<()> {
        let Some(group) = record.primary_group() else {
            return Ok(());
        };
        let segment = paths::segment_for(R::KIND);
        for mut other in self.list_unlocked::<R>()?.records {
            if other.id() == record.id() || !other.is_active() {
                continue;
            }
            if other.primary_group() == Some(group.clone()) {
                info!(
                    "Clearing primary flag on {} record {} (superseded in group '{}').",
                    R::KIND,
                    other.id(),
                    group
                );
                other.clear_primary();
                self.keys()
                    .set_value(segment, other.id(), &codec::encode(&other))?;
            }
        }
        Ok(())
    }

    fn update_main_pointer_unlocked<R: Record>(&self, record: &R) -> Result<()> {
        if R::KIND != RecordKind::Database {
            return Ok(());
        }
        if record.is_active() && record.primary_group().is_some() {
            self.keys()
                .set_value(paths::METADATA, meta_keys::MAIN_DATABASE_ID, record.id())?;
        } else {
            let pointer = self
                .keys()
                .get_value(paths::METADATA, meta_keys::MAIN_DATABASE_ID)?;
            if pointer.as_deref() == Some(record.id()) {
                self.keys()
                    .delete_key(paths::METADATA, meta_keys::MAIN_DATABASE_ID)?;
            }
        }
        Ok(())
    }
}
