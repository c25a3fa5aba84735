//! Backup snapshot export.
//!
//! An administrative convenience: a read-only JSON document bundling the
//! metadata and every decodable record, suitable for archiving or moving
//! a configuration between installations. Export never mutates the store.

use super::{ConfigStore, KeyStore};
use crate::errors::Result;
use crate::records::metadata::Metadata;
use crate::records::{DatabaseRecord, PrinterRecord, SystemSettingRecord};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, instrument};

/// Serializable export of the whole configuration namespace.
#[derive(Debug, Clone, Serialize)]
pub struct BackupDocument {
    /// When the export was taken.
    pub generated_at: DateTime<Utc>,
    /// Metadata namespace at export time.
    pub metadata: Metadata,
    /// All decodable database records.
    pub databases: Vec<DatabaseRecord>,
    /// All decodable printer records.
    pub printers: Vec<PrinterRecord>,
    /// All decodable system setting records.
    pub settings: Vec<SystemSettingRecord>,
    /// Entries left out of the export because they were malformed.
    pub skipped_entries: usize,
}

impl BackupDocument {
    /// Pretty-printed JSON rendition for writing to a file.
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}

impl<S: KeyStore> ConfigStore<S> {
    /// Exports a backup document of metadata plus every decodable record.
    /// Malformed entries are counted, not exported.
    ///
    /// # Errors
    ///
    /// Propagates key-store faults; requires an initialized structure.
    #[instrument(skip(self))]
    pub async fn export_backup(&self) -> Result<BackupDocument> {
        let _read = self.read_guard()?;

        let metadata = self.read_metadata_unlocked()?;
        let databases = self.list_unlocked::<DatabaseRecord>()?;
        let printers = self.list_unlocked::<PrinterRecord>()?;
        let settings = self.list_unlocked::<SystemSettingRecord>()?;
        let skipped_entries = databases.skipped + printers.skipped + settings.skipped;

        info!(
            databases = databases.records.len(),
            printers = printers.records.len(),
            settings = settings.records.len(),
            skipped = skipped_entries,
            "Exported backup document."
        );
        Ok(BackupDocument {
            generated_at: self.now(),
            metadata,
            databases: databases.records,
            printers: printers.records,
            settings: settings.records,
            skipped_entries,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::paths;
    use crate::test_utils::{
        init_test_tracing, sample_database, sample_printer, sample_setting, setup_initialized_store,
    };

    #[tokio::test]
    async fn export_bundles_all_kinds_and_counts_skips() -> Result<()> {
        init_test_tracing();
        let store = setup_initialized_store().await?;

        store.create_record(sample_database("db")).await?;
        store.create_record(sample_printer("A", true)).await?;
        store.create_record(sample_setting("theme", "dark")).await?;
        store
            .keys()
            .set_value(paths::DATABASES, "corrupt", "{ nope")?;

        let backup = store.export_backup().await?;
        assert_eq!(backup.databases.len(), 1);
        assert_eq!(backup.printers.len(), 1);
        assert_eq!(backup.settings.len(), 1);
        assert_eq!(backup.skipped_entries, 1);
        assert!(backup.metadata.is_initialized);

        let json = backup.to_json();
        assert!(json.contains("\"databases\""));
        assert!(json.contains("\"generated_at\""));
        Ok(())
    }

    #[tokio::test]
    async fn export_does_not_mutate_the_store() -> Result<()> {
        init_test_tracing();
        let store = setup_initialized_store().await?;
        store.create_record(sample_setting("lang", "en")).await?;

        let before = store.metadata().await?.last_modified;
        let _ = store.export_backup().await?;
        let after = store.metadata().await?.last_modified;
        assert_eq!(before, after);
        Ok(())
    }
}
