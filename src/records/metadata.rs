//! Store-wide metadata singleton.
//!
//! Metadata lives as individual keys under the `metadata/` namespace
//! segment rather than as one encoded blob, so diagnostics tooling can
//! read single attributes without a record decoder. Exactly one instance
//! exists per store; it is created by `initialize()` and mutated only by
//! the store itself.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Schema version written by `initialize()` on a fresh store.
pub const SCHEMA_VERSION: &str = "1.0.0";

/// Key names under the `metadata/` segment.
pub mod keys {
    /// Schema version string.
    pub const VERSION: &str = "version";
    /// ISO-8601 timestamp of the last structural or record write.
    pub const LAST_MODIFIED: &str = "lastModified";
    /// Identity string of whoever initialized the store.
    pub const CREATED_BY: &str = "createdBy";
    /// ISO-8601 timestamp of initialization.
    pub const CREATED_DATE: &str = "createdDate";
    /// `"true"` once initialization completed.
    pub const IS_INITIALIZED: &str = "isInitialized";
    /// Optional convenience pointer to the main database record id.
    pub const MAIN_DATABASE_ID: &str = "mainDatabaseId";
}

/// In-memory view of the metadata namespace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    /// Schema version of the persisted layout.
    pub version: String,
    /// When the store was initialized.
    pub created_date: DateTime<Utc>,
    /// Who initialized the store.
    pub created_by: String,
    /// Last structural or record-level write.
    pub last_modified: DateTime<Utc>,
    /// Whether initialization completed.
    pub is_initialized: bool,
    /// Main database record id, when one is flagged.
    pub main_database_id: Option<String>,
}

impl Metadata {
    /// Epoch sentinel used when a stored timestamp is missing or unparsable.
    pub fn epoch() -> DateTime<Utc> {
        Utc.timestamp_opt(0, 0).single().unwrap_or_default()
    }

    /// Fresh metadata for a store being initialized now.
    pub fn fresh(created_by: String, now: DateTime<Utc>) -> Self {
        Self {
            version: SCHEMA_VERSION.to_string(),
            created_date: now,
            created_by,
            last_modified: now,
            is_initialized: true,
            main_database_id: None,
        }
    }

    /// The key/value pairs to persist under `metadata/`.
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            (keys::VERSION, self.version.clone()),
            (keys::CREATED_DATE, self.created_date.to_rfc3339()),
            (keys::CREATED_BY, self.created_by.clone()),
            (keys::LAST_MODIFIED, self.last_modified.to_rfc3339()),
            (keys::IS_INITIALIZED, self.is_initialized.to_string()),
        ];
        if let Some(id) = &self.main_database_id {
            pairs.push((keys::MAIN_DATABASE_ID, id.clone()));
        }
        pairs
    }

    /// Lenient reconstruction from whatever keys are present. Missing or
    /// unparsable attributes fall back to defaults (epoch timestamps,
    /// `is_initialized = false`) so callers like the health reporter never
    /// have to fail on a half-written namespace.
    pub fn from_entries(entries: &HashMap<String, String>) -> Self {
        let parse_ts = |key: &str| {
            entries
                .get(key)
                .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
                .map(|ts| ts.with_timezone(&Utc))
                .unwrap_or_else(Self::epoch)
        };
        Self {
            version: entries
                .get(keys::VERSION)
                .cloned()
                .unwrap_or_else(|| "unknown".to_string()),
            created_date: parse_ts(keys::CREATED_DATE),
            created_by: entries
                .get(keys::CREATED_BY)
                .cloned()
                .unwrap_or_else(|| "unknown".to_string()),
            last_modified: parse_ts(keys::LAST_MODIFIED),
            is_initialized: entries
                .get(keys::IS_INITIALIZED)
                .map(|raw| raw == "true")
                .unwrap_or(false),
            main_database_id: entries.get(keys::MAIN_DATABASE_ID).cloned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pairs_round_trip_through_entries() {
        let meta = Metadata::fresh("operator@till-3".to_string(), Utc::now());
        let entries: HashMap<String, String> = meta
            .to_pairs()
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();
        let back = Metadata::from_entries(&entries);

        assert_eq!(back.version, meta.version);
        assert_eq!(back.created_by, meta.created_by);
        assert!(back.is_initialized);
        // RFC 3339 keeps sub-second precision, so timestamps survive intact.
        assert_eq!(back.created_date, meta.created_date);
        assert_eq!(back.last_modified, meta.last_modified);
    }

    #[test]
    fn missing_keys_fall_back_to_safe_defaults() {
        let meta = Metadata::from_entries(&HashMap::new());
        assert!(!meta.is_initialized);
        assert_eq!(meta.version, "unknown");
        assert_eq!(meta.created_date, Metadata::epoch());
        assert_eq!(meta.main_database_id, None);
    }

    #[test]
    fn garbage_timestamp_becomes_epoch_sentinel() {
        let mut entries = HashMap::new();
        entries.insert(keys::LAST_MODIFIED.to_string(), "not-a-date".to_string());
        entries.insert(keys::IS_INITIALIZED.to_string(), "true".to_string());
        let meta = Metadata::from_entries(&entries);
        assert!(meta.is_initialized);
        assert_eq!(meta.last_modified, Metadata::epoch());
    }
}
