//! Typed configuration records persisted by the store.
//!
//! Each record kind lives under its own namespace segment and carries its
//! own schema; the [`Record`] trait is what the generic CRUD layer needs
//! from all of them (stable kind tag, id accessors, and the optional
//! "primary flag" grouping that backs the singleton invariants).

/// Database connection records
pub mod database;
/// Store-wide metadata singleton
pub mod metadata;
/// Printer mapping records
pub mod printer;
/// System setting records
pub mod setting;

pub use database::DatabaseRecord;
pub use metadata::Metadata;
pub use printer::PrinterRecord;
pub use setting::{SettingType, SystemSettingRecord};

use crate::errors::Result;
use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Serialize};

/// The three persisted record kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    /// Database connection entries (`databases/` segment).
    Database,
    /// Printer mappings (`printers/` segment).
    Printer,
    /// System settings (`system-configs/` segment).
    SystemSetting,
}

impl RecordKind {
    /// Stable lower-case tag used in errors and logs.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Database => "database",
            Self::Printer => "printer",
            Self::SystemSetting => "system-setting",
        }
    }

    /// All kinds, in namespace order.
    pub const ALL: [Self; 3] = [Self::Database, Self::Printer, Self::SystemSetting];
}

impl std::fmt::Display for RecordKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for RecordKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "database" | "databases" => Ok(Self::Database),
            "printer" | "printers" => Ok(Self::Printer),
            "system-setting" | "setting" | "settings" | "system-configs" => {
                Ok(Self::SystemSetting)
            }
            other => Err(format!("unknown record kind '{other}'")),
        }
    }
}

/// Contract every persisted record kind implements for the generic CRUD
/// layer in [`crate::store`].
pub trait Record: Serialize + DeserializeOwned + Clone + PartialEq + std::fmt::Debug {
    /// Which namespace segment and decode schema applies.
    const KIND: RecordKind;

    /// The record's unique id; empty string means "not yet assigned".
    fn id(&self) -> &str;

    /// Assigns a generated id before the first write.
    fn set_id(&mut self, id: String);

    /// Whether the record counts toward active-record invariants.
    fn is_active(&self) -> bool;

    /// The singleton group this record claims when its primary flag is set:
    /// `Some(group)` means "at most one active record per `group` may hold
    /// the flag". Database records claim a single global group, printers a
    /// per-zone group, settings none.
    fn primary_group(&self) -> Option<String>;

    /// Clears the primary flag. Called on the previous holder when a new
    /// record claims the same group.
    fn clear_primary(&mut self);

    /// Stamps the creation timestamp. Called by the store on create.
    fn stamp_created(&mut self, now: DateTime<Utc>);

    /// Stamps the last-modified timestamp, for kinds that track one.
    /// Called by the store on update.
    fn stamp_modified(&mut self, _now: DateTime<Utc>) {}

    /// Checks this record against another stored record of the same kind
    /// for a write-time conflict (e.g. duplicate active setting name).
    /// Returns a description of the conflict, or `None`.
    fn conflicts_with(&self, _other: &Self) -> Option<String> {
        None
    }

    /// Write-time invariant checks beyond what decoding enforces.
    /// Default: nothing to check.
    fn validate(&self) -> Result<()> {
        Ok(())
    }
}
