//! System setting record.
//!
//! Settings are stored as text tagged with a declared logical type; the
//! store refuses to persist a value that does not parse under its tag.

use super::{Record, RecordKind};
use crate::errors::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Logical type a setting value must parse under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SettingType {
    /// Any text, always valid.
    String,
    /// Signed integer (`i64`).
    Integer,
    /// `true` / `false`.
    Boolean,
    /// Decimal number (`f64`).
    Decimal,
}

impl SettingType {
    /// Checks that `value` parses under this type.
    pub fn check(self, value: &str) -> bool {
        match self {
            Self::String => true,
            Self::Integer => value.parse::<i64>().is_ok(),
            Self::Boolean => matches!(value, "true" | "false"),
            Self::Decimal => value.parse::<f64>().is_ok(),
        }
    }
}

/// A stored system setting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemSettingRecord {
    /// Unique identifier, generated on create when empty.
    #[serde(default)]
    pub id: String,
    /// Setting name; unique among active settings.
    pub name: String,
    /// Value as text; must parse under `setting_type`.
    pub value: String,
    /// Declared logical type of `value`.
    pub setting_type: SettingType,
    /// Operator-facing description.
    #[serde(default)]
    pub description: String,
    /// Whether the terminal refuses to start without this setting.
    #[serde(default)]
    pub is_required: bool,
    /// Creation timestamp, set by the store on create.
    pub created_date: DateTime<Utc>,
    /// Bumped by the store on every update.
    pub last_modified: DateTime<Utc>,
    /// Soft-active flag.
    pub is_active: bool,
}

impl Record for SystemSettingRecord {
    const KIND: RecordKind = RecordKind::SystemSetting;

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn is_active(&self) -> bool {
        self.is_active
    }

    fn primary_group(&self) -> Option<String> {
        None
    }

    fn clear_primary(&mut self) {}

    fn stamp_created(&mut self, now: DateTime<Utc>) {
        self.created_date = now;
        self.last_modified = now;
    }

    fn stamp_modified(&mut self, now: DateTime<Utc>) {
        self.last_modified = now;
    }

    fn conflicts_with(&self, other: &Self) -> Option<String> {
        // Setting names are unique among active settings.
        (self.is_active && other.is_active && self.name == other.name).then(|| {
            format!(
                "active setting name '{}' already used by record {}",
                self.name, other.id
            )
        })
    }

    fn validate(&self) -> Result<()> {
        if !self.setting_type.check(&self.value) {
            return Err(Error::Validation(format!(
                "setting '{}': value '{}' does not parse as {:?}",
                self.name, self.value, self.setting_type
            )));
        }
        Ok(())
    }
}
