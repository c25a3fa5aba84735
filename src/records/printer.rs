//! Printer mapping record.
//!
//! Maps a service zone (counter "A", "Kitchen", "Bar", ...) to a printer
//! name and address. Each zone may have at most one active default printer.

use super::{Record, RecordKind};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A stored printer mapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrinterRecord {
    /// Unique identifier, generated on create when empty.
    #[serde(default)]
    pub id: String,
    /// Free-form zone label the printer serves (e.g. "A", "Kitchen").
    pub zone: String,
    /// Printer display name.
    pub printer_name: String,
    /// Printer path or network address (e.g. `\\\\host\\receipt-1`).
    pub printer_path: String,
    /// Whether this printer is the zone's default.
    #[serde(default)]
    pub is_default: bool,
    /// Creation timestamp, set by the store on create.
    pub created_date: DateTime<Utc>,
    /// Soft-active flag.
    pub is_active: bool,
}

impl Record for PrinterRecord {
    const KIND: RecordKind = RecordKind::Printer;

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
        // Default printers are singletons per zone, not globally.
        self.is_default.then(|| self.zone.clone())
    }

    fn clear_primary(&mut self) {
        self.is_default = false;
    }

    fn stamp_created(&mut self, now: DateTime<Utc>) {
        self.created_date = now;
    }
}
