//! Database connection record.
//!
//! One record per database the point-of-sale installation can reach. At
//! most one record in the whole namespace may be flagged as the main
//! database; the store clears the flag on the previous holder when a new
//! one claims it.

use super::{Record, RecordKind};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A stored database connection entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseRecord {
    /// Unique identifier, generated on create when empty.
    #[serde(default)]
    pub id: String,
    /// Human-readable name shown in the configuration UI.
    pub name: String,
    /// Server host name or address.
    pub server: String,
    /// Database name on the server.
    pub database: String,
    /// Login user.
    pub username: String,
    /// Login secret, stored verbatim.
    pub password: String,
    /// Whether this is the installation's main database.
    #[serde(default)]
    pub is_main_database: bool,
    /// Creation timestamp, set by the store on create.
    pub created_date: DateTime<Utc>,
    /// Soft-active flag; inactive records are kept but ignored by invariants.
    pub is_active: bool,
}

impl DatabaseRecord {
    /// Renders the classic `Server=...;Database=...;` connection descriptor
    /// used by the terminal software.
    pub fn connection_descriptor(&self) -> String {
        format!(
            "Server={};Database={};User Id={};Password={};",
            self.server, self.database, self.username, self.password
        )
    }
}

impl Record for DatabaseRecord {
    const KIND: RecordKind = RecordKind::Database;

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
        // A single global group: only one main database per installation.
        self.is_main_database.then(|| "main".to_string())
    }

    fn clear_primary(&mut self) {
        self.is_main_database = false;
    }

    fn stamp_created(&mut self, now: DateTime<Utc>) {
        self.created_date = now;
    }
}
