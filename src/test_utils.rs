//! Shared test utilities.
//!
//! Helpers for setting up in-memory stores with deterministic
//! collaborators, plus record factories with sensible defaults.

use crate::errors::{Error, Result};
use crate::providers::{Clock, ErrorSink, Identity};
use crate::records::{DatabaseRecord, PrinterRecord, SettingType, SystemSettingRecord};
use crate::store::{ConfigStore, SqliteKeyStore};
use chrono::{DateTime, Duration, TimeZone, Utc};
use std::sync::{Arc, Mutex};
use tracing_subscriber::EnvFilter;

pub(crate) fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")))
        .with_test_writer() // Crucial for `cargo test` output
        .try_init(); // Use try_init to avoid panic if already initialized
}

/// Deterministic clock that advances one second per reading, so
/// "last-modified moves forward" assertions never flake.
pub(crate) struct SteppingClock {
    current: Mutex<DateTime<Utc>>,
}

impl SteppingClock {
    pub(crate) fn new() -> Self {
        Self {
            current: Mutex::new(Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()),
        }
    }
}

impl Clock for SteppingClock {
    fn now(&self) -> DateTime<Utc> {
        let mut current = self.current.lock().expect("clock lock");
        *current += Duration::seconds(1);
        *current
    }
}

/// Fixed identity for metadata attribution in tests.
pub(crate) struct TestIdentity;

impl Identity for TestIdentity {
    fn current_user(&self) -> String {
        "tester".to_string()
    }
}

/// Error sink that records every reported fault for assertions.
#[derive(Default)]
pub(crate) struct CollectingErrorSink {
    pub(crate) reports: Mutex<Vec<(String, String)>>,
}

impl ErrorSink for CollectingErrorSink {
    fn report(&self, context: &str, err: &Error) {
        self.reports
            .lock()
            .expect("sink lock")
            .push((context.to_string(), err.kind_name().to_string()));
    }
}

/// In-memory store with deterministic collaborators, structure NOT yet
/// initialized.
pub(crate) fn setup_test_store() -> Result<ConfigStore<SqliteKeyStore>> {
    Ok(ConfigStore::with_providers(
        SqliteKeyStore::open_in_memory()?,
        Arc::new(SteppingClock::new()),
        Arc::new(TestIdentity),
        Arc::new(crate::providers::TracingErrorSink),
    ))
}

/// In-memory store with the namespace structure already initialized.
pub(crate) async fn setup_initialized_store() -> Result<ConfigStore<SqliteKeyStore>> {
    let store = setup_test_store()?;
    store.initialize().await?;
    Ok(store)
}

/// Database record with sensible defaults; id left for the store to assign.
pub(crate) fn sample_database(name: &str) -> DatabaseRecord {
    DatabaseRecord {
        id: String::new(),
        name: name.to_string(),
        server: "db.local".to_string(),
        database: "pos".to_string(),
        username: "pos".to_string(),
        password: "secret".to_string(),
        is_main_database: false,
        created_date: Utc::now(),
        is_active: true,
    }
}

/// Printer record for a zone with sensible defaults.
pub(crate) fn sample_printer(zone: &str, is_default: bool) -> PrinterRecord {
    PrinterRecord {
        id: String::new(),
        zone: zone.to_string(),
        printer_name: format!("{zone} receipt printer"),
        printer_path: format!("\\\\till-host\\{}", zone.to_lowercase()),
        is_default,
        created_date: Utc::now(),
        is_active: true,
    }
}

/// String-typed setting record with sensible defaults.
pub(crate) fn sample_setting(name: &str, value: &str) -> SystemSettingRecord {
    SystemSettingRecord {
        id: String::new(),
        name: name.to_string(),
        value: value.to_string(),
        setting_type: SettingType::String,
        description: String::new(),
        is_required: false,
        created_date: Utc::now(),
        last_modified: Utc::now(),
        is_active: true,
    }
}
