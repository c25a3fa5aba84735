//! Administrative CLI for the point-of-sale configuration store.

use pos_config::config;
use pos_config::errors::{Error, Result};
use pos_config::providers::{EnvIdentity, Identity, StaticIdentity, SystemClock, TracingErrorSink};
use pos_config::records::{DatabaseRecord, PrinterRecord, RecordKind, SystemSettingRecord};
use pos_config::store::{ConfigStore, HealthReporter, KeyStore, SqliteKeyStore};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const USAGE: &str = "usage: pos-config <init | status | list <kind> | backup <file>>";

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; non-fatal, env vars can be set externally
    dotenvy::dotenv().ok();

    // 3. Load the application configuration
    let config_path =
        std::env::var("POS_CONFIG_FILE").unwrap_or_else(|_| "pos-config.toml".to_string());
    let app_config = config::load_config(&config_path)
        .inspect_err(|e| error!("Failed to load application configuration: {}", e))?;

    // 4. Open the store
    let keys = SqliteKeyStore::open(&app_config.store_path)
        .inspect(|_| info!("Opened store at {}.", app_config.store_path))
        .inspect_err(|e| error!("Failed to open store: {}", e))?;
    let identity: Arc<dyn Identity> = match &app_config.operator {
        Some(operator) => Arc::new(StaticIdentity(operator.clone())),
        None => Arc::new(EnvIdentity),
    };
    let store = ConfigStore::with_providers(
        keys,
        Arc::new(SystemClock),
        identity,
        Arc::new(TracingErrorSink),
    );

    // 5. Dispatch the subcommand
    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.iter().map(String::as_str).collect::<Vec<_>>().as_slice() {
        ["init"] => {
            store.initialize().await?;
            println!("Store initialized.");
        }
        ["status"] => {
            let snapshot = HealthReporter::new(&store).get_health().await;
            println!("healthy:        {}", snapshot.is_healthy);
            println!("initialized:    {}", snapshot.is_initialized);
            println!("structure ok:   {}", snapshot.is_structure_valid);
            println!("version:        {}", snapshot.version);
            println!("databases:      {}", snapshot.database_count);
            println!("printers:       {}", snapshot.printer_count);
            println!("settings:       {}", snapshot.setting_count);
            println!("skipped:        {}", snapshot.skipped_entries);
            println!("last modified:  {}", snapshot.last_modified.to_rfc3339());
            if let Some(error) = &snapshot.error {
                println!("error:          {error}");
            }
        }
        ["list", kind] => {
            let kind: RecordKind = kind
                .parse()
                .map_err(Error::Config)?;
            list_kind(&store, kind).await?;
        }
        ["backup", file] => {
            let backup = store.export_backup().await?;
            std::fs::write(file, backup.to_json())?;
            println!(
                "Wrote backup of {} records to {}.",
                backup.databases.len() + backup.printers.len() + backup.settings.len(),
                file
            );
        }
        _ => {
            eprintln!("{USAGE}");
            return Err(Error::Config("unrecognized command line".to_string()));
        }
    }

    Ok(())
}

async fn list_kind<S: KeyStore>(store: &ConfigStore<S>, kind: RecordKind) -> Result<()> {
    match kind {
        RecordKind::Database => {
            let listing = store.list_records::<DatabaseRecord>().await?;
            for record in &listing.records {
                println!(
                    "{}  {}  {}  main={}",
                    record.id, record.name, record.server, record.is_main_database
                );
            }
            report_skips(listing.records.len(), listing.skipped);
        }
        RecordKind::Printer => {
            let listing = store.list_records::<PrinterRecord>().await?;
            for record in &listing.records {
                println!(
                    "{}  zone={}  {}  default={}",
                    record.id, record.zone, record.printer_name, record.is_default
                );
            }
            report_skips(listing.records.len(), listing.skipped);
        }
        RecordKind::SystemSetting => {
            let listing = store.list_records::<SystemSettingRecord>().await?;
            for record in &listing.records {
                println!("{}  {} = {}", record.id, record.name, record.value);
            }
            report_skips(listing.records.len(), listing.skipped);
        }
    }
    Ok(())
}

fn report_skips(listed: usize, skipped: usize) {
    if skipped > 0 {
        eprintln!("warning: {skipped} malformed entries skipped ({listed} listed)");
    }
}
