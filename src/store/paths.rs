//! Fixed hierarchical layout of the store namespace.
//!
//! Pure and stateless: record kinds map to fixed segment names, nothing
//! here touches the key/value medium.

use crate::records::RecordKind;

/// Segment holding database connection records.
pub const DATABASES: &str = "databases";
/// Segment holding printer mapping records.
pub const PRINTERS: &str = "printers";
/// Segment holding system setting records.
pub const SYSTEM_CONFIGS: &str = "system-configs";
/// Segment holding store-wide metadata keys.
pub const METADATA: &str = "metadata";

/// Every segment `initialize()` must create, in creation order.
pub const ALL_SEGMENTS: [&str; 4] = [DATABASES, PRINTERS, SYSTEM_CONFIGS, METADATA];

/// The namespace segment a record kind is stored under.
pub const fn segment_for(kind: RecordKind) -> &'static str {
    match kind {
        RecordKind::Database => DATABASES,
        RecordKind::Printer => PRINTERS,
        RecordKind::SystemSetting => SYSTEM_CONFIGS,
    }
}
