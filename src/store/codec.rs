//! Record wire encoding.
//!
//! Records are stored as self-describing JSON objects. Decoding ignores
//! unknown extra fields (forward compatibility) and fails only when a
//! required field is missing or has the wrong shape.

use crate::errors::{Error, Result};
use crate::records::Record;

/// Encodes a record for storage. Total for any well-formed in-memory record.
pub fn encode<R: Record>(record: &R) -> String {
    // Serialization of a plain data struct to JSON cannot fail.
    serde_json::to_string(record).unwrap_or_default()
}

/// Decodes a stored payload into a record of kind `R`.
///
/// # Errors
///
/// Returns `Error::MalformedRecord` (carrying `id` for context) when the
/// payload cannot be parsed into the expected shape.
pub fn decode<R: Record>(payload: &str, id: &str) -> Result<R> {
    serde_json::from_str(payload).map_err(|e| Error::MalformedRecord {
        kind: R::KIND.name(),
        id: id.to_string(),
        reason: e.to_string(),
    })
}
