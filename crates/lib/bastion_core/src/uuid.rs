//! Helpers for the identifiers the core generates itself.
//!
//! Audit log rows are append-only and read back newest-first, so they use
//! UUIDv7 (timestamp-sortable). Request ids only need to be unique and use v4.

use uuid::Uuid;

/// Generate a new UUIDv7 (timestamp-sortable).
pub fn uuidv7() -> Uuid {
    Uuid::now_v7()
}

/// Generate a random request id when the caller did not supply one.
pub fn new_request_id() -> String {
    Uuid::new_v4().to_string()
}

/// Parse a textual identifier, returning `None` for anything malformed.
pub fn parse_id(raw: &str) -> Option<Uuid> {
    Uuid::parse_str(raw.trim()).ok()
}
