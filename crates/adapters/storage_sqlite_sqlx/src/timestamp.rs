//! Text encoding of timestamps in the database.

use autoapply_domain::time::Timestamp;
use chrono::SecondsFormat;

use crate::error::decode_error;

/// Fixed-width RFC 3339 (`2026-03-01T09:00:00.000000Z`), so string
/// comparison in SQL orders chronologically.
pub(crate) fn encode(ts: Timestamp) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn decode(raw: &str) -> Result<Timestamp, sqlx::Error> {
    chrono::DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.to_utc())
        .map_err(decode_error)
}
