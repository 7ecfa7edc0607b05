mod files;
mod sqlite_store;

pub use sqlite_store::{ActivityCounts, IdeaStore, IDEABOX_DIR, IDEAS_DB};

use chrono::{DateTime, SecondsFormat, Utc};

use crate::error::{IdeaboxError, Result};

/// Fixed-width RFC 3339 so text columns sort chronologically.
pub(crate) fn fmt_ts(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

pub(crate) fn parse_ts(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| IdeaboxError::Storage(format!("Bad timestamp in database: {}", raw)))
}

pub(crate) fn parse_id(raw: &str) -> Result<uuid::Uuid> {
    uuid::Uuid::parse_str(raw)
        .map_err(|_| IdeaboxError::Storage(format!("Bad id in database: {}", raw)))
}
