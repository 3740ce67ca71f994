//! Item entity and its write-side inputs.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Serialize, Serializer};

/// Storage-assigned item identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct ItemId(pub i64);

impl ItemId {
    pub fn new(id: i64) -> Self {
        ItemId(id)
    }

    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Format SQLite's `CURRENT_TIMESTAMP` writes.
pub const SQLITE_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A persisted item row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Item {
    pub id: ItemId,
    pub title: String,
    pub description: Option<String>,
    pub is_active: bool,
    /// Server-assigned insertion time (UTC, second precision).
    #[serde(serialize_with = "serialize_created_at")]
    pub created_at: DateTime<Utc>,
}

fn serialize_created_at<S>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&ts.format("%Y-%m-%dT%H:%M:%S").to_string())
}

/// Parse a `created_at` column value.
///
/// Accepts SQLite's `YYYY-MM-DD HH:MM:SS` as well as RFC 3339 text.
pub fn parse_created_at(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, SQLITE_TIMESTAMP_FORMAT) {
        return Some(naive.and_utc());
    }
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|ts| ts.with_timezone(&Utc))
}

/// Validated input for item creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewItem {
    pub title: String,
    pub description: Option<String>,
    pub is_active: bool,
}

impl NewItem {
    pub fn new(title: impl Into<String>) -> Self {
        NewItem {
            title: title.into(),
            description: None,
            is_active: true,
        }
    }

    #[cfg(test)]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[cfg(test)]
    pub fn with_active(mut self, is_active: bool) -> Self {
        self.is_active = is_active;
        self
    }
}

/// Partial update of an item.
///
/// `None` means the field was not mentioned in the request and stays as is.
/// For `description`, `Some(None)` is an explicit null and clears the column.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemPatch {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub is_active: Option<bool>,
}

impl ItemPatch {
    /// True when no field was supplied.
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.is_active.is_none()
    }

    #[cfg(test)]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    #[cfg(test)]
    pub fn description(mut self, description: Option<String>) -> Self {
        self.description = Some(description);
        self
    }

    #[cfg(test)]
    pub fn is_active(mut self, is_active: bool) -> Self {
        self.is_active = Some(is_active);
        self
    }
}
