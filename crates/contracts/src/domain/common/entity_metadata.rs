use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle metadata of an aggregate instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityMetadata {
    /// Creation instant (UTC)
    pub created_at: DateTime<Utc>,
    /// Last modification instant (UTC)
    pub updated_at: DateTime<Utc>,
    /// ID of the user who created the record, when known
    pub created_by: Option<String>,
}

impl EntityMetadata {
    /// Metadata for a freshly created aggregate
    pub fn new(created_by: Option<String>) -> Self {
        Self::stamped(Utc::now(), created_by)
    }

    /// Metadata created at a given instant
    pub fn stamped(now: DateTime<Utc>, created_by: Option<String>) -> Self {
        Self {
            created_at: now,
            updated_at: now,
            created_by,
        }
    }

    /// Bump the modification timestamp
    pub fn touch_at(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }
}

impl Default for EntityMetadata {
    fn default() -> Self {
        Self::new(None)
    }
}
