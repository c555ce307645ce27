use serde::{Deserialize, Serialize};

/// Activity (audit) log entry: who did what, when and from where
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityLogEntry {
    pub id: i64,
    pub timestamp: String,
    pub user_id: Option<String>,
    pub username: Option<String>,
    /// For example "create", "complete", "delete"
    pub action: String,
    /// Aggregate full name, for example "a001_work_order"
    pub entity: String,
    pub entity_id: Option<String>,
    pub details: Option<String>,
    pub ip_address: Option<String>,
}

/// Query of the activity log list
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActivityLogQuery {
    pub limit: Option<u64>,
}
