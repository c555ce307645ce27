pub mod repository;

use sea_orm::DatabaseConnection;

/// Who performs an operation, as supplied by the auth layer
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Actor {
    pub user_id: Option<String>,
    pub username: Option<String>,
    pub ip_address: Option<String>,
}

impl Actor {
    pub fn new(user_id: &str, username: &str, ip_address: Option<String>) -> Self {
        Self {
            user_id: Some(user_id.to_string()),
            username: Some(username.to_string()),
            ip_address,
        }
    }
}

/// Activity log record waiting to be written
#[derive(Debug, Clone)]
pub struct ActivityEvent {
    pub actor: Actor,
    pub action: String,
    pub entity: String,
    pub entity_id: Option<String>,
    pub details: Option<String>,
}

impl ActivityEvent {
    pub fn new(actor: &Actor, action: &str, entity: &str) -> Self {
        Self {
            actor: actor.clone(),
            action: action.to_string(),
            entity: entity.to_string(),
            entity_id: None,
            details: None,
        }
    }

    pub fn entity_id(mut self, id: impl ToString) -> Self {
        self.entity_id = Some(id.to_string());
        self
    }

    pub fn details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

/// Write an event to the activity log without waiting for it.
///
/// Write failures are only logged; the main operation is already committed.
pub fn record(db: &DatabaseConnection, event: ActivityEvent) {
    let db = db.clone();
    tokio::spawn(async move {
        if let Err(e) = repository::insert(&db, &event).await {
            tracing::warn!(
                "Failed to write activity log ({} {}): {}",
                event.action,
                event.entity,
                e
            );
        }
    });
}
