use chrono::Utc;
use contracts::shared::activity_log::ActivityLogEntry;
use sea_orm::entity::prelude::*;
use sea_orm::{QueryOrder, QuerySelect, Set};

use super::ActivityEvent;
use crate::shared::time;

/// Default and maximum page size of the activity log list
pub const DEFAULT_LIMIT: u64 = 100;
pub const MAX_LIMIT: u64 = 1000;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "sys_activity_log")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub timestamp: String,
    pub user_id: Option<String>,
    pub username: Option<String>,
    pub action: String,
    pub entity: String,
    pub entity_id: Option<String>,
    pub details: Option<String>,
    pub ip_address: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for ActivityLogEntry {
    fn from(m: Model) -> Self {
        ActivityLogEntry {
            id: m.id,
            timestamp: m.timestamp,
            user_id: m.user_id,
            username: m.username,
            action: m.action,
            entity: m.entity,
            entity_id: m.entity_id,
            details: m.details,
            ip_address: m.ip_address,
        }
    }
}

pub async fn insert<C: ConnectionTrait>(db: &C, event: &ActivityEvent) -> Result<(), DbErr> {
    let active = ActiveModel {
        id: sea_orm::ActiveValue::NotSet,
        timestamp: Set(time::to_db(Utc::now())),
        user_id: Set(event.actor.user_id.clone()),
        username: Set(event.actor.username.clone()),
        action: Set(event.action.clone()),
        entity: Set(event.entity.clone()),
        entity_id: Set(event.entity_id.clone()),
        details: Set(event.details.clone()),
        ip_address: Set(event.actor.ip_address.clone()),
    };
    Entity::insert(active).exec(db).await?;
    Ok(())
}

/// Newest entries first
pub async fn list<C: ConnectionTrait>(db: &C, limit: Option<u64>) -> Result<Vec<ActivityLogEntry>, DbErr> {
    let limit = limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
    let entries = Entity::find()
        .order_by_desc(Column::Id)
        .limit(limit)
        .all(db)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(entries)
}
