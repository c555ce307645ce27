use contracts::domain::a004_customer::aggregate::{Customer, CustomerId};
use contracts::domain::common::EntityMetadata;
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue::NotSet, Condition, PaginatorTrait, QueryOrder, Set};

use crate::shared::time;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "a004_customer")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub full_name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub notes: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    pub created_by: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Customer {
    type Error = DbErr;

    fn try_from(m: Model) -> Result<Self, Self::Error> {
        Ok(Customer {
            id: CustomerId(m.id),
            full_name: m.full_name,
            phone: m.phone,
            email: m.email,
            address: m.address,
            notes: m.notes,
            metadata: EntityMetadata {
                created_at: time::from_db(&m.created_at)?,
                updated_at: time::from_db(&m.updated_at)?,
                created_by: m.created_by,
            },
        })
    }
}

fn to_active(customer: &Customer) -> ActiveModel {
    ActiveModel {
        id: NotSet,
        full_name: Set(customer.full_name.clone()),
        phone: Set(customer.phone.clone()),
        email: Set(customer.email.clone()),
        address: Set(customer.address.clone()),
        notes: Set(customer.notes.clone()),
        created_at: Set(time::to_db(customer.metadata.created_at)),
        updated_at: Set(time::to_db(customer.metadata.updated_at)),
        created_by: Set(customer.metadata.created_by.clone()),
    }
}

pub async fn insert<C: ConnectionTrait>(conn: &C, customer: &Customer) -> Result<CustomerId, DbErr> {
    let model = to_active(customer).insert(conn).await?;
    Ok(CustomerId(model.id))
}

pub async fn update<C: ConnectionTrait>(conn: &C, customer: &Customer) -> Result<(), DbErr> {
    let mut active = to_active(customer);
    active.id = Set(customer.id.value());
    active.created_at = NotSet;
    active.created_by = NotSet;
    active.update(conn).await?;
    Ok(())
}

pub async fn delete<C: ConnectionTrait>(conn: &C, id: CustomerId) -> Result<bool, DbErr> {
    let result = Entity::delete_by_id(id.value()).exec(conn).await?;
    Ok(result.rows_affected > 0)
}

pub async fn find<C: ConnectionTrait>(conn: &C, id: CustomerId) -> Result<Option<Customer>, DbErr> {
    Entity::find_by_id(id.value())
        .one(conn)
        .await?
        .map(Customer::try_from)
        .transpose()
}

/// Newest first; `search` matches a substring of the name or the phone
pub async fn list<C: ConnectionTrait>(conn: &C, search: Option<&str>) -> Result<Vec<Customer>, DbErr> {
    let mut query = Entity::find();
    if let Some(term) = search {
        query = query.filter(
            Condition::any()
                .add(Column::FullName.contains(term))
                .add(Column::Phone.contains(term)),
        );
    }
    query
        .order_by_desc(Column::Id)
        .all(conn)
        .await?
        .into_iter()
        .map(Customer::try_from)
        .collect()
}

pub async fn count<C: ConnectionTrait>(conn: &C) -> Result<u64, DbErr> {
    Entity::find().count(conn).await
}
