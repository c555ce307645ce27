use chrono::NaiveDate;
use contracts::domain::a003_expense::aggregate::{Expense, ExpenseId};
use contracts::domain::common::{money, EntityMetadata};
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue::NotSet, QueryOrder, Set};

use crate::shared::data::row;
use crate::shared::time;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "a003_expense")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub description: String,
    pub amount_minor: i64,
    pub category: String,
    pub expense_date: String,
    pub created_at: String,
    pub updated_at: String,
    pub created_by: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Expense {
    type Error = DbErr;

    fn try_from(m: Model) -> Result<Self, Self::Error> {
        Ok(Expense {
            id: ExpenseId(m.id),
            description: m.description,
            amount: money::from_minor_units(m.amount_minor),
            category: m.category,
            date: time::date_from_db(&m.expense_date)?,
            metadata: EntityMetadata {
                created_at: time::from_db(&m.created_at)?,
                updated_at: time::from_db(&m.updated_at)?,
                created_by: m.created_by,
            },
        })
    }
}

fn to_active(expense: &Expense) -> Result<ActiveModel, DbErr> {
    Ok(ActiveModel {
        id: NotSet,
        description: Set(expense.description.clone()),
        amount_minor: Set(row::minor(expense.amount)?),
        category: Set(expense.category.clone()),
        expense_date: Set(time::date_to_db(expense.date)),
        created_at: Set(time::to_db(expense.metadata.created_at)),
        updated_at: Set(time::to_db(expense.metadata.updated_at)),
        created_by: Set(expense.metadata.created_by.clone()),
    })
}

pub async fn insert<C: ConnectionTrait>(conn: &C, expense: &Expense) -> Result<ExpenseId, DbErr> {
    let model = to_active(expense)?.insert(conn).await?;
    Ok(ExpenseId(model.id))
}

pub async fn update<C: ConnectionTrait>(conn: &C, expense: &Expense) -> Result<(), DbErr> {
    let mut active = to_active(expense)?;
    active.id = Set(expense.id.value());
    active.created_at = NotSet;
    active.created_by = NotSet;
    active.update(conn).await?;
    Ok(())
}

pub async fn delete<C: ConnectionTrait>(conn: &C, id: ExpenseId) -> Result<bool, DbErr> {
    let result = Entity::delete_by_id(id.value()).exec(conn).await?;
    Ok(result.rows_affected > 0)
}

pub async fn find<C: ConnectionTrait>(conn: &C, id: ExpenseId) -> Result<Option<Expense>, DbErr> {
    Entity::find_by_id(id.value())
        .one(conn)
        .await?
        .map(Expense::try_from)
        .transpose()
}

/// Expenses with `from <= tarih <= to`, newest date first
pub async fn list<C: ConnectionTrait>(
    conn: &C,
    range: Option<(NaiveDate, NaiveDate)>,
    category: Option<&str>,
) -> Result<Vec<Expense>, DbErr> {
    let mut query = Entity::find();
    if let Some((from, to)) = range {
        query = query
            .filter(Column::ExpenseDate.gte(time::date_to_db(from)))
            .filter(Column::ExpenseDate.lte(time::date_to_db(to)));
    }
    if let Some(category) = category {
        query = query.filter(Column::Category.eq(category));
    }

    query
        .order_by_desc(Column::ExpenseDate)
        .order_by_desc(Column::Id)
        .all(conn)
        .await?
        .into_iter()
        .map(Expense::try_from)
        .collect()
}
