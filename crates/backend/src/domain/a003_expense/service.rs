use contracts::domain::a003_expense::aggregate::{
    CreateExpenseDto, Expense, ExpenseId, ExpenseListFilter, UpdateExpenseDto, DEFAULT_CATEGORY,
};
use contracts::domain::common::{AggregateRoot, EntityMetadata};
use sea_orm::DatabaseConnection;

use super::repository;
use crate::shared::activity_log::{self, ActivityEvent, Actor};
use crate::shared::error::{ServiceError, ServiceResult};
use crate::shared::format::format_money;
use crate::shared::time;
use crate::shared::validation;

fn not_found(id: ExpenseId) -> ServiceError {
    ServiceError::not_found("a003_expense", id)
}

fn category_or_default(value: Option<String>) -> String {
    validation::optional_text(value).unwrap_or_else(|| DEFAULT_CATEGORY.to_string())
}

fn audit(db: &DatabaseConnection, actor: &Actor, action: &str, expense: &Expense) {
    activity_log::record(
        db,
        ActivityEvent::new(actor, action, &Expense::full_name())
            .entity_id(expense.id)
            .details(format!(
                "{} {} {}",
                expense.category,
                format_money(expense.amount),
                expense.description
            )),
    );
}

/// Record an expense; the date defaults to today in the display offset
pub async fn create(
    db: &DatabaseConnection,
    dto: CreateExpenseDto,
    actor: &Actor,
) -> ServiceResult<Expense> {
    let description = validation::required_text(&dto.description, "aciklama")?;
    let amount = validation::positive_amount(dto.amount, "tutar")?;

    let mut expense = Expense {
        id: ExpenseId(0),
        description,
        amount,
        category: category_or_default(dto.category),
        date: dto
            .date
            .unwrap_or_else(|| time::today(time::display_offset())),
        metadata: EntityMetadata::stamped(time::now(), actor.user_id.clone()),
    };
    expense.id = repository::insert(db, &expense).await?;

    tracing::info!(
        "Recorded expense {} ({}) on {}",
        expense.code(),
        format_money(expense.amount),
        expense.date
    );
    audit(db, actor, "create", &expense);
    Ok(expense)
}

pub async fn update(
    db: &DatabaseConnection,
    id: ExpenseId,
    dto: UpdateExpenseDto,
    actor: &Actor,
) -> ServiceResult<Expense> {
    let mut expense = repository::find(db, id).await?.ok_or_else(|| not_found(id))?;

    if let Some(description) = dto.description.as_deref() {
        expense.description = validation::required_text(description, "aciklama")?;
    }
    if let Some(amount) = dto.amount {
        expense.amount = validation::positive_amount(amount, "tutar")?;
    }
    if dto.category.is_some() {
        expense.category = category_or_default(dto.category);
    }
    if let Some(date) = dto.date {
        expense.date = date;
    }
    expense.metadata.touch_at(time::now());
    repository::update(db, &expense).await?;

    audit(db, actor, "update", &expense);
    Ok(expense)
}

pub async fn delete(db: &DatabaseConnection, id: ExpenseId, actor: &Actor) -> ServiceResult<()> {
    let expense = repository::find(db, id).await?.ok_or_else(|| not_found(id))?;
    repository::delete(db, id).await?;
    audit(db, actor, "delete", &expense);
    Ok(())
}

pub async fn get(db: &DatabaseConnection, id: ExpenseId) -> ServiceResult<Expense> {
    repository::find(db, id).await?.ok_or_else(|| not_found(id))
}

pub async fn list(db: &DatabaseConnection, filter: &ExpenseListFilter) -> ServiceResult<Vec<Expense>> {
    let category = validation::optional_text(filter.category.clone());
    Ok(repository::list(db, filter.date.map(|d| (d, d)), category.as_deref()).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::data::db::test_connection;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn actor() -> Actor {
        Actor::new("u-1", "muhasebe", None)
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
    }

    fn dto(description: &str, amount: rust_decimal::Decimal, date: NaiveDate) -> CreateExpenseDto {
        CreateExpenseDto {
            description: description.to_string(),
            amount,
            category: None,
            date: Some(date),
        }
    }

    #[tokio::test]
    async fn create_applies_defaults() {
        let db = test_connection().await;
        let expense = create(&db, dto("Kira", dec!(15000), day(1)), &actor())
            .await
            .unwrap();
        assert_eq!(expense.category, DEFAULT_CATEGORY);
        assert_eq!(expense.amount.to_string(), "15000.00");

        let stored = get(&db, expense.id).await.unwrap();
        assert_eq!(stored.date, day(1));
        assert_eq!(stored.metadata, expense.metadata);

        let undated = create(
            &db,
            CreateExpenseDto {
                description: "Çay".into(),
                amount: dec!(45.5),
                category: Some("mutfak".into()),
                date: None,
            },
            &actor(),
        )
        .await
        .unwrap();
        assert_eq!(undated.date, time::today(time::display_offset()));
    }

    #[tokio::test]
    async fn amount_must_be_positive() {
        let db = test_connection().await;
        for amount in [dec!(0), dec!(-10), dec!(1.999)] {
            match create(&db, dto("Elektrik", amount, day(2)), &actor()).await {
                Err(ServiceError::ValidationFailed { field, .. }) => assert_eq!(field, "tutar"),
                other => panic!("unexpected {:?}", other),
            }
        }
    }

    #[tokio::test]
    async fn list_orders_by_date_and_filters() {
        let db = test_connection().await;
        let a = create(&db, dto("Kira", dec!(100), day(1)), &actor()).await.unwrap();
        let b = create(&db, dto("Su", dec!(20), day(3)), &actor()).await.unwrap();
        let mut fuel = dto("Yakıt", dec!(50), day(1));
        fuel.category = Some("arac".into());
        let c = create(&db, fuel, &actor()).await.unwrap();

        let all = list(&db, &ExpenseListFilter::default()).await.unwrap();
        assert_eq!(all.iter().map(|e| e.id).collect::<Vec<_>>(), vec![b.id, c.id, a.id]);

        let first_day = list(
            &db,
            &ExpenseListFilter {
                date: Some(day(1)),
                category: None,
            },
        )
        .await
        .unwrap();
        assert_eq!(first_day.len(), 2);

        let vehicle = list(
            &db,
            &ExpenseListFilter {
                date: None,
                category: Some("arac".into()),
            },
        )
        .await
        .unwrap();
        assert_eq!(vehicle.iter().map(|e| e.id).collect::<Vec<_>>(), vec![c.id]);
    }

    #[tokio::test]
    async fn update_and_delete() {
        let db = test_connection().await;
        let expense = create(&db, dto("Kira", dec!(100), day(1)), &actor()).await.unwrap();
        let updated = update(
            &db,
            expense.id,
            UpdateExpenseDto {
                amount: Some(dec!(120.25)),
                category: Some("  ".into()),
                ..Default::default()
            },
            &actor(),
        )
        .await
        .unwrap();
        assert_eq!(updated.amount, dec!(120.25));
        assert_eq!(updated.category, DEFAULT_CATEGORY);
        assert_eq!(updated.description, "Kira");
        assert_eq!(get(&db, expense.id).await.unwrap().amount, dec!(120.25));

        delete(&db, expense.id, &actor()).await.unwrap();
        assert!(matches!(
            delete(&db, expense.id, &actor()).await,
            Err(ServiceError::NotFound { .. })
        ));
        assert!(matches!(
            update(&db, expense.id, UpdateExpenseDto::default(), &actor()).await,
            Err(ServiceError::NotFound { .. })
        ));
    }
}
