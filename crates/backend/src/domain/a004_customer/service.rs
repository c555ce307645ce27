use contracts::domain::a004_customer::aggregate::{
    CreateCustomerDto, Customer, CustomerId, CustomerListFilter, UpdateCustomerDto,
};
use contracts::domain::common::{AggregateRoot, EntityMetadata};
use sea_orm::DatabaseConnection;

use super::repository;
use crate::shared::activity_log::{self, ActivityEvent, Actor};
use crate::shared::error::{ServiceError, ServiceResult};
use crate::shared::time;
use crate::shared::validation::{self, merge_text};

fn not_found(id: CustomerId) -> ServiceError {
    ServiceError::not_found("a004_customer", id)
}

fn audit(db: &DatabaseConnection, actor: &Actor, action: &str, customer: &Customer) {
    activity_log::record(
        db,
        ActivityEvent::new(actor, action, &Customer::full_name())
            .entity_id(customer.id)
            .details(customer.full_name.clone()),
    );
}

pub async fn create(
    db: &DatabaseConnection,
    dto: CreateCustomerDto,
    actor: &Actor,
) -> ServiceResult<Customer> {
    let mut customer = Customer {
        id: CustomerId(0),
        full_name: validation::required_text(&dto.full_name, "ad_soyad")?,
        phone: validation::optional_text(dto.phone),
        email: validation::optional_text(dto.email),
        address: validation::optional_text(dto.address),
        notes: validation::optional_text(dto.notes),
        metadata: EntityMetadata::stamped(time::now(), actor.user_id.clone()),
    };
    customer.id = repository::insert(db, &customer).await?;

    tracing::info!("Created customer {} '{}'", customer.code(), customer.full_name);
    audit(db, actor, "create", &customer);
    Ok(customer)
}

pub async fn update(
    db: &DatabaseConnection,
    id: CustomerId,
    dto: UpdateCustomerDto,
    actor: &Actor,
) -> ServiceResult<Customer> {
    let mut customer = repository::find(db, id).await?.ok_or_else(|| not_found(id))?;

    if let Some(name) = dto.full_name.as_deref() {
        customer.full_name = validation::required_text(name, "ad_soyad")?;
    }
    merge_text(&mut customer.phone, dto.phone);
    merge_text(&mut customer.email, dto.email);
    merge_text(&mut customer.address, dto.address);
    merge_text(&mut customer.notes, dto.notes);
    customer.metadata.touch_at(time::now());
    repository::update(db, &customer).await?;

    audit(db, actor, "update", &customer);
    Ok(customer)
}

pub async fn delete(db: &DatabaseConnection, id: CustomerId, actor: &Actor) -> ServiceResult<()> {
    let customer = repository::find(db, id).await?.ok_or_else(|| not_found(id))?;
    repository::delete(db, id).await?;
    audit(db, actor, "delete", &customer);
    Ok(())
}

pub async fn get(db: &DatabaseConnection, id: CustomerId) -> ServiceResult<Customer> {
    repository::find(db, id).await?.ok_or_else(|| not_found(id))
}

pub async fn list(db: &DatabaseConnection, filter: &CustomerListFilter) -> ServiceResult<Vec<Customer>> {
    let search = validation::optional_text(filter.search.clone());
    Ok(repository::list(db, search.as_deref()).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::data::db::test_connection;

    fn actor() -> Actor {
        Actor::new("u-1", "admin", None)
    }

    fn dto(name: &str, phone: Option<&str>) -> CreateCustomerDto {
        CreateCustomerDto {
            full_name: name.to_string(),
            phone: phone.map(str::to_string),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn crud_round() {
        let db = test_connection().await;
        let customer = create(&db, dto(" Ayşe Kaya ", Some("0532 111 22 33")), &actor())
            .await
            .unwrap();
        assert_eq!(customer.full_name, "Ayşe Kaya");

        let updated = update(
            &db,
            customer.id,
            UpdateCustomerDto {
                email: Some("ayse@example.com".into()),
                phone: Some(String::new()),
                ..Default::default()
            },
            &actor(),
        )
        .await
        .unwrap();
        assert_eq!(updated.email.as_deref(), Some("ayse@example.com"));
        assert_eq!(updated.phone, None);
        assert_eq!(get(&db, customer.id).await.unwrap().email, updated.email);

        delete(&db, customer.id, &actor()).await.unwrap();
        assert!(matches!(
            get(&db, customer.id).await,
            Err(ServiceError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn name_is_required() {
        let db = test_connection().await;
        match create(&db, dto("", None), &actor()).await {
            Err(ServiceError::ValidationFailed { field, .. }) => assert_eq!(field, "ad_soyad"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[tokio::test]
    async fn search_matches_name_or_phone() {
        let db = test_connection().await;
        let ali = create(&db, dto("Ali Demir", Some("0555 000 11 22")), &actor()).await.unwrap();
        let zeynep = create(&db, dto("Zeynep Ak", Some("0533 999 88 77")), &actor()).await.unwrap();

        let by_name = list(&db, &CustomerListFilter { search: Some("Demir".into()) })
            .await
            .unwrap();
        assert_eq!(by_name.iter().map(|c| c.id).collect::<Vec<_>>(), vec![ali.id]);

        let by_phone = list(&db, &CustomerListFilter { search: Some("999".into()) })
            .await
            .unwrap();
        assert_eq!(by_phone.iter().map(|c| c.id).collect::<Vec<_>>(), vec![zeynep.id]);

        let all = list(&db, &CustomerListFilter::default()).await.unwrap();
        assert_eq!(all.iter().map(|c| c.id).collect::<Vec<_>>(), vec![zeynep.id, ali.id]);
        assert_eq!(repository::count(&db).await.unwrap(), 2);
    }
}
