//! Customer repository.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set, SqlErr,
};
use uuid::Uuid;

use super::entities::customer::{self, ActiveModel, Entity as CustomerEntity};
use crate::domain::{Customer, CustomerDraft};
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait CustomerRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Customer>>;

    /// The profile owned by the account `user_id`
    async fn find_by_user_id(&self, user_id: Uuid) -> AppResult<Option<Customer>>;

    /// All customers ordered by surname, then name
    async fn list(&self) -> AppResult<Vec<Customer>>;

    async fn create(&self, customer: Customer) -> AppResult<Customer>;

    /// Replace the profile fields and mark the customer active again
    async fn update(&self, id: Uuid, draft: CustomerDraft) -> AppResult<Customer>;

    async fn delete(&self, id: Uuid) -> AppResult<()>;
}

/// SeaORM-backed [`CustomerRepository`]
pub struct CustomerStore {
    db: DatabaseConnection,
}

impl CustomerStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

/// One profile per account.
fn map_write_error(err: DbErr) -> AppError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => AppError::conflict("Customer"),
        _ => AppError::from(err),
    }
}

#[async_trait]
impl CustomerRepository for CustomerStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Customer>> {
        let result = CustomerEntity::find_by_id(id).one(&self.db).await?;
        Ok(result.map(Customer::from))
    }

    async fn find_by_user_id(&self, user_id: Uuid) -> AppResult<Option<Customer>> {
        let result = CustomerEntity::find()
            .filter(customer::Column::UserId.eq(user_id))
            .one(&self.db)
            .await?;

        Ok(result.map(Customer::from))
    }

    async fn list(&self) -> AppResult<Vec<Customer>> {
        let models = CustomerEntity::find()
            .order_by_asc(customer::Column::Surname)
            .order_by_asc(customer::Column::Name)
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(Customer::from).collect())
    }

    async fn create(&self, customer: Customer) -> AppResult<Customer> {
        let active_model = ActiveModel {
            id: Set(customer.id),
            user_id: Set(customer.user_id),
            name: Set(customer.name),
            surname: Set(customer.surname),
            phone_number: Set(customer.phone_number),
            email: Set(customer.email),
            is_active: Set(customer.is_active),
        };

        let model = active_model.insert(&self.db).await.map_err(map_write_error)?;
        Ok(Customer::from(model))
    }

    async fn update(&self, id: Uuid, draft: CustomerDraft) -> AppResult<Customer> {
        let existing = CustomerEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)?;

        let mut active: ActiveModel = existing.into();
        active.name = Set(draft.name);
        active.surname = Set(draft.surname);
        active.phone_number = Set(draft.phone_number);
        active.email = Set(draft.email);
        active.is_active = Set(true);

        let model = active.update(&self.db).await?;
        Ok(Customer::from(model))
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = CustomerEntity::delete_by_id(id).exec(&self.db).await?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound);
        }

        Ok(())
    }
}
