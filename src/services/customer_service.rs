//! Customer service - Profiles and the accounts behind them.

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use super::AuthService;
use crate::domain::{Customer, CustomerDraft};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::CustomerRepository;

/// Everything needed to open a customer account
#[derive(Debug, Clone)]
pub struct CustomerSignup {
    pub username: String,
    pub password: String,
    pub profile: CustomerDraft,
}

#[async_trait]
pub trait CustomerService: Send + Sync {
    /// Register a customer user account, then attach the profile to it
    async fn create_customer(&self, signup: CustomerSignup) -> AppResult<Customer>;

    async fn update_customer(&self, id: Uuid, draft: CustomerDraft) -> AppResult<Customer>;

    /// Remove the profile; the user account stays
    async fn delete_customer(&self, id: Uuid) -> AppResult<()>;

    async fn get_customer(&self, id: Uuid) -> AppResult<Customer>;

    async fn list_customers(&self) -> AppResult<Vec<Customer>>;

    async fn get_customer_by_user(&self, user_id: Uuid) -> AppResult<Customer>;
}

/// Default [`CustomerService`]; accounts are opened through [`AuthService`]
pub struct CustomerDirectory {
    customers: Arc<dyn CustomerRepository>,
    auth: Arc<dyn AuthService>,
}

impl CustomerDirectory {
    pub fn new(customers: Arc<dyn CustomerRepository>, auth: Arc<dyn AuthService>) -> Self {
        Self { customers, auth }
    }
}

fn check_draft(draft: &CustomerDraft) -> AppResult<()> {
    if draft.name.trim().is_empty() || draft.surname.trim().is_empty() {
        return Err(AppError::validation("Name and surname are required"));
    }
    Ok(())
}

#[async_trait]
impl CustomerService for CustomerDirectory {
    async fn create_customer(&self, signup: CustomerSignup) -> AppResult<Customer> {
        check_draft(&signup.profile)?;

        let user = self
            .auth
            .register(signup.username, signup.password, true)
            .await?;

        let customer = Customer::from_draft(Uuid::new_v4(), user.id, signup.profile);
        let created = self.customers.create(customer).await.inspect_err(|e| {
            tracing::warn!(
                user_id = %user.id,
                error = %e,
                "Customer account left without a profile"
            );
        })?;

        tracing::info!(customer_id = %created.id, user_id = %user.id, "Customer created");
        Ok(created)
    }

    async fn update_customer(&self, id: Uuid, draft: CustomerDraft) -> AppResult<Customer> {
        check_draft(&draft)?;
        self.customers.update(id, draft).await
    }

    async fn delete_customer(&self, id: Uuid) -> AppResult<()> {
        self.customers.delete(id).await
    }

    async fn get_customer(&self, id: Uuid) -> AppResult<Customer> {
        self.customers.find_by_id(id).await?.ok_or_not_found()
    }

    async fn list_customers(&self) -> AppResult<Vec<Customer>> {
        self.customers.list().await
    }

    async fn get_customer_by_user(&self, user_id: Uuid) -> AppResult<Customer> {
        self.customers
            .find_by_user_id(user_id)
            .await?
            .ok_or_not_found()
    }
}
