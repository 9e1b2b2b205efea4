use chrono::Utc;
use sea_orm::{ActiveModelTrait, IntoActiveModel, Set, SqlErr};
use serde_json::{Map, Value};
use std::sync::Arc;

use crate::modules::addresses::entities::address::{self, DEFAULT_COUNTRY};
use crate::modules::addresses::repository::AddressRepository;
use crate::modules::customers::dtos::{
    CustomerPayload, CustomerResponse, CustomerWithAddressesPayload,
};
use crate::modules::customers::entities::customer;
use crate::modules::customers::repository::CustomerRepository;
use crate::shared::error::{AppError, AppResult};
use crate::shared::repository::{RepositoryManager, UnitOfWork};
use crate::shared::validation::{FieldErrors, Mode};

pub struct CustomerService;

impl CustomerService {
    pub async fn list(repos: &dyn RepositoryManager) -> AppResult<Vec<CustomerResponse>> {
        let customer_repo = repos.require::<Arc<dyn CustomerRepository>>()?;
        let customers = customer_repo.find_all_with_addresses().await?;

        Ok(customers
            .into_iter()
            .map(|(customer, addresses)| CustomerResponse::new(customer, addresses))
            .collect())
    }

    pub async fn get(repos: &dyn RepositoryManager, id: i32) -> AppResult<CustomerResponse> {
        let customer_repo = repos.require::<Arc<dyn CustomerRepository>>()?;
        let (customer, addresses) = customer_repo
            .find_with_addresses(id)
            .await?
            .ok_or(AppError::CustomerNotFound)?;

        Ok(CustomerResponse::new(customer, addresses))
    }

    /// Creates a bare customer. An `addresses` key in the body is ignored;
    /// the composite create is the path that persists addresses.
    pub async fn create(
        repos: &dyn RepositoryManager,
        data: Map<String, Value>,
    ) -> AppResult<CustomerResponse> {
        let customer_repo = repos.require::<Arc<dyn CustomerRepository>>()?;
        let payload = CustomerPayload::parse(&data, Mode::Full).map_err(AppError::InvalidData)?;

        let duplicates = Self::find_duplicates(customer_repo.as_ref(), &payload, None).await?;
        if !duplicates.is_empty() {
            return Err(conflict(duplicates));
        }

        let mut active = customer::ActiveModel {
            created_at: Set(Utc::now()),
            ..Default::default()
        };
        payload.apply(&mut active);

        let created = customer_repo
            .insert(active)
            .await
            .map_err(into_write_conflict)?;

        tracing::info!(customer_id = created.customer_id, "Customer created");
        Ok(CustomerResponse::new(created, Vec::new()))
    }

    /// Full (`Mode::Full`) or partial (`Mode::Partial`) update. Fields not in
    /// the payload keep their stored values.
    pub async fn update(
        repos: &dyn RepositoryManager,
        id: i32,
        data: Map<String, Value>,
        mode: Mode,
    ) -> AppResult<CustomerResponse> {
        let customer_repo = repos.require::<Arc<dyn CustomerRepository>>()?;
        let address_repo = repos.require::<Arc<dyn AddressRepository>>()?;

        let existing = customer_repo
            .find_by_id(id)
            .await?
            .ok_or(AppError::CustomerNotFound)?;

        let payload = CustomerPayload::parse(&data, mode).map_err(AppError::InvalidData)?;

        let duplicates = Self::find_duplicates(customer_repo.as_ref(), &payload, Some(id)).await?;
        if !duplicates.is_empty() {
            return Err(conflict(duplicates));
        }

        let mut active = existing.clone().into_active_model();
        payload.apply(&mut active);

        let updated = if active.is_changed() {
            customer_repo
                .update(active)
                .await
                .map_err(into_write_conflict)?
        } else {
            existing
        };

        let addresses = address_repo.find_by_customer(id).await?;
        tracing::info!(customer_id = id, ?mode, "Customer updated");
        Ok(CustomerResponse::new(updated, addresses))
    }

    pub async fn delete(repos: &dyn RepositoryManager, id: i32) -> AppResult<()> {
        let customer_repo = repos.require::<Arc<dyn CustomerRepository>>()?;
        let removed = customer_repo.delete_with_addresses(id).await?;

        tracing::info!(
            customer_id = id,
            addresses_removed = removed,
            "Customer deleted"
        );
        Ok(())
    }

    /// Persists a customer and all of its addresses in one transaction.
    /// Any failure after the transaction opens rolls everything back and is
    /// reported with its detail.
    pub async fn create_with_addresses(
        repos: &dyn RepositoryManager,
        data: Map<String, Value>,
    ) -> AppResult<CustomerResponse> {
        let customer_repo = repos.require::<Arc<dyn CustomerRepository>>()?;
        let payload = CustomerWithAddressesPayload::parse(&data).map_err(AppError::InvalidData)?;

        let duplicates =
            Self::find_duplicates(customer_repo.as_ref(), &payload.customer, None).await?;
        if !duplicates.is_empty() {
            return Err(AppError::InvalidData(duplicates));
        }

        let uow = repos.begin().await?;
        let result = Self::insert_aggregate(repos, uow.as_ref(), payload).await;
        match result {
            Ok(created) => {
                uow.commit()
                    .await
                    .map_err(|e| AppError::InternalServerError(e.to_string()))?;
                tracing::info!(
                    customer_id = created.customer_id,
                    addresses = created.addresses.len(),
                    "Customer created with addresses"
                );
                Ok(created)
            }
            Err(err) => {
                if let Err(rollback_err) = uow.rollback().await {
                    tracing::error!("Rollback failed: {}", rollback_err);
                }
                Err(AppError::InternalServerError(err.to_string()))
            }
        }
    }

    async fn insert_aggregate(
        repos: &dyn RepositoryManager,
        uow: &dyn UnitOfWork,
        payload: CustomerWithAddressesPayload,
    ) -> AppResult<CustomerResponse> {
        let customer_repo = repos
            .require::<Arc<dyn CustomerRepository>>()?
            .with_transaction(uow)
            .ok_or_else(|| {
                AppError::Unexpected("CustomerRepository cannot join transaction".to_string())
            })?;
        let address_repo = repos
            .require::<Arc<dyn AddressRepository>>()?
            .with_transaction(uow)
            .ok_or_else(|| {
                AppError::Unexpected("AddressRepository cannot join transaction".to_string())
            })?;

        let now = Utc::now();
        let mut active = customer::ActiveModel {
            created_at: Set(now),
            ..Default::default()
        };
        payload.customer.apply(&mut active);
        let created = customer_repo.insert(active).await?;

        let mut addresses = Vec::with_capacity(payload.addresses.len());
        for fields in payload.addresses {
            let mut active = address::ActiveModel {
                customer_id: Set(created.customer_id),
                country: Set(DEFAULT_COUNTRY.to_string()),
                created_at: Set(now),
                ..Default::default()
            };
            fields.apply(&mut active);
            addresses.push(address_repo.insert(active).await?);
        }

        Ok(CustomerResponse::new(created, addresses))
    }

    /// Checks the unique `email` and `phone` columns ahead of the write so the
    /// caller learns which field collided.
    async fn find_duplicates(
        customer_repo: &dyn CustomerRepository,
        payload: &CustomerPayload,
        exclude_id: Option<i32>,
    ) -> AppResult<FieldErrors> {
        let email = payload.email.as_deref();
        let phone = payload.phone.as_deref();
        let existing = customer_repo
            .find_by_email_or_phone(email, phone, exclude_id)
            .await?;

        let mut errors = FieldErrors::default();
        for other in existing {
            if email == Some(other.email.as_str()) {
                errors.add("email", "Customer with this email already exists.");
            }
            if phone == Some(other.phone.as_str()) {
                errors.add("phone", "Customer with this phone already exists.");
            }
        }
        Ok(errors)
    }
}

fn conflict(duplicates: FieldErrors) -> AppError {
    AppError::Conflict(duplicates.messages().join(" "))
}

/// Write failures on the customer table are persistence-state conflicts.
/// A unique violation here means a concurrent writer won the race.
fn into_write_conflict(err: AppError) -> AppError {
    match err {
        AppError::DbError(db_err) => {
            tracing::warn!("Customer write rejected by store: {}", db_err);
            match db_err.sql_err() {
                Some(SqlErr::UniqueConstraintViolation(_)) => AppError::Conflict(
                    "Customer with this email or phone already exists.".to_string(),
                ),
                _ => AppError::Conflict(
                    "Conflict occurred with the current state of the resource.".to_string(),
                ),
            }
        }
        other => other,
    }
}
