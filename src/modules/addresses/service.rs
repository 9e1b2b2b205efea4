use chrono::Utc;
use sea_orm::{ActiveModelTrait, IntoActiveModel, Set};
use serde_json::{Map, Value};
use std::sync::Arc;

use crate::modules::addresses::dtos::{customer_reference, AddressPayload, AddressResponse};
use crate::modules::addresses::entities::address::{self, DEFAULT_COUNTRY};
use crate::modules::addresses::repository::AddressRepository;
use crate::modules::customers::repository::CustomerRepository;
use crate::shared::error::{AppError, AppResult};
use crate::shared::repository::RepositoryManager;
use crate::shared::validation::Mode;

fn address_not_found() -> AppError {
    AppError::NotFound("Address not found.".to_string())
}

pub struct AddressService;

impl AddressService {
    pub async fn list(repos: &dyn RepositoryManager) -> AppResult<Vec<AddressResponse>> {
        let address_repo = repos.require::<Arc<dyn AddressRepository>>()?;
        let addresses = address_repo.find_all().await?;
        Ok(addresses.into_iter().map(AddressResponse::from).collect())
    }

    pub async fn get(repos: &dyn RepositoryManager, id: i32) -> AppResult<AddressResponse> {
        let address_repo = repos.require::<Arc<dyn AddressRepository>>()?;
        let address = address_repo
            .find_by_id(id)
            .await?
            .ok_or_else(address_not_found)?;
        Ok(address.into())
    }

    /// The owner is resolved before the address fields are validated, so an
    /// unknown customer is reported even when other fields are bad.
    pub async fn create(
        repos: &dyn RepositoryManager,
        data: Map<String, Value>,
    ) -> AppResult<AddressResponse> {
        let customer_repo = repos.require::<Arc<dyn CustomerRepository>>()?;
        let address_repo = repos.require::<Arc<dyn AddressRepository>>()?;

        let customer_id = customer_reference(&data).map_err(AppError::InvalidData)?;
        customer_repo
            .find_by_id(customer_id)
            .await?
            .ok_or(AppError::CustomerNotFound)?;

        let payload = AddressPayload::parse(&data, Mode::Full).map_err(AppError::InvalidData)?;

        let mut active = address::ActiveModel {
            customer_id: Set(customer_id),
            country: Set(DEFAULT_COUNTRY.to_string()),
            created_at: Set(Utc::now()),
            ..Default::default()
        };
        payload.apply(&mut active);

        let created = address_repo.insert(active).await?;
        tracing::info!(
            address_id = created.address_id,
            customer_id,
            "Address created"
        );
        Ok(created.into())
    }

    /// The owning customer is fixed at creation; a `customer_id` in the body
    /// is ignored.
    pub async fn update(
        repos: &dyn RepositoryManager,
        id: i32,
        data: Map<String, Value>,
        mode: Mode,
    ) -> AppResult<AddressResponse> {
        let address_repo = repos.require::<Arc<dyn AddressRepository>>()?;
        let existing = address_repo
            .find_by_id(id)
            .await?
            .ok_or_else(address_not_found)?;

        let payload = AddressPayload::parse(&data, mode).map_err(AppError::InvalidData)?;

        let mut active = existing.clone().into_active_model();
        payload.apply(&mut active);

        let updated = if active.is_changed() {
            address_repo.update(active).await?
        } else {
            existing
        };

        tracing::info!(address_id = id, ?mode, "Address updated");
        Ok(updated.into())
    }

    pub async fn delete(repos: &dyn RepositoryManager, id: i32) -> AppResult<()> {
        let address_repo = repos.require::<Arc<dyn AddressRepository>>()?;
        if address_repo.delete(id).await? == 0 {
            return Err(address_not_found());
        }

        tracing::info!(address_id = id, "Address deleted");
        Ok(())
    }
}
