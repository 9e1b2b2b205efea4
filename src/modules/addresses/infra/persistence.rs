use sea_orm::*;

use crate::modules::addresses::entities::address;
use crate::modules::addresses::repository::AddressRepository;
use crate::shared::error::{AppError, AppResult};
use crate::shared::infra::repository::SeaOrmRepository;
use crate::{impl_sea_orm_repo, with_conn};

pub type SeaOrmAddressRepository = SeaOrmRepository<address::Entity>;

impl_sea_orm_repo!(SeaOrmAddressRepository, AddressRepository, {
    async fn find_all(&self) -> AppResult<Vec<address::Model>> {
        with_conn!(self, |c| {
            address::Entity::find()
                .order_by_asc(address::Column::AddressId)
                .all(c)
                .await
                .map_err(AppError::DbError)
        })
    }

    async fn find_by_id(&self, id: i32) -> AppResult<Option<address::Model>> {
        with_conn!(self, |c| {
            address::Entity::find_by_id(id)
                .one(c)
                .await
                .map_err(AppError::DbError)
        })
    }

    async fn find_by_customer(&self, customer_id: i32) -> AppResult<Vec<address::Model>> {
        with_conn!(self, |c| {
            address::Entity::find()
                .filter(address::Column::CustomerId.eq(customer_id))
                .order_by_asc(address::Column::AddressId)
                .all(c)
                .await
                .map_err(AppError::DbError)
        })
    }

    async fn insert(&self, address: address::ActiveModel) -> AppResult<address::Model> {
        with_conn!(self, |c| address.insert(c).await.map_err(AppError::DbError))
    }

    async fn update(&self, address: address::ActiveModel) -> AppResult<address::Model> {
        with_conn!(self, |c| address.update(c).await.map_err(AppError::DbError))
    }

    async fn delete(&self, id: i32) -> AppResult<u64> {
        with_conn!(self, |c| {
            address::Entity::delete_by_id(id)
                .exec(c)
                .await
                .map(|res| res.rows_affected)
                .map_err(AppError::DbError)
        })
    }
});
