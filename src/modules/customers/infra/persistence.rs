use sea_orm::*;

use crate::modules::addresses::entities::address;
use crate::modules::customers::entities::customer;
use crate::modules::customers::repository::{CustomerRepository, CustomerWithAddresses};
use crate::shared::error::{AppError, AppResult};
use crate::shared::infra::repository::{DbOrTxn, SeaOrmRepository};
use crate::{impl_sea_orm_repo, with_conn};

pub type SeaOrmCustomerRepository = SeaOrmRepository<customer::Entity>;

impl_sea_orm_repo!(SeaOrmCustomerRepository, CustomerRepository, {
    async fn find_all_with_addresses(&self) -> AppResult<Vec<CustomerWithAddresses>> {
        with_conn!(self, |c| {
            customer::Entity::find()
                .find_with_related(address::Entity)
                .order_by_asc(customer::Column::CustomerId)
                .order_by_asc(address::Column::AddressId)
                .all(c)
                .await
                .map_err(AppError::DbError)
        })
    }

    async fn find_by_id(&self, id: i32) -> AppResult<Option<customer::Model>> {
        with_conn!(self, |c| {
            customer::Entity::find_by_id(id)
                .one(c)
                .await
                .map_err(AppError::DbError)
        })
    }

    async fn find_with_addresses(&self, id: i32) -> AppResult<Option<CustomerWithAddresses>> {
        with_conn!(self, |c| Self::find_with_addresses_internal(c, id).await)
    }

    async fn find_by_email_or_phone(
        &self,
        email: Option<&str>,
        phone: Option<&str>,
        exclude_id: Option<i32>,
    ) -> AppResult<Vec<customer::Model>> {
        if email.is_none() && phone.is_none() {
            return Ok(Vec::new());
        }

        let mut matches = Condition::any();
        if let Some(email) = email {
            matches = matches.add(customer::Column::Email.eq(email));
        }
        if let Some(phone) = phone {
            matches = matches.add(customer::Column::Phone.eq(phone));
        }

        let mut query = customer::Entity::find().filter(matches);
        if let Some(id) = exclude_id {
            query = query.filter(customer::Column::CustomerId.ne(id));
        }

        with_conn!(self, |c| query.all(c).await.map_err(AppError::DbError))
    }

    async fn insert(&self, customer: customer::ActiveModel) -> AppResult<customer::Model> {
        with_conn!(self, |c| customer.insert(c).await.map_err(AppError::DbError))
    }

    async fn update(&self, customer: customer::ActiveModel) -> AppResult<customer::Model> {
        with_conn!(self, |c| customer.update(c).await.map_err(AppError::DbError))
    }

    async fn delete_with_addresses(&self, id: i32) -> AppResult<u64> {
        match &self.conn {
            DbOrTxn::Conn(c) => {
                let txn = c.as_ref().begin().await.map_err(AppError::DbError)?;
                let res = Self::delete_internal(&txn, id).await;
                if res.is_ok() {
                    txn.commit().await.map_err(AppError::DbError)?;
                } else if let Err(rollback_err) = txn.rollback().await {
                    tracing::error!("Rollback failed: {}", rollback_err);
                }
                res
            }
            DbOrTxn::Txn(mutex) => {
                let lock = mutex.lock().await;
                let txn = lock.as_ref().ok_or(AppError::Unexpected(
                    "Transaction already completed".to_string(),
                ))?;
                Self::delete_internal(txn, id).await
            }
        }
    }
});

impl SeaOrmRepository<customer::Entity> {
    async fn find_with_addresses_internal<C>(
        db: &C,
        id: i32,
    ) -> AppResult<Option<CustomerWithAddresses>>
    where
        C: ConnectionTrait,
    {
        let Some(found) = customer::Entity::find_by_id(id)
            .one(db)
            .await
            .map_err(AppError::DbError)?
        else {
            return Ok(None);
        };

        let addresses = found
            .find_related(address::Entity)
            .order_by_asc(address::Column::AddressId)
            .all(db)
            .await
            .map_err(AppError::DbError)?;

        Ok(Some((found, addresses)))
    }

    async fn delete_internal<C>(db: &C, id: i32) -> AppResult<u64>
    where
        C: ConnectionTrait,
    {
        let removed = address::Entity::delete_many()
            .filter(address::Column::CustomerId.eq(id))
            .exec(db)
            .await
            .map_err(AppError::DbError)?
            .rows_affected;

        let deleted = customer::Entity::delete_by_id(id)
            .exec(db)
            .await
            .map_err(AppError::DbError)?;

        if deleted.rows_affected == 0 {
            return Err(AppError::CustomerNotFound);
        }
        Ok(removed)
    }
}
