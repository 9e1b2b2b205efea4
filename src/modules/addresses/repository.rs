use super::entities::address;
use crate::shared::error::AppResult;

crate::define_repo!(AddressRepository, {
    async fn find_all(&self) -> AppResult<Vec<address::Model>>;

    async fn find_by_id(&self, id: i32) -> AppResult<Option<address::Model>>;

    async fn find_by_customer(&self, customer_id: i32) -> AppResult<Vec<address::Model>>;

    async fn insert(&self, address: address::ActiveModel) -> AppResult<address::Model>;

    async fn update(&self, address: address::ActiveModel) -> AppResult<address::Model>;

    /// Returns the number of rows removed, zero when the id is unknown.
    async fn delete(&self, id: i32) -> AppResult<u64>;
});
