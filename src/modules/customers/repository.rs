use super::entities::customer;
use crate::modules::addresses::entities::address;
use crate::shared::error::AppResult;

pub type CustomerWithAddresses = (customer::Model, Vec<address::Model>);

crate::define_repo!(CustomerRepository, {
    async fn find_all_with_addresses(&self) -> AppResult<Vec<CustomerWithAddresses>>;

    async fn find_by_id(&self, id: i32) -> AppResult<Option<customer::Model>>;

    async fn find_with_addresses(&self, id: i32) -> AppResult<Option<CustomerWithAddresses>>;

    /// Customers already holding `email` or `phone`, other than `exclude_id`.
    async fn find_by_email_or_phone(
        &self,
        email: Option<&str>,
        phone: Option<&str>,
        exclude_id: Option<i32>,
    ) -> AppResult<Vec<customer::Model>>;

    async fn insert(&self, customer: customer::ActiveModel) -> AppResult<customer::Model>;

    async fn update(&self, customer: customer::ActiveModel) -> AppResult<customer::Model>;

    /// Deletes the customer's addresses, then the customer, atomically.
    /// Returns how many addresses were removed.
    async fn delete_with_addresses(&self, id: i32) -> AppResult<u64>;
});
