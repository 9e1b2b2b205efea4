use sea_orm::DatabaseConnection;
use std::sync::Arc;

use crate::modules::addresses::infra::persistence::SeaOrmAddressRepository;
use crate::modules::addresses::repository::AddressRepository;
use crate::modules::customers::infra::persistence::SeaOrmCustomerRepository;
use crate::modules::customers::repository::CustomerRepository;
use crate::shared::infra::repository::SeaOrmRepositoryManager;
use crate::shared::repository::RepositoryManager;

pub fn init_repo_manager(db: DatabaseConnection) -> Arc<dyn RepositoryManager> {
    let db = Arc::new(db);
    let mut manager = SeaOrmRepositoryManager::new(db.clone());

    manager.register::<Arc<dyn CustomerRepository>>(Arc::new(SeaOrmCustomerRepository::new(
        db.clone(),
    )));
    manager.register::<Arc<dyn AddressRepository>>(Arc::new(SeaOrmAddressRepository::new(db)));

    Arc::new(manager) as Arc<dyn RepositoryManager>
}
