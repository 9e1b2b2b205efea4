use async_trait::async_trait;
use sea_orm::*;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex as AsyncMutex;

use crate::shared::error::{AppError, AppResult};
use crate::shared::repository::{AsAny, RepositoryManager, UnitOfWork};

/// Where a repository sends its statements: the pool, or a unit of work
/// it has been re-bound to.
#[derive(Clone)]
pub enum DbOrTxn {
    Conn(Arc<DatabaseConnection>),
    Txn(Arc<AsyncMutex<Option<DatabaseTransaction>>>),
}

#[derive(Clone)]
pub struct SeaOrmRepository<E>
where
    E: EntityTrait,
{
    pub conn: DbOrTxn,
    _marker: std::marker::PhantomData<E>,
}

impl<E> SeaOrmRepository<E>
where
    E: EntityTrait,
{
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        tracing::info!(entity = std::any::type_name::<E>(), "Creating repository");
        Self {
            conn: DbOrTxn::Conn(db),
            _marker: std::marker::PhantomData,
        }
    }

    pub fn with_transaction_internal(&self, uow: &dyn UnitOfWork) -> Option<Self> {
        let seaorm_uow = uow.as_any().downcast_ref::<SeaOrmUnitOfWork>()?;
        Some(Self {
            conn: DbOrTxn::Txn(seaorm_uow.txn.clone()),
            _marker: std::marker::PhantomData,
        })
    }
}

/// Runs `$body` against whichever connection the repository is bound to.
/// `$c` is a `&DatabaseConnection` or a `&DatabaseTransaction`.
#[macro_export]
macro_rules! with_conn {
    ($repo:expr, |$c:ident| $body:expr) => {
        match &$repo.conn {
            $crate::shared::infra::repository::DbOrTxn::Conn(db) => {
                let $c = db.as_ref();
                $body
            }
            $crate::shared::infra::repository::DbOrTxn::Txn(mutex) => {
                let lock = mutex.lock().await;
                let $c = lock.as_ref().ok_or_else(|| {
                    $crate::shared::error::AppError::Unexpected(
                        "Transaction already completed".to_string(),
                    )
                })?;
                $body
            }
        }
    };
}

/// Implements a `define_repo!` trait for a `SeaOrmRepository` alias and
/// supplies its `with_transaction`.
#[macro_export]
macro_rules! impl_sea_orm_repo {
    ($repo_type:ty, $trait_path:path, { $($methods:tt)* }) => {
        #[async_trait::async_trait]
        impl $trait_path for $repo_type {
            $($methods)*

            fn with_transaction(
                &self,
                uow: &dyn $crate::shared::repository::UnitOfWork,
            ) -> Option<Box<dyn $trait_path>> {
                self.with_transaction_internal(uow)
                    .map(|r| Box::new(r) as Box<dyn $trait_path>)
            }
        }
    };
}

pub struct SeaOrmRepositoryManager {
    db: Arc<DatabaseConnection>,
    repos: HashMap<TypeId, Arc<dyn Any + Send + Sync>>,
}

impl SeaOrmRepositoryManager {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        tracing::info!("Creating repository manager");
        Self {
            db,
            repos: HashMap::new(),
        }
    }

    /// Registers under `T`; look it up again with the same `T`, typically
    /// `Arc<dyn SomeRepository>`.
    pub fn register<T: 'static + Send + Sync>(&mut self, repo: T) {
        self.repos.insert(TypeId::of::<T>(), Arc::new(repo));
    }
}

#[async_trait]
impl RepositoryManager for SeaOrmRepositoryManager {
    fn get_repository(&self, type_id: TypeId) -> Option<&(dyn Any + Send + Sync)> {
        self.repos.get(&type_id).map(|boxed| boxed.as_ref())
    }

    async fn begin(&self) -> AppResult<Box<dyn UnitOfWork>> {
        let txn = self.db.begin().await.map_err(AppError::DbError)?;
        Ok(Box::new(SeaOrmUnitOfWork {
            txn: Arc::new(AsyncMutex::new(Some(txn))),
        }))
    }
}

impl AsAny for SeaOrmUnitOfWork {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

pub struct SeaOrmUnitOfWork {
    txn: Arc<AsyncMutex<Option<DatabaseTransaction>>>,
}

#[async_trait]
impl UnitOfWork for SeaOrmUnitOfWork {
    async fn commit(self: Box<Self>) -> AppResult<()> {
        let mut lock = self.txn.lock().await;
        if let Some(txn) = lock.take() {
            txn.commit().await.map_err(AppError::DbError)
        } else {
            Ok(())
        }
    }

    async fn rollback(self: Box<Self>) -> AppResult<()> {
        let mut lock = self.txn.lock().await;
        if let Some(txn) = lock.take() {
            txn.rollback().await.map_err(AppError::DbError)
        } else {
            Ok(())
        }
    }
}
