// /commerce/services/commerce-service/src/repository/mod.rs

pub mod catalog;
pub mod cart;
pub mod order;
pub mod transaction;
pub mod wallet;
pub mod setting;
pub mod shipping;
#[cfg(test)]
pub mod memory;

use async_trait::async_trait;
use sqlx::{PgPool, Postgres};

use crate::utils::error::AppResult;

pub use catalog::CatalogStore;
pub use cart::CartStore;
pub use order::OrderStore;
pub use transaction::TransactionStore;
pub use wallet::WalletStore;
pub use setting::SettingStore;
pub use shipping::ShippingStore;

/// Entry point ke persistence: setiap operasi jalan di satu unit of work
#[async_trait]
pub trait Store: Send + Sync {
    async fn begin(&self) -> AppResult<Box<dyn UnitOfWork>>;

    /// Cek koneksi untuk health endpoint
    async fn ping(&self) -> AppResult<()>;
}

/// Satu database transaction. Drop tanpa commit = rollback.
#[async_trait]
pub trait UnitOfWork:
    CatalogStore
    + CartStore
    + OrderStore
    + TransactionStore
    + WalletStore
    + SettingStore
    + ShippingStore
    + Send
{
    async fn commit(self: Box<Self>) -> AppResult<()>;
}

/// Store PostgreSQL berbasis connection pool
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Store for PgStore {
    async fn begin(&self) -> AppResult<Box<dyn UnitOfWork>> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgUnitOfWork { tx }))
    }

    async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

/// Wrapper sqlx transaction, semua area store di-implement di atas ini
pub struct PgUnitOfWork {
    pub(crate) tx: sqlx::Transaction<'static, Postgres>,
}

#[async_trait]
impl UnitOfWork for PgUnitOfWork {
    async fn commit(self: Box<Self>) -> AppResult<()> {
        self.tx.commit().await?;
        Ok(())
    }
}
