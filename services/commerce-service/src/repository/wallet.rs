// /commerce/services/commerce-service/src/repository/wallet.rs

use async_trait::async_trait;
use bigdecimal::BigDecimal;
use uuid::Uuid;

use super::PgUnitOfWork;
use crate::{
    models::Wallet,
    utils::error::AppResult,
};

#[async_trait]
pub trait WalletStore: Send {
    async fn get_wallet(&mut self, user_id: Uuid) -> AppResult<Option<Wallet>>;
    /// Tambah saldo, wallet dibuat kalau belum ada
    async fn credit_wallet(&mut self, user_id: Uuid, amount: &BigDecimal) -> AppResult<Wallet>;
    /// Kurangi saldo hanya kalau balance >= amount
    async fn debit_wallet(&mut self, user_id: Uuid, amount: &BigDecimal) -> AppResult<bool>;
}

#[async_trait]
impl WalletStore for PgUnitOfWork {
    async fn get_wallet(&mut self, user_id: Uuid) -> AppResult<Option<Wallet>> {
        let wallet = sqlx::query_as::<_, Wallet>("SELECT * FROM wallets WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(&mut *self.tx)
            .await?;
        Ok(wallet)
    }

    async fn credit_wallet(&mut self, user_id: Uuid, amount: &BigDecimal) -> AppResult<Wallet> {
        let wallet = sqlx::query_as::<_, Wallet>(
            r#"
            INSERT INTO wallets (user_id, balance)
            VALUES ($1, $2)
            ON CONFLICT (user_id)
            DO UPDATE SET balance = wallets.balance + EXCLUDED.balance, updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(amount)
        .fetch_one(&mut *self.tx)
        .await?;
        Ok(wallet)
    }

    async fn debit_wallet(&mut self, user_id: Uuid, amount: &BigDecimal) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE wallets
            SET balance = balance - $2, updated_at = NOW()
            WHERE user_id = $1 AND balance >= $2
            "#,
        )
        .bind(user_id)
        .bind(amount)
        .execute(&mut *self.tx)
        .await?;
        Ok(result.rows_affected() == 1)
    }
}
