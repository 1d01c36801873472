// /commerce/services/commerce-service/src/repository/transaction.rs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::PgUnitOfWork;
use crate::{
    models::*,
    utils::error::AppResult,
};

/// Repository untuk payment transactions
#[async_trait]
pub trait TransactionStore: Send {
    async fn insert_transaction(&mut self, transaction: &NewTransaction) -> AppResult<Transaction>;
    async fn get_transaction(&mut self, transaction_id: i64) -> AppResult<Option<Transaction>>;
    async fn lock_transaction(&mut self, transaction_id: i64) -> AppResult<Option<Transaction>>;
    async fn find_transaction_by_res_number(&mut self, res_number: &str) -> AppResult<Option<Transaction>>;
    async fn list_transactions(
        &mut self,
        user_id: Option<Uuid>,
        limit: i64,
        offset: i64,
    ) -> AppResult<(Vec<Transaction>, i64)>;
    async fn order_transactions(&mut self, order_id: i64) -> AppResult<Vec<Transaction>>;
    async fn update_transaction_details(
        &mut self,
        transaction_id: i64,
        payment_method_id: Option<i64>,
        description: Option<String>,
    ) -> AppResult<Transaction>;
    /// Simpan reference gateway waktu payment dimulai
    async fn mark_transaction_initiated(
        &mut self,
        transaction_id: i64,
        res_number: &str,
        portal_in: DateTime<Utc>,
    ) -> AppResult<Transaction>;
    async fn settle_transaction(
        &mut self,
        transaction_id: i64,
        settlement: &TransactionSettlement,
    ) -> AppResult<Transaction>;
    async fn delete_transaction(&mut self, transaction_id: i64) -> AppResult<()>;
}

#[async_trait]
impl TransactionStore for PgUnitOfWork {
    async fn insert_transaction(&mut self, transaction: &NewTransaction) -> AppResult<Transaction> {
        let row = sqlx::query_as::<_, Transaction>(
            r#"
            INSERT INTO transactions (
                order_id, user_id, payment_method_id, transaction_type,
                description, amount, status
            )
            VALUES ($1, $2, $3, $4, $5, $6, 'pending')
            RETURNING *
            "#,
        )
        .bind(transaction.order_id)
        .bind(transaction.user_id)
        .bind(transaction.payment_method_id)
        .bind(transaction.transaction_type.as_str())
        .bind(&transaction.description)
        .bind(&transaction.amount)
        .fetch_one(&mut *self.tx)
        .await?;
        Ok(row)
    }

    async fn get_transaction(&mut self, transaction_id: i64) -> AppResult<Option<Transaction>> {
        let row = sqlx::query_as::<_, Transaction>("SELECT * FROM transactions WHERE id = $1")
            .bind(transaction_id)
            .fetch_optional(&mut *self.tx)
            .await?;
        Ok(row)
    }

    async fn lock_transaction(&mut self, transaction_id: i64) -> AppResult<Option<Transaction>> {
        let row = sqlx::query_as::<_, Transaction>(
            "SELECT * FROM transactions WHERE id = $1 FOR UPDATE",
        )
        .bind(transaction_id)
        .fetch_optional(&mut *self.tx)
        .await?;
        Ok(row)
    }

    async fn find_transaction_by_res_number(&mut self, res_number: &str) -> AppResult<Option<Transaction>> {
        let row = sqlx::query_as::<_, Transaction>(
            "SELECT * FROM transactions WHERE res_number = $1",
        )
        .bind(res_number)
        .fetch_optional(&mut *self.tx)
        .await?;
        Ok(row)
    }

    async fn list_transactions(
        &mut self,
        user_id: Option<Uuid>,
        limit: i64,
        offset: i64,
    ) -> AppResult<(Vec<Transaction>, i64)> {
        let rows = sqlx::query_as::<_, Transaction>(
            r#"
            SELECT * FROM transactions
            WHERE ($1::uuid IS NULL OR user_id = $1)
            ORDER BY created_at DESC, id DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&mut *self.tx)
        .await?;

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM transactions WHERE ($1::uuid IS NULL OR user_id = $1)",
        )
        .bind(user_id)
        .fetch_one(&mut *self.tx)
        .await?;

        Ok((rows, total))
    }

    async fn order_transactions(&mut self, order_id: i64) -> AppResult<Vec<Transaction>> {
        let rows = sqlx::query_as::<_, Transaction>(
            "SELECT * FROM transactions WHERE order_id = $1 ORDER BY id",
        )
        .bind(order_id)
        .fetch_all(&mut *self.tx)
        .await?;
        Ok(rows)
    }

    async fn update_transaction_details(
        &mut self,
        transaction_id: i64,
        payment_method_id: Option<i64>,
        description: Option<String>,
    ) -> AppResult<Transaction> {
        let row = sqlx::query_as::<_, Transaction>(
            r#"
            UPDATE transactions
            SET payment_method_id = COALESCE($2, payment_method_id),
                description = COALESCE($3, description),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(transaction_id)
        .bind(payment_method_id)
        .bind(description)
        .fetch_one(&mut *self.tx)
        .await?;
        Ok(row)
    }

    async fn mark_transaction_initiated(
        &mut self,
        transaction_id: i64,
        res_number: &str,
        portal_in: DateTime<Utc>,
    ) -> AppResult<Transaction> {
        let row = sqlx::query_as::<_, Transaction>(
            r#"
            UPDATE transactions
            SET res_number = $2, portal_in = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(transaction_id)
        .bind(res_number)
        .bind(portal_in)
        .fetch_one(&mut *self.tx)
        .await?;
        Ok(row)
    }

    async fn settle_transaction(
        &mut self,
        transaction_id: i64,
        settlement: &TransactionSettlement,
    ) -> AppResult<Transaction> {
        let row = sqlx::query_as::<_, Transaction>(
            r#"
            UPDATE transactions
            SET status = $2,
                ref_id = $3,
                fee = $4,
                fee_type = $5,
                portal_out = $6,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(transaction_id)
        .bind(settlement.status.as_str())
        .bind(settlement.ref_id)
        .bind(settlement.fee)
        .bind(&settlement.fee_type)
        .bind(settlement.portal_out)
        .fetch_one(&mut *self.tx)
        .await?;
        Ok(row)
    }

    async fn delete_transaction(&mut self, transaction_id: i64) -> AppResult<()> {
        sqlx::query("DELETE FROM transactions WHERE id = $1")
            .bind(transaction_id)
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }
}
