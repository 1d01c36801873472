// /commerce/services/commerce-service/src/repository/order.rs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::PgUnitOfWork;
use crate::{
    models::*,
    utils::error::AppResult,
};

/// Repository untuk order dan order items
#[async_trait]
pub trait OrderStore: Send {
    /// PENDING order milik customer, dengan row lock
    async fn lock_pending_order(&mut self, customer_id: Uuid) -> AppResult<Option<Order>>;
    async fn insert_order(&mut self, draft: &OrderDraft) -> AppResult<Order>;
    async fn update_order_totals(&mut self, order_id: i64, draft: &OrderDraft) -> AppResult<Order>;
    async fn get_order(&mut self, order_id: i64) -> AppResult<Option<Order>>;
    async fn lock_order(&mut self, order_id: i64) -> AppResult<Option<Order>>;
    async fn list_orders(
        &mut self,
        filter: &OrderFilter,
        limit: i64,
        offset: i64,
    ) -> AppResult<(Vec<OrderSummary>, i64)>;
    async fn set_order_status(&mut self, order_id: i64, status: OrderStatus) -> AppResult<Order>;
    async fn delete_order(&mut self, order_id: i64) -> AppResult<()>;
    /// Id PENDING orders yang dibuat sebelum cutoff
    async fn stale_pending_order_ids(&mut self, cutoff: DateTime<Utc>) -> AppResult<Vec<i64>>;

    async fn order_items(&mut self, order_id: i64) -> AppResult<Vec<OrderItem>>;
    async fn insert_order_item(&mut self, item: &NewOrderItem) -> AppResult<OrderItem>;
    async fn delete_order_items(&mut self, order_id: i64) -> AppResult<()>;
}

#[async_trait]
impl OrderStore for PgUnitOfWork {
    async fn lock_pending_order(&mut self, customer_id: Uuid) -> AppResult<Option<Order>> {
        let order = sqlx::query_as::<_, Order>(
            r#"
            SELECT * FROM orders
            WHERE customer_id = $1 AND status = 'pending'
            FOR UPDATE
            "#,
        )
        .bind(customer_id)
        .fetch_optional(&mut *self.tx)
        .await?;
        Ok(order)
    }

    async fn insert_order(&mut self, draft: &OrderDraft) -> AppResult<Order> {
        let order = sqlx::query_as::<_, Order>(
            r#"
            INSERT INTO orders (
                customer_id, address_id, shipping_id, payment_method_id,
                shipping_cost, tax_amount, order_total, final_price, status
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, 'pending')
            RETURNING *
            "#,
        )
        .bind(draft.customer_id)
        .bind(draft.address_id)
        .bind(draft.shipping_id)
        .bind(draft.payment_method_id)
        .bind(&draft.totals.shipping_cost)
        .bind(&draft.totals.tax_amount)
        .bind(&draft.totals.order_total)
        .bind(&draft.totals.final_price)
        .fetch_one(&mut *self.tx)
        .await?;
        Ok(order)
    }

    async fn update_order_totals(&mut self, order_id: i64, draft: &OrderDraft) -> AppResult<Order> {
        let order = sqlx::query_as::<_, Order>(
            r#"
            UPDATE orders
            SET address_id = $2,
                shipping_id = $3,
                payment_method_id = $4,
                shipping_cost = $5,
                tax_amount = $6,
                order_total = $7,
                final_price = $8,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(order_id)
        .bind(draft.address_id)
        .bind(draft.shipping_id)
        .bind(draft.payment_method_id)
        .bind(&draft.totals.shipping_cost)
        .bind(&draft.totals.tax_amount)
        .bind(&draft.totals.order_total)
        .bind(&draft.totals.final_price)
        .fetch_one(&mut *self.tx)
        .await?;
        Ok(order)
    }

    async fn get_order(&mut self, order_id: i64) -> AppResult<Option<Order>> {
        let order = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = $1")
            .bind(order_id)
            .fetch_optional(&mut *self.tx)
            .await?;
        Ok(order)
    }

    async fn lock_order(&mut self, order_id: i64) -> AppResult<Option<Order>> {
        let order = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = $1 FOR UPDATE")
            .bind(order_id)
            .fetch_optional(&mut *self.tx)
            .await?;
        Ok(order)
    }

    async fn list_orders(
        &mut self,
        filter: &OrderFilter,
        limit: i64,
        offset: i64,
    ) -> AppResult<(Vec<OrderSummary>, i64)> {
        let status = filter.status.map(|s| s.as_str());

        let rows = sqlx::query_as::<_, OrderSummary>(
            r#"
            SELECT o.*,
                   (SELECT COUNT(*) FROM order_items oi WHERE oi.order_id = o.id) AS items_count
            FROM orders o
            WHERE ($1::uuid IS NULL OR o.customer_id = $1)
              AND ($2::text IS NULL OR o.status = $2)
            ORDER BY o.created_at DESC, o.id DESC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(filter.customer_id)
        .bind(status)
        .bind(limit)
        .bind(offset)
        .fetch_all(&mut *self.tx)
        .await?;

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM orders
            WHERE ($1::uuid IS NULL OR customer_id = $1)
              AND ($2::text IS NULL OR status = $2)
            "#,
        )
        .bind(filter.customer_id)
        .bind(status)
        .fetch_one(&mut *self.tx)
        .await?;

        Ok((rows, total))
    }

    async fn set_order_status(&mut self, order_id: i64, status: OrderStatus) -> AppResult<Order> {
        let order = sqlx::query_as::<_, Order>(
            r#"
            UPDATE orders SET status = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(order_id)
        .bind(status.as_str())
        .fetch_one(&mut *self.tx)
        .await?;
        Ok(order)
    }

    async fn delete_order(&mut self, order_id: i64) -> AppResult<()> {
        sqlx::query("DELETE FROM orders WHERE id = $1")
            .bind(order_id)
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }

    async fn stale_pending_order_ids(&mut self, cutoff: DateTime<Utc>) -> AppResult<Vec<i64>> {
        let ids = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT id FROM orders
            WHERE status = 'pending' AND created_at < $1
            ORDER BY created_at
            "#,
        )
        .bind(cutoff)
        .fetch_all(&mut *self.tx)
        .await?;
        Ok(ids)
    }

    async fn order_items(&mut self, order_id: i64) -> AppResult<Vec<OrderItem>> {
        let items = sqlx::query_as::<_, OrderItem>(
            "SELECT * FROM order_items WHERE order_id = $1 ORDER BY id",
        )
        .bind(order_id)
        .fetch_all(&mut *self.tx)
        .await?;
        Ok(items)
    }

    async fn insert_order_item(&mut self, item: &NewOrderItem) -> AppResult<OrderItem> {
        let created = sqlx::query_as::<_, OrderItem>(
            r#"
            INSERT INTO order_items (
                order_id, product_id, product_name, product_metadata,
                quantity, unit_price, total_price
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(item.order_id)
        .bind(item.product_id)
        .bind(&item.product_name)
        .bind(&item.product_metadata)
        .bind(item.quantity)
        .bind(&item.unit_price)
        .bind(&item.total_price)
        .fetch_one(&mut *self.tx)
        .await?;
        Ok(created)
    }

    async fn delete_order_items(&mut self, order_id: i64) -> AppResult<()> {
        sqlx::query("DELETE FROM order_items WHERE order_id = $1")
            .bind(order_id)
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }
}
