// /commerce/services/commerce-service/src/repository/cart.rs

use async_trait::async_trait;
use bigdecimal::BigDecimal;
use uuid::Uuid;

use super::PgUnitOfWork;
use crate::{
    models::*,
    utils::error::AppResult,
};

#[async_trait]
pub trait CartStore: Send {
    async fn find_cart(&mut self, user_id: Uuid) -> AppResult<Option<Cart>>;
    /// Ambil cart user, buat baru kalau belum ada
    async fn get_or_create_cart(&mut self, user_id: Uuid) -> AppResult<Cart>;
    async fn cart_items(&mut self, cart_id: i64) -> AppResult<Vec<CartItem>>;
    async fn find_cart_item(&mut self, cart_id: i64, item_id: i64) -> AppResult<Option<CartItem>>;
    async fn find_cart_item_by_variation(
        &mut self,
        cart_id: i64,
        variation_id: i64,
    ) -> AppResult<Option<CartItem>>;
    async fn insert_cart_item(&mut self, item: &NewCartItem) -> AppResult<CartItem>;
    async fn update_cart_item(
        &mut self,
        item_id: i64,
        quantity: i32,
        total_price: &BigDecimal,
    ) -> AppResult<CartItem>;
    async fn delete_cart_item(&mut self, item_id: i64) -> AppResult<()>;
    async fn clear_cart_items(&mut self, cart_id: i64) -> AppResult<()>;
    /// Hitung ulang total_amount dari item totals
    async fn refresh_cart_total(&mut self, cart_id: i64) -> AppResult<BigDecimal>;
}

#[async_trait]
impl CartStore for PgUnitOfWork {
    async fn find_cart(&mut self, user_id: Uuid) -> AppResult<Option<Cart>> {
        let cart = sqlx::query_as::<_, Cart>("SELECT * FROM carts WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(&mut *self.tx)
            .await?;
        Ok(cart)
    }

    async fn get_or_create_cart(&mut self, user_id: Uuid) -> AppResult<Cart> {
        // ON CONFLICT supaya dua request pertama yang bersamaan tidak bikin duplicate
        let cart = sqlx::query_as::<_, Cart>(
            r#"
            INSERT INTO carts (user_id)
            VALUES ($1)
            ON CONFLICT (user_id) DO UPDATE SET user_id = EXCLUDED.user_id
            RETURNING *
            "#,
        )
        .bind(user_id)
        .fetch_one(&mut *self.tx)
        .await?;
        Ok(cart)
    }

    async fn cart_items(&mut self, cart_id: i64) -> AppResult<Vec<CartItem>> {
        let items = sqlx::query_as::<_, CartItem>(
            "SELECT * FROM cart_items WHERE cart_id = $1 ORDER BY id",
        )
        .bind(cart_id)
        .fetch_all(&mut *self.tx)
        .await?;
        Ok(items)
    }

    async fn find_cart_item(&mut self, cart_id: i64, item_id: i64) -> AppResult<Option<CartItem>> {
        let item = sqlx::query_as::<_, CartItem>(
            "SELECT * FROM cart_items WHERE id = $1 AND cart_id = $2",
        )
        .bind(item_id)
        .bind(cart_id)
        .fetch_optional(&mut *self.tx)
        .await?;
        Ok(item)
    }

    async fn find_cart_item_by_variation(
        &mut self,
        cart_id: i64,
        variation_id: i64,
    ) -> AppResult<Option<CartItem>> {
        let item = sqlx::query_as::<_, CartItem>(
            "SELECT * FROM cart_items WHERE cart_id = $1 AND variation_id = $2",
        )
        .bind(cart_id)
        .bind(variation_id)
        .fetch_optional(&mut *self.tx)
        .await?;
        Ok(item)
    }

    async fn insert_cart_item(&mut self, item: &NewCartItem) -> AppResult<CartItem> {
        let created = sqlx::query_as::<_, CartItem>(
            r#"
            INSERT INTO cart_items (cart_id, variation_id, quantity, unit_price, total_price)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(item.cart_id)
        .bind(item.variation_id)
        .bind(item.quantity)
        .bind(&item.unit_price)
        .bind(&item.total_price)
        .fetch_one(&mut *self.tx)
        .await?;
        Ok(created)
    }

    async fn update_cart_item(
        &mut self,
        item_id: i64,
        quantity: i32,
        total_price: &BigDecimal,
    ) -> AppResult<CartItem> {
        let updated = sqlx::query_as::<_, CartItem>(
            r#"
            UPDATE cart_items SET quantity = $2, total_price = $3
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(item_id)
        .bind(quantity)
        .bind(total_price)
        .fetch_one(&mut *self.tx)
        .await?;
        Ok(updated)
    }

    async fn delete_cart_item(&mut self, item_id: i64) -> AppResult<()> {
        sqlx::query("DELETE FROM cart_items WHERE id = $1")
            .bind(item_id)
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }

    async fn clear_cart_items(&mut self, cart_id: i64) -> AppResult<()> {
        sqlx::query("DELETE FROM cart_items WHERE cart_id = $1")
            .bind(cart_id)
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }

    async fn refresh_cart_total(&mut self, cart_id: i64) -> AppResult<BigDecimal> {
        let total: BigDecimal = sqlx::query_scalar(
            r#"
            UPDATE carts
            SET total_amount = COALESCE(
                    (SELECT SUM(total_price) FROM cart_items WHERE cart_id = $1), 0),
                updated_at = NOW()
            WHERE id = $1
            RETURNING total_amount
            "#,
        )
        .bind(cart_id)
        .fetch_one(&mut *self.tx)
        .await?;
        Ok(total)
    }
}
