// /commerce/services/commerce-service/src/repository/shipping.rs

use async_trait::async_trait;
use bigdecimal::BigDecimal;

use super::PgUnitOfWork;
use crate::{
    models::*,
    utils::error::AppResult,
};

#[async_trait]
pub trait ShippingStore: Send {
    async fn list_shipping_methods(&mut self, active_only: bool) -> AppResult<Vec<ShippingMethod>>;
    async fn get_shipping_method(&mut self, method_id: i64) -> AppResult<Option<ShippingMethod>>;
    async fn shipping_areas(&mut self, method_id: i64) -> AppResult<Vec<ShippingArea>>;
    async fn insert_shipping_method(&mut self, method: &NewShippingMethod) -> AppResult<ShippingMethod>;
    /// Update method dan ganti semua area-nya
    async fn update_shipping_method(
        &mut self,
        method_id: i64,
        method: &NewShippingMethod,
    ) -> AppResult<Option<ShippingMethod>>;
    async fn delete_shipping_method(&mut self, method_id: i64) -> AppResult<bool>;
    /// Harga area: match city dulu, lalu area satu province (city_id NULL)
    async fn area_price(
        &mut self,
        method_id: i64,
        province_id: i64,
        city_id: Option<i64>,
    ) -> AppResult<Option<BigDecimal>>;
}

impl PgUnitOfWork {
    async fn insert_areas(&mut self, method_id: i64, areas: &[NewShippingArea]) -> AppResult<()> {
        for area in areas {
            sqlx::query(
                r#"
                INSERT INTO shipping_areas (shipping_method_id, province_id, city_id, price)
                VALUES ($1, $2, $3, $4)
                "#,
            )
            .bind(method_id)
            .bind(area.province_id)
            .bind(area.city_id)
            .bind(&area.price)
            .execute(&mut *self.tx)
            .await?;
        }
        Ok(())
    }
}

#[async_trait]
impl ShippingStore for PgUnitOfWork {
    async fn list_shipping_methods(&mut self, active_only: bool) -> AppResult<Vec<ShippingMethod>> {
        let rows = sqlx::query_as::<_, ShippingMethod>(
            r#"
            SELECT * FROM shipping_methods
            WHERE ($1 = FALSE OR is_active = TRUE)
            ORDER BY id
            "#,
        )
        .bind(active_only)
        .fetch_all(&mut *self.tx)
        .await?;
        Ok(rows)
    }

    async fn get_shipping_method(&mut self, method_id: i64) -> AppResult<Option<ShippingMethod>> {
        let row = sqlx::query_as::<_, ShippingMethod>("SELECT * FROM shipping_methods WHERE id = $1")
            .bind(method_id)
            .fetch_optional(&mut *self.tx)
            .await?;
        Ok(row)
    }

    async fn shipping_areas(&mut self, method_id: i64) -> AppResult<Vec<ShippingArea>> {
        let rows = sqlx::query_as::<_, ShippingArea>(
            "SELECT * FROM shipping_areas WHERE shipping_method_id = $1 ORDER BY id",
        )
        .bind(method_id)
        .fetch_all(&mut *self.tx)
        .await?;
        Ok(rows)
    }

    async fn insert_shipping_method(&mut self, method: &NewShippingMethod) -> AppResult<ShippingMethod> {
        let created = sqlx::query_as::<_, ShippingMethod>(
            r#"
            INSERT INTO shipping_methods (name, description, base_cost, estimated_days, is_active)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(&method.name)
        .bind(&method.description)
        .bind(&method.base_cost)
        .bind(method.estimated_days)
        .bind(method.is_active)
        .fetch_one(&mut *self.tx)
        .await?;

        self.insert_areas(created.id, &method.areas).await?;
        Ok(created)
    }

    async fn update_shipping_method(
        &mut self,
        method_id: i64,
        method: &NewShippingMethod,
    ) -> AppResult<Option<ShippingMethod>> {
        let updated = sqlx::query_as::<_, ShippingMethod>(
            r#"
            UPDATE shipping_methods
            SET name = $2, description = $3, base_cost = $4,
                estimated_days = $5, is_active = $6, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(method_id)
        .bind(&method.name)
        .bind(&method.description)
        .bind(&method.base_cost)
        .bind(method.estimated_days)
        .bind(method.is_active)
        .fetch_optional(&mut *self.tx)
        .await?;

        let Some(updated) = updated else {
            return Ok(None);
        };

        sqlx::query("DELETE FROM shipping_areas WHERE shipping_method_id = $1")
            .bind(method_id)
            .execute(&mut *self.tx)
            .await?;
        self.insert_areas(method_id, &method.areas).await?;

        Ok(Some(updated))
    }

    async fn delete_shipping_method(&mut self, method_id: i64) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM shipping_methods WHERE id = $1")
            .bind(method_id)
            .execute(&mut *self.tx)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn area_price(
        &mut self,
        method_id: i64,
        province_id: i64,
        city_id: Option<i64>,
    ) -> AppResult<Option<BigDecimal>> {
        let price = sqlx::query_scalar::<_, BigDecimal>(
            r#"
            SELECT price FROM shipping_areas
            WHERE shipping_method_id = $1
              AND province_id = $2
              AND (city_id IS NULL OR city_id = $3)
            ORDER BY (city_id IS NULL) ASC, id
            LIMIT 1
            "#,
        )
        .bind(method_id)
        .bind(province_id)
        .bind(city_id)
        .fetch_optional(&mut *self.tx)
        .await?;
        Ok(price)
    }
}
