// /commerce/services/commerce-service/src/repository/catalog.rs

use async_trait::async_trait;

use super::PgUnitOfWork;
use crate::{
    models::*,
    utils::error::AppResult,
};

/// Catalog data dan stock counters
#[async_trait]
pub trait CatalogStore: Send {
    async fn create_category(&mut self, category: &NewCategory) -> AppResult<Category>;
    async fn list_categories(&mut self) -> AppResult<Vec<Category>>;
    async fn create_attribute(&mut self, name: &str) -> AppResult<Attribute>;
    async fn list_attributes(&mut self) -> AppResult<Vec<Attribute>>;

    async fn create_product(&mut self, product: &NewProduct) -> AppResult<Product>;
    async fn get_product(&mut self, product_id: i64) -> AppResult<Option<Product>>;
    async fn get_products(&mut self, product_ids: &[i64]) -> AppResult<Vec<Product>>;
    async fn list_products(&mut self, limit: i64, offset: i64) -> AppResult<(Vec<Product>, i64)>;
    async fn product_category_ids(&mut self, product_id: i64) -> AppResult<Vec<i64>>;
    async fn product_attributes(&mut self, product_id: i64) -> AppResult<Vec<ProductAttributeValue>>;

    async fn create_variation(&mut self, variation: &NewVariation) -> AppResult<ProductVariation>;
    async fn update_variation(
        &mut self,
        variation_id: i64,
        update: &VariationUpdate,
    ) -> AppResult<Option<ProductVariation>>;
    async fn get_variation(&mut self, variation_id: i64) -> AppResult<Option<ProductVariation>>;
    async fn get_variations(&mut self, variation_ids: &[i64]) -> AppResult<Vec<ProductVariation>>;
    async fn list_variations(&mut self, product_id: i64) -> AppResult<Vec<ProductVariation>>;

    /// quantity -> reserved_quantity, hanya kalau quantity >= qty
    async fn reserve_stock(&mut self, variation_id: i64, qty: i32) -> AppResult<bool>;
    /// Kurangi reserved_quantity, hanya kalau reserved_quantity >= qty
    async fn finalize_stock(&mut self, variation_id: i64, qty: i32) -> AppResult<bool>;
    /// reserved_quantity -> quantity
    async fn release_stock(&mut self, variation_id: i64, qty: i32) -> AppResult<bool>;
    /// Kembalikan stock yang sudah terjual ke quantity
    async fn restock(&mut self, variation_id: i64, qty: i32) -> AppResult<bool>;
}

#[async_trait]
impl CatalogStore for PgUnitOfWork {
    async fn create_category(&mut self, category: &NewCategory) -> AppResult<Category> {
        let row = sqlx::query_as::<_, Category>(
            r#"
            INSERT INTO categories (name, slug, parent_id)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(&category.name)
        .bind(&category.slug)
        .bind(category.parent_id)
        .fetch_one(&mut *self.tx)
        .await?;

        Ok(row)
    }

    async fn list_categories(&mut self) -> AppResult<Vec<Category>> {
        let rows = sqlx::query_as::<_, Category>("SELECT * FROM categories ORDER BY name")
            .fetch_all(&mut *self.tx)
            .await?;
        Ok(rows)
    }

    async fn create_attribute(&mut self, name: &str) -> AppResult<Attribute> {
        let row = sqlx::query_as::<_, Attribute>(
            "INSERT INTO attributes (name) VALUES ($1) RETURNING *",
        )
        .bind(name)
        .fetch_one(&mut *self.tx)
        .await?;
        Ok(row)
    }

    async fn list_attributes(&mut self) -> AppResult<Vec<Attribute>> {
        let rows = sqlx::query_as::<_, Attribute>("SELECT * FROM attributes ORDER BY name")
            .fetch_all(&mut *self.tx)
            .await?;
        Ok(rows)
    }

    async fn create_product(&mut self, product: &NewProduct) -> AppResult<Product> {
        let created = sqlx::query_as::<_, Product>(
            r#"
            INSERT INTO products (name, slug, description, status)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(&product.name)
        .bind(&product.slug)
        .bind(&product.description)
        .bind(product.status.as_str())
        .fetch_one(&mut *self.tx)
        .await?;

        for category_id in &product.category_ids {
            sqlx::query(
                "INSERT INTO product_categories (product_id, category_id) VALUES ($1, $2)",
            )
            .bind(created.id)
            .bind(category_id)
            .execute(&mut *self.tx)
            .await?;
        }

        for attribute in &product.attributes {
            sqlx::query(
                "INSERT INTO product_attributes (product_id, attribute_id, value) VALUES ($1, $2, $3)",
            )
            .bind(created.id)
            .bind(attribute.attribute_id)
            .bind(&attribute.value)
            .execute(&mut *self.tx)
            .await?;
        }

        Ok(created)
    }

    async fn get_product(&mut self, product_id: i64) -> AppResult<Option<Product>> {
        let row = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = $1")
            .bind(product_id)
            .fetch_optional(&mut *self.tx)
            .await?;
        Ok(row)
    }

    async fn get_products(&mut self, product_ids: &[i64]) -> AppResult<Vec<Product>> {
        let rows = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = ANY($1)")
            .bind(product_ids)
            .fetch_all(&mut *self.tx)
            .await?;
        Ok(rows)
    }

    async fn list_products(&mut self, limit: i64, offset: i64) -> AppResult<(Vec<Product>, i64)> {
        let rows = sqlx::query_as::<_, Product>(
            "SELECT * FROM products ORDER BY created_at DESC, id DESC LIMIT $1 OFFSET $2",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&mut *self.tx)
        .await?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&mut *self.tx)
            .await?;

        Ok((rows, total))
    }

    async fn product_category_ids(&mut self, product_id: i64) -> AppResult<Vec<i64>> {
        let ids = sqlx::query_scalar::<_, i64>(
            "SELECT category_id FROM product_categories WHERE product_id = $1 ORDER BY category_id",
        )
        .bind(product_id)
        .fetch_all(&mut *self.tx)
        .await?;
        Ok(ids)
    }

    async fn product_attributes(&mut self, product_id: i64) -> AppResult<Vec<ProductAttributeValue>> {
        let rows = sqlx::query_as::<_, ProductAttributeValue>(
            r#"
            SELECT attribute_id, value FROM product_attributes
            WHERE product_id = $1
            ORDER BY attribute_id
            "#,
        )
        .bind(product_id)
        .fetch_all(&mut *self.tx)
        .await?;
        Ok(rows)
    }

    async fn create_variation(&mut self, variation: &NewVariation) -> AppResult<ProductVariation> {
        let row = sqlx::query_as::<_, ProductVariation>(
            r#"
            INSERT INTO product_variations (product_id, sku, unit_price, sales_price, quantity)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(variation.product_id)
        .bind(&variation.sku)
        .bind(&variation.unit_price)
        .bind(&variation.sales_price)
        .bind(variation.quantity)
        .fetch_one(&mut *self.tx)
        .await?;
        Ok(row)
    }

    async fn update_variation(
        &mut self,
        variation_id: i64,
        update: &VariationUpdate,
    ) -> AppResult<Option<ProductVariation>> {
        let row = sqlx::query_as::<_, ProductVariation>(
            r#"
            UPDATE product_variations
            SET unit_price = COALESCE($2, unit_price),
                sales_price = COALESCE($3, sales_price),
                quantity = COALESCE($4, quantity),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(variation_id)
        .bind(&update.unit_price)
        .bind(&update.sales_price)
        .bind(update.quantity)
        .fetch_optional(&mut *self.tx)
        .await?;
        Ok(row)
    }

    async fn get_variation(&mut self, variation_id: i64) -> AppResult<Option<ProductVariation>> {
        let row = sqlx::query_as::<_, ProductVariation>(
            "SELECT * FROM product_variations WHERE id = $1",
        )
        .bind(variation_id)
        .fetch_optional(&mut *self.tx)
        .await?;
        Ok(row)
    }

    async fn get_variations(&mut self, variation_ids: &[i64]) -> AppResult<Vec<ProductVariation>> {
        let rows = sqlx::query_as::<_, ProductVariation>(
            "SELECT * FROM product_variations WHERE id = ANY($1)",
        )
        .bind(variation_ids)
        .fetch_all(&mut *self.tx)
        .await?;
        Ok(rows)
    }

    async fn list_variations(&mut self, product_id: i64) -> AppResult<Vec<ProductVariation>> {
        let rows = sqlx::query_as::<_, ProductVariation>(
            "SELECT * FROM product_variations WHERE product_id = $1 ORDER BY id",
        )
        .bind(product_id)
        .fetch_all(&mut *self.tx)
        .await?;
        Ok(rows)
    }

    async fn reserve_stock(&mut self, variation_id: i64, qty: i32) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE product_variations
            SET quantity = quantity - $2,
                reserved_quantity = reserved_quantity + $2,
                updated_at = NOW()
            WHERE id = $1 AND quantity >= $2
            "#,
        )
        .bind(variation_id)
        .bind(qty)
        .execute(&mut *self.tx)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn finalize_stock(&mut self, variation_id: i64, qty: i32) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE product_variations
            SET reserved_quantity = reserved_quantity - $2,
                updated_at = NOW()
            WHERE id = $1 AND reserved_quantity >= $2
            "#,
        )
        .bind(variation_id)
        .bind(qty)
        .execute(&mut *self.tx)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn release_stock(&mut self, variation_id: i64, qty: i32) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE product_variations
            SET quantity = quantity + $2,
                reserved_quantity = reserved_quantity - $2,
                updated_at = NOW()
            WHERE id = $1 AND reserved_quantity >= $2
            "#,
        )
        .bind(variation_id)
        .bind(qty)
        .execute(&mut *self.tx)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn restock(&mut self, variation_id: i64, qty: i32) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE product_variations
            SET quantity = quantity + $2, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(variation_id)
        .bind(qty)
        .execute(&mut *self.tx)
        .await?;
        Ok(result.rows_affected() == 1)
    }
}
