// /commerce/services/commerce-service/src/core/catalog.rs

use std::sync::Arc;

use bigdecimal::{BigDecimal, Zero};

use crate::{
    models::*,
    repository::{CatalogStore, Store, UnitOfWork},
    utils::{
        error::{AppError, AppResult},
        validator::{validate_non_negative_amount, validate_slug, validate_sku, validate_whole_amount},
    },
};

/// Service untuk catalog: categories, attributes, products, variations
pub struct CatalogService {
    store: Arc<dyn Store>,
}

impl CatalogService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn create_category(&self, request: CreateCategoryRequest) -> AppResult<Category> {
        validate_slug(&request.slug)?;

        let mut uow = self.store.begin().await?;
        if let Some(parent_id) = request.parent_id {
            let parents = uow.list_categories().await?;
            if !parents.iter().any(|c| c.id == parent_id) {
                return Err(AppError::NotFound("Parent category tidak ditemukan".to_string()));
            }
        }

        let category = uow
            .create_category(&NewCategory {
                name: request.name.trim().to_string(),
                slug: request.slug,
                parent_id: request.parent_id,
            })
            .await?;
        uow.commit().await?;

        Ok(category)
    }

    pub async fn list_categories(&self) -> AppResult<Vec<Category>> {
        let mut uow = self.store.begin().await?;
        uow.list_categories().await
    }

    pub async fn create_attribute(&self, request: CreateAttributeRequest) -> AppResult<Attribute> {
        let mut uow = self.store.begin().await?;
        let attribute = uow.create_attribute(request.name.trim()).await?;
        uow.commit().await?;
        Ok(attribute)
    }

    pub async fn list_attributes(&self) -> AppResult<Vec<Attribute>> {
        let mut uow = self.store.begin().await?;
        uow.list_attributes().await
    }

    pub async fn create_product(&self, request: CreateProductRequest) -> AppResult<ProductDetails> {
        validate_slug(&request.slug)?;

        let mut uow = self.store.begin().await?;

        if !request.category_ids.is_empty() {
            let known: Vec<i64> = uow.list_categories().await?.iter().map(|c| c.id).collect();
            if let Some(missing) = request.category_ids.iter().find(|id| !known.contains(id)) {
                return Err(AppError::NotFound(format!("Category {} tidak ditemukan", missing)));
            }
        }

        let product = uow
            .create_product(&NewProduct {
                name: request.name.trim().to_string(),
                slug: request.slug,
                description: request.description,
                status: request.status.unwrap_or(ProductStatus::Draft),
                category_ids: request.category_ids,
                attributes: request
                    .attributes
                    .into_iter()
                    .map(|a| ProductAttributeValue {
                        attribute_id: a.attribute_id,
                        value: a.value,
                    })
                    .collect(),
            })
            .await?;

        let details = Self::load_details(uow.as_mut(), product).await?;
        uow.commit().await?;

        tracing::info!("Product {} ({}) dibuat", details.product.id, details.product.slug);
        Ok(details)
    }

    pub async fn get_product(&self, product_id: i64) -> AppResult<ProductDetails> {
        let mut uow = self.store.begin().await?;
        let product = uow
            .get_product(product_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Product tidak ditemukan".to_string()))?;
        Self::load_details(uow.as_mut(), product).await
    }

    pub async fn list_products(&self, limit: i64, offset: i64) -> AppResult<(Vec<Product>, i64)> {
        let mut uow = self.store.begin().await?;
        uow.list_products(limit, offset).await
    }

    pub async fn create_variation(
        &self,
        product_id: i64,
        request: CreateVariationRequest,
    ) -> AppResult<ProductVariation> {
        validate_sku(&request.sku)?;
        let sales_price = request.sales_price.unwrap_or_else(BigDecimal::zero);
        Self::validate_prices(Some(&request.unit_price), Some(&sales_price))?;

        let mut uow = self.store.begin().await?;
        if uow.get_product(product_id).await?.is_none() {
            return Err(AppError::NotFound("Product tidak ditemukan".to_string()));
        }

        let variation = uow
            .create_variation(&NewVariation {
                product_id,
                sku: request.sku,
                unit_price: request.unit_price,
                sales_price,
                quantity: request.quantity,
            })
            .await?;
        uow.commit().await?;

        Ok(variation)
    }

    /// Update harga/stock. reserved_quantity tidak pernah diubah dari sini.
    pub async fn update_variation(
        &self,
        variation_id: i64,
        request: UpdateVariationRequest,
    ) -> AppResult<ProductVariation> {
        Self::validate_prices(request.unit_price.as_ref(), request.sales_price.as_ref())?;

        let mut uow = self.store.begin().await?;
        let variation = uow
            .update_variation(
                variation_id,
                &VariationUpdate {
                    unit_price: request.unit_price,
                    sales_price: request.sales_price,
                    quantity: request.quantity,
                },
            )
            .await?
            .ok_or_else(|| AppError::NotFound("Variation tidak ditemukan".to_string()))?;
        uow.commit().await?;

        Ok(variation)
    }

    fn validate_prices(unit_price: Option<&BigDecimal>, sales_price: Option<&BigDecimal>) -> AppResult<()> {
        if let Some(price) = unit_price {
            validate_non_negative_amount(price, "unit_price")?;
            validate_whole_amount(price, "unit_price")?;
        }
        if let Some(price) = sales_price {
            validate_non_negative_amount(price, "sales_price")?;
            validate_whole_amount(price, "sales_price")?;
        }
        Ok(())
    }

    async fn load_details(uow: &mut dyn UnitOfWork, product: Product) -> AppResult<ProductDetails> {
        let category_ids = uow.product_category_ids(product.id).await?;
        let attributes = uow.product_attributes(product.id).await?;
        let variations = uow.list_variations(product.id).await?;

        Ok(ProductDetails {
            product,
            category_ids,
            attributes,
            variations,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::memory::MemoryStore;

    fn product_request(slug: &str) -> CreateProductRequest {
        CreateProductRequest {
            name: "Kaos Polos".into(),
            slug: slug.into(),
            description: None,
            status: Some(ProductStatus::Published),
            category_ids: vec![],
            attributes: vec![],
        }
    }

    #[tokio::test]
    async fn test_product_with_variations() {
        let service = CatalogService::new(Arc::new(MemoryStore::new()));

        let product = service.create_product(product_request("kaos-polos")).await.unwrap();
        let variation = service
            .create_variation(
                product.product.id,
                CreateVariationRequest {
                    sku: "KAOS-M".into(),
                    unit_price: BigDecimal::from(1000),
                    sales_price: None,
                    quantity: 5,
                },
            )
            .await
            .unwrap();
        assert_eq!(variation.final_price(), BigDecimal::from(1000));

        let details = service.get_product(product.product.id).await.unwrap();
        assert_eq!(details.variations.len(), 1);
        assert_eq!(details.product.status, ProductStatus::Published);
    }

    #[tokio::test]
    async fn test_duplicate_slug_is_conflict() {
        let service = CatalogService::new(Arc::new(MemoryStore::new()));
        service.create_product(product_request("kaos")).await.unwrap();

        let err = service.create_product(product_request("kaos")).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));

        let err = service.create_product(product_request("Bad Slug")).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_unknown_category_rejected() {
        let service = CatalogService::new(Arc::new(MemoryStore::new()));
        let mut request = product_request("kaos");
        request.category_ids = vec![42];

        assert!(matches!(
            service.create_product(request).await,
            Err(AppError::NotFound(_))
        ));
    }
}
