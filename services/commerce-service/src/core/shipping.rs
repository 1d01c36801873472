// /commerce/services/commerce-service/src/core/shipping.rs

use std::sync::Arc;

use bigdecimal::{BigDecimal, Zero};

use crate::{
    models::*,
    repository::{ShippingStore, Store, UnitOfWork},
    utils::{
        error::{AppError, AppResult},
        validator::{validate_non_negative_amount, validate_whole_amount},
    },
};

/// Ongkir untuk checkout. Area price untuk province/city, selain itu base_cost method.
pub async fn shipping_cost<S: ShippingStore + ?Sized>(
    store: &mut S,
    shipping_id: Option<i64>,
    province_id: Option<i64>,
    city_id: Option<i64>,
) -> AppResult<BigDecimal> {
    let Some(shipping_id) = shipping_id else {
        return Ok(BigDecimal::zero());
    };

    let method = store
        .get_shipping_method(shipping_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Shipping method tidak ditemukan".to_string()))?;
    if !method.is_active {
        return Err(AppError::BadRequest(format!(
            "Shipping method '{}' tidak aktif",
            method.name
        )));
    }

    price_for(store, &method, province_id, city_id).await
}

async fn price_for<S: ShippingStore + ?Sized>(
    store: &mut S,
    method: &ShippingMethod,
    province_id: Option<i64>,
    city_id: Option<i64>,
) -> AppResult<BigDecimal> {
    let area_price = match province_id {
        Some(province_id) => store.area_price(method.id, province_id, city_id).await?,
        None => None,
    };
    Ok(area_price.unwrap_or_else(|| method.base_cost.clone()))
}

pub struct ShippingService {
    store: Arc<dyn Store>,
}

impl ShippingService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Semua method aktif dengan harga untuk lokasi yang diminta
    pub async fn quote(&self, province_id: Option<i64>, city_id: Option<i64>) -> AppResult<Vec<ShippingQuote>> {
        let mut uow = self.store.begin().await?;
        let methods = uow.list_shipping_methods(true).await?;

        let mut quotes = Vec::with_capacity(methods.len());
        for method in methods {
            let price = price_for(uow.as_mut(), &method, province_id, city_id).await?;
            quotes.push(ShippingQuote {
                method_id: method.id,
                name: method.name,
                description: method.description,
                estimated_days: method.estimated_days,
                price,
            });
        }

        Ok(quotes)
    }

    pub async fn list_methods(&self) -> AppResult<Vec<ShippingMethod>> {
        let mut uow = self.store.begin().await?;
        uow.list_shipping_methods(false).await
    }

    pub async fn get_method(&self, method_id: i64) -> AppResult<ShippingMethodWithAreas> {
        let mut uow = self.store.begin().await?;
        let method = uow
            .get_shipping_method(method_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Shipping method tidak ditemukan".to_string()))?;
        let areas = uow.shipping_areas(method.id).await?;
        Ok(ShippingMethodWithAreas { method, areas })
    }

    pub async fn create_method(&self, request: ShippingMethodRequest) -> AppResult<ShippingMethodWithAreas> {
        let method = Self::to_new_method(request)?;

        let mut uow = self.store.begin().await?;
        let created = uow.insert_shipping_method(&method).await?;
        let areas = uow.shipping_areas(created.id).await?;
        uow.commit().await?;

        tracing::info!("Shipping method {} ({}) dibuat", created.id, created.name);
        Ok(ShippingMethodWithAreas { method: created, areas })
    }

    /// Update method, areas lama diganti semua
    pub async fn update_method(
        &self,
        method_id: i64,
        request: ShippingMethodRequest,
    ) -> AppResult<ShippingMethodWithAreas> {
        let method = Self::to_new_method(request)?;

        let mut uow = self.store.begin().await?;
        let updated = uow
            .update_shipping_method(method_id, &method)
            .await?
            .ok_or_else(|| AppError::NotFound("Shipping method tidak ditemukan".to_string()))?;
        let areas = uow.shipping_areas(updated.id).await?;
        uow.commit().await?;

        Ok(ShippingMethodWithAreas { method: updated, areas })
    }

    pub async fn delete_method(&self, method_id: i64) -> AppResult<()> {
        let mut uow = self.store.begin().await?;
        if !uow.delete_shipping_method(method_id).await? {
            return Err(AppError::NotFound("Shipping method tidak ditemukan".to_string()));
        }
        uow.commit().await
    }

    fn to_new_method(request: ShippingMethodRequest) -> AppResult<NewShippingMethod> {
        let base_cost = request.base_cost.unwrap_or_else(BigDecimal::zero);
        validate_non_negative_amount(&base_cost, "base_cost")?;
        validate_whole_amount(&base_cost, "base_cost")?;

        let mut areas = Vec::new();
        for area in request.areas {
            validate_non_negative_amount(&area.price, "price")?;
            validate_whole_amount(&area.price, "price")?;

            // city_ids kosong = berlaku untuk seluruh province
            if area.city_ids.is_empty() {
                areas.push(NewShippingArea {
                    province_id: area.province_id,
                    city_id: None,
                    price: area.price,
                });
            } else {
                for city_id in area.city_ids {
                    areas.push(NewShippingArea {
                        province_id: area.province_id,
                        city_id: Some(city_id),
                        price: area.price.clone(),
                    });
                }
            }
        }

        Ok(NewShippingMethod {
            name: request.name.trim().to_string(),
            description: request.description,
            base_cost,
            estimated_days: request.estimated_days,
            is_active: request.is_active.unwrap_or(true),
            areas,
        })
    }
}
