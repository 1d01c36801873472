// /commerce/services/commerce-service/src/core/cart.rs

use std::collections::HashMap;
use std::sync::Arc;

use bigdecimal::BigDecimal;
use uuid::Uuid;

use crate::{
    models::*,
    repository::{CartStore, CatalogStore, Store, UnitOfWork},
    utils::error::{AppError, AppResult},
};

/// Cart item yang sudah di-join dengan variation dan product-nya
#[derive(Debug, Clone)]
pub struct CartLine {
    pub item: CartItem,
    pub variation: ProductVariation,
    pub product: Product,
}

/// Cart yang lolos validasi, siap di-checkout
#[derive(Debug, Clone)]
pub struct ValidatedCart {
    pub cart: Cart,
    pub lines: Vec<CartLine>,
}

impl ValidatedCart {
    /// Subtotal dihitung ulang dari item, bukan dari cache total_amount
    pub fn subtotal(&self) -> BigDecimal {
        self.lines
            .iter()
            .fold(BigDecimal::from(0), |acc, line| acc + &line.item.total_price)
    }
}

/// Cocokkan cart items dengan state catalog sekarang.
/// Semua masalah dikumpulkan, satu item bisa punya stock dan price issue sekaligus.
pub fn reconcile(
    items: &[CartItem],
    variations: &[ProductVariation],
    products: &[Product],
) -> Vec<CartIssue> {
    let variation_map: HashMap<i64, &ProductVariation> = variations.iter().map(|v| (v.id, v)).collect();
    let product_names: HashMap<i64, &str> = products.iter().map(|p| (p.id, p.name.as_str())).collect();

    let mut issues = Vec::new();
    for item in items {
        let Some(variation) = variation_map.get(&item.variation_id) else {
            issues.push(CartIssue {
                kind: CartIssueKind::VariationNotFound,
                variation_id: item.variation_id,
                product_id: None,
                product_name: None,
            });
            continue;
        };

        let issue = |kind| CartIssue {
            kind,
            variation_id: variation.id,
            product_id: Some(variation.product_id),
            product_name: product_names.get(&variation.product_id).map(|n| n.to_string()),
        };

        if variation.quantity < item.quantity {
            issues.push(issue(CartIssueKind::InsufficientStock));
        }

        if variation.final_price() != item.unit_price {
            issues.push(issue(CartIssueKind::PriceChanged));
        }
    }

    issues
}

/// Load cart user dan validasi di dalam unit of work yang sama dengan caller
pub async fn load_validated(uow: &mut dyn UnitOfWork, user_id: Uuid) -> AppResult<ValidatedCart> {
    let cart = uow.get_or_create_cart(user_id).await?;
    let items = uow.cart_items(cart.id).await?;

    if items.is_empty() {
        return Err(AppError::ValidationError("Cart kosong".to_string()));
    }

    let variation_ids: Vec<i64> = items.iter().map(|i| i.variation_id).collect();
    let variations = uow.get_variations(&variation_ids).await?;
    let product_ids: Vec<i64> = variations.iter().map(|v| v.product_id).collect();
    let products = uow.get_products(&product_ids).await?;

    let issues = reconcile(&items, &variations, &products);
    if !issues.is_empty() {
        tracing::debug!("Cart {} tidak valid: {} issue(s)", cart.id, issues.len());
        return Err(AppError::CartValidation(issues));
    }

    let lines = items
        .into_iter()
        .map(|item| {
            let variation = variations
                .iter()
                .find(|v| v.id == item.variation_id)
                .cloned()
                .ok_or_else(|| AppError::Internal(format!("Variation {} hilang", item.variation_id)))?;
            let product = products
                .iter()
                .find(|p| p.id == variation.product_id)
                .cloned()
                .ok_or_else(|| AppError::Internal(format!("Product {} hilang", variation.product_id)))?;
            Ok(CartLine { item, variation, product })
        })
        .collect::<AppResult<Vec<_>>>()?;

    Ok(ValidatedCart { cart, lines })
}

pub struct CartService {
    store: Arc<dyn Store>,
}

impl CartService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Ambil cart user, dibuat lazily kalau belum ada
    pub async fn get_cart(&self, user_id: Uuid) -> AppResult<CartWithItems> {
        let mut uow = self.store.begin().await?;
        let cart = uow.get_or_create_cart(user_id).await?;
        let items = uow.cart_items(cart.id).await?;
        uow.commit().await?;
        Ok(CartWithItems { cart, items })
    }

    pub async fn add_item(&self, user_id: Uuid, request: AddCartItemRequest) -> AppResult<CartWithItems> {
        let quantity = request.quantity.unwrap_or(1);

        let mut uow = self.store.begin().await?;
        let cart = uow.get_or_create_cart(user_id).await?;

        let variation = uow
            .get_variation(request.variation_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Variation tidak ditemukan".to_string()))?;

        if uow
            .find_cart_item_by_variation(cart.id, variation.id)
            .await?
            .is_some()
        {
            return Err(AppError::BadRequest("Item sudah ada di cart".to_string()));
        }

        if variation.quantity < quantity {
            return Err(AppError::InsufficientStock {
                variation_id: variation.id,
                requested: quantity,
            });
        }

        let unit_price = variation.final_price();
        let total_price = &unit_price * BigDecimal::from(quantity);
        uow.insert_cart_item(&NewCartItem {
            cart_id: cart.id,
            variation_id: variation.id,
            quantity,
            unit_price,
            total_price,
        })
        .await?;

        let result = Self::reload(uow.as_mut(), cart).await?;
        uow.commit().await?;

        tracing::debug!("Variation {} ditambahkan ke cart user {}", variation.id, user_id);
        Ok(result)
    }

    /// Tambah/kurang satu unit, harga tetap harga yang di-capture
    pub async fn update_item(
        &self,
        user_id: Uuid,
        item_id: i64,
        operation: CartOperation,
    ) -> AppResult<CartWithItems> {
        let mut uow = self.store.begin().await?;
        let cart = uow.get_or_create_cart(user_id).await?;
        let item = uow
            .find_cart_item(cart.id, item_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Cart item tidak ditemukan".to_string()))?;

        let new_quantity = match operation {
            CartOperation::Increment => {
                let variation = uow
                    .get_variation(item.variation_id)
                    .await?
                    .ok_or_else(|| AppError::NotFound("Variation tidak ditemukan".to_string()))?;
                if variation.quantity <= item.quantity {
                    return Err(AppError::InsufficientStock {
                        variation_id: variation.id,
                        requested: item.quantity + 1,
                    });
                }
                item.quantity + 1
            }
            CartOperation::Decrement => {
                if item.quantity <= 1 {
                    return Err(AppError::BadRequest(
                        "Quantity tidak bisa kurang dari 1, hapus item saja".to_string(),
                    ));
                }
                item.quantity - 1
            }
        };

        let total_price = &item.unit_price * BigDecimal::from(new_quantity);
        uow.update_cart_item(item.id, new_quantity, &total_price).await?;

        let result = Self::reload(uow.as_mut(), cart).await?;
        uow.commit().await?;
        Ok(result)
    }

    pub async fn remove_item(&self, user_id: Uuid, item_id: i64) -> AppResult<CartWithItems> {
        let mut uow = self.store.begin().await?;
        let cart = uow.get_or_create_cart(user_id).await?;
        if uow.find_cart_item(cart.id, item_id).await?.is_none() {
            return Err(AppError::NotFound("Cart item tidak ditemukan".to_string()));
        }

        uow.delete_cart_item(item_id).await?;
        let result = Self::reload(uow.as_mut(), cart).await?;
        uow.commit().await?;
        Ok(result)
    }

    pub async fn clear(&self, user_id: Uuid) -> AppResult<CartWithItems> {
        let mut uow = self.store.begin().await?;
        let cart = uow
            .find_cart(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Cart tidak ditemukan untuk user ini".to_string()))?;

        uow.clear_cart_items(cart.id).await?;
        let result = Self::reload(uow.as_mut(), cart).await?;
        uow.commit().await?;
        Ok(result)
    }

    /// Read-only: tidak ada perubahan inventory
    pub async fn validate(&self, user_id: Uuid) -> AppResult<CartWithItems> {
        let mut uow = self.store.begin().await?;
        let validated = load_validated(uow.as_mut(), user_id).await?;
        Ok(CartWithItems {
            cart: validated.cart,
            items: validated.lines.into_iter().map(|l| l.item).collect(),
        })
    }

    async fn reload(uow: &mut dyn UnitOfWork, mut cart: Cart) -> AppResult<CartWithItems> {
        cart.total_amount = uow.refresh_cart_total(cart.id).await?;
        let items = uow.cart_items(cart.id).await?;
        Ok(CartWithItems { cart, items })
    }
}
