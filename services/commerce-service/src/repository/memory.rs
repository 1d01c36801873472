// /commerce/services/commerce-service/src/repository/memory.rs
// In-memory Store untuk unit test service dan handler

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use bigdecimal::{BigDecimal, Zero};
use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use super::{
    CartStore, CatalogStore, OrderStore, SettingStore, ShippingStore, Store, TransactionStore,
    UnitOfWork, WalletStore,
};
use crate::{
    models::*,
    utils::error::{AppError, AppResult},
};

#[derive(Debug, Clone, Default)]
pub struct MemoryState {
    next_id: i64,
    pub categories: BTreeMap<i64, Category>,
    pub attributes: BTreeMap<i64, Attribute>,
    pub products: BTreeMap<i64, Product>,
    pub product_categories: Vec<(i64, i64)>,
    pub product_attributes: Vec<(i64, ProductAttributeValue)>,
    pub variations: BTreeMap<i64, ProductVariation>,
    pub carts: BTreeMap<i64, Cart>,
    pub cart_items: BTreeMap<i64, CartItem>,
    pub orders: BTreeMap<i64, Order>,
    pub order_items: BTreeMap<i64, OrderItem>,
    pub transactions: BTreeMap<i64, Transaction>,
    pub wallets: HashMap<Uuid, Wallet>,
    pub settings: BTreeMap<i64, Setting>,
    pub shipping_methods: BTreeMap<i64, ShippingMethod>,
    pub shipping_areas: BTreeMap<i64, ShippingArea>,
}

impl MemoryState {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

/// Semua unit of work di-serialize oleh satu mutex; perubahan ditulis balik saat commit
#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn snapshot(&self) -> MemoryState {
        self.state.lock().await.clone()
    }

    pub async fn update<F: FnOnce(&mut MemoryState)>(&self, f: F) {
        let mut state = self.state.lock().await;
        f(&mut state);
    }

    pub async fn seed_product(&self, name: &str) -> Product {
        let mut state = self.state.lock().await;
        let id = state.next_id();
        let now = Utc::now();
        let product = Product {
            id,
            name: name.to_string(),
            slug: format!("product-{}", id),
            description: None,
            status: ProductStatus::Published,
            created_at: now,
            updated_at: now,
        };
        state.products.insert(id, product.clone());
        product
    }

    pub async fn seed_variation(&self, product_id: i64, price: i64, quantity: i32) -> ProductVariation {
        let mut state = self.state.lock().await;
        let id = state.next_id();
        let now = Utc::now();
        let variation = ProductVariation {
            id,
            product_id,
            sku: format!("SKU-{}", id),
            unit_price: BigDecimal::from(price),
            sales_price: BigDecimal::zero(),
            quantity,
            reserved_quantity: 0,
            created_at: now,
            updated_at: now,
        };
        state.variations.insert(id, variation.clone());
        variation
    }

    pub async fn seed_setting(&self, key: &str, value: serde_json::Value) {
        let mut state = self.state.lock().await;
        let id = state.next_id();
        state.settings.insert(
            id,
            Setting {
                id,
                key: key.to_string(),
                value,
                description: None,
                is_active: true,
            },
        );
    }

    pub async fn seed_wallet(&self, user_id: Uuid, balance: i64) {
        let mut state = self.state.lock().await;
        state.wallets.insert(
            user_id,
            Wallet {
                user_id,
                balance: BigDecimal::from(balance),
                updated_at: Utc::now(),
            },
        );
    }

    pub async fn variation(&self, variation_id: i64) -> ProductVariation {
        self.state.lock().await.variations[&variation_id].clone()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn begin(&self) -> AppResult<Box<dyn UnitOfWork>> {
        let guard = self.state.clone().lock_owned().await;
        let working = guard.clone();
        Ok(Box::new(MemoryUnitOfWork { guard, working }))
    }

    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }
}

pub struct MemoryUnitOfWork {
    guard: OwnedMutexGuard<MemoryState>,
    working: MemoryState,
}

#[async_trait]
impl UnitOfWork for MemoryUnitOfWork {
    async fn commit(self: Box<Self>) -> AppResult<()> {
        let MemoryUnitOfWork { mut guard, working } = *self;
        *guard = working;
        Ok(())
    }
}

fn not_found(what: &str, id: i64) -> AppError {
    AppError::NotFound(format!("{} {} tidak ditemukan", what, id))
}

fn paginate<T: Clone>(rows: Vec<T>, limit: i64, offset: i64) -> (Vec<T>, i64) {
    let total = rows.len() as i64;
    let page = rows
        .into_iter()
        .skip(offset.max(0) as usize)
        .take(limit.max(0) as usize)
        .collect();
    (page, total)
}

#[async_trait]
impl CatalogStore for MemoryUnitOfWork {
    async fn create_category(&mut self, category: &NewCategory) -> AppResult<Category> {
        let s = &mut self.working;
        if s.categories.values().any(|c| c.slug == category.slug) {
            return Err(AppError::Conflict("Data sudah ada (categories_slug_key)".into()));
        }
        let id = s.next_id();
        let row = Category {
            id,
            name: category.name.clone(),
            slug: category.slug.clone(),
            parent_id: category.parent_id,
            created_at: Utc::now(),
        };
        s.categories.insert(id, row.clone());
        Ok(row)
    }

    async fn list_categories(&mut self) -> AppResult<Vec<Category>> {
        let mut rows: Vec<_> = self.working.categories.values().cloned().collect();
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(rows)
    }

    async fn create_attribute(&mut self, name: &str) -> AppResult<Attribute> {
        let s = &mut self.working;
        let id = s.next_id();
        let row = Attribute { id, name: name.to_string(), created_at: Utc::now() };
        s.attributes.insert(id, row.clone());
        Ok(row)
    }

    async fn list_attributes(&mut self) -> AppResult<Vec<Attribute>> {
        let mut rows: Vec<_> = self.working.attributes.values().cloned().collect();
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(rows)
    }

    async fn create_product(&mut self, product: &NewProduct) -> AppResult<Product> {
        let s = &mut self.working;
        if s.products.values().any(|p| p.slug == product.slug) {
            return Err(AppError::Conflict("Data sudah ada (products_slug_key)".into()));
        }
        let id = s.next_id();
        let now = Utc::now();
        let row = Product {
            id,
            name: product.name.clone(),
            slug: product.slug.clone(),
            description: product.description.clone(),
            status: product.status,
            created_at: now,
            updated_at: now,
        };
        s.products.insert(id, row.clone());
        for category_id in &product.category_ids {
            s.product_categories.push((id, *category_id));
        }
        for attribute in &product.attributes {
            s.product_attributes.push((id, attribute.clone()));
        }
        Ok(row)
    }

    async fn get_product(&mut self, product_id: i64) -> AppResult<Option<Product>> {
        Ok(self.working.products.get(&product_id).cloned())
    }

    async fn get_products(&mut self, product_ids: &[i64]) -> AppResult<Vec<Product>> {
        Ok(product_ids
            .iter()
            .filter_map(|id| self.working.products.get(id).cloned())
            .collect())
    }

    async fn list_products(&mut self, limit: i64, offset: i64) -> AppResult<(Vec<Product>, i64)> {
        let rows: Vec<_> = self.working.products.values().rev().cloned().collect();
        Ok(paginate(rows, limit, offset))
    }

    async fn product_category_ids(&mut self, product_id: i64) -> AppResult<Vec<i64>> {
        let mut ids: Vec<i64> = self
            .working
            .product_categories
            .iter()
            .filter(|(p, _)| *p == product_id)
            .map(|(_, c)| *c)
            .collect();
        ids.sort_unstable();
        Ok(ids)
    }

    async fn product_attributes(&mut self, product_id: i64) -> AppResult<Vec<ProductAttributeValue>> {
        Ok(self
            .working
            .product_attributes
            .iter()
            .filter(|(p, _)| *p == product_id)
            .map(|(_, a)| a.clone())
            .collect())
    }

    async fn create_variation(&mut self, variation: &NewVariation) -> AppResult<ProductVariation> {
        let s = &mut self.working;
        if s.variations.values().any(|v| v.sku == variation.sku) {
            return Err(AppError::Conflict("Data sudah ada (product_variations_sku_key)".into()));
        }
        let id = s.next_id();
        let now = Utc::now();
        let row = ProductVariation {
            id,
            product_id: variation.product_id,
            sku: variation.sku.clone(),
            unit_price: variation.unit_price.clone(),
            sales_price: variation.sales_price.clone(),
            quantity: variation.quantity,
            reserved_quantity: 0,
            created_at: now,
            updated_at: now,
        };
        s.variations.insert(id, row.clone());
        Ok(row)
    }

    async fn update_variation(
        &mut self,
        variation_id: i64,
        update: &VariationUpdate,
    ) -> AppResult<Option<ProductVariation>> {
        let Some(variation) = self.working.variations.get_mut(&variation_id) else {
            return Ok(None);
        };
        if let Some(price) = &update.unit_price {
            variation.unit_price = price.clone();
        }
        if let Some(price) = &update.sales_price {
            variation.sales_price = price.clone();
        }
        if let Some(quantity) = update.quantity {
            variation.quantity = quantity;
        }
        variation.updated_at = Utc::now();
        Ok(Some(variation.clone()))
    }

    async fn get_variation(&mut self, variation_id: i64) -> AppResult<Option<ProductVariation>> {
        Ok(self.working.variations.get(&variation_id).cloned())
    }

    async fn get_variations(&mut self, variation_ids: &[i64]) -> AppResult<Vec<ProductVariation>> {
        Ok(variation_ids
            .iter()
            .filter_map(|id| self.working.variations.get(id).cloned())
            .collect())
    }

    async fn list_variations(&mut self, product_id: i64) -> AppResult<Vec<ProductVariation>> {
        Ok(self
            .working
            .variations
            .values()
            .filter(|v| v.product_id == product_id)
            .cloned()
            .collect())
    }

    async fn reserve_stock(&mut self, variation_id: i64, qty: i32) -> AppResult<bool> {
        match self.working.variations.get_mut(&variation_id) {
            Some(v) if v.quantity >= qty => {
                v.quantity -= qty;
                v.reserved_quantity += qty;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn finalize_stock(&mut self, variation_id: i64, qty: i32) -> AppResult<bool> {
        match self.working.variations.get_mut(&variation_id) {
            Some(v) if v.reserved_quantity >= qty => {
                v.reserved_quantity -= qty;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn release_stock(&mut self, variation_id: i64, qty: i32) -> AppResult<bool> {
        match self.working.variations.get_mut(&variation_id) {
            Some(v) if v.reserved_quantity >= qty => {
                v.reserved_quantity -= qty;
                v.quantity += qty;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn restock(&mut self, variation_id: i64, qty: i32) -> AppResult<bool> {
        match self.working.variations.get_mut(&variation_id) {
            Some(v) => {
                v.quantity += qty;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl CartStore for MemoryUnitOfWork {
    async fn find_cart(&mut self, user_id: Uuid) -> AppResult<Option<Cart>> {
        Ok(self.working.carts.values().find(|c| c.user_id == user_id).cloned())
    }

    async fn get_or_create_cart(&mut self, user_id: Uuid) -> AppResult<Cart> {
        if let Some(cart) = self.find_cart(user_id).await? {
            return Ok(cart);
        }
        let s = &mut self.working;
        let id = s.next_id();
        let now = Utc::now();
        let cart = Cart {
            id,
            user_id,
            total_amount: BigDecimal::zero(),
            created_at: now,
            updated_at: now,
        };
        s.carts.insert(id, cart.clone());
        Ok(cart)
    }

    async fn cart_items(&mut self, cart_id: i64) -> AppResult<Vec<CartItem>> {
        Ok(self
            .working
            .cart_items
            .values()
            .filter(|i| i.cart_id == cart_id)
            .cloned()
            .collect())
    }

    async fn find_cart_item(&mut self, cart_id: i64, item_id: i64) -> AppResult<Option<CartItem>> {
        Ok(self
            .working
            .cart_items
            .get(&item_id)
            .filter(|i| i.cart_id == cart_id)
            .cloned())
    }

    async fn find_cart_item_by_variation(
        &mut self,
        cart_id: i64,
        variation_id: i64,
    ) -> AppResult<Option<CartItem>> {
        Ok(self
            .working
            .cart_items
            .values()
            .find(|i| i.cart_id == cart_id && i.variation_id == variation_id)
            .cloned())
    }

    async fn insert_cart_item(&mut self, item: &NewCartItem) -> AppResult<CartItem> {
        let s = &mut self.working;
        if s.cart_items
            .values()
            .any(|i| i.cart_id == item.cart_id && i.variation_id == item.variation_id)
        {
            return Err(AppError::Conflict("Data sudah ada (cart_items_cart_id_variation_id_key)".into()));
        }
        let id = s.next_id();
        let row = CartItem {
            id,
            cart_id: item.cart_id,
            variation_id: item.variation_id,
            quantity: item.quantity,
            unit_price: item.unit_price.clone(),
            total_price: item.total_price.clone(),
        };
        s.cart_items.insert(id, row.clone());
        Ok(row)
    }

    async fn update_cart_item(
        &mut self,
        item_id: i64,
        quantity: i32,
        total_price: &BigDecimal,
    ) -> AppResult<CartItem> {
        let item = self
            .working
            .cart_items
            .get_mut(&item_id)
            .ok_or_else(|| not_found("Cart item", item_id))?;
        item.quantity = quantity;
        item.total_price = total_price.clone();
        Ok(item.clone())
    }

    async fn delete_cart_item(&mut self, item_id: i64) -> AppResult<()> {
        self.working.cart_items.remove(&item_id);
        Ok(())
    }

    async fn clear_cart_items(&mut self, cart_id: i64) -> AppResult<()> {
        self.working.cart_items.retain(|_, i| i.cart_id != cart_id);
        Ok(())
    }

    async fn refresh_cart_total(&mut self, cart_id: i64) -> AppResult<BigDecimal> {
        let total = self
            .working
            .cart_items
            .values()
            .filter(|i| i.cart_id == cart_id)
            .fold(BigDecimal::zero(), |acc, i| acc + &i.total_price);
        let cart = self
            .working
            .carts
            .get_mut(&cart_id)
            .ok_or_else(|| not_found("Cart", cart_id))?;
        cart.total_amount = total.clone();
        cart.updated_at = Utc::now();
        Ok(total)
    }
}

#[async_trait]
impl OrderStore for MemoryUnitOfWork {
    async fn lock_pending_order(&mut self, customer_id: Uuid) -> AppResult<Option<Order>> {
        Ok(self
            .working
            .orders
            .values()
            .find(|o| o.customer_id == customer_id && o.status == OrderStatus::Pending)
            .cloned())
    }

    async fn insert_order(&mut self, draft: &OrderDraft) -> AppResult<Order> {
        let s = &mut self.working;
        if s.orders
            .values()
            .any(|o| o.customer_id == draft.customer_id && o.status == OrderStatus::Pending)
        {
            return Err(AppError::Conflict("Data sudah ada (uq_orders_one_pending_per_customer)".into()));
        }
        let id = s.next_id();
        let now = Utc::now();
        let order = Order {
            id,
            customer_id: draft.customer_id,
            address_id: draft.address_id,
            shipping_id: draft.shipping_id,
            payment_method_id: draft.payment_method_id,
            shipping_cost: draft.totals.shipping_cost.clone(),
            tax_amount: draft.totals.tax_amount.clone(),
            order_total: draft.totals.order_total.clone(),
            final_price: draft.totals.final_price.clone(),
            status: OrderStatus::Pending,
            created_at: now,
            updated_at: now,
        };
        s.orders.insert(id, order.clone());
        Ok(order)
    }

    async fn update_order_totals(&mut self, order_id: i64, draft: &OrderDraft) -> AppResult<Order> {
        let order = self
            .working
            .orders
            .get_mut(&order_id)
            .ok_or_else(|| not_found("Order", order_id))?;
        order.address_id = draft.address_id;
        order.shipping_id = draft.shipping_id;
        order.payment_method_id = draft.payment_method_id;
        order.shipping_cost = draft.totals.shipping_cost.clone();
        order.tax_amount = draft.totals.tax_amount.clone();
        order.order_total = draft.totals.order_total.clone();
        order.final_price = draft.totals.final_price.clone();
        order.updated_at = Utc::now();
        Ok(order.clone())
    }

    async fn get_order(&mut self, order_id: i64) -> AppResult<Option<Order>> {
        Ok(self.working.orders.get(&order_id).cloned())
    }

    async fn lock_order(&mut self, order_id: i64) -> AppResult<Option<Order>> {
        Ok(self.working.orders.get(&order_id).cloned())
    }

    async fn list_orders(
        &mut self,
        filter: &OrderFilter,
        limit: i64,
        offset: i64,
    ) -> AppResult<(Vec<OrderSummary>, i64)> {
        let rows: Vec<OrderSummary> = self
            .working
            .orders
            .values()
            .rev()
            .filter(|o| filter.customer_id.map_or(true, |c| o.customer_id == c))
            .filter(|o| filter.status.map_or(true, |s| o.status == s))
            .map(|o| OrderSummary {
                order: o.clone(),
                items_count: self
                    .working
                    .order_items
                    .values()
                    .filter(|i| i.order_id == o.id)
                    .count() as i64,
            })
            .collect();
        Ok(paginate(rows, limit, offset))
    }

    async fn set_order_status(&mut self, order_id: i64, status: OrderStatus) -> AppResult<Order> {
        let order = self
            .working
            .orders
            .get_mut(&order_id)
            .ok_or_else(|| not_found("Order", order_id))?;
        order.status = status;
        order.updated_at = Utc::now();
        Ok(order.clone())
    }

    async fn delete_order(&mut self, order_id: i64) -> AppResult<()> {
        let s = &mut self.working;
        if s.transactions.values().any(|t| t.order_id == Some(order_id)) {
            return Err(AppError::Database(
                "violates foreign key constraint transactions_order_id_fkey".into(),
            ));
        }
        s.orders.remove(&order_id);
        s.order_items.retain(|_, i| i.order_id != order_id);
        Ok(())
    }

    async fn stale_pending_order_ids(&mut self, cutoff: DateTime<Utc>) -> AppResult<Vec<i64>> {
        Ok(self
            .working
            .orders
            .values()
            .filter(|o| o.status == OrderStatus::Pending && o.created_at < cutoff)
            .map(|o| o.id)
            .collect())
    }

    async fn order_items(&mut self, order_id: i64) -> AppResult<Vec<OrderItem>> {
        Ok(self
            .working
            .order_items
            .values()
            .filter(|i| i.order_id == order_id)
            .cloned()
            .collect())
    }

    async fn insert_order_item(&mut self, item: &NewOrderItem) -> AppResult<OrderItem> {
        let s = &mut self.working;
        let id = s.next_id();
        let row = OrderItem {
            id,
            order_id: item.order_id,
            product_id: item.product_id,
            product_name: item.product_name.clone(),
            product_metadata: item.product_metadata.clone(),
            quantity: item.quantity,
            unit_price: item.unit_price.clone(),
            total_price: item.total_price.clone(),
        };
        s.order_items.insert(id, row.clone());
        Ok(row)
    }

    async fn delete_order_items(&mut self, order_id: i64) -> AppResult<()> {
        self.working.order_items.retain(|_, i| i.order_id != order_id);
        Ok(())
    }
}

#[async_trait]
impl TransactionStore for MemoryUnitOfWork {
    async fn insert_transaction(&mut self, transaction: &NewTransaction) -> AppResult<Transaction> {
        let s = &mut self.working;
        let id = s.next_id();
        let now = Utc::now();
        let row = Transaction {
            id,
            order_id: transaction.order_id,
            user_id: transaction.user_id,
            payment_method_id: transaction.payment_method_id,
            transaction_type: transaction.transaction_type,
            description: transaction.description.clone(),
            amount: transaction.amount.clone(),
            status: TransactionStatus::Pending,
            res_number: None,
            ref_id: None,
            fee: None,
            fee_type: None,
            portal_in: None,
            portal_out: None,
            created_at: now,
            updated_at: now,
        };
        s.transactions.insert(id, row.clone());
        Ok(row)
    }

    async fn get_transaction(&mut self, transaction_id: i64) -> AppResult<Option<Transaction>> {
        Ok(self.working.transactions.get(&transaction_id).cloned())
    }

    async fn lock_transaction(&mut self, transaction_id: i64) -> AppResult<Option<Transaction>> {
        Ok(self.working.transactions.get(&transaction_id).cloned())
    }

    async fn find_transaction_by_res_number(&mut self, res_number: &str) -> AppResult<Option<Transaction>> {
        Ok(self
            .working
            .transactions
            .values()
            .find(|t| t.res_number.as_deref() == Some(res_number))
            .cloned())
    }

    async fn list_transactions(
        &mut self,
        user_id: Option<Uuid>,
        limit: i64,
        offset: i64,
    ) -> AppResult<(Vec<Transaction>, i64)> {
        let rows: Vec<_> = self
            .working
            .transactions
            .values()
            .rev()
            .filter(|t| user_id.map_or(true, |u| t.user_id == u))
            .cloned()
            .collect();
        Ok(paginate(rows, limit, offset))
    }

    async fn order_transactions(&mut self, order_id: i64) -> AppResult<Vec<Transaction>> {
        Ok(self
            .working
            .transactions
            .values()
            .filter(|t| t.order_id == Some(order_id))
            .cloned()
            .collect())
    }

    async fn update_transaction_details(
        &mut self,
        transaction_id: i64,
        payment_method_id: Option<i64>,
        description: Option<String>,
    ) -> AppResult<Transaction> {
        let row = self
            .working
            .transactions
            .get_mut(&transaction_id)
            .ok_or_else(|| not_found("Transaction", transaction_id))?;
        if payment_method_id.is_some() {
            row.payment_method_id = payment_method_id;
        }
        if let Some(description) = description {
            row.description = description;
        }
        row.updated_at = Utc::now();
        Ok(row.clone())
    }

    async fn mark_transaction_initiated(
        &mut self,
        transaction_id: i64,
        res_number: &str,
        portal_in: DateTime<Utc>,
    ) -> AppResult<Transaction> {
        let s = &mut self.working;
        if s.transactions
            .values()
            .any(|t| t.id != transaction_id && t.res_number.as_deref() == Some(res_number))
        {
            return Err(AppError::Conflict("Data sudah ada (transactions_res_number_key)".into()));
        }
        let row = s
            .transactions
            .get_mut(&transaction_id)
            .ok_or_else(|| not_found("Transaction", transaction_id))?;
        row.res_number = Some(res_number.to_string());
        row.portal_in = Some(portal_in);
        row.updated_at = Utc::now();
        Ok(row.clone())
    }

    async fn settle_transaction(
        &mut self,
        transaction_id: i64,
        settlement: &TransactionSettlement,
    ) -> AppResult<Transaction> {
        let row = self
            .working
            .transactions
            .get_mut(&transaction_id)
            .ok_or_else(|| not_found("Transaction", transaction_id))?;
        row.status = settlement.status;
        row.ref_id = settlement.ref_id;
        row.fee = settlement.fee;
        row.fee_type = settlement.fee_type.clone();
        row.portal_out = Some(settlement.portal_out);
        row.updated_at = Utc::now();
        Ok(row.clone())
    }

    async fn delete_transaction(&mut self, transaction_id: i64) -> AppResult<()> {
        self.working.transactions.remove(&transaction_id);
        Ok(())
    }
}

#[async_trait]
impl WalletStore for MemoryUnitOfWork {
    async fn get_wallet(&mut self, user_id: Uuid) -> AppResult<Option<Wallet>> {
        Ok(self.working.wallets.get(&user_id).cloned())
    }

    async fn credit_wallet(&mut self, user_id: Uuid, amount: &BigDecimal) -> AppResult<Wallet> {
        let wallet = self.working.wallets.entry(user_id).or_insert_with(|| Wallet {
            user_id,
            balance: BigDecimal::zero(),
            updated_at: Utc::now(),
        });
        wallet.balance = &wallet.balance + amount;
        wallet.updated_at = Utc::now();
        Ok(wallet.clone())
    }

    async fn debit_wallet(&mut self, user_id: Uuid, amount: &BigDecimal) -> AppResult<bool> {
        match self.working.wallets.get_mut(&user_id) {
            Some(wallet) if &wallet.balance >= amount => {
                wallet.balance = &wallet.balance - amount;
                wallet.updated_at = Utc::now();
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

#[async_trait]
impl SettingStore for MemoryUnitOfWork {
    async fn list_settings(&mut self) -> AppResult<Vec<Setting>> {
        let mut rows: Vec<_> = self.working.settings.values().cloned().collect();
        rows.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(rows)
    }

    async fn active_settings(&mut self) -> AppResult<Vec<Setting>> {
        let rows = self.list_settings().await?;
        Ok(rows.into_iter().filter(|s| s.is_active).collect())
    }

    async fn get_setting(&mut self, setting_id: i64) -> AppResult<Option<Setting>> {
        Ok(self.working.settings.get(&setting_id).cloned())
    }

    async fn insert_setting(&mut self, setting: &NewSetting) -> AppResult<Setting> {
        let s = &mut self.working;
        if s.settings.values().any(|x| x.key == setting.key) {
            return Err(AppError::Conflict("Data sudah ada (settings_key_key)".into()));
        }
        let id = s.next_id();
        let row = Setting {
            id,
            key: setting.key.clone(),
            value: setting.value.clone(),
            description: setting.description.clone(),
            is_active: setting.is_active,
        };
        s.settings.insert(id, row.clone());
        Ok(row)
    }

    async fn update_setting(&mut self, setting_id: i64, setting: &NewSetting) -> AppResult<Option<Setting>> {
        let s = &mut self.working;
        if s.settings
            .values()
            .any(|x| x.id != setting_id && x.key == setting.key)
        {
            return Err(AppError::Conflict("Data sudah ada (settings_key_key)".into()));
        }
        let Some(row) = s.settings.get_mut(&setting_id) else {
            return Ok(None);
        };
        row.key = setting.key.clone();
        row.value = setting.value.clone();
        row.description = setting.description.clone();
        row.is_active = setting.is_active;
        Ok(Some(row.clone()))
    }

    async fn delete_setting(&mut self, setting_id: i64) -> AppResult<bool> {
        Ok(self.working.settings.remove(&setting_id).is_some())
    }
}

impl MemoryUnitOfWork {
    fn insert_areas(&mut self, method_id: i64, areas: &[NewShippingArea]) {
        for area in areas {
            let id = self.working.next_id();
            self.working.shipping_areas.insert(
                id,
                ShippingArea {
                    id,
                    shipping_method_id: method_id,
                    province_id: area.province_id,
                    city_id: area.city_id,
                    price: area.price.clone(),
                },
            );
        }
    }
}

#[async_trait]
impl ShippingStore for MemoryUnitOfWork {
    async fn list_shipping_methods(&mut self, active_only: bool) -> AppResult<Vec<ShippingMethod>> {
        Ok(self
            .working
            .shipping_methods
            .values()
            .filter(|m| !active_only || m.is_active)
            .cloned()
            .collect())
    }

    async fn get_shipping_method(&mut self, method_id: i64) -> AppResult<Option<ShippingMethod>> {
        Ok(self.working.shipping_methods.get(&method_id).cloned())
    }

    async fn shipping_areas(&mut self, method_id: i64) -> AppResult<Vec<ShippingArea>> {
        Ok(self
            .working
            .shipping_areas
            .values()
            .filter(|a| a.shipping_method_id == method_id)
            .cloned()
            .collect())
    }

    async fn insert_shipping_method(&mut self, method: &NewShippingMethod) -> AppResult<ShippingMethod> {
        let id = self.working.next_id();
        let now = Utc::now();
        let row = ShippingMethod {
            id,
            name: method.name.clone(),
            description: method.description.clone(),
            base_cost: method.base_cost.clone(),
            estimated_days: method.estimated_days,
            is_active: method.is_active,
            created_at: now,
            updated_at: now,
        };
        self.working.shipping_methods.insert(id, row.clone());
        self.insert_areas(id, &method.areas);
        Ok(row)
    }

    async fn update_shipping_method(
        &mut self,
        method_id: i64,
        method: &NewShippingMethod,
    ) -> AppResult<Option<ShippingMethod>> {
        let Some(row) = self.working.shipping_methods.get_mut(&method_id) else {
            return Ok(None);
        };
        row.name = method.name.clone();
        row.description = method.description.clone();
        row.base_cost = method.base_cost.clone();
        row.estimated_days = method.estimated_days;
        row.is_active = method.is_active;
        row.updated_at = Utc::now();
        let updated = row.clone();

        self.working
            .shipping_areas
            .retain(|_, a| a.shipping_method_id != method_id);
        self.insert_areas(method_id, &method.areas);
        Ok(Some(updated))
    }

    async fn delete_shipping_method(&mut self, method_id: i64) -> AppResult<bool> {
        let removed = self.working.shipping_methods.remove(&method_id).is_some();
        self.working
            .shipping_areas
            .retain(|_, a| a.shipping_method_id != method_id);
        Ok(removed)
    }

    async fn area_price(
        &mut self,
        method_id: i64,
        province_id: i64,
        city_id: Option<i64>,
    ) -> AppResult<Option<BigDecimal>> {
        let areas: Vec<&ShippingArea> = self
            .working
            .shipping_areas
            .values()
            .filter(|a| a.shipping_method_id == method_id && a.province_id == province_id)
            .collect();

        let city_match = city_id.and_then(|city| areas.iter().find(|a| a.city_id == Some(city)));
        let province_match = areas.iter().find(|a| a.city_id.is_none());

        Ok(city_match.or(province_match).map(|a| a.price.clone()))
    }
}
