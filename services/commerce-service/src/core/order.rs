// /commerce/services/commerce-service/src/core/order.rs

use std::sync::Arc;

use bigdecimal::{BigDecimal, RoundingMode};
use chrono::{Duration, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::{cart, inventory, settings::ShopSettings, shipping, strategy};
use crate::{
    models::*,
    repository::{Store, UnitOfWork},
    utils::{
        constants::DEFAULT_PAYMENT_WINDOW_MINUTES,
        error::{AppError, AppResult},
    },
};

/// Hitung total order. Tax dibulatkan ke satuan penuh (half up).
pub fn price_order(subtotal: &BigDecimal, tax_percent: &BigDecimal, shipping_cost: &BigDecimal) -> OrderTotals {
    let tax_amount = (subtotal * tax_percent / BigDecimal::from(100)).with_scale_round(0, RoundingMode::HalfUp);
    let final_price = subtotal + shipping_cost + &tax_amount;

    OrderTotals {
        order_total: subtotal.clone(),
        tax_amount,
        shipping_cost: shipping_cost.clone(),
        final_price,
    }
}

/// Hasil satu kali sweep pending orders
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SweepReport {
    pub examined: u64,
    pub deleted: u64,
    pub canceled: u64,
    pub skipped: u64,
    pub failed: u64,
}

enum SweepAction {
    Deleted,
    Canceled,
    Skipped,
}

pub struct OrderService {
    store: Arc<dyn Store>,
    payment_window: Duration,
}

impl OrderService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            store,
            payment_window: Duration::minutes(DEFAULT_PAYMENT_WINDOW_MINUTES),
        }
    }

    /// Payment gateway tanpa callback lebih lama dari ini dianggap abandoned
    pub fn with_payment_window(mut self, window: Duration) -> Self {
        self.payment_window = window;
        self
    }

    /// Checkout: buat order baru atau overwrite order PENDING yang sudah ada
    pub async fn checkout(&self, user_id: Uuid, request: CheckoutRequest) -> AppResult<OrderWithItems> {
        self.upsert(user_id, request, false).await
    }

    /// Seperti checkout, tapi order PENDING harus sudah ada
    pub async fn update(&self, user_id: Uuid, request: CheckoutRequest) -> AppResult<OrderWithItems> {
        self.upsert(user_id, request, true).await
    }

    async fn upsert(
        &self,
        user_id: Uuid,
        request: CheckoutRequest,
        require_existing: bool,
    ) -> AppResult<OrderWithItems> {
        let mut uow = self.store.begin().await?;

        let existing = uow.lock_pending_order(user_id).await?;
        if existing.is_none() && require_existing {
            return Err(AppError::NotFound("Pending order tidak ditemukan".to_string()));
        }

        // Reservasi lama dikembalikan dulu supaya cart divalidasi terhadap stock penuh
        if let Some(order) = &existing {
            strategy::expire_abandoned_payments(uow.as_mut(), order.id, self.payment_window).await?;
            Self::release_items(uow.as_mut(), order.id).await?;
            uow.delete_order_items(order.id).await?;
        }

        let validated = cart::load_validated(uow.as_mut(), user_id).await?;
        let settings = ShopSettings::load(uow.as_mut()).await?;
        let shipping_cost =
            shipping::shipping_cost(uow.as_mut(), request.shipping_id, request.province_id, request.city_id)
                .await?;

        let draft = OrderDraft {
            customer_id: user_id,
            address_id: request.address_id,
            shipping_id: request.shipping_id,
            payment_method_id: request.payment_method_id,
            totals: price_order(&validated.subtotal(), &settings.tax_percent, &shipping_cost),
        };

        let order = match existing {
            Some(order) => uow.update_order_totals(order.id, &draft).await?,
            None => uow.insert_order(&draft).await?,
        };

        for line in &validated.lines {
            inventory::reserve(uow.as_mut(), line.variation.id, line.item.quantity).await?;
            uow.insert_order_item(&NewOrderItem {
                order_id: order.id,
                product_id: line.product.id,
                product_name: line.product.name.clone(),
                product_metadata: serde_json::json!({
                    "variation_id": line.variation.id,
                    "sku": line.variation.sku,
                }),
                quantity: line.item.quantity,
                unit_price: line.item.unit_price.clone(),
                total_price: line.item.total_price.clone(),
            })
            .await?;
        }

        let items = uow.order_items(order.id).await?;
        uow.commit().await?;

        tracing::info!(
            "Order {} checkout oleh user {}: {} item, final price {}",
            order.id,
            user_id,
            items.len(),
            order.final_price
        );
        Ok(OrderWithItems { order, items })
    }

    pub async fn get(&self, user: &CurrentUser, order_id: i64) -> AppResult<OrderWithItems> {
        let mut uow = self.store.begin().await?;
        let order = uow
            .get_order(order_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Order tidak ditemukan".to_string()))?;
        user.ensure_owner(order.customer_id)?;

        let items = uow.order_items(order.id).await?;
        Ok(OrderWithItems { order, items })
    }

    pub async fn list(
        &self,
        filter: &OrderFilter,
        limit: i64,
        offset: i64,
    ) -> AppResult<(Vec<OrderSummary>, i64)> {
        let mut uow = self.store.begin().await?;
        uow.list_orders(filter, limit, offset).await
    }

    /// Cancel oleh customer, hanya order PENDING yang belum dibayar
    pub async fn cancel(&self, user: &CurrentUser, order_id: i64) -> AppResult<Order> {
        let mut uow = self.store.begin().await?;
        let order = uow
            .lock_order(order_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Order tidak ditemukan".to_string()))?;
        user.ensure_owner(order.customer_id)?;

        if order.status != OrderStatus::Pending {
            return Err(AppError::InvalidTransition {
                entity: "order",
                from: order.status.as_str(),
                to: OrderStatus::Canceled.as_str(),
            });
        }

        let canceled = self.cancel_pending(uow.as_mut(), &order).await?;
        uow.commit().await?;

        tracing::info!("Order {} dibatalkan", order.id);
        Ok(canceled)
    }

    /// Transisi status oleh admin (fulfilment)
    pub async fn set_status(&self, order_id: i64, status: OrderStatus) -> AppResult<Order> {
        let mut uow = self.store.begin().await?;
        let order = uow
            .lock_order(order_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Order tidak ditemukan".to_string()))?;
        let next = order.status.transition(status)?;

        let updated = match (order.status, next) {
            // PENDING -> PROCESSING hanya lewat settlement payment
            (OrderStatus::Pending, OrderStatus::Processing) => {
                return Err(AppError::InvalidTransition {
                    entity: "order",
                    from: order.status.as_str(),
                    to: next.as_str(),
                })
            }
            (OrderStatus::Pending, OrderStatus::Canceled) => self.cancel_pending(uow.as_mut(), &order).await?,
            (OrderStatus::Processing, OrderStatus::Canceled) => {
                for item in uow.order_items(order.id).await? {
                    inventory::restock(uow.as_mut(), item.variation_id()?, item.quantity).await?;
                }
                uow.set_order_status(order.id, next).await?
            }
            _ => uow.set_order_status(order.id, next).await?,
        };
        uow.commit().await?;

        tracing::info!(
            "Order {} status {} -> {}",
            order.id,
            order.status.as_str(),
            updated.status.as_str()
        );
        Ok(updated)
    }

    /// Bersihkan PENDING order yang lebih tua dari max_age.
    /// Idempotent, setiap order diproses di transaction sendiri.
    pub async fn sweep_stale_orders(&self, max_age: Duration) -> AppResult<SweepReport> {
        let cutoff = Utc::now() - max_age;
        let stale_ids = {
            let mut uow = self.store.begin().await?;
            uow.stale_pending_order_ids(cutoff).await?
        };

        let mut report = SweepReport::default();
        for order_id in stale_ids {
            report.examined += 1;
            match self.sweep_order(order_id).await {
                Ok(SweepAction::Deleted) => report.deleted += 1,
                Ok(SweepAction::Canceled) => report.canceled += 1,
                Ok(SweepAction::Skipped) => report.skipped += 1,
                Err(e) => {
                    tracing::warn!("Sweep order {} gagal: {}", order_id, e);
                    report.failed += 1;
                }
            }
        }

        if report.examined > 0 {
            tracing::info!("Order sweep selesai: {:?}", report);
        }
        Ok(report)
    }

    async fn sweep_order(&self, order_id: i64) -> AppResult<SweepAction> {
        let mut uow = self.store.begin().await?;
        let Some(order) = uow.lock_order(order_id).await? else {
            return Ok(SweepAction::Skipped);
        };
        if order.status != OrderStatus::Pending {
            return Ok(SweepAction::Skipped);
        }

        let now = Utc::now();
        let transactions = uow.order_transactions(order.id).await?;
        if transactions.iter().any(|t| t.is_awaiting_gateway(self.payment_window, now)) {
            tracing::debug!("Order {} dilewati, payment masih di gateway", order.id);
            return Ok(SweepAction::Skipped);
        }

        let action = if transactions.is_empty() {
            Self::release_items(uow.as_mut(), order.id).await?;
            uow.delete_order(order.id).await?;
            SweepAction::Deleted
        } else {
            // Transaction tidak pernah dihapus, jadi order cukup di-cancel
            self.cancel_pending(uow.as_mut(), &order).await?;
            SweepAction::Canceled
        };

        uow.commit().await?;
        Ok(action)
    }

    /// Release stock, batalkan transaction pending (termasuk yang abandoned di gateway), status CANCELED
    async fn cancel_pending(&self, uow: &mut dyn UnitOfWork, order: &Order) -> AppResult<Order> {
        let next = order.status.transition(OrderStatus::Canceled)?;

        strategy::expire_abandoned_payments(&mut *uow, order.id, self.payment_window).await?;
        let transactions = uow.order_transactions(order.id).await?;

        Self::release_items(&mut *uow, order.id).await?;

        for transaction in transactions.iter().filter(|t| t.status == TransactionStatus::Pending) {
            let status = transaction.status.transition(TransactionStatus::Canceled)?;
            uow.settle_transaction(
                transaction.id,
                &TransactionSettlement {
                    status,
                    ref_id: None,
                    fee: None,
                    fee_type: None,
                    portal_out: Utc::now(),
                },
            )
            .await?;
        }

        uow.set_order_status(order.id, next).await
    }

    async fn release_items(uow: &mut dyn UnitOfWork, order_id: i64) -> AppResult<()> {
        for item in uow.order_items(order_id).await? {
            inventory::release(&mut *uow, item.variation_id()?, item.quantity).await?;
        }
        Ok(())
    }
}
