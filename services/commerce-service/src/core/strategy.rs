// /commerce/services/commerce-service/src/core/strategy.rs
// Payment strategies, dipilih lewat PaymentRegistry berdasarkan PaymentMethodCode

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};

use super::gateway::{PaymentGateway, PaymentInitiation};
use super::inventory;
use crate::{
    models::*,
    repository::UnitOfWork,
    utils::error::{AppError, AppResult},
};

/// Satu cara bayar, dua tahap:
/// `prepare` bicara ke provider luar tanpa unit of work terbuka,
/// `apply` menulis hasilnya di unit of work milik caller (row transaction sudah di-lock).
#[async_trait]
pub trait PaymentStrategy: Send + Sync {
    fn code(&self) -> PaymentMethodCode;

    async fn prepare(&self, _transaction: &Transaction) -> AppResult<Option<PaymentInitiation>> {
        Ok(None)
    }

    async fn apply(
        &self,
        uow: &mut dyn UnitOfWork,
        transaction: &Transaction,
        prepared: Option<PaymentInitiation>,
    ) -> AppResult<PaymentOutcome>;
}

/// Redirect ke payment gateway, transaction tetap pending sampai verify
pub struct OnlineStrategy {
    gateway: Arc<dyn PaymentGateway>,
}

impl OnlineStrategy {
    pub fn new(gateway: Arc<dyn PaymentGateway>) -> Self {
        Self { gateway }
    }
}

#[async_trait]
impl PaymentStrategy for OnlineStrategy {
    fn code(&self) -> PaymentMethodCode {
        PaymentMethodCode::Online
    }

    async fn prepare(&self, transaction: &Transaction) -> AppResult<Option<PaymentInitiation>> {
        let description = if transaction.description.is_empty() {
            format!("Transaction #{}", transaction.id)
        } else {
            transaction.description.clone()
        };

        let initiation = self.gateway.initiate(&transaction.amount, &description).await?;
        Ok(Some(initiation))
    }

    async fn apply(
        &self,
        uow: &mut dyn UnitOfWork,
        transaction: &Transaction,
        prepared: Option<PaymentInitiation>,
    ) -> AppResult<PaymentOutcome> {
        let initiation = prepared.ok_or_else(|| {
            AppError::Internal(format!("Transaction {} belum di-initiate ke gateway", transaction.id))
        })?;
        let updated = uow
            .mark_transaction_initiated(transaction.id, &initiation.reference, Utc::now())
            .await?;

        Ok(PaymentOutcome {
            transaction_id: updated.id,
            method: self.code(),
            status: updated.status,
            res_number: updated.res_number,
            payment_url: Some(initiation.payment_url),
        })
    }
}

/// Bayar dari saldo wallet, langsung settle
pub struct WalletStrategy;

#[async_trait]
impl PaymentStrategy for WalletStrategy {
    fn code(&self) -> PaymentMethodCode {
        PaymentMethodCode::Wallet
    }

    async fn apply(
        &self,
        uow: &mut dyn UnitOfWork,
        transaction: &Transaction,
        _prepared: Option<PaymentInitiation>,
    ) -> AppResult<PaymentOutcome> {
        if transaction.transaction_type == TransactionType::WalletDeposit {
            return Err(AppError::UnsupportedPaymentMethod(
                "wallet tidak bisa dipakai untuk deposit".to_string(),
            ));
        }

        if !uow.debit_wallet(transaction.user_id, &transaction.amount).await? {
            let balance = uow
                .get_wallet(transaction.user_id)
                .await?
                .map(|w| w.balance)
                .unwrap_or_default();
            return Err(AppError::InsufficientFunds {
                balance,
                required: transaction.amount.clone(),
            });
        }

        let settled = settle(
            uow,
            transaction,
            TransactionSettlement {
                status: TransactionStatus::Success,
                ref_id: None,
                fee: None,
                fee_type: None,
                portal_out: Utc::now(),
            },
        )
        .await?;

        Ok(PaymentOutcome {
            transaction_id: settled.id,
            method: self.code(),
            status: settled.status,
            res_number: settled.res_number,
            payment_url: None,
        })
    }
}

/// Simpan status akhir transaction dan jalankan side effect kalau success.
/// Caller wajib sudah lock row transaction.
pub async fn settle(
    uow: &mut dyn UnitOfWork,
    transaction: &Transaction,
    settlement: TransactionSettlement,
) -> AppResult<Transaction> {
    transaction.status.transition(settlement.status)?;

    let settled = uow.settle_transaction(transaction.id, &settlement).await?;
    if settled.status == TransactionStatus::Success {
        apply_success_side_effect(uow, &settled).await?;
    }

    tracing::info!(
        "Transaction {} ({}) settle: {}",
        settled.id,
        settled.transaction_type.as_str(),
        settled.status.as_str()
    );
    Ok(settled)
}

async fn apply_success_side_effect(uow: &mut dyn UnitOfWork, transaction: &Transaction) -> AppResult<()> {
    match transaction.transaction_type {
        TransactionType::WalletDeposit => {
            let wallet = uow.credit_wallet(transaction.user_id, &transaction.amount).await?;
            tracing::info!("Wallet {} credit {}, saldo {}", wallet.user_id, transaction.amount, wallet.balance);
        }
        // Saldo sudah di-debit oleh WalletStrategy
        TransactionType::WalletWithdraw => {}
        TransactionType::Order => {
            let order_id = transaction.order_id.ok_or_else(|| {
                AppError::Internal(format!("Transaction {} tidak punya order", transaction.id))
            })?;
            complete_order(uow, order_id).await?;
        }
    }
    Ok(())
}

/// Order sudah dibayar: stock reserved jadi terjual, order ke PROCESSING, cart dikosongkan
async fn complete_order(uow: &mut dyn UnitOfWork, order_id: i64) -> AppResult<()> {
    let order = uow
        .lock_order(order_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Order tidak ditemukan".to_string()))?;
    let next = order.status.transition(OrderStatus::Processing)?;

    for item in uow.order_items(order.id).await? {
        inventory::finalize(&mut *uow, item.variation_id()?, item.quantity).await?;
    }
    uow.set_order_status(order.id, next).await?;

    if let Some(cart) = uow.find_cart(order.customer_id).await? {
        uow.clear_cart_items(cart.id).await?;
        uow.refresh_cart_total(cart.id).await?;
    }

    tracing::info!("Order {} dibayar, status {}", order.id, next.as_str());
    Ok(())
}

/// Cancel payment order yang callback-nya tidak pernah datang dalam `window`.
/// Conflict kalau masih ada payment yang benar-benar ditunggu gateway.
/// Caller wajib sudah lock row order.
pub async fn expire_abandoned_payments(
    uow: &mut dyn UnitOfWork,
    order_id: i64,
    window: Duration,
) -> AppResult<()> {
    let now = Utc::now();
    let transactions = uow.order_transactions(order_id).await?;
    if transactions.iter().any(|t| t.is_awaiting_gateway(window, now)) {
        return Err(AppError::Conflict(
            "Payment order sedang diproses gateway, tunggu verifikasi".to_string(),
        ));
    }

    for abandoned in transactions.iter().filter(|t| t.is_abandoned(window, now)) {
        // Bisa saja verify menang duluan
        let Some(locked) = uow.lock_transaction(abandoned.id).await? else {
            continue;
        };
        if !locked.is_abandoned(window, now) {
            if locked.is_in_flight() {
                return Err(AppError::Conflict(
                    "Payment order sedang diproses gateway, tunggu verifikasi".to_string(),
                ));
            }
            continue;
        }

        tracing::warn!(
            "Transaction {} (res_number {:?}) abandoned di gateway, dibatalkan",
            locked.id,
            locked.res_number
        );
        settle(
            &mut *uow,
            &locked,
            TransactionSettlement {
                status: TransactionStatus::Canceled,
                ref_id: None,
                fee: None,
                fee_type: None,
                portal_out: now,
            },
        )
        .await?;
    }
    Ok(())
}

/// Registry strategy per kode payment method
pub struct PaymentRegistry {
    strategies: HashMap<PaymentMethodCode, Arc<dyn PaymentStrategy>>,
}

impl PaymentRegistry {
    pub fn new() -> Self {
        Self {
            strategies: HashMap::new(),
        }
    }

    /// Online via gateway dan wallet
    pub fn with_defaults(gateway: Arc<dyn PaymentGateway>) -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(OnlineStrategy::new(gateway)));
        registry.register(Arc::new(WalletStrategy));
        registry
    }

    pub fn register(&mut self, strategy: Arc<dyn PaymentStrategy>) {
        self.strategies.insert(strategy.code(), strategy);
    }

    pub fn get(&self, code: PaymentMethodCode) -> AppResult<Arc<dyn PaymentStrategy>> {
        self.strategies
            .get(&code)
            .cloned()
            .ok_or_else(|| AppError::UnsupportedPaymentMethod(code.as_str().to_string()))
    }
}

impl Default for PaymentRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_lookup() {
        let mut registry = PaymentRegistry::new();
        assert!(matches!(
            registry.get(PaymentMethodCode::Wallet),
            Err(AppError::UnsupportedPaymentMethod(_))
        ));

        registry.register(Arc::new(WalletStrategy));
        assert_eq!(
            registry.get(PaymentMethodCode::Wallet).unwrap().code(),
            PaymentMethodCode::Wallet
        );
        assert!(registry.get(PaymentMethodCode::Online).is_err());
    }
}
