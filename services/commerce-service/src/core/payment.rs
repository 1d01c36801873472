// /commerce/services/commerce-service/src/core/payment.rs

use std::sync::Arc;

use bigdecimal::{BigDecimal, Zero};
use chrono::{Duration, Utc};
use uuid::Uuid;

use super::{
    gateway::PaymentGateway,
    settings::ShopSettings,
    strategy::{self, PaymentRegistry},
};
use crate::{
    models::*,
    repository::{Store, UnitOfWork},
    utils::{
        constants::DEFAULT_PAYMENT_WINDOW_MINUTES,
        error::{AppError, AppResult},
        validator::{validate_positive_amount, validate_res_number, validate_whole_amount},
    },
};

/// Service untuk transaction: create, pay lewat strategy, verify callback gateway
pub struct PaymentService {
    store: Arc<dyn Store>,
    gateway: Arc<dyn PaymentGateway>,
    registry: PaymentRegistry,
    payment_window: Duration,
}

impl PaymentService {
    pub fn new(store: Arc<dyn Store>, gateway: Arc<dyn PaymentGateway>) -> Self {
        let registry = PaymentRegistry::with_defaults(gateway.clone());
        Self {
            store,
            gateway,
            registry,
            payment_window: Duration::minutes(DEFAULT_PAYMENT_WINDOW_MINUTES),
        }
    }

    /// Payment gateway tanpa callback lebih lama dari ini dianggap abandoned
    pub fn with_payment_window(mut self, window: Duration) -> Self {
        self.payment_window = window;
        self
    }

    pub async fn create(&self, user: &CurrentUser, request: CreateTransactionRequest) -> AppResult<Transaction> {
        let mut uow = self.store.begin().await?;

        let new_transaction = match request.transaction_type {
            TransactionType::Order => {
                let order_id = request
                    .order_id
                    .ok_or_else(|| AppError::BadRequest("order_id diperlukan untuk transaction order".to_string()))?;

                let order = uow
                    .lock_order(order_id)
                    .await?
                    .ok_or_else(|| AppError::NotFound("Order tidak ditemukan".to_string()))?;
                if order.customer_id != user.id {
                    return Err(AppError::Forbidden("Order bukan milik user ini".to_string()));
                }
                if order.status != OrderStatus::Pending {
                    return Err(AppError::Conflict(format!(
                        "Order {} tidak dalam status pending",
                        order.id
                    )));
                }
                strategy::expire_abandoned_payments(uow.as_mut(), order.id, self.payment_window).await?;

                NewTransaction {
                    order_id: Some(order.id),
                    user_id: user.id,
                    payment_method_id: request.payment_method_id.or(order.payment_method_id),
                    transaction_type: TransactionType::Order,
                    description: Self::description_or(request.description, || format!("Order #{}", order.id)),
                    amount: order.final_price,
                }
            }
            wallet_type => {
                if request.order_id.is_some() {
                    return Err(AppError::BadRequest(
                        "Transaction wallet tidak boleh punya order_id".to_string(),
                    ));
                }
                let amount = request
                    .amount
                    .ok_or_else(|| AppError::BadRequest("amount diperlukan".to_string()))?;
                validate_positive_amount(&amount, "amount")?;
                validate_whole_amount(&amount, "amount")?;

                NewTransaction {
                    order_id: None,
                    user_id: user.id,
                    payment_method_id: request.payment_method_id,
                    transaction_type: wallet_type,
                    description: Self::description_or(request.description, || {
                        wallet_type.as_str().replace('_', " ")
                    }),
                    amount,
                }
            }
        };

        let transaction = uow.insert_transaction(&new_transaction).await?;
        uow.commit().await?;

        tracing::info!(
            "Transaction {} ({}) dibuat untuk user {}, amount {}",
            transaction.id,
            transaction.transaction_type.as_str(),
            user.id,
            transaction.amount
        );
        Ok(transaction)
    }

    pub async fn get(&self, user: &CurrentUser, transaction_id: i64) -> AppResult<Transaction> {
        let mut uow = self.store.begin().await?;
        let transaction = Self::find(uow.as_mut(), transaction_id).await?;
        user.ensure_owner(transaction.user_id)?;
        Ok(transaction)
    }

    /// Admin lihat semua, customer hanya miliknya
    pub async fn list(&self, user: &CurrentUser, limit: i64, offset: i64) -> AppResult<(Vec<Transaction>, i64)> {
        let owner = if user.is_admin() { None } else { Some(user.id) };
        let mut uow = self.store.begin().await?;
        uow.list_transactions(owner, limit, offset).await
    }

    pub async fn update(
        &self,
        user: &CurrentUser,
        transaction_id: i64,
        request: UpdateTransactionRequest,
    ) -> AppResult<Transaction> {
        let mut uow = self.store.begin().await?;
        let transaction = Self::find_locked(uow.as_mut(), transaction_id).await?;
        user.ensure_owner(transaction.user_id)?;
        self.ensure_editable(&transaction)?;

        let updated = uow
            .update_transaction_details(transaction.id, request.payment_method_id, request.description)
            .await?;
        uow.commit().await?;
        Ok(updated)
    }

    pub async fn delete(&self, user: &CurrentUser, transaction_id: i64) -> AppResult<()> {
        let mut uow = self.store.begin().await?;
        let transaction = Self::find_locked(uow.as_mut(), transaction_id).await?;
        user.ensure_owner(transaction.user_id)?;

        if transaction.order_id.is_some() {
            return Err(AppError::Conflict(
                "Transaction yang terhubung ke order tidak bisa dihapus".to_string(),
            ));
        }
        self.ensure_editable(&transaction)?;

        uow.delete_transaction(transaction.id).await?;
        uow.commit().await?;

        tracing::info!("Transaction {} dihapus", transaction.id);
        Ok(())
    }

    /// Dispatch ke strategy sesuai payment method.
    /// Call ke gateway terjadi di antara dua unit of work, tidak ada row lock yang ditahan.
    pub async fn pay(&self, user: &CurrentUser, transaction_id: i64) -> AppResult<PaymentOutcome> {
        let (transaction, code) = {
            let mut uow = self.store.begin().await?;
            self.load_payable(uow.as_mut(), user, transaction_id).await?
        };
        let strategy = self.registry.get(code)?;

        let prepared = strategy.prepare(&transaction).await?;

        // Re-lock: request lain bisa sudah bayar / initiate selama call ke gateway
        let mut uow = self.store.begin().await?;
        let (locked, current_code) = self.load_payable(uow.as_mut(), user, transaction_id).await?;
        if current_code != code || locked.amount != transaction.amount || locked.res_number != transaction.res_number {
            return Err(AppError::Conflict(
                "Transaction berubah selama proses pembayaran, coba lagi".to_string(),
            ));
        }

        let outcome = strategy.apply(uow.as_mut(), &locked, prepared).await?;
        uow.commit().await?;

        tracing::info!(
            "Transaction {} dibayar via {}: {}",
            locked.id,
            code.as_str(),
            outcome.status.as_str()
        );
        Ok(outcome)
    }

    /// Callback gateway. Confirm pakai amount yang tersimpan, lalu settle di bawah row lock.
    /// Hanya pemilik transaction (atau admin) yang boleh verify.
    pub async fn verify(&self, user: &CurrentUser, request: VerifyTransactionRequest) -> AppResult<Transaction> {
        validate_res_number(&request.res_number)?;

        let transaction = {
            let mut uow = self.store.begin().await?;
            uow.find_transaction_by_res_number(&request.res_number)
                .await?
                .ok_or_else(|| AppError::NotFound("Transaction tidak ditemukan".to_string()))?
        };
        user.ensure_owner(transaction.user_id)?;
        Self::ensure_pending(&transaction)?;

        // Tidak ada lock yang ditahan selama call ke gateway
        let confirmation = self
            .gateway
            .confirm(&request.res_number, &transaction.amount, &request.status)
            .await?;

        let mut uow = self.store.begin().await?;
        let locked = Self::find_locked(uow.as_mut(), transaction.id).await?;
        Self::ensure_pending(&locked)?;
        if locked.res_number != transaction.res_number {
            return Err(AppError::Conflict(
                "Payment sudah di-initiate ulang, res_number tidak berlaku".to_string(),
            ));
        }

        let settled = strategy::settle(
            uow.as_mut(),
            &locked,
            TransactionSettlement {
                status: confirmation.status,
                ref_id: confirmation.ref_id,
                fee: confirmation.fee,
                fee_type: confirmation.fee_type,
                portal_out: Utc::now(),
            },
        )
        .await?;
        uow.commit().await?;

        Ok(settled)
    }

    /// Saldo wallet, 0 kalau belum pernah deposit
    pub async fn wallet(&self, user_id: Uuid) -> AppResult<Wallet> {
        let mut uow = self.store.begin().await?;
        Ok(uow.get_wallet(user_id).await?.unwrap_or_else(|| Wallet {
            user_id,
            balance: BigDecimal::zero(),
            updated_at: Utc::now(),
        }))
    }

    async fn find(uow: &mut dyn UnitOfWork, transaction_id: i64) -> AppResult<Transaction> {
        uow.get_transaction(transaction_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Transaction tidak ditemukan".to_string()))
    }

    async fn find_locked(uow: &mut dyn UnitOfWork, transaction_id: i64) -> AppResult<Transaction> {
        uow.lock_transaction(transaction_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Transaction tidak ditemukan".to_string()))
    }

    /// Lock transaction, cek kepemilikan dan status, tentukan strategy
    async fn load_payable(
        &self,
        uow: &mut dyn UnitOfWork,
        user: &CurrentUser,
        transaction_id: i64,
    ) -> AppResult<(Transaction, PaymentMethodCode)> {
        let transaction = Self::find_locked(&mut *uow, transaction_id).await?;
        if transaction.user_id != user.id {
            return Err(AppError::Forbidden("Transaction bukan milik user ini".to_string()));
        }
        self.ensure_editable(&transaction)?;

        let code = match transaction.transaction_type {
            TransactionType::WalletDeposit => PaymentMethodCode::Online,
            TransactionType::WalletWithdraw => PaymentMethodCode::Wallet,
            TransactionType::Order => {
                self.ensure_order_payable(&mut *uow, &transaction).await?;
                let payment_method_id = transaction
                    .payment_method_id
                    .ok_or_else(|| AppError::BadRequest("payment_method_id belum dipilih".to_string()))?;
                ShopSettings::load(&mut *uow)
                    .await?
                    .payment_method_code(payment_method_id)?
            }
        };
        Ok((transaction, code))
    }

    /// Order masih pending, total belum berubah, dan tidak ada payment lain yang ditunggu gateway
    async fn ensure_order_payable(&self, uow: &mut dyn UnitOfWork, transaction: &Transaction) -> AppResult<()> {
        let order_id = transaction
            .order_id
            .ok_or_else(|| AppError::Internal(format!("Transaction {} tidak punya order", transaction.id)))?;
        let order = uow
            .lock_order(order_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Order tidak ditemukan".to_string()))?;

        if order.status != OrderStatus::Pending {
            return Err(AppError::Conflict(format!(
                "Order {} tidak dalam status pending",
                order.id
            )));
        }
        if order.final_price != transaction.amount {
            return Err(AppError::Conflict(
                "Total order berubah setelah transaction dibuat, buat transaction baru".to_string(),
            ));
        }

        let now = Utc::now();
        if uow
            .order_transactions(order.id)
            .await?
            .iter()
            .any(|t| t.id != transaction.id && t.is_awaiting_gateway(self.payment_window, now))
        {
            return Err(AppError::Conflict("Payment order sedang diproses gateway".to_string()));
        }
        Ok(())
    }

    fn ensure_pending(transaction: &Transaction) -> AppResult<()> {
        if transaction.status != TransactionStatus::Pending {
            return Err(AppError::Conflict(format!(
                "Transaction {} sudah {}",
                transaction.id,
                transaction.status.as_str()
            )));
        }
        Ok(())
    }

    /// Pending dan tidak sedang ditunggu gateway (yang abandoned boleh diubah / dibayar ulang)
    fn ensure_editable(&self, transaction: &Transaction) -> AppResult<()> {
        Self::ensure_pending(transaction)?;
        if transaction.is_awaiting_gateway(self.payment_window, Utc::now()) {
            return Err(AppError::Conflict("Payment sedang diproses gateway".to_string()));
        }
        Ok(())
    }

    fn description_or(description: String, default: impl FnOnce() -> String) -> String {
        let trimmed = description.trim();
        if trimmed.is_empty() {
            default()
        } else {
            trimmed.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    use crate::core::{
        cart::CartService,
        gateway::{PaymentConfirmation, PaymentInitiation},
        order::OrderService,
    };
    use crate::repository::memory::MemoryStore;

    /// Gateway palsu yang mencatat amount yang dikirim
    #[derive(Default)]
    struct RecordingGateway {
        initiated: Mutex<Vec<BigDecimal>>,
        confirmed: Mutex<Vec<(String, BigDecimal)>>,
    }

    #[async_trait]
    impl PaymentGateway for RecordingGateway {
        async fn initiate(&self, amount: &BigDecimal, _description: &str) -> AppResult<PaymentInitiation> {
            let mut initiated = self.initiated.lock().unwrap();
            initiated.push(amount.clone());
            let reference = format!("AUTH-{}", initiated.len());
            Ok(PaymentInitiation {
                payment_url: format!("https://gateway.test/StartPay/{}", reference),
                reference,
            })
        }

        async fn confirm(
            &self,
            reference: &str,
            amount: &BigDecimal,
            provider_status: &str,
        ) -> AppResult<PaymentConfirmation> {
            self.confirmed
                .lock()
                .unwrap()
                .push((reference.to_string(), amount.clone()));
            let status = if provider_status == "OK" {
                TransactionStatus::Success
            } else {
                TransactionStatus::Canceled
            };
            Ok(PaymentConfirmation {
                status,
                ref_id: Some(555),
                fee: Some(10),
                fee_type: Some("Merchant".into()),
            })
        }
    }

    struct Fixture {
        store: MemoryStore,
        gateway: Arc<RecordingGateway>,
        payments: PaymentService,
        user: CurrentUser,
    }

    async fn fixture() -> Fixture {
        let store = MemoryStore::new();
        store
            .seed_setting("payment_methods", json!([{ "id": 1, "code": "online" }, { "id": 2, "code": "wallet" }]))
            .await;
        let gateway = Arc::new(RecordingGateway::default());
        let payments = PaymentService::new(Arc::new(store.clone()), gateway.clone());
        Fixture {
            store,
            gateway,
            payments,
            user: CurrentUser { id: Uuid::new_v4(), role: Role::Customer },
        }
    }

    /// Cart 2 x 1000 lalu checkout, return order id
    async fn checkout(f: &Fixture, payment_method_id: i64) -> (i64, i64) {
        let product = f.store.seed_product("Kaos").await;
        let variation = f.store.seed_variation(product.id, 1000, 5).await;

        CartService::new(Arc::new(f.store.clone()))
            .add_item(f.user.id, AddCartItemRequest { variation_id: variation.id, quantity: Some(2) })
            .await
            .unwrap();
        let order = OrderService::new(Arc::new(f.store.clone()))
            .checkout(
                f.user.id,
                CheckoutRequest {
                    payment_method_id: Some(payment_method_id),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        (order.order.id, variation.id)
    }

    fn order_request(order_id: i64) -> CreateTransactionRequest {
        CreateTransactionRequest {
            order_id: Some(order_id),
            payment_method_id: None,
            transaction_type: TransactionType::Order,
            description: String::new(),
            amount: None,
        }
    }

    fn wallet_request(transaction_type: TransactionType, amount: i64) -> CreateTransactionRequest {
        CreateTransactionRequest {
            order_id: None,
            payment_method_id: None,
            transaction_type,
            description: String::new(),
            amount: Some(BigDecimal::from(amount)),
        }
    }

    #[tokio::test]
    async fn test_online_order_payment_settles_order() {
        let f = fixture().await;
        let (order_id, variation_id) = checkout(&f, 1).await;

        let transaction = f.payments.create(&f.user, order_request(order_id)).await.unwrap();
        assert_eq!(transaction.amount, BigDecimal::from(2000));
        assert_eq!(transaction.description, format!("Order #{}", order_id));

        let outcome = f.payments.pay(&f.user, transaction.id).await.unwrap();
        assert_eq!(outcome.method, PaymentMethodCode::Online);
        assert_eq!(outcome.status, TransactionStatus::Pending);
        let reference = outcome.res_number.clone().unwrap();
        assert_eq!(
            outcome.payment_url.as_deref(),
            Some(format!("https://gateway.test/StartPay/{}", reference).as_str())
        );

        let settled = f
            .payments
            .verify(&f.user, VerifyTransactionRequest { res_number: reference.clone(), status: "OK".into() })
            .await
            .unwrap();
        assert_eq!(settled.status, TransactionStatus::Success);
        assert_eq!(settled.ref_id, Some(555));
        assert!(settled.portal_out.is_some());

        // confirm memakai amount yang sama dengan initiate
        let initiated = f.gateway.initiated.lock().unwrap().clone();
        let confirmed = f.gateway.confirmed.lock().unwrap().clone();
        assert_eq!(initiated, vec![BigDecimal::from(2000)]);
        assert_eq!(confirmed, vec![(reference.clone(), BigDecimal::from(2000))]);

        let state = f.store.snapshot().await;
        assert_eq!(state.orders[&order_id].status, OrderStatus::Processing);
        let variation = &state.variations[&variation_id];
        assert_eq!((variation.quantity, variation.reserved_quantity), (3, 0));
        assert!(state.cart_items.is_empty());

        // verify kedua ditolak, tidak ada settle dua kali
        assert!(matches!(
            f.payments
                .verify(&f.user, VerifyTransactionRequest { res_number: reference, status: "OK".into() })
                .await,
            Err(AppError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn test_canceled_at_gateway_keeps_reservation() {
        let f = fixture().await;
        let (order_id, variation_id) = checkout(&f, 1).await;
        let transaction = f.payments.create(&f.user, order_request(order_id)).await.unwrap();
        let outcome = f.payments.pay(&f.user, transaction.id).await.unwrap();

        let settled = f
            .payments
            .verify(&f.user, VerifyTransactionRequest {
                res_number: outcome.res_number.unwrap(),
                status: "NOK".into(),
            })
            .await
            .unwrap();
        assert_eq!(settled.status, TransactionStatus::Canceled);

        let state = f.store.snapshot().await;
        assert_eq!(state.orders[&order_id].status, OrderStatus::Pending);
        assert_eq!(state.variations[&variation_id].reserved_quantity, 2);
    }

    #[tokio::test]
    async fn test_wallet_insufficient_funds_changes_nothing() {
        let f = fixture().await;
        f.store.seed_wallet(f.user.id, 1000).await;

        let transaction = f
            .payments
            .create(&f.user, wallet_request(TransactionType::WalletWithdraw, 1500))
            .await
            .unwrap();

        let err = f.payments.pay(&f.user, transaction.id).await.unwrap_err();
        match err {
            AppError::InsufficientFunds { balance, required } => {
                assert_eq!(balance, BigDecimal::from(1000));
                assert_eq!(required, BigDecimal::from(1500));
            }
            other => panic!("expected insufficient funds, got {}", other),
        }

        let state = f.store.snapshot().await;
        assert_eq!(state.wallets[&f.user.id].balance, BigDecimal::from(1000));
        assert_eq!(state.transactions[&transaction.id].status, TransactionStatus::Pending);
    }

    #[tokio::test]
    async fn test_wallet_pays_order_synchronously() {
        let f = fixture().await;
        f.store.seed_wallet(f.user.id, 5000).await;
        let (order_id, variation_id) = checkout(&f, 2).await;

        let transaction = f.payments.create(&f.user, order_request(order_id)).await.unwrap();
        let outcome = f.payments.pay(&f.user, transaction.id).await.unwrap();
        assert_eq!(outcome.method, PaymentMethodCode::Wallet);
        assert_eq!(outcome.status, TransactionStatus::Success);
        assert!(outcome.payment_url.is_none());

        let state = f.store.snapshot().await;
        assert_eq!(state.wallets[&f.user.id].balance, BigDecimal::from(3000));
        assert_eq!(state.orders[&order_id].status, OrderStatus::Processing);
        assert_eq!(state.variations[&variation_id].reserved_quantity, 0);
        assert!(f.gateway.initiated.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_deposit_credits_wallet_after_verify() {
        let f = fixture().await;
        let transaction = f
            .payments
            .create(&f.user, wallet_request(TransactionType::WalletDeposit, 700))
            .await
            .unwrap();
        let outcome = f.payments.pay(&f.user, transaction.id).await.unwrap();
        assert_eq!(outcome.method, PaymentMethodCode::Online);

        f.payments
            .verify(&f.user, VerifyTransactionRequest {
                res_number: outcome.res_number.unwrap(),
                status: "OK".into(),
            })
            .await
            .unwrap();

        let wallet = f.payments.wallet(f.user.id).await.unwrap();
        assert_eq!(wallet.balance, BigDecimal::from(700));
    }

    #[tokio::test]
    async fn test_unknown_payment_method_rejected() {
        let f = fixture().await;
        let (order_id, _) = checkout(&f, 9).await;
        let transaction = f.payments.create(&f.user, order_request(order_id)).await.unwrap();

        assert!(matches!(
            f.payments.pay(&f.user, transaction.id).await,
            Err(AppError::UnsupportedPaymentMethod(_))
        ));
    }

    #[tokio::test]
    async fn test_create_validation_and_delete_rules() {
        let f = fixture().await;

        assert!(matches!(
            f.payments.create(&f.user, wallet_request(TransactionType::WalletDeposit, 0)).await,
            Err(AppError::BadRequest(_)) | Err(AppError::ValidationError(_))
        ));

        let (order_id, _) = checkout(&f, 1).await;
        let stranger = CurrentUser { id: Uuid::new_v4(), role: Role::Customer };
        assert!(matches!(
            f.payments.create(&stranger, order_request(order_id)).await,
            Err(AppError::Forbidden(_))
        ));

        let linked = f.payments.create(&f.user, order_request(order_id)).await.unwrap();
        assert!(matches!(
            f.payments.delete(&f.user, linked.id).await,
            Err(AppError::Conflict(_))
        ));

        let deposit = f
            .payments
            .create(&f.user, wallet_request(TransactionType::WalletDeposit, 100))
            .await
            .unwrap();
        let updated = f
            .payments
            .update(
                &f.user,
                deposit.id,
                UpdateTransactionRequest { payment_method_id: None, description: Some("Top up".into()) },
            )
            .await
            .unwrap();
        assert_eq!(updated.description, "Top up");

        f.payments.delete(&f.user, deposit.id).await.unwrap();
        assert!(matches!(
            f.payments.get(&f.user, deposit.id).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_verify_rejects_other_users_transaction() {
        let f = fixture().await;
        let (order_id, variation_id) = checkout(&f, 1).await;
        let transaction = f.payments.create(&f.user, order_request(order_id)).await.unwrap();
        let reference = f.payments.pay(&f.user, transaction.id).await.unwrap().res_number.unwrap();

        let stranger = CurrentUser { id: Uuid::new_v4(), role: Role::Customer };
        assert!(matches!(
            f.payments
                .verify(&stranger, VerifyTransactionRequest { res_number: reference.clone(), status: "NOK".into() })
                .await,
            Err(AppError::Forbidden(_))
        ));
        assert!(f.gateway.confirmed.lock().unwrap().is_empty());

        let state = f.store.snapshot().await;
        assert_eq!(state.transactions[&transaction.id].status, TransactionStatus::Pending);
        assert_eq!(state.orders[&order_id].status, OrderStatus::Pending);
        assert_eq!(state.variations[&variation_id].reserved_quantity, 2);

        // admin boleh meneruskan callback
        let admin = CurrentUser { id: Uuid::new_v4(), role: Role::Admin };
        let settled = f
            .payments
            .verify(&admin, VerifyTransactionRequest { res_number: reference, status: "OK".into() })
            .await
            .unwrap();
        assert_eq!(settled.status, TransactionStatus::Success);
    }

    #[tokio::test]
    async fn test_second_pay_while_awaiting_gateway_is_conflict() {
        let f = fixture().await;
        let (order_id, _) = checkout(&f, 1).await;
        let transaction = f.payments.create(&f.user, order_request(order_id)).await.unwrap();
        f.payments.pay(&f.user, transaction.id).await.unwrap();

        assert!(matches!(
            f.payments.pay(&f.user, transaction.id).await,
            Err(AppError::Conflict(_))
        ));
        assert!(matches!(
            f.payments.create(&f.user, order_request(order_id)).await,
            Err(AppError::Conflict(_))
        ));
        assert_eq!(f.gateway.initiated.lock().unwrap().len(), 1);
    }

    /// Gateway yang, saat initiate, menjalankan request lain yang sempat initiate duluan
    struct RacingGateway {
        store: MemoryStore,
        transaction_id: Mutex<Option<i64>>,
    }

    #[async_trait]
    impl PaymentGateway for RacingGateway {
        async fn initiate(&self, _amount: &BigDecimal, _description: &str) -> AppResult<PaymentInitiation> {
            let transaction_id = self.transaction_id.lock().unwrap().unwrap();

            // unit of work baru hanya bisa dibuka kalau pay tidak menahan lock
            let mut uow = tokio::time::timeout(std::time::Duration::from_secs(1), self.store.begin())
                .await
                .expect("pay menahan unit of work selama call ke gateway")
                .unwrap();
            uow.mark_transaction_initiated(transaction_id, "WINNER", Utc::now())
                .await
                .unwrap();
            uow.commit().await.unwrap();

            Ok(PaymentInitiation {
                reference: "LOSER".into(),
                payment_url: "https://gateway.test/StartPay/LOSER".into(),
            })
        }

        async fn confirm(&self, _reference: &str, _amount: &BigDecimal, _status: &str) -> AppResult<PaymentConfirmation> {
            Err(AppError::Internal("tidak dipakai".into()))
        }
    }

    #[tokio::test]
    async fn test_pay_does_not_hold_locks_during_gateway_call() {
        let f = fixture().await;
        let (order_id, _) = checkout(&f, 1).await;
        let transaction = f.payments.create(&f.user, order_request(order_id)).await.unwrap();

        let gateway = Arc::new(RacingGateway {
            store: f.store.clone(),
            transaction_id: Mutex::new(Some(transaction.id)),
        });
        let payments = PaymentService::new(Arc::new(f.store.clone()), gateway);

        assert!(matches!(
            payments.pay(&f.user, transaction.id).await,
            Err(AppError::Conflict(_))
        ));
        let state = f.store.snapshot().await;
        assert_eq!(state.transactions[&transaction.id].res_number.as_deref(), Some("WINNER"));
    }

    #[tokio::test]
    async fn test_abandoned_gateway_payment_can_be_retried() {
        let f = fixture().await;
        let payments = PaymentService::new(Arc::new(f.store.clone()), f.gateway.clone())
            .with_payment_window(Duration::minutes(30));
        let (order_id, variation_id) = checkout(&f, 1).await;
        let transaction = payments.create(&f.user, order_request(order_id)).await.unwrap();
        let first = payments.pay(&f.user, transaction.id).await.unwrap().res_number.unwrap();

        f.store
            .update(|s| {
                if let Some(t) = s.transactions.get_mut(&transaction.id) {
                    t.portal_in = Some(Utc::now() - Duration::hours(2));
                }
            })
            .await;

        // user kembali setelah window lewat: bayar ulang dengan reference baru
        let second = payments.pay(&f.user, transaction.id).await.unwrap().res_number.unwrap();
        assert_ne!(first, second);

        // callback lama sudah tidak berlaku
        assert!(matches!(
            payments
                .verify(&f.user, VerifyTransactionRequest { res_number: first, status: "OK".into() })
                .await,
            Err(AppError::NotFound(_))
        ));

        f.store
            .update(|s| {
                if let Some(t) = s.transactions.get_mut(&transaction.id) {
                    t.portal_in = Some(Utc::now() - Duration::hours(1));
                }
            })
            .await;

        // transaction baru untuk order yang sama membatalkan yang abandoned
        let retry = payments.create(&f.user, order_request(order_id)).await.unwrap();
        let state = f.store.snapshot().await;
        assert_eq!(state.transactions[&transaction.id].status, TransactionStatus::Canceled);
        assert_eq!(state.transactions[&retry.id].status, TransactionStatus::Pending);
        assert_eq!(state.variations[&variation_id].reserved_quantity, 2);

        let reference = payments.pay(&f.user, retry.id).await.unwrap().res_number.unwrap();
        let settled = payments
            .verify(&f.user, VerifyTransactionRequest { res_number: reference, status: "OK".into() })
            .await
            .unwrap();
        assert_eq!(settled.status, TransactionStatus::Success);
        assert_eq!(f.store.snapshot().await.orders[&order_id].status, OrderStatus::Processing);
    }

    #[tokio::test]
    async fn test_verify_unknown_reference_is_not_found() {
        let f = fixture().await;
        assert!(matches!(
            f.payments
                .verify(&f.user, VerifyTransactionRequest { res_number: "NOPE".into(), status: "OK".into() })
                .await,
            Err(AppError::NotFound(_))
        ));
        assert!(f.gateway.confirmed.lock().unwrap().is_empty());
    }
}
