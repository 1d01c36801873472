// /commerce/services/commerce-service/src/models.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use chrono::{DateTime, Utc};
use validator::Validate;
use bigdecimal::{BigDecimal, Zero};

use crate::utils::error::{AppError, AppResult};

// ========================= ENUMS =========================

/// Status publikasi product
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductStatus {
    Published,
    Draft,
    Pending,
}

impl ProductStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductStatus::Published => "published",
            ProductStatus::Draft => "draft",
            ProductStatus::Pending => "pending",
        }
    }
}

impl TryFrom<String> for ProductStatus {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "published" => Ok(ProductStatus::Published),
            "draft" => Ok(ProductStatus::Draft),
            "pending" => Ok(ProductStatus::Pending),
            other => Err(format!("unknown product status '{}'", other)),
        }
    }
}

/// Lifecycle order: PENDING -> PROCESSING -> SHIPPED -> DELIVERED, dengan CANCELED
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Processing,
    Shipped,
    Delivered,
    Canceled,
}

impl OrderStatus {
    /// Convert ke string untuk database
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Processing => "processing",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Canceled => "canceled",
        }
    }

    pub fn parse(value: &str) -> AppResult<Self> {
        OrderStatus::try_from(value.to_string()).map_err(AppError::ValidationError)
    }

    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        matches!(
            (self, next),
            (OrderStatus::Pending, OrderStatus::Processing)
                | (OrderStatus::Pending, OrderStatus::Canceled)
                | (OrderStatus::Processing, OrderStatus::Shipped)
                | (OrderStatus::Processing, OrderStatus::Canceled)
                | (OrderStatus::Shipped, OrderStatus::Delivered)
        )
    }

    /// Transisi status, reject yang tidak valid
    pub fn transition(self, next: OrderStatus) -> AppResult<OrderStatus> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(AppError::InvalidTransition {
                entity: "order",
                from: self.as_str(),
                to: next.as_str(),
            })
        }
    }
}

impl TryFrom<String> for OrderStatus {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "pending" => Ok(OrderStatus::Pending),
            "processing" => Ok(OrderStatus::Processing),
            "shipped" => Ok(OrderStatus::Shipped),
            "delivered" => Ok(OrderStatus::Delivered),
            "canceled" | "cancelled" => Ok(OrderStatus::Canceled),
            other => Err(format!("Order status '{}' tidak valid", other)),
        }
    }
}

/// Status transaction: pending -> {success, failed, canceled}
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Pending,
    Success,
    Failed,
    Canceled,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Pending => "pending",
            TransactionStatus::Success => "success",
            TransactionStatus::Failed => "failed",
            TransactionStatus::Canceled => "canceled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, TransactionStatus::Pending)
    }

    /// Hanya pending yang boleh pindah, dan hanya ke status terminal
    pub fn transition(self, next: TransactionStatus) -> AppResult<TransactionStatus> {
        match (self, next) {
            (TransactionStatus::Pending, TransactionStatus::Success)
            | (TransactionStatus::Pending, TransactionStatus::Failed)
            | (TransactionStatus::Pending, TransactionStatus::Canceled) => Ok(next),
            _ => Err(AppError::InvalidTransition {
                entity: "transaction",
                from: self.as_str(),
                to: next.as_str(),
            }),
        }
    }
}

impl TryFrom<String> for TransactionStatus {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "pending" => Ok(TransactionStatus::Pending),
            "success" => Ok(TransactionStatus::Success),
            "failed" => Ok(TransactionStatus::Failed),
            "canceled" => Ok(TransactionStatus::Canceled),
            other => Err(format!("unknown transaction status '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    Order,
    WalletDeposit,
    WalletWithdraw,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Order => "order",
            TransactionType::WalletDeposit => "wallet_deposit",
            TransactionType::WalletWithdraw => "wallet_withdraw",
        }
    }
}

impl TryFrom<String> for TransactionType {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "order" => Ok(TransactionType::Order),
            "wallet_deposit" => Ok(TransactionType::WalletDeposit),
            "wallet_withdraw" => Ok(TransactionType::WalletWithdraw),
            other => Err(format!("unknown transaction type '{}'", other)),
        }
    }
}

/// Kode payment method yang punya strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethodCode {
    Online,
    Wallet,
}

impl PaymentMethodCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethodCode::Online => "online",
            PaymentMethodCode::Wallet => "wallet",
        }
    }

    pub fn parse(code: &str) -> AppResult<Self> {
        match code.trim().to_lowercase().as_str() {
            "online" => Ok(PaymentMethodCode::Online),
            "wallet" => Ok(PaymentMethodCode::Wallet),
            other => Err(AppError::UnsupportedPaymentMethod(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Customer,
    Admin,
}

impl Role {
    pub fn parse(value: &str) -> Self {
        match value.to_lowercase().as_str() {
            "admin" => Role::Admin,
            _ => Role::Customer,
        }
    }
}

/// Identity dari upstream gateway, di-inject oleh auth middleware
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: Uuid,
    pub role: Role,
}

impl CurrentUser {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Owner atau admin yang boleh akses resource
    pub fn ensure_owner(&self, owner_id: Uuid) -> AppResult<()> {
        if self.is_admin() || self.id == owner_id {
            Ok(())
        } else {
            Err(AppError::Forbidden("Akses ditolak untuk resource ini".to_string()))
        }
    }

    pub fn ensure_admin(&self) -> AppResult<()> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(AppError::Forbidden("Akses admin diperlukan".to_string()))
        }
    }
}

// ========================= CATALOG MODELS =========================

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub parent_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Attribute {
    pub id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    #[sqlx(try_from = "String")]
    pub status: ProductStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq)]
pub struct ProductAttributeValue {
    pub attribute_id: i64,
    pub value: String,
}

/// Variation = SKU yang bisa dibeli, punya harga dan stock sendiri
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct ProductVariation {
    pub id: i64,
    pub product_id: i64,
    pub sku: String,
    pub unit_price: BigDecimal,
    pub sales_price: BigDecimal,
    pub quantity: i32,
    pub reserved_quantity: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProductVariation {
    /// Harga jual: sales_price kalau ada, selain itu unit_price
    pub fn final_price(&self) -> BigDecimal {
        if self.sales_price > BigDecimal::zero() {
            self.sales_price.clone()
        } else {
            self.unit_price.clone()
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProductDetails {
    #[serde(flatten)]
    pub product: Product,
    pub category_ids: Vec<i64>,
    pub attributes: Vec<ProductAttributeValue>,
    pub variations: Vec<ProductVariation>,
}

// ========================= CART MODELS =========================

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Cart {
    pub id: i64,
    pub user_id: Uuid,
    pub total_amount: BigDecimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct CartItem {
    pub id: i64,
    pub cart_id: i64,
    pub variation_id: i64,
    pub quantity: i32,
    /// Harga per unit waktu item masuk cart
    pub unit_price: BigDecimal,
    pub total_price: BigDecimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct CartWithItems {
    #[serde(flatten)]
    pub cart: Cart,
    pub items: Vec<CartItem>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CartIssueKind {
    #[serde(rename = "variation not found")]
    VariationNotFound,
    #[serde(rename = "insufficient stock")]
    InsufficientStock,
    #[serde(rename = "price changed")]
    PriceChanged,
}

/// Satu masalah pada cart item hasil validasi
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartIssue {
    pub kind: CartIssueKind,
    pub variation_id: i64,
    pub product_id: Option<i64>,
    pub product_name: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CartOperation {
    #[serde(alias = "+")]
    Increment,
    #[serde(alias = "-")]
    Decrement,
}

// ========================= ORDER MODELS =========================

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub customer_id: Uuid,
    pub address_id: Option<i64>,
    pub shipping_id: Option<i64>,
    pub payment_method_id: Option<i64>,
    pub shipping_cost: BigDecimal,
    pub tax_amount: BigDecimal,
    pub order_total: BigDecimal,
    pub final_price: BigDecimal,
    #[sqlx(try_from = "String")]
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Snapshot harga dan nama variation waktu order dibuat
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: i64,
    pub order_id: i64,
    pub product_id: i64,
    pub product_name: String,
    pub product_metadata: serde_json::Value,
    pub quantity: i32,
    pub unit_price: BigDecimal,
    pub total_price: BigDecimal,
}

impl OrderItem {
    /// Variation id yang disimpan di product_metadata
    pub fn variation_id(&self) -> AppResult<i64> {
        self.product_metadata
            .get("variation_id")
            .and_then(|v| v.as_i64())
            .ok_or_else(|| AppError::Internal(format!(
                "Order item {} tidak punya variation_id di metadata",
                self.id
            )))
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderWithItems {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct OrderSummary {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub order: Order,
    pub items_count: i64,
}

/// Total harga order yang sudah dihitung
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderTotals {
    pub order_total: BigDecimal,
    pub tax_amount: BigDecimal,
    pub shipping_cost: BigDecimal,
    pub final_price: BigDecimal,
}

#[derive(Debug, Clone)]
pub struct OrderDraft {
    pub customer_id: Uuid,
    pub address_id: Option<i64>,
    pub shipping_id: Option<i64>,
    pub payment_method_id: Option<i64>,
    pub totals: OrderTotals,
}

#[derive(Debug, Clone)]
pub struct NewOrderItem {
    pub order_id: i64,
    pub product_id: i64,
    pub product_name: String,
    pub product_metadata: serde_json::Value,
    pub quantity: i32,
    pub unit_price: BigDecimal,
    pub total_price: BigDecimal,
}

#[derive(Debug, Clone, Default)]
pub struct OrderFilter {
    pub customer_id: Option<Uuid>,
    pub status: Option<OrderStatus>,
}

// ========================= TRANSACTION MODELS =========================

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub order_id: Option<i64>,
    pub user_id: Uuid,
    pub payment_method_id: Option<i64>,
    #[sqlx(try_from = "String")]
    pub transaction_type: TransactionType,
    pub description: String,
    pub amount: BigDecimal,
    #[sqlx(try_from = "String")]
    pub status: TransactionStatus,
    pub res_number: Option<String>,
    pub ref_id: Option<i64>,
    pub fee: Option<i64>,
    pub fee_type: Option<String>,
    pub portal_in: Option<DateTime<Utc>>,
    pub portal_out: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Transaction {
    /// Sudah dikirim ke gateway dan belum settle
    pub fn is_in_flight(&self) -> bool {
        self.status == TransactionStatus::Pending && self.res_number.is_some()
    }

    /// In flight dan callback gateway masih ditunggu (portal_in belum lewat window)
    pub fn is_awaiting_gateway(&self, window: chrono::Duration, now: DateTime<Utc>) -> bool {
        self.is_in_flight() && self.portal_in.is_some_and(|sent_at| now - sent_at < window)
    }

    /// In flight tapi gateway tidak pernah callback dalam window
    pub fn is_abandoned(&self, window: chrono::Duration, now: DateTime<Utc>) -> bool {
        self.is_in_flight() && !self.is_awaiting_gateway(window, now)
    }
}

#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub order_id: Option<i64>,
    pub user_id: Uuid,
    pub payment_method_id: Option<i64>,
    pub transaction_type: TransactionType,
    pub description: String,
    pub amount: BigDecimal,
}

/// Hasil settlement yang disimpan ke transaction row
#[derive(Debug, Clone)]
pub struct TransactionSettlement {
    pub status: TransactionStatus,
    pub ref_id: Option<i64>,
    pub fee: Option<i64>,
    pub fee_type: Option<String>,
    pub portal_out: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Wallet {
    pub user_id: Uuid,
    pub balance: BigDecimal,
    pub updated_at: DateTime<Utc>,
}

// ========================= SETTINGS & SHIPPING =========================

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Setting {
    pub id: i64,
    pub key: String,
    pub value: serde_json::Value,
    pub description: Option<String>,
    pub is_active: bool,
}

#[derive(Debug, Clone)]
pub struct NewSetting {
    pub key: String,
    pub value: serde_json::Value,
    pub description: Option<String>,
    pub is_active: bool,
}

/// Entry dari setting `payment_methods`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentMethodEntry {
    pub id: i64,
    pub code: String,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct ShippingMethod {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub base_cost: BigDecimal,
    pub estimated_days: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct ShippingArea {
    pub id: i64,
    pub shipping_method_id: i64,
    pub province_id: i64,
    pub city_id: Option<i64>,
    pub price: BigDecimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct ShippingMethodWithAreas {
    #[serde(flatten)]
    pub method: ShippingMethod,
    pub areas: Vec<ShippingArea>,
}

#[derive(Debug, Clone)]
pub struct NewShippingMethod {
    pub name: String,
    pub description: Option<String>,
    pub base_cost: BigDecimal,
    pub estimated_days: i32,
    pub is_active: bool,
    pub areas: Vec<NewShippingArea>,
}

#[derive(Debug, Clone)]
pub struct NewShippingArea {
    pub province_id: i64,
    pub city_id: Option<i64>,
    pub price: BigDecimal,
}

/// Shipping method yang tersedia untuk satu lokasi
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShippingQuote {
    pub method_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub estimated_days: i32,
    pub price: BigDecimal,
}

// ========================= REPOSITORY INPUTS =========================

#[derive(Debug, Clone)]
pub struct NewCategory {
    pub name: String,
    pub slug: String,
    pub parent_id: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub status: ProductStatus,
    pub category_ids: Vec<i64>,
    pub attributes: Vec<ProductAttributeValue>,
}

#[derive(Debug, Clone)]
pub struct NewVariation {
    pub product_id: i64,
    pub sku: String,
    pub unit_price: BigDecimal,
    pub sales_price: BigDecimal,
    pub quantity: i32,
}

#[derive(Debug, Clone, Default)]
pub struct VariationUpdate {
    pub unit_price: Option<BigDecimal>,
    pub sales_price: Option<BigDecimal>,
    pub quantity: Option<i32>,
}

#[derive(Debug, Clone)]
pub struct NewCartItem {
    pub cart_id: i64,
    pub variation_id: i64,
    pub quantity: i32,
    pub unit_price: BigDecimal,
    pub total_price: BigDecimal,
}

// ========================= REQUEST DTOs =========================

#[derive(Debug, Deserialize, Validate)]
pub struct CreateCategoryRequest {
    #[validate(length(min = 1, max = 255, message = "Nama category diperlukan"))]
    pub name: String,
    #[validate(length(min = 1, max = 255))]
    pub slug: String,
    pub parent_id: Option<i64>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateAttributeRequest {
    #[validate(length(min = 1, max = 255, message = "Nama attribute diperlukan"))]
    pub name: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct AttributeValueInput {
    #[validate(range(min = 1))]
    pub attribute_id: i64,
    #[validate(length(min = 1, max = 255))]
    pub value: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateProductRequest {
    #[validate(length(min = 1, max = 255, message = "Nama product diperlukan"))]
    pub name: String,
    #[validate(length(min = 1, max = 255))]
    pub slug: String,
    pub description: Option<String>,
    pub status: Option<ProductStatus>,
    #[serde(default)]
    pub category_ids: Vec<i64>,
    #[serde(default)]
    #[validate(nested)]
    pub attributes: Vec<AttributeValueInput>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateVariationRequest {
    #[validate(length(min = 1, max = 64, message = "SKU diperlukan (max 64 karakter)"))]
    pub sku: String,
    pub unit_price: BigDecimal,
    pub sales_price: Option<BigDecimal>,
    #[validate(range(min = 0, message = "Quantity tidak boleh negatif"))]
    pub quantity: i32,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateVariationRequest {
    pub unit_price: Option<BigDecimal>,
    pub sales_price: Option<BigDecimal>,
    #[validate(range(min = 0, message = "Quantity tidak boleh negatif"))]
    pub quantity: Option<i32>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct AddCartItemRequest {
    #[validate(range(min = 1, message = "Variation ID tidak valid"))]
    pub variation_id: i64,
    #[validate(range(min = 1, max = 1000))]
    pub quantity: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateCartItemRequest {
    pub operation: CartOperation,
}

/// Pilihan shipping/address/payment waktu checkout
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct CheckoutRequest {
    pub address_id: Option<i64>,
    pub shipping_id: Option<i64>,
    #[validate(range(min = 1))]
    pub province_id: Option<i64>,
    #[validate(range(min = 1))]
    pub city_id: Option<i64>,
    pub payment_method_id: Option<i64>,
}

/// Query parameters untuk list orders
#[derive(Debug, Deserialize, Default)]
pub struct OrderQueryParams {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub status: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct PageQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateOrderStatusRequest {
    #[validate(length(min = 1, max = 50))]
    pub status: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateTransactionRequest {
    pub order_id: Option<i64>,
    pub payment_method_id: Option<i64>,
    pub transaction_type: TransactionType,
    #[validate(length(max = 500))]
    #[serde(default)]
    pub description: String,
    pub amount: Option<BigDecimal>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateTransactionRequest {
    pub payment_method_id: Option<i64>,
    #[validate(length(max = 500))]
    pub description: Option<String>,
}

/// Callback dari gateway, diteruskan oleh client
#[derive(Debug, Deserialize, Validate)]
pub struct VerifyTransactionRequest {
    #[validate(length(min = 1, max = 100, message = "res_number diperlukan"))]
    pub res_number: String,
    #[validate(length(min = 1, max = 20))]
    pub status: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct SettingRequest {
    #[validate(length(min = 1, max = 100, message = "Key setting diperlukan"))]
    pub key: String,
    pub value: serde_json::Value,
    pub description: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ShippingAreaInput {
    #[validate(range(min = 1))]
    pub province_id: i64,
    #[serde(default)]
    pub city_ids: Vec<i64>,
    pub price: BigDecimal,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ShippingMethodRequest {
    #[validate(length(min = 1, max = 255, message = "Nama shipping method diperlukan"))]
    pub name: String,
    pub description: Option<String>,
    pub base_cost: Option<BigDecimal>,
    #[validate(range(min = 0, max = 365))]
    pub estimated_days: i32,
    pub is_active: Option<bool>,
    #[serde(default)]
    #[validate(nested)]
    pub areas: Vec<ShippingAreaInput>,
}

#[derive(Debug, Deserialize, Default)]
pub struct ShippingQuery {
    pub province_id: Option<i64>,
    pub city_id: Option<i64>,
}

// ========================= RESPONSE DTOs =========================

/// Response wrapper standar
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub message: String,
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
        }
    }
}

impl ApiResponse<()> {
    pub fn empty(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: None,
        }
    }
}

/// Response wrapper untuk list
#[derive(Debug, Serialize)]
pub struct ListResponse<T: Serialize> {
    pub success: bool,
    pub message: String,
    pub data: Vec<T>,
    pub pagination: Option<PaginationMeta>,
}

/// Metadata untuk pagination
#[derive(Debug, Serialize, Clone)]
pub struct PaginationMeta {
    pub current_page: u32,
    pub per_page: u32,
    pub total_items: i64,
    pub total_pages: u32,
    pub has_next: bool,
    pub has_prev: bool,
}

/// Standard error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
    pub error_code: Option<String>,
    pub details: Option<serde_json::Value>,
}

/// Hasil pay: URL gateway untuk online, status final untuk wallet
#[derive(Debug, Clone, Serialize)]
pub struct PaymentOutcome {
    pub transaction_id: i64,
    pub method: PaymentMethodCode,
    pub status: TransactionStatus,
    pub res_number: Option<String>,
    pub payment_url: Option<String>,
}

// ========================= HELPER IMPLEMENTATIONS =========================

impl PaginationMeta {
    /// Create pagination metadata dari hasil query
    pub fn new(current_page: u32, per_page: u32, total_items: i64) -> Self {
        let total_pages = ((total_items as f64) / (per_page as f64)).ceil() as u32;

        Self {
            current_page,
            per_page,
            total_items,
            total_pages: if total_pages == 0 { 1 } else { total_pages },
            has_next: current_page < total_pages,
            has_prev: current_page > 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_order_status_transitions() {
        assert!(OrderStatus::Pending.transition(OrderStatus::Processing).is_ok());
        assert!(OrderStatus::Processing.transition(OrderStatus::Shipped).is_ok());
        assert!(OrderStatus::Shipped.transition(OrderStatus::Delivered).is_ok());
        assert!(OrderStatus::Pending.transition(OrderStatus::Canceled).is_ok());

        assert!(OrderStatus::Delivered.transition(OrderStatus::Pending).is_err());
        assert!(OrderStatus::Canceled.transition(OrderStatus::Processing).is_err());
        assert!(OrderStatus::Pending.transition(OrderStatus::Shipped).is_err());
    }

    #[test]
    fn test_transaction_status_rejects_settling_twice() {
        let settled = TransactionStatus::Pending
            .transition(TransactionStatus::Success)
            .unwrap();
        let err = settled.transition(TransactionStatus::Failed).unwrap_err();
        assert!(matches!(
            err,
            AppError::InvalidTransition { entity: "transaction", from: "success", to: "failed" }
        ));
        assert!(TransactionStatus::Pending
            .transition(TransactionStatus::Pending)
            .is_err());
    }

    #[test]
    fn test_payment_method_code_parse() {
        assert_eq!(PaymentMethodCode::parse("online").unwrap(), PaymentMethodCode::Online);
        assert_eq!(PaymentMethodCode::parse(" Wallet ").unwrap(), PaymentMethodCode::Wallet);
        assert!(matches!(
            PaymentMethodCode::parse("crypto"),
            Err(AppError::UnsupportedPaymentMethod(code)) if code == "crypto"
        ));
    }

    #[test]
    fn test_variation_final_price_prefers_sale() {
        let now = Utc::now();
        let mut variation = ProductVariation {
            id: 1,
            product_id: 1,
            sku: "SKU-1".into(),
            unit_price: BigDecimal::from(1000),
            sales_price: BigDecimal::from(0),
            quantity: 5,
            reserved_quantity: 0,
            created_at: now,
            updated_at: now,
        };
        assert_eq!(variation.final_price(), BigDecimal::from(1000));

        variation.sales_price = BigDecimal::from_str("800").unwrap();
        assert_eq!(variation.final_price(), BigDecimal::from(800));
    }

    #[test]
    fn test_cart_issue_kind_tags() {
        let json = serde_json::to_value(CartIssueKind::InsufficientStock).unwrap();
        assert_eq!(json, serde_json::json!("insufficient stock"));
        let json = serde_json::to_value(CartIssueKind::VariationNotFound).unwrap();
        assert_eq!(json, serde_json::json!("variation not found"));
    }

    #[test]
    fn test_cart_operation_aliases() {
        let op: CartOperation = serde_json::from_value(serde_json::json!("+")).unwrap();
        assert_eq!(op, CartOperation::Increment);
        let op: CartOperation = serde_json::from_value(serde_json::json!("decrement")).unwrap();
        assert_eq!(op, CartOperation::Decrement);
    }

    #[test]
    fn test_order_item_variation_id_from_metadata() {
        let item = OrderItem {
            id: 1,
            order_id: 1,
            product_id: 3,
            product_name: "Kaos".into(),
            product_metadata: serde_json::json!({ "variation_id": 7, "sku": "KAOS-M" }),
            quantity: 1,
            unit_price: BigDecimal::from(100),
            total_price: BigDecimal::from(100),
        };
        assert_eq!(item.variation_id().unwrap(), 7);
    }

    #[test]
    fn test_pagination_meta() {
        let meta = PaginationMeta::new(1, 10, 25);
        assert_eq!(meta.total_pages, 3);
        assert!(meta.has_next);
        assert!(!meta.has_prev);

        let empty = PaginationMeta::new(1, 10, 0);
        assert_eq!(empty.total_pages, 1);
        assert!(!empty.has_next);
    }
}
