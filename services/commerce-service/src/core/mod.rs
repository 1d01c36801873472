// /commerce/services/commerce-service/src/core/mod.rs

pub mod inventory;
pub mod settings;
pub mod catalog;
pub mod cart;
pub mod shipping;
pub mod order;
pub mod gateway;
pub mod strategy;
pub mod payment;

// Re-export untuk kemudahan akses
pub mod services {
    pub use super::catalog::CatalogService;
    pub use super::cart::CartService;
    pub use super::order::OrderService;
    pub use super::payment::PaymentService;
    pub use super::settings::SettingsService;
    pub use super::shipping::ShippingService;
    pub use super::gateway::{GatewayClient, PaymentGateway};
}
