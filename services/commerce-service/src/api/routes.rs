// /commerce/services/commerce-service/src/api/routes.rs

use axum::{
    routing::{get, post, put},
    Router,
};
use crate::AppState;
use super::handlers::{cart, catalog, maintenance, order, settings, shipping, transaction};

/// Create semua routes untuk commerce service
pub fn create_routes() -> Router<AppState> {
    Router::new()
        // Catalog
        .route("/api/categories", get(catalog::list_categories).post(catalog::create_category))
        .route("/api/attributes", get(catalog::list_attributes).post(catalog::create_attribute))
        .route("/api/products", get(catalog::list_products).post(catalog::create_product))
        .route("/api/products/{id}", get(catalog::get_product))
        .route("/api/products/{id}/variations", post(catalog::create_variation))
        .route("/api/variations/{id}", put(catalog::update_variation))

        // Cart
        .route("/api/cart", get(cart::get_cart).delete(cart::clear_cart))
        .route("/api/cart/items", post(cart::add_cart_item))
        .route("/api/cart/items/{id}", put(cart::update_cart_item).delete(cart::remove_cart_item))
        .route("/api/cart/validate", post(cart::validate_cart))

        // Orders
        .route(
            "/api/orders",
            post(order::checkout).put(order::update_order).get(order::list_orders),
        )
        .route("/api/orders/{id}", get(order::get_order))
        .route("/api/orders/{id}/cancel", put(order::cancel_order))

        // Transactions & wallet
        .route(
            "/api/transactions",
            get(transaction::list_transactions).post(transaction::create_transaction),
        )
        // Static segment "verify" menang atas {id}
        .route("/api/transactions/verify", post(transaction::verify_transaction))
        .route(
            "/api/transactions/{id}",
            get(transaction::get_transaction)
                .put(transaction::update_transaction)
                .delete(transaction::delete_transaction),
        )
        .route("/api/transactions/{id}/pay", post(transaction::pay_transaction))
        .route("/api/wallet", get(transaction::get_wallet))

        // Shipping
        .route("/api/shipping/methods", get(shipping::list_shipping_methods))
        .route("/api/shipping/methods/{id}", get(shipping::get_shipping_method))

        // Admin routes (role dicek di auth middleware)
        .route(
            "/api/admin/shipping/methods",
            get(shipping::admin_list_shipping_methods).post(shipping::create_shipping_method),
        )
        .route(
            "/api/admin/shipping/methods/{id}",
            get(shipping::get_shipping_method)
                .put(shipping::update_shipping_method)
                .delete(shipping::delete_shipping_method),
        )
        .route("/api/admin/settings", get(settings::list_settings).post(settings::create_setting))
        .route(
            "/api/admin/settings/{id}",
            get(settings::get_setting)
                .put(settings::update_setting)
                .delete(settings::delete_setting),
        )
        .route("/api/admin/orders", get(order::admin_list_orders))
        .route("/api/admin/orders/{id}/status", put(order::admin_update_order_status))
        .route("/api/admin/maintenance/sweep", post(maintenance::trigger_sweep))
        .route("/api/admin/maintenance/status", get(maintenance::sweep_status))
}
