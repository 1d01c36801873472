// /commerce/services/commerce-service/src/utils/banner.rs

/// Print startup banner
pub fn print_startup_banner(bind_address: &str, sweep_enabled: bool) {
    println!(r#"
╔══════════════════════════════════════════════════════════╗
║                  COMMERCE SERVICE v1.0.0                  ║
║           catalog · cart · orders · payments              ║
╚══════════════════════════════════════════════════════════╝
    "#);

    tracing::info!("🚀 Commerce Service starting at {}", bind_address);
    tracing::info!("📋 Available endpoints:");
    tracing::info!("  Public:");
    tracing::info!("    GET  /health                          - Liveness");
    tracing::info!("  Customer:");
    tracing::info!("    GET  /api/cart                        - Get cart");
    tracing::info!("    POST /api/cart/validate               - Validate cart");
    tracing::info!("    POST /api/orders                      - Checkout");
    tracing::info!("    POST /api/transactions/{{id}}/pay       - Pay transaction");
    tracing::info!("    POST /api/transactions/verify         - Gateway callback");
    tracing::info!("  Admin:");
    tracing::info!("    PUT  /api/admin/orders/{{id}}/status    - Order status");
    tracing::info!("    POST /api/admin/maintenance/sweep     - Run order sweep");
    if sweep_enabled {
        tracing::info!("⏰ Order sweep scheduler aktif di instance ini");
    }
}
