// /commerce/services/commerce-service/src/utils/logger.rs

use tracing_subscriber::EnvFilter;

/// Logger initialization
pub fn init_logger() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("commerce_service=debug,tower_http=debug"));

    let json_output = std::env::var("LOG_FORMAT")
        .map(|format| format.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true);

    // JSON untuk log aggregator di production
    if json_output {
        builder.json().init();
    } else {
        builder.init();
    }
}
