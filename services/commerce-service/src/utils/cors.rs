// /commerce/services/commerce-service/src/utils/cors.rs

use std::time::Duration;

use axum::http::{header, HeaderName, HeaderValue, Method};
use tower_http::cors::CorsLayer;

use crate::config::AppConfig;
use crate::utils::constants::{HEADER_USER_ID, HEADER_USER_ROLE};

/// CORS layer dari ALLOWED_ORIGINS; production hanya menerima origin https
pub fn create_cors_layer(config: &AppConfig) -> CorsLayer {
    let production = config.is_production();
    let origins = parse_origins(&config.allowed_origins, production);
    if origins.is_empty() {
        tracing::warn!("⚠️ Tidak ada CORS origin valid, browser request cross-origin akan ditolak");
    }

    let layer = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers(allowed_headers())
        .allow_credentials(true);

    if production {
        layer
            .expose_headers([header::CONTENT_LENGTH, header::CONTENT_TYPE])
            .max_age(Duration::from_secs(86400))
    } else {
        layer.max_age(Duration::from_secs(3600))
    }
}

/// Comma separated list; entry invalid di-skip dengan warning
fn parse_origins(origins: &str, https_only: bool) -> Vec<HeaderValue> {
    origins
        .split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .filter(|origin| {
            let allowed = !https_only || origin.starts_with("https://");
            if !allowed {
                tracing::warn!("CORS origin '{}' di-skip: production butuh https", origin);
            }
            allowed
        })
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => {
                tracing::debug!("CORS origin registered: {}", origin);
                Some(value)
            }
            Err(e) => {
                tracing::warn!("Invalid origin format '{}': {}", origin, e);
                None
            }
        })
        .collect()
}

/// Explicit list karena allow_credentials; termasuk header identity dari gateway
fn allowed_headers() -> [HeaderName; 6] {
    [
        header::CONTENT_TYPE,
        header::ACCEPT,
        header::ACCEPT_LANGUAGE,
        header::CACHE_CONTROL,
        HeaderName::from_static(HEADER_USER_ID),
        HeaderName::from_static(HEADER_USER_ROLE),
    ]
}
