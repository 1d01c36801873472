// /commerce/services/commerce-service/src/middleware/security.rs

use axum::{
    extract::Request,
    http::{header, HeaderMap, HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};

/// Header yang selalu dipasang; API ini cuma balas JSON jadi CSP paling ketat
fn static_headers() -> [(HeaderName, &'static str); 4] {
    [
        (header::X_CONTENT_TYPE_OPTIONS, "nosniff"),
        (header::X_FRAME_OPTIONS, "DENY"),
        (header::REFERRER_POLICY, "strict-origin-when-cross-origin"),
        (header::CONTENT_SECURITY_POLICY, "default-src 'none'; frame-ancestors 'none';"),
    ]
}

/// Prefix route yang berisi data per user (cart, order, pembayaran)
const PRIVATE_PREFIXES: &[&str] = &[
    "/api/cart",
    "/api/orders",
    "/api/transactions",
    "/api/wallet",
    "/api/admin",
];

fn is_private_path(path: &str) -> bool {
    PRIVATE_PREFIXES.iter().any(|prefix| path.starts_with(prefix))
}

fn apply_security_headers(headers: &mut HeaderMap, path: &str, production: bool) {
    for (name, value) in static_headers() {
        headers.insert(name, HeaderValue::from_static(value));
    }

    if production {
        headers.insert(
            header::STRICT_TRANSPORT_SECURITY,
            HeaderValue::from_static("max-age=31536000; includeSubDomains"),
        );
    }

    if is_private_path(path) {
        headers.insert(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store, no-cache, must-revalidate, private"),
        );
    }
}

/// Security headers untuk semua response
pub async fn security_headers_middleware(req: Request, next: Next) -> Response {
    let path = req.uri().path().to_string();
    let production = std::env::var("ENVIRONMENT")
        .map(|env| env.eq_ignore_ascii_case("production"))
        .unwrap_or(false);

    let mut response = next.run(req).await;
    apply_security_headers(response.headers_mut(), &path, production);
    response
}
