// /commerce/services/commerce-service/src/middleware/auth.rs

use axum::{
    extract::Request,
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::{Json, Response},
};
use uuid::Uuid;

use crate::{
    models::{CurrentUser, ErrorResponse, Role},
    utils::constants::{HEADER_USER_ID, HEADER_USER_ROLE},
};

type AuthRejection = (StatusCode, Json<ErrorResponse>);

fn reject(status: StatusCode, message: &str, error_code: &str) -> AuthRejection {
    (
        status,
        Json(ErrorResponse {
            success: false,
            message: message.to_string(),
            error_code: Some(error_code.to_string()),
            details: None,
        }),
    )
}

fn is_public_endpoint(path: &str) -> bool {
    path == "/health"
}

/// Baca identity yang di-forward api gateway (X-User-Id, X-User-Role)
pub fn identity_from_headers(headers: &HeaderMap) -> Result<CurrentUser, AuthRejection> {
    let user_id = headers
        .get(HEADER_USER_ID)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| reject(StatusCode::UNAUTHORIZED, "Identity user diperlukan", "MISSING_IDENTITY"))?;

    let id = Uuid::parse_str(user_id.trim())
        .map_err(|_| reject(StatusCode::UNAUTHORIZED, "X-User-Id tidak valid", "INVALID_IDENTITY"))?;

    // Role optional, default customer
    let role = headers
        .get(HEADER_USER_ROLE)
        .and_then(|h| h.to_str().ok())
        .map(Role::parse)
        .unwrap_or(Role::Customer);

    Ok(CurrentUser { id, role })
}

/// Middleware identity: semua route kecuali /health butuh user, /api/admin/* butuh admin
pub async fn auth_middleware(mut req: Request, next: Next) -> Result<Response, AuthRejection> {
    let path = req.uri().path().to_string();

    if is_public_endpoint(&path) {
        return Ok(next.run(req).await);
    }

    let user = identity_from_headers(req.headers()).inspect_err(|_| {
        tracing::debug!("Request ke {} ditolak: identity tidak ada/invalid", path);
    })?;

    if path.starts_with("/api/admin/") && !user.is_admin() {
        tracing::warn!("Non-admin user {} mencoba akses admin: {}", user.id, path);
        return Err(reject(StatusCode::FORBIDDEN, "Akses admin diperlukan", "INSUFFICIENT_PRIVILEGES"));
    }

    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}
