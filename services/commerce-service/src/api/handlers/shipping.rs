// /commerce/services/commerce-service/src/api/handlers/shipping.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};

use super::listed;
use crate::{
    models::*,
    AppState,
    utils::{error::AppResult, validator::validate_request},
};

/// GET /api/shipping/methods?province_id=&city_id=
pub async fn list_shipping_methods(
    State(state): State<AppState>,
    Query(query): Query<ShippingQuery>,
) -> AppResult<Json<ListResponse<ShippingQuote>>> {
    let quotes = state
        .shipping_service
        .quote(query.province_id, query.city_id)
        .await?;
    Ok(Json(listed("Shipping methods berhasil diambil", quotes)))
}

/// GET /api/shipping/methods/{id}
pub async fn get_shipping_method(
    State(state): State<AppState>,
    Path(method_id): Path<i64>,
) -> AppResult<Json<ApiResponse<ShippingMethodWithAreas>>> {
    let method = state.shipping_service.get_method(method_id).await?;
    Ok(Json(ApiResponse::ok("Shipping method berhasil diambil", method)))
}

// ========================= ADMIN =========================

/// GET /api/admin/shipping/methods (termasuk yang tidak aktif)
pub async fn admin_list_shipping_methods(
    State(state): State<AppState>,
) -> AppResult<Json<ListResponse<ShippingMethod>>> {
    let methods = state.shipping_service.list_methods().await?;
    Ok(Json(listed("Shipping methods berhasil diambil", methods)))
}

/// POST /api/admin/shipping/methods
pub async fn create_shipping_method(
    State(state): State<AppState>,
    Json(payload): Json<ShippingMethodRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<ShippingMethodWithAreas>>)> {
    validate_request(&payload)?;

    let method = state.shipping_service.create_method(payload).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok("Shipping method berhasil dibuat", method))))
}

/// PUT /api/admin/shipping/methods/{id}
pub async fn update_shipping_method(
    State(state): State<AppState>,
    Path(method_id): Path<i64>,
    Json(payload): Json<ShippingMethodRequest>,
) -> AppResult<Json<ApiResponse<ShippingMethodWithAreas>>> {
    validate_request(&payload)?;

    let method = state.shipping_service.update_method(method_id, payload).await?;
    Ok(Json(ApiResponse::ok("Shipping method berhasil diupdate", method)))
}

/// DELETE /api/admin/shipping/methods/{id}
pub async fn delete_shipping_method(
    State(state): State<AppState>,
    Path(method_id): Path<i64>,
) -> AppResult<Json<ApiResponse<()>>> {
    state.shipping_service.delete_method(method_id).await?;
    Ok(Json(ApiResponse::empty("Shipping method berhasil dihapus")))
}
