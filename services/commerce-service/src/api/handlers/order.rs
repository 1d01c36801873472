// /commerce/services/commerce-service/src/api/handlers/order.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    Extension,
};

use super::paginated;
use crate::{
    models::*,
    AppState,
    utils::{
        error::AppResult,
        validator::{validate_pagination, validate_request},
    },
};

/// POST /api/orders (checkout, upsert order PENDING)
pub async fn checkout(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<CheckoutRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<OrderWithItems>>)> {
    validate_request(&payload)?;

    let order = state.order_service.checkout(user.id, payload).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok("Order berhasil dibuat", order))))
}

/// PUT /api/orders
pub async fn update_order(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<CheckoutRequest>,
) -> AppResult<Json<ApiResponse<OrderWithItems>>> {
    validate_request(&payload)?;

    let order = state.order_service.update(user.id, payload).await?;
    Ok(Json(ApiResponse::ok("Order berhasil diupdate", order)))
}

/// GET /api/orders?page=&limit=&status=
pub async fn list_orders(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Query(params): Query<OrderQueryParams>,
) -> AppResult<Json<ListResponse<OrderSummary>>> {
    list_with_filter(&state, Some(user), params).await
}

/// GET /api/orders/{id}
pub async fn get_order(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(order_id): Path<i64>,
) -> AppResult<Json<ApiResponse<OrderWithItems>>> {
    let order = state.order_service.get(&user, order_id).await?;
    Ok(Json(ApiResponse::ok("Order berhasil diambil", order)))
}

/// PUT /api/orders/{id}/cancel
pub async fn cancel_order(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(order_id): Path<i64>,
) -> AppResult<Json<ApiResponse<Order>>> {
    let order = state.order_service.cancel(&user, order_id).await?;
    Ok(Json(ApiResponse::ok("Order berhasil dibatalkan", order)))
}

// ========================= ADMIN =========================

/// GET /api/admin/orders
pub async fn admin_list_orders(
    State(state): State<AppState>,
    Query(params): Query<OrderQueryParams>,
) -> AppResult<Json<ListResponse<OrderSummary>>> {
    list_with_filter(&state, None, params).await
}

/// PUT /api/admin/orders/{id}/status
pub async fn admin_update_order_status(
    State(state): State<AppState>,
    Extension(admin): Extension<CurrentUser>,
    Path(order_id): Path<i64>,
    Json(payload): Json<UpdateOrderStatusRequest>,
) -> AppResult<Json<ApiResponse<Order>>> {
    validate_request(&payload)?;
    let status = OrderStatus::parse(&payload.status)?;

    let order = state.order_service.set_status(order_id, status).await?;
    tracing::info!("Admin {} update order {} ke {}", admin.id, order_id, status.as_str());

    Ok(Json(ApiResponse::ok("Status order berhasil diupdate", order)))
}

async fn list_with_filter(
    state: &AppState,
    owner: Option<CurrentUser>,
    params: OrderQueryParams,
) -> AppResult<Json<ListResponse<OrderSummary>>> {
    let (page, limit, offset) = validate_pagination(params.page, params.limit)?;
    let filter = OrderFilter {
        customer_id: owner.map(|u| u.id),
        status: params.status.as_deref().map(OrderStatus::parse).transpose()?,
    };

    let (orders, total) = state.order_service.list(&filter, limit as i64, offset).await?;
    Ok(Json(paginated("Orders berhasil diambil", orders, page, limit, total)))
}
