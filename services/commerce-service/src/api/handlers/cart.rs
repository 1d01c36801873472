// /commerce/services/commerce-service/src/api/handlers/cart.rs

use axum::{
    extract::{Path, State},
    response::Json,
    Extension,
};

use crate::{
    models::*,
    AppState,
    utils::{error::AppResult, validator::validate_request},
};

/// GET /api/cart
pub async fn get_cart(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> AppResult<Json<ApiResponse<CartWithItems>>> {
    let cart = state.cart_service.get_cart(user.id).await?;
    Ok(Json(ApiResponse::ok("Cart berhasil diambil", cart)))
}

/// POST /api/cart/items
pub async fn add_cart_item(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<AddCartItemRequest>,
) -> AppResult<Json<ApiResponse<CartWithItems>>> {
    validate_request(&payload)?;

    let cart = state.cart_service.add_item(user.id, payload).await?;
    Ok(Json(ApiResponse::ok("Item berhasil ditambahkan ke cart", cart)))
}

/// PUT /api/cart/items/{id}
pub async fn update_cart_item(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(item_id): Path<i64>,
    Json(payload): Json<UpdateCartItemRequest>,
) -> AppResult<Json<ApiResponse<CartWithItems>>> {
    let cart = state
        .cart_service
        .update_item(user.id, item_id, payload.operation)
        .await?;
    Ok(Json(ApiResponse::ok("Cart item berhasil diupdate", cart)))
}

/// DELETE /api/cart/items/{id}
pub async fn remove_cart_item(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(item_id): Path<i64>,
) -> AppResult<Json<ApiResponse<CartWithItems>>> {
    let cart = state.cart_service.remove_item(user.id, item_id).await?;
    Ok(Json(ApiResponse::ok("Item berhasil dihapus dari cart", cart)))
}

/// DELETE /api/cart
pub async fn clear_cart(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> AppResult<Json<ApiResponse<CartWithItems>>> {
    let cart = state.cart_service.clear(user.id).await?;
    Ok(Json(ApiResponse::ok("Cart berhasil dikosongkan", cart)))
}

/// POST /api/cart/validate
pub async fn validate_cart(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> AppResult<Json<ApiResponse<CartWithItems>>> {
    let cart = state.cart_service.validate(user.id).await?;
    Ok(Json(ApiResponse::ok("Cart valid", cart)))
}
