// /commerce/services/commerce-service/src/api/handlers/catalog.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    Extension,
};

use super::{listed, paginated};
use crate::{
    models::*,
    AppState,
    utils::{
        error::AppResult,
        validator::{validate_pagination, validate_request},
    },
};

// ========================= CATEGORY & ATTRIBUTE =========================

/// GET /api/categories
pub async fn list_categories(State(state): State<AppState>) -> AppResult<Json<ListResponse<Category>>> {
    let categories = state.catalog_service.list_categories().await?;
    Ok(Json(listed("Categories berhasil diambil", categories)))
}

/// POST /api/categories (admin)
pub async fn create_category(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<CreateCategoryRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Category>>)> {
    user.ensure_admin()?;
    validate_request(&payload)?;

    let category = state.catalog_service.create_category(payload).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok("Category berhasil dibuat", category))))
}

/// GET /api/attributes
pub async fn list_attributes(State(state): State<AppState>) -> AppResult<Json<ListResponse<Attribute>>> {
    let attributes = state.catalog_service.list_attributes().await?;
    Ok(Json(listed("Attributes berhasil diambil", attributes)))
}

/// POST /api/attributes (admin)
pub async fn create_attribute(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<CreateAttributeRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Attribute>>)> {
    user.ensure_admin()?;
    validate_request(&payload)?;

    let attribute = state.catalog_service.create_attribute(payload).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok("Attribute berhasil dibuat", attribute))))
}

// ========================= PRODUCTS =========================

/// GET /api/products?page=&limit=
pub async fn list_products(
    State(state): State<AppState>,
    Query(params): Query<PageQuery>,
) -> AppResult<Json<ListResponse<Product>>> {
    let (page, limit, offset) = validate_pagination(params.page, params.limit)?;
    let (products, total) = state.catalog_service.list_products(limit as i64, offset).await?;
    Ok(Json(paginated("Products berhasil diambil", products, page, limit, total)))
}

/// POST /api/products (admin)
pub async fn create_product(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<CreateProductRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<ProductDetails>>)> {
    user.ensure_admin()?;
    validate_request(&payload)?;

    let product = state.catalog_service.create_product(payload).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok("Product berhasil dibuat", product))))
}

/// GET /api/products/{id}
pub async fn get_product(
    State(state): State<AppState>,
    Path(product_id): Path<i64>,
) -> AppResult<Json<ApiResponse<ProductDetails>>> {
    let product = state.catalog_service.get_product(product_id).await?;
    Ok(Json(ApiResponse::ok("Product berhasil diambil", product)))
}

/// POST /api/products/{id}/variations (admin)
pub async fn create_variation(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(product_id): Path<i64>,
    Json(payload): Json<CreateVariationRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<ProductVariation>>)> {
    user.ensure_admin()?;
    validate_request(&payload)?;

    let variation = state.catalog_service.create_variation(product_id, payload).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok("Variation berhasil dibuat", variation))))
}

/// PUT /api/variations/{id} (admin)
pub async fn update_variation(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(variation_id): Path<i64>,
    Json(payload): Json<UpdateVariationRequest>,
) -> AppResult<Json<ApiResponse<ProductVariation>>> {
    user.ensure_admin()?;
    validate_request(&payload)?;

    let variation = state.catalog_service.update_variation(variation_id, payload).await?;
    Ok(Json(ApiResponse::ok("Variation berhasil diupdate", variation)))
}
