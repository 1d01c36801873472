// /commerce/services/commerce-service/src/api/handlers/settings.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};

use super::listed;
use crate::{
    models::*,
    AppState,
    utils::{error::AppResult, validator::validate_request},
};

/// GET /api/admin/settings
pub async fn list_settings(State(state): State<AppState>) -> AppResult<Json<ListResponse<Setting>>> {
    let settings = state.settings_service.list().await?;
    Ok(Json(listed("Settings berhasil diambil", settings)))
}

/// POST /api/admin/settings
pub async fn create_setting(
    State(state): State<AppState>,
    Json(payload): Json<SettingRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Setting>>)> {
    validate_request(&payload)?;

    let setting = state.settings_service.create(payload).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok("Setting berhasil dibuat", setting))))
}

/// GET /api/admin/settings/{id}
pub async fn get_setting(
    State(state): State<AppState>,
    Path(setting_id): Path<i64>,
) -> AppResult<Json<ApiResponse<Setting>>> {
    let setting = state.settings_service.get(setting_id).await?;
    Ok(Json(ApiResponse::ok("Setting berhasil diambil", setting)))
}

/// PUT /api/admin/settings/{id}
pub async fn update_setting(
    State(state): State<AppState>,
    Path(setting_id): Path<i64>,
    Json(payload): Json<SettingRequest>,
) -> AppResult<Json<ApiResponse<Setting>>> {
    validate_request(&payload)?;

    let setting = state.settings_service.update(setting_id, payload).await?;
    Ok(Json(ApiResponse::ok("Setting berhasil diupdate", setting)))
}

/// DELETE /api/admin/settings/{id}
pub async fn delete_setting(
    State(state): State<AppState>,
    Path(setting_id): Path<i64>,
) -> AppResult<Json<ApiResponse<()>>> {
    state.settings_service.delete(setting_id).await?;
    Ok(Json(ApiResponse::empty("Setting berhasil dihapus")))
}
