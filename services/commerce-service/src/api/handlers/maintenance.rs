// /commerce/services/commerce-service/src/api/handlers/maintenance.rs

use axum::{
    extract::State,
    response::Json,
    Extension,
};

use crate::{
    core::order::SweepReport,
    models::*,
    AppState,
    utils::{error::AppResult, scheduler::run_sweep},
};

/// POST /api/admin/maintenance/sweep
/// Trigger manual untuk cron eksternal, aman dipanggil berulang
pub async fn trigger_sweep(
    State(state): State<AppState>,
    Extension(admin): Extension<CurrentUser>,
) -> AppResult<Json<ApiResponse<SweepReport>>> {
    tracing::info!("Order sweep di-trigger oleh admin {}", admin.id);

    let report = run_sweep(&state.order_service, &state.sweep_metrics, state.sweep_max_age_minutes).await?;
    Ok(Json(ApiResponse::ok("Order sweep selesai", report)))
}

/// GET /api/admin/maintenance/status
pub async fn sweep_status(State(state): State<AppState>) -> Json<serde_json::Value> {
    let status = state.sweep_metrics.get_status().await;
    Json(serde_json::json!({
        "success": true,
        "message": "Status order sweep",
        "data": status,
    }))
}
