// /commerce/services/commerce-service/src/api/handlers/transaction.rs

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

/// GET /api/transactions
pub async fn list_transactions(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Query(params): Query<PageQuery>,
) -> AppResult<Json<ListResponse<Transaction>>> {
    let (page, limit, offset) = validate_pagination(params.page, params.limit)?;
    let (transactions, total) = state.payment_service.list(&user, limit as i64, offset).await?;
    Ok(Json(paginated("Transactions berhasil diambil", transactions, page, limit, total)))
}

/// POST /api/transactions
pub async fn create_transaction(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<CreateTransactionRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Transaction>>)> {
    validate_request(&payload)?;

    let transaction = state.payment_service.create(&user, payload).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok("Transaction berhasil dibuat", transaction))))
}

/// GET /api/transactions/{id}
pub async fn get_transaction(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(transaction_id): Path<i64>,
) -> AppResult<Json<ApiResponse<Transaction>>> {
    let transaction = state.payment_service.get(&user, transaction_id).await?;
    Ok(Json(ApiResponse::ok("Transaction berhasil diambil", transaction)))
}

/// PUT /api/transactions/{id}
pub async fn update_transaction(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(transaction_id): Path<i64>,
    Json(payload): Json<UpdateTransactionRequest>,
) -> AppResult<Json<ApiResponse<Transaction>>> {
    validate_request(&payload)?;

    let transaction = state.payment_service.update(&user, transaction_id, payload).await?;
    Ok(Json(ApiResponse::ok("Transaction berhasil diupdate", transaction)))
}

/// DELETE /api/transactions/{id}
pub async fn delete_transaction(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(transaction_id): Path<i64>,
) -> AppResult<Json<ApiResponse<()>>> {
    state.payment_service.delete(&user, transaction_id).await?;
    Ok(Json(ApiResponse::empty("Transaction berhasil dihapus")))
}

/// POST /api/transactions/{id}/pay
pub async fn pay_transaction(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(transaction_id): Path<i64>,
) -> AppResult<Json<ApiResponse<PaymentOutcome>>> {
    let outcome = state.payment_service.pay(&user, transaction_id).await?;

    let message = if outcome.payment_url.is_some() {
        "Lanjutkan pembayaran di halaman gateway"
    } else {
        "Pembayaran berhasil"
    };
    Ok(Json(ApiResponse::ok(message, outcome)))
}

/// POST /api/transactions/verify (callback gateway, diteruskan atas nama pemilik transaction)
pub async fn verify_transaction(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<VerifyTransactionRequest>,
) -> AppResult<Json<ApiResponse<Transaction>>> {
    validate_request(&payload)?;

    let transaction = state.payment_service.verify(&user, payload).await?;
    let message = match transaction.status {
        TransactionStatus::Success => "Pembayaran berhasil diverifikasi",
        TransactionStatus::Canceled => "Pembayaran dibatalkan",
        _ => "Pembayaran gagal",
    };
    Ok(Json(ApiResponse::ok(message, transaction)))
}

/// GET /api/wallet
pub async fn get_wallet(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> AppResult<Json<ApiResponse<Wallet>>> {
    let wallet = state.payment_service.wallet(user.id).await?;
    Ok(Json(ApiResponse::ok("Wallet berhasil diambil", wallet)))
}
