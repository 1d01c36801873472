// /commerce/services/commerce-service/src/api/handlers/mod.rs

pub mod catalog;
pub mod cart;
pub mod order;
pub mod transaction;
pub mod shipping;
pub mod settings;
pub mod maintenance;

use serde::Serialize;

use crate::models::{ListResponse, PaginationMeta};

/// Bungkus hasil query ber-page ke ListResponse
pub(crate) fn paginated<T: Serialize>(
    message: &str,
    data: Vec<T>,
    page: u32,
    limit: u32,
    total: i64,
) -> ListResponse<T> {
    ListResponse {
        success: true,
        message: message.to_string(),
        data,
        pagination: Some(PaginationMeta::new(page, limit, total)),
    }
}

/// List tanpa pagination
pub(crate) fn listed<T: Serialize>(message: &str, data: Vec<T>) -> ListResponse<T> {
    ListResponse {
        success: true,
        message: message.to_string(),
        data,
        pagination: None,
    }
}
