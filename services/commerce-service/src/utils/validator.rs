// /commerce/services/commerce-service/src/utils/validator.rs

use bigdecimal::{BigDecimal, Zero};
use once_cell::sync::Lazy;
use regex::Regex;
use validator::Validate;
use crate::utils::error::{AppError, AppResult};
use crate::utils::constants::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

static SLUG_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").expect("slug regex valid")
});

static SKU_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9][A-Za-z0-9_-]*$").expect("sku regex valid")
});

/// Jalankan derive validator dan convert ke AppError
pub fn validate_request<T: Validate>(payload: &T) -> AppResult<()> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e.to_string()))
}

/// Validasi amount harus positif
pub fn validate_positive_amount(amount: &BigDecimal, field_name: &str) -> AppResult<()> {
    if amount <= &BigDecimal::zero() {
        return Err(AppError::BadRequest(format!("{} harus lebih besar dari 0", field_name)));
    }
    Ok(())
}

/// Validasi amount tidak negatif (harga boleh 0)
pub fn validate_non_negative_amount(amount: &BigDecimal, field_name: &str) -> AppResult<()> {
    if amount < &BigDecimal::zero() {
        return Err(AppError::BadRequest(format!("{} tidak boleh negatif", field_name)));
    }
    Ok(())
}

/// Amount harus bilangan bulat (kolom NUMERIC(20,0))
pub fn validate_whole_amount(amount: &BigDecimal, field_name: &str) -> AppResult<()> {
    if amount.with_scale(0) != *amount {
        return Err(AppError::BadRequest(format!("{} harus bilangan bulat", field_name)));
    }
    Ok(())
}

/// Validasi slug: lowercase, angka, dash
pub fn validate_slug(slug: &str) -> AppResult<()> {
    if !SLUG_PATTERN.is_match(slug) {
        return Err(AppError::BadRequest(format!(
            "Slug '{}' hanya boleh huruf kecil, angka, dan dash",
            slug
        )));
    }
    Ok(())
}

pub fn validate_sku(sku: &str) -> AppResult<()> {
    if !SKU_PATTERN.is_match(sku) {
        return Err(AppError::BadRequest(format!("SKU '{}' tidak valid", sku)));
    }
    Ok(())
}

/// Normalisasi pagination, return (page, limit, offset)
pub fn validate_pagination(page: Option<u32>, limit: Option<u32>) -> AppResult<(u32, u32, i64)> {
    let page = page.unwrap_or(1);
    let limit = limit.unwrap_or(DEFAULT_PAGE_SIZE);

    if page == 0 {
        return Err(AppError::BadRequest("Page harus dimulai dari 1".to_string()));
    }

    if limit == 0 {
        return Err(AppError::BadRequest("Limit harus lebih besar dari 0".to_string()));
    }

    if limit > MAX_PAGE_SIZE {
        return Err(AppError::BadRequest(format!(
            "Limit maksimal {} items per page",
            MAX_PAGE_SIZE
        )));
    }

    let offset = (page as i64 - 1) * limit as i64;
    Ok((page, limit, offset))
}

/// Validasi reference dari payment gateway
pub fn validate_res_number(res_number: &str) -> AppResult<()> {
    let trimmed = res_number.trim();
    if trimmed.is_empty() {
        return Err(AppError::BadRequest("res_number tidak boleh kosong".to_string()));
    }

    if trimmed.len() > 100 {
        return Err(AppError::BadRequest("res_number terlalu panjang".to_string()));
    }

    Ok(())
}
