// /commerce/services/commerce-service/src/core/inventory.rs
// Stock counters: quantity (available) dan reserved_quantity (ditahan order)

use crate::{
    repository::CatalogStore,
    utils::error::{AppError, AppResult},
};

fn ensure_positive(qty: i32) -> AppResult<()> {
    if qty <= 0 {
        return Err(AppError::ValidationError(format!(
            "Quantity harus lebih besar dari 0, dapat {}",
            qty
        )));
    }
    Ok(())
}

/// Pindahkan qty dari quantity ke reserved_quantity.
/// Gagal dengan InsufficientStock tanpa mengubah apa pun.
pub async fn reserve<S: CatalogStore + ?Sized>(store: &mut S, variation_id: i64, qty: i32) -> AppResult<()> {
    ensure_positive(qty)?;

    if !store.reserve_stock(variation_id, qty).await? {
        tracing::debug!("Reserve gagal: variation {} qty {}", variation_id, qty);
        return Err(AppError::InsufficientStock {
            variation_id,
            requested: qty,
        });
    }
    Ok(())
}

/// Stock yang di-reserve sudah terjual, kurangi reserved_quantity saja
pub async fn finalize<S: CatalogStore + ?Sized>(store: &mut S, variation_id: i64, qty: i32) -> AppResult<()> {
    ensure_positive(qty)?;

    if !store.finalize_stock(variation_id, qty).await? {
        return Err(AppError::Conflict(format!(
            "Reserved stock variation {} kurang dari {}",
            variation_id, qty
        )));
    }
    Ok(())
}

/// Kebalikan reserve: stock yang ditahan kembali available
pub async fn release<S: CatalogStore + ?Sized>(store: &mut S, variation_id: i64, qty: i32) -> AppResult<()> {
    ensure_positive(qty)?;

    if !store.release_stock(variation_id, qty).await? {
        return Err(AppError::Conflict(format!(
            "Reserved stock variation {} kurang dari {}",
            variation_id, qty
        )));
    }
    Ok(())
}

/// Kembalikan stock yang sudah di-finalize (cancel setelah bayar)
pub async fn restock<S: CatalogStore + ?Sized>(store: &mut S, variation_id: i64, qty: i32) -> AppResult<()> {
    ensure_positive(qty)?;

    if !store.restock(variation_id, qty).await? {
        return Err(AppError::NotFound(format!(
            "Variation {} tidak ditemukan",
            variation_id
        )));
    }
    Ok(())
}
