// /commerce/services/commerce-service/src/core/settings.rs

use std::str::FromStr;
use std::sync::Arc;

use bigdecimal::{BigDecimal, Zero};

use crate::{
    models::*,
    repository::{SettingStore, Store, UnitOfWork},
    utils::{
        constants::{SETTING_PAYMENT_METHODS, SETTING_TAX},
        error::{AppError, AppResult},
    },
};

/// Snapshot typed dari settings yang aktif
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShopSettings {
    /// Persentase tax, 0 kalau tidak di-set
    pub tax_percent: BigDecimal,
    pub payment_methods: Vec<PaymentMethodEntry>,
}

impl ShopSettings {
    pub fn from_settings(settings: &[Setting]) -> AppResult<Self> {
        let mut snapshot = ShopSettings::default();

        for setting in settings.iter().filter(|s| s.is_active) {
            match setting.key.as_str() {
                SETTING_TAX => snapshot.tax_percent = parse_tax(&setting.value)?,
                SETTING_PAYMENT_METHODS => {
                    snapshot.payment_methods = parse_payment_methods(&setting.value)?
                }
                _ => {}
            }
        }

        Ok(snapshot)
    }

    /// Load dari unit of work yang sedang jalan
    pub async fn load<S: SettingStore + ?Sized>(store: &mut S) -> AppResult<Self> {
        let settings = store.active_settings().await?;
        Self::from_settings(&settings)
    }

    /// Kode payment method untuk id dari setting `payment_methods`
    pub fn payment_method_code(&self, payment_method_id: i64) -> AppResult<PaymentMethodCode> {
        let entry = self
            .payment_methods
            .iter()
            .find(|m| m.id == payment_method_id)
            .ok_or_else(|| {
                AppError::UnsupportedPaymentMethod(format!("payment method id {}", payment_method_id))
            })?;
        PaymentMethodCode::parse(&entry.code)
    }
}

/// Tax boleh number atau numeric string
fn parse_tax(value: &serde_json::Value) -> AppResult<BigDecimal> {
    let parsed = match value {
        serde_json::Value::Number(n) => BigDecimal::from_str(&n.to_string()).ok(),
        serde_json::Value::String(s) => BigDecimal::from_str(s.trim()).ok(),
        serde_json::Value::Null => Some(BigDecimal::zero()),
        _ => None,
    };

    match parsed {
        Some(tax) if tax >= BigDecimal::zero() => Ok(tax),
        _ => Err(AppError::ValidationError(format!(
            "Setting '{}' harus angka tidak negatif, dapat {}",
            SETTING_TAX, value
        ))),
    }
}

fn parse_payment_methods(value: &serde_json::Value) -> AppResult<Vec<PaymentMethodEntry>> {
    serde_json::from_value::<Vec<PaymentMethodEntry>>(value.clone()).map_err(|e| {
        AppError::ValidationError(format!(
            "Setting '{}' harus list {{id, code}}: {}",
            SETTING_PAYMENT_METHODS, e
        ))
    })
}

/// Key yang dikenal harus punya value dengan bentuk yang benar
fn validate_known_key(key: &str, value: &serde_json::Value) -> AppResult<()> {
    match key {
        SETTING_TAX => parse_tax(value).map(|_| ()),
        SETTING_PAYMENT_METHODS => {
            let methods = parse_payment_methods(value)?;
            for method in &methods {
                PaymentMethodCode::parse(&method.code)?;
            }
            Ok(())
        }
        _ => Ok(()),
    }
}

/// CRUD untuk settings admin
pub struct SettingsService {
    store: Arc<dyn Store>,
}

impl SettingsService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn list(&self) -> AppResult<Vec<Setting>> {
        let mut uow = self.store.begin().await?;
        uow.list_settings().await
    }

    pub async fn get(&self, setting_id: i64) -> AppResult<Setting> {
        let mut uow = self.store.begin().await?;
        uow.get_setting(setting_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Setting tidak ditemukan".to_string()))
    }

    pub async fn create(&self, request: SettingRequest) -> AppResult<Setting> {
        let setting = Self::to_new_setting(request)?;

        let mut uow = self.store.begin().await?;
        let created = uow.insert_setting(&setting).await?;
        uow.commit().await?;

        tracing::info!("Setting '{}' dibuat", created.key);
        Ok(created)
    }

    pub async fn update(&self, setting_id: i64, request: SettingRequest) -> AppResult<Setting> {
        let setting = Self::to_new_setting(request)?;

        let mut uow = self.store.begin().await?;
        let updated = uow
            .update_setting(setting_id, &setting)
            .await?
            .ok_or_else(|| AppError::NotFound("Setting tidak ditemukan".to_string()))?;
        uow.commit().await?;

        tracing::info!("Setting '{}' diupdate", updated.key);
        Ok(updated)
    }

    pub async fn delete(&self, setting_id: i64) -> AppResult<()> {
        let mut uow = self.store.begin().await?;
        if !uow.delete_setting(setting_id).await? {
            return Err(AppError::NotFound("Setting tidak ditemukan".to_string()));
        }
        uow.commit().await
    }

    pub async fn snapshot(&self) -> AppResult<ShopSettings> {
        let mut uow = self.store.begin().await?;
        ShopSettings::load(uow.as_mut()).await
    }

    fn to_new_setting(request: SettingRequest) -> AppResult<NewSetting> {
        let key = request.key.trim().to_string();
        validate_known_key(&key, &request.value)?;
        Ok(NewSetting {
            key,
            value: request.value,
            description: request.description,
            is_active: request.is_active.unwrap_or(true),
        })
    }
}
