// /commerce/services/commerce-service/src/config.rs

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::utils::{
    constants::DEFAULT_PAYMENT_WINDOW_MINUTES,
    error::{AppError, AppResult},
};

/// Konfigurasi payment gateway
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub base_url: String,
    pub start_pay_url: String,
    pub merchant_id: String,
    pub callback_url: String,
    pub timeout: Duration,
    /// Berapa lama callback ditunggu sebelum payment dianggap abandoned
    pub payment_window_minutes: i64,
}

impl GatewayConfig {
    pub fn payment_window(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.payment_window_minutes)
    }
}

/// Konfigurasi order sweep
#[derive(Debug, Clone)]
pub struct SweepConfig {
    pub enabled: bool,
    pub cron: String,
    pub max_age_minutes: i64,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub database_max_connections: u32,
    pub database_acquire_timeout: Duration,
    pub server_port: u16,
    pub request_timeout: Duration,
    pub environment: String,
    pub allowed_origins: String,
    pub gateway: GatewayConfig,
    pub sweep: SweepConfig,
}

impl AppConfig {
    /// Load config dari environment (.env sudah di-load oleh main)
    pub fn from_env() -> AppResult<Self> {
        let database_url = env::var("DATABASE_URL")
            .map_err(|_| AppError::Configuration("DATABASE_URL harus di-set di environment".to_string()))?;

        let gateway = GatewayConfig {
            base_url: env_or("GATEWAY_BASE_URL", "https://sandbox.zarinpal.com/pg/v4/payment"),
            start_pay_url: env_or("GATEWAY_START_PAY_URL", "https://sandbox.zarinpal.com/pg/StartPay"),
            merchant_id: env_or("GATEWAY_MERCHANT_ID", ""),
            callback_url: env_or("GATEWAY_CALLBACK_URL", "http://localhost:3004/api/transactions/verify"),
            timeout: Duration::from_secs(parse_env("GATEWAY_TIMEOUT_SECONDS", 30u64)?),
            payment_window_minutes: parse_env("GATEWAY_PAYMENT_WINDOW_MINUTES", DEFAULT_PAYMENT_WINDOW_MINUTES)?,
        };

        if gateway.payment_window_minutes <= 0 {
            return Err(AppError::Configuration(
                "GATEWAY_PAYMENT_WINDOW_MINUTES harus lebih besar dari 0".to_string(),
            ));
        }

        let sweep = SweepConfig {
            enabled: parse_env("ORDER_SWEEP_ENABLED", true)?,
            cron: env_or("ORDER_SWEEP_CRON", "0 0 * * * *"),
            max_age_minutes: parse_env("ORDER_SWEEP_MAX_AGE_MINUTES", 60i64)?,
        };

        if sweep.max_age_minutes <= 0 {
            return Err(AppError::Configuration(
                "ORDER_SWEEP_MAX_AGE_MINUTES harus lebih besar dari 0".to_string(),
            ));
        }

        let config = Self {
            database_url,
            database_max_connections: parse_env("DATABASE_MAX_CONNECTIONS", 10u32)?,
            database_acquire_timeout: Duration::from_secs(
                parse_env("DATABASE_ACQUIRE_TIMEOUT_SECONDS", 3u64)?,
            ),
            server_port: parse_env("SERVER_PORT", 3004u16)?,
            request_timeout: Duration::from_secs(parse_env("REQUEST_TIMEOUT_SECONDS", 30u64)?),
            environment: env_or("ENVIRONMENT", "development").to_lowercase(),
            allowed_origins: env_or("ALLOWED_ORIGINS", "http://localhost:8080"),
            gateway,
            sweep,
        };

        if config.gateway.merchant_id.is_empty() {
            tracing::warn!("⚠️ GATEWAY_MERCHANT_ID kosong, online payment akan ditolak gateway");
        }

        tracing::info!("Application configuration loaded ({})", config.environment);
        Ok(config)
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn bind_address(&self) -> String {
        format!("0.0.0.0:{}", self.server_port)
    }
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse env var ke tipe T, default kalau tidak di-set
fn parse_env<T>(key: &str, default: T) -> AppResult<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw.trim().parse::<T>().map_err(|e| {
            AppError::Configuration(format!("Invalid {} value '{}': {}", key, raw, e))
        }),
        Err(_) => Ok(default),
    }
}
