// /commerce/services/commerce-service/src/core/gateway.rs

use async_trait::async_trait;
use bigdecimal::{BigDecimal, ToPrimitive};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::{
    config::GatewayConfig,
    models::TransactionStatus,
    utils::{
        constants::{GATEWAY_CODE_ALREADY_VERIFIED, GATEWAY_CODE_SUCCESS, GATEWAY_STATUS_OK},
        error::{AppError, AppResult},
    },
};

/// Hasil initiate: reference dari provider dan URL untuk redirect user
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaymentInitiation {
    pub reference: String,
    pub payment_url: String,
}

/// Hasil confirm dari provider
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentConfirmation {
    pub status: TransactionStatus,
    pub ref_id: Option<i64>,
    pub fee: Option<i64>,
    pub fee_type: Option<String>,
}

impl PaymentConfirmation {
    fn canceled() -> Self {
        Self {
            status: TransactionStatus::Canceled,
            ref_id: None,
            fee: None,
            fee_type: None,
        }
    }
}

/// Payment gateway eksternal
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn initiate(&self, amount: &BigDecimal, description: &str) -> AppResult<PaymentInitiation>;

    async fn confirm(
        &self,
        reference: &str,
        amount: &BigDecimal,
        provider_status: &str,
    ) -> AppResult<PaymentConfirmation>;
}

#[derive(Debug, Serialize)]
struct InitiateRequest<'a> {
    merchant_id: &'a str,
    amount: i64,
    callback_url: &'a str,
    description: &'a str,
}

#[derive(Debug, Serialize)]
struct ConfirmRequest<'a> {
    merchant_id: &'a str,
    authority: &'a str,
    amount: i64,
}

// Provider mengirim `data: []` kalau request gagal
#[derive(Debug, Deserialize)]
struct GatewayEnvelope {
    #[serde(default)]
    data: serde_json::Value,
    #[serde(default)]
    errors: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct GatewayData {
    code: Option<i64>,
    authority: Option<String>,
    ref_id: Option<i64>,
    fee: Option<i64>,
    fee_type: Option<String>,
}

/// Client HTTP untuk REST payment gateway (request.json / verify.json)
pub struct GatewayClient {
    client: Client,
    config: GatewayConfig,
}

impl GatewayClient {
    pub fn new(config: GatewayConfig) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AppError::Configuration(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), path)
    }

    /// URL halaman pembayaran untuk authority
    pub fn payment_url(&self, authority: &str) -> String {
        format!("{}/{}", self.config.start_pay_url.trim_end_matches('/'), authority)
    }

    async fn post<T: Serialize + ?Sized>(&self, path: &str, body: &T) -> AppResult<GatewayData> {
        let response = self.client.post(self.endpoint(path)).json(body).send().await?;

        let status = response.status();
        let envelope: GatewayEnvelope = response
            .json()
            .await
            .map_err(|e| AppError::Gateway(format!("Failed to parse gateway response: {}", e)))?;

        let data = match envelope.data {
            data @ serde_json::Value::Object(_) => serde_json::from_value::<GatewayData>(data).ok(),
            _ => None,
        };

        match data {
            Some(data) if data.code.is_some() => Ok(data),
            _ => Err(AppError::Gateway(format!(
                "Gateway {} tanpa code (HTTP {}): {}",
                path, status, envelope.errors
            ))),
        }
    }
}

/// Amount dikirim ke gateway sebagai integer
fn amount_as_i64(amount: &BigDecimal) -> AppResult<i64> {
    amount
        .to_i64()
        .filter(|a| *a > 0)
        .ok_or_else(|| AppError::BadRequest(format!("Amount {} tidak valid untuk gateway", amount)))
}

#[async_trait]
impl PaymentGateway for GatewayClient {
    async fn initiate(&self, amount: &BigDecimal, description: &str) -> AppResult<PaymentInitiation> {
        let request = InitiateRequest {
            merchant_id: &self.config.merchant_id,
            amount: amount_as_i64(amount)?,
            callback_url: &self.config.callback_url,
            description,
        };

        let data = self.post("request.json", &request).await?;
        if data.code != Some(GATEWAY_CODE_SUCCESS) {
            return Err(AppError::Gateway(format!(
                "Gateway menolak payment request (code {:?})",
                data.code
            )));
        }

        let reference = data
            .authority
            .filter(|a| !a.is_empty())
            .ok_or_else(|| AppError::Gateway("Gateway tidak mengembalikan authority".to_string()))?;

        tracing::info!("Payment initiated di gateway: {}", reference);
        Ok(PaymentInitiation {
            payment_url: self.payment_url(&reference),
            reference,
        })
    }

    async fn confirm(
        &self,
        reference: &str,
        amount: &BigDecimal,
        provider_status: &str,
    ) -> AppResult<PaymentConfirmation> {
        // User batal di halaman gateway, tidak perlu verify
        if provider_status != GATEWAY_STATUS_OK {
            tracing::info!("Payment {} dibatalkan user ({})", reference, provider_status);
            return Ok(PaymentConfirmation::canceled());
        }

        let request = ConfirmRequest {
            merchant_id: &self.config.merchant_id,
            authority: reference,
            amount: amount_as_i64(amount)?,
        };

        let data = self.post("verify.json", &request).await?;
        let status = match data.code {
            Some(GATEWAY_CODE_SUCCESS) | Some(GATEWAY_CODE_ALREADY_VERIFIED) => TransactionStatus::Success,
            _ => TransactionStatus::Failed,
        };

        tracing::info!("Payment {} verified: {:?} (code {:?})", reference, status, data.code);
        Ok(PaymentConfirmation {
            status,
            ref_id: data.ref_id,
            fee: data.fee,
            fee_type: data.fee_type,
        })
    }
}
