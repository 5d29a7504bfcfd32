//! Midtrans Snap provider
//!
//! Charge creation goes through the Snap transactions API; asynchronous
//! notifications are authenticated with the documented SHA-512 signature
//! over `order_id + status_code + gross_amount + server_key`.

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use sha2::{Digest, Sha512};
use shared::OrderStatus;

use super::{
    CallbackPayload, CallbackVerdict, ChargeRequest, PaymentAccessor, PaymentEnvironment,
    PaymentProvider, ProviderCredentials, ProviderError,
};

const SANDBOX_BASE: &str = "https://app.sandbox.midtrans.com";
const PRODUCTION_BASE: &str = "https://app.midtrans.com";

pub struct MidtransProvider {
    client: reqwest::Client,
}

impl MidtransProvider {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    fn base_url(env: PaymentEnvironment) -> &'static str {
        match env {
            PaymentEnvironment::Sandbox => SANDBOX_BASE,
            PaymentEnvironment::Production => PRODUCTION_BASE,
        }
    }

    fn basic_auth(creds: &ProviderCredentials) -> String {
        format!(
            "Basic {}",
            BASE64.encode(format!("{}:", creds.server_key.reveal()))
        )
    }

    /// Signature per the notification docs: sha512 over the concatenation
    /// of order_id, status_code, gross_amount and the server key.
    fn signature(order_id: &str, status_code: &str, gross_amount: &str, server_key: &str) -> String {
        let mut hasher = Sha512::new();
        hasher.update(order_id.as_bytes());
        hasher.update(status_code.as_bytes());
        hasher.update(gross_amount.as_bytes());
        hasher.update(server_key.as_bytes());
        hex::encode(hasher.finalize())
    }

    fn field<'a>(body: &'a serde_json::Value, name: &str) -> Result<&'a str, ProviderError> {
        body.get(name)
            .and_then(|v| v.as_str())
            .ok_or_else(|| ProviderError::MalformedPayload(format!("missing field: {name}")))
    }
}

impl Default for MidtransProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl PaymentProvider for MidtransProvider {
    fn name(&self) -> &'static str {
        "midtrans"
    }

    async fn charge(
        &self,
        req: &ChargeRequest,
        creds: &ProviderCredentials,
    ) -> Result<PaymentAccessor, ProviderError> {
        let url = format!("{}/snap/v1/transactions", Self::base_url(creds.environment));

        let item_details: Vec<serde_json::Value> = req
            .items
            .iter()
            .map(|item| {
                serde_json::json!({
                    "id": item.id,
                    "name": item.name,
                    "price": item.price,
                    "quantity": item.quantity,
                })
            })
            .collect();

        let body = serde_json::json!({
            "transaction_details": {
                "order_id": req.order_code,
                "gross_amount": req.gross_amount,
            },
            "item_details": item_details,
            "customer_details": {
                "first_name": req.customer.name,
                "email": req.customer.email,
                "phone": req.customer.phone,
            },
        });

        let response = self
            .client
            .post(&url)
            .header("Authorization", Self::basic_auth(creds))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let raw: serde_json::Value = response.json().await?;

        if !status.is_success() {
            let message = raw
                .get("error_messages")
                .map(|m| m.to_string())
                .unwrap_or_else(|| "unspecified error".to_string());
            return Err(ProviderError::Rejected {
                code: status.as_u16().to_string(),
                message,
            });
        }

        let token = raw
            .get("token")
            .and_then(|v| v.as_str())
            .ok_or_else(|| ProviderError::MalformedPayload("missing field: token".to_string()))?
            .to_string();
        let redirect_url = raw
            .get("redirect_url")
            .and_then(|v| v.as_str())
            .map(str::to_string);

        Ok(PaymentAccessor {
            provider: self.name().to_string(),
            token,
            redirect_url,
            provider_ref: None,
            raw,
        })
    }

    fn extract_order_code(&self, payload: &CallbackPayload) -> Result<String, ProviderError> {
        Ok(Self::field(&payload.body, "order_id")?.to_string())
    }

    fn verify_callback(
        &self,
        payload: &CallbackPayload,
        creds: &ProviderCredentials,
    ) -> Result<CallbackVerdict, ProviderError> {
        let body = &payload.body;
        let order_id = Self::field(body, "order_id")?;
        let status_code = Self::field(body, "status_code")?;
        let gross_amount = Self::field(body, "gross_amount")?;
        let signature_key = Self::field(body, "signature_key")?;
        let transaction_status = Self::field(body, "transaction_status")?;

        let expected = Self::signature(
            order_id,
            status_code,
            gross_amount,
            creds.server_key.reveal(),
        );
        if signature_key != expected {
            return Err(ProviderError::InvalidSignature);
        }

        // "capture" is only final once fraud screening accepts it
        let fraud_status = body.get("fraud_status").and_then(|v| v.as_str());
        let status = if transaction_status == "capture" && fraud_status == Some("challenge") {
            OrderStatus::Pending
        } else {
            self.map_status(transaction_status).ok_or_else(|| {
                ProviderError::MalformedPayload(format!(
                    "unknown transaction_status: {transaction_status}"
                ))
            })?
        };

        let provider_ref = body
            .get("transaction_id")
            .and_then(|v| v.as_str())
            .map(str::to_string);

        Ok(CallbackVerdict {
            order_code: order_id.to_string(),
            status,
            provider_ref: provider_ref.clone(),
            callback_id: provider_ref,
        })
    }

    fn map_status(&self, raw: &str) -> Option<OrderStatus> {
        match raw {
            "capture" | "settlement" => Some(OrderStatus::Completed),
            "pending" | "authorize" => Some(OrderStatus::Pending),
            "deny" | "cancel" | "expire" | "failure" => Some(OrderStatus::Cancelled),
            _ => None,
        }
    }
}
