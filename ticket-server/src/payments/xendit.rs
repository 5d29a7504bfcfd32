//! Xendit invoice provider
//!
//! Charges are Xendit invoices; callbacks are authenticated by comparing
//! the `x-callback-token` header against the per-event webhook token. Test
//! and live API keys share one host, the key itself selects the
//! environment.

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use shared::OrderStatus;

use super::{
    CallbackPayload, CallbackVerdict, ChargeRequest, PaymentAccessor, PaymentProvider,
    ProviderCredentials, ProviderError,
};

const API_BASE: &str = "https://api.xendit.co";

pub struct XenditProvider {
    client: reqwest::Client,
}

impl XenditProvider {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    fn basic_auth(creds: &ProviderCredentials) -> String {
        format!(
            "Basic {}",
            BASE64.encode(format!("{}:", creds.server_key.reveal()))
        )
    }

    fn field<'a>(body: &'a serde_json::Value, name: &str) -> Result<&'a str, ProviderError> {
        body.get(name)
            .and_then(|v| v.as_str())
            .ok_or_else(|| ProviderError::MalformedPayload(format!("missing field: {name}")))
    }
}

impl Default for XenditProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl PaymentProvider for XenditProvider {
    fn name(&self) -> &'static str {
        "xendit"
    }

    async fn charge(
        &self,
        req: &ChargeRequest,
        creds: &ProviderCredentials,
    ) -> Result<PaymentAccessor, ProviderError> {
        let url = format!("{API_BASE}/v2/invoices");

        let items: Vec<serde_json::Value> = req
            .items
            .iter()
            .map(|item| {
                serde_json::json!({
                    "name": item.name,
                    "price": item.price,
                    "quantity": item.quantity,
                })
            })
            .collect();

        let body = serde_json::json!({
            "external_id": req.order_code,
            "amount": req.gross_amount,
            "currency": req.currency,
            "payer_email": req.customer.email,
            "description": format!("Ticket order {}", req.order_code),
            "items": items,
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
                .get("message")
                .and_then(|v| v.as_str())
                .unwrap_or("unspecified error")
                .to_string();
            return Err(ProviderError::Rejected {
                code: status.as_u16().to_string(),
                message,
            });
        }

        let invoice_id = raw
            .get("id")
            .and_then(|v| v.as_str())
            .ok_or_else(|| ProviderError::MalformedPayload("missing field: id".to_string()))?
            .to_string();
        let invoice_url = raw
            .get("invoice_url")
            .and_then(|v| v.as_str())
            .map(str::to_string);

        Ok(PaymentAccessor {
            provider: self.name().to_string(),
            token: invoice_id.clone(),
            redirect_url: invoice_url,
            provider_ref: Some(invoice_id),
            raw,
        })
    }

    fn extract_order_code(&self, payload: &CallbackPayload) -> Result<String, ProviderError> {
        Ok(Self::field(&payload.body, "external_id")?.to_string())
    }

    fn verify_callback(
        &self,
        payload: &CallbackPayload,
        creds: &ProviderCredentials,
    ) -> Result<CallbackVerdict, ProviderError> {
        match &payload.callback_token {
            Some(token) if token.as_str() == creds.callback_token.reveal() => {}
            _ => return Err(ProviderError::InvalidSignature),
        }

        let order_code = Self::field(&payload.body, "external_id")?.to_string();
        let raw_status = Self::field(&payload.body, "status")?;
        let status = self.map_status(raw_status).ok_or_else(|| {
            ProviderError::MalformedPayload(format!("unknown status: {raw_status}"))
        })?;

        let invoice_id = payload
            .body
            .get("id")
            .and_then(|v| v.as_str())
            .map(str::to_string);

        Ok(CallbackVerdict {
            order_code,
            status,
            provider_ref: invoice_id.clone(),
            callback_id: invoice_id,
        })
    }

    fn map_status(&self, raw: &str) -> Option<OrderStatus> {
        match raw {
            "PAID" | "SETTLED" => Some(OrderStatus::Completed),
            "PENDING" => Some(OrderStatus::Pending),
            "EXPIRED" => Some(OrderStatus::Cancelled),
            _ => None,
        }
    }
}
