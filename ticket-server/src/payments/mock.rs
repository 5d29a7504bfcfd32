//! In-process provider double
//!
//! Stands in for a real gateway in tests and broker-less development runs:
//! records every charge it sees and can be switched into a failing mode to
//! exercise the rollback path.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use shared::OrderStatus;

use super::{
    CallbackPayload, CallbackVerdict, ChargeRequest, PaymentAccessor, PaymentProvider,
    ProviderCredentials, ProviderError,
};

#[derive(Default)]
pub struct MockProvider {
    fail_charges: AtomicBool,
    charges: Mutex<Vec<ChargeRequest>>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `charge` fail (simulated provider outage)
    pub fn set_fail_charges(&self, fail: bool) {
        self.fail_charges.store(fail, Ordering::SeqCst);
    }

    /// Charges recorded so far
    pub fn charges(&self) -> Vec<ChargeRequest> {
        self.charges.lock().expect("mock lock poisoned").clone()
    }
}

#[async_trait::async_trait]
impl PaymentProvider for MockProvider {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn charge(
        &self,
        req: &ChargeRequest,
        _creds: &ProviderCredentials,
    ) -> Result<PaymentAccessor, ProviderError> {
        if self.fail_charges.load(Ordering::SeqCst) {
            return Err(ProviderError::Rejected {
                code: "503".to_string(),
                message: "simulated provider outage".to_string(),
            });
        }

        self.charges
            .lock()
            .expect("mock lock poisoned")
            .push(req.clone());

        Ok(PaymentAccessor {
            provider: self.name().to_string(),
            token: format!("mock-token-{}", req.order_code),
            redirect_url: Some(format!("https://pay.invalid/{}", req.order_code)),
            provider_ref: Some(format!("mock-ref-{}", req.order_code)),
            raw: serde_json::json!({"mock": true}),
        })
    }

    fn extract_order_code(&self, payload: &CallbackPayload) -> Result<String, ProviderError> {
        payload
            .body
            .get("order_code")
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .ok_or_else(|| ProviderError::MalformedPayload("missing field: order_code".to_string()))
    }

    fn verify_callback(
        &self,
        payload: &CallbackPayload,
        _creds: &ProviderCredentials,
    ) -> Result<CallbackVerdict, ProviderError> {
        let order_code = self.extract_order_code(payload)?;
        let raw_status = payload
            .body
            .get("status")
            .and_then(|v| v.as_str())
            .ok_or_else(|| ProviderError::MalformedPayload("missing field: status".to_string()))?;
        let status = self.map_status(raw_status).ok_or_else(|| {
            ProviderError::MalformedPayload(format!("unknown status: {raw_status}"))
        })?;

        let callback_id = payload
            .body
            .get("callback_id")
            .and_then(|v| v.as_str())
            .map(str::to_string);

        Ok(CallbackVerdict {
            order_code,
            status,
            provider_ref: None,
            callback_id,
        })
    }

    fn map_status(&self, raw: &str) -> Option<OrderStatus> {
        match raw {
            "completed" => Some(OrderStatus::Completed),
            "pending" => Some(OrderStatus::Pending),
            "cancelled" => Some(OrderStatus::Cancelled),
            _ => None,
        }
    }
}
