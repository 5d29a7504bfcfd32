//! Payment Gateway Adapter
//!
//! Each third-party provider is a self-contained strategy behind the
//! [`PaymentProvider`] trait, selected at runtime through a name-keyed
//! [`ProviderRegistry`]. Which provider (and which credentials) applies is
//! per-event configuration, never shared mutable state.

mod midtrans;
mod mock;
mod xendit;

pub use midtrans::MidtransProvider;
pub use mock::MockProvider;
pub use xendit::XenditProvider;

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use shared::{BuyerContact, OrderStatus};
use thiserror::Error;

// ============================================================================
// Credentials
// ============================================================================

/// A credential value that must never appear in logs.
///
/// `Debug`/`Display` are masked; the wrapped value is revealed only at the
/// point of use via [`Secret::reveal`].
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Secret(value.into())
    }

    /// Access the wrapped value. Call at the point of use only.
    pub fn reveal(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for Secret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Secret(****)")
    }
}

impl std::fmt::Display for Secret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("****")
    }
}

/// Production vs sandbox endpoints/keys
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentEnvironment {
    Sandbox,
    Production,
}

/// Per-event provider credentials
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProviderCredentials {
    pub environment: PaymentEnvironment,
    /// Server-side API key (Basic auth / signature input)
    pub server_key: Secret,
    /// Shared token expected on asynchronous callbacks
    pub callback_token: Secret,
}

// ============================================================================
// Charge / Callback types
// ============================================================================

/// One line item on a charge (one per ticket)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LineItem {
    pub id: String,
    pub name: String,
    pub price: f64,
    pub quantity: i32,
}

/// Everything a provider needs to create a charge
#[derive(Debug, Clone, PartialEq)]
pub struct ChargeRequest {
    pub order_code: String,
    pub gross_amount: f64,
    pub currency: String,
    pub items: Vec<LineItem>,
    pub customer: BuyerContact,
}

/// Opaque continuation handle returned by a provider
///
/// The buyer completes payment out-of-band through this token/URL; the raw
/// response is persisted for reconciliation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PaymentAccessor {
    pub provider: String,
    pub token: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_ref: Option<String>,
    pub raw: serde_json::Value,
}

/// Raw asynchronous callback as received from the provider
#[derive(Debug, Clone)]
pub struct CallbackPayload {
    pub body: serde_json::Value,
    /// Value of the `x-callback-token` header, when the transport carries one
    pub callback_token: Option<String>,
}

/// A verified, normalized callback
#[derive(Debug, Clone, PartialEq)]
pub struct CallbackVerdict {
    pub order_code: String,
    /// Normalized status: `Pending` callbacks are acknowledged no-ops
    pub status: OrderStatus,
    /// Provider-side transaction reference
    pub provider_ref: Option<String>,
    /// Stable id of this notification, recorded for idempotency auditing
    pub callback_id: Option<String>,
}

// ============================================================================
// Errors
// ============================================================================

/// Provider adapter errors
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Provider request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Provider rejected charge ({code}): {message}")]
    Rejected { code: String, message: String },

    #[error("Callback signature mismatch")]
    InvalidSignature,

    #[error("Malformed callback payload: {0}")]
    MalformedPayload(String),

    #[error("Unknown payment provider: {0}")]
    UnknownProvider(String),
}

// ============================================================================
// Provider contract
// ============================================================================

/// One payment provider strategy
#[async_trait]
pub trait PaymentProvider: Send + Sync {
    /// Registry key, e.g. "midtrans"
    fn name(&self) -> &'static str;

    /// Create a charge with the provider and return the buyer's accessor.
    ///
    /// Runs after the seat-locking transaction has committed; a failure
    /// here rolls back the in-flight order creation.
    async fn charge(
        &self,
        req: &ChargeRequest,
        creds: &ProviderCredentials,
    ) -> Result<PaymentAccessor, ProviderError>;

    /// Pull the order code out of a callback without verifying it.
    ///
    /// Used to resolve the per-event credentials the full verification
    /// needs.
    fn extract_order_code(&self, payload: &CallbackPayload) -> Result<String, ProviderError>;

    /// Verify a callback's authenticity and normalize it.
    fn verify_callback(
        &self,
        payload: &CallbackPayload,
        creds: &ProviderCredentials,
    ) -> Result<CallbackVerdict, ProviderError>;

    /// Map a provider-specific status string onto the order lifecycle.
    fn map_status(&self, raw: &str) -> Option<OrderStatus>;
}

// ============================================================================
// Registry
// ============================================================================

/// Name-keyed provider registry
///
/// Providers register once at startup; selection happens per event via
/// `EventConfig.provider`.
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    providers: HashMap<String, Arc<dyn PaymentProvider>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self {
            providers: HashMap::new(),
        }
    }

    /// Registry with the built-in production providers
    pub fn with_default_providers() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(MidtransProvider::new()));
        registry.register(Arc::new(XenditProvider::new()));
        registry
    }

    pub fn register(&mut self, provider: Arc<dyn PaymentProvider>) {
        self.providers.insert(provider.name().to_string(), provider);
    }

    pub fn get(&self, name: &str) -> Result<Arc<dyn PaymentProvider>, ProviderError> {
        self.providers
            .get(name)
            .cloned()
            .ok_or_else(|| ProviderError::UnknownProvider(name.to_string()))
    }
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("providers", &self.providers.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secret_is_masked_in_debug_output() {
        let secret = Secret::new("SB-Mid-server-abc123");
        assert_eq!(format!("{:?}", secret), "Secret(****)");
        assert_eq!(format!("{}", secret), "****");
        assert_eq!(secret.reveal(), "SB-Mid-server-abc123");
    }

    #[test]
    fn registry_resolves_by_name() {
        let registry = ProviderRegistry::with_default_providers();
        assert!(registry.get("midtrans").is_ok());
        assert!(registry.get("xendit").is_ok());
        assert!(matches!(
            registry.get("paypal"),
            Err(ProviderError::UnknownProvider(_))
        ));
    }
}
