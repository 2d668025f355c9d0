//! Payment provider seam and the sandbox mock.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use sciconnect_core::config::DonationConfig;

use crate::error::PaymentError;

/// Provider-assigned order identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderId(String);

impl OrderId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single-unit purchase order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRequest {
    /// Whole currency units, never below 1.
    pub amount: u64,
    pub currency: String,
    pub description: String,
    pub cause_id: String,
}

/// Proof that an order's funds were captured.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureConfirmation {
    pub order_id: OrderId,
    pub confirmation_id: String,
}

/// External payment collaborator.
///
/// Orders are created first and captured after the payer approves them.
#[async_trait]
pub trait PaymentProvider: Send + Sync {
    async fn create_order(&self, request: OrderRequest) -> Result<OrderId, PaymentError>;

    async fn capture(&self, order: &OrderId) -> Result<CaptureConfirmation, PaymentError>;

    /// Provider name for logs.
    fn name(&self) -> &str;
}

/// Where the mock provider fails, if anywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureStage {
    CreateOrder,
    Capture,
}

/// Sandbox provider that approves every order unless told to fail.
///
/// Like the real sandbox it refuses orders when no client id is configured.
#[derive(Debug)]
pub struct MockPaymentProvider {
    client_id: String,
    fail_at: Mutex<Option<FailureStage>>,
    orders: Mutex<Vec<(OrderId, OrderRequest)>>,
    captures: AtomicUsize,
}

impl Default for MockPaymentProvider {
    fn default() -> Self {
        Self::with_client_id(DonationConfig::default().client_id)
    }
}

impl MockPaymentProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client_id(client_id: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            fail_at: Mutex::new(None),
            orders: Mutex::new(Vec::new()),
            captures: AtomicUsize::new(0),
        }
    }

    /// Sandbox provider for the configured client id.
    pub fn from_config(config: &DonationConfig) -> Self {
        Self::with_client_id(config.client_id.clone())
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn failing_at(stage: FailureStage) -> Self {
        let provider = Self::default();
        provider.set_failure(Some(stage));
        provider
    }

    pub fn set_failure(&self, stage: Option<FailureStage>) {
        *self.fail_at.lock().expect("failure mutex poisoned") = stage;
    }

    /// Orders created so far, oldest first.
    pub fn orders(&self) -> Vec<OrderRequest> {
        self.orders
            .lock()
            .expect("orders mutex poisoned")
            .iter()
            .map(|(_, request)| request.clone())
            .collect()
    }

    pub fn capture_count(&self) -> usize {
        self.captures.load(Ordering::SeqCst)
    }

    fn fails_at(&self, stage: FailureStage) -> bool {
        *self.fail_at.lock().expect("failure mutex poisoned") == Some(stage)
    }
}

#[async_trait]
impl PaymentProvider for MockPaymentProvider {
    async fn create_order(&self, request: OrderRequest) -> Result<OrderId, PaymentError> {
        if self.client_id.trim().is_empty() {
            return Err(PaymentError::Provider("no client id configured".to_string()));
        }
        if self.fails_at(FailureStage::CreateOrder) {
            return Err(PaymentError::OrderFailed(
                "sandbox rejected the order".to_string(),
            ));
        }
        let id = OrderId::new(format!("ORDER-{}", Uuid::new_v4().simple()));
        tracing::debug!(
            order = %id,
            client_id = %self.client_id,
            amount = request.amount,
            "Sandbox order created"
        );
        self.orders
            .lock()
            .expect("orders mutex poisoned")
            .push((id.clone(), request));
        Ok(id)
    }

    async fn capture(&self, order: &OrderId) -> Result<CaptureConfirmation, PaymentError> {
        let known = self
            .orders
            .lock()
            .expect("orders mutex poisoned")
            .iter()
            .any(|(id, _)| id == order);
        if !known {
            return Err(PaymentError::CaptureFailed(
                order.clone(),
                "unknown order".to_string(),
            ));
        }
        if self.fails_at(FailureStage::Capture) {
            return Err(PaymentError::CaptureFailed(
                order.clone(),
                "sandbox declined the capture".to_string(),
            ));
        }
        self.captures.fetch_add(1, Ordering::SeqCst);
        Ok(CaptureConfirmation {
            order_id: order.clone(),
            confirmation_id: format!("CAPTURE-{}", Uuid::new_v4().simple()),
        })
    }

    fn name(&self) -> &str {
        "sandbox"
    }
}
