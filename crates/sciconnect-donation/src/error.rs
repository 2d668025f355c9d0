//! Error types for payment processing.

use sciconnect_core::error::SciConnectError;

use crate::provider::OrderId;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PaymentError {
    #[error("Order creation failed: {0}")]
    OrderFailed(String),
    #[error("Capture failed for order {0}: {1}")]
    CaptureFailed(OrderId, String),
    #[error("Payment provider error: {0}")]
    Provider(String),
}

impl PaymentError {
    /// Short text for the donate view. Provider details stay in the logs.
    pub fn user_notice(&self) -> String {
        match self {
            PaymentError::CaptureFailed(..) => {
                "Capture failed. Your payment was not completed.".to_string()
            }
            PaymentError::OrderFailed(_) | PaymentError::Provider(_) => {
                "Payment provider error. Please try again later.".to_string()
            }
        }
    }
}

impl From<SciConnectError> for PaymentError {
    fn from(err: SciConnectError) -> Self {
        PaymentError::Provider(err.to_string())
    }
}

impl From<PaymentError> for SciConnectError {
    fn from(err: PaymentError) -> Self {
        SciConnectError::Payment(err.to_string())
    }
}
