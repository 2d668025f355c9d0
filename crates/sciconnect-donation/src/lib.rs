//! Donation checkout: amount coercion, the payment provider seam, and the
//! create-then-capture flow.

pub mod amount;
pub mod error;
pub mod provider;
pub mod service;

pub use amount::clamp_amount;
pub use error::PaymentError;
pub use provider::{
    CaptureConfirmation, FailureStage, MockPaymentProvider, OrderId, OrderRequest,
    PaymentProvider,
};
pub use service::{DonationOutcome, DonationService};
