//! Donation flow: clamp, create order, capture. One attempt, no retry.

use std::sync::Arc;

use sciconnect_core::config::DonationConfig;
use sciconnect_directory::DirectoryStore;

use crate::amount::clamp_amount;
use crate::error::PaymentError;
use crate::provider::{OrderRequest, PaymentProvider};

/// How a donation attempt ended. Failures are reported, never raised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DonationOutcome {
    Completed {
        confirmation_id: String,
        amount: u64,
    },
    Failed {
        notice: String,
    },
}

impl DonationOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, DonationOutcome::Completed { .. })
    }

    /// Text shown to the donor.
    pub fn message(&self) -> String {
        match self {
            DonationOutcome::Completed {
                confirmation_id, ..
            } => format!("Thank you! Donation complete: {confirmation_id}"),
            DonationOutcome::Failed { notice } => notice.clone(),
        }
    }
}

pub struct DonationService {
    provider: Arc<dyn PaymentProvider>,
    store: Arc<DirectoryStore>,
    currency: String,
}

impl DonationService {
    pub fn new(
        provider: Arc<dyn PaymentProvider>,
        store: Arc<DirectoryStore>,
        config: &DonationConfig,
    ) -> Self {
        Self {
            provider,
            store,
            currency: config.currency.clone(),
        }
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    /// Build the order for a cause and raw amount input.
    ///
    /// An unknown cause is not an error; the description falls back to a
    /// neutral "Donation".
    pub fn order_for(&self, cause_id: &str, amount_input: &str) -> OrderRequest {
        let cause = self.store.cause_or_neutral(cause_id);
        let description = if cause.is_neutral() {
            "Donation".to_string()
        } else {
            format!("Donation to {}", cause.name)
        };
        OrderRequest {
            amount: clamp_amount(amount_input),
            currency: self.currency.clone(),
            description,
            cause_id: cause_id.to_string(),
        }
    }

    pub async fn donate(&self, cause_id: &str, amount_input: &str) -> DonationOutcome {
        let request = self.order_for(cause_id, amount_input);
        let amount = request.amount;
        tracing::info!(
            provider = self.provider.name(),
            cause = cause_id,
            amount,
            currency = %self.currency,
            "Starting donation"
        );

        match self.checkout(request).await {
            Ok(confirmation_id) => {
                tracing::info!(cause = cause_id, amount, %confirmation_id, "Donation completed");
                DonationOutcome::Completed {
                    confirmation_id,
                    amount,
                }
            }
            Err(e) => {
                tracing::warn!(cause = cause_id, error = %e, "Donation failed");
                DonationOutcome::Failed {
                    notice: e.user_notice(),
                }
            }
        }
    }

    async fn checkout(&self, request: OrderRequest) -> Result<String, PaymentError> {
        let order = self.provider.create_order(request).await?;
        let confirmation = self.provider.capture(&order).await?;
        Ok(confirmation.confirmation_id)
    }
}
