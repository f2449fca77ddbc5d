//! Payment Error Types

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, PaymentError>;

/// Payment-related errors
#[derive(Error, Debug)]
pub enum PaymentError {
    /// Stripe API error
    #[error("Stripe error: {0}")]
    Stripe(String),

    /// Webhook signature verification failed
    #[error("Webhook signature invalid: {0}")]
    Signature(String),

    /// Completion event missing or carrying unusable fulfillment data
    #[error("Malformed payment event: {0}")]
    MalformedEvent(String),

    /// Ledger rejected the credit grant
    #[error("Ledger error: {0}")]
    Ledger(String),

    /// Idempotence store error
    #[error("Storage error: {0}")]
    Storage(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl PaymentError {
    /// Get user-friendly message
    pub fn user_message(&self) -> &str {
        match self {
            PaymentError::Stripe(_) => "Payment processing failed. Please try again.",
            PaymentError::Config(_) => "Payments are not configured right now.",
            _ => "An error occurred processing your request.",
        }
    }
}
