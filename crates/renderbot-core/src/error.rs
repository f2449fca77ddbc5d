//! Error Types

use thiserror::Error;

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, CoreError>;

/// Core error types
#[derive(Error, Debug)]
pub enum CoreError {
    /// Balance too low for the requested debit
    #[error("Insufficient credit: need {needed}, have {available}")]
    InsufficientCredit { needed: u32, available: u32 },

    /// SKU not present in the catalog
    #[error("Unknown SKU: {0}")]
    UnknownSku(String),

    /// Image-generation vendor failed (timeout, non-2xx, transport)
    #[error("Vendor error: {0}")]
    Vendor(String),

    /// Vendor responded but the reply could not be interpreted
    #[error("Vendor reply unparseable: {0}")]
    VendorReply(String),

    /// Outbound message delivery failed
    #[error("Gateway error: {0}")]
    Gateway(String),

    /// Ledger storage error
    #[error("Storage error: {0}")]
    Storage(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl CoreError {
    /// Convert to a user-friendly message
    pub fn user_message(&self) -> String {
        match self {
            CoreError::InsufficientCredit { .. } => {
                "You need at least 1 credit to render. Buy credits below:".into()
            }
            CoreError::Vendor(_) => {
                "Error generating rendering. Try again or contact support.".into()
            }
            CoreError::VendorReply(_) => {
                "Something went wrong generating the image. Please try again.".into()
            }
            _ => "An unexpected error occurred.".into(),
        }
    }
}

impl From<anyhow::Error> for CoreError {
    fn from(err: anyhow::Error) -> Self {
        CoreError::Storage(err.to_string())
    }
}
