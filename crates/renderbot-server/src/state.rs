//! Application State

use std::sync::Arc;

use renderbot_payments::{PaymentFulfillment, WebhookVerifier};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Applies verified completion events to the ledger
    pub fulfillment: Arc<PaymentFulfillment>,

    /// Webhook signature verifier (None when Stripe is not configured)
    pub verifier: Option<Arc<WebhookVerifier>>,

    /// Whether the Telegram dispatcher is running
    pub bot_configured: bool,

    /// Whether the image-generation vendor has credentials
    pub vendor_configured: bool,
}
