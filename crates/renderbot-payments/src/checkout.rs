//! Stripe Checkout Integration
//!
//! Implements the "Stripe Checkout (Hosted)" approach: the bot hands out
//! a payment link, Stripe hosts the entire payment page, and fulfillment
//! happens later off the webhook.

use stripe::{
    CheckoutSession as StripeCheckoutSession, CheckoutSessionMode, Client,
    CreateCheckoutSession, CreateCheckoutSessionLineItems,
    CreateCheckoutSessionLineItemsPriceData,
    CreateCheckoutSessionLineItemsPriceDataProductData, Currency,
};

use renderbot_core::{PriceEntry, UserId};

use crate::error::{PaymentError, Result};

/// Metadata key carrying the credit grant through the checkout session
pub(crate) const CREDITS_METADATA_KEY: &str = "credits";

/// Stripe client wrapper
pub struct StripeGateway {
    client: Client,
    webhook_secret: String,
}

impl StripeGateway {
    /// Create a new Stripe gateway
    pub fn new(secret_key: &str, webhook_secret: &str) -> Self {
        Self {
            client: Client::new(secret_key),
            webhook_secret: webhook_secret.to_string(),
        }
    }

    /// Create from environment variables
    pub fn from_env() -> Result<Self> {
        let secret_key = std::env::var("STRIPE_SECRET_KEY")
            .map_err(|_| PaymentError::Config("STRIPE_SECRET_KEY not set".into()))?;
        let webhook_secret = std::env::var("STRIPE_WEBHOOK_SECRET")
            .map_err(|_| PaymentError::Config("STRIPE_WEBHOOK_SECRET not set".into()))?;

        Ok(Self::new(&secret_key, &webhook_secret))
    }

    /// Get the webhook signing secret
    pub fn webhook_secret(&self) -> &str {
        &self.webhook_secret
    }

    /// Create a one-time Stripe Checkout session for a credit bundle
    ///
    /// Returns a URL to send the user to Stripe's hosted checkout page.
    /// The buyer and the credit grant ride along as `client_reference_id`
    /// and session metadata; the webhook reads them back on completion.
    pub async fn create_checkout_session(
        &self,
        request: CheckoutRequest,
    ) -> Result<CheckoutSession> {
        let entry = &request.entry;

        let mut params = CreateCheckoutSession::new();
        params.success_url = Some(&request.success_url);
        params.cancel_url = Some(&request.cancel_url);
        params.mode = Some(CheckoutSessionMode::Payment);
        params.client_reference_id = Some(request.user_id.as_str());

        let mut metadata = std::collections::HashMap::new();
        metadata.insert(
            CREDITS_METADATA_KEY.to_string(),
            entry.credits_granted.to_string(),
        );
        params.metadata = Some(metadata);

        params.line_items = Some(vec![CreateCheckoutSessionLineItems {
            quantity: Some(1),
            price_data: Some(CreateCheckoutSessionLineItemsPriceData {
                currency: Currency::USD,
                unit_amount: Some(entry.amount_cents),
                product_data: Some(CreateCheckoutSessionLineItemsPriceDataProductData {
                    name: entry.display_name.clone(),
                    ..Default::default()
                }),
                ..Default::default()
            }),
            ..Default::default()
        }]);

        let session = StripeCheckoutSession::create(&self.client, params)
            .await
            .map_err(|e| PaymentError::Stripe(e.to_string()))?;

        let checkout_url = session
            .url
            .ok_or_else(|| PaymentError::Stripe("No checkout URL returned".into()))?;

        tracing::info!(
            user = %request.user_id,
            sku = entry.sku.as_str(),
            session_id = %session.id,
            "Created checkout session"
        );

        Ok(CheckoutSession {
            id: session.id.to_string(),
            checkout_url,
        })
    }

    /// Get the underlying Stripe client
    pub fn inner(&self) -> &Client {
        &self.client
    }
}

/// Request to create a checkout session
#[derive(Clone, Debug)]
pub struct CheckoutRequest {
    /// Catalog entry being purchased
    pub entry: PriceEntry,

    /// Buyer, carried through checkout as the client reference id
    pub user_id: UserId,

    /// URL to redirect after successful payment
    pub success_url: String,

    /// URL to redirect if checkout is cancelled
    pub cancel_url: String,
}

/// Result of creating a checkout session
#[derive(Clone, Debug)]
pub struct CheckoutSession {
    /// Stripe session ID
    pub id: String,

    /// URL to send the user to
    pub checkout_url: String,
}
