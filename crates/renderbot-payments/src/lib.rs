//! # renderbot-payments
//!
//! Credit top-up sales through Stripe's hosted checkout.
//!
//! The flow has two independent halves, deliberately separated so an
//! abandoned checkout needs no compensating logic:
//!
//! 1. **Checkout**: a purchase button creates a hosted checkout session
//!    tagged with the buyer and the credit grant, and hands the payment
//!    link back. The ledger is not touched.
//! 2. **Fulfillment**: Stripe's `checkout.session.completed` webhook,
//!    signature-verified, is translated into a ledger credit exactly
//!    once per event id. Webhook deliveries may be retried, so the
//!    idempotence key is the event, not the call.
//!
//! ```text
//! ┌──────────┐  pay link  ┌────────────────┐  webhook  ┌─────────────┐
//! │ purchase │───────────▶│ Stripe Hosted  │──────────▶│ fulfillment │
//! │  button  │            │ Checkout Page  │           │  (+credits) │
//! └──────────┘            └────────────────┘           └─────────────┘
//! ```

mod checkout;
mod error;
mod fulfillment;
mod webhook;

pub use checkout::{CheckoutRequest, CheckoutSession, StripeGateway};
pub use error::{PaymentError, Result};
pub use fulfillment::{
    EventStore, FulfillmentOutcome, MemoryEventStore, PaymentFulfillment,
};
pub use webhook::{PaymentEvent, WebhookOutcome, WebhookVerifier, extract};
