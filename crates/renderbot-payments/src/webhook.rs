//! Stripe Webhook Handling
//!
//! Signature verification and extraction of fulfillment data from
//! `checkout.session.completed` events. Every other event type is
//! acknowledged and ignored.

use serde::{Deserialize, Serialize};
use stripe::{Event, EventObject, EventType, Webhook};

use renderbot_core::UserId;

use crate::checkout::CREDITS_METADATA_KEY;
use crate::error::{PaymentError, Result};

/// A verified, parsed payment-completion event, ready for fulfillment
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentEvent {
    /// Buyer, read back from the session's client reference id
    pub user_id: UserId,

    /// Credits to grant, read back from session metadata
    pub credits_to_grant: u32,

    /// Stripe event id, the idempotence key for fulfillment
    pub event_id: String,
}

/// What the webhook body turned out to be
#[derive(Clone, Debug)]
pub enum WebhookOutcome {
    /// A completed checkout carrying fulfillment data
    Completed(PaymentEvent),

    /// Any other event type; acknowledged, no state change
    Ignored { event_type: String },
}

/// Verifies webhook payloads against the endpoint's signing secret
pub struct WebhookVerifier {
    secret: String,
}

impl WebhookVerifier {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    /// Verify the signature and parse the raw event
    ///
    /// The caller maps the error to an HTTP 4xx; no state changes on
    /// failure.
    pub fn verify(&self, payload: &str, signature: &str) -> Result<Event> {
        Webhook::construct_event(payload, signature, &self.secret)
            .map_err(|e| PaymentError::Signature(e.to_string()))
    }
}

/// Extract fulfillment data from a verified event
///
/// A completed checkout without a usable buyer id or credit count is
/// rejected as malformed rather than silently granting nothing.
pub fn extract(event: &Event) -> Result<WebhookOutcome> {
    match event.type_ {
        EventType::CheckoutSessionCompleted => {
            let EventObject::CheckoutSession(session) = &event.data.object else {
                return Err(PaymentError::MalformedEvent(
                    "checkout.session.completed without session object".into(),
                ));
            };

            let user_id = session
                .client_reference_id
                .as_deref()
                .filter(|id| !id.is_empty())
                .ok_or_else(|| {
                    PaymentError::MalformedEvent("missing client_reference_id".into())
                })?;

            let credits = parse_credits(
                session
                    .metadata
                    .as_ref()
                    .and_then(|m| m.get(CREDITS_METADATA_KEY))
                    .map(String::as_str),
            )?;

            Ok(WebhookOutcome::Completed(PaymentEvent {
                user_id: UserId::new(user_id),
                credits_to_grant: credits,
                event_id: event.id.to_string(),
            }))
        }

        _ => Ok(WebhookOutcome::Ignored {
            event_type: format!("{:?}", event.type_),
        }),
    }
}

/// Parse the credits metadata value into a positive count
fn parse_credits(raw: Option<&str>) -> Result<u32> {
    let raw = raw.ok_or_else(|| PaymentError::MalformedEvent("missing credits metadata".into()))?;

    match raw.parse::<u32>() {
        Ok(0) => Err(PaymentError::MalformedEvent(
            "credits metadata must be positive".into(),
        )),
        Ok(n) => Ok(n),
        Err(_) => Err(PaymentError::MalformedEvent(format!(
            "unparseable credits metadata: {raw}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_credits_valid() {
        assert_eq!(parse_credits(Some("5")).unwrap(), 5);
        assert_eq!(parse_credits(Some("1")).unwrap(), 1);
    }

    #[test]
    fn test_parse_credits_rejects_missing() {
        assert!(matches!(
            parse_credits(None),
            Err(PaymentError::MalformedEvent(_))
        ));
    }

    #[test]
    fn test_parse_credits_rejects_zero_and_garbage() {
        assert!(matches!(
            parse_credits(Some("0")),
            Err(PaymentError::MalformedEvent(_))
        ));
        assert!(matches!(
            parse_credits(Some("five")),
            Err(PaymentError::MalformedEvent(_))
        ));
        assert!(matches!(
            parse_credits(Some("-3")),
            Err(PaymentError::MalformedEvent(_))
        ));
    }
}
