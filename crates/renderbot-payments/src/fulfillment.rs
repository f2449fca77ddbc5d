//! Payment Fulfillment
//!
//! Turns a verified completion event into a ledger credit, exactly once
//! per event id. The credit grant commits first; the user notification
//! is a separate best-effort step whose failure never rolls the grant
//! back.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};

use renderbot_core::{ChatGateway, CreditLedger};

use crate::error::{PaymentError, Result};
use crate::webhook::PaymentEvent;

/// Idempotence store for applied event ids
pub trait EventStore: Send + Sync {
    /// Record an event id. Returns `true` only the first time the id is
    /// seen; the check and the insert are atomic.
    fn record(&self, event_id: &str) -> Result<bool>;
}

/// In-memory event store (for development)
pub struct MemoryEventStore {
    applied: RwLock<HashMap<String, DateTime<Utc>>>,
}

impl Default for MemoryEventStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryEventStore {
    pub fn new() -> Self {
        Self {
            applied: RwLock::new(HashMap::new()),
        }
    }

    /// When an event id was applied, if ever
    pub fn applied_at(&self, event_id: &str) -> Option<DateTime<Utc>> {
        self.applied.read().unwrap().get(event_id).copied()
    }
}

impl EventStore for MemoryEventStore {
    fn record(&self, event_id: &str) -> Result<bool> {
        let mut applied = self.applied.write().unwrap();
        if applied.contains_key(event_id) {
            return Ok(false);
        }
        applied.insert(event_id.to_string(), Utc::now());
        Ok(true)
    }
}

/// Result of applying a payment event
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FulfillmentOutcome {
    /// Credits granted; `new_balance` is the balance after the grant
    Applied { new_balance: u32 },

    /// Event id was already applied; nothing changed
    AlreadyApplied,
}

/// Applies completion events to the credit ledger
pub struct PaymentFulfillment {
    ledger: Arc<dyn CreditLedger>,
    events: Arc<dyn EventStore>,
    /// Outbound notifier; `None` when the bot gateway is not configured
    notifier: Option<Arc<dyn ChatGateway>>,
}

impl PaymentFulfillment {
    pub fn new(
        ledger: Arc<dyn CreditLedger>,
        events: Arc<dyn EventStore>,
        notifier: Option<Arc<dyn ChatGateway>>,
    ) -> Self {
        Self {
            ledger,
            events,
            notifier,
        }
    }

    /// Apply a verified completion event to the ledger
    ///
    /// Stripe retries webhook deliveries, so the same event can arrive
    /// more than once; only the first application mutates the ledger.
    pub async fn apply(&self, event: &PaymentEvent) -> Result<FulfillmentOutcome> {
        if !self.events.record(&event.event_id)? {
            tracing::info!(event_id = %event.event_id, "Duplicate payment event, skipping");
            return Ok(FulfillmentOutcome::AlreadyApplied);
        }

        let new_balance = self
            .ledger
            .credit(&event.user_id, event.credits_to_grant)
            .map_err(|e| PaymentError::Ledger(e.to_string()))?;

        tracing::info!(
            user = %event.user_id,
            credits = event.credits_to_grant,
            new_balance,
            event_id = %event.event_id,
            "Granted credits"
        );

        // Grant is committed; notification failure is logged and dropped.
        if let Some(notifier) = &self.notifier {
            let text = format!(
                "Payment successful! You now have {new_balance} rendering credit(s). \
                 Upload an elevation to start!"
            );
            if let Err(e) = notifier.send_text(&event.user_id, &text).await {
                tracing::warn!(
                    user = %event.user_id,
                    error = %e,
                    "Payment notification failed; credit grant stands"
                );
            }
        }

        Ok(FulfillmentOutcome::Applied { new_balance })
    }
}
