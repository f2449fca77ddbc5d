//! HTTP Handlers

use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode},
};
use serde::Serialize;

use renderbot_payments::{PaymentError, WebhookOutcome, extract};

use crate::state::AppState;

// ============================================================================
// Response Types
// ============================================================================

#[derive(Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub bot_configured: bool,
    pub stripe_configured: bool,
    pub vendor_configured: bool,
}

#[derive(Serialize)]
pub struct ReceivedResponse {
    pub received: bool,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// Diagnostic status page
pub async fn status(State(state): State<AppState>) -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        bot_configured: state.bot_configured,
        stripe_configured: state.verifier.is_some(),
        vendor_configured: state.vendor_configured,
    })
}

/// Stripe webhook endpoint
///
/// Verifies the signature, extracts fulfillment data from completed
/// checkouts, and applies it to the ledger. Non-checkout event types
/// are acknowledged without any state change.
pub async fn stripe_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: String,
) -> Result<Json<ReceivedResponse>, (StatusCode, Json<ErrorResponse>)> {
    let verifier = state.verifier.as_ref().ok_or_else(|| {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ErrorResponse {
                error: "Payments not configured".into(),
                code: "PAYMENTS_DISABLED".into(),
            }),
        )
    })?;

    let signature = headers
        .get("stripe-signature")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: "Missing Stripe signature".into(),
                    code: "MISSING_SIGNATURE".into(),
                }),
            )
        })?;

    let event = verifier.verify(&body, signature).map_err(|e| {
        tracing::warn!(error = %e, "Webhook signature failed");
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "Invalid signature".into(),
                code: "INVALID_SIGNATURE".into(),
            }),
        )
    })?;

    let outcome = extract(&event).map_err(|e| {
        tracing::warn!(error = %e, "Rejecting malformed payment event");
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: e.to_string(),
                code: "MALFORMED_EVENT".into(),
            }),
        )
    })?;

    match outcome {
        WebhookOutcome::Completed(payment) => {
            state.fulfillment.apply(&payment).await.map_err(|e| {
                tracing::error!(error = %e, "Webhook processing error");
                let status = match e {
                    PaymentError::MalformedEvent(_) => StatusCode::BAD_REQUEST,
                    _ => StatusCode::INTERNAL_SERVER_ERROR,
                };
                (
                    status,
                    Json(ErrorResponse {
                        error: "Webhook processing failed".into(),
                        code: "WEBHOOK_ERROR".into(),
                    }),
                )
            })?;
        }
        WebhookOutcome::Ignored { event_type } => {
            tracing::debug!(event_type = %event_type, "Ignoring webhook event");
        }
    }

    Ok(Json(ReceivedResponse { received: true }))
}
