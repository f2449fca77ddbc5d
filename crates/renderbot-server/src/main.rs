//! renderbot process
//!
//! Runs the Telegram dispatcher and the Stripe webhook server in one
//! process. A missing credential disables its subsystem with a warning
//! instead of aborting, so the status page and the webhook endpoint
//! stay reachable while the rest is being configured.

mod handlers;
mod state;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use renderbot_core::{
    ChatGateway, CreditLedger, MemoryCreditLedger, PriceCatalog, RenderRequestHandler,
};
use renderbot_payments::{
    MemoryEventStore, PaymentFulfillment, StripeGateway, WebhookVerifier,
};
use renderbot_telegram::{BotContext, TelegramGateway, run_dispatcher};
use renderbot_vendor::GrokVendor;

use crate::handlers::{status, stripe_webhook};
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load environment
    dotenvy::dotenv().ok();

    // Domain state
    let ledger: Arc<dyn CreditLedger> = Arc::new(MemoryCreditLedger::new());
    let catalog = Arc::new(PriceCatalog::standard());
    let events = Arc::new(MemoryEventStore::new());

    // Image-generation vendor
    let vendor = Arc::new(GrokVendor::from_env());
    let vendor_configured = vendor.is_configured();
    if vendor_configured {
        tracing::info!("✓ Image vendor configured");
    } else {
        tracing::warn!("⚠ XAI_API_KEY not set - render requests will fail");
    }

    // Stripe
    let stripe = StripeGateway::from_env().ok();
    if stripe.is_some() {
        tracing::info!("✓ Stripe configured");
    } else {
        tracing::warn!("⚠ Stripe not configured - payments disabled");
        tracing::warn!("  Set STRIPE_SECRET_KEY and STRIPE_WEBHOOK_SECRET in .env");
    }
    let stripe = stripe.map(Arc::new);
    let verifier = stripe
        .as_ref()
        .map(|s| Arc::new(WebhookVerifier::new(s.webhook_secret())));

    // Telegram
    let bot = match std::env::var("TELEGRAM_TOKEN") {
        Ok(token) => Some(teloxide::Bot::new(token)),
        Err(_) => {
            tracing::warn!("⚠ TELEGRAM_TOKEN not set - bot handlers disabled");
            None
        }
    };
    let gateway = bot.clone().map(|b| Arc::new(TelegramGateway::new(b)));
    let notifier: Option<Arc<dyn ChatGateway>> =
        gateway.clone().map(|g| g as Arc<dyn ChatGateway>);

    let fulfillment = Arc::new(PaymentFulfillment::new(
        ledger.clone(),
        events,
        notifier,
    ));

    // Spawn the dispatcher when the bot session is available
    let bot_configured = bot.is_some();
    if let (Some(bot), Some(gateway)) = (bot, gateway) {
        let render = Arc::new(RenderRequestHandler::new(
            ledger.clone(),
            vendor,
            gateway.clone(),
        ));

        let ctx = BotContext {
            ledger: ledger.clone(),
            catalog,
            render,
            stripe,
            gateway,
            checkout_return_url: std::env::var("CHECKOUT_RETURN_URL")
                .unwrap_or_else(|_| "https://t.me/RenderBotPro".into()),
        };

        tokio::spawn(async move {
            tracing::info!("✓ Telegram dispatcher running");
            run_dispatcher(bot, ctx).await;
        });
    }

    // Build application state
    let app_state = AppState {
        fulfillment,
        verifier,
        bot_configured,
        vendor_configured,
    };

    // Build router
    let app = Router::new()
        .route("/", get(status))
        .route("/stripe-webhook", post(stripe_webhook))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state);

    // Start server
    let addr = bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("🚀 renderbot server running on http://{}", addr);
    tracing::info!("Endpoints:");
    tracing::info!("  GET  /               - Status page");
    tracing::info!("  POST /stripe-webhook - Stripe completion events");

    axum::serve(listener, app).await?;

    Ok(())
}

/// Bind address: `BIND_ADDR` wins, then `PORT` on all interfaces,
/// then the default
fn bind_addr() -> String {
    if let Ok(addr) = std::env::var("BIND_ADDR") {
        return addr;
    }
    if let Ok(port) = std::env::var("PORT") {
        return format!("0.0.0.0:{port}");
    }
    "0.0.0.0:3000".into()
}
