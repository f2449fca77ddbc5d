//! Update Handlers
//!
//! Inbound routing: /start, purchase callbacks, photos, and documents.
//! Handlers catch their own failures and answer the user; nothing here
//! crashes the dispatcher.

use std::sync::Arc;

use teloxide::prelude::*;
use teloxide::types::ParseMode;
use teloxide::utils::command::BotCommands;

use renderbot_core::{
    Button, CallbackAction, ChatGateway, CreditLedger, PriceCatalog, RenderRequestHandler, Sku,
    UserId,
};
use renderbot_payments::{CheckoutRequest, StripeGateway};

use crate::gateway::TelegramGateway;

pub type HandlerResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

const PAY_PROMPT: &str = "Click below to pay securely with Stripe:";

const PAYMENTS_DISABLED_TEXT: &str =
    "Payments are not configured right now. Please try again later.";

const DOCUMENT_TEXT: &str =
    "Please send your elevation/plan as a photo (not PDF/file) for best results.";

const FILE_ERROR_TEXT: &str = "Error generating rendering. Try again or contact support.";

fn welcome_text(credits: u32) -> String {
    format!(
        "Welcome to *RenderBot Pro* - Instant $5,000-quality architectural renderings in seconds.\n\n\
         You have {credits} rendering credit(s).\n\n\
         Just send me a 2D elevation, plan, or sketch and I'll instantly turn it into photorealistic 3D."
    )
}

/// Supported commands
#[derive(BotCommands, Clone)]
#[command(rename_rule = "lowercase", description = "Supported commands:")]
pub enum Command {
    #[command(description = "show your credits and the price menu")]
    Start,
}

/// Shared handler dependencies
#[derive(Clone)]
pub struct BotContext {
    pub ledger: Arc<dyn CreditLedger>,
    pub catalog: Arc<PriceCatalog>,
    pub render: Arc<RenderRequestHandler>,
    pub stripe: Option<Arc<StripeGateway>>,
    pub gateway: Arc<TelegramGateway>,
    /// Where Stripe sends the user after checkout (the bot's deep link)
    pub checkout_return_url: String,
}

/// Build and run the update dispatcher until shutdown
pub async fn run_dispatcher(bot: Bot, ctx: BotContext) {
    let handler = dptree::entry()
        .branch(
            Update::filter_message()
                .filter_command::<Command>()
                .endpoint(command_handler),
        )
        .branch(Update::filter_callback_query().endpoint(callback_handler))
        .branch(
            Update::filter_message()
                .filter(|msg: Message| msg.photo().is_some())
                .endpoint(photo_handler),
        )
        .branch(
            Update::filter_message()
                .filter(|msg: Message| msg.document().is_some())
                .endpoint(document_handler),
        );

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![ctx])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;
}

/// /start: greet with the current balance and the price menu
async fn command_handler(bot: Bot, msg: Message, cmd: Command, ctx: BotContext) -> HandlerResult {
    match cmd {
        Command::Start => {
            let user = UserId::new(msg.chat.id.to_string());
            let credits = ctx.ledger.balance(&user)?;

            let rows = vec![
                vec![Button::callback(
                    "Buy 1 Rendering - $29",
                    CallbackAction::Buy(Sku::Single),
                )],
                vec![Button::callback(
                    "Buy 5-Pack - $99",
                    CallbackAction::Buy(Sku::Pack5),
                )],
                vec![Button::callback(
                    "Full Marketing Kit - $299",
                    CallbackAction::Buy(Sku::Marketing),
                )],
                vec![Button::callback(
                    format!("Credits: {credits}"),
                    CallbackAction::Ignore,
                )],
            ];

            bot.send_message(msg.chat.id, welcome_text(credits))
                .parse_mode(ParseMode::Markdown)
                .reply_markup(TelegramGateway::keyboard(&rows)?)
                .await?;
        }
    }
    Ok(())
}

/// Button presses: purchases start a checkout, everything else is
/// acknowledged and dropped
async fn callback_handler(bot: Bot, q: CallbackQuery, ctx: BotContext) -> HandlerResult {
    bot.answer_callback_query(q.id.clone()).await?;

    let Some(data) = q.data.as_deref() else {
        return Ok(());
    };

    match CallbackAction::parse(data) {
        Some(CallbackAction::Buy(sku)) => {
            let user = UserId::new(q.from.id.to_string());
            start_checkout(&ctx, &user, sku).await?;
        }
        Some(CallbackAction::Ignore) | None => {
            tracing::debug!(data, "Ignoring callback");
        }
    }
    Ok(())
}

async fn start_checkout(ctx: &BotContext, user: &UserId, sku: Sku) -> HandlerResult {
    let Some(stripe) = &ctx.stripe else {
        tracing::warn!(user = %user, "Purchase attempted but Stripe is not configured");
        ctx.gateway.send_text(user, PAYMENTS_DISABLED_TEXT).await?;
        return Ok(());
    };

    let Some(entry) = ctx.catalog.lookup(sku) else {
        tracing::error!(sku = sku.as_str(), "SKU missing from catalog");
        return Ok(());
    };

    let request = CheckoutRequest {
        entry: entry.clone(),
        user_id: user.clone(),
        success_url: ctx.checkout_return_url.clone(),
        cancel_url: ctx.checkout_return_url.clone(),
    };

    match stripe.create_checkout_session(request).await {
        Ok(session) => {
            let rows = vec![vec![Button::link("Pay Now", session.checkout_url)]];
            ctx.gateway.send_keyboard(user, PAY_PROMPT, &rows).await?;
        }
        Err(e) => {
            tracing::error!(user = %user, error = %e, "Checkout session creation failed");
            ctx.gateway.send_text(user, e.user_message()).await?;
        }
    }
    Ok(())
}

/// Inbound photo: resolve the highest-resolution variant and run the
/// render flow
async fn photo_handler(bot: Bot, msg: Message, ctx: BotContext) -> HandlerResult {
    let Some(photos) = msg.photo() else {
        return Ok(());
    };
    // Telegram orders variants smallest to largest
    let Some(best) = photos.last() else {
        return Ok(());
    };

    let user = UserId::new(msg.chat.id.to_string());

    let file = match bot.get_file(best.file.id.clone()).await {
        Ok(file) => file,
        Err(e) => {
            tracing::error!(user = %user, error = %e, "Failed to resolve photo file");
            ctx.gateway.send_text(&user, FILE_ERROR_TEXT).await?;
            return Ok(());
        }
    };

    let image_url = format!(
        "https://api.telegram.org/file/bot{}/{}",
        bot.token(),
        file.path
    );

    if let Err(e) = ctx.render.handle(&user, &image_url).await {
        tracing::error!(user = %user, error = %e, "Render request failed");
    }
    Ok(())
}

/// Documents are rejected with format guidance
async fn document_handler(bot: Bot, msg: Message) -> HandlerResult {
    bot.send_message(msg.chat.id, DOCUMENT_TEXT).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_welcome_text_shows_balance() {
        assert!(welcome_text(3).contains("You have 3 rendering credit(s)"));
    }

    #[test]
    fn test_menu_actions_round_trip() {
        // Every button the menu renders must parse back to its action
        for action in [
            CallbackAction::Buy(Sku::Single),
            CallbackAction::Buy(Sku::Pack5),
            CallbackAction::Buy(Sku::Marketing),
            CallbackAction::Ignore,
        ] {
            assert_eq!(CallbackAction::parse(action.as_data()), Some(action));
        }
    }
}
