//! # renderbot-telegram
//!
//! Telegram front end for renderbot. The [`TelegramGateway`] implements
//! the core [`ChatGateway`](renderbot_core::ChatGateway) seam over a
//! `teloxide::Bot`; the dispatcher routes inbound updates (commands,
//! purchase callbacks, photos, documents) to the core flows.
//!
//! Everything platform-specific stays in this crate: chat id mapping,
//! inline-keyboard conversion, and the bot-API file URL for uploaded
//! photos.

mod gateway;
mod handlers;

pub use gateway::TelegramGateway;
pub use handlers::{BotContext, Command, run_dispatcher};
