//! Telegram Chat Gateway
//!
//! Outbound half of the Telegram integration: maps the core messaging
//! interface onto bot-API calls. User ids are decimal chat ids.

use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup, InputFile};
use url::Url;

use renderbot_core::{Button, ButtonAction, ChatGateway, CoreError, Result, UserId};

/// `ChatGateway` implementation over a Telegram bot session
pub struct TelegramGateway {
    bot: Bot,
}

impl TelegramGateway {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }

    fn chat_id(user: &UserId) -> Result<ChatId> {
        user.as_str()
            .parse::<i64>()
            .map(ChatId)
            .map_err(|_| CoreError::Gateway(format!("non-numeric chat id: {user}")))
    }

    /// Convert core keyboard rows into a Telegram inline keyboard
    pub fn keyboard(rows: &[Vec<Button>]) -> Result<InlineKeyboardMarkup> {
        let mut converted = Vec::with_capacity(rows.len());

        for row in rows {
            let mut buttons = Vec::with_capacity(row.len());
            for button in row {
                let converted_button = match &button.action {
                    ButtonAction::Callback(action) => {
                        InlineKeyboardButton::callback(button.label.clone(), action.as_data())
                    }
                    ButtonAction::Link(link) => {
                        let parsed = Url::parse(link)
                            .map_err(|e| CoreError::Gateway(format!("bad button url: {e}")))?;
                        InlineKeyboardButton::url(button.label.clone(), parsed)
                    }
                };
                buttons.push(converted_button);
            }
            converted.push(buttons);
        }

        Ok(InlineKeyboardMarkup::new(converted))
    }
}

#[async_trait]
impl ChatGateway for TelegramGateway {
    async fn send_text(&self, user: &UserId, text: &str) -> Result<()> {
        let chat = Self::chat_id(user)?;
        self.bot
            .send_message(chat, text)
            .await
            .map_err(|e| CoreError::Gateway(e.to_string()))?;
        Ok(())
    }

    async fn send_keyboard(&self, user: &UserId, text: &str, rows: &[Vec<Button>]) -> Result<()> {
        let chat = Self::chat_id(user)?;
        let markup = Self::keyboard(rows)?;
        self.bot
            .send_message(chat, text)
            .reply_markup(markup)
            .await
            .map_err(|e| CoreError::Gateway(e.to_string()))?;
        Ok(())
    }

    async fn send_photo(&self, user: &UserId, photo_url: &str, caption: &str) -> Result<()> {
        let chat = Self::chat_id(user)?;
        let photo = Url::parse(photo_url)
            .map_err(|e| CoreError::Gateway(format!("bad photo url: {e}")))?;

        self.bot
            .send_photo(chat, InputFile::url(photo))
            .caption(caption)
            .await
            .map_err(|e| CoreError::Gateway(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use renderbot_core::{CallbackAction, Sku};

    #[test]
    fn test_chat_id_parsing() {
        assert_eq!(
            TelegramGateway::chat_id(&UserId::new("42")).unwrap(),
            ChatId(42)
        );
        assert!(TelegramGateway::chat_id(&UserId::new("not-a-chat")).is_err());
    }

    #[test]
    fn test_keyboard_conversion() {
        let rows = vec![
            vec![Button::callback("Buy", CallbackAction::Buy(Sku::Single))],
            vec![Button::link("Pay Now", "https://checkout.stripe.com/pay/cs_test")],
        ];

        let markup = TelegramGateway::keyboard(&rows).unwrap();
        assert_eq!(markup.inline_keyboard.len(), 2);
        assert_eq!(markup.inline_keyboard[0][0].text, "Buy");
        assert_eq!(markup.inline_keyboard[1][0].text, "Pay Now");
    }

    #[test]
    fn test_keyboard_rejects_bad_url() {
        let rows = vec![vec![Button::link("Pay", "not a url")]];
        assert!(TelegramGateway::keyboard(&rows).is_err());
    }
}
