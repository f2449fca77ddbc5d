//! Chat Gateway Seam
//!
//! The narrow outbound interface to the messaging platform. The concrete
//! Telegram implementation lives in `renderbot-telegram`; core code and
//! tests only ever see this trait.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::action::CallbackAction;
use crate::error::Result;

/// Opaque platform-assigned user identifier (string-comparable)
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What pressing an inline button does
#[derive(Clone, Debug)]
pub enum ButtonAction {
    /// Dispatch a callback action back to the bot
    Callback(CallbackAction),
    /// Open an external link (e.g. a hosted checkout page)
    Link(String),
}

/// One inline-keyboard button
#[derive(Clone, Debug)]
pub struct Button {
    pub label: String,
    pub action: ButtonAction,
}

impl Button {
    pub fn callback(label: impl Into<String>, action: CallbackAction) -> Self {
        Self {
            label: label.into(),
            action: ButtonAction::Callback(action),
        }
    }

    pub fn link(label: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            action: ButtonAction::Link(url.into()),
        }
    }
}

/// Outbound messaging interface
#[async_trait]
pub trait ChatGateway: Send + Sync {
    /// Send plain text
    async fn send_text(&self, user: &UserId, text: &str) -> Result<()>;

    /// Send text with an inline keyboard (`rows` of buttons)
    async fn send_keyboard(&self, user: &UserId, text: &str, rows: &[Vec<Button>]) -> Result<()>;

    /// Send a photo by URL with a caption
    async fn send_photo(&self, user: &UserId, photo_url: &str, caption: &str) -> Result<()>;
}
