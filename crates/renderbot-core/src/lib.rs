//! # renderbot-core
//!
//! Core domain logic for renderbot: the credit ledger, the price catalog,
//! and the render request flow. External collaborators (the messaging
//! platform and the image-generation vendor) are reached through the
//! narrow traits defined here; concrete implementations live in the
//! `renderbot-telegram` and `renderbot-vendor` crates.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use renderbot_core::{MemoryCreditLedger, RenderRequestHandler};
//!
//! let ledger = Arc::new(MemoryCreditLedger::new());
//! let handler = RenderRequestHandler::new(ledger, vendor, gateway);
//! handler.handle(&user, &image_url).await?;
//! ```

pub mod action;
pub mod catalog;
pub mod error;
pub mod gateway;
pub mod ledger;
pub mod render;
pub mod vendor;

pub use action::CallbackAction;
pub use catalog::{PriceCatalog, PriceEntry, Sku};
pub use error::{CoreError, Result};
pub use gateway::{Button, ButtonAction, ChatGateway, UserId};
pub use ledger::{CreditLedger, MemoryCreditLedger};
pub use render::{RenderOutcome, RenderRequestHandler};
pub use vendor::{ImageVendor, OutputImage, VendorReply};
