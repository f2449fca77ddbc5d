//! # renderbot-vendor
//!
//! Concrete [`ImageVendor`] providers.
//!
//! ## Providers
//!
//! - **Grok** (default): xAI's chat-completions API with an image input
//!
//! The provider owns its own timeout policy; a timed-out or failed call
//! surfaces to the render flow as a vendor error and is never charged.

pub mod grok;

pub use grok::{GrokConfig, GrokVendor};

// Re-export core types for convenience
pub use renderbot_core::{ImageVendor, OutputImage, VendorReply};
