//! Render Request Flow
//!
//! Handles one inbound image: check the balance, delegate to the vendor,
//! and debit exactly one credit only after the vendor produced a usable
//! output image. Failed generations are never charged.

use std::sync::Arc;

use crate::action::CallbackAction;
use crate::catalog::Sku;
use crate::error::{CoreError, Result};
use crate::gateway::{Button, ChatGateway, UserId};
use crate::ledger::CreditLedger;
use crate::vendor::ImageVendor;

const GENERATING_TEXT: &str = "Generating your $5,000-quality rendering... (10-20 seconds)";

const INSUFFICIENT_TEXT: &str = "You need at least 1 credit to render. Buy credits below:";

const VENDOR_ERROR_TEXT: &str = "Error generating rendering. Try again or contact support.";

const NO_IMAGE_TEXT: &str = "Something went wrong generating the image. Please try again.";

fn fallback_caption(remaining: u32) -> String {
    format!(
        "RenderBot Pro - Instant Architectural Visualization\n\
         Your rendering is ready in seconds, not days.\n\
         Want revisions, additional angles, interior views, or animations? Just let me know.\n\n\
         Credits remaining: {remaining}"
    )
}

/// Terminal state of one render request
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RenderOutcome {
    /// Balance was below 1; purchase options were offered instead
    InsufficientCredit,
    /// Vendor call failed; nothing was charged
    VendorFailed,
    /// Vendor replied without a recognizable output image; nothing was charged
    NoImage,
    /// Rendering delivered and one credit debited
    Delivered { remaining: u32 },
}

/// Per-request state machine over the ledger, vendor, and gateway seams
pub struct RenderRequestHandler {
    ledger: Arc<dyn CreditLedger>,
    vendor: Arc<dyn ImageVendor>,
    gateway: Arc<dyn ChatGateway>,
}

impl RenderRequestHandler {
    pub fn new(
        ledger: Arc<dyn CreditLedger>,
        vendor: Arc<dyn ImageVendor>,
        gateway: Arc<dyn ChatGateway>,
    ) -> Self {
        Self {
            ledger,
            vendor,
            gateway,
        }
    }

    /// Run the full flow for one inbound image
    pub async fn handle(&self, user: &UserId, image_url: &str) -> Result<RenderOutcome> {
        // 1. Check
        if self.ledger.balance(user)? < 1 {
            self.send_purchase_prompt(user).await?;
            return Ok(RenderOutcome::InsufficientCredit);
        }

        // 2. Announce (best-effort, no retry)
        if let Err(e) = self.gateway.send_text(user, GENERATING_TEXT).await {
            tracing::warn!(user = %user, error = %e, "Failed to send generating notice");
        }

        // 3. Delegate
        let reply = match self.vendor.generate(image_url).await {
            Ok(reply) => reply,
            Err(e) => {
                tracing::error!(user = %user, vendor = self.vendor.name(), error = %e, "Vendor call failed");
                self.gateway.send_text(user, VENDOR_ERROR_TEXT).await?;
                return Ok(RenderOutcome::VendorFailed);
            }
        };

        let Some(output) = reply.output_image() else {
            tracing::warn!(user = %user, "Vendor reply had no output image");
            self.gateway.send_text(user, NO_IMAGE_TEXT).await?;
            return Ok(RenderOutcome::NoImage);
        };

        // 4. Commit: debit only now that the vendor confirmed success. A
        // concurrent request may have drained the balance since the check.
        let remaining = match self.ledger.debit(user, 1) {
            Ok(remaining) => remaining,
            Err(CoreError::InsufficientCredit { .. }) => {
                self.send_purchase_prompt(user).await?;
                return Ok(RenderOutcome::InsufficientCredit);
            }
            Err(e) => return Err(e),
        };

        let caption = output
            .caption
            .unwrap_or_else(|| fallback_caption(remaining));

        self.gateway.send_photo(user, &output.url, &caption).await?;

        tracing::info!(user = %user, remaining, "Rendering delivered");
        Ok(RenderOutcome::Delivered { remaining })
    }

    async fn send_purchase_prompt(&self, user: &UserId) -> Result<()> {
        let rows = vec![
            vec![Button::callback(
                "$29 - 1 Rendering",
                CallbackAction::Buy(Sku::Single),
            )],
            vec![Button::callback(
                "$99 - 5 Renderings",
                CallbackAction::Buy(Sku::Pack5),
            )],
        ];
        self.gateway.send_keyboard(user, INSUFFICIENT_TEXT, &rows).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::MemoryCreditLedger;
    use crate::vendor::VendorReply;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Vendor returning a canned result
    struct StubVendor {
        result: std::result::Result<String, String>,
    }

    #[async_trait]
    impl ImageVendor for StubVendor {
        async fn generate(&self, _image_url: &str) -> Result<VendorReply> {
            match &self.result {
                Ok(content) => Ok(VendorReply {
                    content: content.clone(),
                }),
                Err(msg) => Err(CoreError::Vendor(msg.clone())),
            }
        }

        fn name(&self) -> &str {
            "stub"
        }
    }

    /// Records every outbound send
    #[derive(Default)]
    struct RecordingGateway {
        texts: Mutex<Vec<String>>,
        keyboards: Mutex<Vec<(String, usize)>>,
        photos: Mutex<Vec<(String, String)>>,
    }

    #[async_trait]
    impl ChatGateway for RecordingGateway {
        async fn send_text(&self, _user: &UserId, text: &str) -> Result<()> {
            self.texts.lock().unwrap().push(text.to_string());
            Ok(())
        }

        async fn send_keyboard(
            &self,
            _user: &UserId,
            text: &str,
            rows: &[Vec<Button>],
        ) -> Result<()> {
            self.keyboards
                .lock()
                .unwrap()
                .push((text.to_string(), rows.len()));
            Ok(())
        }

        async fn send_photo(&self, _user: &UserId, photo_url: &str, caption: &str) -> Result<()> {
            self.photos
                .lock()
                .unwrap()
                .push((photo_url.to_string(), caption.to_string()));
            Ok(())
        }
    }

    fn handler(
        ledger: Arc<MemoryCreditLedger>,
        vendor: StubVendor,
    ) -> (RenderRequestHandler, Arc<RecordingGateway>) {
        let gateway = Arc::new(RecordingGateway::default());
        let handler = RenderRequestHandler::new(ledger, Arc::new(vendor), gateway.clone());
        (handler, gateway)
    }

    #[tokio::test]
    async fn test_zero_balance_offers_purchase_options() {
        let ledger = Arc::new(MemoryCreditLedger::new());
        let vendor = StubVendor {
            result: Ok("https://cdn.example.com/out.png".into()),
        };
        let (handler, gateway) = handler(ledger.clone(), vendor);
        let user = UserId::new("42");

        let outcome = handler.handle(&user, "https://files.example.com/in.jpg").await.unwrap();

        assert_eq!(outcome, RenderOutcome::InsufficientCredit);
        assert_eq!(ledger.balance(&user).unwrap(), 0);
        // Two purchase options, no photo delivered
        let keyboards = gateway.keyboards.lock().unwrap();
        assert_eq!(keyboards.len(), 1);
        assert_eq!(keyboards[0].1, 2);
        assert!(gateway.photos.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_vendor_error_leaves_balance_unchanged() {
        let ledger = Arc::new(MemoryCreditLedger::new());
        let user = UserId::new("42");
        ledger.credit(&user, 1).unwrap();

        let vendor = StubVendor {
            result: Err("timeout".into()),
        };
        let (handler, gateway) = handler(ledger.clone(), vendor);

        let outcome = handler.handle(&user, "https://files.example.com/in.jpg").await.unwrap();

        assert_eq!(outcome, RenderOutcome::VendorFailed);
        assert_eq!(ledger.balance(&user).unwrap(), 1);
        let texts = gateway.texts.lock().unwrap();
        assert!(texts.iter().any(|t| t == VENDOR_ERROR_TEXT));
    }

    #[tokio::test]
    async fn test_reply_without_image_is_not_charged() {
        let ledger = Arc::new(MemoryCreditLedger::new());
        let user = UserId::new("42");
        ledger.credit(&user, 1).unwrap();

        let vendor = StubVendor {
            result: Ok("I could not read that elevation.".into()),
        };
        let (handler, gateway) = handler(ledger.clone(), vendor);

        let outcome = handler.handle(&user, "https://files.example.com/in.jpg").await.unwrap();

        assert_eq!(outcome, RenderOutcome::NoImage);
        assert_eq!(ledger.balance(&user).unwrap(), 1);
        assert!(gateway.photos.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_success_debits_once_and_delivers_vendor_caption() {
        let ledger = Arc::new(MemoryCreditLedger::new());
        let user = UserId::new("42");
        ledger.credit(&user, 1).unwrap();

        let vendor = StubVendor {
            result: Ok("https://cdn.example.com/out.png\nEnjoy your rendering!".into()),
        };
        let (handler, gateway) = handler(ledger.clone(), vendor);

        let outcome = handler.handle(&user, "https://files.example.com/in.jpg").await.unwrap();

        assert_eq!(outcome, RenderOutcome::Delivered { remaining: 0 });
        assert_eq!(ledger.balance(&user).unwrap(), 0);

        let photos = gateway.photos.lock().unwrap();
        assert_eq!(photos.len(), 1);
        assert_eq!(photos[0].0, "https://cdn.example.com/out.png");
        assert_eq!(photos[0].1, "Enjoy your rendering!");
    }

    #[tokio::test]
    async fn test_fallback_caption_includes_remaining_balance() {
        let ledger = Arc::new(MemoryCreditLedger::new());
        let user = UserId::new("42");
        ledger.credit(&user, 3).unwrap();

        let vendor = StubVendor {
            result: Ok("https://cdn.example.com/out.jpg".into()),
        };
        let (handler, gateway) = handler(ledger.clone(), vendor);

        let outcome = handler.handle(&user, "https://files.example.com/in.jpg").await.unwrap();

        assert_eq!(outcome, RenderOutcome::Delivered { remaining: 2 });
        let photos = gateway.photos.lock().unwrap();
        assert!(photos[0].1.contains("Credits remaining: 2"));
    }
}
