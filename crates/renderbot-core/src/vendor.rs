//! Image Vendor Seam
//!
//! Interface for the external image-generation API, plus extraction of
//! the output-image reference from its free-text reply. The concrete
//! provider lives in `renderbot-vendor`; timeout policy is the
//! provider's contract and surfaces here as [`CoreError::Vendor`].

use std::sync::OnceLock;

use async_trait::async_trait;
use regex::Regex;

use crate::error::Result;

/// Raw vendor reply: the completion text as returned by the API
#[derive(Clone, Debug)]
pub struct VendorReply {
    pub content: String,
}

/// Image-generation vendor interface
#[async_trait]
pub trait ImageVendor: Send + Sync {
    /// Generate a rendering from the source image URL
    async fn generate(&self, image_url: &str) -> Result<VendorReply>;

    /// Vendor name (for logs)
    fn name(&self) -> &str;
}

/// Output-image reference extracted from a vendor reply
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutputImage {
    /// URL of the generated image
    pub url: String,

    /// Text the vendor appended after the image URL, if any
    pub caption: Option<String>,
}

fn image_url_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"https://\S+\.png|https://\S+\.jpg").expect("valid image URL pattern")
    })
}

impl VendorReply {
    /// Extract the first recognizable output-image URL and the trailing
    /// caption text after it. Returns `None` when the reply carries no
    /// image reference.
    pub fn output_image(&self) -> Option<OutputImage> {
        let m = image_url_pattern().find(&self.content)?;
        let caption = self.content[m.end()..].trim();

        Some(OutputImage {
            url: m.as_str().to_string(),
            caption: if caption.is_empty() {
                None
            } else {
                Some(caption.to_string())
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reply(content: &str) -> VendorReply {
        VendorReply {
            content: content.into(),
        }
    }

    #[test]
    fn test_extracts_url_and_caption() {
        let out = reply("Here you go: https://cdn.example.com/render.png\nYour rendering is ready.")
            .output_image()
            .unwrap();

        assert_eq!(out.url, "https://cdn.example.com/render.png");
        assert_eq!(out.caption.as_deref(), Some("Your rendering is ready."));
    }

    #[test]
    fn test_jpg_without_caption() {
        let out = reply("https://cdn.example.com/render.jpg").output_image().unwrap();

        assert_eq!(out.url, "https://cdn.example.com/render.jpg");
        assert_eq!(out.caption, None);
    }

    #[test]
    fn test_no_image_reference() {
        assert_eq!(reply("I could not process that elevation.").output_image(), None);
        // A URL with an unrecognized extension does not count
        assert_eq!(reply("https://cdn.example.com/render.webp caption").output_image(), None);
    }

    #[test]
    fn test_first_match_wins() {
        let out = reply("https://a.example.com/1.png then https://b.example.com/2.png tail")
            .output_image()
            .unwrap();
        assert_eq!(out.url, "https://a.example.com/1.png");
    }
}
