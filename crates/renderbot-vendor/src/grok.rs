//! Grok Image-Generation Provider
//!
//! Implementation of [`ImageVendor`] over xAI's chat-completions API.
//! The source elevation goes in as an image content part together with
//! a fixed prompt template; the reply text carries the generated image
//! URL plus caption text, extracted downstream by the render flow.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use renderbot_core::{CoreError, ImageVendor, Result, VendorReply};

/// Fixed rendering prompt sent with every request
const RENDER_PROMPT: &str = r#"You are RenderBot Pro. Convert the attached elevation into a photorealistic exterior rendering.
Follow this exact prompt structure (do not deviate):

"Photorealistic exterior rendering of a [style] house strictly matching the attached 2D elevation.
Match every proportion, window/door placement, roof pitch, materials exactly.
Camera: eye-level 3/4 corner view (1.6m). Warm golden-hour lighting from left, soft realistic shadows, light overcast sky.
Ultra-high resolution 8K, cinematic color grading, subtle depth-of-field, lens flare, high-end modern landscaping, reflective surfaces, blurred background with tasteful neighboring buildings and street.
--ar 16:9 --stylize 250 --quality 2"

After the image, add exactly this text:

"RenderBot Pro - Instant Architectural Visualization
Your rendering is ready in seconds, not days.
Want revisions, additional angles, interior views, or animations? Just let me know.""#;

/// Grok provider configuration
#[derive(Clone, Debug)]
pub struct GrokConfig {
    /// API base URL
    pub api_url: String,

    /// API key (Bearer token)
    pub api_key: String,

    /// Model identifier
    pub model: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for GrokConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.x.ai/v1/chat/completions".into(),
            api_key: String::new(),
            model: "grok-4".into(),
            timeout_secs: 60,
        }
    }
}

impl GrokConfig {
    /// Read configuration from the environment. A missing API key does
    /// not fail construction; calls will fail until one is set.
    pub fn from_env() -> Self {
        let api_key = std::env::var("XAI_API_KEY").unwrap_or_default();
        let api_url = std::env::var("XAI_API_URL")
            .unwrap_or_else(|_| "https://api.x.ai/v1/chat/completions".into());
        let model = std::env::var("XAI_MODEL").unwrap_or_else(|_| "grok-4".into());

        Self {
            api_url,
            api_key,
            model,
            ..Default::default()
        }
    }
}

/// Grok image-generation vendor
pub struct GrokVendor {
    client: reqwest::Client,
    config: GrokConfig,
}

impl GrokVendor {
    /// Create from configuration
    pub fn from_config(config: GrokConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_default();

        Self { client, config }
    }

    /// Create from environment variables
    pub fn from_env() -> Self {
        Self::from_config(GrokConfig::from_env())
    }

    /// Whether an API key is present
    pub fn is_configured(&self) -> bool {
        !self.config.api_key.is_empty()
    }

    fn build_request(&self, image_url: &str) -> ChatRequest {
        ChatRequest {
            model: self.config.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".into(),
                    content: MessageContent::Text(RENDER_PROMPT.into()),
                },
                ChatMessage {
                    role: "user".into(),
                    content: MessageContent::Parts(vec![ContentPart::ImageUrl {
                        image_url: ImageUrl {
                            url: image_url.to_string(),
                        },
                    }]),
                },
            ],
            temperature: 0.7,
            max_tokens: 500,
        }
    }
}

#[async_trait]
impl ImageVendor for GrokVendor {
    async fn generate(&self, image_url: &str) -> Result<VendorReply> {
        if !self.is_configured() {
            return Err(CoreError::Config("XAI_API_KEY not set".into()));
        }

        let request = self.build_request(image_url);

        let response = self
            .client
            .post(&self.config.api_url)
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| CoreError::Vendor(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(%status, body = %body, "Vendor returned non-success status");
            return Err(CoreError::Vendor(format!("HTTP {status}")));
        }

        let completion: ChatResponse = response
            .json()
            .await
            .map_err(|e| CoreError::VendorReply(e.to_string()))?;

        let content = completion
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| CoreError::VendorReply("empty choices".into()))?;

        Ok(VendorReply { content })
    }

    fn name(&self) -> &str {
        "Grok"
    }
}

// ============================================================================
// Wire Types
// ============================================================================

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: MessageContent,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart {
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Serialize)]
struct ImageUrl {
    url: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> GrokConfig {
        GrokConfig {
            api_url: "https://api.x.ai/v1/chat/completions".into(),
            api_key: "test-key".into(),
            model: "grok-4".into(),
            timeout_secs: 60,
        }
    }

    #[test]
    fn test_request_shape() {
        let vendor = GrokVendor::from_config(config());
        let request = vendor.build_request("https://files.example.com/elevation.jpg");

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "grok-4");
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["content"][0]["type"], "image_url");
        assert_eq!(
            json["messages"][1]["content"][0]["image_url"]["url"],
            "https://files.example.com/elevation.jpg"
        );
    }

    #[tokio::test]
    async fn test_unconfigured_vendor_fails_without_network() {
        let vendor = GrokVendor::from_config(GrokConfig::default());
        assert!(!vendor.is_configured());
        assert!(vendor.generate("https://files.example.com/in.jpg").await.is_err());
    }

    #[test]
    fn test_response_parsing() {
        let body = r#"{
            "choices": [
                {"message": {"role": "assistant", "content": "https://cdn.x.ai/out.png\nDone."}}
            ]
        }"#;

        let parsed: ChatResponse = serde_json::from_str(body).unwrap();
        assert_eq!(
            parsed.choices[0].message.content,
            "https://cdn.x.ai/out.png\nDone."
        );
    }
}
