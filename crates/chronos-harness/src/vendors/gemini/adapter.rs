use tracing::debug;

use crate::content::GeneratedImage;
use crate::errors::{HarnessError, ProviderError};
use crate::model::ProviderId;
use crate::provider::{ProviderAdapter, ProviderRequest};

use super::config::GeminiClientConfig;
use super::transport::{
    GenerateContentResponse, build_request_body, extract_generated_image, map_http_error,
};

pub(crate) const GEMINI_PROVIDER: &str = "gemini";

/// Provider adapter for Gemini's `generateContent` endpoint with image output.
pub struct GeminiProvider {
    client: reqwest::Client,
    config: GeminiClientConfig,
}

impl GeminiProvider {
    /// Creates a provider from explicit client configuration.
    pub fn new(config: GeminiClientConfig) -> Result<Self, HarnessError> {
        if config.api_key.trim().is_empty() {
            return Err(HarnessError::Config(
                "Gemini client config api_key must not be empty".into(),
            ));
        }
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| HarnessError::Config(format!("failed to build Gemini client: {e}")))?;
        Ok(Self { client, config })
    }

    /// Creates a provider using `GEMINI_API_KEY`.
    pub fn from_env() -> Result<Self, HarnessError> {
        Self::new(GeminiClientConfig::from_env()?)
    }
}

#[async_trait::async_trait]
impl ProviderAdapter for GeminiProvider {
    fn id(&self) -> ProviderId {
        ProviderId::new(GEMINI_PROVIDER)
    }

    async fn generate_image(&self, req: ProviderRequest) -> Result<GeneratedImage, ProviderError> {
        let provider_id = ProviderId::new(GEMINI_PROVIDER);
        let body = build_request_body(&req.image, &req.instruction);
        debug!(
            event = "gemini.request",
            domain = "ai",
            request_id = %req.request_id,
            model = %req.model.model,
            image_bytes = req.image.len() as u64,
            "sending Gemini generateContent request"
        );

        let response = self
            .client
            .post(self.config.generate_content_url(&req.model.model))
            .header("x-goog-api-key", &self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                ProviderError::transport(provider_id.clone(), format!("Gemini request failed: {e}"))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(map_http_error(&provider_id, status.as_u16(), &body));
        }

        let parsed: GenerateContentResponse = response.json().await.map_err(|e| {
            if e.is_decode() {
                ProviderError::protocol(
                    provider_id.clone(),
                    format!("failed to parse Gemini response: {e}"),
                )
            } else {
                ProviderError::transport(
                    provider_id.clone(),
                    format!("Gemini response read failed: {e}"),
                )
            }
        })?;
        extract_generated_image(&provider_id, parsed)
    }
}
