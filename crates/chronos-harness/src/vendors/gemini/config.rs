use std::time::Duration;

use crate::errors::HarnessError;
use crate::model::DEFAULT_ATTEMPT_TIMEOUT;

/// Default image-capable Gemini model.
pub const DEFAULT_GEMINI_IMAGE_MODEL: &str = "gemini-2.5-flash-image";

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Slack between the per-attempt limit and the HTTP client timeout, so an
/// overlong call surfaces as a timeout rather than a transport error.
const TRANSPORT_TIMEOUT_MARGIN: Duration = Duration::from_secs(10);

/// Configuration for the Gemini provider client.
#[derive(Clone, Debug)]
pub struct GeminiClientConfig {
    /// API key sent in the `x-goog-api-key` header.
    pub api_key: String,
    /// Base URL for the Gemini-compatible endpoint.
    ///
    /// Useful for proxies or local test servers.
    pub base_url: String,
    /// HTTP client timeout. Kept above the per-attempt limit.
    pub timeout: Duration,
}

impl GeminiClientConfig {
    /// Creates a config with sensible defaults and a provided API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_ATTEMPT_TIMEOUT + TRANSPORT_TIMEOUT_MARGIN,
        }
    }

    /// Builds a config from `GEMINI_API_KEY` (falling back to `API_KEY`).
    ///
    /// `GEMINI_BASE_URL` overrides the endpoint when set.
    pub fn from_env() -> Result<Self, HarnessError> {
        let api_key = ["GEMINI_API_KEY", "API_KEY"]
            .into_iter()
            .filter_map(|key| std::env::var(key).ok())
            .find(|value| !value.trim().is_empty())
            .ok_or_else(|| {
                HarnessError::Config("missing GEMINI_API_KEY for Gemini provider".into())
            })?;
        let mut config = Self::new(api_key.trim());
        if let Ok(base_url) = std::env::var("GEMINI_BASE_URL")
            && !base_url.trim().is_empty()
        {
            config = config.base_url(base_url.trim());
        }
        Ok(config)
    }

    /// Overrides the API base URL (for proxies or test servers).
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Overrides the HTTP timeout as is.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the HTTP timeout just above a per-attempt limit.
    pub fn attempt_timeout(self, limit: Duration) -> Self {
        self.timeout(limit + TRANSPORT_TIMEOUT_MARGIN)
    }

    pub(crate) fn generate_content_url(&self, model: &str) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            model.trim()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generate_content_url_trims_trailing_slash() {
        let config = GeminiClientConfig::new("k").base_url("http://localhost:8080/");
        assert_eq!(
            config.generate_content_url(DEFAULT_GEMINI_IMAGE_MODEL),
            "http://localhost:8080/v1beta/models/gemini-2.5-flash-image:generateContent"
        );
    }

    #[test]
    fn defaults_point_at_public_endpoint() {
        let config = GeminiClientConfig::new("k");
        assert!(config.base_url.starts_with("https://generativelanguage.googleapis.com"));
        assert_eq!(config.timeout, Duration::from_secs(130));
    }

    #[test]
    fn http_timeout_outlasts_the_attempt_limit() {
        let defaults = crate::model::RequestOptions::default();
        let limit = defaults.timeout.expect("default limit");
        assert!(GeminiClientConfig::new("k").timeout > limit);

        let custom = GeminiClientConfig::new("k").attempt_timeout(Duration::from_secs(30));
        assert_eq!(custom.timeout, Duration::from_secs(40));
    }
}
