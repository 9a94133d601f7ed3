//! Gemini provider integration.
//!
//! Vendor-specific configuration and wire types live here so the root harness
//! API can remain provider-agnostic.
mod adapter;
mod config;
pub(crate) mod transport;

pub use adapter::GeminiProvider;
pub use config::{DEFAULT_GEMINI_IMAGE_MODEL, GeminiClientConfig};

use crate::model::ModelRef;

/// Model reference for the default Gemini image model.
pub fn default_model() -> ModelRef {
    ModelRef::new(adapter::GEMINI_PROVIDER, DEFAULT_GEMINI_IMAGE_MODEL)
}

/// Model reference for a named Gemini model.
pub fn model(name: impl Into<String>) -> ModelRef {
    ModelRef::new(adapter::GEMINI_PROVIDER, name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::ProviderAdapter;

    #[test]
    fn default_model_routes_to_gemini_provider() {
        let provider = GeminiProvider::new(GeminiClientConfig::new("k")).expect("provider");
        let model = default_model();
        assert_eq!(model.provider, provider.id());
        assert_eq!(model.model, "gemini-2.5-flash-image");
    }
}
