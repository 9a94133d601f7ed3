use crate::content::{GeneratedImage, ImagePayload};
use crate::errors::ProviderError;
use crate::model::{ModelRef, ProviderId};

/// Normalized request passed to a provider adapter.
#[derive(Clone, Debug)]
pub struct ProviderRequest {
    /// Unique id for this attempt, used for log correlation.
    pub request_id: uuid::Uuid,
    pub model: ModelRef,
    /// Instruction text sent next to the image.
    pub instruction: String,
    pub image: ImagePayload,
}

/// Vendor integration contract.
///
/// An adapter performs exactly one outbound call per `generate_image`; retries
/// and timeouts are applied by the caller.
#[async_trait::async_trait]
pub trait ProviderAdapter: Send + Sync {
    /// Stable provider id used for registration and model routing.
    fn id(&self) -> ProviderId;

    /// Sends the image plus instruction and returns the first generated image.
    async fn generate_image(&self, req: ProviderRequest) -> Result<GeneratedImage, ProviderError>;
}
