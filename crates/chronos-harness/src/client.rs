use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use crate::content::{GeneratedImage, ImagePayload};
use crate::errors::{HarnessError, ProviderError, TransformError};
use crate::model::{ModelRef, RequestOptions};
use crate::policy::RetryPolicy;
use crate::prompt::{Direction, build_instruction};
use crate::provider::{ProviderAdapter, ProviderRequest};

/// Seam between the batch orchestrator and whatever produces aged images.
#[async_trait::async_trait]
pub trait ImageTransformer: Send + Sync {
    /// Produces an image of the portrait shifted by `offset` years.
    async fn transform(&self, image: &ImagePayload, offset: i32)
    -> Result<ImagePayload, TransformError>;
}

/// Transformation client bound to one provider and model.
///
/// Each attempt is one outbound call bounded by `RequestOptions::timeout`.
/// Retryable failures (transport, timeouts, 429/5xx) are retried with backoff
/// until the policy is exhausted.
#[derive(Clone)]
pub struct TransformationClient {
    provider: Arc<dyn ProviderAdapter>,
    model: ModelRef,
    options: RequestOptions,
}

impl TransformationClient {
    pub(crate) fn new(
        provider: Arc<dyn ProviderAdapter>,
        model: ModelRef,
        options: RequestOptions,
    ) -> Self {
        Self {
            provider,
            model,
            options,
        }
    }

    pub fn model(&self) -> &ModelRef {
        &self.model
    }

    pub fn options(&self) -> &RequestOptions {
        &self.options
    }

    /// Overrides the per-attempt timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.options.timeout = Some(timeout);
        self
    }

    /// Overrides the retry policy.
    pub fn retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.options.retry_policy = policy;
        self
    }

    /// Runs the transformation and returns the full provider output.
    pub async fn generate(
        &self,
        image: &ImagePayload,
        offset: i32,
    ) -> Result<GeneratedImage, TransformError> {
        if image.is_empty() {
            return Err(HarnessError::Validation("source image is empty".into()).into());
        }
        let instruction = build_instruction(offset);
        let direction = Direction::from_offset(offset);
        let policy = &self.options.retry_policy;
        debug!(
            event = "transform.configured",
            domain = "ai",
            provider = self.model.provider.as_str(),
            model = self.model.model.as_str(),
            offset = offset,
            direction = direction.as_str(),
            image_bytes = image.len() as u64,
            timeout_ms = ?self.options.timeout.map(|t| t.as_millis() as u64),
            max_attempts = policy.max_attempts()
        );

        let mut retries_done = 0u32;
        loop {
            let attempt = retries_done + 1;
            let request = ProviderRequest {
                request_id: uuid::Uuid::new_v4(),
                model: self.model.clone(),
                instruction: instruction.clone(),
                image: image.clone(),
            };
            debug!(
                event = "transform.attempt",
                domain = "ai",
                request_id = %request.request_id,
                attempt = attempt,
                offset = offset
            );
            let err = match self.attempt(request).await {
                Ok(generated) => {
                    debug!(
                        event = "transform.succeeded",
                        domain = "ai",
                        attempt = attempt,
                        offset = offset,
                        output_bytes = generated.image.len() as u64,
                        mime_type = generated.image.mime_type()
                    );
                    return Ok(generated);
                }
                Err(err) => err,
            };

            let retryable = match &err {
                AttemptError::Provider(e) => e.is_retryable(),
                AttemptError::TimedOut(_) => true,
            };
            let can_retry = retryable && policy.can_retry(retries_done);
            debug!(
                event = "transform.failed",
                domain = "ai",
                attempt = attempt,
                offset = offset,
                retryable = retryable,
                can_retry = can_retry,
                error = %err
            );
            if !can_retry {
                return Err(err.into());
            }
            let backoff = policy.backoff_duration(retries_done);
            info!(
                event = "transform.retry_scheduled",
                domain = "ai",
                offset = offset,
                attempt = attempt,
                next_attempt = attempt + 1,
                backoff_ms = backoff.as_millis() as u64
            );
            tokio::time::sleep(backoff).await;
            retries_done += 1;
        }
    }

    async fn attempt(&self, request: ProviderRequest) -> Result<GeneratedImage, AttemptError> {
        let call = self.provider.generate_image(request);
        match self.options.timeout {
            Some(limit) => match tokio::time::timeout(limit, call).await {
                Ok(result) => result.map_err(AttemptError::Provider),
                Err(_) => Err(AttemptError::TimedOut(limit)),
            },
            None => call.await.map_err(AttemptError::Provider),
        }
    }
}

#[async_trait::async_trait]
impl ImageTransformer for TransformationClient {
    async fn transform(
        &self,
        image: &ImagePayload,
        offset: i32,
    ) -> Result<ImagePayload, TransformError> {
        Ok(self.generate(image, offset).await?.image)
    }
}

#[derive(Debug, thiserror::Error)]
enum AttemptError {
    #[error(transparent)]
    Provider(ProviderError),
    #[error("attempt timed out after {0:?}")]
    TimedOut(Duration),
}

impl From<AttemptError> for TransformError {
    fn from(value: AttemptError) -> Self {
        match value {
            AttemptError::Provider(e) => e.into(),
            AttemptError::TimedOut(limit) => TransformError::Timeout(limit),
        }
    }
}
