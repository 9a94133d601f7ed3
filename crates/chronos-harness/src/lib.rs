//! Transformation client for age-shifted portraits with a builder-first async API.
//!
//! Vendor-specific APIs are namespaced under `vendors::*`.
//!
//! # Usage (Gemini)
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use chronos_harness::prelude::*;
//! use chronos_harness::vendors::gemini::{self, GeminiProvider};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let harness = Harness::builder()
//!     .register_provider(Arc::new(GeminiProvider::from_env()?))
//!     .build()?;
//!
//! let client = harness.client(gemini::default_model())?;
//! let portrait = ImagePayload::new("image/jpeg", std::fs::read("portrait.jpg")?);
//! let aged = client.transform(&portrait, 30).await?;
//! std::fs::write("aged.png", aged.data())?;
//! # Ok(())
//! # }
//! ```

/// Transformation client and the orchestrator-facing transformer seam.
pub mod client;
/// Image payloads and generated output.
pub mod content;
/// Public error types and the failure taxonomy.
pub mod errors;
/// Provider registry and client factory.
pub mod harness;
/// Model and provider identifiers plus request options.
pub mod model;
/// Retry policy for retryable failures.
pub mod policy;
/// Common imports for typical usage.
pub mod prelude;
/// Instruction text for past and future offsets.
pub mod prompt;
/// Provider adapter contract used by vendor integrations.
pub mod provider;
/// Vendor-specific integrations.
pub mod vendors;

pub use client::{ImageTransformer, TransformationClient};
pub use content::{GeneratedImage, ImagePayload};
pub use errors::{HarnessError, ProviderError, TransformError, TransformErrorKind};
pub use harness::{Harness, HarnessBuilder};
pub use model::{DEFAULT_ATTEMPT_TIMEOUT, ModelRef, ProviderId, RequestOptions};
pub use policy::RetryPolicy;
pub use prompt::{Direction, build_instruction};
pub use provider::{ProviderAdapter, ProviderRequest};
