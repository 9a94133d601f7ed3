//! Common imports for typical harness usage.
//!
//! Re-exports the types most callers need to build a client and run a
//! transformation.
pub use crate::{
    GeneratedImage, Harness, HarnessBuilder, HarnessError, ImagePayload, ImageTransformer,
    ModelRef, ProviderId, RequestOptions, RetryPolicy, TransformError, TransformErrorKind,
    TransformationClient,
};
