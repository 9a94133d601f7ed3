//! Sharing a result: native share sheet first, web intent links otherwise.

use chronos_harness::ImagePayload;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use tracing::{debug, warn};

use crate::download::download_file_name;
use crate::offsets::signed;
use crate::session::TransformResult;

pub const SHARE_TITLE: &str = "ChronosLens Transformation";

/// Characters a URI component keeps as is: alphanumerics and `-_.!~*'()`.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ShareError {
    /// The platform has no share sheet or cannot share files.
    #[error("native sharing is unavailable")]
    Unavailable,
    #[error("share failed: {0}")]
    Failed(String),
}

/// Payload handed to a native share sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareRequest {
    pub title: String,
    pub text: String,
    pub file_name: String,
    pub image: ImagePayload,
}

impl ShareRequest {
    pub fn for_result(result: &TransformResult) -> Self {
        Self {
            title: SHARE_TITLE.to_string(),
            text: format!(
                "Check out my {} year transformation!",
                signed(result.offset)
            ),
            file_name: download_file_name(result.offset),
            image: result.image.clone(),
        }
    }
}

/// Platform share sheet.
#[async_trait::async_trait]
pub trait NativeShare: Send + Sync {
    async fn share(&self, request: &ShareRequest) -> Result<(), ShareError>;
}

/// Share target for hosts without a share sheet.
pub struct NoNativeShare;

#[async_trait::async_trait]
impl NativeShare for NoNativeShare {
    async fn share(&self, _request: &ShareRequest) -> Result<(), ShareError> {
        Err(ShareError::Unavailable)
    }
}

/// Links offered when native sharing is not possible.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareLinks {
    pub text: String,
    pub twitter: String,
    pub facebook: String,
    /// Copyable link to the app itself.
    pub app_url: String,
}

impl ShareLinks {
    pub fn new(offset: i32, app_url: &str) -> Self {
        let text = format!(
            "Check out my {} year time travel transformation on ChronosLens! 🕰️✨",
            signed(offset)
        );
        let encoded_text = encode(&text);
        let encoded_url = encode(app_url);
        Self {
            twitter: format!(
                "https://twitter.com/intent/tweet?text={encoded_text}&url={encoded_url}"
            ),
            facebook: format!("https://www.facebook.com/sharer/sharer.php?u={encoded_url}"),
            app_url: app_url.to_string(),
            text,
        }
    }
}

fn encode(value: &str) -> String {
    utf8_percent_encode(value, URI_COMPONENT).to_string()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShareOutcome {
    Shared,
    Fallback(ShareLinks),
}

/// Tries the native share sheet and falls back to links on any error.
pub async fn share_result(
    native: &dyn NativeShare,
    result: &TransformResult,
    app_url: &str,
) -> ShareOutcome {
    let request = ShareRequest::for_result(result);
    match native.share(&request).await {
        Ok(()) => {
            debug!(
                domain = "share",
                event = "share.native",
                offset = result.offset
            );
            ShareOutcome::Shared
        }
        Err(err) => {
            if err != ShareError::Unavailable {
                warn!(
                    domain = "share",
                    event = "share.native_failed",
                    offset = result.offset,
                    error = %err
                );
            }
            ShareOutcome::Fallback(ShareLinks::new(result.offset, app_url))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct RecordingShare {
        outcome: Result<(), ShareError>,
        seen: Mutex<Vec<ShareRequest>>,
    }

    #[async_trait::async_trait]
    impl NativeShare for RecordingShare {
        async fn share(&self, request: &ShareRequest) -> Result<(), ShareError> {
            self.seen.lock().unwrap().push(request.clone());
            self.outcome.clone()
        }
    }

    fn result(offset: i32) -> TransformResult {
        TransformResult::new(offset, ImagePayload::new("image/png", b"png".to_vec()))
    }

    #[tokio::test]
    async fn native_share_receives_file_and_caption() {
        let native = RecordingShare {
            outcome: Ok(()),
            seen: Mutex::new(Vec::new()),
        };
        let outcome = share_result(&native, &result(30), "https://chronos.example").await;
        assert_eq!(outcome, ShareOutcome::Shared);
        let seen = native.seen.lock().unwrap();
        assert_eq!(seen[0].title, "ChronosLens Transformation");
        assert_eq!(seen[0].text, "Check out my +30 year transformation!");
        assert_eq!(seen[0].file_name, "chronos-lens-30.png");
    }

    #[tokio::test]
    async fn failing_native_share_falls_back_to_links() {
        let native = RecordingShare {
            outcome: Err(ShareError::Failed("user aborted".into())),
            seen: Mutex::new(Vec::new()),
        };
        let outcome = share_result(&native, &result(-20), "https://chronos.example").await;
        let ShareOutcome::Fallback(links) = outcome else {
            panic!("expected fallback links");
        };
        assert!(links.text.starts_with("Check out my -20 year time travel"));
        assert_eq!(links.app_url, "https://chronos.example");
    }

    #[tokio::test]
    async fn no_native_share_always_falls_back() {
        let outcome = share_result(&NoNativeShare, &result(10), "https://a.b").await;
        assert!(matches!(outcome, ShareOutcome::Fallback(_)));
    }

    #[test]
    fn links_are_uri_component_encoded() {
        let links = ShareLinks::new(40, "https://chronos.example/app?x=1");
        assert!(links.twitter.starts_with(
            "https://twitter.com/intent/tweet?text=Check%20out%20my%20%2B40%20year%20time%20travel"
        ));
        assert!(
            links
                .twitter
                .contains("on%20ChronosLens!%20%F0%9F%95%B0%EF%B8%8F%E2%9C%A8&url=")
        );
        assert!(
            links
                .twitter
                .ends_with("&url=https%3A%2F%2Fchronos.example%2Fapp%3Fx%3D1")
        );
        assert_eq!(
            links.facebook,
            "https://www.facebook.com/sharer/sharer.php?u=https%3A%2F%2Fchronos.example%2Fapp%3Fx%3D1"
        );
    }
}
