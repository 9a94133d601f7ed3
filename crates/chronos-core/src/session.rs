//! In-memory session state and the store that publishes it.
//!
//! The store is the single writer: user actions (upload, reset, offset
//! selection) and the batch orchestrator mutate through it, and every change is
//! broadcast to subscribers so the presentation layer can re-render.

use std::collections::BTreeMap;
use std::sync::Arc;

use chronos_harness::{Direction, ImagePayload, TransformError, TransformErrorKind};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::debug;

use crate::offsets::{DEFAULT_OFFSET, snap_to_slider};

/// Errors from session actions.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("a batch is already processing")]
    Busy,
    #[error("no source image uploaded")]
    NoSourceImage,
    #[error("no offsets requested")]
    EmptyBatch,
    #[error("no result for offset {0}")]
    UnknownResult(i32),
    #[error("not an image: {0}")]
    UnsupportedImage(String),
}

/// A generated image for one offset. Immutable once published.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformResult {
    pub offset: i32,
    pub direction: Direction,
    pub image: ImagePayload,
}

impl TransformResult {
    pub fn new(offset: i32, image: ImagePayload) -> Self {
        Self {
            offset,
            direction: Direction::from_offset(offset),
            image,
        }
    }
}

/// Why a batch stopped early.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchFailure {
    /// Offset whose call failed.
    pub offset: i32,
    pub kind: TransformErrorKind,
    /// Message shown in the failure view.
    pub message: String,
}

impl BatchFailure {
    pub fn from_error(offset: i32, err: &TransformError) -> Self {
        Self {
            offset,
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

/// Snapshot of everything the presentation layer renders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    source_image: Option<ImagePayload>,
    selected_offsets: Vec<i32>,
    current_offset: i32,
    results: BTreeMap<i32, TransformResult>,
    focused: Option<i32>,
    processing: bool,
    last_error: Option<BatchFailure>,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            source_image: None,
            selected_offsets: Vec::new(),
            current_offset: DEFAULT_OFFSET,
            results: BTreeMap::new(),
            focused: None,
            processing: false,
            last_error: None,
        }
    }
}

impl Session {
    pub fn source_image(&self) -> Option<&ImagePayload> {
        self.source_image.as_ref()
    }

    /// Batch selection in toggle order.
    pub fn selected_offsets(&self) -> &[i32] {
        &self.selected_offsets
    }

    pub fn current_offset(&self) -> i32 {
        self.current_offset
    }

    pub fn is_selected(&self, offset: i32) -> bool {
        self.selected_offsets.contains(&offset)
    }

    /// Results ordered by offset, past to future.
    pub fn results(&self) -> impl Iterator<Item = &TransformResult> {
        self.results.values()
    }

    pub fn result(&self, offset: i32) -> Option<&TransformResult> {
        self.results.get(&offset)
    }

    pub fn result_count(&self) -> usize {
        self.results.len()
    }

    pub fn focused_offset(&self) -> Option<i32> {
        self.focused
    }

    pub fn focused_result(&self) -> Option<&TransformResult> {
        self.focused.and_then(|offset| self.results.get(&offset))
    }

    pub fn is_processing(&self) -> bool {
        self.processing
    }

    pub fn last_error(&self) -> Option<&BatchFailure> {
        self.last_error.as_ref()
    }

    pub fn last_error_message(&self) -> Option<&str> {
        self.last_error.as_ref().map(|f| f.message.as_str())
    }

    /// Offsets a submit (or retry) would send: the batch selection when
    /// non-empty, otherwise the slider value.
    pub fn requested_offsets(&self) -> Vec<i32> {
        if self.selected_offsets.is_empty() {
            vec![self.current_offset]
        } else {
            self.selected_offsets.clone()
        }
    }

    fn ensure_idle(&self) -> Result<(), SessionError> {
        if self.processing {
            Err(SessionError::Busy)
        } else {
            Ok(())
        }
    }
}

/// Shared, observable session.
#[derive(Clone)]
pub struct SessionStore {
    tx: Arc<watch::Sender<Session>>,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore {
    /// Creates a fresh session.
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(Session::default());
        Self { tx: Arc::new(tx) }
    }

    /// Clones the current state.
    pub fn snapshot(&self) -> Session {
        self.tx.borrow().clone()
    }

    /// Reads the current state without cloning it.
    pub fn read<R>(&self, f: impl FnOnce(&Session) -> R) -> R {
        f(&self.tx.borrow())
    }

    /// Receiver notified after every successful mutation.
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.tx.subscribe()
    }

    /// Replaces the source image and clears results, selection, focus and error.
    pub fn upload(&self, image: ImagePayload) -> Result<(), SessionError> {
        if !image.mime_type().starts_with("image/") {
            return Err(SessionError::UnsupportedImage(image.mime_type().to_string()));
        }
        if image.is_empty() {
            return Err(SessionError::UnsupportedImage("empty file".into()));
        }
        self.mutate(|s| {
            s.ensure_idle()?;
            debug!(
                event = "session.uploaded",
                domain = "session",
                image_bytes = image.len() as u64,
                mime_type = image.mime_type()
            );
            s.source_image = Some(image);
            s.results.clear();
            s.selected_offsets.clear();
            s.focused = None;
            s.last_error = None;
            Ok(())
        })
    }

    /// Discards the source image and returns to a fresh session.
    pub fn reset(&self) -> Result<(), SessionError> {
        self.mutate(|s| {
            s.ensure_idle()?;
            *s = Session::default();
            debug!(event = "session.reset", domain = "session");
            Ok(())
        })
    }

    /// Adds or removes an offset from the batch selection. Returns whether it
    /// is selected afterwards.
    pub fn toggle_offset(&self, offset: i32) -> Result<bool, SessionError> {
        self.mutate(|s| {
            s.ensure_idle()?;
            if let Some(pos) = s.selected_offsets.iter().position(|o| *o == offset) {
                s.selected_offsets.remove(pos);
                Ok(false)
            } else {
                s.selected_offsets.push(offset);
                Ok(true)
            }
        })
    }

    /// Moves the slider; the value is snapped to the slider grid.
    pub fn set_current_offset(&self, value: i32) -> Result<i32, SessionError> {
        self.mutate(|s| {
            s.ensure_idle()?;
            s.current_offset = snap_to_slider(value);
            Ok(s.current_offset)
        })
    }

    /// Makes an existing result the focused one.
    pub fn focus(&self, offset: i32) -> Result<(), SessionError> {
        self.mutate(|s| {
            if !s.results.contains_key(&offset) {
                return Err(SessionError::UnknownResult(offset));
            }
            s.focused = Some(offset);
            Ok(())
        })
    }

    /// Flips to processing and hands back the source image for the batch.
    pub(crate) fn begin_batch(&self, offsets: &[i32]) -> Result<ImagePayload, SessionError> {
        self.mutate(|s| {
            s.ensure_idle()?;
            let image = s.source_image.clone().ok_or(SessionError::NoSourceImage)?;
            if offsets.is_empty() {
                return Err(SessionError::EmptyBatch);
            }
            s.processing = true;
            s.last_error = None;
            Ok(image)
        })
    }

    /// Merges a result and focuses it.
    pub(crate) fn publish_result(&self, result: TransformResult) {
        self.tx.send_modify(|s| {
            s.focused = Some(result.offset);
            s.results.insert(result.offset, result);
        });
    }

    /// Ends a batch early; published results stay.
    pub(crate) fn fail_batch(&self, failure: BatchFailure) {
        self.tx.send_modify(|s| {
            s.processing = false;
            s.last_error = Some(failure);
        });
    }

    /// Ends a batch that ran every offset and clears the pending selection.
    pub(crate) fn complete_batch(&self) {
        self.tx.send_modify(|s| {
            s.processing = false;
            s.selected_offsets.clear();
        });
    }

    /// Releases a batch that ended without an outcome. Published results and
    /// the selection stay.
    pub(crate) fn abandon_batch(&self) {
        self.tx.send_if_modified(|s| {
            let was_processing = s.processing;
            s.processing = false;
            was_processing
        });
    }

    fn mutate<R>(
        &self,
        f: impl FnOnce(&mut Session) -> Result<R, SessionError>,
    ) -> Result<R, SessionError> {
        let mut outcome = Err(SessionError::Busy);
        self.tx.send_if_modified(|session| {
            outcome = f(session);
            outcome.is_ok()
        });
        outcome
    }
}
