//! ChronosLens core: the session a user works in, the batch orchestrator that
//! fills it with aged portraits, and the presentation model front ends render.
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use chronos_core::{BatchOrchestrator, SessionStore};
//! use chronos_harness::vendors::gemini::{self, GeminiProvider};
//! use chronos_harness::{Harness, ImagePayload};
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let harness = Harness::builder()
//!     .register_provider(Arc::new(GeminiProvider::from_env()?))
//!     .build()?;
//! let client = harness.client(gemini::default_model())?;
//!
//! let store = SessionStore::new();
//! store.upload(ImagePayload::new("image/jpeg", std::fs::read("me.jpg")?))?;
//! let orchestrator = BatchOrchestrator::new(Arc::new(client), store.clone());
//! orchestrator.run(&[-20, 30]).await?;
//! assert_eq!(store.snapshot().focused_offset(), Some(30));
//! # Ok(())
//! # }
//! ```

pub mod batch;
pub mod download;
pub mod notice;
pub mod observability;
pub mod offsets;
pub mod picker;
pub mod session;
pub mod share;
pub mod view;

pub use batch::{BatchError, BatchEvent, BatchOrchestrator, BatchReport, BatchRun};
pub use download::{DownloadError, download_file_name, write_all, write_focused};
pub use notice::{ETHICS_NOTICE, Notice, PRIVACY_NOTICE};
pub use observability::init_observability;
pub use offsets::{AgeStage, DEFAULT_OFFSET, PRESET_OFFSETS, offset_label, snap_to_slider};
pub use picker::{PickerError, image_from_path, load_source};
pub use session::{BatchFailure, Session, SessionError, SessionStore, TransformResult};
pub use share::{NativeShare, NoNativeShare, ShareError, ShareLinks, ShareOutcome, share_result};
pub use view::{ComparisonSlider, MainView, ViewMode, main_view, submit_label, timeline};
