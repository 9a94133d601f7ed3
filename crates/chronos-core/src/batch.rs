//! Sequential batch orchestration.
//!
//! A batch walks the requested offsets in the order given, one transformation
//! at a time. Each success is published to the session (and focused) before
//! the next offset starts; the first failure ends the batch and the remaining
//! offsets are dropped. A batch that is dropped or panics before either
//! outcome hands the session back as idle.

use std::sync::Arc;

use chronos_harness::{ImagePayload, ImageTransformer};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::session::{BatchFailure, SessionError, SessionStore, TransformResult};

/// Progress notifications for a running batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchEvent {
    /// First event for every accepted batch.
    Started { batch_id: uuid::Uuid, total: usize },
    /// The call for `offsets[index]` was dispatched.
    OffsetStarted { index: usize, offset: i32 },
    /// The result for `offsets[index]` is now in the session.
    ResultPublished { index: usize, offset: i32 },
    /// Terminal success; `published` lists offsets in completion order.
    Completed { published: Vec<i32> },
    /// Terminal failure.
    Failed { failure: BatchFailure },
}

impl BatchEvent {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed { .. } | Self::Failed { .. })
    }
}

/// Summary of a batch that ran every offset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchReport {
    pub batch_id: uuid::Uuid,
    /// Offsets in the order their results were published.
    pub published: Vec<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BatchError {
    /// The batch never started.
    #[error(transparent)]
    Rejected(#[from] SessionError),
    /// A transformation failed; earlier results remain in the session.
    #[error("{}", .failure.message)]
    Failed {
        failure: BatchFailure,
        published: Vec<i32>,
    },
    /// The background task ended without reporting an outcome.
    #[error("batch task ended unexpectedly: {0}")]
    Aborted(String),
}

/// Runs batches against one transformer and one session.
#[derive(Clone)]
pub struct BatchOrchestrator {
    transformer: Arc<dyn ImageTransformer>,
    store: SessionStore,
}

impl BatchOrchestrator {
    pub fn new(transformer: Arc<dyn ImageTransformer>, store: SessionStore) -> Self {
        Self { transformer, store }
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// Runs a batch to completion or first failure.
    pub async fn run(&self, offsets: &[i32]) -> Result<BatchReport, BatchError> {
        self.execute(offsets, None).await
    }

    /// Re-submits what the session would request now (selection or slider
    /// value), starting from scratch.
    pub async fn retry(&self) -> Result<BatchReport, BatchError> {
        let offsets = self.store.read(|s| s.requested_offsets());
        self.run(&offsets).await
    }

    /// Validates and starts a batch on the runtime, streaming progress.
    ///
    /// Rejections (busy, no image, no offsets) are returned here and nothing is
    /// spawned.
    ///
    /// Events are buffered without bound, so a caller that never reads them
    /// does not hold the batch up.
    pub fn start(&self, offsets: Vec<i32>) -> Result<BatchRun, BatchError> {
        let image = self.store.begin_batch(&offsets)?;
        let guard = ProcessingGuard::new(self.store.clone());
        let (tx, rx) = mpsc::unbounded_channel();
        let this = self.clone();
        let handle =
            tokio::spawn(async move { this.drive(guard, image, &offsets, Some(&tx)).await });
        Ok(BatchRun { rx, handle })
    }

    async fn execute(
        &self,
        offsets: &[i32],
        events: Option<&mpsc::UnboundedSender<BatchEvent>>,
    ) -> Result<BatchReport, BatchError> {
        let image = self.store.begin_batch(offsets)?;
        let guard = ProcessingGuard::new(self.store.clone());
        self.drive(guard, image, offsets, events).await
    }

    async fn drive(
        &self,
        guard: ProcessingGuard,
        image: ImagePayload,
        offsets: &[i32],
        events: Option<&mpsc::UnboundedSender<BatchEvent>>,
    ) -> Result<BatchReport, BatchError> {
        let batch_id = uuid::Uuid::new_v4();
        info!(
            event = "batch.started",
            domain = "batch",
            batch_id = %batch_id,
            total = offsets.len() as u64,
            offsets = ?offsets
        );
        emit(
            events,
            BatchEvent::Started {
                batch_id,
                total: offsets.len(),
            },
        );

        let mut published = Vec::with_capacity(offsets.len());
        for (index, &offset) in offsets.iter().enumerate() {
            debug!(
                event = "batch.offset_started",
                domain = "batch",
                batch_id = %batch_id,
                index = index as u64,
                offset = offset
            );
            emit(events, BatchEvent::OffsetStarted { index, offset });

            match self.transformer.transform(&image, offset).await {
                Ok(generated) => {
                    self.store.publish_result(TransformResult::new(offset, generated));
                    published.push(offset);
                    debug!(
                        event = "batch.result_published",
                        domain = "batch",
                        batch_id = %batch_id,
                        index = index as u64,
                        offset = offset
                    );
                    emit(events, BatchEvent::ResultPublished { index, offset });
                }
                Err(err) => {
                    let failure = BatchFailure::from_error(offset, &err);
                    warn!(
                        event = "batch.failed",
                        domain = "batch",
                        batch_id = %batch_id,
                        index = index as u64,
                        offset = offset,
                        kind = failure.kind.as_str(),
                        skipped = (offsets.len() - index - 1) as u64,
                        error = %err
                    );
                    guard.fail(failure.clone());
                    emit(
                        events,
                        BatchEvent::Failed {
                            failure: failure.clone(),
                        },
                    );
                    return Err(BatchError::Failed { failure, published });
                }
            }
        }

        guard.complete();
        info!(
            event = "batch.completed",
            domain = "batch",
            batch_id = %batch_id,
            published = published.len() as u64
        );
        emit(
            events,
            BatchEvent::Completed {
                published: published.clone(),
            },
        );
        Ok(BatchReport {
            batch_id,
            published,
        })
    }
}

fn emit(events: Option<&mpsc::UnboundedSender<BatchEvent>>, event: BatchEvent) {
    if let Some(tx) = events {
        // A dropped receiver only means nobody is watching progress.
        let _ = tx.send(event);
    }
}

/// Owns the `processing` flag for one batch. Settling it through
/// [`complete`](Self::complete) or [`fail`](Self::fail) records the outcome;
/// dropping it unsettled (cancelled future, panicking transformer) only
/// releases the session.
struct ProcessingGuard {
    store: SessionStore,
    settled: bool,
}

impl ProcessingGuard {
    fn new(store: SessionStore) -> Self {
        Self {
            store,
            settled: false,
        }
    }

    fn complete(mut self) {
        self.settled = true;
        self.store.complete_batch();
    }

    fn fail(mut self, failure: BatchFailure) {
        self.settled = true;
        self.store.fail_batch(failure);
    }
}

impl Drop for ProcessingGuard {
    fn drop(&mut self) {
        if !self.settled {
            warn!(event = "batch.abandoned", domain = "batch");
            self.store.abandon_batch();
        }
    }
}

/// Handle for a batch running in the background.
pub struct BatchRun {
    rx: mpsc::UnboundedReceiver<BatchEvent>,
    handle: JoinHandle<Result<BatchReport, BatchError>>,
}

impl BatchRun {
    /// Next progress event; `None` once the batch task has finished.
    pub async fn next_event(&mut self) -> Option<BatchEvent> {
        self.rx.recv().await
    }

    /// Waits for the batch and returns its outcome.
    pub async fn finish(self) -> Result<BatchReport, BatchError> {
        drop(self.rx);
        match self.handle.await {
            Ok(result) => result,
            Err(e) => Err(BatchError::Aborted(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chronos_harness::{TransformError, TransformErrorKind};
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Returns the offset as a one-byte image unless told to fail.
    #[derive(Default)]
    struct FakeTransformer {
        failures: HashMap<i32, TransformError>,
        calls: Mutex<Vec<i32>>,
    }

    impl FakeTransformer {
        fn failing_at(offset: i32, err: TransformError) -> Self {
            Self {
                failures: HashMap::from([(offset, err)]),
                ..Self::default()
            }
        }

        fn calls(&self) -> Vec<i32> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait::async_trait]
    impl ImageTransformer for FakeTransformer {
        async fn transform(
            &self,
            image: &ImagePayload,
            offset: i32,
        ) -> Result<ImagePayload, TransformError> {
            self.calls.lock().unwrap().push(offset);
            assert_eq!(image.data().as_ref(), b"portrait");
            if let Some(err) = self.failures.get(&offset) {
                return Err(err.clone());
            }
            Ok(ImagePayload::new(
                "image/png",
                format!("aged{offset}").into_bytes(),
            ))
        }
    }

    /// Never answers.
    struct StalledTransformer;

    #[async_trait::async_trait]
    impl ImageTransformer for StalledTransformer {
        async fn transform(
            &self,
            _image: &ImagePayload,
            _offset: i32,
        ) -> Result<ImagePayload, TransformError> {
            std::future::pending::<()>().await;
            unreachable!()
        }
    }

    struct PanickingTransformer;

    #[async_trait::async_trait]
    impl ImageTransformer for PanickingTransformer {
        async fn transform(
            &self,
            _image: &ImagePayload,
            offset: i32,
        ) -> Result<ImagePayload, TransformError> {
            panic!("transformer bug at offset {offset}")
        }
    }

    fn store_with_portrait() -> SessionStore {
        let store = SessionStore::new();
        store
            .upload(ImagePayload::new("image/jpeg", b"portrait".to_vec()))
            .expect("upload");
        store
    }

    fn setup(transformer: FakeTransformer) -> (BatchOrchestrator, Arc<FakeTransformer>) {
        let store = store_with_portrait();
        let transformer = Arc::new(transformer);
        (BatchOrchestrator::new(transformer.clone(), store), transformer)
    }

    fn image_for(orchestrator: &BatchOrchestrator, offset: i32) -> Option<Vec<u8>> {
        orchestrator
            .store()
            .read(|s| s.result(offset).map(|r| r.image.data().to_vec()))
    }

    #[tokio::test]
    async fn past_and_future_offsets_both_succeed() {
        let (orchestrator, transformer) = setup(FakeTransformer::default());
        let report = orchestrator.run(&[-20, 30]).await.expect("batch");
        assert_eq!(report.published, vec![-20, 30]);
        assert_eq!(transformer.calls(), vec![-20, 30]);

        let session = orchestrator.store().snapshot();
        assert_eq!(session.result_count(), 2);
        assert_eq!(session.focused_offset(), Some(30));
        assert!(!session.is_processing());
        assert!(session.last_error().is_none());
        assert_eq!(image_for(&orchestrator, -20), Some(b"aged-20".to_vec()));
    }

    #[tokio::test]
    async fn offsets_run_in_supplied_order_not_sorted() {
        let (orchestrator, transformer) = setup(FakeTransformer::default());
        orchestrator.run(&[40, -10, 20]).await.expect("batch");
        assert_eq!(transformer.calls(), vec![40, -10, 20]);
        assert_eq!(orchestrator.store().read(|s| s.focused_offset()), Some(20));
    }

    #[tokio::test]
    async fn first_failure_stops_the_batch_and_keeps_partial_results() {
        let (orchestrator, transformer) = setup(FakeTransformer::failing_at(
            40,
            TransformError::service("fake", "No image payload"),
        ));
        let err = orchestrator.run(&[10, 40, 50]).await.expect_err("fails");
        assert_eq!(err.to_string(), "No image payload");
        assert!(matches!(&err, BatchError::Failed { published, .. } if published == &vec![10]));
        assert_eq!(transformer.calls(), vec![10, 40]);

        let session = orchestrator.store().snapshot();
        assert_eq!(session.result_count(), 1);
        assert!(session.result(10).is_some());
        assert!(!session.is_processing());
        assert_eq!(session.last_error_message(), Some("No image payload"));
        assert_eq!(
            session.last_error().map(|f| (f.offset, f.kind)),
            Some((40, TransformErrorKind::Service))
        );
    }

    #[tokio::test]
    async fn failure_keeps_selection_for_retry_from_scratch() {
        let (orchestrator, _) = setup(FakeTransformer::failing_at(
            40,
            TransformError::network("fake", "connection refused"),
        ));
        orchestrator.store().toggle_offset(10).expect("toggle");
        orchestrator.store().toggle_offset(40).expect("toggle");
        let offsets = orchestrator.store().read(|s| s.requested_offsets());
        orchestrator.run(&offsets).await.expect_err("fails");

        assert_eq!(
            orchestrator.store().read(|s| s.selected_offsets().to_vec()),
            vec![10, 40]
        );
        let err = orchestrator.retry().await.expect_err("still failing");
        assert!(matches!(err, BatchError::Failed { ref published, .. } if published == &vec![10]));
        assert_eq!(
            orchestrator.store().read(|s| s.last_error().map(|f| f.kind)),
            Some(TransformErrorKind::Network)
        );
    }

    #[tokio::test]
    async fn success_clears_pending_selection() {
        let (orchestrator, _) = setup(FakeTransformer::default());
        orchestrator.store().toggle_offset(-10).expect("toggle");
        orchestrator.store().toggle_offset(50).expect("toggle");
        orchestrator.retry().await.expect("batch");
        let session = orchestrator.store().snapshot();
        assert!(session.selected_offsets().is_empty());
        assert_eq!(session.focused_offset(), Some(50));
    }

    #[tokio::test]
    async fn rerunning_an_offset_overwrites_only_that_result() {
        let (orchestrator, _) = setup(FakeTransformer::default());
        orchestrator.run(&[10, 20]).await.expect("first");
        let before = orchestrator.store().read(|s| s.result(10).cloned());

        orchestrator.run(&[20]).await.expect("second");
        let session = orchestrator.store().snapshot();
        assert_eq!(session.result_count(), 2);
        assert_eq!(session.result(10).cloned(), before);
        assert_eq!(session.focused_offset(), Some(20));
    }

    #[tokio::test]
    async fn duplicate_offsets_yield_one_result_each() {
        let (orchestrator, transformer) = setup(FakeTransformer::default());
        orchestrator.run(&[30, 10, 30]).await.expect("batch");
        assert_eq!(transformer.calls().len(), 3);
        let session = orchestrator.store().snapshot();
        assert_eq!(session.result_count(), 2);
        assert_eq!(session.focused_offset(), Some(30));
    }

    #[tokio::test]
    async fn zero_offset_is_dispatched_and_kept() {
        let (orchestrator, transformer) = setup(FakeTransformer::default());
        orchestrator.run(&[0]).await.expect("batch");
        assert_eq!(transformer.calls(), vec![0]);
        assert!(orchestrator.store().read(|s| s.result(0).is_some()));
    }

    #[tokio::test]
    async fn batch_without_image_or_offsets_is_rejected() {
        let transformer = Arc::new(FakeTransformer::default());
        let orchestrator = BatchOrchestrator::new(transformer.clone(), SessionStore::new());
        assert_eq!(
            orchestrator.run(&[10]).await,
            Err(BatchError::Rejected(SessionError::NoSourceImage))
        );

        let (orchestrator, transformer) = setup(FakeTransformer::default());
        assert_eq!(
            orchestrator.run(&[]).await,
            Err(BatchError::Rejected(SessionError::EmptyBatch))
        );
        assert!(transformer.calls().is_empty());
    }

    #[tokio::test]
    async fn new_batch_clears_previous_error() {
        let (orchestrator, _) = setup(FakeTransformer::failing_at(
            40,
            TransformError::service("fake", "blocked"),
        ));
        orchestrator.run(&[40]).await.expect_err("fails");
        orchestrator.run(&[10]).await.expect("succeeds");
        assert!(orchestrator.store().read(|s| s.last_error().is_none()));
    }

    #[tokio::test]
    async fn started_batch_streams_progress_in_order() {
        let (orchestrator, _) = setup(FakeTransformer::default());
        let mut run = orchestrator.start(vec![-20, 30]).expect("start");
        assert!(orchestrator.store().read(|s| s.is_processing()));
        assert_eq!(
            orchestrator.start(vec![10]).err(),
            Some(BatchError::Rejected(SessionError::Busy))
        );

        let mut events = Vec::new();
        while let Some(event) = run.next_event().await {
            let terminal = event.is_terminal();
            events.push(event);
            if terminal {
                break;
            }
        }
        let report = run.finish().await.expect("report");
        assert_eq!(report.published, vec![-20, 30]);

        assert!(matches!(events[0], BatchEvent::Started { total: 2, .. }));
        assert_eq!(
            &events[1..],
            &[
                BatchEvent::OffsetStarted {
                    index: 0,
                    offset: -20
                },
                BatchEvent::ResultPublished {
                    index: 0,
                    offset: -20
                },
                BatchEvent::OffsetStarted {
                    index: 1,
                    offset: 30
                },
                BatchEvent::ResultPublished {
                    index: 1,
                    offset: 30
                },
                BatchEvent::Completed {
                    published: vec![-20, 30]
                },
            ]
        );
    }

    #[tokio::test]
    async fn started_batch_reports_failure_event() {
        let (orchestrator, _) = setup(FakeTransformer::failing_at(
            40,
            TransformError::service("fake", "No image payload"),
        ));
        let mut run = orchestrator.start(vec![10, 40]).expect("start");
        let mut last = None;
        while let Some(event) = run.next_event().await {
            last = Some(event);
        }
        assert!(matches!(
            last,
            Some(BatchEvent::Failed { ref failure }) if failure.offset == 40
        ));
        assert!(matches!(run.finish().await, Err(BatchError::Failed { .. })));
    }

    #[tokio::test]
    async fn unread_progress_does_not_hold_up_long_batches() {
        let (orchestrator, _) = setup(FakeTransformer::default());
        let offsets: Vec<i32> = (1..=40).collect();
        let run = orchestrator.start(offsets).expect("start");

        let mut rx = orchestrator.store().subscribe();
        tokio::time::timeout(Duration::from_secs(5), rx.wait_for(|s| !s.is_processing()))
            .await
            .expect("batch settles without anyone reading events")
            .expect("store alive");
        assert_eq!(orchestrator.store().read(|s| s.result_count()), 40);

        let report = run.finish().await.expect("report");
        assert_eq!(report.published.len(), 40);
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_batch_releases_the_session() {
        let store = store_with_portrait();
        let orchestrator = BatchOrchestrator::new(Arc::new(StalledTransformer), store.clone());

        let outcome = tokio::time::timeout(Duration::from_millis(50), orchestrator.run(&[10])).await;
        assert!(outcome.is_err());
        assert!(!store.read(|s| s.is_processing()));

        store.reset().expect("reset after cancelled batch");
        store
            .upload(ImagePayload::new("image/png", b"next".to_vec()))
            .expect("upload after cancelled batch");
    }

    #[tokio::test]
    async fn panicking_transformer_aborts_and_releases_the_session() {
        let store = store_with_portrait();
        let orchestrator = BatchOrchestrator::new(Arc::new(PanickingTransformer), store.clone());

        let mut run = orchestrator.start(vec![10, 20]).expect("start");
        while run.next_event().await.is_some() {}
        assert!(matches!(run.finish().await, Err(BatchError::Aborted(_))));

        let session = store.snapshot();
        assert!(!session.is_processing());
        assert_eq!(session.result_count(), 0);
        store.reset().expect("reset after aborted batch");
    }
}
