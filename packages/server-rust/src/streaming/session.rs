//! Streaming ingestion sessions over the Category repository.
//!
//! Each session is one tokio task servicing a bounded inbound queue.
//! Creation order equals request arrival order within a session; no
//! batching, reordering, or deduplication. The first repository error
//! aborts the session immediately, and records persisted before the
//! failing request are not rolled back — no transaction spans a session.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use catalog_core::{Category, CategoryInput, CategoryRepository, StoreError};

use crate::shutdown::ShutdownController;

/// Bounded capacity of a session's inbound request queue.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 64;

/// A collect-then-acknowledge session.
///
/// Send creation requests on `requests`, then drop the sender to signal
/// end-of-input. The session answers exactly once on `response`: the
/// full aggregate in submission order, or the error that aborted it.
pub struct CollectSession {
    /// Inbound request queue; dropping every sender ends the input.
    pub requests: mpsc::Sender<CategoryInput>,
    /// Resolves once, after end-of-input or the first failure.
    pub response: oneshot::Receiver<Result<Vec<Category>, StoreError>>,
}

/// An interleaved session.
///
/// Every request is answered individually on `results` before the next
/// request is read — strict one-in/one-out with no read-ahead. Dropping
/// the request sender ends the session without a further send.
pub struct InterleavedSession {
    /// Inbound request queue; dropping every sender closes the session.
    pub requests: mpsc::Sender<CategoryInput>,
    /// One created record per accepted request, in arrival order.
    pub results: mpsc::Receiver<Category>,
    /// Resolves when the session ends; carries the aborting error, if any.
    pub handle: JoinHandle<Result<(), StoreError>>,
}

/// Spawns streaming ingestion sessions bound to one Category repository.
///
/// Sessions register with the shutdown controller: a draining server
/// refuses new sessions while in-flight ones run to completion within
/// the drain grace period.
pub struct IngestPipeline {
    categories: Arc<dyn CategoryRepository>,
    shutdown: Arc<ShutdownController>,
    capacity: usize,
}

impl IngestPipeline {
    #[must_use]
    pub fn new(categories: Arc<dyn CategoryRepository>, shutdown: Arc<ShutdownController>) -> Self {
        Self {
            categories,
            shutdown,
            capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }

    /// Overrides the inbound queue capacity (tests use small values).
    #[must_use]
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    fn admit(&self) -> Result<crate::shutdown::SessionGuard, StoreError> {
        if self.shutdown.is_draining() {
            return Err(StoreError::internal("server is draining; no new sessions"));
        }
        Ok(self.shutdown.session_guard())
    }

    /// Starts a collect-then-acknowledge session.
    ///
    /// # Errors
    ///
    /// Refused with [`StoreError::Internal`] while the server is draining.
    pub fn collect_session(&self) -> Result<CollectSession, StoreError> {
        let guard = self.admit()?;
        let (req_tx, mut req_rx) = mpsc::channel::<CategoryInput>(self.capacity);
        let (resp_tx, resp_rx) = oneshot::channel();
        let repo = Arc::clone(&self.categories);

        tokio::spawn(async move {
            let _guard = guard;
            let mut created: Vec<Category> = Vec::new();
            while let Some(input) = req_rx.recv().await {
                match repo.create(input).await {
                    Ok(category) => created.push(category),
                    Err(err) => {
                        // Abort: earlier records stay persisted, no
                        // aggregate is produced.
                        warn!(%err, persisted = created.len(), "collect session aborted");
                        let _ = resp_tx.send(Err(err));
                        return;
                    }
                }
            }
            debug!(count = created.len(), "collect session complete");
            let _ = resp_tx.send(Ok(created));
        });

        Ok(CollectSession {
            requests: req_tx,
            response: resp_rx,
        })
    }

    /// Starts an interleaved session.
    ///
    /// # Errors
    ///
    /// Refused with [`StoreError::Internal`] while the server is draining.
    pub fn interleaved_session(&self) -> Result<InterleavedSession, StoreError> {
        let guard = self.admit()?;
        let (req_tx, mut req_rx) = mpsc::channel::<CategoryInput>(self.capacity);
        let (result_tx, result_rx) = mpsc::channel::<Category>(self.capacity);
        let repo = Arc::clone(&self.categories);

        let handle = tokio::spawn(async move {
            let _guard = guard;
            // One-in/one-out: the next request is not read until the
            // previous result has been delivered.
            while let Some(input) = req_rx.recv().await {
                let category = match repo.create(input).await {
                    Ok(category) => category,
                    Err(err) => {
                        warn!(%err, "interleaved session aborted");
                        return Err(err);
                    }
                };
                if result_tx.send(category).await.is_err() {
                    // Client stopped reading; nothing left to deliver.
                    debug!("interleaved session result receiver dropped");
                    return Ok(());
                }
            }
            // Client closed its sending direction: exit without a
            // further send.
            debug!("interleaved session input closed");
            Ok(())
        });

        Ok(InterleavedSession {
            requests: req_tx,
            results: result_rx,
            handle,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use sqlx::sqlite::SqlitePoolOptions;

    use crate::storage::sqlite::{ensure_schema, SqliteCategoryRepository};

    use super::*;

    // RUST_LOG controls verbosity; repeated init attempts are fine.
    fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .try_init();
    }

    async fn sqlite_repo() -> Arc<dyn CategoryRepository> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        ensure_schema(&pool).await.unwrap();
        Arc::new(SqliteCategoryRepository::new(pool))
    }

    fn ready_controller() -> Arc<ShutdownController> {
        let controller = Arc::new(ShutdownController::new());
        controller.set_ready();
        controller
    }

    fn input(name: &str) -> CategoryInput {
        CategoryInput {
            name: name.to_string(),
            description: String::new(),
        }
    }

    /// Repository that fails on the nth create call.
    struct FailAfter {
        inner: Arc<dyn CategoryRepository>,
        calls: AtomicUsize,
        fail_on: usize,
    }

    #[async_trait]
    impl CategoryRepository for FailAfter {
        async fn create(&self, input: CategoryInput) -> Result<Category, StoreError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if call == self.fail_on {
                return Err(StoreError::internal("engine failure"));
            }
            self.inner.create(input).await
        }

        async fn find_all(&self) -> Result<Vec<Category>, StoreError> {
            self.inner.find_all().await
        }

        async fn find(&self, id: &str) -> Result<Category, StoreError> {
            self.inner.find(id).await
        }

        async fn find_by_course_id(&self, course_id: &str) -> Result<Category, StoreError> {
            self.inner.find_by_course_id(course_id).await
        }

        async fn update(&self, category: &Category) -> Result<(), StoreError> {
            self.inner.update(category).await
        }

        async fn delete(&self, id: &str) -> Result<(), StoreError> {
            self.inner.delete(id).await
        }
    }

    #[tokio::test]
    async fn collect_session_aggregates_in_submission_order() {
        let pipeline =
            IngestPipeline::new(sqlite_repo().await, ready_controller()).with_capacity(4);
        let session = pipeline.collect_session().unwrap();

        for name in ["first", "second", "third"] {
            session.requests.send(input(name)).await.unwrap();
        }
        drop(session.requests); // end-of-input

        let created = session.response.await.unwrap().unwrap();
        assert_eq!(created.len(), 3);
        let names: Vec<&str> = created.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["first", "second", "third"]);
        for category in &created {
            assert!(!category.id.is_empty());
        }
    }

    #[tokio::test]
    async fn collect_session_abort_keeps_earlier_records() {
        init_tracing();
        let inner = sqlite_repo().await;
        let repo = Arc::new(FailAfter {
            inner: Arc::clone(&inner),
            calls: AtomicUsize::new(0),
            fail_on: 3,
        });
        let pipeline = IngestPipeline::new(repo, ready_controller());
        let session = pipeline.collect_session().unwrap();

        for name in ["a", "b", "c", "d"] {
            // The session may have aborted already; a refused send is fine.
            let _ = session.requests.send(input(name)).await;
        }
        drop(session.requests);

        // No aggregate: the session delivers the aborting error instead.
        let err = session.response.await.unwrap().unwrap_err();
        assert!(matches!(err, StoreError::Internal(_)));

        // The first two records stay persisted; nothing was rolled back.
        // find_all promises no ordering, so compare as a sorted set.
        let persisted = inner.find_all().await.unwrap();
        let mut names: Vec<&str> = persisted.iter().map(|c| c.name.as_str()).collect();
        names.sort_unstable();
        assert_eq!(names, ["a", "b"]);
    }

    #[tokio::test]
    async fn interleaved_session_pairs_each_request_with_one_result() {
        let pipeline = IngestPipeline::new(sqlite_repo().await, ready_controller());
        let mut session = pipeline.interleaved_session().unwrap();

        for name in ["x", "y"] {
            session.requests.send(input(name)).await.unwrap();
            let result = session.results.recv().await.unwrap();
            assert_eq!(result.name, name);
            assert!(!result.id.is_empty());
        }

        // Closing the sending direction ends the session without a
        // further send.
        drop(session.requests);
        assert!(session.results.recv().await.is_none());
        session.handle.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn interleaved_session_abort_surfaces_the_error() {
        init_tracing();
        let inner = sqlite_repo().await;
        let repo = Arc::new(FailAfter {
            inner,
            calls: AtomicUsize::new(0),
            fail_on: 1,
        });
        let pipeline = IngestPipeline::new(repo, ready_controller());
        let mut session = pipeline.interleaved_session().unwrap();

        session.requests.send(input("doomed")).await.unwrap();

        assert!(session.results.recv().await.is_none());
        let err = session.handle.await.unwrap().unwrap_err();
        assert!(matches!(err, StoreError::Internal(_)));
    }

    #[tokio::test]
    async fn draining_server_refuses_new_sessions() {
        let controller = ready_controller();
        let pipeline = IngestPipeline::new(sqlite_repo().await, Arc::clone(&controller));

        controller.trigger_shutdown();

        assert!(pipeline.collect_session().is_err());
        assert!(pipeline.interleaved_session().is_err());
    }

    #[tokio::test]
    async fn in_flight_session_counts_toward_drain() {
        let controller = ready_controller();
        let pipeline = IngestPipeline::new(sqlite_repo().await, Arc::clone(&controller));

        let session = pipeline.collect_session().unwrap();
        assert_eq!(controller.active_sessions(), 1);

        drop(session.requests);
        let _ = session.response.await.unwrap();

        // The guard drops when the session task finishes.
        controller.trigger_shutdown();
        assert!(
            controller
                .wait_for_drain(std::time::Duration::from_secs(1))
                .await
        );
    }
}
