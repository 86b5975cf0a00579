//! Download orchestration: selection → routes → directories → documents.
//!
//! One run at a time. A run walks the selected summits, queries their routes,
//! and fetches every document sequentially so directory creation and progress
//! reporting follow a fixed order. Cancellation is cooperative: the run checks
//! its token before each summit query, before each route and before each
//! document, and never aborts a transfer midway.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::catalog::CatalogClient;
use crate::catalog::model::Route;
use crate::catalog::query::RouteQuery;
use crate::catalog::transport::Transport;
use crate::error::{Error, Result};
use crate::fetch::{DocumentFetcher, FetchedDocument};
use crate::fs::{FileSystem, TokioFileSystem};
use crate::layout;
use crate::stats::{RunStats, RunStatsBuilder};

/// Lifecycle of the orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunState {
    /// No run has been started yet.
    #[default]
    Idle,
    /// A worker is active.
    Running,
    /// The last run processed every route.
    Completed,
    /// The last run stopped at a cancellation checkpoint.
    Cancelled,
    /// The last run stopped on an error.
    Failed,
}

impl RunState {
    /// Returns true for `Completed`, `Cancelled` and `Failed`.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled | Self::Failed)
    }
}

/// Snapshot published to observers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DownloadStatus {
    pub state: RunState,
    /// Documents finished in the current run.
    pub completed: usize,
    /// Documents in the current run; `None` until routes are resolved.
    pub total: Option<usize>,
    /// Message of the error that failed the last run.
    pub error: Option<String>,
}

/// What the user picked: the range/area context and the summits in it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub range_id: Option<u32>,
    pub area_id: Option<u32>,
    pub summit_ids: Vec<u32>,
}

impl Selection {
    #[must_use]
    pub const fn new(range_id: Option<u32>, area_id: Option<u32>, summit_ids: Vec<u32>) -> Self {
        Self {
            range_id,
            area_id,
            summit_ids,
        }
    }
}

/// How a run ended.
#[derive(Debug)]
pub enum RunOutcome {
    Completed(RunStats),
    Cancelled(RunStats),
    Failed { error: Error, stats: RunStats },
}

impl RunOutcome {
    /// Terminal state matching this outcome.
    #[must_use]
    pub const fn state(&self) -> RunState {
        match self {
            Self::Completed(_) => RunState::Completed,
            Self::Cancelled(_) => RunState::Cancelled,
            Self::Failed { .. } => RunState::Failed,
        }
    }

    /// Statistics gathered before the run ended.
    #[must_use]
    pub const fn stats(&self) -> &RunStats {
        match self {
            Self::Completed(stats) | Self::Cancelled(stats) | Self::Failed { stats, .. } => stats,
        }
    }
}

/// Trait for receiving download progress updates.
///
/// Callbacks run on the worker task. All methods default to no-ops.
pub trait DownloadProgress: Send + Sync {
    /// Called once all selected summits have been queried.
    fn on_routes_resolved(&self, _routes: usize, _documents: usize) {}

    /// Called after a route's directory exists, before its documents are fetched.
    fn on_route_start(&self, _route: &Route, _dir: &Path) {}

    /// Called after a document has been written.
    fn on_document_complete(&self, _document: &FetchedDocument) {}

    /// Called after every document with (completed, total).
    fn on_progress(&self, _completed: usize, _total: usize) {}

    /// Called when the run fails.
    fn on_error(&self, _error: &Error) {}
}

/// A null progress implementation that ignores all events.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl DownloadProgress for NoProgress {}

/// State shared between the orchestrator, its cancel handles and the worker.
struct Shared {
    /// Single-owner run guard.
    running: AtomicBool,
    /// Cancellation token of the current run. The lock also serializes
    /// start/finish/cancel transitions.
    control: Mutex<CancellationToken>,
    status: watch::Sender<DownloadStatus>,
}

impl Shared {
    fn control(&self) -> std::sync::MutexGuard<'_, CancellationToken> {
        self.control.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn cancel(&self) {
        let token = self.control();
        if self.running.load(Ordering::Acquire) {
            log::info!("Cancellation requested");
            token.cancel();
        }
    }

    fn finish(&self, state: RunState, error: Option<String>) {
        let _guard = self.control();
        self.status.send_modify(|s| {
            s.state = state;
            if error.is_some() {
                s.error = error;
            }
        });
        self.running.store(false, Ordering::Release);
    }
}

/// Owns the run flag for the lifetime of a worker.
///
/// Dropping it without [`RunGuard::finish`] (observer panic, aborted task)
/// marks the run `Failed` and releases the orchestrator.
struct RunGuard {
    shared: Arc<Shared>,
    finished: bool,
}

impl RunGuard {
    fn new(shared: Arc<Shared>) -> Self {
        Self {
            shared,
            finished: false,
        }
    }

    fn finish(mut self, outcome: &RunOutcome) {
        let error = match outcome {
            RunOutcome::Failed { error, .. } => Some(error.to_string()),
            RunOutcome::Completed(_) | RunOutcome::Cancelled(_) => None,
        };
        self.shared.finish(outcome.state(), error);
        self.finished = true;
    }
}

impl Drop for RunGuard {
    fn drop(&mut self) {
        if !self.finished {
            log::error!("Download worker stopped before the run finished");
            self.shared.finish(
                RunState::Failed,
                Some("download worker stopped unexpectedly".to_string()),
            );
        }
    }
}

/// Cloneable handle that can cancel the active run from anywhere.
#[derive(Clone)]
pub struct CancelHandle {
    shared: Arc<Shared>,
}

impl CancelHandle {
    /// Requests cancellation of the active run. No-op when nothing is running.
    pub fn cancel(&self) {
        self.shared.cancel();
    }
}

/// Drives download runs over a catalog client and a document fetcher.
pub struct DownloadOrchestrator<T: Transport, F: FileSystem = TokioFileSystem> {
    catalog: Arc<CatalogClient<T>>,
    fetcher: Arc<DocumentFetcher<T, F>>,
    download_dir: PathBuf,
    shared: Arc<Shared>,
}

impl<T, F> DownloadOrchestrator<T, F>
where
    T: Transport + 'static,
    F: FileSystem + 'static,
{
    /// Creates an idle orchestrator writing under `download_dir`.
    #[must_use]
    pub fn new(
        catalog: Arc<CatalogClient<T>>,
        fetcher: Arc<DocumentFetcher<T, F>>,
        download_dir: impl Into<PathBuf>,
    ) -> Self {
        let (status, _) = watch::channel(DownloadStatus::default());
        Self {
            catalog,
            fetcher,
            download_dir: download_dir.into(),
            shared: Arc::new(Shared {
                running: AtomicBool::new(false),
                control: Mutex::new(CancellationToken::new()),
                status,
            }),
        }
    }

    /// Current state and progress.
    #[must_use]
    pub fn status(&self) -> DownloadStatus {
        self.shared.status.borrow().clone()
    }

    /// Receiver notified on every state or progress change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<DownloadStatus> {
        self.shared.status.subscribe()
    }

    /// Returns a handle that can cancel runs of this orchestrator.
    #[must_use]
    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle {
            shared: Arc::clone(&self.shared),
        }
    }

    /// Requests cancellation of the active run. No-op when nothing is running.
    pub fn cancel(&self) {
        self.shared.cancel();
    }

    /// Starts a run on a background task.
    ///
    /// Must be called from within a Tokio runtime. The returned handle
    /// resolves once the run reaches a terminal state.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AlreadyRunning`] if a run is active.
    pub fn start(
        &self,
        selection: Selection,
        progress: Arc<dyn DownloadProgress>,
    ) -> Result<JoinHandle<RunOutcome>> {
        let token = {
            let mut control = self.shared.control();
            if self
                .shared
                .running
                .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
                .is_err()
            {
                return Err(Error::AlreadyRunning);
            }
            *control = CancellationToken::new();
            self.shared.status.send_replace(DownloadStatus {
                state: RunState::Running,
                ..DownloadStatus::default()
            });
            control.clone()
        };

        log::info!(
            "Starting download of {} summit(s) into {}",
            selection.summit_ids.len(),
            self.download_dir.display()
        );

        let job = DownloadJob {
            catalog: Arc::clone(&self.catalog),
            fetcher: Arc::clone(&self.fetcher),
            download_dir: self.download_dir.clone(),
            selection,
            token,
            guard: RunGuard::new(Arc::clone(&self.shared)),
            progress,
            stats: RunStatsBuilder::new(),
            completed: 0,
        };
        Ok(tokio::spawn(job.run()))
    }
}

/// Transient per-run state.
struct DownloadJob<T: Transport, F: FileSystem> {
    catalog: Arc<CatalogClient<T>>,
    fetcher: Arc<DocumentFetcher<T, F>>,
    download_dir: PathBuf,
    selection: Selection,
    token: CancellationToken,
    guard: RunGuard,
    progress: Arc<dyn DownloadProgress>,
    stats: RunStatsBuilder,
    completed: usize,
}

impl<T: Transport, F: FileSystem> DownloadJob<T, F> {
    async fn run(mut self) -> RunOutcome {
        let result = self.execute().await;
        let stats = self.stats.build();
        let outcome = match result {
            Ok(true) => {
                log::info!(
                    "Download completed: {} document(s), {} bytes",
                    stats.documents,
                    stats.total_bytes
                );
                RunOutcome::Completed(stats)
            }
            Ok(false) => {
                log::info!("Download cancelled after {} document(s)", stats.documents);
                RunOutcome::Cancelled(stats)
            }
            Err(error) => {
                log::error!("Download failed: {error}");
                self.progress.on_error(&error);
                RunOutcome::Failed { error, stats }
            }
        };
        self.guard.finish(&outcome);
        outcome
    }

    /// Returns `Ok(false)` when stopped by cancellation.
    async fn execute(&mut self) -> Result<bool> {
        let Some(routes) = self.resolve_routes().await? else {
            return Ok(false);
        };

        let total: usize = routes.iter().map(|r| r.documents.len()).sum();
        self.guard.shared.status.send_modify(|s| s.total = Some(total));
        self.progress.on_routes_resolved(routes.len(), total);

        for route in &routes {
            if self.token.is_cancelled() {
                return Ok(false);
            }
            let dir = layout::route_dir(&self.download_dir, route);
            self.fetcher.fs().create_dir_all(&dir).await?;
            self.progress.on_route_start(route, &dir);

            for document in &route.documents {
                if self.token.is_cancelled() {
                    return Ok(false);
                }
                let fetched = self
                    .fetcher
                    .fetch(document.id, &dir, Some(&document.original_name))
                    .await
                    .map_err(|e| Error::Document {
                        route: layout::route_label(route),
                        file_id: document.id,
                        source: Box::new(e),
                    })?;

                self.stats.add_document(fetched.bytes);
                self.completed += 1;
                let completed = self.completed;
                self.guard.shared.status.send_modify(|s| s.completed = completed);
                self.progress.on_document_complete(&fetched);
                self.progress.on_progress(completed, total);
            }
            self.stats.add_route();
        }
        Ok(true)
    }

    /// Queries every selected summit in order. `None` if cancelled midway.
    async fn resolve_routes(&self) -> Result<Option<Vec<Route>>> {
        let mut routes = Vec::new();
        for &summit in &self.selection.summit_ids {
            if self.token.is_cancelled() {
                return Ok(None);
            }
            let query =
                RouteQuery::for_mountain(self.selection.range_id, self.selection.area_id, summit);
            let found = self.catalog.query_routes(&query).await?;
            log::debug!("Summit {summit}: {} route(s)", found.len());
            routes.extend(found);
        }
        Ok(Some(routes))
    }
}
