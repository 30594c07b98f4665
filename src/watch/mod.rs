//! Directory watcher that keeps the catalog in sync with the music directory.
//!
//! [`MusicWatcher::start`] arms a non-recursive `notify` subscription on the
//! directory, reconciles the files already present, and then spawns a task
//! that feeds live events through the same [`Reconciler`]. Events that
//! arrive while the initial scan runs are buffered and applied afterwards;
//! the no-op rules for duplicate creates make the overlap harmless.

pub mod events;
pub mod reconcile;
pub mod scan;

pub use events::{normalize, translate, CatalogEvent, CatalogEventKind};
pub use reconcile::{Outcome, ReconcileSummary, Reconciler};
pub use scan::initial_scan;

use melodex_db::pool::DbPool;
use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Fatal watcher errors. Anything else is logged and survived.
#[derive(Debug, thiserror::Error)]
pub enum WatchError {
    #[error("Failed to prepare music directory {path:?}: {source}")]
    Directory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to watch music directory {path:?}: {source}")]
    Subscribe {
        path: PathBuf,
        #[source]
        source: notify::Error,
    },

    #[error("Watcher is already running")]
    AlreadyStarted,

    #[error("Watcher task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Watches one music directory and reconciles it into the catalog.
pub struct MusicWatcher {
    root: PathBuf,
    reconciler: Arc<Reconciler>,
    watcher: Option<RecommendedWatcher>,
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl MusicWatcher {
    /// Create a watcher for `root`, creating the directory if it is missing.
    pub fn new(root: impl Into<PathBuf>, pool: DbPool) -> Result<Self, WatchError> {
        let root = root.into();
        std::fs::create_dir_all(&root).map_err(|source| WatchError::Directory {
            path: root.clone(),
            source,
        })?;
        // notify reports absolute paths; relative paths are computed against this.
        let root = root
            .canonicalize()
            .map_err(|source| WatchError::Directory { path: root, source })?;

        Ok(Self {
            reconciler: Arc::new(Reconciler::new(pool, root.clone())),
            root,
            watcher: None,
            cancel: CancellationToken::new(),
            task: None,
        })
    }

    /// Absolute path of the watched directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn reconciler(&self) -> &Reconciler {
        &self.reconciler
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Reconcile the files currently in the directory.
    pub fn rescan(&self) -> ReconcileSummary {
        self.reconciler.apply_all(initial_scan(&self.root))
    }

    /// Arm the subscription, run the initial scan, and start forwarding events.
    ///
    /// A watcher that was closed can be started again. Must be called from
    /// within a tokio runtime.
    pub fn start(&mut self) -> Result<ReconcileSummary, WatchError> {
        if self.watcher.is_some() {
            return Err(WatchError::AlreadyStarted);
        }

        let (event_tx, event_rx) = mpsc::unbounded_channel::<Event>();
        let (error_tx, error_rx) = mpsc::unbounded_channel::<notify::Error>();

        let mut watcher = notify::recommended_watcher(
            move |res: Result<Event, notify::Error>| match res {
                Ok(event) => {
                    let _ = event_tx.send(event);
                }
                Err(e) => {
                    let _ = error_tx.send(e);
                }
            },
        )
        .map_err(|source| WatchError::Subscribe {
            path: self.root.clone(),
            source,
        })?;

        watcher
            .watch(&self.root, RecursiveMode::NonRecursive)
            .map_err(|source| WatchError::Subscribe {
                path: self.root.clone(),
                source,
            })?;
        tracing::info!(dir = %self.root.display(), "Watching music directory");

        let summary = self.rescan();
        tracing::info!(
            inserted = summary.inserted,
            unchanged = summary.unchanged,
            failed = summary.failed,
            "Initial scan reconciled"
        );

        // The previous token, if any, was cancelled by close().
        self.cancel = CancellationToken::new();
        self.watcher = Some(watcher);
        self.task = Some(tokio::spawn(forward_events(
            self.reconciler.clone(),
            event_rx,
            error_rx,
            self.cancel.clone(),
        )));

        Ok(summary)
    }

    /// Release the OS subscription and wait for the forwarding task to stop.
    ///
    /// An event being applied when this is called is allowed to finish.
    pub async fn close(&mut self) -> Result<(), WatchError> {
        self.cancel.cancel();
        drop(self.watcher.take());

        if let Some(task) = self.task.take() {
            task.await?;
        }
        tracing::info!(dir = %self.root.display(), "File watcher stopped");
        Ok(())
    }
}

impl Drop for MusicWatcher {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Forward live notifications into the reconciler, one item per wakeup.
///
/// Ends when cancelled or when the subscription's channels close.
async fn forward_events(
    reconciler: Arc<Reconciler>,
    mut events: UnboundedReceiver<Event>,
    mut errors: UnboundedReceiver<notify::Error>,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            event = events.recv() => {
                let Some(event) = event else { break };
                tracing::trace!(kind = ?event.kind, paths = ?event.paths, "File event");
                for catalog_event in normalize(&event, reconciler.root()) {
                    reconciler.apply(&catalog_event);
                }
            }
            err = errors.recv() => {
                let Some(err) = err else { break };
                tracing::warn!(error = %err, "File watcher error");
            }
        }
    }
    tracing::debug!("Event forwarding loop finished");
}
