//! Debounced file-system watching for the ARB directory.
//!
//! `notify` reports raw events on its own thread. They are filtered to `.arb`
//! files and sent over a Tokio channel to a task that waits for a quiet period
//! before reloading the affected catalogs.

use std::{
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use anyhow::{Context, Result};
use indexmap::IndexMap;
use notify::{EventKind as NotifyKind, RecommendedWatcher, RecursiveMode, Watcher, event::ModifyKind};
use tokio::{sync::mpsc, task::JoinHandle};

use crate::core::store::ResourceStore;
use crate::events::ChangeType;

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileChange {
    pub path: PathBuf,
    pub change: ChangeType,
}

pub fn is_catalog_file(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some("arb")
}

/// Maps a raw `notify` event kind to a catalog change.
///
/// Renames are reported per path: a path that still exists was renamed in,
/// any other path was renamed away.
pub fn classify(kind: &NotifyKind, path: &Path) -> Option<ChangeType> {
    match kind {
        NotifyKind::Create(_) => Some(ChangeType::Created),
        NotifyKind::Modify(ModifyKind::Name(_)) => Some(if path.exists() {
            ChangeType::Created
        } else {
            ChangeType::Deleted
        }),
        NotifyKind::Modify(_) => Some(ChangeType::Modified),
        NotifyKind::Remove(_) => Some(ChangeType::Deleted),
        _ => None,
    }
}

/// Pending changes collected during one debounce window, one per path.
#[derive(Debug, Default)]
pub struct PendingChanges {
    changes: IndexMap<PathBuf, ChangeType>,
}

impl PendingChanges {
    pub fn push(&mut self, change: FileChange) {
        let merged = match (self.changes.get(&change.path), change.change) {
            (_, ChangeType::Deleted) => ChangeType::Deleted,
            (Some(ChangeType::Created), _) => ChangeType::Created,
            (Some(ChangeType::Deleted), _) => ChangeType::Modified,
            (_, next) => next,
        };
        self.changes.insert(change.path, merged);
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn drain(&mut self) -> Vec<FileChange> {
        self.changes
            .drain(..)
            .map(|(path, change)| FileChange { path, change })
            .collect()
    }
}

/// Applies changes once `window` passes without a new one arriving.
///
/// Returns when the sending side is closed, after applying what is pending.
pub async fn debounce_changes<F>(
    mut rx: mpsc::UnboundedReceiver<FileChange>,
    window: Duration,
    mut apply: F,
) where
    F: FnMut(FileChange),
{
    let mut pending = PendingChanges::default();
    while let Some(first) = rx.recv().await {
        pending.push(first);
        let closed = loop {
            match tokio::time::timeout(window, rx.recv()).await {
                Ok(Some(change)) => pending.push(change),
                Ok(None) => break true,
                Err(_) => break false,
            }
        };
        for change in pending.drain() {
            apply(change);
        }
        if closed {
            break;
        }
    }
}

/// Keeps a [`ResourceStore`] in sync with the files in one directory.
///
/// Watching stops when the value is dropped.
pub struct CatalogWatcher {
    dir: PathBuf,
    _watcher: RecommendedWatcher,
    task: JoinHandle<()>,
}

impl CatalogWatcher {
    /// Starts watching `dir` on the current Tokio runtime.
    pub fn start(dir: &Path, store: Arc<ResourceStore>, debounce: Duration) -> Result<Self> {
        let runtime =
            tokio::runtime::Handle::try_current().context("File watching needs a Tokio runtime")?;
        let (tx, rx) = mpsc::unbounded_channel();

        let mut watcher = notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
            match res {
                Ok(event) => {
                    for path in &event.paths {
                        if !is_catalog_file(path) {
                            continue;
                        }
                        if let Some(change) = classify(&event.kind, path) {
                            let _ = tx.send(FileChange {
                                path: path.clone(),
                                change,
                            });
                        }
                    }
                }
                Err(e) => tracing::warn!(error = %e, "file watcher error"),
            }
        })
        .context("Failed to create file watcher")?;

        watcher
            .watch(dir, RecursiveMode::NonRecursive)
            .with_context(|| format!("Failed to watch directory: {:?}", dir))?;

        let task = runtime.spawn(debounce_changes(rx, debounce, move |change| {
            tracing::debug!(path = %change.path.display(), change = %change.change, "applying file change");
            if let Some(warning) = store.handle_file_change(&change.path, change.change) {
                tracing::warn!(file = %warning.file_path, error = %warning.error, "catalog not reloaded");
            }
        }));

        tracing::info!(dir = %dir.display(), debounce_ms = debounce.as_millis() as u64, "watching ARB files");
        Ok(Self {
            dir: dir.to_path_buf(),
            _watcher: watcher,
            task,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl Drop for CatalogWatcher {
    fn drop(&mut self) {
        self.task.abort();
    }
}
