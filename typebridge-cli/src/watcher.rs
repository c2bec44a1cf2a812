//! Source watching for `typebridge generate --watch`.
//!
//! Raw notifications are debounced and reduced to TypeScript changes; each
//! debounce window arrives as one batch so a burst of saves triggers a
//! single regeneration.

use crate::error::{CliResult, WatchError};
use crate::scanner::is_typescript;
use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use notify_debouncer_mini::{new_debouncer, DebounceEventResult, Debouncer};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver};
use std::time::Duration;

/// A TypeScript source that changed on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceChange {
    Changed(PathBuf),
    Removed(PathBuf),
}

impl SourceChange {
    /// `None` for anything that is not a TypeScript source, including the
    /// generated Swift and Kotlin files themselves.
    pub fn classify(path: PathBuf) -> Option<Self> {
        if !is_typescript(&path) {
            return None;
        }
        Some(if path.exists() {
            SourceChange::Changed(path)
        } else {
            SourceChange::Removed(path)
        })
    }

    pub fn path(&self) -> &Path {
        match self {
            SourceChange::Changed(path) | SourceChange::Removed(path) => path,
        }
    }
}

/// One debounce window: the source changes it contained, or the watch error.
pub type ChangeBatch = Result<Vec<SourceChange>, WatchError>;

/// Keeps the notify watcher alive; events stop when it is dropped.
pub type WatchGuard = Debouncer<RecommendedWatcher>;

pub struct SourceWatcher {
    root: PathBuf,
    debounce: Duration,
}

impl SourceWatcher {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            debounce: Duration::from_millis(300),
        }
    }

    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Watch the root recursively. Windows with no TypeScript change are
    /// not delivered.
    pub fn start(&self) -> CliResult<(WatchGuard, Receiver<ChangeBatch>)> {
        let (sender, receiver) = mpsc::channel();

        let mut debouncer = new_debouncer(self.debounce, move |result: DebounceEventResult| {
            let batch = match result {
                Ok(events) => {
                    let changes: Vec<_> = events
                        .into_iter()
                        .filter_map(|event| SourceChange::classify(event.path))
                        .collect();
                    if changes.is_empty() {
                        return;
                    }
                    Ok(changes)
                }
                Err(e) => Err(WatchError::Notify(e.to_string())),
            };
            // The receiver is gone once the CLI loop exits.
            let _ = sender.send(batch);
        })
        .map_err(|e| WatchError::Init(e.to_string()))?;

        debouncer
            .watcher()
            .watch(&self.root, RecursiveMode::Recursive)
            .map_err(|e| WatchError::Notify(e.to_string()))?;

        Ok((debouncer, receiver))
    }
}
