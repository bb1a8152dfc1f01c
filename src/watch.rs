//! Range file watching.
//!
//! Re-audits a workbook JSON file each time it changes on disk. The parent
//! directory is watched rather than the file itself so editors that save by
//! replacing the file are still picked up.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::validation::{validate_workbook, WorkbookReport};
use crate::workbook::Workbook;

/// Quiet period that ends a burst of events for one save
const DEFAULT_SETTLE: Duration = Duration::from_millis(150);

/// Events from the file watcher
#[derive(Debug)]
enum WatcherEvent {
    FileChanged,
    WatcherError(notify::Error),
}

/// Watches one range file and yields a fresh report after every change
pub struct WorkbookWatcher {
    path: PathBuf,
    _watcher: RecommendedWatcher,
    rx: mpsc::UnboundedReceiver<WatcherEvent>,
    settle: Duration,
}

impl WorkbookWatcher {
    pub fn new(path: &Path) -> Result<Self> {
        let path = path
            .canonicalize()
            .with_context(|| format!("Failed to resolve range file: {}", path.display()))?;
        let dir = path
            .parent()
            .map(Path::to_path_buf)
            .with_context(|| format!("Range file has no parent directory: {}", path.display()))?;
        let file_name: Option<OsString> = path.file_name().map(ToOwned::to_owned);

        let (tx, rx) = mpsc::unbounded_channel();

        let mut watcher = RecommendedWatcher::new(
            move |res: Result<Event, notify::Error>| match res {
                Ok(event) => {
                    if let EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_) =
                        event.kind
                    {
                        let touches_file = event
                            .paths
                            .iter()
                            .any(|p| p.file_name() == file_name.as_deref());
                        if touches_file {
                            let _ = tx.send(WatcherEvent::FileChanged);
                        }
                    }
                }
                Err(e) => {
                    let _ = tx.send(WatcherEvent::WatcherError(e));
                }
            },
            Config::default().with_poll_interval(Duration::from_secs(1)),
        )?;

        watcher
            .watch(&dir, RecursiveMode::NonRecursive)
            .with_context(|| format!("Failed to watch directory: {}", dir.display()))?;

        log::info!("Watching range file {}", path.display());

        Ok(Self {
            path,
            _watcher: watcher,
            rx,
            settle: DEFAULT_SETTLE,
        })
    }

    /// Override the quiet period used to coalesce bursts of events
    pub fn with_settle(mut self, settle: Duration) -> Self {
        self.settle = settle;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Wait for the next change and audit the file.
    ///
    /// Returns `None` once the watcher has shut down.
    pub async fn next_report(&mut self) -> Option<Result<WorkbookReport>> {
        match self.rx.recv().await? {
            WatcherEvent::FileChanged => {}
            WatcherEvent::WatcherError(e) => {
                return Some(Err(
                    anyhow::Error::new(e).context("Range file watcher error")
                ));
            }
        }

        // A single save usually arrives as several events
        while let Ok(Some(event)) = tokio::time::timeout(self.settle, self.rx.recv()).await {
            if let WatcherEvent::WatcherError(e) = event {
                log::warn!("Range file watcher error: {}", e);
            }
        }

        log::info!("Range file changed: {}", self.path.display());
        Some(check_file(&self.path).await)
    }
}

/// Load a range file asynchronously and audit it
pub async fn check_file(path: &Path) -> Result<WorkbookReport> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read range file: {}", path.display()))?;
    let workbook = Workbook::from_json(&content)
        .with_context(|| format!("Failed to parse range file: {}", path.display()))?;
    Ok(validate_workbook(&workbook))
}
