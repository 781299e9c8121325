//! Configuration file watcher for hot reload.
//!
//! The parent directory is watched rather than the file itself: editors and
//! ConfigMap mounts replace the file by rename, which leaves a watch on the
//! old inode silent. Directory events are noisy, so a reload is only sent
//! when the file's text actually changed.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::config::loader::parse_config;
use crate::config::schema::GatewayConfig;

/// Watches one configuration file and forwards every valid new version.
pub struct ConfigWatcher {
    snapshot: Snapshot,
    update_tx: mpsc::UnboundedSender<GatewayConfig>,
}

impl ConfigWatcher {
    /// Returns the watcher and a receiver for configuration updates.
    pub fn new(path: &Path) -> (Self, mpsc::UnboundedReceiver<GatewayConfig>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();
        let watcher = Self {
            snapshot: Snapshot::new(path),
            update_tx,
        };
        (watcher, update_rx)
    }

    /// Start watching. The returned handle must be kept alive.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let Self {
            mut snapshot,
            update_tx,
        } = self;
        let dir = watch_dir(&snapshot.path).to_path_buf();
        let path = snapshot.path.clone();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) if may_replace_file(&event.kind) => snapshot.reload(&update_tx),
                Ok(_) => {}
                Err(e) => tracing::error!(error = ?e, "Watch error"),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&dir, RecursiveMode::NonRecursive)?;

        tracing::info!(path = ?path, dir = ?dir, "Config watcher started");
        Ok(watcher)
    }
}

/// Last text seen for the watched file.
struct Snapshot {
    path: PathBuf,
    last: Option<String>,
}

impl Snapshot {
    fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            last: fs::read_to_string(path).ok(),
        }
    }

    /// Current text of the file, if it differs from the last one returned.
    fn changed(&mut self) -> io::Result<Option<String>> {
        let content = fs::read_to_string(&self.path)?;
        if self.last.as_deref() == Some(content.as_str()) {
            return Ok(None);
        }
        self.last = Some(content.clone());
        Ok(Some(content))
    }

    fn reload(&mut self, tx: &mpsc::UnboundedSender<GatewayConfig>) {
        let content = match self.changed() {
            Ok(Some(content)) => content,
            Ok(None) => return,
            // Mid-swap; the rename that completes it fires another event.
            Err(e) if e.kind() == io::ErrorKind::NotFound => return,
            Err(e) => {
                tracing::error!(path = ?self.path, error = %e, "Failed to read config");
                return;
            }
        };

        tracing::info!(path = ?self.path, "Config file change detected, reloading");
        match parse_config(&self.path, &content) {
            Ok(config) => {
                let _ = tx.send(config);
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to reload config, keeping current filter");
            }
        }
    }
}

fn may_replace_file(kind: &EventKind) -> bool {
    kind.is_modify() || kind.is_create()
}

/// Directory holding `path`; `.` for a bare file name.
fn watch_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    }
}
