//! Hot reload of `proxy.toml` and the room catalog.
//!
//! Watches the config file and, optionally, the room catalog it points at.
//! A change to either re-reads the config file; the server rebuilds its
//! runtime from the result.

use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::config::loader::load_config;
use crate::config::schema::ProxyConfig;

/// Re-reads the config file whenever a watched file changes.
pub struct ConfigWatcher {
    config_path: PathBuf,
    extra_paths: Vec<PathBuf>,
    update_tx: mpsc::UnboundedSender<ProxyConfig>,
}

impl ConfigWatcher {
    /// Watch `config_path`. Reloaded configs arrive on the returned receiver.
    pub fn new(config_path: &Path) -> (Self, mpsc::UnboundedReceiver<ProxyConfig>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();

        (
            Self {
                config_path: config_path.to_path_buf(),
                extra_paths: Vec::new(),
                update_tx,
            },
            update_rx,
        )
    }

    /// Also trigger a reload when `path` changes.
    pub fn also_watch(mut self, path: impl Into<PathBuf>) -> Self {
        self.extra_paths.push(path.into());
        self
    }

    /// Start watching in a background thread.
    ///
    /// The returned handle must be kept alive for as long as reloads are wanted.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let tx = self.update_tx.clone();
        let config_path = self.config_path.clone();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    if event.kind.is_modify() || event.kind.is_create() {
                        tracing::info!(paths = ?event.paths, "Watched file changed, reloading config");
                        match load_config(&config_path) {
                            Ok(new_config) => {
                                let _ = tx.send(new_config);
                            }
                            Err(e) => {
                                tracing::error!(error = %e, "Failed to reload config, keeping current runtime");
                            }
                        }
                    }
                }
                Err(e) => tracing::error!(error = ?e, "Watch error"),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&self.config_path, RecursiveMode::NonRecursive)?;
        for path in &self.extra_paths {
            watcher.watch(path, RecursiveMode::NonRecursive)?;
        }

        tracing::info!(
            config = ?self.config_path,
            extra = ?self.extra_paths,
            "Config watcher started"
        );
        Ok(watcher)
    }
}
