//! Route table hot reload.
//!
//! Watches the directory holding the config file, so editors that replace
//! the file on save keep triggering reloads. Events for other files in that
//! directory are ignored. A changed file is loaded and, when an executor is
//! attached, its route table is built once before it is forwarded; tables
//! that would fail on the server never leave the watcher.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::config::loader::load_config;
use crate::config::routes::build_router;
use crate::config::schema::AppConfig;
use crate::controller::ControllerExecutor;

/// Forwards reloaded configs whose route tables build.
pub struct ConfigWatcher {
    path: PathBuf,
    canonical: Option<PathBuf>,
    executor: Option<Arc<dyn ControllerExecutor>>,
    update_tx: mpsc::UnboundedSender<AppConfig>,
}

impl ConfigWatcher {
    /// Returns the watcher and a receiver for configuration updates.
    pub fn new(path: &Path) -> (Self, mpsc::UnboundedReceiver<AppConfig>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();
        (
            Self {
                path: path.to_path_buf(),
                canonical: path.canonicalize().ok(),
                executor: None,
                update_tx,
            },
            update_rx,
        )
    }

    /// Check every reloaded route table against `executor` before sending it.
    pub fn with_executor(mut self, executor: Arc<dyn ControllerExecutor>) -> Self {
        self.executor = Some(executor);
        self
    }

    /// Whether `event` concerns the watched config file.
    fn touches(&self, event: &Event) -> bool {
        event.paths.iter().any(|p| {
            p == &self.path
                || self.canonical.as_deref() == Some(p.as_path())
                || (self.canonical.is_some() && p.canonicalize().ok() == self.canonical)
        })
    }

    /// Load the file for a relevant event; `None` when it is irrelevant or
    /// the new config is unusable.
    fn reload(&self, event: &Event) -> Option<AppConfig> {
        if !(event.kind.is_modify() || event.kind.is_create()) || !self.touches(event) {
            return None;
        }
        tracing::info!(path = ?self.path, "Config file change detected, reloading");

        let config = match load_config(&self.path) {
            Ok(config) => config,
            Err(e) => {
                tracing::error!(path = ?self.path, error = %e, "Failed to reload config, keeping current routes");
                return None;
            }
        };
        if let Some(executor) = &self.executor {
            if let Err(e) = build_router(&config.routes, executor.clone()) {
                tracing::error!(path = ?self.path, error = %e, "Reloaded route table does not build, keeping current routes");
                return None;
            }
        }
        Some(config)
    }

    /// Start watching in a background thread.
    ///
    /// The returned watcher must be kept alive for as long as reloads are
    /// wanted.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let path = self.path.clone();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    if let Some(config) = self.reload(&event) {
                        let routes = config.routes.len();
                        if self.update_tx.send(config).is_err() {
                            tracing::debug!("Config receiver dropped, reload discarded");
                        } else {
                            tracing::info!(routes, "Reloaded config forwarded");
                        }
                    }
                }
                Err(e) => tracing::error!(error = %e, "Config watch error"),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&dir, RecursiveMode::NonRecursive)?;

        tracing::info!(path = ?path, dir = ?dir, "Config watcher started");
        Ok(watcher)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::{ControllerRegistry, SystemController};
    use notify::event::{CreateKind, EventKind, ModifyKind};
    use std::fs;

    fn temp_config(name: &str, body: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("pathway-watch-{}-{}", name, std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("pathway.toml");
        fs::write(&path, body).unwrap();
        path
    }

    fn modified(path: &Path) -> Event {
        Event::new(EventKind::Modify(ModifyKind::Any)).add_path(path.to_path_buf())
    }

    fn executor() -> Arc<dyn ControllerExecutor> {
        let mut registry = ControllerRegistry::new();
        registry.register("system", SystemController);
        Arc::new(registry)
    }

    const VALID: &str = "[[routes]]\nuri = \"/status\"\naction = \"status@system\"\n";
    const UNKNOWN_ACTION: &str = "[[routes]]\nuri = \"/status\"\naction = \"missing@system\"\n";

    #[test]
    fn test_reload_on_change_to_config_file() {
        let path = temp_config("valid", VALID);
        let (watcher, _rx) = ConfigWatcher::new(&path);

        let config = watcher.reload(&modified(&path)).unwrap();
        assert_eq!(config.routes.len(), 1);

        let created = Event::new(EventKind::Create(CreateKind::File)).add_path(path.clone());
        assert!(watcher.reload(&created).is_some());
    }

    #[test]
    fn test_ignores_other_files_and_kinds() {
        let path = temp_config("other", VALID);
        let (watcher, _rx) = ConfigWatcher::new(&path);

        let sibling = path.with_file_name("notes.txt");
        fs::write(&sibling, "x").unwrap();
        assert!(watcher.reload(&modified(&sibling)).is_none());

        let access = Event::new(EventKind::Access(notify::event::AccessKind::Any)).add_path(path.clone());
        assert!(watcher.reload(&access).is_none());
    }

    #[test]
    fn test_unbuildable_route_table_not_forwarded() {
        let path = temp_config("unknown", UNKNOWN_ACTION);

        let (unchecked, _rx) = ConfigWatcher::new(&path);
        assert!(unchecked.reload(&modified(&path)).is_some());

        let (checked, _rx) = ConfigWatcher::new(&path);
        let checked = checked.with_executor(executor());
        assert!(checked.reload(&modified(&path)).is_none());
    }

    #[test]
    fn test_invalid_file_not_forwarded() {
        let path = temp_config("broken", "[[routes]\n");
        let (watcher, _rx) = ConfigWatcher::new(&path);
        assert!(watcher.reload(&modified(&path)).is_none());
    }
}
