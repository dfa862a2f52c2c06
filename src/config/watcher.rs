//! Configuration file watcher for hot reload.
//!
//! Only the `[cache_headers]` section takes effect on reload; listener and
//! observability changes need a restart. Editors often emit several modify
//! events per save, so a reload whose cache headers switches match the last
//! applied ones is dropped.

use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::config::loader::load_config;
use crate::config::schema::{AppConfig, CacheHeadersConfig};

/// A watcher that monitors the configuration file for changes.
pub struct ConfigWatcher {
    path: PathBuf,
    applied: CacheHeadersConfig,
    update_tx: mpsc::UnboundedSender<AppConfig>,
}

impl ConfigWatcher {
    /// Create a watcher for `path`, starting from the `applied` switches.
    ///
    /// Returns the watcher and a receiver for configuration updates.
    pub fn new(
        path: &Path,
        applied: CacheHeadersConfig,
    ) -> (Self, mpsc::UnboundedReceiver<AppConfig>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();

        (
            Self {
                path: path.to_path_buf(),
                applied,
                update_tx,
            },
            update_rx,
        )
    }

    /// Start watching the file. The returned handle must be kept alive.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let Self {
            path,
            mut applied,
            update_tx,
        } = self;
        let watched = path.clone();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) if event.kind.is_modify() || event.kind.is_create() => {
                    if let Some(new_config) = reload(&path, &mut applied) {
                        let _ = update_tx.send(new_config);
                    }
                }
                Ok(_) => {}
                Err(e) => tracing::error!(error = ?e, "Watch error"),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&watched, RecursiveMode::NonRecursive)?;

        tracing::info!(path = ?watched, "Config watcher started");
        Ok(watcher)
    }
}

/// Load `path` and return it when its cache headers switches differ from
/// `applied`, which is updated in that case.
fn reload(path: &Path, applied: &mut CacheHeadersConfig) -> Option<AppConfig> {
    let new_config = match load_config(path) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(
                path = ?path,
                error = %e,
                "Failed to reload config, keeping current cache headers"
            );
            return None;
        }
    };

    let switches = &new_config.cache_headers;
    if *switches == *applied {
        tracing::debug!(path = ?path, "Config reloaded, cache headers unchanged");
        return None;
    }

    tracing::info!(
        path = ?path,
        enabled = switches.enabled,
        prefer_etag = switches.prefer_etag,
        strip_expires = switches.strip_expires,
        "Cache headers config reloaded"
    );
    *applied = switches.clone();
    Some(new_config)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_file(body: &str) -> tempfile::NamedTempFile {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), body).unwrap();
        file
    }

    #[test]
    fn test_reload_sends_changed_switches_once() {
        let file = config_file("[cache_headers]\nstrip_expires = false\n");

        let mut applied = CacheHeadersConfig::default();
        let reloaded = reload(file.path(), &mut applied).unwrap();
        assert!(!reloaded.cache_headers.strip_expires);
        assert!(!applied.strip_expires);

        // A second event for the same save changes nothing.
        assert!(reload(file.path(), &mut applied).is_none());
    }

    #[test]
    fn test_reload_ignores_unchanged_switches() {
        let file = config_file("[timeouts]\nrequest_secs = 5\n");

        let mut applied = CacheHeadersConfig::default();
        assert!(reload(file.path(), &mut applied).is_none());
    }

    #[test]
    fn test_reload_keeps_switches_on_invalid_file() {
        let file = config_file("[cache_headers]\nenabled = \"sometimes\"\n");

        let mut applied = CacheHeadersConfig::default();
        assert!(reload(file.path(), &mut applied).is_none());
        assert_eq!(applied, CacheHeadersConfig::default());
    }
}
