use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::interval;
use tracing::{info, warn};

use crate::domain::RuleBook;

use super::loader::{RulebookError, RulebookLoader};

/// Watch a rulebook file and publish new versions.
///
/// A reload is published only when the `version` field changes, so edits
/// must bump the version to take effect.
pub struct RulebookWatcher {
    loader: RulebookLoader,
    check_interval: Duration,
    last_version: Option<String>,
}

impl RulebookWatcher {
    pub fn new(loader: RulebookLoader, check_interval: Duration) -> Self {
        RulebookWatcher {
            loader,
            check_interval,
            last_version: None,
        }
    }

    /// Load the rulebook and start watching for changes.
    ///
    /// The initial load must succeed. Later failures keep the last good
    /// rulebook in place.
    pub fn start(
        mut self,
    ) -> Result<(watch::Receiver<Arc<RuleBook>>, tokio::task::JoinHandle<()>), RulebookError> {
        let initial = self.loader.load()?;
        info!(
            version = %initial.version,
            rules = initial.rules.len(),
            countries = initial.restricted_countries.len(),
            items = initial.restricted_items.len(),
            "Loaded rulebook"
        );
        self.last_version = Some(initial.version.clone());

        let (tx, rx) = watch::channel(Arc::new(initial));

        let handle = tokio::spawn(async move {
            let mut interval = interval(self.check_interval);
            // First tick completes immediately.
            interval.tick().await;

            loop {
                interval.tick().await;

                match self.check_for_updates(&tx) {
                    Ok(true) => info!("Rulebook reloaded"),
                    Ok(false) => {}
                    Err(e) => warn!(error = %e, "Error checking for rulebook updates"),
                }
            }
        });

        Ok((rx, handle))
    }

    fn check_for_updates(&mut self, tx: &watch::Sender<Arc<RuleBook>>) -> Result<bool, RulebookError> {
        let book = self.loader.load()?;

        if self.last_version.as_ref() == Some(&book.version) {
            return Ok(false);
        }

        info!(
            "Rulebook version changed: {:?} -> {}",
            self.last_version, book.version
        );

        self.last_version = Some(book.version.clone());
        let _ = tx.send(Arc::new(book));

        Ok(true)
    }
}
