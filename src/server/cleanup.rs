//! Background blacklist sweeper

use crate::storage::Storage;
use chrono::Utc;
use std::sync::Arc;
use tokio::time::{interval, Duration};
use tracing::{debug, info, warn};

/// Periodic sweep deleting blacklist entries past their own expiry.
/// Entries are only removed once they can no longer match a live token.
pub struct BlacklistSweeper {
    storage: Arc<dyn Storage>,
    sweep_interval_secs: u64,
}

impl BlacklistSweeper {
    /// Create a new sweeper
    pub fn new(storage: Arc<dyn Storage>, sweep_interval_secs: u64) -> Self {
        Self {
            storage,
            sweep_interval_secs,
        }
    }

    /// Start the background sweep task
    pub fn start(&self) -> tokio::task::JoinHandle<()> {
        let storage = self.storage.clone();
        let sweep_interval_secs = self.sweep_interval_secs;

        info!(
            "Starting blacklist sweeper (interval: {}s)",
            sweep_interval_secs
        );

        tokio::spawn(async move {
            let mut sweep_interval = interval(Duration::from_secs(sweep_interval_secs));

            loop {
                sweep_interval.tick().await;

                match storage.purge_expired_blacklist(Utc::now()).await {
                    Ok(0) => {}
                    Ok(count) => debug!("Blacklist sweep purged {} expired entries", count),
                    Err(e) => warn!("Blacklist sweep failed: {}", e),
                }
            }
        })
    }
}
