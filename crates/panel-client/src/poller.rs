//! Background certification polling
//!
//! Refreshes once immediately, then on every tick until cancelled. A
//! failed refresh keeps the previous state and the next tick tries again.

use std::time::Duration;

use coordination::SharedAppContext;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Handle to a running poll loop
pub struct CertificationPoller {
    cancel: CancellationToken,
    task: JoinHandle<u64>,
}

impl CertificationPoller {
    /// Start polling. Cancelling `cancel` (or calling [`stop`]) ends the loop.
    ///
    /// [`stop`]: CertificationPoller::stop
    pub fn spawn(context: SharedAppContext, interval: Duration, cancel: CancellationToken) -> Self {
        let token = cancel.clone();
        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            let mut refreshes = 0u64;

            loop {
                tokio::select! {
                    _ = token.cancelled() => {
                        info!(refreshes, "Certification polling stopped");
                        break refreshes;
                    }
                    _ = ticker.tick() => {
                        context.refresh_certifications().await;
                        refreshes += 1;
                        debug!(refreshes, "Certification poll tick");
                    }
                }
            }
        });

        Self { cancel, task }
    }

    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }

    /// Cancel the loop and wait for it. Returns how many refreshes ran.
    pub async fn stop(self) -> u64 {
        self.cancel.cancel();
        self.task.await.unwrap_or_default()
    }
}
