use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use tokio::sync::watch;
use tokio::time::{ interval, Duration, MissedTickBehavior };

use crate::alert_checker::AlertChecker;

/// Drives [`AlertChecker`] on a fixed interval until shutdown is signalled.
///
/// Passes run inline in the loop, so a slow pass delays the next tick
/// instead of overlapping it. Missed ticks are not replayed.
pub struct Scheduler {
    checker: Arc<AlertChecker>,
    period: Duration,
}

impl Scheduler {
    pub fn new(checker: Arc<AlertChecker>, period: Duration) -> Self {
        Self { checker, period }
    }

    /// Run until `shutdown` carries `true` or its sender is dropped.
    /// The first pass starts immediately.
    pub async fn start(self, mut shutdown: watch::Receiver<bool>) {
        tracing::info!(period_secs = self.period.as_secs(), "Alert scheduler started");

        let mut ticker = interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                    continue;
                }
            }

            self.tick().await;
        }

        tracing::info!("Alert scheduler stopped");
    }

    /// One evaluation pass with logging. Returns the emitted count, or `None` if the pass failed.
    pub async fn tick(&self) -> Option<usize> {
        let started = Instant::now();

        match self.checker.run_pass(Utc::now()).await {
            Ok(emitted) => {
                tracing::info!(
                    emitted,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Alert evaluation pass finished"
                );
                Some(emitted)
            }
            Err(e) => {
                tracing::error!(error = %e, "Alert evaluation pass failed");
                None
            }
        }
    }
}
