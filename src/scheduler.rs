// src/scheduler.rs
use chrono::Utc;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{error, info};

use crate::pipeline::Curator;

/// Run the curator forever on a fixed interval. Ticks never overlap: each
/// run is awaited to completion before the next tick is considered, so two
/// runs can never race on the history document.
pub async fn run_on_interval(mut curator: Curator, interval_secs: u64) {
    let mut ticker = interval(Duration::from_secs(interval_secs.max(60)));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        let now = Utc::now();
        match curator.run_once(now).await {
            Ok(report) => {
                info!(
                    fetched = report.fetched,
                    unique = report.unique,
                    published = report.published,
                    "curation tick finished"
                );
            }
            Err(e) => {
                error!(error = %format!("{e:#}"), "curation tick failed");
            }
        }
    }
}
