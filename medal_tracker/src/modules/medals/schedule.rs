use crate::modules::medals::crawler::{CycleOutcome, MedalCrawler};
use std::sync::Arc;
use tokio::{
    task::JoinHandle,
    time::{self, Duration, MissedTickBehavior},
};

/// Spawns a task that runs a gated ingestion cycle every `period`, the first one immediately.
pub fn spawn_medal_sync(crawler: Arc<MedalCrawler>, period: Duration) -> JoinHandle<()> {
    tracing::info!(
        "Medal sync scheduled every {} minutes.",
        period.as_secs() / 60
    );

    tokio::spawn(async move {
        let mut interval = time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            interval.tick().await;
            if let CycleOutcome::Failed(e) = crawler.run_cycle().await {
                tracing::error!("scheduled medal sync failed: {}", e);
            }
        }
    })
}
