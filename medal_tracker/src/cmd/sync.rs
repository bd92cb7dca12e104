use crate::{
    cmd::{build_crawler, connect},
    config::Settings,
    modules::medals::{crawler::CycleOutcome, store::PgMedalStore},
};
use anyhow::Result;
use clap::Args;
use medal_tracker_libs::clock::SystemClock;
use std::sync::Arc;

#[derive(Debug, Args)]
pub struct SyncArgs {
    /// Run even outside of the active hours.
    #[arg(long)]
    force: bool,
}

pub async fn run(args: SyncArgs, settings: Settings) -> Result<()> {
    let pool = connect(&settings).await?;
    let crawler = build_crawler(
        &settings,
        Arc::new(PgMedalStore::new(pool)),
        Arc::new(SystemClock),
    )?;

    let outcome = if args.force {
        crawler.run_forced().await
    } else {
        crawler.run_cycle().await
    };

    if let CycleOutcome::Failed(e) = outcome {
        return Err(anyhow::Error::new(e).context("medal sync failed"));
    }

    Ok(())
}
