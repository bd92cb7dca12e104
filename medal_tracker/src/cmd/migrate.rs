use crate::{cmd::connect, config::Settings};
use anyhow::Result;
use clap::Args;

#[derive(Debug, Args)]
pub struct MigrateArgs {}

pub async fn run(_args: MigrateArgs, settings: Settings) -> Result<()> {
    connect(&settings).await?;
    tracing::info!("Database schema is up to date.");

    Ok(())
}
