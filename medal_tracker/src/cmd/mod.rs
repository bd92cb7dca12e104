pub mod migrate;
pub mod server;
pub mod sync;

use crate::{
    config::Settings,
    modules::{
        medals::{
            crawler::MedalCrawler,
            fetcher::HttpPageFetcher,
            guard::IngestionGuard,
            scraper::MedalTableScraper,
            store::MedalStore,
        },
        migration::MIGRATOR,
    },
};
use anyhow::{Context, Result};
use medal_tracker_libs::clock::Clock;
use sqlx::{postgres::Postgres, Pool};
use std::sync::Arc;

/// Opens the connection pool and brings the schema up to date.
pub async fn connect(settings: &Settings) -> Result<Pool<Postgres>> {
    let pool: Pool<Postgres> = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(settings.database_url()?)
        .await
        .with_context(|| {
            let message = "Failed to create database connection pool.";
            tracing::error!(message);
            message
        })?;

    MIGRATOR.run(&pool).await.with_context(|| {
        let message = "Failed to run database migrations.";
        tracing::error!(message);
        message
    })?;

    Ok(pool)
}

pub fn build_crawler(
    settings: &Settings,
    store: Arc<dyn MedalStore>,
    clock: Arc<dyn Clock>,
) -> Result<MedalCrawler> {
    let fetcher = HttpPageFetcher::new(settings.fetch_timeout).with_context(|| {
        let message = "Failed to build http client.";
        tracing::error!(message);
        message
    })?;

    Ok(MedalCrawler::new(
        settings.crawler_settings()?,
        Arc::new(fetcher),
        MedalTableScraper::new(),
        IngestionGuard::new(store, clock.clone()),
        clock,
    ))
}
