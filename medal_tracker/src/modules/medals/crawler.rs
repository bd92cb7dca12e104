use crate::modules::{
    medals::{
        fetcher::{FetchError, PageFetcher},
        guard::{IngestionGuard, PublishOutcome, Rejection},
        scraper::{MedalTableScraper, ScrapeError},
    },
    store::StoreError,
};
use chrono::{DateTime, FixedOffset, Timelike, Utc};
use medal_tracker_libs::clock::Clock;
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tokio::{
    sync::Mutex,
    time::{self, Duration},
};
use url::Url;

/// Hours of the day, in a fixed UTC offset, during which the medal table is polled.
///
/// Both bounds are inclusive. A window whose start is after its end wraps past midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActiveWindow {
    offset: FixedOffset,
    start_hour: u32,
    end_hour: u32,
}

impl ActiveWindow {
    pub fn new(offset: FixedOffset, start_hour: u32, end_hour: u32) -> Self {
        Self {
            offset,
            start_hour,
            end_hour,
        }
    }

    pub fn local_hour(&self, now: DateTime<Utc>) -> u32 {
        now.with_timezone(&self.offset).hour()
    }

    pub fn contains(&self, now: DateTime<Utc>) -> bool {
        let hour = self.local_hour(now);
        if self.start_hour <= self.end_hour {
            self.start_hour <= hour && hour <= self.end_hour
        } else {
            hour >= self.start_hour || hour <= self.end_hour
        }
    }
}

impl Default for ActiveWindow {
    /// 08:00 to 22:59 UTC.
    fn default() -> Self {
        Self::new(FixedOffset::east_opt(0).unwrap(), 8, 22)
    }
}

#[derive(Debug, Clone)]
pub struct CrawlerSettings {
    pub source_url: Url,
    pub attempts: u32,
    pub retry_delay: Duration,
    pub window: ActiveWindow,
    pub min_records: usize,
}

#[derive(Debug, Error)]
pub enum CycleError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Scrape(#[from] ScrapeError),
    #[error("failed to save medal data")]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SkipReason {
    OutsideActiveHours { hour: u32 },
    AlreadyRunning,
    NoRecords,
    TooFewRecords { parsed: usize, minimum: usize },
    Rejected { rejection: Rejection },
}

/// Result of one ingestion cycle.
#[derive(Debug)]
pub enum CycleOutcome {
    Published {
        parsed: usize,
        published: usize,
        scraped_at: DateTime<Utc>,
    },
    Skipped(SkipReason),
    Failed(CycleError),
}

impl CycleOutcome {
    pub fn status(&self) -> &'static str {
        match self {
            CycleOutcome::Published { .. } => "published",
            CycleOutcome::Skipped(_) => "skipped",
            CycleOutcome::Failed(_) => "failed",
        }
    }

    /// Human readable summary. Failures are described by their top level cause only.
    pub fn message(&self) -> String {
        match self {
            CycleOutcome::Published {
                published,
                scraped_at,
                ..
            } => format!(
                "Medal table updated with {} countries at {}.",
                published,
                scraped_at.to_rfc3339()
            ),
            CycleOutcome::Skipped(SkipReason::OutsideActiveHours { hour }) => format!(
                "Skipped: outside of active hours (current hour {}).",
                hour
            ),
            CycleOutcome::Skipped(SkipReason::AlreadyRunning) => {
                String::from("Skipped: a sync is already in progress.")
            }
            CycleOutcome::Skipped(SkipReason::NoRecords) => String::from(
                "Skipped: no medal data found, the table may not be populated yet.",
            ),
            CycleOutcome::Skipped(SkipReason::TooFewRecords { parsed, minimum }) => format!(
                "Skipped: only {} countries parsed (at least {} expected), the page layout may have changed.",
                parsed, minimum
            ),
            CycleOutcome::Skipped(SkipReason::Rejected { rejection }) => {
                format!("Skipped: {}.", rejection)
            }
            CycleOutcome::Failed(e) => format!("Sync failed: {}.", e),
        }
    }
}

/// Fetches the medal table page, extracts the records and hands them to the ingestion guard.
pub struct MedalCrawler {
    settings: CrawlerSettings,
    fetcher: Arc<dyn PageFetcher>,
    scraper: MedalTableScraper,
    guard: IngestionGuard,
    clock: Arc<dyn Clock>,
    running: Mutex<()>,
}

impl MedalCrawler {
    pub fn new(
        settings: CrawlerSettings,
        fetcher: Arc<dyn PageFetcher>,
        scraper: MedalTableScraper,
        guard: IngestionGuard,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            settings,
            fetcher,
            scraper,
            guard,
            clock,
            running: Mutex::new(()),
        }
    }

    /// Runs one cycle unless the current hour is outside the active window.
    pub async fn run_cycle(&self) -> CycleOutcome {
        let now = self.clock.now();
        if !self.settings.window.contains(now) {
            let hour = self.settings.window.local_hour(now);
            tracing::info!("Outside active hours (hour {}), skipping.", hour);
            return CycleOutcome::Skipped(SkipReason::OutsideActiveHours { hour });
        }

        self.run_forced().await
    }

    /// Runs one cycle without consulting the active window.
    pub async fn run_forced(&self) -> CycleOutcome {
        let Ok(_running) = self.running.try_lock() else {
            tracing::warn!("A medal sync is already in progress, skipping.");
            return CycleOutcome::Skipped(SkipReason::AlreadyRunning);
        };

        let outcome = match self.crawl().await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!("medal sync aborted: {:?}", e);
                CycleOutcome::Failed(e)
            }
        };
        tracing::info!("Medal sync finished: {}", outcome.message());

        outcome
    }

    async fn crawl(&self) -> Result<CycleOutcome, CycleError> {
        tracing::info!("Start to fetch medal table from {}", self.settings.source_url);
        let html = self.fetch_with_retry().await?;

        let records = self.scraper.extract_records(&html)?;
        let parsed = records.len();
        tracing::info!("Parsed {} countries from the medal table.", parsed);

        if parsed == 0 {
            tracing::warn!(
                "No medal data found, the table may not be populated yet or the layout changed."
            );
            return Ok(CycleOutcome::Skipped(SkipReason::NoRecords));
        }
        if parsed < self.settings.min_records {
            tracing::warn!(
                "Only {} countries parsed, possible layout change. Skipping update.",
                parsed
            );
            return Ok(CycleOutcome::Skipped(SkipReason::TooFewRecords {
                parsed,
                minimum: self.settings.min_records,
            }));
        }

        match self.guard.publish(&records).await? {
            PublishOutcome::Published { count, scraped_at } => {
                tracing::info!("{} medal records published.", count);
                Ok(CycleOutcome::Published {
                    parsed,
                    published: count,
                    scraped_at,
                })
            }
            PublishOutcome::Rejected(rejection) => {
                Ok(CycleOutcome::Skipped(SkipReason::Rejected { rejection }))
            }
        }
    }

    async fn fetch_with_retry(&self) -> Result<String, FetchError> {
        let attempts = self.settings.attempts.max(1);
        let mut attempt = 1;
        loop {
            match self.fetcher.fetch(&self.settings.source_url).await {
                Ok(html) => return Ok(html),
                Err(e) if attempt < attempts => {
                    tracing::warn!(
                        "Fetch attempt {} failed ({}), retrying in {}ms...",
                        attempt,
                        e,
                        self.settings.retry_delay.as_millis()
                    );
                    time::sleep(self.settings.retry_delay).await;
                    attempt += 1;
                }
                Err(e) => {
                    return Err(FetchError::Exhausted {
                        attempts,
                        last: Box::new(e),
                    })
                }
            }
        }
    }
}
