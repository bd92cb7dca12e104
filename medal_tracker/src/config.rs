use crate::modules::medals::crawler::{ActiveWindow, CrawlerSettings};
use anyhow::{Context, Result};
use chrono::FixedOffset;
use std::{env, fmt::Display, str::FromStr};
use tokio::time::Duration;
use url::Url;

pub const DEFAULT_MEDAL_SOURCE_URL: &str =
    "https://en.wikipedia.org/wiki/2026_Winter_Olympics_medal_table";
const DEFAULT_SYNC_INTERVAL_MINUTES: u64 = 30;

/// Runtime configuration, read from the environment.
#[derive(Debug, Clone)]
pub struct Settings {
    pub database_url: Option<String>,
    pub medal_source_url: String,
    pub fetch_attempts: u32,
    pub fetch_retry_delay: Duration,
    pub fetch_timeout: Duration,
    pub active_utc_offset_hours: i32,
    pub active_hour_start: u32,
    pub active_hour_end: u32,
    pub min_plausible_records: usize,
    pub sync_interval: Duration,
    pub sync_token: Option<String>,
    pub cors_allow_origin: Option<String>,
}

impl Settings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the settings from any key/value source. Missing or malformed values fall back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        Self {
            database_url: var("DATABASE_URL"),
            medal_source_url: var("MEDAL_SOURCE_URL").unwrap_or_else(|| {
                tracing::warn!(
                    "MEDAL_SOURCE_URL environment variable is not set. Default value `{}` will be used.",
                    DEFAULT_MEDAL_SOURCE_URL
                );
                String::from(DEFAULT_MEDAL_SOURCE_URL)
            }),
            fetch_attempts: parse_or(&var, "FETCH_ATTEMPTS", 2),
            fetch_retry_delay: Duration::from_millis(parse_or(&var, "FETCH_RETRY_DELAY_MS", 5000)),
            fetch_timeout: Duration::from_secs(parse_or(&var, "FETCH_TIMEOUT_SECS", 10)),
            active_utc_offset_hours: parse_or(&var, "ACTIVE_UTC_OFFSET_HOURS", 0),
            active_hour_start: parse_or(&var, "ACTIVE_HOUR_START", 8),
            active_hour_end: parse_or(&var, "ACTIVE_HOUR_END", 22),
            min_plausible_records: parse_or(&var, "MIN_PLAUSIBLE_RECORDS", 5),
            sync_interval: Duration::from_secs(60 * sync_interval_minutes(&var)),
            sync_token: var("SYNC_TOKEN"),
            cors_allow_origin: var("CORS_ALLOW_ORIGIN"),
        }
    }

    pub fn database_url(&self) -> Result<&str> {
        self.database_url.as_deref().with_context(|| {
            let message = "DATABASE_URL must be configured.";
            tracing::error!(message);
            message
        })
    }

    pub fn crawler_settings(&self) -> Result<CrawlerSettings> {
        let source_url = Url::parse(&self.medal_source_url).with_context(|| {
            let message = format!("invalid medal source url `{}`", self.medal_source_url);
            tracing::error!(message);
            message
        })?;
        let offset = FixedOffset::east_opt(self.active_utc_offset_hours * 3600).with_context(|| {
            let message = format!(
                "ACTIVE_UTC_OFFSET_HOURS `{}` is out of range",
                self.active_utc_offset_hours
            );
            tracing::error!(message);
            message
        })?;
        if self.active_hour_start > 23 || self.active_hour_end > 23 {
            let message = format!(
                "active hours must be within 0 and 23, got {} to {}",
                self.active_hour_start, self.active_hour_end
            );
            tracing::error!(message);
            anyhow::bail!(message);
        }

        Ok(CrawlerSettings {
            source_url,
            attempts: self.fetch_attempts.max(1),
            retry_delay: self.fetch_retry_delay,
            window: ActiveWindow::new(offset, self.active_hour_start, self.active_hour_end),
            min_records: self.min_plausible_records,
        })
    }
}

fn sync_interval_minutes(var: &impl Fn(&str) -> Option<String>) -> u64 {
    match parse_or(var, "SYNC_INTERVAL_MINUTES", DEFAULT_SYNC_INTERVAL_MINUTES) {
        0 => {
            tracing::warn!(
                "SYNC_INTERVAL_MINUTES must be positive. Default value `{}` will be used.",
                DEFAULT_SYNC_INTERVAL_MINUTES
            );
            DEFAULT_SYNC_INTERVAL_MINUTES
        }
        minutes => minutes,
    }
}

fn parse_or<T>(var: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T
where
    T: FromStr + Display,
    T::Err: Display,
{
    match var(key) {
        Some(value) => value.trim().parse().unwrap_or_else(|e| {
            tracing::warn!(
                "{} environment variable `{}` is invalid ({}). Default value `{}` will be used.",
                key,
                value,
                e,
                default
            );
            default
        }),
        None => {
            tracing::warn!(
                "{} environment variable is not set. Default value `{}` will be used.",
                key,
                default
            );
            default
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::{TimeZone, Utc};
    use std::collections::HashMap;

    fn settings(vars: &[(&str, &str)]) -> Settings {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Settings::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults() {
        let settings = settings(&[]);

        assert_eq!(settings.database_url, None);
        assert_eq!(settings.medal_source_url, DEFAULT_MEDAL_SOURCE_URL);
        assert_eq!(settings.fetch_attempts, 2);
        assert_eq!(settings.fetch_retry_delay, Duration::from_millis(5000));
        assert_eq!(settings.fetch_timeout, Duration::from_secs(10));
        assert_eq!(settings.min_plausible_records, 5);
        assert_eq!(settings.sync_interval, Duration::from_secs(30 * 60));
        assert_eq!(settings.sync_token, None);
        assert!(settings.database_url().is_err());

        let crawler = settings.crawler_settings().unwrap();
        assert_eq!(crawler.window, ActiveWindow::default());
    }

    #[test]
    fn overrides_and_invalid_values() {
        let settings = settings(&[
            ("DATABASE_URL", "postgres://localhost/medals"),
            ("FETCH_ATTEMPTS", "4"),
            ("FETCH_RETRY_DELAY_MS", "soon"),
            ("ACTIVE_UTC_OFFSET_HOURS", "1"),
            ("SYNC_TOKEN", "  "),
        ]);

        assert_eq!(settings.database_url().unwrap(), "postgres://localhost/medals");
        assert_eq!(settings.fetch_attempts, 4);
        assert_eq!(settings.fetch_retry_delay, Duration::from_millis(5000));
        assert_eq!(settings.sync_token, None);

        let window = settings.crawler_settings().unwrap().window;
        // 22:30 UTC is 23:30 at UTC+1
        assert!(!window.contains(Utc.with_ymd_and_hms(2026, 2, 10, 22, 30, 0).unwrap()));
        assert!(window.contains(Utc.with_ymd_and_hms(2026, 2, 10, 7, 30, 0).unwrap()));
    }

    #[test]
    fn zero_sync_interval_falls_back_to_default() {
        assert_eq!(
            settings(&[("SYNC_INTERVAL_MINUTES", "0")]).sync_interval,
            Duration::from_secs(30 * 60)
        );
        assert_eq!(
            settings(&[("SYNC_INTERVAL_MINUTES", "5")]).sync_interval,
            Duration::from_secs(5 * 60)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn zero_sync_interval_still_schedules() {
        let interval = settings(&[("SYNC_INTERVAL_MINUTES", "0")]).sync_interval;

        let mut ticks = tokio::time::interval(interval);
        ticks.tick().await;
        ticks.tick().await;
    }

    #[test]
    fn invalid_crawler_settings() {
        assert!(settings(&[("MEDAL_SOURCE_URL", "not a url")])
            .crawler_settings()
            .is_err());
        assert!(settings(&[("ACTIVE_UTC_OFFSET_HOURS", "30")])
            .crawler_settings()
            .is_err());
        assert!(settings(&[("ACTIVE_HOUR_END", "24")])
            .crawler_settings()
            .is_err());
    }
}
