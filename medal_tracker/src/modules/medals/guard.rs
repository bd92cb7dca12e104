use crate::{
    modules::{medals::store::MedalStore, store::StoreError},
    types::tables::MedalRecord,
};
use chrono::{DateTime, Utc};
use medal_tracker_libs::clock::Clock;
use serde::Serialize;
use std::{fmt, sync::Arc};

/// Existing tables at or below this size are replaced regardless of how much the new one shrank.
const SHRINKAGE_BASELINE: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Rejection {
    EmptyResult,
    SuspiciousShrinkage { incoming: usize, existing: usize },
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Rejection::EmptyResult => write!(f, "the scrape returned no records"),
            Rejection::SuspiciousShrinkage { incoming, existing } => write!(
                f,
                "the scrape returned {} records but {} exist",
                incoming, existing
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishOutcome {
    Published {
        count: usize,
        scraped_at: DateTime<Utc>,
    },
    Rejected(Rejection),
}

/// Decides whether `incoming` records may replace a table currently holding `existing` records.
pub fn check(incoming: usize, existing: usize) -> Result<(), Rejection> {
    if incoming == 0 {
        return Err(Rejection::EmptyResult);
    }
    // incoming < existing * 0.5
    if existing > SHRINKAGE_BASELINE && incoming * 2 < existing {
        return Err(Rejection::SuspiciousShrinkage { incoming, existing });
    }

    Ok(())
}

/// Integrity gate in front of the medal store.
///
/// A batch is either rejected, leaving the store untouched, or replaces the whole table
/// with every record stamped by the same `scraped_at`.
pub struct IngestionGuard {
    store: Arc<dyn MedalStore>,
    clock: Arc<dyn Clock>,
}

impl IngestionGuard {
    pub fn new(store: Arc<dyn MedalStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    pub async fn publish(&self, records: &[MedalRecord]) -> Result<PublishOutcome, StoreError> {
        if records.is_empty() {
            tracing::warn!("publish called with 0 records, skipping to protect existing data");
            return Ok(PublishOutcome::Rejected(Rejection::EmptyResult));
        }

        let scraped_at = self.clock.now();
        if let Err(rejection) = self.store.replace_all(records, scraped_at, check).await? {
            tracing::warn!("{}, skipping suspicious result", rejection);
            return Ok(PublishOutcome::Rejected(rejection));
        }

        Ok(PublishOutcome::Published {
            count: records.len(),
            scraped_at,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::modules::medals::store::{admit_all, MemoryMedalStore};
    use chrono::TimeZone;
    use medal_tracker_libs::clock::FixedClock;

    fn records(n: usize) -> Vec<MedalRecord> {
        (0..n)
            .map(|i| MedalRecord {
                country: format!("Country {}", i),
                country_code: format!("C{:02}", i),
                country_flag: None,
                gold: i as i32,
                silver: 0,
                bronze: 0,
                total: i as i32,
            })
            .collect()
    }

    fn guard(store: Arc<MemoryMedalStore>, at: DateTime<Utc>) -> IngestionGuard {
        IngestionGuard::new(store, Arc::new(FixedClock(at)))
    }

    fn at(minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 2, 12, 10, minute, 0).unwrap()
    }

    async fn seeded(n: usize) -> Arc<MemoryMedalStore> {
        let store = Arc::new(MemoryMedalStore::new());
        if n > 0 {
            store
                .replace_all(&records(n), at(0), admit_all)
                .await
                .unwrap()
                .unwrap();
        }
        store
    }

    #[test]
    fn check_boundaries() {
        assert_eq!(check(0, 0), Err(Rejection::EmptyResult));
        assert_eq!(check(0, 5), Err(Rejection::EmptyResult));
        assert_eq!(
            check(9, 20),
            Err(Rejection::SuspiciousShrinkage {
                incoming: 9,
                existing: 20
            })
        );
        assert_eq!(check(10, 20), Ok(()));
        assert_eq!(check(1, 10), Ok(()));
        assert_eq!(check(6, 11), Ok(()));
        assert_eq!(
            check(5, 11),
            Err(Rejection::SuspiciousShrinkage {
                incoming: 5,
                existing: 11
            })
        );
        assert_eq!(
            check(5, 12),
            Err(Rejection::SuspiciousShrinkage {
                incoming: 5,
                existing: 12
            })
        );
    }

    #[tokio::test]
    async fn empty_batch_is_rejected_and_store_unchanged() {
        for n in [1, 5, 11, 40] {
            let store = seeded(n).await;
            let before = store.list_medals().await.unwrap();

            let outcome = guard(store.clone(), at(30)).publish(&[]).await.unwrap();

            assert_eq!(outcome, PublishOutcome::Rejected(Rejection::EmptyResult));
            assert_eq!(store.list_medals().await.unwrap(), before);
        }
    }

    #[tokio::test]
    async fn shrinkage_against_twenty_records() {
        let store = seeded(20).await;
        let before = store.list_medals().await.unwrap();

        let outcome = guard(store.clone(), at(30))
            .publish(&records(9))
            .await
            .unwrap();
        assert_eq!(
            outcome,
            PublishOutcome::Rejected(Rejection::SuspiciousShrinkage {
                incoming: 9,
                existing: 20
            })
        );
        assert_eq!(store.list_medals().await.unwrap(), before);

        let outcome = guard(store.clone(), at(30))
            .publish(&records(10))
            .await
            .unwrap();
        assert_eq!(
            outcome,
            PublishOutcome::Published {
                count: 10,
                scraped_at: at(30)
            }
        );
        assert_eq!(store.list_medals().await.unwrap().len(), 10);
    }

    #[tokio::test]
    async fn small_baseline_always_accepts() {
        for existing in [0, 3, 10] {
            let store = seeded(existing).await;

            let outcome = guard(store.clone(), at(30))
                .publish(&records(1))
                .await
                .unwrap();

            assert!(matches!(outcome, PublishOutcome::Published { count: 1, .. }));
        }
    }

    #[tokio::test]
    async fn published_records_share_one_timestamp() {
        let store = seeded(12).await;

        guard(store.clone(), at(45))
            .publish(&records(8).split_off(2))
            .await
            .unwrap();

        let medals = store.list_medals().await.unwrap();
        assert_eq!(medals.len(), 6);
        assert!(medals.iter().all(|medal| medal.scraped_at == at(45)));
        assert!(medals.iter().all(|medal| medal.country_code != "C00"));
    }
}
