use crate::{
    modules::{medals::guard::Rejection, store::StoreError},
    types::tables::{MedalRecord, StoredMedal},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use medal_tracker_libs::FieldList;
use sqlx::{postgres::Postgres, Pool};
use std::sync::atomic::{AtomicI64, Ordering};
use tokio::sync::RwLock;

type Result<T> = std::result::Result<T, StoreError>;

/// Decides from the incoming and the stored record counts whether a replace may go ahead.
pub type Admission = fn(usize, usize) -> std::result::Result<(), Rejection>;

/// The shared medal table.
///
/// `replace_all` must swap the complete set in one step: readers observe either the
/// previous snapshot or the new one, never an empty or mixed table. The stored count
/// handed to `admit` is read under the same lock as the write, so concurrent replaces
/// never judge against a stale table.
#[async_trait]
pub trait MedalStore: Send + Sync {
    async fn ping(&self) -> Result<()>;
    async fn list_medals(&self) -> Result<Vec<StoredMedal>>;
    async fn replace_all(
        &self,
        records: &[MedalRecord],
        scraped_at: DateTime<Utc>,
        admit: Admission,
    ) -> Result<std::result::Result<(), Rejection>>;
}

#[cfg(test)]
pub fn admit_all(_incoming: usize, _existing: usize) -> std::result::Result<(), Rejection> {
    Ok(())
}

/// All current medal records ordered by gold, then silver, then bronze, all descending.
///
/// Ties keep the order the store returned them in.
pub async fn medal_table<S: MedalStore + ?Sized>(store: &S) -> Result<Vec<StoredMedal>> {
    let mut medals = store.list_medals().await?;
    sort_medal_table(&mut medals);
    Ok(medals)
}

pub fn sort_medal_table(medals: &mut [StoredMedal]) {
    medals.sort_by(|a, b| (b.gold, b.silver, b.bronze).cmp(&(a.gold, a.silver, a.bronze)));
}

pub struct PgMedalStore {
    pool: Pool<Postgres>,
}

impl PgMedalStore {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MedalStore for PgMedalStore {
    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn list_medals(&self) -> Result<Vec<StoredMedal>> {
        let medals = sqlx::query_as::<_, StoredMedal>(&format!(
            r#"SELECT {} FROM "medals" ORDER BY "id";"#,
            StoredMedal::field_list()
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(medals)
    }

    /// Counts, deletes every row and inserts the new batch within one transaction.
    ///
    /// The table lock serializes concurrent replaces across processes, count included,
    /// while leaving plain reads unblocked; readers keep seeing the old rows until the commit.
    async fn replace_all(
        &self,
        records: &[MedalRecord],
        scraped_at: DateTime<Utc>,
        admit: Admission,
    ) -> Result<std::result::Result<(), Rejection>> {
        tracing::info!("Start to replace medal table with {} records.", records.len());
        let mut tx = self.pool.begin().await.map_err(|e| {
            tracing::error!("failed to start transaction: {:?}", e);
            e
        })?;

        let result = async {
            sqlx::query(r#"LOCK TABLE "medals" IN SHARE ROW EXCLUSIVE MODE;"#)
                .execute(&mut tx)
                .await?;
            let existing: i64 = sqlx::query_scalar(r#"SELECT COUNT(*) FROM "medals";"#)
                .fetch_one(&mut tx)
                .await?;
            if let Err(rejection) = admit(records.len(), existing as usize) {
                return Ok::<_, sqlx::Error>(Err(rejection));
            }

            sqlx::query(r#"DELETE FROM "medals";"#)
                .execute(&mut tx)
                .await?;

            for record in records.iter() {
                sqlx::query(
                    r#"
                    INSERT INTO "medals" (
                        "country", "country_code", "country_flag", "gold", "silver", "bronze", "total", "scraped_at"
                    )
                    VALUES ($1, $2, $3, $4, $5, $6, $7, $8);
                    "#,
                )
                .bind(&record.country)
                .bind(&record.country_code)
                .bind(&record.country_flag)
                .bind(record.gold)
                .bind(record.silver)
                .bind(record.bronze)
                .bind(record.total)
                .bind(scraped_at)
                .execute(&mut tx)
                .await?;
            }

            Ok::<_, sqlx::Error>(Ok(()))
        }
        .await;

        // the old rows stay in place on rollback
        match result {
            Ok(Ok(())) => {
                tx.commit().await?;
                tracing::info!("{} medal records successfully saved.", records.len());
                Ok(Ok(()))
            }
            Ok(Err(rejection)) => {
                tx.rollback().await?;
                Ok(Err(rejection))
            }
            Err(e) => {
                tracing::error!("an error occurred while replacing medal table: {:?}", e);
                tx.rollback().await?;
                Err(StoreError::Database(e))
            }
        }
    }
}

/// In-process medal table.
pub struct MemoryMedalStore {
    medals: RwLock<Vec<StoredMedal>>,
    next_id: AtomicI64,
}

impl MemoryMedalStore {
    pub fn new() -> Self {
        Self {
            medals: RwLock::new(Vec::new()),
            next_id: AtomicI64::new(1),
        }
    }
}

impl Default for MemoryMedalStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MedalStore for MemoryMedalStore {
    async fn ping(&self) -> Result<()> {
        Ok(())
    }

    async fn list_medals(&self) -> Result<Vec<StoredMedal>> {
        Ok(self.medals.read().await.clone())
    }

    async fn replace_all(
        &self,
        records: &[MedalRecord],
        scraped_at: DateTime<Utc>,
        admit: Admission,
    ) -> Result<std::result::Result<(), Rejection>> {
        let mut medals = self.medals.write().await;
        if let Err(rejection) = admit(records.len(), medals.len()) {
            return Ok(Err(rejection));
        }

        *medals = records
            .iter()
            .map(|record| {
                let id = self.next_id.fetch_add(1, Ordering::Relaxed);
                StoredMedal::from_record(id, record, scraped_at)
            })
            .collect();
        Ok(Ok(()))
    }
}
