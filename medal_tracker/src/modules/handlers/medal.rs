use crate::{
    modules::medals::{
        crawler::{CycleOutcome, MedalCrawler, SkipReason},
        store::{medal_table, MedalStore},
    },
    types::tables::StoredMedal,
};
use axum::{
    extract::Extension,
    http::{HeaderMap, StatusCode},
    Json,
};
use chrono::{DateTime, Utc};
use medal_tracker_libs::{
    api::ApiResponse,
    scoring::{Tier, TierConfig},
};
use serde::Serialize;
use serde_with::skip_serializing_none;
use std::sync::Arc;

pub const SYNC_TOKEN_HEADER: &str = "x-sync-token";

/// Shared secret required by the sync endpoint, if any.
#[derive(Debug, Clone, Default)]
pub struct SyncToken(pub Option<String>);

#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncReport {
    pub status: &'static str,
    pub parsed: Option<usize>,
    pub published: Option<usize>,
    pub scraped_at: Option<DateTime<Utc>>,
    pub skip: Option<SkipReason>,
}

impl From<&CycleOutcome> for SyncReport {
    fn from(outcome: &CycleOutcome) -> Self {
        let mut report = SyncReport {
            status: outcome.status(),
            parsed: None,
            published: None,
            scraped_at: None,
            skip: None,
        };
        match outcome {
            CycleOutcome::Published {
                parsed,
                published,
                scraped_at,
            } => {
                report.parsed = Some(*parsed);
                report.published = Some(*published);
                report.scraped_at = Some(*scraped_at);
            }
            CycleOutcome::Skipped(reason) => report.skip = Some(reason.clone()),
            CycleOutcome::Failed(_) => {}
        }
        report
    }
}

type MedalResponse<T> = (StatusCode, Json<ApiResponse<T>>);

pub async fn list_medals(
    Extension(store): Extension<Arc<dyn MedalStore>>,
) -> MedalResponse<Vec<StoredMedal>> {
    match medal_table(store.as_ref()).await {
        Ok(medals) => (StatusCode::OK, Json(ApiResponse::ok(medals))),
        Err(e) => {
            tracing::error!("failed to load medal table: {:?}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::message("unexpected error")),
            )
        }
    }
}

/// The scoring multipliers of every tier.
pub async fn list_tiers() -> Json<ApiResponse<Vec<&'static TierConfig>>> {
    Json(ApiResponse::ok(
        Tier::ALL.iter().map(|tier| tier.config()).collect(),
    ))
}

/// Runs one ingestion cycle, subject to the active hours.
pub async fn sync_medals(
    headers: HeaderMap,
    Extension(SyncToken(token)): Extension<SyncToken>,
    Extension(crawler): Extension<Arc<MedalCrawler>>,
) -> MedalResponse<SyncReport> {
    if let Some(token) = token {
        let given = headers
            .get(SYNC_TOKEN_HEADER)
            .and_then(|value| value.to_str().ok());
        if given != Some(token.as_str()) {
            tracing::warn!("sync requested without a valid {} header", SYNC_TOKEN_HEADER);
            return (
                StatusCode::UNAUTHORIZED,
                Json(ApiResponse::message("invalid sync token")),
            );
        }
    }

    let outcome = crawler.run_cycle().await;
    let status = match &outcome {
        CycleOutcome::Skipped(SkipReason::AlreadyRunning) => StatusCode::CONFLICT,
        CycleOutcome::Failed(_) => StatusCode::BAD_GATEWAY,
        _ => StatusCode::OK,
    };

    (
        status,
        Json(ApiResponse::with_message(
            SyncReport::from(&outcome),
            outcome.message(),
        )),
    )
}
