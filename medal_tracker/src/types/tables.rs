use chrono::{DateTime, Utc};
use medal_tracker_libs::{scoring::MedalCount, FieldList};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One country's medal counts as extracted from the source page.
///
/// `total` is taken from the page as-is; it is not recomputed from the three medal columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedalRecord {
    pub country: String,
    pub country_code: String,
    pub country_flag: Option<String>,
    pub gold: i32,
    pub silver: i32,
    pub bronze: i32,
    pub total: i32,
}

/// A medal record as held by the store, stamped with the batch it was published in.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, FieldList, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredMedal {
    pub id: i64,
    pub country: String,
    pub country_code: String,
    pub country_flag: Option<String>,
    pub gold: i32,
    pub silver: i32,
    pub bronze: i32,
    pub total: i32,
    pub scraped_at: DateTime<Utc>,
}

impl StoredMedal {
    pub fn from_record(id: i64, record: &MedalRecord, scraped_at: DateTime<Utc>) -> Self {
        Self {
            id,
            country: record.country.clone(),
            country_code: record.country_code.clone(),
            country_flag: record.country_flag.clone(),
            gold: record.gold,
            silver: record.silver,
            bronze: record.bronze,
            total: record.total,
            scraped_at,
        }
    }

    pub fn medals(&self) -> MedalCount {
        MedalCount::new(self.gold, self.silver, self.bronze)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, FromRow, FieldList, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct League {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub admin_id: String,
    pub created_at: DateTime<Utc>,
}

/// A league with the number of teams it holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeagueSummary {
    #[serde(flatten)]
    pub league: League,
    pub team_count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, FromRow, FieldList, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub id: i64,
    pub league_id: i64,
    pub name: String,
    pub avatar: String,
    pub members: Vec<String>,
}

/// A country drafted by one team.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, FieldList, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamCountry {
    pub id: i64,
    pub team_id: i64,
    pub country_code: String,
    pub country_name: String,
    pub country_flag: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TeamWithCountries {
    #[serde(flatten)]
    pub team: Team,
    pub countries: Vec<TeamCountry>,
}
