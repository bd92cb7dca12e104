use crate::{
    modules::{leagues::validation::TeamInput, store::StoreError},
    types::tables::{League, LeagueSummary, Team, TeamCountry, TeamWithCountries},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use itertools::Itertools;
use medal_tracker_libs::FieldList;
use sqlx::{postgres::Postgres, Pool, Transaction};
use std::collections::HashMap;
use tokio::sync::RwLock;

type Result<T> = std::result::Result<T, StoreError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLeague {
    pub name: String,
    pub slug: String,
    pub admin_id: String,
    pub created_at: DateTime<Utc>,
}

/// Leagues, their teams and the countries each team drafted.
#[async_trait]
pub trait LeagueStore: Send + Sync {
    async fn create_league(&self, league: &NewLeague) -> Result<League>;
    async fn get_league(&self, id: i64) -> Result<Option<League>>;
    async fn get_league_by_slug(&self, slug: &str) -> Result<Option<League>>;
    async fn list_leagues_by_admin(&self, admin_id: &str) -> Result<Vec<LeagueSummary>>;
    /// Deletes the league together with its teams and their drafted countries.
    async fn delete_league(&self, id: i64) -> Result<()>;
    async fn list_teams(&self, league_id: i64) -> Result<Vec<TeamWithCountries>>;
    async fn get_team(&self, id: i64) -> Result<Option<Team>>;
    async fn insert_team(&self, league_id: i64, team: &TeamInput) -> Result<TeamWithCountries>;
    /// Overwrites the team and replaces its drafted countries.
    async fn update_team(&self, id: i64, team: &TeamInput) -> Result<TeamWithCountries>;
    async fn delete_team(&self, id: i64) -> Result<()>;
}

pub struct PgLeagueStore {
    pool: Pool<Postgres>,
}

impl PgLeagueStore {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    async fn insert_countries(
        tx: &mut Transaction<'_, Postgres>,
        team_id: i64,
        team: &TeamInput,
    ) -> std::result::Result<Vec<TeamCountry>, sqlx::Error> {
        let mut countries = Vec::with_capacity(team.countries.len());
        for country in team.countries.iter() {
            let row = sqlx::query_as::<_, TeamCountry>(&format!(
                r#"
                INSERT INTO "team_countries" ("team_id", "country_code", "country_name", "country_flag")
                VALUES ($1, $2, $3, $4)
                RETURNING {};
                "#,
                TeamCountry::field_list()
            ))
            .bind(team_id)
            .bind(&country.country_code)
            .bind(&country.country_name)
            .bind(&country.country_flag)
            .fetch_one(&mut *tx)
            .await?;
            countries.push(row);
        }

        Ok(countries)
    }
}

#[async_trait]
impl LeagueStore for PgLeagueStore {
    async fn create_league(&self, league: &NewLeague) -> Result<League> {
        let league = sqlx::query_as::<_, League>(&format!(
            r#"
            INSERT INTO "leagues" ("name", "slug", "admin_id", "created_at")
            VALUES ($1, $2, $3, $4)
            RETURNING {};
            "#,
            League::field_list()
        ))
        .bind(&league.name)
        .bind(&league.slug)
        .bind(&league.admin_id)
        .bind(league.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| StoreError::on_insert(e, format!("slug {}", league.slug)))?;

        Ok(league)
    }

    async fn get_league(&self, id: i64) -> Result<Option<League>> {
        let league = sqlx::query_as::<_, League>(&format!(
            r#"SELECT {} FROM "leagues" WHERE "id" = $1;"#,
            League::field_list()
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(league)
    }

    async fn get_league_by_slug(&self, slug: &str) -> Result<Option<League>> {
        let league = sqlx::query_as::<_, League>(&format!(
            r#"SELECT {} FROM "leagues" WHERE "slug" = $1;"#,
            League::field_list()
        ))
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;

        Ok(league)
    }

    async fn list_leagues_by_admin(&self, admin_id: &str) -> Result<Vec<LeagueSummary>> {
        let leagues = sqlx::query_as::<_, League>(&format!(
            r#"SELECT {} FROM "leagues" WHERE "admin_id" = $1 ORDER BY "created_at";"#,
            League::field_list()
        ))
        .bind(admin_id)
        .fetch_all(&self.pool)
        .await?;

        let mut summaries = Vec::with_capacity(leagues.len());
        for league in leagues {
            let team_count: i64 =
                sqlx::query_scalar(r#"SELECT COUNT(*) FROM "teams" WHERE "league_id" = $1;"#)
                    .bind(league.id)
                    .fetch_one(&self.pool)
                    .await?;
            summaries.push(LeagueSummary { league, team_count });
        }

        Ok(summaries)
    }

    async fn delete_league(&self, id: i64) -> Result<()> {
        // teams and team_countries go with it through ON DELETE CASCADE
        let result = sqlx::query(r#"DELETE FROM "leagues" WHERE "id" = $1;"#)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("league {}", id)));
        }
        tracing::info!("league {} deleted", id);

        Ok(())
    }

    async fn list_teams(&self, league_id: i64) -> Result<Vec<TeamWithCountries>> {
        let teams = sqlx::query_as::<_, Team>(&format!(
            r#"SELECT {} FROM "teams" WHERE "league_id" = $1 ORDER BY "id";"#,
            Team::field_list()
        ))
        .bind(league_id)
        .fetch_all(&self.pool)
        .await?;

        let team_ids: Vec<i64> = teams.iter().map(|team| team.id).collect();
        let countries = sqlx::query_as::<_, TeamCountry>(&format!(
            r#"SELECT {} FROM "team_countries" WHERE "team_id" = ANY($1) ORDER BY "id";"#,
            TeamCountry::field_list()
        ))
        .bind(&team_ids)
        .fetch_all(&self.pool)
        .await?;

        let mut countries: HashMap<i64, Vec<TeamCountry>> = countries
            .into_iter()
            .into_group_map_by(|country| country.team_id);

        Ok(teams
            .into_iter()
            .map(|team| TeamWithCountries {
                countries: countries.remove(&team.id).unwrap_or_default(),
                team,
            })
            .collect())
    }

    async fn get_team(&self, id: i64) -> Result<Option<Team>> {
        let team = sqlx::query_as::<_, Team>(&format!(
            r#"SELECT {} FROM "teams" WHERE "id" = $1;"#,
            Team::field_list()
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(team)
    }

    async fn insert_team(&self, league_id: i64, team: &TeamInput) -> Result<TeamWithCountries> {
        let mut tx = self.pool.begin().await?;

        let result = async {
            let row = sqlx::query_as::<_, Team>(&format!(
                r#"
                INSERT INTO "teams" ("league_id", "name", "avatar", "members")
                VALUES ($1, $2, $3, $4)
                RETURNING {};
                "#,
                Team::field_list()
            ))
            .bind(league_id)
            .bind(team.name.trim())
            .bind(&team.avatar)
            .bind(&team.members)
            .fetch_one(&mut tx)
            .await?;
            let countries = Self::insert_countries(&mut tx, row.id, team).await?;

            Ok::<TeamWithCountries, sqlx::Error>(TeamWithCountries {
                team: row,
                countries,
            })
        }
        .await;

        match result {
            Ok(team) => {
                tx.commit().await?;
                Ok(team)
            }
            Err(e) => {
                tracing::error!("an error occurred while inserting team: {:?}", e);
                tx.rollback().await?;
                Err(StoreError::Database(e))
            }
        }
    }

    async fn update_team(&self, id: i64, team: &TeamInput) -> Result<TeamWithCountries> {
        let mut tx = self.pool.begin().await?;

        let result = async {
            let row = sqlx::query_as::<_, Team>(&format!(
                r#"
                UPDATE "teams" SET "name" = $2, "avatar" = $3, "members" = $4
                WHERE "id" = $1
                RETURNING {};
                "#,
                Team::field_list()
            ))
            .bind(id)
            .bind(team.name.trim())
            .bind(&team.avatar)
            .bind(&team.members)
            .fetch_optional(&mut tx)
            .await?;
            let Some(row) = row else {
                return Ok(None);
            };

            sqlx::query(r#"DELETE FROM "team_countries" WHERE "team_id" = $1;"#)
                .bind(id)
                .execute(&mut tx)
                .await?;
            let countries = Self::insert_countries(&mut tx, id, team).await?;

            Ok::<Option<TeamWithCountries>, sqlx::Error>(Some(TeamWithCountries {
                team: row,
                countries,
            }))
        }
        .await;

        match result {
            Ok(Some(team)) => {
                tx.commit().await?;
                Ok(team)
            }
            Ok(None) => {
                tx.rollback().await?;
                Err(StoreError::NotFound(format!("team {}", id)))
            }
            Err(e) => {
                tracing::error!("an error occurred while updating team {}: {:?}", id, e);
                tx.rollback().await?;
                Err(StoreError::Database(e))
            }
        }
    }

    async fn delete_team(&self, id: i64) -> Result<()> {
        let result = sqlx::query(r#"DELETE FROM "teams" WHERE "id" = $1;"#)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("team {}", id)));
        }

        Ok(())
    }
}

#[derive(Default)]
struct LeagueTables {
    leagues: Vec<League>,
    teams: Vec<Team>,
    countries: Vec<TeamCountry>,
    last_id: i64,
}

impl LeagueTables {
    fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }

    fn team_with_countries(&self, team: &Team) -> TeamWithCountries {
        TeamWithCountries {
            team: team.clone(),
            countries: self
                .countries
                .iter()
                .filter(|country| country.team_id == team.id)
                .cloned()
                .collect(),
        }
    }

    fn insert_countries(&mut self, team_id: i64, team: &TeamInput) {
        for country in team.countries.iter() {
            let id = self.next_id();
            self.countries.push(TeamCountry {
                id,
                team_id,
                country_code: country.country_code.clone(),
                country_name: country.country_name.clone(),
                country_flag: country.country_flag.clone(),
            });
        }
    }
}

/// In-process league store.
#[derive(Default)]
pub struct MemoryLeagueStore {
    tables: RwLock<LeagueTables>,
}

impl MemoryLeagueStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LeagueStore for MemoryLeagueStore {
    async fn create_league(&self, league: &NewLeague) -> Result<League> {
        let mut tables = self.tables.write().await;
        if tables.leagues.iter().any(|l| l.slug == league.slug) {
            return Err(StoreError::Conflict(format!("slug {}", league.slug)));
        }

        let league = League {
            id: tables.next_id(),
            name: league.name.clone(),
            slug: league.slug.clone(),
            admin_id: league.admin_id.clone(),
            created_at: league.created_at,
        };
        tables.leagues.push(league.clone());

        Ok(league)
    }

    async fn get_league(&self, id: i64) -> Result<Option<League>> {
        let tables = self.tables.read().await;
        Ok(tables.leagues.iter().find(|l| l.id == id).cloned())
    }

    async fn get_league_by_slug(&self, slug: &str) -> Result<Option<League>> {
        let tables = self.tables.read().await;
        Ok(tables.leagues.iter().find(|l| l.slug == slug).cloned())
    }

    async fn list_leagues_by_admin(&self, admin_id: &str) -> Result<Vec<LeagueSummary>> {
        let tables = self.tables.read().await;
        Ok(tables
            .leagues
            .iter()
            .filter(|league| league.admin_id == admin_id)
            .map(|league| LeagueSummary {
                league: league.clone(),
                team_count: tables
                    .teams
                    .iter()
                    .filter(|team| team.league_id == league.id)
                    .count() as i64,
            })
            .collect())
    }

    async fn delete_league(&self, id: i64) -> Result<()> {
        let mut tables = self.tables.write().await;
        if !tables.leagues.iter().any(|l| l.id == id) {
            return Err(StoreError::NotFound(format!("league {}", id)));
        }

        let team_ids: Vec<i64> = tables
            .teams
            .iter()
            .filter(|team| team.league_id == id)
            .map(|team| team.id)
            .collect();
        tables
            .countries
            .retain(|country| !team_ids.contains(&country.team_id));
        tables.teams.retain(|team| team.league_id != id);
        tables.leagues.retain(|league| league.id != id);

        Ok(())
    }

    async fn list_teams(&self, league_id: i64) -> Result<Vec<TeamWithCountries>> {
        let tables = self.tables.read().await;
        Ok(tables
            .teams
            .iter()
            .filter(|team| team.league_id == league_id)
            .map(|team| tables.team_with_countries(team))
            .collect())
    }

    async fn get_team(&self, id: i64) -> Result<Option<Team>> {
        let tables = self.tables.read().await;
        Ok(tables.teams.iter().find(|team| team.id == id).cloned())
    }

    async fn insert_team(&self, league_id: i64, team: &TeamInput) -> Result<TeamWithCountries> {
        let mut tables = self.tables.write().await;
        if !tables.leagues.iter().any(|l| l.id == league_id) {
            return Err(StoreError::NotFound(format!("league {}", league_id)));
        }

        let row = Team {
            id: tables.next_id(),
            league_id,
            name: team.name.trim().to_string(),
            avatar: team.avatar.clone(),
            members: team.members.clone(),
        };
        tables.teams.push(row.clone());
        tables.insert_countries(row.id, team);

        Ok(tables.team_with_countries(&row))
    }

    async fn update_team(&self, id: i64, team: &TeamInput) -> Result<TeamWithCountries> {
        let mut tables = self.tables.write().await;
        let Some(row) = tables.teams.iter_mut().find(|t| t.id == id) else {
            return Err(StoreError::NotFound(format!("team {}", id)));
        };
        row.name = team.name.trim().to_string();
        row.avatar = team.avatar.clone();
        row.members = team.members.clone();
        let row = row.clone();

        tables.countries.retain(|country| country.team_id != id);
        tables.insert_countries(id, team);

        Ok(tables.team_with_countries(&row))
    }

    async fn delete_team(&self, id: i64) -> Result<()> {
        let mut tables = self.tables.write().await;
        if !tables.teams.iter().any(|team| team.id == id) {
            return Err(StoreError::NotFound(format!("team {}", id)));
        }

        tables.countries.retain(|country| country.team_id != id);
        tables.teams.retain(|team| team.id != id);

        Ok(())
    }
}
