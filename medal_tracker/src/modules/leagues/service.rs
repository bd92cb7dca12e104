use crate::{
    modules::{
        leagues::{
            slug::{disambiguate, generate_slug},
            store::{LeagueStore, NewLeague},
            validation::{describe, LeagueInput, TeamInput},
        },
        store::StoreError,
    },
    types::tables::{League, LeagueSummary, TeamWithCountries},
};
use medal_tracker_libs::clock::Clock;
use std::sync::Arc;
use thiserror::Error;
use validator::Validate;

#[derive(Debug, Error)]
pub enum LeagueError {
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("Not authorized - you are not the admin of this league")]
    NotAuthorized,
    #[error("Validation error: {0}")]
    Validation(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

type Result<T> = std::result::Result<T, LeagueError>;

/// League and team operations on behalf of an authenticated caller.
pub struct LeagueService {
    store: Arc<dyn LeagueStore>,
    clock: Arc<dyn Clock>,
}

impl LeagueService {
    pub fn new(store: Arc<dyn LeagueStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    pub async fn create_league(&self, caller: &str, input: &LeagueInput) -> Result<League> {
        input
            .validate()
            .map_err(|e| LeagueError::Validation(describe(&e)))?;

        let now = self.clock.now();
        let mut slug = generate_slug(&input.name);
        if self.store.get_league_by_slug(&slug).await?.is_some() {
            slug = disambiguate(&slug, now);
        }

        let league = self
            .store
            .create_league(&NewLeague {
                name: input.name.trim().to_string(),
                slug,
                admin_id: caller.to_string(),
                created_at: now,
            })
            .await?;
        tracing::info!("league {} created by {}", league.slug, caller);

        Ok(league)
    }

    pub async fn league_by_slug(&self, slug: &str) -> Result<League> {
        self.store
            .get_league_by_slug(slug)
            .await?
            .ok_or(LeagueError::NotFound("League"))
    }

    pub async fn leagues_of(&self, caller: &str) -> Result<Vec<LeagueSummary>> {
        Ok(self.store.list_leagues_by_admin(caller).await?)
    }

    pub async fn teams(&self, slug: &str) -> Result<Vec<TeamWithCountries>> {
        let league = self.league_by_slug(slug).await?;
        Ok(self.store.list_teams(league.id).await?)
    }

    pub async fn delete_league(&self, caller: &str, slug: &str) -> Result<()> {
        let league = self.league_by_slug(slug).await?;
        let league = self.require_league_admin(caller, league.id).await?;

        self.store.delete_league(league.id).await?;
        tracing::info!("league {} deleted by {}", league.slug, caller);

        Ok(())
    }

    pub async fn add_team(
        &self,
        caller: &str,
        slug: &str,
        input: &TeamInput,
    ) -> Result<TeamWithCountries> {
        let league = self.league_by_slug(slug).await?;
        self.require_league_admin(caller, league.id).await?;
        input
            .validate()
            .map_err(|e| LeagueError::Validation(describe(&e)))?;

        Ok(self.store.insert_team(league.id, input).await?)
    }

    pub async fn update_team(
        &self,
        caller: &str,
        team_id: i64,
        input: &TeamInput,
    ) -> Result<TeamWithCountries> {
        let team = self
            .store
            .get_team(team_id)
            .await?
            .ok_or(LeagueError::NotFound("Team"))?;
        self.require_league_admin(caller, team.league_id).await?;
        input
            .validate()
            .map_err(|e| LeagueError::Validation(describe(&e)))?;

        Ok(self.store.update_team(team_id, input).await?)
    }

    pub async fn delete_team(&self, caller: &str, team_id: i64) -> Result<()> {
        let team = self
            .store
            .get_team(team_id)
            .await?
            .ok_or(LeagueError::NotFound("Team"))?;
        self.require_league_admin(caller, team.league_id).await?;

        Ok(self.store.delete_team(team_id).await?)
    }

    /// Loads the league and checks that `caller` administers it.
    pub async fn require_league_admin(&self, caller: &str, league_id: i64) -> Result<League> {
        let league = self
            .store
            .get_league(league_id)
            .await?
            .ok_or(LeagueError::NotFound("League"))?;

        if league.admin_id != caller {
            tracing::warn!(
                "{} attempted to modify league {} without being its admin",
                caller,
                league.slug
            );
            return Err(LeagueError::NotAuthorized);
        }

        Ok(league)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::modules::leagues::{store::MemoryLeagueStore, validation::DraftedCountryInput};
    use chrono::{TimeZone, Utc};
    use medal_tracker_libs::clock::FixedClock;

    fn service() -> LeagueService {
        LeagueService::new(
            Arc::new(MemoryLeagueStore::new()),
            Arc::new(FixedClock(
                Utc.with_ymd_and_hms(2026, 2, 6, 19, 0, 0).unwrap(),
            )),
        )
    }

    fn league(name: &str) -> LeagueInput {
        LeagueInput {
            name: String::from(name),
        }
    }

    fn team(name: &str) -> TeamInput {
        TeamInput {
            name: String::from(name),
            avatar: String::new(),
            members: vec![],
            countries: vec![DraftedCountryInput {
                country_code: String::from("NOR"),
                country_name: String::from("Norway"),
                country_flag: String::from("\u{1f1f3}\u{1f1f4}"),
            }],
        }
    }

    #[tokio::test]
    async fn create_league_generates_unique_slugs() {
        let service = service();

        let first = service.create_league("u1", &league(" Ski Club ")).await.unwrap();
        let second = service.create_league("u2", &league("Ski club")).await.unwrap();
        let reserved = service.create_league("u1", &league("Login")).await.unwrap();

        assert_eq!(first.name, "Ski Club");
        assert_eq!(first.slug, "ski-club");
        assert_eq!(first.admin_id, "u1");
        assert!(second.slug.starts_with("ski-club-"));
        assert_ne!(second.slug, first.slug);
        assert_eq!(reserved.slug, "login-league");
    }

    #[tokio::test]
    async fn create_league_validates_the_name() {
        let service = service();

        let result = service.create_league("u1", &league("   ")).await;

        assert!(matches!(result, Err(LeagueError::Validation(_))));
        assert!(service.leagues_of("u1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn only_the_admin_can_change_teams() {
        let service = service();
        let league = service.create_league("u1", &league("Ski Club")).await.unwrap();

        assert!(matches!(
            service.add_team("u2", &league.slug, &team("A")).await,
            Err(LeagueError::NotAuthorized)
        ));

        let added = service.add_team("u1", &league.slug, &team("A")).await.unwrap();
        assert!(matches!(
            service.update_team("u2", added.team.id, &team("B")).await,
            Err(LeagueError::NotAuthorized)
        ));
        assert!(matches!(
            service.delete_team("u2", added.team.id).await,
            Err(LeagueError::NotAuthorized)
        ));
        assert!(matches!(
            service.delete_league("u2", &league.slug).await,
            Err(LeagueError::NotAuthorized)
        ));

        let teams = service.teams(&league.slug).await.unwrap();
        assert_eq!(teams, vec![added]);
    }

    #[tokio::test]
    async fn admin_manages_teams() {
        let service = service();
        let league = service.create_league("u1", &league("Ski Club")).await.unwrap();
        let added = service.add_team("u1", &league.slug, &team("A")).await.unwrap();

        let updated = service
            .update_team("u1", added.team.id, &team("B"))
            .await
            .unwrap();
        assert_eq!(updated.team.name, "B");

        service.delete_team("u1", added.team.id).await.unwrap();
        assert!(service.teams(&league.slug).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn invalid_team_is_rejected() {
        let service = service();
        let league = service.create_league("u1", &league("Ski Club")).await.unwrap();
        let mut input = team("A");
        input.countries[0].country_code = String::from("XYZ");

        assert!(matches!(
            service.add_team("u1", &league.slug, &input).await,
            Err(LeagueError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn delete_league_cascades_to_teams() {
        let service = service();
        let league = service.create_league("u1", &league("Ski Club")).await.unwrap();
        let added = service.add_team("u1", &league.slug, &team("A")).await.unwrap();

        service.delete_league("u1", &league.slug).await.unwrap();

        assert!(matches!(
            service.league_by_slug(&league.slug).await,
            Err(LeagueError::NotFound("League"))
        ));
        assert!(matches!(
            service.delete_team("u1", added.team.id).await,
            Err(LeagueError::NotFound("Team"))
        ));
    }

    #[tokio::test]
    async fn unknown_team_is_not_found() {
        let service = service();

        assert!(matches!(
            service.update_team("u1", 99, &team("A")).await,
            Err(LeagueError::NotFound("Team"))
        ));
    }
}
