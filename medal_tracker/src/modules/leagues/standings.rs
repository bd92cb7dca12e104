use crate::types::tables::{StoredMedal, TeamWithCountries};
use chrono::{DateTime, Utc};
use medal_tracker_libs::scoring::{score_team, Country, MedalCount, TeamScore};
use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamStanding {
    pub rank: usize,
    pub team_id: i64,
    pub name: String,
    pub avatar: String,
    pub members: Vec<String>,
    #[serde(flatten)]
    pub score: TeamScore,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Standings {
    /// When the medal table the scores are based on was scraped.
    pub last_updated: Option<DateTime<Utc>>,
    pub teams: Vec<TeamStanding>,
}

/// Scores every team against the medal table, best team first.
///
/// Teams with equal points share a rank and keep their input order.
pub fn compute_standings(teams: &[TeamWithCountries], medals: &[StoredMedal]) -> Standings {
    let lookup: HashMap<String, MedalCount> = medals
        .iter()
        .map(|medal| (medal.country_code.clone(), medal.medals()))
        .collect();

    let mut scored: Vec<(&TeamWithCountries, TeamScore)> = teams
        .iter()
        .map(|team| {
            let countries: Vec<Country> = team
                .countries
                .iter()
                .map(|country| Country {
                    code: country.country_code.clone(),
                    name: country.country_name.clone(),
                    flag: country.country_flag.clone(),
                })
                .collect();
            (team, score_team(&countries, &lookup))
        })
        .collect();
    scored.sort_by(|(_, a), (_, b)| b.total_points.cmp(&a.total_points));

    let mut standings: Vec<TeamStanding> = Vec::with_capacity(scored.len());
    for (i, (team, score)) in scored.into_iter().enumerate() {
        let rank = match standings.last() {
            Some(prev) if prev.score.total_points == score.total_points => prev.rank,
            _ => i + 1,
        };
        standings.push(TeamStanding {
            rank,
            team_id: team.team.id,
            name: team.team.name.clone(),
            avatar: team.team.avatar.clone(),
            members: team.team.members.clone(),
            score,
        });
    }

    Standings {
        last_updated: medals.iter().map(|medal| medal.scraped_at).max(),
        teams: standings,
    }
}
