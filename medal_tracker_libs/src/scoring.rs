//! Tiered fantasy scoring.
//!
//! Each drafted country scores `gold * G + silver * S + bronze * B`, where the multipliers
//! come from the tier of the country. Weaker nations sit in higher tiers and earn more per medal.

use once_cell::sync::Lazy;
use serde::{Serialize, Serializer};
use std::collections::{HashMap, HashSet};
use std::ops::AddAssign;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Tier {
    One,
    Two,
    Three,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TierConfig {
    pub level: u8,
    pub name: &'static str,
    pub gold: i64,
    pub silver: i64,
    pub bronze: i64,
    pub description: &'static str,
}

const TIER_ONE: TierConfig = TierConfig {
    level: 1,
    name: "Tier 1",
    gold: 3,
    silver: 2,
    bronze: 1,
    description: "Top winter sports nations",
};
const TIER_TWO: TierConfig = TierConfig {
    level: 2,
    name: "Tier 2",
    gold: 30,
    silver: 20,
    bronze: 10,
    description: "Strong contenders",
};
const TIER_THREE: TierConfig = TierConfig {
    level: 3,
    name: "Tier 3",
    gold: 300,
    silver: 200,
    bronze: 100,
    description: "Underdog nations",
};

static TIER_ONE_CODES: Lazy<HashSet<&str>> = Lazy::new(|| {
    HashSet::from([
        "AUT", "CAN", "CHN", "FRA", "GER", "AIN", "ITA", "NED", "NOR", "KOR", "SWE", "SUI", "USA",
    ])
});
static TIER_TWO_CODES: Lazy<HashSet<&str>> = Lazy::new(|| {
    HashSet::from([
        "AUS", "BEL", "BUL", "CRO", "CZE", "EST", "FIN", "GBR", "HUN", "JPN", "KAZ", "LAT", "LIE",
        "NZL", "POL", "SVK", "SLO", "ESP", "UKR",
    ])
});

impl Tier {
    pub const ALL: [Tier; 3] = [Tier::One, Tier::Two, Tier::Three];

    /// Tier of a country code. Unlisted codes fall into tier 3.
    pub fn of(code: &str) -> Tier {
        if TIER_ONE_CODES.contains(code) {
            Tier::One
        } else if TIER_TWO_CODES.contains(code) {
            Tier::Two
        } else {
            Tier::Three
        }
    }

    pub fn config(&self) -> &'static TierConfig {
        match self {
            Tier::One => &TIER_ONE,
            Tier::Two => &TIER_TWO,
            Tier::Three => &TIER_THREE,
        }
    }

    pub fn level(&self) -> u8 {
        self.config().level
    }

    pub fn points(&self, medals: &MedalCount) -> i64 {
        let config = self.config();
        medals.gold as i64 * config.gold
            + medals.silver as i64 * config.silver
            + medals.bronze as i64 * config.bronze
    }
}

impl Serialize for Tier {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.level())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MedalCount {
    pub gold: i32,
    pub silver: i32,
    pub bronze: i32,
}

impl MedalCount {
    pub fn new(gold: i32, silver: i32, bronze: i32) -> Self {
        Self {
            gold,
            silver,
            bronze,
        }
    }

    pub fn total(&self) -> i32 {
        self.gold + self.silver + self.bronze
    }
}

impl AddAssign for MedalCount {
    fn add_assign(&mut self, rhs: Self) {
        self.gold += rhs.gold;
        self.silver += rhs.silver;
        self.bronze += rhs.bronze;
    }
}

/// A drafted country as it enters the scoring.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Country {
    pub code: String,
    pub name: String,
    pub flag: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CountryScore {
    pub country: Country,
    pub tier: Tier,
    pub medals: MedalCount,
    pub points: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TierBreakdown {
    pub tier: Tier,
    pub countries: Vec<CountryScore>,
    pub total_medals: MedalCount,
    pub total_points: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamScore {
    pub medals: MedalCount,
    pub total_medals: i32,
    pub tier_breakdown: Vec<TierBreakdown>,
    pub total_points: i64,
}

pub fn country_points(code: &str, medals: &MedalCount) -> i64 {
    Tier::of(code).points(medals)
}

/// Scores a team's drafted countries against the medal lookup (country code to medals).
///
/// Countries missing from the lookup count as zero medals. Tiers without any drafted
/// country are left out of the breakdown, which is ordered tier 1 to tier 3.
pub fn score_team<'a>(
    countries: impl IntoIterator<Item = &'a Country>,
    lookup: &HashMap<String, MedalCount>,
) -> TeamScore {
    let mut by_tier: HashMap<Tier, Vec<CountryScore>> = HashMap::new();
    for country in countries {
        let tier = Tier::of(&country.code);
        let medals = lookup.get(&country.code).copied().unwrap_or_default();
        by_tier.entry(tier).or_default().push(CountryScore {
            country: country.clone(),
            tier,
            medals,
            points: tier.points(&medals),
        });
    }

    let mut medals = MedalCount::default();
    let mut tier_breakdown = Vec::with_capacity(by_tier.len());
    for tier in Tier::ALL {
        let Some(scores) = by_tier.remove(&tier) else {
            continue;
        };

        let mut total_medals = MedalCount::default();
        for score in scores.iter() {
            total_medals += score.medals;
        }
        medals += total_medals;

        tier_breakdown.push(TierBreakdown {
            tier,
            total_points: scores.iter().map(|score| score.points).sum(),
            countries: scores,
            total_medals,
        });
    }

    TeamScore {
        medals,
        total_medals: medals.total(),
        total_points: tier_breakdown.iter().map(|tier| tier.total_points).sum(),
        tier_breakdown,
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn country(code: &str) -> Country {
        Country {
            code: String::from(code),
            name: String::from(code),
            flag: String::new(),
        }
    }

    #[test]
    fn tier_lookup() {
        assert_eq!(Tier::of("NOR"), Tier::One);
        assert_eq!(Tier::of("JPN"), Tier::Two);
        assert_eq!(Tier::of("BRA"), Tier::Three);
        assert_eq!(Tier::of("???"), Tier::Three);
    }

    #[test]
    fn points_use_tier_multipliers() {
        let medals = MedalCount::new(2, 1, 3);
        assert_eq!(country_points("NOR", &medals), 2 * 3 + 2 + 3);
        assert_eq!(country_points("JPN", &medals), 2 * 30 + 20 + 3 * 10);
        assert_eq!(country_points("BRA", &medals), 2 * 300 + 200 + 3 * 100);
    }

    #[test]
    fn score_team_groups_by_tier() {
        let lookup = HashMap::from([
            (String::from("NOR"), MedalCount::new(10, 5, 2)),
            (String::from("JPN"), MedalCount::new(1, 0, 1)),
        ]);
        let countries = vec![country("JPN"), country("NOR"), country("BRA")];

        let score = score_team(&countries, &lookup);

        assert_eq!(
            score
                .tier_breakdown
                .iter()
                .map(|tier| tier.tier)
                .collect::<Vec<_>>(),
            vec![Tier::One, Tier::Two, Tier::Three]
        );
        assert_eq!(score.tier_breakdown[0].total_points, 30 + 10 + 2);
        assert_eq!(score.tier_breakdown[1].total_points, 30 + 10);
        assert_eq!(score.tier_breakdown[2].total_points, 0);
        assert_eq!(score.total_points, 42 + 40);
        assert_eq!(score.medals, MedalCount::new(11, 5, 3));
        assert_eq!(score.total_medals, 19);
    }

    #[test]
    fn empty_tiers_are_omitted() {
        let countries = vec![country("BRA")];
        let score = score_team(&countries, &HashMap::new());

        assert_eq!(score.tier_breakdown.len(), 1);
        assert_eq!(score.tier_breakdown[0].tier, Tier::Three);
        assert_eq!(score.total_points, 0);
    }

    #[test]
    fn tier_serializes_as_level() {
        assert_eq!(serde_json::to_string(&Tier::Two).unwrap(), "2");
    }
}
