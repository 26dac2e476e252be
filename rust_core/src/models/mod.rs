// Shared models for the PitchStats pipeline
use crate::error::EtlError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Outcome domain
// ============================================================================

/// Closed result domain for a `match_result` row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    Win,
    Loss,
    Draw,
}

impl Outcome {
    pub const ALL: [Outcome; 3] = [Outcome::Win, Outcome::Loss, Outcome::Draw];

    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Win => "Win",
            Outcome::Loss => "Loss",
            Outcome::Draw => "Draw",
        }
    }

    /// Outcome seen from the other side of the same fixture.
    pub fn inverse(&self) -> Outcome {
        match self {
            Outcome::Win => Outcome::Loss,
            Outcome::Loss => Outcome::Win,
            Outcome::Draw => Outcome::Draw,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Outcome {
    type Err = EtlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Outcome::ALL
            .into_iter()
            .find(|o| o.as_str() == s)
            .ok_or_else(|| EtlError::DomainViolation {
                domain: "outcome",
                value: s.to_string(),
            })
    }
}

/// Single-letter result code as published by the feed (home perspective
/// of the row's `Team`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultCode {
    W,
    L,
    D,
}

impl ResultCode {
    /// Case-sensitive; anything else is fatal for the load.
    pub fn parse(code: &str) -> Result<Self, EtlError> {
        match code {
            "W" => Ok(ResultCode::W),
            "L" => Ok(ResultCode::L),
            "D" => Ok(ResultCode::D),
            other => Err(EtlError::UnknownResultCode(other.to_string())),
        }
    }

    /// Outcome for the team that owns the source row.
    pub fn outcome(&self) -> Outcome {
        match self {
            ResultCode::W => Outcome::Win,
            ResultCode::L => Outcome::Loss,
            ResultCode::D => Outcome::Draw,
        }
    }

    /// Outcome for the opponent.
    pub fn opponent_outcome(&self) -> Outcome {
        self.outcome().inverse()
    }
}

// ============================================================================
// Venue
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Venue {
    Home,
    Away,
    Neutral,
}

impl Venue {
    pub fn as_str(&self) -> &'static str {
        match self {
            Venue::Home => "Home",
            Venue::Away => "Away",
            Venue::Neutral => "Neutral",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "home" => Some(Venue::Home),
            "away" => Some(Venue::Away),
            "neutral" => Some(Venue::Neutral),
            _ => None,
        }
    }
}

// ============================================================================
// Normalized records (pre-insert shapes)
// ============================================================================

/// One player-season row after normalization, keyed by (name, team).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerRecord {
    pub name: String,
    pub nationality: Option<String>,
    pub position: Option<String>,
    /// Team label assigned by the scraper
    pub team: String,
    pub goals: u32,
    pub assists: u32,
    pub matches_played: u32,
    pub yellow_cards: u32,
    pub red_cards: u32,
}

/// One team-perspective fixture row after normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub date: NaiveDate,
    pub time: Option<String>,
    pub competition: String,
    pub round: Option<String>,
    pub venue: Venue,
    /// Raw result code, validated by the loader
    pub result: String,
    pub goals_for: u32,
    pub goals_against: u32,
    pub team: String,
    pub opponent: String,
}

// ============================================================================
// Stored entities
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Team {
    pub id: i64,
    pub name: String,
    pub competition_id: i64,
    pub season_id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Player {
    pub id: i64,
    pub name: String,
    pub position: Option<String>,
    pub nationality: Option<String>,
    pub team_id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct PlayerStat {
    pub id: i64,
    pub player_id: i64,
    pub goals: i64,
    pub assists: i64,
    pub matches_played: i64,
    pub yellow_cards: i64,
    pub red_cards: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Match {
    pub id: i64,
    pub match_date: NaiveDate,
    pub kickoff: Option<String>,
    pub round: Option<String>,
    pub venue: Option<String>,
    pub home_team_id: i64,
    pub away_team_id: i64,
    pub competition_id: i64,
    pub season_id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct MatchResult {
    pub id: i64,
    pub match_id: i64,
    pub team_id: i64,
    pub goals_for: i64,
    pub goals_against: i64,
    pub outcome: String,
}

impl MatchResult {
    pub fn outcome(&self) -> Result<Outcome, EtlError> {
        self.outcome.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_round_trips_through_text() {
        for outcome in Outcome::ALL {
            assert_eq!(outcome.as_str().parse::<Outcome>().unwrap(), outcome);
        }
    }

    #[test]
    fn test_outcome_rejects_foreign_literal() {
        let err = "Victoire".parse::<Outcome>().unwrap_err();
        assert!(matches!(err, EtlError::DomainViolation { domain: "outcome", .. }));
        assert!("win".parse::<Outcome>().is_err());
    }

    #[test]
    fn test_result_code_mapping() {
        assert_eq!(ResultCode::parse("W").unwrap().outcome(), Outcome::Win);
        assert_eq!(ResultCode::parse("L").unwrap().outcome(), Outcome::Loss);
        assert_eq!(ResultCode::parse("D").unwrap().outcome(), Outcome::Draw);

        assert_eq!(ResultCode::parse("W").unwrap().opponent_outcome(), Outcome::Loss);
        assert_eq!(ResultCode::parse("L").unwrap().opponent_outcome(), Outcome::Win);
        assert_eq!(ResultCode::parse("D").unwrap().opponent_outcome(), Outcome::Draw);
    }

    #[test]
    fn test_result_code_is_case_sensitive() {
        assert!(matches!(
            ResultCode::parse("w"),
            Err(EtlError::UnknownResultCode(code)) if code == "w"
        ));
        assert!(ResultCode::parse("P").is_err());
        assert!(ResultCode::parse("").is_err());
    }

    #[test]
    fn test_venue_parse() {
        assert_eq!(Venue::parse("Home"), Some(Venue::Home));
        assert_eq!(Venue::parse(" away "), Some(Venue::Away));
        assert_eq!(Venue::parse("Neutral"), Some(Venue::Neutral));
        assert_eq!(Venue::parse("Stadium"), None);
    }
}
