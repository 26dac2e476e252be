//! Pipeline configuration.
//!
//! Every setting has a typed default and can be overridden from the
//! environment (a `.env` file is honoured by the binaries through `dotenv`).

use crate::error::EtlError;
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_COMPETITION: &str = "Premier League";
pub const DEFAULT_SEASON: &str = "2024-2025";

/// What to do when a numeric field is missing or cannot be coerced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldPolicy {
    /// Substitute zero and record a diagnostic
    #[default]
    Default,
    /// Drop the whole record and count it
    Drop,
    /// Abort normalization with a parse error
    Fail,
}

impl FieldPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldPolicy::Default => "default",
            FieldPolicy::Drop => "drop",
            FieldPolicy::Fail => "fail",
        }
    }
}

impl fmt::Display for FieldPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldPolicy {
    type Err = EtlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "default" | "zero" => Ok(FieldPolicy::Default),
            "drop" => Ok(FieldPolicy::Drop),
            "fail" => Ok(FieldPolicy::Fail),
            other => Err(EtlError::DomainViolation {
                domain: "field policy",
                value: other.to_string(),
            }),
        }
    }
}

/// Normalizer settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizeConfig {
    /// Substring a match row's `Comp` label must contain to be kept
    pub competition_filter: String,
    /// Policy for yellow/red card counts
    pub card_policy: FieldPolicy,
    /// Policy for goals for/against on match rows
    pub goal_policy: FieldPolicy,
}

impl Default for NormalizeConfig {
    fn default() -> Self {
        Self {
            competition_filter: DEFAULT_COMPETITION.to_string(),
            card_policy: FieldPolicy::Default,
            goal_policy: FieldPolicy::Default,
        }
    }
}

impl NormalizeConfig {
    /// Load configuration from environment variables with fallback to defaults.
    ///
    /// An unrecognised policy value is an error rather than a silent default.
    pub fn from_env() -> Result<Self, EtlError> {
        let defaults = Self::default();
        Ok(Self {
            competition_filter: env::var("COMPETITION_FILTER")
                .unwrap_or(defaults.competition_filter),
            card_policy: policy_from_env("POLICY_CARDS", defaults.card_policy)?,
            goal_policy: policy_from_env("POLICY_GOALS", defaults.goal_policy)?,
        })
    }
}

fn policy_from_env(key: &str, default: FieldPolicy) -> Result<FieldPolicy, EtlError> {
    match env::var(key) {
        Ok(value) => value.parse(),
        Err(_) => Ok(default),
    }
}

/// Literal values written once per load run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadConfig {
    pub competition_name: String,
    pub season_label: String,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            competition_name: DEFAULT_COMPETITION.to_string(),
            season_label: DEFAULT_SEASON.to_string(),
        }
    }
}

impl LoadConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            competition_name: env::var("COMPETITION_NAME").unwrap_or(defaults.competition_name),
            season_label: env::var("SEASON_LABEL").unwrap_or(defaults.season_label),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_configs() {
        let normalize = NormalizeConfig::default();
        assert_eq!(normalize.competition_filter, "Premier League");
        assert_eq!(normalize.card_policy, FieldPolicy::Default);
        assert_eq!(normalize.goal_policy, FieldPolicy::Default);

        let load = LoadConfig::default();
        assert_eq!(load.competition_name, "Premier League");
        assert_eq!(load.season_label, "2024-2025");
    }

    #[test]
    fn test_field_policy_parse() {
        assert_eq!("drop".parse::<FieldPolicy>().unwrap(), FieldPolicy::Drop);
        assert_eq!(" FAIL ".parse::<FieldPolicy>().unwrap(), FieldPolicy::Fail);
        assert_eq!("zero".parse::<FieldPolicy>().unwrap(), FieldPolicy::Default);
        assert!("ignore".parse::<FieldPolicy>().is_err());
    }
}
