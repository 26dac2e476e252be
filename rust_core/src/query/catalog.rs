//! Closed catalog of analytical query templates.
//!
//! Every template aliases the team relation as `t`, so the one filter slot
//! is always `WHERE t.name = ?1`. The slot sits before `GROUP BY`: a team
//! filter changes which base rows are aggregated, never the grouping.

use super::result::{ChartKind, ChartSpec};
use crate::error::{EtlError, EtlResult};
use serde::{Deserialize, Serialize};
use std::fmt;

const FILTER_SLOT: &str = "{filter}";
const TEAM_FILTER: &str = "WHERE t.name = ?1";
const SUGGESTION_THRESHOLD: f64 = 0.8;

/// SQLite storage class expected for an output column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Text,
    Integer,
    Real,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnSpec {
    pub name: &'static str,
    pub kind: ColumnKind,
}

const fn text(name: &'static str) -> ColumnSpec {
    ColumnSpec { name, kind: ColumnKind::Text }
}

const fn integer(name: &'static str) -> ColumnSpec {
    ColumnSpec { name, kind: ColumnKind::Integer }
}

const fn real(name: &'static str) -> ColumnSpec {
    ColumnSpec { name, kind: ColumnKind::Real }
}

/// Static definition of one catalog entry.
#[derive(Debug)]
struct TemplateSpec {
    name: &'static str,
    slug: &'static str,
    description: &'static str,
    body: &'static str,
    order_by: &'static str,
    limit: Option<u32>,
    columns: &'static [ColumnSpec],
    team_column: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryTemplate {
    TopScorers,
    MostDecisive,
    MostDisciplined,
    NationalityBreakdown,
    TotalGoalsPerTeam,
    AverageGoals,
    TeamStandings,
    BestDefenses,
    TopScorerPerTeam,
    MatchesPlayedPerTeam,
}

// ============================================================================
// Player templates
// ============================================================================

static TOP_SCORERS: TemplateSpec = TemplateSpec {
    name: "Top scorers",
    slug: "top-scorers",
    description: "Ten players with the most goals (goal totals are zero when the feed has none)",
    body: r#"
SELECT p.name AS player, p.position AS position, p.nationality AS nationality, t.name AS team,
       SUM(s.goals) AS total_goals
FROM player p
JOIN player_stat s ON s.player_id = p.id
JOIN team t ON t.id = p.team_id
{filter}
GROUP BY p.id"#,
    order_by: "total_goals DESC, player ASC",
    limit: Some(10),
    columns: &[
        text("player"),
        text("position"),
        text("nationality"),
        text("team"),
        integer("total_goals"),
    ],
    team_column: "team",
};

static MOST_DECISIVE: TemplateSpec = TemplateSpec {
    name: "Most decisive",
    slug: "most-decisive",
    description: "Ten players with the most goals plus assists (zero when the feed has none)",
    body: r#"
SELECT p.name AS player, p.position AS position, p.nationality AS nationality, t.name AS team,
       SUM(s.goals + s.assists) AS total_decisive
FROM player p
JOIN player_stat s ON s.player_id = p.id
JOIN team t ON t.id = p.team_id
{filter}
GROUP BY p.id"#,
    order_by: "total_decisive DESC, player ASC",
    limit: Some(10),
    columns: &[
        text("player"),
        text("position"),
        text("nationality"),
        text("team"),
        integer("total_decisive"),
    ],
    team_column: "team",
};

static MOST_DISCIPLINED: TemplateSpec = TemplateSpec {
    name: "Most disciplined",
    slug: "most-disciplined",
    description: "Ten players with the fewest yellow plus red cards",
    body: r#"
SELECT p.name AS player, p.position AS position, p.nationality AS nationality, t.name AS team,
       SUM(s.yellow_cards + s.red_cards) AS total_cards,
       SUM(s.yellow_cards) AS yellow_cards,
       SUM(s.red_cards) AS red_cards
FROM player p
JOIN player_stat s ON s.player_id = p.id
JOIN team t ON t.id = p.team_id
{filter}
GROUP BY p.id"#,
    order_by: "total_cards ASC, player ASC",
    limit: Some(10),
    columns: &[
        text("player"),
        text("position"),
        text("nationality"),
        text("team"),
        integer("total_cards"),
        integer("yellow_cards"),
        integer("red_cards"),
    ],
    team_column: "team",
};

static NATIONALITY_BREAKDOWN: TemplateSpec = TemplateSpec {
    name: "Nationality breakdown",
    slug: "nationality-breakdown",
    description: "Player count per nationality within each team",
    body: r#"
SELECT t.name AS team, p.nationality AS nationality, COUNT(*) AS players
FROM player p
JOIN team t ON t.id = p.team_id
{filter}
GROUP BY t.name, p.nationality"#,
    order_by: "team ASC, players DESC, nationality ASC",
    limit: None,
    columns: &[text("team"), text("nationality"), integer("players")],
    team_column: "team",
};

// ============================================================================
// Team templates
// ============================================================================

static TOTAL_GOALS_PER_TEAM: TemplateSpec = TemplateSpec {
    name: "Total goals per team",
    slug: "total-goals",
    description: "Goals scored by each team over the season",
    body: r#"
SELECT t.name AS team, SUM(r.goals_for) AS goals_for
FROM team t
JOIN match_result r ON r.team_id = t.id
{filter}
GROUP BY t.name"#,
    order_by: "goals_for DESC, team ASC",
    limit: None,
    columns: &[text("team"), integer("goals_for")],
    team_column: "team",
};

static AVERAGE_GOALS: TemplateSpec = TemplateSpec {
    name: "Avg goals for/against",
    slug: "average-goals",
    description: "Average goals scored and conceded per match",
    body: r#"
SELECT t.name AS team,
       ROUND(AVG(CAST(r.goals_for AS REAL)), 2) AS avg_goals_for,
       ROUND(AVG(CAST(r.goals_against AS REAL)), 2) AS avg_goals_against
FROM team t
JOIN match_result r ON r.team_id = t.id
{filter}
GROUP BY t.name"#,
    order_by: "avg_goals_for DESC, team ASC",
    limit: None,
    columns: &[text("team"), real("avg_goals_for"), real("avg_goals_against")],
    team_column: "team",
};

static TEAM_STANDINGS: TemplateSpec = TemplateSpec {
    name: "Team standings",
    slug: "standings",
    description: "League table: three points per win, one per draw",
    body: r#"
SELECT t.name AS team,
       SUM(CASE WHEN r.outcome = 'Win' THEN 1 ELSE 0 END) AS wins,
       SUM(CASE WHEN r.outcome = 'Draw' THEN 1 ELSE 0 END) AS draws,
       SUM(CASE WHEN r.outcome = 'Loss' THEN 1 ELSE 0 END) AS losses,
       SUM(CASE WHEN r.outcome = 'Win' THEN 3 WHEN r.outcome = 'Draw' THEN 1 ELSE 0 END) AS points,
       SUM(r.goals_for) - SUM(r.goals_against) AS goal_difference
FROM team t
JOIN match_result r ON r.team_id = t.id
{filter}
GROUP BY t.name"#,
    order_by: "points DESC, goal_difference DESC, team ASC",
    limit: None,
    columns: &[
        text("team"),
        integer("wins"),
        integer("draws"),
        integer("losses"),
        integer("points"),
        integer("goal_difference"),
    ],
    team_column: "team",
};

static BEST_DEFENSES: TemplateSpec = TemplateSpec {
    name: "Best defenses",
    slug: "best-defenses",
    description: "Goals conceded by each team, fewest first",
    body: r#"
SELECT t.name AS team, SUM(r.goals_against) AS goals_against
FROM team t
JOIN match_result r ON r.team_id = t.id
{filter}
GROUP BY t.name"#,
    order_by: "goals_against ASC, team ASC",
    limit: None,
    columns: &[text("team"), integer("goals_against")],
    team_column: "team",
};

static TOP_SCORER_PER_TEAM: TemplateSpec = TemplateSpec {
    name: "Top scorer per team",
    slug: "top-scorer-per-team",
    description: "Best goal total of each player, grouped by team",
    body: r#"
SELECT t.name AS team, p.name AS player, MAX(s.goals) AS max_goals
FROM team t
JOIN player p ON p.team_id = t.id
JOIN player_stat s ON s.player_id = p.id
{filter}
GROUP BY t.name, p.name"#,
    order_by: "team ASC, max_goals DESC, player ASC",
    limit: None,
    columns: &[text("team"), text("player"), integer("max_goals")],
    team_column: "team",
};

static MATCHES_PLAYED_PER_TEAM: TemplateSpec = TemplateSpec {
    name: "Matches played per team",
    slug: "matches-played",
    description: "Distinct fixtures each team took part in",
    body: r#"
SELECT t.name AS team, COUNT(DISTINCT r.match_id) AS matches_played
FROM team t
JOIN match_result r ON r.team_id = t.id
{filter}
GROUP BY t.name"#,
    order_by: "matches_played DESC, team ASC",
    limit: None,
    columns: &[text("team"), integer("matches_played")],
    team_column: "team",
};

impl QueryTemplate {
    pub const ALL: [QueryTemplate; 10] = [
        QueryTemplate::TopScorers,
        QueryTemplate::MostDecisive,
        QueryTemplate::MostDisciplined,
        QueryTemplate::NationalityBreakdown,
        QueryTemplate::TotalGoalsPerTeam,
        QueryTemplate::AverageGoals,
        QueryTemplate::TeamStandings,
        QueryTemplate::BestDefenses,
        QueryTemplate::TopScorerPerTeam,
        QueryTemplate::MatchesPlayedPerTeam,
    ];

    fn definition(&self) -> &'static TemplateSpec {
        match self {
            QueryTemplate::TopScorers => &TOP_SCORERS,
            QueryTemplate::MostDecisive => &MOST_DECISIVE,
            QueryTemplate::MostDisciplined => &MOST_DISCIPLINED,
            QueryTemplate::NationalityBreakdown => &NATIONALITY_BREAKDOWN,
            QueryTemplate::TotalGoalsPerTeam => &TOTAL_GOALS_PER_TEAM,
            QueryTemplate::AverageGoals => &AVERAGE_GOALS,
            QueryTemplate::TeamStandings => &TEAM_STANDINGS,
            QueryTemplate::BestDefenses => &BEST_DEFENSES,
            QueryTemplate::TopScorerPerTeam => &TOP_SCORER_PER_TEAM,
            QueryTemplate::MatchesPlayedPerTeam => &MATCHES_PLAYED_PER_TEAM,
        }
    }

    /// Stable display name.
    pub fn name(&self) -> &'static str {
        self.definition().name
    }

    /// Command-line friendly identifier.
    pub fn slug(&self) -> &'static str {
        self.definition().slug
    }

    pub fn description(&self) -> &'static str {
        self.definition().description
    }

    pub fn columns(&self) -> &'static [ColumnSpec] {
        self.definition().columns
    }

    /// Output column holding the team name of each row.
    pub fn team_column(&self) -> &'static str {
        self.definition().team_column
    }

    pub fn limit(&self) -> Option<u32> {
        self.definition().limit
    }

    /// Render the SQL text. The team value itself is never part of the
    /// text; when `filtered` is true the caller binds it as `?1`.
    pub fn render(&self, filtered: bool) -> String {
        let def = self.definition();
        let filter = if filtered { TEAM_FILTER } else { "" };
        let mut sql = def.body.replace(FILTER_SLOT, filter);
        sql.push_str("\nORDER BY ");
        sql.push_str(def.order_by);
        if let Some(limit) = def.limit {
            sql.push_str(&format!("\nLIMIT {}", limit));
        }
        sql
    }

    /// Resolve a display name or slug, case-insensitively.
    pub fn from_name(name: &str) -> EtlResult<Self> {
        let wanted = name.trim().to_lowercase();
        if let Some(template) = Self::ALL
            .into_iter()
            .find(|t| t.name().to_lowercase() == wanted || t.slug() == wanted)
        {
            return Ok(template);
        }

        // Score ties (Jaro-Winkler caps at 1.0) go to the closest length
        let suggestion = Self::ALL
            .into_iter()
            .map(|t| {
                let candidate = t.name().to_lowercase();
                let score = strsim::jaro_winkler(&wanted, &candidate);
                (t, score, candidate.len().abs_diff(wanted.len()))
            })
            .filter(|(_, score, _)| *score >= SUGGESTION_THRESHOLD)
            .max_by(|a, b| a.1.total_cmp(&b.1).then_with(|| b.2.cmp(&a.2)))
            .map(|(t, _, _)| t.name());

        Err(EtlError::UnknownTemplateName {
            name: name.to_string(),
            suggestion,
        })
    }

    /// Default chart for the presentation layer.
    pub fn chart(&self, team: Option<&str>) -> Option<ChartSpec> {
        let bar = |title: &str, x: &'static str, y: &'static str| {
            Some(ChartSpec::new(ChartKind::Bar, title, x, vec![y]))
        };

        match self {
            QueryTemplate::TopScorers => bar("Top Scorers", "player", "total_goals"),
            QueryTemplate::MostDecisive => bar("Most Decisive Players", "player", "total_decisive"),
            QueryTemplate::MostDisciplined => bar("Most Disciplined Players", "player", "total_cards"),
            QueryTemplate::NationalityBreakdown => team.map(|team| {
                ChartSpec::new(
                    ChartKind::Pie,
                    &format!("Nationalities in {}", team),
                    "nationality",
                    vec!["players"],
                )
            }),
            QueryTemplate::TotalGoalsPerTeam => bar("Total Goals by Team", "team", "goals_for"),
            QueryTemplate::AverageGoals => Some(ChartSpec::new(
                ChartKind::GroupedBar,
                "Average Goals",
                "team",
                vec!["avg_goals_for", "avg_goals_against"],
            )),
            QueryTemplate::TeamStandings => bar("Team Standings", "team", "points"),
            QueryTemplate::BestDefenses => bar("Defenses (Goals Conceded)", "team", "goals_against"),
            QueryTemplate::TopScorerPerTeam => bar("Best Scorers per Team", "team", "max_goals"),
            QueryTemplate::MatchesPlayedPerTeam => bar("Matches Played", "team", "matches_played"),
        }
    }
}

impl fmt::Display for QueryTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_has_ten_unique_entries() {
        let mut names: Vec<_> = QueryTemplate::ALL.iter().map(|t| t.name()).collect();
        let mut slugs: Vec<_> = QueryTemplate::ALL.iter().map(|t| t.slug()).collect();
        names.sort();
        names.dedup();
        slugs.sort();
        slugs.dedup();
        assert_eq!(names.len(), 10);
        assert_eq!(slugs.len(), 10);
    }

    #[test]
    fn test_every_body_has_one_filter_slot_before_grouping() {
        for template in QueryTemplate::ALL {
            let body = template.definition().body;
            assert_eq!(body.matches(FILTER_SLOT).count(), 1, "{}", template);
            let slot = body.find(FILTER_SLOT).unwrap();
            let group = body.find("GROUP BY").unwrap();
            assert!(slot < group, "{}", template);
        }
    }

    #[test]
    fn test_render_without_filter() {
        let sql = QueryTemplate::TotalGoalsPerTeam.render(false);
        assert!(!sql.contains("WHERE"));
        assert!(!sql.contains(FILTER_SLOT));
        assert!(sql.ends_with("ORDER BY goals_for DESC, team ASC"));
    }

    #[test]
    fn test_render_with_filter_binds_parameter() {
        let sql = QueryTemplate::TopScorers.render(true);
        assert!(sql.contains("WHERE t.name = ?1"));
        assert!(sql.ends_with("LIMIT 10"));
    }

    #[test]
    fn test_limits() {
        assert_eq!(QueryTemplate::TopScorers.limit(), Some(10));
        assert_eq!(QueryTemplate::MostDecisive.limit(), Some(10));
        assert_eq!(QueryTemplate::MostDisciplined.limit(), Some(10));
        assert_eq!(QueryTemplate::TeamStandings.limit(), None);
    }

    #[test]
    fn test_every_template_declares_its_team_column() {
        for template in QueryTemplate::ALL {
            assert!(template
                .columns()
                .iter()
                .any(|c| c.name == template.team_column()));
        }
    }

    #[test]
    fn test_from_name_accepts_name_and_slug() {
        assert_eq!(QueryTemplate::from_name("Team standings").unwrap(), QueryTemplate::TeamStandings);
        assert_eq!(QueryTemplate::from_name("TEAM STANDINGS").unwrap(), QueryTemplate::TeamStandings);
        assert_eq!(QueryTemplate::from_name("standings").unwrap(), QueryTemplate::TeamStandings);
    }

    #[test]
    fn test_from_name_unknown_suggests_closest() {
        match QueryTemplate::from_name("Top scorer") {
            Err(EtlError::UnknownTemplateName { name, suggestion }) => {
                assert_eq!(name, "Top scorer");
                assert_eq!(suggestion, Some("Top scorers"));
            }
            other => panic!("unexpected: {:?}", other),
        }

        match QueryTemplate::from_name("top scorer per tea") {
            Err(EtlError::UnknownTemplateName { suggestion, .. }) => {
                assert_eq!(suggestion, Some("Top scorer per team"))
            }
            other => panic!("unexpected: {:?}", other),
        }

        match QueryTemplate::from_name("zzz") {
            Err(EtlError::UnknownTemplateName { suggestion, .. }) => assert_eq!(suggestion, None),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_chart_mapping() {
        let chart = QueryTemplate::AverageGoals.chart(None).unwrap();
        assert_eq!(chart.kind, ChartKind::GroupedBar);
        assert_eq!(chart.y, vec!["avg_goals_for", "avg_goals_against"]);

        assert!(QueryTemplate::NationalityBreakdown.chart(None).is_none());
        let pie = QueryTemplate::NationalityBreakdown.chart(Some("Arsenal")).unwrap();
        assert_eq!(pie.kind, ChartKind::Pie);
        assert_eq!(pie.title, "Nationalities in Arsenal");

        let standings = QueryTemplate::TeamStandings.chart(None).unwrap();
        assert_eq!((standings.x, standings.y[0]), ("team", "points"));
    }

    #[test]
    fn test_chart_columns_exist() {
        for template in QueryTemplate::ALL {
            if let Some(chart) = template.chart(Some("Arsenal")) {
                let names: Vec<_> = template.columns().iter().map(|c| c.name).collect();
                assert!(names.contains(&chart.x), "{}", template);
                for y in &chart.y {
                    assert!(names.contains(y), "{}", template);
                }
            }
        }
    }
}
