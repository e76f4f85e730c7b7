//! Capabilities the pipeline needs from a statistics provider, and the per-unit
//! outcome types every fetching stage reports through.

use crate::Result;
use parse_display::Display;

/// One schedule line as the provider renders it. `date` is raw text.
#[derive(Debug, Clone, PartialEq)]
pub struct RawScheduleRow {
    pub date: String,
    pub team: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BattingSeasonTotal {
    pub player_name: String,
    pub plate_appearances: Option<i64>,
    pub team_code: String,
}

/// A possible identity for a display name.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct IdentityCandidate {
    pub key: Option<String>,
    pub played_first: Option<i32>,
    pub played_last: Option<i32>,
}

/// One game-level appearance as the provider renders it. `date` is raw text.
///
/// `game_id` tells the two games of a doubleheader apart when the provider has one.
#[derive(Debug, Clone, PartialEq)]
pub struct RawGameLogRow {
    pub game_id: Option<i64>,
    pub date: String,
    pub team: String,
    pub opponent: String,
    pub plate_appearances: Option<f64>,
}

pub trait ScheduleSource {
    fn team_schedule(&self, team_code: &str, season: u16) -> Result<Vec<RawScheduleRow>>;
}

pub trait BattingSource {
    fn team_batting(&self, season: u16, team_code: &str) -> Result<Vec<BattingSeasonTotal>>;
}

pub trait IdentitySource {
    fn lookup(&self, surname: &str, given: &str) -> Result<Vec<IdentityCandidate>>;
}

pub trait GameLogSource {
    fn game_logs(&self, player_id: &str, season: u16) -> Result<Vec<RawGameLogRow>>;
}

/// The four capabilities one pipeline run draws on.
#[derive(Clone, Copy)]
pub struct Sources<'a> {
    pub schedule: &'a dyn ScheduleSource,
    pub batting: &'a dyn BattingSource,
    pub identity: &'a dyn IdentitySource,
    pub logs: &'a dyn GameLogSource,
}

impl<'a> Sources<'a> {
    pub fn from_provider<P>(provider: &'a P) -> Self
    where
        P: ScheduleSource + BattingSource + IdentitySource + GameLogSource,
    {
        Sources {
            schedule: provider,
            batting: provider,
            identity: provider,
            logs: provider,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Display)]
pub enum Stage {
    #[display("schedules")]
    Schedules,
    #[display("team batting data")]
    Rosters,
    #[display("player logs")]
    GameLogs,
}

/// What happened to a single team or player request.
#[derive(Debug, Clone, PartialEq)]
pub enum UnitOutcome<T> {
    Fetched { unit: String, rows: Vec<T> },
    Failed { unit: String, reason: String },
}

impl<T> UnitOutcome<T> {
    /// Converts a fetch result, logging failures as warnings.
    pub fn from_result(stage: Stage, unit: &str, season: u16, result: Result<Vec<T>>) -> Self {
        match result {
            Ok(rows) => UnitOutcome::Fetched {
                unit: unit.to_string(),
                rows,
            },
            Err(e) => {
                log::warn!("{} failed for {} {}: {}", stage, unit, season, e);
                UnitOutcome::Failed {
                    unit: unit.to_string(),
                    reason: e.to_string(),
                }
            }
        }
    }

    pub fn unit(&self) -> &str {
        match self {
            UnitOutcome::Fetched { unit, .. } | UnitOutcome::Failed { unit, .. } => unit,
        }
    }
}

#[derive(Debug, Clone)]
pub struct StageReport<T> {
    pub stage: Stage,
    pub outcomes: Vec<UnitOutcome<T>>,
}

impl<T> StageReport<T> {
    pub fn new(stage: Stage) -> Self {
        Self {
            stage,
            outcomes: Vec::new(),
        }
    }

    pub fn push(&mut self, outcome: UnitOutcome<T>) {
        self.outcomes.push(outcome);
    }

    /// Rows from every unit that fetched successfully, in request order.
    pub fn rows(&self) -> impl Iterator<Item = &T> {
        self.outcomes.iter().flat_map(|o| match o {
            UnitOutcome::Fetched { rows, .. } => rows.as_slice(),
            UnitOutcome::Failed { .. } => &[][..],
        })
    }

    /// Units that returned at least one row.
    pub fn fetched_units(&self) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter_map(|o| match o {
                UnitOutcome::Fetched { unit, rows } if !rows.is_empty() => Some(unit.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn failures(&self) -> Vec<(&str, &str)> {
        self.outcomes
            .iter()
            .filter_map(|o| match o {
                UnitOutcome::Failed { unit, reason } => Some((unit.as_str(), reason.as_str())),
                UnitOutcome::Fetched { .. } => None,
            })
            .collect()
    }
}
