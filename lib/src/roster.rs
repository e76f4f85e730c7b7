use crate::{
    identity,
    pipeline::{progress_bar, Pacer},
    source::{BattingSeasonTotal, BattingSource, IdentitySource, Stage, StageReport, UnitOutcome},
    Result,
};
use derive_deref::Deref;
use itertools::Itertools;
use polars::prelude::*;

/// Columns: player_name, plate_appearances (Int64), team_code, and player_id once resolved
#[derive(Clone, Deref)]
pub struct RosterDf(DataFrame);

impl RosterDf {
    pub fn new(df: DataFrame) -> Self {
        RosterDf(df)
    }

    /// Keeps the `top_n` batters of every team that reported, by season plate appearances.
    pub fn from_report(report: &StageReport<BattingSeasonTotal>, top_n: usize) -> Result<Self> {
        let mut frames = Vec::new();
        for outcome in &report.outcomes {
            if let UnitOutcome::Fetched { unit, rows } = outcome {
                let top = top_batters(rows, unit, top_n)?;
                if top.height() > 0 {
                    frames.push(top.lazy());
                }
            }
        }

        if frames.is_empty() {
            return Ok(RosterDf(top_batters(&[], "", top_n)?));
        }

        let df = concat(frames, UnionArgs::default())?
            .unique_stable(
                Some(vec!["player_name".into(), "team_code".into()]),
                UniqueKeepStrategy::First,
            )
            .collect()?;
        log::debug!("{} roster rows selected", df.height());
        Ok(RosterDf(df))
    }

    pub fn filter(self, filter: Expr) -> Result<Self> {
        let df = self.0.lazy().filter(filter).collect()?;
        Ok(RosterDf(df))
    }

    /// Adds `player_id` from the identity source and drops players that didn't resolve.
    pub fn resolve_ids(self, source: &dyn IdentitySource) -> Result<Self> {
        let ids: Vec<String> = self
            .column("player_name")?
            .str()?
            .into_iter()
            .map(|name| name.map(|n| identity::resolve(source, n)).unwrap_or_default())
            .collect();

        let mut df = self.0;
        df.with_column(Series::new("player_id", ids))?;
        let resolved = RosterDf(df).filter(col("player_id").neq(lit("")))?;

        log::info!("   Resolved {} players.", resolved.player_ids()?.len());
        Ok(resolved)
    }

    /// Distinct resolved ids in roster order.
    pub fn player_ids(&self) -> Result<Vec<String>> {
        let ids = self
            .column("player_id")?
            .str()?
            .into_iter()
            .flatten()
            .filter(|id| !id.is_empty())
            .unique()
            .map(String::from)
            .collect();
        Ok(ids)
    }
}

/// Ranks one team's batters by plate appearances, dropping anyone without one.
pub fn top_batters(rows: &[BattingSeasonTotal], team_code: &str, top_n: usize) -> Result<DataFrame> {
    let names: Vec<&str> = rows.iter().map(|r| r.player_name.trim()).collect();
    let plate_appearances: Vec<Option<i64>> = rows.iter().map(|r| r.plate_appearances).collect();
    let team_codes: Vec<&str> = vec![team_code; rows.len()];

    let df = DataFrame::new(vec![
        Series::new("player_name", names),
        Series::new("plate_appearances", plate_appearances),
        Series::new("team_code", team_codes),
    ])?
    .lazy()
    .filter(col("plate_appearances").fill_null(lit(0i64)).gt(lit(0i64)))
    .sort(
        ["plate_appearances"],
        SortMultipleOptions::default().with_order_descending(true),
    )
    .limit(top_n as IdxSize)
    .collect()?;
    Ok(df)
}

pub fn collect_rosters(
    source: &dyn BattingSource,
    teams: &[String],
    season: u16,
    pacer: &Pacer,
) -> StageReport<BattingSeasonTotal> {
    let mut report = StageReport::new(Stage::Rosters);
    let bar = progress_bar(teams.len(), Stage::Rosters);
    for team_code in teams {
        bar.set_message(team_code.clone());
        let result = source.team_batting(season, team_code);
        let outcome =
            bar.suspend(|| UnitOutcome::from_result(Stage::Rosters, team_code, season, result));
        report.push(outcome);
        pacer.pause();
        bar.inc(1);
    }
    bar.finish_and_clear();
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::IdentityCandidate;

    fn batter(name: &str, pa: Option<i64>) -> BattingSeasonTotal {
        BattingSeasonTotal {
            player_name: name.to_string(),
            plate_appearances: pa,
            team_code: "XXX".to_string(),
        }
    }

    fn names(df: &DataFrame) -> Vec<String> {
        df.column("player_name")
            .unwrap()
            .str()
            .unwrap()
            .into_iter()
            .map(|n| n.unwrap().to_string())
            .collect()
    }

    #[test]
    fn top_batters_ranks_by_plate_appearances() {
        let rows = vec![
            batter("Bench Guy", Some(40)),
            batter(" Star Hitter ", Some(650)),
            batter("Pitcher Batting", Some(0)),
            batter("Unknown Count", None),
            batter("Regular One", Some(500)),
        ];
        let df = top_batters(&rows, "AAA", 2).unwrap();
        assert_eq!(names(&df), vec!["Star Hitter", "Regular One"]);

        let teams: Vec<&str> = df.column("team_code").unwrap().str().unwrap().into_iter().flatten().collect();
        assert_eq!(teams, vec!["AAA", "AAA"]);
    }

    #[test]
    fn report_concat_skips_failed_teams_and_dedupes() {
        let mut report = StageReport::new(Stage::Rosters);
        report.push(UnitOutcome::Fetched {
            unit: "AAA".to_string(),
            rows: vec![batter("Jane Doe", Some(300)), batter("Jane Doe", Some(300))],
        });
        report.push(UnitOutcome::Failed {
            unit: "BBB".to_string(),
            reason: "timeout".to_string(),
        });
        report.push(UnitOutcome::Fetched {
            unit: "CCC".to_string(),
            rows: vec![batter("Jane Doe", Some(120))],
        });

        let roster = RosterDf::from_report(&report, 12).unwrap();
        assert_eq!(roster.height(), 2);
        assert_eq!(names(&roster), vec!["Jane Doe", "Jane Doe"]);
    }

    #[test]
    fn report_with_no_batters_is_an_empty_roster() {
        let mut report = StageReport::new(Stage::Rosters);
        report.push(UnitOutcome::Fetched {
            unit: "AAA".to_string(),
            rows: vec![batter("Pitcher Batting", Some(0))],
        });
        let roster = RosterDf::from_report(&report, 12).unwrap();
        assert_eq!(roster.height(), 0);
    }

    struct OnlyDoe;

    impl IdentitySource for OnlyDoe {
        fn lookup(&self, surname: &str, given: &str) -> Result<Vec<IdentityCandidate>> {
            if surname == "Doe" && given == "Jane" {
                Ok(vec![IdentityCandidate {
                    key: Some("doej01".to_string()),
                    played_first: Some(2020),
                    played_last: Some(2023),
                }])
            } else {
                Ok(vec![])
            }
        }
    }

    #[test]
    fn unresolved_players_are_dropped() {
        let rows = vec![batter("Jane Doe", Some(300)), batter("John Roe", Some(280))];
        let roster = RosterDf::new(top_batters(&rows, "AAA", 12).unwrap())
            .resolve_ids(&OnlyDoe)
            .unwrap();
        assert_eq!(names(&roster), vec!["Jane Doe"]);
        assert_eq!(roster.player_ids().unwrap(), vec!["doej01"]);
    }
}
