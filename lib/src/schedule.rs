use crate::{
    dates::{self, date_series},
    pipeline::{progress_bar, Pacer},
    source::{RawScheduleRow, ScheduleSource, Stage, StageReport, UnitOutcome},
    Result,
};
use chrono::NaiveDate;
use derive_deref::Deref;
use polars::prelude::*;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ScheduleEntry {
    pub game_date: NaiveDate,
    pub team_code: String,
}

/// Columns: game_date (Date), team_code (String), team_played (Int32)
#[derive(Clone, Deref)]
pub struct ScheduleDf(DataFrame);

impl ScheduleDf {
    /// Builds the union of every team's schedule, one row per (game_date, team_code).
    pub fn from_entries<'a, I>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = &'a ScheduleEntry>,
    {
        let (game_dates, team_codes): (Vec<NaiveDate>, Vec<&str>) = entries
            .into_iter()
            .map(|e| (e.game_date, e.team_code.as_str()))
            .unzip();

        let df = DataFrame::new(vec![
            date_series("game_date", &game_dates)?,
            Series::new("team_code", team_codes),
        ])?
        .lazy()
        .with_column(lit(1i32).alias("team_played"))
        .unique_stable(
            Some(vec!["game_date".into(), "team_code".into()]),
            UniqueKeepStrategy::First,
        )
        .collect()?;

        log::debug!("{} scheduled team dates", df.height());
        Ok(ScheduleDf(df))
    }
}

/// Tags a team's raw schedule with its code, dropping rows whose date can't be read.
pub fn normalize_schedule(
    team_code: &str,
    season: u16,
    rows: Vec<RawScheduleRow>,
) -> Vec<ScheduleEntry> {
    let total = rows.len();
    let entries: Vec<ScheduleEntry> = rows
        .into_iter()
        .filter_map(|row| dates::normalize_game_date(&row.date, season))
        .map(|game_date| ScheduleEntry {
            game_date,
            team_code: team_code.to_string(),
        })
        .collect();

    if entries.len() < total {
        log::debug!(
            "{}: dropped {} schedule rows with unreadable dates",
            team_code,
            total - entries.len()
        );
    }
    entries
}

pub fn collect_schedules(
    source: &dyn ScheduleSource,
    teams: &[String],
    season: u16,
    pacer: &Pacer,
) -> StageReport<ScheduleEntry> {
    let mut report = StageReport::new(Stage::Schedules);
    let bar = progress_bar(teams.len(), Stage::Schedules);
    for team_code in teams {
        bar.set_message(team_code.clone());
        let result = source
            .team_schedule(team_code, season)
            .map(|rows| normalize_schedule(team_code, season, rows));
        let outcome =
            bar.suspend(|| UnitOutcome::from_result(Stage::Schedules, team_code, season, result));
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

    fn entry(date: &str, team: &str) -> ScheduleEntry {
        ScheduleEntry {
            game_date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            team_code: team.to_string(),
        }
    }

    #[test]
    fn normalize_drops_unreadable_dates() {
        let rows = vec![
            RawScheduleRow {
                date: "Saturday, Apr 1".into(),
                team: "Atlanta Braves".into(),
            },
            RawScheduleRow {
                date: "Date".into(),
                team: "Tm".into(),
            },
            RawScheduleRow {
                date: "2023-04-02*".into(),
                team: "Atlanta Braves".into(),
            },
        ];
        let entries = normalize_schedule("ATL", 2023, rows);
        assert_eq!(entries, vec![entry("2023-04-01", "ATL"), entry("2023-04-02", "ATL")]);
    }

    #[test]
    fn union_removes_exact_duplicates() {
        let entries = vec![
            entry("2023-04-01", "AAA"),
            entry("2023-04-01", "AAA"),
            entry("2023-04-01", "BBB"),
            entry("2023-04-02", "AAA"),
        ];
        let once = ScheduleDf::from_entries(&entries).unwrap();
        assert_eq!(once.height(), 3);
        assert_eq!(
            once.get_column_names(),
            vec!["game_date", "team_code", "team_played"]
        );

        let doubled: Vec<ScheduleEntry> = entries.iter().chain(entries.iter()).cloned().collect();
        let twice = ScheduleDf::from_entries(&doubled).unwrap();
        assert!(twice.equals(&once));
    }
}
