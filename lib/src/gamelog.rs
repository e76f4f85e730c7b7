use crate::{
    dates::{self, date_series},
    pipeline::{progress_bar, Pacer},
    source::{GameLogSource, RawGameLogRow, Stage, StageReport, UnitOutcome},
    Result,
};
use chrono::NaiveDate;
use derive_deref::Deref;
use polars::prelude::*;

#[derive(Debug, Clone, PartialEq)]
pub struct GameLogEntry {
    pub player_id: String,
    pub game_id: Option<i64>,
    pub game_date: NaiveDate,
    pub team_code: String,
    pub opponent_code: String,
    pub plate_appearances: Option<f64>,
}

/// Columns: player_id, game_id (Int64, nullable), game_date (Date), team_code,
/// opponent_code, appeared (Int32), plate_appearances (Float64, nullable)
#[derive(Clone, Deref)]
pub struct GameLogDf(DataFrame);

impl GameLogDf {
    /// Concatenates every player's log, removing exact-row repeats.
    pub fn from_entries<'a, I>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = &'a GameLogEntry>,
    {
        let mut player_ids = Vec::new();
        let mut game_ids = Vec::new();
        let mut game_dates = Vec::new();
        let mut team_codes = Vec::new();
        let mut opponent_codes = Vec::new();
        let mut plate_appearances = Vec::new();
        for e in entries {
            player_ids.push(e.player_id.as_str());
            game_ids.push(e.game_id);
            game_dates.push(e.game_date);
            team_codes.push(e.team_code.as_str());
            opponent_codes.push(e.opponent_code.as_str());
            plate_appearances.push(e.plate_appearances);
        }

        let df = DataFrame::new(vec![
            Series::new("player_id", player_ids),
            Series::new("game_id", game_ids),
            date_series("game_date", &game_dates)?,
            Series::new("team_code", team_codes),
            Series::new("opponent_code", opponent_codes),
            Series::new("plate_appearances", plate_appearances),
        ])?
        .lazy()
        .with_column(lit(1i32).alias("appeared"))
        .unique_stable(None, UniqueKeepStrategy::First)
        .select([cols([
            "player_id",
            "game_id",
            "game_date",
            "team_code",
            "opponent_code",
            "appeared",
            "plate_appearances",
        ])])
        .collect()?;

        log::debug!("{} game log rows", df.height());
        Ok(GameLogDf(df))
    }
}

/// Attaches `player_id` to a player's raw log, dropping rows whose date can't be read.
pub fn normalize_game_logs(
    player_id: &str,
    season: u16,
    rows: Vec<RawGameLogRow>,
) -> Vec<GameLogEntry> {
    rows.into_iter()
        .filter_map(|row| {
            let game_date = dates::normalize_game_date(&row.date, season)?;
            Some(GameLogEntry {
                player_id: player_id.to_string(),
                game_id: row.game_id,
                game_date,
                team_code: row.team.trim().to_string(),
                opponent_code: row.opponent.trim().to_string(),
                plate_appearances: row.plate_appearances,
            })
        })
        .collect()
}

pub fn collect_game_logs(
    source: &dyn GameLogSource,
    player_ids: &[String],
    season: u16,
    pacer: &Pacer,
) -> StageReport<GameLogEntry> {
    let mut report = StageReport::new(Stage::GameLogs);
    let bar = progress_bar(player_ids.len(), Stage::GameLogs);
    for player_id in player_ids {
        bar.set_message(player_id.clone());
        let result = source
            .game_logs(player_id, season)
            .map(|rows| normalize_game_logs(player_id, season, rows));
        let outcome =
            bar.suspend(|| UnitOutcome::from_result(Stage::GameLogs, player_id, season, result));
        report.push(outcome);
        pacer.pause();
        bar.inc(1);
    }
    bar.finish_and_clear();
    report
}
