use crate::{
    dates::{self, date_series},
    Result,
};
use chrono::NaiveDate;
use derive_deref::Deref;
use polars::prelude::*;
use serde::Deserialize;
use std::io::Read;
use std::path::Path;

/// A row of the injury-list file: `player_id_bbref,date,on_IL`.
#[derive(Debug, Clone, Deserialize)]
struct RawInjuryRecord {
    player_id_bbref: String,
    date: String,
    #[serde(rename = "on_IL")]
    on_il: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InjuryRecord {
    pub player_id: String,
    pub game_date: NaiveDate,
    pub on_injury_list: bool,
}

/// Columns: player_id, game_date (Date), on_injury_list (Int32). One row per player and date.
#[derive(Clone, Deref)]
pub struct InjuryDf(DataFrame);

impl InjuryDf {
    /// Loads the injury file. Dates written without a year are taken as `season`.
    pub fn load<P: AsRef<Path>>(path: P, season: u16) -> Result<Self> {
        let file = std::fs::File::open(path.as_ref())?;
        let records = read_records(file, season)?;
        log::debug!(
            "{} injury records from {}",
            records.len(),
            path.as_ref().display()
        );
        Self::from_records(&records)
    }

    pub fn from_records(records: &[InjuryRecord]) -> Result<Self> {
        let player_ids: Vec<&str> = records.iter().map(|r| r.player_id.as_str()).collect();
        let game_dates: Vec<NaiveDate> = records.iter().map(|r| r.game_date).collect();
        let flags: Vec<i32> = records.iter().map(|r| r.on_injury_list as i32).collect();

        // A player listed twice on one date counts as on the list if either row says so
        let df = DataFrame::new(vec![
            Series::new("player_id", player_ids),
            date_series("game_date", &game_dates)?,
            Series::new("on_injury_list", flags),
        ])?
        .lazy()
        .group_by_stable([col("player_id"), col("game_date")])
        .agg([col("on_injury_list").max()])
        .collect()?;
        Ok(InjuryDf(df))
    }
}

/// Reads injury rows. Rows with unreadable dates are skipped; any other malformed
/// row is an error.
pub fn read_records<R: Read>(reader: R, season: u16) -> Result<Vec<InjuryRecord>> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut records = Vec::new();
    for row in rdr.deserialize::<RawInjuryRecord>() {
        let row = row?;
        let Some(game_date) = dates::normalize_game_date(&row.date, season) else {
            continue;
        };
        records.push(InjuryRecord {
            player_id: row.player_id_bbref,
            game_date,
            on_injury_list: row.on_il.unwrap_or(0.0) != 0.0,
        });
    }
    Ok(records)
}
