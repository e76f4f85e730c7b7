use crate::{panel::RestPanelDf, OutputFormat, Result};
use polars::prelude::*;
use std::path::Path;

/// Writes the panel, creating the parent directory if needed.
pub fn write_panel<P: AsRef<Path>>(panel: &RestPanelDf, path: P, format: OutputFormat) -> Result<()> {
    let path = path.as_ref();
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }

    let mut df = (**panel).clone();
    let mut file = std::fs::File::create(path)?;
    match format {
        OutputFormat::Csv => {
            CsvWriter::new(&mut file)
                .include_header(true)
                .with_separator(b',')
                .finish(&mut df)?;
        }
        OutputFormat::Parquet => {
            ParquetWriter::new(&mut file).finish(&mut df)?;
        }
    }
    log::debug!("wrote {} rows to {}", df.height(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dates::date_series;
    use chrono::NaiveDate;

    fn sample_panel() -> RestPanelDf {
        let dates = [
            NaiveDate::from_ymd_opt(2023, 4, 1).unwrap(),
            NaiveDate::from_ymd_opt(2023, 4, 2).unwrap(),
        ];
        let df = DataFrame::new(vec![
            Series::new("player_id", ["doej01", "doej01"]),
            Series::new("team_code", ["AAA", "AAA"]),
            date_series("game_date", &dates).unwrap(),
            Series::new("team_played", [1i32, 1]),
            Series::new("appeared", [1i32, 0]),
            Series::new("rest_flag", [0i32, 1]),
            Series::new("on_injury_list", [0i32, 0]),
            Series::new("days_since_last_game", [None, Some(1i64)]),
            Series::new("prev_day_was_rest", [0i32, 0]),
            Series::new("plate_appearances", [4.0f64, 0.0]),
        ])
        .unwrap();
        RestPanelDf::new(df)
    }

    #[test]
    fn csv_has_header_and_iso_dates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("mlb_2023_rest_days.csv");
        write_panel(&sample_panel(), &path, OutputFormat::Csv).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[0],
            "player_id,team_code,game_date,team_played,appeared,rest_flag,on_injury_list,days_since_last_game,prev_day_was_rest,plate_appearances"
        );
        assert!(lines[1].starts_with("doej01,AAA,2023-04-01,1,1,0,0,,0,"));
        assert!(lines[2].starts_with("doej01,AAA,2023-04-02,1,0,1,0,1,0,"));
    }

    #[test]
    fn parquet_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mlb_2023_rest_days.parquet");
        let panel = sample_panel();
        write_panel(&panel, &path, OutputFormat::Parquet).unwrap();

        let mut file = std::fs::File::open(&path).unwrap();
        let df = ParquetReader::new(&mut file).finish().unwrap();
        assert!(df.equals_missing(&panel));
    }
}
