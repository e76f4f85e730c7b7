//! Calendar-date normalization for provider text and polars `Date` columns.

use crate::Result;
use chrono::NaiveDate;
use polars::prelude::*;

/// Characters box-score sites sprinkle into date cells (postponements, notes).
const MARKUP: &[char] = &['*', '†', '‡', '#'];

/// Parses a provider date cell into a calendar date, or `None` if it can't be read.
///
/// Accepts ISO dates (`2023-04-01`), ISO timestamps (`2023-04-01T17:05:00Z`) and the
/// schedule style `Saturday, Apr 1 (1)`, which carries no year and takes `season`.
pub fn normalize_game_date(raw: &str, season: u16) -> Option<NaiveDate> {
    let cleaned: String = raw.chars().filter(|c| !MARKUP.contains(c)).collect();
    let mut cleaned = cleaned.trim();

    // Doubleheader marker: "Apr 1 (2)"
    if let Some(idx) = cleaned.rfind(" (") {
        if cleaned.ends_with(')') {
            cleaned = cleaned[..idx].trim_end();
        }
    }
    if cleaned.is_empty() {
        return None;
    }

    let iso = cleaned
        .split(|c| c == 'T' || c == ' ')
        .next()
        .unwrap_or(cleaned);
    if let Ok(date) = NaiveDate::parse_from_str(iso, "%Y-%m-%d") {
        return Some(date);
    }

    let with_year = format!("{cleaned} {season}");
    ["%A, %b %d %Y", "%a, %b %d %Y", "%b %d %Y"]
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(&with_year, fmt).ok())
}

/// Builds a polars `Date` series from calendar dates.
pub fn date_series(name: &str, dates: &[NaiveDate]) -> Result<Series> {
    Ok(Series::new(name, dates))
}

/// Reads a `Date` column back into calendar dates.
pub fn date_column(df: &DataFrame, name: &str) -> Result<Vec<Option<NaiveDate>>> {
    let dates = df.column(name)?.date()?.as_date_iter().collect();
    Ok(dates)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn parses_iso_dates_and_timestamps() {
        assert_eq!(normalize_game_date("2023-04-01", 2023), Some(ymd(2023, 4, 1)));
        assert_eq!(
            normalize_game_date("2023-09-30T23:10:00Z", 2023),
            Some(ymd(2023, 9, 30))
        );
        assert_eq!(
            normalize_game_date(" 2023-05-02 00:00:00 ", 2023),
            Some(ymd(2023, 5, 2))
        );
    }

    #[test]
    fn strips_markup_and_doubleheader_markers() {
        assert_eq!(
            normalize_game_date("Saturday, Apr 1 (1)", 2023),
            Some(ymd(2023, 4, 1))
        );
        assert_eq!(
            normalize_game_date("Thursday, Mar 30*", 2023),
            Some(ymd(2023, 3, 30))
        );
        assert_eq!(normalize_game_date("2023-04-02*", 2023), Some(ymd(2023, 4, 2)));
    }

    #[test]
    fn rejects_unparseable_cells() {
        assert_eq!(normalize_game_date("", 2023), None);
        assert_eq!(normalize_game_date("***", 2023), None);
        assert_eq!(normalize_game_date("Date", 2023), None);
        assert_eq!(normalize_game_date("2023-13-45", 2023), None);
    }

    #[test]
    fn date_column_reads_back_calendar_dates() {
        let dates = vec![ymd(2023, 4, 1), ymd(2023, 4, 2)];
        let df = DataFrame::new(vec![date_series("game_date", &dates).unwrap()]).unwrap();
        assert_eq!(df.column("game_date").unwrap().dtype(), &DataType::Date);
        assert_eq!(
            date_column(&df, "game_date").unwrap(),
            vec![Some(ymd(2023, 4, 1)), Some(ymd(2023, 4, 2))]
        );

        let empty = DataFrame::new(vec![date_series("game_date", &[]).unwrap()]).unwrap();
        assert_eq!(empty.column("game_date").unwrap().dtype(), &DataType::Date);
        assert!(date_column(&empty, "game_date").unwrap().is_empty());
    }
}
