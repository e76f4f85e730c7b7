use crate::{OutputFormat, MLB_TEAMS};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_SEASON: u16 = 2023;
pub const DEFAULT_TOP_N: usize = 12;
pub const DEFAULT_OUTPUT_DIR: &str = "data";
pub const DEFAULT_PAUSE_SECS: f64 = 1.0;

/// Everything one season's run needs. Passed explicitly to the pipeline.
#[derive(Debug, Clone)]
pub struct Config {
    pub season: u16,
    /// Batters kept per team, ranked by season plate appearances
    pub top_n: usize,
    pub output_dir: PathBuf,
    /// CSV with columns `player_id_bbref,date,on_IL`
    pub injury_csv: Option<PathBuf>,
    /// Delay after every per-team and per-player request
    pub pause: Duration,
    pub teams: Vec<String>,
    pub format: OutputFormat,
}

impl Config {
    pub fn new(season: u16) -> Self {
        Self {
            season,
            top_n: DEFAULT_TOP_N,
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            injury_csv: None,
            pause: Duration::from_secs_f64(DEFAULT_PAUSE_SECS),
            teams: MLB_TEAMS.iter().map(|t| t.to_string()).collect(),
            format: OutputFormat::Csv,
        }
    }

    pub fn output_path(&self) -> PathBuf {
        self.output_dir.join(format!(
            "mlb_{}_rest_days.{}",
            self.season,
            self.format.extension()
        ))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(DEFAULT_SEASON)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_path_is_keyed_by_season() {
        let mut config = Config::new(2021);
        config.output_dir = PathBuf::from("out");
        assert_eq!(config.output_path(), PathBuf::from("out/mlb_2021_rest_days.csv"));

        config.format = OutputFormat::Parquet;
        assert_eq!(
            config.output_path(),
            PathBuf::from("out/mlb_2021_rest_days.parquet")
        );
    }

    #[test]
    fn defaults_cover_every_team() {
        let config = Config::default();
        assert_eq!(config.season, 2023);
        assert_eq!(config.top_n, 12);
        assert_eq!(config.teams.len(), 30);
        assert!(config.injury_csv.is_none());
    }
}
