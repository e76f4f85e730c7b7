use parse_display::{Display, FromStr};

pub mod config;
pub mod dates;
pub mod error;
pub mod gamelog;
mod http;
pub mod identity;
pub mod injury;
pub mod panel;
pub mod pipeline;
pub mod roster;
pub mod schedule;
pub mod source;
pub mod stats_api;
pub mod writer;

pub use config::Config;
pub use error::Error;
pub use pipeline::{build_panel, run, RunSummary};
pub use source::Sources;

pub type Result<T> = std::result::Result<T, error::Error>;

/// Modern MLB team codes in the Baseball Reference style.
///
/// Older seasons used other codes (FLA, TBD, MON); these are valid for 2013 onwards.
pub const MLB_TEAMS: [&str; 30] = [
    "ARI", "ATL", "BAL", "BOS", "CHC", "CHW", "CIN", "CLE", "COL", "DET", "HOU", "KCR", "LAA",
    "LAD", "MIA", "MIL", "MIN", "NYM", "NYY", "OAK", "PHI", "PIT", "SDP", "SEA", "SFG", "STL",
    "TBR", "TEX", "TOR", "WSN",
];

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Display, FromStr)]
#[display(style = "lowercase")]
pub enum OutputFormat {
    #[default]
    Csv,
    Parquet,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Parquet => "parquet",
        }
    }
}
