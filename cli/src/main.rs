use anyhow::{Context, Result};
use clap::Parser;
use log::LevelFilter;
use restdays::{
    config::{DEFAULT_OUTPUT_DIR, DEFAULT_PAUSE_SECS, DEFAULT_SEASON, DEFAULT_TOP_N},
    stats_api::StatsApiProvider,
    Config, OutputFormat, Sources, MLB_TEAMS,
};
use simplelog::{ColorChoice, ConfigBuilder, TermLogger, TerminalMode};
use std::path::PathBuf;
use std::time::Duration;

/// Builds a per-player MLB rest-day panel for one or more seasons.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Season to build; repeat for several
    #[arg(short = 's', long = "season", default_values_t = [DEFAULT_SEASON])]
    seasons: Vec<u16>,

    /// Batters kept per team, by season plate appearances
    #[arg(short = 'n', long, default_value_t = DEFAULT_TOP_N)]
    top_n: usize,

    #[arg(short = 'o', long, default_value = DEFAULT_OUTPUT_DIR)]
    output_dir: PathBuf,

    /// CSV with columns player_id_bbref,date,on_IL
    #[arg(long, value_name = "FILE")]
    injury_csv: Option<PathBuf>,

    /// Seconds to wait after each request
    #[arg(long, default_value_t = DEFAULT_PAUSE_SECS)]
    pause: f64,

    /// Team code to include; repeat for several (default: all 30 clubs)
    #[arg(short = 't', long = "team")]
    teams: Vec<String>,

    #[arg(long, default_value = "csv")]
    format: OutputFormat,

    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Stage progress is logged at info, so that's the floor
    let default_level = match args.verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    let config = ConfigBuilder::new().add_filter_allow_str("restdays").build();

    TermLogger::init(
        default_level,
        config,
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )
    .context("failed to initialize logger")?;

    log::trace!("Args {:#?}", args);

    let teams: Vec<String> = if args.teams.is_empty() {
        MLB_TEAMS.iter().map(|t| t.to_string()).collect()
    } else {
        args.teams.iter().map(|t| t.trim().to_uppercase()).collect()
    };
    let pause = Duration::try_from_secs_f64(args.pause).context("--pause must be a non-negative number")?;

    let provider = StatsApiProvider::new();
    let sources = Sources::from_provider(&provider);

    for season in &args.seasons {
        let config = Config {
            season: *season,
            top_n: args.top_n,
            output_dir: args.output_dir.clone(),
            injury_csv: args.injury_csv.clone(),
            pause,
            teams: teams.clone(),
            format: args.format,
        };

        let summary = restdays::run(&config, &sources)?;

        println!(
            "[+] Wrote {}  ({} rows)",
            summary.output_path.display(),
            summary.rows
        );
        println!("Columns: {:?}", summary.columns);
        println!(
            "{} rest days across {} players",
            summary.rest_days, summary.resolved_players
        );
        if !summary.failures.is_empty() {
            println!("Failed requests: {}", summary.failures.len());
            for failure in summary.failures.iter().take(8) {
                println!(" - {failure}");
            }
        }
    }

    Ok(())
}
