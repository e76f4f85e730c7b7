//! One season, end to end: schedules, rosters, ids, game logs, rest panel, file.

use crate::{
    gamelog::{self, GameLogDf, GameLogEntry},
    injury::InjuryDf,
    panel::RestPanelDf,
    roster::{self, RosterDf},
    schedule::{self, ScheduleDf, ScheduleEntry},
    source::{BattingSeasonTotal, Sources, Stage, StageReport},
    writer, Config, Error, Result,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Duration;

/// Fixed delay after each upstream request, to go easy on the provider.
#[derive(Debug, Clone, Copy)]
pub struct Pacer {
    delay: Duration,
}

impl Pacer {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    pub fn pause(&self) {
        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }
    }
}

/// Progress for a per-team or per-player fetch loop. Draws nothing when stderr isn't a
/// terminal.
pub fn progress_bar(len: usize, stage: Stage) -> ProgressBar {
    let bar = ProgressBar::new(len as u64);
    match ProgressStyle::with_template(
        "  {prefix:<18} {bar:40.cyan/blue} {pos}/{len} {msg} [{elapsed_precise}]",
    ) {
        Ok(style) => bar.set_style(style.progress_chars("##-")),
        Err(e) => log::debug!("progress template: {}", e),
    }
    bar.set_prefix(stage.to_string());
    bar
}

#[derive(Debug)]
pub struct PanelBuild {
    pub panel: RestPanelDf,
    pub schedules: StageReport<ScheduleEntry>,
    pub rosters: StageReport<BattingSeasonTotal>,
    pub game_logs: StageReport<GameLogEntry>,
    pub resolved_players: usize,
}

impl PanelBuild {
    /// Every team or player request that failed, as `stage unit: reason`.
    pub fn failures(&self) -> Vec<String> {
        fn describe<T>(report: &StageReport<T>) -> Vec<String> {
            report
                .failures()
                .into_iter()
                .map(|(unit, reason)| format!("{} {}: {}", report.stage, unit, reason))
                .collect()
        }

        let mut out = describe(&self.schedules);
        out.extend(describe(&self.rosters));
        out.extend(describe(&self.game_logs));
        out
    }
}

#[derive(Debug, Clone)]
pub struct RunSummary {
    pub season: u16,
    pub output_path: PathBuf,
    pub rows: usize,
    pub columns: Vec<String>,
    pub rest_days: usize,
    pub resolved_players: usize,
    pub failures: Vec<String>,
}

/// Fetches everything for `config.season` and infers the rest panel, without writing it.
///
/// Fails with [`Error::EmptyStage`] when no team produced a schedule or batters, or no
/// player produced a game log.
pub fn build_panel(config: &Config, sources: &Sources) -> Result<PanelBuild> {
    let pacer = Pacer::new(config.pause);
    let season = config.season;
    log::info!("[+] Building MLB rest dataset for {}", season);

    log::info!("[1/5] Pulling team schedules…");
    let schedules = schedule::collect_schedules(sources.schedule, &config.teams, season, &pacer);
    let schedule = ScheduleDf::from_entries(schedules.rows())?;
    if schedule.height() == 0 {
        return Err(Error::EmptyStage(Stage::Schedules));
    }

    log::info!("[2/5] Selecting top batters by team…");
    let rosters = roster::collect_rosters(sources.batting, &config.teams, season, &pacer);
    let roster = RosterDf::from_report(&rosters, config.top_n)?;
    if roster.height() == 0 {
        return Err(Error::EmptyStage(Stage::Rosters));
    }

    log::info!("[3/5] Resolving player ids…");
    let roster = roster.resolve_ids(sources.identity)?;
    let player_ids = roster.player_ids()?;

    log::info!("[4/5] Fetching player game logs (this can take a while)…");
    let game_logs = gamelog::collect_game_logs(sources.logs, &player_ids, season, &pacer);
    let logs = GameLogDf::from_entries(game_logs.rows())?;
    if logs.height() == 0 {
        return Err(Error::EmptyStage(Stage::GameLogs));
    }

    log::info!("[5/5] Inferring rest days…");
    let injuries = match &config.injury_csv {
        Some(path) if path.exists() => Some(InjuryDf::load(path, season)?),
        Some(path) => {
            log::warn!("injury file {} not found; skipping", path.display());
            None
        }
        None => None,
    };
    let panel = RestPanelDf::infer(&schedule, &logs, injuries.as_ref())?;

    Ok(PanelBuild {
        panel,
        schedules,
        rosters,
        game_logs,
        resolved_players: player_ids.len(),
    })
}

/// Builds the panel and writes it to `config.output_path()`.
pub fn run(config: &Config, sources: &Sources) -> Result<RunSummary> {
    let build = build_panel(config, sources)?;
    let output_path = config.output_path();
    writer::write_panel(&build.panel, &output_path, config.format)?;

    Ok(RunSummary {
        season: config.season,
        output_path,
        rows: build.panel.height(),
        columns: build
            .panel
            .get_column_names()
            .into_iter()
            .map(String::from)
            .collect(),
        rest_days: build.panel.rest_days()?,
        resolved_players: build.resolved_players,
        failures: build.failures(),
    })
}
