use crate::{dates, gamelog::GameLogDf, injury::InjuryDf, schedule::ScheduleDf, Result};
use chrono::NaiveDate;
use derive_deref::Deref;
use itertools::izip;
use polars::{prelude::*, sql::SQLContext};

/// Output columns, in file order.
pub const PANEL_COLUMNS: [&str; 10] = [
    "player_id",
    "team_code",
    "game_date",
    "team_played",
    "appeared",
    "rest_flag",
    "on_injury_list",
    "days_since_last_game",
    "prev_day_was_rest",
    "plate_appearances",
];

// Every team a player logged a game for, which covers mid-season trades
pub(crate) static MEMBERSHIP_QUERY: &str = r#"
    SELECT
        player_id,
        team_code,
        MIN(game_date) AS first_game
    FROM logs
    GROUP BY player_id, team_code
"#;

// Doubleheaders share a date, so their plate appearances are added together
pub(crate) static GAME_PA_QUERY: &str = r#"
    SELECT
        player_id,
        game_date,
        SUM(plate_appearances) AS plate_appearances
    FROM logs
    GROUP BY player_id, game_date
"#;

#[derive(Debug, Clone, PartialEq)]
pub struct PanelRow {
    pub player_id: String,
    pub team_code: String,
    pub game_date: NaiveDate,
    pub team_played: i32,
    pub appeared: i32,
    pub rest_flag: i32,
    pub on_injury_list: i32,
    pub days_since_last_game: Option<i64>,
    pub prev_day_was_rest: i32,
    pub plate_appearances: f64,
}

/// One row per player and date their team played. Columns as in [`PANEL_COLUMNS`].
#[derive(Debug, Clone, Deref)]
pub struct RestPanelDf(DataFrame);

impl RestPanelDf {
    pub fn new(df: DataFrame) -> Self {
        RestPanelDf(df)
    }

    /// Infers rest days from team schedules and player appearances.
    ///
    /// A rest day is a date the player's team played, the player has no appearance, and
    /// the player isn't on the injury list. Each row also carries the gap in days to the
    /// player's previous row and whether that row was a rest day.
    pub fn infer(
        schedule: &ScheduleDf,
        logs: &GameLogDf,
        injuries: Option<&InjuryDf>,
    ) -> Result<Self> {
        log::trace!("panel::infer");
        let join_args = || JoinArgs::new(JoinType::Left).with_coalesce(JoinCoalesce::CoalesceColumns);
        let player_date = || [col("player_id"), col("game_date")];

        let mut ctx = SQLContext::new();
        ctx.register("logs", (**logs).clone().lazy());
        let membership = ctx
            .execute(MEMBERSHIP_QUERY)?
            .select([col("player_id"), col("team_code")]);
        let plate_appearances = ctx.execute(GAME_PA_QUERY)?;

        let appearances = (**logs)
            .clone()
            .lazy()
            .select([col("player_id"), col("game_date"), col("appeared")])
            .unique_stable(None, UniqueKeepStrategy::First);

        let team_dates = (**schedule).clone().lazy().select([
            col("game_date"),
            col("team_code"),
            col("team_played"),
        ]);

        // Dates of teams missing from the schedule drop out here
        let panel = membership
            .join(
                team_dates,
                [col("team_code")],
                [col("team_code")],
                JoinArgs::new(JoinType::Inner).with_coalesce(JoinCoalesce::CoalesceColumns),
            )
            .join(appearances, player_date(), player_date(), join_args())
            .with_column(col("appeared").fill_null(lit(0i32)).cast(DataType::Int32))
            .with_column(
                when(
                    col("team_played")
                        .eq(lit(1i32))
                        .and(col("appeared").eq(lit(0i32))),
                )
                .then(lit(1i32))
                .otherwise(lit(0i32))
                .alias("rest_flag"),
            );

        let panel = match injuries {
            Some(injuries) => {
                log::info!("[-] Merging IL file…");
                panel
                    .join(
                        (**injuries).clone().lazy(),
                        player_date(),
                        player_date(),
                        join_args(),
                    )
                    .with_column(
                        col("on_injury_list")
                            .fill_null(lit(0i32))
                            .cast(DataType::Int32),
                    )
                    .with_column(
                        when(col("on_injury_list").eq(lit(1i32)))
                            .then(lit(0i32))
                            .otherwise(col("rest_flag"))
                            .alias("rest_flag"),
                    )
            }
            None => panel.with_column(lit(0i32).alias("on_injury_list")),
        };

        let df = panel
            .sort(
                ["player_id", "game_date", "team_code"],
                SortMultipleOptions::default(),
            )
            .with_column(col("game_date").cast(DataType::Int32).alias("day_number"))
            .with_columns([
                (col("day_number") - col("day_number").shift(lit(1)))
                    .over([col("player_id")])
                    .cast(DataType::Int64)
                    .alias("days_since_last_game"),
                col("rest_flag")
                    .shift(lit(1))
                    .over([col("player_id")])
                    .fill_null(lit(0i32))
                    .cast(DataType::Int32)
                    .alias("prev_day_was_rest"),
            ])
            .join(plate_appearances, player_date(), player_date(), join_args())
            .with_column(
                col("plate_appearances")
                    .fill_null(lit(0.0))
                    .cast(DataType::Float64),
            )
            .sort(
                ["player_id", "game_date", "team_code"],
                SortMultipleOptions::default(),
            )
            .select([cols(PANEL_COLUMNS)])
            .collect()?;

        log::debug!("{} panel rows", df.height());
        Ok(RestPanelDf(df))
    }

    pub fn rest_days(&self) -> Result<usize> {
        let count = self
            .column("rest_flag")?
            .i32()?
            .into_iter()
            .filter(|flag| *flag == Some(1))
            .count();
        Ok(count)
    }

    pub fn rows(&self) -> Result<Vec<PanelRow>> {
        let df = &self.0;
        let game_dates = dates::date_column(df, "game_date")?;
        let rows = izip!(
            df.column("player_id")?.str()?,
            df.column("team_code")?.str()?,
            game_dates,
            df.column("team_played")?.i32()?,
            df.column("appeared")?.i32()?,
            df.column("rest_flag")?.i32()?,
            df.column("on_injury_list")?.i32()?,
            df.column("days_since_last_game")?.i64()?,
            df.column("prev_day_was_rest")?.i32()?,
            df.column("plate_appearances")?.f64()?,
        )
        .filter_map(
            |(player_id, team_code, game_date, team_played, appeared, rest_flag, on_il, gap, prev_rest, pa)| {
                Some(PanelRow {
                    player_id: player_id?.to_string(),
                    team_code: team_code?.to_string(),
                    game_date: game_date?,
                    team_played: team_played.unwrap_or(0),
                    appeared: appeared.unwrap_or(0),
                    rest_flag: rest_flag.unwrap_or(0),
                    on_injury_list: on_il.unwrap_or(0),
                    days_since_last_game: gap,
                    prev_day_was_rest: prev_rest.unwrap_or(0),
                    plate_appearances: pa.unwrap_or(0.0),
                })
            },
        )
        .collect();
        Ok(rows)
    }
}
