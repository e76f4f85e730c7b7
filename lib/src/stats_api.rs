//! Live provider backed by the MLB Stats API, with identities from the Chadwick Bureau
//! register.
//!
//! Ids are Baseball Reference slugs (`troutmi01`). The Stats API keys players by MLBAM
//! number, so game logs go through the register to translate one into the other.

use crate::{
    http,
    source::{
        BattingSeasonTotal, BattingSource, GameLogSource, IdentityCandidate, IdentitySource,
        RawGameLogRow, RawScheduleRow, ScheduleSource,
    },
    Error, Result,
};
use once_cell::sync::OnceCell;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::io::Read;

const STATS_API_BASE: &str = "https://statsapi.mlb.com/api/v1";
const REGISTER_BASE: &str = "https://raw.githubusercontent.com/chadwickbureau/register/master/data";
const REGISTER_SHARDS: &str = "0123456789abcdef";

/// Baseball Reference team codes and their Stats API team ids.
pub const TEAM_IDS: [(&str, u32); 30] = [
    ("ARI", 109),
    ("ATL", 144),
    ("BAL", 110),
    ("BOS", 111),
    ("CHC", 112),
    ("CHW", 145),
    ("CIN", 113),
    ("CLE", 114),
    ("COL", 115),
    ("DET", 116),
    ("HOU", 117),
    ("KCR", 118),
    ("LAA", 108),
    ("LAD", 119),
    ("MIA", 146),
    ("MIL", 158),
    ("MIN", 142),
    ("NYM", 121),
    ("NYY", 147),
    ("OAK", 133),
    ("PHI", 143),
    ("PIT", 134),
    ("SDP", 135),
    ("SEA", 136),
    ("SFG", 137),
    ("STL", 138),
    ("TBR", 139),
    ("TEX", 140),
    ("TOR", 141),
    ("WSN", 120),
];

pub fn team_id(team_code: &str) -> Result<u32> {
    TEAM_IDS
        .iter()
        .find(|(code, _)| code.eq_ignore_ascii_case(team_code.trim()))
        .map(|(_, id)| *id)
        .ok_or_else(|| Error::UnknownTeam(team_code.to_string()))
}

pub fn team_code(team_id: u64) -> Option<&'static str> {
    TEAM_IDS
        .iter()
        .find(|(_, id)| u64::from(*id) == team_id)
        .map(|(code, _)| *code)
}

// ---------------------------------------------------------------------------
// Chadwick register
// ---------------------------------------------------------------------------

/// The register columns we read. Everything else in the file is ignored.
#[derive(Debug, Deserialize)]
struct RawPerson {
    #[serde(default)]
    key_mlbam: Option<String>,
    #[serde(default)]
    key_bbref: Option<String>,
    #[serde(default)]
    name_last: Option<String>,
    #[serde(default)]
    name_first: Option<String>,
    #[serde(default)]
    mlb_played_first: Option<String>,
    #[serde(default)]
    mlb_played_last: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RegisterPerson {
    pub bbref: String,
    pub mlbam: Option<u32>,
    pub name_last: String,
    pub name_first: String,
    pub played_first: Option<i32>,
    pub played_last: Option<i32>,
}

/// Reads one register shard, keeping only people with a Baseball Reference id.
pub fn parse_register<R: Read>(reader: R) -> Result<Vec<RegisterPerson>> {
    let mut rdr = csv::Reader::from_reader(reader);
    let mut people = Vec::new();
    for row in rdr.deserialize::<RawPerson>() {
        let row = row?;
        let Some(bbref) = non_empty(row.key_bbref) else {
            continue;
        };
        people.push(RegisterPerson {
            bbref,
            mlbam: number(row.key_mlbam.as_deref()).map(|n| n as u32),
            name_last: row.name_last.unwrap_or_default(),
            name_first: row.name_first.unwrap_or_default(),
            played_first: number(row.mlb_played_first.as_deref()).map(|n| n as i32),
            played_last: number(row.mlb_played_last.as_deref()).map(|n| n as i32),
        });
    }
    Ok(people)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

// Register years sometimes carry a trailing ".0"
fn number(value: Option<&str>) -> Option<f64> {
    value.and_then(|v| v.trim().parse::<f64>().ok())
}

#[derive(Debug, Default)]
pub struct Register {
    people: Vec<RegisterPerson>,
    by_name: HashMap<(String, String), Vec<usize>>,
    mlbam_by_bbref: HashMap<String, u32>,
}

impl Register {
    pub fn new(people: Vec<RegisterPerson>) -> Self {
        let mut by_name: HashMap<(String, String), Vec<usize>> = HashMap::new();
        let mut mlbam_by_bbref = HashMap::new();
        for (idx, person) in people.iter().enumerate() {
            by_name
                .entry(name_key(&person.name_last, &person.name_first))
                .or_default()
                .push(idx);
            if let Some(mlbam) = person.mlbam {
                mlbam_by_bbref.insert(person.bbref.clone(), mlbam);
            }
        }
        Register {
            people,
            by_name,
            mlbam_by_bbref,
        }
    }

    pub fn len(&self) -> usize {
        self.people.len()
    }

    pub fn is_empty(&self) -> bool {
        self.people.is_empty()
    }

    /// Everyone whose last and first names match, ignoring case.
    pub fn candidates(&self, surname: &str, given: &str) -> Vec<IdentityCandidate> {
        self.by_name
            .get(&name_key(surname, given))
            .into_iter()
            .flatten()
            .map(|idx| {
                let person = &self.people[*idx];
                IdentityCandidate {
                    key: Some(person.bbref.clone()),
                    played_first: person.played_first,
                    played_last: person.played_last,
                }
            })
            .collect()
    }

    pub fn mlbam(&self, bbref: &str) -> Option<u32> {
        self.mlbam_by_bbref.get(bbref).copied()
    }
}

fn name_key(last: &str, first: &str) -> (String, String) {
    (last.trim().to_lowercase(), first.trim().to_lowercase())
}

// ---------------------------------------------------------------------------
// Stats API responses
// ---------------------------------------------------------------------------

fn parse_body(body: &str) -> Result<Option<Value>> {
    let trimmed = body.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(None);
    }
    Ok(Some(serde_json::from_str(trimmed)?))
}

fn first_splits(v: &Value) -> impl Iterator<Item = &Value> {
    v.get("stats")
        .and_then(|s| s.get(0))
        .and_then(|s| s.get("splits"))
        .and_then(|s| s.as_array())
        .into_iter()
        .flatten()
}

/// Dates the team took the field. Dates whose games were all postponed or cancelled are skipped.
pub fn parse_schedule_json(body: &str, team_code: &str) -> Result<Vec<RawScheduleRow>> {
    let Some(v) = parse_body(body)? else {
        return Ok(Vec::new());
    };

    let mut out = Vec::new();
    for day in v.get("dates").and_then(|d| d.as_array()).into_iter().flatten() {
        let Some(date) = day.get("date").and_then(|d| d.as_str()) else {
            continue;
        };
        let played = match day.get("games").and_then(|g| g.as_array()) {
            Some(games) => games.iter().any(game_was_played),
            None => true,
        };
        if played {
            out.push(RawScheduleRow {
                date: date.to_string(),
                team: team_code.to_string(),
            });
        }
    }
    Ok(out)
}

fn game_was_played(game: &Value) -> bool {
    let state = game
        .get("status")
        .and_then(|s| s.get("detailedState"))
        .and_then(|s| s.as_str())
        .unwrap_or_default();
    !matches!(state, "Postponed" | "Cancelled" | "Suspended")
}

pub fn parse_batting_json(body: &str, team_code: &str) -> Result<Vec<BattingSeasonTotal>> {
    let Some(v) = parse_body(body)? else {
        return Ok(Vec::new());
    };

    let out = first_splits(&v)
        .filter_map(|split| {
            let player_name = split
                .get("player")
                .and_then(|p| p.get("fullName"))
                .and_then(|n| n.as_str())?;
            let plate_appearances = split
                .get("stat")
                .and_then(|s| s.get("plateAppearances"))
                .and_then(|pa| pa.as_i64());
            Some(BattingSeasonTotal {
                player_name: player_name.to_string(),
                plate_appearances,
                team_code: team_code.to_string(),
            })
        })
        .collect();
    Ok(out)
}

pub fn parse_game_log_json(body: &str) -> Result<Vec<RawGameLogRow>> {
    let Some(v) = parse_body(body)? else {
        return Ok(Vec::new());
    };

    let out = first_splits(&v)
        .filter_map(|split| {
            let date = split.get("date").and_then(|d| d.as_str())?;
            Some(RawGameLogRow {
                game_id: split
                    .get("game")
                    .and_then(|g| g.get("gamePk"))
                    .and_then(|pk| pk.as_i64()),
                date: date.to_string(),
                team: club_code(split.get("team")),
                opponent: club_code(split.get("opponent")),
                plate_appearances: split
                    .get("stat")
                    .and_then(|s| s.get("plateAppearances"))
                    .and_then(|pa| pa.as_f64()),
            })
        })
        .collect();
    Ok(out)
}

// Falls back to the API's own abbreviation for clubs outside the table
fn club_code(club: Option<&Value>) -> String {
    let Some(club) = club else {
        return String::new();
    };
    if let Some(code) = club.get("id").and_then(|id| id.as_u64()).and_then(team_code) {
        return code.to_string();
    }
    club.get("abbreviation")
        .or_else(|| club.get("name"))
        .and_then(|n| n.as_str())
        .unwrap_or_default()
        .to_string()
}

// ---------------------------------------------------------------------------
// Provider
// ---------------------------------------------------------------------------

pub struct StatsApiProvider {
    api_base: String,
    register: OnceCell<Register>,
}

impl StatsApiProvider {
    pub fn new() -> Self {
        Self {
            api_base: STATS_API_BASE.to_string(),
            register: OnceCell::new(),
        }
    }

    /// Uses an already loaded register instead of downloading one.
    pub fn with_register(register: Register) -> Self {
        let provider = Self::new();
        let _ = provider.register.set(register);
        provider
    }

    fn register(&self) -> Result<&Register> {
        self.register.get_or_try_init(|| {
            log::info!("Downloading the Chadwick register…");
            let mut people = Vec::new();
            for shard in REGISTER_SHARDS.chars() {
                let url = format!("{REGISTER_BASE}/people-{shard}.csv");
                let body = http::get_text(&url)?;
                people.extend(parse_register(body.as_bytes())?);
            }
            log::debug!("{} people with Baseball Reference ids", people.len());
            Ok::<_, Error>(Register::new(people))
        })
    }
}

impl Default for StatsApiProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl ScheduleSource for StatsApiProvider {
    fn team_schedule(&self, team_code: &str, season: u16) -> Result<Vec<RawScheduleRow>> {
        let url = format!(
            "{}/schedule?sportId=1&season={}&teamId={}&gameType=R",
            self.api_base,
            season,
            team_id(team_code)?
        );
        parse_schedule_json(&http::get_text(&url)?, team_code)
    }
}

impl BattingSource for StatsApiProvider {
    fn team_batting(&self, season: u16, team_code: &str) -> Result<Vec<BattingSeasonTotal>> {
        let url = format!(
            "{}/stats?stats=season&group=hitting&season={}&teamId={}&playerPool=ALL&limit=200",
            self.api_base,
            season,
            team_id(team_code)?
        );
        parse_batting_json(&http::get_text(&url)?, team_code)
    }
}

impl IdentitySource for StatsApiProvider {
    fn lookup(&self, surname: &str, given: &str) -> Result<Vec<IdentityCandidate>> {
        Ok(self.register()?.candidates(surname, given))
    }
}

impl GameLogSource for StatsApiProvider {
    fn game_logs(&self, player_id: &str, season: u16) -> Result<Vec<RawGameLogRow>> {
        let mlbam = self
            .register()?
            .mlbam(player_id)
            .ok_or_else(|| Error::UnmappedPlayer(player_id.to_string()))?;
        let url = format!(
            "{}/people/{}/stats?stats=gameLog&group=hitting&season={}",
            self.api_base, mlbam, season
        );
        parse_game_log_json(&http::get_text(&url)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn team_codes_map_both_ways() {
        assert_eq!(team_id("NYY").unwrap(), 147);
        assert_eq!(team_id(" wsn ").unwrap(), 120);
        assert!(matches!(team_id("MON"), Err(Error::UnknownTeam(_))));
        assert_eq!(team_code(137), Some("SFG"));
        assert_eq!(team_code(1), None);

        for (code, id) in TEAM_IDS {
            assert_eq!(team_code(u64::from(id)), Some(code));
        }
    }

    #[test]
    fn null_bodies_are_empty() {
        assert!(parse_schedule_json("null", "AAA").unwrap().is_empty());
        assert!(parse_batting_json("", "AAA").unwrap().is_empty());
        assert!(parse_game_log_json(" null ").unwrap().is_empty());
        assert!(parse_game_log_json("{not json").is_err());
    }

    #[test]
    fn register_indexes_names_case_insensitively() {
        let register = Register::new(vec![RegisterPerson {
            bbref: "doej01".into(),
            mlbam: Some(600001),
            name_last: "Doe".into(),
            name_first: "Jane".into(),
            played_first: Some(2020),
            played_last: Some(2023),
        }]);
        assert_eq!(register.len(), 1);
        assert_eq!(register.candidates("DOE", "jane").len(), 1);
        assert!(register.candidates("Doe", "John").is_empty());
        assert_eq!(register.mlbam("doej01"), Some(600001));
        assert_eq!(register.mlbam("roej02"), None);
    }
}
