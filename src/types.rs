use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Season(String);

impl Season {
    pub fn parse(raw: &str) -> Result<Self> {
        let raw = raw.trim();
        let (start, end) = raw
            .split_once('-')
            .ok_or_else(|| anyhow!("season must look like 2017-18, got {raw:?}"))?;
        let start_year = start
            .parse::<u16>()
            .map_err(|_| anyhow!("invalid season start year in {raw:?}"))?;
        if start.len() != 4 || end.len() != 2 {
            return Err(anyhow!("season must look like 2017-18, got {raw:?}"));
        }
        let end_year = end
            .parse::<u16>()
            .map_err(|_| anyhow!("invalid season end year in {raw:?}"))?;
        if (start_year + 1) % 100 != end_year {
            return Err(anyhow!("season years are not consecutive in {raw:?}"));
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn start_year(&self) -> u16 {
        self.0[..4].parse().unwrap_or_default()
    }
}

impl TryFrom<String> for Season {
    type Error = anyhow::Error;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<Season> for String {
    fn from(value: Season) -> Self {
        value.0
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TeamAbbreviation {
    ATL,
    BKN,
    BOS,
    CHA,
    CHI,
    CLE,
    DAL,
    DEN,
    DET,
    GSW,
    HOU,
    IND,
    LAC,
    LAL,
    MEM,
    MIA,
    MIL,
    MIN,
    NOP,
    NYK,
    OKC,
    ORL,
    PHI,
    PHX,
    POR,
    SAC,
    SAS,
    TOR,
    UTA,
    WAS,
}

impl TeamAbbreviation {
    pub const ALL: [TeamAbbreviation; 30] = [
        Self::ATL,
        Self::BKN,
        Self::BOS,
        Self::CHA,
        Self::CHI,
        Self::CLE,
        Self::DAL,
        Self::DEN,
        Self::DET,
        Self::GSW,
        Self::HOU,
        Self::IND,
        Self::LAC,
        Self::LAL,
        Self::MEM,
        Self::MIA,
        Self::MIL,
        Self::MIN,
        Self::NOP,
        Self::NYK,
        Self::OKC,
        Self::ORL,
        Self::PHI,
        Self::PHX,
        Self::POR,
        Self::SAC,
        Self::SAS,
        Self::TOR,
        Self::UTA,
        Self::WAS,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::ATL => "ATL",
            Self::BKN => "BKN",
            Self::BOS => "BOS",
            Self::CHA => "CHA",
            Self::CHI => "CHI",
            Self::CLE => "CLE",
            Self::DAL => "DAL",
            Self::DEN => "DEN",
            Self::DET => "DET",
            Self::GSW => "GSW",
            Self::HOU => "HOU",
            Self::IND => "IND",
            Self::LAC => "LAC",
            Self::LAL => "LAL",
            Self::MEM => "MEM",
            Self::MIA => "MIA",
            Self::MIL => "MIL",
            Self::MIN => "MIN",
            Self::NOP => "NOP",
            Self::NYK => "NYK",
            Self::OKC => "OKC",
            Self::ORL => "ORL",
            Self::PHI => "PHI",
            Self::PHX => "PHX",
            Self::POR => "POR",
            Self::SAC => "SAC",
            Self::SAS => "SAS",
            Self::TOR => "TOR",
            Self::UTA => "UTA",
            Self::WAS => "WAS",
        }
    }
}

impl FromStr for TeamAbbreviation {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let key = s.trim().to_ascii_uppercase();
        Self::ALL
            .iter()
            .copied()
            .find(|team| team.as_str() == key)
            .ok_or_else(|| anyhow!("unknown team abbreviation {s:?}"))
    }
}

impl fmt::Display for TeamAbbreviation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameOutcome {
    #[serde(rename = "W")]
    Win,
    #[serde(rename = "L")]
    Loss,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamInfo {
    pub abbreviation: TeamAbbreviation,
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct BoxScoreStats {
    #[serde(default)]
    pub min: f64,
    #[serde(default)]
    pub fgm: u32,
    #[serde(default)]
    pub fga: u32,
    #[serde(default)]
    pub fg_pct: Option<f64>,
    #[serde(default)]
    pub fg3m: u32,
    #[serde(default)]
    pub fg3a: u32,
    #[serde(default)]
    pub fg3_pct: Option<f64>,
    #[serde(default)]
    pub ftm: u32,
    #[serde(default)]
    pub fta: u32,
    #[serde(default)]
    pub ft_pct: Option<f64>,
    #[serde(default)]
    pub oreb: u32,
    #[serde(default)]
    pub dreb: u32,
    #[serde(default)]
    pub reb: u32,
    #[serde(default)]
    pub ast: u32,
    #[serde(default)]
    pub stl: u32,
    #[serde(default)]
    pub blk: u32,
    #[serde(default, rename = "TO")]
    pub turnovers: u32,
    #[serde(default)]
    pub pf: u32,
    #[serde(default)]
    pub pts: u32,
    #[serde(default)]
    pub plus_minus: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct GameLog {
    pub game_id: String,
    pub game_date: String,
    pub season_id: Season,
    #[serde(default)]
    pub team_id: u64,
    #[serde(default)]
    pub team_name: String,
    pub team_abbreviation: TeamAbbreviation,
    pub opponent_team_abbreviation: TeamAbbreviation,
    #[serde(default)]
    pub matchup: String,
    pub outcome: GameOutcome,
    pub home: bool,
    pub video_available: bool,
    #[serde(rename = "stats")]
    pub stats: BoxScoreStats,
}

impl GameLog {
    pub fn home_team(&self) -> TeamAbbreviation {
        if self.home {
            self.team_abbreviation
        } else {
            self.opponent_team_abbreviation
        }
    }

    pub fn away_team(&self) -> TeamAbbreviation {
        if self.home {
            self.opponent_team_abbreviation
        } else {
            self.team_abbreviation
        }
    }

    pub fn winner(&self) -> TeamAbbreviation {
        match self.outcome {
            GameOutcome::Win => self.team_abbreviation,
            GameOutcome::Loss => self.opponent_team_abbreviation,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct PlayerBoxScoreStats {
    pub player_id: String,
    pub player_name: String,
    #[serde(default)]
    pub start_position: String,
    #[serde(default)]
    pub comment: String,
    #[serde(flatten)]
    pub stats: BoxScoreStats,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoxScore {
    pub game: GameLog,
    pub player_stats: Vec<PlayerBoxScoreStats>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamStint {
    pub team: TeamAbbreviation,
    pub start_date: String,
    pub end_date: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerInfo {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub simple_id: String,
    #[serde(default)]
    pub position: String,
    #[serde(default)]
    pub teams: BTreeMap<Season, Vec<TeamStint>>,
}

impl PlayerInfo {
    pub fn new(id: &str, first_name: &str, last_name: &str) -> Self {
        Self {
            id: id.to_string(),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            simple_id: String::new(),
            position: String::new(),
            teams: BTreeMap::new(),
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameStats {
    pub game: GameLog,
    pub stats: BoxScoreStats,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerBoxScores {
    pub player: PlayerInfo,
    pub scores: Vec<GameStats>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TeamGameBoxScore {
    pub team: TeamAbbreviation,
    pub score: BoxScore,
    pub players: Vec<PlayerInfo>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompleteGameBoxScores {
    pub home: TeamGameBoxScore,
    pub away: TeamGameBoxScore,
}

impl CompleteGameBoxScores {
    pub fn game_date(&self) -> &str {
        &self.home.score.game.game_date
    }

    pub fn rosters(&self) -> GameRosters<'_> {
        GameRosters {
            home: TeamRoster {
                team: self.home.team,
                players: &self.home.players,
            },
            away: TeamRoster {
                team: self.away.team,
                players: &self.away.players,
            },
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct TeamRoster<'a> {
    pub team: TeamAbbreviation,
    pub players: &'a [PlayerInfo],
}

impl TeamRoster<'_> {
    pub fn contains(&self, player_id: &str) -> bool {
        self.players.iter().any(|p| p.id == player_id)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct GameRosters<'a> {
    pub home: TeamRoster<'a>,
    pub away: TeamRoster<'a>,
}

pub type TeamMap = BTreeMap<TeamAbbreviation, TeamInfo>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerMap {
    pub id_map: BTreeMap<String, PlayerInfo>,
    pub simple_ids: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameInfo {
    pub id: String,
    pub date: String,
    pub season: Season,
    pub home: TeamAbbreviation,
    pub home_points: u32,
    pub away: TeamAbbreviation,
    pub away_points: u32,
    pub winner: TeamAbbreviation,
    pub players: BTreeSet<String>,
}

pub type GameIdMap = BTreeMap<String, GameInfo>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn season_accepts_provider_labels() {
        let season = Season::parse("2017-18").unwrap();
        assert_eq!(season.as_str(), "2017-18");
        assert_eq!(season.start_year(), 2017);
        assert!(Season::parse("1999-00").is_ok());
        assert!(Season::parse("2017-19").is_err());
        assert!(Season::parse("2017").is_err());
    }

    #[test]
    fn team_abbreviation_round_trips_through_json_keys() {
        let mut map = TeamMap::new();
        map.insert(
            TeamAbbreviation::BOS,
            TeamInfo {
                abbreviation: TeamAbbreviation::BOS,
                id: 1610612738,
                name: "Boston Celtics".to_string(),
            },
        );
        let json = serde_json::to_string(&map).unwrap();
        assert!(json.starts_with("{\"BOS\":"));
        let back: TeamMap = serde_json::from_str(&json).unwrap();
        assert_eq!(back, map);
        assert_eq!("phx".parse::<TeamAbbreviation>().unwrap(), TeamAbbreviation::PHX);
        assert!("XYZ".parse::<TeamAbbreviation>().is_err());
    }
}
