use anyhow::{Context, Result, anyhow};
use serde_json::{Map, Value};

use crate::play_by_play::{RawPlayByPlay, RawPlayEvent};
use crate::stats_api::RawStatsData;
use crate::types::{
    BoxScore, BoxScoreStats, GameLog, GameOutcome, PlayerBoxScoreStats, Season, TeamAbbreviation,
};

const STAT_COLUMNS: &[&str] = &[
    "FGM",
    "FGA",
    "FG_PCT",
    "FG3M",
    "FG3A",
    "FG3_PCT",
    "FTM",
    "FTA",
    "FT_PCT",
    "OREB",
    "DREB",
    "REB",
    "AST",
    "STL",
    "BLK",
    "TO",
    "PF",
    "PTS",
    "PLUS_MINUS",
];

pub fn process_game_log_data(data: &RawStatsData, season: &Season) -> Result<Vec<GameLog>> {
    data.primary()?
        .records()
        .iter()
        .enumerate()
        .map(|(idx, record)| {
            game_log_from_record(record, season).with_context(|| format!("game log row {idx}"))
        })
        .collect()
}

fn game_log_from_record(record: &Map<String, Value>, season: &Season) -> Result<GameLog> {
    let matchup = string_field(record, "MATCHUP")?;
    let opponent = matchup
        .split_whitespace()
        .last()
        .ok_or_else(|| anyhow!("empty MATCHUP"))?
        .parse::<TeamAbbreviation>()?;
    let outcome = match string_field(record, "WL")?.as_str() {
        "W" => GameOutcome::Win,
        "L" => GameOutcome::Loss,
        other => return Err(anyhow!("unexpected WL value {other:?}")),
    };

    Ok(GameLog {
        game_id: string_field(record, "GAME_ID")?,
        game_date: string_field(record, "GAME_DATE")?,
        season_id: season.clone(),
        team_id: record.get("TEAM_ID").and_then(Value::as_u64).unwrap_or_default(),
        team_name: string_field(record, "TEAM_NAME").unwrap_or_default(),
        team_abbreviation: string_field(record, "TEAM_ABBREVIATION")?.parse()?,
        opponent_team_abbreviation: opponent,
        home: matchup.contains("vs."),
        matchup,
        outcome,
        video_available: truthy(record.get("VIDEO_AVAILABLE")),
        stats: stats_from_record(record)?,
    })
}

pub fn process_box_score_data(game_logs: &[GameLog], data: &RawStatsData) -> Result<Vec<BoxScore>> {
    let records = data.result_set("PlayerStats")?.records();

    let mut teams: Vec<(String, TeamAbbreviation)> = Vec::new();
    let mut player_lines: Vec<(TeamAbbreviation, PlayerBoxScoreStats)> = Vec::new();
    for record in &records {
        let game_id = string_field(record, "GAME_ID")?;
        let team = string_field(record, "TEAM_ABBREVIATION")?.parse::<TeamAbbreviation>()?;
        if !teams.iter().any(|(_, t)| *t == team) {
            teams.push((game_id, team));
        }
        player_lines.push((team, player_line_from_record(record)?));
    }

    teams
        .into_iter()
        .map(|(game_id, team)| {
            let game = game_logs
                .iter()
                .find(|gl| gl.game_id == game_id && gl.team_abbreviation == team)
                .ok_or_else(|| anyhow!("no game log for {team} in game {game_id}"))?;
            let player_stats = player_lines
                .iter()
                .filter(|(t, _)| *t == team)
                .map(|(_, line)| line.clone())
                .collect();
            Ok(BoxScore {
                game: game.clone(),
                player_stats,
            })
        })
        .collect()
}

fn player_line_from_record(record: &Map<String, Value>) -> Result<PlayerBoxScoreStats> {
    let player_id = match record.get("PLAYER_ID") {
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::String(s)) => s.clone(),
        _ => return Err(anyhow!("missing PLAYER_ID")),
    };
    Ok(PlayerBoxScoreStats {
        player_name: string_field(record, "PLAYER_NAME")
            .with_context(|| format!("player {player_id}"))?,
        start_position: string_field(record, "START_POSITION").unwrap_or_default(),
        comment: string_field(record, "COMMENT").unwrap_or_default(),
        stats: stats_from_record(record).with_context(|| format!("player {player_id}"))?,
        player_id,
    })
}

pub fn process_play_by_play_data(data: &RawStatsData) -> Result<RawPlayByPlay> {
    let records = data.result_set("PlayByPlay")?.records_with(|header| {
        if header == "GAME_ID" {
            "gameId".to_string()
        } else {
            header.to_ascii_lowercase()
        }
    });
    let play_by_play = records
        .into_iter()
        .enumerate()
        .map(|(idx, record)| {
            serde_json::from_value::<RawPlayEvent>(Value::Object(without_nulls(record)))
                .with_context(|| format!("play-by-play row {idx}"))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(RawPlayByPlay { play_by_play })
}

/// `"34:12"` -> 34.2; plain numbers pass through; null or blank -> 0.
pub fn parse_minutes(value: Option<&Value>) -> f64 {
    match value {
        Some(Value::Number(n)) => n.as_f64().unwrap_or_default(),
        Some(Value::String(s)) => {
            let s = s.trim();
            match s.split_once(':') {
                Some((min, sec)) => {
                    let min = min.trim().parse::<f64>().unwrap_or_default();
                    let sec = sec.trim().parse::<f64>().unwrap_or_default();
                    min + sec / 60.0
                }
                None => s.parse::<f64>().unwrap_or_default(),
            }
        }
        _ => 0.0,
    }
}

fn stats_from_record(record: &Map<String, Value>) -> Result<BoxScoreStats> {
    let mut stats = Map::new();
    stats.insert("MIN".to_string(), Value::from(parse_minutes(record.get("MIN"))));
    for column in STAT_COLUMNS {
        // Game logs name turnovers TOV, box scores TO.
        let value = match *column {
            "TO" => record.get("TO").or_else(|| record.get("TOV")),
            other => record.get(other),
        };
        if let Some(value) = value
            && !value.is_null()
        {
            stats.insert(column.to_string(), value.clone());
        }
    }
    serde_json::from_value(Value::Object(stats)).context("invalid stat columns")
}

fn without_nulls(record: Map<String, Value>) -> Map<String, Value> {
    record.into_iter().filter(|(_, v)| !v.is_null()).collect()
}

fn string_field(record: &Map<String, Value>, key: &str) -> Result<String> {
    match record.get(key) {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(Value::Number(n)) => Ok(n.to_string()),
        Some(Value::Null) | None => Err(anyhow!("missing {key}")),
        Some(other) => Err(anyhow!("unexpected {key} value {other}")),
    }
}

fn truthy(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|v| v != 0.0),
        Some(Value::String(s)) => !s.is_empty(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn minutes_strings_become_decimal() {
        assert!((parse_minutes(Some(&json!("34:12"))) - 34.2).abs() < 1e-9);
        assert_eq!(parse_minutes(Some(&json!(240))), 240.0);
        assert_eq!(parse_minutes(Some(&json!(null))), 0.0);
        assert_eq!(parse_minutes(None), 0.0);
    }

    #[test]
    fn turnovers_accept_either_column_name() {
        let mut record = Map::new();
        record.insert("TOV".to_string(), json!(14));
        record.insert("FGM".to_string(), json!(null));
        let stats = stats_from_record(&record).unwrap();
        assert_eq!(stats.turnovers, 14);
        assert_eq!(stats.fgm, 0);
    }

    #[test]
    fn video_flag_is_coerced() {
        assert!(truthy(Some(&json!(1))));
        assert!(!truthy(Some(&json!(0))));
        assert!(!truthy(None));
    }
}
