use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use rust_xlsxwriter::{Workbook, Worksheet};

use crate::calc::{ShotZoneSplits, splits_by_player};
use crate::shots::{PlayByPlayShotData, ShotAttempt};
use crate::types::PlayerMap;

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Number(f64),
    Empty,
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Cell::Text(value)
    }
}

impl From<u32> for Cell {
    fn from(value: u32) -> Self {
        Cell::Number(f64::from(value))
    }
}

impl From<Option<f64>> for Cell {
    fn from(value: Option<f64>) -> Self {
        value.map(Cell::Number).unwrap_or(Cell::Empty)
    }
}

impl From<Option<String>> for Cell {
    fn from(value: Option<String>) -> Self {
        value.map(Cell::Text).unwrap_or(Cell::Empty)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShotExportReport {
    pub games: usize,
    pub shots: usize,
    pub zone_rows: usize,
    pub players: usize,
}

pub fn export_shooting_report(
    path: &Path,
    games: &[PlayByPlayShotData],
    players: &PlayerMap,
) -> Result<ShotExportReport> {
    let shot_rows = shot_rows(games, players);
    let all_shots: Vec<&ShotAttempt> = games.iter().flat_map(|g| g.plays.iter()).collect();
    let splits = splits_by_player(all_shots.iter().copied());
    let zone_rows = zone_rows(&splits, players);
    let player_rows = player_rows(&splits, players);

    let mut workbook = Workbook::new();
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Shots")?;
        write_rows(sheet, &shot_rows)?;
    }
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Zones")?;
        write_rows(sheet, &zone_rows)?;
    }
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Players")?;
        write_rows(sheet, &player_rows)?;
    }

    workbook
        .save(path)
        .with_context(|| format!("failed writing workbook to {}", path.display()))?;

    Ok(ShotExportReport {
        games: games.len(),
        shots: shot_rows.len().saturating_sub(1),
        zone_rows: zone_rows.len().saturating_sub(1),
        players: player_rows.len().saturating_sub(1),
    })
}

fn player_name(players: &PlayerMap, id: &str) -> String {
    players
        .id_map
        .get(id)
        .map(|p| p.full_name())
        .unwrap_or_else(|| id.to_string())
}

pub fn shot_rows(games: &[PlayByPlayShotData], players: &PlayerMap) -> Vec<Vec<Cell>> {
    let header = [
        "Game", "Event", "Period", "Clock", "GameSeconds", "Team", "PlayerId", "Player", "Zone",
        "Made", "Points", "Assist", "FouledBy", "AndOne", "Description",
    ];
    let mut rows = vec![header.iter().map(|h| Cell::from(*h)).collect::<Vec<_>>()];
    for game in games {
        for shot in &game.plays {
            let remaining = shot.event.period_seconds_remaining;
            rows.push(vec![
                Cell::from(game.game_id.as_str()),
                Cell::from(shot.event.event_num),
                Cell::from(u32::from(shot.event.period)),
                Cell::from(format!("{}:{:02}", remaining / 60, remaining % 60)),
                Cell::from(shot.event.seconds_into_game),
                Cell::from(shot.team.as_str()),
                Cell::from(shot.player_id.as_str()),
                Cell::from(player_name(players, &shot.player_id)),
                Cell::from(shot.shot_zone.label()),
                Cell::from(if shot.miss { "N" } else { "Y" }),
                Cell::from(u32::from(shot.point_value)),
                Cell::from(shot.assisting_player_name.clone()),
                Cell::from(shot.fouling_player_name.clone()),
                Cell::from(if shot.is_and_one() { "Y" } else { "" }),
                Cell::from(shot.description()),
            ]);
        }
    }
    rows
}

fn zone_rows(
    splits: &BTreeMap<String, ShotZoneSplits>,
    players: &PlayerMap,
) -> Vec<Vec<Cell>> {
    let header = ["PlayerId", "Player", "Zone", "Attempts", "Makes", "Points", "Pct"];
    let mut rows = vec![header.iter().map(|h| Cell::from(*h)).collect::<Vec<_>>()];
    for (player_id, player_splits) in splits {
        let name = player_name(players, player_id);
        for (zone, line) in &player_splits.zones {
            rows.push(vec![
                Cell::from(player_id.as_str()),
                Cell::from(name.as_str()),
                Cell::from(zone.label()),
                Cell::from(line.attempts),
                Cell::from(line.makes),
                Cell::from(line.points),
                Cell::from(line.pct()),
            ]);
        }
    }
    rows
}

fn player_rows(
    splits: &BTreeMap<String, ShotZoneSplits>,
    players: &PlayerMap,
) -> Vec<Vec<Cell>> {
    let header = [
        "PlayerId", "Player", "FGM", "FGA", "FG3M", "FTA", "PTS", "FG%", "eFG%", "TS%",
    ];
    let mut rows = vec![header.iter().map(|h| Cell::from(*h)).collect::<Vec<_>>()];
    for (player_id, player_splits) in splits {
        let eff = player_splits.efficiency();
        rows.push(vec![
            Cell::from(player_id.as_str()),
            Cell::from(player_name(players, player_id)),
            Cell::from(eff.fgm),
            Cell::from(eff.fga),
            Cell::from(eff.fg3m),
            Cell::from(eff.fta),
            Cell::from(eff.pts),
            Cell::from(eff.fg_pct),
            Cell::from(eff.efg_pct),
            Cell::from(eff.ts_pct),
        ]);
    }
    rows
}

fn write_rows(worksheet: &mut Worksheet, rows: &[Vec<Cell>]) -> Result<()> {
    for (row_idx, row) in rows.iter().enumerate() {
        for (col_idx, value) in row.iter().enumerate() {
            let (r, c) = (row_idx as u32, col_idx as u16);
            match value {
                Cell::Text(text) => worksheet.write_string(r, c, text).map(|_| ()),
                Cell::Number(number) => worksheet.write_number(r, c, *number).map(|_| ()),
                Cell::Empty => Ok(()),
            }
            .with_context(|| format!("write cell ({row_idx},{col_idx})"))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::play_by_play::{EventMessageType, NormalizedEvent};
    use crate::shot_zone::ShotZone;
    use crate::types::{PlayerInfo, TeamAbbreviation};

    fn game() -> PlayByPlayShotData {
        let event = NormalizedEvent {
            event_num: 7,
            period: 2,
            actual_time: None,
            period_seconds_remaining: 605,
            seconds_into_game: 835,
            away_score: 30,
            home_score: 28,
            description: Some("Curry 26' 3PT Jump Shot (3 PTS)".to_string()),
            event_type: EventMessageType::Make,
            action_type: 1,
        };
        PlayByPlayShotData {
            game_id: "0021700001".to_string(),
            plays: vec![ShotAttempt {
                event,
                shot_zone: ShotZone::ThreePoint,
                miss: false,
                point_value: 3,
                player_id: "201939".to_string(),
                team: TeamAbbreviation::GSW,
                assisting_player_name: None,
                fouling_player_name: Some("Love".to_string()),
            }],
        }
    }

    #[test]
    fn shot_rows_resolve_names_and_clock() {
        let mut players = PlayerMap::default();
        players.id_map.insert(
            "201939".to_string(),
            PlayerInfo::new("201939", "Stephen", "Curry"),
        );
        let rows = shot_rows(&[game()], &players);
        assert_eq!(rows.len(), 2);
        let row = &rows[1];
        assert_eq!(row[3], Cell::from("10:05"));
        assert_eq!(row[7], Cell::from("Stephen Curry"));
        assert_eq!(row[11], Cell::Empty);
        assert_eq!(row[13], Cell::from("Y"));
    }

    #[test]
    fn workbook_is_written() {
        let path = std::env::temp_dir().join(format!("netdata-export-{}.xlsx", std::process::id()));
        let report = export_shooting_report(&path, &[game()], &PlayerMap::default()).unwrap();
        assert_eq!(report.shots, 1);
        assert_eq!(report.zone_rows, 1);
        assert_eq!(report.players, 1);
        assert!(path.exists());
        let _ = std::fs::remove_file(&path);
    }
}
