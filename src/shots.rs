use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};

use crate::description::{FoulInfo, FoulType, parse_assist, parse_foul, parse_shot_distance};
use crate::play_by_play::{
    EventMessageType, NormalizedEvent, RawPlayByPlay, RawPlayEvent, matching_plays,
    normalize_event,
};
use crate::player_match::find_player_in_text;
use crate::shot_zone::{ShotZone, classify_two_point_zone};
use crate::types::{GameRosters, PlayerInfo, TeamAbbreviation};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShotAttempt {
    #[serde(flatten)]
    pub event: NormalizedEvent,
    #[serde(rename = "shotType")]
    pub shot_zone: ShotZone,
    pub miss: bool,
    pub point_value: u8,
    pub player_id: String,
    pub team: TeamAbbreviation,
    pub assisting_player_name: Option<String>,
    pub fouling_player_name: Option<String>,
}

impl ShotAttempt {
    pub fn description(&self) -> &str {
        self.event.description.as_deref().unwrap_or_default()
    }

    pub fn is_and_one(&self) -> bool {
        !self.miss && self.fouling_player_name.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayByPlayShotData {
    pub game_id: String,
    pub plays: Vec<ShotAttempt>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShotInfo {
    pub shot_zone: ShotZone,
    pub miss: bool,
    pub point_value: u8,
    pub assisting_player_name: Option<String>,
}

pub fn parse_shot_info(event: &NormalizedEvent) -> Option<ShotInfo> {
    let description = event.description.as_deref()?;

    let shot_zone = if description.contains("Free Throw") {
        ShotZone::FreeThrow
    } else if description.contains("3PT") {
        ShotZone::ThreePoint
    } else if matches!(
        event.event_type,
        EventMessageType::Make | EventMessageType::Miss
    ) {
        let distance = parse_shot_distance(description).unwrap_or(-1.0);
        classify_two_point_zone(distance)?
    } else {
        return None;
    };

    let miss = description.contains("MISS") || event.event_type == EventMessageType::Miss;
    let point_value = if miss { 0 } else { shot_zone.point_value() };

    Some(ShotInfo {
        shot_zone,
        miss,
        point_value,
        assisting_player_name: parse_assist(description).map(|a| a.name),
    })
}

pub fn parse_foul_info(event: &NormalizedEvent) -> Option<FoulInfo> {
    if event.event_type != EventMessageType::PersonalFoul {
        return None;
    }
    let description = event.description.as_deref()?;
    Some(parse_foul(description))
}

pub fn reconstruct_shots(
    game_date: &str,
    events: &[RawPlayEvent],
    rosters: GameRosters<'_>,
) -> Result<Vec<ShotAttempt>> {
    if events.is_empty() {
        return Err(anyhow!("no play-by-play events to reconstruct"));
    }
    if rosters.home.players.is_empty() {
        return Err(anyhow!("home roster ({}) is empty", rosters.home.team));
    }
    if rosters.away.players.is_empty() {
        return Err(anyhow!("away roster ({}) is empty", rosters.away.team));
    }

    let candidates: Vec<PlayerInfo> = rosters
        .home
        .players
        .iter()
        .chain(rosters.away.players.iter())
        .cloned()
        .collect();

    let mut shots = Vec::new();
    let mut unattributed = 0usize;
    for index in 0..events.len() {
        let event = normalize_event(game_date, events, index);
        let Some(description) = event.description.as_deref() else {
            continue;
        };
        let Some(info) = parse_shot_info(&event) else {
            continue;
        };
        let Some(shooter) = find_player_in_text(description, &candidates) else {
            unattributed += 1;
            log::debug!("no shooter found for event {}: {description}", event.event_num);
            continue;
        };

        let team = if rosters.home.contains(&shooter.id) {
            rosters.home.team
        } else {
            rosters.away.team
        };

        let mut fouling_player_name = None;
        if !info.miss {
            for other in matching_plays(events, index) {
                let foul = parse_foul_info(&normalize_event(game_date, events, other));
                if let Some(foul) = foul
                    && foul.foul_type == Some(FoulType::Shooting)
                {
                    fouling_player_name = foul.fouling_player;
                }
            }
        }

        shots.push(ShotAttempt {
            player_id: shooter.id.clone(),
            team,
            shot_zone: info.shot_zone,
            miss: info.miss,
            point_value: info.point_value,
            assisting_player_name: info.assisting_player_name,
            fouling_player_name,
            event,
        });
    }

    if unattributed > 0 {
        log::info!(
            "{} vs {}: {} shots kept, {} without a resolvable shooter",
            rosters.away.team,
            rosters.home.team,
            shots.len(),
            unattributed
        );
    }
    Ok(shots)
}

pub fn play_by_play_shot_data(
    data: &RawPlayByPlay,
    game_date: &str,
    rosters: GameRosters<'_>,
) -> Result<PlayByPlayShotData> {
    let game_id = data
        .play_by_play
        .first()
        .map(|e| e.game_id.clone())
        .ok_or_else(|| anyhow!("play-by-play payload has no events"))?;
    let plays = reconstruct_shots(game_date, &data.play_by_play, rosters)?;
    Ok(PlayByPlayShotData { game_id, plays })
}
