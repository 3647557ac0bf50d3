use std::collections::{BTreeMap, BTreeSet};

use anyhow::{Context, Result};

use crate::document_store::{
    DataCategory, DocumentSink, DocumentSource, GAME_ID_MAP_PATH, PLAYER_MAP_PATH, TEAM_MAP_PATH,
    load_document, save_document,
};
use crate::filter::BoxScoreFilter;
use crate::types::{
    BoxScore, GameIdMap, GameInfo, GameLog, PlayerInfo, PlayerMap, Season, TeamAbbreviation,
    TeamInfo, TeamMap, TeamStint,
};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct IdentityMaps {
    pub teams: TeamMap,
    pub players: PlayerMap,
    pub games: GameIdMap,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SeasonData {
    pub season: Season,
    pub game_logs: Vec<GameLog>,
    pub box_scores: BTreeMap<TeamAbbreviation, Vec<BoxScore>>,
}

impl SeasonData {
    pub fn load<S: DocumentSource + ?Sized>(source: &S, season: &Season) -> Result<Self> {
        let game_logs: Vec<GameLog> =
            load_document(source, &DataCategory::GameLogs.season_path(season))?
                .unwrap_or_default();
        let mut box_scores = BTreeMap::new();
        for team in TeamAbbreviation::ALL {
            let path = DataCategory::BoxScores.team_season_path(season, team);
            if let Some(scores) = load_document::<Vec<BoxScore>, _>(source, &path)? {
                box_scores.insert(team, scores);
            }
        }
        Ok(Self {
            season: season.clone(),
            game_logs,
            box_scores,
        })
    }

    fn team_box_score(&self, team: TeamAbbreviation, game_id: &str) -> Option<&BoxScore> {
        self.box_scores
            .get(&team)?
            .iter()
            .find(|b| b.game.game_id == game_id)
    }
}

impl IdentityMaps {
    pub fn build(seasons: &[SeasonData]) -> Self {
        let teams = seasons
            .iter()
            .max_by(|a, b| a.season.cmp(&b.season))
            .map(|latest| build_team_map(&latest.game_logs))
            .unwrap_or_default();
        Self {
            teams,
            players: build_player_map(seasons),
            games: build_game_id_map(seasons),
        }
    }

    pub fn load<S: DocumentSource + ?Sized>(source: &S) -> Result<Self> {
        let teams = load_document(source, TEAM_MAP_PATH)?;
        let players = load_document(source, PLAYER_MAP_PATH)?;
        let games = load_document(source, GAME_ID_MAP_PATH)?;
        if teams.is_none() || players.is_none() || games.is_none() {
            log::warn!(
                "identity maps incomplete under {}; run buildMaps",
                source.full_path("")
            );
        }
        Ok(Self {
            teams: teams.unwrap_or_default(),
            players: players.unwrap_or_default(),
            games: games.unwrap_or_default(),
        })
    }

    pub fn save<S: DocumentSink + ?Sized>(&self, sink: &S) -> Result<()> {
        save_document(sink, TEAM_MAP_PATH, &self.teams).context("save team map")?;
        save_document(sink, PLAYER_MAP_PATH, &self.players).context("save player map")?;
        save_document(sink, GAME_ID_MAP_PATH, &self.games).context("save game id map")?;
        Ok(())
    }

    pub fn player(&self, id: &str) -> Option<&PlayerInfo> {
        self.players.id_map.get(id)
    }

    pub fn player_by_simple_id(&self, simple_id: &str) -> Option<&PlayerInfo> {
        let id = self.players.simple_ids.get(simple_id)?;
        self.player(id)
    }
}

pub fn build_team_map(game_logs: &[GameLog]) -> TeamMap {
    let mut teams = TeamMap::new();
    for game_log in game_logs {
        teams
            .entry(game_log.team_abbreviation)
            .or_insert_with(|| TeamInfo {
                abbreviation: game_log.team_abbreviation,
                id: game_log.team_id,
                name: game_log.team_name.clone(),
            });
    }
    teams
}

pub fn build_player_map(seasons: &[SeasonData]) -> PlayerMap {
    let mut id_map: BTreeMap<String, PlayerInfo> = BTreeMap::new();

    for season_data in seasons {
        for (team, box_scores) in &season_data.box_scores {
            for box_score in box_scores {
                let date = &box_score.game.game_date;
                for line in &box_score.player_stats {
                    let player = id_map.entry(line.player_id.clone()).or_insert_with(|| {
                        let (first, last) = split_player_name(&line.player_name);
                        let mut info = PlayerInfo::new(&line.player_id, first, last);
                        info.position = line.start_position.clone();
                        info
                    });
                    let stints = player
                        .teams
                        .entry(season_data.season.clone())
                        .or_default();
                    match stints.iter_mut().find(|stint| stint.team == *team) {
                        Some(stint) => {
                            if *date < stint.start_date {
                                stint.start_date = date.clone();
                            }
                            if *date > stint.end_date {
                                stint.end_date = date.clone();
                            }
                        }
                        None => stints.push(TeamStint {
                            team: *team,
                            start_date: date.clone(),
                            end_date: date.clone(),
                        }),
                    }
                }
            }
        }
    }

    let mut simple_ids: BTreeMap<String, String> = BTreeMap::new();
    for (id, player) in id_map.iter_mut() {
        let base = slugify(&player.full_name());
        let mut slug = base.clone();
        let mut n = 1;
        while simple_ids.contains_key(&slug) {
            slug = format!("{base}-{n}");
            n += 1;
        }
        simple_ids.insert(slug.clone(), id.clone());
        player.simple_id = slug;
        for stints in player.teams.values_mut() {
            stints.sort_by(|a, b| a.start_date.cmp(&b.start_date));
        }
    }

    PlayerMap { id_map, simple_ids }
}

pub fn build_game_id_map(seasons: &[SeasonData]) -> GameIdMap {
    let mut games = GameIdMap::new();
    let on_floor = BoxScoreFilter::default();

    for season_data in seasons {
        for game_log in &season_data.game_logs {
            if games.contains_key(&game_log.game_id) {
                continue;
            }
            let home = game_log.home_team();
            let away = game_log.away_team();
            let (Some(home_score), Some(away_score)) = (
                season_data.team_box_score(home, &game_log.game_id),
                season_data.team_box_score(away, &game_log.game_id),
            ) else {
                log::info!(
                    "no box scores for game {} ({} {} @ {})",
                    game_log.game_id,
                    game_log.game_date,
                    away,
                    home
                );
                continue;
            };

            let players: BTreeSet<String> = home_score
                .player_stats
                .iter()
                .chain(away_score.player_stats.iter())
                .filter(|line| on_floor.passes(&line.stats))
                .map(|line| line.player_id.clone())
                .collect();

            games.insert(
                game_log.game_id.clone(),
                GameInfo {
                    id: game_log.game_id.clone(),
                    date: game_log.game_date.clone(),
                    season: season_data.season.clone(),
                    home,
                    home_points: home_score.game.stats.pts,
                    away,
                    away_points: away_score.game.stats.pts,
                    winner: game_log.winner(),
                    players,
                },
            );
        }
    }
    games
}

/// Splits at the first space; a single-token name is used for both parts.
pub fn split_player_name(name: &str) -> (&str, &str) {
    let name = name.trim();
    match name.split_once(' ') {
        Some((first, last)) => (first, last.trim()),
        None => (name, name),
    }
}

/// Lower-case, hyphen-separated, punctuation dropped: `"J.J. Redick"` ->
/// `"jj-redick"`.
pub fn slugify(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_hyphen = false;
    for ch in text.chars() {
        if ch.is_alphanumeric() {
            if pending_hyphen && !out.is_empty() {
                out.push('-');
            }
            pending_hyphen = false;
            out.extend(ch.to_lowercase());
        } else if ch.is_whitespace() || ch == '-' {
            pending_hyphen = true;
        }
    }
    out
}
