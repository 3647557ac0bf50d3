use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::document_store::{DataCategory, DocumentSink, DocumentSource, load_document, save_document};
use crate::filter::players_from_box_score;
use crate::identity_maps::IdentityMaps;
use crate::play_by_play::RawPlayByPlay;
use crate::prep::process_play_by_play_data;
use crate::shots::{PlayByPlayShotData, play_by_play_shot_data};
use crate::stats_api::StatsApi;
use crate::types::{
    BoxScore, CompleteGameBoxScores, GameLog, GameStats, PlayerBoxScores, Season,
    TeamAbbreviation, TeamGameBoxScore,
};

pub struct DataManager<'a, S: ?Sized> {
    maps: &'a IdentityMaps,
    source: &'a S,
}

impl<'a, S: DocumentSource + ?Sized> DataManager<'a, S> {
    pub fn new(source: &'a S, maps: &'a IdentityMaps) -> Self {
        Self { maps, source }
    }

    pub fn maps(&self) -> &'a IdentityMaps {
        self.maps
    }

    pub fn load_game_logs(&self, season: &Season) -> Result<Option<Vec<GameLog>>> {
        load_document(self.source, &DataCategory::GameLogs.season_path(season))
    }

    pub fn load_team_box_scores(
        &self,
        season: &Season,
        team: TeamAbbreviation,
    ) -> Result<Option<Vec<BoxScore>>> {
        load_document(
            self.source,
            &DataCategory::BoxScores.team_season_path(season, team),
        )
    }

    pub fn load_team_box_score(
        &self,
        season: &Season,
        team: TeamAbbreviation,
        game_id: &str,
    ) -> Result<Option<BoxScore>> {
        let scores = self.load_team_box_scores(season, team)?.unwrap_or_default();
        Ok(scores.into_iter().find(|b| b.game.game_id == game_id))
    }

    pub fn load_player_box_scores(
        &self,
        player_id: &str,
        season: Option<&Season>,
    ) -> Result<Option<PlayerBoxScores>> {
        let Some(player) = self.maps.player(player_id) else {
            return Ok(None);
        };

        let seasons: Vec<&Season> = match season {
            Some(season) => vec![season],
            None => player.teams.keys().collect(),
        };

        let mut scores = Vec::new();
        for season in seasons {
            let Some(stints) = player.teams.get(season) else {
                continue;
            };
            for stint in stints {
                let box_scores = self
                    .load_team_box_scores(season, stint.team)?
                    .unwrap_or_default();
                for box_score in box_scores {
                    if let Some(line) = box_score
                        .player_stats
                        .iter()
                        .find(|line| line.player_id == player_id)
                    {
                        scores.push(GameStats {
                            stats: line.stats.clone(),
                            game: box_score.game.clone(),
                        });
                    }
                }
            }
        }
        scores.sort_by(|a, b| a.game.game_date.cmp(&b.game.game_date));

        Ok(Some(PlayerBoxScores {
            player: player.clone(),
            scores,
        }))
    }

    pub fn load_game_box_scores(&self, game_id: &str) -> Result<Option<CompleteGameBoxScores>> {
        let Some(game) = self.maps.games.get(game_id) else {
            return Ok(None);
        };
        let home = self.load_team_box_score(&game.season, game.home, game_id)?;
        let away = self.load_team_box_score(&game.season, game.away, game_id)?;
        let (Some(home_score), Some(away_score)) = (home, away) else {
            return Ok(None);
        };

        let side = |team, score: BoxScore| TeamGameBoxScore {
            team,
            players: players_from_box_score(&score, &self.maps.players),
            score,
        };
        Ok(Some(CompleteGameBoxScores {
            home: side(game.home, home_score),
            away: side(game.away, away_score),
        }))
    }

    pub fn load_play_by_play_shots(
        &self,
        season: &Season,
        game_id: &str,
    ) -> Result<Option<PlayByPlayShotData>> {
        load_document(
            self.source,
            &DataCategory::PlayByPlay.game_path(season, game_id),
        )
    }

    pub fn fetch_play_by_play_shot_data(
        &self,
        api: &StatsApi,
        game_id: &str,
    ) -> Result<Option<PlayByPlayShotData>> {
        let raw = api
            .fetch_play_by_play(game_id)
            .with_context(|| format!("play-by-play for {game_id}"))?;
        let play_by_play = process_play_by_play_data(&raw)?;
        self.shot_data_for_game(game_id, &play_by_play)
    }

    pub fn shot_data_for_game(
        &self,
        game_id: &str,
        play_by_play: &RawPlayByPlay,
    ) -> Result<Option<PlayByPlayShotData>> {
        if play_by_play.play_by_play.is_empty() {
            return Ok(None);
        }
        let Some(box_scores) = self.load_game_box_scores(game_id)? else {
            log::warn!("no stored box scores for game {game_id}");
            return Ok(None);
        };
        let data = play_by_play_shot_data(play_by_play, box_scores.game_date(), box_scores.rosters())
            .with_context(|| format!("reconstructing shots for {game_id}"))?;
        Ok(Some(data))
    }
}

impl<S: DocumentSource + DocumentSink + ?Sized> DataManager<'_, S> {
    pub fn save_game_logs(&self, season: &Season, game_logs: &[GameLog]) -> Result<PathBuf> {
        save_document(
            self.source,
            &DataCategory::GameLogs.season_path(season),
            game_logs,
        )
    }

    pub fn save_team_box_scores(
        &self,
        season: &Season,
        team: TeamAbbreviation,
        box_scores: &[BoxScore],
    ) -> Result<PathBuf> {
        save_document(
            self.source,
            &DataCategory::BoxScores.team_season_path(season, team),
            box_scores,
        )
    }

    pub fn save_play_by_play_shots(
        &self,
        season: &Season,
        data: &PlayByPlayShotData,
    ) -> Result<PathBuf> {
        save_document(
            self.source,
            &DataCategory::PlayByPlay.game_path(season, &data.game_id),
            data,
        )
    }
}
