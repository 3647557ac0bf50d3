use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use rayon::prelude::*;
use rusqlite::Connection;

use crate::data_manager::DataManager;
use crate::document_store::{DocumentSink, DocumentSource};
use crate::prep::{process_box_score_data, process_game_log_data};
use crate::shot_dataset::{self, ShotIngestRun};
use crate::shots::PlayByPlayShotData;
use crate::stats_api::StatsApi;
use crate::types::{BoxScore, GameLog, Season, TeamAbbreviation};

#[derive(Debug, Clone)]
pub struct BoxScoreIngestSummary {
    pub season: Season,
    pub games_total: usize,
    pub games_succeeded: usize,
    pub files_written: Vec<PathBuf>,
    pub errors: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct ShotFetchSummary {
    pub season: Season,
    pub games_total: usize,
    pub games: Vec<PlayByPlayShotData>,
    pub skipped: Vec<String>,
    pub errors: Vec<String>,
}

impl ShotFetchSummary {
    pub fn shots(&self) -> usize {
        self.games.iter().map(|g| g.plays.len()).sum()
    }
}

pub fn with_fetch_pool<T>(threads: usize, action: impl FnOnce() -> T + Send) -> T
where
    T: Send,
{
    match rayon::ThreadPoolBuilder::new().num_threads(threads).build() {
        Ok(pool) => pool.install(action),
        Err(err) => {
            log::warn!("fetch pool unavailable ({err}); running on the current thread pool");
            action()
        }
    }
}

pub fn save_game_log<S>(
    api: &StatsApi,
    manager: &DataManager<'_, S>,
    season: &Season,
) -> Result<(PathBuf, Vec<GameLog>)>
where
    S: DocumentSource + DocumentSink + ?Sized,
{
    log::info!("fetching {season} game log");
    let raw = api.fetch_league_game_log(season)?;
    let game_logs = process_game_log_data(&raw, season)?;
    let path = manager.save_game_logs(season, &game_logs)?;
    log::info!("saved {} game log rows to {}", game_logs.len(), path.display());
    Ok((path, game_logs))
}

pub fn save_season_box_scores<S>(
    api: &StatsApi,
    manager: &DataManager<'_, S>,
    season: &Season,
    parallelism: usize,
) -> Result<BoxScoreIngestSummary>
where
    S: DocumentSource + DocumentSink + Sync + ?Sized,
{
    let game_logs = manager
        .load_game_logs(season)?
        .ok_or_else(|| anyhow!("no stored game log for {season}; run saveGameLog first"))?;
    let game_ids: BTreeSet<&str> = game_logs.iter().map(|gl| gl.game_id.as_str()).collect();
    log::info!("fetching {} box scores for {season}", game_ids.len());

    let results: Vec<(String, Result<Vec<BoxScore>>)> = with_fetch_pool(parallelism, || {
        game_ids
            .par_iter()
            .map(|game_id| {
                let result = api
                    .fetch_box_score(game_id)
                    .and_then(|raw| process_box_score_data(&game_logs, &raw));
                (game_id.to_string(), result)
            })
            .collect()
    });

    let mut by_team: BTreeMap<TeamAbbreviation, Vec<BoxScore>> = BTreeMap::new();
    let mut games_succeeded = 0usize;
    let mut errors = Vec::new();
    for (game_id, result) in results {
        match result {
            Ok(box_scores) => {
                games_succeeded += 1;
                for box_score in box_scores {
                    by_team
                        .entry(box_score.game.team_abbreviation)
                        .or_default()
                        .push(box_score);
                }
            }
            Err(err) => errors.push(format!("game {game_id}: {err:#}")),
        }
    }

    let mut files_written = Vec::new();
    for (team, mut box_scores) in by_team {
        box_scores.sort_by(|a, b| a.game.game_date.cmp(&b.game.game_date));
        let path = manager
            .save_team_box_scores(season, team, &box_scores)
            .with_context(|| format!("saving {team} box scores"))?;
        files_written.push(path);
    }

    Ok(BoxScoreIngestSummary {
        season: season.clone(),
        games_total: game_ids.len(),
        games_succeeded,
        files_written,
        errors,
    })
}

pub fn season_game_ids<S: DocumentSource + ?Sized>(
    manager: &DataManager<'_, S>,
    season: &Season,
) -> Vec<String> {
    let mut games: Vec<(&str, &str)> = manager
        .maps()
        .games
        .values()
        .filter(|game| game.season == *season)
        .map(|game| (game.date.as_str(), game.id.as_str()))
        .collect();
    games.sort();
    games.into_iter().map(|(_, id)| id.to_string()).collect()
}

pub fn fetch_season_shots<S>(
    api: &StatsApi,
    manager: &DataManager<'_, S>,
    season: &Season,
    game_ids: &[String],
    parallelism: usize,
) -> ShotFetchSummary
where
    S: DocumentSource + Sync + ?Sized,
{
    log::info!("reconstructing shots for {} games of {season}", game_ids.len());
    let results: Vec<(String, Result<Option<PlayByPlayShotData>>)> =
        with_fetch_pool(parallelism, || {
            game_ids
                .par_iter()
                .map(|game_id| {
                    let result = manager.fetch_play_by_play_shot_data(api, game_id);
                    (game_id.clone(), result)
                })
                .collect()
        });

    let mut games = Vec::new();
    let mut skipped = Vec::new();
    let mut errors = Vec::new();
    for (game_id, result) in results {
        match result {
            Ok(Some(data)) => games.push(data),
            Ok(None) => skipped.push(game_id),
            Err(err) => errors.push(format!("game {game_id}: {err:#}")),
        }
    }

    ShotFetchSummary {
        season: season.clone(),
        games_total: game_ids.len(),
        games,
        skipped,
        errors,
    }
}

pub fn save_season_shots<S>(
    manager: &DataManager<'_, S>,
    summary: &ShotFetchSummary,
) -> Result<Vec<PathBuf>>
where
    S: DocumentSource + DocumentSink + ?Sized,
{
    summary
        .games
        .iter()
        .map(|game| manager.save_play_by_play_shots(&summary.season, game))
        .collect()
}

pub fn ingest_shots(conn: &mut Connection, summary: &ShotFetchSummary) -> Result<ShotIngestRun> {
    let run_id =
        shot_dataset::begin_ingest_run(conn, Some(&summary.season), summary.games_total)?;
    let mut run = ShotIngestRun {
        season: Some(summary.season.clone()),
        games_total: summary.games_total,
        errors: summary.errors.clone(),
        ..ShotIngestRun::default()
    };

    for game in &summary.games {
        match shot_dataset::upsert_game_shots(conn, &game.game_id, &summary.season, &game.plays) {
            Ok(count) => {
                run.games_succeeded += 1;
                run.shots_upserted += count;
            }
            Err(err) => run.errors.push(format!("game {}: {err:#}", game.game_id)),
        }
    }
    for game_id in &summary.skipped {
        run.errors.push(format!("game {game_id}: no play-by-play or box scores"));
    }

    shot_dataset::finish_ingest_run(conn, run_id, &run)?;
    Ok(run)
}
