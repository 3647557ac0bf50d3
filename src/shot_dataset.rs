use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use chrono::Utc;
use rusqlite::{Connection, Transaction, params};

use crate::http_cache::app_cache_dir;
use crate::play_by_play::{EventMessageType, NormalizedEvent};
use crate::shot_zone::ShotZone;
use crate::shots::ShotAttempt;
use crate::types::Season;

const SHOT_COLUMNS: &str = r#"
    game_id, event_num, season, period, actual_time, period_seconds_remaining,
    seconds_into_game, away_score, home_score, description, event_type,
    action_type, shot_zone, miss, point_value, player_id, team,
    assisting_player_name, fouling_player_name
"#;

#[derive(Debug, Clone, Default)]
pub struct ShotIngestRun {
    pub season: Option<Season>,
    pub games_total: usize,
    pub games_succeeded: usize,
    pub shots_upserted: usize,
    pub errors: Vec<String>,
}

pub fn default_db_path() -> Option<PathBuf> {
    app_cache_dir().map(|dir| dir.join("shots.sqlite"))
}

pub fn open_db(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).ok();
    }
    let conn =
        Connection::open(path).with_context(|| format!("open sqlite db {}", path.display()))?;
    init_schema(&conn)?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        PRAGMA journal_mode = WAL;
        CREATE TABLE IF NOT EXISTS shots (
            game_id TEXT NOT NULL,
            event_num INTEGER NOT NULL,
            season TEXT NOT NULL,
            period INTEGER NOT NULL,
            actual_time INTEGER NULL,
            period_seconds_remaining INTEGER NOT NULL,
            seconds_into_game INTEGER NOT NULL,
            away_score INTEGER NOT NULL,
            home_score INTEGER NOT NULL,
            description TEXT NULL,
            event_type INTEGER NOT NULL,
            action_type INTEGER NOT NULL,
            shot_zone TEXT NOT NULL,
            miss INTEGER NOT NULL,
            point_value INTEGER NOT NULL,
            player_id TEXT NOT NULL,
            team TEXT NOT NULL,
            assisting_player_name TEXT NULL,
            fouling_player_name TEXT NULL,
            updated_at TEXT NOT NULL,
            PRIMARY KEY (game_id, event_num)
        );
        CREATE INDEX IF NOT EXISTS idx_shots_player ON shots(player_id);
        CREATE INDEX IF NOT EXISTS idx_shots_season ON shots(season);
        CREATE INDEX IF NOT EXISTS idx_shots_zone ON shots(shot_zone);

        CREATE TABLE IF NOT EXISTS ingest_runs (
            run_id INTEGER PRIMARY KEY AUTOINCREMENT,
            started_at TEXT NOT NULL,
            finished_at TEXT NULL,
            season TEXT NULL,
            games_total INTEGER NOT NULL,
            games_succeeded INTEGER NOT NULL,
            shots_upserted INTEGER NOT NULL,
            errors_json TEXT NOT NULL
        );
        "#,
    )
    .context("create sqlite schema")?;
    Ok(())
}

pub fn upsert_game_shots(
    conn: &mut Connection,
    game_id: &str,
    season: &Season,
    shots: &[ShotAttempt],
) -> Result<usize> {
    let tx = conn.transaction().context("begin shot transaction")?;
    tx.execute("DELETE FROM shots WHERE game_id = ?1", params![game_id])
        .context("clear game shots")?;
    let updated_at = Utc::now().to_rfc3339();
    for shot in shots {
        insert_shot(&tx, game_id, season, shot, &updated_at)?;
    }
    tx.commit().context("commit shot transaction")?;
    Ok(shots.len())
}

fn insert_shot(
    tx: &Transaction<'_>,
    game_id: &str,
    season: &Season,
    shot: &ShotAttempt,
    updated_at: &str,
) -> Result<()> {
    let event = &shot.event;
    tx.execute(
        &format!(
            "INSERT INTO shots ({SHOT_COLUMNS}, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20)"
        ),
        params![
            game_id,
            event.event_num,
            season.as_str(),
            event.period,
            event.actual_time,
            event.period_seconds_remaining,
            event.seconds_into_game,
            event.away_score,
            event.home_score,
            event.description,
            u16::from(event.event_type),
            event.action_type,
            shot.shot_zone.as_str(),
            shot.miss,
            shot.point_value,
            shot.player_id,
            shot.team.as_str(),
            shot.assisting_player_name,
            shot.fouling_player_name,
            updated_at,
        ],
    )
    .with_context(|| format!("insert shot {game_id}/{}", event.event_num))?;
    Ok(())
}

struct ShotRow {
    event: NormalizedEvent,
    shot_zone: String,
    miss: bool,
    point_value: u8,
    player_id: String,
    team: String,
    assisting_player_name: Option<String>,
    fouling_player_name: Option<String>,
}

impl TryFrom<ShotRow> for ShotAttempt {
    type Error = anyhow::Error;

    fn try_from(row: ShotRow) -> Result<Self> {
        Ok(ShotAttempt {
            shot_zone: row.shot_zone.parse()?,
            team: row.team.parse()?,
            miss: row.miss,
            point_value: row.point_value,
            player_id: row.player_id,
            assisting_player_name: row.assisting_player_name,
            fouling_player_name: row.fouling_player_name,
            event: row.event,
        })
    }
}

pub fn load_player_shots(conn: &Connection, player_id: &str) -> Result<Vec<ShotAttempt>> {
    query_shots(
        conn,
        "player_id = ?1 ORDER BY season ASC, game_id ASC, event_num ASC",
        player_id,
    )
}

pub fn load_game_shots(conn: &Connection, game_id: &str) -> Result<Vec<ShotAttempt>> {
    query_shots(conn, "game_id = ?1 ORDER BY event_num ASC", game_id)
}

pub fn load_season_shots(conn: &Connection, season: &Season) -> Result<Vec<ShotAttempt>> {
    query_shots(
        conn,
        "season = ?1 ORDER BY game_id ASC, event_num ASC",
        season.as_str(),
    )
}

fn query_shots(conn: &Connection, filter: &str, key: &str) -> Result<Vec<ShotAttempt>> {
    let mut stmt = conn
        .prepare(&format!("SELECT {SHOT_COLUMNS} FROM shots WHERE {filter}"))
        .context("prepare load shots query")?;

    let rows = stmt
        .query_map(params![key], |row| {
            Ok(ShotRow {
                event: NormalizedEvent {
                    event_num: row.get(1)?,
                    period: row.get(3)?,
                    actual_time: row.get(4)?,
                    period_seconds_remaining: row.get(5)?,
                    seconds_into_game: row.get(6)?,
                    away_score: row.get(7)?,
                    home_score: row.get(8)?,
                    description: row.get(9)?,
                    event_type: EventMessageType::from(row.get::<_, u16>(10)?),
                    action_type: row.get(11)?,
                },
                shot_zone: row.get(12)?,
                miss: row.get(13)?,
                point_value: row.get(14)?,
                player_id: row.get(15)?,
                team: row.get(16)?,
                assisting_player_name: row.get(17)?,
                fouling_player_name: row.get(18)?,
            })
        })
        .context("query load shots")?;

    let mut out = Vec::new();
    for row in rows {
        let row = row.context("decode shot row")?;
        out.push(ShotAttempt::try_from(row)?);
    }
    Ok(out)
}

pub fn zone_totals(conn: &Connection, season: &Season) -> Result<Vec<(ShotZone, u32, u32)>> {
    let mut stmt = conn
        .prepare(
            r#"
            SELECT shot_zone, COUNT(*), SUM(CASE WHEN miss = 0 THEN 1 ELSE 0 END)
            FROM shots
            WHERE season = ?1
            GROUP BY shot_zone
            ORDER BY shot_zone ASC
            "#,
        )
        .context("prepare zone totals query")?;
    let rows = stmt
        .query_map(params![season.as_str()], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, u32>(1)?,
                row.get::<_, u32>(2)?,
            ))
        })
        .context("query zone totals")?;

    let mut out = Vec::new();
    for row in rows {
        let (zone, attempts, makes) = row.context("decode zone row")?;
        let zone = zone
            .parse::<ShotZone>()
            .map_err(|err| anyhow!("stored zone {zone:?}: {err}"))?;
        out.push((zone, attempts, makes));
    }
    Ok(out)
}

pub fn begin_ingest_run(conn: &Connection, season: Option<&Season>, games_total: usize) -> Result<i64> {
    let started_at = Utc::now().to_rfc3339();
    conn.execute(
        "INSERT INTO ingest_runs(started_at, finished_at, season, games_total, games_succeeded, shots_upserted, errors_json)
         VALUES (?1, NULL, ?2, ?3, 0, 0, '[]')",
        params![started_at, season.map(Season::as_str), games_total as i64],
    )
    .context("insert ingest run")?;
    Ok(conn.last_insert_rowid())
}

pub fn finish_ingest_run(conn: &Connection, run_id: i64, run: &ShotIngestRun) -> Result<()> {
    let finished_at = Utc::now().to_rfc3339();
    let errors_json = serde_json::to_string(&run.errors).unwrap_or_else(|_| "[]".to_string());
    conn.execute(
        "UPDATE ingest_runs
         SET finished_at = ?1, games_succeeded = ?2, shots_upserted = ?3, errors_json = ?4
         WHERE run_id = ?5",
        params![
            finished_at,
            run.games_succeeded as i64,
            run.shots_upserted as i64,
            errors_json,
            run_id
        ],
    )
    .context("update ingest run")?;
    Ok(())
}
