use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};

use netdata::config::{Config, load_dotenv};
use netdata::data_manager::DataManager;
use netdata::document_store::FsDocumentStore;
use netdata::identity_maps::IdentityMaps;
use netdata::ingest;
use netdata::shot_dataset;
use netdata::stats_api::StatsApi;
use netdata::types::Season;

fn main() -> Result<()> {
    load_dotenv();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .init();

    let mut config = Config::from_env()?;
    if let Some(raw) = parse_value_arg("--season") {
        config.season = Season::parse(&raw)?;
    }
    if let Some(dir) = parse_value_arg("--data-dir") {
        config.data_dir = PathBuf::from(dir);
    }

    let db_path = parse_value_arg("--db")
        .map(PathBuf::from)
        .or_else(shot_dataset::default_db_path)
        .context("unable to resolve sqlite path")?;

    let store = FsDocumentStore::new(&config.data_dir);
    let maps = IdentityMaps::load(&store)?;
    let manager = DataManager::new(&store, &maps);
    let game_ids = ingest::season_game_ids(&manager, &config.season);
    if game_ids.is_empty() {
        return Err(anyhow!(
            "no games for {} under {}; run buildMaps first",
            config.season,
            config.data_dir.display()
        ));
    }

    let api = StatsApi::from_config(&config)?;
    let summary = ingest::fetch_season_shots(
        &api,
        &manager,
        &config.season,
        &game_ids,
        config.fetch_parallelism,
    );

    let mut conn = shot_dataset::open_db(&db_path)?;
    let run = ingest::ingest_shots(&mut conn, &summary)?;

    println!("Shot ingest complete");
    println!("DB: {}", db_path.display());
    println!("Season: {}", config.season);
    println!("Games: {}/{}", run.games_succeeded, run.games_total);
    println!("Shots upserted: {}", run.shots_upserted);
    for (zone, attempts, makes) in shot_dataset::zone_totals(&conn, &config.season)? {
        println!("  {:<16} {makes:>5}/{attempts:<5}", zone.label());
    }
    if !run.errors.is_empty() {
        println!("errors: {}", run.errors.len());
        for err in run.errors.iter().take(6) {
            println!(" - {err}");
        }
    }

    Ok(())
}

fn parse_value_arg(name: &str) -> Option<String> {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let prefix = format!("{name}=");
    for (idx, arg) in args.iter().enumerate() {
        if let Some(value) = arg.strip_prefix(&prefix) {
            let trimmed = value.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
        if arg == name
            && let Some(next) = args.get(idx + 1)
            && !next.trim().is_empty()
        {
            return Some(next.trim().to_string());
        }
    }
    None
}
