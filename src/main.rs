use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};

use netdata::config::{Config, load_dotenv};
use netdata::data_manager::DataManager;
use netdata::document_store::{DataCategory, DocumentSource, FsDocumentStore, WebDocumentStore};
use netdata::identity_maps::{IdentityMaps, SeasonData};
use netdata::ingest;
use netdata::shot_export::export_shooting_report;
use netdata::stats_api::StatsApi;
use netdata::types::Season;

const FUNCTIONS: &[&str] = &[
    "saveGameLog",
    "saveBoxScores",
    "buildMaps",
    "saveShots",
    "exportShots",
];

#[derive(Debug, Default)]
struct CliOptions {
    function: Option<String>,
    season: Option<Season>,
    game: Option<String>,
    data_dir: Option<PathBuf>,
    out: Option<PathBuf>,
    remote: bool,
    verbose: bool,
    help: bool,
}

fn main() -> Result<()> {
    load_dotenv();
    let opts = parse_args(std::env::args().skip(1).collect())?;

    let log_level = if opts.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .init();

    if opts.help {
        print_help();
        return Ok(());
    }

    let mut config = Config::from_env()?;
    if let Some(season) = opts.season.clone() {
        config.season = season;
    }
    if let Some(dir) = opts.data_dir.clone() {
        config.data_dir = dir;
    }

    let function = opts.function.as_deref().unwrap_or_default();
    match function {
        "saveGameLog" => save_game_log(&config),
        "saveBoxScores" => save_box_scores(&config),
        "buildMaps" => build_maps(&config),
        "saveShots" => save_shots(&config, opts.game.as_deref()),
        "exportShots" => export_shots(&config, opts.out.clone(), opts.remote),
        other => {
            eprintln!("No valid function given ({other:?})");
            print_help();
            Err(anyhow!("unknown function {other:?}"))
        }
    }
}

fn save_game_log(config: &Config) -> Result<()> {
    let api = StatsApi::from_config(config)?;
    let store = FsDocumentStore::new(&config.data_dir);
    let maps = IdentityMaps::default();
    let manager = DataManager::new(&store, &maps);
    let (path, game_logs) = ingest::save_game_log(&api, &manager, &config.season)?;
    println!("Saved {} game log rows to {}", game_logs.len(), path.display());
    Ok(())
}

fn save_box_scores(config: &Config) -> Result<()> {
    let api = StatsApi::from_config(config)?;
    let store = FsDocumentStore::new(&config.data_dir);
    let maps = IdentityMaps::default();
    let manager = DataManager::new(&store, &maps);
    let summary =
        ingest::save_season_box_scores(&api, &manager, &config.season, config.fetch_parallelism)?;

    println!("Box scores for {}", summary.season);
    println!("Games: {}/{}", summary.games_succeeded, summary.games_total);
    println!("Team files written: {}", summary.files_written.len());
    print_errors(&summary.errors);
    Ok(())
}

fn build_maps(config: &Config) -> Result<()> {
    let store = FsDocumentStore::new(&config.data_dir);
    let seasons = store.stored_seasons(DataCategory::BoxScores)?;
    if seasons.is_empty() {
        return Err(anyhow!(
            "no box scores under {}; run saveBoxScores first",
            store.full_path(DataCategory::BoxScores.as_str())
        ));
    }

    let mut season_data = Vec::new();
    for season in &seasons {
        season_data.push(
            SeasonData::load(&store, season).with_context(|| format!("loading season {season}"))?,
        );
    }
    let maps = IdentityMaps::build(&season_data);
    maps.save(&store)?;

    println!(
        "Seasons: {}",
        seasons.iter().map(Season::as_str).collect::<Vec<_>>().join(", ")
    );
    println!("Teams: {}", maps.teams.len());
    println!("Players: {}", maps.players.id_map.len());
    println!("Games: {}", maps.games.len());
    Ok(())
}

fn save_shots(config: &Config, game: Option<&str>) -> Result<()> {
    let api = StatsApi::from_config(config)?;
    let store = FsDocumentStore::new(&config.data_dir);
    let maps = IdentityMaps::load(&store)?;
    let manager = DataManager::new(&store, &maps);

    let game_ids = match game {
        Some(id) => vec![id.to_string()],
        None => ingest::season_game_ids(&manager, &config.season),
    };
    if game_ids.is_empty() {
        return Err(anyhow!("no games for {} in the game id map", config.season));
    }

    let summary = ingest::fetch_season_shots(
        &api,
        &manager,
        &config.season,
        &game_ids,
        config.fetch_parallelism,
    );
    let written = ingest::save_season_shots(&manager, &summary)?;

    println!("Shot data for {}", summary.season);
    println!(
        "Games: {}/{} ({} skipped)",
        summary.games.len(),
        summary.games_total,
        summary.skipped.len()
    );
    println!("Shots: {}", summary.shots());
    println!("Files written: {}", written.len());
    print_errors(&summary.errors);
    Ok(())
}

fn export_shots(config: &Config, out: Option<PathBuf>, remote: bool) -> Result<()> {
    let out = out.unwrap_or_else(|| PathBuf::from(format!("shots_{}.xlsx", config.season)));
    if remote {
        let prefix = config
            .public_url
            .clone()
            .ok_or_else(|| anyhow!("--remote needs PUBLIC_URL"))?;
        export_from(&WebDocumentStore::new(prefix), &config.season, &out)
    } else {
        export_from(&FsDocumentStore::new(&config.data_dir), &config.season, &out)
    }
}

fn export_from<S: DocumentSource>(source: &S, season: &Season, out: &Path) -> Result<()> {
    let maps = IdentityMaps::load(source)?;
    let manager = DataManager::new(source, &maps);

    let mut games = Vec::new();
    let mut missing = 0usize;
    for game_id in ingest::season_game_ids(&manager, season) {
        match manager.load_play_by_play_shots(season, &game_id)? {
            Some(data) => games.push(data),
            None => missing += 1,
        }
    }
    if games.is_empty() {
        return Err(anyhow!("no stored shot data for {season}; run saveShots first"));
    }

    let report = export_shooting_report(out, &games, &maps.players)?;
    println!("Exported {}", out.display());
    println!("Games: {} ({} without shot data)", report.games, missing);
    println!("Shots: {}", report.shots);
    println!("Zone rows: {}", report.zone_rows);
    println!("Players: {}", report.players);
    Ok(())
}

fn print_errors(errors: &[String]) {
    if errors.is_empty() {
        return;
    }
    println!("Errors: {}", errors.len());
    for err in errors.iter().take(8) {
        println!(" - {err}");
    }
}

fn print_help() {
    println!("usage: netdata --function <name> [--season 2017-18] [--game <id>]");
    println!("               [--data-dir <dir>] [--out <file>] [--remote] [--verbose]");
    println!("Possible functions: {}", FUNCTIONS.join(", "));
}

fn parse_args(args: Vec<String>) -> Result<CliOptions> {
    let mut opts = CliOptions::default();
    let mut idx = 0;
    while idx < args.len() {
        let arg = args[idx].as_str();
        let (flag, inline) = match arg.split_once('=') {
            Some((flag, value)) if flag.starts_with("--") => (flag, Some(value.to_string())),
            _ => (arg, None),
        };
        let mut value = || -> Result<String> {
            if let Some(value) = inline.clone() {
                return Ok(value);
            }
            idx += 1;
            args.get(idx)
                .cloned()
                .ok_or_else(|| anyhow!("{flag} needs a value"))
        };
        match flag {
            "-f" | "--function" => opts.function = Some(value()?),
            "-s" | "--season" => opts.season = Some(Season::parse(&value()?)?),
            "--game" => opts.game = Some(value()?),
            "--data-dir" => opts.data_dir = Some(PathBuf::from(value()?)),
            "--out" => opts.out = Some(PathBuf::from(value()?)),
            "--remote" => opts.remote = true,
            "-v" | "--verbose" => opts.verbose = true,
            "-h" | "--help" => opts.help = true,
            other => return Err(anyhow!("unknown argument {other:?}")),
        }
        idx += 1;
    }
    Ok(opts)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn flags_accept_separate_and_inline_values() {
        let opts = parse_args(args(&[
            "--function",
            "saveShots",
            "--season=2016-17",
            "--game",
            "0021600001",
        ]))
        .unwrap();
        assert_eq!(opts.function.as_deref(), Some("saveShots"));
        assert_eq!(opts.season.unwrap().as_str(), "2016-17");
        assert_eq!(opts.game.as_deref(), Some("0021600001"));
        assert!(!opts.remote);
    }

    #[test]
    fn bad_arguments_are_errors() {
        assert!(parse_args(args(&["--season", "17-18"])).is_err());
        assert!(parse_args(args(&["--out"])).is_err());
        assert!(parse_args(args(&["--bogus"])).is_err());
    }
}
