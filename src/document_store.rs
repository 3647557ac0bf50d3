use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::{Context, Result, anyhow};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::http_cache::fetch_json_cached_optional;
use crate::http_client::http_client;
use crate::types::{Season, TeamAbbreviation};

static TMP_COUNTER: AtomicU64 = AtomicU64::new(0);

pub const TEAM_MAP_PATH: &str = "team_map.json";
pub const PLAYER_MAP_PATH: &str = "player_map.json";
pub const GAME_ID_MAP_PATH: &str = "game_id_map.json";

pub trait DocumentSource {
    fn full_path(&self, path: &str) -> String;

    /// `Ok(None)` when the document does not exist.
    fn read_document(&self, path: &str) -> Result<Option<Value>>;
}

pub trait DocumentSink {
    fn write_document(&self, path: &str, data: &Value) -> Result<PathBuf>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataCategory {
    GameLogs,
    BoxScores,
    PlayByPlay,
}

impl DataCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::GameLogs => "game_logs",
            Self::BoxScores => "box_scores",
            Self::PlayByPlay => "play_by_play",
        }
    }

    pub fn season_path(self, season: &Season) -> String {
        format!("{}/{}.json", self.as_str(), season)
    }

    pub fn team_season_path(self, season: &Season, team: TeamAbbreviation) -> String {
        format!("{}/{}/{}.json", self.as_str(), season, team)
    }

    pub fn game_path(self, season: &Season, game_id: &str) -> String {
        format!("{}/{}/{}.json", self.as_str(), season, game_id)
    }
}

impl fmt::Display for DataCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn load_document<T, S>(source: &S, path: &str) -> Result<Option<T>>
where
    T: DeserializeOwned,
    S: DocumentSource + ?Sized,
{
    let Some(value) = source.read_document(path)? else {
        return Ok(None);
    };
    let parsed = serde_json::from_value(value)
        .with_context(|| format!("unexpected shape in {}", source.full_path(path)))?;
    Ok(Some(parsed))
}

pub fn save_document<T, S>(sink: &S, path: &str, data: &T) -> Result<PathBuf>
where
    T: Serialize + ?Sized,
    S: DocumentSink + ?Sized,
{
    let value = serde_json::to_value(data).with_context(|| format!("serialize {path}"))?;
    sink.write_document(path, &value)
}

#[derive(Debug, Clone)]
pub struct FsDocumentStore {
    root: PathBuf,
}

impl FsDocumentStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &str) -> PathBuf {
        self.root.join(path)
    }

    pub fn stored_seasons(&self, category: DataCategory) -> Result<Vec<Season>> {
        let dir = self.resolve(category.as_str());
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err).with_context(|| format!("list {}", dir.display())),
        };
        let mut seasons = Vec::new();
        for entry in entries {
            let entry = entry.with_context(|| format!("list {}", dir.display()))?;
            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                continue;
            };
            let stem = name.strip_suffix(".json").unwrap_or(name);
            if let Ok(season) = Season::parse(stem) {
                seasons.push(season);
            }
        }
        seasons.sort();
        seasons.dedup();
        Ok(seasons)
    }
}

impl DocumentSource for FsDocumentStore {
    fn full_path(&self, path: &str) -> String {
        self.resolve(path).display().to_string()
    }

    fn read_document(&self, path: &str) -> Result<Option<Value>> {
        let file = self.resolve(path);
        let raw = match fs::read_to_string(&file) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err).with_context(|| format!("read {}", file.display())),
        };
        let value = serde_json::from_str(&raw)
            .with_context(|| format!("invalid json in {}", file.display()))?;
        Ok(Some(value))
    }
}

impl DocumentSink for FsDocumentStore {
    fn write_document(&self, path: &str, data: &Value) -> Result<PathBuf> {
        let file = self.resolve(path);
        let dir = file
            .parent()
            .ok_or_else(|| anyhow!("no parent directory for {}", file.display()))?;
        fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
        let tmp = file.with_extension(format!(
            "json.{}.{}.tmp",
            std::process::id(),
            TMP_COUNTER.fetch_add(1, Ordering::Relaxed)
        ));
        let json = serde_json::to_string(data).with_context(|| format!("serialize {path}"))?;
        fs::write(&tmp, json).with_context(|| format!("write {}", tmp.display()))?;
        fs::rename(&tmp, &file).with_context(|| format!("swap {}", file.display()))?;
        Ok(file)
    }
}

#[derive(Debug, Default)]
pub struct WebDocumentStore {
    prefix: String,
    memo: Mutex<HashMap<String, Value>>,
}

impl WebDocumentStore {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            memo: Mutex::new(HashMap::new()),
        }
    }

    fn memoized(&self, path: &str) -> Option<Value> {
        let memo = self.memo.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        memo.get(path).cloned()
    }
}

impl DocumentSource for WebDocumentStore {
    fn full_path(&self, path: &str) -> String {
        format!("{}/{}", self.prefix, path)
    }

    fn read_document(&self, path: &str) -> Result<Option<Value>> {
        if let Some(value) = self.memoized(path) {
            return Ok(Some(value));
        }

        let url = self.full_path(path);
        let Some(body) = fetch_json_cached_optional(http_client()?, &url, &[])? else {
            return Ok(None);
        };
        let trimmed = body.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }
        let value: Value =
            serde_json::from_str(trimmed).with_context(|| format!("invalid json from {url}"))?;
        if value.is_null() {
            return Ok(None);
        }

        let mut memo = self.memo.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        memo.insert(path.to_string(), value.clone());
        Ok(Some(value))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn scratch_store(name: &str) -> FsDocumentStore {
        let dir = std::env::temp_dir().join(format!("netdata-docs-{name}-{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        FsDocumentStore::new(dir)
    }

    #[test]
    fn category_paths() {
        let season = Season::parse("2017-18").unwrap();
        assert_eq!(DataCategory::GameLogs.season_path(&season), "game_logs/2017-18.json");
        assert_eq!(
            DataCategory::BoxScores.team_season_path(&season, TeamAbbreviation::GSW),
            "box_scores/2017-18/GSW.json"
        );
        assert_eq!(
            DataCategory::PlayByPlay.game_path(&season, "0021700001"),
            "play_by_play/2017-18/0021700001.json"
        );
    }

    #[test]
    fn fs_store_round_trips_and_reports_missing() {
        let store = scratch_store("roundtrip");
        assert!(store.read_document("game_logs/2017-18.json").unwrap().is_none());

        let written = store
            .write_document("game_logs/2017-18.json", &json!([{"GAME_ID": "1"}]))
            .unwrap();
        assert!(written.ends_with("game_logs/2017-18.json"));
        let back = store.read_document("game_logs/2017-18.json").unwrap().unwrap();
        assert_eq!(back, json!([{"GAME_ID": "1"}]));

        store
            .write_document("game_logs/2016-17.json", &json!([]))
            .unwrap();
        let seasons = store.stored_seasons(DataCategory::GameLogs).unwrap();
        let labels: Vec<&str> = seasons.iter().map(Season::as_str).collect();
        assert_eq!(labels, ["2016-17", "2017-18"]);
        assert!(store.stored_seasons(DataCategory::BoxScores).unwrap().is_empty());

        let _ = fs::remove_dir_all(store.root());
    }

    #[test]
    fn web_store_paths_join_prefix() {
        let store = WebDocumentStore::new("https://cdn.example.test/data");
        assert_eq!(
            store.full_path("team_map.json"),
            "https://cdn.example.test/data/team_map.json"
        );
    }
}
