use std::env;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::types::Season;

pub const DEFAULT_STATS_API_BASE: &str = "https://stats.nba.com/stats/";
pub const DEFAULT_SEASON: &str = "2017-18";
const DEFAULT_DATA_DIR: &str = "data";
const DEFAULT_REQUEST_DELAY_MS: u64 = 600;
const DEFAULT_FETCH_PARALLELISM: usize = 4;

#[derive(Debug, Clone)]
pub struct Config {
    pub data_dir: PathBuf,
    pub stats_api_base: String,
    pub request_delay: Duration,
    pub fetch_parallelism: usize,
    pub season: Season,
    pub public_url: Option<String>,
}

pub fn load_dotenv() {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let data_dir = get("NETDATA_DATA_DIR").unwrap_or_else(|| DEFAULT_DATA_DIR.to_string());
        let mut stats_api_base =
            get("STATS_API_BASE").unwrap_or_else(|| DEFAULT_STATS_API_BASE.to_string());
        if !stats_api_base.ends_with('/') {
            stats_api_base.push('/');
        }
        let request_delay_ms = get("STATS_REQUEST_DELAY_MS")
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(DEFAULT_REQUEST_DELAY_MS)
            .min(10_000);
        let fetch_parallelism = get("FETCH_PARALLELISM")
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(DEFAULT_FETCH_PARALLELISM)
            .clamp(1, 16);
        let season_raw = get("NETDATA_SEASON").unwrap_or_else(|| DEFAULT_SEASON.to_string());
        let season = Season::parse(&season_raw).context("NETDATA_SEASON")?;
        let public_url = get("PUBLIC_URL").map(|url| url.trim_end_matches('/').to_string());

        Ok(Self {
            data_dir: PathBuf::from(data_dir),
            stats_api_base,
            request_delay: Duration::from_millis(request_delay_ms),
            fetch_parallelism,
            season,
            public_url,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let cfg = config_from(&[]).unwrap();
        assert_eq!(cfg.data_dir, PathBuf::from("data"));
        assert_eq!(cfg.stats_api_base, DEFAULT_STATS_API_BASE);
        assert_eq!(cfg.request_delay, Duration::from_millis(600));
        assert_eq!(cfg.fetch_parallelism, 4);
        assert_eq!(cfg.season.as_str(), "2017-18");
        assert!(cfg.public_url.is_none());
    }

    #[test]
    fn overrides_are_normalized() {
        let cfg = config_from(&[
            ("STATS_API_BASE", "http://localhost:9000/stats"),
            ("FETCH_PARALLELISM", "64"),
            ("NETDATA_SEASON", "2016-17"),
            ("PUBLIC_URL", "https://cdn.example.test/data/"),
            ("NETDATA_DATA_DIR", "  "),
        ])
        .unwrap();
        assert_eq!(cfg.stats_api_base, "http://localhost:9000/stats/");
        assert_eq!(cfg.fetch_parallelism, 16);
        assert_eq!(cfg.season.as_str(), "2016-17");
        assert_eq!(cfg.public_url.as_deref(), Some("https://cdn.example.test/data"));
        assert_eq!(cfg.data_dir, PathBuf::from("data"));
    }

    #[test]
    fn bad_season_is_an_error() {
        assert!(config_from(&[("NETDATA_SEASON", "2017")]).is_err());
    }
}
