use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::config::Config;
use crate::http_cache::fetch_json_cached;
use crate::http_client::http_client;
use crate::types::Season;

const MAX_ATTEMPTS: usize = 3;
const RETRY_PAUSE_MS: u64 = 300;

// The provider rejects requests that do not look like they come from its own site.
const BROWSER_HEADERS: &[(&str, &str)] = &[
    (
        "User-Agent",
        "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36",
    ),
    ("Accept", "application/json, text/plain, */*"),
    ("Accept-Language", "en-US,en;q=0.9"),
    ("Referer", "https://www.nba.com/"),
    ("Origin", "https://www.nba.com"),
    ("x-nba-stats-origin", "stats"),
    ("x-nba-stats-token", "true"),
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawStatsData {
    #[serde(default)]
    pub resource: String,
    #[serde(default)]
    pub parameters: Value,
    #[serde(rename = "resultSets")]
    pub result_sets: Vec<ResultSet>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultSet {
    pub name: String,
    pub headers: Vec<String>,
    #[serde(rename = "rowSet")]
    pub row_set: Vec<Vec<Value>>,
}

impl RawStatsData {
    pub fn result_set(&self, name: &str) -> Result<&ResultSet> {
        self.result_sets
            .iter()
            .find(|set| set.name == name)
            .ok_or_else(|| anyhow!("result set {name:?} missing from {:?}", self.resource))
    }

    pub fn primary(&self) -> Result<&ResultSet> {
        self.result_sets
            .first()
            .ok_or_else(|| anyhow!("{:?} response has no result sets", self.resource))
    }
}

impl ResultSet {
    pub fn records(&self) -> Vec<Map<String, Value>> {
        self.records_with(|header| header.to_string())
    }

    pub fn records_with(&self, key: impl Fn(&str) -> String) -> Vec<Map<String, Value>> {
        self.row_set
            .iter()
            .map(|row| {
                self.headers
                    .iter()
                    .zip(row.iter())
                    .map(|(header, value)| (key(header), value.clone()))
                    .collect()
            })
            .collect()
    }
}

pub fn parse_stats_json(raw: &str) -> Result<RawStatsData> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Err(anyhow!("empty stats response"));
    }
    serde_json::from_str(trimmed).context("invalid stats json")
}

#[derive(Debug, Clone)]
pub struct StatsApi {
    base: Url,
    request_delay: Duration,
}

impl StatsApi {
    pub fn new(base: &str, request_delay: Duration) -> Result<Self> {
        let base = Url::parse(base).with_context(|| format!("invalid stats api base {base:?}"))?;
        Ok(Self {
            base,
            request_delay,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(&config.stats_api_base, config.request_delay)
    }

    pub fn endpoint_url(&self, endpoint: &str, params: &[(&str, &str)]) -> Result<Url> {
        let mut url = self
            .base
            .join(endpoint)
            .with_context(|| format!("invalid endpoint {endpoint:?}"))?;
        url.query_pairs_mut().extend_pairs(params);
        Ok(url)
    }

    pub fn fetch_league_game_log(&self, season: &Season) -> Result<RawStatsData> {
        self.fetch(
            "leaguegamelog",
            &[
                ("Counter", "0"),
                ("Direction", "ASC"),
                ("LeagueID", "00"),
                ("PlayerOrTeam", "T"),
                ("Season", season.as_str()),
                ("SeasonType", "Regular Season"),
                ("Sorter", "DATE"),
            ],
        )
    }

    pub fn fetch_box_score(&self, game_id: &str) -> Result<RawStatsData> {
        self.fetch(
            "boxscoretraditionalv2",
            &[
                ("EndPeriod", "10"),
                ("EndRange", "28800"),
                ("GameID", game_id),
                ("RangeType", "0"),
                ("StartPeriod", "0"),
                ("StartRange", "0"),
            ],
        )
    }

    pub fn fetch_play_by_play(&self, game_id: &str) -> Result<RawStatsData> {
        self.fetch(
            "playbyplayv2",
            &[("EndPeriod", "10"), ("GameID", game_id), ("StartPeriod", "1")],
        )
    }

    fn fetch(&self, endpoint: &str, params: &[(&str, &str)]) -> Result<RawStatsData> {
        let client = http_client()?;
        let url = self.endpoint_url(endpoint, params)?;

        let mut last_err = None;
        for attempt in 0..MAX_ATTEMPTS {
            if !self.request_delay.is_zero() {
                std::thread::sleep(self.request_delay);
            }
            log::debug!("GET {url} (attempt {})", attempt + 1);
            let result = fetch_json_cached(client, url.as_str(), BROWSER_HEADERS)
                .and_then(|body| parse_stats_json(&body));
            match result {
                Ok(data) => return Ok(data),
                Err(err) => {
                    log::warn!("{endpoint} attempt {} failed: {err:#}", attempt + 1);
                    last_err = Some(err);
                    if attempt + 1 < MAX_ATTEMPTS {
                        std::thread::sleep(Duration::from_millis(RETRY_PAUSE_MS));
                    }
                }
            }
        }
        Err(last_err
            .unwrap_or_else(|| anyhow!("{endpoint} fetch failed"))
            .context(format!("fetching {endpoint}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "resource": "leaguegamelog",
        "parameters": {"Season": "2017-18"},
        "resultSets": [
            {"name": "LeagueGameLog", "headers": ["GAME_ID", "PTS"], "rowSet": [["0021700001", 102], ["0021700001", 99]]},
            {"name": "Extra", "headers": ["A"], "rowSet": []}
        ]
    }"#;

    #[test]
    fn records_zip_headers_with_rows() {
        let data = parse_stats_json(SAMPLE).unwrap();
        let records = data.primary().unwrap().records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["GAME_ID"], Value::from("0021700001"));
        assert_eq!(records[1]["PTS"], Value::from(99));

        let lower = data
            .result_set("LeagueGameLog")
            .unwrap()
            .records_with(|h| h.to_ascii_lowercase());
        assert!(lower[0].contains_key("game_id"));
        assert!(data.result_set("Missing").is_err());
    }

    #[test]
    fn empty_payloads_are_errors() {
        assert!(parse_stats_json("").is_err());
        assert!(parse_stats_json("null").is_err());
        assert!(parse_stats_json("{\"resultSets\": 3}").is_err());
    }

    #[test]
    fn endpoint_urls_carry_query_params() {
        let api = StatsApi::new("https://stats.example.test/stats/", Duration::ZERO).unwrap();
        let url = api
            .endpoint_url("playbyplayv2", &[("GameID", "0021700001"), ("StartPeriod", "1")])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://stats.example.test/stats/playbyplayv2?GameID=0021700001&StartPeriod=1"
        );

        let url = api
            .endpoint_url("leaguegamelog", &[("SeasonType", "Regular Season")])
            .unwrap();
        assert!(url.as_str().ends_with("SeasonType=Regular+Season"));
    }
}
