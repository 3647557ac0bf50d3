use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result, anyhow};
use reqwest::StatusCode;
use reqwest::blocking::Client;
use reqwest::header::{ETAG, HeaderName, IF_MODIFIED_SINCE, IF_NONE_MATCH, LAST_MODIFIED};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

const CACHE_VERSION: u32 = 1;
const CACHE_DIR: &str = "netdata";
const HTTP_SUBDIR: &str = "http";

static TMP_COUNTER: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CacheEntry {
    version: u32,
    url: String,
    body: String,
    etag: Option<String>,
    last_modified: Option<String>,
    fetched_at: u64,
}

enum Fetched {
    Body(String),
    Failed(StatusCode, String),
}

/// Root of the on-disk cache: `NETDATA_CACHE_DIR`, else
/// `$XDG_CACHE_HOME/netdata`, else `~/.cache/netdata`.
pub fn app_cache_dir() -> Option<PathBuf> {
    if let Ok(dir) = std::env::var("NETDATA_CACHE_DIR")
        && !dir.trim().is_empty()
    {
        return Some(PathBuf::from(dir));
    }
    if let Ok(base) = std::env::var("XDG_CACHE_HOME")
        && !base.trim().is_empty()
    {
        return Some(PathBuf::from(base).join(CACHE_DIR));
    }
    let home = std::env::var("HOME").ok()?;
    if home.trim().is_empty() {
        return None;
    }
    Some(PathBuf::from(home).join(".cache").join(CACHE_DIR))
}

pub fn fetch_json_cached(
    client: &Client,
    url: &str,
    extra_headers: &[(&str, &str)],
) -> Result<String> {
    match fetch(client, url, extra_headers)? {
        Fetched::Body(body) => Ok(body),
        Fetched::Failed(status, body) => Err(anyhow!("http {status}: {body}")),
    }
}

pub fn fetch_json_cached_optional(
    client: &Client,
    url: &str,
    extra_headers: &[(&str, &str)],
) -> Result<Option<String>> {
    match fetch(client, url, extra_headers)? {
        Fetched::Body(body) => Ok(Some(body)),
        Fetched::Failed(status, _) => {
            log::debug!("http {status} for {url}");
            Ok(None)
        }
    }
}

fn fetch(client: &Client, url: &str, extra_headers: &[(&str, &str)]) -> Result<Fetched> {
    let cache_dir = app_cache_dir().map(|dir| dir.join(HTTP_SUBDIR));
    let cached_entry = cache_dir.as_deref().and_then(|dir| load_entry(dir, url));

    let mut req = client.get(url);
    for (name, value) in extra_headers {
        req = req.header(*name, *value);
    }
    if let Some(entry) = cached_entry.as_ref() {
        if let Some(etag) = entry.etag.as_ref() {
            req = req.header(IF_NONE_MATCH, etag);
        }
        if let Some(last_modified) = entry.last_modified.as_ref() {
            req = req.header(IF_MODIFIED_SINCE, last_modified);
        }
    }

    let resp = req.send().with_context(|| format!("request failed: {url}"))?;
    let status = resp.status();
    let headers = resp.headers().clone();
    if status == StatusCode::NOT_MODIFIED {
        let Some(entry) = cached_entry else {
            return Err(anyhow!("received 304 without cache body for {url}"));
        };
        log::debug!("http cache hit (304) for {url}");
        return Ok(Fetched::Body(entry.body));
    }

    let body = resp.text().context("failed reading body")?;
    if !status.is_success() {
        return Ok(Fetched::Failed(status, body));
    }

    let header_value = |name: HeaderName| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_string())
    };
    let entry = CacheEntry {
        version: CACHE_VERSION,
        url: url.to_string(),
        body: body.clone(),
        etag: header_value(ETAG),
        last_modified: header_value(LAST_MODIFIED),
        fetched_at: system_time_to_secs(SystemTime::now()).unwrap_or_default(),
    };
    if (entry.etag.is_some() || entry.last_modified.is_some())
        && let Some(dir) = cache_dir.as_deref()
        && let Err(err) = store_entry(dir, &entry)
    {
        log::warn!("http cache write failed for {url}: {err:#}");
    }
    Ok(Fetched::Body(body))
}

fn entry_path(dir: &Path, url: &str) -> PathBuf {
    let digest = Sha256::digest(url.as_bytes());
    dir.join(format!("{digest:x}.json"))
}

fn load_entry(dir: &Path, url: &str) -> Option<CacheEntry> {
    let raw = fs::read_to_string(entry_path(dir, url)).ok()?;
    let entry = serde_json::from_str::<CacheEntry>(&raw).ok()?;
    if entry.version != CACHE_VERSION || entry.url != url {
        return None;
    }
    Some(entry)
}

fn store_entry(dir: &Path, entry: &CacheEntry) -> Result<()> {
    fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
    let path = entry_path(dir, &entry.url);
    let tmp = path.with_extension(format!(
        "json.{}.{}.tmp",
        std::process::id(),
        TMP_COUNTER.fetch_add(1, Ordering::Relaxed)
    ));
    let json = serde_json::to_string(entry).context("serialize http cache entry")?;
    fs::write(&tmp, json).context("write http cache entry")?;
    fs::rename(&tmp, &path).context("swap http cache entry")?;
    Ok(())
}

fn system_time_to_secs(time: SystemTime) -> Option<u64> {
    time.duration_since(UNIX_EPOCH).ok().map(|d| d.as_secs())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("netdata-http-{name}-{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    fn entry(url: &str) -> CacheEntry {
        CacheEntry {
            version: CACHE_VERSION,
            url: url.to_string(),
            body: "{\"ok\":true}".to_string(),
            etag: Some("\"abc\"".to_string()),
            last_modified: None,
            fetched_at: 0,
        }
    }

    #[test]
    fn entries_are_keyed_by_url_hash() {
        let dir = Path::new("/cache");
        let a = entry_path(dir, "https://example.test/a");
        let b = entry_path(dir, "https://example.test/b");
        assert_ne!(a, b);
        assert_eq!(a, entry_path(dir, "https://example.test/a"));
        let name = a.file_name().unwrap().to_str().unwrap();
        assert_eq!(name.len(), 64 + ".json".len());
    }

    #[test]
    fn stored_entry_loads_back_for_same_url_only() {
        let dir = scratch_dir("store");
        let url = "https://example.test/games.json";
        store_entry(&dir, &entry(url)).unwrap();

        let loaded = load_entry(&dir, url).unwrap();
        assert_eq!(loaded.body, "{\"ok\":true}");
        assert_eq!(loaded.etag.as_deref(), Some("\"abc\""));
        assert!(load_entry(&dir, "https://example.test/other.json").is_none());

        let _ = fs::remove_dir_all(&dir);
    }
}
