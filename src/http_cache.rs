use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use reqwest::blocking::{Client, Request};
use reqwest::header::{
    ACCEPT, ETAG, HeaderName, HeaderValue, IF_MODIFIED_SINCE, IF_NONE_MATCH, LAST_MODIFIED,
};
use reqwest::{StatusCode, Url};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::FetchError;

const CACHE_VERSION: u32 = 1;
const CACHE_DIR: &str = "gridiron_terminal";
const CACHE_FILE: &str = "http_cache.json";

static CACHE: Mutex<Option<HttpCacheFile>> = Mutex::new(None);

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct HttpCacheFile {
    version: u32,
    entries: HashMap<String, CacheEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CacheEntry {
    body: String,
    etag: Option<String>,
    last_modified: Option<String>,
    fetched_at: u64,
}

/// The outgoing GET for `url` plus `query`. Its final URL is the cache key.
pub fn prepare_request(
    client: &Client,
    url: Url,
    query: &[(&str, &str)],
) -> Result<Request, FetchError> {
    client
        .get(url)
        .query(query)
        .header(ACCEPT, "application/json")
        .build()
        .context("invalid request")
        .map_err(FetchError::from)
}

/// GET `url` with `query` and return the body of a 2xx response. With `revalidate`
/// set, a stored body is revalidated with its validators and reused on 304.
pub fn fetch_json(
    client: &Client,
    url: Url,
    query: &[(&str, &str)],
    revalidate: bool,
) -> Result<String, FetchError> {
    let mut req = prepare_request(client, url, query)?;
    let key = req.url().as_str().to_string();
    let cached_entry = if revalidate {
        let mut guard = CACHE.lock().expect("http cache lock poisoned");
        let cache = guard.get_or_insert_with(load_cache_file);
        cache.entries.get(&key).cloned()
    } else {
        None
    };

    if let Some(entry) = cached_entry.as_ref() {
        let validators = [
            (IF_NONE_MATCH, entry.etag.as_deref()),
            (IF_MODIFIED_SINCE, entry.last_modified.as_deref()),
        ];
        for (name, value) in validators {
            if let Some(value) = value.and_then(|v| HeaderValue::from_str(v).ok()) {
                req.headers_mut().insert(name, value);
            }
        }
    }

    let resp = client
        .execute(req)
        .context("request failed")
        .map_err(FetchError::from)?;
    let status = resp.status();
    let headers = resp.headers().clone();
    if status == StatusCode::NOT_MODIFIED {
        if let Some(entry) = cached_entry {
            return Ok(entry.body);
        }
        return Err(FetchError::http(304, "received 304 without cache body"));
    }

    let body = resp
        .text()
        .context("failed reading body")
        .map_err(FetchError::from)?;
    if !status.is_success() {
        return Err(FetchError::http(status.as_u16(), error_message(&body, status)));
    }

    if revalidate {
        let header = |name: HeaderName| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(|v| v.to_string())
        };
        let entry = CacheEntry {
            body: body.clone(),
            etag: header(ETAG),
            last_modified: header(LAST_MODIFIED),
            fetched_at: system_time_to_secs(SystemTime::now()).unwrap_or_default(),
        };
        if entry.etag.is_some() || entry.last_modified.is_some() {
            store_cache_entry(&key, entry);
        }
    }
    Ok(body)
}

/// The stats service reports failures as `{"error": ..., "message": ...}`.
fn error_message(body: &str, status: StatusCode) -> String {
    let parsed = serde_json::from_str::<Value>(body).ok();
    let field = |name: &str| {
        parsed
            .as_ref()
            .and_then(|v| v.get(name))
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
    };
    field("error")
        .or_else(|| field("message"))
        .or_else(|| {
            let trimmed = body.trim();
            (!trimmed.is_empty()).then(|| trimmed.chars().take(200).collect())
        })
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("error").to_string())
}

fn store_cache_entry(key: &str, entry: CacheEntry) {
    let mut guard = CACHE.lock().expect("http cache lock poisoned");
    let cache = guard.get_or_insert_with(load_cache_file);
    cache.version = CACHE_VERSION;
    cache.entries.insert(key.to_string(), entry);
    let _ = save_cache_file(cache);
}

fn load_cache_file() -> HttpCacheFile {
    let Some(path) = cache_path() else {
        return HttpCacheFile::default();
    };
    let Ok(raw) = fs::read_to_string(path) else {
        return HttpCacheFile::default();
    };
    let cache = serde_json::from_str::<HttpCacheFile>(&raw).unwrap_or_default();
    if cache.version != CACHE_VERSION {
        return HttpCacheFile::default();
    }
    cache
}

fn save_cache_file(cache: &HttpCacheFile) -> Result<()> {
    let Some(path) = cache_path() else {
        return Ok(());
    };
    let Some(dir) = path.parent() else {
        return Ok(());
    };
    fs::create_dir_all(dir).ok();
    let tmp = path.with_extension("json.tmp");
    let json = serde_json::to_string(cache).context("serialize http cache")?;
    fs::write(&tmp, json).context("write http cache")?;
    fs::rename(&tmp, &path).context("swap http cache")?;
    Ok(())
}

fn cache_path() -> Option<PathBuf> {
    if let Ok(base) = std::env::var("XDG_CACHE_HOME") {
        if !base.trim().is_empty() {
            return Some(PathBuf::from(base).join(CACHE_DIR).join(CACHE_FILE));
        }
    }
    let home = std::env::var("HOME").ok()?;
    if home.trim().is_empty() {
        return None;
    }
    Some(PathBuf::from(home).join(".cache").join(CACHE_DIR).join(CACHE_FILE))
}

fn system_time_to_secs(time: SystemTime) -> Option<u64> {
    time.duration_since(UNIX_EPOCH).ok().map(|d| d.as_secs())
}
