use std::env;
use std::time::Duration;

const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";
const DEFAULT_SEASONS: &[&str] = &["2025", "2024", "2023", "2022"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub api_base_url: String,
    /// Selectable seasons, newest first. Always contains `default_season`.
    pub seasons: Vec<String>,
    pub default_season: String,
    pub request_timeout: Duration,
    pub http_cache: bool,
    /// Team page opened over the games board at startup.
    pub team_id: Option<u32>,
    /// Worker threads used by the fetch provider.
    pub fetch_parallelism: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            seasons: DEFAULT_SEASONS.iter().map(|s| s.to_string()).collect(),
            default_season: DEFAULT_SEASONS[0].to_string(),
            request_timeout: Duration::from_secs(10),
            http_cache: true,
            team_id: None,
            fetch_parallelism: 4,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; unset or blank keys fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let mut cfg = Config::default();

        if let Some(url) = get("API_BASE_URL") {
            cfg.api_base_url = url.trim_end_matches('/').to_string();
        }

        if let Some(raw) = get("SEASONS") {
            let seasons: Vec<String> = raw
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
            if !seasons.is_empty() {
                cfg.seasons = seasons;
            }
        }
        cfg.default_season = get("DEFAULT_SEASON").unwrap_or_else(|| cfg.seasons[0].clone());
        if !cfg.seasons.contains(&cfg.default_season) {
            cfg.seasons.insert(0, cfg.default_season.clone());
        }

        let timeout = get("REQUEST_TIMEOUT_SECS")
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(10)
            .clamp(1, 120);
        cfg.request_timeout = Duration::from_secs(timeout);

        if let Some(flag) = get("HTTP_CACHE") {
            cfg.http_cache = !matches!(flag.to_ascii_lowercase().as_str(), "0" | "off" | "false" | "no");
        }

        if let Some(id) = get("TEAM_ID").and_then(|v| v.parse::<u32>().ok()) {
            cfg.team_id = Some(id);
        }

        cfg.fetch_parallelism = get("FETCH_PARALLELISM")
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(4)
            .clamp(1, 16);
        cfg
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn cfg(pairs: &[(&str, &str)]) -> Config {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults_when_unset() {
        let c = cfg(&[]);
        assert_eq!(c, Config::default());
        assert_eq!(c.default_season, "2025");
    }

    #[test]
    fn unlisted_default_season_is_prepended() {
        let c = cfg(&[("SEASONS", "2024, 2023"), ("DEFAULT_SEASON", "2021")]);
        assert_eq!(c.seasons, vec!["2021", "2024", "2023"]);
        assert_eq!(c.default_season, "2021");
    }

    #[test]
    fn timeout_is_clamped_and_url_trimmed() {
        let c = cfg(&[
            ("REQUEST_TIMEOUT_SECS", "9000"),
            ("API_BASE_URL", "http://stats.local/"),
            ("HTTP_CACHE", "off"),
        ]);
        assert_eq!(c.request_timeout, Duration::from_secs(120));
        assert_eq!(c.api_base_url, "http://stats.local");
        assert!(!c.http_cache);
    }

    #[test]
    fn start_team_is_optional() {
        assert_eq!(cfg(&[]).team_id, None);
        assert_eq!(cfg(&[("TEAM_ID", "12")]).team_id, Some(12));
        assert_eq!(cfg(&[("TEAM_ID", "chiefs")]).team_id, None);
    }
}
