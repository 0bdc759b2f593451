use anyhow::{Context, Result};
use indexmap::IndexMap;
use reqwest::Url;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::config::Config;
use crate::error::FetchError;
use crate::http_cache::fetch_json;
use crate::http_client::http_client;
use crate::model::{
    GamesPayload, MatchupPayload, PositionStatsPayload, RosterPayload, SchedulePayload,
    StatComparisonPayload, StatRecord, StatValue, TeamStatsPayload,
};

/// The stats service as seen by the session engine.
pub trait StatsSource: Send + Sync {
    /// Games of `week`, or of the current week when `None`.
    fn fetch_games(&self, week: Option<u32>) -> Result<GamesPayload, FetchError>;
    fn fetch_matchup(&self, event_id: &str) -> Result<MatchupPayload, FetchError>;
    fn fetch_roster(&self, team_id: u32) -> Result<RosterPayload, FetchError>;
    fn fetch_team_stats(&self, team_id: u32, season: &str) -> Result<TeamStatsPayload, FetchError>;
    fn fetch_schedule(&self, team_id: u32) -> Result<SchedulePayload, FetchError>;
    fn fetch_position_stats(
        &self,
        position: &str,
        season: &str,
    ) -> Result<PositionStatsPayload, FetchError>;
    fn fetch_stat_comparison(&self, stat_name: &str) -> Result<StatComparisonPayload, FetchError>;
}

pub struct HttpStatsSource {
    base_url: String,
    config: Config,
}

impl HttpStatsSource {
    pub fn new(config: Config) -> Self {
        Self {
            base_url: config.api_base_url.clone(),
            config,
        }
    }

    fn get(&self, segments: &[&str], query: &[(&str, &str)]) -> Result<String, FetchError> {
        let client = http_client(self.config.request_timeout)?;
        let url = build_url(&self.base_url, segments)?;
        let query: Vec<(&str, &str)> = query
            .iter()
            .copied()
            .filter(|(_, v)| !v.is_empty())
            .collect();
        fetch_json(client, url, &query, self.config.http_cache)
    }
}

impl StatsSource for HttpStatsSource {
    fn fetch_games(&self, week: Option<u32>) -> Result<GamesPayload, FetchError> {
        let body = match week {
            Some(week) => self.get(&["games", week.to_string().as_str()], &[])?,
            None => self.get(&["games"], &[])?,
        };
        Ok(parse_games_json(&body)?)
    }

    fn fetch_matchup(&self, event_id: &str) -> Result<MatchupPayload, FetchError> {
        let body = self.get(&["matchup", event_id], &[])?;
        Ok(parse_matchup_json(&body)?)
    }

    fn fetch_roster(&self, team_id: u32) -> Result<RosterPayload, FetchError> {
        let body = self.get(&["teams", team_id.to_string().as_str(), "roster"], &[])?;
        Ok(parse_roster_json(&body)?)
    }

    fn fetch_team_stats(&self, team_id: u32, season: &str) -> Result<TeamStatsPayload, FetchError> {
        let team = team_id.to_string();
        let body = self.get(&["teams", team.as_str(), "stats"], &[("season", season)])?;
        Ok(parse_team_stats_json(&body)?)
    }

    fn fetch_schedule(&self, team_id: u32) -> Result<SchedulePayload, FetchError> {
        let body = self.get(&["team-schedule", team_id.to_string().as_str()], &[])?;
        Ok(parse_schedule_json(&body)?)
    }

    fn fetch_position_stats(
        &self,
        position: &str,
        season: &str,
    ) -> Result<PositionStatsPayload, FetchError> {
        let body = self.get(&["position", position, "stats"], &[("season", season)])?;
        Ok(parse_position_stats_json(&body)?)
    }

    fn fetch_stat_comparison(&self, stat_name: &str) -> Result<StatComparisonPayload, FetchError> {
        let body = self.get(&["team-stats", stat_name, "comparison"], &[])?;
        Ok(parse_stat_comparison_json(&body)?)
    }
}

/// Endpoint URL under `base`: each segment is percent-encoded and the path keeps
/// the service's trailing slash.
pub fn build_url(base: &str, segments: &[&str]) -> Result<Url, FetchError> {
    let mut url = Url::parse(base)
        .map_err(|err| FetchError::transport(format!("invalid base url {base}: {err}")))?;
    url.path_segments_mut()
        .map_err(|()| FetchError::transport(format!("base url {base} cannot hold a path")))?
        .pop_if_empty()
        .extend(segments)
        .push("");
    Ok(url)
}

fn parse_or_default<T: DeserializeOwned + Default>(raw: &str, what: &str) -> Result<T> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(T::default());
    }
    serde_json::from_str(trimmed).with_context(|| format!("invalid {what} json"))
}

pub fn parse_games_json(raw: &str) -> Result<GamesPayload> {
    parse_or_default(raw, "games")
}

pub fn parse_matchup_json(raw: &str) -> Result<MatchupPayload> {
    parse_or_default(raw, "matchup")
}

pub fn parse_roster_json(raw: &str) -> Result<RosterPayload> {
    parse_or_default(raw, "roster")
}

pub fn parse_schedule_json(raw: &str) -> Result<SchedulePayload> {
    parse_or_default(raw, "schedule")
}

pub fn parse_position_stats_json(raw: &str) -> Result<PositionStatsPayload> {
    parse_or_default(raw, "position stats")
}

pub fn parse_stat_comparison_json(raw: &str) -> Result<StatComparisonPayload> {
    parse_or_default(raw, "stat comparison")
}

/// Team stats arrive either as an ordered object (scalar values or record objects)
/// or as an array of record objects. Arrival order is preserved in both cases.
pub fn parse_team_stats_json(raw: &str) -> Result<TeamStatsPayload> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(TeamStatsPayload::default());
    }
    let root: Value = serde_json::from_str(trimmed).context("invalid team stats json")?;
    let mut stats: IndexMap<String, StatRecord> = IndexMap::new();
    match root.get("stats") {
        Some(Value::Object(map)) => {
            for (key, value) in map {
                if let Some(record) = parse_stat_record(value) {
                    stats.insert(key.clone(), record);
                }
            }
        }
        Some(Value::Array(items)) => {
            for (idx, value) in items.iter().enumerate() {
                let Some(record) = parse_stat_record(value) else {
                    continue;
                };
                let key = record.name.clone().unwrap_or_else(|| idx.to_string());
                // Keyed by name; a repeated name keeps its first slot.
                stats.entry(key).or_insert(record);
            }
        }
        _ => {}
    }
    Ok(TeamStatsPayload { stats })
}

fn parse_stat_record(v: &Value) -> Option<StatRecord> {
    match v {
        Value::Object(_) => {
            let value = ["value", "displayValue", "display_value"]
                .iter()
                .filter_map(|k| v.get(*k))
                .find_map(StatValue::from_json);
            let rank = v
                .get("rank")
                .and_then(|r| r.as_u64().or_else(|| r.as_str().and_then(|s| s.parse().ok())))
                .and_then(|r| u32::try_from(r).ok());
            Some(StatRecord {
                name: text_field(v, &["name", "displayName", "display_name"]),
                category: text_field(v, &["category", "categoryName"]),
                value,
                rank,
            })
        }
        Value::Null => None,
        other => StatValue::from_json(other).map(StatRecord::scalar),
    }
}

fn text_field(v: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|k| v.get(*k).and_then(|x| x.as_str()))
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(|s| s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_segments_are_encoded_with_trailing_slash() {
        let url = build_url("http://x/", &["team-stats", "total points", "comparison"])
            .expect("valid url");
        assert_eq!(url.as_str(), "http://x/team-stats/total%20points/comparison/");
        let nested = build_url("http://x/api/", &["games", "3"]).expect("valid url");
        assert_eq!(nested.as_str(), "http://x/api/games/3/");
        assert!(build_url("not a url", &["games"]).is_err());
    }

    #[test]
    fn record_objects_keep_category_and_rank() {
        let raw = r#"{"stats":{"a":{"displayName":"Sacks","category":"defense","value":"41","rank":"3"}}}"#;
        let payload = parse_team_stats_json(raw).expect("stats should parse");
        let record = &payload.stats["a"];
        assert_eq!(record.name.as_deref(), Some("Sacks"));
        assert_eq!(record.category.as_deref(), Some("defense"));
        assert_eq!(record.value, Some(StatValue::Text("41".to_string())));
        assert_eq!(record.rank, Some(3));
    }
}
