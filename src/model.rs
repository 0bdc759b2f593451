use chrono::{DateTime, Local};
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::positions::{classify, PositionGroup};
use crate::sortable::{SortValue, SortableRow};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RosterEntry {
    #[serde(deserialize_with = "de::id")]
    pub athlete_id: String,
    #[serde(default, deserialize_with = "de::opt_text")]
    pub display_name: Option<String>,
    #[serde(default, deserialize_with = "de::opt_text")]
    pub first_name: Option<String>,
    #[serde(default, deserialize_with = "de::opt_text")]
    pub last_name: Option<String>,
    #[serde(default, deserialize_with = "de::opt_text")]
    pub position: Option<String>,
    #[serde(default, deserialize_with = "de::opt_text")]
    pub position_abbreviation: Option<String>,
    #[serde(default, deserialize_with = "de::opt_text")]
    pub jersey: Option<String>,
    #[serde(default, deserialize_with = "de::opt_text")]
    pub age: Option<String>,
    #[serde(default, deserialize_with = "de::opt_text")]
    pub height: Option<String>,
    #[serde(default, deserialize_with = "de::opt_text")]
    pub weight: Option<String>,
}

impl RosterEntry {
    pub fn name(&self) -> String {
        if let Some(name) = self.display_name.as_deref() {
            return name.to_string();
        }
        match (self.first_name.as_deref(), self.last_name.as_deref()) {
            (Some(first), Some(last)) => format!("{first} {last}"),
            (Some(only), None) | (None, Some(only)) => only.to_string(),
            (None, None) => match self.jersey.as_deref() {
                Some(jersey) => format!("Player #{jersey}"),
                None => "Unknown Player".to_string(),
            },
        }
    }

    /// Abbreviation wins over the verbose position when both are present.
    pub fn position_code(&self) -> Option<&str> {
        self.position_abbreviation
            .as_deref()
            .or(self.position.as_deref())
    }

    pub fn position_group(&self) -> PositionGroup {
        classify(self.position_code())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameEntry {
    #[serde(deserialize_with = "de::id")]
    pub event_id: String,
    #[serde(default, deserialize_with = "de::opt_text")]
    pub game_datetime: Option<String>,
    #[serde(default)]
    pub week_num: Option<u32>,
    #[serde(default)]
    pub is_home: bool,
    #[serde(default, deserialize_with = "de::opt_text")]
    pub opponent: Option<String>,
    #[serde(default)]
    pub opponent_id: Option<u32>,
    #[serde(default, deserialize_with = "de::opt_text")]
    pub opponent_record: Option<String>,
    #[serde(default, deserialize_with = "de::opt_text")]
    pub odds: Option<String>,
}

impl GameEntry {
    pub fn opponent_name(&self) -> &str {
        self.opponent.as_deref().unwrap_or("TBD")
    }

    pub fn kickoff_label(&self) -> String {
        kickoff_label(self.game_datetime.as_deref())
    }
}

/// Kickoff in local time, e.g. `Sun, Sep 7 1:00 PM`. Unparseable timestamps are
/// shown as received.
fn kickoff_label(raw: Option<&str>) -> String {
    let Some(raw) = raw else {
        return "TBD".to_string();
    };
    match DateTime::parse_from_rfc3339(raw) {
        Ok(dt) => dt
            .with_timezone(&Local)
            .format("%a, %b %-d %-I:%M %p")
            .to_string(),
        Err(_) => raw.to_string(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Away,
    Home,
}

impl Side {
    pub fn label(self) -> &'static str {
        match self {
            Side::Away => "Away",
            Side::Home => "Home",
        }
    }
}

/// A game on the weekly board. Matchups carry the same header fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GameSummary {
    #[serde(deserialize_with = "de::id")]
    pub event_id: String,
    #[serde(default, deserialize_with = "de::opt_text")]
    pub short_name: Option<String>,
    #[serde(default, deserialize_with = "de::opt_text")]
    pub game_datetime: Option<String>,
    #[serde(default)]
    pub week_num: Option<u32>,
    #[serde(default, deserialize_with = "de::opt_text")]
    pub home_team: Option<String>,
    #[serde(default)]
    pub home_team_id: Option<u32>,
    #[serde(default, deserialize_with = "de::opt_text")]
    pub home_team_record: Option<String>,
    #[serde(default, deserialize_with = "de::opt_text")]
    pub away_team: Option<String>,
    #[serde(default)]
    pub away_team_id: Option<u32>,
    #[serde(default, deserialize_with = "de::opt_text")]
    pub away_team_record: Option<String>,
    #[serde(default, deserialize_with = "de::opt_text")]
    pub odds: Option<String>,
    #[serde(default, deserialize_with = "de::opt_text")]
    pub home_win_prob: Option<String>,
    #[serde(default, deserialize_with = "de::opt_text")]
    pub away_win_prob: Option<String>,
    #[serde(default, deserialize_with = "de::opt_text")]
    pub odds_last_updated: Option<String>,
}

impl GameSummary {
    pub fn team_name(&self, side: Side) -> &str {
        let name = match side {
            Side::Away => self.away_team.as_deref(),
            Side::Home => self.home_team.as_deref(),
        };
        name.unwrap_or("TBD")
    }

    pub fn team_id(&self, side: Side) -> Option<u32> {
        match side {
            Side::Away => self.away_team_id,
            Side::Home => self.home_team_id,
        }
    }

    pub fn team_record(&self, side: Side) -> &str {
        let record = match side {
            Side::Away => self.away_team_record.as_deref(),
            Side::Home => self.home_team_record.as_deref(),
        };
        record.unwrap_or("0-0")
    }

    /// `62%`, or `-` while the service reports no prediction.
    pub fn win_prob_label(&self, side: Side) -> String {
        let raw = match side {
            Side::Away => self.away_win_prob.as_deref(),
            Side::Home => self.home_win_prob.as_deref(),
        };
        match raw.and_then(|v| v.parse::<f64>().ok()) {
            Some(prob) => format!("{prob:.0}%"),
            None => "-".to_string(),
        }
    }

    pub fn odds_label(&self) -> &str {
        self.odds.as_deref().filter(|o| *o != "N/A").unwrap_or("")
    }

    pub fn title(&self) -> String {
        match self.short_name.as_deref() {
            Some(name) => name.to_string(),
            None => format!("{} @ {}", self.team_name(Side::Away), self.team_name(Side::Home)),
        }
    }

    pub fn kickoff_label(&self) -> String {
        kickoff_label(self.game_datetime.as_deref())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeekInfo {
    #[serde(default, deserialize_with = "de::opt_text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "de::opt_text")]
    pub details: Option<String>,
    #[serde(default)]
    pub week_num: Option<u32>,
    #[serde(default, deserialize_with = "de::opt_text")]
    pub season: Option<String>,
    #[serde(default, deserialize_with = "de::opt_text")]
    pub season_type_name: Option<String>,
}

impl WeekInfo {
    pub fn label(&self) -> String {
        match (self.name.as_deref(), self.week_num) {
            (Some(name), _) => name.to_string(),
            (None, Some(num)) => format!("Week {num}"),
            (None, None) => "Unknown week".to_string(),
        }
    }
}

/// One team statistic row inside a matchup.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchupStat {
    #[serde(default, deserialize_with = "de::opt_text")]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "de::opt_text")]
    pub stat_name: Option<String>,
    #[serde(default)]
    pub value: Option<f64>,
    #[serde(default)]
    pub rank: Option<u32>,
    #[serde(default, deserialize_with = "de::opt_text")]
    pub display_rank: Option<String>,
    #[serde(default, deserialize_with = "de::opt_text")]
    pub description: Option<String>,
}

impl MatchupStat {
    pub fn value_label(&self) -> String {
        self.value
            .map(|v| StatValue::Number(v).display())
            .unwrap_or_else(|| "-".to_string())
    }

    pub fn rank_label(&self) -> String {
        self.display_rank
            .clone()
            .or_else(|| self.rank.map(|r| format!("#{r}")))
            .unwrap_or_default()
    }
}

/// Both teams' values of one statistic, joined on (category, name).
#[derive(Debug, Clone, PartialEq)]
pub struct MatchupRow {
    /// Arrival position: away statistics first, then home-only ones.
    pub order: usize,
    pub category: Option<String>,
    pub stat_name: String,
    pub away: Option<MatchupStat>,
    pub home: Option<MatchupStat>,
}

impl MatchupRow {
    /// Rows without a statistic name are skipped; a repeated (category, name) pair
    /// keeps its first value per side.
    pub fn join(away: &[MatchupStat], home: &[MatchupStat]) -> Vec<MatchupRow> {
        let mut rows: IndexMap<(Option<String>, String), MatchupRow> = IndexMap::new();
        let sides = [(Side::Away, away), (Side::Home, home)];
        for (side, stats) in sides {
            for stat in stats {
                let Some(name) = stat.stat_name.clone() else {
                    continue;
                };
                let key = (stat.category.clone(), name.clone());
                let order = rows.len();
                let row = rows.entry(key).or_insert_with(|| MatchupRow {
                    order,
                    category: stat.category.clone(),
                    stat_name: name,
                    away: None,
                    home: None,
                });
                let slot = match side {
                    Side::Away => &mut row.away,
                    Side::Home => &mut row.home,
                };
                slot.get_or_insert_with(|| stat.clone());
            }
        }
        rows.into_values().collect()
    }

    pub fn side(&self, side: Side) -> Option<&MatchupStat> {
        match side {
            Side::Away => self.away.as_ref(),
            Side::Home => self.home.as_ref(),
        }
    }
}

impl SortableRow for MatchupRow {
    fn sort_value(&self, key: &str) -> SortValue {
        let value = |side: Side| self.side(side).and_then(|s| s.value).unwrap_or(0.0);
        match key {
            "order" => SortValue::number(self.order as f64),
            "stat" => SortValue::text(&format_stat_name(&self.stat_name)),
            "category" => SortValue::text(self.category.as_deref().unwrap_or_default()),
            "away" => SortValue::number(value(Side::Away)),
            "home" => SortValue::number(value(Side::Home)),
            _ => SortValue::number(0.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerStatRow {
    #[serde(deserialize_with = "de::id")]
    pub athlete_id: String,
    #[serde(default, deserialize_with = "de::opt_text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "de::opt_text")]
    pub display_name: Option<String>,
    #[serde(default, deserialize_with = "de::opt_text")]
    pub team: Option<String>,
    #[serde(default)]
    pub team_id: Option<u32>,
    #[serde(default, deserialize_with = "de::opt_text")]
    pub jersey: Option<String>,
    #[serde(default)]
    pub rank: Option<u32>,
    #[serde(default)]
    pub stats: IndexMap<String, Value>,
}

impl PlayerStatRow {
    pub fn player_name(&self) -> &str {
        self.name
            .as_deref()
            .or(self.display_name.as_deref())
            .unwrap_or("Unknown Player")
    }

    pub fn team_name(&self) -> &str {
        self.team.as_deref().unwrap_or("FA")
    }

    pub fn stat(&self, key: &str) -> Option<&Value> {
        self.stats.get(key)
    }
}

impl SortableRow for PlayerStatRow {
    fn sort_value(&self, key: &str) -> SortValue {
        match key {
            "rank" => SortValue::number(self.rank.map(f64::from).unwrap_or(0.0)),
            "name" => SortValue::text(self.player_name()),
            "team" => SortValue::text(self.team_name()),
            "jersey" => SortValue::number(self.jersey.as_deref().map(parse_number).unwrap_or(0.0)),
            stat => SortValue::number(json_number(self.stat(stat))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamStatRow {
    pub team_id: u32,
    #[serde(default, deserialize_with = "de::opt_text")]
    pub team_name: Option<String>,
    #[serde(default, deserialize_with = "de::opt_text")]
    pub short_name: Option<String>,
    #[serde(default, alias = "rank")]
    pub display_rank: Option<u32>,
    #[serde(default)]
    pub value: Value,
}

impl TeamStatRow {
    pub fn name(&self) -> &str {
        self.team_name
            .as_deref()
            .or(self.short_name.as_deref())
            .unwrap_or("Unknown Team")
    }
}

impl SortableRow for TeamStatRow {
    fn sort_value(&self, key: &str) -> SortValue {
        match key {
            "rank" => SortValue::number(self.display_rank.map(f64::from).unwrap_or(0.0)),
            "team" => SortValue::text(self.name()),
            "value" => SortValue::number(json_number(Some(&self.value))),
            _ => SortValue::number(0.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StatValue {
    Number(f64),
    Text(String),
}

impl StatValue {
    pub fn from_json(v: &Value) -> Option<Self> {
        match v {
            Value::Number(n) => n.as_f64().map(StatValue::Number),
            Value::String(s) => Some(StatValue::Text(s.clone())),
            Value::Bool(b) => Some(StatValue::Text(b.to_string())),
            _ => None,
        }
    }

    pub fn as_number(&self) -> f64 {
        match self {
            StatValue::Number(n) if n.is_finite() => *n,
            StatValue::Number(_) => 0.0,
            StatValue::Text(s) => parse_number(s),
        }
    }

    pub fn display(&self) -> String {
        match self {
            StatValue::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => format!("{n:.0}"),
            StatValue::Number(n) => format!("{n:.1}"),
            StatValue::Text(s) => s.clone(),
        }
    }
}

/// One team statistic as delivered upstream. `name` is the semantic name; when absent
/// the key it arrived under stands in for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatRecord {
    pub name: Option<String>,
    pub category: Option<String>,
    pub value: Option<StatValue>,
    pub rank: Option<u32>,
}

impl StatRecord {
    pub fn scalar(value: StatValue) -> Self {
        Self {
            name: None,
            category: None,
            value: Some(value),
            rank: None,
        }
    }

    pub fn named(name: &str, value: StatValue) -> Self {
        Self {
            name: Some(name.to_string()),
            ..Self::scalar(value)
        }
    }

    pub fn semantic_name<'a>(&'a self, key: &'a str) -> &'a str {
        self.name.as_deref().filter(|n| !n.trim().is_empty()).unwrap_or(key)
    }

    pub fn display_value(&self) -> String {
        self.value
            .as_ref()
            .map(StatValue::display)
            .unwrap_or_else(|| "-".to_string())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GamesPayload {
    #[serde(default, deserialize_with = "de::lenient_vec")]
    pub games: Vec<GameSummary>,
    #[serde(default, deserialize_with = "de::lenient_vec")]
    pub weeks: Vec<WeekInfo>,
    #[serde(default)]
    pub current_week: Option<WeekInfo>,
    #[serde(default)]
    pub total_games: usize,
    #[serde(default)]
    pub week_requested: Option<u32>,
}

impl GamesPayload {
    /// Week the board shows: the service's `current_week`, else the first listed.
    pub fn shown_week(&self) -> Option<&WeekInfo> {
        self.current_week.as_ref().or(self.weeks.first())
    }

    /// Week `step` places away from the shown one in the picker list.
    pub fn step_week(&self, step: isize) -> Option<&WeekInfo> {
        self.week_after(self.shown_week()?.week_num?, step)
    }

    /// Week `step` places away from `week_num` in the picker list, clamped to its
    /// ends.
    pub fn week_after(&self, week_num: u32, step: isize) -> Option<&WeekInfo> {
        let idx = self
            .weeks
            .iter()
            .position(|w| w.week_num == Some(week_num))?;
        let last = self.weeks.len() - 1;
        self.weeks.get(idx.saturating_add_signed(step).min(last))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchupPayload {
    #[serde(flatten)]
    pub game: GameSummary,
    #[serde(default, deserialize_with = "de::lenient_vec")]
    pub home_stats: Vec<MatchupStat>,
    #[serde(default, deserialize_with = "de::lenient_vec")]
    pub away_stats: Vec<MatchupStat>,
    #[serde(default)]
    pub has_stats: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RosterPayload {
    #[serde(default, deserialize_with = "de::lenient_vec")]
    pub roster: Vec<RosterEntry>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TeamStatsPayload {
    pub stats: IndexMap<String, StatRecord>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchedulePayload {
    #[serde(default)]
    pub team: String,
    #[serde(default, deserialize_with = "de::lenient_vec")]
    pub schedule: Vec<GameEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PositionStatsPayload {
    #[serde(default, deserialize_with = "de::lenient_vec")]
    pub players: Vec<PlayerStatRow>,
    #[serde(default)]
    pub key_stats: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatComparisonPayload {
    #[serde(default, deserialize_with = "de::lenient_vec")]
    pub teams: Vec<TeamStatRow>,
    #[serde(default)]
    pub stat_name: String,
    #[serde(default, deserialize_with = "de::opt_text")]
    pub season: Option<String>,
    #[serde(default)]
    pub total_teams: usize,
}

/// Lenient float parse: trims, drops thousands separators and a trailing `%`.
/// Anything unparseable (or non-finite) is 0.
pub fn parse_number(raw: &str) -> f64 {
    let s = raw.trim().trim_end_matches('%').replace(',', "");
    match s.parse::<f64>() {
        Ok(v) if v.is_finite() => v,
        _ => 0.0,
    }
}

pub fn json_number(v: Option<&Value>) -> f64 {
    match v {
        Some(Value::Number(n)) => n.as_f64().filter(|x| x.is_finite()).unwrap_or(0.0),
        Some(Value::String(s)) => parse_number(s),
        _ => 0.0,
    }
}

pub fn json_display(v: Option<&Value>) -> String {
    v.and_then(StatValue::from_json)
        .map(|s| s.display())
        .unwrap_or_else(|| "0".to_string())
}

/// `points_per_game` / `totalPoints` -> `Points Per Game` / `Total Points`.
pub fn format_stat_name(raw: &str) -> String {
    let mut words: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut prev_lower = false;
    for c in raw.chars() {
        if c == '_' || c == '-' || c.is_whitespace() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            prev_lower = false;
            continue;
        }
        if c.is_uppercase() && prev_lower && !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }
        prev_lower = c.is_lowercase() || c.is_ascii_digit();
        current.push(c);
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
        .iter()
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

mod de {
    use super::*;

    pub fn id<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
        let v = Value::deserialize(d)?;
        text(&v).ok_or_else(|| serde::de::Error::custom("expected string or number id"))
    }

    pub fn opt_text<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        let v = Option::<Value>::deserialize(d)?;
        Ok(v.as_ref().and_then(text))
    }

    /// Rows that fail to decode are dropped instead of failing the whole payload.
    pub fn lenient_vec<'de, D, T>(d: D) -> Result<Vec<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: serde::de::DeserializeOwned,
    {
        let items = Option::<Vec<Value>>::deserialize(d)?.unwrap_or_default();
        Ok(items
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect())
    }

    fn text(v: &Value) -> Option<String> {
        match v {
            Value::String(s) => {
                let s = s.trim();
                (!s.is_empty()).then(|| s.to_string())
            }
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(json: &str) -> RosterEntry {
        serde_json::from_str(json).expect("roster entry should parse")
    }

    #[test]
    fn roster_name_resolution_order() {
        assert_eq!(
            entry(r#"{"athlete_id":1,"display_name":"Pat Doe","first_name":"P"}"#).name(),
            "Pat Doe"
        );
        assert_eq!(
            entry(r#"{"athlete_id":1,"first_name":"Pat","last_name":"Doe"}"#).name(),
            "Pat Doe"
        );
        assert_eq!(entry(r#"{"athlete_id":1,"last_name":"Doe"}"#).name(), "Doe");
        assert_eq!(entry(r#"{"athlete_id":1,"jersey":12}"#).name(), "Player #12");
        assert_eq!(
            entry(r#"{"athlete_id":"a1","display_name":"  "}"#).name(),
            "Unknown Player"
        );
    }

    #[test]
    fn abbreviation_preferred_for_classification() {
        let e = entry(r#"{"athlete_id":1,"position":"Safety","position_abbreviation":"LB"}"#);
        assert_eq!(e.position_group(), PositionGroup::Linebacker);
        let e = entry(r#"{"athlete_id":1,"position":"Safety","position_abbreviation":""}"#);
        assert_eq!(e.position_group(), PositionGroup::DefensiveBack);
    }

    #[test]
    fn numbers_default_to_zero() {
        assert_eq!(parse_number("42.5"), 42.5);
        assert_eq!(parse_number("1,204"), 1204.0);
        assert_eq!(parse_number("63.1%"), 63.1);
        assert_eq!(parse_number("31:15"), 0.0);
        assert_eq!(parse_number(""), 0.0);
        assert_eq!(parse_number("NaN"), 0.0);
        assert_eq!(json_number(None), 0.0);
        assert_eq!(json_number(Some(&Value::Null)), 0.0);
    }

    #[test]
    fn kickoff_label_falls_back() {
        let game: GameEntry = serde_json::from_str(r#"{"event_id":7}"#).expect("game should parse");
        assert_eq!(game.kickoff_label(), "TBD");
        let game: GameEntry = serde_json::from_str(r#"{"event_id":7,"game_datetime":"Week 3"}"#)
            .expect("game should parse");
        assert_eq!(game.kickoff_label(), "Week 3");
        let game: GameEntry =
            serde_json::from_str(r#"{"event_id":7,"game_datetime":"2024-09-08T17:00:00Z"}"#)
                .expect("game should parse");
        let label = game.kickoff_label();
        assert!(label.ends_with("AM") || label.ends_with("PM"), "{label}");
    }

    #[test]
    fn matchup_rows_join_both_sides() {
        let stat = |category: &str, name: &str, value: f64| MatchupStat {
            category: Some(category.to_string()),
            stat_name: Some(name.to_string()),
            value: Some(value),
            ..MatchupStat::default()
        };
        let away = [stat("scoring", "totalPoints", 385.0), stat("defense", "sacks", 41.0)];
        let home = [
            stat("defense", "sacks", 37.0),
            stat("defense", "sacks", 99.0),
            stat("passing", "completions", 402.0),
            MatchupStat::default(),
        ];
        let rows = MatchupRow::join(&away, &home);
        let names: Vec<&str> = rows.iter().map(|r| r.stat_name.as_str()).collect();
        assert_eq!(names, vec!["totalPoints", "sacks", "completions"]);
        assert!(rows[0].home.is_none());
        assert_eq!(rows[1].side(Side::Home).and_then(|s| s.value), Some(37.0));
        assert_eq!(rows[2].order, 2);
        assert!(rows[2].away.is_none());
    }

    #[test]
    fn win_probability_needs_a_number() {
        let game: GameSummary = serde_json::from_str(
            r#"{"event_id":1,"home_win_prob":62,"away_win_prob":"N/A","odds":"N/A"}"#,
        )
        .expect("game should parse");
        assert_eq!(game.win_prob_label(Side::Home), "62%");
        assert_eq!(game.win_prob_label(Side::Away), "-");
        assert_eq!(game.odds_label(), "");
        assert_eq!(game.team_name(Side::Away), "TBD");
        assert_eq!(game.team_record(Side::Home), "0-0");
        assert_eq!(game.title(), "TBD @ TBD");
    }

    #[test]
    fn stat_names_are_title_cased() {
        assert_eq!(format_stat_name("points_per_game"), "Points Per Game");
        assert_eq!(format_stat_name("totalPoints"), "Total Points");
        assert_eq!(format_stat_name("rec_tds"), "Rec Tds");
    }
}
