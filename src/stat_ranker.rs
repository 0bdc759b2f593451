use std::collections::HashSet;

use indexmap::IndexMap;

use crate::model::{format_stat_name, StatRecord, StatValue};
use crate::sortable::{SortValue, SortableRow};

/// Display order of team statistics. Names are matched after normalization, so the
/// table is insensitive to casing and `snake_case`/`camelCase` spelling.
pub const TEAM_STAT_PRIORITY: &[&str] = &[
    "total_points",
    "points_per_game",
    "points_allowed_per_game",
    "total_yards_per_game",
    "passing_yards_per_game",
    "rushing_yards_per_game",
    "yards_per_play",
    "opponent_yards_per_play",
    "turnover_differential",
    "third_down_conversion_pct",
    "third_down_defense_pct",
    "red_zone_efficiency_pct",
    "red_zone_defense_pct",
    "time_of_possession",
    "sacks",
    "interceptions",
    "fumbles_recovered",
    "penalties_per_game",
    "penalty_yards_per_game",
];

#[derive(Debug, Clone, PartialEq)]
pub struct RankedStat {
    pub key: String,
    pub record: StatRecord,
    /// Position in the ranked output.
    pub priority: usize,
}

impl RankedStat {
    pub fn name(&self) -> &str {
        self.record.semantic_name(&self.key)
    }
}

impl SortableRow for RankedStat {
    fn sort_value(&self, key: &str) -> SortValue {
        match key {
            "priority" => SortValue::number(self.priority as f64),
            "name" => SortValue::text(&format_stat_name(self.name())),
            "category" => SortValue::text(self.record.category.as_deref().unwrap_or_default()),
            "rank" => SortValue::number(self.record.rank.map(f64::from).unwrap_or(0.0)),
            "value" => SortValue::number(
                self.record.value.as_ref().map(StatValue::as_number).unwrap_or(0.0),
            ),
            _ => SortValue::number(0.0),
        }
    }
}

/// Comparison form of a statistic name: lowercased, with `_`, `-` and whitespace
/// word separators removed. Symbols such as `%` and `/` are significant. A name
/// made only of separators compares by its trimmed lowercase form.
pub fn normalize_stat_name(name: &str) -> String {
    let folded: String = name
        .chars()
        .filter(|c| !matches!(c, '_' | '-') && !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect();
    if folded.is_empty() {
        name.trim().to_lowercase()
    } else {
        folded
    }
}

/// Collapse duplicates (first arrival wins) and order by `priority`, with every
/// unlisted statistic appended afterwards in arrival order.
pub fn rank(stats: &IndexMap<String, StatRecord>, priority: &[&str]) -> Vec<RankedStat> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut pool: Vec<(String, RankedStat)> = Vec::with_capacity(stats.len());
    for (key, record) in stats {
        let norm = normalize_stat_name(record.semantic_name(key));
        if !seen.insert(norm.clone()) {
            continue;
        }
        pool.push((
            norm,
            RankedStat {
                key: key.clone(),
                record: record.clone(),
                priority: 0,
            },
        ));
    }

    let mut taken = vec![false; pool.len()];
    let mut out = Vec::with_capacity(pool.len());
    for name in priority {
        let wanted = normalize_stat_name(name);
        if let Some(idx) = pool
            .iter()
            .enumerate()
            .position(|(i, (norm, _))| !taken[i] && *norm == wanted)
        {
            taken[idx] = true;
            out.push(pool[idx].1.clone());
        }
    }
    out.extend(
        pool.into_iter()
            .zip(taken)
            .filter(|(_, used)| !used)
            .map(|((_, stat), _)| stat),
    );
    for (idx, stat) in out.iter_mut().enumerate() {
        stat.priority = idx;
    }
    out
}

pub fn rank_team_stats(stats: &IndexMap<String, StatRecord>) -> Vec<RankedStat> {
    rank(stats, TEAM_STAT_PRIORITY)
}
