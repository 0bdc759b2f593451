use criterion::{Criterion, criterion_group, criterion_main};
use indexmap::IndexMap;
use std::hint::black_box;

use gridiron_terminal::api::{parse_position_stats_json, parse_team_stats_json};
use gridiron_terminal::model::{PlayerStatRow, RosterEntry, StatRecord, StatValue};
use gridiron_terminal::positions::{group_roster, ordered_groups};
use gridiron_terminal::sortable::{SortDirection, SortState, sort_rows};
use gridiron_terminal::stat_ranker::rank_team_stats;

const POSITIONS: &[&str] = &[
    "QB", "RB", "WR", "TE", "OG", "OT", "C", "DE", "DT", "LB", "CB", "S", "PK", "P", "LS",
    "Wide Receiver", "Defensive Tackle", "Outside Linebacker", "Free Safety", "utility",
];

fn sample_roster(n: usize) -> Vec<RosterEntry> {
    (0..n)
        .map(|i| {
            serde_json::from_value(serde_json::json!({
                "athlete_id": i,
                "display_name": format!("Player {i}"),
                "position_abbreviation": POSITIONS[i % POSITIONS.len()],
            }))
            .expect("valid roster entry")
        })
        .collect()
}

fn sample_stats(n: usize) -> IndexMap<String, StatRecord> {
    (0..n)
        .map(|i| {
            // Every fifth entry repeats an earlier name.
            let name = if i % 5 == 4 {
                format!("stat_{}", i - 1)
            } else {
                format!("stat_{i}")
            };
            (
                format!("key_{i}"),
                StatRecord::named(&name, StatValue::Number(i as f64)),
            )
        })
        .collect()
}

fn sample_players(n: usize) -> Vec<PlayerStatRow> {
    (0..n)
        .map(|i| {
            serde_json::from_value(serde_json::json!({
                "athlete_id": i.to_string(),
                "name": format!("Player {i}"),
                "team": ["KC", "BUF", "BAL", "CIN"][i % 4],
                "rank": i + 1,
                "stats": {
                    "receptions": (i * 37) % 130,
                    "receiving_yards": format!("{},{:03}", (i * 7) % 2, (i * 131) % 1000),
                },
            }))
            .expect("valid player row")
        })
        .collect()
}

fn bench_group_roster(c: &mut Criterion) {
    let roster = sample_roster(90);
    c.bench_function("group_roster", |b| {
        b.iter(|| {
            let grouped = group_roster(black_box(&roster));
            black_box(ordered_groups(&grouped));
        })
    });
}

fn bench_rank_team_stats(c: &mut Criterion) {
    let stats = sample_stats(200);
    c.bench_function("rank_team_stats", |b| {
        b.iter(|| {
            let ranked = rank_team_stats(black_box(&stats));
            black_box(ranked.len());
        })
    });
}

fn bench_sort_leaderboard(c: &mut Criterion) {
    let players = sample_players(500);
    let initial = SortState::new("rank", SortDirection::Ascending);
    c.bench_function("sort_leaderboard", |b| {
        b.iter(|| {
            let (rows, state) = sort_rows(black_box(&players), "receiving_yards", &initial);
            black_box((rows.len(), state));
        })
    });
}

fn bench_fixture_parse(c: &mut Criterion) {
    c.bench_function("fixture_parse", |b| {
        b.iter(|| {
            let stats = parse_team_stats_json(black_box(TEAM_STATS_JSON)).expect("valid fixture");
            let players =
                parse_position_stats_json(black_box(POSITION_STATS_JSON)).expect("valid fixture");
            black_box((stats.stats.len(), players.players.len()));
        })
    });
}

criterion_group!(
    perf,
    bench_group_roster,
    bench_rank_team_stats,
    bench_sort_leaderboard,
    bench_fixture_parse
);
criterion_main!(perf);

static TEAM_STATS_JSON: &str = include_str!("../tests/fixtures/team_stats_object.json");
static POSITION_STATS_JSON: &str = include_str!("../tests/fixtures/position_stats.json");
