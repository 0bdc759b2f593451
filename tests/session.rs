use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

use gridiron_terminal::api::{
    parse_matchup_json, parse_position_stats_json, parse_roster_json, parse_schedule_json,
    parse_team_stats_json, StatsSource,
};
use gridiron_terminal::error::FetchError;
use gridiron_terminal::model::{
    GamesPayload, MatchupPayload, PositionStatsPayload, RosterPayload, SchedulePayload, Side,
    StatComparisonPayload, TeamStatsPayload,
};
use gridiron_terminal::session::{
    Completion, FetchCall, RawPayload, Subject, ViewData, ViewKind, ViewSession, ViewStatus,
};
use gridiron_terminal::sortable::SortDirection;

fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

fn team_stats() -> RawPayload {
    let raw = read_fixture("team_stats_object.json");
    RawPayload::TeamStats(parse_team_stats_json(&raw).expect("fixture should parse"))
}

fn schedule() -> RawPayload {
    let raw = read_fixture("schedule.json");
    RawPayload::Schedule(parse_schedule_json(&raw).expect("fixture should parse"))
}

fn roster() -> RawPayload {
    let raw = read_fixture("roster.json");
    RawPayload::Roster(parse_roster_json(&raw).expect("fixture should parse"))
}

fn position_stats() -> RawPayload {
    let raw = read_fixture("position_stats.json");
    RawPayload::PositionStats(parse_position_stats_json(&raw).expect("fixture should parse"))
}

fn matchup() -> RawPayload {
    let raw = read_fixture("matchup.json");
    RawPayload::Matchup(parse_matchup_json(&raw).expect("fixture should parse"))
}

/// Records every call and answers with empty payloads.
#[derive(Default)]
struct ScriptedSource {
    calls: Mutex<Vec<String>>,
    fail_with: Option<FetchError>,
}

impl ScriptedSource {
    fn record(&self, call: String) -> Result<(), FetchError> {
        self.calls.lock().expect("calls lock").push(call);
        match &self.fail_with {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("calls lock").clone()
    }
}

impl StatsSource for ScriptedSource {
    fn fetch_games(&self, week: Option<u32>) -> Result<GamesPayload, FetchError> {
        self.record(format!("games:{week:?}"))?;
        Ok(GamesPayload::default())
    }

    fn fetch_matchup(&self, event_id: &str) -> Result<MatchupPayload, FetchError> {
        self.record(format!("matchup:{event_id}"))?;
        Ok(MatchupPayload::default())
    }

    fn fetch_roster(&self, team_id: u32) -> Result<RosterPayload, FetchError> {
        self.record(format!("roster:{team_id}"))?;
        Ok(RosterPayload::default())
    }

    fn fetch_team_stats(&self, team_id: u32, season: &str) -> Result<TeamStatsPayload, FetchError> {
        self.record(format!("stats:{team_id}:{season}"))?;
        Ok(TeamStatsPayload::default())
    }

    fn fetch_schedule(&self, team_id: u32) -> Result<SchedulePayload, FetchError> {
        self.record(format!("schedule:{team_id}"))?;
        Ok(SchedulePayload::default())
    }

    fn fetch_position_stats(
        &self,
        position: &str,
        season: &str,
    ) -> Result<PositionStatsPayload, FetchError> {
        self.record(format!("position:{position}:{season}"))?;
        Ok(PositionStatsPayload::default())
    }

    fn fetch_stat_comparison(&self, stat_name: &str) -> Result<StatComparisonPayload, FetchError> {
        self.record(format!("comparison:{stat_name}"))?;
        Ok(StatComparisonPayload::default())
    }
}

#[test]
fn team_page_mounts_on_schedule() {
    let mut session = ViewSession::new(Subject::Team(12), "2025", None);
    assert!(matches!(session.active_status(), ViewStatus::Idle));
    let req = session.mount().expect("schedule fetch");
    assert_eq!(req.call, FetchCall::Schedule { team_id: 12 });
    assert_eq!(req.key.season, None);
    assert!(matches!(session.active_status(), ViewStatus::Loading));
}

#[test]
fn each_view_is_fetched_once() {
    let mut session = ViewSession::new(Subject::Team(12), "2025", None);
    let req = session.mount().expect("schedule fetch");
    assert_eq!(session.complete(req.ticket, &req.key, Ok(schedule())), Completion::Committed);

    let req = session.select_view(ViewKind::Roster).expect("roster fetch");
    assert_eq!(session.complete(req.ticket, &req.key, Ok(roster())), Completion::Committed);

    assert!(session.select_view(ViewKind::Schedule).is_none());
    assert!(session.select_view(ViewKind::Roster).is_none());
    assert_eq!(
        session.active_data().map(ViewData::row_count),
        Some(9)
    );
}

#[test]
fn season_change_refetches_scoped_view_exactly_once() {
    let mut session = ViewSession::new(Subject::Team(12), "2025", None);
    let req = session.select_view(ViewKind::TeamStats).expect("stats fetch");
    assert_eq!(
        req.call,
        FetchCall::TeamStats {
            team_id: 12,
            season: "2025".to_string()
        }
    );
    session.complete(req.ticket, &req.key, Ok(team_stats()));

    let req = session.select_season("2024").expect("refetch for new season");
    assert_eq!(req.key.season.as_deref(), Some("2024"));
    assert!(session.select_season("2024").is_none());
    assert_eq!(session.in_flight(), 1);

    session.complete(req.ticket, &req.key, Ok(team_stats()));
    assert!(matches!(session.active_status(), ViewStatus::Ready(_)));

    // Returning to a season while its view is showing always refreshes it.
    let req = session.select_season("2025").expect("refresh 2025");
    assert_eq!(req.key.season.as_deref(), Some("2025"));
    assert!(matches!(session.active_status(), ViewStatus::Loading));
}

#[test]
fn hidden_stats_keep_their_season_entry() {
    let mut session = ViewSession::new(Subject::Team(12), "2025", None);
    let req = session.select_view(ViewKind::TeamStats).expect("stats fetch");
    session.complete(req.ticket, &req.key, Ok(team_stats()));
    assert!(session.select_view(ViewKind::Roster).is_some());

    assert!(session.select_season("2024").is_none());
    assert!(session.select_season("2025").is_none());
    assert!(session.select_view(ViewKind::TeamStats).is_none());
    assert!(matches!(session.active_status(), ViewStatus::Ready(_)));
}

#[test]
fn season_change_on_unscoped_view_fetches_nothing() {
    let mut session = ViewSession::new(Subject::Team(12), "2025", None);
    let req = session.mount().expect("schedule fetch");
    session.complete(req.ticket, &req.key, Ok(schedule()));
    assert!(session.select_season("2023").is_none());
    assert!(matches!(session.active_status(), ViewStatus::Ready(_)));

    // The stats view picks up the season selected while it was hidden.
    let req = session.select_view(ViewKind::TeamStats).expect("stats fetch");
    assert_eq!(req.key.season.as_deref(), Some("2023"));
}

#[test]
fn late_answer_for_previous_season_is_discarded() {
    let mut session = ViewSession::new(Subject::Position("wide_receiver".to_string()), "2025", None);
    let first = session.mount().expect("2025 fetch");
    let second = session.select_season("2024").expect("2024 fetch");

    assert_eq!(
        session.complete(first.ticket, &first.key, Ok(position_stats())),
        Completion::Stale
    );
    assert!(matches!(session.active_status(), ViewStatus::Loading));

    assert_eq!(
        session.complete(second.ticket, &second.key, Ok(position_stats())),
        Completion::Committed
    );

    // 2025 was abandoned, not cached; returning to it fetches again.
    let again = session.select_season("2025").expect("2025 refetch");
    assert_ne!(again.ticket, first.ticket);
}

#[test]
fn superseded_ticket_on_same_key_is_stale() {
    let mut session = ViewSession::new(Subject::Team(12), "2025", None);
    let first = session.mount().expect("schedule fetch");
    session.complete(
        first.ticket,
        &first.key,
        Err(FetchError::http(502, "Bad Gateway")),
    );
    let retry = session.retry_active_view().expect("manual retry");
    assert_eq!(
        session.complete(first.ticket, &first.key, Ok(schedule())),
        Completion::Stale
    );
    assert_eq!(
        session.complete(retry.ticket, &retry.key, Ok(schedule())),
        Completion::Committed
    );
}

#[test]
fn failures_stick_until_retried() {
    let mut session = ViewSession::new(Subject::Team(99), "2025", None);
    let req = session.mount().expect("schedule fetch");
    let outcome = session.complete(
        req.ticket,
        &req.key,
        Err(FetchError::http(404, "Team with ID 99 not found")),
    );
    assert_eq!(outcome, Completion::Failed);

    match session.active_status() {
        ViewStatus::Failed(err) => {
            assert_eq!(err.status, Some(404));
            assert_eq!(err.to_string(), "API error 404: Team with ID 99 not found");
        }
        other => panic!("expected failure, got {other:?}"),
    }

    let roster_req = session.select_view(ViewKind::Roster);
    assert!(roster_req.is_some());
    assert!(session.select_view(ViewKind::Schedule).is_none());
    assert!(matches!(session.active_status(), ViewStatus::Failed(_)));

    assert!(session.retry_active_view().is_some());
    assert!(matches!(session.active_status(), ViewStatus::Loading));
    assert!(session.retry_active_view().is_none());
}

#[test]
fn highlight_is_handed_out_once_after_load() {
    let mut session = ViewSession::new(
        Subject::Position("wide_receiver".to_string()),
        "2024",
        Some("4262921".to_string()),
    );
    let req = session.mount().expect("position fetch");
    assert!(session.take_highlight().is_none());
    assert!(session.has_pending_highlight());

    session.complete(req.ticket, &req.key, Ok(position_stats()));
    let token = session.take_highlight().expect("highlight after load");
    assert_eq!(token, "4262921");
    let row = session
        .active_data()
        .and_then(|data| data.highlight_row(&token));
    assert_eq!(row, Some(1));

    assert!(session.sort("receptions"));
    assert!(session.take_highlight().is_none());
    assert!(!session.has_pending_highlight());
}

#[test]
fn sorting_applies_to_the_active_table() {
    let mut session = ViewSession::new(Subject::Position("wide_receiver".to_string()), "2024", None);
    let req = session.mount().expect("position fetch");
    session.complete(req.ticket, &req.key, Ok(position_stats()));

    let data = session.active_data().expect("loaded");
    let state = data.sort_state().expect("sortable");
    assert_eq!(state.key, "rank");
    assert_eq!(state.direction, SortDirection::Ascending);

    assert!(session.sort("receptions"));
    match session.active_data() {
        Some(ViewData::PositionStats { table, key_stats }) => {
            assert_eq!(key_stats.len(), 3);
            let ids: Vec<&str> = table.rows.iter().map(|r| r.athlete_id.as_str()).collect();
            assert_eq!(ids, vec!["4241389", "4047646", "4262921"]);
            assert_eq!(table.sort.direction, SortDirection::Descending);
        }
        other => panic!("expected position stats, got {other:?}"),
    }
}

#[test]
fn schedule_has_nothing_to_sort() {
    let mut session = ViewSession::new(Subject::Team(12), "2025", None);
    assert!(!session.sort("week"));
    let req = session.mount().expect("schedule fetch");
    session.complete(req.ticket, &req.key, Ok(schedule()));
    assert!(!session.sort("week"));
}

#[test]
fn pages_do_not_share_caches() {
    let mut first = ViewSession::new(Subject::Team(12), "2025", None);
    let mut second = ViewSession::new(Subject::Team(12), "2025", None);
    let req = first.mount().expect("first fetch");
    first.complete(req.ticket, &req.key, Ok(schedule()));
    assert!(second.mount().is_some());
}

#[test]
fn fetch_calls_hit_the_matching_endpoint() {
    let source = ScriptedSource::default();
    let mut session = ViewSession::new(Subject::Team(12), "2024", None);
    let schedule_req = session.mount().expect("schedule");
    let stats_req = session.select_view(ViewKind::TeamStats).expect("stats");
    let roster_req = session.select_view(ViewKind::Roster).expect("roster");

    for req in [&schedule_req, &stats_req, &roster_req] {
        let raw = req.call.execute(&source);
        assert_eq!(session.complete(req.ticket, &req.key, raw), Completion::Committed);
    }
    assert_eq!(
        source.calls(),
        vec!["schedule:12", "stats:12:2024", "roster:12"]
    );

    let comparison = FetchCall::StatComparison {
        stat_name: "total_points".to_string(),
    };
    assert!(matches!(
        comparison.execute(&source),
        Ok(RawPayload::StatComparison(_))
    ));
}

#[test]
fn transport_errors_surface_as_failed_views() {
    let source = ScriptedSource {
        fail_with: Some(FetchError::transport("connection refused")),
        ..ScriptedSource::default()
    };
    let mut session = ViewSession::new(Subject::StatComparison("sacks".to_string()), "2025", None);
    let req = session.mount().expect("comparison fetch");
    let raw = req.call.execute(&source);
    assert_eq!(session.complete(req.ticket, &req.key, raw), Completion::Failed);
    match session.active_status() {
        ViewStatus::Failed(err) => assert_eq!(err.status, None),
        other => panic!("expected failure, got {other:?}"),
    }
}

#[test]
fn games_board_is_fetched_once_and_ignores_seasons() {
    let source = ScriptedSource::default();
    let mut session = ViewSession::new(Subject::Week(None), "2025", None);
    let req = session.mount().expect("games fetch");
    assert_eq!(req.call, FetchCall::Games { week: None });
    assert_eq!(req.key.season, None);
    let raw = req.call.execute(&source);
    assert_eq!(session.complete(req.ticket, &req.key, raw), Completion::Committed);

    assert!(session.select_season("2024").is_none());
    assert!(session.mount().is_none());
    assert_eq!(source.calls(), vec!["games:None"]);

    let week = ViewSession::new(Subject::Week(Some(3)), "2025", None)
        .mount()
        .expect("week fetch");
    assert_eq!(week.call, FetchCall::Games { week: Some(3) });
    assert!(matches!(
        week.call.execute(&source),
        Ok(RawPayload::Games(p)) if p.games.is_empty()
    ));
    assert_eq!(source.calls(), vec!["games:None", "games:Some(3)"]);
}

#[test]
fn matchup_joins_both_teams_in_arrival_order() {
    let mut session = ViewSession::new(Subject::Matchup("401671719".to_string()), "2025", None);
    let req = session.mount().expect("matchup fetch");
    assert_eq!(
        req.call,
        FetchCall::Matchup {
            event_id: "401671719".to_string()
        }
    );
    assert_eq!(session.complete(req.ticket, &req.key, Ok(matchup())), Completion::Committed);

    match session.active_data() {
        Some(ViewData::Matchup {
            game,
            has_stats,
            table,
        }) => {
            assert_eq!(game.team_id(Side::Home), Some(12));
            assert!(*has_stats);
            assert_eq!(table.rows.len(), 3);
            assert_eq!(table.sort.key, "order");
        }
        other => panic!("expected matchup, got {other:?}"),
    }

    assert!(session.sort("away"));
    match session.active_data() {
        Some(ViewData::Matchup { table, .. }) => {
            let names: Vec<&str> = table.rows.iter().map(|r| r.stat_name.as_str()).collect();
            assert_eq!(names, vec!["rushingYards", "sacks", "totalPoints"]);
        }
        other => panic!("expected matchup, got {other:?}"),
    }
}
