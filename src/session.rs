use std::collections::HashMap;

use crate::api::StatsSource;
use crate::error::FetchError;
use crate::model::{
    GameSummary, GamesPayload, MatchupPayload, MatchupRow, PlayerStatRow, PositionStatsPayload,
    RosterPayload, SchedulePayload, StatComparisonPayload, TeamStatRow, TeamStatsPayload,
};
use crate::positions::RosterView;
use crate::sortable::{SortDirection, SortState, SortedTable};
use crate::stat_ranker::{rank_team_stats, RankedStat};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Subject {
    /// Weekly games board; `None` is whatever week the service calls current.
    Week(Option<u32>),
    /// Game detail by event id.
    Matchup(String),
    Team(u32),
    /// Position leaderboard slug, e.g. `wide_receiver`.
    Position(String),
    StatComparison(String),
}

impl Subject {
    pub fn views(&self) -> &'static [ViewKind] {
        match self {
            Subject::Week(_) => &[ViewKind::Games],
            Subject::Matchup(_) => &[ViewKind::Matchup],
            Subject::Team(_) => &[ViewKind::Schedule, ViewKind::TeamStats, ViewKind::Roster],
            Subject::Position(_) => &[ViewKind::PositionStats],
            Subject::StatComparison(_) => &[ViewKind::StatComparison],
        }
    }

    pub fn initial_view(&self) -> ViewKind {
        self.views()[0]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewKind {
    Games,
    Matchup,
    Schedule,
    TeamStats,
    Roster,
    PositionStats,
    StatComparison,
}

impl ViewKind {
    /// Season-scoped views are cached per season and refetched on season change.
    pub fn season_scoped(self) -> bool {
        matches!(self, ViewKind::TeamStats | ViewKind::PositionStats)
    }

    pub fn label(self) -> &'static str {
        match self {
            ViewKind::Games => "Games",
            ViewKind::Matchup => "Matchup",
            ViewKind::Schedule => "Schedule",
            ViewKind::TeamStats => "Team Stats",
            ViewKind::Roster => "Roster",
            ViewKind::PositionStats => "Position Stats",
            ViewKind::StatComparison => "Comparison",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub subject: Subject,
    pub view: ViewKind,
    pub season: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchCall {
    Games { week: Option<u32> },
    Matchup { event_id: String },
    Roster { team_id: u32 },
    TeamStats { team_id: u32, season: String },
    Schedule { team_id: u32 },
    PositionStats { position: String, season: String },
    StatComparison { stat_name: String },
}

impl FetchCall {
    fn for_key(key: &CacheKey) -> Option<FetchCall> {
        let season = key.season.clone().unwrap_or_default();
        let call = match (&key.subject, key.view) {
            (Subject::Week(week), ViewKind::Games) => FetchCall::Games { week: *week },
            (Subject::Matchup(event_id), ViewKind::Matchup) => FetchCall::Matchup {
                event_id: event_id.clone(),
            },
            (Subject::Team(team_id), ViewKind::Schedule) => FetchCall::Schedule { team_id: *team_id },
            (Subject::Team(team_id), ViewKind::TeamStats) => FetchCall::TeamStats {
                team_id: *team_id,
                season,
            },
            (Subject::Team(team_id), ViewKind::Roster) => FetchCall::Roster { team_id: *team_id },
            (Subject::Position(position), ViewKind::PositionStats) => FetchCall::PositionStats {
                position: position.clone(),
                season,
            },
            (Subject::StatComparison(stat_name), ViewKind::StatComparison) => {
                FetchCall::StatComparison {
                    stat_name: stat_name.clone(),
                }
            }
            _ => return None,
        };
        Some(call)
    }

    pub fn execute(&self, source: &dyn StatsSource) -> Result<RawPayload, FetchError> {
        match self {
            FetchCall::Games { week } => source.fetch_games(*week).map(RawPayload::Games),
            FetchCall::Matchup { event_id } => {
                source.fetch_matchup(event_id).map(RawPayload::Matchup)
            }
            FetchCall::Roster { team_id } => source.fetch_roster(*team_id).map(RawPayload::Roster),
            FetchCall::TeamStats { team_id, season } => source
                .fetch_team_stats(*team_id, season)
                .map(RawPayload::TeamStats),
            FetchCall::Schedule { team_id } => {
                source.fetch_schedule(*team_id).map(RawPayload::Schedule)
            }
            FetchCall::PositionStats { position, season } => source
                .fetch_position_stats(position, season)
                .map(RawPayload::PositionStats),
            FetchCall::StatComparison { stat_name } => source
                .fetch_stat_comparison(stat_name)
                .map(RawPayload::StatComparison),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub ticket: u64,
    pub key: CacheKey,
    pub call: FetchCall,
}

#[derive(Debug, Clone)]
pub enum RawPayload {
    Games(GamesPayload),
    Matchup(MatchupPayload),
    Roster(RosterPayload),
    TeamStats(TeamStatsPayload),
    Schedule(SchedulePayload),
    PositionStats(PositionStatsPayload),
    StatComparison(StatComparisonPayload),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComparisonInfo {
    pub stat_name: String,
    pub season: Option<String>,
    pub total_teams: usize,
}

/// Shaped data handed to the renderer.
#[derive(Debug, Clone)]
pub enum ViewData {
    Games(GamesPayload),
    Matchup {
        game: GameSummary,
        has_stats: bool,
        table: SortedTable<MatchupRow>,
    },
    Schedule(SchedulePayload),
    TeamStats(SortedTable<RankedStat>),
    Roster(RosterView),
    PositionStats {
        key_stats: Vec<String>,
        table: SortedTable<PlayerStatRow>,
    },
    StatComparison {
        info: ComparisonInfo,
        table: SortedTable<TeamStatRow>,
    },
}

impl ViewData {
    fn shape(view: ViewKind, raw: RawPayload) -> Result<ViewData, FetchError> {
        let data = match (view, raw) {
            (ViewKind::Games, RawPayload::Games(p)) => ViewData::Games(p),
            (ViewKind::Matchup, RawPayload::Matchup(p)) => ViewData::Matchup {
                has_stats: p.has_stats || !p.home_stats.is_empty() || !p.away_stats.is_empty(),
                table: SortedTable::new(
                    MatchupRow::join(&p.away_stats, &p.home_stats),
                    SortState::new("order", SortDirection::Ascending),
                ),
                game: p.game,
            },
            (ViewKind::Schedule, RawPayload::Schedule(p)) => ViewData::Schedule(p),
            (ViewKind::TeamStats, RawPayload::TeamStats(p)) => ViewData::TeamStats(SortedTable::new(
                rank_team_stats(&p.stats),
                SortState::new("priority", SortDirection::Ascending),
            )),
            (ViewKind::Roster, RawPayload::Roster(p)) => ViewData::Roster(RosterView::build(&p.roster)),
            (ViewKind::PositionStats, RawPayload::PositionStats(p)) => ViewData::PositionStats {
                key_stats: p.key_stats,
                table: SortedTable::new(p.players, SortState::new("rank", SortDirection::Ascending)),
            },
            (ViewKind::StatComparison, RawPayload::StatComparison(p)) => ViewData::StatComparison {
                info: ComparisonInfo {
                    stat_name: p.stat_name,
                    season: p.season,
                    total_teams: p.total_teams,
                },
                table: SortedTable::new(p.teams, SortState::new("rank", SortDirection::Ascending)),
            },
            (view, _) => {
                return Err(FetchError::transport(format!(
                    "unexpected payload for {}",
                    view.label()
                )));
            }
        };
        Ok(data)
    }

    pub fn sort_state(&self) -> Option<&SortState> {
        match self {
            ViewData::TeamStats(table) => Some(&table.sort),
            ViewData::PositionStats { table, .. } => Some(&table.sort),
            ViewData::StatComparison { table, .. } => Some(&table.sort),
            ViewData::Matchup { table, .. } => Some(&table.sort),
            ViewData::Games(_) | ViewData::Schedule(_) | ViewData::Roster(_) => None,
        }
    }

    pub fn row_count(&self) -> usize {
        match self {
            ViewData::Games(p) => p.games.len(),
            ViewData::Matchup { table, .. } => table.rows.len(),
            ViewData::Schedule(p) => p.schedule.len(),
            ViewData::TeamStats(table) => table.rows.len(),
            ViewData::Roster(view) => view.player_count(),
            ViewData::PositionStats { table, .. } => table.rows.len(),
            ViewData::StatComparison { table, .. } => table.rows.len(),
        }
    }

    /// Row carrying the highlight token: an athlete id on leaderboards, a team id
    /// on comparisons.
    pub fn highlight_row(&self, token: &str) -> Option<usize> {
        match self {
            ViewData::PositionStats { table, .. } => {
                table.rows.iter().position(|r| r.athlete_id == token)
            }
            ViewData::StatComparison { table, .. } => table
                .rows
                .iter()
                .position(|r| r.team_id.to_string() == token),
            _ => None,
        }
    }

    fn sort(&mut self, key: &str) -> bool {
        match self {
            ViewData::TeamStats(table) => table.sort(key),
            ViewData::PositionStats { table, .. } => table.sort(key),
            ViewData::StatComparison { table, .. } => table.sort(key),
            ViewData::Matchup { table, .. } => table.sort(key),
            ViewData::Games(_) | ViewData::Schedule(_) | ViewData::Roster(_) => return false,
        }
        true
    }
}

#[derive(Debug, Clone)]
pub enum CacheEntry {
    Pending { ticket: u64 },
    Loaded(ViewData),
    Errored(FetchError),
}

#[derive(Debug, Clone, Copy)]
pub enum ViewStatus<'a> {
    /// Never requested.
    Idle,
    Loading,
    Ready(&'a ViewData),
    Failed(&'a FetchError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Committed,
    Failed,
    /// The entry moved on (season changed, page reset) before the answer came back.
    Stale,
}

/// Per-page view state: which view is active, which season is selected, and a
/// fetch-once cache of shaped view data keyed by (subject, view, season).
///
/// Transitions never perform I/O. They return the [`FetchRequest`] to run, and the
/// caller hands the result back through [`ViewSession::complete`]. Each request
/// carries a ticket; a result is committed only while its cache entry is still
/// pending on that same ticket, so late answers for a season the user already left
/// are dropped.
#[derive(Debug, Clone)]
pub struct ViewSession {
    subject: Subject,
    active_view: ViewKind,
    season: String,
    cache: HashMap<CacheKey, CacheEntry>,
    next_ticket: u64,
    highlight: Option<String>,
}

impl ViewSession {
    pub fn new(subject: Subject, season: impl Into<String>, highlight: Option<String>) -> Self {
        let active_view = subject.initial_view();
        Self {
            subject,
            active_view,
            season: season.into(),
            cache: HashMap::new(),
            next_ticket: 1,
            highlight,
        }
    }

    /// Enter the page: activates the initial view and loads it.
    pub fn mount(&mut self) -> Option<FetchRequest> {
        self.select_view(self.subject.initial_view())
    }

    pub fn subject(&self) -> &Subject {
        &self.subject
    }

    pub fn active_view(&self) -> ViewKind {
        self.active_view
    }

    pub fn season(&self) -> &str {
        &self.season
    }

    pub fn key_for(&self, view: ViewKind) -> CacheKey {
        CacheKey {
            subject: self.subject.clone(),
            view,
            season: view.season_scoped().then(|| self.season.clone()),
        }
    }

    /// Switch views. A view with no cache entry for the current key is fetched;
    /// loaded, pending and errored entries are left alone.
    pub fn select_view(&mut self, view: ViewKind) -> Option<FetchRequest> {
        if !self.subject.views().contains(&view) {
            return None;
        }
        self.active_view = view;
        let key = self.key_for(view);
        if self.cache.contains_key(&key) {
            return None;
        }
        self.issue(key)
    }

    /// Change season. Pending season-scoped fetches for other seasons are abandoned;
    /// a season-scoped active view is refetched for the new season, replacing any
    /// cached entry, unless that key is already in flight. Hidden season-scoped views
    /// keep their per-season entries.
    pub fn select_season(&mut self, season: impl Into<String>) -> Option<FetchRequest> {
        let season = season.into();
        if season == self.season {
            return None;
        }
        self.season = season;
        let current = self.season.clone();
        self.cache.retain(|key, entry| {
            let abandoned = key.view.season_scoped()
                && key.season.as_deref() != Some(current.as_str())
                && matches!(entry, CacheEntry::Pending { .. });
            !abandoned
        });

        if !self.active_view.season_scoped() {
            return None;
        }
        let key = self.key_for(self.active_view);
        if matches!(self.cache.get(&key), Some(CacheEntry::Pending { .. })) {
            return None;
        }
        self.issue(key)
    }

    /// User-requested reload of the active view. Never issued automatically.
    pub fn retry_active_view(&mut self) -> Option<FetchRequest> {
        let key = self.key_for(self.active_view);
        if matches!(self.cache.get(&key), Some(CacheEntry::Pending { .. })) {
            return None;
        }
        self.issue(key)
    }

    fn issue(&mut self, key: CacheKey) -> Option<FetchRequest> {
        let call = FetchCall::for_key(&key)?;
        let ticket = self.next_ticket;
        self.next_ticket += 1;
        self.cache.insert(key.clone(), CacheEntry::Pending { ticket });
        Some(FetchRequest { ticket, key, call })
    }

    pub fn complete(
        &mut self,
        ticket: u64,
        key: &CacheKey,
        result: Result<RawPayload, FetchError>,
    ) -> Completion {
        let Some(CacheEntry::Pending { ticket: expected }) = self.cache.get(key) else {
            return Completion::Stale;
        };
        if *expected != ticket {
            return Completion::Stale;
        }
        let shaped = result.and_then(|raw| ViewData::shape(key.view, raw));
        match shaped {
            Ok(data) => {
                self.cache.insert(key.clone(), CacheEntry::Loaded(data));
                Completion::Committed
            }
            Err(err) => {
                self.cache.insert(key.clone(), CacheEntry::Errored(err));
                Completion::Failed
            }
        }
    }

    pub fn status(&self, view: ViewKind) -> ViewStatus<'_> {
        match self.cache.get(&self.key_for(view)) {
            None => ViewStatus::Idle,
            Some(CacheEntry::Pending { .. }) => ViewStatus::Loading,
            Some(CacheEntry::Loaded(data)) => ViewStatus::Ready(data),
            Some(CacheEntry::Errored(err)) => ViewStatus::Failed(err),
        }
    }

    pub fn active_status(&self) -> ViewStatus<'_> {
        self.status(self.active_view)
    }

    pub fn active_data(&self) -> Option<&ViewData> {
        match self.active_status() {
            ViewStatus::Ready(data) => Some(data),
            _ => None,
        }
    }

    /// Re-order the active view's table. Returns false when there is nothing to sort.
    pub fn sort(&mut self, key: &str) -> bool {
        let cache_key = self.key_for(self.active_view);
        match self.cache.get_mut(&cache_key) {
            Some(CacheEntry::Loaded(data)) => data.sort(key),
            _ => false,
        }
    }

    /// Hand out the highlight token once, on the first render with data.
    pub fn take_highlight(&mut self) -> Option<String> {
        self.active_data()?;
        self.highlight.take()
    }

    pub fn has_pending_highlight(&self) -> bool {
        self.highlight.is_some()
    }

    pub fn in_flight(&self) -> usize {
        self.cache
            .values()
            .filter(|e| matches!(e, CacheEntry::Pending { .. }))
            .count()
    }
}
