use std::collections::{HashMap, VecDeque};

use crate::config::Config;
use crate::error::FetchError;
use crate::model::{format_stat_name, GamesPayload, Side};
use crate::session::{
    CacheKey, Completion, FetchRequest, RawPayload, Subject, ViewData, ViewKind, ViewSession,
    ViewStatus,
};

const MAX_LOGS: usize = 200;

/// One entry of the navigation stack. Each page owns its own session, so two pages
/// for the same subject never share cached data.
#[derive(Debug, Clone)]
pub struct Page {
    pub id: u64,
    pub session: ViewSession,
    pub selected: usize,
    /// Row id the page was opened for; stays marked after the cursor moves on.
    pub marked: Option<String>,
    /// Sessions this page showed before switching subject (other weeks of the
    /// games board), kept so each is fetched once.
    parked: HashMap<Subject, ViewSession>,
}

impl Page {
    fn new(id: u64, session: ViewSession) -> Self {
        Self {
            id,
            session,
            selected: 0,
            marked: None,
            parked: HashMap::new(),
        }
    }

    /// Loaded names win over ids: the schedule's team name, the board's week name,
    /// the matchup's short name.
    pub fn title(&self) -> String {
        let loaded = |view: ViewKind| match self.session.status(view) {
            ViewStatus::Ready(data) => Some(data),
            _ => None,
        };
        match self.session.subject() {
            Subject::Week(week) => {
                let shown = match loaded(ViewKind::Games) {
                    Some(ViewData::Games(payload)) => payload.shown_week(),
                    _ => None,
                };
                match (shown, week) {
                    (Some(info), _) => info.label(),
                    (None, Some(num)) => format!("Week {num}"),
                    (None, None) => "This week".to_string(),
                }
            }
            Subject::Matchup(event_id) => match loaded(ViewKind::Matchup) {
                Some(ViewData::Matchup { game, .. }) => game.title(),
                _ => format!("Game {event_id}"),
            },
            Subject::Team(id) => match loaded(ViewKind::Schedule) {
                Some(ViewData::Schedule(payload)) if !payload.team.trim().is_empty() => {
                    payload.team.clone()
                }
                _ => format!("Team {id}"),
            },
            Subject::Position(slug) => format_stat_name(slug),
            Subject::StatComparison(stat) => format!("{} comparison", format_stat_name(stat)),
        }
    }

    /// Show `subject` on this page. The current session is parked and a parked
    /// session for `subject` is restored, so only unseen subjects are fetched.
    fn switch_subject(&mut self, subject: Subject) -> Option<FetchRequest> {
        if *self.session.subject() == subject {
            return None;
        }
        let season = self.session.season().to_string();
        let next = self
            .parked
            .remove(&subject)
            .unwrap_or_else(|| ViewSession::new(subject, season, None));
        let previous = std::mem::replace(&mut self.session, next);
        self.parked.insert(previous.subject().clone(), previous);
        self.selected = 0;
        self.marked = None;
        self.session.mount()
    }

    fn session_for(&mut self, subject: &Subject) -> Option<&mut ViewSession> {
        if self.session.subject() == subject {
            return Some(&mut self.session);
        }
        self.parked.get_mut(subject)
    }

    fn loaded_boards(&self) -> impl Iterator<Item = (&Subject, &GamesPayload)> {
        std::iter::once(&self.session)
            .chain(self.parked.values())
            .filter_map(|session| match session.status(ViewKind::Games) {
                ViewStatus::Ready(ViewData::Games(payload)) => Some((session.subject(), payload)),
                _ => None,
            })
    }

    /// Week number on screen, known from the subject before its board loads.
    fn shown_week_num(&self) -> Option<u32> {
        match self.session.subject() {
            Subject::Week(Some(num)) => Some(*num),
            Subject::Week(None) => match self.session.active_data() {
                Some(ViewData::Games(payload)) => payload.shown_week()?.week_num,
                _ => None,
            },
            _ => None,
        }
    }

    fn clamp_selection(&mut self) {
        let rows = self
            .session
            .active_data()
            .map(ViewData::row_count)
            .unwrap_or(0);
        self.selected = self.selected.min(rows.saturating_sub(1));
    }
}

#[derive(Debug, Clone)]
pub struct AppState {
    pub pages: Vec<Page>,
    pub seasons: Vec<String>,
    pub default_season: String,
    pub logs: VecDeque<String>,
    pub help_overlay: bool,
    next_page_id: u64,
}

#[derive(Debug, Clone)]
pub enum Delta {
    FetchFinished {
        page_id: u64,
        ticket: u64,
        key: CacheKey,
        result: Result<RawPayload, FetchError>,
    },
    Log(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderCommand {
    Fetch { page_id: u64, request: FetchRequest },
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        Self {
            pages: Vec::new(),
            seasons: config.seasons.clone(),
            default_season: config.default_season.clone(),
            logs: VecDeque::with_capacity(MAX_LOGS),
            help_overlay: false,
            next_page_id: 1,
        }
    }

    pub fn push_log(&mut self, msg: impl Into<String>) {
        self.logs.push_back(msg.into());
        while self.logs.len() > MAX_LOGS {
            self.logs.pop_front();
        }
    }

    pub fn current(&self) -> Option<&Page> {
        self.pages.last()
    }

    pub fn current_mut(&mut self) -> Option<&mut Page> {
        self.pages.last_mut()
    }

    /// Push a page for `subject` and return the fetch for its initial view. New pages
    /// inherit the season of the page they were opened from.
    pub fn open(&mut self, subject: Subject, highlight: Option<String>) -> Option<ProviderCommand> {
        let season = self
            .current()
            .map(|p| p.session.season().to_string())
            .unwrap_or_else(|| self.default_season.clone());
        let id = self.next_page_id;
        self.next_page_id += 1;
        let mut session = ViewSession::new(subject, season, highlight);
        let request = session.mount();
        self.pages.push(Page::new(id, session));
        request.map(|request| ProviderCommand::Fetch {
            page_id: id,
            request,
        })
    }

    /// Pop the current page. The root page stays.
    pub fn back(&mut self) -> bool {
        if self.pages.len() <= 1 {
            return false;
        }
        self.pages.pop();
        true
    }

    pub fn select_view(&mut self, view: ViewKind) -> Option<ProviderCommand> {
        let page = self.current_mut()?;
        if page.session.active_view() != view {
            page.selected = 0;
        }
        let request = page.session.select_view(view);
        command(page.id, request)
    }

    pub fn cycle_season(&mut self) -> Option<ProviderCommand> {
        let current = self.current()?.session.season().to_string();
        let next = next_in(&self.seasons, &current);
        let page = self.current_mut()?;
        let request = page.session.select_season(next);
        page.clamp_selection();
        command(page.id, request)
    }

    /// Week picker of the games board: move `step` weeks through the service's
    /// week list. Weeks already shown on this page are not fetched again.
    pub fn step_week(&mut self, step: isize) -> Option<ProviderCommand> {
        let page = self.current_mut()?;
        let from = page.shown_week_num()?;
        let target = page
            .loaded_boards()
            .find_map(|(_, payload)| payload.week_after(from, step))?
            .week_num?;
        if target == from {
            return None;
        }
        let subject = page
            .loaded_boards()
            .find(|(_, payload)| {
                payload
                    .shown_week()
                    .is_some_and(|w| w.week_num == Some(target))
            })
            .map(|(subject, _)| subject.clone())
            .unwrap_or(Subject::Week(Some(target)));
        let request = page.switch_subject(subject);
        command(page.id, request)
    }

    /// Open the away or home team of the selected game, or of the matchup shown.
    pub fn open_team(&mut self, side: Side) -> Option<ProviderCommand> {
        let page = self.current()?;
        let team_id = match page.session.active_data()? {
            ViewData::Games(payload) => payload.games.get(page.selected)?.team_id(side),
            ViewData::Matchup { game, .. } => game.team_id(side),
            _ => None,
        };
        let Some(team_id) = team_id else {
            self.push_log(format!("[INFO] No {} team to open", side.label().to_lowercase()));
            return None;
        };
        self.open(Subject::Team(team_id), None)
    }

    pub fn retry(&mut self) -> Option<ProviderCommand> {
        let page = self.current_mut()?;
        let request = page.session.retry_active_view();
        command(page.id, request)
    }

    pub fn sort(&mut self, key: &str) -> bool {
        self.current_mut()
            .map(|page| page.session.sort(key))
            .unwrap_or(false)
    }

    pub fn move_selection(&mut self, step: isize) {
        let Some(page) = self.current_mut() else {
            return;
        };
        let rows = page
            .session
            .active_data()
            .map(ViewData::row_count)
            .unwrap_or(0);
        if rows == 0 {
            page.selected = 0;
            return;
        }
        let next = page.selected.saturating_add_signed(step);
        page.selected = next.min(rows - 1);
    }

    /// Follow the selected row: board games open their matchup, matchup and team
    /// stats open the league comparison, roster players open their position
    /// leaderboard, schedule games and teams open the team page.
    pub fn activate_selected(&mut self) -> Option<ProviderCommand> {
        let page = self.current()?;
        let data = page.session.active_data()?;
        let selected = page.selected;
        let team_id = match page.session.subject() {
            Subject::Team(id) => Some(*id),
            _ => None,
        };

        let target = match data {
            ViewData::Games(payload) => {
                let game = payload.games.get(selected)?;
                Ok((Subject::Matchup(game.event_id.clone()), None))
            }
            ViewData::Matchup { table, .. } => {
                let row = table.rows.get(selected)?;
                Ok((Subject::StatComparison(row.stat_name.clone()), None))
            }
            ViewData::Roster(view) => {
                let rows = view.display_rows();
                let (group, entry) = rows.get(selected)?;
                match group.stats_slug() {
                    Some(slug) => Ok((
                        Subject::Position(slug.to_string()),
                        Some(entry.athlete_id.clone()),
                    )),
                    None => Err(format!("[INFO] No leaderboard for {}", group.label())),
                }
            }
            ViewData::TeamStats(table) => {
                let stat = table.rows.get(selected)?;
                Ok((
                    Subject::StatComparison(stat.key.clone()),
                    team_id.map(|id| id.to_string()),
                ))
            }
            ViewData::Schedule(payload) => {
                let id = payload.schedule.get(selected)?.opponent_id?;
                Ok((Subject::Team(id), None))
            }
            ViewData::PositionStats { table, .. } => {
                let id = table.rows.get(selected)?.team_id?;
                Ok((Subject::Team(id), None))
            }
            ViewData::StatComparison { table, .. } => {
                let row = table.rows.get(selected)?;
                Ok((Subject::Team(row.team_id), None))
            }
        };

        let (subject, highlight) = match target {
            Ok(target) => target,
            Err(msg) => {
                self.push_log(msg);
                return None;
            }
        };
        self.open(subject, highlight)
    }
}

fn command(page_id: u64, request: Option<FetchRequest>) -> Option<ProviderCommand> {
    request.map(|request| ProviderCommand::Fetch { page_id, request })
}

fn next_in(seasons: &[String], current: &str) -> String {
    match seasons.iter().position(|s| s == current) {
        Some(i) => seasons[(i + 1) % seasons.len()].clone(),
        None => seasons.first().cloned().unwrap_or_else(|| current.to_string()),
    }
}

fn season_suffix(key: &CacheKey) -> String {
    key.season
        .as_deref()
        .map(|s| format!(" ({s})"))
        .unwrap_or_default()
}

pub fn apply_delta(state: &mut AppState, delta: Delta) {
    match delta {
        Delta::FetchFinished {
            page_id,
            ticket,
            key,
            result,
        } => {
            let label = key.view.label();
            let Some(page) = state.pages.iter_mut().find(|p| p.id == page_id) else {
                state.push_log(format!("[INFO] Dropped {label} for a closed page"));
                return;
            };
            let err_text = result.as_ref().err().map(|e| e.to_string());
            let active = *page.session.subject() == key.subject;
            let completion = match page.session_for(&key.subject) {
                Some(session) => session.complete(ticket, &key, result),
                None => Completion::Stale,
            };
            let msg = match completion {
                Completion::Committed => {
                    if active {
                        if let Some(token) = page.session.take_highlight() {
                            if let Some(row) = page
                                .session
                                .active_data()
                                .and_then(|data| data.highlight_row(&token))
                            {
                                page.selected = row;
                            }
                            page.marked = Some(token);
                        }
                        page.clamp_selection();
                    }
                    format!("[INFO] Loaded {label}{}", season_suffix(&key))
                }
                Completion::Failed => format!(
                    "[WARN] {label} failed: {}",
                    err_text.unwrap_or_else(|| "unexpected payload".to_string())
                ),
                Completion::Stale => {
                    format!("[INFO] Discarded stale {label}{}", season_suffix(&key))
                }
            };
            state.push_log(msg);
        }
        Delta::Log(msg) => state.push_log(msg),
    }
}
