use std::io;
use std::sync::{mpsc, Arc};
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Text};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use gridiron_terminal::api::HttpStatsSource;
use gridiron_terminal::config::Config;
use gridiron_terminal::model::{format_stat_name, json_display, Side};
use gridiron_terminal::positions::SuperGroup;
use gridiron_terminal::provider::spawn_provider;
use gridiron_terminal::session::{Subject, ViewData, ViewStatus};
use gridiron_terminal::state::{apply_delta, AppState, Delta, Page, ProviderCommand};

struct App {
    state: AppState,
    should_quit: bool,
    cmd_tx: mpsc::Sender<ProviderCommand>,
    column: usize,
}

impl App {
    fn new(config: &Config, cmd_tx: mpsc::Sender<ProviderCommand>) -> Self {
        let mut app = Self {
            state: AppState::new(config),
            should_quit: false,
            cmd_tx,
            column: 0,
        };
        let cmd = app.state.open(Subject::Week(None), None);
        app.dispatch(cmd);
        if let Some(team_id) = config.team_id {
            let cmd = app.state.open(Subject::Team(team_id), None);
            app.dispatch(cmd);
        }
        app
    }

    fn dispatch(&mut self, cmd: Option<ProviderCommand>) {
        let Some(cmd) = cmd else {
            return;
        };
        if self.cmd_tx.send(cmd).is_err() {
            self.state.push_log("[WARN] Fetch provider stopped");
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char(c @ '1'..='3') => {
                let views = self
                    .state
                    .current()
                    .map(|p| p.session.subject().views())
                    .unwrap_or_default();
                let idx = (c as usize) - ('1' as usize);
                if let Some(view) = views.get(idx).copied() {
                    self.column = 0;
                    let cmd = self.state.select_view(view);
                    self.dispatch(cmd);
                }
            }
            KeyCode::Char('s') => {
                let cmd = self.state.cycle_season();
                self.dispatch(cmd);
            }
            KeyCode::Char('[') => {
                let cmd = self.state.step_week(-1);
                self.dispatch(cmd);
            }
            KeyCode::Char(']') => {
                let cmd = self.state.step_week(1);
                self.dispatch(cmd);
            }
            KeyCode::Char('A') | KeyCode::Char('H') => {
                let side = if key.code == KeyCode::Char('A') {
                    Side::Away
                } else {
                    Side::Home
                };
                let cmd = self.state.open_team(side);
                if cmd.is_some() {
                    self.column = 0;
                }
                self.dispatch(cmd);
            }
            KeyCode::Char('r') => {
                let cmd = self.state.retry();
                self.dispatch(cmd);
            }
            KeyCode::Char('j') | KeyCode::Down => self.state.move_selection(1),
            KeyCode::Char('k') | KeyCode::Up => self.state.move_selection(-1),
            KeyCode::PageDown => self.state.move_selection(10),
            KeyCode::PageUp => self.state.move_selection(-10),
            KeyCode::Char('h') | KeyCode::Left => self.column = self.column.saturating_sub(1),
            KeyCode::Char('l') | KeyCode::Right => {
                let count = self.columns().len();
                self.column = (self.column + 1).min(count.saturating_sub(1));
            }
            KeyCode::Char('o') => {
                let key = self.columns().get(self.column).map(|(_, key)| key.clone());
                if let Some(key) = key {
                    self.state.sort(&key);
                }
            }
            KeyCode::Enter => {
                let cmd = self.state.activate_selected();
                if cmd.is_some() {
                    self.column = 0;
                }
                self.dispatch(cmd);
            }
            KeyCode::Char('b') | KeyCode::Esc => {
                if self.state.back() {
                    self.column = 0;
                }
            }
            KeyCode::Char('?') => self.state.help_overlay = !self.state.help_overlay,
            _ => {}
        }
    }

    fn columns(&self) -> Vec<(String, String)> {
        self.state
            .current()
            .and_then(|p| p.session.active_data())
            .map(sort_columns)
            .unwrap_or_default()
    }
}

fn main() -> io::Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    let mut config = Config::from_env();
    if let Some(id) = std::env::args().nth(1).and_then(|arg| arg.parse::<u32>().ok()) {
        config.team_id = Some(id);
    }

    let (tx, rx) = mpsc::channel();
    let (cmd_tx, cmd_rx) = mpsc::channel();
    let source = Arc::new(HttpStatsSource::new(config.clone()));
    spawn_provider(source, config.fetch_parallelism, tx, cmd_rx);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let mut app = App::new(&config, cmd_tx);
    let res = run_app(&mut terminal, &mut app, rx);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("error: {err}");
    }
    Ok(())
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    rx: mpsc::Receiver<Delta>,
) -> io::Result<()> {
    let tick_rate = Duration::from_millis(250);
    let mut last_tick = Instant::now();

    loop {
        while let Ok(delta) = rx.try_recv() {
            apply_delta(&mut app.state, delta);
        }

        terminal.draw(|f| ui(f, app))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.on_key(key);
                }
            }
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn ui(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Min(1),
            Constraint::Length(4),
        ])
        .split(frame.size());

    let header = Paragraph::new(header_text(app))
        .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    if let Some(page) = app.state.current() {
        render_page(frame, chunks[1], page, app.column);
    }

    let footer = Paragraph::new(console_text(&app.state))
        .block(Block::default().borders(Borders::TOP));
    frame.render_widget(footer, chunks[2]);

    if app.state.help_overlay {
        render_help_overlay(frame, frame.size());
    }
}

fn header_text(app: &App) -> String {
    let Some(page) = app.state.current() else {
        return "GRIDIRON".to_string();
    };
    let session = &page.session;
    let tabs: Vec<String> = session
        .subject()
        .views()
        .iter()
        .enumerate()
        .map(|(idx, view)| {
            if *view == session.active_view() {
                format!("[{} {}]", idx + 1, view.label())
            } else {
                format!(" {} {} ", idx + 1, view.label())
            }
        })
        .collect();
    let sort = session
        .active_data()
        .and_then(ViewData::sort_state)
        .map(|s| format!(" | Sort: {}{}", s.key, s.indicator(&s.key)))
        .unwrap_or_default();
    format!(
        "GRIDIRON | {} | Season {} | {}{} | depth {}",
        page.title(),
        session.season(),
        tabs.join(""),
        sort,
        app.state.pages.len()
    )
}

fn render_page(frame: &mut Frame, area: Rect, page: &Page, column: usize) {
    let block = Block::default()
        .title(page.session.active_view().label())
        .borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let text = match page.session.active_status() {
        ViewStatus::Idle => Text::from("Nothing loaded"),
        ViewStatus::Loading => Text::from("Loading..."),
        ViewStatus::Failed(err) => Text::from(vec![
            Line::styled(err.to_string(), Style::default().fg(Color::Red)),
            Line::from("Press r to retry"),
        ]),
        ViewStatus::Ready(data) => table_text(data, page, column, inner.height as usize),
    };
    frame.render_widget(Paragraph::new(text), inner);
}

fn table_text(data: &ViewData, page: &Page, column: usize, height: usize) -> Text<'static> {
    let columns = sort_columns(data);
    let mut lines = Vec::new();
    if let Some(summary) = summary_line(data) {
        lines.push(Line::styled(summary, Style::default().fg(Color::Cyan)));
    }
    if !columns.is_empty() {
        let sort = data.sort_state();
        let header = columns
            .iter()
            .enumerate()
            .map(|(idx, (label, key))| {
                let arrow = sort.map(|s| s.indicator(key)).unwrap_or_default();
                if idx == column {
                    format!("<{label}{arrow}>")
                } else {
                    format!(" {label}{arrow} ")
                }
            })
            .collect::<Vec<_>>()
            .join(" ");
        lines.push(Line::styled(header, Style::default().add_modifier(Modifier::BOLD)));
    }

    let rows = row_lines(data);
    if rows.is_empty() {
        lines.push(Line::from("No data"));
        return Text::from(lines);
    }
    let marked = page.marked.as_deref().and_then(|t| data.highlight_row(t));
    let visible = height.saturating_sub(lines.len()).max(1);
    let (start, end) = visible_range(page.selected, rows.len(), visible);
    for (idx, row) in rows.into_iter().enumerate().take(end).skip(start) {
        let mut style = Style::default();
        if Some(idx) == marked {
            style = style.fg(Color::Yellow);
        }
        if idx == page.selected {
            style = style.add_modifier(Modifier::REVERSED);
        }
        lines.push(Line::styled(row, style));
    }
    Text::from(lines)
}

fn summary_line(data: &ViewData) -> Option<String> {
    match data {
        ViewData::Games(payload) => {
            let week = payload.shown_week()?;
            Some(format!(
                "{}{} | {} games",
                week.label(),
                week.details
                    .as_deref()
                    .map(|d| format!(" ({d})"))
                    .unwrap_or_default(),
                payload.games.len()
            ))
        }
        ViewData::Matchup {
            game, has_stats, ..
        } => Some(format!(
            "{} ({}) {} @ {} ({}) {} | {} | {}{}",
            game.team_name(Side::Away),
            game.team_record(Side::Away),
            game.win_prob_label(Side::Away),
            game.team_name(Side::Home),
            game.team_record(Side::Home),
            game.win_prob_label(Side::Home),
            game.kickoff_label(),
            game.odds_label(),
            if *has_stats { "" } else { " | no team stats yet" }
        )),
        _ => None,
    }
}

fn sort_columns(data: &ViewData) -> Vec<(String, String)> {
    let col = |label: &str, key: &str| (label.to_string(), key.to_string());
    match data {
        ViewData::TeamStats(_) => vec![
            col("#", "priority"),
            col("Stat", "name"),
            col("Category", "category"),
            col("Value", "value"),
            col("Rank", "rank"),
        ],
        ViewData::PositionStats { key_stats, .. } => {
            let mut cols = vec![col("Rank", "rank"), col("Player", "name"), col("Team", "team")];
            cols.extend(key_stats.iter().map(|k| (format_stat_name(k), k.clone())));
            cols
        }
        ViewData::StatComparison { .. } => {
            vec![col("Rank", "rank"), col("Team", "team"), col("Value", "value")]
        }
        ViewData::Matchup { game, .. } => vec![
            col("#", "order"),
            col("Stat", "stat"),
            col("Category", "category"),
            (game.team_name(Side::Away).to_string(), "away".to_string()),
            (game.team_name(Side::Home).to_string(), "home".to_string()),
        ],
        ViewData::Games(_) | ViewData::Schedule(_) | ViewData::Roster(_) => Vec::new(),
    }
}

fn row_lines(data: &ViewData) -> Vec<String> {
    match data {
        ViewData::Games(payload) => payload
            .games
            .iter()
            .map(|game| {
                format!(
                    "{:<24} {:<7} {:>4}  @ {:<24} {:<7} {:>4}  {:<22} {}",
                    game.team_name(Side::Away),
                    game.team_record(Side::Away),
                    game.win_prob_label(Side::Away),
                    game.team_name(Side::Home),
                    game.team_record(Side::Home),
                    game.win_prob_label(Side::Home),
                    game.kickoff_label(),
                    game.odds_label()
                )
            })
            .collect(),
        ViewData::Matchup { table, .. } => table
            .rows
            .iter()
            .map(|row| {
                let cell = |side: Side| {
                    row.side(side)
                        .map(|s| format!("{:>10} {:<6}", s.value_label(), s.rank_label()))
                        .unwrap_or_else(|| format!("{:>10} {:<6}", "-", ""))
                };
                format!(
                    "{:>3}  {:<32} {:<14} {} {}",
                    row.order + 1,
                    format_stat_name(&row.stat_name),
                    row.category.as_deref().unwrap_or(""),
                    cell(Side::Away),
                    cell(Side::Home)
                )
            })
            .collect(),
        ViewData::Schedule(payload) => payload
            .schedule
            .iter()
            .map(|game| {
                format!(
                    "Wk {:>2}  {} {:<24} {:<8} {:<24} {}",
                    game.week_num.map(|w| w.to_string()).unwrap_or_else(|| "-".to_string()),
                    if game.is_home { "vs" } else { " @" },
                    game.opponent_name(),
                    game.opponent_record.as_deref().unwrap_or(""),
                    game.kickoff_label(),
                    game.odds.as_deref().unwrap_or("")
                )
            })
            .collect(),
        ViewData::TeamStats(table) => table
            .rows
            .iter()
            .map(|stat| {
                format!(
                    "{:>3}  {:<32} {:<14} {:>10}  {}",
                    stat.priority + 1,
                    format_stat_name(stat.name()),
                    stat.record.category.as_deref().unwrap_or(""),
                    stat.record.display_value(),
                    stat.record.rank.map(|r| format!("#{r}")).unwrap_or_default()
                )
            })
            .collect(),
        ViewData::Roster(view) => {
            let mut last_super: Option<SuperGroup> = None;
            view.display_rows()
                .into_iter()
                .map(|(group, entry)| {
                    let section = group.super_group();
                    let prefix = if last_super != Some(section) {
                        last_super = Some(section);
                        format!("{:<8}", section.label())
                    } else {
                        " ".repeat(8)
                    };
                    format!(
                        "{prefix} {:<16} #{:<3} {:<28} {:<5} {:>4} {:>6} {:>4}",
                        group.label(),
                        entry.jersey.as_deref().unwrap_or("-"),
                        entry.name(),
                        entry.position_code().unwrap_or(""),
                        entry.age.as_deref().unwrap_or(""),
                        entry.height.as_deref().unwrap_or(""),
                        entry.weight.as_deref().unwrap_or("")
                    )
                })
                .collect()
        }
        ViewData::PositionStats { key_stats, table } => table
            .rows
            .iter()
            .map(|row| {
                let stats = key_stats
                    .iter()
                    .map(|k| format!("{:>8}", json_display(row.stat(k))))
                    .collect::<Vec<_>>()
                    .join(" ");
                format!(
                    "{:>4}  {:<26} {:<6} {}",
                    row.rank.map(|r| r.to_string()).unwrap_or_else(|| "-".to_string()),
                    row.player_name(),
                    row.team_name(),
                    stats
                )
            })
            .collect(),
        ViewData::StatComparison { info, table } => table
            .rows
            .iter()
            .map(|row| {
                format!(
                    "{:>4}/{:<3} {:<28} {:>10}",
                    row.display_rank.map(|r| r.to_string()).unwrap_or_else(|| "-".to_string()),
                    info.total_teams,
                    row.name(),
                    json_display(Some(&row.value))
                )
            })
            .collect(),
    }
}

fn visible_range(selected: usize, total: usize, visible: usize) -> (usize, usize) {
    if total == 0 {
        return (0, 0);
    }
    if total <= visible {
        return (0, total);
    }

    let mut start = selected.saturating_sub(visible / 2);
    if start + visible > total {
        start = total - visible;
    }
    (start, start + visible)
}

fn console_text(state: &AppState) -> String {
    if state.logs.is_empty() {
        return "No alerts yet | ? Help | q Quit".to_string();
    }
    state
        .logs
        .iter()
        .rev()
        .take(3)
        .cloned()
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 60, area);
    frame.render_widget(Clear, popup_area);

    let text = [
        "Gridiron Terminal - Help",
        "",
        "  1 / 2 / 3    Switch view",
        "  s            Next season",
        "  [ / ]        Previous / next week",
        "  A / H        Open away / home team",
        "  j/k or ↑/↓   Move",
        "  h/l or ←/→   Pick column",
        "  o            Sort by column",
        "  Enter        Open selection",
        "  r            Retry failed view",
        "  b / Esc      Back",
        "  ?            Toggle help",
        "  q            Quit",
    ]
    .join("\n");

    let help = Paragraph::new(text)
        .block(Block::default().title("Help").borders(Borders::ALL))
        .style(Style::default());
    frame.render_widget(help, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);

    horizontal[1]
}
