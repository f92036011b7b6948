use anyhow::Result;
use chrono::{Local, NaiveDate};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph},
    Frame, Terminal,
};
use std::io;
use tc_tracker::{
    format_change, format_currency, format_rate, Action, Dashboard, DashboardView, LogSink,
    TimeRange, ViewState,
};
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Dashboard,
    Email,
    Threshold,
}

impl Focus {
    pub fn next(&self) -> Self {
        match self {
            Focus::Dashboard => Focus::Email,
            Focus::Email => Focus::Threshold,
            Focus::Threshold => Focus::Dashboard,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StatusMessage {
    pub text: String,
    pub is_error: bool,
}

pub struct App {
    pub dashboard: Dashboard,
    pub state: ViewState,
    pub focus: Focus,
    pub status: Option<StatusMessage>,
    /// Fixed reference date; the local date is used when unset
    pub pinned_now: Option<NaiveDate>,
    sink: LogSink,
}

impl App {
    pub fn new(dashboard: Dashboard) -> Self {
        let state = dashboard.initial_state();
        Self::with_state(dashboard, state)
    }

    /// Start from an already-reduced state (e.g. seeded from the command line)
    pub fn with_state(dashboard: Dashboard, state: ViewState) -> Self {
        Self {
            dashboard,
            state,
            focus: Focus::Dashboard,
            status: None,
            pinned_now: None,
            sink: LogSink,
        }
    }

    pub fn with_now(mut self, now: Option<NaiveDate>) -> Self {
        self.pinned_now = now;
        self
    }

    fn now(&self) -> NaiveDate {
        self.pinned_now.unwrap_or_else(|| Local::now().date_naive())
    }

    /// Run one action through the reducer, reporting the outcome in the status bar
    pub fn apply(&mut self, action: Action) {
        match self.dashboard.dispatch(&mut self.state, action, &mut self.sink) {
            Ok(Some(event)) => {
                self.status = Some(StatusMessage {
                    text: event.summary(),
                    is_error: false,
                });
            }
            Ok(None) => self.status = None,
            Err(err) => {
                warn!(error = %err, "action rejected");
                self.status = Some(StatusMessage {
                    text: err.to_string(),
                    is_error: true,
                });
            }
        }
    }

    pub fn next_region(&mut self) {
        let next = self
            .dashboard
            .config()
            .tax_table
            .next_region(&self.state.region)
            .map(String::from);
        if let Some(region) = next {
            self.apply(Action::SelectRegion(region));
        }
    }

    pub fn previous_region(&mut self) {
        let previous = self
            .dashboard
            .config()
            .tax_table
            .previous_region(&self.state.region)
            .map(String::from);
        if let Some(region) = previous {
            self.apply(Action::SelectRegion(region));
        }
    }

    fn edit_field(&mut self, edit: impl FnOnce(&mut String)) {
        let action = match self.focus {
            Focus::Email => {
                let mut email = self.state.draft.email.clone();
                edit(&mut email);
                Action::EditEmail(email)
            }
            Focus::Threshold => {
                let mut threshold = self.state.draft.threshold.clone();
                edit(&mut threshold);
                Action::EditThreshold(threshold)
            }
            Focus::Dashboard => return,
        };
        self.apply(action);
    }

    /// Handle one key press. Returns true when the app should quit.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return true;
        }

        match key.code {
            KeyCode::Tab => {
                self.focus = self.focus.next();
                return false;
            }
            KeyCode::Enter => {
                self.apply(Action::SubmitNotification);
                if !self.status.as_ref().is_some_and(|s| s.is_error) {
                    self.focus = Focus::Dashboard;
                }
                return false;
            }
            _ => {}
        }

        if self.focus != Focus::Dashboard {
            match key.code {
                KeyCode::Esc => self.focus = Focus::Dashboard,
                KeyCode::Backspace => self.edit_field(|s| {
                    s.pop();
                }),
                KeyCode::Char(c) => self.edit_field(|s| s.push(c)),
                _ => {}
            }
            return false;
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Char('1') => self.apply(Action::SetRange(TimeRange::OneMonth)),
            KeyCode::Char('2') => self.apply(Action::SetRange(TimeRange::ThreeMonths)),
            KeyCode::Char('3') => self.apply(Action::SetRange(TimeRange::SixMonths)),
            KeyCode::Char('4') => self.apply(Action::SetRange(TimeRange::OneYear)),
            KeyCode::Char('5') => self.apply(Action::SetRange(TimeRange::All)),
            KeyCode::Char('t') => self.apply(Action::ToggleAfterTax),
            KeyCode::Char('n') => self.apply(Action::ToggleNotifications),
            KeyCode::Char('r') | KeyCode::Right => self.next_region(),
            KeyCode::Char('R') | KeyCode::Left => self.previous_region(),
            KeyCode::Char('e') => self.focus = Focus::Email,
            _ => {}
        }

        false
    }
}

pub fn run_ui(app: &mut App) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run the app
    let res = run_app(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res
}

fn run_app<B: ratatui::backend::Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    loop {
        let view = app.dashboard.derive(&app.state, app.now())?;

        terminal.draw(|f| ui(f, app, &view))?;

        if let Event::Key(key) = event::read()? {
            if app.handle_key(key) {
                return Ok(());
            }
        }
    }
}

fn ui(f: &mut Frame, app: &App, view: &DashboardView) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Content area
            Constraint::Length(3), // Status bar
        ])
        .split(f.size());

    render_header(f, chunks[0], view);

    let content = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(64), Constraint::Percentage(36)])
        .split(chunks[1]);

    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(3)])
        .split(content[0]);

    render_chart(f, left[0], view);
    render_range_selector(f, left[1], view);

    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(7), // Breakdown
            Constraint::Length(6), // Tax
            Constraint::Length(6), // Quick stats
            Constraint::Min(0),    // Notifications
        ])
        .split(content[1]);

    render_breakdown(f, right[0], view);
    render_tax(f, right[1], view);
    render_quick_stats(f, right[2], view);
    render_notifications(f, right[3], app, view);

    render_status_bar(f, chunks[2], app);
}

fn label_style() -> Style {
    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
}

fn key_style() -> Style {
    Style::default().fg(Color::Yellow)
}

fn render_header(f: &mut Frame, area: Rect, view: &DashboardView) {
    let bell = if view.notifications_enabled {
        Span::styled("🔔 on", Style::default().fg(Color::Green))
    } else {
        Span::styled("🔕 off", Style::default().fg(Color::DarkGray))
    };

    let after_tax = if view.after_tax {
        Span::styled("After-Tax: ON", Style::default().fg(Color::Green).add_modifier(Modifier::BOLD))
    } else {
        Span::styled("After-Tax: OFF", Style::default().fg(Color::DarkGray))
    };

    let spans = vec![
        Span::styled(
            "TC Tracker",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        ),
        Span::raw("  |  "),
        Span::styled(view.company_name.clone(), Style::default().fg(Color::White)),
        Span::raw("  |  Region: "),
        Span::styled(view.region.clone(), label_style()),
        Span::raw("  |  "),
        after_tax,
        Span::raw("  |  "),
        bell,
    ];

    let header = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan)),
    );

    f.render_widget(header, area);
}

fn render_chart(f: &mut Frame, area: Rect, view: &DashboardView) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::White))
        .title(" Total Compensation Over Time ");

    if view.series.is_empty() {
        let empty = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled(
                format!("No compensation data in the last {}", view.range),
                Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
            )),
        ])
        .alignment(Alignment::Center)
        .block(block);
        f.render_widget(empty, area);
        return;
    }

    let points = |value: fn(&tc_tracker::SeriesPoint) -> f64| -> Vec<(f64, f64)> {
        view.series
            .iter()
            .enumerate()
            .map(|(i, p)| (i as f64, value(p)))
            .collect()
    };
    let total = points(|p| p.total);
    let base = points(|p| p.base);
    let equity = points(|p| p.equity);

    let datasets = vec![
        Dataset::default()
            .name(if view.after_tax { "TC (after tax)" } else { "TC" })
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(Color::Magenta))
            .data(&total),
        Dataset::default()
            .name("Base")
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(Color::Green))
            .data(&base),
        Dataset::default()
            .name("Equity")
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(Color::Yellow))
            .data(&equity),
    ];

    let x_max = (view.series.len().saturating_sub(1)).max(1) as f64;
    let y_max = view
        .series
        .iter()
        .flat_map(|p| [p.total, p.base, p.equity])
        .fold(0.0_f64, f64::max)
        * 1.1;

    let first = view.series.first().map(|p| p.period.to_string()).unwrap_or_default();
    let last = view.series.last().map(|p| p.period.to_string()).unwrap_or_default();

    let chart = Chart::new(datasets)
        .block(block)
        .x_axis(
            Axis::default()
                .style(Style::default().fg(Color::DarkGray))
                .bounds([0.0, x_max])
                .labels(vec![Span::raw(first), Span::raw(last)]),
        )
        .y_axis(
            Axis::default()
                .style(Style::default().fg(Color::DarkGray))
                .bounds([0.0, y_max.max(1.0)])
                .labels(vec![
                    Span::raw(format_currency(0.0)),
                    Span::raw(format_currency(y_max / 2.0)),
                    Span::raw(format_currency(y_max)),
                ]),
        );

    f.render_widget(chart, area);
}

fn render_range_selector(f: &mut Frame, area: Rect, view: &DashboardView) {
    let mut spans = vec![Span::raw(" ")];
    for (i, range) in TimeRange::ALL_RANGES.iter().enumerate() {
        if i > 0 {
            spans.push(Span::raw(" │ "));
        }
        spans.push(Span::styled(format!("{}", i + 1), key_style()));
        spans.push(Span::raw(" "));

        let style = if *range == view.range {
            Style::default()
                .fg(Color::White)
                .bg(Color::Blue)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        spans.push(Span::styled(format!(" {} ", range.label()), style));
    }

    let selector = Paragraph::new(Line::from(spans))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title(" Range "));

    f.render_widget(selector, area);
}

fn money_line(label: &str, value: f64, color: Color) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("  {:<16}", label), label_style()),
        Span::styled(
            format!("{:>12}", format_currency(value)),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ),
    ])
}

fn render_breakdown(f: &mut Frame, area: Rect, view: &DashboardView) {
    let title = match &view.breakdown {
        Some(b) => format!(" Current TC Breakdown ({}) ", b.period),
        None => " Current TC Breakdown ".to_string(),
    };

    let content = match &view.breakdown {
        Some(b) => vec![
            money_line("Base Salary", b.base, Color::Green),
            money_line("Equity", b.equity, Color::Blue),
            money_line("Bonus", b.bonus, Color::Yellow),
            Line::from("  ─────────────────────────────"),
            money_line("Total TC", b.total, Color::Magenta),
        ],
        None => vec![Line::from("  No compensation records")],
    };

    let panel = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(title),
    );

    f.render_widget(panel, area);
}

fn render_tax(f: &mut Frame, area: Rect, view: &DashboardView) {
    let mut content = vec![Line::from(vec![
        Span::styled(format!("  {:<16}", "Effective Rate"), label_style()),
        Span::styled(
            format!("{:>12}", format_rate(view.effective_rate)),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ),
    ])];

    if let Some(tax) = &view.tax {
        content.push(money_line("Total Tax", tax.tax_amount, Color::Red));
        content.push(money_line("Take-Home Pay", tax.take_home, Color::Green));
    }

    let panel = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(" Tax Information "),
    );

    f.render_widget(panel, area);
}

fn render_quick_stats(f: &mut Frame, area: Rect, view: &DashboardView) {
    let stats = &view.quick_stats;
    let or_na = |value: Option<String>| value.unwrap_or_else(|| "n/a".to_string());

    let stat_line = |label: &str, value: String| {
        Line::from(vec![
            Span::styled(format!("  {:<18}", label), label_style()),
            Span::styled(value, Style::default().fg(Color::White).add_modifier(Modifier::BOLD)),
        ])
    };

    let content = vec![
        stat_line("YoY Growth", or_na(stats.yoy_growth_percent.map(format_change))),
        stat_line(
            "Stock Performance",
            or_na(stats.stock_performance_percent.map(format_change)),
        ),
        stat_line(
            "Next Vesting Date",
            or_na(stats.next_vesting_date.map(|d| d.format("%b %d, %Y").to_string())),
        ),
    ];

    let panel = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(" Quick Stats "),
    );

    f.render_widget(panel, area);
}

fn render_notifications(f: &mut Frame, area: Rect, app: &App, view: &DashboardView) {
    let field = |label: &str, value: &str, focused: bool| {
        let value_style = if focused {
            Style::default().fg(Color::Black).bg(Color::Green)
        } else {
            Style::default().fg(Color::White).bg(Color::DarkGray)
        };
        let cursor = if focused { "▏" } else { "" };

        Line::from(vec![
            Span::styled(format!("  {:<14}", label), label_style()),
            Span::styled(format!(" {}{} ", value, cursor), value_style),
        ])
    };

    let content = vec![
        Line::from(""),
        field("Email", &view.draft.email, app.focus == Focus::Email),
        Line::from(""),
        field("Threshold (%)", &view.draft.threshold, app.focus == Focus::Threshold),
        Line::from(""),
        Line::from(vec![
            Span::raw("  "),
            Span::styled("Enter", key_style()),
            Span::styled(
                " sign up for notifications",
                Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
            ),
        ]),
    ];

    let border = if app.focus == Focus::Dashboard {
        Color::White
    } else {
        Color::Green
    };

    let panel = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border))
            .title(" Notification Settings "),
    );

    f.render_widget(panel, area);
}

fn render_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let mut status_spans = Vec::new();

    if let Some(status) = &app.status {
        let color = if status.is_error { Color::Red } else { Color::Green };
        status_spans.push(Span::styled(format!(" {} ", status.text), Style::default().fg(color)));
        status_spans.push(Span::raw(" | "));
    }

    if app.focus == Focus::Dashboard {
        for (key, desc) in [
            ("1-5", " Range | "),
            ("t", " After-Tax | "),
            ("r/R", " Region | "),
            ("n", " Notify | "),
            ("Tab", " Form | "),
        ] {
            status_spans.push(Span::styled(key, key_style()));
            status_spans.push(Span::raw(desc));
        }
        status_spans.push(Span::styled("q", Style::default().fg(Color::Red)));
        status_spans.push(Span::raw(" Quit"));
    } else {
        status_spans.push(Span::styled("Tab", key_style()));
        status_spans.push(Span::raw(" Next field | "));
        status_spans.push(Span::styled("Enter", key_style()));
        status_spans.push(Span::raw(" Submit | "));
        status_spans.push(Span::styled("Esc", key_style()));
        status_spans.push(Span::raw(" Back"));
    }

    let status_bar = Paragraph::new(Line::from(status_spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White)),
    );

    f.render_widget(status_bar, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(app: &mut App, code: KeyCode) -> bool {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    #[test]
    fn test_range_and_toggle_keys() {
        let mut app = App::new(Dashboard::default());

        press(&mut app, KeyCode::Char('1'));
        press(&mut app, KeyCode::Char('t'));

        assert_eq!(app.state.range, TimeRange::OneMonth);
        assert!(app.state.after_tax);
    }

    #[test]
    fn test_region_cycling_keys() {
        let mut app = App::new(Dashboard::default());

        press(&mut app, KeyCode::Char('r'));
        assert_eq!(app.state.region, "Texas");

        press(&mut app, KeyCode::Char('R'));
        press(&mut app, KeyCode::Char('R'));
        assert_eq!(app.state.region, "Washington");
    }

    #[test]
    fn test_form_entry_and_submit() {
        let mut app = App::new(Dashboard::default());

        press(&mut app, KeyCode::Tab);
        assert_eq!(app.focus, Focus::Email);
        for c in "a@b.com".chars() {
            press(&mut app, KeyCode::Char(c));
        }

        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Backspace);
        press(&mut app, KeyCode::Char('9'));
        assert_eq!(app.state.draft.threshold, "9");

        // 'q' is text while editing, not quit
        assert!(!press(&mut app, KeyCode::Char('q')));
        press(&mut app, KeyCode::Backspace);

        press(&mut app, KeyCode::Enter);

        assert_eq!(app.focus, Focus::Dashboard);
        assert_eq!(app.state.draft.email, "");
        let status = app.status.clone().unwrap();
        assert!(!status.is_error);
        assert!(status.text.contains("a@b.com"));
    }

    #[test]
    fn test_invalid_submit_reports_error() {
        let mut app = App::new(Dashboard::default());

        press(&mut app, KeyCode::Enter);

        assert!(app.status.as_ref().unwrap().is_error);
        assert_eq!(app.state.draft.threshold, "5");
    }

    #[test]
    fn test_editing_clears_stale_error() {
        let mut app = App::new(Dashboard::default());

        press(&mut app, KeyCode::Enter);
        assert!(app.status.as_ref().unwrap().is_error);

        press(&mut app, KeyCode::Char('e'));
        press(&mut app, KeyCode::Char('a'));

        assert_eq!(app.state.draft.email, "a");
        assert!(app.status.is_none());
    }

    #[test]
    fn test_seeded_state_and_pinned_date() {
        let dashboard = Dashboard::default();
        let mut state = dashboard.initial_state();
        state.range = TimeRange::ThreeMonths;
        state.region = "Texas".to_string();

        let date = NaiveDate::from_ymd_opt(2024, 4, 15);
        let app = App::with_state(dashboard, state).with_now(date);

        assert_eq!(app.state.range, TimeRange::ThreeMonths);
        assert_eq!(app.state.region, "Texas");
        assert_eq!(app.now(), date.unwrap());
    }

    #[test]
    fn test_quit_keys() {
        let mut app = App::new(Dashboard::default());

        press(&mut app, KeyCode::Char('n'));
        assert!(!app.state.notifications_enabled);
        assert!(press(&mut app, KeyCode::Char('q')));
    }
}
