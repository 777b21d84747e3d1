use crate::calc::{days_in_month, month_name, MonthCursor, MonthGrid, WEEKDAY_NAMES};
use crate::data::{markers_for, spawn_fetch, AnnotationMap, EventClient, FetchOutcome};
use anyhow::{Context, Result};
use chrono::{Datelike, NaiveDate};
use crossterm::event::{self, Event as CEvent, KeyCode, KeyModifiers};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame, Terminal,
};
use std::io::Stdout;
use std::process::{Command, Stdio};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::time::Duration as StdDuration;

/// Dot palette in overlay order: the first event on a day gets the first
/// color, and so on. Counts past the palette render as a "+N" suffix.
pub(crate) const PALETTE: [Color; 7] = [
    Color::Rgb(0xef, 0x44, 0x44),
    Color::Rgb(0x3b, 0x82, 0xf6),
    Color::Rgb(0x10, 0xb9, 0x81),
    Color::Rgb(0xf5, 0x9e, 0x0b),
    Color::Rgb(0x8b, 0x5c, 0xf6),
    Color::Rgb(0xec, 0x48, 0x99),
    Color::Rgb(0x14, 0xb8, 0xa6),
];

/// The "+N" suffix uses the palette's red.
const OVERFLOW_COLOR: Color = PALETTE[0];

/// Width of one day column: a 2-char day number needs room beneath it for
/// 7 dots plus a suffix like "+99".
const CELL_WIDTH: usize = 11;

pub struct App {
    cursor: MonthCursor,
    today: NaiveDate,
    /// Keyboard stand-in for clicking a day cell.
    selected_day: u32,
    /// Event counts applied to the displayed month. None while a fetch is
    /// in flight or after a failed fetch; days simply stay unannotated.
    annotations: Option<AnnotationMap>,
    /// One-line message shown under the grid. Replaced, never stacked.
    status: Option<(String, Color)>,
    client: EventClient,
    plant: &'static str,
    fetch_tx: Sender<FetchOutcome>,
    fetch_rx: Receiver<FetchOutcome>,
}

impl App {
    pub fn new(client: EventClient, today: NaiveDate, plant: &'static str) -> Self {
        let (fetch_tx, fetch_rx) = channel();
        App {
            cursor: MonthCursor::from_date(today),
            today,
            selected_day: today.day(),
            annotations: None,
            status: None,
            client,
            plant,
            fetch_tx,
            fetch_rx,
        }
    }

    fn grid(&self) -> MonthGrid {
        MonthGrid::compute(self.cursor, self.today)
    }

    /// Clears the applied annotations and issues a background fetch for the
    /// displayed month. The grid stays rendered and interactive throughout.
    pub fn refresh(&mut self) {
        self.annotations = None;
        self.status = None;
        spawn_fetch(
            &self.client,
            self.cursor.year,
            self.cursor.month1(),
            self.fetch_tx.clone(),
        );
    }

    pub fn try_recv_fetch(&self) -> Option<FetchOutcome> {
        self.fetch_rx.try_recv().ok()
    }

    /// Applies one fetch outcome. An outcome tagged with a month other than
    /// the current cursor is stale (the user navigated away before the
    /// request resolved) and is discarded.
    pub fn apply_fetch_outcome(&mut self, outcome: FetchOutcome) {
        if (outcome.year, outcome.month) != (self.cursor.year, self.cursor.month1()) {
            return;
        }
        match outcome.result {
            Ok(map) => self.annotations = Some(map),
            Err(e) => {
                self.status = Some((format!("Failed to load events: {:#}", e), Color::Red));
            }
        }
    }

    pub fn advance_month(&mut self) {
        self.cursor.advance();
        self.clamp_selection();
        self.refresh();
    }

    pub fn retreat_month(&mut self) {
        self.cursor.retreat();
        self.clamp_selection();
        self.refresh();
    }

    fn clamp_selection(&mut self) {
        let days = days_in_month(self.cursor.year, self.cursor.month1());
        self.selected_day = self.selected_day.clamp(1, days);
    }

    fn move_selection(&mut self, delta: i32) {
        let days = days_in_month(self.cursor.year, self.cursor.month1()) as i32;
        let moved = (self.selected_day as i32 + delta).clamp(1, days);
        self.selected_day = moved as u32;
    }

    /// Add-event URL for the selected day, zero-padded to YYYY-MM-DD.
    pub(crate) fn add_event_destination(&self) -> Option<String> {
        self.grid()
            .date_of(self.selected_day)
            .map(|date| self.client.add_event_url(date))
    }

    fn open_add_event(&mut self) {
        let Some(url) = self.add_event_destination() else {
            return;
        };
        match open_in_browser(&url) {
            Ok(()) => self.status = Some((format!("Opening {}", url), Color::Cyan)),
            Err(e) => self.status = Some((format!("{:#} — {}", e, url), Color::Yellow)),
        }
    }

    /// Returns true if the app should quit.
    pub fn handle_key(&mut self, code: KeyCode, modifiers: KeyModifiers) -> bool {
        if modifiers.contains(KeyModifiers::CONTROL) && code == KeyCode::Char('c') {
            return true;
        }
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Char('n') | KeyCode::PageDown => self.advance_month(),
            KeyCode::Char('p') | KeyCode::PageUp => self.retreat_month(),
            KeyCode::Left => self.move_selection(-1),
            KeyCode::Right => self.move_selection(1),
            KeyCode::Up => self.move_selection(-7),
            KeyCode::Down => self.move_selection(7),
            KeyCode::Enter => self.open_add_event(),
            KeyCode::Char('r') => self.refresh(),
            _ => {}
        }
        false
    }

    // ── Rendering ─────────────────────────────────────────────────────────────

    pub fn render(&mut self, f: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2), // month/year title
                Constraint::Min(13),   // grid (header + up to 6 weeks)
                Constraint::Length(1), // status
                Constraint::Length(1), // key help
            ])
            .split(f.area());

        self.render_title(f, chunks[0]);

        // Reserve a small right-hand column for the decorative plant.
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(0), Constraint::Length(9)])
            .split(chunks[1]);
        self.render_grid(f, cols[0]);
        self.render_plant(f, cols[1]);

        self.render_status(f, chunks[2]);
        self.render_help(f, chunks[3]);
    }

    fn render_title(&self, f: &mut Frame, area: Rect) {
        let grid = self.grid();
        let title = format!("{} {}", month_name(grid.month), grid.year);
        let widget = Paragraph::new(Line::from(Span::styled(
            title,
            Style::default().add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        )))
        .alignment(Alignment::Center);
        f.render_widget(widget, area);
    }

    fn render_grid(&self, f: &mut Frame, area: Rect) {
        let widget = Paragraph::new(self.grid_lines());
        f.render_widget(widget, area);
    }

    fn render_plant(&self, f: &mut Frame, area: Rect) {
        let lines: Vec<Line> = self
            .plant
            .lines()
            .map(|l| Line::from(Span::styled(l.to_string(), Style::default().fg(Color::Green))))
            .collect();
        f.render_widget(Paragraph::new(lines), area);
    }

    fn render_status(&self, f: &mut Frame, area: Rect) {
        f.render_widget(Paragraph::new(self.status_line()), area);
    }

    fn render_help(&self, f: &mut Frame, area: Rect) {
        let help = "n/p: month   arrows: day   enter: add event   r: reload   q: quit";
        let widget =
            Paragraph::new(Span::styled(help, Style::default().add_modifier(Modifier::DIM)));
        f.render_widget(widget, area);
    }

    /// One header line plus two lines per week: day numbers, then event dots.
    pub(crate) fn grid_lines(&self) -> Vec<Line<'static>> {
        let grid = self.grid();
        let mut lines = Vec::new();

        let header: String = WEEKDAY_NAMES
            .iter()
            .map(|name| format!("{:<width$}", name, width = CELL_WIDTH))
            .collect();
        lines.push(Line::from(Span::styled(
            header,
            Style::default().add_modifier(Modifier::BOLD),
        )));

        for week in grid.weeks() {
            let mut number_spans: Vec<Span<'static>> = Vec::new();
            let mut dots_row: Vec<Span<'static>> = Vec::new();
            for slot in week {
                match slot {
                    None => {
                        number_spans.push(Span::raw(" ".repeat(CELL_WIDTH)));
                        dots_row.push(Span::raw(" ".repeat(CELL_WIDTH)));
                    }
                    Some(day) => {
                        let count = self
                            .annotations
                            .as_ref()
                            .map(|a| a.count_for(day))
                            .unwrap_or(0);
                        let style = day_number_style(
                            day == self.selected_day,
                            grid.today_day == Some(day),
                            count > 0,
                        );
                        number_spans.push(Span::styled(format!("{:<2}", day), style));
                        number_spans.push(Span::raw(" ".repeat(CELL_WIDTH - 2)));

                        let dots = dot_spans(count);
                        let used: usize = dots.iter().map(|s| s.content.chars().count()).sum();
                        dots_row.extend(dots);
                        dots_row.push(Span::raw(" ".repeat(CELL_WIDTH.saturating_sub(used))));
                    }
                }
            }
            lines.push(Line::from(number_spans));
            lines.push(Line::from(dots_row));
        }
        lines
    }

    fn status_line(&self) -> Line<'static> {
        if let Some((msg, color)) = &self.status {
            return Line::from(Span::styled(msg.clone(), Style::default().fg(*color)));
        }
        let dim = Style::default().add_modifier(Modifier::DIM);
        match &self.annotations {
            None => Line::from(Span::styled("Loading events...", dim)),
            Some(map) => {
                let annotated = map.annotated_days().len();
                if annotated == 0 {
                    Line::from(Span::styled("No events this month", dim))
                } else {
                    Line::from(Span::styled(
                        format!("{} day(s) with events", annotated),
                        dim,
                    ))
                }
            }
        }
    }
}

/// Style for one day number. Selection wins over the today marker, which
/// wins over the has-events tint.
pub(crate) fn day_number_style(is_selected: bool, is_today: bool, has_events: bool) -> Style {
    if is_selected {
        let bg = if is_today { Color::Yellow } else { Color::White };
        Style::default()
            .fg(Color::Black)
            .bg(bg)
            .add_modifier(Modifier::BOLD)
    } else if is_today {
        Style::default().add_modifier(Modifier::REVERSED | Modifier::BOLD)
    } else if has_events {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    }
}

/// Colored dots for one day: min(count, 7) dots in fixed palette order,
/// then "+N" for the remainder.
pub(crate) fn dot_spans(count: u32) -> Vec<Span<'static>> {
    let markers = markers_for(count);
    let mut spans: Vec<Span<'static>> = (0..markers.dots as usize)
        .map(|i| Span::styled("•", Style::default().fg(PALETTE[i])))
        .collect();
    if let Some(extra) = markers.overflow {
        spans.push(Span::styled(
            format!("+{}", extra),
            Style::default().fg(OVERFLOW_COLOR),
        ));
    }
    spans
}

fn open_in_browser(url: &str) -> Result<()> {
    #[cfg(target_os = "macos")]
    let opener = "open";
    #[cfg(not(target_os = "macos"))]
    let opener = "xdg-open";
    Command::new(opener)
        .arg(url)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .with_context(|| format!("failed to launch {}", opener))?;
    Ok(())
}

// ── App event loop ────────────────────────────────────────────────────────────

pub fn run_app(terminal: &mut Terminal<CrosstermBackend<Stdout>>, app: &mut App) -> Result<()> {
    app.refresh();
    loop {
        while let Some(outcome) = app.try_recv_fetch() {
            app.apply_fetch_outcome(outcome);
        }
        terminal.draw(|f| app.render(f))?;
        if event::poll(StdDuration::from_millis(16))? {
            if let CEvent::Key(key) = event::read()? {
                if app.handle_key(key.code, key.modifiers) {
                    break;
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    /// App pointed at an unroutable server; tests never call refresh(), so
    /// no fetch thread is ever spawned.
    fn make_app(today: NaiveDate) -> App {
        App::new(EventClient::new("http://127.0.0.1:0"), today, "x")
    }

    fn ok_outcome(year: i32, month: u32, pairs: &[(&str, u32)]) -> FetchOutcome {
        FetchOutcome {
            year,
            month,
            result: Ok(AnnotationMap::from_pairs(pairs)),
        }
    }

    // ── fetch outcome handling ────────────────────────────────────────────────

    #[test]
    fn test_matching_outcome_applies_annotations() {
        let mut app = make_app(d(2024, 3, 15));
        app.apply_fetch_outcome(ok_outcome(2024, 3, &[("15", 3)]));
        assert_eq!(app.annotations.as_ref().unwrap().count_for(15), 3);
    }

    #[test]
    fn test_stale_outcome_is_discarded() {
        let mut app = make_app(d(2024, 3, 15));
        // Issued for March, resolved after navigating to April.
        let stale = ok_outcome(2024, 3, &[("15", 3)]);
        app.cursor.advance();
        app.apply_fetch_outcome(stale);
        assert!(app.annotations.is_none());
    }

    #[test]
    fn test_stale_outcome_across_year_boundary_is_discarded() {
        let mut app = make_app(d(2024, 12, 1));
        let stale = ok_outcome(2024, 12, &[("1", 1)]);
        app.cursor.advance();
        app.apply_fetch_outcome(stale);
        assert!(app.annotations.is_none());
    }

    #[test]
    fn test_failed_fetch_sets_status_and_leaves_grid_unannotated() {
        let mut app = make_app(d(2024, 3, 15));
        app.apply_fetch_outcome(FetchOutcome {
            year: 2024,
            month: 3,
            result: Err(anyhow!("connection refused")),
        });
        assert!(app.annotations.is_none());
        let (msg, color) = app.status.as_ref().unwrap();
        assert!(msg.contains("connection refused"));
        assert_eq!(*color, Color::Red);
        // Grid still renders fully.
        assert_eq!(app.grid_lines().len(), 1 + 2 * app.grid().weeks().len());
    }

    #[test]
    fn test_failed_stale_fetch_is_ignored_entirely() {
        let mut app = make_app(d(2024, 3, 15));
        let stale = FetchOutcome {
            year: 2024,
            month: 3,
            result: Err(anyhow!("timed out")),
        };
        app.cursor.advance();
        app.apply_fetch_outcome(stale);
        assert!(app.status.is_none());
    }

    #[test]
    fn test_last_fetch_wins() {
        let mut app = make_app(d(2024, 3, 15));
        app.apply_fetch_outcome(ok_outcome(2024, 3, &[("15", 1)]));
        app.apply_fetch_outcome(ok_outcome(2024, 3, &[("15", 5)]));
        assert_eq!(app.annotations.as_ref().unwrap().count_for(15), 5);
    }

    // ── key handling ──────────────────────────────────────────────────────────

    #[test]
    fn test_n_advances_december_into_next_january() {
        let mut app = make_app(d(2024, 12, 10));
        app.annotations = Some(AnnotationMap::from_pairs(&[("10", 1)]));
        app.handle_key(KeyCode::Char('n'), KeyModifiers::NONE);
        assert_eq!(app.cursor, MonthCursor { year: 2025, month0: 0 });
        // Navigation clears the old month's overlay.
        assert!(app.annotations.is_none());
    }

    #[test]
    fn test_p_retreats_january_into_previous_december() {
        let mut app = make_app(d(2024, 1, 10));
        app.handle_key(KeyCode::Char('p'), KeyModifiers::NONE);
        assert_eq!(app.cursor, MonthCursor { year: 2023, month0: 11 });
    }

    #[test]
    fn test_navigation_clamps_selection_to_shorter_month() {
        let mut app = make_app(d(2024, 1, 31));
        app.handle_key(KeyCode::Char('n'), KeyModifiers::NONE);
        assert_eq!(app.selected_day, 29); // February 2024 is a leap month
        app.handle_key(KeyCode::Char('n'), KeyModifiers::NONE);
        assert_eq!(app.selected_day, 29); // carried into March unchanged
    }

    #[test]
    fn test_arrow_selection_clamps_at_month_edges() {
        let mut app = make_app(d(2024, 3, 1));
        app.handle_key(KeyCode::Left, KeyModifiers::NONE);
        assert_eq!(app.selected_day, 1);
        app.handle_key(KeyCode::Up, KeyModifiers::NONE);
        assert_eq!(app.selected_day, 1);
        app.selected_day = 30;
        app.handle_key(KeyCode::Down, KeyModifiers::NONE);
        assert_eq!(app.selected_day, 31);
    }

    #[test]
    fn test_arrow_selection_moves_within_month() {
        let mut app = make_app(d(2024, 3, 15));
        app.handle_key(KeyCode::Right, KeyModifiers::NONE);
        assert_eq!(app.selected_day, 16);
        app.handle_key(KeyCode::Down, KeyModifiers::NONE);
        assert_eq!(app.selected_day, 23);
        app.handle_key(KeyCode::Up, KeyModifiers::NONE);
        assert_eq!(app.selected_day, 16);
    }

    #[test]
    fn test_quit_keys() {
        let mut app = make_app(d(2024, 3, 15));
        assert!(app.handle_key(KeyCode::Char('q'), KeyModifiers::NONE));
        assert!(app.handle_key(KeyCode::Esc, KeyModifiers::NONE));
        assert!(app.handle_key(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(!app.handle_key(KeyCode::Char('z'), KeyModifiers::NONE));
    }

    // ── add-event destination ─────────────────────────────────────────────────

    #[test]
    fn test_add_event_destination_is_zero_padded() {
        let mut app = make_app(d(2024, 3, 15));
        app.selected_day = 5;
        assert_eq!(
            app.add_event_destination().unwrap(),
            "http://127.0.0.1:0/calendar/add?date=2024-03-05"
        );
    }

    // ── grid line shape ───────────────────────────────────────────────────────

    #[test]
    fn test_grid_lines_are_header_plus_two_per_week() {
        let app = make_app(d(2024, 3, 15));
        // March 2024 starts on a Friday: 4 blanks + 31 days = 5 week rows.
        assert_eq!(app.grid().weeks().len(), 5);
        assert_eq!(app.grid_lines().len(), 1 + 2 * 5);
    }

    #[test]
    fn test_header_line_is_monday_first() {
        let app = make_app(d(2024, 3, 15));
        let header: String = app.grid_lines()[0]
            .spans
            .iter()
            .map(|s| s.content.as_ref())
            .collect();
        assert!(header.starts_with("Mon"));
        assert!(header.contains("Sun"));
    }

    #[test]
    fn test_annotated_day_renders_its_dots() {
        let mut app = make_app(d(2024, 3, 15));
        app.apply_fetch_outcome(ok_outcome(2024, 3, &[("15", 3)]));
        let dot_count: usize = app
            .grid_lines()
            .iter()
            .flat_map(|line| line.spans.iter())
            .filter(|span| span.content.as_ref() == "•")
            .count();
        assert_eq!(dot_count, 3);
    }

    #[test]
    fn test_overflow_day_renders_seven_dots_and_suffix() {
        let mut app = make_app(d(2024, 3, 15));
        app.apply_fetch_outcome(ok_outcome(2024, 3, &[("10", 9)]));
        let spans: Vec<String> = app
            .grid_lines()
            .iter()
            .flat_map(|line| line.spans.iter())
            .map(|span| span.content.to_string())
            .collect();
        assert_eq!(spans.iter().filter(|s| s.as_str() == "•").count(), 7);
        assert!(spans.iter().any(|s| s == "+2"));
    }

    // ── pure helpers ──────────────────────────────────────────────────────────

    #[test]
    fn test_dot_spans_use_palette_in_order() {
        let spans = dot_spans(3);
        assert_eq!(spans.len(), 3);
        for (i, span) in spans.iter().enumerate() {
            assert_eq!(span.style.fg, Some(PALETTE[i]));
        }
    }

    #[test]
    fn test_dot_spans_overflow_suffix() {
        let spans = dot_spans(9);
        assert_eq!(spans.len(), 8);
        assert_eq!(spans[7].content.as_ref(), "+2");
        assert_eq!(spans[7].style.fg, Some(OVERFLOW_COLOR));
    }

    #[test]
    fn test_dot_spans_zero_is_empty() {
        assert!(dot_spans(0).is_empty());
    }

    #[test]
    fn test_style_selected_wins_over_today() {
        let s = day_number_style(true, true, false);
        assert_eq!(
            s,
            Style::default()
                .fg(Color::Black)
                .bg(Color::Yellow)
                .add_modifier(Modifier::BOLD)
        );
    }

    #[test]
    fn test_style_selected_plain() {
        let s = day_number_style(true, false, false);
        assert_eq!(
            s,
            Style::default()
                .fg(Color::Black)
                .bg(Color::White)
                .add_modifier(Modifier::BOLD)
        );
    }

    #[test]
    fn test_style_today_not_selected() {
        let s = day_number_style(false, true, true);
        assert_eq!(
            s,
            Style::default().add_modifier(Modifier::REVERSED | Modifier::BOLD)
        );
    }

    #[test]
    fn test_style_has_events() {
        let s = day_number_style(false, false, true);
        assert_eq!(s, Style::default().fg(Color::Cyan));
    }

    #[test]
    fn test_style_plain_day() {
        let s = day_number_style(false, false, false);
        assert_eq!(s, Style::default());
    }
}
