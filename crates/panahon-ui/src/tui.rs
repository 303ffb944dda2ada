//! Interactive terminal front end.

use std::sync::mpsc::Receiver;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use panahon_weather::{Catalog, WeatherCategory};
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Position, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    DefaultTerminal, Frame,
};

use crate::service::WeatherService;
use crate::state::{Command, Outcome, WidgetState};
use crate::view::{Backdrop, Decoration, WeatherPanel, WeatherView};

/// Terminal application state
pub struct TuiApp {
    state: WidgetState,
    catalog: Arc<Catalog>,
    service: WeatherService,
    outcomes: Receiver<Outcome>,
    backdrop: Backdrop,
    cursor: usize,
    slots: usize,
    started: Instant,
    should_quit: bool,
}

impl TuiApp {
    pub fn new(
        catalog: Arc<Catalog>,
        service: WeatherService,
        outcomes: Receiver<Outcome>,
        slots: usize,
    ) -> Self {
        Self {
            state: WidgetState::new(),
            catalog,
            service,
            outcomes,
            backdrop: Backdrop::build(None),
            cursor: 0,
            slots,
            started: Instant::now(),
            should_quit: false,
        }
    }

    fn run_command(&self, command: Option<Command>) {
        if let Some(command) = command {
            self.service.dispatch(command);
        }
    }

    /// Rebuilt after every transition, like a re-render.
    fn state_changed(&mut self) {
        self.backdrop = Backdrop::build(self.state.snapshot());
    }

    fn drain_outcomes(&mut self) {
        while let Ok(outcome) = self.outcomes.try_recv() {
            let command = self.state.apply(outcome);
            self.run_command(command);
            self.state_changed();
        }
    }

    fn option_count(&self) -> usize {
        self.catalog.filter(self.state.search()).len()
    }

    fn edit_search(&mut self, edit: impl FnOnce(&mut String)) {
        let mut text = self.state.search().to_string();
        edit(&mut text);
        self.state.set_search(text);
        self.cursor = 0;
        self.state_changed();
    }

    fn choose_highlighted(&mut self) {
        let chosen = self
            .catalog
            .filter(self.state.search())
            .get(self.cursor)
            .map(|m| m.name.clone());
        if let Some(name) = chosen {
            let command = self.state.select(name);
            self.run_command(command);
            self.state_changed();
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true
            }
            KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.edit_search(String::clear)
            }
            KeyCode::Char(c) => self.edit_search(|s| s.push(c)),
            KeyCode::Backspace => self.edit_search(|s| {
                s.pop();
            }),
            KeyCode::Up => self.cursor = self.cursor.saturating_sub(1),
            KeyCode::Down => {
                let count = self.option_count();
                if count > 0 {
                    self.cursor = (self.cursor + 1).min(count - 1);
                }
            }
            KeyCode::Enter => self.choose_highlighted(),
            _ => {}
        }
    }
}

/// Take over the terminal, run the widget until quit, then restore the screen.
pub fn launch(app: &mut TuiApp) -> Result<()> {
    let mut terminal = ratatui::try_init()?;
    let result = run(&mut terminal, app);
    ratatui::restore();
    result
}

/// Main loop: apply finished lookups, draw, handle input.
pub fn run(terminal: &mut DefaultTerminal, app: &mut TuiApp) -> Result<()> {
    let command = app.state.catalog_loaded(app.catalog.len());
    app.run_command(command);

    loop {
        app.drain_outcomes();

        terminal.draw(|frame| render(frame, app))?;

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.handle_key(key);
                }
            }
        }

        if app.should_quit {
            tracing::info!("Quit requested");
            return Ok(());
        }
    }
}

fn render(frame: &mut Frame, app: &TuiApp) {
    let view = WeatherView::build(&app.state, &app.catalog, app.slots);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(36), Constraint::Min(30)])
        .split(frame.area());

    render_controls(frame, &view, app.cursor, columns[0]);
    render_weather(frame, &view, &app.backdrop, app.started.elapsed(), columns[1]);
}

fn render_controls(frame: &mut Frame, view: &WeatherView<'_>, cursor: usize, area: Rect) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Search input
            Constraint::Min(3),    // Municipality list
            Constraint::Length(1), // Key help
        ])
        .split(area);

    let search = Paragraph::new(format!("{}▏", view.search)).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Search Municipality "),
    );
    frame.render_widget(search, rows[0]);

    let items: Vec<ListItem> = view
        .options
        .iter()
        .map(|m| {
            let style = if m.name == view.selection {
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            ListItem::new(Line::from(vec![
                Span::styled(m.name.clone(), style),
                Span::styled(
                    format!("  {}", m.province),
                    Style::default().fg(Color::DarkGray),
                ),
            ]))
        })
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" Choose a Municipality ({}) ", view.options.len())),
        )
        .highlight_style(Style::default().bg(Color::DarkGray))
        .highlight_symbol("> ");

    let mut list_state = ListState::default();
    if !view.options.is_empty() {
        list_state.select(Some(cursor.min(view.options.len() - 1)));
    }
    frame.render_stateful_widget(list, rows[1], &mut list_state);

    let help = Paragraph::new("type: search  ↑↓: move  enter: select  esc: quit")
        .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(help, rows[2]);
}

fn sky_colour(category: WeatherCategory) -> Color {
    match category {
        WeatherCategory::Clear => Color::Rgb(70, 140, 220),
        WeatherCategory::PartlyCloudy => Color::Rgb(100, 150, 200),
        WeatherCategory::Overcast => Color::Rgb(110, 115, 125),
        WeatherCategory::Fog => Color::Rgb(150, 150, 150),
        WeatherCategory::Drizzle => Color::Rgb(90, 110, 140),
        WeatherCategory::Rain => Color::Rgb(50, 70, 100),
        WeatherCategory::Snow => Color::Rgb(170, 185, 210),
        WeatherCategory::Showers => Color::Rgb(60, 90, 120),
        WeatherCategory::Storm => Color::Rgb(35, 35, 55),
    }
}

fn render_weather(
    frame: &mut Frame,
    view: &WeatherView<'_>,
    backdrop: &Backdrop,
    elapsed: Duration,
    area: Rect,
) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(Span::styled(
            " Weather App ",
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        ))
        .style(Style::default().bg(sky_colour(backdrop.category)).fg(Color::White));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    paint_decoration(frame.buffer_mut(), inner, &backdrop.decoration, elapsed.as_secs_f64());

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(2), Constraint::Min(0)])
        .split(inner);

    if let Some(status) = view.status {
        let message = Paragraph::new(status)
            .style(Style::default().fg(Color::LightRed).add_modifier(Modifier::BOLD))
            .wrap(Wrap { trim: true });
        frame.render_widget(message, rows[0]);
    }

    if let Some(panel) = &view.panel {
        render_panel(frame, panel, rows[1]);
    }
}

fn render_panel(frame: &mut Frame, panel: &WeatherPanel, area: Rect) {
    let mut lines = vec![
        Line::from(Span::styled(
            panel.heading.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(vec![
            Span::raw("Condition            "),
            Span::styled(panel.description, Style::default().add_modifier(Modifier::BOLD)),
        ]),
        Line::from(vec![
            Span::raw("Current Temperature  "),
            Span::styled(
                panel.temperature.clone(),
                Style::default().fg(Color::LightCyan).add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(""),
        Line::from(Span::styled(
            "Next Hours Forecast",
            Style::default().add_modifier(Modifier::UNDERLINED),
        )),
    ];

    // Four slots per row, like the grid it replaces.
    for chunk in panel.slots.chunks(4) {
        let times: Vec<Span> = chunk
            .iter()
            .map(|s| Span::raw(format!("{:<10}", s.label)))
            .collect();
        let temps: Vec<Span> = chunk
            .iter()
            .map(|s| {
                Span::styled(
                    format!("{:<10}", s.temperature),
                    Style::default().add_modifier(Modifier::BOLD),
                )
            })
            .collect();
        lines.push(Line::from(times));
        lines.push(Line::from(temps));
    }

    frame.render_widget(Paragraph::new(lines), area);
}

fn put(buf: &mut Buffer, x: u16, y: u16, symbol: &str, fg: Color) {
    if let Some(cell) = buf.cell_mut(Position::new(x, y)) {
        cell.set_symbol(symbol).set_fg(fg);
    }
}

fn paint_drops(buf: &mut Buffer, area: Rect, drops: &[crate::view::Raindrop], t: f64) {
    for drop in drops {
        let x = area.x + ((drop.left_pct / 100.0) * f64::from(area.width)) as u16;
        let phase = ((t + drop.delay_secs) % drop.duration_secs) / drop.duration_secs;
        let y = area.y + (phase * f64::from(area.height)) as u16;
        if x < area.right() && y < area.bottom() {
            put(buf, x, y, "│", Color::LightBlue);
        }
    }
}

/// Offset into `0..width` for a position that grows without bound.
fn wrap(offset: f64, width: u16) -> u16 {
    (offset.rem_euclid(f64::from(width)) as u16).min(width.saturating_sub(1))
}

fn paint_decoration(buf: &mut Buffer, area: Rect, decoration: &Decoration, t: f64) {
    if area.width == 0 || area.height == 0 {
        return;
    }

    match decoration {
        Decoration::None => {}
        Decoration::Fog { layers } => {
            for layer in 0..*layers {
                let y = area.y + area.height * (layer as u16 + 1) / (*layers as u16 + 1);
                let shift = wrap(t * (2.0 + layer as f64), area.width);
                for dx in 0..area.width {
                    if (dx + shift) % 3 != 0 {
                        put(buf, area.x + dx, y, "░", Color::Gray);
                    }
                }
            }
        }
        Decoration::Clouds { count } => {
            for i in 0..*count {
                let base = area.width * i as u16 / *count as u16;
                let x = area.x + wrap(f64::from(base) + t * (1.0 + i as f64), area.width);
                let y = area.y + (i as u16 * 2) % area.height;
                put(buf, x, y, "☁", Color::Gray);
            }
        }
        Decoration::Rain { drops } => paint_drops(buf, area, drops, t),
        Decoration::Storm { drops } => {
            if t % 4.0 < 0.12 {
                buf.set_style(area, Style::default().bg(Color::Rgb(200, 200, 230)));
            }
            paint_drops(buf, area, drops, t);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::Raindrop;

    #[test]
    fn drops_stay_inside_area() {
        let area = Rect::new(2, 1, 20, 10);
        let mut buf = Buffer::empty(Rect::new(0, 0, 30, 15));
        let drops = vec![
            Raindrop { left_pct: 99.9, duration_secs: 0.5, delay_secs: 1.99 },
            Raindrop { left_pct: 0.0, duration_secs: 1.0, delay_secs: 0.0 },
        ];
        paint_drops(&mut buf, area, &drops, 0.49);

        for y in 0..15 {
            for x in 0..30 {
                let inside = area.contains(Position::new(x, y));
                if !inside {
                    assert_eq!(buf[(x, y)].symbol(), " ");
                }
            }
        }
        assert_eq!(buf[(2, 5)].symbol(), "│");
    }

    #[test]
    fn fog_draws_requested_layers() {
        let area = Rect::new(0, 0, 12, 6);
        let mut buf = Buffer::empty(area);
        paint_decoration(&mut buf, area, &Decoration::Fog { layers: 2 }, 0.0);
        let rows_with_fog = (0..6)
            .filter(|&y| (0..12).any(|x| buf[(x, y)].symbol() == "░"))
            .count();
        assert_eq!(rows_with_fog, 2);
    }

    #[test]
    fn drift_keeps_moving_after_hours() {
        let width = 40;
        // Past the point where a plain cast to u16 saturates.
        let late = 7.0 * 3600.0 * 3.0;
        assert_ne!(wrap(late, width), wrap(late + 1.0, width));
        assert!(wrap(late, width) < width);
        assert_eq!(wrap(f64::from(width) * 1000.0 + 5.0, width), 5);
    }

    #[test]
    fn clouds_move_late_in_the_session() {
        let area = Rect::new(0, 0, 30, 6);
        let cloud_columns = |t: f64| {
            let mut buf = Buffer::empty(area);
            paint_decoration(&mut buf, area, &Decoration::Clouds { count: 3 }, t);
            (0..30).filter(|&x| buf[(x, 0)].symbol() == "☁").collect::<Vec<u16>>()
        };
        let t = 70_000.0;
        assert_ne!(cloud_columns(t), cloud_columns(t + 2.0));
    }

    #[test]
    fn zero_sized_area_is_ignored() {
        let mut buf = Buffer::empty(Rect::new(0, 0, 4, 4));
        paint_decoration(
            &mut buf,
            Rect::new(0, 0, 0, 0),
            &Decoration::Clouds { count: 3 },
            1.0,
        );
        assert_eq!(buf[(0, 0)].symbol(), " ");
    }
}
