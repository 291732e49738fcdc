//! The dashboard as a ratatui screen.
//!
//! [`Screen`] keeps whatever the core writes to it; [`render`] turns that
//! into one frame.

use std::collections::HashMap;

use nowcast_core::{
    Classification, Element, Surface, WeatherCategory, WeatherIcon,
    chart::TemperatureChart,
    particles::{Shape, ShapeBuffer},
    view::{ChartId, DailyCard, HourlyRow},
};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{
        Axis, Block, Borders, Cell, Chart, Dataset, GraphType, List, ListItem, ListState,
        Paragraph, Row, Table, Wrap,
        canvas::{Canvas, Circle, Line as CanvasLine},
    },
};

/// Particle coordinates per terminal cell.
pub const CELL_WIDTH: f64 = 8.0;
pub const CELL_HEIGHT: f64 = 16.0;

const CHART_STEPS: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Normal,
    Search,
}

/// Search box contents that are not part of the [`Surface`].
#[derive(Debug, Clone, Copy)]
pub struct Overlay<'a> {
    pub mode: Mode,
    pub query: &'a str,
    pub selected: usize,
}

#[derive(Debug, Default)]
pub struct Screen {
    texts: HashMap<Element, String>,
    icon: Option<WeatherIcon>,
    classification: Option<Classification>,
    hourly: Vec<HourlyRow>,
    daily: Vec<DailyCard>,
    suggestions: Vec<String>,
    chart: Option<(ChartId, TemperatureChart)>,
    next_chart: u64,
}

impl Screen {
    fn text(&self, element: Element) -> &str {
        self.texts.get(&element).map(String::as_str).unwrap_or("")
    }

    pub fn suggestions(&self) -> &[String] {
        &self.suggestions
    }

    pub fn chart(&self) -> Option<&TemperatureChart> {
        self.chart.as_ref().map(|(_, chart)| chart)
    }

    fn accent(&self) -> Color {
        match self.classification.map(|c| c.category) {
            Some(WeatherCategory::Rain) => Color::Blue,
            Some(WeatherCategory::Cloudy) => Color::Gray,
            Some(WeatherCategory::Sunny) => Color::Yellow,
            None => Color::DarkGray,
        }
    }
}

impl Surface for Screen {
    fn set_text(&mut self, element: Element, text: &str) {
        self.texts.insert(element, text.to_string());
    }

    fn set_image(&mut self, element: Element, asset: &str) {
        if element == Element::WeatherIcon {
            self.icon = WeatherIcon::from_asset(asset);
        }
    }

    fn set_classification(&mut self, classification: Classification) {
        self.classification = Some(classification);
    }

    fn replace_hourly(&mut self, rows: &[HourlyRow]) {
        self.hourly = rows.to_vec();
    }

    fn replace_daily(&mut self, cards: &[DailyCard]) {
        self.daily = cards.to_vec();
    }

    fn replace_suggestions(&mut self, labels: &[String]) {
        self.suggestions = labels.to_vec();
    }

    fn create_chart(&mut self, chart: &TemperatureChart) -> ChartId {
        self.next_chart += 1;
        let id = ChartId(self.next_chart);
        self.chart = Some((id, chart.clone()));
        id
    }

    fn destroy_chart(&mut self, id: ChartId) {
        if self.chart.as_ref().is_some_and(|(current, _)| *current == id) {
            self.chart = None;
        }
    }
}

/// Draw one frame. Returns the inner area of the particle panel so the
/// caller can keep the field's size in sync.
pub fn render(f: &mut Frame, screen: &Screen, overlay: Overlay<'_>, shapes: &ShapeBuffer) -> Rect {
    let area = f.size();
    let accent = screen.accent();

    let outer = Block::default()
        .borders(Borders::ALL)
        .title(Line::from(vec![
            Span::styled(" nowcast ", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(" "),
            Span::styled(screen.text(Element::Location).to_string(), Style::default().fg(Color::Cyan)),
            Span::raw("  "),
            Span::raw(screen.text(Element::Date).to_string()),
            Span::raw(" "),
        ]))
        .border_style(Style::default().fg(accent));
    let inner = outer.inner(area);
    f.render_widget(outer, area);

    let search_height = match overlay.mode {
        Mode::Search => 3 + screen.suggestions.len() as u16,
        Mode::Normal => 0,
    };
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(search_height),
            Constraint::Length(7),
            Constraint::Min(8),
            Constraint::Length(3),
        ])
        .split(inner);

    if overlay.mode == Mode::Search {
        render_search(f, rows[0], screen, overlay);
    }

    let top = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[1]);
    render_current(f, top[0], screen);
    let particle_area = render_particles(f, top[1], screen, shapes);

    let middle = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Min(30),
            Constraint::Length(24),
            Constraint::Length(22),
        ])
        .split(rows[2]);
    render_chart(f, middle[0], screen);
    render_hourly(f, middle[1], screen);
    render_daily(f, middle[2], screen);

    render_footer(f, rows[3], screen);

    particle_area
}

fn render_current(f: &mut Frame, area: Rect, screen: &Screen) {
    let block = Block::default().borders(Borders::ALL).title("Now");
    let glyph = screen.icon.map(WeatherIcon::glyph).unwrap_or(" ");
    let mood = screen.classification.map(|c| c.to_string()).unwrap_or_default();

    let mut lines = vec![
        Line::from(vec![
            Span::styled(glyph, Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(" "),
            Span::styled(
                screen.text(Element::Temperature).to_string(),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::raw(" "),
            Span::styled(
                format!("[{}]", screen.text(Element::UnitToggle)),
                Style::default().fg(Color::Cyan),
            ),
            Span::raw("  "),
            Span::raw(mood),
        ]),
        Line::from(format!(
            "Feels like {}   Humidity {}",
            screen.text(Element::FeelsLike),
            screen.text(Element::Humidity)
        )),
        Line::from(format!(
            "Wind {}   Precipitation {}",
            screen.text(Element::Wind),
            screen.text(Element::Precipitation)
        )),
    ];
    if let Some(aqi) = screen.texts.get(&Element::Aqi) {
        lines.push(Line::from(aqi.clone()));
    }

    f.render_widget(Paragraph::new(lines).block(block).wrap(Wrap { trim: true }), area);
}

fn render_particles(f: &mut Frame, area: Rect, screen: &Screen, shapes: &ShapeBuffer) -> Rect {
    let block = Block::default().borders(Borders::ALL);
    let inner = block.inner(area);
    let width = f64::from(inner.width) * CELL_WIDTH;
    let height = f64::from(inner.height) * CELL_HEIGHT;
    let color = screen.accent();

    let canvas = Canvas::default()
        .block(block)
        .marker(Marker::Braille)
        .x_bounds([0.0, width])
        .y_bounds([0.0, height])
        .paint(|ctx| {
            // Particle y grows downwards, canvas y upwards.
            for shape in &shapes.shapes {
                match *shape {
                    Shape::Line { from, to } => ctx.draw(&CanvasLine {
                        x1: from.0,
                        y1: height - from.1,
                        x2: to.0,
                        y2: height - to.1,
                        color,
                    }),
                    Shape::Circle { center, radius } => ctx.draw(&Circle {
                        x: center.0,
                        y: height - center.1,
                        radius,
                        color,
                    }),
                }
            }
        });
    f.render_widget(canvas, area);

    inner
}

fn render_chart(f: &mut Frame, area: Rect, screen: &Screen) {
    let block = Block::default().borders(Borders::ALL).title("Next 12 hours");
    let Some(chart) = screen.chart().filter(|c| !c.is_empty()) else {
        f.render_widget(Paragraph::new("Waiting for the forecast…").block(block), area);
        return;
    };
    let Some((lo, hi)) = chart.bounds() else {
        return;
    };

    let points = chart.smoothed(CHART_STEPS);
    let (y_lo, y_hi) = (lo.floor() - 1.0, hi.ceil() + 1.0);
    let last = (chart.len().max(2) - 1) as f64;

    let x_labels = [chart.labels.first(), chart.labels.last()]
        .into_iter()
        .flatten()
        .map(|l| Span::raw(l.clone()))
        .collect();
    let y_labels = vec![Span::raw(format!("{y_lo:.0}")), Span::raw(format!("{y_hi:.0}"))];

    let dataset = Dataset::default()
        .marker(Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(screen.accent()))
        .data(&points);

    let widget = Chart::new(vec![dataset])
        .block(block)
        .x_axis(Axis::default().bounds([0.0, last]).labels(x_labels))
        .y_axis(Axis::default().bounds([y_lo, y_hi]).labels(y_labels));
    f.render_widget(widget, area);
}

fn render_hourly(f: &mut Frame, area: Rect, screen: &Screen) {
    let rows: Vec<Row> = screen
        .hourly
        .iter()
        .map(|h| {
            Row::new(vec![
                Cell::from(h.time.clone()),
                Cell::from(h.icon.glyph()),
                Cell::from(h.temperature.clone()),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [Constraint::Length(6), Constraint::Length(3), Constraint::Length(6)],
    )
    .block(Block::default().borders(Borders::ALL).title("Hourly"))
    .column_spacing(1);
    f.render_widget(table, area);
}

fn render_daily(f: &mut Frame, area: Rect, screen: &Screen) {
    let rows: Vec<Row> = screen
        .daily
        .iter()
        .map(|d| {
            Row::new(vec![
                Cell::from(d.date.clone()),
                Cell::from(d.icon.glyph()),
                Cell::from(d.temperature.clone()),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [Constraint::Length(6), Constraint::Length(3), Constraint::Length(6)],
    )
    .block(Block::default().borders(Borders::ALL).title("Daily"))
    .column_spacing(1);
    f.render_widget(table, area);
}

fn render_search(f: &mut Frame, area: Rect, screen: &Screen, overlay: Overlay<'_>) {
    let parts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)])
        .split(area);

    let input = Paragraph::new(format!("{}▏", overlay.query))
        .block(Block::default().borders(Borders::ALL).title("Search a city"));
    f.render_widget(input, parts[0]);

    let items: Vec<ListItem> = screen
        .suggestions
        .iter()
        .map(|label| ListItem::new(label.clone()))
        .collect();
    let list = List::new(items)
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");
    let mut state = ListState::default().with_selected(if screen.suggestions.is_empty() {
        None
    } else {
        Some(overlay.selected)
    });
    f.render_stateful_widget(list, parts[1], &mut state);
}

fn render_footer(f: &mut Frame, area: Rect, screen: &Screen) {
    let key = |k: &'static str| Span::styled(k, Style::default().add_modifier(Modifier::BOLD));
    let mut spans = vec![
        key("q"),
        Span::raw(" quit  "),
        key("u"),
        Span::raw(" °C/°F  "),
        key("r"),
        Span::raw(" refresh  "),
        key("/"),
        Span::raw(" search"),
    ];

    let status = screen.text(Element::Status);
    if !status.is_empty() {
        spans.push(Span::raw("   "));
        spans.push(Span::styled(status.to_string(), Style::default().fg(Color::Red)));
    }

    f.render_widget(
        Paragraph::new(Line::from(spans)).block(Block::default().borders(Borders::ALL).title("Keys")),
        area,
    );
}
