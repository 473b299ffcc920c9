//! TUI rendering.
//!
//! ┌──────────────────────────────────────────────┐
//! │  dashlens  Model health   3/5                │
//! ├─────────────────────┬────────────────────────┤
//! │  Widgets            │  load · heatmap        │
//! │  ▸ trend  line      │        AM     PM       │
//! │    uptime gauge     │  EU  [ 1 ]  [ 2 ]      │
//! │    load   heatmap   │  US  [ 3 ]  [ 4 ]      │
//! │    ...              │                        │
//! ├─────────────────────┴────────────────────────┤
//! │  ↑↓ navigate   q: quit                       │
//! └──────────────────────────────────────────────┘

use dashlens_core::TextColor;
use dashlens_core::chart::ChartSpec;
use dashlens_core::color::Rgb;
use dashlens_core::helpers::format_number;
use dashlens_core::heatmap::{HeatMatrix, HeatmapGrid};
use dashlens_core::{MetricCard, Narrative, ProgressState};
use ratatui::{prelude::*, widgets::*};

use super::app::{App, MeterKind, View, first_series, term_rgb};

const CELL_WIDTH: usize = 8;

pub fn draw(f: &mut Frame, app: &App) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // title
            Constraint::Min(8),    // main
            Constraint::Length(1), // keys
        ])
        .split(f.area());

    draw_title(f, rows[0], app);
    draw_main(f, rows[1], app);
    draw_keys(f, rows[2]);
}

fn color(rgb: Rgb) -> Color {
    Color::Rgb(rgb.r, rgb.g, rgb.b)
}

fn draw_title(f: &mut Frame, area: Rect, app: &App) {
    let position = if app.views().is_empty() {
        "empty".to_string()
    } else {
        format!("{}/{}", app.cursor() + 1, app.views().len())
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(Line::from(vec![
            Span::styled(" dashlens ", Style::default().bold().fg(Color::Cyan)),
            Span::styled(app.title().to_string(), Style::default().bold().fg(Color::Yellow)),
            Span::styled(format!("  {position} "), Style::default().fg(Color::DarkGray)),
        ]));
    f.render_widget(block, area);
}

fn draw_main(f: &mut Frame, area: Rect, app: &App) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(30), Constraint::Percentage(70)])
        .split(area);

    draw_widget_list(f, cols[0], app);

    match app.selected() {
        Some(view) => draw_view(f, cols[1], view),
        None => f.render_widget(
            Paragraph::new("Page has no widgets.").block(Block::bordered()),
            cols[1],
        ),
    }
}

fn draw_widget_list(f: &mut Frame, area: Rect, app: &App) {
    let items: Vec<ListItem> = app
        .views()
        .iter()
        .map(|v| {
            ListItem::new(Line::from(vec![
                Span::raw(format!("{:<12}", v.target())),
                Span::styled(v.kind_label(), Style::default().fg(Color::DarkGray)),
            ]))
        })
        .collect();
    let list = List::new(items)
        .block(Block::bordered().title(" Widgets "))
        .highlight_style(Style::default().bg(Color::DarkGray).fg(Color::White))
        .highlight_symbol("▸ ");
    let mut state = app.list_state();
    f.render_stateful_widget(list, area, &mut state);
}

fn draw_view(f: &mut Frame, area: Rect, view: &View) {
    let block = Block::bordered().title(format!(" {} · {} ", view.target(), view.kind_label()));
    match view {
        View::Chart { spec, .. } => draw_chart(f, area, block, spec),
        View::Heatmap {
            title,
            matrix,
            grid,
            ..
        } => draw_heatmap(f, area, block, title.as_deref(), matrix, grid),
        View::Meter {
            kind, state, color, ..
        } => draw_meter(f, area, block, *kind, state, *color),
        View::Narrative { card, narrative, .. } => draw_narrative(f, area, block, card, narrative),
    }
}

fn draw_chart(f: &mut Frame, area: Rect, block: Block, spec: &ChartSpec) {
    let inner = block.inner(area);
    f.render_widget(block, area);
    let parts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(6)])
        .split(inner);

    let mut lines = vec![Line::from(vec![
        Span::styled("renderer  ", Style::default().fg(Color::DarkGray)),
        Span::raw(spec.kind.renderer_type()),
    ])];
    if !spec.data.labels.is_empty() {
        lines.push(Line::from(vec![
            Span::styled("labels    ", Style::default().fg(Color::DarkGray)),
            Span::raw(spec.data.labels.join(", ")),
        ]));
    }
    for ds in &spec.data.datasets {
        let swatch = match &ds.border_color {
            Some(dashlens_core::chart::ColorValue::Single(c)) => color(term_rgb(c)),
            _ => Color::White,
        };
        lines.push(Line::from(vec![
            Span::styled("■ ", Style::default().fg(swatch)),
            Span::styled(format!("{}  ", ds.label), Style::default().bold()),
            Span::raw(format!("{} points", ds.data.len())),
        ]));
    }
    f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), parts[0]);

    let series = first_series(spec);
    if series.is_empty() {
        return;
    }
    let min = series.iter().copied().fold(f64::INFINITY, f64::min);
    let bars: Vec<u64> = series
        .iter()
        .map(|v| ((v - min) * 100.0).round().max(0.0) as u64 + 1)
        .collect();
    let sparkline = Sparkline::default()
        .block(Block::default().borders(Borders::TOP).title(" first series "))
        .data(&bars)
        .style(Style::default().fg(Color::Cyan));
    f.render_widget(sparkline, parts[1]);
}

fn draw_heatmap(f: &mut Frame, area: Rect, block: Block, title: Option<&str>, matrix: &HeatMatrix, grid: &HeatmapGrid) {
    let label_width = matrix
        .row_labels()
        .iter()
        .map(|l| l.chars().count())
        .max()
        .unwrap_or(0)
        + 1;

    let mut lines = Vec::new();
    if let Some(t) = title {
        lines.push(Line::from(Span::styled(t.to_string(), Style::default().bold())));
    }
    let mut header = vec![Span::raw(" ".repeat(label_width))];
    header.extend(
        matrix
            .col_labels()
            .iter()
            .map(|c| Span::styled(format!("{c:^w$}", w = CELL_WIDTH), Style::default().fg(Color::DarkGray))),
    );
    lines.push(Line::from(header));

    for (label, row) in matrix.row_labels().iter().zip(&grid.cells) {
        let mut spans = vec![Span::raw(format!("{label:<label_width$}"))];
        for cell in row {
            let fg = match cell.text_color {
                TextColor::Black => Color::Black,
                TextColor::White => Color::White,
            };
            let style = Style::default().bg(color(term_rgb(&cell.fill))).fg(fg);
            spans.push(Span::styled(
                format!("{:^w$}", format_number(cell.value), w = CELL_WIDTH),
                style,
            ));
        }
        lines.push(Line::from(spans));
    }
    if let Some(range) = grid.range {
        lines.push(Line::default());
        lines.push(Line::from(Span::styled(
            format!(
                "range {} .. {}",
                format_number(range.min),
                format_number(range.max)
            ),
            Style::default().fg(Color::DarkGray),
        )));
    }
    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn draw_meter(f: &mut Frame, area: Rect, block: Block, kind: MeterKind, state: &ProgressState, fill: Rgb) {
    let inner = block.inner(area);
    f.render_widget(block, area);
    let parts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)])
        .split(inner);

    let gauge = Gauge::default()
        .gauge_style(Style::default().fg(color(fill)))
        .ratio(state.percentage / 100.0)
        .label(state.label());
    f.render_widget(gauge, parts[0]);

    let detail = match kind {
        MeterKind::Progress => format!(
            "{} of {}",
            format_number(state.value),
            format_number(state.max_value)
        ),
        MeterKind::Gauge => format!(
            "value {}  max {}  band {}",
            format_number(state.value),
            format_number(state.max_value),
            fill.to_hex()
        ),
    };
    f.render_widget(
        Paragraph::new(detail).style(Style::default().fg(Color::DarkGray)),
        parts[1],
    );
}

fn draw_narrative(f: &mut Frame, area: Rect, block: Block, card: &MetricCard, narrative: &Narrative) {
    let mut lines = vec![
        Line::from(vec![
            Span::styled(card.value.to_string(), Style::default().bold().fg(Color::Yellow)),
            Span::raw("  "),
            Span::raw(card.label.clone()),
        ]),
        Line::default(),
        Line::from(narrative.story.clone()),
        Line::default(),
    ];
    for m in &narrative.metrics {
        lines.push(Line::from(vec![
            Span::styled(format!("{:>8}", m.value), Style::default().bold().fg(Color::Green)),
            Span::raw("  "),
            Span::raw(m.label.clone()),
        ]));
    }
    f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }).block(block), area);
}

fn draw_keys(f: &mut Frame, area: Rect) {
    let keys = Line::from(vec![
        Span::styled(" ↑↓/jk", Style::default().fg(Color::Cyan)),
        Span::raw(" navigate   "),
        Span::styled("Home/End", Style::default().fg(Color::Cyan)),
        Span::raw(" jump   "),
        Span::styled("q", Style::default().fg(Color::Cyan)),
        Span::raw(" quit"),
    ]);
    f.render_widget(Paragraph::new(keys), area);
}
