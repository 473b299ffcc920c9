//! Preview state: one view per page widget, computed with the pure engine
//! functions (no surface involved).

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use dashlens_core::chart::{ChartSpec, DataValue, GaugeOptions};
use dashlens_core::color::{ColorScale, Rgb};
use dashlens_core::heatmap::{HeatMatrix, HeatmapGrid, layout_heatmap};
use dashlens_core::progress::{FALLBACK_BAND_COLOR, ProgressOptions, ProgressState, band_color};
use dashlens_core::{EngineConfig, MetricCard, Narrative, PageSpec, Result, WidgetSpec, generate};
use ratatui::{Terminal, backend::CrosstermBackend, widgets::ListState};

/// Which meter a [`View::Meter`] stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeterKind {
    Progress,
    Gauge,
}

#[derive(Debug, Clone)]
pub enum View {
    Chart {
        target: String,
        spec: ChartSpec,
    },
    Heatmap {
        target: String,
        title: Option<String>,
        matrix: HeatMatrix,
        grid: HeatmapGrid,
    },
    Meter {
        target: String,
        kind: MeterKind,
        state: ProgressState,
        color: Rgb,
    },
    Narrative {
        target: String,
        card: MetricCard,
        narrative: Narrative,
    },
}

impl View {
    pub fn target(&self) -> &str {
        match self {
            Self::Chart { target, .. }
            | Self::Heatmap { target, .. }
            | Self::Meter { target, .. }
            | Self::Narrative { target, .. } => target,
        }
    }

    pub fn kind_label(&self) -> String {
        match self {
            Self::Chart { spec, .. } => format!("{} chart", spec.kind),
            Self::Heatmap { .. } => "heatmap".into(),
            Self::Meter {
                kind: MeterKind::Progress,
                ..
            } => "progress".into(),
            Self::Meter {
                kind: MeterKind::Gauge,
                ..
            } => "gauge".into(),
            Self::Narrative { .. } => "metric".into(),
        }
    }
}

/// Parse a CSS color the engine produced; unknown notations fall back to the
/// default band color.
pub fn term_rgb(css: &str) -> Rgb {
    Rgb::parse(css)
        .or_else(|_| Rgb::parse(FALLBACK_BAND_COLOR))
        .unwrap_or(Rgb::BLACK)
}

fn meter(
    target: &str,
    kind: MeterKind,
    value: f64,
    max_value: f64,
    color: Option<&str>,
    bands: Option<&[dashlens_core::GaugeBand]>,
    config: &EngineConfig,
) -> Result<View> {
    let state = ProgressState::new(value, max_value)?;
    let bands = bands.unwrap_or(&config.palette.gauge_bands);
    let color = color.unwrap_or_else(|| band_color(bands, state.percentage));
    Ok(View::Meter {
        target: target.to_string(),
        kind,
        state,
        color: term_rgb(color),
    })
}

/// One view per widget, in page order.
pub fn build_views(page: &PageSpec, config: &EngineConfig) -> Result<Vec<View>> {
    let palette = &config.palette;
    page.widgets
        .iter()
        .map(|widget| match widget {
            WidgetSpec::Chart {
                target,
                kind,
                data,
                options,
            } => Ok(View::Chart {
                target: target.clone(),
                spec: ChartSpec::build(*kind, data.clone(), options.clone(), &palette.series),
            }),
            WidgetSpec::Gauge {
                target,
                value,
                max_value,
                options: GaugeOptions { bands, .. },
            } => meter(target, MeterKind::Gauge, *value, *max_value, None, bands.as_deref(), config),
            WidgetSpec::Progress {
                target,
                value,
                max_value,
                options: ProgressOptions { color, bands, .. },
            } => meter(
                target,
                MeterKind::Progress,
                *value,
                *max_value,
                color.as_deref(),
                bands.as_deref(),
                config,
            ),
            WidgetSpec::Heatmap {
                target,
                values,
                row_labels,
                col_labels,
                options,
            } => {
                let matrix = HeatMatrix::new(values.clone(), row_labels.clone(), col_labels.clone())?;
                let stops = options.color_scale.as_deref().unwrap_or(&palette.color_scale);
                let scale = ColorScale::new(stops)?;
                let grid = layout_heatmap(&matrix, &scale, options.unit.as_deref());
                Ok(View::Heatmap {
                    target: target.clone(),
                    title: options.title.clone(),
                    matrix,
                    grid,
                })
            }
            WidgetSpec::Metric { target, label, value } => {
                let card = MetricCard {
                    label: label.clone(),
                    value: value.clone(),
                };
                let narrative = generate(&card);
                Ok(View::Narrative {
                    target: target.clone(),
                    card,
                    narrative,
                })
            }
        })
        .collect()
}

/// Plain numbers of a chart's first dataset.
pub fn first_series(spec: &ChartSpec) -> Vec<f64> {
    spec.data
        .datasets
        .first()
        .map(|ds| {
            ds.data
                .iter()
                .map(|v| match v {
                    DataValue::Number(n) => *n,
                    DataValue::Point { y, .. } => *y,
                })
                .collect()
        })
        .unwrap_or_default()
}

pub struct App {
    title: String,
    views: Vec<View>,
    cursor: usize,
    list_state: ListState,
    running: bool,
}

impl App {
    pub fn new(title: String, views: Vec<View>) -> Self {
        Self {
            title,
            views,
            cursor: 0,
            list_state: ListState::default().with_selected(Some(0)),
            running: true,
        }
    }

    pub fn run(&mut self) -> io::Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        // Restore the terminal before a panic message is printed.
        let original_hook = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            let _ = disable_raw_mode();
            let _ = execute!(io::stdout(), LeaveAlternateScreen, crossterm::cursor::Show);
            original_hook(info);
        }));

        let result = self.run_loop(&mut terminal);

        let _ = std::panic::take_hook();
        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            crossterm::cursor::Show
        )?;
        result
    }

    fn run_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> io::Result<()> {
        while self.running {
            terminal.draw(|f| super::ui::draw(f, self))?;

            if event::poll(Duration::from_millis(50))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key.code);
                    }
                }
            }
        }
        Ok(())
    }

    pub fn handle_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char('q') | KeyCode::Esc => self.running = false,
            KeyCode::Up | KeyCode::Char('k') => {
                if self.cursor > 0 {
                    self.cursor -= 1;
                }
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.cursor + 1 < self.views.len() {
                    self.cursor += 1;
                }
            }
            KeyCode::Home => self.cursor = 0,
            KeyCode::End => self.cursor = self.views.len().saturating_sub(1),
            _ => {}
        }
        self.list_state.select(Some(self.cursor));
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn views(&self) -> &[View] {
        &self.views
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn selected(&self) -> Option<&View> {
        self.views.get(self.cursor)
    }

    pub fn list_state(&self) -> ListState {
        self.list_state.clone()
    }

    pub fn is_running(&self) -> bool {
        self.running
    }
}
