//! # dashlens-core
//!
//! **Dashboards that notice their reader.**
//!
//! `dashlens-core` renders charts, heatmaps, progress bars and gauges, turns
//! metric cards into short impact stories, and reacts to how a reader moves
//! through the page: celebratory moments on deep scrolls and repeated
//! exploration, contextual detail panels, and fading of secondary UI while a
//! visualization is in focus.
//!
//! ## Quick Start
//!
//! ```
//! use dashlens_core::{Dashboard, EngineConfig, MemorySurface, Node, ProgressOptions};
//!
//! let surface = MemorySurface::with_markup(vec![Node::new("div").id("quota")]);
//! let mut dashboard = Dashboard::new(surface, EngineConfig::default());
//!
//! let bar = dashboard
//!     .create_progress_bar("quota", 42.0, 200.0, &ProgressOptions::default())
//!     .unwrap();
//! assert_eq!(bar.state.percentage, 21.0);
//! ```
//!
//! ## Architecture
//!
//! Widgets → [`Node`] trees → [`Surface`] → host
//!
//! Derivation (color scales, narratives, banding, engagement rules) is pure.
//! Everything that touches a page goes through the [`Surface`] trait, which a
//! browser binding implements over the DOM and [`MemorySurface`] implements
//! over an in-memory tree with a virtual clock.

pub mod chart;
pub mod color;
pub mod config;
pub mod dashboard;
pub mod engagement;
pub mod error;
pub mod focus;
pub mod heatmap;
pub mod helpers;
pub mod html;
pub mod memory;
pub mod narrative;
pub mod page;
pub mod panel;
pub mod progress;
pub mod surface;
pub mod tooltip;

pub use chart::{
    ChartData, ChartHandle, ChartKind, ChartOptions, ChartSpec, Dataset, GaugeData, GaugeOptions,
};
pub use color::{ColorScale, Rgb, TextColor, ValueRange, contrast_text, hex_to_rgb, interpolate, rgb_to_hex};
pub use config::EngineConfig;
pub use dashboard::{Dashboard, PageEvent, Reaction};
pub use engagement::{EngagementState, EngagementTracker, Moment, create_success_moment};
pub use error::{Result, VizError};
pub use heatmap::{HeatMatrix, HeatmapGrid, HeatmapOptions};
pub use memory::MemorySurface;
pub use narrative::{MetricCard, MetricValue, Narrative, NarrativeTheme, generate};
pub use page::{PageSpec, RenderedPage, WidgetSpec};
pub use panel::ContextPanel;
pub use progress::{GaugeBand, ProgressOptions, ProgressState};
pub use surface::{Action, Node, Rect, Surface, Viewport};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
