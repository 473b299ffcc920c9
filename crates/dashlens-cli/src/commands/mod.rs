pub mod color;
pub mod narrate;
pub mod preview;
pub mod render;
pub mod replay;

use std::path::Path;

use dashlens_core::{Dashboard, EngineConfig, MemorySurface, PageSpec};

/// Load the engine configuration, or defaults when no path is given.
/// Exits on unreadable or invalid files.
pub fn load_config(path: Option<&str>) -> EngineConfig {
    let Some(path) = path else {
        return EngineConfig::default();
    };
    match EngineConfig::load_from_path(Path::new(path)) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config {path}: {e}");
            std::process::exit(1);
        }
    }
}

pub fn load_page(path: &str) -> PageSpec {
    let raw = match std::fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Failed to read {path}: {e}");
            std::process::exit(1);
        }
    };
    match PageSpec::from_json_str(&raw) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Failed to parse page {path}: {e}");
            std::process::exit(1);
        }
    }
}

/// Seed layout, render every widget and run the markup enhancements.
pub fn build_dashboard(page: &PageSpec, config: EngineConfig, seed: u64) -> Dashboard<MemorySurface> {
    let mut dashboard = Dashboard::with_seed(MemorySurface::new(), config, seed);
    if let Err(e) = dashboard.render_page(page) {
        eprintln!("Failed to render page: {e}");
        std::process::exit(1);
    }
    for (id, rect) in &page.layout {
        dashboard.surface_mut().set_bounding_box(id, *rect);
    }
    dashboard.install();
    dashboard
}

/// Parse a comma-separated list of numbers.
pub fn parse_numbers(csv: &str) -> Result<Vec<f64>, String> {
    csv.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<f64>().map_err(|_| format!("not a number: {s:?}")))
        .collect()
}

/// Split a stop list on ';' when present (rgb() stops contain commas),
/// otherwise on ','.
pub fn parse_stops(list: &str) -> Vec<String> {
    let sep = if list.contains(';') { ';' } else { ',' };
    list.split(sep)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
