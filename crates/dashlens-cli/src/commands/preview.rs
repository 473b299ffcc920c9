//! `dashlens preview`: terminal preview of a page.

use crate::tui::app::{App, build_views};

pub fn run(page_path: &str, config_path: Option<&str>) {
    let config = super::load_config(config_path);
    let page = super::load_page(page_path);
    let views = match build_views(&page, &config) {
        Ok(v) => v,
        Err(e) => {
            eprintln!("Failed to prepare preview: {e}");
            std::process::exit(1);
        }
    };
    let title = page.title.clone().unwrap_or_else(|| page_path.to_string());
    let mut app = App::new(title, views);
    if let Err(e) = app.run() {
        eprintln!("Terminal error: {e}");
        std::process::exit(1);
    }
}
