//! `dashlens render`: page description to static HTML.

use dashlens_core::html::escape;

pub fn run(page_path: &str, config_path: Option<&str>, output: Option<&str>) {
    let config = super::load_config(config_path);
    let page = super::load_page(page_path);
    let mut dashboard = super::build_dashboard(&page, config, 0);

    // Run fills and overlay timers to completion so the export is final.
    let settled = dashboard.surface_mut().settle();
    log::debug!("settled {} scheduled actions", settled.len());

    let title = page.title.as_deref().unwrap_or("Dashboard");
    let html = document(title, &dashboard.surface().document_html());

    match output {
        Some(path) => match std::fs::write(path, html) {
            Ok(()) => println!("Wrote {path}"),
            Err(e) => {
                eprintln!("Failed to write {path}: {e}");
                std::process::exit(1);
            }
        },
        None => println!("{html}"),
    }
}

fn document(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n</head>\n{body}\n</html>",
        escape(title)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_escapes_title() {
        let html = document("A <b> B", "<body></body>");
        assert!(html.contains("<title>A &lt;b&gt; B</title>"));
        assert!(html.ends_with("<body></body>\n</html>"));
    }
}
