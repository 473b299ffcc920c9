//! CLI for dashlens, adaptive dashboards, offline.

mod commands;
mod tui;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "dashlens")]
#[command(about = "dashlens: charts, heatmaps, gauges and narratives that notice their reader")]
#[command(version = dashlens_core::VERSION)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a page description to static HTML (animations settled)
    Render {
        /// Page description (JSON)
        page: String,

        /// Engine configuration (JSON); defaults when omitted
        #[arg(long)]
        config: Option<String>,

        /// Write HTML here instead of stdout
        #[arg(long)]
        output: Option<String>,
    },

    /// Interpolate a value against a dataset and show the resulting color
    Color {
        /// Value to color
        #[arg(long, allow_hyphen_values = true)]
        value: f64,

        /// Comma-separated dataset the value is normalized against
        #[arg(long, allow_hyphen_values = true)]
        data: String,

        /// Comma-separated gradient stops (hex or rgb()); palette default when omitted.
        /// Separate stops with ';' when using rgb() notation.
        #[arg(long)]
        stops: Option<String>,

        #[arg(long)]
        config: Option<String>,
    },

    /// Generate the impact narrative for a metric card
    Narrate {
        /// Card label, e.g. "Accuracy"
        #[arg(long)]
        label: String,

        /// Card value as displayed, e.g. "96%"
        #[arg(long, allow_hyphen_values = true)]
        value: String,

        /// Print machine-readable JSON
        #[arg(long)]
        json: bool,
    },

    /// Replay a recorded page event log and print every reaction
    Replay {
        /// JSON array of page events
        events: String,

        /// Page the events were recorded against
        #[arg(long)]
        page: Option<String>,

        #[arg(long)]
        config: Option<String>,

        /// Seed for overlay decoration
        #[arg(long, default_value = "0")]
        seed: u64,
    },

    /// Interactive terminal preview of a page (TUI)
    Preview {
        /// Page description (JSON)
        page: String,

        #[arg(long)]
        config: Option<String>,
    },
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Render {
            page,
            config,
            output,
        } => commands::render::run(&page, config.as_deref(), output.as_deref()),
        Commands::Color {
            value,
            data,
            stops,
            config,
        } => commands::color::run(value, &data, stops.as_deref(), config.as_deref()),
        Commands::Narrate { label, value, json } => commands::narrate::run(&label, &value, json),
        Commands::Replay {
            events,
            page,
            config,
            seed,
        } => commands::replay::run(&events, page.as_deref(), config.as_deref(), seed),
        Commands::Preview { page, config } => commands::preview::run(&page, config.as_deref()),
    }
}
