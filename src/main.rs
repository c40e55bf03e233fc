//! CLI entry point for the BRT analytics dashboard.
//!
//! Loads the load, critical-segment and station tables, applies the filter
//! selection given on the command line and prints or exports the derived views.

use anyhow::Result;
use brt_analytics::adapters::dashboard_charts;
use brt_analytics::cache::DatasetCache;
use brt_analytics::config::{
    DEFAULT_CRITICAL_SOURCE, DEFAULT_LOAD_SOURCE, DEFAULT_STATIONS_SOURCE, DashboardConfig,
};
use brt_analytics::fetch::{BasicClient, SourceLocations, fetch_sources};
use brt_analytics::filter::FilterSelection;
use brt_analytics::output::{export_views, write_json, write_rows};
use brt_analytics::session::Session;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::ffi::OsStr;
use std::path::Path;
use tracing::{error, info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "brt_analytics")]
#[command(about = "Ridership and load analytics for a BRT operation", long_about = None)]
struct Cli {
    #[command(flatten)]
    sources: SourceArgs,

    #[command(flatten)]
    filters: FilterArgs,

    /// JSON file with dashboard settings
    #[arg(long, global = true, env = "BRT_CONFIG")]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct SourceArgs {
    /// Load per station CSV (path or URL, optionally .gz)
    #[arg(long, global = true, env = "BRT_LOAD_CSV", default_value = DEFAULT_LOAD_SOURCE)]
    load: String,

    /// Critical segment CSV (path or URL, optionally .gz)
    #[arg(long, global = true, env = "BRT_CRITICAL_CSV", default_value = DEFAULT_CRITICAL_SOURCE)]
    critical: String,

    /// Station coordinates CSV (path or URL, optionally .gz)
    #[arg(long, global = true, env = "BRT_STATIONS_CSV", default_value = DEFAULT_STATIONS_SOURCE)]
    stations: String,
}

#[derive(Args)]
struct FilterArgs {
    /// Route group to keep, or "all"
    #[arg(short, long, global = true)]
    group: Option<String>,

    /// Date to keep (dd/mm/YYYY or YYYY-MM-DD), or "all"
    #[arg(short, long, global = true)]
    date: Option<String>,

    /// Direction token matched inside the route group name, or "all"
    #[arg(long, global = true)]
    direction: Option<String>,

    /// Vehicle capacity in passengers
    #[arg(short, long, global = true)]
    capacity: Option<u32>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the headline operating figures
    Summary,
    /// Print every derived view as JSON
    Report {
        /// Emit chart input schemas instead of plain views
        #[arg(long, default_value_t = false)]
        charts: bool,
    },
    /// List the values each filter accepts
    Options,
    /// Dump one normalized input table as CSV
    Raw {
        #[arg(value_enum)]
        table: RawTable,
    },
    /// Write every derived view to a directory
    Export {
        /// Directory to write the files into
        #[arg(short, long, default_value = "export")]
        output_dir: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum RawTable {
    Load,
    Critical,
    Stations,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/brt_analytics.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("brt_analytics.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => DashboardConfig::load(path)?,
        None => DashboardConfig::default(),
    };

    let capacity = config.check_capacity(cli.filters.capacity.unwrap_or(config.default_capacity))?;
    let selection = FilterSelection::from_input(
        cli.filters.group.as_deref(),
        cli.filters.date.as_deref(),
        cli.filters.direction.as_deref(),
        capacity.get(),
        &config.direction_tokens,
    )?;

    let locations = SourceLocations {
        load: cli.sources.load,
        critical: cli.sources.critical,
        stations: cli.sources.stations,
    };
    let raw = fetch_sources(&BasicClient::new(), &locations).await?;

    let mut cache = DatasetCache::new(config.cache_capacity);
    let dataset = match cache.load(&raw) {
        Ok(dataset) => dataset,
        Err(e) => {
            if e.is_format_error() {
                error!(error = %e, "Input tables are malformed, no data available");
            }
            return Err(e.into());
        }
    };
    let session = Session::new(dataset, selection);

    let stdout = std::io::stdout().lock();
    match cli.command {
        Commands::Summary => {
            let views = session.views();
            if views.summary.peak.is_none() {
                warn!("No critical segment for the selected filters, peak unavailable");
            }
            write_json(stdout, &views.summary)?;
        }
        Commands::Report { charts } => {
            let views = session.views();
            for (name, reason) in [
                ("surface", views.surface.empty_reason()),
                ("animation", views.animation.empty_reason()),
                ("geo", views.geo.empty_reason()),
                ("heatmap", views.heatmap.empty_reason()),
                ("critical", views.critical.empty_reason()),
            ] {
                if let Some(reason) = reason {
                    info!(view = name, reason = reason.message(), "View empty");
                }
            }
            if charts {
                write_json(stdout, &dashboard_charts(&views, &config))?;
            } else {
                write_json(stdout, &views)?;
            }
        }
        Commands::Options => {
            write_json(stdout, &session.filter_options(&config))?;
        }
        Commands::Raw { table } => {
            let dataset = session.dataset();
            match table {
                RawTable::Load => write_rows(stdout, &dataset.load)?,
                RawTable::Critical => write_rows(stdout, &dataset.critical)?,
                RawTable::Stations => write_rows(stdout, dataset.stations.rows())?,
            }
        }
        Commands::Export { output_dir } => {
            let written = export_views(&output_dir, &session.views())?;
            info!(output_dir = %output_dir, files = written.len(), "Views exported");
        }
    }

    Ok(())
}
