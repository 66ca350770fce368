#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Terminal front-end for the lovebug sighting map.
//!
//! Each dashboard page is a subcommand. Without one, an interactive menu
//! picks the page. `watch` keeps polling and prints pushed reports until
//! Ctrl-C.
//!
//! Uses `indicatif-log-bridge` (via [`lovebug_cli_utils::init_logger`]) so
//! log lines and loading spinners never fight for the terminal.

mod pages;
mod report;
mod watch;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use dialoguer::{Confirm, Select};
use lovebug_cli_utils::MultiProgress;
use lovebug_dashboard::views::DEFAULT_HOURS;
use lovebug_dashboard::views::reports::ReportSort;
use lovebug_dashboard::{AppContext, DashboardConfig, ErrorBoundary, PageOutcome, Route};
use lovebug_report_models::{Platform, Severity};

#[derive(Parser)]
#[command(name = "lovebug", about = "Lovebug sighting map and dashboard")]
struct Cli {
    /// TOML config file. Environment variables override its values.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Look-back window in hours
    #[arg(long, global = true, default_value_t = DEFAULT_HOURS)]
    hours: u32,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Clone)]
enum Commands {
    /// Landing page
    Home,
    /// Live map of recent reports and hotspots
    Map {
        /// Only reports of this severity (low, medium, high, critical)
        #[arg(long, value_parser = parse_severity)]
        severity: Option<Severity>,
        /// Only reports from this platform
        #[arg(long, value_parser = parse_platform)]
        platform: Option<Platform>,
        /// Hide hotspot circles
        #[arg(long)]
        no_hotspots: bool,
    },
    /// Hourly, daily, confidence and platform breakdowns
    Statistics,
    /// Summary cards
    Dashboard,
    /// Submit a sighting
    Report,
    /// Paged report list
    Reports {
        /// Page number, starting at 1
        #[arg(long, default_value_t = 1)]
        page: u32,
        /// Ordering (newest, severity)
        #[arg(long, default_value = "newest", value_parser = parse_sort)]
        sort: ReportSort,
        /// Free-text search
        #[arg(long)]
        search: Option<String>,
        /// Only reports of this severity
        #[arg(long, value_parser = parse_severity)]
        severity: Option<Severity>,
        /// Only reports from this platform
        #[arg(long, value_parser = parse_platform)]
        platform: Option<Platform>,
    },
    /// Most active areas
    Hotspots,
    /// Keep polling and print pushed reports until Ctrl-C
    Watch,
}

impl Commands {
    const fn route(&self) -> Option<Route> {
        match self {
            Self::Home => Some(Route::Home),
            Self::Map { .. } => Some(Route::Map),
            Self::Statistics => Some(Route::Statistics),
            Self::Dashboard => Some(Route::Dashboard),
            Self::Report => Some(Route::Report),
            Self::Reports { .. } => Some(Route::Reports),
            Self::Hotspots => Some(Route::Hotspots),
            Self::Watch => None,
        }
    }

    const fn from_route(route: Route) -> Self {
        match route {
            Route::Home => Self::Home,
            Route::Map => Self::Map {
                severity: None,
                platform: None,
                no_hotspots: false,
            },
            Route::Statistics => Self::Statistics,
            Route::Dashboard => Self::Dashboard,
            Route::Report => Self::Report,
            Route::Reports => Self::Reports {
                page: 1,
                sort: ReportSort::Newest,
                search: None,
                severity: None,
                platform: None,
            },
            Route::Hotspots => Self::Hotspots,
        }
    }
}

fn parse_severity(value: &str) -> Result<Severity, String> {
    value
        .parse()
        .map_err(|_| format!("unknown severity {value:?}"))
}

fn parse_platform(value: &str) -> Result<Platform, String> {
    value
        .parse()
        .map_err(|_| format!("unknown platform {value:?}"))
}

fn parse_sort(value: &str) -> Result<ReportSort, String> {
    value
        .parse()
        .map_err(|_| format!("unknown sort {value:?}"))
}

fn choose_route() -> Result<Route, dialoguer::Error> {
    let labels: Vec<&str> = Route::all().iter().map(|route| route.title()).collect();
    let idx = Select::new()
        .with_prompt("Where to?")
        .items(&labels)
        .default(0)
        .interact()?;
    Ok(Route::all()[idx])
}

async fn render(
    ctx: &AppContext,
    multi: &MultiProgress,
    command: &Commands,
    hours: u32,
) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Commands::Home => pages::home(ctx),
        Commands::Map {
            severity,
            platform,
            no_hotspots,
        } => pages::map(ctx, multi, hours, *severity, *platform, !*no_hotspots).await,
        Commands::Statistics => pages::statistics(ctx, multi, hours).await,
        Commands::Dashboard => pages::dashboard(ctx, multi, hours).await,
        Commands::Report => report::run(ctx, multi).await,
        Commands::Reports {
            page,
            sort,
            search,
            severity,
            platform,
        } => {
            let mut state = lovebug_dashboard::views::reports::ReportsPage::default();
            state.set_hours(hours);
            state.set_severity(*severity);
            state.set_platform(*platform);
            state.set_search(search.clone().unwrap_or_default());
            state.set_sort(*sort);
            state.go_to(*page);
            pages::reports(ctx, multi, &state).await
        }
        Commands::Hotspots => pages::hotspots(ctx, multi, hours).await,
        Commands::Watch => watch::run(ctx, hours).await,
    }
}

/// Renders one page behind an error boundary, offering a retry after a
/// failure.
async fn run_page(
    ctx: &AppContext,
    multi: &MultiProgress,
    command: &Commands,
    hours: u32,
) -> Result<(), Box<dyn std::error::Error>> {
    let Some(route) = command.route() else {
        return render(ctx, multi, command, hours).await;
    };
    let boundary = ErrorBoundary::new(route);

    loop {
        match boundary.run(render(ctx, multi, command, hours)).await {
            PageOutcome::Rendered(()) => return Ok(()),
            PageOutcome::Failed(panel) => {
                pages::failure(&panel);
                let retry = Confirm::new()
                    .with_prompt(panel.retry_hint)
                    .default(true)
                    .interact()?;
                if !retry {
                    return Ok(());
                }
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = lovebug_cli_utils::init_logger();
    let cli = Cli::parse();

    let config = DashboardConfig::load(cli.config.as_deref())?;
    log::debug!("Using API {} and live channel {}", config.api_url, config.ws_url);

    let command = match cli.command {
        Some(command) => command,
        None => Commands::from_route(choose_route()?),
    };

    let ctx = AppContext::start(config)?;
    ctx.start_live();

    let result = run_page(&ctx, &multi, &command, cli.hours).await;
    ctx.shutdown().await;
    result
}
