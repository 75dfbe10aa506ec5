//! LMS admin activity dashboard CLI
//!
//! Shows the audit log, recent activity and per-user activity feeds of an LMS
//! backend in the terminal, optionally polling for updates or exporting them.

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    rust_2018_idioms
)]

use clap::{Args, Parser, Subcommand};
use lms_core::{Config, Error, LogFormat, Result};
use lms_dashboard::{
    ApiClient, ExportFormat, FeedAction, PageController, PageKind, Poller, controller_for, export,
    render,
};
use lms_protocol::{
    ActivityFilter, KindFilter, Normalizer, SeverityFilter, SystemClock, filter_and_group_by_date,
};
use lms_types::{Locale, SourceKind};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tracing::{debug, info};

/// Command line interface for the LMS activity dashboard
#[derive(Parser)]
#[command(
    name = "lms-dashboard",
    version = env!("CARGO_PKG_VERSION"),
    about = "Activity feeds for LMS administrators",
    long_about = "Fetches audit-log, enrollment and completion activity from an LMS backend, normalizes it into one feed and renders, polls or exports it."
)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error); overrides the config file
    #[arg(short, long)]
    log_level: Option<String>,

    /// Enable structured JSON logging
    #[arg(long)]
    json: bool,

    /// Language of time labels (id, en); overrides the config file
    #[arg(long)]
    locale: Option<Locale>,

    /// Subcommand
    #[command(subcommand)]
    command: Commands,
}

/// Page selection and filters shared by feed commands
#[derive(Args, Clone)]
struct FeedArgs {
    /// Page to show (audit, recent, user)
    #[arg(short, long, default_value = "recent")]
    page: PageKind,

    /// Case-insensitive search over actor, subject and id
    #[arg(short, long, default_value = "")]
    search: String,

    /// Action kind filter (all, login, enrolled, completed, failed, download, update, other)
    #[arg(long, default_value = "all")]
    kind: KindFilter,

    /// Severity filter (all, critical, warning, success, info)
    #[arg(long, default_value = "all")]
    severity: SeverityFilter,

    /// Restrict to one actor by display name (user page)
    #[arg(long)]
    actor: Option<String>,

    /// Backend user id sent as the `user_id` query parameter (user page)
    #[arg(long, value_name = "ID")]
    user_id: Option<String>,
}

/// Available subcommands
#[derive(Subcommand)]
enum Commands {
    /// Fetch a page once and print it
    Feed {
        #[command(flatten)]
        feed: FeedArgs,
    },

    /// Poll a page and print it after every update until Ctrl+C
    Watch {
        #[command(flatten)]
        feed: FeedArgs,

        /// Seconds between polls (overrides config)
        #[arg(short, long, value_parser = clap::value_parser!(u64).range(1..))]
        interval: Option<u64>,
    },

    /// Fetch a page once and write it to a file or stdout
    Export {
        #[command(flatten)]
        feed: FeedArgs,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = ExportFormat::Csv)]
        format: ExportFormat,

        /// Output file (stdout when omitted)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Normalize a saved list response without contacting the backend
    Normalize {
        /// Which endpoint the response came from (log, enrollment, completion)
        #[arg(long)]
        source: SourceKind,

        /// JSON file with a bare array or a `{ "data": [...] }` object
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,
    },

    /// Validate and optionally print the resolved configuration
    Config {
        /// Show resolved configuration
        #[arg(short, long)]
        show: bool,
    },
}

/// Main entry point for the dashboard CLI
///
/// # Errors
///
/// Returns error if configuration, fetching or output fails
#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (for development convenience)
    let dotenv = dotenvy::dotenv();

    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(locale) = cli.locale {
        config.feed.locale = locale;
    }

    init_logging(&cli, &config)?;
    if let Err(e) = dotenv {
        debug!("Note: .env file not loaded: {e}");
    }

    match cli.command {
        Commands::Feed { feed } => show_feed(&config, &feed).await,
        Commands::Watch { feed, interval } => watch_feed(&config, &feed, interval).await,
        Commands::Export {
            feed,
            format,
            output,
        } => export_feed(&config, &feed, format, output).await,
        Commands::Normalize { source, input } => normalize_file(&config, source, &input).await,
        Commands::Config { show } => handle_config_command(&config, show),
    }
}

/// Initialize logging system
fn init_logging(cli: &Cli, config: &Config) -> Result<()> {
    let level = cli.log_level.as_deref().unwrap_or(&config.logging.level);
    let format = if cli.json {
        LogFormat::Json
    } else {
        config.logging.format
    };

    lms_core::init_logging(level, format)?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        log_level = level,
        "LMS dashboard starting"
    );
    Ok(())
}

/// Build the page controller described by `feed`
fn build_controller(config: &Config, feed: &FeedArgs) -> Result<PageController<SystemClock>> {
    let client = ApiClient::from_config(&config.api)?;
    let controller = controller_for(
        feed.page,
        config,
        Arc::new(client),
        feed.actor.as_deref(),
        feed.user_id.as_deref(),
    );

    controller.dispatch(FeedAction::SearchChanged(feed.search.clone()));
    controller.dispatch(FeedAction::KindFilterChanged(feed.kind));
    controller.dispatch(FeedAction::SeverityFilterChanged(feed.severity));
    Ok(controller)
}

/// Render the page header, notifications and grouped feed
fn print_page(controller: &PageController<SystemClock>, locale: Locale) {
    let state = controller.snapshot();

    println!("== {} ==", controller.kind().title());
    if let Some(summary) = controller.summary() {
        print!("{}", render::render_summary(&summary, locale));
        println!();
    }
    print!("{}", render::render_notifications(state.notifications()));
    print!("{}", render::render_feed(&state.grouped(), locale));
}

async fn show_feed(config: &Config, feed: &FeedArgs) -> Result<()> {
    let controller = build_controller(config, feed)?;
    controller.refresh().await;
    print_page(&controller, config.feed.locale);
    Ok(())
}

async fn watch_feed(config: &Config, feed: &FeedArgs, interval: Option<u64>) -> Result<()> {
    let controller = Arc::new(build_controller(config, feed)?);
    controller.refresh().await;
    print_page(&controller, config.feed.locale);

    let period = interval.map_or_else(|| config.poll_interval(), Duration::from_secs);
    let poller = Poller::new(Arc::clone(&controller), period);
    let handle = poller.start();

    info!("Watching {}; press Ctrl+C to stop", controller.kind().title());

    let mut ticker = tokio::time::interval(poller.period());
    ticker.tick().await;
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                print_page(&controller, config.feed.locale);
            }
            result = signal::ctrl_c() => {
                result?;
                info!("Received Ctrl+C, stopping");
                break;
            }
        }
    }

    poller.stop();
    handle
        .await
        .map_err(|e| Error::Other(format!("Poller task failed: {e}")))?;

    let stats = poller.stats();
    info!(polls = stats.polls, failures = stats.failures, "Poller stopped");
    Ok(())
}

async fn export_feed(
    config: &Config,
    feed: &FeedArgs,
    format: ExportFormat,
    output: Option<PathBuf>,
) -> Result<()> {
    let controller = build_controller(config, feed)?;
    controller.refresh().await;

    let state = controller.snapshot();
    match output {
        Some(path) => {
            export::write_notices(std::io::stderr().lock(), &state)?;
            export::export_to_path(&path, format, &state.visible())
        }
        None => export::export_page(
            &state,
            format,
            std::io::stdout().lock(),
            std::io::stderr().lock(),
        ),
    }
}

async fn normalize_file(config: &Config, source: SourceKind, input: &std::path::Path) -> Result<()> {
    let contents = tokio::fs::read_to_string(input).await?;
    let body: serde_json::Value = serde_json::from_str(&contents)?;
    let records = lms_protocol::envelope::into_raw_events(body)?;

    let normalizer = Normalizer::new(SystemClock, config.time_display());
    let activities = normalizer.normalize_records(&records, source);

    info!(path = %input.display(), records = activities.len(), "Normalized saved response");
    let groups = filter_and_group_by_date(&activities, &ActivityFilter::all());
    print!("{}", render::render_feed(&groups, config.feed.locale));
    Ok(())
}

/// Handle config command
fn handle_config_command(config: &Config, show: bool) -> Result<()> {
    if show {
        let mut shown = config.clone();
        if shown.api.api_key.is_some() {
            shown.api.api_key = Some("********".to_string());
        }
        println!("{}", serde_json::to_string_pretty(&shown)?);
    } else {
        println!("Configuration is valid");
    }
    Ok(())
}
