use analytics::{AnalyticsEngine, TimeRange};
use anyhow::Context;
use api_client::{HttpApiClient, MarketApi};
use chrono::Utc;
use clap::{Parser, Subcommand};
use configuration::{Config, LogFormat};
use core_types::{Sourced, SymbolSelection};
use events::{JobStatus, ViewState};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use views::{AdminView, AdvisorView, DEFAULT_MODEL, DashboardView, ExplorerView, PollHandle};

mod render;

use render::Tab;

/// The main entry point for the Bankdash market client.
#[tokio::main]
async fn main() {
    // Load environment variables from .env file, if there is one.
    dotenvy::dotenv().ok();

    // Parse command-line arguments
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// A terminal dashboard for the banking sector market backend.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to a TOML configuration file (defaults to ./config.toml when present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Overrides `api.base_url`, e.g. "http://localhost:8000/api/v1".
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Overrides `logging.format`.
    #[arg(long, global = true, value_enum)]
    log_format: Option<LogFormat>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Industry overview: expected return, risk, regimes and top movers.
    Dashboard(DashboardArgs),
    /// Prices, volume or financial ratios of one bank (or "ALL").
    Explore(ExploreArgs),
    /// List the bank symbols known to the backend.
    Symbols,
    /// Ask the AI advisor about a bank.
    Advise(AdviseArgs),
    /// Backend jobs, logs and model validation.
    #[command(subcommand)]
    Admin(AdminCommands),
}

#[derive(Parser)]
struct DashboardArgs {
    /// Number of most recent days to print.
    #[arg(long, default_value_t = 10)]
    rows: usize,
}

#[derive(Parser)]
struct ExploreArgs {
    /// A bank ticker (e.g., "TCB") or "ALL" for the industry aggregate.
    #[arg(long)]
    symbol: SymbolSelection,

    /// One of 1W, 1M, 3M, 6M, YTD, 1Y, ALL.
    #[arg(long, default_value = "1Y")]
    range: TimeRange,

    #[arg(long, value_enum, default_value_t = Tab::Price)]
    tab: Tab,

    /// Number of most recent days to print.
    #[arg(long, default_value_t = 15)]
    rows: usize,
}

#[derive(Parser)]
struct AdviseArgs {
    /// A bank ticker, case-insensitive.
    #[arg(long)]
    symbol: String,
}

#[derive(Subcommand)]
enum AdminCommands {
    /// Print the newest pipeline log lines.
    Logs {
        #[arg(long, default_value_t = 50)]
        lines: usize,
    },
    /// Start the data pipeline.
    TriggerPipeline(FollowArgs),
    /// Start model retraining.
    Retrain(FollowArgs),
    /// True vs predicted values of the last training run.
    Validation(ValidationArgs),
    /// RMSE and accuracy of the last training run.
    Metrics,
}

#[derive(Parser)]
struct FollowArgs {
    /// Poll the job log until training completes (Ctrl-C to stop).
    #[arg(long)]
    follow: bool,
}

#[derive(Parser)]
struct ValidationArgs {
    #[arg(long, default_value = DEFAULT_MODEL)]
    model: String,

    /// A bank ticker or "ALL" to average across banks. Defaults to the first bank.
    #[arg(long)]
    symbol: Option<SymbolSelection>,

    #[arg(long, default_value_t = 20)]
    rows: usize,
}

// ==============================================================================
// Startup
// ==============================================================================

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config =
        configuration::load_config(cli.config.as_deref()).context("Failed to load configuration")?;
    if let Some(base_url) = cli.base_url {
        config.api.base_url = base_url;
    }
    if let Some(format) = cli.log_format {
        config.logging.format = format;
    }
    config.validate()?;

    // The guard flushes the log file on drop; keep it for the whole run.
    let _log_guard = configuration::init_logging(&config.logging)?;
    tracing::debug!(base_url = %config.api.base_url, "Configuration loaded.");

    let api: Arc<dyn MarketApi> =
        Arc::new(HttpApiClient::new(&config.api).context("Failed to build the HTTP client")?);

    // Ctrl-C cancels whatever is in flight.
    let shutdown = CancellationToken::new();
    let on_signal = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, cancelling.");
            on_signal.cancel();
        }
    });

    match cli.command {
        Commands::Dashboard(args) => handle_dashboard(api, &config, args, &shutdown).await,
        Commands::Explore(args) => handle_explore(api, args, &shutdown).await,
        Commands::Symbols => handle_symbols(api, &shutdown).await,
        Commands::Advise(args) => handle_advise(api, args, &shutdown).await,
        Commands::Admin(command) => handle_admin(api, &config, command, &shutdown).await,
    }
}

fn spinner(message: &str) -> anyhow::Result<ProgressBar> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed}] {msg}")?);
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(100));
    Ok(spinner)
}

/// Prints a `Ready` snapshot with `render`, or the reason there is none.
fn print_state<T>(state: &ViewState<T>, show: impl FnOnce(&Sourced<T>) -> String) {
    match state.snapshot() {
        Some(snapshot) => println!("{}", show(snapshot)),
        None => println!("{}", render::state_message(state)),
    }
}

// ==============================================================================
// Command Handlers
// ==============================================================================

async fn handle_dashboard(
    api: Arc<dyn MarketApi>,
    config: &Config,
    args: DashboardArgs,
    shutdown: &CancellationToken,
) -> anyhow::Result<()> {
    let analytics = &config.analytics;
    let engine =
        AnalyticsEngine::with_params(analytics.window, analytics.up_threshold, analytics.down_threshold)?;
    let mut view = DashboardView::new(api, engine, analytics.fallback_days);

    let progress = spinner("Loading market dashboard...")?;
    let state = view.load(shutdown).await;
    progress.finish_and_clear();

    print_state(state, |snapshot| render::dashboard(snapshot, args.rows));
    Ok(())
}

async fn handle_explore(
    api: Arc<dyn MarketApi>,
    args: ExploreArgs,
    shutdown: &CancellationToken,
) -> anyhow::Result<()> {
    let mut view = ExplorerView::new(api);
    let today = Utc::now().date_naive();

    let progress = spinner(&format!("Loading {}...", args.symbol))?;
    let state = view.load(&args.symbol, args.range, today, shutdown).await;
    progress.finish_and_clear();

    print_state(state, |snapshot| render::explorer(&snapshot.data, args.tab, args.rows));
    Ok(())
}

async fn handle_symbols(api: Arc<dyn MarketApi>, shutdown: &CancellationToken) -> anyhow::Result<()> {
    let view = ExplorerView::new(api);
    let symbols = view.symbols(shutdown).await.context("Failed to list symbols")?;
    println!("{}", render::symbols(&symbols));
    Ok(())
}

async fn handle_advise(
    api: Arc<dyn MarketApi>,
    args: AdviseArgs,
    shutdown: &CancellationToken,
) -> anyhow::Result<()> {
    let mut view = AdvisorView::new(api);

    let progress = spinner("Consulting the advisor...")?;
    let state = view.consult(&args.symbol, shutdown).await;
    progress.finish_and_clear();

    print_state(state?, |snapshot| render::advisor(&snapshot.data));
    Ok(())
}

async fn handle_admin(
    api: Arc<dyn MarketApi>,
    config: &Config,
    command: AdminCommands,
    shutdown: &CancellationToken,
) -> anyhow::Result<()> {
    let mut view = AdminView::new(api, config.polling.clone());

    match command {
        AdminCommands::Logs { lines } => {
            let logs = view.logs(shutdown).await.context("Failed to fetch logs")?;
            println!("{}", render::logs(&logs, lines));
        }
        AdminCommands::TriggerPipeline(args) => {
            let ack = view
                .trigger_pipeline(shutdown)
                .await
                .context("Error triggering pipeline")?;
            println!("Pipeline triggered: {}", render::ack(&ack));
            if args.follow {
                follow_job(&mut view, shutdown).await?;
            }
        }
        AdminCommands::Retrain(args) => {
            let ack = view
                .retrain_model(shutdown)
                .await
                .context("Error triggering retraining")?;
            println!("Retraining started: {}", render::ack(&ack));
            if args.follow {
                follow_job(&mut view, shutdown).await?;
            }
        }
        AdminCommands::Validation(args) => {
            let state = view.load_validation(&args.model, args.symbol, shutdown).await;
            print_state(state, |snapshot| render::validation(&snapshot.data, args.rows));
        }
        AdminCommands::Metrics => {
            let metrics = view.metrics(shutdown).await.context("Failed to fetch metrics")?;
            println!("{}", render::metrics(&metrics));
        }
    }
    Ok(())
}

/// Polls the job log with a spinner, then refreshes validation on completion.
async fn follow_job(view: &mut AdminView, shutdown: &CancellationToken) -> anyhow::Result<()> {
    let Some(handle) = view.follow(shutdown) else {
        return Ok(());
    };
    let progress = spinner("Waiting for the job to finish...")?;
    let status = watch_logs(handle, &progress).await;
    progress.finish_and_clear();

    println!("Job finished: {:?}", status);
    let completed = status == JobStatus::Completed;
    view.finish(status);

    if completed {
        let state = view.load_validation(DEFAULT_MODEL, None, shutdown).await;
        print_state(state, |snapshot| render::validation(&snapshot.data, 10));
        match view.metrics(shutdown).await {
            Ok(metrics) => println!("{}", render::metrics(&metrics)),
            Err(e) => tracing::warn!(error = %e, "Training metrics are unavailable."),
        }
    }
    Ok(())
}

async fn watch_logs(handle: PollHandle, progress: &ProgressBar) -> JobStatus {
    let mut logs = handle.subscribe();
    let mut done = std::pin::pin!(handle.join());
    loop {
        tokio::select! {
            status = &mut done => return status,
            changed = logs.changed() => {
                if changed.is_err() {
                    return done.await;
                }
                if let Some(line) = logs.borrow_and_update().newest() {
                    progress.set_message(line.to_string());
                }
            }
        }
    }
}
