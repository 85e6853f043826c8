//! cinefind - debounced movie search for the terminal.

/// Application configuration (TOML).
mod config;
/// Terminal UI components.
mod tui;

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result, bail};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use tracing::instrument;
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
#[cfg(not(feature = "otel"))]
use tracing_subscriber::fmt;
#[cfg(feature = "otel")]
use tracing_subscriber::layer::SubscriberExt;
#[cfg(feature = "otel")]
use tracing_subscriber::util::SubscriberInitExt;
use url::Url;

use crate::config::{AppConfig, StoreConfig, TmdbConfig, resolve_config_path, resolve_log_path};
use crate::tui::run_browser;
use cinefind_api::appwrite::AppwriteClient;
use cinefind_api::tmdb::TmdbClient;
use cinefind_core::{FetchState, SearchService, TrendingSearch, get_trending};

/// User agent sent to both APIs.
const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Search service over the production clients.
type AppService = SearchService<TmdbClient, AppwriteClient>;

/// CLI argument parser.
#[derive(Parser)]
#[command(name = "cinefind", about, version)]
struct Cli {
    /// Override config/log directory.
    #[arg(long, global = true)]
    dir: Option<PathBuf>,

    /// Subcommand to run.
    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Browse and search movies interactively.
    Browse,
    /// List popular movies.
    Discover,
    /// Search movies by title and record the search.
    Search(SearchArgs),
    /// Show the most searched terms.
    Trending(TrendingArgs),
    /// Manage the config file.
    Config(ConfigCommand),
    /// Generate shell completions.
    Completions(CompletionsArgs),
}

/// Arguments for the `search` subcommand.
#[derive(clap::Args)]
struct SearchArgs {
    /// Search query (e.g. "The Batman").
    #[arg(long, required = true)]
    query: String,
}

/// Arguments for the `trending` subcommand.
#[derive(clap::Args)]
struct TrendingArgs {
    /// Number of entries (default: `[search].trending_limit`).
    #[arg(long)]
    limit: Option<u32>,
}

/// Arguments for the `config` subcommand.
#[derive(clap::Args)]
struct ConfigCommand {
    /// Config subcommand to run.
    #[command(subcommand)]
    command: ConfigSubcommands,
}

/// Available config subcommands.
#[derive(Subcommand)]
enum ConfigSubcommands {
    /// Print the resolved config file path.
    Path,
    /// Write a default config file.
    Init(ConfigInitArgs),
}

/// Arguments for the `config init` subcommand.
#[derive(clap::Args)]
struct ConfigInitArgs {
    /// Overwrite an existing file.
    #[arg(long)]
    force: bool,
}

/// Arguments for the `completions` subcommand.
#[derive(clap::Args)]
struct CompletionsArgs {
    /// Target shell.
    #[arg(value_enum)]
    shell: Shell,
}

/// Loads the config file and applies environment overrides.
///
/// # Errors
///
/// Returns an error if the config path cannot be resolved or the file is invalid.
fn load_config(dir: Option<&PathBuf>) -> Result<AppConfig> {
    let config_path = resolve_config_path(dir).context("failed to resolve config path")?;
    let mut config = AppConfig::load(&config_path).context("failed to load config")?;
    config.apply_env(|name| std::env::var(name).ok());
    Ok(config)
}

/// Builds a TMDB client from config.
///
/// # Errors
///
/// Returns an error if no API token is configured or the client fails to build.
#[instrument(skip_all)]
fn build_tmdb_client(config: &TmdbConfig) -> Result<TmdbClient> {
    let Some(api_token) = config.api_token.clone() else {
        bail!("TMDB_API_TOKEN environment variable or [tmdb].api_token in config.toml is required");
    };
    let base_url = Url::parse(&config.base_url)
        .with_context(|| format!("invalid TMDB base URL: {}", config.base_url))?;

    TmdbClient::builder()
        .base_url(base_url)
        .api_token(api_token)
        .user_agent(USER_AGENT)
        .build()
        .context("failed to build TMDB client")
}

/// Builds an Appwrite client from config, or `None` when the store is not
/// fully configured.
///
/// # Errors
///
/// Returns an error if the endpoint is invalid or the client fails to build.
#[instrument(skip_all)]
fn build_store_client(config: &StoreConfig) -> Result<Option<AppwriteClient>> {
    if !config.is_complete() {
        tracing::warn!("[store] is not fully configured; trending and search counting are disabled");
        return Ok(None);
    }
    let endpoint = config.endpoint.as_deref().unwrap_or_default();
    let endpoint =
        Url::parse(endpoint).with_context(|| format!("invalid Appwrite endpoint: {endpoint}"))?;

    let mut builder = AppwriteClient::builder()
        .endpoint(endpoint)
        .project_id(config.project_id.clone().unwrap_or_default())
        .database_id(config.database_id.clone().unwrap_or_default())
        .collection_id(config.collection_id.clone().unwrap_or_default())
        .user_agent(USER_AGENT);
    if let Some(key) = &config.api_key {
        builder = builder.api_key(key.clone());
    }
    builder
        .build()
        .map(Some)
        .context("failed to build Appwrite client")
}

/// Builds the search service from config.
///
/// # Errors
///
/// Returns an error if either client fails to build.
fn build_service(config: &AppConfig) -> Result<AppService> {
    let tmdb = build_tmdb_client(&config.tmdb)?;
    let store = build_store_client(&config.store)?;
    Ok(SearchService::new(Arc::new(tmdb), store.map(Arc::new)).language(&config.tmdb.language))
}

/// Logs a fetch result as a table.
fn log_movies(state: &FetchState) {
    match state {
        FetchState::Success(movies) => {
            tracing::info!("ID\tRating\tLang\tYear\tTitle");
            for movie in movies {
                tracing::info!(
                    "{}\t{}\t{}\t{}\t{}",
                    movie.id,
                    movie.rating_label(),
                    movie.language_label(),
                    movie.release_year(),
                    movie.display_title(),
                );
            }
            tracing::info!("Total: {} movies", movies.len());
        }
        FetchState::Failure(message) => tracing::warn!("{message}"),
        FetchState::Idle | FetchState::Loading => {}
    }
}

/// Runs the `discover` subcommand.
///
/// # Errors
///
/// Returns an error if the service fails to build.
#[instrument(skip_all)]
async fn run_discover(dir: Option<&PathBuf>) -> Result<()> {
    let config = load_config(dir)?;
    let service = build_service(&config)?;

    let outcome = service.load_movies("").await;
    log_movies(&outcome.state);

    Ok(())
}

/// Runs the `search` subcommand.
///
/// Waits for the search-count upsert before exiting.
///
/// # Errors
///
/// Returns an error if the service fails to build.
#[instrument(skip_all)]
async fn run_search(args: &SearchArgs, dir: Option<&PathBuf>) -> Result<()> {
    let config = load_config(dir)?;
    let service = build_service(&config)?;

    let outcome = service.load_movies(&args.query).await;
    log_movies(&outcome.state);

    if let Some(telemetry) = outcome.telemetry {
        match telemetry.await {
            Ok(recorded) => tracing::debug!(?recorded, "search count recorded"),
            Err(e) => tracing::warn!(error = %e, "search count task failed"),
        }
    }

    Ok(())
}

/// Runs the `trending` subcommand.
///
/// # Errors
///
/// Returns an error if the store is not configured or the client fails to build.
#[instrument(skip_all)]
async fn run_trending(args: &TrendingArgs, dir: Option<&PathBuf>) -> Result<()> {
    let config = load_config(dir)?;
    if !config.store.is_complete() {
        bail!(
            "trending requires [store] endpoint, project_id, database_id and collection_id \
             (or the APPWRITE_* environment variables)"
        );
    }
    let Some(store) = build_store_client(&config.store)? else {
        return Ok(());
    };
    let limit = args.limit.unwrap_or(config.search.trending_limit);

    let trending = get_trending(&store, limit).await;
    log_trending(&trending);

    Ok(())
}

/// Logs trending searches as a table.
fn log_trending(trending: &[TrendingSearch]) {
    if trending.is_empty() {
        tracing::info!("No trending searches yet");
        return;
    }
    tracing::info!("#\tCount\tTitle\t\t\tTerm");
    for (rank, entry) in (1_usize..).zip(trending) {
        tracing::info!(
            "{}\t{}\t{}\t\t\t{}",
            rank,
            entry.count,
            entry.title,
            entry.search_term,
        );
    }
}

/// Runs the `browse` subcommand.
///
/// # Errors
///
/// Returns an error if the service fails to build or the TUI fails.
#[instrument(skip_all)]
async fn run_browse(dir: Option<&PathBuf>) -> Result<()> {
    let config = load_config(dir)?;
    let service = build_service(&config)?;
    let controller_config = config.search.controller_config();

    tracing::info!("Launching browser...");
    run_browser(Arc::new(service), &controller_config)
        .await
        .context("movie browser TUI failed")
}

/// Runs the `config path` subcommand.
///
/// # Errors
///
/// Returns an error if the config path cannot be resolved.
fn run_config_path(dir: Option<&PathBuf>) -> Result<()> {
    let config_path = resolve_config_path(dir).context("failed to resolve config path")?;
    tracing::info!("{}", config_path.display());
    Ok(())
}

/// Runs the `config init` subcommand.
///
/// # Errors
///
/// Returns an error if the file exists (without `--force`) or cannot be written.
fn run_config_init(args: &ConfigInitArgs, dir: Option<&PathBuf>) -> Result<()> {
    let config_path = resolve_config_path(dir).context("failed to resolve config path")?;
    if config_path.exists() && !args.force {
        bail!(
            "{} already exists (use --force to overwrite)",
            config_path.display()
        );
    }
    AppConfig::default()
        .save(&config_path)
        .context("failed to save config")?;
    tracing::info!("Wrote {}", config_path.display());
    Ok(())
}

/// Runs the `completions` subcommand.
fn run_completions(args: &CompletionsArgs) {
    let mut command = Cli::command();
    let name = command.get_name().to_owned();
    clap_complete::generate(args.shell, &mut command, name, &mut std::io::stdout());
}

/// Builds the log writer: stdout, or an append-only file when `log_file`
/// is set.
///
/// # Errors
///
/// Returns an error if the log file cannot be opened.
fn log_writer(log_file: Option<&Path>) -> Result<BoxMakeWriter> {
    let Some(path) = log_file else {
        return Ok(BoxMakeWriter::new(std::io::stdout));
    };
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open log file {}", path.display()))?;
    Ok(BoxMakeWriter::new(Mutex::new(file)))
}

/// Installs the global tracing subscriber.
///
/// # Errors
///
/// Returns an error if the log file cannot be opened.
fn init_tracing(log_file: Option<&Path>) -> Result<()> {
    let writer = log_writer(log_file)?;
    let ansi = log_file.is_none();

    #[cfg(not(feature = "otel"))]
    {
        fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
            )
            .with_target(false)
            .with_ansi(ansi)
            .with_writer(writer)
            .init();
    }

    #[cfg(feature = "otel")]
    {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_ansi(ansi)
            .with_writer(writer);

        let otel_enabled = std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT").is_ok();

        let otel_layer = otel_enabled
            .then(|| {
                let exporter = opentelemetry_otlp::SpanExporter::builder()
                    .with_http()
                    .build()
                    .ok()?;

                let tracer_provider = opentelemetry_sdk::trace::SdkTracerProvider::builder()
                    .with_simple_exporter(exporter)
                    .build();

                let tracer = opentelemetry::trace::TracerProvider::tracer(
                    &tracer_provider,
                    env!("CARGO_PKG_NAME"),
                );
                opentelemetry::global::set_tracer_provider(tracer_provider);

                Some(tracing_opentelemetry::layer().with_tracer(tracer))
            })
            .flatten();

        let log_layer = otel_enabled
            .then(|| {
                let exporter = opentelemetry_otlp::LogExporter::builder()
                    .with_http()
                    .build()
                    .ok()?;

                let logger_provider = opentelemetry_sdk::logs::SdkLoggerProvider::builder()
                    .with_simple_exporter(exporter)
                    .build();

                Some(
                    opentelemetry_appender_tracing::layer::OpenTelemetryTracingBridge::new(
                        &logger_provider,
                    ),
                )
            })
            .flatten();

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .with(otel_layer)
            .with(log_layer)
            .init();
    }

    Ok(())
}

/// Entry point.
///
/// # Errors
///
/// Returns an error if subcommand execution fails.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let dir = cli.dir.as_ref();

    // The browser owns the terminal, so its logs go to a file.
    let log_file = match cli.command {
        Commands::Browse => Some(resolve_log_path(dir).context("failed to resolve log path")?),
        _ => None,
    };
    init_tracing(log_file.as_deref())?;

    match &cli.command {
        Commands::Browse => run_browse(dir).await,
        Commands::Discover => run_discover(dir).await,
        Commands::Search(args) => run_search(args, dir).await,
        Commands::Trending(args) => run_trending(args, dir).await,
        Commands::Config(cmd) => match &cmd.command {
            ConfigSubcommands::Path => run_config_path(dir),
            ConfigSubcommands::Init(args) => run_config_init(args, dir),
        },
        Commands::Completions(args) => {
            run_completions(args);
            Ok(())
        }
    }
}
