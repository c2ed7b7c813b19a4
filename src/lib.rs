pub mod api;
pub mod cli;
pub mod clients;
pub mod config;
pub mod constants;
pub mod db;
pub mod entities;
pub mod models;
pub mod services;
pub mod state;

use std::sync::Arc;
use tokio::signal;

use anyhow::Context;
use cli::{Cli, Commands};
pub use config::Config;
use metrics_exporter_prometheus::PrometheusHandle;
use state::SharedState;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

pub async fn run(cli: Cli, config: Config) -> anyhow::Result<()> {
    if matches!(cli.command, Some(Commands::Init)) {
        if Config::create_default_if_missing()? {
            println!("✓ Config file created. Edit config.toml and run again.");
        } else {
            println!("config.toml already exists, leaving it untouched.");
        }
        return Ok(());
    }

    config.validate()?;

    let prometheus_handle = if config.observability.metrics_enabled {
        use metrics_exporter_prometheus::PrometheusBuilder;
        let builder = PrometheusBuilder::new();
        let handle = builder
            .install_recorder()
            .context("Failed to install Prometheus recorder")?;
        Some(handle)
    } else {
        None
    };

    init_tracing(&config)?;

    match Config::source_path() {
        Some(path) => info!("Loaded config from: {}", path.display()),
        None => info!("No config file found, using defaults"),
    }

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => run_server(config, prometheus_handle).await,
        Commands::Ingest => cli::cmd_ingest(config).await,
        Commands::SweepCache { max_age_hours } => cli::cmd_sweep_cache(config, max_age_hours).await,
        Commands::Seed => cli::cmd_seed(&config).await,
        Commands::List { min_score } => cli::cmd_list_documents(&config, min_score).await,
        Commands::Init => Ok(()),
    }
}

fn init_tracing(config: &Config) -> anyhow::Result<()> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.general.log_level));

    let fmt_layer = tracing_subscriber::fmt::layer();

    let registry = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer);

    if config.observability.loki_enabled {
        let url = url::Url::parse(&config.observability.loki_url).context("Invalid Loki URL")?;

        let (layer, task) = tracing_loki::builder()
            .label("app", "docsearch")?
            .extra_field("env", "production")?
            .build_url(url)?;

        tokio::spawn(task);

        registry.with(layer).init();
        info!(
            "Loki logging initialized at {}",
            config.observability.loki_url
        );
    } else {
        registry.init();
    }

    Ok(())
}

async fn run_server(
    config: Config,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<()> {
    info!("docsearch v{} starting...", env!("CARGO_PKG_VERSION"));

    let port = config.server.port;
    let shared = Arc::new(SharedState::new(config).await?);

    services::initialize(&shared).await;

    let scheduler = services::Scheduler::new(shared.cache.clone(), shared.config.cache.clone());
    let mut job_scheduler = scheduler.start().await?;

    let app_state = api::create_app_state(shared, prometheus_handle);
    let app = api::router(app_state);

    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Web server error")?;

    if let Some(sched) = job_scheduler.as_mut()
        && let Err(e) = sched.shutdown().await
    {
        error!("Failed to stop scheduler: {}", e);
    }

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    match signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => error!("Error listening for shutdown: {}", e),
    }
}
