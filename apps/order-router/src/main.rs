//! Order Router Binary
//!
//! Starts the multi-broker order router.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin order-router
//! ```
//!
//! # Environment Variables
//!
//! - `ORDER_ROUTER_CONFIG`: Path to the YAML config (default: config.yaml)
//! - `RUST_LOG`: Log level (default: order_router=info)
//!
//! Any `${VAR}` or `${VAR:-default}` inside the config file is resolved from
//! the environment, after `.env` has been loaded.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use order_router::application::ports::{BrokerAccountRepository, CredentialVault};
use order_router::application::services::{BrokerRegistry, TokenCache};
use order_router::application::use_cases::{ExecuteOrderUseCase, ScheduledOrderRunner};
use order_router::config::{Config, load_config};
use order_router::infrastructure::broker::{AngelOneAdapter, DhanAdapter};
use order_router::infrastructure::config::Container;
use order_router::infrastructure::http::{AppState, create_router};
use order_router::infrastructure::persistence::{
    FileBrokerAccountRepository, FileJobStore, FileOrderRepository, FileScheduledOrderRepository,
};
use order_router::infrastructure::scheduler::TokioOrderScheduler;
use order_router::infrastructure::vault::{AccountSeed, FileCredentialVault, load_account_seeds};
use order_router::observability::{MetricsConfig, init_metrics, init_tracing};
use tokio::net::TcpListener;
use tokio::signal;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

/// Concrete container wired by the binary.
type AppContainer = Container<
    FileOrderRepository,
    FileScheduledOrderRepository,
    FileBrokerAccountRepository,
    FileCredentialVault,
>;

/// Concrete scheduler: durable file store firing into the scheduled order runner.
type AppScheduler = TokioOrderScheduler<
    FileJobStore,
    ScheduledOrderRunner<FileOrderRepository, FileBrokerAccountRepository, FileScheduledOrderRepository>,
>;

/// Concrete HTTP state.
type AppHttpState = AppState<
    FileOrderRepository,
    FileBrokerAccountRepository,
    FileScheduledOrderRepository,
    AppScheduler,
    FileCredentialVault,
>;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    load_dotenv();
    init_tracing();

    tracing::info!("Starting Order Router");

    let config = load_config(None)?;
    log_config(&config);

    if config.observability.metrics_enabled {
        init_metrics(&MetricsConfig::with_addr(config.metrics_addr()?))?;
    }

    let seeds = load_seeds(&config)?;
    let container = create_container(&config, &seeds).await?;
    let engine = Arc::new(container.execute_order_use_case());
    let scheduler = create_scheduler(&config, &container, &engine).await?;

    let state = AppState {
        place_orders: Arc::new(container.place_order_use_case(engine)),
        schedule_orders: Arc::new(container.schedule_order_use_case(Arc::clone(&scheduler))),
        broker_accounts: Arc::new(container.broker_accounts_use_case()),
        version: env!("CARGO_PKG_VERSION").to_string(),
    };

    let (shutdown_tx, shutdown_rx) = broadcast::channel::<()>(1);
    let http_handle = start_http_server(&config, state, shutdown_tx).await?;

    tracing::info!("Order router ready");

    await_shutdown(http_handle, shutdown_rx, &config).await;

    // Stored jobs stay on disk and are restored on the next start.
    scheduler.shutdown();

    tracing::info!("Order router stopped");
    Ok(())
}

/// Load .env file from current or ancestor directories.
fn load_dotenv() {
    if dotenvy::dotenv().is_err() {
        load_dotenv_from_ancestors();
    }
}

/// Log the loaded configuration.
fn log_config(config: &Config) {
    tracing::info!(
        http_port = config.server.http_port,
        bind_address = %config.server.bind_address,
        angelone_url = %config.brokers.angelone.base_url,
        dhan_url = %config.brokers.dhan.base_url,
        data_dir = %config.storage.data_dir,
        job_store = %config.scheduler.job_store_path,
        vault_seed = config.vault.seed_path.as_deref().unwrap_or("-"),
        metrics_enabled = config.observability.metrics_enabled,
        "Configuration loaded"
    );
}

/// Read seed accounts and their credentials from the vault seed file, if any.
fn load_seeds(config: &Config) -> Result<Vec<AccountSeed>, Box<dyn std::error::Error>> {
    let Some(path) = config.vault.seed_path.as_deref() else {
        tracing::warn!("No vault seed file configured, starting without linked accounts");
        return Ok(Vec::new());
    };

    let seeds = load_account_seeds(Path::new(path))?;
    tracing::info!(path, accounts = seeds.len(), "Vault seed file loaded");
    Ok(seeds)
}

/// Open the stores, apply seeds, and build broker adapters and the registry.
async fn create_container(
    config: &Config,
    seeds: &[AccountSeed],
) -> Result<AppContainer, Box<dyn std::error::Error>> {
    let storage = &config.storage;
    let order_repo = Arc::new(FileOrderRepository::open(storage.orders_path()).await?);
    let scheduled_repo =
        Arc::new(FileScheduledOrderRepository::open(storage.scheduled_orders_path()).await?);
    let account_repo = Arc::new(FileBrokerAccountRepository::open(storage.accounts_path()).await?);
    let vault = Arc::new(FileCredentialVault::open(storage.credentials_path()).await?);

    for seed in seeds {
        account_repo.save(&seed.account).await?;
        vault.store_credentials(&seed.account.id, &seed.credentials).await?;
    }

    let tokens = Arc::new(TokenCache::new());
    let dyn_vault: Arc<dyn CredentialVault> = vault.clone();

    let angel_one = AngelOneAdapter::new(
        &config.brokers.angelone.adapter_config(),
        Arc::clone(&dyn_vault),
        Arc::clone(&tokens),
    )?;
    let dhan = DhanAdapter::new(
        &config.brokers.dhan.adapter_config(),
        dyn_vault,
        Arc::clone(&tokens),
    )?;

    let registry = BrokerRegistry::new()
        .with(Arc::new(angel_one))
        .with(Arc::new(dhan));
    tracing::info!(brokers = registry.len(), "Broker registry initialized");

    Ok(Container::new(
        order_repo,
        scheduled_repo,
        account_repo,
        vault,
        Arc::new(registry),
    ))
}

/// Open the job store, build the scheduler and re-arm persisted jobs.
async fn create_scheduler(
    config: &Config,
    container: &AppContainer,
    engine: &Arc<ExecuteOrderUseCase<FileOrderRepository, FileBrokerAccountRepository>>,
) -> Result<Arc<AppScheduler>, Box<dyn std::error::Error>> {
    let store = Arc::new(FileJobStore::open(&config.scheduler.job_store_path).await?);
    let runner = Arc::new(container.scheduled_order_runner(Arc::clone(engine)));
    let scheduler = Arc::new(TokioOrderScheduler::new(store, runner));

    let restored = scheduler.restore().await?;
    tracing::info!(
        path = %config.scheduler.job_store_path,
        restored,
        "Scheduler started"
    );

    Ok(scheduler)
}

/// Start the HTTP server with graceful shutdown support.
async fn start_http_server(
    config: &Config,
    state: AppHttpState,
    shutdown_tx: broadcast::Sender<()>,
) -> Result<JoinHandle<()>, Box<dyn std::error::Error>> {
    let app = create_router(state);
    let http_addr = config.http_addr()?;

    tracing::info!(%http_addr, "HTTP server starting");
    tracing::info!("Endpoints:");
    tracing::info!("  GET    /health");
    tracing::info!("  GET    /api/v1/orders");
    tracing::info!("  POST   /api/v1/orders/place");
    tracing::info!("  POST   /api/v1/orders/schedule");
    tracing::info!("  DELETE /api/v1/orders/schedule/{{job_key}}");
    tracing::info!("  GET    /api/v1/orders/{{id}}");
    tracing::info!("  GET    /api/v1/brokers/available");
    tracing::info!("  GET    /api/v1/brokers/linked");
    tracing::info!("  POST   /api/v1/brokers/link");
    tracing::info!("  GET    /api/v1/brokers/{{account_id}}/positions");
    tracing::info!("  POST   /api/v1/brokers/{{account_id}}/positions/close");
    tracing::info!("  GET    /api/v1/marketdata/history/{{account_id}}/{{symbol}}");

    let listener = TcpListener::bind(http_addr).await?;
    let http_server =
        axum::serve(listener, app).with_graceful_shutdown(shutdown_signal(shutdown_tx));

    let handle = tokio::spawn(async move {
        if let Err(e) = http_server.await {
            tracing::error!("HTTP server error: {e}");
        }
    });

    Ok(handle)
}

/// Wait for the HTTP server to drain, bounded by the configured timeout
/// once it has begun shutting down.
async fn await_shutdown(
    http_handle: JoinHandle<()>,
    shutdown_rx: broadcast::Receiver<()>,
    config: &Config,
) {
    let timeout = Duration::from_secs(config.server.shutdown_timeout_secs);
    let abort = http_handle.abort_handle();

    tokio::select! {
        _ = http_handle => {
            tracing::info!("HTTP server stopped");
        }
        () = drain_deadline(shutdown_rx, timeout) => {
            tracing::warn!(timeout_secs = timeout.as_secs(), "HTTP server did not drain in time");
            abort.abort();
        }
    }
}

/// Resolves `timeout` after a shutdown signal has been received.
async fn drain_deadline(mut shutdown_rx: broadcast::Receiver<()>, timeout: Duration) {
    if shutdown_rx.recv().await.is_err() {
        // Sender gone without a signal: the server future owns it and has ended.
        std::future::pending::<()>().await;
    }
    tokio::time::sleep(timeout).await;
}

/// Load .env file from current directory or any ancestor directory.
fn load_dotenv_from_ancestors() {
    if dotenvy::dotenv().is_ok() {
        return;
    }

    if let Ok(cwd) = std::env::current_dir() {
        let mut dir = cwd.as_path();
        while let Some(parent) = dir.parent() {
            let env_path = parent.join(".env");
            if env_path.exists() {
                let _ = dotenvy::from_path(&env_path);
                return;
            }
            dir = parent;
        }
    }
}

/// Wait for shutdown signal (SIGTERM or SIGINT).
///
/// # Panics
///
/// Panics if signal handlers cannot be installed. Startup fails fast rather
/// than running a process that cannot respond to termination signals.
#[allow(clippy::expect_used)]
async fn shutdown_signal(shutdown_tx: broadcast::Sender<()>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("signal handler installation is critical for graceful shutdown");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("SIGTERM handler installation is critical for graceful shutdown")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, initiating shutdown");
        }
    }

    let _ = shutdown_tx.send(());

    tracing::info!("Graceful shutdown started");
}
