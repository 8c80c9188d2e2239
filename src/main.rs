use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use clap::Parser;
use tokio::signal;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use shipcheck::api::routes::{create_router, AppState};
use shipcheck::config::Config;
use shipcheck::engine::BatchRunner;
use shipcheck::narrative::{
    GeminiClient, GeminiConfig, NarrativeService, OllamaClient, OllamaConfig, RetryPolicy,
};
use shipcheck::observability::{init_tracing, MetricsRegistry};
use shipcheck::policy::{RulebookLoader, RulebookWatcher};
use shipcheck::storage::{FileStore, MemoryStore, PostgresStore, RuleStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    init_tracing(&config.log_level, config.log_json);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "Starting shipcheck compliance service"
    );

    let metrics = Arc::new(MetricsRegistry::new());

    let (store, watcher_handle) = open_store(&config).await?;

    let narrative = match config.gemini_api_key() {
        Some(key) => {
            let gemini = GeminiConfig {
                api_key: key.to_string(),
                model: config.gemini_model.clone(),
                base_url: config.gemini_base_url.clone(),
                timeout: config.llm_timeout(),
            };
            let client = GeminiClient::new(gemini)?;
            info!(
                model = %config.gemini_model,
                endpoint = client.endpoint(),
                "Narrative generation enabled"
            );
            let retry = RetryPolicy::new(config.llm_max_attempts, config.llm_backoff_base());
            let mut service =
                NarrativeService::new(Arc::new(client), retry).with_metrics(Arc::clone(&metrics));
            if let Some(base_url) = config.ollama_base_url() {
                let ollama = OllamaClient::new(OllamaConfig {
                    base_url: base_url.to_string(),
                    model: config.ollama_model.clone(),
                    temperature: 0.5,
                    timeout: config.llm_timeout(),
                })?;
                info!(model = %config.ollama_model, endpoint = ollama.endpoint(), "Quick check enabled");
                service = service.with_quick_check(Arc::new(ollama));
            }
            Some(Arc::new(service))
        }
        None => {
            warn!("GEMINI_API_KEY not set, narrative endpoints are disabled");
            None
        }
    };

    let state = Arc::new(AppState {
        store,
        narrative,
        batch: BatchRunner::new(config.batch_chunk_size),
        metrics,
        start_time: Instant::now(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        request_timeout: config.request_timeout(),
    });

    let app = create_router(state);

    let addr: SocketAddr = config.listen_addr.parse()?;
    info!(addr = %addr, "Starting HTTP server");

    let listener = tokio::net::TcpListener::bind(addr).await?;

    if config.graceful_shutdown {
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let server = tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    let _ = shutdown_rx.changed().await;
                })
                .await
        });

        shutdown_signal().await;
        let _ = shutdown_tx.send(true);

        match tokio::time::timeout(config.shutdown_timeout(), server).await {
            Ok(Ok(result)) => result?,
            Ok(Err(e)) => error!(error = %e, "Server task failed"),
            Err(_) => warn!(
                timeout_secs = config.shutdown_timeout_secs,
                "In-flight requests did not finish before the shutdown timeout"
            ),
        }
    } else {
        axum::serve(listener, app).await?;
    }

    info!("Shutting down...");
    if let Some(handle) = watcher_handle {
        handle.abort();
    }

    info!("Shutdown complete");
    Ok(())
}

/// Pick the rule store: Postgres when a database URL is configured, then a
/// watched rulebook file, then an empty in-memory store.
async fn open_store(
    config: &Config,
) -> anyhow::Result<(Arc<dyn RuleStore>, Option<JoinHandle<()>>)> {
    if let Some(url) = config.database_url.as_deref() {
        let store = PostgresStore::connect(
            url,
            config.db_min_connections,
            config.db_max_connections,
        )
        .await?;
        if config.run_migrations {
            store.run_migrations().await?;
            info!("Database migrations applied");
        }
        info!(
            max_connections = config.db_max_connections,
            "Using Postgres rule store"
        );
        return Ok((Arc::new(store), None));
    }

    if let Some(path) = config.rulebook_path.as_ref() {
        let loader = RulebookLoader::new(path.clone());
        let watcher = RulebookWatcher::new(loader, config.rulebook_reload_interval());
        let (rulebook_rx, handle) = watcher.start()?;
        info!(path = %path.display(), "Using rulebook file store");
        return Ok((Arc::new(FileStore::new(rulebook_rx)), Some(handle)));
    }

    warn!("No DATABASE_URL or rulebook configured, starting with an empty in-memory store");
    Ok((Arc::new(MemoryStore::new()), None))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Received shutdown signal");
}
