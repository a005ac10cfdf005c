pub mod logger;
pub mod proxy;
pub mod settings;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use proxy::filter::ModelFilter;
use proxy::registry::ModelRegistry;
use proxy::upstream::{CatalogSource, OpenRouterClient};
use proxy::SharedState;
use settings::Settings;

const LOG_FILE_ENV: &str = "OLLABRIDGE_LOG_FILE";

/// Builds the shared state and serves the proxy until the process is
/// stopped.
pub async fn run() -> anyhow::Result<()> {
    let log_file = std::env::var_os(LOG_FILE_ENV).map(PathBuf::from);
    logger::setup_logger(log_file.as_deref())?;

    let settings = Settings::load().map_err(|e| {
        log::error!("failed to load settings: {}", e);
        anyhow::anyhow!(e)
    })?;

    let filter = ModelFilter::load(&settings.filter_path).map_err(|e| {
        log::error!(
            "failed to read model filter {:?}: {}",
            settings.filter_path,
            e
        );
        anyhow::anyhow!(e)
    })?;

    let upstream = Arc::new(OpenRouterClient::new(&settings)?);
    let catalog: Arc<dyn CatalogSource> = upstream.clone();
    let registry = ModelRegistry::new(catalog, settings.strict_models);

    let addr = SocketAddr::from(([0, 0, 0, 0], settings.port));
    let state = Arc::new(SharedState {
        settings,
        upstream,
        registry,
        filter,
    });

    let app = proxy::routes(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    log::info!("ollabridge listening on {}", addr);
    axum::serve(listener, app).await?;
    Ok(())
}
