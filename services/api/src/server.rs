use crate::cli::ServeArgs;
use crate::infra::{AppState, LogNotificationSink};
use crate::routes::with_feed_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use berth_match::catalog::{HttpCatalog, SyntheticCatalog};
use berth_match::config::AppConfig;
use berth_match::error::AppError;
use berth_match::feed::{CatalogSource, FeedHub, NotificationSink, SearchPreferences};
use berth_match::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    // The HTTP catalog doubles as the broker notification channel. Without a
    // configured endpoint the feed runs on synthetic inventory and notices go
    // to the log.
    match HttpCatalog::from_config(&config.catalog)? {
        Some(catalog) => {
            let catalog = Arc::new(catalog);
            info!("catalog endpoint configured; serving live inventory");
            serve(config, catalog.clone(), catalog).await
        }
        None => {
            info!("no catalog endpoint configured; serving synthetic inventory");
            serve(
                config,
                Arc::new(SyntheticCatalog),
                Arc::new(LogNotificationSink),
            )
            .await
        }
    }
}

async fn serve<C, N>(config: AppConfig, catalog: Arc<C>, sink: Arc<N>) -> Result<(), AppError>
where
    C: CatalogSource + 'static,
    N: NotificationSink + 'static,
{
    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let hub = Arc::new(FeedHub::new(catalog, sink, SearchPreferences::default()));

    let app = with_feed_routes(hub)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "boat discovery feed ready");

    axum::serve(listener, app).await?;
    Ok(())
}
