use crate::cli::ServeArgs;
use crate::infra::AppState;
use crate::routes::with_lead_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use lead_finder::config::AppConfig;
use lead_finder::error::AppError;
use lead_finder::leads::{CsvExporter, HttpLeadSource, LeadSession};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut config: AppConfig, mut args: ServeArgs) -> Result<(), AppError> {
    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let source = Arc::new(HttpLeadSource::from_config(&config.search)?);
    let exporter = CsvExporter::new(config.export.profile, config.export.quoting);
    let session = Arc::new(LeadSession::new(source, exporter));

    let app = with_lead_routes(session)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        search_api = %config.search.base_url,
        profile = config.export.profile.label(),
        "lead finder ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
