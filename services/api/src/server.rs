use crate::cli::ServeArgs;
use crate::infra::{
    seeded_directories, AppState, InMemoryPartnershipRepository, InMemoryShareRepository,
};
use crate::routes::with_sharing_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use propshare::config::AppConfig;
use propshare::error::AppError;
use propshare::sharing::{SharingRouterState, SharingService, VisibilityProjector};
use propshare::telemetry;
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

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let partnerships = Arc::new(InMemoryPartnershipRepository::default());
    let shares = Arc::new(InMemoryShareRepository::default());
    let (companies, listings) = seeded_directories();
    let companies = Arc::new(companies);
    let listings = Arc::new(listings);

    let service = Arc::new(SharingService::new(
        partnerships,
        shares.clone(),
        companies.clone(),
        listings.clone(),
    ));
    let projector = Arc::new(VisibilityProjector::new(shares, companies, listings));

    let app = with_sharing_routes(SharingRouterState { service, projector })
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "partnership and sharing service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
