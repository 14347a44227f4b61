use crate::cli::ServeArgs;
use crate::infra::{demo_state, AppState, TracingMailSender};
use crate::routes::{with_portal_routes, PortalServices};
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use portal_core::config::AppConfig;
use portal_core::error::AppError;
use portal_core::registration::{NetworkService, StandardChecklist};
use portal_core::store::{InMemoryPortalStore, PortalState};
use portal_core::subscriptions::{OfferSubscriptionService, SubscriptionConfigurationService};
use portal_core::telemetry;
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

    let state = if args.seed_demo {
        let demo = demo_state();
        info!(
            companies = demo.state.companies.len(),
            offers = demo.state.offers.len(),
            "loaded demo portal data"
        );
        demo.state
    } else {
        PortalState::default()
    };
    let store = Arc::new(InMemoryPortalStore::new(state));
    let services = PortalServices {
        network: Arc::new(NetworkService::new(store.clone(), Arc::new(StandardChecklist))),
        configuration: Arc::new(SubscriptionConfigurationService::new(
            store.clone(),
            config.portal,
        )),
        marketplace: Arc::new(OfferSubscriptionService::new(
            store,
            Arc::new(TracingMailSender),
        )),
    };

    let app = with_portal_routes(services)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "portal backend ready");

    axum::serve(listener, app).await?;
    Ok(())
}
