use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use portal_core::notifications::MailSender;
use portal_core::registration::{
    network_router, ChecklistService, NetworkRepository, NetworkService,
};
use portal_core::subscriptions::{
    configuration_router, marketplace_router, OfferSubscriptionService,
    SubscriptionConfigurationService, SubscriptionRepository,
};
use serde_json::json;
use std::sync::Arc;

/// Portal services mounted by the HTTP server.
pub(crate) struct PortalServices<R, C, M> {
    pub(crate) network: Arc<NetworkService<R, C>>,
    pub(crate) configuration: Arc<SubscriptionConfigurationService<R>>,
    pub(crate) marketplace: Arc<OfferSubscriptionService<R, M>>,
}

pub(crate) fn with_portal_routes<R, C, M>(services: PortalServices<R, C, M>) -> axum::Router
where
    R: NetworkRepository + SubscriptionRepository + 'static,
    C: ChecklistService + 'static,
    M: MailSender + 'static,
{
    network_router(services.network)
        .merge(configuration_router(services.configuration))
        .merge(marketplace_router(services.marketplace))
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}
