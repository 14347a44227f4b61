use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};

use super::checklist::ChecklistService;
use super::domain::{DeclineOspData, PartnerSubmitData};
use super::repository::NetworkRepository;
use super::service::NetworkService;
use crate::error::PortalError;
use crate::identity::IdentityData;
use crate::ids::ApplicationId;

/// Router exposing the partner registration endpoints.
pub fn network_router<R, C>(service: Arc<NetworkService<R, C>>) -> Router
where
    R: NetworkRepository + 'static,
    C: ChecklistService + 'static,
{
    Router::new()
        .route(
            "/api/registration/network/partnerRegistration/submit",
            post(submit_handler::<R, C>),
        )
        .route(
            "/api/registration/network/:application_id/decline",
            post(decline_handler::<R, C>),
        )
        .with_state(service)
}

pub(crate) async fn submit_handler<R, C>(
    State(service): State<Arc<NetworkService<R, C>>>,
    identity: IdentityData,
    Json(data): Json<PartnerSubmitData>,
) -> Result<StatusCode, PortalError>
where
    R: NetworkRepository + 'static,
    C: ChecklistService + 'static,
{
    service.submit(&identity, data)?;
    Ok(StatusCode::NO_CONTENT)
}

pub(crate) async fn decline_handler<R, C>(
    State(service): State<Arc<NetworkService<R, C>>>,
    identity: IdentityData,
    Path(application_id): Path<ApplicationId>,
    body: Bytes,
) -> Result<StatusCode, PortalError>
where
    R: NetworkRepository + 'static,
    C: ChecklistService + 'static,
{
    let data = decline_payload(&body)?;
    service.decline_osp(&identity, application_id, data)?;
    Ok(StatusCode::NO_CONTENT)
}

/// The decline body is optional; an absent body means no message, a malformed one is rejected.
fn decline_payload(body: &[u8]) -> Result<DeclineOspData, PortalError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(DeclineOspData::default());
    }
    serde_json::from_slice(body).map_err(|err| PortalError::ControllerArgument {
        message: format!("invalid decline payload: {err}"),
        argument: None,
    })
}
