use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};

use super::configuration::SubscriptionConfigurationService;
use super::domain::{
    OfferAgreementConsentData, ProviderDetailData, ProviderDetailReturnData,
    SubscriptionCreatedData,
};
use super::offers::OfferSubscriptionService;
use super::repository::SubscriptionRepository;
use crate::error::PortalError;
use crate::identity::IdentityData;
use crate::ids::{OfferId, OfferSubscriptionId};
use crate::notifications::MailSender;
use crate::processes::ProcessStepData;

const CONFIGURATION_BASE: &str = "/api/administration/subscriptionconfiguration";

/// Router for provider configuration and subscription process retriggers.
pub fn configuration_router<R>(service: Arc<SubscriptionConfigurationService<R>>) -> Router
where
    R: SubscriptionRepository + 'static,
{
    Router::new()
        .route(
            &format!("{CONFIGURATION_BASE}/owncompany"),
            get(provider_details_handler::<R>).put(set_provider_details_handler::<R>),
        )
        .route(
            &format!("{CONFIGURATION_BASE}/retrigger-provider/:subscription_id"),
            put(retrigger_provider_handler::<R>),
        )
        .route(
            &format!("{CONFIGURATION_BASE}/retrigger-create-client/:subscription_id"),
            put(retrigger_create_client_handler::<R>),
        )
        .route(
            &format!("{CONFIGURATION_BASE}/retrigger-create-technical-user/:subscription_id"),
            put(retrigger_create_technical_user_handler::<R>),
        )
        .route(
            &format!("{CONFIGURATION_BASE}/retrigger-provider-callback/:subscription_id"),
            put(retrigger_provider_callback_handler::<R>),
        )
        .route(
            &format!("{CONFIGURATION_BASE}/process/offer-subscription/:subscription_id"),
            get(process_steps_handler::<R>),
        )
        .with_state(service)
}

/// Router for subscribing to marketplace offers.
pub fn marketplace_router<R, M>(service: Arc<OfferSubscriptionService<R, M>>) -> Router
where
    R: SubscriptionRepository + 'static,
    M: MailSender + 'static,
{
    Router::new()
        .route(
            "/api/marketplace/offers/:offer_id/subscribe",
            post(subscribe_handler::<R, M>),
        )
        .route(
            "/api/marketplace/subscriptions/:subscription_id/activate",
            put(activate_handler::<R, M>),
        )
        .route(
            "/api/marketplace/subscriptions/:subscription_id/unsubscribe",
            put(unsubscribe_handler::<R, M>),
        )
        .route(
            "/api/marketplace/subscriptions/:subscription_id/consents",
            post(consents_handler::<R, M>),
        )
        .with_state(service)
}

type ConfigurationState<R> = State<Arc<SubscriptionConfigurationService<R>>>;
type MarketplaceState<R, M> = State<Arc<OfferSubscriptionService<R, M>>>;

pub(crate) async fn provider_details_handler<R>(
    State(service): ConfigurationState<R>,
    identity: IdentityData,
) -> Result<Json<ProviderDetailReturnData>, PortalError>
where
    R: SubscriptionRepository + 'static,
{
    service.provider_company_details(&identity).map(Json)
}

pub(crate) async fn set_provider_details_handler<R>(
    State(service): ConfigurationState<R>,
    identity: IdentityData,
    Json(data): Json<ProviderDetailData>,
) -> Result<StatusCode, PortalError>
where
    R: SubscriptionRepository + 'static,
{
    service.set_provider_company_details(&identity, data)?;
    Ok(StatusCode::NO_CONTENT)
}

pub(crate) async fn retrigger_provider_handler<R>(
    State(service): ConfigurationState<R>,
    _identity: IdentityData,
    Path(subscription_id): Path<OfferSubscriptionId>,
) -> Result<StatusCode, PortalError>
where
    R: SubscriptionRepository + 'static,
{
    service.retrigger_provider(subscription_id)?;
    Ok(StatusCode::NO_CONTENT)
}

pub(crate) async fn retrigger_create_client_handler<R>(
    State(service): ConfigurationState<R>,
    _identity: IdentityData,
    Path(subscription_id): Path<OfferSubscriptionId>,
) -> Result<StatusCode, PortalError>
where
    R: SubscriptionRepository + 'static,
{
    service.retrigger_create_client(subscription_id)?;
    Ok(StatusCode::NO_CONTENT)
}

pub(crate) async fn retrigger_create_technical_user_handler<R>(
    State(service): ConfigurationState<R>,
    _identity: IdentityData,
    Path(subscription_id): Path<OfferSubscriptionId>,
) -> Result<StatusCode, PortalError>
where
    R: SubscriptionRepository + 'static,
{
    service.retrigger_create_technical_user(subscription_id)?;
    Ok(StatusCode::NO_CONTENT)
}

pub(crate) async fn retrigger_provider_callback_handler<R>(
    State(service): ConfigurationState<R>,
    _identity: IdentityData,
    Path(subscription_id): Path<OfferSubscriptionId>,
) -> Result<StatusCode, PortalError>
where
    R: SubscriptionRepository + 'static,
{
    service.retrigger_provider_callback(subscription_id)?;
    Ok(StatusCode::NO_CONTENT)
}

pub(crate) async fn process_steps_handler<R>(
    State(service): ConfigurationState<R>,
    _identity: IdentityData,
    Path(subscription_id): Path<OfferSubscriptionId>,
) -> Result<Json<Vec<ProcessStepData>>, PortalError>
where
    R: SubscriptionRepository + 'static,
{
    service.process_steps_for_subscription(subscription_id).map(Json)
}

pub(crate) async fn subscribe_handler<R, M>(
    State(service): MarketplaceState<R, M>,
    identity: IdentityData,
    Path(offer_id): Path<OfferId>,
) -> Result<(StatusCode, Json<SubscriptionCreatedData>), PortalError>
where
    R: SubscriptionRepository + 'static,
    M: MailSender + 'static,
{
    let created = service.subscribe(&identity, offer_id)?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub(crate) async fn activate_handler<R, M>(
    State(service): MarketplaceState<R, M>,
    identity: IdentityData,
    Path(subscription_id): Path<OfferSubscriptionId>,
) -> Result<StatusCode, PortalError>
where
    R: SubscriptionRepository + 'static,
    M: MailSender + 'static,
{
    service.activate(&identity, subscription_id)?;
    Ok(StatusCode::NO_CONTENT)
}

pub(crate) async fn unsubscribe_handler<R, M>(
    State(service): MarketplaceState<R, M>,
    identity: IdentityData,
    Path(subscription_id): Path<OfferSubscriptionId>,
) -> Result<StatusCode, PortalError>
where
    R: SubscriptionRepository + 'static,
    M: MailSender + 'static,
{
    service.unsubscribe(&identity, subscription_id)?;
    Ok(StatusCode::NO_CONTENT)
}

pub(crate) async fn consents_handler<R, M>(
    State(service): MarketplaceState<R, M>,
    identity: IdentityData,
    Path(subscription_id): Path<OfferSubscriptionId>,
    Json(consents): Json<Vec<OfferAgreementConsentData>>,
) -> Result<StatusCode, PortalError>
where
    R: SubscriptionRepository + 'static,
    M: MailSender + 'static,
{
    service.update_consents(&identity, subscription_id, consents)?;
    Ok(StatusCode::NO_CONTENT)
}
