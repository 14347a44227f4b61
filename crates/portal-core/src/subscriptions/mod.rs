//! Offer subscriptions, provider auto-setup details and process retriggers.

pub mod configuration;
pub mod domain;
pub mod offers;
pub mod repository;
pub mod router;

#[cfg(test)]
mod tests;

pub use configuration::SubscriptionConfigurationService;
pub use domain::{
    Offer, OfferAgreementConsentData, OfferStatus, OfferSubscription, OfferSubscriptionStatus,
    OfferType, ProviderCompanyDetail, ProviderDetailData, ProviderDetailReturnData,
    SubscriptionCreatedData,
};
pub use offers::OfferSubscriptionService;
pub use repository::{SubscriptionProcessData, SubscriptionRepository};
pub use router::{configuration_router, marketplace_router};
