use super::domain::{Offer, OfferSubscription, OfferSubscriptionStatus, ProviderCompanyDetail};
use crate::consents::Consent;
use crate::ids::{CompanyId, OfferId, OfferSubscriptionId};
use crate::processes::{Process, ProcessStep};
use crate::registration::domain::CompanyRole;
use crate::store::{PortalStore, RepositoryError};

/// Subscription status together with its process and every step of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionProcessData {
    pub status: OfferSubscriptionStatus,
    pub process: Option<Process>,
    pub steps: Vec<ProcessStep>,
}

pub trait SubscriptionRepository: PortalStore {
    /// `None` when the company does not exist.
    fn company_roles(&self, company_id: CompanyId)
        -> Result<Option<Vec<CompanyRole>>, RepositoryError>;

    fn provider_detail(
        &self,
        company_id: CompanyId,
    ) -> Result<Option<ProviderCompanyDetail>, RepositoryError>;

    fn subscription_process_data(
        &self,
        subscription_id: OfferSubscriptionId,
    ) -> Result<Option<SubscriptionProcessData>, RepositoryError>;

    fn offer(&self, offer_id: OfferId) -> Result<Option<Offer>, RepositoryError>;

    fn subscription(
        &self,
        subscription_id: OfferSubscriptionId,
    ) -> Result<Option<OfferSubscription>, RepositoryError>;

    /// The subscription of `company_id` to `offer_id`, in any status.
    fn company_subscription(
        &self,
        offer_id: OfferId,
        company_id: CompanyId,
    ) -> Result<Option<OfferSubscription>, RepositoryError>;

    fn consents_for_subscription(
        &self,
        subscription_id: OfferSubscriptionId,
    ) -> Result<Vec<Consent>, RepositoryError>;
}
