use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::consents::ConsentStatus;
use crate::ids::{
    AgreementId, CompanyId, IdentityId, OfferId, OfferSubscriptionId, ProcessId, ProviderDetailId,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OfferType {
    App,
    Service,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OfferStatus {
    Created,
    Active,
    Inactive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OfferSubscriptionStatus {
    Pending,
    Active,
    Inactive,
}

impl OfferSubscriptionStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Active => "ACTIVE",
            Self::Inactive => "INACTIVE",
        }
    }
}

impl fmt::Display for OfferSubscriptionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// App or service listed in the marketplace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Offer {
    pub id: OfferId,
    pub offer_type: OfferType,
    pub name: String,
    pub status: OfferStatus,
    pub provider_company_id: CompanyId,
    pub provider_contact_email: Option<String>,
    /// Agreements a subscriber may consent to.
    pub agreement_ids: Vec<AgreementId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfferSubscription {
    pub id: OfferSubscriptionId,
    pub offer_id: OfferId,
    pub company_id: CompanyId,
    pub requester_id: IdentityId,
    pub status: OfferSubscriptionStatus,
    pub process_id: Option<ProcessId>,
    pub date_created: DateTime<Utc>,
}

/// Auto-setup endpoints a provider company registers for new subscriptions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderCompanyDetail {
    pub id: ProviderDetailId,
    pub company_id: CompanyId,
    pub auto_setup_url: String,
    pub auto_setup_callback_url: Option<String>,
    pub date_last_changed: DateTime<Utc>,
    pub last_editor_id: IdentityId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderDetailData {
    pub url: String,
    #[serde(default)]
    pub callback_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderDetailReturnData {
    pub id: Option<ProviderDetailId>,
    pub company_id: CompanyId,
    pub url: Option<String>,
    pub callback_url: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfferAgreementConsentData {
    pub agreement_id: AgreementId,
    pub consent_status: ConsentStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionCreatedData {
    pub subscription_id: OfferSubscriptionId,
    pub process_id: ProcessId,
}
