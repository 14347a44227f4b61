use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::consents::ConsentStatus;
use crate::ids::{AgreementId, ApplicationId, CompanyId, IdentityId, InvitationId, ProcessId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CompanyApplicationStatus {
    Created,
    AddCompanyData,
    InviteUser,
    SelectCompanyRole,
    UploadDocuments,
    Verify,
    Submitted,
    Confirmed,
    Declined,
    CancelledByCustomer,
}

impl CompanyApplicationStatus {
    /// Applications in a final state no longer count towards the one-per-company rule.
    pub const fn is_closed(self) -> bool {
        matches!(
            self,
            Self::Confirmed | Self::Declined | Self::CancelledByCustomer
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CompanyApplicationType {
    Internal,
    External,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CompanyStatus {
    Pending,
    Active,
    Rejected,
    Inactive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CompanyRole {
    ActiveParticipant,
    AppProvider,
    ServiceProvider,
    OnboardingServiceProvider,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserStatus {
    Pending,
    Active,
    Inactive,
    Deleted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InvitationStatus {
    Created,
    Pending,
    Accepted,
    Declined,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyApplication {
    pub id: ApplicationId,
    pub company_id: CompanyId,
    pub status: CompanyApplicationStatus,
    pub application_type: CompanyApplicationType,
    /// Onboarding service provider endpoint notified about state changes.
    pub callback_url: Option<String>,
    pub date_created: DateTime<Utc>,
    pub date_last_changed: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Company {
    pub id: CompanyId,
    pub name: String,
    pub status: CompanyStatus,
    pub business_partner_number: Option<String>,
    pub roles: Vec<CompanyRole>,
    /// Partner registration process opened by the onboarding service provider.
    pub registration_process_id: Option<ProcessId>,
}

impl Company {
    pub fn has_any_role(&self, roles: &[CompanyRole]) -> bool {
        self.roles.iter().any(|role| roles.contains(role))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: IdentityId,
    pub company_id: CompanyId,
    pub status: UserStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invitation {
    pub id: InvitationId,
    pub application_id: ApplicationId,
    pub status: InvitationStatus,
}

/// Agreements a company has to accept before it may take on a role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleAgreements {
    pub role: CompanyRole,
    pub agreement_ids: Vec<AgreementId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgreementConsentData {
    pub agreement_id: AgreementId,
    pub consent_status: ConsentStatus,
}

/// Payload submitted by a partner registered through an onboarding service provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartnerSubmitData {
    pub company_roles: Vec<CompanyRole>,
    pub agreements: Vec<AgreementConsentData>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeclineOspData {
    #[serde(default)]
    pub message: Option<String>,
}
