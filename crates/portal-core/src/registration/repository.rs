use serde::{Deserialize, Serialize};

use super::domain::{
    CompanyApplication, CompanyApplicationStatus, CompanyStatus, InvitationStatus, RoleAgreements,
    UserStatus,
};
use crate::ids::{ApplicationId, CompanyId, IdentityId, InvitationId, ProcessId};
use crate::processes::{Process, ProcessStep};
use crate::store::{PortalStore, RepositoryError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationSummary {
    pub application_id: ApplicationId,
    pub status: CompanyApplicationStatus,
    pub callback_url: Option<String>,
}

/// Everything `submit` needs to know about the caller's company.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitData {
    /// Open (not yet closed) applications of the company.
    pub applications: Vec<ApplicationSummary>,
    pub role_agreements: Vec<RoleAgreements>,
    pub registration_process_id: Option<ProcessId>,
    pub business_partner_number: Option<String>,
}

/// Entities touched when an onboarding service provider declines a registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclineData {
    pub application: CompanyApplication,
    pub company_status: CompanyStatus,
    pub identities: Vec<(IdentityId, UserStatus)>,
    pub invitations: Vec<(InvitationId, InvitationStatus)>,
    pub process: Option<Process>,
    pub process_steps: Vec<ProcessStep>,
}

pub trait NetworkRepository: PortalStore {
    /// `None` when the company does not exist.
    fn submit_data(&self, company_id: CompanyId) -> Result<Option<SubmitData>, RepositoryError>;

    /// `None` when the application does not exist.
    fn decline_data(
        &self,
        application_id: ApplicationId,
    ) -> Result<Option<DeclineData>, RepositoryError>;
}
