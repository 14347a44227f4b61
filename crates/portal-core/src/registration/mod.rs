//! Partner registration through onboarding service providers.

pub mod checklist;
pub mod domain;
pub mod errors;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use checklist::{ChecklistEntry, ChecklistService, StandardChecklist};
pub use domain::{
    AgreementConsentData, CompanyApplication, CompanyApplicationStatus, CompanyApplicationType,
    CompanyRole, CompanyStatus, DeclineOspData, PartnerSubmitData,
};
pub use errors::NetworkError;
pub use repository::{DeclineData, NetworkRepository, SubmitData};
pub use router::network_router;
pub use service::NetworkService;
