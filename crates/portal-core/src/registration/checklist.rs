use serde::{Deserialize, Serialize};

use crate::processes::ProcessStepType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChecklistEntryType {
    RegistrationVerification,
    BusinessPartnerNumber,
    IdentityWallet,
    SelfDescriptionLp,
    ClearingHouse,
    ApplicationActivation,
}

impl ChecklistEntryType {
    pub const fn ordered() -> [Self; 6] {
        [
            Self::RegistrationVerification,
            Self::BusinessPartnerNumber,
            Self::IdentityWallet,
            Self::SelfDescriptionLp,
            Self::ClearingHouse,
            Self::ApplicationActivation,
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChecklistEntryStatus {
    #[serde(rename = "TO_DO")]
    ToDo,
    #[serde(rename = "IN_PROGRESS")]
    InProgress,
    #[serde(rename = "DONE")]
    Done,
    #[serde(rename = "FAILED")]
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistEntry {
    pub entry_type: ChecklistEntryType,
    pub status: ChecklistEntryStatus,
}

impl ChecklistEntry {
    pub const fn new(entry_type: ChecklistEntryType, status: ChecklistEntryStatus) -> Self {
        Self { entry_type, status }
    }
}

/// Builds the verification checklist of a freshly submitted application.
pub trait ChecklistService: Send + Sync {
    fn create_initial_checklist(&self, business_partner_number: Option<&str>)
        -> Vec<ChecklistEntry>;

    /// Step types queued on the new checklist process.
    fn initial_process_steps(&self, entries: &[ChecklistEntry]) -> Vec<ProcessStepType>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct StandardChecklist;

impl ChecklistService for StandardChecklist {
    fn create_initial_checklist(
        &self,
        business_partner_number: Option<&str>,
    ) -> Vec<ChecklistEntry> {
        let has_bpn = business_partner_number.is_some_and(|bpn| !bpn.trim().is_empty());
        ChecklistEntryType::ordered()
            .into_iter()
            .map(|entry_type| {
                let status = match entry_type {
                    ChecklistEntryType::BusinessPartnerNumber if has_bpn => {
                        ChecklistEntryStatus::Done
                    }
                    _ => ChecklistEntryStatus::ToDo,
                };
                ChecklistEntry::new(entry_type, status)
            })
            .collect()
    }

    fn initial_process_steps(&self, entries: &[ChecklistEntry]) -> Vec<ProcessStepType> {
        let is_open = |entry_type: ChecklistEntryType| {
            entries.iter().any(|entry| {
                entry.entry_type == entry_type && entry.status == ChecklistEntryStatus::ToDo
            })
        };

        let mut steps = Vec::new();
        if is_open(ChecklistEntryType::RegistrationVerification) {
            steps.push(ProcessStepType::VerifyRegistration);
        }
        if is_open(ChecklistEntryType::BusinessPartnerNumber) {
            steps.push(ProcessStepType::CreateBusinessPartnerNumberPush);
        }
        if !steps.is_empty() {
            steps.push(ProcessStepType::ManualDeclineApplication);
        }
        steps
    }
}
