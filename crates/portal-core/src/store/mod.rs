//! Persistence boundary: every business operation records its writes in a
//! [`UnitOfWork`] and hands it to a [`PortalStore`] in a single save.

pub mod memory;

use chrono::{DateTime, Utc};

use crate::consents::{Consent, ConsentStatus};
use crate::ids::{
    ApplicationId, CompanyId, ConsentId, IdentityId, InvitationId, OfferSubscriptionId,
    ProcessId, ProcessStepId, ProviderDetailId, VersionToken,
};
use crate::processes::{Process, ProcessStep, ProcessStepStatus};
use crate::registration::checklist::ChecklistEntry;
use crate::registration::domain::{
    CompanyApplicationStatus, CompanyStatus, InvitationStatus, UserStatus,
};
use crate::subscriptions::domain::{
    OfferSubscription, OfferSubscriptionStatus, ProviderCompanyDetail,
};

pub use memory::{InMemoryPortalStore, PortalState};

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("process {process_id} was modified concurrently")]
    ConcurrencyConflict { process_id: ProcessId },
    #[error("process step {step_id} cannot move from {from} to {to}")]
    InvalidTransition {
        step_id: ProcessStepId,
        from: ProcessStepStatus,
        to: ProcessStepStatus,
    },
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// A single pending write.
#[derive(Debug, Clone, PartialEq)]
pub enum Change {
    CreateProcess(Process),
    CreateProcessSteps(Vec<ProcessStep>),
    ModifyProcessStep {
        step_id: ProcessStepId,
        status: ProcessStepStatus,
        message: Option<String>,
        changed_at: DateTime<Utc>,
    },
    /// Rolls the optimistic concurrency token and releases any lock.
    UpdateProcessVersion {
        process_id: ProcessId,
        expected: VersionToken,
        next: VersionToken,
    },
    CreateChecklist {
        application_id: ApplicationId,
        entries: Vec<ChecklistEntry>,
    },
    ModifyApplicationStatus {
        application_id: ApplicationId,
        status: CompanyApplicationStatus,
        changed_at: DateTime<Utc>,
    },
    ModifyCompanyStatus {
        company_id: CompanyId,
        status: CompanyStatus,
    },
    ModifyIdentityStatus {
        identity_id: IdentityId,
        status: UserStatus,
    },
    ModifyInvitationStatus {
        invitation_id: InvitationId,
        status: InvitationStatus,
    },
    CreateConsents(Vec<Consent>),
    ModifyConsentStatus {
        consent_id: ConsentId,
        status: ConsentStatus,
        changed_at: DateTime<Utc>,
    },
    CreateProviderDetail(ProviderCompanyDetail),
    ModifyProviderDetail {
        detail_id: ProviderDetailId,
        auto_setup_url: String,
        auto_setup_callback_url: Option<String>,
        editor_id: IdentityId,
        changed_at: DateTime<Utc>,
    },
    CreateOfferSubscription(OfferSubscription),
    ModifyOfferSubscription {
        subscription_id: OfferSubscriptionId,
        status: OfferSubscriptionStatus,
        process_id: Option<ProcessId>,
    },
}

/// Ordered set of writes applied all-or-nothing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UnitOfWork {
    changes: Vec<Change>,
}

impl UnitOfWork {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, change: Change) {
        self.changes.push(change);
    }

    pub fn changes(&self) -> &[Change] {
        &self.changes
    }

    pub fn into_changes(self) -> Vec<Change> {
        self.changes
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }
}

/// Transaction boundary of the portal persistence layer.
pub trait PortalStore: Send + Sync {
    /// Applies every change of `unit` or none of them; returns the number applied.
    fn save(&self, unit: UnitOfWork) -> Result<usize, RepositoryError>;
}
