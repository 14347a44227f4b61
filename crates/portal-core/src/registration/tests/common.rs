use std::sync::Arc;

use axum::response::Response;
use chrono::Utc;
use serde_json::Value;

use crate::consents::ConsentStatus;
use crate::error::PortalError;
use crate::identity::IdentityData;
use crate::ids::{
    AgreementId, ApplicationId, CompanyId, IdentityId, InvitationId, ProcessId,
};
use crate::processes::{Process, ProcessStep, ProcessStepStatus, ProcessStepType, ProcessType};
use crate::registration::checklist::StandardChecklist;
use crate::registration::domain::{
    AgreementConsentData, Company, CompanyApplication, CompanyApplicationStatus,
    CompanyApplicationType, CompanyRole, CompanyStatus, Identity, Invitation, InvitationStatus,
    PartnerSubmitData, UserStatus,
};
use crate::registration::repository::{DeclineData, NetworkRepository, SubmitData};
use crate::registration::service::NetworkService;
use crate::store::{InMemoryPortalStore, PortalState, PortalStore, RepositoryError, UnitOfWork};

pub(super) const CALLBACK_URL: &str = "https://osp.example.org/callback";

/// A partner company registered by an onboarding service provider.
pub(super) struct Fixture {
    pub(super) store: Arc<InMemoryPortalStore>,
    pub(super) identity: IdentityData,
    pub(super) company_id: CompanyId,
    pub(super) application_id: ApplicationId,
    pub(super) invitation_id: InvitationId,
    pub(super) colleague_id: IdentityId,
    pub(super) registration_process_id: ProcessId,
    pub(super) participant_agreements: Vec<AgreementId>,
}

pub(super) fn fixture() -> Fixture {
    let now = Utc::now();
    let company_id = CompanyId::generate();
    let identity = IdentityData::new(IdentityId::generate(), company_id);
    let colleague_id = IdentityId::generate();
    let application_id = ApplicationId::generate();
    let invitation_id = InvitationId::generate();
    let registration = Process::new(ProcessType::PartnerRegistration);
    let participant_agreements = vec![AgreementId::generate(), AgreementId::generate()];

    let mut state = PortalState::default();
    state.companies.insert(
        company_id,
        Company {
            id: company_id,
            name: "Partner Logistics GmbH".to_string(),
            status: CompanyStatus::Pending,
            business_partner_number: None,
            roles: Vec::new(),
            registration_process_id: Some(registration.id),
        },
    );
    state.applications.insert(
        application_id,
        CompanyApplication {
            id: application_id,
            company_id,
            status: CompanyApplicationStatus::Created,
            application_type: CompanyApplicationType::External,
            callback_url: Some(CALLBACK_URL.to_string()),
            date_created: now,
            date_last_changed: None,
        },
    );
    for (id, status) in [
        (identity.identity_id, UserStatus::Active),
        (colleague_id, UserStatus::Pending),
    ] {
        state.identities.insert(
            id,
            Identity {
                id,
                company_id,
                status,
            },
        );
    }
    state.invitations.insert(
        invitation_id,
        Invitation {
            id: invitation_id,
            application_id,
            status: InvitationStatus::Pending,
        },
    );
    state
        .role_agreements
        .insert(CompanyRole::ActiveParticipant, participant_agreements.clone());
    state
        .role_agreements
        .insert(CompanyRole::AppProvider, vec![AgreementId::generate()]);
    for step_type in [
        ProcessStepType::ManualDeclineOsp,
        ProcessStepType::SynchronizeUser,
    ] {
        state.process_steps.push(ProcessStep::new(
            step_type,
            ProcessStepStatus::Todo,
            registration.id,
            now,
        ));
    }
    let registration_process_id = registration.id;
    state.processes.insert(registration.id, registration);

    Fixture {
        store: Arc::new(InMemoryPortalStore::new(state)),
        identity,
        company_id,
        application_id,
        invitation_id,
        colleague_id,
        registration_process_id,
        participant_agreements,
    }
}

impl Fixture {
    pub(super) fn service(&self) -> NetworkService<InMemoryPortalStore> {
        NetworkService::new(self.store.clone(), Arc::new(StandardChecklist))
    }

    pub(super) fn seed<F>(&self, seed: F)
    where
        F: FnOnce(&mut PortalState),
    {
        self.store.seed(seed).expect("seed state");
    }

    pub(super) fn state(&self) -> PortalState {
        self.store.snapshot().expect("snapshot")
    }

    pub(super) fn submit_data(&self) -> PartnerSubmitData {
        PartnerSubmitData {
            company_roles: vec![CompanyRole::ActiveParticipant],
            agreements: self
                .participant_agreements
                .iter()
                .map(|agreement_id| AgreementConsentData {
                    agreement_id: *agreement_id,
                    consent_status: ConsentStatus::Active,
                })
                .collect(),
        }
    }

    pub(super) fn registration_steps(&self) -> Vec<ProcessStep> {
        self.state().steps_of(self.registration_process_id)
    }
}

pub(super) fn step_status(steps: &[ProcessStep], step_type: ProcessStepType) -> Vec<ProcessStepStatus> {
    steps
        .iter()
        .filter(|step| step.step_type == step_type)
        .map(|step| step.status)
        .collect()
}

pub(super) fn expect_code(result: Result<(), PortalError>, code: &str) -> PortalError {
    match result {
        Err(error) => {
            assert_eq!(error.to_string(), code);
            error
        }
        Ok(()) => panic!("expected {code}, operation succeeded"),
    }
}

pub(super) struct UnavailableRepository;

impl PortalStore for UnavailableRepository {
    fn save(&self, _unit: UnitOfWork) -> Result<usize, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

impl NetworkRepository for UnavailableRepository {
    fn submit_data(&self, _company_id: CompanyId) -> Result<Option<SubmitData>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn decline_data(
        &self,
        _application_id: ApplicationId,
    ) -> Result<Option<DeclineData>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 4096)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
