//! End-to-end scenarios for partner registrations submitted or declined through the
//! onboarding service provider endpoints.

mod common {
    use std::sync::Arc;

    use chrono::Utc;

    use portal_core::consents::ConsentStatus;
    use portal_core::identity::IdentityData;
    use portal_core::ids::{AgreementId, ApplicationId, CompanyId, IdentityId};
    use portal_core::processes::{
        Process, ProcessStep, ProcessStepStatus, ProcessStepType, ProcessType,
    };
    use portal_core::registration::domain::{
        AgreementConsentData, Company, CompanyApplication, CompanyApplicationStatus,
        CompanyApplicationType, CompanyRole, CompanyStatus, Identity, PartnerSubmitData,
        UserStatus,
    };
    use portal_core::registration::{network_router, NetworkService, StandardChecklist};
    use portal_core::store::{InMemoryPortalStore, PortalState};

    pub(super) struct Scenario {
        pub(super) store: Arc<InMemoryPortalStore>,
        pub(super) identity: IdentityData,
        pub(super) application_id: ApplicationId,
        pub(super) agreement_id: AgreementId,
    }

    pub(super) fn scenario() -> Scenario {
        let now = Utc::now();
        let identity = IdentityData::new(IdentityId::generate(), CompanyId::generate());
        let application_id = ApplicationId::generate();
        let agreement_id = AgreementId::generate();
        let registration = Process::new(ProcessType::PartnerRegistration);

        let mut state = PortalState::default();
        state.companies.insert(
            identity.company_id,
            Company {
                id: identity.company_id,
                name: "Harbour Parts SE".to_string(),
                status: CompanyStatus::Pending,
                business_partner_number: Some("BPNL00000007HRBR".to_string()),
                roles: Vec::new(),
                registration_process_id: Some(registration.id),
            },
        );
        state.identities.insert(
            identity.identity_id,
            Identity {
                id: identity.identity_id,
                company_id: identity.company_id,
                status: UserStatus::Active,
            },
        );
        state.applications.insert(
            application_id,
            CompanyApplication {
                id: application_id,
                company_id: identity.company_id,
                status: CompanyApplicationStatus::Created,
                application_type: CompanyApplicationType::External,
                callback_url: None,
                date_created: now,
                date_last_changed: None,
            },
        );
        state
            .role_agreements
            .insert(CompanyRole::ActiveParticipant, vec![agreement_id]);
        state.process_steps.push(ProcessStep::new(
            ProcessStepType::ManualDeclineOsp,
            ProcessStepStatus::Todo,
            registration.id,
            now,
        ));
        state.processes.insert(registration.id, registration);

        Scenario {
            store: Arc::new(InMemoryPortalStore::new(state)),
            identity,
            application_id,
            agreement_id,
        }
    }

    impl Scenario {
        pub(super) fn router(&self) -> axum::Router {
            network_router(Arc::new(NetworkService::new(
                self.store.clone(),
                Arc::new(StandardChecklist),
            )))
        }

        pub(super) fn submit_payload(&self) -> PartnerSubmitData {
            PartnerSubmitData {
                company_roles: vec![CompanyRole::ActiveParticipant],
                agreements: vec![AgreementConsentData {
                    agreement_id: self.agreement_id,
                    consent_status: ConsentStatus::Active,
                }],
            }
        }
    }
}

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use tower::ServiceExt;

use common::scenario;
use portal_core::identity::{COMPANY_HEADER, IDENTITY_HEADER};
use portal_core::processes::{ProcessStepStatus, ProcessStepType};
use portal_core::registration::domain::CompanyApplicationStatus;

#[tokio::test]
async fn submitted_application_cannot_be_declined_afterwards() {
    let scenario = scenario();

    let submit = scenario
        .router()
        .oneshot(
            Request::post("/api/registration/network/partnerRegistration/submit")
                .header(header::CONTENT_TYPE, "application/json")
                .header(IDENTITY_HEADER, scenario.identity.identity_id.to_string())
                .header(COMPANY_HEADER, scenario.identity.company_id.to_string())
                .body(Body::from(
                    serde_json::to_vec(&scenario.submit_payload()).expect("payload"),
                ))
                .expect("request"),
        )
        .await
        .expect("submit response");
    assert_eq!(submit.status(), StatusCode::NO_CONTENT);

    let decline = scenario
        .router()
        .oneshot(
            Request::post(format!(
                "/api/registration/network/{}/decline",
                scenario.application_id
            ))
            .header(IDENTITY_HEADER, scenario.identity.identity_id.to_string())
            .header(COMPANY_HEADER, scenario.identity.company_id.to_string())
            .body(Body::empty())
            .expect("request"),
        )
        .await
        .expect("decline response");
    assert_eq!(decline.status(), StatusCode::CONFLICT);

    let state = scenario.store.snapshot().expect("snapshot");
    assert_eq!(
        state.applications[&scenario.application_id].status,
        CompanyApplicationStatus::Submitted
    );
    assert!(!state
        .process_steps
        .iter()
        .any(|step| step.step_type == ProcessStepType::CreateBusinessPartnerNumberPush));
    assert_eq!(scenario.store.save_count(), 1);
}

#[tokio::test]
async fn declined_application_cannot_be_submitted() {
    let scenario = scenario();

    let decline = scenario
        .router()
        .oneshot(
            Request::post(format!(
                "/api/registration/network/{}/decline",
                scenario.application_id
            ))
            .header(header::CONTENT_TYPE, "application/json")
            .header(IDENTITY_HEADER, scenario.identity.identity_id.to_string())
            .header(COMPANY_HEADER, scenario.identity.company_id.to_string())
            .body(Body::from(r#"{"message":"company withdrew"}"#))
            .expect("request"),
        )
        .await
        .expect("decline response");
    assert_eq!(decline.status(), StatusCode::NO_CONTENT);

    let submit = scenario
        .router()
        .oneshot(
            Request::post("/api/registration/network/partnerRegistration/submit")
                .header(header::CONTENT_TYPE, "application/json")
                .header(IDENTITY_HEADER, scenario.identity.identity_id.to_string())
                .header(COMPANY_HEADER, scenario.identity.company_id.to_string())
                .body(Body::from(
                    serde_json::to_vec(&scenario.submit_payload()).expect("payload"),
                ))
                .expect("request"),
        )
        .await
        .expect("submit response");
    // the cancelled application is closed, so the company has none left to submit
    assert_eq!(submit.status(), StatusCode::CONFLICT);

    let state = scenario.store.snapshot().expect("snapshot");
    let statuses: Vec<_> = state
        .process_steps
        .iter()
        .map(|step| (step.step_type, step.status))
        .collect();
    assert!(statuses.contains(&(ProcessStepType::ManualDeclineOsp, ProcessStepStatus::Done)));
    assert!(statuses.contains(&(
        ProcessStepType::RemoveKeycloakUsers,
        ProcessStepStatus::Todo
    )));
}
