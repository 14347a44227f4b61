use chrono::Utc;
use metrics_exporter_prometheus::PrometheusHandle;
use portal_core::identity::IdentityData;
use portal_core::ids::{AgreementId, ApplicationId, CompanyId, IdentityId, OfferId};
use portal_core::notifications::{MailError, MailMessage, MailSender};
use portal_core::processes::{
    Process, ProcessStep, ProcessStepStatus, ProcessStepType, ProcessType,
};
use portal_core::registration::domain::{
    Company, CompanyApplication, CompanyApplicationStatus, CompanyApplicationType, CompanyRole,
    CompanyStatus, Identity, UserStatus,
};
use portal_core::store::PortalState;
use portal_core::subscriptions::{Offer, OfferStatus, OfferType};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Mail hook for local runs: messages are logged instead of delivered.
#[derive(Debug, Default, Clone)]
pub(crate) struct TracingMailSender;

impl MailSender for TracingMailSender {
    fn send(&self, message: MailMessage) -> Result<(), MailError> {
        info!(
            recipient = %message.recipient,
            template = %message.template,
            parameters = ?message.parameters,
            "mail dispatched"
        );
        Ok(())
    }
}

/// Handles onto the records created by [`demo_state`].
#[derive(Debug, Clone)]
pub(crate) struct DemoPortal {
    pub(crate) state: PortalState,
    /// Partner with a fresh application, ready to submit.
    pub(crate) submitting_partner: IdentityData,
    /// Partner whose onboarding service provider is about to decline it.
    pub(crate) declined_partner: IdentityData,
    pub(crate) declined_application: ApplicationId,
    pub(crate) participant_agreements: Vec<AgreementId>,
    pub(crate) provider: IdentityData,
    pub(crate) customer: IdentityData,
    pub(crate) offer_id: OfferId,
}

fn company(id: CompanyId, name: &str, status: CompanyStatus, roles: Vec<CompanyRole>) -> Company {
    Company {
        id,
        name: name.to_string(),
        status,
        business_partner_number: None,
        roles,
        registration_process_id: None,
    }
}

fn register_partner(state: &mut PortalState, name: &str, bpn: Option<&str>) -> (IdentityData, ApplicationId) {
    let now = Utc::now();
    let identity = IdentityData::new(IdentityId::generate(), CompanyId::generate());
    let application_id = ApplicationId::generate();
    let process = Process::new(ProcessType::PartnerRegistration);

    let mut partner = company(identity.company_id, name, CompanyStatus::Pending, Vec::new());
    partner.business_partner_number = bpn.map(str::to_string);
    partner.registration_process_id = Some(process.id);
    state.companies.insert(identity.company_id, partner);
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
            callback_url: Some("https://osp.demo.local/callback".to_string()),
            date_created: now,
            date_last_changed: None,
        },
    );
    for step_type in [ProcessStepType::ManualDeclineOsp, ProcessStepType::SynchronizeUser] {
        state
            .process_steps
            .push(ProcessStep::new(step_type, ProcessStepStatus::Todo, process.id, now));
    }
    state.processes.insert(process.id, process);
    (identity, application_id)
}

/// Builds a small portal with two registering partners and one active app offer.
pub(crate) fn demo_state() -> DemoPortal {
    let mut state = PortalState::default();
    let participant_agreements = vec![AgreementId::generate(), AgreementId::generate()];
    state
        .role_agreements
        .insert(CompanyRole::ActiveParticipant, participant_agreements.clone());
    state
        .role_agreements
        .insert(CompanyRole::AppProvider, vec![AgreementId::generate()]);

    let (submitting_partner, _) = register_partner(&mut state, "Northwind Parts GmbH", None);
    let (declined_partner, declined_application) =
        register_partner(&mut state, "Harbour Logistics SE", Some("BPNL00000003HRBR"));

    let provider = IdentityData::new(IdentityId::generate(), CompanyId::generate());
    let customer = IdentityData::new(IdentityId::generate(), CompanyId::generate());
    state.companies.insert(
        provider.company_id,
        company(
            provider.company_id,
            "Catena Apps AG",
            CompanyStatus::Active,
            vec![CompanyRole::AppProvider, CompanyRole::ServiceProvider],
        ),
    );
    state.companies.insert(
        customer.company_id,
        company(
            customer.company_id,
            "Supplier One GmbH",
            CompanyStatus::Active,
            vec![CompanyRole::ActiveParticipant],
        ),
    );

    let offer_id = OfferId::generate();
    state.offers.insert(
        offer_id,
        Offer {
            id: offer_id,
            offer_type: OfferType::App,
            name: "Traceability Viewer".to_string(),
            status: OfferStatus::Active,
            provider_company_id: provider.company_id,
            provider_contact_email: Some("apps@catena.demo.local".to_string()),
            agreement_ids: vec![AgreementId::generate()],
        },
    );

    DemoPortal {
        state,
        submitting_partner,
        declined_partner,
        declined_application,
        participant_agreements,
        provider,
        customer,
        offer_id,
    }
}
