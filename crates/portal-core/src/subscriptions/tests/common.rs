use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::Utc;
use serde_json::Value;

use crate::config::PortalSettings;
use crate::identity::IdentityData;
use crate::ids::{AgreementId, CompanyId, IdentityId, OfferId, OfferSubscriptionId, ProcessId};
use crate::notifications::{MailError, MailMessage, MailSender};
use crate::processes::{Process, ProcessStep, ProcessStepStatus, ProcessStepType, ProcessType};
use crate::registration::domain::{Company, CompanyRole, CompanyStatus};
use crate::store::{InMemoryPortalStore, PortalState};
use crate::subscriptions::configuration::SubscriptionConfigurationService;
use crate::subscriptions::domain::{
    Offer, OfferStatus, OfferSubscription, OfferSubscriptionStatus, OfferType,
};
use crate::subscriptions::offers::OfferSubscriptionService;

pub(super) const PROVIDER_EMAIL: &str = "onboarding@provider.example.org";

/// A provider offering one app and a customer holding a pending subscription to it.
pub(super) struct Fixture {
    pub(super) store: Arc<InMemoryPortalStore>,
    pub(super) mail: Arc<RecordingMail>,
    pub(super) provider: IdentityData,
    pub(super) customer: IdentityData,
    pub(super) offer_id: OfferId,
    pub(super) offer_agreements: Vec<AgreementId>,
    pub(super) subscription_id: OfferSubscriptionId,
    pub(super) process_id: ProcessId,
}

fn company(id: CompanyId, name: &str, roles: Vec<CompanyRole>) -> Company {
    Company {
        id,
        name: name.to_string(),
        status: CompanyStatus::Active,
        business_partner_number: None,
        roles,
        registration_process_id: None,
    }
}

pub(super) fn fixture() -> Fixture {
    let provider = IdentityData::new(IdentityId::generate(), CompanyId::generate());
    let customer = IdentityData::new(IdentityId::generate(), CompanyId::generate());
    let offer_id = OfferId::generate();
    let offer_agreements = vec![AgreementId::generate(), AgreementId::generate()];
    let subscription_id = OfferSubscriptionId::generate();
    let process = Process::new(ProcessType::OfferSubscription);
    let process_id = process.id;

    let mut state = PortalState::default();
    state.companies.insert(
        provider.company_id,
        company(
            provider.company_id,
            "Catena Apps AG",
            vec![CompanyRole::ServiceProvider, CompanyRole::AppProvider],
        ),
    );
    state.companies.insert(
        customer.company_id,
        company(
            customer.company_id,
            "Supplier One GmbH",
            vec![CompanyRole::ActiveParticipant],
        ),
    );
    state.offers.insert(
        offer_id,
        Offer {
            id: offer_id,
            offer_type: OfferType::App,
            name: "Traceability Viewer".to_string(),
            status: OfferStatus::Active,
            provider_company_id: provider.company_id,
            provider_contact_email: Some(PROVIDER_EMAIL.to_string()),
            agreement_ids: offer_agreements.clone(),
        },
    );
    state.subscriptions.insert(
        subscription_id,
        OfferSubscription {
            id: subscription_id,
            offer_id,
            company_id: customer.company_id,
            requester_id: customer.identity_id,
            status: OfferSubscriptionStatus::Pending,
            process_id: Some(process_id),
            date_created: Utc::now(),
        },
    );
    state.processes.insert(process_id, process);

    Fixture {
        store: Arc::new(InMemoryPortalStore::new(state)),
        mail: Arc::new(RecordingMail::default()),
        provider,
        customer,
        offer_id,
        offer_agreements,
        subscription_id,
        process_id,
    }
}

impl Fixture {
    pub(super) fn configuration(&self) -> SubscriptionConfigurationService<InMemoryPortalStore> {
        SubscriptionConfigurationService::new(self.store.clone(), PortalSettings::default())
    }

    pub(super) fn offers(&self) -> OfferSubscriptionService<InMemoryPortalStore, RecordingMail> {
        OfferSubscriptionService::new(self.store.clone(), self.mail.clone())
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

    pub(super) fn queue_step(&self, step_type: ProcessStepType, status: ProcessStepStatus) {
        let process_id = self.process_id;
        self.seed(move |state| {
            state
                .process_steps
                .push(ProcessStep::new(step_type, status, process_id, Utc::now()));
        });
    }

    pub(super) fn set_subscription_status(&self, status: OfferSubscriptionStatus) {
        let subscription_id = self.subscription_id;
        self.seed(move |state| {
            if let Some(subscription) = state.subscriptions.get_mut(&subscription_id) {
                subscription.status = status;
            }
        });
    }

    pub(super) fn steps(&self) -> Vec<(ProcessStepType, ProcessStepStatus)> {
        self.state()
            .steps_of(self.process_id)
            .into_iter()
            .map(|step| (step.step_type, step.status))
            .collect()
    }
}

#[derive(Default)]
pub(super) struct RecordingMail {
    messages: Mutex<Vec<MailMessage>>,
    offline: bool,
}

impl RecordingMail {
    pub(super) fn offline() -> Self {
        Self {
            messages: Mutex::new(Vec::new()),
            offline: true,
        }
    }

    pub(super) fn messages(&self) -> Vec<MailMessage> {
        self.messages.lock().expect("mail mutex poisoned").clone()
    }
}

impl MailSender for RecordingMail {
    fn send(&self, message: MailMessage) -> Result<(), MailError> {
        if self.offline {
            return Err(MailError::Transport("smtp relay offline".to_string()));
        }
        self.messages
            .lock()
            .expect("mail mutex poisoned")
            .push(message);
        Ok(())
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 4096)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
