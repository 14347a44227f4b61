use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use super::{Change, PortalStore, RepositoryError, UnitOfWork};
use crate::consents::Consent;
use crate::ids::{
    AgreementId, ApplicationId, CompanyId, ConsentId, IdentityId, InvitationId, OfferId,
    OfferSubscriptionId, ProcessId, ProviderDetailId,
};
use crate::processes::{Process, ProcessStep};
use crate::registration::checklist::ChecklistEntry;
use crate::registration::domain::{
    Company, CompanyApplication, CompanyRole, Identity, Invitation, RoleAgreements,
};
use crate::registration::repository::{
    ApplicationSummary, DeclineData, NetworkRepository, SubmitData,
};
use crate::subscriptions::domain::{Offer, OfferSubscription, ProviderCompanyDetail};
use crate::subscriptions::repository::{SubscriptionProcessData, SubscriptionRepository};

/// Every table of the portal, held in memory.
#[derive(Debug, Clone, Default)]
pub struct PortalState {
    pub companies: BTreeMap<CompanyId, Company>,
    pub identities: BTreeMap<IdentityId, Identity>,
    pub applications: BTreeMap<ApplicationId, CompanyApplication>,
    pub invitations: BTreeMap<InvitationId, Invitation>,
    pub role_agreements: BTreeMap<CompanyRole, Vec<AgreementId>>,
    pub consents: BTreeMap<ConsentId, Consent>,
    pub processes: BTreeMap<ProcessId, Process>,
    pub process_steps: Vec<ProcessStep>,
    pub checklists: BTreeMap<ApplicationId, Vec<ChecklistEntry>>,
    pub offers: BTreeMap<OfferId, Offer>,
    pub subscriptions: BTreeMap<OfferSubscriptionId, OfferSubscription>,
    pub provider_details: BTreeMap<ProviderDetailId, ProviderCompanyDetail>,
}

impl PortalState {
    pub fn steps_of(&self, process_id: ProcessId) -> Vec<ProcessStep> {
        self.process_steps
            .iter()
            .filter(|step| step.process_id == process_id)
            .cloned()
            .collect()
    }

    fn apply(&mut self, change: Change) -> Result<(), RepositoryError> {
        match change {
            Change::CreateProcess(process) => {
                if self.processes.contains_key(&process.id) {
                    return Err(RepositoryError::Conflict);
                }
                self.processes.insert(process.id, process);
            }
            Change::CreateProcessSteps(steps) => {
                for step in steps {
                    if !self.processes.contains_key(&step.process_id) {
                        return Err(RepositoryError::NotFound);
                    }
                    self.process_steps.push(step);
                }
            }
            Change::ModifyProcessStep {
                step_id,
                status,
                message,
                changed_at,
            } => {
                let step = self
                    .process_steps
                    .iter_mut()
                    .find(|step| step.id == step_id)
                    .ok_or(RepositoryError::NotFound)?;
                if !step.status.can_transition_to(status) {
                    return Err(RepositoryError::InvalidTransition {
                        step_id,
                        from: step.status,
                        to: status,
                    });
                }
                step.status = status;
                step.date_last_changed = Some(changed_at);
                if message.is_some() {
                    step.message = message;
                }
            }
            Change::UpdateProcessVersion {
                process_id,
                expected,
                next,
            } => {
                let process = self
                    .processes
                    .get_mut(&process_id)
                    .ok_or(RepositoryError::NotFound)?;
                if process.version != expected {
                    return Err(RepositoryError::ConcurrencyConflict { process_id });
                }
                process.version = next;
                process.lock_expiry_date = None;
            }
            Change::CreateChecklist {
                application_id,
                entries,
            } => {
                if self.checklists.contains_key(&application_id) {
                    return Err(RepositoryError::Conflict);
                }
                self.checklists.insert(application_id, entries);
            }
            Change::ModifyApplicationStatus {
                application_id,
                status,
                changed_at,
            } => {
                let application = self
                    .applications
                    .get_mut(&application_id)
                    .ok_or(RepositoryError::NotFound)?;
                application.status = status;
                application.date_last_changed = Some(changed_at);
            }
            Change::ModifyCompanyStatus { company_id, status } => {
                self.companies
                    .get_mut(&company_id)
                    .ok_or(RepositoryError::NotFound)?
                    .status = status;
            }
            Change::ModifyIdentityStatus {
                identity_id,
                status,
            } => {
                self.identities
                    .get_mut(&identity_id)
                    .ok_or(RepositoryError::NotFound)?
                    .status = status;
            }
            Change::ModifyInvitationStatus {
                invitation_id,
                status,
            } => {
                self.invitations
                    .get_mut(&invitation_id)
                    .ok_or(RepositoryError::NotFound)?
                    .status = status;
            }
            Change::CreateConsents(consents) => {
                for consent in consents {
                    if self.consents.contains_key(&consent.id) {
                        return Err(RepositoryError::Conflict);
                    }
                    self.consents.insert(consent.id, consent);
                }
            }
            Change::ModifyConsentStatus {
                consent_id,
                status,
                changed_at,
            } => {
                let consent = self
                    .consents
                    .get_mut(&consent_id)
                    .ok_or(RepositoryError::NotFound)?;
                consent.status = status;
                consent.date_last_changed = Some(changed_at);
            }
            Change::CreateProviderDetail(detail) => {
                if self
                    .provider_details
                    .values()
                    .any(|existing| existing.company_id == detail.company_id)
                {
                    return Err(RepositoryError::Conflict);
                }
                self.provider_details.insert(detail.id, detail);
            }
            Change::ModifyProviderDetail {
                detail_id,
                auto_setup_url,
                auto_setup_callback_url,
                editor_id,
                changed_at,
            } => {
                let detail = self
                    .provider_details
                    .get_mut(&detail_id)
                    .ok_or(RepositoryError::NotFound)?;
                detail.auto_setup_url = auto_setup_url;
                detail.auto_setup_callback_url = auto_setup_callback_url;
                detail.last_editor_id = editor_id;
                detail.date_last_changed = changed_at;
            }
            Change::CreateOfferSubscription(subscription) => {
                if self.subscriptions.values().any(|existing| {
                    existing.offer_id == subscription.offer_id
                        && existing.company_id == subscription.company_id
                }) {
                    return Err(RepositoryError::Conflict);
                }
                self.subscriptions.insert(subscription.id, subscription);
            }
            Change::ModifyOfferSubscription {
                subscription_id,
                status,
                process_id,
            } => {
                let subscription = self
                    .subscriptions
                    .get_mut(&subscription_id)
                    .ok_or(RepositoryError::NotFound)?;
                subscription.status = status;
                if process_id.is_some() {
                    subscription.process_id = process_id;
                }
            }
        }
        Ok(())
    }
}

/// Mutex-guarded store used by the demo server and the test suites.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPortalStore {
    state: Arc<Mutex<PortalState>>,
    saves: Arc<AtomicUsize>,
}

impl InMemoryPortalStore {
    pub fn new(state: PortalState) -> Self {
        Self {
            state: Arc::new(Mutex::new(state)),
            saves: Arc::new(AtomicUsize::new(0)),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, PortalState>, RepositoryError> {
        self.state
            .lock()
            .map_err(|_| RepositoryError::Unavailable("portal state lock poisoned".to_string()))
    }

    pub fn snapshot(&self) -> Result<PortalState, RepositoryError> {
        Ok(self.lock()?.clone())
    }

    /// Number of units of work applied so far.
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    /// Writes seed data directly, bypassing the unit of work.
    pub fn seed<F>(&self, seed: F) -> Result<(), RepositoryError>
    where
        F: FnOnce(&mut PortalState),
    {
        let mut guard = self.lock()?;
        seed(&mut guard);
        Ok(())
    }
}

impl PortalStore for InMemoryPortalStore {
    fn save(&self, unit: UnitOfWork) -> Result<usize, RepositoryError> {
        let mut guard = self.lock()?;
        let mut staged = guard.clone();
        let changes = unit.into_changes();
        let applied = changes.len();
        for change in changes {
            staged.apply(change)?;
        }
        *guard = staged;
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(applied)
    }
}

impl NetworkRepository for InMemoryPortalStore {
    fn submit_data(&self, company_id: CompanyId) -> Result<Option<SubmitData>, RepositoryError> {
        let state = self.lock()?;
        let Some(company) = state.companies.get(&company_id) else {
            return Ok(None);
        };

        let applications = state
            .applications
            .values()
            .filter(|application| {
                application.company_id == company_id && !application.status.is_closed()
            })
            .map(|application| ApplicationSummary {
                application_id: application.id,
                status: application.status,
                callback_url: application.callback_url.clone(),
            })
            .collect();
        let role_agreements = state
            .role_agreements
            .iter()
            .map(|(role, agreement_ids)| RoleAgreements {
                role: *role,
                agreement_ids: agreement_ids.clone(),
            })
            .collect();

        Ok(Some(SubmitData {
            applications,
            role_agreements,
            registration_process_id: company.registration_process_id,
            business_partner_number: company.business_partner_number.clone(),
        }))
    }

    fn decline_data(
        &self,
        application_id: ApplicationId,
    ) -> Result<Option<DeclineData>, RepositoryError> {
        let state = self.lock()?;
        let Some(application) = state.applications.get(&application_id) else {
            return Ok(None);
        };
        let company = state
            .companies
            .get(&application.company_id)
            .ok_or(RepositoryError::NotFound)?;

        let identities = state
            .identities
            .values()
            .filter(|identity| identity.company_id == company.id)
            .map(|identity| (identity.id, identity.status))
            .collect();
        let invitations = state
            .invitations
            .values()
            .filter(|invitation| invitation.application_id == application_id)
            .map(|invitation| (invitation.id, invitation.status))
            .collect();
        let process = company
            .registration_process_id
            .and_then(|process_id| state.processes.get(&process_id).cloned());
        let process_steps = process
            .as_ref()
            .map(|process| state.steps_of(process.id))
            .unwrap_or_default();

        Ok(Some(DeclineData {
            application: application.clone(),
            company_status: company.status,
            identities,
            invitations,
            process,
            process_steps,
        }))
    }
}

impl SubscriptionRepository for InMemoryPortalStore {
    fn company_roles(
        &self,
        company_id: CompanyId,
    ) -> Result<Option<Vec<CompanyRole>>, RepositoryError> {
        let state = self.lock()?;
        Ok(state
            .companies
            .get(&company_id)
            .map(|company| company.roles.clone()))
    }

    fn provider_detail(
        &self,
        company_id: CompanyId,
    ) -> Result<Option<ProviderCompanyDetail>, RepositoryError> {
        let state = self.lock()?;
        Ok(state
            .provider_details
            .values()
            .find(|detail| detail.company_id == company_id)
            .cloned())
    }

    fn subscription_process_data(
        &self,
        subscription_id: OfferSubscriptionId,
    ) -> Result<Option<SubscriptionProcessData>, RepositoryError> {
        let state = self.lock()?;
        let Some(subscription) = state.subscriptions.get(&subscription_id) else {
            return Ok(None);
        };
        let process = subscription
            .process_id
            .and_then(|process_id| state.processes.get(&process_id).cloned());
        let steps = process
            .as_ref()
            .map(|process| state.steps_of(process.id))
            .unwrap_or_default();

        Ok(Some(SubscriptionProcessData {
            status: subscription.status,
            process,
            steps,
        }))
    }

    fn offer(&self, offer_id: OfferId) -> Result<Option<Offer>, RepositoryError> {
        Ok(self.lock()?.offers.get(&offer_id).cloned())
    }

    fn subscription(
        &self,
        subscription_id: OfferSubscriptionId,
    ) -> Result<Option<OfferSubscription>, RepositoryError> {
        Ok(self.lock()?.subscriptions.get(&subscription_id).cloned())
    }

    fn company_subscription(
        &self,
        offer_id: OfferId,
        company_id: CompanyId,
    ) -> Result<Option<OfferSubscription>, RepositoryError> {
        let state = self.lock()?;
        Ok(state
            .subscriptions
            .values()
            .find(|subscription| {
                subscription.offer_id == offer_id && subscription.company_id == company_id
            })
            .cloned())
    }

    fn consents_for_subscription(
        &self,
        subscription_id: OfferSubscriptionId,
    ) -> Result<Vec<Consent>, RepositoryError> {
        let state = self.lock()?;
        Ok(state
            .consents
            .values()
            .filter(|consent| consent.offer_subscription_id == Some(subscription_id))
            .cloned()
            .collect())
    }
}
