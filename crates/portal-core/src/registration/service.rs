use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::Utc;

use super::checklist::{ChecklistService, StandardChecklist};
use super::domain::{
    CompanyApplicationStatus, CompanyApplicationType, CompanyStatus, DeclineOspData,
    InvitationStatus, PartnerSubmitData, UserStatus,
};
use super::errors::NetworkError;
use super::repository::{DeclineData, NetworkRepository};
use crate::consents::{ConsentOwner, ConsentStatus};
use crate::error::PortalError;
use crate::identity::IdentityData;
use crate::ids::{AgreementId, ApplicationId};
use crate::processes::{
    ManualProcessContext, Process, ProcessStep, ProcessStepStatus, ProcessStepType, ProcessType,
};
use crate::store::{Change, UnitOfWork};

/// Partner registration workflow driven by onboarding service providers.
pub struct NetworkService<R, C = StandardChecklist> {
    repository: Arc<R>,
    checklist: Arc<C>,
}

impl<R, C> NetworkService<R, C>
where
    R: NetworkRepository + 'static,
    C: ChecklistService + 'static,
{
    pub fn new(repository: Arc<R>, checklist: Arc<C>) -> Self {
        Self {
            repository,
            checklist,
        }
    }

    /// Submit the caller's pending partner application for verification.
    pub fn submit(
        &self,
        identity: &IdentityData,
        data: PartnerSubmitData,
    ) -> Result<(), PortalError> {
        let company_id = identity.company_id;
        let submit = self
            .repository
            .submit_data(company_id)?
            .ok_or_else(|| NetworkError::CompanyNotFound.not_found())?;

        let [application] = submit.applications.as_slice() else {
            return Err(NetworkError::OnlyOneApplicationPerCompany.conflict());
        };
        if application.status != CompanyApplicationStatus::Created {
            return Err(NetworkError::AppNotCreatedState.conflict());
        }

        let required: BTreeSet<AgreementId> = submit
            .role_agreements
            .iter()
            .filter(|role| data.company_roles.contains(&role.role))
            .flat_map(|role| role.agreement_ids.iter().copied())
            .collect();

        if required.iter().any(|agreement_id| {
            !data
                .agreements
                .iter()
                .any(|agreement| agreement.agreement_id == *agreement_id)
        }) {
            return Err(NetworkError::AllAgreementsCompanyShouldAgree.argument("agreements"));
        }
        if data.agreements.iter().any(|agreement| {
            required.contains(&agreement.agreement_id)
                && agreement.consent_status != ConsentStatus::Active
        }) {
            return Err(NetworkError::NotActiveAgreements.argument("agreements"));
        }

        let registration_process_id = submit
            .registration_process_id
            .ok_or_else(|| NetworkError::ProcessMustExist.conflict())?;

        let now = Utc::now();
        let mut unit = UnitOfWork::new();

        let owner = ConsentOwner {
            company_id,
            identity_id: identity.identity_id,
            offer_subscription_id: None,
        };
        let consents: Vec<_> = required
            .iter()
            .map(|agreement_id| owner.consent(*agreement_id, ConsentStatus::Active, now))
            .collect();
        if !consents.is_empty() {
            unit.push(Change::CreateConsents(consents));
        }

        let entries = self
            .checklist
            .create_initial_checklist(submit.business_partner_number.as_deref());
        let step_types = self.checklist.initial_process_steps(&entries);
        unit.push(Change::CreateChecklist {
            application_id: application.application_id,
            entries,
        });

        let checklist_process = Process::new(ProcessType::ApplicationChecklist);
        let checklist_steps: Vec<ProcessStep> = step_types
            .into_iter()
            .map(|step_type| {
                ProcessStep::new(step_type, ProcessStepStatus::Todo, checklist_process.id, now)
            })
            .collect();
        let checklist_process_id = checklist_process.id;
        unit.push(Change::CreateProcess(checklist_process));
        unit.push(Change::CreateProcessSteps(checklist_steps));

        if application.callback_url.is_some() {
            unit.push(Change::CreateProcessSteps(vec![ProcessStep::new(
                ProcessStepType::TriggerCallbackOspSubmitted,
                ProcessStepStatus::Todo,
                registration_process_id,
                now,
            )]));
        }

        unit.push(Change::ModifyApplicationStatus {
            application_id: application.application_id,
            status: CompanyApplicationStatus::Submitted,
            changed_at: now,
        });

        self.repository.save(unit)?;
        tracing::info!(
            application_id = %application.application_id,
            company_id = %company_id,
            checklist_process_id = %checklist_process_id,
            "partner registration submitted"
        );
        Ok(())
    }

    /// Decline a partner registration on behalf of the registered company.
    pub fn decline_osp(
        &self,
        identity: &IdentityData,
        application_id: ApplicationId,
        data: DeclineOspData,
    ) -> Result<(), PortalError> {
        let DeclineData {
            application,
            company_status,
            identities,
            invitations,
            process,
            process_steps,
        } = self
            .repository
            .decline_data(application_id)?
            .ok_or_else(|| NetworkError::CompanyApplicationNotExist.not_found())?;

        if application.company_id != identity.company_id {
            return Err(NetworkError::UserNotAllowedDeclineApplication.forbidden());
        }
        if application.application_type != CompanyApplicationType::External {
            return Err(NetworkError::ExternalRegistrationsDeclined.conflict());
        }
        if application.status != CompanyApplicationStatus::Created {
            return Err(NetworkError::CheckApplicationStatus.conflict());
        }

        let now = Utc::now();
        let mut context = ManualProcessContext::verify(
            ProcessStepType::ManualDeclineOsp,
            process,
            process_steps,
            now,
            &format!("application {application_id}"),
        )?;

        let mut unit = UnitOfWork::new();
        unit.push(Change::ModifyApplicationStatus {
            application_id,
            status: CompanyApplicationStatus::CancelledByCustomer,
            changed_at: now,
        });
        if company_status != CompanyStatus::Rejected {
            unit.push(Change::ModifyCompanyStatus {
                company_id: application.company_id,
                status: CompanyStatus::Rejected,
            });
        }
        for (identity_id, status) in identities {
            if !matches!(status, UserStatus::Inactive | UserStatus::Deleted) {
                unit.push(Change::ModifyIdentityStatus {
                    identity_id,
                    status: UserStatus::Inactive,
                });
            }
        }
        for (invitation_id, status) in invitations {
            if status != InvitationStatus::Declined {
                unit.push(Change::ModifyInvitationStatus {
                    invitation_id,
                    status: InvitationStatus::Declined,
                });
            }
        }

        context.schedule_steps(&mut unit, [ProcessStepType::RemoveKeycloakUsers]);
        context.skip_steps_except(&mut unit, &[ProcessStepType::RemoveKeycloakUsers]);
        let process_id = context.process().id;
        context.finalize(&mut unit, data.message);

        self.repository.save(unit)?;
        tracing::info!(
            application_id = %application_id,
            company_id = %application.company_id,
            process_id = %process_id,
            "partner registration declined"
        );
        Ok(())
    }
}
