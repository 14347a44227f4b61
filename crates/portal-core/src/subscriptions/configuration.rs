use std::sync::Arc;

use chrono::Utc;
use url::Url;

use super::domain::{
    OfferSubscriptionStatus, ProviderCompanyDetail, ProviderDetailData, ProviderDetailReturnData,
};
use super::repository::SubscriptionRepository;
use crate::config::PortalSettings;
use crate::error::PortalError;
use crate::identity::IdentityData;
use crate::ids::{CompanyId, OfferSubscriptionId, ProviderDetailId};
use crate::processes::{ManualProcessContext, ProcessStepData, ProcessStepType};
use crate::registration::domain::CompanyRole;
use crate::store::{Change, UnitOfWork};

/// Provider auto-setup configuration and manual retriggers of subscription processes.
pub struct SubscriptionConfigurationService<R> {
    repository: Arc<R>,
    settings: PortalSettings,
}

impl<R> SubscriptionConfigurationService<R>
where
    R: SubscriptionRepository + 'static,
{
    pub fn new(repository: Arc<R>, settings: PortalSettings) -> Self {
        Self {
            repository,
            settings,
        }
    }

    pub fn provider_company_details(
        &self,
        identity: &IdentityData,
    ) -> Result<ProviderDetailReturnData, PortalError> {
        let company_id = identity.company_id;
        let roles = self.company_roles(company_id)?;
        if !roles.contains(&CompanyRole::ServiceProvider) {
            return Err(PortalError::Forbidden(format!(
                "company {company_id} is not a service-provider"
            )));
        }

        let detail = self.repository.provider_detail(company_id)?;
        Ok(ProviderDetailReturnData {
            id: detail.as_ref().map(|detail| detail.id),
            company_id,
            url: detail.as_ref().map(|detail| detail.auto_setup_url.clone()),
            callback_url: detail.and_then(|detail| detail.auto_setup_callback_url),
        })
    }

    pub fn set_provider_company_details(
        &self,
        identity: &IdentityData,
        data: ProviderDetailData,
    ) -> Result<(), PortalError> {
        validate_https_url(&data.url, "url")?;
        self.validate_url_length(&data.url, "url")?;
        if let Some(callback_url) = &data.callback_url {
            validate_https_url(callback_url, "callbackUrl")?;
        }

        let company_id = identity.company_id;
        let roles = self.company_roles(company_id)?;
        let now = Utc::now();
        let mut unit = UnitOfWork::new();

        match self.repository.provider_detail(company_id)? {
            Some(detail) => unit.push(Change::ModifyProviderDetail {
                detail_id: detail.id,
                auto_setup_url: data.url,
                auto_setup_callback_url: data.callback_url,
                editor_id: identity.identity_id,
                changed_at: now,
            }),
            None => {
                if !roles
                    .iter()
                    .any(|role| matches!(role, CompanyRole::AppProvider | CompanyRole::ServiceProvider))
                {
                    return Err(PortalError::Forbidden(format!(
                        "company {company_id} is not an app- or service-provider"
                    )));
                }
                unit.push(Change::CreateProviderDetail(ProviderCompanyDetail {
                    id: ProviderDetailId::generate(),
                    company_id,
                    auto_setup_url: data.url,
                    auto_setup_callback_url: data.callback_url,
                    date_last_changed: now,
                    last_editor_id: identity.identity_id,
                }));
            }
        }

        self.repository.save(unit)?;
        tracing::info!(company_id = %company_id, "provider company details updated");
        Ok(())
    }

    pub fn retrigger_provider(&self, subscription_id: OfferSubscriptionId) -> Result<(), PortalError> {
        self.retrigger(subscription_id, ProcessStepType::RetriggerProvider, true)
    }

    pub fn retrigger_create_client(
        &self,
        subscription_id: OfferSubscriptionId,
    ) -> Result<(), PortalError> {
        self.retrigger(
            subscription_id,
            ProcessStepType::RetriggerOfferSubscriptionClientCreation,
            true,
        )
    }

    pub fn retrigger_create_technical_user(
        &self,
        subscription_id: OfferSubscriptionId,
    ) -> Result<(), PortalError> {
        self.retrigger(
            subscription_id,
            ProcessStepType::RetriggerOfferSubscriptionTechnicalUserCreation,
            true,
        )
    }

    pub fn retrigger_provider_callback(
        &self,
        subscription_id: OfferSubscriptionId,
    ) -> Result<(), PortalError> {
        self.retrigger(
            subscription_id,
            ProcessStepType::RetriggerProviderCallback,
            false,
        )
    }

    pub fn process_steps_for_subscription(
        &self,
        subscription_id: OfferSubscriptionId,
    ) -> Result<Vec<ProcessStepData>, PortalError> {
        let data = self
            .repository
            .subscription_process_data(subscription_id)?
            .ok_or_else(|| subscription_not_found(subscription_id))?;
        Ok(data.steps.iter().map(|step| step.to_data()).collect())
    }

    fn retrigger(
        &self,
        subscription_id: OfferSubscriptionId,
        step_type: ProcessStepType,
        must_be_pending: bool,
    ) -> Result<(), PortalError> {
        let data = self
            .repository
            .subscription_process_data(subscription_id)?
            .ok_or_else(|| subscription_not_found(subscription_id))?;

        if must_be_pending && data.status != OfferSubscriptionStatus::Pending {
            return Err(PortalError::Conflict(format!(
                "offer subscription {subscription_id} is not in status {}",
                OfferSubscriptionStatus::Pending
            )));
        }

        let next = step_type.step_to_retrigger().ok_or_else(|| {
            PortalError::UnexpectedCondition(format!(
                "process step {step_type} is not retriggerable"
            ))
        })?;

        let mut context = ManualProcessContext::verify(
            step_type,
            data.process,
            data.steps,
            Utc::now(),
            &format!("offer subscription {subscription_id}"),
        )?;

        let mut unit = UnitOfWork::new();
        context.schedule_steps(&mut unit, [next]);
        let process_id = context.process().id;
        context.finalize(&mut unit, None);

        self.repository.save(unit)?;
        tracing::info!(
            subscription_id = %subscription_id,
            process_id = %process_id,
            step = %step_type,
            scheduled = %next,
            "subscription process step retriggered"
        );
        Ok(())
    }

    fn company_roles(&self, company_id: CompanyId) -> Result<Vec<CompanyRole>, PortalError> {
        self.repository
            .company_roles(company_id)?
            .ok_or_else(|| PortalError::Conflict(format!("company {company_id} does not exist")))
    }

    fn validate_url_length(&self, value: &str, argument: &str) -> Result<(), PortalError> {
        let max = self.settings.provider_url_max_length;
        if value.chars().count() > max {
            return Err(PortalError::argument(
                format!("the maximum allowed length is {max} characters"),
                argument,
            ));
        }
        Ok(())
    }
}

fn validate_https_url(value: &str, argument: &str) -> Result<(), PortalError> {
    let valid = Url::parse(value)
        .map(|url| url.scheme() == "https" && url.host_str().is_some())
        .unwrap_or(false);
    if !valid {
        return Err(PortalError::argument(
            format!("{value} is not a valid https url"),
            argument,
        ));
    }
    Ok(())
}

pub(crate) fn subscription_not_found(subscription_id: OfferSubscriptionId) -> PortalError {
    PortalError::NotFound(format!(
        "offer subscription {subscription_id} does not exist"
    ))
}
