use std::sync::Arc;

use chrono::Utc;

use super::configuration::subscription_not_found;
use super::domain::{
    Offer, OfferAgreementConsentData, OfferStatus, OfferSubscription, OfferSubscriptionStatus,
    SubscriptionCreatedData,
};
use super::repository::{SubscriptionProcessData, SubscriptionRepository};
use crate::consents::{plan_consent_changes, ConsentOwner, ConsentStatus};
use crate::error::PortalError;
use crate::identity::IdentityData;
use crate::ids::{OfferId, OfferSubscriptionId};
use crate::notifications::{MailMessage, MailSender};
use crate::processes::{
    close_process, Process, ProcessStep, ProcessStepStatus, ProcessStepType, ProcessType,
};
use crate::store::{Change, UnitOfWork};

const SUBSCRIPTION_REQUEST_TEMPLATE: &str = "subscription-request";

/// Marketplace subscriptions of companies to apps and services.
pub struct OfferSubscriptionService<R, M> {
    repository: Arc<R>,
    mail: Arc<M>,
}

impl<R, M> OfferSubscriptionService<R, M>
where
    R: SubscriptionRepository + 'static,
    M: MailSender + 'static,
{
    pub fn new(repository: Arc<R>, mail: Arc<M>) -> Self {
        Self { repository, mail }
    }

    /// Subscribe the caller's company to an offer and start the provider process.
    pub fn subscribe(
        &self,
        identity: &IdentityData,
        offer_id: OfferId,
    ) -> Result<SubscriptionCreatedData, PortalError> {
        let offer = self
            .repository
            .offer(offer_id)?
            .ok_or_else(|| PortalError::NotFound(format!("offer {offer_id} does not exist")))?;
        if offer.status != OfferStatus::Active {
            return Err(PortalError::Conflict(format!(
                "offer {offer_id} is not active"
            )));
        }

        let company_id = identity.company_id;
        let now = Utc::now();
        let process = Process::new(ProcessType::OfferSubscription);
        let process_id = process.id;

        let mut unit = UnitOfWork::new();
        unit.push(Change::CreateProcess(process));
        unit.push(Change::CreateProcessSteps(vec![ProcessStep::new(
            ProcessStepType::TriggerProvider,
            ProcessStepStatus::Todo,
            process_id,
            now,
        )]));

        let subscription_id = match self.repository.company_subscription(offer_id, company_id)? {
            Some(existing) if existing.status != OfferSubscriptionStatus::Inactive => {
                return Err(PortalError::Conflict(format!(
                    "company {company_id} is already subscribed to offer {offer_id}"
                )));
            }
            Some(existing) => {
                unit.push(Change::ModifyOfferSubscription {
                    subscription_id: existing.id,
                    status: OfferSubscriptionStatus::Pending,
                    process_id: Some(process_id),
                });
                existing.id
            }
            None => {
                let subscription = OfferSubscription {
                    id: OfferSubscriptionId::generate(),
                    offer_id,
                    company_id,
                    requester_id: identity.identity_id,
                    status: OfferSubscriptionStatus::Pending,
                    process_id: Some(process_id),
                    date_created: now,
                };
                let id = subscription.id;
                unit.push(Change::CreateOfferSubscription(subscription));
                id
            }
        };

        self.repository.save(unit)?;
        tracing::info!(
            subscription_id = %subscription_id,
            offer_id = %offer_id,
            company_id = %company_id,
            process_id = %process_id,
            "offer subscription requested"
        );

        self.notify_provider(&offer, identity, subscription_id);
        Ok(SubscriptionCreatedData {
            subscription_id,
            process_id,
        })
    }

    /// Activate a pending subscription; only the offer's provider may do so.
    pub fn activate(
        &self,
        identity: &IdentityData,
        subscription_id: OfferSubscriptionId,
    ) -> Result<(), PortalError> {
        let subscription = self.load_subscription(subscription_id)?;
        let offer = self.repository.offer(subscription.offer_id)?.ok_or_else(|| {
            PortalError::UnexpectedCondition(format!(
                "offer {} of subscription {subscription_id} does not exist",
                subscription.offer_id
            ))
        })?;

        if offer.provider_company_id != identity.company_id {
            return Err(PortalError::Forbidden(format!(
                "company {} is not the provider of offer {}",
                identity.company_id, offer.id
            )));
        }
        if subscription.status != OfferSubscriptionStatus::Pending {
            return Err(PortalError::Conflict(format!(
                "offer subscription {subscription_id} is not in status {}",
                OfferSubscriptionStatus::Pending
            )));
        }

        let mut unit = UnitOfWork::new();
        unit.push(Change::ModifyOfferSubscription {
            subscription_id,
            status: OfferSubscriptionStatus::Active,
            process_id: None,
        });
        self.repository.save(unit)?;
        tracing::info!(subscription_id = %subscription_id, "offer subscription activated");
        Ok(())
    }

    /// Cancel the caller's subscription and withdraw its consents.
    pub fn unsubscribe(
        &self,
        identity: &IdentityData,
        subscription_id: OfferSubscriptionId,
    ) -> Result<(), PortalError> {
        let subscription = self.load_subscription(subscription_id)?;
        if subscription.company_id != identity.company_id {
            return Err(PortalError::Forbidden(format!(
                "company {} is not the subscriber of offer subscription {subscription_id}",
                identity.company_id
            )));
        }
        if subscription.status == OfferSubscriptionStatus::Inactive {
            return Err(PortalError::Conflict(format!(
                "offer subscription {subscription_id} is already {}",
                OfferSubscriptionStatus::Inactive
            )));
        }

        let now = Utc::now();
        let mut unit = UnitOfWork::new();
        if let Some(SubscriptionProcessData {
            process: Some(process),
            steps,
            ..
        }) = self.repository.subscription_process_data(subscription_id)?
        {
            close_process(
                &process,
                &steps,
                now,
                &mut unit,
                &format!("offer subscription {subscription_id}"),
            )?;
        }
        unit.push(Change::ModifyOfferSubscription {
            subscription_id,
            status: OfferSubscriptionStatus::Inactive,
            process_id: None,
        });
        for consent in self
            .repository
            .consents_for_subscription(subscription_id)?
            .into_iter()
            .filter(|consent| consent.status == ConsentStatus::Active)
        {
            unit.push(Change::ModifyConsentStatus {
                consent_id: consent.id,
                status: ConsentStatus::Inactive,
                changed_at: now,
            });
        }

        self.repository.save(unit)?;
        tracing::info!(subscription_id = %subscription_id, "offer subscription cancelled");
        Ok(())
    }

    /// Bulk add or modify the consents attached to a subscription.
    pub fn update_consents(
        &self,
        identity: &IdentityData,
        subscription_id: OfferSubscriptionId,
        consents: Vec<OfferAgreementConsentData>,
    ) -> Result<(), PortalError> {
        let subscription = self.load_subscription(subscription_id)?;
        if subscription.company_id != identity.company_id {
            return Err(PortalError::Forbidden(format!(
                "company {} is not the subscriber of offer subscription {subscription_id}",
                identity.company_id
            )));
        }

        let offer = self.repository.offer(subscription.offer_id)?.ok_or_else(|| {
            PortalError::UnexpectedCondition(format!(
                "offer {} of subscription {subscription_id} does not exist",
                subscription.offer_id
            ))
        })?;
        let invalid: Vec<String> = consents
            .iter()
            .filter(|consent| !offer.agreement_ids.contains(&consent.agreement_id))
            .map(|consent| consent.agreement_id.to_string())
            .collect();
        if !invalid.is_empty() {
            return Err(PortalError::argument(
                format!(
                    "agreements {} are not valid for offer {}",
                    invalid.join(", "),
                    offer.id
                ),
                "agreementId",
            ));
        }

        let requested: Vec<_> = consents
            .iter()
            .map(|consent| (consent.agreement_id, consent.consent_status))
            .collect();
        let existing = self.repository.consents_for_subscription(subscription_id)?;
        let owner = ConsentOwner {
            company_id: identity.company_id,
            identity_id: identity.identity_id,
            offer_subscription_id: Some(subscription_id),
        };
        let now = Utc::now();
        let plan = plan_consent_changes(&existing, &requested, owner, now);
        if plan.is_empty() {
            return Ok(());
        }

        let mut unit = UnitOfWork::new();
        plan.record(&mut unit, now);
        self.repository.save(unit)?;
        tracing::info!(
            subscription_id = %subscription_id,
            "offer subscription consents updated"
        );
        Ok(())
    }

    fn load_subscription(
        &self,
        subscription_id: OfferSubscriptionId,
    ) -> Result<OfferSubscription, PortalError> {
        self.repository
            .subscription(subscription_id)?
            .ok_or_else(|| subscription_not_found(subscription_id))
    }

    fn notify_provider(
        &self,
        offer: &Offer,
        identity: &IdentityData,
        subscription_id: OfferSubscriptionId,
    ) {
        let Some(recipient) = offer.provider_contact_email.as_deref() else {
            return;
        };

        let message = MailMessage::new(recipient, SUBSCRIPTION_REQUEST_TEMPLATE)
            .with_parameter("offerName", offer.name.clone())
            .with_parameter("subscriptionId", subscription_id.to_string())
            .with_parameter("requesterCompanyId", identity.company_id.to_string());

        if let Err(error) = self.mail.send(message) {
            tracing::warn!(
                subscription_id = %subscription_id,
                error = %error,
                "failed to notify offer provider"
            );
        }
    }
}
