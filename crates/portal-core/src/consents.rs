//! Consent records and the bulk planner that turns requested agreement
//! statuses into create/modify writes.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{AgreementId, CompanyId, ConsentId, IdentityId, OfferSubscriptionId};
use crate::store::{Change, UnitOfWork};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConsentStatus {
    Active,
    Inactive,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Consent {
    pub id: ConsentId,
    pub agreement_id: AgreementId,
    pub company_id: CompanyId,
    pub identity_id: IdentityId,
    pub status: ConsentStatus,
    pub date_created: DateTime<Utc>,
    pub date_last_changed: Option<DateTime<Utc>>,
    pub offer_subscription_id: Option<OfferSubscriptionId>,
}

/// Who gives the consents being planned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConsentOwner {
    pub company_id: CompanyId,
    pub identity_id: IdentityId,
    pub offer_subscription_id: Option<OfferSubscriptionId>,
}

impl ConsentOwner {
    pub fn consent(
        &self,
        agreement_id: AgreementId,
        status: ConsentStatus,
        now: DateTime<Utc>,
    ) -> Consent {
        Consent {
            id: ConsentId::generate(),
            agreement_id,
            company_id: self.company_id,
            identity_id: self.identity_id,
            status,
            date_created: now,
            date_last_changed: None,
            offer_subscription_id: self.offer_subscription_id,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConsentPlan {
    pub created: Vec<Consent>,
    /// Existing consents whose status changes.
    pub modified: Vec<(ConsentId, ConsentStatus)>,
}

impl ConsentPlan {
    pub fn is_empty(&self) -> bool {
        self.created.is_empty() && self.modified.is_empty()
    }

    pub fn record(self, unit: &mut UnitOfWork, now: DateTime<Utc>) {
        if !self.created.is_empty() {
            unit.push(Change::CreateConsents(self.created));
        }
        for (consent_id, status) in self.modified {
            unit.push(Change::ModifyConsentStatus {
                consent_id,
                status,
                changed_at: now,
            });
        }
    }
}

/// Plans the writes that bring `existing` in line with `requested`.
///
/// The last status requested for an agreement wins.
pub fn plan_consent_changes(
    existing: &[Consent],
    requested: &[(AgreementId, ConsentStatus)],
    owner: ConsentOwner,
    now: DateTime<Utc>,
) -> ConsentPlan {
    let requested: BTreeMap<AgreementId, ConsentStatus> = requested.iter().copied().collect();

    let mut plan = ConsentPlan::default();
    for (agreement_id, status) in requested {
        match existing
            .iter()
            .find(|consent| consent.agreement_id == agreement_id)
        {
            Some(consent) if consent.status == status => {}
            Some(consent) => plan.modified.push((consent.id, status)),
            None => plan.created.push(owner.consent(agreement_id, status, now)),
        }
    }
    plan
}
