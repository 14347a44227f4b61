use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::ids::{ProcessId, ProcessStepId, VersionToken};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProcessType {
    ApplicationChecklist,
    OfferSubscription,
    PartnerRegistration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProcessStepStatus {
    Todo,
    Done,
    Skipped,
    Failed,
}

impl ProcessStepStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Todo => "TODO",
            Self::Done => "DONE",
            Self::Skipped => "SKIPPED",
            Self::Failed => "FAILED",
        }
    }

    /// Steps only ever leave `TODO`; a settled step is never reopened.
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(self, Self::Todo) && !matches!(next, Self::Todo)
    }
}

impl fmt::Display for ProcessStepStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProcessStepType {
    // application checklist
    VerifyRegistration,
    CreateBusinessPartnerNumberPush,
    CreateBusinessPartnerNumberManual,
    CreateIdentityWallet,
    StartSelfDescriptionLp,
    StartClearingHouse,
    ActivateApplication,
    ManualDeclineApplication,
    // partner registration
    SynchronizeUser,
    TriggerCallbackOspSubmitted,
    TriggerCallbackOspDeclined,
    ManualDeclineOsp,
    RemoveKeycloakUsers,
    // offer subscription
    TriggerProvider,
    RetriggerProvider,
    #[serde(rename = "OFFERSUBSCRIPTION_CLIENT_CREATION")]
    OfferSubscriptionClientCreation,
    #[serde(rename = "RETRIGGER_OFFERSUBSCRIPTION_CLIENT_CREATION")]
    RetriggerOfferSubscriptionClientCreation,
    #[serde(rename = "OFFERSUBSCRIPTION_TECHNICALUSER_CREATION")]
    OfferSubscriptionTechnicalUserCreation,
    #[serde(rename = "RETRIGGER_OFFERSUBSCRIPTION_TECHNICALUSER_CREATION")]
    RetriggerOfferSubscriptionTechnicalUserCreation,
    ActivateSubscription,
    TriggerProviderCallback,
    RetriggerProviderCallback,
}

impl ProcessStepType {
    pub const fn label(self) -> &'static str {
        match self {
            Self::VerifyRegistration => "VERIFY_REGISTRATION",
            Self::CreateBusinessPartnerNumberPush => "CREATE_BUSINESS_PARTNER_NUMBER_PUSH",
            Self::CreateBusinessPartnerNumberManual => "CREATE_BUSINESS_PARTNER_NUMBER_MANUAL",
            Self::CreateIdentityWallet => "CREATE_IDENTITY_WALLET",
            Self::StartSelfDescriptionLp => "START_SELF_DESCRIPTION_LP",
            Self::StartClearingHouse => "START_CLEARING_HOUSE",
            Self::ActivateApplication => "ACTIVATE_APPLICATION",
            Self::ManualDeclineApplication => "MANUAL_DECLINE_APPLICATION",
            Self::SynchronizeUser => "SYNCHRONIZE_USER",
            Self::TriggerCallbackOspSubmitted => "TRIGGER_CALLBACK_OSP_SUBMITTED",
            Self::TriggerCallbackOspDeclined => "TRIGGER_CALLBACK_OSP_DECLINED",
            Self::ManualDeclineOsp => "MANUAL_DECLINE_OSP",
            Self::RemoveKeycloakUsers => "REMOVE_KEYCLOAK_USERS",
            Self::TriggerProvider => "TRIGGER_PROVIDER",
            Self::RetriggerProvider => "RETRIGGER_PROVIDER",
            Self::OfferSubscriptionClientCreation => "OFFERSUBSCRIPTION_CLIENT_CREATION",
            Self::RetriggerOfferSubscriptionClientCreation => {
                "RETRIGGER_OFFERSUBSCRIPTION_CLIENT_CREATION"
            }
            Self::OfferSubscriptionTechnicalUserCreation => {
                "OFFERSUBSCRIPTION_TECHNICALUSER_CREATION"
            }
            Self::RetriggerOfferSubscriptionTechnicalUserCreation => {
                "RETRIGGER_OFFERSUBSCRIPTION_TECHNICALUSER_CREATION"
            }
            Self::ActivateSubscription => "ACTIVATE_SUBSCRIPTION",
            Self::TriggerProviderCallback => "TRIGGER_PROVIDER_CALLBACK",
            Self::RetriggerProviderCallback => "RETRIGGER_PROVIDER_CALLBACK",
        }
    }

    /// The step a retrigger step puts back on the queue.
    pub const fn step_to_retrigger(self) -> Option<Self> {
        match self {
            Self::RetriggerProvider => Some(Self::TriggerProvider),
            Self::RetriggerOfferSubscriptionClientCreation => {
                Some(Self::OfferSubscriptionClientCreation)
            }
            Self::RetriggerOfferSubscriptionTechnicalUserCreation => {
                Some(Self::OfferSubscriptionTechnicalUserCreation)
            }
            Self::RetriggerProviderCallback => Some(Self::TriggerProviderCallback),
            _ => None,
        }
    }
}

impl fmt::Display for ProcessStepType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Process {
    pub id: ProcessId,
    pub process_type: ProcessType,
    pub version: VersionToken,
    pub lock_expiry_date: Option<DateTime<Utc>>,
}

impl Process {
    pub fn new(process_type: ProcessType) -> Self {
        Self {
            id: ProcessId::generate(),
            process_type,
            version: VersionToken::generate(),
            lock_expiry_date: None,
        }
    }

    pub fn is_locked(&self, now: DateTime<Utc>) -> bool {
        self.lock_expiry_date.is_some_and(|expiry| expiry > now)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessStep {
    pub id: ProcessStepId,
    pub step_type: ProcessStepType,
    pub status: ProcessStepStatus,
    pub process_id: ProcessId,
    pub date_created: DateTime<Utc>,
    pub date_last_changed: Option<DateTime<Utc>>,
    pub message: Option<String>,
}

impl ProcessStep {
    pub fn new(
        step_type: ProcessStepType,
        status: ProcessStepStatus,
        process_id: ProcessId,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: ProcessStepId::generate(),
            step_type,
            status,
            process_id,
            date_created: now,
            date_last_changed: None,
            message: None,
        }
    }

    pub fn is_todo(&self) -> bool {
        self.status == ProcessStepStatus::Todo
    }

    pub fn to_data(&self) -> ProcessStepData {
        ProcessStepData {
            step_type: self.step_type,
            status: self.status,
            message: self.message.clone(),
        }
    }
}

/// Public view of a step as returned by the process listing endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessStepData {
    pub step_type: ProcessStepType,
    pub status: ProcessStepStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}
