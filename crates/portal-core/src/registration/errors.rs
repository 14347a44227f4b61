use std::fmt;

use crate::error::PortalError;

/// Error codes returned by the partner network endpoints.
///
/// The code itself is the message so clients can match on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkError {
    CompanyNotFound,
    OnlyOneApplicationPerCompany,
    AppNotCreatedState,
    AllAgreementsCompanyShouldAgree,
    NotActiveAgreements,
    ProcessMustExist,
    CompanyApplicationNotExist,
    UserNotAllowedDeclineApplication,
    ExternalRegistrationsDeclined,
    CheckApplicationStatus,
}

impl NetworkError {
    pub const fn code(self) -> &'static str {
        match self {
            Self::CompanyNotFound => "NETWORK_COMPANY_NOT_FOUND",
            Self::OnlyOneApplicationPerCompany => {
                "NETWORK_CONFLICT_ONLY_ONE_APPLICATION_PER_COMPANY"
            }
            Self::AppNotCreatedState => "NETWORK_CONFLICT_APP_NOT_CREATED_STATE",
            // sic
            Self::AllAgreementsCompanyShouldAgree => {
                "NETWORK_ARG_ALL_AGREEMNTS_COMPANY_SHOULD_AGREED"
            }
            Self::NotActiveAgreements => "NETWORK_ARG_NOT_ACTIVE_AGREEMENTS",
            Self::ProcessMustExist => "NETWORK_CONFLICT_PROCESS_MUST_EXIST",
            Self::CompanyApplicationNotExist => "NETWORK_COMPANY_APPLICATION_NOT_EXIST",
            Self::UserNotAllowedDeclineApplication => {
                "NETWORK_FORBIDDEN_USER_NOT_ALLOWED_DECLINE_APPLICATION"
            }
            Self::ExternalRegistrationsDeclined => {
                "NETWORK_CONFLICT_EXTERNAL_REGISTRATIONS_DECLINED"
            }
            Self::CheckApplicationStatus => "NETWORK_CONFLICT_CHECK_APPLICATION_STATUS",
        }
    }

    pub(crate) fn not_found(self) -> PortalError {
        PortalError::NotFound(self.to_string())
    }

    pub(crate) fn conflict(self) -> PortalError {
        PortalError::Conflict(self.to_string())
    }

    pub(crate) fn forbidden(self) -> PortalError {
        PortalError::Forbidden(self.to_string())
    }

    pub(crate) fn argument(self, argument: &str) -> PortalError {
        PortalError::argument(self.to_string(), argument)
    }
}

impl fmt::Display for NetworkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
