//! Domain-level error taxonomy (§7).

use crate::status::ErrorInfo;
use thiserror::Error;

/// Errors raised while validating or resolving a [`crate::RoleOnboardingInput`].
///
/// These are always non-recoverable at the workflow level: a validation
/// failure means the workflow never gets scheduled.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("company_id must not be empty")]
    EmptyCompanyId,

    #[error("role_name must not be empty")]
    EmptyRoleName,

    #[error("no resolvable job description in documents")]
    NoResolvableJobDescription,
}

impl DomainError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::EmptyCompanyId | Self::EmptyRoleName | Self::NoResolvableJobDescription => {
                "VALIDATION_ERROR"
            }
        }
    }

    pub fn into_error_info(self) -> ErrorInfo {
        ErrorInfo {
            code: self.code().to_string(),
            message: self.to_string(),
            recoverable: false,
        }
    }
}
