use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use campus_core::error::error_response;

use crate::domain::compensation::CompensationFailure;
use crate::domain::policy::DenyReason;

/// Provisioning service error variants.
#[derive(Debug, thiserror::Error)]
pub enum ProvisioningError {
    #[error("invalid or missing credentials")]
    Unauthenticated,
    #[error("failed to verify permissions")]
    PermissionCheckFailed(#[source] anyhow::Error),
    #[error("{0}")]
    PermissionDenied(DenyReason),
    #[error("{0}")]
    Validation(String),
    #[error("a user with this login is already registered")]
    IdentityConflict,
    /// Role write failed after the identity was created. The identity has been
    /// deleted unless `rollback_failures` says otherwise.
    #[error("failed to assign role; {}", rollback_outcome(.rollback_failures))]
    RoleAssignmentFailed {
        #[source]
        cause: anyhow::Error,
        rollback_failures: Vec<CompensationFailure>,
    },
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl ProvisioningError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Unauthenticated => "UNAUTHENTICATED",
            Self::PermissionCheckFailed(_) => "PERMISSION_CHECK_FAILED",
            Self::PermissionDenied(_) => "PERMISSION_DENIED",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::IdentityConflict => "IDENTITY_CONFLICT",
            Self::RoleAssignmentFailed { .. } => "ROLE_ASSIGNMENT_FAILED",
            Self::Internal(_) => "INTERNAL",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Unauthenticated => StatusCode::UNAUTHORIZED,
            Self::PermissionCheckFailed(_) | Self::PermissionDenied(_) => StatusCode::FORBIDDEN,
            Self::Validation(_) | Self::IdentityConflict => StatusCode::BAD_REQUEST,
            Self::RoleAssignmentFailed { .. } | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Server-side description including the full cause chain.
    pub fn detail(&self) -> String {
        match self {
            Self::PermissionCheckFailed(e) | Self::Internal(e) => format!("{self}: {e:#}"),
            Self::RoleAssignmentFailed {
                cause,
                rollback_failures,
            } => {
                let mut detail = format!("{self}: {cause:#}");
                for failure in rollback_failures {
                    detail.push_str(&format!("; rollback failed: {failure}"));
                }
                detail
            }
            _ => self.to_string(),
        }
    }

    /// Unwrap the underlying infrastructure error, wrapping domain errors as-is.
    pub fn into_anyhow(self) -> anyhow::Error {
        match self {
            Self::Internal(e) | Self::PermissionCheckFailed(e) => e,
            other => anyhow::Error::new(other),
        }
    }
}

fn rollback_outcome(failures: &[CompensationFailure]) -> &'static str {
    if failures.is_empty() {
        "user creation was rolled back"
    } else {
        "rollback incomplete, the new identity still exists"
    }
}

impl IntoResponse for ProvisioningError {
    fn into_response(self) -> Response {
        // 4xx are expected client errors and already recorded by the trace layer.
        // Errors with a hidden cause are logged here so the root cause is traceable.
        match &self {
            Self::Internal(e) => {
                tracing::error!(error = %format!("{e:#}"), kind = self.kind(), "internal error");
            }
            Self::PermissionCheckFailed(e) => {
                tracing::error!(error = %format!("{e:#}"), kind = self.kind(), "role lookup failed");
            }
            Self::RoleAssignmentFailed {
                rollback_failures, ..
            } => {
                tracing::error!(
                    error = %self.detail(),
                    rollback_failures = rollback_failures.len(),
                    kind = self.kind(),
                    "role assignment failed"
                );
            }
            _ => {}
        }
        error_response(self.status(), self.kind(), self.to_string())
    }
}
