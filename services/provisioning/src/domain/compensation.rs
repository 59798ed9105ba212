//! Compensating actions for multi-step provisioning.
//!
//! Each forward step that writes to a store outside our database registers its
//! inverse here. If a later mandatory step fails, [`Compensations::unwind`] runs the
//! inverses newest-first and returns every inverse that itself failed, so the caller
//! can report them next to the original error instead of swallowing them.

use std::fmt;

use campus_domain::id::UserId;

use crate::domain::repository::IdentityStore;
use crate::error::ProvisioningError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompensatingAction {
    DeleteIdentity { user_id: UserId, login: String },
}

impl fmt::Display for CompensatingAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DeleteIdentity { user_id, login } => {
                write!(f, "delete identity {user_id} ({login})")
            }
        }
    }
}

/// An inverse action that could not be applied. The forward write it was meant
/// to undo is still in place and needs manual cleanup.
#[derive(Debug)]
pub struct CompensationFailure {
    pub action: CompensatingAction,
    pub error: ProvisioningError,
}

impl fmt::Display for CompensationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.action, self.error.detail())
    }
}

#[derive(Debug, Default)]
pub struct Compensations {
    actions: Vec<CompensatingAction>,
}

impl Compensations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, action: CompensatingAction) {
        self.actions.push(action);
    }

    pub fn pending(&self) -> &[CompensatingAction] {
        &self.actions
    }

    /// Past the point of no return: forget every registered inverse.
    pub fn commit(&mut self) {
        self.actions.clear();
    }

    /// Run every registered inverse in reverse registration order.
    pub async fn unwind<I: IdentityStore>(self, identities: &I) -> Vec<CompensationFailure> {
        let mut failures = Vec::new();
        for action in self.actions.into_iter().rev() {
            let result = match &action {
                CompensatingAction::DeleteIdentity { user_id, .. } => {
                    identities.delete_identity(*user_id).await
                }
            };
            match result {
                Ok(()) => tracing::info!(action = %action, "compensating action applied"),
                Err(error) => failures.push(CompensationFailure { action, error }),
            }
        }
        failures
    }
}
