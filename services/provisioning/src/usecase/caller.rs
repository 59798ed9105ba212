use campus_auth_types::token::validate_access_token;
use campus_domain::id::UserId;

use crate::domain::repository::RoleRepository;
use crate::domain::types::CallerContext;
use crate::error::ProvisioningError;

/// Resolve a bearer credential into the caller's identity and role.
pub struct ResolveCallerUseCase<R: RoleRepository> {
    pub roles: R,
    pub jwt_secret: String,
}

impl<R: RoleRepository> ResolveCallerUseCase<R> {
    pub async fn execute(&self, token: &str) -> Result<CallerContext, ProvisioningError> {
        let info = validate_access_token(token, &self.jwt_secret).map_err(|e| {
            tracing::debug!(reason = %e, "rejected bearer token");
            ProvisioningError::Unauthenticated
        })?;
        let user_id = UserId(info.user_id);

        let role = self
            .roles
            .find_role(user_id)
            .await
            .map_err(|e| ProvisioningError::PermissionCheckFailed(e.into_anyhow()))?;

        Ok(CallerContext { user_id, role })
    }
}
