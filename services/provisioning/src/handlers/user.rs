use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use serde::{Deserialize, Serialize};

use campus_auth_types::bearer::BearerToken;
use campus_domain::id::UserId;
use campus_domain::role::Role;

use crate::domain::request::CreateUserInput;
use crate::error::ProvisioningError;
use crate::state::AppState;
use crate::usecase::caller::ResolveCallerUseCase;
use crate::usecase::provision::CreateUserUseCase;

// ── POST /functions/v1/create-user ───────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub email: Option<String>,
    pub teacher_id: Option<String>,
    pub student_id: Option<String>,
    pub parent_id: Option<String>,
    pub password: Option<String>,
    pub full_name: Option<String>,
    pub role: Option<String>,
    pub phone: Option<String>,
    pub subject_ids: Option<Vec<String>>,
    pub class_ids: Option<Vec<String>>,
    pub class_id: Option<String>,
    #[serde(default, deserialize_with = "campus_core::serde::opt_string_or_number")]
    pub roll_number: Option<String>,
    pub parent_ids: Option<Vec<String>>,
    pub occupation: Option<String>,
}

impl From<CreateUserRequest> for CreateUserInput {
    fn from(body: CreateUserRequest) -> Self {
        Self {
            email: body.email,
            teacher_id: body.teacher_id,
            student_id: body.student_id,
            parent_id: body.parent_id,
            password: body.password,
            full_name: body.full_name,
            role: body.role,
            phone: body.phone,
            subject_ids: body.subject_ids.unwrap_or_default(),
            class_ids: body.class_ids.unwrap_or_default(),
            class_id: body.class_id,
            roll_number: body.roll_number,
            parent_ids: body.parent_ids.unwrap_or_default(),
            occupation: body.occupation,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CreateUserResponse {
    pub success: bool,
    pub user: CreatedUser,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedUser {
    pub id: UserId,
    /// Login handle, which is the derived `…@domain` handle for id-based accounts.
    pub email: String,
    pub full_name: String,
    pub role: Role,
}

pub async fn create_user(
    BearerToken(token): BearerToken,
    State(state): State<AppState>,
    body: Result<Json<CreateUserRequest>, JsonRejection>,
) -> Result<Json<CreateUserResponse>, ProvisioningError> {
    let caller = ResolveCallerUseCase {
        roles: state.role_repo(),
        jwt_secret: state.jwt_secret.clone(),
    }
    .execute(&token)
    .await?;

    let Json(body) = body.map_err(|e| ProvisioningError::Validation(e.body_text()))?;

    let usecase = CreateUserUseCase {
        identities: state.identity_store.clone(),
        roles: state.role_repo(),
        teachers: state.teacher_repo(),
        students: state.student_repo(),
        parents: state.parent_repo(),
        academic_years: state.academic_year_repo(),
        login_domain: state.login_domain.clone(),
    };
    let out = usecase.execute(&caller, body.into()).await?;

    Ok(Json(CreateUserResponse {
        success: true,
        user: CreatedUser {
            id: out.user.id,
            email: out.user.login,
            full_name: out.user.full_name,
            role: out.user.role,
        },
    }))
}
