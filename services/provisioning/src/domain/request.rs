//! Validation of raw `createUser` input into a typed provisioning request.

use std::str::FromStr;

use campus_domain::id::ClassId;
use campus_domain::role::Role;

use crate::domain::login::{LoginSource, derive_login_handle};
use crate::error::ProvisioningError;

/// Raw input as received from the caller. Every field is optional here;
/// [`ProvisionRequest::parse`] decides what is required.
#[derive(Debug, Clone, Default)]
pub struct CreateUserInput {
    pub email: Option<String>,
    pub teacher_id: Option<String>,
    pub student_id: Option<String>,
    pub parent_id: Option<String>,
    pub password: Option<String>,
    pub full_name: Option<String>,
    pub role: Option<String>,
    pub phone: Option<String>,
    pub subject_ids: Vec<String>,
    pub class_ids: Vec<String>,
    pub class_id: Option<String>,
    pub roll_number: Option<String>,
    pub parent_ids: Vec<String>,
    pub occupation: Option<String>,
}

/// Role-specific part of a validated request.
///
/// Relationship ids stay as supplied. They only matter once linking starts,
/// which is best effort, so a bad one must not fail the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoleProfile {
    Teacher {
        employee_id: Option<String>,
        class_ids: Vec<String>,
        subject_ids: Vec<String>,
    },
    Student {
        class_id: ClassId,
        roll_number: Option<String>,
        /// Parent identities to link, in the caller's order (the first is primary).
        parent_user_ids: Vec<String>,
    },
    Parent {
        occupation: Option<String>,
    },
    SchoolAdmin,
}

impl RoleProfile {
    pub fn role(&self) -> Role {
        match self {
            Self::Teacher { .. } => Role::Teacher,
            Self::Student { .. } => Role::Student,
            Self::Parent { .. } => Role::Parent,
            Self::SchoolAdmin => Role::SchoolAdmin,
        }
    }

    /// Class the new account is placed in, if the role has one.
    pub fn class_id(&self) -> Option<ClassId> {
        match self {
            Self::Student { class_id, .. } => Some(*class_id),
            _ => None,
        }
    }
}

/// A request that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionRequest {
    pub login: String,
    pub password: String,
    pub full_name: String,
    pub phone: Option<String>,
    pub profile: RoleProfile,
}

impl ProvisionRequest {
    pub fn role(&self) -> Role {
        self.profile.role()
    }

    /// Validate raw input. Deterministic: the same input always yields the same error.
    pub fn parse(input: CreateUserInput, login_domain: &str) -> Result<Self, ProvisioningError> {
        let role_tag = non_blank(input.role);
        let role = role_tag.as_deref().map(Role::from_str);

        let source = LoginSource {
            email: input.email.as_deref(),
            teacher_id: input.teacher_id.as_deref(),
            student_id: input.student_id.as_deref(),
            parent_id: input.parent_id.as_deref(),
        };
        let login = derive_login_handle(
            role.as_ref().and_then(|r| r.as_ref().ok()).copied(),
            &source,
            login_domain,
        );
        let password = input.password.filter(|p| !p.is_empty());
        let full_name = non_blank(input.full_name);

        let mut missing = Vec::new();
        if login.is_none() {
            missing.push("email");
        }
        if password.is_none() {
            missing.push("password");
        }
        if full_name.is_none() {
            missing.push("fullName");
        }
        if role.is_none() {
            missing.push("role");
        }
        let (Some(login), Some(password), Some(full_name), Some(role)) =
            (login, password, full_name, role)
        else {
            return Err(ProvisioningError::Validation(format!(
                "missing required fields: {}",
                missing.join(", ")
            )));
        };
        let role =
            role.map_err(|e| ProvisioningError::Validation(format!("invalid role: {}", e.0)))?;

        let profile = match role {
            Role::Teacher => RoleProfile::Teacher {
                employee_id: non_blank(input.teacher_id),
                class_ids: non_blank_list(input.class_ids),
                subject_ids: non_blank_list(input.subject_ids),
            },
            Role::Student => {
                let class_id = non_blank(input.class_id).ok_or_else(|| {
                    ProvisioningError::Validation(
                        "class assignment is required for students".to_owned(),
                    )
                })?;
                RoleProfile::Student {
                    class_id: parse_id(&class_id, "class id")?,
                    roll_number: non_blank(input.roll_number),
                    parent_user_ids: non_blank_list(input.parent_ids),
                }
            }
            Role::Parent => RoleProfile::Parent {
                occupation: non_blank(input.occupation),
            },
            Role::SchoolAdmin => RoleProfile::SchoolAdmin,
        };

        Ok(Self {
            login,
            password,
            full_name,
            phone: non_blank(input.phone),
            profile,
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

fn non_blank_list(values: Vec<String>) -> Vec<String> {
    values
        .into_iter()
        .filter_map(|v| non_blank(Some(v)))
        .collect()
}

/// Parse a caller-supplied id, reporting the raw value on failure.
pub fn parse_id<T: FromStr>(raw: &str, what: &str) -> Result<T, ProvisioningError> {
    raw.trim()
        .parse()
        .map_err(|_| ProvisioningError::Validation(format!("invalid {what}: {raw}")))
}
