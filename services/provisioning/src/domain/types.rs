use std::fmt;

use campus_domain::id::{
    AcademicYearId, ClassId, ParentId, StudentId, SubjectId, TeacherId, UserId,
};
use campus_domain::role::Role;

/// Authenticated caller of a provisioning request.
///
/// `role` is `None` when the caller has an identity but no role row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallerContext {
    pub user_id: UserId,
    pub role: Option<Role>,
}

/// Credentials and metadata sent to the identity store when creating an account.
#[derive(Debug, Clone)]
pub struct NewIdentity {
    pub login: String,
    pub password: String,
    pub full_name: String,
    pub role: Role,
    pub phone: Option<String>,
}

/// Identity as returned by the identity store after creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub id: UserId,
    pub login: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeacherRecord {
    pub id: TeacherId,
    pub user_id: UserId,
    pub employee_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudentRecord {
    pub id: StudentId,
    pub user_id: UserId,
    pub class_id: ClassId,
    pub roll_number: Option<String>,
    pub academic_year_id: Option<AcademicYearId>,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParentRecord {
    pub id: ParentId,
    pub user_id: UserId,
    pub occupation: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TeacherAssignment {
    pub teacher_id: TeacherId,
    pub class_id: ClassId,
    pub subject_id: SubjectId,
    pub is_class_teacher: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StudentParentLink {
    pub student_id: StudentId,
    pub parent_id: ParentId,
    pub is_primary: bool,
}

/// Stages of a single `createUser` call, in execution order. `Failed` is
/// terminal and can follow any stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProvisioningStage {
    Validating,
    Authorizing,
    CreatingIdentity,
    AssigningRole,
    RollingBack,
    CreatingRoleRecord,
    LinkingRelationships,
    Succeeded,
    Failed,
}

impl ProvisioningStage {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Validating => "validating",
            Self::Authorizing => "authorizing",
            Self::CreatingIdentity => "creating_identity",
            Self::AssigningRole => "assigning_role",
            Self::RollingBack => "rolling_back",
            Self::CreatingRoleRecord => "creating_role_record",
            Self::LinkingRelationships => "linking_relationships",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for ProvisioningStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A write after role assignment that failed. Logged, never surfaced as a call failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisioningWarning {
    pub stage: ProvisioningStage,
    pub detail: String,
}

/// Minimum usable artifact of a successful call: identity plus role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionedUser {
    pub id: UserId,
    pub login: String,
    pub full_name: String,
    pub role: Role,
}

/// Domain suffix appended to handles derived from human-readable ids.
pub const DEFAULT_LOGIN_DOMAIN: &str = "school.internal";

/// Status given to every newly created student record.
pub const STUDENT_STATUS_ACTIVE: &str = "active";
