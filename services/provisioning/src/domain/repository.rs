#![allow(async_fn_in_trait)]

use campus_domain::id::{AcademicYearId, ClassId, ParentId, TeacherId, UserId};
use campus_domain::role::Role;

use crate::domain::types::{
    Identity, NewIdentity, ParentRecord, StudentParentLink, StudentRecord, TeacherAssignment,
    TeacherRecord,
};
use crate::error::ProvisioningError;

/// Port to the external identity store (hosted auth admin API).
pub trait IdentityStore: Send + Sync {
    /// Create a credentialed identity. Returns [`ProvisioningError::IdentityConflict`]
    /// when the login handle is already registered.
    async fn create_identity(&self, identity: &NewIdentity) -> Result<Identity, ProvisioningError>;

    /// Delete an identity. Used only to compensate a failed role assignment.
    async fn delete_identity(&self, id: UserId) -> Result<(), ProvisioningError>;
}

/// Repository for the role table.
pub trait RoleRepository: Send + Sync {
    async fn find_role(&self, user_id: UserId) -> Result<Option<Role>, ProvisioningError>;
    async fn assign(&self, user_id: UserId, role: Role) -> Result<(), ProvisioningError>;
}

/// Repository for teacher records and teacher assignments.
pub trait TeacherRepository: Send + Sync {
    async fn find_id_by_user(&self, user_id: UserId)
    -> Result<Option<TeacherId>, ProvisioningError>;

    /// Whether the teacher has at least one assignment row for the class.
    async fn is_assigned_to_class(
        &self,
        teacher_id: TeacherId,
        class_id: ClassId,
    ) -> Result<bool, ProvisioningError>;

    async fn create(&self, record: &TeacherRecord) -> Result<(), ProvisioningError>;

    /// Insert all rows or none.
    async fn create_assignments(
        &self,
        assignments: &[TeacherAssignment],
    ) -> Result<(), ProvisioningError>;
}

/// Repository for student records and student-parent links.
pub trait StudentRepository: Send + Sync {
    async fn create(&self, record: &StudentRecord) -> Result<(), ProvisioningError>;
    async fn link_parent(&self, link: &StudentParentLink) -> Result<(), ProvisioningError>;
}

/// Repository for parent records.
pub trait ParentRepository: Send + Sync {
    async fn find_id_by_user(&self, user_id: UserId)
    -> Result<Option<ParentId>, ProvisioningError>;
    async fn create(&self, record: &ParentRecord) -> Result<(), ProvisioningError>;
}

/// Read-only lookup of the current academic year.
pub trait AcademicYearRepository: Send + Sync {
    async fn find_active(&self) -> Result<Option<AcademicYearId>, ProvisioningError>;
}
