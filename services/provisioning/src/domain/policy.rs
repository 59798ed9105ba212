//! Who may create whom.
//!
//! Rules, checked in order:
//! 1. only school admins and teachers may provision accounts;
//! 2. teachers may only create students and parents;
//! 3. a teacher placing a student in a class must be assigned to that class;
//! 4. school admins may create any role.
//!
//! Parent creation by teachers and every admin request are not class-scoped.

use std::fmt;

use campus_domain::id::ClassId;
use campus_domain::role::Role;

/// Reason returned to the caller when the policy rejects a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    InsufficientPrivilege,
    TeacherRoleRestricted,
    ClassNotAssigned,
}

impl fmt::Display for DenyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Self::InsufficientPrivilege => "insufficient privilege to create users",
            Self::TeacherRoleRestricted => "teachers may only create students and parents",
            Self::ClassNotAssigned => "can only add students to assigned classes",
        };
        f.write_str(msg)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(DenyReason),
    /// Allowed only if the calling teacher is assigned to this class.
    RequireClassAssignment(ClassId),
}

/// Evaluate the static part of the policy. Performs no I/O.
pub fn evaluate(
    caller_role: Option<Role>,
    requested: Role,
    class_id: Option<ClassId>,
) -> Decision {
    match caller_role {
        Some(Role::SchoolAdmin) => Decision::Allow,
        Some(Role::Teacher) => match requested {
            Role::Student => match class_id {
                Some(class_id) => Decision::RequireClassAssignment(class_id),
                None => Decision::Allow,
            },
            Role::Parent => Decision::Allow,
            Role::Teacher | Role::SchoolAdmin => {
                Decision::Deny(DenyReason::TeacherRoleRestricted)
            }
        },
        Some(Role::Student | Role::Parent) | None => {
            Decision::Deny(DenyReason::InsufficientPrivilege)
        }
    }
}
