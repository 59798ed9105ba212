//! `createUser`: identity, role, role record, relationships.
//!
//! Identity creation and role assignment are mandatory and atomic as a pair: if
//! the role write fails the identity is deleted again. Everything after the role
//! write is best effort and degrades into [`ProvisioningWarning`]s.

use campus_domain::id::{ClassId, ParentId, StudentId, SubjectId, TeacherId, UserId};
use campus_domain::role::Role;
use tracing::Span;

use crate::domain::compensation::{CompensatingAction, Compensations};
use crate::domain::policy::{self, Decision, DenyReason};
use crate::domain::repository::{
    AcademicYearRepository, IdentityStore, ParentRepository, RoleRepository, StudentRepository,
    TeacherRepository,
};
use crate::domain::request::{CreateUserInput, ProvisionRequest, RoleProfile, parse_id};
use crate::domain::types::{
    CallerContext, NewIdentity, ParentRecord, ProvisionedUser, ProvisioningStage,
    ProvisioningWarning, STUDENT_STATUS_ACTIVE, StudentParentLink, StudentRecord,
    TeacherAssignment, TeacherRecord,
};
use crate::error::ProvisioningError;

#[derive(Debug)]
pub struct CreateUserOutput {
    pub user: ProvisionedUser,
    /// Non-fatal failures after the role was assigned.
    pub warnings: Vec<ProvisioningWarning>,
}

pub struct CreateUserUseCase<I, R, T, S, P, A>
where
    I: IdentityStore,
    R: RoleRepository,
    T: TeacherRepository,
    S: StudentRepository,
    P: ParentRepository,
    A: AcademicYearRepository,
{
    pub identities: I,
    pub roles: R,
    pub teachers: T,
    pub students: S,
    pub parents: P,
    pub academic_years: A,
    pub login_domain: String,
}

impl<I, R, T, S, P, A> CreateUserUseCase<I, R, T, S, P, A>
where
    I: IdentityStore,
    R: RoleRepository,
    T: TeacherRepository,
    S: StudentRepository,
    P: ParentRepository,
    A: AcademicYearRepository,
{
    #[tracing::instrument(
        name = "create_user",
        skip_all,
        fields(caller = %caller.user_id, stage = tracing::field::Empty)
    )]
    pub async fn execute(
        &self,
        caller: &CallerContext,
        input: CreateUserInput,
    ) -> Result<CreateUserOutput, ProvisioningError> {
        let result = self.provision(caller, input).await;
        if result.is_err() {
            enter(ProvisioningStage::Failed);
        }
        result
    }

    async fn provision(
        &self,
        caller: &CallerContext,
        input: CreateUserInput,
    ) -> Result<CreateUserOutput, ProvisioningError> {
        enter(ProvisioningStage::Validating);
        let request = ProvisionRequest::parse(input, &self.login_domain)?;
        let role = request.role();

        enter(ProvisioningStage::Authorizing);
        self.authorize(caller, &request).await?;

        enter(ProvisioningStage::CreatingIdentity);
        let identity = self
            .identities
            .create_identity(&NewIdentity {
                login: request.login.clone(),
                password: request.password.clone(),
                full_name: request.full_name.clone(),
                role,
                phone: request.phone.clone(),
            })
            .await?;

        let mut compensations = Compensations::new();
        compensations.register(CompensatingAction::DeleteIdentity {
            user_id: identity.id,
            login: identity.login.clone(),
        });

        enter(ProvisioningStage::AssigningRole);
        if let Err(e) = self.roles.assign(identity.id, role).await {
            enter(ProvisioningStage::RollingBack);
            let rollback_failures = compensations.unwind(&self.identities).await;
            for failure in &rollback_failures {
                tracing::error!(
                    user_id = %identity.id,
                    login = %identity.login,
                    error = %failure,
                    "identity left without a role, manual cleanup required"
                );
            }
            return Err(ProvisioningError::RoleAssignmentFailed {
                cause: e.into_anyhow(),
                rollback_failures,
            });
        }
        compensations.commit();

        let mut warnings = Warnings::default();
        self.create_role_records(identity.id, request.profile, &mut warnings)
            .await;

        enter(ProvisioningStage::Succeeded);
        tracing::info!(
            user_id = %identity.id,
            role = %role,
            warnings = warnings.0.len(),
            "user provisioned"
        );

        Ok(CreateUserOutput {
            user: ProvisionedUser {
                id: identity.id,
                login: identity.login,
                full_name: request.full_name,
                role,
            },
            warnings: warnings.0,
        })
    }

    async fn authorize(
        &self,
        caller: &CallerContext,
        request: &ProvisionRequest,
    ) -> Result<(), ProvisioningError> {
        let decision = policy::evaluate(caller.role, request.role(), request.profile.class_id());
        let class_id = match decision {
            Decision::Allow => return Ok(()),
            Decision::Deny(reason) => return Err(deny(caller, reason)),
            Decision::RequireClassAssignment(class_id) => class_id,
        };

        if self.teaches_class(caller.user_id, class_id).await? {
            Ok(())
        } else {
            Err(deny(caller, DenyReason::ClassNotAssigned))
        }
    }

    async fn teaches_class(
        &self,
        user_id: UserId,
        class_id: ClassId,
    ) -> Result<bool, ProvisioningError> {
        let check_failed = |e: ProvisioningError| {
            ProvisioningError::PermissionCheckFailed(e.into_anyhow())
        };
        let Some(teacher_id) = self
            .teachers
            .find_id_by_user(user_id)
            .await
            .map_err(check_failed)?
        else {
            return Ok(false);
        };
        self.teachers
            .is_assigned_to_class(teacher_id, class_id)
            .await
            .map_err(check_failed)
    }

    async fn create_role_records(
        &self,
        user_id: UserId,
        profile: RoleProfile,
        warnings: &mut Warnings,
    ) {
        match profile {
            RoleProfile::Teacher {
                employee_id,
                class_ids,
                subject_ids,
            } => {
                self.create_teacher(user_id, employee_id, &class_ids, &subject_ids, warnings)
                    .await
            }
            RoleProfile::Student {
                class_id,
                roll_number,
                parent_user_ids,
            } => {
                self.create_student(user_id, class_id, roll_number, &parent_user_ids, warnings)
                    .await
            }
            RoleProfile::Parent { occupation } => {
                enter(ProvisioningStage::CreatingRoleRecord);
                let record = ParentRecord {
                    id: ParentId::new(),
                    user_id,
                    occupation,
                };
                if let Err(e) = self.parents.create(&record).await {
                    warnings.push(ProvisioningStage::CreatingRoleRecord, e);
                }
            }
            RoleProfile::SchoolAdmin => {}
        }
    }

    async fn create_teacher(
        &self,
        user_id: UserId,
        employee_id: Option<String>,
        class_ids: &[String],
        subject_ids: &[String],
        warnings: &mut Warnings,
    ) {
        enter(ProvisioningStage::CreatingRoleRecord);
        let teacher_id = TeacherId::new();
        let record = TeacherRecord {
            id: teacher_id,
            user_id,
            employee_id,
        };
        if let Err(e) = self.teachers.create(&record).await {
            warnings.push(ProvisioningStage::CreatingRoleRecord, e);
            return;
        }

        if class_ids.is_empty() || subject_ids.is_empty() {
            return;
        }
        enter(ProvisioningStage::LinkingRelationships);
        let class_ids: Vec<ClassId> = parse_links(class_ids, "class id", warnings);
        let subject_ids: Vec<SubjectId> = parse_links(subject_ids, "subject id", warnings);
        if class_ids.is_empty() || subject_ids.is_empty() {
            return;
        }
        let assignments: Vec<TeacherAssignment> = class_ids
            .iter()
            .flat_map(|&class_id| {
                subject_ids.iter().map(move |&subject_id| TeacherAssignment {
                    teacher_id,
                    class_id,
                    subject_id,
                    is_class_teacher: false,
                })
            })
            .collect();
        if let Err(e) = self.teachers.create_assignments(&assignments).await {
            warnings.push(ProvisioningStage::LinkingRelationships, e);
        }
    }

    async fn create_student(
        &self,
        user_id: UserId,
        class_id: ClassId,
        roll_number: Option<String>,
        parent_user_ids: &[String],
        warnings: &mut Warnings,
    ) {
        enter(ProvisioningStage::CreatingRoleRecord);
        let academic_year_id = match self.academic_years.find_active().await {
            Ok(id) => id,
            Err(e) => {
                warnings.push(ProvisioningStage::CreatingRoleRecord, e);
                None
            }
        };
        let student_id = StudentId::new();
        let record = StudentRecord {
            id: student_id,
            user_id,
            class_id,
            roll_number,
            academic_year_id,
            status: STUDENT_STATUS_ACTIVE.to_owned(),
        };
        if let Err(e) = self.students.create(&record).await {
            warnings.push(ProvisioningStage::CreatingRoleRecord, e);
            return;
        }

        if parent_user_ids.is_empty() {
            return;
        }
        enter(ProvisioningStage::LinkingRelationships);
        for (index, raw) in parent_user_ids.iter().enumerate() {
            let Ok(parent_user_id) = raw.parse::<UserId>() else {
                tracing::debug!(parent_user_id = %raw, "no parent record, skipping link");
                continue;
            };
            let parent_id = match self.parents.find_id_by_user(parent_user_id).await {
                Ok(Some(parent_id)) => parent_id,
                Ok(None) => {
                    tracing::debug!(%parent_user_id, "no parent record, skipping link");
                    continue;
                }
                Err(e) => {
                    warnings.push(ProvisioningStage::LinkingRelationships, e);
                    continue;
                }
            };
            let link = StudentParentLink {
                student_id,
                parent_id,
                is_primary: index == 0,
            };
            if let Err(e) = self.students.link_parent(&link).await {
                warnings.push(ProvisioningStage::LinkingRelationships, e);
            }
        }
    }
}

/// Parse relationship ids, turning each malformed one into a linking warning.
fn parse_links<T: std::str::FromStr>(
    raw: &[String],
    what: &str,
    warnings: &mut Warnings,
) -> Vec<T> {
    raw.iter()
        .filter_map(|id| match parse_id(id, what) {
            Ok(id) => Some(id),
            Err(e) => {
                warnings.push(ProvisioningStage::LinkingRelationships, e);
                None
            }
        })
        .collect()
}

fn enter(stage: ProvisioningStage) {
    Span::current().record("stage", stage.as_str());
}

fn deny(caller: &CallerContext, reason: DenyReason) -> ProvisioningError {
    tracing::info!(
        caller_role = caller.role.map(Role::as_str).unwrap_or("none"),
        %reason,
        "provisioning denied"
    );
    ProvisioningError::PermissionDenied(reason)
}

#[derive(Default)]
struct Warnings(Vec<ProvisioningWarning>);

impl Warnings {
    fn push(&mut self, stage: ProvisioningStage, error: ProvisioningError) {
        let detail = error.detail();
        tracing::warn!(stage = %stage, error = %detail, "provisioning step failed");
        self.0.push(ProvisioningWarning { stage, detail });
    }
}
