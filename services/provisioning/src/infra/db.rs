use anyhow::Context as _;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QuerySelect, SqlErr,
};
use uuid::Uuid;

use campus_domain::id::{AcademicYearId, ClassId, ParentId, TeacherId, UserId};
use campus_domain::role::Role;
use campus_provisioning_schema::{
    academic_years, parents, student_parents, students, teacher_assignments, teachers, user_roles,
};

use crate::domain::repository::{
    AcademicYearRepository, ParentRepository, RoleRepository, StudentRepository,
    TeacherRepository,
};
use crate::domain::types::{
    ParentRecord, StudentParentLink, StudentRecord, TeacherAssignment, TeacherRecord,
};
use crate::error::ProvisioningError;

// ── Role repository ───────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbRoleRepository {
    pub db: DatabaseConnection,
}

impl RoleRepository for DbRoleRepository {
    async fn find_role(&self, user_id: UserId) -> Result<Option<Role>, ProvisioningError> {
        let model = user_roles::Entity::find_by_id(user_id.0)
            .one(&self.db)
            .await
            .context("find user role")?;
        let Some(model) = model else {
            return Ok(None);
        };
        let role = model
            .role
            .parse::<Role>()
            .with_context(|| format!("stored role for user {user_id}"))?;
        Ok(Some(role))
    }

    async fn assign(&self, user_id: UserId, role: Role) -> Result<(), ProvisioningError> {
        user_roles::ActiveModel {
            user_id: Set(user_id.0),
            role: Set(role.as_str().to_owned()),
            created_at: Set(Utc::now()),
        }
        .insert(&self.db)
        .await
        .context("insert user role")?;
        Ok(())
    }
}

// ── Teacher repository ────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbTeacherRepository {
    pub db: DatabaseConnection,
}

impl TeacherRepository for DbTeacherRepository {
    async fn find_id_by_user(
        &self,
        user_id: UserId,
    ) -> Result<Option<TeacherId>, ProvisioningError> {
        let id: Option<Uuid> = teachers::Entity::find()
            .select_only()
            .column(teachers::Column::Id)
            .filter(teachers::Column::UserId.eq(user_id.0))
            .into_tuple()
            .one(&self.db)
            .await
            .context("find teacher by user")?;
        Ok(id.map(TeacherId))
    }

    async fn is_assigned_to_class(
        &self,
        teacher_id: TeacherId,
        class_id: ClassId,
    ) -> Result<bool, ProvisioningError> {
        let count = teacher_assignments::Entity::find()
            .filter(teacher_assignments::Column::TeacherId.eq(teacher_id.0))
            .filter(teacher_assignments::Column::ClassId.eq(class_id.0))
            .count(&self.db)
            .await
            .context("count teacher assignments for class")?;
        Ok(count > 0)
    }

    async fn create(&self, record: &TeacherRecord) -> Result<(), ProvisioningError> {
        teachers::ActiveModel {
            id: Set(record.id.0),
            user_id: Set(record.user_id.0),
            employee_id: Set(record.employee_id.clone()),
            created_at: Set(Utc::now()),
        }
        .insert(&self.db)
        .await
        .context("insert teacher")?;
        Ok(())
    }

    async fn create_assignments(
        &self,
        assignments: &[TeacherAssignment],
    ) -> Result<(), ProvisioningError> {
        if assignments.is_empty() {
            return Ok(());
        }
        let models = assignments.iter().map(|a| teacher_assignments::ActiveModel {
            id: Set(Uuid::now_v7()),
            teacher_id: Set(a.teacher_id.0),
            class_id: Set(a.class_id.0),
            subject_id: Set(a.subject_id.0),
            is_class_teacher: Set(a.is_class_teacher),
        });
        // A single multi-row INSERT: either every row lands or none does.
        teacher_assignments::Entity::insert_many(models)
            .exec(&self.db)
            .await
            .context("insert teacher assignments")?;
        Ok(())
    }
}

// ── Student repository ────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbStudentRepository {
    pub db: DatabaseConnection,
}

impl StudentRepository for DbStudentRepository {
    async fn create(&self, record: &StudentRecord) -> Result<(), ProvisioningError> {
        let result = students::ActiveModel {
            id: Set(record.id.0),
            user_id: Set(record.user_id.0),
            class_id: Set(record.class_id.0),
            roll_number: Set(record.roll_number.clone()),
            academic_year_id: Set(record.academic_year_id.map(|id| id.0)),
            status: Set(record.status.clone()),
            created_at: Set(Utc::now()),
        }
        .insert(&self.db)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(e) if is_unique_violation(&e) => Err(ProvisioningError::Validation(format!(
                "roll number {} is already taken in class {}",
                record.roll_number.as_deref().unwrap_or("-"),
                record.class_id
            ))),
            Err(e) => Err(anyhow::Error::new(e).context("insert student").into()),
        }
    }

    async fn link_parent(&self, link: &StudentParentLink) -> Result<(), ProvisioningError> {
        student_parents::ActiveModel {
            student_id: Set(link.student_id.0),
            parent_id: Set(link.parent_id.0),
            is_primary: Set(link.is_primary),
        }
        .insert(&self.db)
        .await
        .context("insert student parent link")?;
        Ok(())
    }
}

// ── Parent repository ─────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbParentRepository {
    pub db: DatabaseConnection,
}

impl ParentRepository for DbParentRepository {
    async fn find_id_by_user(
        &self,
        user_id: UserId,
    ) -> Result<Option<ParentId>, ProvisioningError> {
        let id: Option<Uuid> = parents::Entity::find()
            .select_only()
            .column(parents::Column::Id)
            .filter(parents::Column::UserId.eq(user_id.0))
            .into_tuple()
            .one(&self.db)
            .await
            .context("find parent by user")?;
        Ok(id.map(ParentId))
    }

    async fn create(&self, record: &ParentRecord) -> Result<(), ProvisioningError> {
        parents::ActiveModel {
            id: Set(record.id.0),
            user_id: Set(record.user_id.0),
            occupation: Set(record.occupation.clone()),
            created_at: Set(Utc::now()),
        }
        .insert(&self.db)
        .await
        .context("insert parent")?;
        Ok(())
    }
}

// ── Academic year repository ──────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbAcademicYearRepository {
    pub db: DatabaseConnection,
}

impl AcademicYearRepository for DbAcademicYearRepository {
    async fn find_active(&self) -> Result<Option<AcademicYearId>, ProvisioningError> {
        let id: Option<Uuid> = academic_years::Entity::find()
            .select_only()
            .column(academic_years::Column::Id)
            .filter(academic_years::Column::IsActive.eq(true))
            .into_tuple()
            .one(&self.db)
            .await
            .context("find active academic year")?;
        Ok(id.map(AcademicYearId))
    }
}

fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}
