use sea_orm::DatabaseConnection;

use crate::infra::db::{
    DbAcademicYearRepository, DbParentRepository, DbRoleRepository, DbStudentRepository,
    DbTeacherRepository,
};
use crate::infra::identity::HttpIdentityStore;

/// Shared application state passed to every handler via axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub identity_store: HttpIdentityStore,
    pub jwt_secret: String,
    pub login_domain: String,
}

impl AppState {
    pub fn role_repo(&self) -> DbRoleRepository {
        DbRoleRepository {
            db: self.db.clone(),
        }
    }

    pub fn teacher_repo(&self) -> DbTeacherRepository {
        DbTeacherRepository {
            db: self.db.clone(),
        }
    }

    pub fn student_repo(&self) -> DbStudentRepository {
        DbStudentRepository {
            db: self.db.clone(),
        }
    }

    pub fn parent_repo(&self) -> DbParentRepository {
        DbParentRepository {
            db: self.db.clone(),
        }
    }

    pub fn academic_year_repo(&self) -> DbAcademicYearRepository {
        DbAcademicYearRepository {
            db: self.db.clone(),
        }
    }
}
