use sea_orm::entity::prelude::*;

/// Student record. `(class_id, roll_number)` is unique when `roll_number` is set.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "students")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub user_id: Uuid,
    pub class_id: Uuid,
    pub roll_number: Option<String>,
    pub academic_year_id: Option<Uuid>,
    /// Enrollment status; `active` on creation.
    pub status: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::classes::Entity",
        from = "Column::ClassId",
        to = "super::classes::Column::Id"
    )]
    Class,
    #[sea_orm(
        belongs_to = "super::academic_years::Entity",
        from = "Column::AcademicYearId",
        to = "super::academic_years::Column::Id"
    )]
    AcademicYear,
    #[sea_orm(has_many = "super::student_parents::Entity")]
    StudentParents,
}

impl Related<super::classes::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Class.def()
    }
}

impl Related<super::academic_years::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AcademicYear.def()
    }
}

impl Related<super::student_parents::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StudentParents.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
