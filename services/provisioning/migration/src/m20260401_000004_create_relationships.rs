use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(TeacherAssignments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TeacherAssignments::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(TeacherAssignments::TeacherId).uuid().not_null())
                    .col(ColumnDef::new(TeacherAssignments::ClassId).uuid().not_null())
                    .col(ColumnDef::new(TeacherAssignments::SubjectId).uuid().not_null())
                    .col(
                        ColumnDef::new(TeacherAssignments::IsClassTeacher)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(TeacherAssignments::Table, TeacherAssignments::TeacherId)
                            .to(Teachers::Table, Teachers::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(TeacherAssignments::Table, TeacherAssignments::ClassId)
                            .to(Classes::Table, Classes::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(TeacherAssignments::Table, TeacherAssignments::SubjectId)
                            .to(Subjects::Table, Subjects::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(TeacherAssignments::Table)
                    .col(TeacherAssignments::TeacherId)
                    .col(TeacherAssignments::ClassId)
                    .col(TeacherAssignments::SubjectId)
                    .name("uq_teacher_assignments_teacher_class_subject")
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Serves the "is this teacher assigned to that class" authorization lookup.
        manager
            .create_index(
                Index::create()
                    .table(TeacherAssignments::Table)
                    .col(TeacherAssignments::ClassId)
                    .name("idx_teacher_assignments_class_id")
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(StudentParents::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(StudentParents::StudentId).uuid().not_null())
                    .col(ColumnDef::new(StudentParents::ParentId).uuid().not_null())
                    .col(
                        ColumnDef::new(StudentParents::IsPrimary)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .primary_key(
                        Index::create()
                            .col(StudentParents::StudentId)
                            .col(StudentParents::ParentId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(StudentParents::Table, StudentParents::StudentId)
                            .to(Students::Table, Students::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(StudentParents::Table, StudentParents::ParentId)
                            .to(Parents::Table, Parents::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(StudentParents::Table)
                    .col(StudentParents::ParentId)
                    .name("idx_student_parents_parent_id")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(StudentParents::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(TeacherAssignments::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum TeacherAssignments {
    Table,
    Id,
    TeacherId,
    ClassId,
    SubjectId,
    IsClassTeacher,
}

#[derive(Iden)]
enum StudentParents {
    Table,
    StudentId,
    ParentId,
    IsPrimary,
}

#[derive(Iden)]
enum Teachers {
    Table,
    Id,
}

#[derive(Iden)]
enum Students {
    Table,
    Id,
}

#[derive(Iden)]
enum Parents {
    Table,
    Id,
}

#[derive(Iden)]
enum Classes {
    Table,
    Id,
}

#[derive(Iden)]
enum Subjects {
    Table,
    Id,
}
