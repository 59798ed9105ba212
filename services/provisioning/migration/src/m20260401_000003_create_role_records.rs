use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Teachers::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Teachers::Id).uuid().not_null().primary_key())
                    .col(
                        ColumnDef::new(Teachers::UserId)
                            .uuid()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Teachers::EmployeeId).string().null())
                    .col(
                        ColumnDef::new(Teachers::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Parents::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Parents::Id).uuid().not_null().primary_key())
                    .col(
                        ColumnDef::new(Parents::UserId)
                            .uuid()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Parents::Occupation).string().null())
                    .col(
                        ColumnDef::new(Parents::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Students::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Students::Id).uuid().not_null().primary_key())
                    .col(
                        ColumnDef::new(Students::UserId)
                            .uuid()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Students::ClassId).uuid().not_null())
                    .col(ColumnDef::new(Students::RollNumber).string().null())
                    .col(ColumnDef::new(Students::AcademicYearId).uuid().null())
                    .col(
                        ColumnDef::new(Students::Status)
                            .string_len(16)
                            .not_null()
                            .default("active"),
                    )
                    .col(
                        ColumnDef::new(Students::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Students::Table, Students::ClassId)
                            .to(Classes::Table, Classes::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Students::Table, Students::AcademicYearId)
                            .to(AcademicYears::Table, AcademicYears::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // NULL roll numbers never collide under a Postgres unique index.
        manager
            .create_index(
                Index::create()
                    .table(Students::Table)
                    .col(Students::ClassId)
                    .col(Students::RollNumber)
                    .name("uq_students_class_id_roll_number")
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Students::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Parents::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Teachers::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Teachers {
    Table,
    Id,
    UserId,
    EmployeeId,
    CreatedAt,
}

#[derive(Iden)]
enum Parents {
    Table,
    Id,
    UserId,
    Occupation,
    CreatedAt,
}

#[derive(Iden)]
enum Students {
    Table,
    Id,
    UserId,
    ClassId,
    RollNumber,
    AcademicYearId,
    Status,
    CreatedAt,
}

#[derive(Iden)]
enum Classes {
    Table,
    Id,
}

#[derive(Iden)]
enum AcademicYears {
    Table,
    Id,
}
