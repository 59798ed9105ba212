use sea_orm_migration::prelude::*;

mod m20260401_000001_create_reference_tables;
mod m20260401_000002_create_user_roles;
mod m20260401_000003_create_role_records;
mod m20260401_000004_create_relationships;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260401_000001_create_reference_tables::Migration),
            Box::new(m20260401_000002_create_user_roles::Migration),
            Box::new(m20260401_000003_create_role_records::Migration),
            Box::new(m20260401_000004_create_relationships::Migration),
        ]
    }
}
