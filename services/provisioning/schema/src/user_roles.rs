use sea_orm::entity::prelude::*;

/// Role assigned to an identity. Exactly one row per identity.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "user_roles")]
pub struct Model {
    /// Identity id issued by the identity store (no local FK: identities live outside).
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: Uuid,
    /// One of `student`, `parent`, `teacher`, `school_admin`.
    pub role: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
