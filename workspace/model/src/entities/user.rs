use sea_orm::entity::prelude::*;

/// A person who can log in and submit treasures.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub username: String,
    /// Argon2id hash in PHC string format. Never the plaintext password.
    pub password_hash: String,
    /// Inactive accounts keep their treasures but cannot log in.
    #[sea_orm(default_value = "true")]
    pub is_active: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    // A user can own many treasures.
    #[sea_orm(has_many = "super::treasure::Entity")]
    Treasure,
}

impl Related<super::treasure::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Treasure.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
