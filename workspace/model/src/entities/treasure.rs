use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;

use super::user;

/// Something a user found and wants to show off.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "treasures")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    /// Estimated worth. At most 10 digits, 2 of them after the point.
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub value: Decimal,
    pub material: String,
    pub location: String,
    #[sea_orm(default_value = "0")]
    pub likes: i32,
    /// The user who submitted this treasure. Always set.
    pub owner_id: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// A treasure belongs to exactly one owner. Owners with treasures can't be deleted.
    #[sea_orm(
        belongs_to = "user::Entity",
        from = "Column::OwnerId",
        to = "user::Column::Id",
        on_delete = "Restrict"
    )]
    Owner,
}

impl Related<user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Owner.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
