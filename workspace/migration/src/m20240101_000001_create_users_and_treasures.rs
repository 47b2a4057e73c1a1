use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create users table
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(pk_auto(Users::Id))
                    .col(string_len(Users::Username, 64).unique_key())
                    .col(string(Users::PasswordHash))
                    .col(boolean(Users::IsActive).default(true))
                    .to_owned(),
            )
            .await?;

        // Create treasures table. Owners can't be deleted while they still own treasures.
        manager
            .create_table(
                Table::create()
                    .table(Treasures::Table)
                    .if_not_exists()
                    .col(pk_auto(Treasures::Id))
                    .col(string_len(Treasures::Name, 100))
                    .col(decimal_len(Treasures::Value, 10, 2))
                    .col(string_len(Treasures::Material, 100))
                    .col(string_len(Treasures::Location, 100))
                    .col(integer(Treasures::Likes).default(0))
                    .col(integer(Treasures::OwnerId))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_treasure_owner")
                            .from(Treasures::Table, Treasures::OwnerId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_treasures_owner_id")
                    .table(Treasures::Table)
                    .col(Treasures::OwnerId)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop tables in reverse order to avoid foreign key constraints
        manager
            .drop_table(Table::drop().table(Treasures::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    Username,
    PasswordHash,
    IsActive,
}

#[derive(DeriveIden)]
enum Treasures {
    Table,
    Id,
    Name,
    Value,
    Material,
    Location,
    Likes,
    OwnerId,
}
