use sea_orm_migration::{prelude::*, schema::*};

use crate::m20250101_000000_create_users::Users;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(EventTypes::Table)
                    .if_not_exists()
                    .col(pk_auto(EventTypes::Id))
                    .col(string(EventTypes::Name))
                    .col(string(EventTypes::Slug))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Events::Table)
                    .if_not_exists()
                    .col(pk_auto(Events::Id))
                    .col(string(Events::Name))
                    .col(timestamp(Events::StartsAt))
                    .col(timestamp(Events::EndsAt))
                    .col(string(Events::Timezone).default("UTC"))
                    .col(string_null(Events::LocationName))
                    .col(string_null(Events::SearchableLocationName))
                    .col(double_null(Events::Latitude))
                    .col(double_null(Events::Longitude))
                    .col(integer_null(Events::EventTypeId))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_events_event_type_id")
                            .from(Events::Table, Events::EventTypeId)
                            .to(EventTypes::Table, EventTypes::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_events_event_type_id")
                    .table(Events::Table)
                    .col(Events::EventTypeId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Roles::Table)
                    .if_not_exists()
                    .col(pk_auto(Roles::Id))
                    .col(string(Roles::Name).unique_key())
                    .col(string(Roles::TitleName))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(UsersEventsRoles::Table)
                    .if_not_exists()
                    .col(pk_auto(UsersEventsRoles::Id))
                    .col(integer(UsersEventsRoles::UserId))
                    .col(integer(UsersEventsRoles::EventId))
                    .col(integer(UsersEventsRoles::RoleId))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_users_events_roles_user_id")
                            .from(UsersEventsRoles::Table, UsersEventsRoles::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_users_events_roles_event_id")
                            .from(UsersEventsRoles::Table, UsersEventsRoles::EventId)
                            .to(Events::Table, Events::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_users_events_roles_role_id")
                            .from(UsersEventsRoles::Table, UsersEventsRoles::RoleId)
                            .to(Roles::Table, Roles::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_users_events_roles_unique")
                    .table(UsersEventsRoles::Table)
                    .col(UsersEventsRoles::UserId)
                    .col(UsersEventsRoles::EventId)
                    .col(UsersEventsRoles::RoleId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(UsersEventsRoles::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Roles::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Events::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(EventTypes::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum EventTypes {
    Table,
    Id,
    Name,
    Slug,
}

#[derive(DeriveIden)]
enum Events {
    Table,
    Id,
    Name,
    StartsAt,
    EndsAt,
    Timezone,
    LocationName,
    SearchableLocationName,
    Latitude,
    Longitude,
    EventTypeId,
}

#[derive(DeriveIden)]
pub(crate) enum Roles {
    Table,
    Id,
    Name,
    TitleName,
}

#[derive(DeriveIden)]
enum UsersEventsRoles {
    Table,
    Id,
    UserId,
    EventId,
    RoleId,
}
