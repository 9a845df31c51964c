use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(pk_auto(Users::Id))
                    .col(string(Users::Email).unique_key())
                    .col(string(Users::PasswordHash))
                    .col(boolean(Users::IsAdmin).default(false))
                    .col(boolean(Users::IsSuperAdmin).default(false))
                    .col(
                        timestamp_with_time_zone(Users::SignupTime)
                            .default(Expr::current_timestamp()),
                    )
                    .col(timestamp_with_time_zone_null(Users::LastAccessTime))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(UserDetails::Table)
                    .if_not_exists()
                    .col(pk_auto(UserDetails::Id))
                    .col(integer(UserDetails::UserId).unique_key())
                    .col(string_null(UserDetails::Firstname))
                    .col(string_null(UserDetails::Lastname))
                    .col(text_null(UserDetails::Details))
                    .col(string_null(UserDetails::Avatar))
                    .col(string_null(UserDetails::Contact))
                    .col(string_null(UserDetails::Facebook))
                    .col(string_null(UserDetails::Twitter))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_details_user_id")
                            .from(UserDetails::Table, UserDetails::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(UserDetails::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
pub(crate) enum Users {
    Table,
    Id,
    Email,
    PasswordHash,
    IsAdmin,
    IsSuperAdmin,
    SignupTime,
    LastAccessTime,
}

#[derive(DeriveIden)]
enum UserDetails {
    Table,
    Id,
    UserId,
    Firstname,
    Lastname,
    Details,
    Avatar,
    Contact,
    Facebook,
    Twitter,
}
