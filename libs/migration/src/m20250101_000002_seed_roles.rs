use sea_orm_migration::prelude::*;

use crate::m20250101_000001_create_events::Roles;

#[derive(DeriveMigrationName)]
pub struct Migration;

const ROLES: [(&str, &str); 6] = [
    ("organizer", "Organizer"),
    ("coorganizer", "Co-organizer"),
    ("track_organizer", "Track Organizer"),
    ("moderator", "Moderator"),
    ("attendee", "Attendee"),
    ("registrar", "Registrar"),
];

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let mut insert = Query::insert();
        insert
            .into_table(Roles::Table)
            .columns([Roles::Name, Roles::TitleName]);

        for (name, title) in ROLES {
            insert
                .values([name.into(), title.into()])
                .map_err(|e| DbErr::Custom(format!("invalid role seed row: {e}")))?;
        }

        manager.exec_stmt(insert).await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let names: Vec<&str> = ROLES.iter().map(|(name, _)| *name).collect();
        let delete = Query::delete()
            .from_table(Roles::Table)
            .and_where(Expr::col(Roles::Name).is_in(names))
            .to_owned();

        manager.exec_stmt(delete).await
    }
}
