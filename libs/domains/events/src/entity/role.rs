use sea_orm::entity::prelude::*;

/// Role a user can hold on an event, seeded by migration
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "roles")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub name: String,
    pub title_name: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::users_events_roles::Entity")]
    UsersEventsRoles,
}

impl Related<super::users_events_roles::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UsersEventsRoles.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

pub const ORGANIZER: &str = "organizer";
pub const ATTENDEE: &str = "attendee";
