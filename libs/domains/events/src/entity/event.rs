use sea_orm::entity::prelude::*;

/// Stored event; times are wall-clock in `timezone`.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "events")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub starts_at: DateTime,
    pub ends_at: DateTime,
    pub timezone: String,
    pub location_name: Option<String>,
    pub searchable_location_name: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub event_type_id: Option<i32>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::event_type::Entity",
        from = "Column::EventTypeId",
        to = "super::event_type::Column::Id",
        on_delete = "SetNull"
    )]
    EventType,
    #[sea_orm(has_many = "super::users_events_roles::Entity")]
    UsersEventsRoles,
}

impl Related<super::event_type::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::EventType.def()
    }
}

impl Related<super::users_events_roles::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UsersEventsRoles.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
