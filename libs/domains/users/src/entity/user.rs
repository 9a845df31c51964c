use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub email: String,
    pub password_hash: String,
    pub is_admin: bool,
    pub is_super_admin: bool,
    pub signup_time: DateTimeWithTimeZone,
    pub last_access_time: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_one = "super::user_detail::Entity")]
    UserDetail,
}

impl Related<super::user_detail::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UserDetail.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Admins and super admins
    pub fn is_staff(&self) -> bool {
        self.is_admin || self.is_super_admin
    }
}
