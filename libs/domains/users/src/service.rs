use async_trait::async_trait;
use axum_helpers::{AppError, CallerResolver, JwtClaims, Principal};
use database::dao::{PageBounds, PageRequest, PageResult};
use domain_events::entity::{event, role};
use sea_orm::{DatabaseConnection, EntityTrait};
use serde_json::Value;

use crate::dao::UserDao;
use crate::entity::user;
use crate::error::{UserError, UserResult};
use crate::models::UserWithDetail;

/// The authenticated user a request acts on behalf of
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub id: i32,
    pub staff: bool,
}

impl Principal for Caller {
    fn principal_id(&self) -> i32 {
        self.id
    }

    fn is_staff(&self) -> bool {
        self.staff
    }
}

impl From<&user::Model> for Caller {
    fn from(user: &user::Model) -> Self {
        Self {
            id: user.id,
            staff: user.is_staff(),
        }
    }
}

#[derive(Clone)]
pub struct UserService {
    db: DatabaseConnection,
    page_bounds: PageBounds,
}

impl UserService {
    pub fn new(db: DatabaseConnection, page_bounds: PageBounds) -> Self {
        Self { db, page_bounds }
    }

    pub async fn create(&self, raw: Value) -> UserResult<UserWithDetail> {
        Ok(UserDao::create(&self.db, raw).await?)
    }

    pub async fn get(&self, id: i32) -> UserResult<UserWithDetail> {
        Ok(UserDao::get(&self.db, id).await?)
    }

    pub async fn update(&self, id: i32, raw: Value) -> UserResult<UserWithDetail> {
        Ok(UserDao::update(&self.db, id, raw).await?)
    }

    pub async fn delete(&self, id: i32) -> UserResult<UserWithDetail> {
        Ok(UserDao::delete(&self.db, id).await?)
    }

    pub async fn list(&self) -> UserResult<Vec<UserWithDetail>> {
        Ok(UserDao::list(&self.db).await?)
    }

    pub async fn page(&self, request: PageRequest) -> UserResult<PageResult<UserWithDetail>> {
        Ok(UserDao::paginated_list(&self.db, request, &self.page_bounds).await?)
    }

    /// Events the user is involved in other than as an attendee.
    pub async fn events_of(&self, id: i32) -> UserResult<Vec<event::Model>> {
        Ok(domain_events::events_for_user(&self.db, id, role::ATTENDEE).await?)
    }

    pub async fn caller(&self, id: i32) -> UserResult<Caller> {
        let user = user::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(database::DaoError::from)?
            .ok_or(UserError::UnknownCaller(id))?;
        Ok(Caller::from(&user))
    }
}

#[async_trait]
impl CallerResolver for UserService {
    type Caller = Caller;

    async fn resolve(&self, claims: &JwtClaims) -> Result<Caller, AppError> {
        let id = claims.user_id()?;
        Ok(self.caller(id).await?)
    }
}
