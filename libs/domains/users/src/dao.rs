use database::dao::{DaoError, DaoResult, PageBounds, PageRequest, PageResult, ResourceDao, SubResource};
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, TransactionTrait};
use serde_json::Value;
use std::collections::HashMap;
use tracing::{info, warn};

use crate::entity::{user, user_detail};
use crate::models::{CreateUser, CreateUserDetail, UpdateUser, UpdateUserDetail, UserWithDetail};

pub const USERS: ResourceDao<user::Entity, CreateUser, UpdateUser> = ResourceDao::new("user");

/// The detail row, nested under `user_detail` in update payloads
pub const USER_DETAIL: SubResource<user_detail::Entity, CreateUserDetail, UpdateUserDetail> =
    SubResource::new(
        "user_detail",
        user_detail::Column::UserId,
        ResourceDao::new("user_detail"),
    );

/// Users always travel with their detail row.
pub struct UserDao;

impl UserDao {
    /// Inserts the user and its empty detail row in one transaction.
    pub async fn create<Db>(db: &Db, raw: Value) -> DaoResult<UserWithDetail>
    where
        Db: TransactionTrait,
    {
        let input = USERS.validate_create(raw)?;

        let txn = db.begin().await?;
        let outcome = async {
            let user = USERS.create_from(&txn, input).await?;
            let detail = USER_DETAIL
                .dao()
                .create_from(&txn, CreateUserDetail { user_id: user.id })
                .await?;
            Ok::<_, DaoError>(UserWithDetail {
                user,
                detail: Some(detail),
            })
        }
        .await;

        match outcome {
            Ok(created) => {
                txn.commit().await?;
                info!(user_id = created.user.id, "Registered user");
                Ok(created)
            }
            Err(err) => {
                if let Err(rollback_err) = txn.rollback().await {
                    warn!(error = %rollback_err, "Rollback failed");
                }
                Err(err)
            }
        }
    }

    pub async fn get<C: ConnectionTrait>(db: &C, id: i32) -> DaoResult<UserWithDetail> {
        let user = USERS.get(db, id).await?;
        let detail = user_detail::Entity::find()
            .filter(user_detail::Column::UserId.eq(id))
            .one(db)
            .await?;
        Ok(UserWithDetail { user, detail })
    }

    /// Updates the user and the nested `user_detail` object atomically.
    pub async fn update<Db>(db: &Db, id: i32, raw: Value) -> DaoResult<UserWithDetail>
    where
        Db: TransactionTrait,
    {
        let (user, detail) = USERS.update_with(db, id, raw, &USER_DETAIL).await?;
        Ok(UserWithDetail { user, detail })
    }

    /// Deletes the user together with its detail row and returns both as they were.
    pub async fn delete<Db>(db: &Db, id: i32) -> DaoResult<UserWithDetail>
    where
        Db: TransactionTrait,
    {
        let txn = db.begin().await?;
        let outcome = async {
            let existing = Self::get(&txn, id).await?;
            user_detail::Entity::delete_many()
                .filter(user_detail::Column::UserId.eq(id))
                .exec(&txn)
                .await?;
            USERS.delete(&txn, id).await?;
            Ok::<_, DaoError>(existing)
        }
        .await;

        match outcome {
            Ok(deleted) => {
                txn.commit().await?;
                Ok(deleted)
            }
            Err(err) => {
                if let Err(rollback_err) = txn.rollback().await {
                    warn!(error = %rollback_err, "Rollback failed");
                }
                Err(err)
            }
        }
    }

    pub async fn list<C: ConnectionTrait>(db: &C) -> DaoResult<Vec<UserWithDetail>> {
        let users = USERS.list(db).await?;
        with_details(db, users).await
    }

    pub async fn paginated_list<C: ConnectionTrait>(
        db: &C,
        request: PageRequest,
        bounds: &PageBounds,
    ) -> DaoResult<PageResult<UserWithDetail>> {
        let page = USERS.paginated_list(db, request, bounds).await?;
        let mut details = details_by_user(db, page.results.iter().map(|u| u.id)).await?;
        Ok(page.map(|user| {
            let detail = details.remove(&user.id);
            UserWithDetail { user, detail }
        }))
    }
}

async fn details_by_user<C: ConnectionTrait>(
    db: &C,
    ids: impl IntoIterator<Item = i32>,
) -> DaoResult<HashMap<i32, user_detail::Model>> {
    let ids: Vec<i32> = ids.into_iter().collect();
    if ids.is_empty() {
        return Ok(HashMap::new());
    }

    let details = user_detail::Entity::find()
        .filter(user_detail::Column::UserId.is_in(ids))
        .all(db)
        .await?;
    Ok(details.into_iter().map(|d| (d.user_id, d)).collect())
}

async fn with_details<C: ConnectionTrait>(
    db: &C,
    users: Vec<user::Model>,
) -> DaoResult<Vec<UserWithDetail>> {
    let mut details = details_by_user(db, users.iter().map(|u| u.id)).await?;
    Ok(users
        .into_iter()
        .map(|user| {
            let detail = details.remove(&user.id);
            UserWithDetail { user, detail }
        })
        .collect())
}
