use argon2::{
    Argon2,
    password_hash::{PasswordHasher, SaltString, rand_core::OsRng},
};
use chrono::{DateTime, FixedOffset, Utc};
use database::dao::{CreateSchema, DaoError, DaoResult, UpdateSchema};
use sea_orm::ActiveValue::Set;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::entity::{user, user_detail};

/// Body of `POST /users`
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateUser {
    #[validate(
        required(message = "is required"),
        email(message = "must be a valid email address")
    )]
    #[schema(value_type = String)]
    pub email: Option<String>,
    #[validate(
        required(message = "is required"),
        length(min = 1, message = "must not be empty")
    )]
    #[schema(value_type = String, format = Password)]
    pub password: Option<String>,
}

impl CreateSchema<user::ActiveModel> for CreateUser {
    fn into_active_model(self) -> DaoResult<user::ActiveModel> {
        let password_hash = hash_password(self.password.as_deref().unwrap_or_default())?;
        Ok(user::ActiveModel {
            email: Set(self.email.unwrap_or_default()),
            password_hash: Set(password_hash),
            is_admin: Set(false),
            is_super_admin: Set(false),
            signup_time: Set(Utc::now().fixed_offset()),
            last_access_time: Set(None),
            ..Default::default()
        })
    }
}

fn hash_password(password: &str) -> DaoResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| DaoError::Internal(format!("password hashing failed: {e}")))
}

/// Top-level fields of `PUT /users/{id}`; `user_detail` is split off before parsing
///
/// `id`, `signup_time` and `last_access_time` are read-only and ignored.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateUser {
    #[validate(email(message = "must be a valid email address"))]
    pub email: Option<String>,
}

impl UpdateSchema<user::ActiveModel> for UpdateUser {
    fn apply(self, model: &mut user::ActiveModel) {
        if let Some(email) = self.email {
            model.email = Set(email);
        }
    }
}

/// The empty detail row created alongside every user
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserDetail {
    pub user_id: i32,
}

impl CreateSchema<user_detail::ActiveModel> for CreateUserDetail {
    fn into_active_model(self) -> DaoResult<user_detail::ActiveModel> {
        Ok(user_detail::ActiveModel {
            user_id: Set(self.user_id),
            firstname: Set(None),
            lastname: Set(None),
            details: Set(None),
            avatar: Set(None),
            contact: Set(None),
            facebook: Set(None),
            twitter: Set(None),
            ..Default::default()
        })
    }
}

/// Nested `user_detail` object of `PUT /users/{id}`
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateUserDetail {
    #[validate(length(max = 255, message = "must be at most 255 characters"))]
    pub firstname: Option<String>,
    #[validate(length(max = 255, message = "must be at most 255 characters"))]
    pub lastname: Option<String>,
    pub details: Option<String>,
    #[validate(url(message = "must be a valid URL"))]
    pub avatar: Option<String>,
    #[validate(length(max = 255, message = "must be at most 255 characters"))]
    pub contact: Option<String>,
    #[validate(url(message = "must be a valid URL"))]
    pub facebook: Option<String>,
    #[validate(url(message = "must be a valid URL"))]
    pub twitter: Option<String>,
}

impl UpdateSchema<user_detail::ActiveModel> for UpdateUserDetail {
    fn apply(self, model: &mut user_detail::ActiveModel) {
        let fields = [
            (self.firstname, &mut model.firstname),
            (self.lastname, &mut model.lastname),
            (self.details, &mut model.details),
            (self.avatar, &mut model.avatar),
            (self.contact, &mut model.contact),
            (self.facebook, &mut model.facebook),
            (self.twitter, &mut model.twitter),
        ];
        for (value, column) in fields {
            if let Some(value) = value {
                *column = Set(Some(value));
            }
        }
    }
}

/// Documented shape of `PUT /users/{id}`
#[derive(ToSchema)]
pub struct UserPut {
    pub email: Option<String>,
    pub user_detail: Option<UpdateUserDetail>,
}

/// A user paired with its detail row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserWithDetail {
    pub user: user::Model,
    pub detail: Option<user_detail::Model>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UserDetailResponse {
    pub firstname: Option<String>,
    pub lastname: Option<String>,
    pub details: Option<String>,
    pub avatar: Option<String>,
    pub contact: Option<String>,
    pub facebook: Option<String>,
    pub twitter: Option<String>,
}

impl From<user_detail::Model> for UserDetailResponse {
    fn from(detail: user_detail::Model) -> Self {
        Self {
            firstname: detail.firstname,
            lastname: detail.lastname,
            details: detail.details,
            avatar: detail.avatar,
            contact: detail.contact,
            facebook: detail.facebook,
            twitter: detail.twitter,
        }
    }
}

/// User as returned by the API; the password hash is never serialized
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub id: i32,
    pub email: String,
    pub signup_time: DateTime<FixedOffset>,
    pub last_access_time: Option<DateTime<FixedOffset>>,
    pub user_detail: UserDetailResponse,
}

impl From<UserWithDetail> for UserResponse {
    fn from(UserWithDetail { user, detail }: UserWithDetail) -> Self {
        Self {
            id: user.id,
            email: user.email,
            signup_time: user.signup_time,
            last_access_time: user.last_access_time,
            user_detail: detail.map(Into::into).unwrap_or_default(),
        }
    }
}
