//! Persistence layer: connection management plus the generic resource DAO
//!
//! The [`dao`] module is the heart of the crate. Every API resource is backed by a
//! [`dao::ResourceDao`] parameterized by a SeaORM entity and the two schemas that
//! describe its create and update payloads. Nested sub-resources (a user and its
//! detail row, for example) are updated atomically through [`dao::SubResource`].
//!
//! # Features
//!
//! - `config` (default) - `core_config::FromEnv` support for [`postgres::PostgresConfig`]
//!   and [`dao::PageBounds`]
//!
//! # Example
//!
//! ```ignore
//! use database::postgres;
//! use migration::Migrator;
//!
//! let db = postgres::connect_with_retry(&database_url, None).await?;
//! postgres::run_migrations::<Migrator>(&db, "eventyay_api").await?;
//! ```

pub mod common;
pub mod dao;
pub mod postgres;

pub use common::{DatabaseError, DatabaseResult};
pub use dao::{
    CreateSchema, DaoError, DaoResult, FieldErrors, Page, PageBounds, PageRequest, PageResult,
    ResourceDao, SubResource, UpdateSchema,
};
