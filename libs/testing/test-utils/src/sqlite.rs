//! In-memory SQLite test infrastructure
//!
//! Each `TestDatabase` owns a private database that disappears when the last
//! connection closes. The pool is pinned to one long-lived connection because
//! every new SQLite `:memory:` connection would otherwise see an empty database.

use migration::{Migrator, MigratorTrait};
use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseConnection, EntityTrait, Schema, Statement,
};
use std::time::Duration;

pub struct TestDatabase {
    pub connection: DatabaseConnection,
}

impl TestDatabase {
    /// A fresh database with every application migration applied
    ///
    /// ```no_run
    /// use test_utils::TestDatabase;
    ///
    /// # async fn example() {
    /// let db = TestDatabase::new().await;
    /// let conn = db.connection();
    /// # }
    /// ```
    pub async fn new() -> Self {
        let db = Self::empty().await;
        Migrator::up(&db.connection, None)
            .await
            .expect("Failed to run migrations on test database");
        db
    }

    /// A fresh database without any tables
    pub async fn empty() -> Self {
        let mut options = ConnectOptions::new("sqlite::memory:");
        options
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(Duration::from_secs(3600))
            .max_lifetime(Duration::from_secs(3600))
            .sqlx_logging(false);

        let connection = Database::connect(options)
            .await
            .expect("Failed to open in-memory SQLite database");

        connection
            .execute_unprepared("PRAGMA foreign_keys = ON")
            .await
            .expect("Failed to enable foreign keys");

        tracing::debug!("Opened in-memory test database");
        Self { connection }
    }

    /// Creates the table for `entity` straight from its SeaORM definition.
    pub async fn create_table<E: EntityTrait>(&self, entity: E) {
        let backend = self.connection.get_database_backend();
        let statement = Schema::new(backend).create_table_from_entity(entity);
        self.connection
            .execute(backend.build(&statement))
            .await
            .expect("Failed to create test table");
    }

    /// Inserts a bare account row (no detail record) and returns its id.
    pub async fn insert_user(&self, email: &str, is_admin: bool) -> i32 {
        let backend = self.connection.get_database_backend();
        let row = self
            .connection
            .query_one(Statement::from_sql_and_values(
                backend,
                "INSERT INTO users (email, password_hash, is_admin) VALUES ($1, 'not-a-hash', $2) RETURNING id",
                [email.into(), is_admin.into()],
            ))
            .await
            .expect("Failed to insert test user")
            .expect("INSERT ... RETURNING yielded no row");
        row.try_get::<i32>("", "id").expect("Inserted user has no id")
    }

    /// Inserts a two-hour UTC event without location or type and returns its id.
    pub async fn insert_event(&self, name: &str) -> i32 {
        let backend = self.connection.get_database_backend();
        let row = self
            .connection
            .query_one(Statement::from_sql_and_values(
                backend,
                "INSERT INTO events (name, starts_at, ends_at, timezone) \
                 VALUES ($1, '2024-01-15 18:00:00', '2024-01-15 20:00:00', 'UTC') RETURNING id",
                [name.into()],
            ))
            .await
            .expect("Failed to insert test event")
            .expect("INSERT ... RETURNING yielded no row");
        row.try_get::<i32>("", "id").expect("Inserted event has no id")
    }

    pub fn connection(&self) -> DatabaseConnection {
        self.connection.clone()
    }
}
