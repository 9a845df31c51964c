//! Shared test infrastructure for the workspace crates
//!
//! - `TestDatabase`: in-memory SQLite with the application migrations applied
//! - `TestDataBuilder`: deterministic test data derived from the test name
//! - `assertions`: assertion helpers
//!
//! ```rust,no_run
//! use test_utils::{TestDatabase, TestDataBuilder};
//!
//! #[tokio::test]
//! async fn creates_user() {
//!     let db = TestDatabase::new().await;
//!     let data = TestDataBuilder::from_test_name("creates_user");
//!
//!     let email = data.email("attendee");
//! }
//! ```

mod sqlite;

pub use sqlite::TestDatabase;

/// Builder for test data with deterministic randomization
///
/// Tests sharing a database stay independent because every value embeds the seed.
#[derive(Debug, Clone, Copy)]
pub struct TestDataBuilder {
    seed: u64,
}

impl TestDataBuilder {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    /// Seeds the builder from the test name, so reruns produce the same data.
    pub fn from_test_name(name: &str) -> Self {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let mut hasher = DefaultHasher::new();
        name.hash(&mut hasher);
        Self::new(hasher.finish())
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// e.g. `attendee.1234@example.com`
    pub fn email(&self, label: &str) -> String {
        format!("{label}.{}@example.com", self.seed % 1_000_000)
    }

    /// e.g. `test-event-type-1234-main`
    pub fn name(&self, prefix: &str, suffix: &str) -> String {
        format!("test-{prefix}-{}-{suffix}", self.seed % 1_000_000)
    }
}

/// Test assertion helpers
pub mod assertions {
    use std::fmt::Debug;

    /// Asserts that `result` failed and returns the error
    pub fn assert_err<T: Debug, E>(result: Result<T, E>, context: &str) -> E {
        match result {
            Ok(value) => panic!("{context}: expected an error, got Ok({value:?})"),
            Err(err) => err,
        }
    }

    pub fn assert_some<T>(value: Option<T>, context: &str) -> T {
        value.unwrap_or_else(|| panic!("{context}: expected Some, got None"))
    }
}
