//! Backend selection and the shared repository bundle.
//!
//! [`Backend::connect`] reads the database configuration exactly once,
//! opens one connection pool for the selected driver, and constructs one
//! concrete implementation per repository contract bound to that pool.
//! Process wiring calls it a single time at startup and passes the
//! resulting handle into every component that needs persistence — there
//! is deliberately no process-global singleton, and never one bundle per
//! request.
//!
//! An unrecognized driver selector never reaches this module: it fails
//! fast during configuration parsing ([`Driver::from_str`]).

use std::sync::Arc;

use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use tracing::info;

use catalog_core::{CategoryRepository, CourseRepository, StoreError, UserRepository};

use crate::config::{DatabaseConfig, Driver};
use crate::storage::{postgres, sqlite};

use super::store_err;

const DEFAULT_POOL_SIZE: u32 = 5;

/// The shared pool, kept only for lifecycle control.
enum PoolHandle {
    Sqlite(SqlitePool),
    Postgres(PgPool),
}

/// One set of repository implementations bound to one active storage
/// engine and one shared connection pool.
pub struct Backend {
    driver: Driver,
    pool: PoolHandle,
    pub categories: Arc<dyn CategoryRepository>,
    pub courses: Arc<dyn CourseRepository>,
    pub users: Arc<dyn UserRepository>,
}

impl Backend {
    /// Opens the pool for the configured driver, auto-creates the schema
    /// if absent, and constructs the full repository bundle.
    ///
    /// Called once at process start; every transport binding shares the
    /// returned handle.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Internal`] when the engine cannot be
    /// reached or the schema cannot be created.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, StoreError> {
        let backend = match config.driver {
            Driver::Sqlite => {
                // An in-memory sqlite database exists per connection, so
                // the pool must never open a second one.
                let max = if config.is_in_memory() { 1 } else { DEFAULT_POOL_SIZE };
                let pool = SqlitePoolOptions::new()
                    .max_connections(max)
                    .connect(&config.url())
                    .await
                    .map_err(store_err)?;
                sqlite::ensure_schema(&pool).await?;
                Self {
                    driver: Driver::Sqlite,
                    categories: Arc::new(sqlite::SqliteCategoryRepository::new(pool.clone())),
                    courses: Arc::new(sqlite::SqliteCourseRepository::new(pool.clone())),
                    users: Arc::new(sqlite::SqliteUserRepository::new(pool.clone())),
                    pool: PoolHandle::Sqlite(pool),
                }
            }
            Driver::Postgres => {
                let pool = PgPoolOptions::new()
                    .max_connections(DEFAULT_POOL_SIZE)
                    .connect(&config.url())
                    .await
                    .map_err(store_err)?;
                postgres::ensure_schema(&pool).await?;
                Self {
                    driver: Driver::Postgres,
                    categories: Arc::new(postgres::PgCategoryRepository::new(pool.clone())),
                    courses: Arc::new(postgres::PgCourseRepository::new(pool.clone())),
                    users: Arc::new(postgres::PgUserRepository::new(pool.clone())),
                    pool: PoolHandle::Postgres(pool),
                }
            }
        };
        info!(driver = backend.driver.as_str(), "storage backend connected");
        Ok(backend)
    }

    /// The driver this bundle was constructed for.
    #[must_use]
    pub fn driver(&self) -> Driver {
        self.driver
    }

    /// Closes the shared pool, waiting for checked-out connections.
    pub async fn close(&self) {
        match &self.pool {
            PoolHandle::Sqlite(pool) => pool.close().await,
            PoolHandle::Postgres(pool) => pool.close().await,
        }
    }
}
