//! SQLite implementations of the repository contracts.
//!
//! Embedded engine bound to a local file (or `:memory:` in tests). The
//! observable semantics are identical to the postgres backend; only the
//! parameter-placeholder syntax (`?`) differs.

use async_trait::async_trait;
use sqlx::sqlite::SqlitePool;
use tracing::debug;

use catalog_core::{
    mint_id, Category, CategoryInput, CategoryRepository, Course, CourseInput, CourseRepository,
    StoreError, User, UserRepository,
};

use super::store_err;

/// Creates the catalog tables if they do not exist.
///
/// There is no further migration mechanism; the schema is fixed.
pub(crate) async fn ensure_schema(pool: &SqlitePool) -> Result<(), StoreError> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS categories (id TEXT PRIMARY KEY, name TEXT, description TEXT)",
    )
    .execute(pool)
    .await
    .map_err(store_err)?;
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS courses (id TEXT PRIMARY KEY, name TEXT, description TEXT, category_id TEXT)",
    )
    .execute(pool)
    .await
    .map_err(store_err)?;
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS users (id TEXT PRIMARY KEY, name TEXT, email TEXT, password_hash TEXT)",
    )
    .execute(pool)
    .await
    .map_err(store_err)?;
    Ok(())
}

/// SQLite-backed [`CategoryRepository`].
#[derive(Debug, Clone)]
pub struct SqliteCategoryRepository {
    pool: SqlitePool,
}

impl SqliteCategoryRepository {
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CategoryRepository for SqliteCategoryRepository {
    async fn create(&self, input: CategoryInput) -> Result<Category, StoreError> {
        let id = mint_id();
        sqlx::query("INSERT INTO categories (id, name, description) VALUES (?, ?, ?)")
            .bind(&id)
            .bind(&input.name)
            .bind(&input.description)
            .execute(&self.pool)
            .await
            .map_err(store_err)?;
        debug!(%id, "category created");
        Ok(Category {
            id,
            name: input.name,
            description: input.description,
        })
    }

    async fn find_all(&self) -> Result<Vec<Category>, StoreError> {
        let rows = sqlx::query_as::<_, (String, String, String)>(
            "SELECT id, name, description FROM categories",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(store_err)?;
        Ok(rows
            .into_iter()
            .map(|(id, name, description)| Category {
                id,
                name,
                description,
            })
            .collect())
    }

    async fn find(&self, id: &str) -> Result<Category, StoreError> {
        let (name, description) = sqlx::query_as::<_, (String, String)>(
            "SELECT name, description FROM categories WHERE id = ?",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(store_err)?;
        Ok(Category {
            id: id.to_string(),
            name,
            description,
        })
    }

    async fn find_by_course_id(&self, course_id: &str) -> Result<Category, StoreError> {
        let (id, name, description) = sqlx::query_as::<_, (String, String, String)>(
            "SELECT c.id, c.name, c.description FROM categories c \
             JOIN courses co ON c.id = co.category_id WHERE co.id = ?",
        )
        .bind(course_id)
        .fetch_one(&self.pool)
        .await
        .map_err(store_err)?;
        Ok(Category {
            id,
            name,
            description,
        })
    }

    async fn update(&self, category: &Category) -> Result<(), StoreError> {
        let result = sqlx::query("UPDATE categories SET name = ?, description = ? WHERE id = ?")
            .bind(&category.name)
            .bind(&category.description)
            .bind(&category.id)
            .execute(&self.pool)
            .await
            .map_err(store_err)?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        // Count and delete share one transaction so a course insert
        // cannot interleave between the guard and the deletion.
        let mut tx = self.pool.begin().await.map_err(store_err)?;
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM courses WHERE category_id = ?")
                .bind(id)
                .fetch_one(&mut *tx)
                .await
                .map_err(store_err)?;
        if count > 0 {
            return Err(StoreError::conflict("category has courses"));
        }
        let result = sqlx::query("DELETE FROM categories WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(store_err)?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        tx.commit().await.map_err(store_err)?;
        debug!(%id, "category deleted");
        Ok(())
    }
}

/// SQLite-backed [`CourseRepository`].
#[derive(Debug, Clone)]
pub struct SqliteCourseRepository {
    pool: SqlitePool,
}

impl SqliteCourseRepository {
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CourseRepository for SqliteCourseRepository {
    async fn create(&self, input: CourseInput) -> Result<Course, StoreError> {
        let id = mint_id();
        sqlx::query(
            "INSERT INTO courses (id, name, description, category_id) VALUES (?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(&input.name)
        .bind(&input.description)
        .bind(&input.category_id)
        .execute(&self.pool)
        .await
        .map_err(store_err)?;
        debug!(%id, "course created");
        Ok(Course {
            id,
            name: input.name,
            description: input.description,
            category_id: input.category_id,
        })
    }

    async fn find_all(&self) -> Result<Vec<Course>, StoreError> {
        let rows = sqlx::query_as::<_, (String, String, String, String)>(
            "SELECT id, name, description, category_id FROM courses",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(store_err)?;
        Ok(rows
            .into_iter()
            .map(|(id, name, description, category_id)| Course {
                id,
                name,
                description,
                category_id,
            })
            .collect())
    }

    async fn find(&self, id: &str) -> Result<Course, StoreError> {
        let (name, description, category_id) = sqlx::query_as::<_, (String, String, String)>(
            "SELECT name, description, category_id FROM courses WHERE id = ?",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(store_err)?;
        Ok(Course {
            id: id.to_string(),
            name,
            description,
            category_id,
        })
    }

    async fn find_by_category_id(&self, category_id: &str) -> Result<Vec<Course>, StoreError> {
        let rows = sqlx::query_as::<_, (String, String, String, String)>(
            "SELECT id, name, description, category_id FROM courses WHERE category_id = ?",
        )
        .bind(category_id)
        .fetch_all(&self.pool)
        .await
        .map_err(store_err)?;
        Ok(rows
            .into_iter()
            .map(|(id, name, description, category_id)| Course {
                id,
                name,
                description,
                category_id,
            })
            .collect())
    }

    async fn update(&self, course: &Course) -> Result<(), StoreError> {
        let result = sqlx::query(
            "UPDATE courses SET name = ?, description = ?, category_id = ? WHERE id = ?",
        )
        .bind(&course.name)
        .bind(&course.description)
        .bind(&course.category_id)
        .bind(&course.id)
        .execute(&self.pool)
        .await
        .map_err(store_err)?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM courses WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(store_err)?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}

/// SQLite-backed [`UserRepository`].
#[derive(Debug, Clone)]
pub struct SqliteUserRepository {
    pool: SqlitePool,
}

impl SqliteUserRepository {
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for SqliteUserRepository {
    async fn create(&self, user: &User) -> Result<User, StoreError> {
        sqlx::query("INSERT INTO users (id, name, email, password_hash) VALUES (?, ?, ?, ?)")
            .bind(&user.id)
            .bind(&user.name)
            .bind(&user.email)
            .bind(&user.password_hash)
            .execute(&self.pool)
            .await
            .map_err(store_err)?;
        debug!(id = %user.id, "user created");
        Ok(user.clone())
    }

    async fn find_all(&self) -> Result<Vec<User>, StoreError> {
        let rows = sqlx::query_as::<_, (String, String, String, String)>(
            "SELECT id, name, email, password_hash FROM users",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(store_err)?;
        Ok(rows
            .into_iter()
            .map(|(id, name, email, password_hash)| User {
                id,
                name,
                email,
                password_hash,
            })
            .collect())
    }

    async fn find(&self, id: &str) -> Result<User, StoreError> {
        let (name, email, password_hash) = sqlx::query_as::<_, (String, String, String)>(
            "SELECT name, email, password_hash FROM users WHERE id = ?",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(store_err)?;
        Ok(User {
            id: id.to_string(),
            name,
            email,
            password_hash,
        })
    }

    async fn find_by_email(&self, email: &str) -> Result<User, StoreError> {
        let (id, name, password_hash) = sqlx::query_as::<_, (String, String, String)>(
            "SELECT id, name, password_hash FROM users WHERE email = ?",
        )
        .bind(email)
        .fetch_one(&self.pool)
        .await
        .map_err(store_err)?;
        Ok(User {
            id,
            name,
            email: email.to_string(),
            password_hash,
        })
    }

    async fn update(&self, user: &User) -> Result<(), StoreError> {
        let result = sqlx::query(
            "UPDATE users SET name = ?, email = ?, password_hash = ? WHERE id = ?",
        )
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.id)
        .execute(&self.pool)
        .await
        .map_err(store_err)?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(store_err)?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}
