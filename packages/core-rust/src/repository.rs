//! Storage-engine-agnostic repository contracts, one per entity.
//!
//! Each contract exposes the fixed capability set (create, find-all,
//! find, update, delete) plus entity-specific lookups. At least two
//! concrete backends satisfy each contract with identical observable
//! semantics; only parameter-placeholder syntax differs internally.
//!
//! Used as `Arc<dyn …Repository>` so identical business logic runs
//! unmodified against interchangeable persistence engines.

use async_trait::async_trait;

use crate::entity::{Category, CategoryInput, Course, CourseInput, User};
use crate::error::StoreError;

/// Persistence contract for [`Category`] records.
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    /// Persists a new category under a freshly minted identifier.
    async fn create(&self, input: CategoryInput) -> Result<Category, StoreError>;

    /// Returns every stored category.
    async fn find_all(&self) -> Result<Vec<Category>, StoreError>;

    /// Looks up one category by id.
    ///
    /// # Errors
    ///
    /// [`StoreError::NotFound`] if no category has that id.
    async fn find(&self, id: &str) -> Result<Category, StoreError>;

    /// Looks up the category referenced by the given course.
    async fn find_by_course_id(&self, course_id: &str) -> Result<Category, StoreError>;

    /// Full-record replace; no partial-patch semantics.
    ///
    /// # Errors
    ///
    /// [`StoreError::NotFound`] if no row was updated.
    async fn update(&self, category: &Category) -> Result<(), StoreError>;

    /// Deletes a category with no dependent courses.
    ///
    /// The dependent-course count and the deletion run inside one
    /// transaction, so a course insert cannot interleave between them.
    ///
    /// # Errors
    ///
    /// [`StoreError::Conflict`] if at least one course references the
    /// category (nothing is deleted); [`StoreError::NotFound`] if the
    /// category does not exist.
    async fn delete(&self, id: &str) -> Result<(), StoreError>;
}

/// Persistence contract for [`Course`] records.
#[async_trait]
pub trait CourseRepository: Send + Sync {
    /// Persists a new course under a freshly minted identifier.
    async fn create(&self, input: CourseInput) -> Result<Course, StoreError>;

    /// Returns every stored course.
    async fn find_all(&self) -> Result<Vec<Course>, StoreError>;

    /// Looks up one course by id.
    async fn find(&self, id: &str) -> Result<Course, StoreError>;

    /// Returns every course referencing the given category.
    async fn find_by_category_id(&self, category_id: &str) -> Result<Vec<Course>, StoreError>;

    /// Full-record replace; no partial-patch semantics.
    async fn update(&self, course: &Course) -> Result<(), StoreError>;

    /// Deletes one course by id.
    async fn delete(&self, id: &str) -> Result<(), StoreError>;
}

/// Persistence contract for [`User`] records.
///
/// Takes fully constructed users: the password hash is computed by
/// [`User::new`] before the repository is involved, so no plaintext
/// ever reaches a backend.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Persists the given user, returning the stored record.
    async fn create(&self, user: &User) -> Result<User, StoreError>;

    /// Returns every stored user.
    async fn find_all(&self) -> Result<Vec<User>, StoreError>;

    /// Looks up one user by id.
    async fn find(&self, id: &str) -> Result<User, StoreError>;

    /// Looks up the stored credential record by email.
    ///
    /// # Errors
    ///
    /// [`StoreError::NotFound`] if no user has that email. Callers in
    /// the credential flow must collapse this into
    /// [`StoreError::Unauthorized`] before it leaves the process.
    async fn find_by_email(&self, email: &str) -> Result<User, StoreError>;

    /// Full-record replace; no partial-patch semantics.
    async fn update(&self, user: &User) -> Result<(), StoreError>;

    /// Deletes one user by id.
    async fn delete(&self, id: &str) -> Result<(), StoreError>;
}
