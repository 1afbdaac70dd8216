//! Catalog Core — entities, validation, error taxonomy, and repository contracts.

pub mod entity;
pub mod error;
pub mod repository;

pub use entity::{mint_id, Category, CategoryInput, Course, CourseInput, User, UserInput};
pub use error::{StoreError, ValidationError};
pub use repository::{CategoryRepository, CourseRepository, UserRepository};

#[cfg(test)]
mod tests {
    #[test]
    fn crate_loads() {
        // Empty body: if this test runs, the crate compiles and loads.
    }
}
