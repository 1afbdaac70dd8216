//! Catalog entities and their creation-time inputs.
//!
//! [`Category`] and [`Course`] are plain records; only [`User`] carries
//! construction-time validation. Identifiers are always server-minted
//! UUID v4 strings — inputs deliberately have no id field, so a caller
//! can never smuggle its own identifier into a create path.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;

/// Lowercase local part, lowercase domain, 2-4 letter top-level label.
static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-z0-9._%+\-]+@[a-z0-9.\-]+\.[a-z]{2,4}$")
        .expect("email pattern is a valid regex")
});

/// Mints a fresh 128-bit random identifier in textual form.
///
/// Collisions are not checked; the identifier's entropy makes the risk
/// negligible.
#[must_use]
pub fn mint_id() -> String {
    Uuid::new_v4().to_string()
}

/// A catalog category. Referenced by [`Course::category_id`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Opaque unique identifier, server-generated.
    pub id: String,
    pub name: String,
    pub description: String,
}

/// Creation input for a [`Category`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryInput {
    pub name: String,
    pub description: String,
}

/// A catalog course, referencing its category by id.
///
/// `category_id` is not validated against existing categories at write
/// time; the only referential rule is the delete guard on the category
/// side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    /// Opaque unique identifier, server-generated.
    pub id: String,
    pub name: String,
    pub description: String,
    pub category_id: String,
}

/// Creation input for a [`Course`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseInput {
    pub name: String,
    pub description: String,
    pub category_id: String,
}

/// Creation input for a [`User`]. Carries the plaintext password; the
/// hash is computed by [`User::new`] before anything is persisted.
#[derive(Debug, Clone, Deserialize)]
pub struct UserInput {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// A registered user.
///
/// The stored hash never leaves the process: it is skipped on
/// serialization and only consulted through
/// [`validate_password`](User::validate_password).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Opaque unique identifier, server-generated.
    pub id: String,
    pub name: String,
    /// Syntactically valid, intended-unique but not enforced by storage.
    pub email: String,
    /// Opaque bcrypt hash, never serialized outward.
    #[serde(skip_serializing, default)]
    pub password_hash: String,
}

impl User {
    /// Validates the input and builds a user with a freshly hashed
    /// password and a newly minted identifier.
    ///
    /// Validation order is significant: empty password first, then empty
    /// name, then malformed email. Each failure names exactly the first
    /// violated rule.
    ///
    /// # Errors
    ///
    /// Returns the first violated [`ValidationError`] in the order above.
    pub fn new(name: &str, email: &str, password: &str) -> Result<Self, ValidationError> {
        if password.is_empty() {
            return Err(ValidationError::InvalidPassword);
        }
        if name.is_empty() {
            return Err(ValidationError::InvalidName);
        }
        if email.is_empty() || !EMAIL_REGEX.is_match(email) {
            return Err(ValidationError::InvalidEmail);
        }
        let hash = bcrypt::hash(password, bcrypt::DEFAULT_COST)
            .map_err(|_| ValidationError::InvalidPassword)?;
        Ok(Self {
            id: mint_id(),
            name: name.to_string(),
            email: email.to_string(),
            password_hash: hash,
        })
    }

    /// Compares `candidate` against the stored hash.
    ///
    /// Uses bcrypt's built-in comparison, which is constant-time with
    /// respect to the candidate's content. Returns a boolean only —
    /// never why the comparison failed.
    #[must_use]
    pub fn validate_password(&self, candidate: &str) -> bool {
        bcrypt::verify(candidate, &self.password_hash).unwrap_or(false)
    }
}

impl TryFrom<UserInput> for User {
    type Error = ValidationError;

    /// Validates a registration payload and builds the stored record.
    /// Same rules and ordering as [`User::new`].
    fn try_from(input: UserInput) -> Result<Self, ValidationError> {
        Self::new(&input.name, &input.email, &input.password)
    }
}
