//! Credential subsystem shared by every transport binding.
//!
//! Password hashing and verification live on the `User` entity
//! (`catalog-core`); this module adds bearer-token issuance and the
//! authentication flow that ties both to the user repository.

pub mod token;

pub use token::{Claims, TokenIssuer};

use std::sync::Arc;

use tracing::debug;

use catalog_core::{StoreError, UserRepository};

/// Authenticates credentials and issues bearer tokens.
///
/// One instance is constructed at startup against the shared user
/// repository and reused by every binding's authentication flow.
pub struct Authenticator {
    users: Arc<dyn UserRepository>,
    issuer: TokenIssuer,
}

impl Authenticator {
    #[must_use]
    pub fn new(users: Arc<dyn UserRepository>, issuer: TokenIssuer) -> Self {
        Self { users, issuer }
    }

    /// Verifies `password` for the user stored under `email` and issues
    /// a bearer token for that subject.
    ///
    /// # Errors
    ///
    /// [`StoreError::Unauthorized`] for an unknown email and for a wrong
    /// password — deliberately the same outward signal, so the response
    /// never reveals whether the account exists. Any other store failure
    /// propagates unchanged.
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<String, StoreError> {
        let user = match self.users.find_by_email(email).await {
            Ok(user) => user,
            Err(StoreError::NotFound) => {
                debug!("authentication failed: unknown subject");
                return Err(StoreError::Unauthorized);
            }
            Err(err) => return Err(err),
        };
        if !user.validate_password(password) {
            debug!("authentication failed: password mismatch");
            return Err(StoreError::Unauthorized);
        }
        self.issuer.issue(&user.email)
    }

    /// Verifies a previously issued token, returning its claims.
    ///
    /// # Errors
    ///
    /// [`StoreError::Unauthorized`] for any invalid or expired token.
    pub fn verify(&self, token: &str) -> Result<Claims, StoreError> {
        self.issuer.verify(token)
    }
}
