//! Error taxonomy shared by every storage backend and transport binding.
//!
//! Two distinct families: [`ValidationError`] for rules checked before any
//! persistence attempt, and [`StoreError`] for everything the storage layer
//! can report. Store errors form a closed taxonomy so bindings can map them
//! to wire-level statuses without inspecting engine-specific message text.

/// Entity validation failure, detected before any persistence attempt.
///
/// Always local and recoverable; maps to a client-fault signal at the
/// transport boundary. Each variant names exactly the first violated rule.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ValidationError {
    /// The password is empty.
    #[error("invalid password")]
    InvalidPassword,
    /// The name is empty.
    #[error("invalid name")]
    InvalidName,
    /// The email is empty or not syntactically valid.
    #[error("invalid email")]
    InvalidEmail,
}

/// Storage-layer failure, normalized across backends.
///
/// Every repository implementation converts its engine's native errors
/// into one of these variants; callers never see engine-specific text
/// except through the opaque [`Internal`](StoreError::Internal) cause.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The requested record does not exist.
    #[error("record not found")]
    NotFound,
    /// The operation conflicts with existing records.
    #[error("conflict: {reason}")]
    Conflict {
        /// Human-readable description of the conflicting state.
        reason: String,
    },
    /// Credential check failed. Deliberately carries no detail: unknown
    /// subject and wrong password produce this exact same value.
    #[error("invalid credentials")]
    Unauthorized,
    /// Engine-caused failure: connectivity, malformed input at the
    /// boundary, or anything else outside the closed taxonomy.
    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl StoreError {
    /// Builds a [`Conflict`](StoreError::Conflict) with the given reason.
    #[must_use]
    pub fn conflict(reason: impl Into<String>) -> Self {
        Self::Conflict {
            reason: reason.into(),
        }
    }

    /// Builds an [`Internal`](StoreError::Internal) from a message.
    #[must_use]
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(anyhow::anyhow!(msg.into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_name_the_violated_rule() {
        assert_eq!(ValidationError::InvalidPassword.to_string(), "invalid password");
        assert_eq!(ValidationError::InvalidName.to_string(), "invalid name");
        assert_eq!(ValidationError::InvalidEmail.to_string(), "invalid email");
    }

    #[test]
    fn unauthorized_carries_no_detail() {
        // Unknown email and wrong password must be indistinguishable.
        assert_eq!(StoreError::Unauthorized.to_string(), "invalid credentials");
    }

    #[test]
    fn conflict_includes_reason() {
        let err = StoreError::conflict("category has courses");
        assert_eq!(err.to_string(), "conflict: category has courses");
    }

    #[test]
    fn internal_wraps_arbitrary_causes() {
        let err: StoreError = anyhow::anyhow!("connection refused").into();
        assert!(matches!(err, StoreError::Internal(_)));
        assert!(err.to_string().contains("connection refused"));
    }
}
