//! Interchangeable persistence backends for the catalog.
//!
//! Each backend module supplies one concrete implementation per
//! repository contract, bound to a single shared connection pool:
//!
//! - [`sqlite`] — embedded engine, `?` placeholders
//! - [`postgres`] — networked engine, `$1` placeholders
//!
//! [`backend`] selects one of them from configuration at startup and
//! hands out the bundle.

pub mod backend;
pub mod postgres;
pub mod sqlite;

pub use backend::Backend;

use catalog_core::StoreError;

/// Normalizes engine errors into the closed store-error taxonomy.
///
/// A missing row maps to [`StoreError::NotFound`]; everything else is
/// engine-caused and surfaces as [`StoreError::Internal`].
pub(crate) fn store_err(err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::RowNotFound => StoreError::NotFound,
        other => StoreError::Internal(other.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_not_found_maps_to_not_found() {
        assert!(matches!(
            store_err(sqlx::Error::RowNotFound),
            StoreError::NotFound
        ));
    }

    #[test]
    fn other_engine_errors_map_to_internal() {
        let err = store_err(sqlx::Error::PoolClosed);
        assert!(matches!(err, StoreError::Internal(_)));
    }
}
