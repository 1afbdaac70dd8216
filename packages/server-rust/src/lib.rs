//! Catalog Server — interchangeable storage backends, streaming Category
//! ingestion, and the credential subsystem shared by all transport bindings.

pub mod auth;
pub mod config;
pub mod shutdown;
pub mod storage;
pub mod streaming;

pub use auth::{Authenticator, TokenIssuer};
pub use config::{AuthConfig, ConfigError, DatabaseConfig, Driver, ServerConfig};
pub use shutdown::{HealthState, ShutdownController};
pub use storage::Backend;
pub use streaming::IngestPipeline;

#[cfg(test)]
mod tests {
    #[test]
    fn crate_loads() {
        // Empty body: if this test runs, the crate compiles and loads.
    }
}
