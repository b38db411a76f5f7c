//! Database backends behind the [`DatabaseClient`] port.
//!
//! | engine     | handle          | `connect`             | placeholders |
//! |------------|-----------------|-----------------------|--------------|
//! | PostgreSQL | lazy `PgPool`   | acquires one to verify| `$1`         |
//! | MySQL      | lazy `MySqlPool`| no-op                 | `?`          |
//! | Oracle     | single session  | opens and holds it    | `:1`         |

pub mod mysql;
#[cfg(feature = "oracle")]
pub mod oracle;
pub mod postgres;

pub use mysql::MySqlClient;
#[cfg(feature = "oracle")]
pub use oracle::OracleClient;
pub use postgres::PostgresClient;

use crate::config::DatabaseSettings;
use crate::domain::model::DatabaseEngine;
use crate::domain::ports::DatabaseClient;
use crate::utils::error::{AcceleratorError, BoxError, Result};

/// Builds the backend selected by configuration.
///
/// Pooled backends connect lazily, so this must run inside a tokio runtime.
pub fn create_client(settings: &DatabaseSettings) -> Result<Box<dyn DatabaseClient>> {
    tracing::debug!(engine = %settings.engine(), "Creating database client");
    match settings {
        DatabaseSettings::Postgres(config) => Ok(Box::new(PostgresClient::new(config))),
        DatabaseSettings::MySql(config) => Ok(Box::new(MySqlClient::new(config))),
        #[cfg(feature = "oracle")]
        DatabaseSettings::Oracle(config) => Ok(Box::new(OracleClient::new(config.clone()))),
        #[cfg(not(feature = "oracle"))]
        DatabaseSettings::Oracle(_) => Err(AcceleratorError::InvalidConfigValue {
            field: crate::config::DB_ENGINE_VAR.to_string(),
            value: DatabaseEngine::Oracle.to_string(),
            reason: "this build does not include the `oracle` feature".to_string(),
        }),
    }
}

pub(crate) fn query_failed(
    engine: DatabaseEngine,
    source: impl Into<BoxError>,
) -> AcceleratorError {
    let source = source.into();
    tracing::error!(%engine, "Query failed: {}", source);
    AcceleratorError::QueryExecutionFailed { engine, source }
}

pub(crate) fn connection_failed(
    engine: DatabaseEngine,
    source: impl Into<BoxError>,
) -> AcceleratorError {
    let source = source.into();
    tracing::error!(%engine, "Connection failed: {}", source);
    AcceleratorError::ConnectionFailed { engine, source }
}
