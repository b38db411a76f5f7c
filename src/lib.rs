pub mod adapters;
pub mod config;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::{CliConfig, Command};
pub use config::{ApiConfig, AppConfig, DatabaseConfig, DatabaseSettings, Environment, OracleConfig};

#[cfg(feature = "oracle")]
pub use adapters::database::OracleClient;
pub use adapters::database::{create_client, MySqlClient, PostgresClient};
pub use adapters::http::{BaseClient, StoreApiClient};
pub use domain::model::{Credentials, DatabaseEngine, HttpOutcome, ListQuery, QueryResult, Record};
pub use domain::ports::DatabaseClient;
pub use utils::error::{AcceleratorError, Result};
