#[cfg(feature = "cli")]
pub mod cli;

use crate::domain::model::{Credentials, DatabaseEngine};
use crate::utils::error::{AcceleratorError, Result};
use crate::utils::validation::{
    validate_non_empty_string, validate_port, validate_required_field, validate_url, Validate,
};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

pub const ENVIRONMENT_VAR: &str = "ENVIRONMENT";
pub const HOSTNAME_API_VAR: &str = "HOSTNAMEAPI";
pub const USERNAME_VAR: &str = "TESTUSERNAME";
pub const PASSWORD_VAR: &str = "PASSWORD";
pub const DB_ENGINE_VAR: &str = "DB_ENGINE";

const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Dev,
    Test,
}

impl Environment {
    /// Prefix of the per-environment database variables (`DEV_DB_HOST`, ...).
    pub fn variable_prefix(&self) -> &'static str {
        match self {
            Environment::Dev => "DEV",
            Environment::Test => "TEST",
        }
    }

    pub fn resolve<F>(lookup: &F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        validate_required_field(ENVIRONMENT_VAR, non_blank(lookup(ENVIRONMENT_VAR)))?.parse()
    }
}

impl FromStr for Environment {
    type Err = AcceleratorError;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim() {
            "dev" => Ok(Environment::Dev),
            "test" => Ok(Environment::Test),
            other => Err(AcceleratorError::UnknownEnvironment {
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Environment::Dev => f.write_str("dev"),
            Environment::Test => f.write_str("test"),
        }
    }
}

/// Settings for the API under test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub base_url: String,
    pub credentials: Credentials,
}

impl ApiConfig {
    pub fn new(base_url: impl Into<String>, credentials: Credentials) -> Self {
        Self {
            base_url: base_url.into(),
            credentials,
        }
    }

    pub fn resolve<F>(lookup: &F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config = Self {
            base_url: required(lookup, HOSTNAME_API_VAR)?,
            credentials: Credentials::new(
                required(lookup, USERNAME_VAR)?,
                required(lookup, PASSWORD_VAR)?,
            ),
        };
        config.validate()?;
        Ok(config)
    }
}

impl Validate for ApiConfig {
    fn validate(&self) -> Result<()> {
        validate_url(HOSTNAME_API_VAR, &self.base_url)?;
        validate_non_empty_string(USERNAME_VAR, &self.credentials.username)?;
        validate_non_empty_string(PASSWORD_VAR, &self.credentials.password)
    }
}

/// Connection settings for the pooled engines (PostgreSQL, MySQL).
#[derive(Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
    pub acquire_timeout: Duration,
}

impl DatabaseConfig {
    pub fn new(
        host: impl Into<String>,
        port: u16,
        user: impl Into<String>,
        password: impl Into<String>,
        database: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            port,
            user: user.into(),
            password: password.into(),
            database: database.into(),
            acquire_timeout: Duration::from_secs(DEFAULT_ACQUIRE_TIMEOUT_SECS),
        }
    }

    /// How long a query waits for a pooled connection before failing.
    #[must_use]
    pub fn with_acquire_timeout(mut self, timeout: Duration) -> Self {
        self.acquire_timeout = timeout;
        self
    }

    /// Reads `{DEV|TEST}_DB_HOST`, `_PORT`, `_USER`, `_PASSWORD` and `_DATABASE`.
    pub fn resolve<F>(environment: Environment, lookup: &F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let prefix = environment.variable_prefix();
        let port_var = format!("{prefix}_DB_PORT");
        let port = validate_port(&port_var, &required(lookup, &port_var)?)?;

        Ok(Self::new(
            required(lookup, &format!("{prefix}_DB_HOST"))?,
            port,
            required(lookup, &format!("{prefix}_DB_USER"))?,
            required(lookup, &format!("{prefix}_DB_PASSWORD"))?,
            required(lookup, &format!("{prefix}_DB_DATABASE"))?,
        ))
    }
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"***")
            .field("database", &self.database)
            .field("acquire_timeout", &self.acquire_timeout)
            .finish()
    }
}

/// Session settings for Oracle, which takes a single connect string.
#[derive(Clone, PartialEq, Eq)]
pub struct OracleConfig {
    pub user: String,
    pub password: String,
    pub connect_string: String,
}

impl OracleConfig {
    pub fn new(
        user: impl Into<String>,
        password: impl Into<String>,
        connect_string: impl Into<String>,
    ) -> Self {
        Self {
            user: user.into(),
            password: password.into(),
            connect_string: connect_string.into(),
        }
    }

    pub fn resolve<F>(lookup: &F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self::new(
            required(lookup, "ORACLE_DB_USER")?,
            required(lookup, "ORACLE_DB_PASSWORD")?,
            required(lookup, "ORACLE_DB_CONNECTION_STRING")?,
        ))
    }
}

impl fmt::Debug for OracleConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OracleConfig")
            .field("user", &self.user)
            .field("password", &"***")
            .field("connect_string", &self.connect_string)
            .finish()
    }
}

/// Which backend to build, with the settings it needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseSettings {
    Postgres(DatabaseConfig),
    MySql(DatabaseConfig),
    Oracle(OracleConfig),
}

impl DatabaseSettings {
    pub fn engine(&self) -> DatabaseEngine {
        match self {
            DatabaseSettings::Postgres(_) => DatabaseEngine::Postgres,
            DatabaseSettings::MySql(_) => DatabaseEngine::MySql,
            DatabaseSettings::Oracle(_) => DatabaseEngine::Oracle,
        }
    }

    /// Picks the engine from `DB_ENGINE` (default `postgres`) and resolves its settings.
    pub fn resolve<F>(environment: Environment, lookup: &F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let engine = match non_blank(lookup(DB_ENGINE_VAR)) {
            Some(value) => value.parse()?,
            None => DatabaseEngine::Postgres,
        };
        Self::resolve_for(engine, environment, lookup)
    }

    /// Like [`AppConfig::from_env`], but only needs `ENVIRONMENT` and the database variables.
    pub fn from_env() -> Result<Self> {
        load_dotenv();
        let environment = Environment::resolve(&process_lookup)?;
        Self::resolve(environment, &process_lookup)
    }

    pub fn from_dotenv_file(path: impl AsRef<Path>) -> Result<Self> {
        let lookup = dotenv_file_lookup(path)?;
        let environment = Environment::resolve(&lookup)?;
        Self::resolve(environment, &lookup)
    }

    pub fn resolve_for<F>(
        engine: DatabaseEngine,
        environment: Environment,
        lookup: &F,
    ) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        match engine {
            DatabaseEngine::Postgres => Ok(DatabaseSettings::Postgres(DatabaseConfig::resolve(
                environment,
                lookup,
            )?)),
            DatabaseEngine::MySql => Ok(DatabaseSettings::MySql(DatabaseConfig::resolve(
                environment,
                lookup,
            )?)),
            DatabaseEngine::Oracle => Ok(DatabaseSettings::Oracle(OracleConfig::resolve(lookup)?)),
        }
    }
}

/// Everything the HTTP side needs, resolved once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub environment: Environment,
    pub api: ApiConfig,
}

impl AppConfig {
    /// Loads `.env` when present (existing process variables win), then resolves.
    pub fn from_env() -> Result<Self> {
        load_dotenv();
        Self::from_lookup(process_lookup)
    }

    /// Resolves from a specific env file without touching the process environment.
    /// Process variables still take precedence over the file.
    pub fn from_dotenv_file(path: impl AsRef<Path>) -> Result<Self> {
        let lookup = dotenv_file_lookup(path)?;
        Self::from_lookup(lookup)
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = Environment::resolve(&lookup)?;
        let api = ApiConfig::resolve(&lookup)?;
        tracing::debug!(%environment, base_url = %api.base_url, "Resolved API configuration");
        Ok(Self { environment, api })
    }
}

fn load_dotenv() {
    if let Ok(path) = dotenvy::dotenv() {
        tracing::debug!("Loaded environment file {}", path.display());
    }
}

pub fn process_lookup(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Lookup that prefers process variables and falls back to the given env file.
pub fn dotenv_file_lookup(path: impl AsRef<Path>) -> Result<impl Fn(&str) -> Option<String>> {
    let values = read_env_file(path)?;
    Ok(move |key: &str| process_lookup(key).or_else(|| values.get(key).cloned()))
}

/// Parses `KEY=value` lines without touching the process environment.
pub fn read_env_file(path: impl AsRef<Path>) -> Result<HashMap<String, String>> {
    let path = path.as_ref();
    let file_error = |source| AcceleratorError::ConfigFile {
        path: path.display().to_string(),
        source,
    };

    let mut values = HashMap::new();
    for item in dotenvy::from_path_iter(path).map_err(file_error)? {
        let (key, value) = item.map_err(file_error)?;
        values.insert(key, value);
    }
    Ok(values)
}

fn required<F>(lookup: &F, key: &str) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    validate_required_field(key, non_blank(lookup(key)))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
