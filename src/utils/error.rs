use crate::domain::model::DatabaseEngine;
use reqwest::Method;
use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Error, Debug)]
pub enum AcceleratorError {
    #[error("Missing required configuration: {field}")]
    ConfigurationMissing { field: String },

    #[error("No configuration found for environment: {value}")]
    UnknownEnvironment { value: String },

    #[error("Invalid value for {field} ('{value}'): {reason}")]
    InvalidConfigValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Failed to read environment file {path}: {source}")]
    ConfigFile {
        path: String,
        #[source]
        source: dotenvy::Error,
    },

    #[error("Failed to establish a connection to the {engine} database: {source}")]
    ConnectionFailed {
        engine: DatabaseEngine,
        #[source]
        source: BoxError,
    },

    #[error("No active {engine} database connection found")]
    ConnectionNotFound { engine: DatabaseEngine },

    #[error("An error occurred while executing the {engine} query: {source}")]
    QueryExecutionFailed {
        engine: DatabaseEngine,
        #[source]
        source: BoxError,
    },

    #[error("Error disconnecting from the {engine} database: {source}")]
    DisconnectionFailed {
        engine: DatabaseEngine,
        #[source]
        source: BoxError,
    },

    #[error("No response from {method} {url}: {source}")]
    NetworkUnreachable {
        method: Method,
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Invalid header '{name}': {reason}")]
    InvalidHeader { name: String, reason: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("{context}: {source}")]
    Request {
        context: String,
        #[source]
        source: Box<AcceleratorError>,
    },
}

pub type Result<T> = std::result::Result<T, AcceleratorError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Database,
    Network,
    Data,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl AcceleratorError {
    /// Wraps `self` with caller context, e.g. the resource and id being fetched.
    pub fn context(self, context: impl Into<String>) -> Self {
        AcceleratorError::Request {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// The innermost error once all `Request` context layers are peeled off.
    pub fn root(&self) -> &AcceleratorError {
        match self {
            AcceleratorError::Request { source, .. } => source.root(),
            other => other,
        }
    }

    pub fn is_network_failure(&self) -> bool {
        matches!(self.root(), AcceleratorError::NetworkUnreachable { .. })
    }

    pub fn category(&self) -> ErrorCategory {
        match self.root() {
            AcceleratorError::ConfigurationMissing { .. }
            | AcceleratorError::UnknownEnvironment { .. }
            | AcceleratorError::InvalidConfigValue { .. }
            | AcceleratorError::ConfigFile { .. } => ErrorCategory::Configuration,
            AcceleratorError::ConnectionFailed { .. }
            | AcceleratorError::ConnectionNotFound { .. }
            | AcceleratorError::QueryExecutionFailed { .. }
            | AcceleratorError::DisconnectionFailed { .. } => ErrorCategory::Database,
            AcceleratorError::NetworkUnreachable { .. } => ErrorCategory::Network,
            AcceleratorError::InvalidHeader { .. }
            | AcceleratorError::Serialization(_)
            | AcceleratorError::Request { .. } => ErrorCategory::Data,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Configuration => ErrorSeverity::Critical,
            ErrorCategory::Database | ErrorCategory::Network => ErrorSeverity::High,
            ErrorCategory::Data => ErrorSeverity::Medium,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.root() {
            AcceleratorError::ConfigurationMissing { field } => {
                format!("{field} must be defined in the environment variables.")
            }
            AcceleratorError::UnknownEnvironment { value } => {
                format!("No configuration found for environment: {value}")
            }
            AcceleratorError::ConnectionNotFound { .. } => {
                "No active database connection found.".to_string()
            }
            AcceleratorError::NetworkUnreachable { method, url, .. } => {
                format!("The API did not respond to {method} {url}.")
            }
            _ => self.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.root() {
            AcceleratorError::ConfigurationMissing { .. }
            | AcceleratorError::UnknownEnvironment { .. } => {
                "Set ENVIRONMENT to 'dev' or 'test' and export its variables (or use .env)"
            }
            AcceleratorError::InvalidConfigValue { .. } => {
                "Correct the reported variable; URLs need http(s) and ports must be numeric"
            }
            AcceleratorError::ConfigFile { .. } => {
                "Check that the environment file exists and uses KEY=value lines"
            }
            AcceleratorError::ConnectionFailed { .. } => {
                "Verify the database host, port and credentials, and that it is reachable"
            }
            AcceleratorError::ConnectionNotFound { .. } => "Call connect() before running queries",
            AcceleratorError::QueryExecutionFailed { .. } => {
                "Check the SQL text and its placeholders against the selected engine"
            }
            AcceleratorError::DisconnectionFailed { .. } => {
                "The connection may already be broken; it is safe to drop it"
            }
            AcceleratorError::NetworkUnreachable { .. } => {
                "Check HOSTNAMEAPI and network connectivity to the API under test"
            }
            AcceleratorError::InvalidHeader { .. } => {
                "Header names must be tokens and values visible ASCII"
            }
            AcceleratorError::Serialization(_) => {
                "The payload does not match the expected JSON shape"
            }
            AcceleratorError::Request { .. } => "See the underlying error",
        }
    }
}
