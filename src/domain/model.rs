use crate::utils::error::{AcceleratorError, Result};
use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One database row, keyed by column name.
pub type Record = serde_json::Map<String, serde_json::Value>;

/// Rows returned by any database backend.
///
/// `rows` is always present; an empty result serializes as `{"rows": []}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResult<T = Record> {
    pub rows: Vec<T>,
}

impl<T> QueryResult<T> {
    pub fn new(rows: Vec<T>) -> Self {
        Self { rows }
    }

    pub fn empty() -> Self {
        Self { rows: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn first(&self) -> Option<&T> {
        self.rows.first()
    }
}

impl QueryResult<Record> {
    /// Converts every row into `T` through serde, by column name.
    pub fn decode<T: DeserializeOwned>(self) -> Result<QueryResult<T>> {
        let rows = self
            .rows
            .into_iter()
            .map(|row| serde_json::from_value(serde_json::Value::Object(row)))
            .collect::<std::result::Result<Vec<T>, _>>()?;
        Ok(QueryResult { rows })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseEngine {
    Postgres,
    MySql,
    Oracle,
}

impl DatabaseEngine {
    pub fn as_str(&self) -> &'static str {
        match self {
            DatabaseEngine::Postgres => "postgres",
            DatabaseEngine::MySql => "mysql",
            DatabaseEngine::Oracle => "oracle",
        }
    }

    /// Session-based engines hold a single handle that `connect` must open.
    pub fn is_session_based(&self) -> bool {
        matches!(self, DatabaseEngine::Oracle)
    }
}

impl fmt::Display for DatabaseEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DatabaseEngine {
    type Err = AcceleratorError;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" | "pg" => Ok(DatabaseEngine::Postgres),
            "mysql" => Ok(DatabaseEngine::MySql),
            "oracle" => Ok(DatabaseEngine::Oracle),
            _ => Err(AcceleratorError::InvalidConfigValue {
                field: "DB_ENGINE".to_string(),
                value: value.to_string(),
                reason: "expected one of: postgres, mysql, oracle".to_string(),
            }),
        }
    }
}

/// A response the server actually returned, whatever its status.
#[derive(Debug, Clone)]
pub struct HttpOutcome {
    pub status: StatusCode,
    pub status_text: String,
    pub headers: HeaderMap,
    pub body: String,
}

impl HttpOutcome {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_str(&self.body)?)
    }

    /// The body as JSON, or `Null` when it is empty or not JSON.
    pub fn json_value(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).unwrap_or(serde_json::Value::Null)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }
}

/// Login credentials. `Debug` never prints the password.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// Pagination and field selection for list endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListQuery {
    pub limit: Option<u32>,
    pub skip: Option<u32>,
    pub select: Vec<String>,
}

impl ListQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn skip(mut self, skip: u32) -> Self {
        self.skip = Some(skip);
        self
    }

    /// Accepts either separate field names or an already comma-joined list.
    pub fn select<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.select = fields
            .into_iter()
            .flat_map(|field| {
                field
                    .as_ref()
                    .split(',')
                    .map(|part| part.trim().to_string())
                    .collect::<Vec<_>>()
            })
            .filter(|field| !field.is_empty())
            .collect();
        self
    }

    /// Form-encoded query string, without the leading `?`. Empty when nothing is set.
    pub fn to_query_string(&self) -> String {
        let mut serializer = url::form_urlencoded::Serializer::new(String::new());
        if let Some(limit) = self.limit {
            serializer.append_pair("limit", &limit.to_string());
        }
        if let Some(skip) = self.skip {
            serializer.append_pair("skip", &skip.to_string());
        }
        if !self.select.is_empty() {
            serializer.append_pair("select", &self.select.join(","));
        }
        serializer.finish()
    }
}
