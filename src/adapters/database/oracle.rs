//! Oracle backend holding one session handle.
//!
//! Unlike the pooled engines, nothing can run until `connect` opens the
//! session; `query` before that fails with `ConnectionNotFound`. The driver
//! is blocking, so every call runs on the blocking thread pool while the
//! session mutex is held, which also keeps queries on one session serial.

use crate::adapters::database::{connection_failed, query_failed};
use crate::config::OracleConfig;
use crate::domain::model::{DatabaseEngine, QueryResult, Record};
use crate::domain::ports::DatabaseClient;
use crate::utils::error::{AcceleratorError, Result};
use async_trait::async_trait;
use oracle::sql_type::{OracleType, ToSql};
use oracle::{Connection, SqlValue};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::Mutex;

pub struct OracleClient {
    config: OracleConfig,
    session: Mutex<Option<Arc<Connection>>>,
}

impl OracleClient {
    pub fn new(config: OracleConfig) -> Self {
        Self {
            config,
            session: Mutex::new(None),
        }
    }

    pub async fn is_connected(&self) -> bool {
        self.session.lock().await.is_some()
    }
}

#[async_trait]
impl DatabaseClient for OracleClient {
    fn engine(&self) -> DatabaseEngine {
        DatabaseEngine::Oracle
    }

    async fn connect(&self) -> Result<()> {
        let mut session = self.session.lock().await;
        if session.is_some() {
            tracing::debug!("Oracle session already open");
            return Ok(());
        }

        let config = self.config.clone();
        let connection = tokio::task::spawn_blocking(move || {
            Connection::connect(&config.user, &config.password, &config.connect_string)
        })
        .await
        .map_err(|e| connection_failed(DatabaseEngine::Oracle, e))?
        .map_err(|e| connection_failed(DatabaseEngine::Oracle, e))?;

        *session = Some(Arc::new(connection));
        tracing::info!(connect_string = %self.config.connect_string, "Connected to Oracle");
        Ok(())
    }

    async fn query(&self, sql: &str, params: &[Value]) -> Result<QueryResult> {
        let session = self.session.lock().await;
        let connection = session
            .as_ref()
            .map(Arc::clone)
            .ok_or(AcceleratorError::ConnectionNotFound {
                engine: DatabaseEngine::Oracle,
            })?;

        let sql = sql.to_string();
        let params = params.to_vec();
        let records = tokio::task::spawn_blocking(move || run_query(&connection, &sql, &params))
            .await
            .map_err(|e| query_failed(DatabaseEngine::Oracle, e))?
            .map_err(|e| query_failed(DatabaseEngine::Oracle, e))?;
        drop(session);

        tracing::debug!(rows = records.len(), "Oracle query returned");
        Ok(QueryResult::new(records))
    }

    async fn disconnect(&self) -> Result<()> {
        let Some(connection) = self.session.lock().await.take() else {
            return Ok(());
        };

        let disconnection_failed = |source: Box<dyn std::error::Error + Send + Sync>| {
            AcceleratorError::DisconnectionFailed {
                engine: DatabaseEngine::Oracle,
                source,
            }
        };

        tokio::task::spawn_blocking(move || connection.close())
            .await
            .map_err(|e| disconnection_failed(e.into()))?
            .map_err(|e| disconnection_failed(e.into()))?;

        tracing::info!("Oracle session closed");
        Ok(())
    }
}

fn run_query(connection: &Connection, sql: &str, params: &[Value]) -> oracle::Result<Vec<Record>> {
    let bound: Vec<Box<dyn ToSql>> = params.iter().map(to_sql_param).collect();
    let refs: Vec<&dyn ToSql> = bound.iter().map(|param| param.as_ref()).collect();

    let result_set = connection.query(sql, &refs)?;
    let columns: Vec<(String, OracleType)> = result_set
        .column_info()
        .iter()
        .map(|info| (info.name().to_string(), info.oracle_type().clone()))
        .collect();

    let mut records = Vec::new();
    for row in result_set {
        let row = row?;
        let mut record = Record::new();
        for ((name, oracle_type), value) in columns.iter().zip(row.sql_values()) {
            record.insert(name.clone(), column_value(value, oracle_type)?);
        }
        records.push(record);
    }
    Ok(records)
}

fn to_sql_param(value: &Value) -> Box<dyn ToSql> {
    match value {
        Value::Null => Box::new(None::<String>),
        Value::Bool(flag) => Box::new(*flag),
        Value::Number(number) => match number.as_i64() {
            Some(int) => Box::new(int),
            None => Box::new(number.as_f64().unwrap_or_default()),
        },
        Value::String(text) => Box::new(text.clone()),
        other => Box::new(other.to_string()),
    }
}

/// How a column's values are rendered as JSON, matching the pooled engines:
/// integers as numbers, fixed-point decimals as strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnShape {
    /// `NUMBER(p, 0)`, `NUMBER(p, -n)` and unconstrained `NUMBER`; a
    /// non-integral or out-of-range value falls back to its decimal string.
    Integer,
    Decimal,
    Float,
    Boolean,
    Text,
}

impl ColumnShape {
    fn of(oracle_type: &OracleType) -> Self {
        match oracle_type {
            OracleType::Number(_, scale) if *scale > 0 => ColumnShape::Decimal,
            OracleType::Number(..) | OracleType::Int64 => ColumnShape::Integer,
            OracleType::Float(_) | OracleType::BinaryFloat | OracleType::BinaryDouble => {
                ColumnShape::Float
            }
            OracleType::Boolean => ColumnShape::Boolean,
            _ => ColumnShape::Text,
        }
    }
}

fn column_value(value: &SqlValue, oracle_type: &OracleType) -> oracle::Result<Value> {
    if value.is_null()? {
        return Ok(Value::Null);
    }

    Ok(match ColumnShape::of(oracle_type) {
        ColumnShape::Integer => match value.get::<i64>() {
            Ok(int) => Value::from(int),
            Err(_) => Value::String(value.get::<String>()?),
        },
        ColumnShape::Decimal | ColumnShape::Text => Value::String(value.get::<String>()?),
        ColumnShape::Float => Value::from(value.get::<f64>()?),
        ColumnShape::Boolean => Value::Bool(value.get::<bool>()?),
    })
}
