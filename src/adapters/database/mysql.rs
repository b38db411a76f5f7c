//! MySQL backend on a lazily connected [`sqlx::MySqlPool`].
//!
//! The pool manages connections on its own; `connect` has nothing to do.

use crate::adapters::database::query_failed;
use crate::config::DatabaseConfig;
use crate::domain::model::{DatabaseEngine, QueryResult, Record};
use crate::domain::ports::DatabaseClient;
use crate::utils::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value;
use sqlx::mysql::{MySqlArguments, MySqlConnectOptions, MySqlPoolOptions, MySqlRow};
use sqlx::query::Query;
use sqlx::types::{Decimal, Json};
use sqlx::{Column, MySql, MySqlPool, Row, TypeInfo, ValueRef};

pub struct MySqlClient {
    pool: MySqlPool,
}

impl MySqlClient {
    pub fn new(config: &DatabaseConfig) -> Self {
        let options = MySqlConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .username(&config.user)
            .password(&config.password)
            .database(&config.database);

        let pool = MySqlPoolOptions::new()
            .acquire_timeout(config.acquire_timeout)
            .connect_lazy_with(options);

        Self { pool }
    }
}

#[async_trait]
impl DatabaseClient for MySqlClient {
    fn engine(&self) -> DatabaseEngine {
        DatabaseEngine::MySql
    }

    async fn connect(&self) -> Result<()> {
        tracing::debug!("MySQL pool connects on demand");
        Ok(())
    }

    async fn query(&self, sql: &str, params: &[Value]) -> Result<QueryResult> {
        let query = params
            .iter()
            .fold(sqlx::query(sql), |query, param| bind_param(query, param));

        let rows = query
            .fetch_all(&self.pool)
            .await
            .map_err(|e| query_failed(DatabaseEngine::MySql, e))?;

        let records = rows
            .iter()
            .map(row_to_record)
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| query_failed(DatabaseEngine::MySql, e))?;

        tracing::debug!(rows = records.len(), "MySQL query returned");
        Ok(QueryResult::new(records))
    }

    async fn disconnect(&self) -> Result<()> {
        if !self.pool.is_closed() {
            self.pool.close().await;
            tracing::info!("MySQL pool closed");
        }
        Ok(())
    }
}

fn bind_param<'q>(
    query: Query<'q, MySql, MySqlArguments>,
    param: &'q Value,
) -> Query<'q, MySql, MySqlArguments> {
    match param {
        Value::Null => query.bind(None::<String>),
        Value::Bool(flag) => query.bind(*flag),
        Value::Number(number) => match number.as_i64() {
            Some(int) => query.bind(int),
            None => query.bind(number.as_f64()),
        },
        Value::String(text) => query.bind(text.as_str()),
        other => query.bind(Json(other)),
    }
}

fn row_to_record(row: &MySqlRow) -> std::result::Result<Record, sqlx::Error> {
    let mut record = Record::new();
    for column in row.columns() {
        let index = column.ordinal();
        let type_name = column.type_info().name();

        let value = if row.try_get_raw(index)?.is_null() {
            Value::Null
        } else if type_name.ends_with("UNSIGNED") {
            Value::from(row.try_get::<u64, _>(index)?)
        } else {
            match type_name {
                "BOOLEAN" => Value::Bool(row.try_get(index)?),
                "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "BIGINT" => {
                    Value::from(row.try_get::<i64, _>(index)?)
                }
                "FLOAT" => Value::from(row.try_get::<f32, _>(index)?),
                "DOUBLE" => Value::from(row.try_get::<f64, _>(index)?),
                "DECIMAL" => Value::String(row.try_get::<Decimal, _>(index)?.to_string()),
                "JSON" => row.try_get::<Value, _>(index)?,
                "DATE" => Value::String(row.try_get::<NaiveDate, _>(index)?.to_string()),
                "DATETIME" => Value::String(row.try_get::<NaiveDateTime, _>(index)?.to_string()),
                "TIMESTAMP" => Value::String(row.try_get::<DateTime<Utc>, _>(index)?.to_rfc3339()),
                _ => match row.try_get::<String, _>(index) {
                    Ok(text) => Value::String(text),
                    Err(_) => {
                        tracing::warn!(
                            column = column.name(),
                            type_name,
                            "Unsupported MySQL column type, returning null"
                        );
                        Value::Null
                    }
                },
            }
        };

        record.insert(column.name().to_string(), value);
    }
    Ok(record)
}
