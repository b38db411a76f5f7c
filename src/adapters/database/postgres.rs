//! PostgreSQL backend on a lazily connected [`sqlx::PgPool`].
//!
//! The pool opens connections on first use, so `query` works straight from
//! construction. `connect` borrows one connection to prove the server is
//! reachable and the credentials are accepted.
//!
//! Parameters arrive as untyped JSON. Each statement is prepared first so the
//! server can infer the type of every placeholder from context, and values are
//! then encoded as that type: `"1"` compares against an `int` column and
//! `null` inserts into a `date` column without casts in the SQL.

use crate::adapters::database::{connection_failed, query_failed};
use crate::config::DatabaseConfig;
use crate::domain::model::{DatabaseEngine, QueryResult, Record};
use crate::domain::ports::DatabaseClient;
use crate::utils::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde_json::Value;
use sqlx::encode::{Encode, IsNull};
use sqlx::error::BoxDynError;
use sqlx::postgres::{PgArgumentBuffer, PgConnectOptions, PgPoolOptions, PgRow, PgTypeInfo};
use sqlx::types::{Decimal, Json, Uuid};
use sqlx::{Column, Either, Executor, PgPool, Postgres, Row, Statement, Type, TypeInfo, ValueRef};
use std::borrow::Cow;

pub struct PostgresClient {
    pool: PgPool,
}

impl PostgresClient {
    pub fn new(config: &DatabaseConfig) -> Self {
        let options = PgConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .username(&config.user)
            .password(&config.password)
            .database(&config.database);

        let pool = PgPoolOptions::new()
            .acquire_timeout(config.acquire_timeout)
            .connect_lazy_with(options);

        Self { pool }
    }
}

#[async_trait]
impl DatabaseClient for PostgresClient {
    fn engine(&self) -> DatabaseEngine {
        DatabaseEngine::Postgres
    }

    async fn connect(&self) -> Result<()> {
        let connection = self
            .pool
            .acquire()
            .await
            .map_err(|e| connection_failed(DatabaseEngine::Postgres, e))?;
        drop(connection);

        tracing::info!(size = self.pool.size(), "Connected to PostgreSQL");
        Ok(())
    }

    async fn query(&self, sql: &str, params: &[Value]) -> Result<QueryResult> {
        let mut connection = self
            .pool
            .acquire()
            .await
            .map_err(|e| query_failed(DatabaseEngine::Postgres, e))?;

        // Preparing caches the statement on this connection with the
        // server-inferred parameter types; the query below reuses it.
        let statement = (&mut *connection)
            .prepare(sql)
            .await
            .map_err(|e| query_failed(DatabaseEngine::Postgres, e))?;
        let targets = match statement.parameters() {
            Some(Either::Left(types)) => types.to_vec(),
            _ => Vec::new(),
        };

        let typed = params
            .iter()
            .enumerate()
            .map(|(index, value)| {
                let target = targets
                    .get(index)
                    .cloned()
                    .unwrap_or_else(<String as Type<Postgres>>::type_info);
                TypedParam::new(value, target)
                    .map_err(|e| format!("parameter ${}: {e}", index + 1).into())
            })
            .collect::<std::result::Result<Vec<_>, BoxDynError>>()
            .map_err(|e| query_failed(DatabaseEngine::Postgres, e))?;

        let rows = typed
            .into_iter()
            .fold(sqlx::query(sql), |query, param| query.bind(param))
            .fetch_all(&mut *connection)
            .await
            .map_err(|e| query_failed(DatabaseEngine::Postgres, e))?;

        let records = rows
            .iter()
            .map(row_to_record)
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| query_failed(DatabaseEngine::Postgres, e))?;

        tracing::debug!(rows = records.len(), "PostgreSQL query returned");
        Ok(QueryResult::new(records))
    }

    async fn disconnect(&self) -> Result<()> {
        if !self.pool.is_closed() {
            self.pool.close().await;
            tracing::info!("PostgreSQL pool closed");
        }
        Ok(())
    }
}

/// A JSON value converted to the Rust type matching its placeholder.
#[derive(Debug, Clone, PartialEq)]
enum PgParam {
    Null,
    Bool(bool),
    Int2(i16),
    Int4(i32),
    Int8(i64),
    Float4(f32),
    Float8(f64),
    Numeric(Decimal),
    Date(NaiveDate),
    Time(NaiveTime),
    Timestamp(NaiveDateTime),
    Timestamptz(DateTime<Utc>),
    Uuid(Uuid),
    Json(Value),
    Text(String),
}

impl PgParam {
    /// Text-like and unrecognised types (enums, `varchar`, ...) get the
    /// value's text form, which is also their binary wire format.
    fn coerce(value: &Value, target: &PgTypeInfo) -> std::result::Result<Self, BoxDynError> {
        if value.is_null() {
            return Ok(PgParam::Null);
        }

        let text = match value {
            Value::String(text) => Cow::Borrowed(text.as_str()),
            other => Cow::Owned(other.to_string()),
        };
        let trimmed = text.trim();

        Ok(match target.name() {
            "BOOL" => match value {
                Value::Bool(flag) => PgParam::Bool(*flag),
                _ => PgParam::Bool(trimmed.parse()?),
            },
            "INT2" => PgParam::Int2(trimmed.parse()?),
            "INT4" => PgParam::Int4(trimmed.parse()?),
            "INT8" => PgParam::Int8(trimmed.parse()?),
            "FLOAT4" => PgParam::Float4(trimmed.parse()?),
            "FLOAT8" => PgParam::Float8(trimmed.parse()?),
            "NUMERIC" => PgParam::Numeric(trimmed.parse()?),
            "DATE" => PgParam::Date(trimmed.parse()?),
            "TIME" => PgParam::Time(trimmed.parse()?),
            "TIMESTAMP" => PgParam::Timestamp(
                trimmed
                    .parse()
                    .or_else(|_| NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S%.f"))?,
            ),
            "TIMESTAMPTZ" => {
                PgParam::Timestamptz(DateTime::parse_from_rfc3339(trimmed)?.with_timezone(&Utc))
            }
            "UUID" => PgParam::Uuid(Uuid::parse_str(trimmed)?),
            "JSON" | "JSONB" => match value {
                Value::String(json) => PgParam::Json(serde_json::from_str(json)?),
                other => PgParam::Json(other.clone()),
            },
            _ => PgParam::Text(text.into_owned()),
        })
    }
}

/// Bound value that declares the inferred placeholder type on the wire.
struct TypedParam {
    value: PgParam,
    target: PgTypeInfo,
}

impl TypedParam {
    fn new(value: &Value, target: PgTypeInfo) -> std::result::Result<Self, BoxDynError> {
        let value = PgParam::coerce(value, &target)
            .map_err(|e| format!("cannot convert {value} to {}: {e}", target.name()))?;
        Ok(Self { value, target })
    }
}

impl Type<Postgres> for TypedParam {
    fn type_info() -> PgTypeInfo {
        <String as Type<Postgres>>::type_info()
    }
}

impl<'q> Encode<'q, Postgres> for TypedParam {
    fn encode_by_ref(
        &self,
        buf: &mut PgArgumentBuffer,
    ) -> std::result::Result<IsNull, BoxDynError> {
        match &self.value {
            PgParam::Null => Ok(IsNull::Yes),
            PgParam::Bool(v) => <bool as Encode<'q, Postgres>>::encode_by_ref(v, buf),
            PgParam::Int2(v) => <i16 as Encode<'q, Postgres>>::encode_by_ref(v, buf),
            PgParam::Int4(v) => <i32 as Encode<'q, Postgres>>::encode_by_ref(v, buf),
            PgParam::Int8(v) => <i64 as Encode<'q, Postgres>>::encode_by_ref(v, buf),
            PgParam::Float4(v) => <f32 as Encode<'q, Postgres>>::encode_by_ref(v, buf),
            PgParam::Float8(v) => <f64 as Encode<'q, Postgres>>::encode_by_ref(v, buf),
            PgParam::Numeric(v) => <Decimal as Encode<'q, Postgres>>::encode_by_ref(v, buf),
            PgParam::Date(v) => <NaiveDate as Encode<'q, Postgres>>::encode_by_ref(v, buf),
            PgParam::Time(v) => <NaiveTime as Encode<'q, Postgres>>::encode_by_ref(v, buf),
            PgParam::Timestamp(v) => {
                <NaiveDateTime as Encode<'q, Postgres>>::encode_by_ref(v, buf)
            }
            PgParam::Timestamptz(v) => {
                <DateTime<Utc> as Encode<'q, Postgres>>::encode_by_ref(v, buf)
            }
            PgParam::Uuid(v) => <Uuid as Encode<'q, Postgres>>::encode_by_ref(v, buf),
            PgParam::Json(v) => {
                <Json<&Value> as Encode<'q, Postgres>>::encode_by_ref(&Json(v), buf)
            }
            PgParam::Text(v) => <String as Encode<'q, Postgres>>::encode_by_ref(v, buf),
        }
    }

    fn produces(&self) -> Option<PgTypeInfo> {
        Some(self.target.clone())
    }
}

fn row_to_record(row: &PgRow) -> std::result::Result<Record, sqlx::Error> {
    let mut record = Record::new();
    for column in row.columns() {
        let index = column.ordinal();
        let type_name = column.type_info().name();

        let value = if row.try_get_raw(index)?.is_null() {
            Value::Null
        } else {
            match type_name {
                "BOOL" => Value::Bool(row.try_get(index)?),
                "INT2" => Value::from(row.try_get::<i16, _>(index)?),
                "INT4" => Value::from(row.try_get::<i32, _>(index)?),
                "INT8" => Value::from(row.try_get::<i64, _>(index)?),
                "FLOAT4" => Value::from(row.try_get::<f32, _>(index)?),
                "FLOAT8" => Value::from(row.try_get::<f64, _>(index)?),
                "NUMERIC" => Value::String(row.try_get::<Decimal, _>(index)?.to_string()),
                "JSON" | "JSONB" => row.try_get::<Value, _>(index)?,
                "UUID" => Value::String(row.try_get::<Uuid, _>(index)?.to_string()),
                "DATE" => Value::String(row.try_get::<NaiveDate, _>(index)?.to_string()),
                "TIME" => Value::String(row.try_get::<NaiveTime, _>(index)?.to_string()),
                "TIMESTAMP" => Value::String(row.try_get::<NaiveDateTime, _>(index)?.to_string()),
                "TIMESTAMPTZ" => {
                    Value::String(row.try_get::<DateTime<Utc>, _>(index)?.to_rfc3339())
                }
                _ => match row.try_get::<String, _>(index) {
                    Ok(text) => Value::String(text),
                    Err(_) => {
                        tracing::warn!(
                            column = column.name(),
                            type_name,
                            "Unsupported PostgreSQL column type, returning null"
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
