use crate::domain::model::{DatabaseEngine, QueryResult};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Engine-agnostic access to a relational database.
///
/// Placeholders follow the engine's native convention (`$1` for PostgreSQL,
/// `?` for MySQL, `:1` for Oracle), so query text is written per engine.
/// Every backend returns the same [`QueryResult`] shape.
#[async_trait]
pub trait DatabaseClient: Send + Sync {
    fn engine(&self) -> DatabaseEngine;

    /// Opens (session engines) or verifies (pooled engines) the connection.
    async fn connect(&self) -> Result<()>;

    async fn query(&self, sql: &str, params: &[serde_json::Value]) -> Result<QueryResult>;

    /// Releases the pool or handle. Safe to call more than once.
    async fn disconnect(&self) -> Result<()>;
}
