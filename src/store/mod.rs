//! Storage boundary: prepared statements over one connection per logical database.
//!
//! The DAO only ever talks to [`Connection`] and [`Statement`]; the sqlx-backed
//! adapter lives in [`mysql`], and tests substitute in-memory implementations.

pub mod mysql;
mod provider;

pub use mysql::{MySqlConnection, MySqlConnector};
pub use provider::ConnectionProvider;

use crate::error::AppError;
use crate::sql::ParamType;
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::sync::Arc;

/// A fetched row: column name -> value.
pub type Row = Map<String, Value>;

/// Logical name used when a model does not name its database.
pub const DEFAULT_DATABASE: &str = "default";

#[async_trait]
pub trait Connection: Send + Sync {
    /// Prepares SQL containing `:name` placeholders.
    async fn prepare(&self, sql: &str) -> Result<Box<dyn Statement>, AppError>;
}

#[async_trait]
pub trait Statement: Send {
    /// Binds a value to `:name` (given without the colon). Rebinding replaces the value.
    fn bind_param(&mut self, name: &str, value: Value, ty: ParamType);

    /// Runs the statement; returns affected rows (or fetched rows for queries).
    async fn execute(&mut self) -> Result<u64, AppError>;

    /// Next result row of an executed query.
    async fn fetch_row(&mut self) -> Result<Option<Row>, AppError>;

    /// Identity value generated by the last execution, if the engine reported one.
    fn generated_id(&self) -> Option<Value>;
}

/// Opens the connection for one logical database name.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self, name: &str) -> Result<Arc<dyn Connection>, AppError>;
}
