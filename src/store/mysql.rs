//! sqlx-backed MySQL implementation of the storage boundary.

use crate::config::DatabaseConfig;
use crate::error::AppError;
use crate::sql::{positional, BindValue, ParamType};
use crate::store::{Connection, Connector, Row, Statement};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use rust_decimal::Decimal;
use serde_json::Value;
use sqlx::mysql::{MySqlPool, MySqlPoolOptions, MySqlRow};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

/// Opens one pool per logical database name from config.
pub struct MySqlConnector {
    databases: HashMap<String, DatabaseConfig>,
}

impl MySqlConnector {
    pub fn new(databases: HashMap<String, DatabaseConfig>) -> Self {
        MySqlConnector { databases }
    }
}

#[async_trait]
impl Connector for MySqlConnector {
    async fn connect(&self, name: &str) -> Result<Arc<dyn Connection>, AppError> {
        let config = self
            .databases
            .get(name)
            .ok_or_else(|| AppError::DatabaseNotConfigured(name.to_string()))?;
        let pool = MySqlPoolOptions::new()
            .max_connections(config.max_connections)
            .connect(&config.url)
            .await?;
        Ok(Arc::new(MySqlConnection { pool }))
    }
}

#[derive(Clone)]
pub struct MySqlConnection {
    pool: MySqlPool,
}

impl MySqlConnection {
    pub fn from_pool(pool: MySqlPool) -> Self {
        MySqlConnection { pool }
    }
}

#[async_trait]
impl Connection for MySqlConnection {
    async fn prepare(&self, sql: &str) -> Result<Box<dyn Statement>, AppError> {
        Ok(Box::new(MySqlStatement {
            pool: self.pool.clone(),
            sql: sql.to_string(),
            binds: HashMap::new(),
            rows: VecDeque::new(),
            generated_id: None,
        }))
    }
}

struct MySqlStatement {
    pool: MySqlPool,
    sql: String,
    binds: HashMap<String, BindValue>,
    rows: VecDeque<Row>,
    generated_id: Option<Value>,
}

/// Statements that produce a result set are fetched, everything else executed.
fn returns_rows(sql: &str) -> bool {
    let head = sql
        .trim_start()
        .split_whitespace()
        .next()
        .unwrap_or("")
        .to_ascii_uppercase();
    matches!(head.as_str(), "SELECT" | "SHOW" | "DESCRIBE" | "EXPLAIN" | "WITH")
}

#[async_trait]
impl Statement for MySqlStatement {
    fn bind_param(&mut self, name: &str, value: Value, ty: ParamType) {
        let name = name.trim_start_matches(':');
        self.binds.insert(name.to_string(), BindValue::coerce(&value, ty));
    }

    async fn execute(&mut self) -> Result<u64, AppError> {
        let (sql, order) = positional(&self.sql);
        let mut query = sqlx::query(&sql);
        for name in &order {
            let value = self
                .binds
                .get(name)
                .ok_or_else(|| AppError::Storage(format!("no value bound for :{}", name)))?;
            query = match value {
                BindValue::Null => query.bind(Option::<String>::None),
                BindValue::Int(n) => query.bind(*n),
                BindValue::Text(s) => query.bind(s.clone()),
            };
        }
        self.generated_id = None;
        if returns_rows(&sql) {
            let rows = query.fetch_all(&self.pool).await?;
            self.rows = rows.iter().map(row_to_json).collect();
            Ok(self.rows.len() as u64)
        } else {
            let result = query.execute(&self.pool).await?;
            let id = result.last_insert_id();
            if id > 0 {
                self.generated_id = Some(Value::from(id));
            }
            Ok(result.rows_affected())
        }
    }

    async fn fetch_row(&mut self) -> Result<Option<Row>, AppError> {
        Ok(self.rows.pop_front())
    }

    fn generated_id(&self) -> Option<Value> {
        self.generated_id.clone()
    }
}

fn row_to_json(row: &MySqlRow) -> Row {
    use sqlx::Column;
    use sqlx::Row as _;
    let mut map = serde_json::Map::new();
    for col in row.columns() {
        let name = col.name();
        map.insert(name.to_string(), cell_to_value(row, name));
    }
    map
}

fn cell_to_value(row: &MySqlRow, name: &str) -> Value {
    use sqlx::Row as _;
    if let Ok(Some(n)) = row.try_get::<Option<i64>, _>(name) {
        return Value::Number(n.into());
    }
    if let Ok(Some(n)) = row.try_get::<Option<u64>, _>(name) {
        return Value::Number(n.into());
    }
    if let Ok(Some(d)) = row.try_get::<Option<Decimal>, _>(name) {
        return Value::String(d.to_string());
    }
    if let Ok(Some(n)) = row.try_get::<Option<f64>, _>(name) {
        if let Some(n) = serde_json::Number::from_f64(n) {
            return Value::Number(n);
        }
    }
    if let Ok(Some(d)) = row.try_get::<Option<chrono::NaiveDateTime>, _>(name) {
        return Value::String(d.format("%Y-%m-%d %H:%M:%S").to_string());
    }
    if let Ok(Some(d)) = row.try_get::<Option<chrono::NaiveDate>, _>(name) {
        return Value::String(d.format("%Y-%m-%d").to_string());
    }
    if let Ok(Some(s)) = row.try_get::<Option<String>, _>(name) {
        return Value::String(s);
    }
    if let Ok(Some(j)) = row.try_get::<Option<serde_json::Value>, _>(name) {
        return j;
    }
    if let Ok(Some(bytes)) = row.try_get::<Option<Vec<u8>>, _>(name) {
        return bytes_to_value(bytes);
    }
    Value::Null
}

/// Binary cells stay text when they are valid UTF-8, otherwise base64.
fn bytes_to_value(bytes: Vec<u8>) -> Value {
    match String::from_utf8(bytes) {
        Ok(s) => Value::String(s),
        Err(err) => Value::String(STANDARD.encode(err.as_bytes())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_row_returning_statements() {
        assert!(returns_rows("SELECT * FROM t WHERE id=?"));
        assert!(returns_rows("  select 1"));
        assert!(!returns_rows("INSERT INTO t (a) VALUES (?)"));
        assert!(!returns_rows("UPDATE t SET a=? WHERE id=?"));
        assert!(!returns_rows(""));
    }

    #[test]
    fn binary_cells_are_kept_intact() {
        assert_eq!(bytes_to_value(b"plain".to_vec()), Value::from("plain"));
        let raw = vec![0xff, 0x00, 0xfe, 0x10];
        let encoded = bytes_to_value(raw.clone());
        assert_eq!(encoded, Value::from("/wD+EA=="));
        let decoded = STANDARD.decode(encoded.as_str().unwrap()).unwrap();
        assert_eq!(decoded, raw);
    }

    #[test]
    fn decimals_render_without_losing_scale() {
        let d: Decimal = "1234.50".parse().unwrap();
        assert_eq!(Value::String(d.to_string()), Value::from("1234.50"));
    }
}
