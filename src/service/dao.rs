//! Entity CRUD over the storage boundary.

use crate::entity::{Entity, EntitySchema};
use crate::error::{AppError, ConfigError};
use crate::sql::{delete, insert, is_identifier, select_by_id, update, with_literals, QueryBuf};
use crate::store::{Connection, Statement};
use serde_json::Value;
use std::sync::{Arc, Mutex};

/// Gateway between one entity schema and one table.
pub struct Dao {
    table: String,
    schema: Arc<EntitySchema>,
    read_only: bool,
    conn: Arc<dyn Connection>,
    /// Last statement with literals substituted, for logs and debugging only.
    last_statement: Mutex<String>,
}

impl std::fmt::Debug for Dao {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dao")
            .field("table", &self.table)
            .field("entity", &self.schema.name())
            .field("read_only", &self.read_only)
            .finish()
    }
}

impl Dao {
    pub fn new(table: impl Into<String>, schema: Arc<EntitySchema>, conn: Arc<dyn Connection>) -> Result<Self, ConfigError> {
        let table = table.into();
        if !is_identifier(&table) {
            return Err(ConfigError::InvalidIdentifier { kind: "table", name: table });
        }
        Ok(Dao {
            table,
            schema,
            read_only: false,
            conn,
            last_statement: Mutex::new(String::new()),
        })
    }

    pub fn read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn schema(&self) -> &Arc<EntitySchema> {
        &self.schema
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    pub fn last_statement(&self) -> String {
        self.last_statement.lock().map(|s| s.clone()).unwrap_or_default()
    }

    /// Fresh, empty entity of this DAO's type.
    pub fn new_entity(&self) -> Entity {
        Entity::new(self.schema.clone())
    }

    /// Insert the dirty attributes. A generated id is written back to the primary key.
    pub async fn create(&self, entity: &mut Entity) -> Result<u64, AppError> {
        self.ensure_writable("create")?;
        let q = insert(&self.table, entity);
        let (stmt, affected) = self.run(&q).await?;
        if let Some(id) = stmt.generated_id() {
            let pk = entity.primary_key().to_string();
            entity.set(&pk, id);
        }
        if affected > 0 {
            entity.mark_persisted();
        }
        Ok(affected)
    }

    /// Update the dirty attributes by primary key. 0 rows means no such row.
    pub async fn edit(&self, entity: &mut Entity) -> Result<u64, AppError> {
        self.ensure_writable("edit")?;
        let Some(q) = update(&self.table, entity) else {
            tracing::debug!(table = %self.table, "edit skipped: nothing dirty");
            return Ok(0);
        };
        let (_, affected) = self.run(&q).await?;
        if affected > 0 {
            entity.mark_persisted();
        }
        Ok(affected)
    }

    pub async fn delete(&self, entity: &Entity) -> Result<u64, AppError> {
        self.ensure_writable("delete")?;
        let q = delete(&self.table, entity);
        let (_, affected) = self.run(&q).await?;
        Ok(affected)
    }

    /// Fetch one entity by primary key.
    pub async fn get(&self, id: impl Into<Value>) -> Result<Entity, AppError> {
        let id = id.into();
        let q = select_by_id(&self.table, &self.schema, &id);
        let (mut stmt, _) = self.run(&q).await?;
        let row = stmt.fetch_row().await?.ok_or_else(|| AppError::EntityNotFound {
            table: self.table.clone(),
            id: match &id {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            },
        })?;
        Ok(Entity::from_row(self.schema.clone(), row))
    }

    fn ensure_writable(&self, operation: &'static str) -> Result<(), AppError> {
        if self.read_only {
            tracing::warn!(table = %self.table, operation, "write rejected on read-only dao");
            return Err(AppError::ReadOnlyViolation {
                table: self.table.clone(),
                operation,
            });
        }
        Ok(())
    }

    async fn run(&self, q: &QueryBuf) -> Result<(Box<dyn Statement>, u64), AppError> {
        let shown = with_literals(&q.sql, &q.params);
        tracing::debug!(sql = %q.sql, statement = %shown, "query");
        if let Ok(mut last) = self.last_statement.lock() {
            *last = shown;
        }
        let mut stmt = self.conn.prepare(&q.sql).await?;
        for p in &q.params {
            stmt.bind_param(&p.name, p.value.clone(), p.ty);
        }
        let affected = stmt.execute().await?;
        Ok((stmt, affected))
    }
}
