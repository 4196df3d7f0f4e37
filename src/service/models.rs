//! Model registry: model name -> one DAO, built on first request.

use crate::config::{AppConfig, ModelConfig};
use crate::entity::EntitySchema;
use crate::error::{AppError, ConfigError};
use crate::service::Dao;
use crate::store::{ConnectionProvider, DEFAULT_DATABASE};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Storage family a model is served by.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DaoKind {
    /// Prepared SQL statements over a [`crate::store::Connection`].
    #[default]
    #[serde(rename = "sql", alias = "pdo")]
    Sql,
}

impl fmt::Display for DaoKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DaoKind::Sql => f.write_str("sql"),
        }
    }
}

impl FromStr for DaoKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sql" | "pdo" => Ok(DaoKind::Sql),
            _ => Err(ConfigError::UnknownDaoKind(s.to_string())),
        }
    }
}

/// How to build the DAO behind one model name.
#[derive(Clone, Debug)]
pub struct ModelDef {
    pub kind: DaoKind,
    pub table: String,
    pub schema: Arc<EntitySchema>,
    /// Logical database name handed to the connection provider.
    pub database: String,
    pub read_only: bool,
}

impl ModelDef {
    pub fn new(table: impl Into<String>, schema: Arc<EntitySchema>) -> Self {
        ModelDef {
            kind: DaoKind::Sql,
            table: table.into(),
            schema,
            database: DEFAULT_DATABASE.to_string(),
            read_only: false,
        }
    }

    pub fn database(mut self, database: impl Into<String>) -> Self {
        self.database = database.into();
        self
    }

    pub fn read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    /// Builds the entity schema described by a config entry.
    pub fn from_config(name: &str, config: &ModelConfig) -> Result<Self, ConfigError> {
        let mut builder = EntitySchema::builder(name).primary_key(config.primary_key.clone());
        for attr in &config.attributes {
            let column = attr.column.clone().unwrap_or_else(|| attr.name.clone());
            builder = builder.column(attr.name.clone(), attr.type_, column);
        }
        Ok(ModelDef {
            kind: config.kind,
            table: config.table.clone(),
            schema: builder.build()?,
            database: config.database.clone(),
            read_only: config.read_only,
        })
    }
}

/// DAO handles resolved for one controller, keyed by model name.
#[derive(Clone, Debug, Default)]
pub struct Models {
    by_name: HashMap<String, Arc<Dao>>,
}

impl Models {
    pub fn get(&self, name: &str) -> Result<Arc<Dao>, AppError> {
        self.by_name.get(name).cloned().ok_or_else(|| AppError::ModelNotConfigured {
            model: name.to_string(),
            kind: "undeclared".to_string(),
        })
    }

    pub fn insert(&mut self, name: impl Into<String>, dao: Arc<Dao>) {
        self.by_name.insert(name.into(), dao);
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

pub struct ModelRegistry {
    defs: HashMap<String, ModelDef>,
    /// Held across connection setup so a model is never built twice.
    instances: Mutex<HashMap<String, Arc<Dao>>>,
    connections: Arc<ConnectionProvider>,
}

impl ModelRegistry {
    pub fn new(connections: Arc<ConnectionProvider>) -> Self {
        ModelRegistry {
            defs: HashMap::new(),
            instances: Mutex::new(HashMap::new()),
            connections,
        }
    }

    pub fn from_config(config: &AppConfig, connections: Arc<ConnectionProvider>) -> Result<Self, ConfigError> {
        let mut registry = ModelRegistry::new(connections);
        for (name, model) in &config.models {
            registry.define(name.clone(), ModelDef::from_config(name, model)?);
        }
        Ok(registry)
    }

    pub fn define(&mut self, name: impl Into<String>, def: ModelDef) -> &mut Self {
        self.defs.insert(name.into(), def);
        self
    }

    pub fn connections(&self) -> &Arc<ConnectionProvider> {
        &self.connections
    }

    /// The DAO for `name`; built on first use, shared afterwards.
    pub async fn get(&self, name: &str, kind: DaoKind) -> Result<Arc<Dao>, AppError> {
        let not_configured = || AppError::ModelNotConfigured {
            model: name.to_string(),
            kind: kind.to_string(),
        };
        let def = self.defs.get(name).filter(|d| d.kind == kind).ok_or_else(not_configured)?;

        let mut instances = self.instances.lock().await;
        if let Some(dao) = instances.get(name) {
            return Ok(dao.clone());
        }
        let conn = self.connections.resolve(&def.database).await?;
        let dao = Arc::new(Dao::new(def.table.clone(), def.schema.clone(), conn)?.read_only(def.read_only));
        tracing::debug!(model = %name, table = %def.table, "model instantiated");
        instances.insert(name.to_string(), dao.clone());
        Ok(dao)
    }

    /// Resolves every declared (model, kind) pair.
    pub async fn resolve_all(&self, declared: &[(&str, DaoKind)]) -> Result<Models, AppError> {
        let mut models = Models::default();
        for (name, kind) in declared {
            models.insert(*name, self.get(name, *kind).await?);
        }
        Ok(models)
    }

    pub async fn instantiated(&self) -> usize {
        self.instances.lock().await.len()
    }
}
