//! Raw config types matching the JSON config file.

use crate::entity::AttributeType;
use crate::service::DaoKind;
use crate::store::DEFAULT_DATABASE;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub debug: bool,
    #[serde(default)]
    pub server: ServerConfig,
    /// Logical database name -> connection settings.
    #[serde(default)]
    pub databases: HashMap<String, DatabaseConfig>,
    #[serde(default)]
    pub routes: RoutesConfig,
    /// Model name -> table mapping.
    #[serde(default)]
    pub models: BTreeMap<String, ModelConfig>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Maximum request body size in bytes.
    #[serde(default = "default_body_limit")]
    pub body_limit: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            bind: default_bind(),
            body_limit: default_body_limit(),
        }
    }
}

pub(crate) fn default_bind() -> String {
    "0.0.0.0:3000".to_string()
}

fn default_body_limit() -> usize {
    2 * 1024 * 1024
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

pub(crate) fn default_max_connections() -> u32 {
    5
}

/// Route tables in registration order.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RoutesConfig {
    #[serde(default, rename = "GET")]
    pub get: Vec<RouteEntry>,
    #[serde(default, rename = "POST")]
    pub post: Vec<RouteEntry>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RouteEntry {
    pub pattern: String,
    /// `Controller@action`
    pub target: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ModelConfig {
    #[serde(default)]
    pub kind: DaoKind,
    pub table: String,
    #[serde(default = "default_database")]
    pub database: String,
    #[serde(default)]
    pub read_only: bool,
    #[serde(default = "default_primary_key")]
    pub primary_key: String,
    pub attributes: Vec<AttributeConfig>,
}

fn default_database() -> String {
    DEFAULT_DATABASE.to_string()
}

fn default_primary_key() -> String {
    crate::entity::DEFAULT_PRIMARY_KEY.to_string()
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AttributeConfig {
    pub name: String,
    #[serde(rename = "type")]
    pub type_: AttributeType,
    #[serde(default)]
    pub column: Option<String>,
}
