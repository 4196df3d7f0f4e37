//! Validate config before building the router and model registry.

use crate::config::AppConfig;
use crate::error::ConfigError;
use crate::sql::{is_identifier, is_param_name};
use std::collections::HashSet;

/// Validate config. Call before `Router::from_config` / `ModelRegistry::from_config`.
pub fn validate(config: &AppConfig) -> Result<(), ConfigError> {
    for (name, db) in &config.databases {
        if db.url.trim().is_empty() {
            return Err(ConfigError::Validation(format!("database '{}' has an empty url", name)));
        }
        if db.max_connections == 0 {
            return Err(ConfigError::Validation(format!(
                "database '{}' needs max_connections >= 1",
                name
            )));
        }
    }

    for entry in config.routes.get.iter().chain(config.routes.post.iter()) {
        match entry.target.split_once('@') {
            Some((c, a)) if !c.is_empty() && !a.is_empty() => {}
            _ => return Err(ConfigError::InvalidTarget(entry.target.clone())),
        }
    }

    for (name, model) in &config.models {
        if !config.databases.contains_key(&model.database) {
            return Err(ConfigError::MissingReference {
                kind: "database",
                id: model.database.clone(),
            });
        }
        if !is_identifier(&model.table) {
            return Err(ConfigError::InvalidIdentifier {
                kind: "table",
                name: model.table.clone(),
            });
        }
        if model.attributes.is_empty() {
            return Err(ConfigError::Validation(format!("model '{}' declares no attributes", name)));
        }
        let mut seen = HashSet::new();
        for attr in &model.attributes {
            if !is_param_name(&attr.name) {
                return Err(ConfigError::InvalidIdentifier {
                    kind: "attribute",
                    name: attr.name.clone(),
                });
            }
            if !seen.insert(attr.name.as_str()) {
                return Err(ConfigError::DuplicateAttribute {
                    entity: name.clone(),
                    attribute: attr.name.clone(),
                });
            }
        }
        if !seen.contains(model.primary_key.as_str()) {
            return Err(ConfigError::InvalidPrimaryKey {
                entity: name.clone(),
                key: model.primary_key.clone(),
            });
        }
    }
    Ok(())
}
