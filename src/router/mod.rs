//! Per-method route tables and path resolution.

mod pattern;

pub use pattern::RoutePattern;

use crate::config::{RouteEntry, RoutesConfig};
use crate::error::{AppError, ConfigError};
use axum::http::Method;
use std::collections::HashMap;

#[derive(Clone, Debug)]
struct Route {
    pattern: RoutePattern,
    controller: String,
    action: String,
}

/// Dispatch target for one request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RouteMatch {
    pub controller: String,
    pub action: String,
    /// Placeholder name -> captured digits.
    pub args: HashMap<String, String>,
}

#[derive(Clone, Debug)]
pub struct Router {
    tables: HashMap<Method, Vec<Route>>,
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl Router {
    pub fn new() -> Self {
        let mut tables = HashMap::new();
        tables.insert(Method::GET, Vec::new());
        tables.insert(Method::POST, Vec::new());
        Router { tables }
    }

    pub fn from_config(config: &RoutesConfig) -> Result<Self, ConfigError> {
        let mut router = Router::new();
        for RouteEntry { pattern, target } in &config.get {
            router.get(pattern, target)?;
        }
        for RouteEntry { pattern, target } in &config.post {
            router.post(pattern, target)?;
        }
        Ok(router)
    }

    pub fn get(&mut self, pattern: &str, target: &str) -> Result<&mut Self, ConfigError> {
        self.register(Method::GET, pattern, target)
    }

    pub fn post(&mut self, pattern: &str, target: &str) -> Result<&mut Self, ConfigError> {
        self.register(Method::POST, pattern, target)
    }

    fn register(&mut self, method: Method, pattern: &str, target: &str) -> Result<&mut Self, ConfigError> {
        let (controller, action) = split_target(target)?;
        let table = self.tables.entry(method.clone()).or_default();
        if table.iter().any(|r| r.pattern.source() == pattern) {
            tracing::debug!(%method, pattern, "route already registered; keeping first target");
            return Ok(self);
        }
        let pattern = RoutePattern::compile(pattern)?;
        tracing::info!(%method, pattern = pattern.source(), controller, action, "route registered");
        table.push(Route {
            pattern,
            controller: controller.to_string(),
            action: action.to_string(),
        });
        Ok(self)
    }

    /// Number of routes registered for `method`.
    pub fn len(&self, method: &Method) -> usize {
        self.tables.get(method).map_or(0, Vec::len)
    }

    /// Resolves `raw_path` (query string allowed) against the table for `method`.
    ///
    /// A pattern equal to the path wins at once. Among placeholder patterns the
    /// last one that matches is used.
    pub fn resolve(&self, method: &Method, raw_path: &str) -> Result<RouteMatch, AppError> {
        let path = raw_path.split_once('?').map_or(raw_path, |(p, _)| p);
        let table = self
            .tables
            .get(method)
            .ok_or_else(|| AppError::NoRoute(method.to_string()))?;

        let mut found: Option<(&Route, HashMap<String, String>)> = None;
        for route in table {
            if route.pattern.source() == path {
                found = Some((route, HashMap::new()));
                break;
            }
            if let Some(args) = route.pattern.captures(path) {
                found = Some((route, args));
            }
        }

        let Some((route, args)) = found else {
            tracing::warn!(%method, path, "no route matched");
            return Err(AppError::RouteNotFound(path.to_string()));
        };
        tracing::debug!(%method, path, pattern = route.pattern.source(), "route resolved");
        Ok(RouteMatch {
            controller: route.controller.clone(),
            action: route.action.clone(),
            args,
        })
    }
}

fn split_target(target: &str) -> Result<(&str, &str), ConfigError> {
    match target.split_once('@') {
        Some((c, a)) if !c.is_empty() && !a.is_empty() => Ok((c, a)),
        _ => Err(ConfigError::InvalidTarget(target.to_string())),
    }
}
