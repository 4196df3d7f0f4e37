//! Transport-independent request.

use axum::http::Method;
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Body key whose value overrides the request method on POST.
pub const METHOD_OVERRIDE_KEY: &str = "_method";
/// Body key holding a nested object merged into the top-level body.
pub const NESTED_DATA_KEY: &str = "data";

#[derive(Clone, Debug)]
pub struct Request {
    pub method: Method,
    /// Path without the query string; never empty.
    pub path: String,
    pub query: HashMap<String, String>,
    pub body: Map<String, Value>,
}

impl Request {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        let path = path.into();
        let (path, query) = match path.split_once('?') {
            Some((p, q)) => (p.to_string(), parse_query(q)),
            None => (path, HashMap::new()),
        };
        Request {
            method,
            path: if path.is_empty() { "/".to_string() } else { path },
            query,
            body: Map::new(),
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Request::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Request::new(Method::POST, path)
    }

    pub fn with_query(mut self, query: HashMap<String, String>) -> Self {
        self.query.extend(query);
        self
    }

    /// Sets the body, applying `_method` override and `data` merging.
    pub fn with_body(mut self, body: Map<String, Value>) -> Self {
        self.body = body;
        self.normalize();
        self
    }

    fn normalize(&mut self) {
        if self.method == Method::POST {
            if let Some(Value::String(m)) = self.body.remove(METHOD_OVERRIDE_KEY) {
                match Method::from_bytes(m.trim().to_uppercase().as_bytes()) {
                    Ok(method) => self.method = method,
                    Err(_) => tracing::debug!(method = %m, "ignoring invalid method override"),
                }
            }
        }
        if let Some(Value::Object(nested)) = self.body.remove(NESTED_DATA_KEY) {
            for (k, v) in nested {
                self.body.entry(k).or_insert(v);
            }
        }
    }

    pub fn param(&self, name: &str) -> Option<&Value> {
        self.body.get(name)
    }

    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query.get(name).map(String::as_str)
    }
}

fn parse_query(q: &str) -> HashMap<String, String> {
    q.split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| match pair.split_once('=') {
            Some((k, v)) => (k.to_string(), v.to_string()),
            None => (pair.to_string(), String::new()),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn body(v: Value) -> Map<String, Value> {
        match v {
            Value::Object(m) => m,
            _ => unreachable!(),
        }
    }

    #[test]
    fn empty_path_is_root() {
        assert_eq!(Request::get("").path, "/");
        assert_eq!(Request::get("?a=1").path, "/");
    }

    #[test]
    fn query_is_split_from_path() {
        let r = Request::get("/search?q=rust&page=2&flag");
        assert_eq!(r.path, "/search");
        assert_eq!(r.query_param("q"), Some("rust"));
        assert_eq!(r.query_param("page"), Some("2"));
        assert_eq!(r.query_param("flag"), Some(""));
    }

    #[test]
    fn method_override_applies_to_post_only() {
        let r = Request::post("/user/1").with_body(body(json!({"_method": "delete", "x": 1})));
        assert_eq!(r.method, Method::DELETE);
        assert!(r.param("_method").is_none());

        let r = Request::get("/user/1").with_body(body(json!({"_method": "delete"})));
        assert_eq!(r.method, Method::GET);
    }

    #[test]
    fn nested_data_is_merged_without_overwriting() {
        let r = Request::post("/user").with_body(body(json!({"name": "top", "data": {"name": "inner", "age": 3}})));
        assert_eq!(r.param("name"), Some(&json!("top")));
        assert_eq!(r.param("age"), Some(&json!(3)));
        assert!(r.param("data").is_none());
    }
}
