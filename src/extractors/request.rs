//! Builds a framework [`Request`] from an axum request: method, path, query and body.

use crate::error::AppError;
use crate::request::Request;
use async_trait::async_trait;
use axum::{
    extract::{FromRequest, Query},
    http::{header::CONTENT_TYPE, Method},
    Form, Json,
};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Extractor wrapping the transport-independent request.
#[derive(Clone, Debug)]
pub struct HttpRequest(pub Request);

#[async_trait]
impl<S> FromRequest<S> for HttpRequest
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: axum::extract::Request, state: &S) -> Result<Self, Self::Rejection> {
        let method = req.method().clone();
        let uri = req.uri().clone();
        let query = Query::<HashMap<String, String>>::try_from_uri(&uri)
            .map(|Query(q)| q)
            .unwrap_or_default();
        let content_type = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        let body = if method == Method::GET || method == Method::HEAD {
            Map::new()
        } else if content_type.starts_with("application/json") {
            let Json(value) = Json::<Value>::from_request(req, state)
                .await
                .map_err(|e| AppError::BadRequest(e.body_text()))?;
            match value {
                Value::Object(m) => m,
                Value::Null => Map::new(),
                _ => return Err(AppError::BadRequest("body must be a JSON object".into())),
            }
        } else if content_type.starts_with("application/x-www-form-urlencoded") {
            let Form(fields) = Form::<HashMap<String, String>>::from_request(req, state)
                .await
                .map_err(|e| AppError::BadRequest(e.body_text()))?;
            fields.into_iter().map(|(k, v)| (k, Value::String(v))).collect()
        } else {
            Map::new()
        };

        Ok(HttpRequest(
            Request::new(method, uri.path()).with_query(query).with_body(body),
        ))
    }
}
