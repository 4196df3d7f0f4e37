//! Typed errors and HTTP mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid route pattern '{pattern}': {reason}")]
    InvalidRoute { pattern: String, reason: String },
    #[error("invalid route target '{0}' (expected Controller@action)")]
    InvalidTarget(String),
    #[error("invalid {kind} identifier '{name}'")]
    InvalidIdentifier { kind: &'static str, name: String },
    #[error("duplicate attribute '{attribute}' in entity {entity}")]
    DuplicateAttribute { entity: String, attribute: String },
    #[error("invalid primary key: entity {entity} has no attribute '{key}'")]
    InvalidPrimaryKey { entity: String, key: String },
    #[error("unknown attribute type '{0}' (expected i, s, b or d)")]
    UnknownAttributeType(String),
    #[error("unknown dao kind '{0}'")]
    UnknownDaoKind(String),
    #[error("missing reference: {kind} '{id}'")]
    MissingReference { kind: &'static str, id: String },
    #[error("config load: {0}")]
    Load(String),
    #[error("validation: {0}")]
    Validation(String),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("no route table for method {0}")]
    NoRoute(String),
    #[error("no route found for {0}")]
    RouteNotFound(String),
    #[error("controller '{0}' does not exist")]
    ControllerNotFound(String),
    #[error("action '{action}' does not exist on controller '{controller}'")]
    ActionNotFound { controller: String, action: String },
    #[error("action '{action}' expects argument '{name}'")]
    MissingArgument { action: String, name: String },
    #[error("entity does not exist in {table}: id({id})")]
    EntityNotFound { table: String, id: String },
    #[error("{operation} rejected: {table} is read-only")]
    ReadOnlyViolation { table: String, operation: &'static str },
    #[error("model '{model}' is not configured for dao kind '{kind}'")]
    ModelNotConfigured { model: String, kind: String },
    #[error("database '{0}' is not configured")]
    DatabaseNotConfigured(String),
    #[error("view '{0}' does not exist")]
    ViewNotFound(String),
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("storage: {0}")]
    Storage(String),
    #[error("database: {0}")]
    Db(#[from] sqlx::Error),
}

impl AppError {
    /// Status class and machine code reported to clients.
    pub fn status_code(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::Config(_) => (StatusCode::INTERNAL_SERVER_ERROR, "config_error"),
            AppError::NoRoute(_) | AppError::RouteNotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            AppError::ControllerNotFound(_) => (StatusCode::NOT_FOUND, "controller_not_found"),
            AppError::ActionNotFound { .. } => (StatusCode::NOT_FOUND, "action_not_found"),
            AppError::MissingArgument { .. } => (StatusCode::BAD_REQUEST, "missing_argument"),
            AppError::EntityNotFound { .. } => (StatusCode::NOT_FOUND, "entity_not_found"),
            AppError::ReadOnlyViolation { .. } => (StatusCode::FORBIDDEN, "read_only"),
            AppError::ModelNotConfigured { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "model_not_configured"),
            AppError::DatabaseNotConfigured(_) => (StatusCode::INTERNAL_SERVER_ERROR, "database_not_configured"),
            AppError::ViewNotFound(_) => (StatusCode::INTERNAL_SERVER_ERROR, "view_not_found"),
            AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
            AppError::Storage(_) => (StatusCode::INTERNAL_SERVER_ERROR, "database_error"),
            AppError::Db(e) => {
                if let sqlx::Error::RowNotFound = e {
                    (StatusCode::NOT_FOUND, "not_found")
                } else {
                    (StatusCode::INTERNAL_SERVER_ERROR, "database_error")
                }
            }
        }
    }
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, code, "request failed");
        } else {
            tracing::debug!(error = %self, code, "request rejected");
        }
        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message: self.to_string(),
                details: None,
            },
        };
        (status, Json(body)).into_response()
    }
}
