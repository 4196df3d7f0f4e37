//! Response payloads produced by dispatch.

use axum::{
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    Json,
};
use serde_json::Value;

#[derive(Clone, Debug, PartialEq)]
pub enum PayloadKind {
    Html(String),
    Json(Value),
    /// Target URL sent as `Location`.
    Redirect(String),
}

#[derive(Clone, Debug, PartialEq)]
pub struct ResponsePayload {
    pub status: StatusCode,
    pub kind: PayloadKind,
}

impl ResponsePayload {
    pub fn html(body: impl Into<String>) -> Self {
        ResponsePayload {
            status: StatusCode::OK,
            kind: PayloadKind::Html(body.into()),
        }
    }

    pub fn json(body: Value) -> Self {
        ResponsePayload {
            status: StatusCode::OK,
            kind: PayloadKind::Json(body),
        }
    }

    pub fn redirect(target: impl Into<String>) -> Self {
        ResponsePayload {
            status: StatusCode::FOUND,
            kind: PayloadKind::Redirect(target.into()),
        }
    }

    pub fn is_redirect(&self) -> bool {
        matches!(self.kind, PayloadKind::Redirect(_))
    }
}

impl IntoResponse for ResponsePayload {
    fn into_response(self) -> Response {
        match self.kind {
            PayloadKind::Html(body) => (self.status, Html(body)).into_response(),
            PayloadKind::Json(body) => (self.status, Json(body)).into_response(),
            PayloadKind::Redirect(target) => (self.status, [(header::LOCATION, target)]).into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redirect_sets_location() {
        let res = ResponsePayload::redirect("/login").into_response();
        assert_eq!(res.status(), StatusCode::FOUND);
        assert_eq!(res.headers().get(header::LOCATION).unwrap(), "/login");
    }

    #[test]
    fn json_payload_has_json_content_type() {
        let res = ResponsePayload::json(serde_json::json!({"id": 1})).into_response();
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(res.headers().get(header::CONTENT_TYPE).unwrap(), "application/json");
    }
}
