//! Pluggable lookup of the current user.

use crate::request::Request;
use async_trait::async_trait;
use serde_json::Value;

/// Looks up the user behind a request. Sessions and cookies live behind this trait.
#[async_trait]
pub trait Authenticator: Send + Sync {
    async fn current_user(&self, request: &Request) -> Option<Value>;
}
