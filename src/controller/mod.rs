//! Controller base: declared models, an explicit action registry and the
//! `before_action` hook.
//!
//! Actions are plain functions registered by name together with the names of
//! the route placeholders they take, in positional order:
//!
//! ```ignore
//! impl Users {
//!     fn show<'a>(&'a mut self, ctx: &'a mut Context, args: Vec<String>) -> ActionFuture<'a> {
//!         Box::pin(async move {
//!             let user = self.users.get(args[0].as_str()).await?;
//!             Ok(user.into())
//!         })
//!     }
//! }
//!
//! impl Controller for Users {
//!     fn actions(actions: &mut Actions<Self>) {
//!         actions.action("show", &["id"], Users::show);
//!     }
//!     // ...
//! }
//! ```

mod context;
mod dispatcher;

pub use context::Context;
pub use dispatcher::Dispatcher;

use crate::entity::Entity;
use crate::error::AppError;
use crate::response::ResponsePayload;
use crate::service::{DaoKind, Models};
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;

pub type ActionFuture<'a> = Pin<Box<dyn Future<Output = Result<ActionOutput, AppError>> + Send + 'a>>;

/// Action entry point: controller, request context, positional arguments.
pub type ActionFn<C> = for<'a> fn(&'a mut C, &'a mut Context, Vec<String>) -> ActionFuture<'a>;

pub struct Action<C> {
    pub params: Vec<&'static str>,
    pub handler: ActionFn<C>,
}

/// Names a controller exposes to routing. Anything not listed here is not dispatchable.
pub struct Actions<C> {
    by_name: HashMap<&'static str, Action<C>>,
}

impl<C> Default for Actions<C> {
    fn default() -> Self {
        Actions { by_name: HashMap::new() }
    }
}

impl<C> Actions<C> {
    pub fn action(&mut self, name: &'static str, params: &[&'static str], handler: ActionFn<C>) -> &mut Self {
        self.by_name.insert(
            name,
            Action {
                params: params.to_vec(),
                handler,
            },
        );
        self
    }

    pub fn get(&self, name: &str) -> Option<&Action<C>> {
        self.by_name.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

#[async_trait]
pub trait Controller: Send + Sized + 'static {
    /// Models this controller needs, as (model name, dao kind).
    fn models() -> Vec<(&'static str, DaoKind)> {
        Vec::new()
    }

    /// Builds the controller for one request from its resolved models.
    fn create(models: &Models) -> Result<Self, AppError>;

    fn actions(actions: &mut Actions<Self>);

    /// Runs before every action. A redirect set here skips the action.
    async fn before_action(&mut self, _ctx: &mut Context) -> Result<(), AppError> {
        Ok(())
    }
}

/// What an action returned, before it becomes a response.
#[derive(Clone, Debug, PartialEq)]
pub enum ActionOutput {
    Empty,
    Html(String),
    Json(Value),
}

impl ActionOutput {
    /// Serializes any value into a JSON output.
    pub fn json<T: Serialize>(value: &T) -> Result<Self, AppError> {
        serde_json::to_value(value)
            .map(ActionOutput::Json)
            .map_err(|e| AppError::BadRequest(format!("response not serializable: {}", e)))
    }

    pub fn into_payload(self) -> ResponsePayload {
        match self {
            ActionOutput::Empty => ResponsePayload::html(String::new()),
            ActionOutput::Html(body) => ResponsePayload::html(body),
            ActionOutput::Json(body) => ResponsePayload::json(body),
        }
    }
}

impl From<()> for ActionOutput {
    fn from(_: ()) -> Self {
        ActionOutput::Empty
    }
}

impl From<String> for ActionOutput {
    fn from(s: String) -> Self {
        ActionOutput::Html(s)
    }
}

impl From<&str> for ActionOutput {
    fn from(s: &str) -> Self {
        ActionOutput::Html(s.to_string())
    }
}

impl From<Value> for ActionOutput {
    fn from(v: Value) -> Self {
        match v {
            Value::Null => ActionOutput::Empty,
            Value::String(s) => ActionOutput::Html(s),
            Value::Object(_) | Value::Array(_) => ActionOutput::Json(v),
            scalar => ActionOutput::Html(scalar.to_string()),
        }
    }
}

impl From<Entity> for ActionOutput {
    fn from(e: Entity) -> Self {
        ActionOutput::Json(e.into())
    }
}

impl From<Vec<Entity>> for ActionOutput {
    fn from(list: Vec<Entity>) -> Self {
        ActionOutput::Json(Value::Array(list.into_iter().map(Value::from).collect()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{AttributeType, EntitySchema};
    use serde_json::json;

    #[test]
    fn values_classify_by_shape() {
        assert_eq!(ActionOutput::from(json!({"a": 1})), ActionOutput::Json(json!({"a": 1})));
        assert_eq!(ActionOutput::from(json!([1, 2])), ActionOutput::Json(json!([1, 2])));
        assert_eq!(ActionOutput::from(json!("hi")), ActionOutput::Html("hi".into()));
        assert_eq!(ActionOutput::from(json!(5)), ActionOutput::Html("5".into()));
        assert_eq!(ActionOutput::from(Value::Null), ActionOutput::Empty);
        assert_eq!(ActionOutput::from(()), ActionOutput::Empty);
    }

    #[test]
    fn entities_become_json() {
        let schema = EntitySchema::builder("User")
            .attribute("id", AttributeType::Integer)
            .attribute("name", AttributeType::String)
            .build()
            .unwrap();
        let mut e = Entity::new(schema);
        e.set("name", "ada");
        assert_eq!(ActionOutput::from(e), ActionOutput::Json(json!({"name": "ada"})));
    }

    #[test]
    fn serializable_structs_become_json() {
        #[derive(Serialize)]
        struct Page {
            n: u32,
        }
        assert_eq!(ActionOutput::json(&Page { n: 2 }).unwrap(), ActionOutput::Json(json!({"n": 2})));
    }

    #[test]
    fn empty_output_is_an_empty_html_body() {
        let payload = ActionOutput::Empty.into_payload();
        assert_eq!(payload, ResponsePayload::html(""));
    }
}
