//! Waypoint: a small MVC web framework.
//!
//! Routes map `(method, path)` to `Controller@action`; the dispatcher builds the
//! controller with its models and runs the action; entities are persisted through
//! DAOs that emit parameterized SQL.

pub mod app;
pub mod auth;
pub mod config;
pub mod controller;
pub mod entity;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod request;
pub mod response;
pub mod router;
pub mod routes;
pub mod service;
pub mod sql;
pub mod state;
pub mod store;
pub mod view;

pub use app::Application;
pub use auth::Authenticator;
pub use config::{load, validate, AppConfig};
pub use controller::{ActionFuture, ActionOutput, Actions, Context, Controller, Dispatcher};
pub use entity::{AttributeType, Entity, EntitySchema};
pub use error::{AppError, ConfigError};
pub use request::Request;
pub use response::{PayloadKind, ResponsePayload};
pub use router::{RouteMatch, Router};
pub use routes::{app_routes, common_routes};
pub use service::{Dao, DaoKind, ModelDef, ModelRegistry, Models};
pub use state::AppState;
pub use store::{Connection, ConnectionProvider, Connector, Statement};
pub use view::ViewRenderer;
