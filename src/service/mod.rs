//! Data access: per-entity DAOs and the registry that builds them.

mod dao;
mod models;
pub use dao::Dao;
pub use models::{DaoKind, ModelDef, ModelRegistry, Models};
