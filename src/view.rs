//! View rendering boundary.

use crate::error::AppError;
use serde_json::{Map, Value};

pub const VIEW_ROOT: &str = "Views";
pub const LAYOUT_DIR: &str = "Layout";
pub const DEFAULT_LAYOUT: &str = "default";
/// Variable holding the inner view output when rendering a layout.
pub const CONTENT_VAR: &str = "content";

/// Renders a template file with a variable map.
pub trait ViewRenderer: Send + Sync {
    fn render(&self, path: &str, vars: &Map<String, Value>) -> Result<String, AppError>;
}

/// `users.show` -> `Views/users/show.html`
pub fn view_path(name: &str) -> String {
    format!("{}/{}.html", VIEW_ROOT, name.replace('.', "/"))
}

pub fn layout_path(layout: &str) -> String {
    format!("{}/{}/{}.html", VIEW_ROOT, LAYOUT_DIR, layout)
}
