//! Per-request controller state: the request, the signed-in user, view variables
//! and a pending redirect.

use crate::error::AppError;
use crate::request::Request;
use crate::view::{layout_path, view_path, ViewRenderer, CONTENT_VAR, DEFAULT_LAYOUT};
use serde_json::{Map, Value};
use std::sync::Arc;

pub const USER_VAR: &str = "user";

/// Per-request state an action works with: the request, view variables,
/// the pending redirect and layout choice.
pub struct Context {
    request: Request,
    user: Option<Value>,
    vars: Map<String, Value>,
    redirect: Option<String>,
    layout: Option<String>,
    default_view: String,
    renderer: Option<Arc<dyn ViewRenderer>>,
}

impl Context {
    pub fn new(request: Request, controller: &str, action: &str, renderer: Option<Arc<dyn ViewRenderer>>) -> Self {
        Context {
            request,
            user: None,
            vars: Map::new(),
            redirect: None,
            layout: Some(DEFAULT_LAYOUT.to_string()),
            default_view: format!("{}/{}", controller, action),
            renderer,
        }
    }

    pub fn request(&self) -> &Request {
        &self.request
    }

    pub fn user(&self) -> Option<&Value> {
        self.user.as_ref()
    }

    pub(crate) fn set_user(&mut self, user: Option<Value>) {
        self.vars.insert(USER_VAR.to_string(), user.clone().unwrap_or(Value::Null));
        self.user = user;
    }

    pub fn add_var(&mut self, name: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.vars.insert(name.into(), value.into());
        self
    }

    pub fn vars(&self) -> &Map<String, Value> {
        &self.vars
    }

    /// Requests a redirect. The action's return value is discarded.
    pub fn redirect(&mut self, target: impl Into<String>) {
        self.redirect = Some(target.into());
    }

    pub fn redirect_target(&self) -> Option<&str> {
        self.redirect.as_deref()
    }

    pub(crate) fn take_redirect(&mut self) -> Option<String> {
        self.redirect.take()
    }

    /// `None` renders views without a layout.
    pub fn set_layout(&mut self, layout: Option<&str>) {
        self.layout = layout.map(str::to_string);
    }

    pub fn layout(&self) -> Option<&str> {
        self.layout.as_deref()
    }

    /// Renders `Controller/action`.
    pub fn render(&self) -> Result<String, AppError> {
        self.view(&self.default_view)
    }

    /// Renders a named view inside the current layout. Empty while a redirect is pending.
    pub fn view(&self, name: &str) -> Result<String, AppError> {
        if self.redirect.is_some() {
            return Ok(String::new());
        }
        let path = view_path(name);
        let renderer = self.renderer.as_ref().ok_or_else(|| AppError::ViewNotFound(path.clone()))?;
        let inner = renderer.render(&path, &self.vars)?;
        let Some(layout) = &self.layout else {
            return Ok(inner);
        };
        let mut vars = self.vars.clone();
        vars.insert(CONTENT_VAR.to_string(), Value::String(inner));
        renderer.render(&layout_path(layout), &vars)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    /// Echoes the path and the variables it saw.
    struct Echo;

    impl ViewRenderer for Echo {
        fn render(&self, path: &str, vars: &Map<String, Value>) -> Result<String, AppError> {
            let content = vars.get(CONTENT_VAR).and_then(Value::as_str).unwrap_or("-");
            let title = vars.get("title").and_then(Value::as_str).unwrap_or("-");
            Ok(format!("{}[{}|{}]", path, title, content))
        }
    }

    fn ctx(renderer: Option<Arc<dyn ViewRenderer>>) -> Context {
        Context::new(Request::get("/"), "Home", "index", renderer)
    }

    #[test]
    fn view_is_wrapped_in_layout() {
        let mut c = ctx(Some(Arc::new(Echo)));
        c.add_var("title", "Hi");
        assert_eq!(
            c.render().unwrap(),
            "Views/Layout/default.html[Hi|Views/Home/index.html[Hi|-]]"
        );
    }

    #[test]
    fn no_layout_renders_bare_view() {
        let mut c = ctx(Some(Arc::new(Echo)));
        c.set_layout(None);
        assert_eq!(c.view("users.list").unwrap(), "Views/users/list.html[-|-]");
    }

    #[test]
    fn pending_redirect_renders_nothing() {
        let mut c = ctx(None);
        c.redirect("/login");
        assert_eq!(c.render().unwrap(), "");
        assert_eq!(c.redirect_target(), Some("/login"));
    }

    #[test]
    fn missing_renderer_is_view_not_found() {
        let err = ctx(None).render().unwrap_err();
        assert!(matches!(err, AppError::ViewNotFound(ref p) if p == "Views/Home/index.html"));
    }

    #[test]
    fn user_is_exposed_as_var() {
        let mut c = ctx(None);
        c.set_user(Some(json!({"name": "ada"})));
        assert_eq!(c.vars()[USER_VAR], json!({"name": "ada"}));
        assert_eq!(c.user(), Some(&json!({"name": "ada"})));
    }
}
