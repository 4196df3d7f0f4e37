//! Controller lookup and action execution.

use super::{ActionOutput, Actions, Context, Controller};
use crate::auth::Authenticator;
use crate::error::AppError;
use crate::request::Request;
use crate::response::ResponsePayload;
use crate::router::RouteMatch;
use crate::service::ModelRegistry;
use crate::view::ViewRenderer;
use async_trait::async_trait;
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;

/// Object-safe view of one registered controller type.
#[async_trait]
trait Dispatch: Send + Sync {
    fn has_action(&self, action: &str) -> bool;

    async fn run(
        &self,
        action: &str,
        args: &HashMap<String, String>,
        ctx: &mut Context,
        models: &ModelRegistry,
    ) -> Result<ActionOutput, AppError>;
}

struct Registered<C> {
    actions: Actions<C>,
    _controller: PhantomData<fn() -> C>,
}

#[async_trait]
impl<C: Controller> Dispatch for Registered<C> {
    fn has_action(&self, action: &str) -> bool {
        self.actions.contains(action)
    }

    async fn run(
        &self,
        action: &str,
        args: &HashMap<String, String>,
        ctx: &mut Context,
        models: &ModelRegistry,
    ) -> Result<ActionOutput, AppError> {
        let declared = C::models();
        let resolved = models.resolve_all(&declared).await?;
        let mut controller = C::create(&resolved)?;

        controller.before_action(ctx).await?;
        if ctx.redirect_target().is_some() {
            return Ok(ActionOutput::Empty);
        }

        let entry = self.actions.get(action).ok_or_else(|| AppError::ActionNotFound {
            controller: std::any::type_name::<C>().to_string(),
            action: action.to_string(),
        })?;
        let positional = entry
            .params
            .iter()
            .map(|p| {
                args.get(*p).cloned().ok_or_else(|| AppError::MissingArgument {
                    action: action.to_string(),
                    name: p.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        (entry.handler)(&mut controller, ctx, positional).await
    }
}

/// Instantiates controllers and runs their actions.
pub struct Dispatcher {
    controllers: HashMap<String, Box<dyn Dispatch>>,
    models: Arc<ModelRegistry>,
    renderer: Option<Arc<dyn ViewRenderer>>,
    auth: Option<Arc<dyn Authenticator>>,
}

impl Dispatcher {
    pub fn new(models: Arc<ModelRegistry>) -> Self {
        Dispatcher {
            controllers: HashMap::new(),
            models,
            renderer: None,
            auth: None,
        }
    }

    pub fn with_renderer(mut self, renderer: Arc<dyn ViewRenderer>) -> Self {
        self.renderer = Some(renderer);
        self
    }

    pub fn with_authenticator(mut self, auth: Arc<dyn Authenticator>) -> Self {
        self.auth = Some(auth);
        self
    }

    /// Makes `C` reachable under `name` in route targets.
    pub fn register<C: Controller>(&mut self, name: impl Into<String>) -> &mut Self {
        let mut actions = Actions::default();
        C::actions(&mut actions);
        let name = name.into();
        tracing::info!(controller = %name, actions = actions.len(), "controller registered");
        self.controllers.insert(
            name,
            Box::new(Registered::<C> {
                actions,
                _controller: PhantomData,
            }),
        );
        self
    }

    pub fn models(&self) -> &Arc<ModelRegistry> {
        &self.models
    }

    pub async fn dispatch(&self, route: RouteMatch, request: Request) -> Result<ResponsePayload, AppError> {
        self.execute(&route.controller, &route.action, &route.args, request).await
    }

    /// Runs `controller@action` with named arguments.
    pub async fn execute(
        &self,
        controller: &str,
        action: &str,
        args: &HashMap<String, String>,
        request: Request,
    ) -> Result<ResponsePayload, AppError> {
        let target = self
            .controllers
            .get(controller)
            .ok_or_else(|| AppError::ControllerNotFound(controller.to_string()))?;
        if !target.has_action(action) {
            return Err(AppError::ActionNotFound {
                controller: controller.to_string(),
                action: action.to_string(),
            });
        }

        let user = match &self.auth {
            Some(auth) => auth.current_user(&request).await,
            None => None,
        };
        let mut ctx = Context::new(request, controller, action, self.renderer.clone());
        ctx.set_user(user);

        tracing::debug!(controller, action, "dispatching");
        let output = target.run(action, args, &mut ctx, &self.models).await?;
        if let Some(location) = ctx.take_redirect() {
            tracing::debug!(controller, action, %location, "redirecting");
            return Ok(ResponsePayload::redirect(location));
        }
        Ok(output.into_payload())
    }
}
