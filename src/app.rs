//! Composition root: owns the route tables and the dispatcher.

use crate::controller::Dispatcher;
use crate::error::AppError;
use crate::request::Request;
use crate::response::ResponsePayload;
use crate::router::Router;

pub struct Application {
    router: Router,
    dispatcher: Dispatcher,
}

impl Application {
    pub fn new(router: Router, dispatcher: Dispatcher) -> Self {
        Application { router, dispatcher }
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Routes and dispatches one request.
    pub async fn handle(&self, request: Request) -> Result<ResponsePayload, AppError> {
        let route = self.router.resolve(&request.method, &request.path)?;
        self.dispatcher.dispatch(route, request).await
    }
}
