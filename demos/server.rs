//! Demo server: config from `WAYPOINT_CONFIG` or env, a MySQL-backed `User`
//! model, and two controllers.
//!
//! ```text
//! DATABASE_URL=mysql://root@localhost/demo cargo run --example server
//! curl localhost:3000/user/1
//! curl -X POST localhost:3000/user -H 'content-type: application/json' -d '{"name":"ada","age":36}'
//! ```

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;
use waypoint::{
    app_routes,
    config::load,
    store::MySqlConnector,
    view::ViewRenderer,
    ActionFuture, ActionOutput, Actions, AppError, AppState, Application, AttributeType, ConnectionProvider, Context,
    Controller, Dao, DaoKind, Dispatcher, EntitySchema, ModelDef, ModelRegistry, Models, Router,
};

/// Reads `Views/...` from disk and replaces `{{name}}` with string vars.
struct FileViews;

impl ViewRenderer for FileViews {
    fn render(&self, path: &str, vars: &serde_json::Map<String, serde_json::Value>) -> Result<String, AppError> {
        let mut text = std::fs::read_to_string(path).map_err(|_| AppError::ViewNotFound(path.to_string()))?;
        for (k, v) in vars {
            let shown = match v {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            text = text.replace(&format!("{{{{{}}}}}", k), &shown);
        }
        Ok(text)
    }
}

struct Home;

impl Home {
    fn index<'a>(&'a mut self, ctx: &'a mut Context, _args: Vec<String>) -> ActionFuture<'a> {
        Box::pin(async move {
            ctx.add_var("title", "waypoint");
            match ctx.render() {
                Ok(html) => Ok(ActionOutput::Html(html)),
                Err(AppError::ViewNotFound(_)) => Ok(ActionOutput::from("<h1>waypoint</h1>")),
                Err(e) => Err(e),
            }
        })
    }
}

impl Controller for Home {
    fn create(_models: &Models) -> Result<Self, AppError> {
        Ok(Home)
    }

    fn actions(actions: &mut Actions<Self>) {
        actions.action("index", &[], Home::index);
    }
}

struct Users {
    users: Arc<Dao>,
}

impl Users {
    fn show<'a>(&'a mut self, _ctx: &'a mut Context, args: Vec<String>) -> ActionFuture<'a> {
        Box::pin(async move { Ok(ActionOutput::from(self.users.get(args[0].as_str()).await?)) })
    }

    fn store<'a>(&'a mut self, ctx: &'a mut Context, _args: Vec<String>) -> ActionFuture<'a> {
        Box::pin(async move {
            let mut user = self.users.new_entity();
            user.set_many(ctx.request().body.clone());
            self.users.create(&mut user).await?;
            Ok(ActionOutput::from(user))
        })
    }

    fn update<'a>(&'a mut self, ctx: &'a mut Context, args: Vec<String>) -> ActionFuture<'a> {
        Box::pin(async move {
            let mut user = self.users.get(args[0].as_str()).await?;
            user.set_many(ctx.request().body.clone());
            self.users.edit(&mut user).await?;
            Ok(ActionOutput::from(user))
        })
    }

    fn delete<'a>(&'a mut self, ctx: &'a mut Context, args: Vec<String>) -> ActionFuture<'a> {
        Box::pin(async move {
            let user = self.users.get(args[0].as_str()).await?;
            self.users.delete(&user).await?;
            ctx.redirect("/");
            Ok(ActionOutput::Empty)
        })
    }
}

impl Controller for Users {
    fn models() -> Vec<(&'static str, DaoKind)> {
        vec![("User", DaoKind::Sql)]
    }

    fn create(models: &Models) -> Result<Self, AppError> {
        Ok(Users {
            users: models.get("User")?,
        })
    }

    fn actions(actions: &mut Actions<Self>) {
        actions
            .action("show", &["id"], Users::show)
            .action("store", &[], Users::store)
            .action("update", &["id"], Users::update)
            .action("delete", &["id"], Users::delete);
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("waypoint=info".parse()?))
        .init();

    let config = load().await?;
    let connections = Arc::new(ConnectionProvider::new(Arc::new(MySqlConnector::new(
        config.databases.clone(),
    ))));

    let mut models = ModelRegistry::from_config(&config, connections)?;
    if !config.models.contains_key("User") {
        let schema = EntitySchema::builder("User")
            .attribute("id", AttributeType::Integer)
            .attribute("name", AttributeType::String)
            .attribute("age", AttributeType::Integer)
            .build()?;
        models.define("User", ModelDef::new("users", schema));
    }

    let mut router = Router::from_config(&config.routes)?;
    router
        .get("/", "Home@index")?
        .get("/user/{id}", "Users@show")?
        .post("/user", "Users@store")?
        .post("/user/{id}", "Users@update")?
        .post("/user/{id}/delete", "Users@delete")?;

    let mut dispatcher = Dispatcher::new(Arc::new(models)).with_renderer(Arc::new(FileViews));
    dispatcher.register::<Home>("Home").register::<Users>("Users");

    let state = AppState::new(Application::new(router, dispatcher));
    let app = app_routes(state, config.server.body_limit);

    let listener = TcpListener::bind(&config.server.bind).await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
