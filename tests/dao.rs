mod common;

use common::Recorder;
use serde_json::{json, Value};
use std::sync::Arc;
use waypoint::sql::ParamType;
use waypoint::{AppError, AttributeType, Dao, EntitySchema};

fn user_schema() -> Arc<EntitySchema> {
    EntitySchema::builder("User")
        .attribute("id", AttributeType::Integer)
        .attribute("name", AttributeType::String)
        .attribute("age", AttributeType::Integer)
        .build()
        .unwrap()
}

fn users(recorder: &Recorder) -> Dao {
    Dao::new("users", user_schema(), Arc::new(recorder.clone())).unwrap()
}

#[tokio::test]
async fn create_inserts_dirty_attributes_and_writes_back_id() {
    let db = Recorder::new();
    db.generates(7);
    let dao = users(&db);

    let mut user = dao.new_entity();
    user.set("name", "ada");
    user.set("age", "36");
    user.set("nickname", "countess");
    let affected = dao.create(&mut user).await.unwrap();

    assert_eq!(affected, 1);
    let stmt = db.last();
    assert_eq!(stmt.sql, "INSERT INTO users (name,age) VALUES (:name,:age)");
    assert_eq!(stmt.bind("name"), Some((&json!("ada"), ParamType::Str)));
    assert_eq!(stmt.bind("age"), Some((&json!("36"), ParamType::Int)));
    assert_eq!(user.get("id"), Some(&json!(7)));
    assert!(!user.is_new());
    assert!(user.dirty().is_empty());
    assert_eq!(dao.last_statement(), "INSERT INTO users (name,age) VALUES ('ada',36)");
}

#[tokio::test]
async fn edit_updates_dirty_attributes_by_key() {
    let db = Recorder::new();
    db.returns(vec![json!({"id": 3, "name": "ada", "age": 36})]);
    let dao = users(&db);

    let mut user = dao.get(3).await.unwrap();
    assert!(!user.is_new());
    assert!(user.dirty().is_empty());

    user.set("name", "grace");
    user.set("name", "hopper");
    assert_eq!(user.dirty(), ["name".to_string()]);
    assert_eq!(dao.edit(&mut user).await.unwrap(), 1);

    let stmt = db.last();
    assert_eq!(stmt.sql, "UPDATE users SET name=:name WHERE id=:id");
    assert_eq!(stmt.bind("name"), Some((&json!("hopper"), ParamType::Str)));
    assert_eq!(stmt.bind("id"), Some((&json!(3), ParamType::Int)));
}

#[tokio::test]
async fn edit_of_missing_row_reports_zero() {
    let db = Recorder::new();
    db.affects(0);
    let dao = users(&db);

    let mut ghost = dao.new_entity();
    ghost.set("id", 99);
    ghost.set("age", 1);
    assert_eq!(dao.edit(&mut ghost).await.unwrap(), 0);
    assert_eq!(ghost.dirty(), ["id".to_string(), "age".to_string()]);
}

#[tokio::test]
async fn edit_with_nothing_dirty_skips_storage() {
    let db = Recorder::new();
    let dao = users(&db);
    let mut user = dao.new_entity();
    user.set("id", 5);
    assert_eq!(dao.edit(&mut user).await.unwrap(), 0);
    assert!(db.executed().is_empty());
}

#[tokio::test]
async fn delete_binds_key_with_declared_type() {
    let db = Recorder::new();
    let dao = users(&db);
    let mut user = dao.new_entity();
    user.set("id", "12");
    assert_eq!(dao.delete(&user).await.unwrap(), 1);

    let stmt = db.last();
    assert_eq!(stmt.sql, "DELETE FROM users WHERE id=:id");
    assert_eq!(stmt.bind("id"), Some((&json!("12"), ParamType::Int)));
}

#[tokio::test]
async fn get_binds_numeric_ids_as_integers() {
    let db = Recorder::new();
    db.returns(vec![json!({"id": 1, "name": "a"})]);
    db.returns(vec![json!({"id": 2, "name": "b"})]);
    db.returns(vec![]);
    let dao = users(&db);

    dao.get("1").await.unwrap();
    assert_eq!(db.last().bind("id").map(|(_, t)| t), Some(ParamType::Int));
    dao.get(2).await.unwrap();
    assert_eq!(db.last().bind("id").map(|(_, t)| t), Some(ParamType::Int));
    let err = dao.get("abc").await.unwrap_err();
    assert_eq!(db.last().bind("id").map(|(_, t)| t), Some(ParamType::Str));
    assert!(matches!(err, AppError::EntityNotFound { ref table, ref id } if table == "users" && id == "abc"));
}

#[tokio::test]
async fn get_seeds_entity_from_mapped_columns() {
    let schema = EntitySchema::builder("Post")
        .attribute("id", AttributeType::Integer)
        .column("title", AttributeType::String, "post_title")
        .build()
        .unwrap();
    let db = Recorder::new();
    db.returns(vec![json!({"id": 4, "post_title": "Hello", "views": 10})]);
    let dao = Dao::new("posts", schema, Arc::new(db.clone())).unwrap();

    let post = dao.get(4).await.unwrap();
    assert_eq!(post.get("title"), Some(&json!("Hello")));
    assert_eq!(post.get("views"), Some(&json!(10)));
    assert_eq!(Value::from(post), json!({"id": 4, "title": "Hello", "views": 10}));
}

#[tokio::test]
async fn read_only_dao_never_touches_storage() {
    let db = Recorder::new();
    let dao = users(&db).read_only(true);
    let mut user = dao.new_entity();
    user.set("name", "ada");

    assert!(matches!(dao.create(&mut user).await, Err(AppError::ReadOnlyViolation { .. })));
    assert!(matches!(dao.edit(&mut user).await, Err(AppError::ReadOnlyViolation { .. })));
    assert!(matches!(dao.delete(&user).await, Err(AppError::ReadOnlyViolation { .. })));
    assert!(db.executed().is_empty());

    db.returns(vec![json!({"id": 1})]);
    assert!(dao.get(1).await.is_ok());
}
