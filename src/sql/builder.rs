//! Builds parameterized INSERT, SELECT, UPDATE, DELETE for one entity.
//!
//! Identifiers come from validated schemas only; every value travels as a
//! named `:attribute` parameter.

use crate::entity::{Entity, EntitySchema};
use crate::sql::params::{Bind, ParamType};
use serde_json::Value;

/// SQL text plus the parameters it expects, in binding order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct QueryBuf {
    pub sql: String,
    pub params: Vec<Bind>,
}

impl QueryBuf {
    fn new() -> Self {
        QueryBuf {
            sql: String::new(),
            params: Vec::new(),
        }
    }

    /// Registers a parameter and returns its placeholder.
    fn push_param(&mut self, name: &str, value: Value, ty: ParamType) -> String {
        self.params.push(Bind {
            name: name.to_string(),
            value,
            ty,
        });
        format!(":{}", name)
    }
}

/// `[A-Za-z_][A-Za-z0-9_]*`, optionally schema-qualified with one dot.
pub fn is_identifier(s: &str) -> bool {
    let segments: Vec<&str> = s.split('.').collect();
    segments.len() <= 2
        && segments.iter().all(|seg| {
            let mut chars = seg.chars();
            matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        })
}

fn value_of(entity: &Entity, name: &str) -> Value {
    entity.get(name).cloned().unwrap_or(Value::Null)
}

/// INSERT of the dirty attributes, in dirty order.
pub fn insert(table: &str, entity: &Entity) -> QueryBuf {
    let mut q = QueryBuf::new();
    let schema = entity.schema();
    let mut cols = Vec::new();
    let mut placeholders = Vec::new();
    for name in entity.dirty() {
        let Some(attr) = schema.attribute(name) else { continue };
        cols.push(attr.column.clone());
        placeholders.push(q.push_param(name, value_of(entity, name), attr.ty.param_type()));
    }
    q.sql = format!(
        "INSERT INTO {} ({}) VALUES ({})",
        table,
        cols.join(","),
        placeholders.join(",")
    );
    q
}

/// UPDATE of the dirty attributes, keyed by the primary key. The key itself is never
/// part of the SET list. Returns `None` when nothing besides the key is dirty.
pub fn update(table: &str, entity: &Entity) -> Option<QueryBuf> {
    let mut q = QueryBuf::new();
    let schema = entity.schema();
    let pk = schema.primary_key_attribute();
    let mut sets = Vec::new();
    for name in entity.dirty() {
        if *name == pk.name {
            continue;
        }
        let Some(attr) = schema.attribute(name) else { continue };
        let ph = q.push_param(name, value_of(entity, name), attr.ty.param_type());
        sets.push(format!("{}={}", attr.column, ph));
    }
    if sets.is_empty() {
        return None;
    }
    let key = q.push_param(&pk.name, value_of(entity, &pk.name), pk.ty.param_type());
    q.sql = format!("UPDATE {} SET {} WHERE {}={}", table, sets.join(","), pk.column, key);
    Some(q)
}

/// DELETE by primary key, bound with the key's declared type.
pub fn delete(table: &str, entity: &Entity) -> QueryBuf {
    let mut q = QueryBuf::new();
    let pk = entity.schema().primary_key_attribute();
    let key = q.push_param(&pk.name, value_of(entity, &pk.name), pk.ty.param_type());
    q.sql = format!("DELETE FROM {} WHERE {}={}", table, pk.column, key);
    q
}

/// SELECT by primary key. The id binds as an integer when it looks numeric.
pub fn select_by_id(table: &str, schema: &EntitySchema, id: &Value) -> QueryBuf {
    let mut q = QueryBuf::new();
    let pk = schema.primary_key_attribute();
    let key = q.push_param(&pk.name, id.clone(), ParamType::for_id(id));
    q.sql = format!("SELECT * FROM {} WHERE {}={}", table, pk.column, key);
    q
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::AttributeType;
    use serde_json::json;
    use std::sync::Arc;

    fn schema() -> Arc<EntitySchema> {
        EntitySchema::builder("Person")
            .attribute("id", AttributeType::Integer)
            .attribute("name", AttributeType::String)
            .attribute("age", AttributeType::Integer)
            .column("bio", AttributeType::Blob, "biography")
            .build()
            .unwrap()
    }

    fn person() -> Entity {
        let mut e = Entity::new(schema());
        e.set("name", "Ada");
        e.set("age", 36);
        e
    }

    #[test]
    fn insert_lists_dirty_columns() {
        let q = insert("t", &person());
        assert_eq!(q.sql, "INSERT INTO t (name,age) VALUES (:name,:age)");
        assert_eq!(q.params[0].ty, ParamType::Str);
        assert_eq!(q.params[1].ty, ParamType::Int);
        assert_eq!(q.params[1].value, json!(36));
    }

    #[test]
    fn insert_uses_mapped_column_names() {
        let mut e = Entity::new(schema());
        e.set("bio", "analyst");
        e.set("nickname", "ignored");
        let q = insert("people", &e);
        assert_eq!(q.sql, "INSERT INTO people (biography) VALUES (:bio)");
        assert_eq!(q.params.len(), 1);
    }

    #[test]
    fn update_binds_key_with_declared_type() {
        let mut e = person();
        e.set("id", "9");
        let q = update("t", &e).unwrap();
        assert_eq!(q.sql, "UPDATE t SET name=:name,age=:age WHERE id=:id");
        let key = q.params.last().unwrap();
        assert_eq!(key.name, "id");
        assert_eq!(key.ty, ParamType::Int);
        assert_eq!(key.value, json!("9"));
    }

    #[test]
    fn update_without_changes_builds_nothing() {
        let mut e = Entity::new(schema());
        e.set("id", 1);
        assert!(update("t", &e).is_none());
    }

    #[test]
    fn delete_and_select_shapes() {
        let mut e = Entity::new(schema());
        e.set("id", 5);
        assert_eq!(delete("t", &e).sql, "DELETE FROM t WHERE id=:id");

        let q = select_by_id("t", &schema(), &json!("abc"));
        assert_eq!(q.sql, "SELECT * FROM t WHERE id=:id");
        assert_eq!(q.params[0].ty, ParamType::Str);
        assert_eq!(select_by_id("t", &schema(), &json!("12")).params[0].ty, ParamType::Int);
    }

    #[test]
    fn identifiers() {
        assert!(is_identifier("users"));
        assert!(is_identifier("app.users"));
        assert!(is_identifier("_tmp1"));
        assert!(!is_identifier("1users"));
        assert!(!is_identifier("users;"));
        assert!(!is_identifier("a.b.c"));
        assert!(!is_identifier(""));
    }
}
