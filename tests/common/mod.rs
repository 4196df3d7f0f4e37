//! In-memory storage for integration tests: records every executed statement
//! and answers queries from scripted results.

#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use waypoint::sql::ParamType;
use waypoint::store::Row;
use waypoint::{AppError, Connection, ConnectionProvider, Connector, Statement};

#[derive(Clone, Debug, PartialEq)]
pub struct Executed {
    pub sql: String,
    pub binds: Vec<(String, Value, ParamType)>,
}

impl Executed {
    pub fn bind(&self, name: &str) -> Option<(&Value, ParamType)> {
        self.binds.iter().find(|(n, _, _)| n == name).map(|(_, v, t)| (v, *t))
    }
}

#[derive(Default)]
struct Script {
    executed: Vec<Executed>,
    results: VecDeque<Vec<Row>>,
    affected: VecDeque<u64>,
    generated_ids: VecDeque<Value>,
}

/// Shared recording connection. Clones see the same log.
#[derive(Clone, Default)]
pub struct Recorder {
    script: Arc<Mutex<Script>>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rows returned by the next SELECT.
    pub fn returns(&self, rows: Vec<Value>) -> &Self {
        let rows = rows
            .into_iter()
            .filter_map(|r| match r {
                Value::Object(m) => Some(m),
                _ => None,
            })
            .collect();
        self.script.lock().unwrap().results.push_back(rows);
        self
    }

    /// Affected-row count for the next write (defaults to 1).
    pub fn affects(&self, n: u64) -> &Self {
        self.script.lock().unwrap().affected.push_back(n);
        self
    }

    /// Identity reported by the next INSERT.
    pub fn generates(&self, id: impl Into<Value>) -> &Self {
        self.script.lock().unwrap().generated_ids.push_back(id.into());
        self
    }

    pub fn executed(&self) -> Vec<Executed> {
        self.script.lock().unwrap().executed.clone()
    }

    pub fn last(&self) -> Executed {
        self.executed().pop().expect("no statement executed")
    }
}

#[async_trait]
impl Connection for Recorder {
    async fn prepare(&self, sql: &str) -> Result<Box<dyn Statement>, AppError> {
        Ok(Box::new(RecordedStatement {
            script: self.script.clone(),
            sql: sql.to_string(),
            binds: Vec::new(),
            rows: VecDeque::new(),
            generated_id: None,
        }))
    }
}

struct RecordedStatement {
    script: Arc<Mutex<Script>>,
    sql: String,
    binds: Vec<(String, Value, ParamType)>,
    rows: VecDeque<Row>,
    generated_id: Option<Value>,
}

#[async_trait]
impl Statement for RecordedStatement {
    fn bind_param(&mut self, name: &str, value: Value, ty: ParamType) {
        self.binds.retain(|(n, _, _)| n != name);
        self.binds.push((name.to_string(), value, ty));
    }

    async fn execute(&mut self) -> Result<u64, AppError> {
        let mut script = self.script.lock().unwrap();
        script.executed.push(Executed {
            sql: self.sql.clone(),
            binds: self.binds.clone(),
        });
        if self.sql.starts_with("SELECT") {
            self.rows = script.results.pop_front().unwrap_or_default().into();
            return Ok(self.rows.len() as u64);
        }
        if self.sql.starts_with("INSERT") {
            self.generated_id = script.generated_ids.pop_front();
        }
        Ok(script.affected.pop_front().unwrap_or(1))
    }

    async fn fetch_row(&mut self) -> Result<Option<Row>, AppError> {
        Ok(self.rows.pop_front())
    }

    fn generated_id(&self) -> Option<Value> {
        self.generated_id.clone()
    }
}

/// Hands out the same recorder for every database name and counts connects.
#[derive(Default)]
pub struct RecorderConnector {
    pub recorder: Recorder,
    pub connects: AtomicUsize,
}

#[async_trait]
impl Connector for RecorderConnector {
    async fn connect(&self, name: &str) -> Result<Arc<dyn Connection>, AppError> {
        if name != "default" {
            return Err(AppError::DatabaseNotConfigured(name.to_string()));
        }
        self.connects.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(self.recorder.clone()))
    }
}

pub fn provider(recorder: &Recorder) -> Arc<ConnectionProvider> {
    Arc::new(ConnectionProvider::new(Arc::new(RecorderConnector {
        recorder: recorder.clone(),
        connects: AtomicUsize::new(0),
    })))
}

pub fn obj(v: Value) -> Map<String, Value> {
    match v {
        Value::Object(m) => m,
        _ => Map::new(),
    }
}
