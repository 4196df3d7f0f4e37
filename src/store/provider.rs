//! Logical database name -> one shared connection, opened on first use.

use crate::error::AppError;
use crate::store::{Connection, Connector};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

pub struct ConnectionProvider {
    connector: Arc<dyn Connector>,
    /// Held across `connect` so two callers never open the same database twice.
    handles: Mutex<HashMap<String, Arc<dyn Connection>>>,
}

impl ConnectionProvider {
    pub fn new(connector: Arc<dyn Connector>) -> Self {
        ConnectionProvider {
            connector,
            handles: Mutex::new(HashMap::new()),
        }
    }

    pub async fn resolve(&self, name: &str) -> Result<Arc<dyn Connection>, AppError> {
        let mut handles = self.handles.lock().await;
        if let Some(conn) = handles.get(name) {
            return Ok(conn.clone());
        }
        let conn = self.connector.connect(name).await?;
        tracing::info!(database = %name, "connection opened");
        handles.insert(name.to_string(), conn.clone());
        Ok(conn)
    }

    /// Number of databases opened so far.
    pub async fn open_count(&self) -> usize {
        self.handles.lock().await.len()
    }
}
