//! Live connection set and broadcast fan-out.
//!
//! Each connection is addressed by an opaque uuid and owns the sending side
//! of its writer task's queue. Removal is idempotent; a connection whose
//! queue is closed or stays full is reported back to the caller for removal.

use log::{debug, info};
use std::collections::HashMap;
use tokio::sync::mpsc;
use uuid::Uuid;

/// Server-side handle to one connected client.
#[derive(Debug)]
pub struct Connection {
    pub id: Uuid,
    outbound: mpsc::Sender<String>,
}

impl Connection {
    pub fn new(id: Uuid, outbound: mpsc::Sender<String>) -> Self {
        Self { id, outbound }
    }

    /// Queues a frame without waiting. `false` means the writer task is gone
    /// or the queue is full; either way the connection is considered dead.
    fn try_send(&self, frame: &str) -> bool {
        self.outbound.try_send(frame.to_string()).is_ok()
    }
}

/// Owns the set of live connections.
#[derive(Debug, Default)]
pub struct ConnectionManager {
    connections: HashMap<Uuid, Connection>,
}

impl ConnectionManager {
    pub fn new() -> Self {
        Self {
            connections: HashMap::new(),
        }
    }

    pub fn insert(&mut self, connection: Connection) {
        info!("Connection {} registered", connection.id);
        self.connections.insert(connection.id, connection);
    }

    /// Removes a connection; removing an already-removed id is a no-op.
    pub fn remove(&mut self, id: &Uuid) {
        if self.connections.remove(id).is_some() {
            info!("Connection {} removed", id);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    /// Sends a frame to every live connection and returns the ids whose send
    /// failed; the caller removes those.
    pub fn broadcast(&self, frame: &str) -> Vec<Uuid> {
        let mut failed = Vec::new();
        for connection in self.connections.values() {
            if !connection.try_send(frame) {
                debug!("Connection {} rejected broadcast", connection.id);
                failed.push(connection.id);
            }
        }
        failed
    }
}
