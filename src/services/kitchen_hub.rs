//! Registry of connected kitchen displays and fan-out of order events.
//!
//! Displays live in a `DashMap`, so register/unregister never block a
//! broadcast in progress. Each display owns a bounded outbound buffer that is
//! drained by its own writer task; `broadcast` only enqueues with `try_send`,
//! so it never waits on a display's network I/O.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use thiserror::Error;
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::models::kitchen::KitchenEvent;

/// Unique kitchen display identifier.
pub type ConnectionId = Uuid;

#[derive(Debug, Error, PartialEq)]
pub enum HubError {
    /// The display vanished or stopped draining its buffer.
    #[error("kitchen display {0} is gone")]
    ConnectionGone(ConnectionId),
}

/// Handle to one kitchen display: the sending half of its outbound buffer.
#[derive(Debug)]
pub struct DisplayConnection {
    pub id: ConnectionId,
    pub connected_at: DateTime<Utc>,
    tx: mpsc::Sender<String>,
}

impl DisplayConnection {
    /// Non-blocking enqueue of an already serialized frame.
    fn deliver(&self, payload: &str) -> Result<(), HubError> {
        match self.tx.try_send(payload.to_owned()) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => {
                warn!(connection = %self.id, "kitchen display buffer full, dropping display");
                Err(HubError::ConnectionGone(self.id))
            }
            Err(TrySendError::Closed(_)) => Err(HubError::ConnectionGone(self.id)),
        }
    }
}

/// Outcome of one broadcast, for logging and tests.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct BroadcastReport {
    pub delivered: usize,
    pub dropped: Vec<ConnectionId>,
}

pub struct KitchenHub {
    connections: DashMap<ConnectionId, Arc<DisplayConnection>>,
    buffer: usize,
}

impl KitchenHub {
    /// `buffer` is the number of events a display may fall behind before it
    /// is considered stalled and dropped.
    pub fn new(buffer: usize) -> Self {
        Self {
            connections: DashMap::new(),
            buffer: buffer.max(1),
        }
    }

    /// Creates a display handle (not yet registered) and the receiving half
    /// its writer task drains.
    pub fn open_connection(&self) -> (Arc<DisplayConnection>, mpsc::Receiver<String>) {
        let (tx, rx) = mpsc::channel(self.buffer);
        let connection = DisplayConnection {
            id: Uuid::new_v4(),
            connected_at: Utc::now(),
            tx,
        };
        (Arc::new(connection), rx)
    }

    pub fn register(&self, connection: Arc<DisplayConnection>) -> ConnectionId {
        let id = connection.id;
        self.connections.insert(id, connection);
        info!(connection = %id, active = self.connections.len(), "kitchen display registered");
        id
    }

    /// Removes a display. Returns false if it was not registered; calling it
    /// twice is harmless.
    pub fn unregister(&self, id: &ConnectionId) -> bool {
        match self.connections.remove(id) {
            Some(_) => {
                info!(connection = %id, active = self.connections.len(), "kitchen display unregistered");
                true
            }
            None => false,
        }
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Enqueues `event` for every registered display.
    ///
    /// Works on a snapshot of the registry. Displays whose buffer is closed
    /// or full are unregistered after the pass; their failure is never
    /// reported to the caller.
    pub fn broadcast(&self, event: &KitchenEvent) -> BroadcastReport {
        let payload = match serde_json::to_string(event) {
            Ok(payload) => payload,
            Err(e) => {
                warn!(error = %e, "could not serialize kitchen event");
                return BroadcastReport::default();
            }
        };

        let snapshot: Vec<Arc<DisplayConnection>> = self
            .connections
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect();

        let mut report = BroadcastReport::default();
        for connection in &snapshot {
            match connection.deliver(&payload) {
                Ok(()) => report.delivered += 1,
                Err(HubError::ConnectionGone(id)) => report.dropped.push(id),
            }
        }

        for id in &report.dropped {
            self.unregister(id);
        }

        debug!(
            delivered = report.delivered,
            dropped = report.dropped.len(),
            "kitchen event broadcast"
        );
        report
    }

    /// Drops every display. Their writer tasks see the buffer close and shut
    /// the sockets down.
    pub fn close_all(&self) {
        let count = self.connections.len();
        self.connections.clear();
        info!(closed = count, "kitchen displays closed");
    }
}
