//! Frame relay for live sessions.
//!
//! Each live connection registers under an [`EndpointKey`] (`{role}_{session}`)
//! and receives a [`RelayChannel`], the receiving half of a bounded frame
//! queue. Other connections forward opaque binary frames to a key; frames for
//! keys with no live connection are dropped without reporting an error to the
//! sender.
//!
//! # Example
//!
//! ```
//! use relay::{EndpointKey, Forward, RelayRegistry};
//!
//! # async fn example() {
//! let registry = RelayRegistry::new(16);
//! let key = EndpointKey::wizard("s1");
//!
//! let (mut channel, _) = registry.register(key.clone());
//! assert_eq!(registry.forward(&key, vec![1, 2, 3]), Forward::Delivered);
//! assert_eq!(channel.recv().await, Some(vec![1, 2, 3]));
//!
//! // Nobody listens on phone_s1: dropped.
//! assert_eq!(registry.forward(&EndpointKey::phone("s1"), vec![4]), Forward::NotConnected);
//! # }
//! ```

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use thiserror::Error;
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, info, warn};

/// Errors that can occur in the relay.
#[derive(Debug, Error)]
pub enum Error {
    /// Path segment that is not a known role.
    #[error("unknown relay role: {0}")]
    UnknownRole(String),
}

/// Which side of a session a connection speaks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// Sends camera frames, never receives.
    Phone,
    /// Receives frames; only sends keepalives.
    Wizard,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Phone => "phone",
            Role::Wizard => "wizard",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "phone" => Ok(Role::Phone),
            "wizard" => Ok(Role::Wizard),
            other => Err(Error::UnknownRole(other.to_string())),
        }
    }
}

/// Registry address of one live connection.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EndpointKey {
    pub role: Role,
    pub session_id: String,
}

impl EndpointKey {
    pub fn new(role: Role, session_id: impl Into<String>) -> Self {
        Self {
            role,
            session_id: session_id.into(),
        }
    }

    pub fn phone(session_id: impl Into<String>) -> Self {
        Self::new(Role::Phone, session_id)
    }

    pub fn wizard(session_id: impl Into<String>) -> Self {
        Self::new(Role::Wizard, session_id)
    }

    /// The key on the other side of the same session.
    pub fn peer(&self) -> Self {
        let role = match self.role {
            Role::Phone => Role::Wizard,
            Role::Wizard => Role::Phone,
        };
        Self::new(role, self.session_id.clone())
    }
}

impl fmt::Display for EndpointKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.role, self.session_id)
    }
}

/// Identifies one registration, so a replaced connection cannot remove its successor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Outcome of [`RelayRegistry::register`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    /// No connection held the key.
    New,
    /// An existing connection was closed and replaced.
    Replaced,
}

/// Outcome of [`RelayRegistry::forward`]. Informational only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Forward {
    /// Queued for the target connection.
    Delivered,
    /// No live connection under the key; the frame was dropped.
    NotConnected,
    /// The target's queue is full; the frame was dropped.
    Dropped,
}

/// Receiving half handed to the connection that registered a key.
///
/// `recv` returns `None` once the registration is gone (replaced or
/// unregistered), which is the signal to close the socket.
#[derive(Debug)]
pub struct RelayChannel {
    id: ConnectionId,
    frames: mpsc::Receiver<Vec<u8>>,
}

impl RelayChannel {
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Next forwarded frame.
    pub async fn recv(&mut self) -> Option<Vec<u8>> {
        self.frames.recv().await
    }
}

struct Endpoint {
    id: ConnectionId,
    frames: mpsc::Sender<Vec<u8>>,
}

/// Live connections addressed by [`EndpointKey`].
///
/// Cheap to clone; clones share the same map.
#[derive(Clone)]
pub struct RelayRegistry {
    endpoints: Arc<RwLock<HashMap<EndpointKey, Endpoint>>>,
    next_id: Arc<AtomicU64>,
    queue_capacity: usize,
}

impl RelayRegistry {
    /// Create a registry whose endpoints buffer at most `queue_capacity` frames.
    pub fn new(queue_capacity: usize) -> Self {
        Self {
            endpoints: Arc::new(RwLock::new(HashMap::new())),
            next_id: Arc::new(AtomicU64::new(1)),
            queue_capacity: queue_capacity.max(1),
        }
    }

    /// Register a connection under `key`.
    ///
    /// A connection already holding the key loses its queue, so its
    /// [`RelayChannel::recv`] returns `None` and its handler shuts down.
    pub fn register(&self, key: EndpointKey) -> (RelayChannel, Registration) {
        let (tx, rx) = mpsc::channel(self.queue_capacity);
        let id = ConnectionId(self.next_id.fetch_add(1, Ordering::Relaxed));

        let previous = self.write().insert(key.clone(), Endpoint { id, frames: tx });

        let registration = match previous {
            Some(old) => {
                warn!(key = %key, old = %old.id, new = %id, "Endpoint replaced, closing previous connection");
                Registration::Replaced
            }
            None => {
                info!(key = %key, connection = %id, "Endpoint connected");
                Registration::New
            }
        };

        let channel = RelayChannel { id, frames: rx };
        (channel, registration)
    }

    /// Remove whatever is registered under `key`. No-op if absent.
    pub fn unregister(&self, key: &EndpointKey) -> bool {
        let removed = self.write().remove(key).is_some();
        if removed {
            info!(key = %key, "Endpoint disconnected");
        }
        removed
    }

    /// Remove `key` only if it still belongs to connection `id`.
    pub fn release(&self, key: &EndpointKey, id: ConnectionId) -> bool {
        let mut endpoints = self.write();
        match endpoints.get(key) {
            Some(endpoint) if endpoint.id == id => {
                endpoints.remove(key);
                info!(key = %key, connection = %id, "Endpoint disconnected");
                true
            }
            _ => {
                debug!(key = %key, connection = %id, "Stale connection closed");
                false
            }
        }
    }

    /// Queue `payload` for the connection under `target`.
    ///
    /// Never blocks. Frames to absent or saturated endpoints are dropped.
    pub fn forward(&self, target: &EndpointKey, payload: Vec<u8>) -> Forward {
        let outcome = match self.read().get(target) {
            None => Forward::NotConnected,
            Some(endpoint) => match endpoint.frames.try_send(payload) {
                Ok(()) => Forward::Delivered,
                Err(TrySendError::Full(_)) => Forward::Dropped,
                Err(TrySendError::Closed(_)) => Forward::NotConnected,
            },
        };

        match outcome {
            Forward::Delivered => {}
            Forward::NotConnected => {
                debug!(target = %target, "No live endpoint, frame dropped");
                self.prune(target);
            }
            Forward::Dropped => warn!(target = %target, "Endpoint queue full, frame dropped"),
        }
        outcome
    }

    pub fn is_connected(&self, key: &EndpointKey) -> bool {
        self.read()
            .get(key)
            .is_some_and(|endpoint| !endpoint.frames.is_closed())
    }

    pub fn connection_count(&self) -> usize {
        self.read().len()
    }

    /// Drop an entry whose receiving half is gone.
    fn prune(&self, key: &EndpointKey) {
        let mut endpoints = self.write();
        if endpoints.get(key).is_some_and(|e| e.frames.is_closed()) {
            endpoints.remove(key);
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<EndpointKey, Endpoint>> {
        self.endpoints
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<EndpointKey, Endpoint>> {
        self.endpoints
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for RelayRegistry {
    fn default() -> Self {
        Self::new(64)
    }
}

/// Crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
