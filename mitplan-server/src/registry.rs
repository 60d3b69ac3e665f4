//! Session registry: which live connections are subscribed to which mitplan
//!
//! Purely in-memory and process-local. Registry state is rebuilt entirely
//! from connection events; after a restart clients re-subscribe and reload,
//! so nothing here needs to survive the process. In a multi-instance
//! deployment broadcasts only reach subscribers on the same process —
//! cross-instance fan-out would need an external pub/sub layer in front of
//! this registry.
//!
//! The registry is an injected, explicitly owned object (constructed at
//! server start, passed by reference to the gateway), not a process-wide
//! singleton.

use crate::messages::ServerMessage;
use std::collections::HashMap;
use std::fmt;
use std::sync::Mutex;
use tokio::sync::mpsc::UnboundedSender;
use uuid::Uuid;

/// Opaque identity of one live WebSocket connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

type Room = HashMap<ConnectionId, UnboundedSender<ServerMessage>>;

/// Tracks room membership and delivers targeted broadcasts
#[derive(Default)]
pub struct SessionRegistry {
    rooms: Mutex<HashMap<String, Room>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a connection to a mitplan's room
    ///
    /// Idempotent: re-subscribing an already-subscribed connection changes
    /// nothing. Returns whether the connection was newly added.
    pub fn subscribe(
        &self,
        connection: ConnectionId,
        mitplan_id: &str,
        sender: UnboundedSender<ServerMessage>,
    ) -> bool {
        let mut rooms = self.rooms.lock().expect("registry lock poisoned");
        let room = rooms.entry(mitplan_id.to_string()).or_default();
        if room.contains_key(&connection) {
            return false;
        }
        room.insert(connection, sender);
        true
    }

    /// Remove a connection from every room it belongs to (disconnect path)
    pub fn unsubscribe(&self, connection: ConnectionId) {
        let mut rooms = self.rooms.lock().expect("registry lock poisoned");
        for room in rooms.values_mut() {
            room.remove(&connection);
        }
        rooms.retain(|_, room| !room.is_empty());
    }

    /// Remove a connection from one room (join-failure rollback)
    pub fn unsubscribe_from(&self, connection: ConnectionId, mitplan_id: &str) {
        let mut rooms = self.rooms.lock().expect("registry lock poisoned");
        if let Some(room) = rooms.get_mut(mitplan_id) {
            room.remove(&connection);
            if room.is_empty() {
                rooms.remove(mitplan_id);
            }
        }
    }

    /// Whether a connection is currently subscribed to a mitplan
    pub fn is_subscribed(&self, connection: ConnectionId, mitplan_id: &str) -> bool {
        self.rooms
            .lock()
            .expect("registry lock poisoned")
            .get(mitplan_id)
            .is_some_and(|room| room.contains_key(&connection))
    }

    /// Number of connections subscribed to a mitplan
    pub fn room_size(&self, mitplan_id: &str) -> usize {
        self.rooms
            .lock()
            .expect("registry lock poisoned")
            .get(mitplan_id)
            .map_or(0, |room| room.len())
    }

    /// Deliver a message to every subscriber of a mitplan, originator
    /// included; returns the number of connections reached
    ///
    /// Members whose channel is closed (connection torn down without the
    /// disconnect path running yet) are evicted from the room.
    pub fn broadcast(&self, mitplan_id: &str, message: &ServerMessage) -> usize {
        let mut rooms = self.rooms.lock().expect("registry lock poisoned");
        let Some(room) = rooms.get_mut(mitplan_id) else {
            return 0;
        };

        let mut delivered = 0;
        room.retain(|_, sender| match sender.send(message.clone()) {
            Ok(()) => {
                delivered += 1;
                true
            }
            Err(_) => false,
        });
        if room.is_empty() {
            rooms.remove(mitplan_id);
        }
        delivered
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    fn member() -> (
        ConnectionId,
        UnboundedSender<ServerMessage>,
        mpsc::UnboundedReceiver<ServerMessage>,
    ) {
        let (tx, rx) = mpsc::unbounded_channel();
        (ConnectionId::new(), tx, rx)
    }

    fn drain(rx: &mut mpsc::UnboundedReceiver<ServerMessage>) -> usize {
        let mut n = 0;
        while rx.try_recv().is_ok() {
            n += 1;
        }
        n
    }

    #[test]
    fn broadcast_reaches_every_subscriber_exactly_once() {
        let registry = SessionRegistry::new();
        let (id1, tx1, mut rx1) = member();
        let (id2, tx2, mut rx2) = member();
        let (id3, tx3, mut rx3) = member();
        registry.subscribe(id1, "plan-a", tx1);
        registry.subscribe(id2, "plan-a", tx2);
        registry.subscribe(id3, "plan-a", tx3);

        let delivered = registry.broadcast("plan-a", &ServerMessage::ack_ok());
        assert_eq!(delivered, 3);
        assert_eq!(drain(&mut rx1), 1);
        assert_eq!(drain(&mut rx2), 1);
        assert_eq!(drain(&mut rx3), 1);
    }

    #[test]
    fn broadcast_is_isolated_across_mitplans() {
        let registry = SessionRegistry::new();
        let (id1, tx1, mut rx1) = member();
        let (id2, tx2, mut rx2) = member();
        registry.subscribe(id1, "plan-a", tx1);
        registry.subscribe(id2, "plan-b", tx2);

        registry.broadcast("plan-a", &ServerMessage::ack_ok());
        assert_eq!(drain(&mut rx1), 1);
        assert_eq!(drain(&mut rx2), 0);
    }

    #[test]
    fn subscribe_is_idempotent() {
        let registry = SessionRegistry::new();
        let (id, tx, mut rx) = member();
        assert!(registry.subscribe(id, "plan-a", tx.clone()));
        assert!(!registry.subscribe(id, "plan-a", tx));
        assert_eq!(registry.room_size("plan-a"), 1);

        registry.broadcast("plan-a", &ServerMessage::ack_ok());
        assert_eq!(drain(&mut rx), 1);
    }

    #[test]
    fn unsubscribe_removes_from_all_rooms() {
        let registry = SessionRegistry::new();
        let (id, tx, _rx) = member();
        registry.subscribe(id, "plan-a", tx.clone());
        registry.subscribe(id, "plan-b", tx);
        assert!(registry.is_subscribed(id, "plan-a"));
        assert!(registry.is_subscribed(id, "plan-b"));

        registry.unsubscribe(id);
        assert!(!registry.is_subscribed(id, "plan-a"));
        assert!(!registry.is_subscribed(id, "plan-b"));
        assert_eq!(registry.room_size("plan-a"), 0);
    }

    #[test]
    fn broadcast_evicts_closed_channels() {
        let registry = SessionRegistry::new();
        let (id1, tx1, rx1) = member();
        let (id2, tx2, mut rx2) = member();
        registry.subscribe(id1, "plan-a", tx1);
        registry.subscribe(id2, "plan-a", tx2);

        drop(rx1);
        let delivered = registry.broadcast("plan-a", &ServerMessage::ack_ok());
        assert_eq!(delivered, 1);
        assert_eq!(registry.room_size("plan-a"), 1);
        assert_eq!(drain(&mut rx2), 1);
    }
}
