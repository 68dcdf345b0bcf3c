//! Registry of live client connections and fan-out of messages to them.
//!
//! The registry holds only weak references: the transport owns each
//! connection and drops it when the peer goes away. Entries whose connection
//! has been dropped or reports itself closed are pruned by the next broadcast
//! that encounters them.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use tokio::sync::RwLock;

use crate::error::SendError;
use crate::{log_broadcast_operation, log_registry_operation};

pub type ConnectionId = u64;

/// One open duplex channel to a client, as seen by the registry.
///
/// `send` must not block on the peer. Transports queue the payload and write
/// it to the socket on their own task.
pub trait Connection: Send + Sync {
    fn id(&self) -> ConnectionId;

    fn is_open(&self) -> bool;

    fn send(&self, payload: &str) -> Result<(), SendError>;
}

/// Outcome of a single broadcast.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BroadcastReport {
    /// Connections a send was attempted on
    pub attempted: usize,
    pub delivered: usize,
    pub failed: usize,
    /// Dropped or closed entries removed without a send attempt
    pub pruned: usize,
}

/// Shared set of open connections.
pub struct ConnectionRegistry {
    connections: RwLock<HashMap<ConnectionId, Weak<dyn Connection>>>,
    next_id: AtomicU64,
    evict_on_failure: bool,
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self {
            connections: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(1),
            evict_on_failure: false,
        }
    }

    /// Remove a connection as soon as one send to it fails, instead of
    /// waiting for the transport to unregister it.
    pub fn with_eviction_on_failure(mut self, evict: bool) -> Self {
        self.evict_on_failure = evict;
        self
    }

    /// Allocate an id for a new connection. Ids are never reused.
    pub fn next_connection_id(&self) -> ConnectionId {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    /// Add a connection. Returns `false` if its id was already registered.
    pub async fn register<C: Connection + 'static>(&self, conn: &Arc<C>) -> bool {
        let id = conn.id();
        let weak: Weak<dyn Connection> = Arc::downgrade(conn) as Weak<C>;

        let mut connections = self.connections.write().await;
        if connections.contains_key(&id) {
            return false;
        }
        connections.insert(id, weak);
        log_registry_operation!("register", id, connections.len());
        true
    }

    /// Remove a connection. Unknown ids are ignored.
    pub async fn unregister(&self, id: ConnectionId) -> bool {
        let mut connections = self.connections.write().await;
        let removed = connections.remove(&id).is_some();
        if removed {
            log_registry_operation!("unregister", id, connections.len());
        }
        removed
    }

    /// Send `payload` to every registered connection.
    ///
    /// Membership is snapshotted first and the lock released before any send,
    /// so concurrent register/unregister calls never wait on a broadcast.
    /// Send failures are logged and counted, never returned.
    pub async fn broadcast(&self, payload: &str) -> BroadcastReport {
        let snapshot: Vec<(ConnectionId, Weak<dyn Connection>)> = {
            let connections = self.connections.read().await;
            connections
                .iter()
                .map(|(id, conn)| (*id, conn.clone()))
                .collect()
        };

        let mut report = BroadcastReport::default();
        if snapshot.is_empty() {
            return report;
        }

        let mut stale = Vec::new();
        for (id, weak) in snapshot {
            let conn = match weak.upgrade() {
                Some(conn) if conn.is_open() => conn,
                _ => {
                    report.pruned += 1;
                    stale.push(id);
                    continue;
                },
            };

            report.attempted += 1;
            match conn.send(payload) {
                Ok(()) => report.delivered += 1,
                Err(e) => {
                    report.failed += 1;
                    tracing::warn!(connection_id = id, error = %e, "Failed to deliver message");
                    if self.evict_on_failure {
                        stale.push(id);
                    }
                },
            }
        }

        if !stale.is_empty() {
            let mut connections = self.connections.write().await;
            for id in &stale {
                connections.remove(id);
            }
        }

        log_broadcast_operation!(report);
        report
    }

    pub async fn len(&self) -> usize {
        self.connections.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.connections.read().await.is_empty()
    }

    pub async fn contains(&self, id: ConnectionId) -> bool {
        self.connections.read().await.contains_key(&id)
    }

    /// Release every connection reference. Sockets are left to their transport.
    pub async fn shutdown(&self) -> usize {
        let mut connections = self.connections.write().await;
        let released = connections.len();
        connections.clear();
        tracing::info!("Connection registry released {} connections", released);
        released
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::RecordingConnection;
    use super::*;

    #[tokio::test]
    async fn test_broadcast_with_no_connections() {
        let registry = ConnectionRegistry::new();
        let report = registry.broadcast("item1:1.00").await;
        assert_eq!(report, BroadcastReport::default());
    }

    #[tokio::test]
    async fn test_broadcast_reaches_every_connection() {
        let registry = ConnectionRegistry::new();
        let conns: Vec<_> = (1..=3).map(RecordingConnection::new).collect();
        for conn in &conns {
            assert!(registry.register(conn).await);
        }

        let report = registry.broadcast("X:42.50").await;
        assert_eq!(report.delivered, 3);
        for conn in &conns {
            assert_eq!(conn.received(), vec!["X:42.50"]);
        }
    }

    #[tokio::test]
    async fn test_register_is_idempotent() {
        let registry = ConnectionRegistry::new();
        let conn = RecordingConnection::new(1);

        assert!(registry.register(&conn).await);
        assert!(!registry.register(&conn).await);
        assert_eq!(registry.len().await, 1);

        registry.broadcast("a:1.00").await;
        assert_eq!(conn.received().len(), 1);
    }

    #[tokio::test]
    async fn test_unregister_is_idempotent() {
        let registry = ConnectionRegistry::new();
        let conn = RecordingConnection::new(1);
        registry.register(&conn).await;

        assert!(registry.unregister(1).await);
        assert!(!registry.unregister(1).await);
        assert!(!registry.unregister(99).await);
        assert!(registry.is_empty().await);
    }

    #[tokio::test]
    async fn test_unregistered_connection_misses_broadcast() {
        let registry = ConnectionRegistry::new();
        let stays = RecordingConnection::new(1);
        let leaves = RecordingConnection::new(2);
        registry.register(&stays).await;
        registry.register(&leaves).await;

        registry.unregister(2).await;
        registry.broadcast("a:1.00").await;

        assert_eq!(stays.received(), vec!["a:1.00"]);
        assert!(leaves.received().is_empty());
    }

    #[tokio::test]
    async fn test_late_registration_misses_earlier_broadcast() {
        let registry = ConnectionRegistry::new();
        let early = RecordingConnection::new(1);
        registry.register(&early).await;
        registry.broadcast("a:1.00").await;

        let late = RecordingConnection::new(2);
        registry.register(&late).await;
        registry.broadcast("a:2.00").await;

        assert_eq!(early.received(), vec!["a:1.00", "a:2.00"]);
        assert_eq!(late.received(), vec!["a:2.00"]);
    }

    #[tokio::test]
    async fn test_failed_send_does_not_stop_fan_out() {
        let registry = ConnectionRegistry::new();
        let healthy: Vec<_> = [1, 3, 4].into_iter().map(RecordingConnection::new).collect();
        let broken = RecordingConnection::failing(2);

        for conn in &healthy {
            registry.register(conn).await;
        }
        registry.register(&broken).await;

        let report = registry.broadcast("item1:9.99").await;
        assert_eq!(report.attempted, 4);
        assert_eq!(report.delivered, 3);
        assert_eq!(report.failed, 1);
        for conn in &healthy {
            assert_eq!(conn.received(), vec!["item1:9.99"]);
        }

        // Without eviction the broken connection stays until the transport removes it
        assert!(registry.contains(2).await);
    }

    #[tokio::test]
    async fn test_eviction_on_failure() {
        let registry = ConnectionRegistry::new().with_eviction_on_failure(true);
        let ok = RecordingConnection::new(1);
        let broken = RecordingConnection::failing(2);
        registry.register(&ok).await;
        registry.register(&broken).await;

        registry.broadcast("a:1.00").await;
        assert!(!registry.contains(2).await);
        assert!(registry.contains(1).await);

        let report = registry.broadcast("a:2.00").await;
        assert_eq!(report.attempted, 1);
        assert_eq!(report.failed, 0);
    }

    #[tokio::test]
    async fn test_dropped_and_closed_connections_are_pruned() {
        let registry = ConnectionRegistry::new();
        let kept = RecordingConnection::new(1);
        let closed = RecordingConnection::new(2);
        let dropped = RecordingConnection::new(3);
        registry.register(&kept).await;
        registry.register(&closed).await;
        registry.register(&dropped).await;

        closed.close();
        drop(dropped);

        let report = registry.broadcast("a:1.00").await;
        assert_eq!(report.pruned, 2);
        assert_eq!(report.delivered, 1);
        assert!(closed.received().is_empty());
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test]
    async fn test_per_connection_order_follows_broadcast_order() {
        let registry = ConnectionRegistry::new();
        let conn = RecordingConnection::new(1);
        registry.register(&conn).await;

        for i in 0..10 {
            registry.broadcast(&format!("a:{}.00", i)).await;
        }

        let expected: Vec<String> = (0..10).map(|i| format!("a:{}.00", i)).collect();
        assert_eq!(conn.received(), expected);
    }

    #[tokio::test]
    async fn test_concurrent_register_and_broadcast() {
        let registry = Arc::new(ConnectionRegistry::new());
        let anchor = RecordingConnection::new(0);
        registry.register(&anchor).await;

        let mut handles = Vec::new();
        for id in 1..=50u64 {
            let registry = registry.clone();
            handles.push(tokio::spawn(async move {
                let conn = RecordingConnection::new(id);
                registry.register(&conn).await;
                registry.broadcast("a:1.00").await;
                registry.unregister(id).await;
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(anchor.received().len(), 50);
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test]
    async fn test_shutdown_releases_references() {
        let registry = ConnectionRegistry::new();
        let conn = RecordingConnection::new(1);
        registry.register(&conn).await;

        assert_eq!(registry.shutdown().await, 1);
        assert!(registry.is_empty().await);
        // The connection itself is untouched
        assert!(conn.is_open());
        assert_eq!(Arc::strong_count(&conn), 1);
    }

    #[test]
    fn test_connection_ids_are_unique() {
        let registry = ConnectionRegistry::new();
        let a = registry.next_connection_id();
        let b = registry.next_connection_id();
        assert_ne!(a, b);
    }
}
