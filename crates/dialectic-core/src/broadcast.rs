use crate::error::Result;
use crate::message::OutboundMessage;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

/// Delivery to a listener failed; the listener is gone for good.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListenerClosed;

/// Anything that can receive serialized outbound messages.
///
/// Implementations must not block: the broadcaster calls `deliver` for every
/// listener in turn while fanning out one message.
pub trait Listener: Send + Sync {
    fn deliver(&self, payload: &str) -> std::result::Result<(), ListenerClosed>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

impl std::fmt::Display for ListenerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "listener-{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    pub delivered: usize,
    pub dropped: usize,
}

type Entry = (ListenerId, Arc<dyn Listener>);

/// Registry of connected listeners with best-effort fan-out.
#[derive(Default)]
pub struct Broadcaster {
    next_id: AtomicU64,
    listeners: Mutex<Vec<Entry>>,
}

impl Broadcaster {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Entry>> {
        // A panic while holding the lock cannot leave the Vec half-updated.
        self.listeners.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn register(&self, listener: Arc<dyn Listener>) -> ListenerId {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let count = {
            let mut listeners = self.lock();
            listeners.push((id, listener));
            listeners.len()
        };
        tracing::info!(%id, listeners = count, "listener registered");
        id
    }

    /// Returns whether the listener was still registered.
    pub fn unregister(&self, id: ListenerId) -> bool {
        let (removed, count) = {
            let mut listeners = self.lock();
            let before = listeners.len();
            listeners.retain(|(lid, _)| *lid != id);
            (listeners.len() != before, listeners.len())
        };
        if removed {
            tracing::info!(%id, listeners = count, "listener unregistered");
        }
        removed
    }

    pub fn listener_count(&self) -> usize {
        self.lock().len()
    }

    /// Serialize `message` once and deliver it to every listener.
    ///
    /// Works on a snapshot, so listeners registered during the fan-out miss
    /// this message. Listeners that fail are removed afterwards. Only a
    /// serialization failure is an error.
    pub fn broadcast(&self, message: &OutboundMessage) -> Result<BroadcastReport> {
        let payload = message.to_json()?;
        let snapshot: Vec<Entry> = self.lock().clone();

        let mut report = BroadcastReport::default();
        let mut dead = Vec::new();
        for (id, listener) in &snapshot {
            match listener.deliver(&payload) {
                Ok(()) => report.delivered += 1,
                Err(ListenerClosed) => {
                    tracing::warn!(%id, "delivery failed, dropping listener");
                    dead.push(*id);
                }
            }
        }

        if !dead.is_empty() {
            self.lock().retain(|(id, _)| !dead.contains(id));
            report.dropped = dead.len();
        }
        tracing::debug!(
            kind = message.kind(),
            delivered = report.delivered,
            dropped = report.dropped,
            "broadcast"
        );
        Ok(report)
    }

    pub fn broadcast_all<'a>(
        &self,
        messages: impl IntoIterator<Item = &'a OutboundMessage>,
    ) -> Result<BroadcastReport> {
        let mut total = BroadcastReport::default();
        for message in messages {
            let r = self.broadcast(message)?;
            total.delivered += r.delivered;
            total.dropped += r.dropped;
        }
        Ok(total)
    }
}

impl std::fmt::Debug for Broadcaster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Broadcaster")
            .field("listeners", &self.listener_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicBool;

    #[derive(Default)]
    struct Recorder {
        received: Mutex<Vec<String>>,
        closed: AtomicBool,
    }

    impl Listener for Recorder {
        fn deliver(&self, payload: &str) -> std::result::Result<(), ListenerClosed> {
            if self.closed.load(Ordering::SeqCst) {
                return Err(ListenerClosed);
            }
            self.received.lock().unwrap().push(payload.to_string());
            Ok(())
        }
    }

    fn pong() -> OutboundMessage {
        OutboundMessage::Pong { timestamp: None }
    }

    #[test]
    fn empty_registry_delivers_nothing() {
        let b = Broadcaster::new();
        assert_eq!(b.broadcast(&pong()).unwrap(), BroadcastReport::default());
    }

    #[test]
    fn delivers_same_payload_to_all() {
        let b = Broadcaster::new();
        let one = Arc::new(Recorder::default());
        let two = Arc::new(Recorder::default());
        b.register(one.clone());
        b.register(two.clone());

        let report = b.broadcast(&pong()).unwrap();
        assert_eq!(report.delivered, 2);
        assert_eq!(one.received.lock().unwrap()[0], r#"{"type":"pong","timestamp":null}"#);
        assert_eq!(*one.received.lock().unwrap(), *two.received.lock().unwrap());
    }

    #[test]
    fn failed_listener_is_removed_after_broadcast() {
        let b = Broadcaster::new();
        let alive = Arc::new(Recorder::default());
        let dead = Arc::new(Recorder::default());
        dead.closed.store(true, Ordering::SeqCst);
        b.register(alive.clone());
        b.register(dead.clone());

        let report = b.broadcast(&pong()).unwrap();
        assert_eq!(report, BroadcastReport { delivered: 1, dropped: 1 });
        assert_eq!(b.listener_count(), 1);

        let report = b.broadcast(&pong()).unwrap();
        assert_eq!(report, BroadcastReport { delivered: 1, dropped: 0 });
        assert_eq!(alive.received.lock().unwrap().len(), 2);
    }

    #[test]
    fn unregister_removes_once() {
        let b = Broadcaster::new();
        let id = b.register(Arc::new(Recorder::default()));
        assert!(b.unregister(id));
        assert!(!b.unregister(id));
        assert_eq!(b.listener_count(), 0);
    }

    #[test]
    fn broadcast_all_sums_reports() {
        let b = Broadcaster::new();
        let r = Arc::new(Recorder::default());
        b.register(r.clone());
        let report = b.broadcast_all(&[pong(), pong(), pong()]).unwrap();
        assert_eq!(report.delivered, 3);
        assert_eq!(r.received.lock().unwrap().len(), 3);
    }
}
