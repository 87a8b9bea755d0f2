use crate::domain::BridgeEvent;
use activity_delivery_core::BridgeEventKind;
use futures::future::{join_all, BoxFuture};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

/// Handler invoked for every dispatched event of one kind
pub type Listener = Arc<dyn Fn(BridgeEvent) -> BoxFuture<'static, ()> + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

#[derive(Default)]
struct BusInner {
    next_id: u64,
    listeners: HashMap<BridgeEventKind, Vec<(ListenerId, Listener)>>,
}

/// Page-wide event bus shared by all elements and bridges.
///
/// Every listener of a kind sees every event of that kind; addressing is up
/// to the listener.
#[derive(Clone, Default)]
pub struct EventBus {
    inner: Arc<Mutex<BusInner>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, kind: BridgeEventKind, listener: Listener) -> ListenerId {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        let id = ListenerId(inner.next_id);
        inner.next_id += 1;
        inner.listeners.entry(kind).or_default().push((id, listener));
        id
    }

    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        let mut removed = false;
        for listeners in inner.listeners.values_mut() {
            let before = listeners.len();
            listeners.retain(|(lid, _)| *lid != id);
            removed |= listeners.len() != before;
        }
        removed
    }

    pub fn listener_count(&self, kind: BridgeEventKind) -> usize {
        let inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        inner.listeners.get(&kind).map(Vec::len).unwrap_or(0)
    }

    /// Deliver to every listener of the event's kind and wait for all of them.
    ///
    /// Returns the number of listeners reached.
    pub async fn dispatch(&self, event: BridgeEvent) -> usize {
        let listeners: Vec<Listener> = {
            let inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
            inner
                .listeners
                .get(&event.kind)
                .map(|ls| ls.iter().map(|(_, l)| l.clone()).collect())
                .unwrap_or_default()
        };

        tracing::trace!(
            "Dispatching {} for attempt {} to {} listeners",
            event.kind,
            event.attempt_guid,
            listeners.len()
        );

        let count = listeners.len();
        join_all(listeners.iter().map(|listener| listener(event.clone()))).await;
        count
    }
}
