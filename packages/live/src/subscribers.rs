//! Per-type subscriber registry and message dispatch.

use std::collections::BTreeMap;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::{Arc, Mutex, PoisonError};

use crate::message::LiveMessage;

/// A message callback.
pub type Handler = Arc<dyn Fn(&LiveMessage) + Send + Sync>;

/// Token returned by [`Subscribers::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(u64);

/// Handlers keyed by message type, kept in registration order.
#[derive(Default)]
pub struct Subscribers {
    next_id: u64,
    handlers: BTreeMap<String, Vec<(SubscriptionId, Handler)>>,
}

impl std::fmt::Debug for Subscribers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map()
            .entries(self.handlers.iter().map(|(k, v)| (k, v.len())))
            .finish()
    }
}

impl Subscribers {
    /// Registers `handler` for `event_type`.
    pub fn subscribe(&mut self, event_type: &str, handler: Handler) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.handlers
            .entry(event_type.to_string())
            .or_default()
            .push((id, handler));
        id
    }

    /// Removes one subscription. Returns `false` if it was not registered
    /// under `event_type`.
    pub fn unsubscribe(&mut self, event_type: &str, id: SubscriptionId) -> bool {
        let Some(list) = self.handlers.get_mut(event_type) else {
            return false;
        };
        let before = list.len();
        list.retain(|(existing, _)| *existing != id);
        let removed = list.len() != before;
        if list.is_empty() {
            self.handlers.remove(event_type);
        }
        removed
    }

    /// Snapshot of the handlers for `event_type`, in registration order.
    #[must_use]
    pub fn handlers_for(&self, event_type: &str) -> Vec<Handler> {
        self.handlers
            .get(event_type)
            .map(|list| list.iter().map(|(_, h)| Arc::clone(h)).collect())
            .unwrap_or_default()
    }

    /// Number of handlers registered for `event_type`.
    #[must_use]
    pub fn count(&self, event_type: &str) -> usize {
        self.handlers.get(event_type).map_or(0, Vec::len)
    }
}

/// Parses `frame` and invokes every handler subscribed to its type.
///
/// Handlers run after the registry lock is released, so they may
/// subscribe or unsubscribe. Malformed frames are logged and dropped.
/// A panicking handler is logged and does not stop the others.
/// Returns the number of handlers invoked.
pub fn dispatch(subscribers: &Mutex<Subscribers>, frame: &str) -> usize {
    let message = match LiveMessage::parse(frame) {
        Ok(message) => message,
        Err(e) => {
            log::warn!("Dropping live message: {e}");
            return 0;
        }
    };

    let handlers = subscribers
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .handlers_for(&message.event_type);

    if handlers.is_empty() {
        log::trace!("No subscribers for live message type {}", message.event_type);
    }
    for handler in &handlers {
        if catch_unwind(AssertUnwindSafe(|| handler(&message))).is_err() {
            log::error!("Live handler for {} panicked", message.event_type);
        }
    }
    handlers.len()
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    fn counter() -> (Arc<AtomicUsize>, Handler) {
        let hits = Arc::new(AtomicUsize::new(0));
        let h = Arc::clone(&hits);
        (
            hits,
            Arc::new(move |_: &LiveMessage| {
                h.fetch_add(1, Ordering::SeqCst);
            }),
        )
    }

    #[test]
    fn unsubscribe_removes_only_that_handler() {
        let registry = Mutex::new(Subscribers::default());
        let (first_hits, first) = counter();
        let (second_hits, second) = counter();
        let first_id = registry.lock().unwrap().subscribe("stats_update", first);
        registry.lock().unwrap().subscribe("stats_update", second);

        assert!(registry.lock().unwrap().unsubscribe("stats_update", first_id));
        assert!(!registry.lock().unwrap().unsubscribe("stats_update", first_id));

        assert_eq!(dispatch(&registry, r#"{"type":"stats_update"}"#), 1);
        assert_eq!(first_hits.load(Ordering::SeqCst), 0);
        assert_eq!(second_hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn unsubscribe_checks_the_type() {
        let mut registry = Subscribers::default();
        let (_, h) = counter();
        let id = registry.subscribe("new_report", h);
        assert!(!registry.unsubscribe("stats_update", id));
        assert_eq!(registry.count("new_report"), 1);
    }

    #[test]
    fn handlers_fire_in_registration_order() {
        let registry = Mutex::new(Subscribers::default());
        let order = Arc::new(Mutex::new(Vec::new()));
        for n in 0..3 {
            let order = Arc::clone(&order);
            registry.lock().unwrap().subscribe(
                "new_report",
                Arc::new(move |_: &LiveMessage| order.lock().unwrap().push(n)),
            );
        }
        dispatch(&registry, r#"{"type":"new_report","data":{}}"#);
        assert_eq!(*order.lock().unwrap(), vec![0, 1, 2]);
    }

    #[test]
    fn malformed_frames_reach_nobody() {
        let registry = Mutex::new(Subscribers::default());
        let (hits, h) = counter();
        registry.lock().unwrap().subscribe("new_report", h);

        for frame in ["{", "null", r#"{"data":1}"#, r#""new_report""#] {
            assert_eq!(dispatch(&registry, frame), 0);
        }
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn panicking_handler_does_not_stop_the_rest() {
        let registry = Mutex::new(Subscribers::default());
        registry
            .lock()
            .unwrap()
            .subscribe("new_report", Arc::new(|_: &LiveMessage| panic!("boom")));
        let (hits, h) = counter();
        registry.lock().unwrap().subscribe("new_report", h);

        assert_eq!(dispatch(&registry, r#"{"type":"new_report","data":{}}"#), 2);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert!(!registry.is_poisoned());
    }

    #[test]
    fn handler_may_resubscribe_during_dispatch() {
        let registry = Arc::new(Mutex::new(Subscribers::default()));
        let inner = Arc::clone(&registry);
        registry.lock().unwrap().subscribe(
            "stats_update",
            Arc::new(move |_: &LiveMessage| {
                inner
                    .lock()
                    .unwrap()
                    .subscribe("stats_update", Arc::new(|_: &LiveMessage| {}));
            }),
        );
        assert_eq!(dispatch(&registry, r#"{"type":"stats_update"}"#), 1);
        assert_eq!(registry.lock().unwrap().count("stats_update"), 2);
    }
}
