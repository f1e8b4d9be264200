// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Module change notifications
//!
//! The host publishes an event whenever its set of loaded modules changes.
//! Subscribers hold cached state derived from the loaded functions and drop
//! it when notified.

use parking_lot::RwLock;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// A change to the host's loaded module set
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModuleEvent {
    Loaded(String),
    Unloaded(String),
    /// Modules were recompiled in place
    HotReloaded,
}

impl fmt::Display for ModuleEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModuleEvent::Loaded(module) => write!(f, "Module {} loaded", module),
            ModuleEvent::Unloaded(module) => write!(f, "Module {} unloaded", module),
            ModuleEvent::HotReloaded => write!(f, "Modules hot-reloaded"),
        }
    }
}

/// Receiver of module change events
pub trait ModuleChangeListener: Send + Sync {
    fn on_module_event(&self, event: &ModuleEvent);
}

/// Identifies a subscription for `unsubscribe`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Fan-out of module events to subscribed listeners
#[derive(Default)]
pub struct ModuleEventHub {
    listeners: RwLock<Vec<(SubscriptionId, Arc<dyn ModuleChangeListener>)>>,
    next_id: AtomicU64,
    published: AtomicU64,
}

impl ModuleEventHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, listener: Arc<dyn ModuleChangeListener>) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed) + 1);
        self.listeners.write().push((id, listener));
        id
    }

    /// Returns false when the subscription was not found
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut listeners = self.listeners.write();
        let before = listeners.len();
        listeners.retain(|(subscription, _)| *subscription != id);
        listeners.len() != before
    }

    /// Deliver `event` to every listener in subscription order
    pub fn publish(&self, event: &ModuleEvent) {
        // Snapshot so listeners may subscribe or unsubscribe while handling
        let listeners: Vec<Arc<dyn ModuleChangeListener>> = self
            .listeners
            .read()
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();

        log::debug!("{} ({} listeners)", event, listeners.len());
        for listener in listeners {
            listener.on_module_event(event);
        }
        self.published.fetch_add(1, Ordering::Relaxed);
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.read().len()
    }

    /// Number of events published so far
    pub fn published_count(&self) -> u64 {
        self.published.load(Ordering::Relaxed)
    }
}

impl fmt::Debug for ModuleEventHub {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleEventHub")
            .field("listeners", &self.listener_count())
            .field("published", &self.published_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    #[derive(Default)]
    struct Recorder {
        events: Mutex<Vec<ModuleEvent>>,
    }

    impl ModuleChangeListener for Recorder {
        fn on_module_event(&self, event: &ModuleEvent) {
            self.events.lock().push(event.clone());
        }
    }

    #[test]
    fn test_publish_reaches_subscribers() {
        let hub = ModuleEventHub::new();
        let recorder = Arc::new(Recorder::default());
        let id = hub.subscribe(recorder.clone());

        hub.publish(&ModuleEvent::Loaded("Engine".to_string()));
        hub.publish(&ModuleEvent::HotReloaded);
        assert_eq!(
            *recorder.events.lock(),
            vec![ModuleEvent::Loaded("Engine".to_string()), ModuleEvent::HotReloaded]
        );

        assert!(hub.unsubscribe(id));
        assert!(!hub.unsubscribe(id));
        hub.publish(&ModuleEvent::Unloaded("Engine".to_string()));
        assert_eq!(recorder.events.lock().len(), 2);
        assert_eq!(hub.published_count(), 3);
    }

    #[test]
    fn test_concurrent_subscribers_get_distinct_ids() {
        let hub = Arc::new(ModuleEventHub::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let hub = Arc::clone(&hub);
                std::thread::spawn(move || {
                    (0..16)
                        .map(|_| hub.subscribe(Arc::new(Recorder::default())))
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        let mut ids: Vec<SubscriptionId> = handles
            .into_iter()
            .flat_map(|handle| handle.join().unwrap())
            .collect();
        let total = ids.len();
        ids.sort_by_key(|id| id.0);
        ids.dedup();
        assert_eq!(ids.len(), total);
        assert_eq!(hub.listener_count(), 128);

        hub.publish(&ModuleEvent::HotReloaded);
        assert_eq!(hub.published_count(), 1);
    }
}
