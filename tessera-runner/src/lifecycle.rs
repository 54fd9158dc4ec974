//! Lifecycle listeners notified as variants run.
//!
//! Listeners are owned by the runner that notifies them. Registration hands
//! back a `ListenerId` which is the only handle for removal.

use tracing::{debug, info};

/// Observer of variant execution. Every hook defaults to a no-op.
pub trait LifecycleListener: Send {
    /// Before every attempt, including attempts that follow a restart.
    fn on_started(&mut self, _variant: &str) {}

    /// The body asked for the variant to be run again.
    fn on_restarted(&mut self, _variant: &str, _reason: &str) {}

    /// The variant reached a terminal outcome.
    fn on_finished(&mut self, _variant: &str) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

/// Registered listeners, notified in registration order.
#[derive(Default)]
pub struct ListenerSet {
    next_id: u64,
    listeners: Vec<(ListenerId, Box<dyn LifecycleListener>)>,
}

impl ListenerSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, listener: impl LifecycleListener + 'static) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Returns whether a listener with this id was registered.
    pub fn remove(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(existing, _)| *existing != id);
        self.listeners.len() != before
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    pub fn started(&mut self, variant: &str) {
        for (_, l) in &mut self.listeners {
            l.on_started(variant);
        }
    }

    pub fn restarted(&mut self, variant: &str, reason: &str) {
        for (_, l) in &mut self.listeners {
            l.on_restarted(variant, reason);
        }
    }

    pub fn finished(&mut self, variant: &str) {
        for (_, l) in &mut self.listeners {
            l.on_finished(variant);
        }
    }
}

impl std::fmt::Debug for ListenerSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerSet")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

/// Listener that emits lifecycle events as tracing records.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingListener;

impl LifecycleListener for TracingListener {
    fn on_started(&mut self, variant: &str) {
        debug!(variant, "started");
    }

    fn on_restarted(&mut self, variant: &str, reason: &str) {
        info!(variant, reason, "restart requested");
    }

    fn on_finished(&mut self, variant: &str) {
        debug!(variant, "finished");
    }
}
