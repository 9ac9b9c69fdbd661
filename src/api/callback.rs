//! Callback fan-out for engine events
//!
//! Consumers register boxed closures and receive every event the engine
//! produces. Callbacks are observational; the engine never waits on them.

use crate::api::types::EngineEvent;
use std::collections::BTreeMap;

/// Callback function type for engine events
pub type EventCallback = Box<dyn Fn(&EngineEvent) + Send>;

/// Callback registration handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CallbackHandle(u32);

impl CallbackHandle {
    fn new(id: u32) -> Self {
        CallbackHandle(id)
    }

    pub fn id(&self) -> u32 {
        self.0
    }
}

/// Registered event callbacks, invoked in registration order
#[derive(Default)]
pub struct EventDispatcher {
    callbacks: BTreeMap<CallbackHandle, EventCallback>,
    callback_counter: u32,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an event callback
    pub fn register(&mut self, callback: EventCallback) -> CallbackHandle {
        self.callback_counter += 1;
        let handle = CallbackHandle::new(self.callback_counter);
        self.callbacks.insert(handle, callback);
        handle
    }

    /// Unregister a callback; `false` when the handle was unknown
    pub fn unregister(&mut self, handle: CallbackHandle) -> bool {
        self.callbacks.remove(&handle).is_some()
    }

    /// Deliver one event to every callback
    pub fn dispatch(&self, event: &EngineEvent) {
        for callback in self.callbacks.values() {
            callback(event);
        }
    }

    /// Deliver a batch of events in order
    pub fn dispatch_all(&self, events: &[EngineEvent]) {
        for event in events {
            self.dispatch(event);
        }
    }

    pub fn callback_count(&self) -> usize {
        self.callbacks.len()
    }
}

impl std::fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventDispatcher")
            .field("callbacks", &self.callbacks.len())
            .finish()
    }
}
