#![forbid(unsafe_code)]

//! Per-object change notification bus ("signals").
//!
//! # Design
//!
//! [`SignalHub<E>`] is a shared, reference-counted subscriber list. Emitting
//! an event notifies all live subscribers in registration order. Subscribing
//! returns an RAII [`Subscription`] guard; dropping the guard unsubscribes
//! the callback, and dead entries are pruned lazily on the next emit.
//!
//! Property-bearing objects emit [`PropEvent`] here on every successful
//! attribute set — this is the single hook the undo journal and any
//! dependent view rely on; no mutation path bypasses it.
//!
//! # Failure Modes
//!
//! - **Re-entrant emit**: callbacks are invoked after the subscriber list
//!   borrow is released, so a subscriber may emit further events; a cycle
//!   of mutually-triggering subscribers will still recurse unboundedly.
//! - **Subscriber leak**: holding `Subscription` guards forever keeps their
//!   callbacks alive; dead weak references cost one slot until pruned.

use std::rc::{Rc, Weak};

use tracing::trace_span;

use crate::value::Value;

type CallbackRc<E> = Rc<dyn Fn(&E)>;
type CallbackWeak<E> = Weak<dyn Fn(&E)>;

/// Event fired by a property-bearing object: `update::<attribute>`.
#[derive(Debug, Clone, PartialEq)]
pub struct PropEvent {
    /// Name of the attribute that changed.
    pub attribute: String,
    /// The newly stored canonical value ([`Value::Undefined`] when an undo
    /// restored the never-set state).
    pub value: Value,
}

/// A shared publish/subscribe hub for one emitting object.
///
/// Cloning a hub creates a new handle to the **same** subscriber list.
pub struct SignalHub<E> {
    subscribers: Rc<std::cell::RefCell<Vec<CallbackWeak<E>>>>,
}

impl<E> Clone for SignalHub<E> {
    fn clone(&self) -> Self {
        Self {
            subscribers: Rc::clone(&self.subscribers),
        }
    }
}

impl<E: 'static> Default for SignalHub<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> std::fmt::Debug for SignalHub<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignalHub")
            .field("subscriber_count", &self.subscribers.borrow().len())
            .finish()
    }
}

impl<E: 'static> SignalHub<E> {
    /// Create a hub with no subscribers.
    #[must_use]
    pub fn new() -> Self {
        Self {
            subscribers: Rc::new(std::cell::RefCell::new(Vec::new())),
        }
    }

    /// Subscribe to events. The callback runs on every emit until the
    /// returned guard is dropped.
    pub fn subscribe(&self, callback: impl Fn(&E) + 'static) -> Subscription {
        let strong: CallbackRc<E> = Rc::new(callback);
        let weak = Rc::downgrade(&strong);
        self.subscribers.borrow_mut().push(weak);
        Subscription {
            _guard: Box::new(strong),
        }
    }

    /// Number of registered subscribers, including dead ones not yet
    /// pruned.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.borrow().len()
    }

    /// Notify live subscribers in registration order, pruning dead ones.
    pub fn emit(&self, event: &E) {
        // Collect live callbacks first so the borrow is released before
        // any callback runs.
        let callbacks: Vec<CallbackRc<E>> = {
            let mut subs = self.subscribers.borrow_mut();
            subs.retain(|w| w.strong_count() > 0);
            subs.iter().filter_map(Weak::upgrade).collect()
        };
        if callbacks.is_empty() {
            return;
        }
        let _span = trace_span!("signal.emit", fanout = callbacks.len() as u64).entered();
        for cb in &callbacks {
            cb(event);
        }
    }
}

/// RAII guard for a subscriber callback.
///
/// Dropping the guard drops the strong reference; the hub's weak entry
/// fails to upgrade and is pruned on the next emit.
pub struct Subscription {
    _guard: Box<dyn std::any::Any>,
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").finish_non_exhaustive()
    }
}
