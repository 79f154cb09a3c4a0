//! Event subscriber registry.

use crate::core::Callback;
use std::collections::HashMap;
use std::hash::Hash;

/// Outcome of removing a subscriber.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Unsubscribe {
    Removed,
    NotRegistered,
    UnknownEvent,
}

/// Ordered subscriber lists keyed by event.
///
/// Cloning produces a shallow copy: the lists are duplicated, the callbacks
/// they hold are shared.
pub(crate) struct SubscriberRegistry<S, E, C, A, R> {
    by_event: HashMap<E, Vec<Callback<S, E, C, A, R>>>,
}

impl<S, E: Eq + Hash, C, A, R> SubscriberRegistry<S, E, C, A, R> {
    pub(crate) fn new() -> Self {
        Self {
            by_event: HashMap::new(),
        }
    }

    pub(crate) fn subscribe(&mut self, event: E, callback: Callback<S, E, C, A, R>) {
        self.by_event.entry(event).or_default().push(callback);
    }

    /// Remove the first registration of `callback` for `event`.
    pub(crate) fn unsubscribe(
        &mut self,
        event: &E,
        callback: &Callback<S, E, C, A, R>,
    ) -> Unsubscribe {
        let Some(callbacks) = self.by_event.get_mut(event) else {
            return Unsubscribe::UnknownEvent;
        };

        match callbacks.iter().position(|registered| registered.ptr_eq(callback)) {
            Some(index) => {
                callbacks.remove(index);
                Unsubscribe::Removed
            }
            None => Unsubscribe::NotRegistered,
        }
    }

    /// Callbacks registered for `event`, in registration order.
    pub(crate) fn snapshot(&self, event: &E) -> Vec<Callback<S, E, C, A, R>> {
        self.by_event.get(event).cloned().unwrap_or_default()
    }

    pub(crate) fn count(&self, event: &E) -> usize {
        self.by_event.get(event).map_or(0, Vec::len)
    }
}

impl<S, E: Clone, C, A, R> Clone for SubscriberRegistry<S, E, C, A, R> {
    fn clone(&self) -> Self {
        Self {
            by_event: self.by_event.clone(),
        }
    }
}
