//! Transition declarations.

use crate::core::{Callback, Event, Guard, Payload, State};
use std::fmt;

/// A declared edge `(from, event) -> to` with an optional guard and
/// lifecycle callbacks.
///
/// `from` may name several states; the declaration then expands to one table
/// entry per source state, all sharing the same event, target, guard and
/// callbacks.
pub struct Transition<S, E, C, A = (), R = ()> {
    pub from: Vec<S>,
    pub event: E,
    pub to: S,
    pub guard: Option<Guard<S, E, C, A, R>>,
    pub on_enter: Option<Callback<S, E, C, A, R>>,
    pub on_exit: Option<Callback<S, E, C, A, R>>,
}

impl<S, E, C, A, R> Transition<S, E, C, A, R>
where
    S: State,
    E: Event,
    C: Send + 'static,
    A: Payload,
    R: Payload,
{
    /// Unguarded transition from a single state.
    pub fn new(from: S, event: E, to: S) -> Self {
        Self::from_any([from], event, to)
    }

    /// Unguarded transition shared by several source states.
    pub fn from_any(from: impl IntoIterator<Item = S>, event: E, to: S) -> Self {
        Self {
            from: from.into_iter().collect(),
            event,
            to,
            guard: None,
            on_enter: None,
            on_exit: None,
        }
    }

    /// Allow the transition only when `guard` passes.
    pub fn with_guard(mut self, guard: Guard<S, E, C, A, R>) -> Self {
        self.guard = Some(guard);
        self
    }

    /// Run `callback` before the state changes.
    pub fn on_enter(mut self, callback: Callback<S, E, C, A, R>) -> Self {
        self.on_enter = Some(callback);
        self
    }

    /// Run `callback` after the state changed and subscribers ran.
    pub fn on_exit(mut self, callback: Callback<S, E, C, A, R>) -> Self {
        self.on_exit = Some(callback);
        self
    }

    /// Run `hook` after this transition's own `on_exit`.
    ///
    /// This is the seam persistence layers use to save after a transition
    /// without changing the execution order of the core callbacks.
    pub fn chain_on_exit(mut self, hook: Callback<S, E, C, A, R>) -> Self {
        self.on_exit = Some(match self.on_exit.take() {
            Some(existing) => existing.then(hook),
            None => hook,
        });
        self
    }

    /// Whether `state` is one of the declared sources.
    pub fn leaves(&self, state: &S) -> bool {
        self.from.contains(state)
    }
}

impl<S: Clone, E: Clone, C, A, R> Clone for Transition<S, E, C, A, R> {
    fn clone(&self) -> Self {
        Self {
            from: self.from.clone(),
            event: self.event.clone(),
            to: self.to.clone(),
            guard: self.guard.clone(),
            on_enter: self.on_enter.clone(),
            on_exit: self.on_exit.clone(),
        }
    }
}

impl<S: fmt::Debug, E: fmt::Debug, C, A, R> fmt::Debug for Transition<S, E, C, A, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transition")
            .field("from", &self.from)
            .field("event", &self.event)
            .field("to", &self.to)
            .field("guarded", &self.guard.is_some())
            .finish_non_exhaustive()
    }
}
