//! Builder for constructing transition declarations.

use crate::builder::error::BuildError;
use crate::core::{Callback, Event, Guard, Payload, State};
use crate::effects::Transition;

/// Builder for constructing transitions with a fluent API.
///
/// Unlike [`Transition::new`], every required part may be supplied in any
/// order and missing parts are reported by [`build`](Self::build).
pub struct TransitionBuilder<S, E, C, A = (), R = ()> {
    from: Vec<S>,
    event: Option<E>,
    to: Option<S>,
    guard: Option<Guard<S, E, C, A, R>>,
    on_enter: Option<Callback<S, E, C, A, R>>,
    on_exit: Option<Callback<S, E, C, A, R>>,
}

impl<S, E, C, A, R> TransitionBuilder<S, E, C, A, R>
where
    S: State,
    E: Event,
    C: Send + 'static,
    A: Payload,
    R: Payload,
{
    /// Create a new transition builder.
    pub fn new() -> Self {
        Self {
            from: Vec::new(),
            event: None,
            to: None,
            guard: None,
            on_enter: None,
            on_exit: None,
        }
    }

    /// Add a source state (at least one is required).
    pub fn from(mut self, state: S) -> Self {
        self.from.push(state);
        self
    }

    /// Add several source states at once.
    pub fn from_any(mut self, states: impl IntoIterator<Item = S>) -> Self {
        self.from.extend(states);
        self
    }

    /// Set the triggering event (required).
    pub fn event(mut self, event: E) -> Self {
        self.event = Some(event);
        self
    }

    /// Set the target state (required).
    pub fn to(mut self, state: S) -> Self {
        self.to = Some(state);
        self
    }

    /// Add a guard (optional).
    pub fn guard(mut self, guard: Guard<S, E, C, A, R>) -> Self {
        self.guard = Some(guard);
        self
    }

    /// Add a guard using a predicate over the context (optional).
    pub fn when<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&C) -> bool + Send + Sync + 'static,
    {
        self.guard = Some(Guard::new(predicate));
        self
    }

    /// Set the callback run before the state changes.
    pub fn on_enter(mut self, callback: Callback<S, E, C, A, R>) -> Self {
        self.on_enter = Some(callback);
        self
    }

    /// Set the callback run after the state changed.
    pub fn on_exit(mut self, callback: Callback<S, E, C, A, R>) -> Self {
        self.on_exit = Some(callback);
        self
    }

    /// Build the transition.
    pub fn build(self) -> Result<Transition<S, E, C, A, R>, BuildError> {
        if self.from.is_empty() {
            return Err(BuildError::MissingFromState);
        }
        let event = self.event.ok_or(BuildError::MissingEvent)?;
        let to = self.to.ok_or(BuildError::MissingToState)?;

        Ok(Transition {
            from: self.from,
            event,
            to,
            guard: self.guard,
            on_enter: self.on_enter,
            on_exit: self.on_exit,
        })
    }
}

impl<S, E, C, A, R> Default for TransitionBuilder<S, E, C, A, R>
where
    S: State,
    E: Event,
    C: Send + 'static,
    A: Payload,
    R: Payload,
{
    fn default() -> Self {
        Self::new()
    }
}
