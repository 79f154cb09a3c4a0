//! Compiled transition table.
//!
//! The table is a pure function of the declaration list. It holds two
//! indices: the events allowed from each state, and the transition for each
//! `(event, state)` pair.
//!
//! Duplicate keys follow a last-declaration-wins policy: when two declarations
//! share an `(event, from)` pair, the later one replaces the earlier entry and
//! the earlier one is unreachable, callbacks included.

use super::transition::Transition;
use crate::builder::BuildError;
use crate::core::{Callback, Event, Guard, Identifier, Payload, State};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// One compiled `(event, from) -> to` entry.
pub struct TransitionEntry<S, E, C, A = (), R = ()> {
    pub(crate) from: S,
    pub(crate) event: E,
    pub(crate) to: S,
    pub(crate) guard: Guard<S, E, C, A, R>,
    pub(crate) on_enter: Option<Callback<S, E, C, A, R>>,
    pub(crate) on_exit: Option<Callback<S, E, C, A, R>>,
    pub(crate) declared_at: usize,
}

impl<S, E, C, A, R> TransitionEntry<S, E, C, A, R> {
    /// Source state of this entry.
    pub fn from(&self) -> &S {
        &self.from
    }

    /// Event that fires this entry.
    pub fn event(&self) -> &E {
        &self.event
    }

    /// Target state.
    pub fn to(&self) -> &S {
        &self.to
    }

    /// Position of the winning declaration in the declaration list.
    pub fn declared_at(&self) -> usize {
        self.declared_at
    }
}

impl<S: fmt::Debug, E: fmt::Debug, C, A, R> fmt::Debug for TransitionEntry<S, E, C, A, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransitionEntry")
            .field("from", &self.from)
            .field("event", &self.event)
            .field("to", &self.to)
            .field("declared_at", &self.declared_at)
            .finish_non_exhaustive()
    }
}

/// Indices compiled from a declaration list.
pub struct TransitionTable<S, E, C, A = (), R = ()> {
    allowed_events: HashMap<S, Vec<E>>,
    entries: HashMap<(E, S), Arc<TransitionEntry<S, E, C, A, R>>>,
}

impl<S, E, C, A, R> TransitionTable<S, E, C, A, R>
where
    S: State,
    E: Event,
    C: Send + 'static,
    A: Payload,
    R: Payload,
{
    /// Compile a declaration list.
    ///
    /// Fails when the list is empty or a declaration names no source state.
    pub fn build(transitions: &[Transition<S, E, C, A, R>]) -> Result<Self, BuildError> {
        if transitions.is_empty() {
            return Err(BuildError::NoTransitions);
        }

        let mut allowed_events: HashMap<S, Vec<E>> = HashMap::new();
        let mut entries = HashMap::new();

        for (index, transition) in transitions.iter().enumerate() {
            if transition.from.is_empty() {
                return Err(BuildError::EmptySources { index });
            }

            let guard = transition.guard.clone().unwrap_or_else(Guard::always);

            for from in &transition.from {
                let events = allowed_events.entry(from.clone()).or_default();
                if !events.contains(&transition.event) {
                    events.push(transition.event.clone());
                }

                let entry = Arc::new(TransitionEntry {
                    from: from.clone(),
                    event: transition.event.clone(),
                    to: transition.to.clone(),
                    guard: guard.clone(),
                    on_enter: transition.on_enter.clone(),
                    on_exit: transition.on_exit.clone(),
                    declared_at: index,
                });

                let key = (transition.event.clone(), from.clone());
                if let Some(shadowed) = entries.insert(key, entry) {
                    tracing::trace!(
                        event = %transition.event.name(),
                        from = %from.name(),
                        shadowed = shadowed.declared_at,
                        winner = index,
                        "later declaration replaces earlier transition"
                    );
                }
            }
        }

        Ok(Self {
            allowed_events,
            entries,
        })
    }
}

impl<S, E, C, A, R> TransitionTable<S, E, C, A, R>
where
    S: Identifier,
    E: Identifier,
{
    /// Events declared from `state`, in first-declaration order.
    pub fn allowed_events(&self, state: &S) -> &[E] {
        self.allowed_events
            .get(state)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Whether `event` is declared from `state`.
    pub fn allows(&self, state: &S, event: &E) -> bool {
        self.allowed_events(state).contains(event)
    }

    /// The transition that fires for `event` in `state`, if any.
    pub fn lookup(&self, event: &E, state: &S) -> Option<Arc<TransitionEntry<S, E, C, A, R>>> {
        self.entries
            .get(&(event.clone(), state.clone()))
            .map(Arc::clone)
    }

    /// States with at least one outgoing event.
    pub fn sources(&self) -> impl Iterator<Item = &S> {
        self.allowed_events.keys()
    }

    /// Number of `(event, state)` entries after expansion and shadowing.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<S, E, C, A, R> fmt::Debug for TransitionTable<S, E, C, A, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransitionTable")
            .field("entries", &self.entries.len())
            .finish_non_exhaustive()
    }
}
