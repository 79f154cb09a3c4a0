//! Derived per-machine accessor methods.
//!
//! Every string-shaped event name yields a trigger (`fetch`) and a probe
//! (`canFetch`); every string-shaped state name appearing as a source or a
//! target yields a checker (`isIdle`). Identifiers without an accessor stem
//! (capitalized, numeric) are skipped and stay reachable through
//! `transition`, `can` and `is`.
//!
//! When two kinds derive the same name, checkers win over triggers and
//! triggers win over probes. Each overwrite is logged with `warn!`.

use super::transition::Transition;
use crate::core::{capitalize, Identifier};
use std::collections::BTreeMap;
use std::mem;

/// What a derived method name is bound to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Accessor<S, E> {
    /// `<event>`: run the transition for the event.
    Trigger(E),
    /// `can<Event>`: evaluate whether the event may fire now.
    Probe(E),
    /// `is<State>`: compare the current state.
    Check(S),
}

impl<S: Identifier, E: Identifier> Accessor<S, E> {
    fn target(&self) -> String {
        match self {
            Self::Trigger(event) | Self::Probe(event) => event.name().into_owned(),
            Self::Check(state) => state.name().into_owned(),
        }
    }
}

/// Method-name table of a machine.
#[derive(Clone, Debug)]
pub struct Accessors<S, E> {
    methods: BTreeMap<String, Accessor<S, E>>,
}

impl<S: Identifier, E: Identifier> Accessors<S, E> {
    pub(crate) fn derive<C, A, R>(transitions: &[Transition<S, E, C, A, R>]) -> Self {
        let mut accessors = Self {
            methods: BTreeMap::new(),
        };

        for transition in transitions {
            if let Some(stem) = transition.event.accessor_stem() {
                let name = format!("can{}", capitalize(&stem));
                accessors.bind(name, Accessor::Probe(transition.event.clone()));
            }
        }

        for transition in transitions {
            if let Some(stem) = transition.event.accessor_stem() {
                accessors.bind(stem, Accessor::Trigger(transition.event.clone()));
            }
        }

        for transition in transitions {
            for state in transition.from.iter().chain(std::iter::once(&transition.to)) {
                if let Some(stem) = state.accessor_stem() {
                    let name = format!("is{}", capitalize(&stem));
                    accessors.bind(name, Accessor::Check(state.clone()));
                }
            }
        }

        accessors
    }

    // Passes run probes, triggers, checkers; within a kind the first binding stays.
    fn bind(&mut self, name: String, accessor: Accessor<S, E>) {
        match self.methods.get(&name) {
            Some(existing) if mem::discriminant(existing) == mem::discriminant(&accessor) => {}
            Some(existing) => {
                tracing::warn!(
                    method = %name,
                    replaced = %existing.target(),
                    bound = %accessor.target(),
                    "derived method {} is declared twice, keeping the later kind",
                    name
                );
                self.methods.insert(name, accessor);
            }
            None => {
                self.methods.insert(name, accessor);
            }
        }
    }

    /// Binding for a derived method name.
    pub fn get(&self, name: &str) -> Option<&Accessor<S, E>> {
        self.methods.get(name)
    }

    /// Whether a derived method with this name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.methods.contains_key(name)
    }

    /// Derived method names in lexical order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.methods.keys().map(String::as_str)
    }

    /// Number of derived methods.
    pub fn len(&self) -> usize {
        self.methods.len()
    }

    /// Whether no identifier qualified for a derived method.
    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }
}
