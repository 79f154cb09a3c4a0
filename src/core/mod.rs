//! Core state machine types.
//!
//! This module contains the vocabulary the engine is built from:
//! - State and event identifiers via the `Identifier` trait
//! - The shared, mutable `Context` handle
//! - Guard predicates and lifecycle callbacks, with the scopes they receive

mod callback;
mod context;
mod guard;
mod state;

pub use callback::{Callback, GuardScope, HookFuture, Scope};
pub use context::Context;
pub use guard::Guard;
pub use state::{Event, Identifier, State};

pub(crate) use state::capitalize;

/// Bound shared by callback arguments and host receivers: values that are
/// cloned into every guard and callback invocation.
pub trait Payload: Clone + Send + Sync + 'static {}

impl<T: Clone + Send + Sync + 'static> Payload for T {}
