//! Smoothstate: a table-driven asynchronous finite state machine engine
//!
//! A machine is declared as a list of transitions `(from, event) -> to`, each
//! with an optional guard and optional `on_enter` / `on_exit` callbacks. The
//! engine checks whether an event may fire, runs the callbacks around the
//! state change, notifies event subscribers and can fork itself with extra
//! transitions.
//!
//! # Core Concepts
//!
//! - **Identifiers**: any `Clone + Eq + Hash` value names a state or an event
//! - **Context**: mutable data shared by a machine and its forks
//! - **Guards**: asynchronous predicates evaluated fresh on every check
//! - **Callbacks**: lifecycle hooks and subscribers receiving an explicit scope
//! - **Accessors**: `fetch`, `canFetch`, `isIdle` style names derived per machine
//! - **Snapshots**: serializable `(state, context)` pairs for persistence
//!
//! # Example
//!
//! ```rust
//! use smoothstate::prelude::*;
//!
//! #[derive(Default)]
//! struct Stats {
//!     fetches: u32,
//! }
//!
//! # let rt = tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap();
//! # rt.block_on(async {
//! let machine: StateMachine<&str, &str, Stats> = StateMachineBuilder::new()
//!     .id("fetcher")
//!     .initial("idle")
//!     .transitions(vec![
//!         t("idle", "fetch", "pending").on_enter(Callback::new(|stats: &mut Stats, _: &()| {
//!             stats.fetches += 1
//!         })),
//!         t("pending", "resolve", "idle"),
//!     ])
//!     .build()
//!     .unwrap();
//!
//! assert!(machine.check("isIdle").unwrap());
//! machine.trigger("fetch", ()).await.unwrap();
//! assert!(machine.is(&"pending"));
//! assert!(machine.probe("canResolve").await.unwrap());
//! assert_eq!(machine.context().lock().await.fetches, 1);
//! # });
//! ```

pub mod builder;
pub mod checkpoint;
pub mod core;
pub mod effects;

// Re-export commonly used types
pub use crate::builder::{BuildError, StateMachineBuilder};
pub use crate::checkpoint::{CheckpointError, Snapshot};
pub use crate::core::{Callback, Context, Guard, Identifier, Scope};
pub use crate::effects::{StateMachine, StateMachineError, Transition};

/// Everything needed to declare and run a machine.
pub mod prelude {
    pub use crate::builder::{guarded, t, BuildError, StateMachineBuilder, TransitionBuilder};
    pub use crate::checkpoint::Snapshot;
    pub use crate::core::{Callback, Context, Event, Guard, GuardScope, Identifier, Scope, State};
    pub use crate::effects::{StateMachine, StateMachineError, Transition};
}
