//! The execution engine.
//!
//! This module turns transition declarations into a running machine:
//!
//! - **Transitions**: declared edges with optional guards and callbacks
//! - **Table**: indices compiled from the declarations, last declaration wins
//! - **State Machine**: checks, executes and forks, notifying subscribers
//! - **Accessors**: per-machine method names derived from identifier names

mod accessors;
mod error;
pub(crate) mod machine;
pub(crate) mod subscribers;
mod table;
mod transition;

pub use accessors::{Accessor, Accessors};
pub use error::{is_state_machine_error, StateMachineError};
pub use machine::{StateMachine, DEFAULT_MACHINE_ID};
pub use table::{TransitionEntry, TransitionTable};
pub use transition::Transition;
