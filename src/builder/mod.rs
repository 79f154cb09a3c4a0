//! Builder API for ergonomic state machine construction.
//!
//! This module provides fluent builders, shorthand constructors and macros
//! for declaring state machines with minimal boilerplate.

pub mod error;
pub mod machine;
pub mod macros;
pub mod transition;

pub use error::BuildError;
pub use machine::StateMachineBuilder;
pub use transition::TransitionBuilder;

use crate::core::{Event, Guard, Payload, State};
use crate::effects::Transition;

/// Shorthand for an unguarded transition `from --event--> to`.
///
/// # Example
///
/// ```
/// use smoothstate::builder::t;
/// use smoothstate::effects::Transition;
///
/// let transition: Transition<&str, &str, ()> = t("idle", "fetch", "pending");
/// assert_eq!(transition.from, vec!["idle"]);
/// assert!(transition.guard.is_none());
/// ```
pub fn t<S, E, C, A, R>(from: S, event: E, to: S) -> Transition<S, E, C, A, R>
where
    S: State,
    E: Event,
    C: Send + 'static,
    A: Payload,
    R: Payload,
{
    Transition::new(from, event, to)
}

/// Shorthand for a transition guarded by a predicate over the context.
///
/// # Example
///
/// ```
/// use smoothstate::builder::guarded;
/// use smoothstate::effects::Transition;
///
/// let transition: Transition<&str, &str, u32> =
///     guarded("idle", "retry", "pending", |attempts: &u32| *attempts < 3);
/// assert!(transition.guard.is_some());
/// ```
pub fn guarded<S, E, C, A, R, F>(
    from: S,
    event: E,
    to: S,
    predicate: F,
) -> Transition<S, E, C, A, R>
where
    S: State,
    E: Event,
    C: Send + 'static,
    A: Payload,
    R: Payload,
    F: Fn(&C) -> bool + Send + Sync + 'static,
{
    Transition::new(from, event, to).with_guard(Guard::new(predicate))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::StateMachine;

    #[tokio::test]
    async fn guarded_transition_respects_guard() {
        let machine: StateMachine<&str, &str, u32> = StateMachineBuilder::with_context(3)
            .initial("failed")
            .transition(guarded("failed", "retry", "pending", |attempts: &u32| *attempts < 3))
            .build()
            .unwrap();

        assert!(!machine.can(&"retry").await.unwrap());
        *machine.context().lock().await = 1;
        assert!(machine.can(&"retry").await.unwrap());
    }

    #[test]
    fn shorthand_declares_single_source() {
        let transition: Transition<u8, u8, ()> = t(0, 1, 2);

        assert_eq!(transition.from, vec![0]);
        assert_eq!(transition.event, 1);
        assert_eq!(transition.to, 2);
    }
}
