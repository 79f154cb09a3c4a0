//! Errors raised while running a machine.

use crate::builder::BuildError;
use thiserror::Error;

/// Classified engine error.
///
/// Errors of this type raised from inside a guard or callback propagate
/// unchanged; anything else raised there is wrapped into
/// [`StateMachineError::CallbackFailure`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StateMachineError {
    /// The event is not declared for the current state, or its guard rejected it.
    #[error("Event {event} is not allowed in state {state} of {id}")]
    NotAllowed {
        id: String,
        event: String,
        state: String,
    },

    /// The check passed but no entry matched at execution time.
    #[error("Transition for event {event} and state {state} of {id} is not found")]
    NotFound {
        id: String,
        event: String,
        state: String,
    },

    /// A guard, lifecycle callback or subscriber failed.
    #[error("Exception caught in {id} on transition from {from} to {to}: {message}")]
    CallbackFailure {
        id: String,
        event: String,
        from: String,
        to: String,
        message: String,
    },

    /// No derived accessor with that name exists on the machine.
    #[error("Method {name} is not defined on {id}")]
    UnknownAccessor { id: String, name: String },

    /// The declaration list does not compile into a table.
    #[error(transparent)]
    Construction(#[from] BuildError),
}

impl StateMachineError {
    /// Whether the event was rejected by the table or a guard.
    pub fn is_not_allowed(&self) -> bool {
        matches!(self, Self::NotAllowed { .. })
    }

    /// Whether the entry vanished between the check and the execution.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Whether user code failed.
    pub fn is_callback_failure(&self) -> bool {
        matches!(self, Self::CallbackFailure { .. })
    }

    /// Id of the machine that raised the error, when it carries one.
    pub fn machine_id(&self) -> Option<&str> {
        match self {
            Self::NotAllowed { id, .. }
            | Self::NotFound { id, .. }
            | Self::CallbackFailure { id, .. }
            | Self::UnknownAccessor { id, .. } => Some(id.as_str()),
            Self::Construction(_) => None,
        }
    }
}

/// Whether an `anyhow` error raised by a callback is an engine error.
pub fn is_state_machine_error(error: &anyhow::Error) -> bool {
    error.downcast_ref::<StateMachineError>().is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_event_state_and_machine() {
        let err = StateMachineError::NotAllowed {
            id: "fetch fsm".into(),
            event: "resolve".into(),
            state: "idle".into(),
        };
        assert_eq!(err.to_string(), "Event resolve is not allowed in state idle of fetch fsm");

        let err = StateMachineError::NotFound {
            id: "fsm".into(),
            event: "resolve".into(),
            state: "idle".into(),
        };
        assert_eq!(
            err.to_string(),
            "Transition for event resolve and state idle of fsm is not found"
        );
    }

    #[test]
    fn callback_failure_carries_transition() {
        let err = StateMachineError::CallbackFailure {
            id: "order-7".into(),
            event: "ship".into(),
            from: "paid".into(),
            to: "shipped".into(),
            message: "carrier offline".into(),
        };

        assert_eq!(
            err.to_string(),
            "Exception caught in order-7 on transition from paid to shipped: carrier offline"
        );
        assert!(err.is_callback_failure());
        assert_eq!(err.machine_id(), Some("order-7"));
    }

    #[test]
    fn construction_errors_convert() {
        let err: StateMachineError = BuildError::NoTransitions.into();
        assert!(matches!(err, StateMachineError::Construction(BuildError::NoTransitions)));
        assert_eq!(err.machine_id(), None);
    }

    #[test]
    fn recognizes_engine_errors_inside_anyhow() {
        let engine: anyhow::Error = StateMachineError::UnknownAccessor {
            id: "fsm".into(),
            name: "isNowhere".into(),
        }
        .into();
        let other = anyhow::anyhow!("boom");

        assert!(is_state_machine_error(&engine));
        assert!(!is_state_machine_error(&other));
    }
}
