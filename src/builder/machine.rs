//! Builder for constructing state machines.

use crate::builder::error::BuildError;
use crate::builder::transition::TransitionBuilder;
use crate::checkpoint::{CheckpointError, Snapshot};
use crate::core::{Callback, Context, Event, Payload, State};
use crate::effects::machine::MachineParts;
use crate::effects::subscribers::SubscriberRegistry;
use crate::effects::{StateMachine, Transition, DEFAULT_MACHINE_ID};

/// Builder for constructing state machines with a fluent API.
///
/// The context starts as `C::default()` and the receiver as `R::default()`
/// unless supplied through [`with_context`](Self::with_context),
/// [`with_receiver`](Self::with_receiver) or the matching setters.
pub struct StateMachineBuilder<S, E, C = (), A = (), R = ()> {
    id: Option<String>,
    initial: Option<S>,
    context: Context<C>,
    transitions: Vec<Transition<S, E, C, A, R>>,
    exit_hooks: Vec<Callback<S, E, C, A, R>>,
    receiver: R,
}

impl<S, E, C, A, R> StateMachineBuilder<S, E, C, A, R>
where
    S: State,
    E: Event,
    C: Default + Send + 'static,
    A: Payload,
    R: Payload + Default,
{
    /// Create a new builder with a default context and receiver.
    pub fn new() -> Self {
        Self::with_receiver(C::default(), R::default())
    }
}

impl<S, E, C, A, R> Default for StateMachineBuilder<S, E, C, A, R>
where
    S: State,
    E: Event,
    C: Default + Send + 'static,
    A: Payload,
    R: Payload + Default,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<S, E, C, A, R> StateMachineBuilder<S, E, C, A, R>
where
    S: State,
    E: Event,
    C: Send + 'static,
    A: Payload,
    R: Payload + Default,
{
    /// Create a builder around an initial context value.
    pub fn with_context(context: C) -> Self {
        Self::with_receiver(context, R::default())
    }
}

impl<S, E, C, A, R> StateMachineBuilder<S, E, C, A, R>
where
    S: State,
    E: Event,
    C: Send + 'static,
    A: Payload,
    R: Payload,
{
    /// Create a builder around a context and a host receiver.
    pub fn with_receiver(context: C, receiver: R) -> Self {
        Self {
            id: None,
            initial: None,
            context: Context::new(context),
            transitions: Vec::new(),
            exit_hooks: Vec::new(),
            receiver,
        }
    }

    /// Set the id used in error messages and logs (defaults to `"fsm"`).
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Set the initial state (required).
    pub fn initial(mut self, state: S) -> Self {
        self.initial = Some(state);
        self
    }

    /// Replace the context value.
    pub fn context(mut self, context: C) -> Self {
        self.context = Context::new(context);
        self
    }

    /// Use an existing context handle, shared with whoever else holds it.
    pub fn shared_context(mut self, context: Context<C>) -> Self {
        self.context = context;
        self
    }

    /// Set the host object handed to guards and callbacks.
    pub fn receiver(mut self, receiver: R) -> Self {
        self.receiver = receiver;
        self
    }

    /// Add a transition declaration.
    pub fn transition(mut self, transition: Transition<S, E, C, A, R>) -> Self {
        self.transitions.push(transition);
        self
    }

    /// Add multiple transitions at once, in declaration order.
    pub fn transitions(
        mut self,
        transitions: impl IntoIterator<Item = Transition<S, E, C, A, R>>,
    ) -> Self {
        self.transitions.extend(transitions);
        self
    }

    /// Add a transition using a builder.
    /// Returns an error if the builder fails validation.
    pub fn transition_with(
        mut self,
        builder: TransitionBuilder<S, E, C, A, R>,
    ) -> Result<Self, BuildError> {
        let transition = builder.build()?;
        self.transitions.push(transition);
        Ok(self)
    }

    /// Run `hook` after the `on_exit` of every transition, including
    /// transitions later added to forks of the built machine.
    pub fn after_exit(mut self, hook: Callback<S, E, C, A, R>) -> Self {
        self.exit_hooks.push(hook);
        self
    }

    /// Start from a previously taken snapshot: its state becomes the initial
    /// state, its context the context and its machine id the id.
    pub fn restore(mut self, snapshot: Snapshot<S, C>) -> Result<Self, CheckpointError> {
        snapshot.validate()?;

        tracing::debug!(
            machine = %snapshot.machine_id,
            snapshot = %snapshot.id,
            taken_at = %snapshot.taken_at,
            "restoring state machine from snapshot"
        );

        self.id = Some(snapshot.machine_id);
        self.initial = Some(snapshot.state);
        self.context = Context::new(snapshot.context);
        Ok(self)
    }

    /// Build the state machine.
    /// Returns an error if required fields are missing or a declaration is malformed.
    pub fn build(self) -> Result<StateMachine<S, E, C, A, R>, BuildError> {
        let initial = self.initial.ok_or(BuildError::MissingInitialState)?;

        if self.transitions.is_empty() {
            return Err(BuildError::NoTransitions);
        }

        StateMachine::assemble(MachineParts {
            id: self.id.unwrap_or_else(|| DEFAULT_MACHINE_ID.to_string()),
            initial,
            context: self.context,
            transitions: self.transitions,
            exit_hooks: self.exit_hooks,
            subscribers: SubscriberRegistry::new(),
            receiver: self.receiver,
        })
    }
}
