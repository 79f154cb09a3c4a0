//! State machine that executes guarded, asynchronous transitions.

use super::accessors::{Accessor, Accessors};
use super::error::StateMachineError;
use super::subscribers::{SubscriberRegistry, Unsubscribe};
use super::table::{TransitionEntry, TransitionTable};
use super::transition::Transition;
use crate::builder::BuildError;
use crate::core::{Callback, Context, Event, GuardScope, Identifier, Payload, Scope, State};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};

/// Id used in error messages when none is configured.
pub const DEFAULT_MACHINE_ID: &str = "fsm";

/// Everything needed to assemble a machine.
pub(crate) struct MachineParts<S, E, C, A, R> {
    pub(crate) id: String,
    pub(crate) initial: S,
    pub(crate) context: Context<C>,
    pub(crate) transitions: Vec<Transition<S, E, C, A, R>>,
    pub(crate) exit_hooks: Vec<Callback<S, E, C, A, R>>,
    pub(crate) subscribers: SubscriberRegistry<S, E, C, A, R>,
    pub(crate) receiver: R,
}

struct Inner<S, E, C, A, R> {
    id: String,
    current: RwLock<S>,
    context: Context<C>,
    transitions: Vec<Transition<S, E, C, A, R>>,
    exit_hooks: Vec<Callback<S, E, C, A, R>>,
    table: TransitionTable<S, E, C, A, R>,
    accessors: Accessors<S, E>,
    subscribers: Mutex<SubscriberRegistry<S, E, C, A, R>>,
    receiver: R,
}

/// A finite state machine instance.
///
/// `StateMachine` is a handle: cloning it yields another handle to the same
/// instance (same state, same subscribers). A new, independent instance is
/// only ever produced by [`StateMachine::add_transition`].
///
/// No lock spans a whole transition. Callers that need transitions on one
/// instance to be atomic with respect to each other must serialize them.
///
/// # Example
///
/// ```rust
/// use smoothstate::builder::{t, StateMachineBuilder};
/// use smoothstate::effects::StateMachine;
///
/// # let rt = tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap();
/// # rt.block_on(async {
/// let machine: StateMachine<&str, &str> = StateMachineBuilder::new()
///     .id("fetcher")
///     .initial("idle")
///     .transitions(vec![
///         t("idle", "fetch", "pending"),
///         t("pending", "resolve", "idle"),
///     ])
///     .build()
///     .unwrap();
///
/// machine.fire("fetch").await.unwrap();
/// assert!(machine.is(&"pending"));
///
/// let err = machine.fire("fetch").await.unwrap_err();
/// assert_eq!(err.to_string(), "Event fetch is not allowed in state pending of fetcher");
/// # });
/// ```
pub struct StateMachine<S, E, C = (), A = (), R = ()> {
    inner: Arc<Inner<S, E, C, A, R>>,
}

impl<S, E, C, A, R> StateMachine<S, E, C, A, R>
where
    S: State,
    E: Event,
    C: Send + 'static,
    A: Payload,
    R: Payload,
{
    pub(crate) fn assemble(parts: MachineParts<S, E, C, A, R>) -> Result<Self, BuildError> {
        let MachineParts {
            id,
            initial,
            context,
            transitions,
            exit_hooks,
            subscribers,
            receiver,
        } = parts;

        let compiled: Vec<_> = transitions
            .iter()
            .cloned()
            .map(|transition| {
                exit_hooks
                    .iter()
                    .fold(transition, |transition, hook| transition.chain_on_exit(hook.clone()))
            })
            .collect();
        let table = TransitionTable::build(&compiled)?;
        let accessors = Accessors::derive(&transitions);

        tracing::debug!(
            machine = %id,
            state = %initial.name(),
            transitions = transitions.len(),
            entries = table.len(),
            "state machine assembled"
        );

        Ok(Self {
            inner: Arc::new(Inner {
                id,
                current: RwLock::new(initial),
                context,
                transitions,
                exit_hooks,
                table,
                accessors,
                subscribers: Mutex::new(subscribers),
                receiver,
            }),
        })
    }

    /// Id used in error messages and logs.
    pub fn id(&self) -> &str {
        &self.inner.id
    }

    /// The active state.
    pub fn current(&self) -> S {
        self.inner
            .current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Handle to the shared context.
    pub fn context(&self) -> Context<C> {
        self.inner.context.clone()
    }

    /// Host object handed to every guard and callback.
    pub fn receiver(&self) -> &R {
        &self.inner.receiver
    }

    /// Whether the active state is `state`.
    pub fn is(&self, state: &S) -> bool {
        self.current() == *state
    }

    /// The declaration list this machine was assembled from.
    pub fn transitions(&self) -> &[Transition<S, E, C, A, R>] {
        &self.inner.transitions
    }

    /// Compiled lookup indices.
    pub fn table(&self) -> &TransitionTable<S, E, C, A, R> {
        &self.inner.table
    }

    /// Derived method names and their bindings.
    pub fn accessors(&self) -> &Accessors<S, E> {
        &self.inner.accessors
    }

    /// Whether both handles point at the same instance.
    pub fn same_instance(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Whether `event` may fire from the current state right now.
    ///
    /// The guard is evaluated fresh against the live context on every call.
    pub async fn can(&self, event: &E) -> Result<bool, StateMachineError> {
        let current = self.current();
        if !self.inner.table.allows(&current, event) {
            return Ok(false);
        }

        match self.inner.table.lookup(event, &current) {
            Some(entry) => self.evaluate(&entry).await,
            None => Ok(false),
        }
    }

    /// Run the transition declared for `event` from the current state.
    ///
    /// Execution order: `on_enter`, state change, subscribers in registration
    /// order, `on_exit`. The state has already moved when subscribers and
    /// `on_exit` run, so their failures do not roll it back.
    pub async fn transition(&self, event: E, args: A) -> Result<Self, StateMachineError> {
        if !self.can(&event).await? {
            let state = self.current();
            tracing::debug!(
                machine = %self.inner.id,
                event = %event.name(),
                state = %state.name(),
                "transition rejected"
            );
            return Err(StateMachineError::NotAllowed {
                id: self.inner.id.clone(),
                event: event.name().into_owned(),
                state: state.name().into_owned(),
            });
        }

        // Other tasks may run between the check and the execution.
        tokio::task::yield_now().await;

        let current = self.current();
        let Some(entry) = self.inner.table.lookup(&event, &current) else {
            return Err(StateMachineError::NotFound {
                id: self.inner.id.clone(),
                event: event.name().into_owned(),
                state: current.name().into_owned(),
            });
        };

        self.execute(&entry, args).await?;
        Ok(self.clone())
    }

    /// [`transition`](Self::transition) with default arguments.
    pub async fn fire(&self, event: E) -> Result<Self, StateMachineError>
    where
        A: Default,
    {
        self.transition(event, A::default()).await
    }

    /// Whether no event can fire from the current state right now.
    ///
    /// This is a snapshot over the present context: guards may change their
    /// answer once the context changes.
    pub async fn is_final(&self) -> Result<bool, StateMachineError> {
        let current = self.current();
        for event in self.inner.table.allowed_events(&current) {
            if let Some(entry) = self.inner.table.lookup(event, &current) {
                if self.evaluate(&entry).await? {
                    return Ok(false);
                }
            }
        }
        Ok(true)
    }

    /// Subscribe to `event`. Subscribers run after the state has moved.
    pub fn on(&self, event: E, callback: Callback<S, E, C, A, R>) {
        self.registry().subscribe(event, callback);
    }

    /// Unsubscribe `callback` from `event`.
    pub fn off(&self, event: &E, callback: &Callback<S, E, C, A, R>) {
        if self.registry().unsubscribe(event, callback) == Unsubscribe::UnknownEvent {
            tracing::warn!(
                machine = %self.inner.id,
                event = %event.name(),
                "Event {} is not subscribed in {}",
                event.name(),
                self.inner.id
            );
        }
    }

    /// Number of subscribers registered for `event`.
    pub fn subscriber_count(&self, event: &E) -> usize {
        self.registry().count(event)
    }

    /// New machine with `transition` appended to the declarations.
    ///
    /// The fork starts in this machine's current state, shares its context,
    /// receiver and after-exit hooks, and starts with a copy of its
    /// subscribers. This machine is left untouched. A declaration that does
    /// not compile into the table fails with
    /// [`StateMachineError::Construction`].
    pub fn add_transition(
        &self,
        transition: Transition<S, E, C, A, R>,
    ) -> Result<Self, StateMachineError> {
        let mut transitions = self.inner.transitions.clone();
        transitions.push(transition);
        let subscribers = self.registry().clone();

        let fork = Self::assemble(MachineParts {
            id: self.inner.id.clone(),
            initial: self.current(),
            context: self.context(),
            transitions,
            exit_hooks: self.inner.exit_hooks.clone(),
            subscribers,
            receiver: self.inner.receiver.clone(),
        })?;

        tracing::debug!(
            machine = %self.inner.id,
            state = %fork.current().name(),
            "state machine forked"
        );
        Ok(fork)
    }

    /// Fire the event bound to a derived trigger name such as `fetch`.
    pub async fn trigger(&self, method: &str, args: A) -> Result<Self, StateMachineError> {
        match self.inner.accessors.get(method) {
            Some(Accessor::Trigger(event)) => self.transition(event.clone(), args).await,
            _ => Err(self.unknown_accessor(method)),
        }
    }

    /// Evaluate a derived probe name such as `canFetch`.
    pub async fn probe(&self, method: &str) -> Result<bool, StateMachineError> {
        match self.inner.accessors.get(method) {
            Some(Accessor::Probe(event)) => self.can(event).await,
            _ => Err(self.unknown_accessor(method)),
        }
    }

    /// Evaluate a derived checker name such as `isIdle`.
    pub fn check(&self, method: &str) -> Result<bool, StateMachineError> {
        match self.inner.accessors.get(method) {
            Some(Accessor::Check(state)) => Ok(self.is(state)),
            _ => Err(self.unknown_accessor(method)),
        }
    }

    async fn evaluate(
        &self,
        entry: &TransitionEntry<S, E, C, A, R>,
    ) -> Result<bool, StateMachineError> {
        let scope = GuardScope {
            machine: self.clone(),
            context: self.context(),
            event: entry.event.clone(),
            from: entry.from.clone(),
            to: entry.to.clone(),
            receiver: self.inner.receiver.clone(),
        };

        entry
            .guard
            .check(scope)
            .await
            .map_err(|err| self.classify(entry, err))
    }

    async fn execute(
        &self,
        entry: &TransitionEntry<S, E, C, A, R>,
        args: A,
    ) -> Result<(), StateMachineError> {
        let scope = Scope {
            machine: self.clone(),
            context: self.context(),
            event: entry.event.clone(),
            from: entry.from.clone(),
            to: entry.to.clone(),
            args,
            receiver: self.inner.receiver.clone(),
        };

        self.run_callbacks(entry, scope)
            .await
            .map_err(|err| self.classify(entry, err))?;

        tracing::debug!(
            machine = %self.inner.id,
            event = %entry.event.name(),
            from = %entry.from.name(),
            to = %entry.to.name(),
            "transition executed"
        );
        Ok(())
    }

    async fn run_callbacks(
        &self,
        entry: &TransitionEntry<S, E, C, A, R>,
        scope: Scope<S, E, C, A, R>,
    ) -> anyhow::Result<()> {
        if let Some(on_enter) = &entry.on_enter {
            on_enter.call(scope.clone()).await?;
        }

        self.set_current(entry.to.clone());

        for subscriber in self.subscribers_for(&entry.event) {
            subscriber.call(scope.clone()).await?;
        }

        if let Some(on_exit) = &entry.on_exit {
            on_exit.call(scope).await?;
        }
        Ok(())
    }

    fn classify(
        &self,
        entry: &TransitionEntry<S, E, C, A, R>,
        err: anyhow::Error,
    ) -> StateMachineError {
        match err.downcast::<StateMachineError>() {
            Ok(classified) => classified,
            Err(err) => {
                tracing::debug!(
                    machine = %self.inner.id,
                    event = %entry.event.name(),
                    error = %err,
                    "callback failed"
                );
                StateMachineError::CallbackFailure {
                    id: self.inner.id.clone(),
                    event: entry.event.name().into_owned(),
                    from: entry.from.name().into_owned(),
                    to: entry.to.name().into_owned(),
                    message: format!("{err:#}"),
                }
            }
        }
    }

    fn unknown_accessor(&self, method: &str) -> StateMachineError {
        StateMachineError::UnknownAccessor {
            id: self.inner.id.clone(),
            name: method.to_string(),
        }
    }

    fn set_current(&self, state: S) {
        *self
            .inner
            .current
            .write()
            .unwrap_or_else(PoisonError::into_inner) = state;
    }

    fn subscribers_for(&self, event: &E) -> Vec<Callback<S, E, C, A, R>> {
        self.registry().snapshot(event)
    }

    fn registry(&self) -> MutexGuard<'_, SubscriberRegistry<S, E, C, A, R>> {
        self.inner
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl<S, E, C, A, R> Clone for StateMachine<S, E, C, A, R> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S, E, C, A, R> fmt::Debug for StateMachine<S, E, C, A, R>
where
    S: Identifier,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let current = self
            .inner
            .current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        f.debug_struct("StateMachine")
            .field("id", &self.inner.id)
            .field("current", &current)
            .field("transitions", &self.inner.transitions.len())
            .finish_non_exhaustive()
    }
}
