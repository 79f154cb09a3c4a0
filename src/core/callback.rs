//! Lifecycle callbacks and the scopes they are invoked with.
//!
//! Every guard and callback receives its inputs explicitly instead of through
//! an implicit receiver: the invoking machine, the shared context, the
//! transition being run, the caller's arguments and the host receiver the
//! machine was built with.

use super::context::Context;
use super::state::{Event, State};
use super::Payload;
use crate::effects::StateMachine;
use futures_util::future::{BoxFuture, FutureExt};
use std::fmt;
use std::future::Future;
use std::sync::Arc;

/// Future returned by guards and callbacks.
pub type HookFuture<T> = BoxFuture<'static, anyhow::Result<T>>;

/// Everything a lifecycle callback or subscriber is invoked with.
///
/// `from`, `to` and `event` describe the transition being executed. `machine`
/// is a handle to the machine running it (the default receiver); `receiver`
/// is the host object supplied at construction, `()` when none was.
pub struct Scope<S, E, C, A = (), R = ()> {
    pub machine: StateMachine<S, E, C, A, R>,
    pub context: Context<C>,
    pub event: E,
    pub from: S,
    pub to: S,
    pub args: A,
    pub receiver: R,
}

impl<S: Clone, E: Clone, C, A: Clone, R: Clone> Clone for Scope<S, E, C, A, R> {
    fn clone(&self) -> Self {
        Self {
            machine: self.machine.clone(),
            context: self.context.clone(),
            event: self.event.clone(),
            from: self.from.clone(),
            to: self.to.clone(),
            args: self.args.clone(),
            receiver: self.receiver.clone(),
        }
    }
}

/// Inputs of a guard evaluation. Guards never see caller arguments.
pub struct GuardScope<S, E, C, A = (), R = ()> {
    pub machine: StateMachine<S, E, C, A, R>,
    pub context: Context<C>,
    pub event: E,
    pub from: S,
    pub to: S,
    pub receiver: R,
}

type ActionFn<S, E, C, A, R> = dyn Fn(Scope<S, E, C, A, R>) -> HookFuture<()> + Send + Sync;

/// A lifecycle callback (`on_enter`, `on_exit`) or event subscriber.
///
/// Callbacks are cheap to clone; clones share identity, which is what
/// [`StateMachine::off`] compares against.
pub struct Callback<S, E, C, A = (), R = ()> {
    action: Arc<ActionFn<S, E, C, A, R>>,
}

impl<S, E, C, A, R> Callback<S, E, C, A, R>
where
    S: State,
    E: Event,
    C: Send + 'static,
    A: Payload,
    R: Payload,
{
    /// Synchronous callback over the context and arguments.
    ///
    /// The context lock is held only while the closure runs.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&mut C, &A) + Send + Sync + 'static,
    {
        Self::try_new(move |context: &mut C, args: &A| {
            f(context, args);
            Ok(())
        })
    }

    /// Synchronous, fallible callback over the context and arguments.
    pub fn try_new<F>(f: F) -> Self
    where
        F: Fn(&mut C, &A) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        let f = Arc::new(f);
        Self::from_fn(move |scope: Scope<S, E, C, A, R>| {
            let f = Arc::clone(&f);
            async move {
                let mut context = scope.context.lock().await;
                f(&mut context, &scope.args)
            }
        })
    }

    /// Asynchronous callback receiving the full [`Scope`].
    ///
    /// Nothing is locked on the callback's behalf, so it may call back into
    /// the machine (check guards, fire other events) before or after locking
    /// the context itself.
    pub fn from_fn<F, Fut>(f: F) -> Self
    where
        F: Fn(Scope<S, E, C, A, R>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        Self {
            action: Arc::new(move |scope: Scope<S, E, C, A, R>| f(scope).boxed()),
        }
    }

    /// Callback that does nothing.
    pub fn noop() -> Self {
        Self::from_fn(|_scope: Scope<S, E, C, A, R>| {
            futures_util::future::ready(Ok(()))
        })
    }

    /// Run `self`, then `next` if `self` succeeded.
    pub fn then(&self, next: Callback<S, E, C, A, R>) -> Self {
        let first = self.clone();
        Self::from_fn(move |scope: Scope<S, E, C, A, R>| {
            let first = first.clone();
            let next = next.clone();
            async move {
                first.call(scope.clone()).await?;
                next.call(scope).await
            }
        })
    }
}

impl<S, E, C, A, R> Callback<S, E, C, A, R> {
    pub(crate) fn call(&self, scope: Scope<S, E, C, A, R>) -> HookFuture<()> {
        (self.action)(scope)
    }

    /// `true` when both handles refer to the same callback.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.action, &other.action)
    }
}

impl<S, E, C, A, R> Clone for Callback<S, E, C, A, R> {
    fn clone(&self) -> Self {
        Self {
            action: Arc::clone(&self.action),
        }
    }
}

impl<S, E, C, A, R> fmt::Debug for Callback<S, E, C, A, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callback")
            .field("action", &Arc::as_ptr(&self.action))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{t, StateMachineBuilder};

    type Log = Vec<&'static str>;

    fn push(entry: &'static str) -> Callback<&'static str, &'static str, Log> {
        Callback::new(move |log: &mut Log, _: &()| log.push(entry))
    }

    #[tokio::test]
    async fn then_runs_in_sequence_and_stops_on_error() {
        let failing: Callback<&'static str, &'static str, Log> =
            Callback::try_new(|_: &mut Log, _: &()| Err(anyhow::anyhow!("halt")));
        let machine: StateMachine<&'static str, &'static str, Log> = StateMachineBuilder::new()
            .initial("a")
            .transitions([
                t("a", "go", "b").on_enter(push("first").then(push("second"))),
                t("b", "go", "c").on_enter(failing.then(push("unreachable"))),
            ])
            .build()
            .unwrap();

        machine.fire("go").await.unwrap();
        assert!(machine.fire("go").await.is_err());

        assert_eq!(*machine.context().lock().await, vec!["first", "second"]);
    }

    #[tokio::test]
    async fn clones_share_identity() {
        let callback = push("x");
        let clone = callback.clone();

        assert!(callback.ptr_eq(&clone));
        assert!(!callback.ptr_eq(&push("x")));
    }

    #[tokio::test]
    async fn scope_carries_arguments_unchanged() {
        type Pair = (u32, u32);
        let machine: StateMachine<&'static str, &'static str, Vec<u32>, Pair> =
            StateMachineBuilder::new()
                .initial("a")
                .transition(t("a", "go", "b").on_enter(Callback::from_fn(
                    |scope: Scope<&'static str, &'static str, Vec<u32>, Pair>| async move {
                        let (x, y) = scope.args;
                        scope.context.lock().await.extend([x, y]);
                        Ok(())
                    },
                )))
                .build()
                .unwrap();

        machine.transition("go", (4, 2)).await.unwrap();

        assert_eq!(*machine.context().lock().await, vec![4, 2]);
    }
}
