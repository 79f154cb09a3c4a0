//! Guard predicates for controlling state transitions.
//!
//! A guard decides whether a declared transition may fire. It is evaluated
//! fresh against the live context every time it is consulted and is never
//! cached, because the context it depends on is mutable.

use super::callback::{GuardScope, HookFuture};
use super::state::{Event, State};
use super::Payload;
use futures_util::future::FutureExt;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

type PredicateFn<S, E, C, A, R> =
    dyn Fn(GuardScope<S, E, C, A, R>) -> HookFuture<bool> + Send + Sync;

/// Predicate that determines if a transition can execute.
///
/// # Example
///
/// ```rust
/// use smoothstate::builder::{t, StateMachineBuilder};
/// use smoothstate::core::Guard;
/// use smoothstate::effects::StateMachine;
///
/// #[derive(Default)]
/// struct Wallet {
///     balance: u32,
/// }
///
/// # let rt = tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap();
/// # rt.block_on(async {
/// let machine: StateMachine<&str, &str, Wallet> = StateMachineBuilder::new()
///     .initial("browsing")
///     .transition(
///         t("browsing", "checkout", "paid").with_guard(Guard::new(|w: &Wallet| w.balance >= 10)),
///     )
///     .build()
///     .unwrap();
///
/// assert!(!machine.can(&"checkout").await.unwrap());
/// machine.context().lock().await.balance = 25;
/// assert!(machine.can(&"checkout").await.unwrap());
/// # });
/// ```
pub struct Guard<S, E, C, A = (), R = ()> {
    predicate: Arc<PredicateFn<S, E, C, A, R>>,
}

impl<S, E, C, A, R> Guard<S, E, C, A, R>
where
    S: State,
    E: Event,
    C: Send + 'static,
    A: Payload,
    R: Payload,
{
    /// Guard from a synchronous predicate over the context.
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&C) -> bool + Send + Sync + 'static,
    {
        Self::try_new(move |context: &C| Ok(predicate(context)))
    }

    /// Guard from a synchronous, fallible predicate over the context.
    pub fn try_new<F>(predicate: F) -> Self
    where
        F: Fn(&C) -> anyhow::Result<bool> + Send + Sync + 'static,
    {
        let predicate = Arc::new(predicate);
        Self::from_fn(move |scope: GuardScope<S, E, C, A, R>| {
            let predicate = Arc::clone(&predicate);
            async move {
                let context = scope.context.lock().await;
                predicate(&context)
            }
        })
    }

    /// Guard from an asynchronous predicate receiving the full [`GuardScope`].
    pub fn from_fn<F, Fut>(predicate: F) -> Self
    where
        F: Fn(GuardScope<S, E, C, A, R>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<bool>> + Send + 'static,
    {
        Self {
            predicate: Arc::new(move |scope: GuardScope<S, E, C, A, R>| predicate(scope).boxed()),
        }
    }

    /// Guard that always allows the transition.
    pub fn always() -> Self {
        Self::from_fn(|_scope: GuardScope<S, E, C, A, R>| futures_util::future::ready(Ok(true)))
    }
}

impl<S, E, C, A, R> Guard<S, E, C, A, R> {
    /// Evaluate the guard against the given scope.
    pub async fn check(&self, scope: GuardScope<S, E, C, A, R>) -> anyhow::Result<bool> {
        (self.predicate)(scope).await
    }
}

impl<S, E, C, A, R> Clone for Guard<S, E, C, A, R> {
    fn clone(&self) -> Self {
        Self {
            predicate: Arc::clone(&self.predicate),
        }
    }
}

impl<S, E, C, A, R> fmt::Debug for Guard<S, E, C, A, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Guard")
            .field("predicate", &Arc::as_ptr(&self.predicate))
            .finish()
    }
}
