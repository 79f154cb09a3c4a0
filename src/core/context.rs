//! Shared, mutable machine context.
//!
//! A context is owned by the caller and shared by reference across the whole
//! lifetime of a machine: every guard and callback sees the same value, and a
//! machine forked with `add_transition` aliases the context of its parent.
//! The allocation lives until the last machine, fork or handle holding it is
//! dropped.

use std::fmt;
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};

/// Cloneable handle to a machine's context.
///
/// Cloning the handle never copies the value; all clones observe the same
/// mutations.
///
/// # Example
///
/// ```rust
/// use smoothstate::core::Context;
///
/// # let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
/// # rt.block_on(async {
/// let context = Context::new(vec![1, 2]);
/// let alias = context.clone();
///
/// alias.lock().await.push(3);
///
/// assert_eq!(*context.lock().await, vec![1, 2, 3]);
/// assert!(context.ptr_eq(&alias));
/// # });
/// ```
pub struct Context<C> {
    inner: Arc<Mutex<C>>,
}

impl<C> Context<C> {
    /// Wrap a value into a new shared context.
    pub fn new(value: C) -> Self {
        Self {
            inner: Arc::new(Mutex::new(value)),
        }
    }

    /// Acquire exclusive access to the context.
    pub async fn lock(&self) -> MutexGuard<'_, C> {
        self.inner.lock().await
    }

    /// Acquire exclusive access if nobody else holds it.
    pub fn try_lock(&self) -> Option<MutexGuard<'_, C>> {
        self.inner.try_lock().ok()
    }

    /// Run a read-only closure against the context.
    pub async fn read<T>(&self, f: impl FnOnce(&C) -> T) -> T {
        let guard = self.inner.lock().await;
        f(&guard)
    }

    /// Run a mutating closure against the context.
    pub async fn update<T>(&self, f: impl FnOnce(&mut C) -> T) -> T {
        let mut guard = self.inner.lock().await;
        f(&mut guard)
    }

    /// `true` when both handles point at the same context.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Number of live handles (machines, forks and callers) sharing the value.
    pub fn holders(&self) -> usize {
        Arc::strong_count(&self.inner)
    }
}

impl<C> Clone for Context<C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<C: Default> Default for Context<C> {
    fn default() -> Self {
        Self::new(C::default())
    }
}

impl<C> fmt::Debug for Context<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("holders", &self.holders())
            .finish_non_exhaustive()
    }
}

impl<C> From<C> for Context<C> {
    fn from(value: C) -> Self {
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn clones_share_the_same_value() {
        let context = Context::new(0u32);
        let alias = context.clone();

        alias.update(|n| *n += 5).await;

        assert_eq!(context.read(|n| *n).await, 5);
        assert!(context.ptr_eq(&alias));
        assert_eq!(context.holders(), 2);
    }

    #[tokio::test]
    async fn separate_contexts_are_distinct() {
        let first = Context::new(String::from("a"));
        let second = Context::new(String::from("a"));

        assert!(!first.ptr_eq(&second));
    }

    #[tokio::test]
    async fn try_lock_fails_while_held() {
        let context = Context::new(1u8);
        let guard = context.lock().await;

        assert!(context.try_lock().is_none());
        drop(guard);
        assert!(context.try_lock().is_some());
    }

    #[test]
    fn default_uses_value_default() {
        let context: Context<Vec<u8>> = Context::default();
        assert_eq!(context.try_lock().map(|v| v.len()), Some(0));
    }
}
