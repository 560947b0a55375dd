use std::future::Future;

use futures::future::{BoxFuture, FutureExt};

use super::signal::Flow;

pub(crate) type BeforeHook<T, E> =
    Box<dyn Fn(T) -> BoxFuture<'static, Result<Flow, E>> + Send + Sync>;
pub(crate) type AfterHook<T, R, E> =
    Box<dyn Fn(T, R) -> BoxFuture<'static, Result<Flow, E>> + Send + Sync>;

/// Optional callbacks observed around each item.
///
/// Both default to no-ops that never raise the stop flag. A hook returning
/// `Flow::Stop` stops the whole pool, not just the current item; a hook
/// returning an error is a processing fault and fails the run.
pub struct Hooks<T, R, E> {
    pub(crate) before: Option<BeforeHook<T, E>>,
    pub(crate) after: Option<AfterHook<T, R, E>>,
}

impl<T, R, E> Default for Hooks<T, R, E> {
    fn default() -> Self {
        Self {
            before: None,
            after: None,
        }
    }
}

impl<T, R, E> Hooks<T, R, E> {
    /// Create a new `Self` with no-op hooks
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Observe or veto an item before it reaches the processor.
    /// A veto (`Flow::Stop`) means the processor never sees the item.
    #[must_use]
    pub fn before_each<F, Fut>(mut self, hook: F) -> Self
    where
        F: Fn(T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Flow, E>> + Send + 'static,
    {
        self.before = Some(Box::new(move |item| hook(item).boxed()));
        self
    }

    /// Observe an item together with its processor result, or ask the pool
    /// to stop draining. Only invoked for items the processor completed.
    #[must_use]
    pub fn after_each<F, Fut>(mut self, hook: F) -> Self
    where
        F: Fn(T, R) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Flow, E>> + Send + 'static,
    {
        self.after = Some(Box::new(move |item, result| hook(item, result).boxed()));
        self
    }

    /// Compatibility adapter for an externally-polled kill probe: asked once
    /// per finished item, a `true` answer raises the stop flag. This is a
    /// plain after-item hook that ignores its arguments, not a separate
    /// mechanism in the pool.
    #[must_use]
    pub fn kill_switch<F, Fut>(self, probe: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = bool> + Send + 'static,
    {
        self.after_each(move |_item, _result| {
            let asked = probe();
            async move {
                if asked.await {
                    Ok(Flow::Stop)
                } else {
                    Ok(Flow::Proceed)
                }
            }
        })
    }
}
