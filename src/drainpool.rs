use std::{
    future::Future,
    num::NonZeroUsize,
    pin::Pin,
    sync::atomic::{AtomicBool, Ordering},
};

use futures::{
    future,
    stream::{Fuse, Stream, StreamExt},
};
use tokio::sync::Mutex;

use super::{
    errors::PoolError,
    hooks::Hooks,
    signal::{Flow, Step},
};

/// What sibling workers do once one worker hits a processing fault.
///
/// The faulting worker always exits and the run always reports the fault;
/// the policy only decides whether the remaining workers keep going.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FaultPolicy {
    /// Remaining workers drain the source to its natural end
    #[default]
    DrainRemaining,
    /// The stop flag is raised so remaining workers wind down after their
    /// in-flight item
    HaltSiblings,
}

/// Bounded pool of workers draining one shared lazy source
pub struct DrainPool {
    /// Number of worker loops pulling from the shared source
    concurrency: NonZeroUsize,
    /// Sibling behavior when one worker faults
    fault_policy: FaultPolicy,
}

impl DrainPool {
    /// Create a new `Self`
    #[must_use]
    pub fn new(concurrency: NonZeroUsize) -> Self {
        Self {
            concurrency,
            fault_policy: FaultPolicy::default(),
        }
    }

    /// Get the concurrency of the pool
    #[must_use]
    pub const fn concurrency(&self) -> usize {
        self.concurrency.get()
    }

    /// Get the sibling fault policy of the pool
    #[must_use]
    pub const fn fault_policy(&self) -> FaultPolicy {
        self.fault_policy
    }

    /// Choose what sibling workers do after one worker faults
    #[must_use]
    pub fn with_fault_policy(mut self, policy: FaultPolicy) -> Self {
        self.fault_policy = policy;
        self
    }

    /// Drain the source with no lifecycle hooks.
    ///
    /// Resolves once every worker has terminated, whether the source ran dry
    /// or a processor asked to stop. A stopped drain is a successful run.
    ///
    /// # Errors
    ///
    /// Returns an error if the processor fails on an item.
    pub async fn run<S, T, P, Fut, R, E>(
        &self,
        source: S,
        processor: P,
    ) -> Result<(), PoolError<E>>
    where
        S: Stream<Item = T>,
        T: Clone,
        P: Fn(T) -> Fut,
        Fut: Future<Output = Result<Step<R>, E>>,
    {
        self.run_with_hooks(source, processor, Hooks::default()).await
    }

    /// Drain the source, observing each item with the given hooks.
    ///
    /// Items reach the stages in a fixed order: before-hook, processor,
    /// after-hook, with later stages skipped as soon as an earlier one
    /// signals stop. Stopping is cooperative: workers already past their
    /// flag check finish their in-flight item first, so at most
    /// `concurrency` extra items complete after the first stop signal.
    ///
    /// # Errors
    ///
    /// Returns an error if the processor or a hook fails on an item.
    pub async fn run_with_hooks<S, T, P, Fut, R, E>(
        &self,
        source: S,
        processor: P,
        hooks: Hooks<T, R, E>,
    ) -> Result<(), PoolError<E>>
    where
        S: Stream<Item = T>,
        T: Clone,
        P: Fn(T) -> Fut,
        Fut: Future<Output = Result<Step<R>, E>>,
    {
        // Fusing makes exhaustion permanent: once the source yields its last
        // item it is never polled again, even if it would resume.
        let source = Mutex::new(Box::pin(source.fuse()));
        let stop = AtomicBool::new(false);

        let workers = (0..self.concurrency.get())
            .map(|worker| self.worker_loop(worker, &source, &processor, &hooks, &stop));

        let mut first_fault = None;
        for outcome in future::join_all(workers).await {
            if let Err(fault) = outcome {
                first_fault.get_or_insert(fault);
            }
        }

        match first_fault {
            None => Ok(()),
            Some(fault) => Err(PoolError::Fault(fault)),
        }
    }

    /// One worker: pull from the shared source until it runs dry or the
    /// stop flag is raised, handing each item through the hook pipeline.
    async fn worker_loop<S, T, P, Fut, R, E>(
        &self,
        worker: usize,
        source: &Mutex<Pin<Box<Fuse<S>>>>,
        processor: &P,
        hooks: &Hooks<T, R, E>,
        stop: &AtomicBool,
    ) -> Result<(), E>
    where
        S: Stream<Item = T>,
        T: Clone,
        P: Fn(T) -> Fut,
        Fut: Future<Output = Result<Step<R>, E>>,
    {
        loop {
            if stop.load(Ordering::Acquire) {
                tracing::debug!(worker, "stop flag raised, winding down");
                return Ok(());
            }

            // Fetches are serialized: the lock is held for the fetch only
            // and released before the item enters the pipeline.
            let fetched = { source.lock().await.next().await };
            let Some(item) = fetched else {
                tracing::debug!(worker, "source exhausted");
                return Ok(());
            };

            if let Some(before) = &hooks.before {
                match self.watch_fault(before(item.clone()).await, stop)? {
                    Flow::Proceed => {}
                    Flow::Stop => {
                        raise_stop(stop, worker);
                        continue;
                    }
                }
            }

            if let Some(after) = &hooks.after {
                let kept = item.clone();
                match self.watch_fault(processor(item).await, stop)? {
                    Step::Proceed(result) => {
                        if let Flow::Stop = self.watch_fault(after(kept, result).await, stop)? {
                            raise_stop(stop, worker);
                        }
                    }
                    Step::Stop => raise_stop(stop, worker),
                }
            } else {
                match self.watch_fault(processor(item).await, stop)? {
                    Step::Proceed(_) => {}
                    Step::Stop => raise_stop(stop, worker),
                }
            }
        }
    }

    /// Note a fault before it propagates, honoring the configured policy
    fn watch_fault<V, E>(&self, outcome: Result<V, E>, stop: &AtomicBool) -> Result<V, E> {
        if outcome.is_err() {
            match self.fault_policy {
                FaultPolicy::HaltSiblings => stop.store(true, Ordering::Release),
                FaultPolicy::DrainRemaining => {
                    tracing::warn!("worker faulted, siblings keep draining");
                }
            }
        }
        outcome
    }
}

/// Raise the shared stop flag. Once raised it is never reset.
fn raise_stop(stop: &AtomicBool, worker: usize) {
    if !stop.swap(true, Ordering::AcqRel) {
        tracing::debug!(worker, "stop requested");
    }
}
