//! Drain pool
//!
//! Bounded-concurrency drain of a shared lazy source
//! Basically N pollers racing over one stream, with a shared stop flag.
//!

/// Errors for the drain pool
mod errors;
pub use errors::PoolError;

/// Lifecycle hooks observed around each item
mod hooks;
pub use hooks::Hooks;

/// Continue/stop signals returned by processors and hooks
mod signal;
pub use signal::{Flow, Step};

/// Drain pool, N workers over one source, with a stop mecanism
mod drainpool;
pub use drainpool::{DrainPool, FaultPolicy};
