/// Drain errors
#[derive(thiserror::Error, Debug)]
pub enum PoolError<E> {
    /// A processor or lifecycle hook failed while handling an item.
    /// Exhaustion and stop requests are normal terminations, not faults;
    /// when several workers fault concurrently, which fault is carried
    /// here is unspecified.
    #[error("failed to drain source: processing fault")]
    Fault(#[source] E),
}
