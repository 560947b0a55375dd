/// Outcome of one processor invocation.
///
/// `Stop` is a deliberate signal, distinct from any legitimate result value:
/// a processor yielding `Proceed(0)` or `Proceed(String::new())` keeps the
/// pool draining.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step<R> {
    /// Keep draining; the value is handed to the after-item hook
    Proceed(R),
    /// Raise the stop flag once this item is finished
    Stop,
}

/// Outcome of a lifecycle hook
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Let the item continue through the remaining stages
    Proceed,
    /// Raise the stop flag
    Stop,
}
