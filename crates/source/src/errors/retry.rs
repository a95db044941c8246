/// Classification of a source failure for the resilience policy.
///
/// Used by [`GuardedSource`](crate::registry::GuardedSource) to decide whether
/// a failed call counts against the circuit breaker.
///
/// # Behavior Summary
///
/// | Class | Record Circuit Breaker Failure? |
/// |-------|--------------------------------|
/// | `Never` | No |
/// | `WithPenalty` | Yes (affects future calls) |
/// | `CircuitOpen` | No (call never left the process) |
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RetryClass {
    /// The call failed for a reason that says nothing about downstream health,
    /// such as a local configuration problem.
    Never,

    /// The downstream misbehaved (transport error, 5xx, 429, timeout, garbage
    /// payload). The failure is recorded in the circuit breaker, which may
    /// short-circuit future calls once the failure rate crosses the threshold.
    WithPenalty,

    /// The circuit breaker refused the call. Nothing is recorded.
    CircuitOpen,
}
