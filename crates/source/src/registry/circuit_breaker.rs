//! Per-scope circuit breaker driven by a sliding failure-rate window.
//!
//! The circuit has three states:
//!
//! - **Closed**: Normal operation, calls are allowed and their outcomes recorded.
//! - **Open**: The failure rate crossed the threshold, calls are refused.
//! - **HalfOpen**: The cool-down elapsed, trial calls decide whether to close.
//!
//! Scopes are independent: the lookup path and the downstream fetch each get
//! their own circuit. State is in-memory and resets on process restart.

use std::borrow::Cow;
use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use log::{debug, info, warn};

/// Name of a guarded scope (e.g. "DOWNSTREAM", "LOOKUP").
pub type ScopeId = Cow<'static, str>;

/// Default failure rate (percent) that opens the circuit.
const DEFAULT_FAILURE_RATE_THRESHOLD: u8 = 50;

/// Default number of most recent calls considered.
const DEFAULT_WINDOW_SIZE: usize = 10;

/// Default number of calls required before the rate is evaluated.
const DEFAULT_MINIMUM_CALLS: usize = 4;

/// Default time to wait before transitioning from Open to HalfOpen.
const DEFAULT_COOL_DOWN: Duration = Duration::from_secs(60);

/// Number of successful trial calls needed to close the circuit from HalfOpen.
const HALF_OPEN_SUCCESS_THRESHOLD: u32 = 2;

/// Circuit breaker state.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CircuitState {
    /// Normal operation - calls are allowed.
    Closed,
    /// Too many failures - calls are refused.
    Open,
    /// Testing recovery - trial calls allowed.
    HalfOpen,
}

impl std::fmt::Display for CircuitState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Closed => write!(f, "Closed"),
            Self::Open => write!(f, "Open"),
            Self::HalfOpen => write!(f, "HalfOpen"),
        }
    }
}

/// Internal circuit state for a single scope.
#[derive(Debug)]
struct Circuit {
    state: CircuitState,
    /// Most recent outcomes, `true` for a failure. Only tracked while Closed.
    outcomes: VecDeque<bool>,
    /// Consecutive successes in HalfOpen state.
    half_open_successes: u32,
    /// When the circuit last opened (for the cool-down).
    opened_at: Option<Instant>,
}

impl Circuit {
    fn new() -> Self {
        Self {
            state: CircuitState::Closed,
            outcomes: VecDeque::new(),
            half_open_successes: 0,
            opened_at: None,
        }
    }

    fn push_outcome(&mut self, failed: bool, window_size: usize) {
        self.outcomes.push_back(failed);
        while self.outcomes.len() > window_size.max(1) {
            self.outcomes.pop_front();
        }
    }

    fn failure_rate(&self) -> f64 {
        if self.outcomes.is_empty() {
            return 0.0;
        }
        let failures = self.outcomes.iter().filter(|failed| **failed).count();
        failures as f64 * 100.0 / self.outcomes.len() as f64
    }

    fn open(&mut self) {
        self.state = CircuitState::Open;
        self.opened_at = Some(Instant::now());
        self.outcomes.clear();
        self.half_open_successes = 0;
    }

    fn close(&mut self) {
        self.state = CircuitState::Closed;
        self.opened_at = None;
        self.outcomes.clear();
        self.half_open_successes = 0;
    }
}

/// Circuit breaker configuration.
#[derive(Clone, Debug)]
pub struct CircuitBreakerConfig {
    /// Failure rate in percent (0-100) at which the circuit opens.
    pub failure_rate_threshold: u8,
    /// Number of most recent calls in the sliding window.
    pub window_size: usize,
    /// Minimum recorded calls before the failure rate is evaluated.
    pub minimum_calls: usize,
    /// Time the circuit stays open before allowing trial calls.
    pub cool_down: Duration,
    /// Number of trial successes needed to close from HalfOpen.
    pub half_open_success_threshold: u32,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_rate_threshold: DEFAULT_FAILURE_RATE_THRESHOLD,
            window_size: DEFAULT_WINDOW_SIZE,
            minimum_calls: DEFAULT_MINIMUM_CALLS,
            cool_down: DEFAULT_COOL_DOWN,
            half_open_success_threshold: HALF_OPEN_SUCCESS_THRESHOLD,
        }
    }
}

/// Per-scope circuit breaker.
///
/// Thread-safe; a single instance can guard several scopes.
pub struct CircuitBreaker {
    circuits: Mutex<HashMap<String, Circuit>>,
    config: CircuitBreakerConfig,
}

impl CircuitBreaker {
    /// Create a new circuit breaker with default settings.
    pub fn new() -> Self {
        Self::with_config(CircuitBreakerConfig::default())
    }

    /// Create a circuit breaker with custom configuration.
    pub fn with_config(config: CircuitBreakerConfig) -> Self {
        Self {
            circuits: Mutex::new(HashMap::new()),
            config,
        }
    }

    /// Lock the circuits mutex, recovering from poison if necessary.
    ///
    /// The worst case after recovery is a slightly wrong circuit state, which
    /// is preferable to panicking on the request path.
    fn lock_circuits(&self) -> MutexGuard<'_, HashMap<String, Circuit>> {
        self.circuits.lock().unwrap_or_else(|poisoned| {
            warn!("Circuit breaker mutex was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    /// Check if calls are allowed for a scope.
    ///
    /// Returns false only while the circuit is Open and the cool-down has not
    /// elapsed. Handles the Open -> HalfOpen transition.
    pub fn is_allowed(&self, scope: &ScopeId) -> bool {
        let mut circuits = self.lock_circuits();

        let circuit = circuits
            .entry(scope.to_string())
            .or_insert_with(Circuit::new);

        match circuit.state {
            CircuitState::Closed | CircuitState::HalfOpen => true,
            CircuitState::Open => {
                let cooled_down = circuit
                    .opened_at
                    .map(|opened| opened.elapsed() >= self.config.cool_down)
                    .unwrap_or(true);
                if cooled_down {
                    info!(
                        "Circuit breaker: transitioning '{}' from Open to HalfOpen",
                        scope
                    );
                    circuit.state = CircuitState::HalfOpen;
                    circuit.half_open_successes = 0;
                }
                cooled_down
            }
        }
    }

    /// Record a successful call for a scope.
    pub fn record_success(&self, scope: &ScopeId) {
        let mut circuits = self.lock_circuits();

        let circuit = circuits
            .entry(scope.to_string())
            .or_insert_with(Circuit::new);

        match circuit.state {
            CircuitState::Closed => {
                circuit.push_outcome(false, self.config.window_size);
                debug!(
                    "Circuit breaker: success for '{}', failure rate {:.0}%",
                    scope,
                    circuit.failure_rate()
                );
            }
            CircuitState::HalfOpen => {
                circuit.half_open_successes += 1;
                debug!(
                    "Circuit breaker: success for '{}' in HalfOpen ({}/{})",
                    scope, circuit.half_open_successes, self.config.half_open_success_threshold
                );

                if circuit.half_open_successes >= self.config.half_open_success_threshold {
                    info!(
                        "Circuit breaker: closing circuit for '{}' after {} successes",
                        scope, circuit.half_open_successes
                    );
                    circuit.close();
                }
            }
            CircuitState::Open => {
                debug!(
                    "Circuit breaker: late success for '{}' in Open state ignored",
                    scope
                );
            }
        }
    }

    /// Record a failed call for a scope.
    ///
    /// In Closed state the circuit opens once the window holds at least
    /// `minimum_calls` outcomes and the failure rate reaches the threshold.
    /// In HalfOpen state any failure reopens the circuit.
    pub fn record_failure(&self, scope: &ScopeId) {
        let mut circuits = self.lock_circuits();

        let circuit = circuits
            .entry(scope.to_string())
            .or_insert_with(Circuit::new);

        match circuit.state {
            CircuitState::Closed => {
                circuit.push_outcome(true, self.config.window_size);
                let rate = circuit.failure_rate();
                let calls = circuit.outcomes.len();

                if calls >= self.config.minimum_calls
                    && rate >= f64::from(self.config.failure_rate_threshold)
                {
                    warn!(
                        "Circuit breaker: opening circuit for '{}' at {:.0}% failures over {} calls",
                        scope, rate, calls
                    );
                    circuit.open();
                } else {
                    debug!(
                        "Circuit breaker: failure for '{}' ({:.0}% over {} calls)",
                        scope, rate, calls
                    );
                }
            }
            CircuitState::HalfOpen => {
                info!(
                    "Circuit breaker: reopening circuit for '{}' after failure in HalfOpen",
                    scope
                );
                circuit.open();
            }
            CircuitState::Open => {
                debug!(
                    "Circuit breaker: additional failure for '{}' (already open)",
                    scope
                );
            }
        }
    }

    /// Get the current state for a scope.
    pub fn state(&self, scope: &ScopeId) -> CircuitState {
        let circuits = self.lock_circuits();

        circuits
            .get(scope.as_ref())
            .map(|c| c.state)
            .unwrap_or(CircuitState::Closed)
    }

    /// Failure rate (percent) over the current window for a scope.
    pub fn failure_rate(&self, scope: &ScopeId) -> f64 {
        let circuits = self.lock_circuits();

        circuits
            .get(scope.as_ref())
            .map(|c| c.failure_rate())
            .unwrap_or(0.0)
    }

    /// Reset the circuit for a scope to Closed state.
    pub fn reset(&self, scope: &ScopeId) {
        let mut circuits = self.lock_circuits();

        if let Some(circuit) = circuits.get_mut(scope.as_ref()) {
            info!("Circuit breaker: manually resetting circuit for '{}'", scope);
            circuit.close();
        }
    }

    /// Get metrics for all tracked scopes.
    pub fn metrics(&self) -> Vec<CircuitMetrics> {
        let circuits = self.lock_circuits();

        circuits
            .iter()
            .map(|(scope, circuit)| CircuitMetrics {
                scope: scope.clone(),
                state: circuit.state,
                failure_rate: circuit.failure_rate(),
                recorded_calls: circuit.outcomes.len(),
                opened_at: circuit.opened_at,
            })
            .collect()
    }
}

impl Default for CircuitBreaker {
    fn default() -> Self {
        Self::new()
    }
}

/// Metrics for a single circuit.
#[derive(Clone, Debug)]
pub struct CircuitMetrics {
    /// Scope identifier.
    pub scope: String,
    /// Current circuit state.
    pub state: CircuitState,
    /// Failure rate over the window, in percent.
    pub failure_rate: f64,
    /// Number of outcomes currently in the window.
    pub recorded_calls: usize,
    /// When the circuit last opened.
    pub opened_at: Option<Instant>,
}
