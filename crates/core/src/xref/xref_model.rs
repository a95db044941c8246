use serde::Serialize;
use xref_source::{CircuitMetrics, CircuitState};

/// Circuit summary for one resilience scope.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CircuitStatus {
    pub scope: String,
    pub state: String,
    pub failure_rate: f64,
    pub recorded_calls: usize,
}

impl CircuitStatus {
    fn closed(scope: &str) -> Self {
        Self {
            scope: scope.to_string(),
            state: CircuitState::Closed.to_string(),
            failure_rate: 0.0,
            recorded_calls: 0,
        }
    }
}

impl From<CircuitMetrics> for CircuitStatus {
    fn from(metrics: CircuitMetrics) -> Self {
        Self {
            scope: metrics.scope,
            state: metrics.state.to_string(),
            failure_rate: metrics.failure_rate,
            recorded_calls: metrics.recorded_calls,
        }
    }
}

/// Health snapshot of the service.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceHealth {
    /// `OK` when every circuit is closed, `DEGRADED` otherwise.
    pub status: String,
    pub circuits: Vec<CircuitStatus>,
}

impl ServiceHealth {
    /// Summarize `metrics`. Every scope in `scopes` is listed, as a closed
    /// circuit with no recorded calls when the breaker has not tracked it yet.
    pub fn from_metrics(metrics: Vec<CircuitMetrics>, scopes: &[&str]) -> Self {
        let mut circuits: Vec<CircuitStatus> =
            metrics.into_iter().map(CircuitStatus::from).collect();
        for scope in scopes {
            if !circuits.iter().any(|c| c.scope == *scope) {
                circuits.push(CircuitStatus::closed(scope));
            }
        }
        circuits.sort_by(|a, b| a.scope.cmp(&b.scope));

        let closed = CircuitState::Closed.to_string();
        let degraded = circuits.iter().any(|c| c.state != closed);
        Self {
            status: if degraded { "DEGRADED" } else { "OK" }.to_string(),
            circuits,
        }
    }

    pub fn is_healthy(&self) -> bool {
        self.status == "OK"
    }
}
