use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What a reconciliation step tried to do to a symbol.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReconcileAction {
    Add,
    Update,
    Delete,
}

impl fmt::Display for ReconcileAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReconcileAction::Add => f.write_str("add"),
            ReconcileAction::Update => f.write_str("update"),
            ReconcileAction::Delete => f.write_str("delete"),
        }
    }
}

/// A single symbol that could not be reconciled.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileFailure {
    pub symbol_id: String,
    pub action: ReconcileAction,
    pub message: String,
}

/// Outcome of one reconciliation pass.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileReport {
    /// Symbols present downstream but not locally.
    pub added: usize,
    /// Symbols whose tracked identifiers changed.
    pub updated: usize,
    /// Local symbols absent downstream.
    pub deleted: usize,
    /// Per-symbol failures. The pass continues past each one.
    pub errors: usize,
    pub failures: Vec<ReconcileFailure>,
    /// Set when a shutdown request stopped the pass early.
    pub interrupted: bool,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl ReconcileReport {
    pub(crate) fn start() -> Self {
        Self {
            added: 0,
            updated: 0,
            deleted: 0,
            errors: 0,
            failures: Vec::new(),
            interrupted: false,
            started_at: Utc::now(),
            finished_at: None,
        }
    }

    pub(crate) fn record_failure(
        &mut self,
        symbol_id: &str,
        action: ReconcileAction,
        message: impl Into<String>,
    ) {
        self.errors += 1;
        self.failures.push(ReconcileFailure {
            symbol_id: symbol_id.to_string(),
            action,
            message: message.into(),
        });
    }

    pub(crate) fn finish(mut self) -> Self {
        self.finished_at = Some(Utc::now());
        self
    }

    /// Whether the pass ran to completion without per-symbol failures.
    pub fn is_success(&self) -> bool {
        self.errors == 0 && !self.interrupted
    }

    /// Total number of mutations applied.
    pub fn changes(&self) -> usize {
        self.added + self.updated + self.deleted
    }

    pub fn summary(&self) -> String {
        let counts = format!(
            "added={}, updated={}, deleted={}, errors={}",
            self.added, self.updated, self.deleted, self.errors
        );
        if self.interrupted {
            format!("Interrupted by shutdown ({})", counts)
        } else if self.is_success() {
            format!("Completed ({})", counts)
        } else {
            format!("Completed with failures ({})", counts)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failures_are_counted() {
        let mut report = ReconcileReport::start();
        report.added = 2;
        report.record_failure("S1", ReconcileAction::Update, "store down");

        assert_eq!(report.errors, 1);
        assert!(!report.is_success());
        assert_eq!(report.changes(), 2);
        assert_eq!(
            report.summary(),
            "Completed with failures (added=2, updated=0, deleted=0, errors=1)"
        );
    }

    #[test]
    fn test_serializes_camel_case() {
        let report = ReconcileReport::start().finish();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["added"], 0);
        assert!(json.get("startedAt").is_some());
        assert!(json.get("finishedAt").is_some());
    }
}
