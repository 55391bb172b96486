//! Metrics infrastructure for the STX3 driver.
//!
//! Every metric the driver emits is declared here as a [`Metric`] constant so
//! names, units and label keys live in one place. The crate re-exports
//! `metrics`; nothing is recorded unless the application installs a recorder.
//!
//! # Example
//!
//! ```rust
//! use stx3_metrics::{metric_defs, describe_metrics};
//!
//! describe_metrics();
//! metrics::counter!(metric_defs::EXCHANGE_ATTEMPTS.name, "command" => "query_esn").increment(1);
//! ```

pub use metrics;

use metrics::{describe_counter, describe_histogram, Unit};

/// The kind of metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    /// A monotonically increasing counter.
    Counter,
    /// A histogram for recording distributions.
    Histogram,
}

impl MetricKind {
    /// Returns the kind as a lowercase string.
    pub const fn as_str(&self) -> &'static str {
        match self {
            MetricKind::Counter => "counter",
            MetricKind::Histogram => "histogram",
        }
    }
}

impl std::fmt::Display for MetricKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A metric declaration with its metadata.
///
/// ```rust
/// use stx3_metrics::{Metric, MetricKind};
/// use metrics::Unit;
///
/// const RESETS: Metric = Metric::counter("stx3.example.resets")
///     .with_description("Power-cycle recoveries")
///     .with_unit(Unit::Count);
///
/// assert_eq!(RESETS.kind, MetricKind::Counter);
/// ```
#[derive(Debug, Clone)]
pub struct Metric {
    /// The metric name (e.g., "stx3.exchange.attempts").
    pub name: &'static str,
    /// The kind of metric.
    pub kind: MetricKind,
    /// Human-readable description.
    pub description: &'static str,
    /// The unit of measurement, if any.
    pub unit: Option<Unit>,
    /// Expected label keys.
    pub labels: &'static [&'static str],
}

impl Metric {
    /// Creates a new counter metric with the given name.
    pub const fn counter(name: &'static str) -> Self {
        Self {
            name,
            kind: MetricKind::Counter,
            description: "",
            unit: None,
            labels: &[],
        }
    }

    /// Creates a new histogram metric with the given name.
    pub const fn histogram(name: &'static str) -> Self {
        Self {
            name,
            kind: MetricKind::Histogram,
            description: "",
            unit: None,
            labels: &[],
        }
    }

    /// Sets the description.
    pub const fn with_description(mut self, description: &'static str) -> Self {
        self.description = description;
        self
    }

    /// Sets the unit.
    pub const fn with_unit(mut self, unit: Unit) -> Self {
        self.unit = Some(unit);
        self
    }

    /// Sets the expected label keys.
    pub const fn with_labels(mut self, labels: &'static [&'static str]) -> Self {
        self.labels = labels;
        self
    }

    /// Registers this metric's description with the installed recorder.
    pub fn describe(&self) {
        match (self.kind, self.unit) {
            (MetricKind::Counter, Some(unit)) => {
                describe_counter!(self.name, unit, self.description);
            }
            (MetricKind::Counter, None) => {
                describe_counter!(self.name, self.description);
            }
            (MetricKind::Histogram, Some(unit)) => {
                describe_histogram!(self.name, unit, self.description);
            }
            (MetricKind::Histogram, None) => {
                describe_histogram!(self.name, self.description);
            }
        }
    }
}

/// All metric definitions emitted by the driver.
pub mod metric_defs {
    use super::{Metric, Unit};

    /// Label carried by every exchange metric.
    pub const COMMAND_LABELS: &[&str] = &["command"];

    /// Exchanges started, one per request/response round trip requested.
    pub const EXCHANGES: Metric = Metric::counter("stx3.exchange.started")
        .with_description("Exchanges requested by the lifecycle")
        .with_unit(Unit::Count)
        .with_labels(COMMAND_LABELS);

    /// Individual write/read attempts, including retries and the post-reset attempt.
    pub const EXCHANGE_ATTEMPTS: Metric = Metric::counter("stx3.exchange.attempts")
        .with_description("Write/read attempts including retries")
        .with_unit(Unit::Count)
        .with_labels(COMMAND_LABELS);

    /// Attempts that failed, by failure kind.
    pub const EXCHANGE_FAILURES: Metric = Metric::counter("stx3.exchange.failures")
        .with_description("Failed attempts by failure kind")
        .with_unit(Unit::Count)
        .with_labels(&["command", "kind"]);

    /// Exchanges that failed even after reset recovery.
    pub const EXCHANGES_EXHAUSTED: Metric = Metric::counter("stx3.exchange.exhausted")
        .with_description("Exchanges that failed after reset recovery")
        .with_unit(Unit::Count)
        .with_labels(COMMAND_LABELS);

    /// Power-cycle recoveries performed.
    pub const RESET_RECOVERIES: Metric = Metric::counter("stx3.module.reset_recoveries")
        .with_description("Power-cycle recoveries of the module")
        .with_unit(Unit::Count);

    /// Power cycles whose power control failed, by failure kind.
    pub const RESET_FAILURES: Metric = Metric::counter("stx3.module.reset_failures")
        .with_description("Power-cycle recoveries that failed to switch the module")
        .with_unit(Unit::Count)
        .with_labels(&["kind"]);

    /// Wall time of a whole exchange, delays included.
    pub const EXCHANGE_DURATION: Metric = Metric::histogram("stx3.exchange.duration_ms")
        .with_description("Exchange duration including settle and reset delays")
        .with_unit(Unit::Milliseconds)
        .with_labels(COMMAND_LABELS);

    /// All metrics, for registration and listing.
    pub const ALL: &[&Metric] = &[
        &EXCHANGES,
        &EXCHANGE_ATTEMPTS,
        &EXCHANGE_FAILURES,
        &EXCHANGES_EXHAUSTED,
        &RESET_RECOVERIES,
        &RESET_FAILURES,
        &EXCHANGE_DURATION,
    ];
}

/// Register descriptions for every metric in [`metric_defs::ALL`].
pub fn describe_metrics() {
    for metric in metric_defs::ALL {
        metric.describe();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_names_are_unique_and_namespaced() {
        let mut names: Vec<&str> = metric_defs::ALL.iter().map(|m| m.name).collect();
        assert!(names.iter().all(|n| n.starts_with("stx3.")));
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), metric_defs::ALL.len());
    }

    #[test]
    fn test_describe_without_recorder_is_noop() {
        describe_metrics();
    }

    #[test]
    fn test_builder() {
        const M: Metric = Metric::histogram("stx3.test")
            .with_description("d")
            .with_unit(Unit::Milliseconds)
            .with_labels(&["command"]);
        assert_eq!(M.kind, MetricKind::Histogram);
        assert_eq!(M.unit, Some(Unit::Milliseconds));
        assert_eq!(M.labels, &["command"]);
        assert_eq!(M.kind.to_string(), "histogram");
    }
}
