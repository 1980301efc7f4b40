//! Rule catalogue and evaluation loop.
//!
//! A [`Rule`] pairs a name, a description, and a fixed expected value with a
//! [`Metric`]: a pure function from a [`Snapshot`] to a [`Measurement`].
//! [`RuleEngine::register`] builds the catalogue; [`RuleEngine::evaluate`]
//! runs every rule against one borrowed snapshot, in registration order, and
//! never stops early. A rule whose metric fails (or panics) is recorded as
//! [`Status::Errored`] and the loop moves on.
pub mod report;

use std::collections::BTreeSet;
use std::panic::{self, AssertUnwindSafe};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::error::AuditError;
use crate::snapshot::Snapshot;
use crate::source::Selector;

pub use report::{Measurement, Offender, RuleResult, Status, Summary, ValidationReport};


/// A pure computation of one integer metric over a snapshot.
///
/// Implementations must not mutate shared state: the engine may call
/// metrics from several threads at once (see
/// [`RuleEngine::evaluate_parallel`]).
///
/// Closures of the right shape implement this trait, so ad-hoc rules need no
/// named type.
pub trait Metric: Send + Sync {
    /// Compute the metric.
    ///
    /// # Errors
    ///
    /// Any [`AuditError`]; the engine records it against the rule.
    fn measure(&self, snapshot: &Snapshot) -> Result<Measurement, AuditError>;

    /// Datasets this metric reads, used to build load selectors.
    fn datasets(&self) -> Vec<String> {
        Vec::new()
    }
}

impl<F> Metric for F
where
    F: Fn(&Snapshot) -> Result<Measurement, AuditError> + Send + Sync,
{
    fn measure(&self, snapshot: &Snapshot) -> Result<Measurement, AuditError> {
        self(snapshot)
    }
}

/// A named metric with a fixed expectation.
pub struct Rule {
    name: String,
    description: String,
    expected: u64,
    metric: Box<dyn Metric>,
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("expected", &self.expected)
            .finish_non_exhaustive()
    }
}

impl Rule {
    /// Creates a rule. The description defaults to the name.
    pub fn new(name: impl Into<String>, expected: u64, metric: impl Metric + 'static) -> Self {
        let name = name.into();
        Self {
            description: name.clone(),
            name,
            expected,
            metric: Box::new(metric),
        }
    }

    /// Replaces the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Rule name, unique within an engine.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Human-readable description.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Expected metric value.
    pub fn expected(&self) -> u64 {
        self.expected
    }

    /// Datasets the rule's metric reads.
    pub fn datasets(&self) -> Vec<String> {
        self.metric.datasets()
    }

    fn run(&self, snapshot: &Snapshot) -> RuleResult {
        debug!(rule = %self.name, "evaluating rule");
        let start = Instant::now();
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.metric.measure(snapshot)))
            .unwrap_or_else(|payload| {
                Err(AuditError::RuleExecution {
                    rule: self.name.clone(),
                    detail: format!("metric panicked: {}", panic_message(payload.as_ref())),
                })
            });
        let elapsed = start.elapsed();
        self.result(outcome, elapsed)
    }

    fn result(&self, outcome: Result<Measurement, AuditError>, elapsed: Duration) -> RuleResult {
        match outcome {
            Ok(m) => {
                let status = if m.actual == self.expected {
                    Status::Passed
                } else {
                    Status::Failed
                };
                debug!(
                    rule = %self.name,
                    expected = self.expected,
                    actual = m.actual,
                    %status,
                    elapsed_us = u64::try_from(elapsed.as_micros()).unwrap_or(u64::MAX),
                    "rule evaluated"
                );
                RuleResult {
                    rule: self.name.clone(),
                    description: self.description.clone(),
                    expected: self.expected,
                    actual: Some(m.actual),
                    status,
                    offenders: m.offenders,
                    error: None,
                    elapsed,
                }
            }
            Err(error) => {
                warn!(rule = %self.name, code = error.code(), %error, "rule errored");
                RuleResult {
                    rule: self.name.clone(),
                    description: self.description.clone(),
                    expected: self.expected,
                    actual: None,
                    status: Status::Errored,
                    offenders: Vec::new(),
                    error: Some(error),
                    elapsed,
                }
            }
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_owned()
    }
}

/// An ordered catalogue of uniquely named rules.
#[derive(Debug, Default)]
pub struct RuleEngine {
    rules: Vec<Rule>,
}

impl RuleEngine {
    /// Creates an empty engine.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a rule to the catalogue.
    ///
    /// # Errors
    ///
    /// - [`AuditError::DuplicateRuleName`] when a rule with the same name is
    ///   already registered.
    /// - [`AuditError::InvalidCatalog`] when the name is empty.
    pub fn register(&mut self, rule: Rule) -> Result<(), AuditError> {
        if rule.name.trim().is_empty() {
            return Err(AuditError::InvalidCatalog {
                detail: "rule name must not be empty".to_owned(),
            });
        }
        if self.rules.iter().any(|r| r.name == rule.name) {
            return Err(AuditError::DuplicateRuleName { name: rule.name });
        }
        debug!(rule = %rule.name, expected = rule.expected, "registered rule");
        self.rules.push(rule);
        Ok(())
    }

    /// Registered rules in registration order.
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// One selector per distinct dataset any rule reads, in name order.
    pub fn selectors(&self) -> Vec<Selector> {
        self.rules
            .iter()
            .flat_map(Rule::datasets)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(Selector::new)
            .collect()
    }

    /// Runs every rule against `snapshot` on the calling thread.
    pub fn evaluate(&self, snapshot: &Snapshot) -> ValidationReport {
        let results = self.rules.iter().map(|r| r.run(snapshot)).collect();
        finish(results)
    }

    /// Runs every rule on its own scoped thread.
    ///
    /// Results are reported in registration order regardless of completion
    /// order; each rule sees only the shared read-only snapshot.
    pub fn evaluate_parallel(&self, snapshot: &Snapshot) -> ValidationReport {
        let results = thread::scope(|scope| {
            let handles: Vec<_> = self
                .rules
                .iter()
                .map(|rule| (rule, scope.spawn(move || rule.run(snapshot))))
                .collect();
            handles
                .into_iter()
                .map(|(rule, handle)| {
                    handle.join().unwrap_or_else(|payload| {
                        rule.result(
                            Err(AuditError::RuleExecution {
                                rule: rule.name.clone(),
                                detail: format!(
                                    "worker thread panicked: {}",
                                    panic_message(payload.as_ref())
                                ),
                            }),
                            Duration::ZERO,
                        )
                    })
                })
                .collect()
        });
        finish(results)
    }
}

fn finish(results: Vec<RuleResult>) -> ValidationReport {
    let report = ValidationReport::from_results(results);
    let summary = report.summary();
    info!(
        passed = summary.passed,
        failed = summary.failed,
        errored = summary.errored,
        "evaluation finished"
    );
    report
}
