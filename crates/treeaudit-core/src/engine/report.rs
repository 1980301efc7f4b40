//! Report types produced by one evaluation run.
//!
//! A metric yields a [`Measurement`]: the integer it computed plus the
//! [`Offender`]s that explain it. The engine compares each measurement with
//! the rule's expected value and records a [`RuleResult`]; the ordered list
//! of results is a [`ValidationReport`].
use std::fmt;
use std::time::Duration;

use serde::Serialize;
use serde::ser::SerializeStruct;

use crate::error::AuditError;

/// One offending identifier behind a metric value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Offender {
    /// A node whose parent node is absent.
    OrphanNode {
        /// Path of the orphaned node.
        path: String,
        /// Path of the missing parent.
        missing_parent: String,
    },
    /// A group whose members carry more than one owner.
    MixedGroup {
        /// Group prefix.
        group: String,
        /// Distinct owners among its members.
        owners: Vec<String>,
    },
    /// An owner claimed by more than one group.
    SharedOwner {
        /// The shared owner.
        owner: String,
        /// Groups whose members carry it.
        groups: Vec<String>,
    },
    /// A group none of whose members carries an owner.
    UnownedGroup {
        /// Group prefix.
        group: String,
    },
    /// Rows sharing a repeated key tuple.
    DuplicateKey {
        /// The key tuple, one entry per key field.
        key: Vec<String>,
        /// Zero-based indices of every row carrying the key.
        rows: Vec<usize>,
    },
    /// A row with null or absent forbidden fields.
    NullFields {
        /// Zero-based row index.
        row: usize,
        /// The offending fields.
        fields: Vec<String>,
    },
    /// A field value rejected by a format predicate.
    Format {
        /// Zero-based row index.
        row: usize,
        /// The rejected value.
        value: String,
    },
    /// Free-form explanation from a custom metric.
    Note {
        /// The explanation.
        message: String,
    },
}

impl fmt::Display for Offender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OrphanNode {
                path,
                missing_parent,
            } => write!(f, "{path} (missing parent {missing_parent})"),
            Self::MixedGroup { group, owners } => {
                write!(f, "group {group} has owners [{}]", owners.join(", "))
            }
            Self::SharedOwner { owner, groups } => {
                write!(f, "owner {owner} shared by [{}]", groups.join(", "))
            }
            Self::UnownedGroup { group } => write!(f, "group {group} has no owner"),
            Self::DuplicateKey { key, rows } => {
                let rows: Vec<String> = rows.iter().map(ToString::to_string).collect();
                write!(f, "key ({}) on rows [{}]", key.join(", "), rows.join(", "))
            }
            Self::NullFields { row, fields } => {
                write!(f, "row {row}: null [{}]", fields.join(", "))
            }
            Self::Format { row, value } => write!(f, "row {row}: {value:?}"),
            Self::Note { message } => f.write_str(message),
        }
    }
}

/// What a metric computed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Measurement {
    /// The metric value.
    pub actual: u64,
    /// Identifiers explaining the value.
    pub offenders: Vec<Offender>,
}

impl Measurement {
    /// A measurement with no offenders.
    pub fn count(actual: u64) -> Self {
        Self {
            actual,
            offenders: Vec::new(),
        }
    }

    /// A measurement whose value is the number of offenders.
    pub fn from_offenders(offenders: Vec<Offender>) -> Self {
        Self {
            actual: offenders.len() as u64,
            offenders,
        }
    }
}

/// Outcome class of one rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    /// The metric equalled the expected value.
    Passed,
    /// The metric differed from the expected value.
    Failed,
    /// The metric could not be computed: the rule execution error. The
    /// cause keeps its own [`AuditError`](crate::AuditError) code.
    Errored,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Passed => f.write_str("passed"),
            Self::Failed => f.write_str("failed"),
            Self::Errored => f.write_str("errored"),
        }
    }
}

/// The result of evaluating one rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleResult {
    /// Rule name.
    pub rule: String,
    /// Rule description.
    pub description: String,
    /// Declared expected value.
    pub expected: u64,
    /// Computed value; `None` when the rule errored.
    pub actual: Option<u64>,
    /// Outcome class.
    pub status: Status,
    /// Offending identifiers.
    pub offenders: Vec<Offender>,
    /// The fault, when the rule errored.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<AuditError>,
    /// Wall time spent in the metric.
    #[serde(serialize_with = "serialize_millis", rename = "elapsed_ms")]
    pub elapsed: Duration,
}

impl RuleResult {
    /// Returns `true` when the rule passed.
    pub fn passed(&self) -> bool {
        self.status == Status::Passed
    }
}

fn serialize_millis<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u64(u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
}

impl Serialize for AuditError {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut st = serializer.serialize_struct("AuditError", 2)?;
        st.serialize_field("code", self.code())?;
        st.serialize_field("message", &self.to_string())?;
        st.end()
    }
}

/// Ordered results of one evaluation run, in registration order.
///
/// Created fresh for every run. The run succeeds only when every rule passed;
/// a failed or errored rule fails the run while every other rule's result is
/// still reported.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ValidationReport {
    /// Every rule's result.
    pub results: Vec<RuleResult>,
}

impl ValidationReport {
    /// Wraps pre-built results.
    pub fn from_results(results: Vec<RuleResult>) -> Self {
        Self { results }
    }

    /// Returns `true` iff every rule passed.
    pub fn is_success(&self) -> bool {
        self.results.iter().all(RuleResult::passed)
    }

    /// Results with the given status.
    pub fn with_status(&self, status: Status) -> impl Iterator<Item = &RuleResult> {
        self.results.iter().filter(move |r| r.status == status)
    }

    /// Looks up a result by rule name.
    pub fn by_rule(&self, name: &str) -> Option<&RuleResult> {
        self.results.iter().find(|r| r.rule == name)
    }

    /// Counts of passed, failed, and errored rules.
    pub fn summary(&self) -> Summary {
        let mut summary = Summary::default();
        for r in &self.results {
            match r.status {
                Status::Passed => summary.passed += 1,
                Status::Failed => summary.failed += 1,
                Status::Errored => summary.errored += 1,
            }
        }
        summary
    }

    /// Number of results.
    pub fn len(&self) -> usize {
        self.results.len()
    }

    /// Returns `true` when no rule was evaluated.
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

/// Per-status rule counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Summary {
    /// Rules that passed.
    pub passed: usize,
    /// Rules whose metric differed from the expectation.
    pub failed: usize,
    /// Rules that could not compute their metric.
    pub errored: usize,
}
