//! Error taxonomy shared by every `treeaudit-core` component.
//!
//! Errors fall into three propagation classes:
//!
//! - **Per-rule faults** ([`AuditError::InvalidPath`], [`AuditError::EmptySnapshot`],
//!   [`AuditError::MissingDataset`], [`AuditError::InvalidRow`],
//!   [`AuditError::RuleExecution`]) are caught at the engine boundary and
//!   recorded against the rule that raised them.
//! - **Registration faults** ([`AuditError::DuplicateRuleName`],
//!   [`AuditError::InvalidCatalog`]) surface immediately, before any
//!   evaluation.
//! - **Adapter faults** ([`AuditError::AdapterUnavailable`]) abort a snapshot
//!   load; no partial snapshot is ever evaluated.
use thiserror::Error;

/// All error conditions produced by the audit engine and its collaborators.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuditError {
    /// A materialized-path string violates the segment grammar, or a prefix
    /// was requested deeper than the path itself.
    #[error("invalid path {path:?}: {reason}")]
    InvalidPath {
        /// The rejected path string.
        path: String,
        /// What was wrong with it.
        reason: String,
    },

    /// A rule that attests over a non-trivial dataset received zero rows.
    #[error("dataset {dataset:?} is empty")]
    EmptySnapshot {
        /// Name of the empty dataset.
        dataset: String,
    },

    /// A rule with the same name is already registered.
    #[error("rule {name:?} is already registered")]
    DuplicateRuleName {
        /// The conflicting rule name.
        name: String,
    },

    /// A rule faulted while computing its metric.
    #[error("rule {rule:?} failed: {detail}")]
    RuleExecution {
        /// Name of the faulting rule.
        rule: String,
        /// Description of the fault.
        detail: String,
    },

    /// The data-source adapter could not serve a request.
    #[error("data source unavailable: {detail}")]
    AdapterUnavailable {
        /// Description reported by the adapter.
        detail: String,
    },

    /// A rule referenced a dataset that the snapshot does not contain.
    #[error("dataset {name:?} is not present in the snapshot")]
    MissingDataset {
        /// The requested dataset name.
        name: String,
    },

    /// A row is missing a required field or carries a value of the wrong shape.
    #[error("dataset {dataset:?} row {row}: {detail}")]
    InvalidRow {
        /// Dataset containing the row.
        dataset: String,
        /// Zero-based row index within the dataset.
        row: usize,
        /// What was wrong with the row.
        detail: String,
    },

    /// A catalogue definition could not be turned into a rule.
    #[error("invalid catalogue: {detail}")]
    InvalidCatalog {
        /// Description of the problem.
        detail: String,
    },
}

impl AuditError {
    /// Short machine-readable code for the error class, used in serialised
    /// reports.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidPath { .. } => "invalid_path",
            Self::EmptySnapshot { .. } => "empty_snapshot",
            Self::DuplicateRuleName { .. } => "duplicate_rule_name",
            Self::RuleExecution { .. } => "rule_execution",
            Self::AdapterUnavailable { .. } => "adapter_unavailable",
            Self::MissingDataset { .. } => "missing_dataset",
            Self::InvalidRow { .. } => "invalid_row",
            Self::InvalidCatalog { .. } => "invalid_catalog",
        }
    }

    pub(crate) fn invalid_path(path: &str, reason: impl Into<String>) -> Self {
        Self::InvalidPath {
            path: path.to_owned(),
            reason: reason.into(),
        }
    }
}
