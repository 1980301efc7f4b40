//! Row-level rules over a single flat dataset.
//!
//! These checks need no tree structure. Each comes as a plain function over a
//! [`Dataset`] plus a [`Metric`] wrapper that binds it to a named dataset of
//! the snapshot. An empty dataset measures 0 for every check.
use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::engine::{Measurement, Metric, Offender};
use crate::error::AuditError;
use crate::snapshot::{Dataset, Row, Snapshot};
use crate::value::{Value, ValueKey};

static NULL: Value = Value::Null;

/// A numeric literal as a lenient SQL cast to float would accept it.
static NUMERIC_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?$").unwrap_or_else(|_| {
        Regex::new("a^").unwrap_or_else(|_| unreachable!("regex engine broken"))
    })
});

fn field<'r>(row: &'r Row, name: &str) -> &'r Value {
    row.get(name).unwrap_or(&NULL)
}

// ---------------------------------------------------------------------------
// Duplicate rows
// ---------------------------------------------------------------------------

/// Counts surplus rows among groups that share a key tuple.
///
/// For every key tuple seen on more than one row, adds `rows − 1`. Absent and
/// null key parts compare equal to each other. The count does not depend on
/// row order.
pub fn duplicate_rows(dataset: &Dataset, keys: &[String]) -> Measurement {
    let mut groups: BTreeMap<Vec<ValueKey<'_>>, (Vec<&Value>, Vec<usize>)> = BTreeMap::new();
    for (index, row) in dataset.rows().iter().enumerate() {
        let values: Vec<&Value> = keys.iter().map(|k| field(row, k)).collect();
        let key = values.iter().map(|v| v.key()).collect();
        groups
            .entry(key)
            .or_insert_with(|| (values, Vec::new()))
            .1
            .push(index);
    }

    let mut repeated: Vec<(Vec<&Value>, Vec<usize>)> = groups
        .into_values()
        .filter(|(_, rows)| rows.len() > 1)
        .collect();
    repeated.sort_by_key(|(_, rows)| rows[0]);

    let actual = repeated.iter().map(|(_, rows)| rows.len() as u64 - 1).sum();
    let offenders = repeated
        .into_iter()
        .map(|(values, rows)| Offender::DuplicateKey {
            key: values.iter().map(ToString::to_string).collect(),
            rows,
        })
        .collect();
    Measurement { actual, offenders }
}

/// [`duplicate_rows`] bound to a dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateRows {
    dataset: String,
    keys: Vec<String>,
}

impl DuplicateRows {
    /// Creates the rule over `dataset` grouped by `keys`.
    ///
    /// # Errors
    ///
    /// Returns [`AuditError::InvalidCatalog`] when `keys` is empty.
    pub fn new(dataset: impl Into<String>, keys: Vec<String>) -> Result<Self, AuditError> {
        if keys.is_empty() {
            return Err(AuditError::InvalidCatalog {
                detail: "duplicate_rows needs at least one key field".to_owned(),
            });
        }
        Ok(Self {
            dataset: dataset.into(),
            keys,
        })
    }
}

impl Metric for DuplicateRows {
    fn measure(&self, snapshot: &Snapshot) -> Result<Measurement, AuditError> {
        Ok(duplicate_rows(snapshot.dataset(&self.dataset)?, &self.keys))
    }

    fn datasets(&self) -> Vec<String> {
        vec![self.dataset.clone()]
    }
}

// ---------------------------------------------------------------------------
// Forbidden nulls
// ---------------------------------------------------------------------------

/// Counts rows where any of `fields` is absent or null.
pub fn forbidden_nulls(dataset: &Dataset, fields: &[String]) -> Measurement {
    let offenders = dataset
        .rows()
        .iter()
        .enumerate()
        .filter_map(|(index, row)| {
            let nulls: Vec<String> = fields
                .iter()
                .filter(|f| field(row, f).is_null())
                .cloned()
                .collect();
            (!nulls.is_empty()).then_some(Offender::NullFields {
                row: index,
                fields: nulls,
            })
        })
        .collect();
    Measurement::from_offenders(offenders)
}

/// [`forbidden_nulls`] bound to a dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForbiddenNulls {
    dataset: String,
    fields: Vec<String>,
}

impl ForbiddenNulls {
    /// Creates the rule over `dataset` for `fields`.
    ///
    /// # Errors
    ///
    /// Returns [`AuditError::InvalidCatalog`] when `fields` is empty.
    pub fn new(dataset: impl Into<String>, fields: Vec<String>) -> Result<Self, AuditError> {
        if fields.is_empty() {
            return Err(AuditError::InvalidCatalog {
                detail: "forbidden_nulls needs at least one field".to_owned(),
            });
        }
        Ok(Self {
            dataset: dataset.into(),
            fields,
        })
    }
}

impl Metric for ForbiddenNulls {
    fn measure(&self, snapshot: &Snapshot) -> Result<Measurement, AuditError> {
        Ok(forbidden_nulls(snapshot.dataset(&self.dataset)?, &self.fields))
    }

    fn datasets(&self) -> Vec<String> {
        vec![self.dataset.clone()]
    }
}

// ---------------------------------------------------------------------------
// Format violations
// ---------------------------------------------------------------------------

/// A predicate every non-null value of a field must satisfy.
#[derive(Debug, Clone)]
pub enum FormatPredicate {
    /// String values must equal their trimmed form with ASCII letters
    /// upper-cased; other characters are compared as they are.
    /// Non-string values are not checked.
    Uppercase,
    /// Values must not be numbers. Numerically typed values always fail;
    /// strings fail when their trimmed text is a numeric literal.
    NotNumeric,
    /// Values must fully match the expression. Non-string values are matched
    /// through their display form.
    Pattern(Regex),
}

impl FormatPredicate {
    /// Compiles a [`FormatPredicate::Pattern`] anchored at both ends.
    ///
    /// # Errors
    ///
    /// Returns [`AuditError::InvalidCatalog`] when the expression does not
    /// compile.
    pub fn pattern(expr: &str) -> Result<Self, AuditError> {
        Regex::new(&format!("^(?:{expr})$"))
            .map(Self::Pattern)
            .map_err(|e| AuditError::InvalidCatalog {
                detail: format!("invalid pattern {expr:?}: {e}"),
            })
    }

    /// Returns `true` when `value` violates the predicate. Nulls never do.
    pub fn rejects(&self, value: &Value) -> bool {
        match (self, value) {
            (_, Value::Null) => false,
            (Self::Uppercase, Value::String(s)) => *s != s.trim().to_ascii_uppercase(),
            (Self::Uppercase, Value::Bool(_) | Value::Integer(_) | Value::Float(_)) => false,
            (Self::NotNumeric, Value::String(s)) => NUMERIC_RE.is_match(s.trim()),
            (Self::NotNumeric, Value::Bool(_)) => false,
            (Self::NotNumeric, Value::Integer(_) | Value::Float(_)) => true,
            (Self::Pattern(re), Value::String(s)) => !re.is_match(s),
            (Self::Pattern(re), other @ (Value::Bool(_) | Value::Integer(_) | Value::Float(_))) => {
                !re.is_match(&other.to_string())
            }
        }
    }
}

impl fmt::Display for FormatPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uppercase => f.write_str("uppercase"),
            Self::NotNumeric => f.write_str("not_numeric"),
            Self::Pattern(re) => write!(f, "pattern {}", re.as_str()),
        }
    }
}

/// Counts non-null values of `field` that `predicate` rejects.
pub fn format_violations(
    dataset: &Dataset,
    field_name: &str,
    predicate: &FormatPredicate,
) -> Measurement {
    let offenders = dataset
        .rows()
        .iter()
        .enumerate()
        .filter_map(|(index, row)| {
            let value = field(row, field_name);
            predicate.rejects(value).then(|| Offender::Format {
                row: index,
                value: value.to_string(),
            })
        })
        .collect();
    Measurement::from_offenders(offenders)
}

/// [`format_violations`] bound to a dataset.
#[derive(Debug, Clone)]
pub struct FormatViolation {
    dataset: String,
    field: String,
    predicate: FormatPredicate,
}

impl FormatViolation {
    /// Creates the rule over `field` of `dataset`.
    pub fn new(
        dataset: impl Into<String>,
        field: impl Into<String>,
        predicate: FormatPredicate,
    ) -> Self {
        Self {
            dataset: dataset.into(),
            field: field.into(),
            predicate,
        }
    }
}

impl Metric for FormatViolation {
    fn measure(&self, snapshot: &Snapshot) -> Result<Measurement, AuditError> {
        Ok(format_violations(
            snapshot.dataset(&self.dataset)?,
            &self.field,
            &self.predicate,
        ))
    }

    fn datasets(&self) -> Vec<String> {
        vec![self.dataset.clone()]
    }
}

#[cfg(test)]
mod tests;
