//! Declarative rule catalogue.
//!
//! A catalogue is a JSON document listing rule definitions. Expected values
//! live here as data; nothing in the engine hard-codes them. Each definition
//! carries a `kind` tag selecting the check and the parameters that check
//! needs:
//!
//! ```json
//! {
//!   "rules": [
//!     { "name": "doc_missing_levels", "kind": "missing_levels", "dataset": "documents" },
//!     { "name": "addr_dupes", "kind": "duplicate_rows", "dataset": "address",
//!       "keys": ["City", "PostalCode"], "expected": 0 }
//!   ]
//! }
//! ```
//!
//! [`Catalog::build_engine`] turns the document into a [`RuleEngine`] with
//! rules registered in document order.
use serde::{Deserialize, Serialize};

use crate::engine::{Rule, RuleEngine};
use crate::error::AuditError;
use crate::flat::{DuplicateRows, ForbiddenNulls, FormatPredicate, FormatViolation};
use crate::hierarchy::{DEFAULT_GROUP_DEPTH, HierarchyCheck, HierarchyCheckKind};
use crate::path::{DEFAULT_MAX_SEGMENT_DIGITS, PathGrammar};
use crate::tree::NodeSchema;

/// A parsed catalogue document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    /// Rule definitions in registration order.
    pub rules: Vec<RuleDefinition>,
}

/// One rule: identity, expectation, and the check to run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleDefinition {
    /// Unique rule name.
    pub name: String,
    /// Optional human-readable description; defaults to the name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Expected metric value.
    #[serde(default)]
    pub expected: u64,
    /// The check and its parameters.
    #[serde(flatten)]
    pub check: CheckDefinition,
}

/// The check a rule runs, tagged by `kind`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CheckDefinition {
    /// Nodes whose parent node is absent.
    MissingLevels(HierarchyParams),
    /// Groups whose members carry more than one owner.
    MixedOwners(HierarchyParams),
    /// Gap between group count and owner count.
    OwnerCollisions(HierarchyParams),
    /// Surplus rows sharing a key tuple.
    DuplicateRows(DuplicateRowsParams),
    /// Rows with null or absent forbidden fields.
    ForbiddenNulls(ForbiddenNullsParams),
    /// Field values failing a format predicate.
    Format(FormatParams),
}

fn default_path_field() -> String {
    "path".to_owned()
}

fn default_owner_field() -> String {
    "owner".to_owned()
}

fn default_group_depth() -> usize {
    DEFAULT_GROUP_DEPTH
}

fn default_max_segment_digits() -> usize {
    DEFAULT_MAX_SEGMENT_DIGITS
}

/// Parameters shared by the hierarchy checks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HierarchyParams {
    /// Dataset holding the nodes.
    pub dataset: String,
    /// Field holding the materialized path.
    #[serde(default = "default_path_field")]
    pub path_field: String,
    /// Field holding the owner.
    #[serde(default = "default_owner_field")]
    pub owner_field: String,
    /// Optional field holding an explicit level.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level_field: Option<String>,
    /// Depth of the group prefixes.
    #[serde(default = "default_group_depth")]
    pub group_depth: usize,
    /// Widest allowed path segment, in digits.
    #[serde(default = "default_max_segment_digits")]
    pub max_segment_digits: usize,
}

impl HierarchyParams {
    fn to_check(&self, kind: HierarchyCheckKind) -> Result<HierarchyCheck, AuditError> {
        let schema = NodeSchema {
            path_field: self.path_field.clone(),
            owner_field: self.owner_field.clone(),
            level_field: self.level_field.clone(),
            grammar: PathGrammar::new(self.max_segment_digits)?,
        };
        Ok(HierarchyCheck::new(self.dataset.clone(), kind)
            .with_schema(schema)
            .with_group_depth(self.group_depth))
    }
}

/// Parameters of a `duplicate_rows` check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateRowsParams {
    /// Dataset to scan.
    pub dataset: String,
    /// Fields forming the key tuple.
    pub keys: Vec<String>,
}

/// Parameters of a `forbidden_nulls` check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForbiddenNullsParams {
    /// Dataset to scan.
    pub dataset: String,
    /// Fields that must never be null.
    pub fields: Vec<String>,
}

/// Which format predicate a `format` check applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PredicateKind {
    /// See [`FormatPredicate::Uppercase`].
    Uppercase,
    /// See [`FormatPredicate::NotNumeric`].
    NotNumeric,
    /// See [`FormatPredicate::Pattern`]; requires `pattern`.
    Pattern,
}

/// Parameters of a `format` check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatParams {
    /// Dataset to scan.
    pub dataset: String,
    /// Field to check.
    pub field: String,
    /// Predicate to apply.
    pub predicate: PredicateKind,
    /// Regular expression for [`PredicateKind::Pattern`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
}

impl FormatParams {
    fn to_predicate(&self) -> Result<FormatPredicate, AuditError> {
        match (self.predicate, self.pattern.as_deref()) {
            (PredicateKind::Pattern, Some(expr)) => FormatPredicate::pattern(expr),
            (PredicateKind::Pattern, None) => Err(AuditError::InvalidCatalog {
                detail: "predicate \"pattern\" requires a \"pattern\" field".to_owned(),
            }),
            (PredicateKind::Uppercase | PredicateKind::NotNumeric, Some(_)) => {
                Err(AuditError::InvalidCatalog {
                    detail: "\"pattern\" is only allowed with predicate \"pattern\"".to_owned(),
                })
            }
            (PredicateKind::Uppercase, None) => Ok(FormatPredicate::Uppercase),
            (PredicateKind::NotNumeric, None) => Ok(FormatPredicate::NotNumeric),
        }
    }
}

impl CheckDefinition {
    /// The `kind` tag as it appears in the catalogue.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MissingLevels(_) => "missing_levels",
            Self::MixedOwners(_) => "mixed_owners",
            Self::OwnerCollisions(_) => "owner_collisions",
            Self::DuplicateRows(_) => "duplicate_rows",
            Self::ForbiddenNulls(_) => "forbidden_nulls",
            Self::Format(_) => "format",
        }
    }

    /// The dataset the check reads.
    pub fn dataset(&self) -> &str {
        match self {
            Self::MissingLevels(p) | Self::MixedOwners(p) | Self::OwnerCollisions(p) => &p.dataset,
            Self::DuplicateRows(p) => &p.dataset,
            Self::ForbiddenNulls(p) => &p.dataset,
            Self::Format(p) => &p.dataset,
        }
    }
}

impl RuleDefinition {
    /// Builds the executable rule.
    ///
    /// # Errors
    ///
    /// Returns [`AuditError::InvalidCatalog`] when the parameters are
    /// inconsistent (empty key list, bad pattern, bad segment width).
    pub fn to_rule(&self) -> Result<Rule, AuditError> {
        let in_rule = |e: AuditError| match e {
            AuditError::InvalidCatalog { detail } => AuditError::InvalidCatalog {
                detail: format!("rule {:?}: {detail}", self.name),
            },
            other @ (AuditError::InvalidPath { .. }
            | AuditError::EmptySnapshot { .. }
            | AuditError::DuplicateRuleName { .. }
            | AuditError::RuleExecution { .. }
            | AuditError::AdapterUnavailable { .. }
            | AuditError::MissingDataset { .. }
            | AuditError::InvalidRow { .. }) => other,
        };

        let rule = match &self.check {
            CheckDefinition::MissingLevels(p) => Rule::new(
                self.name.clone(),
                self.expected,
                p.to_check(HierarchyCheckKind::MissingLevels).map_err(in_rule)?,
            ),
            CheckDefinition::MixedOwners(p) => Rule::new(
                self.name.clone(),
                self.expected,
                p.to_check(HierarchyCheckKind::MixedOwners).map_err(in_rule)?,
            ),
            CheckDefinition::OwnerCollisions(p) => Rule::new(
                self.name.clone(),
                self.expected,
                p.to_check(HierarchyCheckKind::OwnerCollisions)
                    .map_err(in_rule)?,
            ),
            CheckDefinition::DuplicateRows(p) => Rule::new(
                self.name.clone(),
                self.expected,
                DuplicateRows::new(p.dataset.clone(), p.keys.clone()).map_err(in_rule)?,
            ),
            CheckDefinition::ForbiddenNulls(p) => Rule::new(
                self.name.clone(),
                self.expected,
                ForbiddenNulls::new(p.dataset.clone(), p.fields.clone()).map_err(in_rule)?,
            ),
            CheckDefinition::Format(p) => Rule::new(
                self.name.clone(),
                self.expected,
                FormatViolation::new(
                    p.dataset.clone(),
                    p.field.clone(),
                    p.to_predicate().map_err(in_rule)?,
                ),
            ),
        };

        Ok(match &self.description {
            Some(d) => rule.with_description(d.clone()),
            None => rule,
        })
    }
}

impl Catalog {
    /// Parses a catalogue from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`AuditError::InvalidCatalog`] when the text is not a valid
    /// catalogue document.
    pub fn from_json(text: &str) -> Result<Self, AuditError> {
        serde_json::from_str(text).map_err(|e| AuditError::InvalidCatalog {
            detail: e.to_string(),
        })
    }

    /// Builds an engine with every rule registered in document order.
    ///
    /// # Errors
    ///
    /// - [`AuditError::InvalidCatalog`] for inconsistent rule parameters.
    /// - [`AuditError::DuplicateRuleName`] when two rules share a name.
    pub fn build_engine(&self) -> Result<RuleEngine, AuditError> {
        let mut engine = RuleEngine::new();
        for def in &self.rules {
            engine.register(def.to_rule()?)?;
        }
        Ok(engine)
    }
}
