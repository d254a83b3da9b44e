// crates/rfid-compliance-core/src/core/constraint.rs
// ============================================================================
// Module: Constraints
// Description: Named, severity-tagged rules over profile fields.
// Purpose: Hold the ordered constraint set evaluated against profiles.
// Dependencies: crate::core::{check, identifiers, schema, tables}, rfid-rules, serde, thiserror
// ============================================================================

//! ## Overview
//! A [`Constraint`] wraps a rule built from [`Check`] leaves with an id, a
//! severity, a violation code, and a rationale. Its scope is derived from the
//! rule's checks, so scope and predicate can never disagree.
//!
//! A [`ConstraintSet`] is bound to a schema's field names at construction and
//! owns the reference tables its checks consult. Constraints keep insertion
//! order; evaluation and verdict entries follow that order.
//!
//! Security posture: constraints may come from configuration files; rules are
//! structurally validated on insertion before they can be evaluated.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::fmt;

use rfid_rules::Rule;
use rfid_rules::RuleError;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::core::check::Check;
use crate::core::identifiers::ConstraintId;
use crate::core::identifiers::FieldName;
use crate::core::schema::ParameterSchema;
use crate::core::tables::ReferenceTables;

// ============================================================================
// SECTION: Severity
// ============================================================================

/// Effect of a failed constraint on the overall verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Failure makes the profile non-compliant.
    HardFail,
    /// Failure is reported but never changes the overall status.
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HardFail => f.write_str("hard_fail"),
            Self::Warning => f.write_str("warning"),
        }
    }
}

// ============================================================================
// SECTION: Constraint
// ============================================================================

/// Named rule over one or more profile fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Constraint {
    /// Unique identifier, e.g. `q-value-bounds`.
    pub id: ConstraintId,
    /// Effect of a failure.
    pub severity: Severity,
    /// Violation code reported on failure, e.g. `QValueOutOfRange`.
    pub code: String,
    /// Human-readable rationale.
    pub rationale: String,
    /// Predicate over profile values.
    pub rule: Rule<Check>,
}

impl Constraint {
    /// Creates a constraint.
    #[must_use]
    pub fn new(
        id: impl Into<ConstraintId>,
        severity: Severity,
        code: impl Into<String>,
        rationale: impl Into<String>,
        rule: Rule<Check>,
    ) -> Self {
        Self {
            id: id.into(),
            severity,
            code: code.into(),
            rationale: rationale.into(),
            rule,
        }
    }

    /// Returns the fields the rule reads, without duplicates, in first-use order.
    #[must_use]
    pub fn scope(&self) -> Vec<&FieldName> {
        let mut seen = BTreeSet::new();
        self.rule
            .checks()
            .into_iter()
            .flat_map(Check::scope)
            .filter(|field| seen.insert(*field))
            .collect()
    }

    /// Returns true when the rule reads `field`.
    #[must_use]
    pub fn touches(&self, field: &str) -> bool {
        self.rule.checks().into_iter().any(|check| {
            check.scope().into_iter().any(|name| name.as_str() == field)
        })
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised while building a constraint set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConstraintError {
    /// A constraint reads a field the schema does not define.
    #[error("constraint {constraint} references unknown field {field}")]
    UnknownFieldReference {
        /// Offending constraint.
        constraint: ConstraintId,
        /// Field missing from the schema.
        field: FieldName,
    },
    /// A constraint with the same id is already present.
    #[error("constraint id {0} is already registered")]
    DuplicateConstraintId(ConstraintId),
    /// The constraint's rule is structurally invalid.
    #[error("constraint {constraint} has an invalid rule: {source}")]
    InvalidRule {
        /// Offending constraint.
        constraint: ConstraintId,
        /// Structural problem found in the rule.
        #[source]
        source: RuleError,
    },
    /// The reference tables are malformed.
    #[error("invalid reference table: {0}")]
    InvalidReferenceTable(String),
    /// The schema could still gain fields.
    #[error("constraint sets require a sealed schema")]
    SchemaNotSealed,
}

// ============================================================================
// SECTION: Constraint Set
// ============================================================================

/// Ordered constraints bound to a schema's field names.
#[derive(Debug, Clone)]
pub struct ConstraintSet {
    /// Field names of the schema this set was built against.
    fields: BTreeSet<FieldName>,
    /// Reference tables consulted by table-driven checks.
    tables: ReferenceTables,
    /// Constraints in insertion order.
    constraints: Vec<Constraint>,
    /// Registered constraint ids.
    ids: BTreeSet<ConstraintId>,
}

impl ConstraintSet {
    /// Creates an empty set without reference tables.
    ///
    /// The set snapshots the schema's field names, so the schema must be
    /// sealed first.
    ///
    /// # Errors
    ///
    /// Returns [`ConstraintError::SchemaNotSealed`] for an open schema.
    pub fn new(schema: &ParameterSchema) -> Result<Self, ConstraintError> {
        if !schema.is_sealed() {
            return Err(ConstraintError::SchemaNotSealed);
        }
        Ok(Self {
            fields: schema.fields().iter().map(|field| field.name.clone()).collect(),
            tables: ReferenceTables::default(),
            constraints: Vec::new(),
            ids: BTreeSet::new(),
        })
    }

    /// Creates an empty set owning the given reference tables.
    ///
    /// # Errors
    ///
    /// Returns [`ConstraintError::InvalidReferenceTable`] when the tables
    /// contain duplicate or malformed rows, and
    /// [`ConstraintError::SchemaNotSealed`] for an open schema.
    pub fn with_tables(
        schema: &ParameterSchema,
        tables: ReferenceTables,
    ) -> Result<Self, ConstraintError> {
        tables.validate().map_err(ConstraintError::InvalidReferenceTable)?;
        let mut set = Self::new(schema)?;
        set.tables = tables;
        Ok(set)
    }

    /// Appends a constraint.
    ///
    /// # Errors
    ///
    /// Returns [`ConstraintError::InvalidRule`] for malformed rules,
    /// [`ConstraintError::UnknownFieldReference`] when the scope leaves the
    /// schema, and [`ConstraintError::DuplicateConstraintId`] on id collision.
    pub fn add_constraint(&mut self, constraint: Constraint) -> Result<(), ConstraintError> {
        if let Err(source) = constraint.rule.validate() {
            return Err(ConstraintError::InvalidRule {
                constraint: constraint.id,
                source,
            });
        }
        let unknown = constraint.scope().into_iter().find(|field| !self.fields.contains(*field));
        if let Some(field) = unknown {
            return Err(ConstraintError::UnknownFieldReference {
                constraint: constraint.id.clone(),
                field: field.clone(),
            });
        }
        if !self.ids.insert(constraint.id.clone()) {
            return Err(ConstraintError::DuplicateConstraintId(constraint.id));
        }
        self.constraints.push(constraint);
        Ok(())
    }

    /// Returns all constraints in insertion order.
    #[must_use]
    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    /// Returns the constraints reading `field`, in insertion order.
    #[must_use]
    pub fn constraints_touching(&self, field: &str) -> Vec<&Constraint> {
        self.constraints.iter().filter(|constraint| constraint.touches(field)).collect()
    }

    /// Returns a constraint by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Constraint> {
        self.constraints.iter().find(|constraint| constraint.id.as_str() == id)
    }

    /// Returns the reference tables.
    #[must_use]
    pub const fn tables(&self) -> &ReferenceTables {
        &self.tables
    }

    /// Returns the schema field names this set was built against.
    #[must_use]
    pub const fn fields(&self) -> &BTreeSet<FieldName> {
        &self.fields
    }

    /// Returns the number of constraints.
    #[must_use]
    pub fn len(&self) -> usize {
        self.constraints.len()
    }

    /// Returns true when the set holds no constraints.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }
}
