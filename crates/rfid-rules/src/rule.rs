// crates/rfid-rules/src/rule.rs
// ============================================================================
// Module: Rule Core Types
// Description: Boolean algebra over typed leaf checks.
// Purpose: Define `Rule`, its constructors, evaluation, and structural analysis.
// Dependencies: serde::{Deserialize, Serialize}, smallvec::SmallVec
// ============================================================================

//! ## Overview
//! A [`Rule`] is a tree whose inner nodes are universal logical operators and
//! whose leaves are domain checks. Evaluation walks children in declaration
//! order and short-circuits, so the same rule and context always visit the
//! same leaves in the same order.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use smallvec::SmallVec;

use crate::error::RuleError;
use crate::traits::CheckEval;
use crate::traits::NoopTrace;
use crate::traits::RuleTrace;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Maximum nesting depth accepted by [`Rule::validate`].
pub const MAX_RULE_DEPTH: usize = 32;

// ============================================================================
// SECTION: Rule Definition
// ============================================================================

/// Rule tree with domain-specific leaves.
///
/// Serializes externally tagged in `snake_case`, e.g.
/// `{ "all": [ { "check": ... }, { "not": { "check": ... } } ] }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rule<C> {
    /// Every child must hold. An empty `All` holds.
    All(SmallVec<[Box<Self>; 4]>),

    /// At least one child must hold. An empty `Any` does not hold.
    Any(SmallVec<[Box<Self>; 4]>),

    /// Inverts the child.
    Not(Box<Self>),

    /// At least `min` of the children must hold.
    AtLeast {
        /// Minimum number of children that must hold
        min: u8,
        /// Candidate children
        rules: SmallVec<[Box<Self>; 8]>,
    },

    /// Domain leaf check.
    Check(C),
}

// ============================================================================
// SECTION: Constructors
// ============================================================================

impl<C> Rule<C> {
    /// Creates a leaf rule.
    #[must_use]
    pub const fn check(check: C) -> Self {
        Self::Check(check)
    }

    /// Creates a conjunction.
    #[must_use]
    pub fn all(rules: impl IntoIterator<Item = Self>) -> Self {
        Self::All(rules.into_iter().map(Box::new).collect())
    }

    /// Creates a disjunction.
    #[must_use]
    pub fn any(rules: impl IntoIterator<Item = Self>) -> Self {
        Self::Any(rules.into_iter().map(Box::new).collect())
    }

    /// Creates a negation.
    #[must_use]
    pub fn negate(rule: Self) -> Self {
        Self::Not(Box::new(rule))
    }

    /// Creates a threshold group.
    #[must_use]
    pub fn at_least(min: u8, rules: impl IntoIterator<Item = Self>) -> Self {
        Self::AtLeast {
            min,
            rules: rules.into_iter().map(Box::new).collect(),
        }
    }

    /// Creates `condition -> consequence`, encoded as `Any[Not(condition), consequence]`.
    #[must_use]
    pub fn implies(condition: Self, consequence: Self) -> Self {
        Self::any([Self::negate(condition), consequence])
    }
}

// ============================================================================
// SECTION: Evaluation
// ============================================================================

impl<C> Rule<C> {
    /// Evaluates the rule against a context.
    pub fn eval(&self, context: &C::Context<'_>) -> bool
    where
        C: CheckEval,
    {
        let mut trace = NoopTrace;
        self.eval_with_trace(context, &mut trace)
    }

    /// Evaluates the rule and reports every evaluated leaf to `trace`.
    pub fn eval_with_trace<T>(&self, context: &C::Context<'_>, trace: &mut T) -> bool
    where
        C: CheckEval,
        T: RuleTrace<C>,
    {
        match self {
            Self::Check(check) => {
                let passed = check.eval_check(context);
                trace.on_check(check, passed);
                passed
            }
            Self::Not(rule) => !rule.eval_with_trace(context, trace),
            Self::All(rules) => {
                for rule in rules {
                    if !rule.eval_with_trace(context, trace) {
                        return false;
                    }
                }
                true
            }
            Self::Any(rules) => {
                for rule in rules {
                    if rule.eval_with_trace(context, trace) {
                        return true;
                    }
                }
                false
            }
            Self::AtLeast {
                min,
                rules,
            } => {
                let required = usize::from(*min);
                let mut passed = 0usize;
                let mut remaining = rules.len();
                if required == 0 {
                    return true;
                }
                for rule in rules {
                    if rule.eval_with_trace(context, trace) {
                        passed += 1;
                        if passed >= required {
                            return true;
                        }
                    }
                    remaining -= 1;
                    if passed + remaining < required {
                        return false;
                    }
                }
                false
            }
        }
    }
}

// ============================================================================
// SECTION: Structural Analysis
// ============================================================================

impl<C> Rule<C> {
    /// Returns every leaf check in declaration order.
    #[must_use]
    pub fn checks(&self) -> Vec<&C> {
        let mut out = Vec::new();
        self.collect_checks(&mut out);
        out
    }

    /// Appends leaf checks to `out` depth-first.
    fn collect_checks<'a>(&'a self, out: &mut Vec<&'a C>) {
        match self {
            Self::Check(check) => out.push(check),
            Self::Not(rule) => rule.collect_checks(out),
            Self::All(rules) | Self::Any(rules) => {
                for rule in rules {
                    rule.collect_checks(out);
                }
            }
            Self::AtLeast {
                rules, ..
            } => {
                for rule in rules {
                    rule.collect_checks(out);
                }
            }
        }
    }

    /// Returns the nesting depth; a single leaf has depth 1.
    #[must_use]
    pub fn depth(&self) -> usize {
        match self {
            Self::Check(_) => 1,
            Self::Not(rule) => 1 + rule.depth(),
            Self::All(rules) | Self::Any(rules) => {
                1 + rules.iter().map(|rule| rule.depth()).max().unwrap_or(0)
            }
            Self::AtLeast {
                rules, ..
            } => 1 + rules.iter().map(|rule| rule.depth()).max().unwrap_or(0),
        }
    }

    /// Validates the rule's structure.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError`] when the tree is too deep, contains an
    /// unsatisfiable `AtLeast` group, or has no checks.
    pub fn validate(&self) -> Result<(), RuleError> {
        let depth = self.depth();
        if depth > MAX_RULE_DEPTH {
            return Err(RuleError::TooDeep {
                max_depth: MAX_RULE_DEPTH,
                actual_depth: depth,
            });
        }
        self.validate_groups()?;
        if self.checks().is_empty() {
            return Err(RuleError::Empty);
        }
        Ok(())
    }

    /// Rejects `AtLeast` nodes whose threshold exceeds their child count.
    fn validate_groups(&self) -> Result<(), RuleError> {
        match self {
            Self::Check(_) => Ok(()),
            Self::Not(rule) => rule.validate_groups(),
            Self::All(rules) | Self::Any(rules) => {
                rules.iter().try_for_each(|rule| rule.validate_groups())
            }
            Self::AtLeast {
                min,
                rules,
            } => {
                if usize::from(*min) > rules.len() {
                    return Err(RuleError::UnsatisfiableGroup {
                        min: *min,
                        available: rules.len(),
                    });
                }
                rules.iter().try_for_each(|rule| rule.validate_groups())
            }
        }
    }
}
