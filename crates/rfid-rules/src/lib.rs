// crates/rfid-rules/src/lib.rs
// ============================================================================
// Module: Rule Algebra Root
// Description: Public API surface for the rule algebra.
// Purpose: Wire together rule trees, evaluation traits, and structural errors.
// Dependencies: crate::{error, rule, traits}
// ============================================================================

//! ## Overview
//! `rfid-rules` is a small, domain-agnostic boolean algebra over typed checks.
//! Domain crates supply the leaf check type and its evaluation context; this
//! crate supplies composition (`All`, `Any`, `Not`, `AtLeast`), deterministic
//! short-circuit evaluation, trace hooks, and structural validation.

// ============================================================================
// SECTION: Core Modules
// ============================================================================

pub mod error;
pub mod rule;
pub mod traits;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use error::RuleError;
pub use rule::MAX_RULE_DEPTH;
pub use rule::Rule;
pub use traits::CheckEval;
pub use traits::NoopTrace;
pub use traits::RuleTrace;

// ============================================================================
// SECTION: Convenience Constructors
// ============================================================================

/// Free-function constructors for building rules without naming the enum.
pub mod convenience {
    use super::Rule;

    /// Creates a rule requiring all of the given rules
    #[must_use]
    pub fn all<C>(rules: Vec<Rule<C>>) -> Rule<C> {
        Rule::all(rules)
    }

    /// Creates a rule requiring any of the given rules
    #[must_use]
    pub fn any<C>(rules: Vec<Rule<C>>) -> Rule<C> {
        Rule::any(rules)
    }

    /// Creates a rule that inverts another rule
    #[must_use]
    pub fn not<C>(rule: Rule<C>) -> Rule<C> {
        Rule::negate(rule)
    }

    /// Creates a rule that only constrains `consequence` when `condition` holds
    #[must_use]
    pub fn implies<C>(condition: Rule<C>, consequence: Rule<C>) -> Rule<C> {
        Rule::implies(condition, consequence)
    }

    /// Creates a leaf rule from a check
    #[must_use]
    pub const fn check<C>(check: C) -> Rule<C> {
        Rule::check(check)
    }
}
