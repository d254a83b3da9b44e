// crates/rfid-rules/src/traits.rs
// ============================================================================
// Module: Rule Evaluation Traits
// Description: Domain boundary for leaf checks and evaluation tracing.
// Purpose: Let domain crates plug typed checks into the generic rule algebra.
// Dependencies: none
// ============================================================================

//! ## Overview
//! A domain implements [`CheckEval`] for its leaf check type and names the
//! read-only context the check is evaluated against. [`RuleTrace`] receives
//! every leaf outcome in evaluation order, which lets callers explain a result
//! without re-running the rule.

// ============================================================================
// SECTION: Check Evaluation
// ============================================================================

/// Evaluates a single leaf check against a domain context.
///
/// Implementations must be pure: the same check and context always produce
/// the same answer, and evaluation never mutates the context.
pub trait CheckEval {
    /// Read-only view the check is evaluated against.
    type Context<'a>;

    /// Returns true when the check holds for the given context.
    fn eval_check(&self, context: &Self::Context<'_>) -> bool;
}

// ============================================================================
// SECTION: Tracing
// ============================================================================

/// Observer invoked for every leaf check that is actually evaluated.
///
/// Checks skipped by short-circuiting are not reported.
pub trait RuleTrace<C> {
    /// Called after a leaf check has been evaluated.
    fn on_check(&mut self, check: &C, passed: bool);
}

/// Trace that discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopTrace;

impl<C> RuleTrace<C> for NoopTrace {
    fn on_check(&mut self, _check: &C, _passed: bool) {}
}

impl<C> RuleTrace<C> for Vec<(C, bool)>
where
    C: Clone,
{
    fn on_check(&mut self, check: &C, passed: bool) {
        self.push((check.clone(), passed));
    }
}
