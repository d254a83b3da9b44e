// crates/rfid-rules/src/error.rs
// ============================================================================
// Module: Rule Error Definitions
// Description: Structural diagnostics for rule trees.
// Purpose: Reject rule trees that cannot be evaluated meaningfully.
// Dependencies: std::fmt
// ============================================================================

//! ## Overview
//! Rule evaluation itself never fails; a rule either holds or it does not.
//! Structural problems are caught once, when a rule is accepted into a larger
//! structure, and reported through [`RuleError`].

use std::fmt;

/// Structural problems detected by [`crate::Rule::validate`].
///
/// # Invariants
/// - Variants describe the first problem found in a depth-first walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleError {
    /// The rule tree is nested deeper than the supported maximum.
    TooDeep {
        /// Maximum supported nesting depth
        max_depth: usize,
        /// Depth found in the rule tree
        actual_depth: usize,
    },

    /// An `AtLeast` node requires more passing rules than it contains.
    UnsatisfiableGroup {
        /// Minimum number of rules that must pass
        min: u8,
        /// Number of rules available in the group
        available: usize,
    },

    /// The rule tree contains no checks at all.
    Empty,
}

// ============================================================================
// SECTION: Display Implementation
// ============================================================================

impl fmt::Display for RuleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooDeep {
                max_depth,
                actual_depth,
            } => {
                write!(f, "rule tree too deep: {actual_depth} levels (max {max_depth})")
            }
            Self::UnsatisfiableGroup {
                min,
                available,
            } => {
                write!(f, "at_least group requires {min} passing rules but holds {available}")
            }
            Self::Empty => write!(f, "rule contains no checks"),
        }
    }
}

impl std::error::Error for RuleError {}
