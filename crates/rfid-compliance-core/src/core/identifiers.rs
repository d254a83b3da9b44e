// crates/rfid-compliance-core/src/core/identifiers.rs
// ============================================================================
// Module: Compliance Identifiers
// Description: Opaque identifiers for fields, constraints, and profiles.
// Purpose: Provide strongly typed, ordered, serializable keys.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Identifiers are thin string wrappers that serialize transparently. They
//! are ordered so they can key `BTreeMap`s, which keeps every derived
//! collection (and therefore every verdict) in a reproducible order.
//! Validation of identifier content happens at the config boundary.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::borrow::Borrow;
use std::fmt;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: String Identifiers
// ============================================================================

/// Declares a transparent string identifier with the shared conversions.
macro_rules! string_identifier {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Creates a new identifier.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Returns the identifier as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self::new(value)
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self::new(value)
            }
        }
    };
}

string_identifier! {
    /// Name of a configurable reader parameter, unique within a schema.
    FieldName
}

string_identifier! {
    /// Identifier of a constraint, unique within a constraint set.
    ConstraintId
}

string_identifier! {
    /// Name under which profiles are registered, e.g. `industrial-conservative`.
    ProfileName
}

// ============================================================================
// SECTION: Profile Version
// ============================================================================

/// Monotonic profile version; higher values supersede lower ones.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ProfileVersion(u32);

impl ProfileVersion {
    /// Creates a profile version.
    #[must_use]
    pub const fn new(version: u32) -> Self {
        Self(version)
    }

    /// Returns the raw version number.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for ProfileVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

impl From<u32> for ProfileVersion {
    fn from(value: u32) -> Self {
        Self::new(value)
    }
}
