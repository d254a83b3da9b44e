// crates/rfid-compliance-core/src/core/profile.rs
// ============================================================================
// Module: Configuration Profiles
// Description: Candidate reader configurations keyed by field name.
// Purpose: Hold, merge, and fingerprint parameter assignments.
// Dependencies: crate::core::{hashing, identifiers, schema, value}, serde, thiserror
// ============================================================================

//! ## Overview
//! A [`Profile`] is a plain map from field name to value. Construction never
//! type-checks values; the engine reports type and domain problems in the
//! verdict. Profiles are immutable values: [`Profile::with_field`] and
//! [`Profile::merge`] return new profiles.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::core::hashing::Fingerprint;
use crate::core::hashing::FingerprintError;
use crate::core::hashing::fingerprint_canonical_json;
use crate::core::identifiers::FieldName;
use crate::core::schema::ParameterSchema;
use crate::core::schema::SchemaError;
use crate::core::value::ParamValue;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised when a profile cannot be evaluated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProfileError {
    /// Required fields are unset.
    #[error("profile is incomplete; missing fields: {}", join_names(missing))]
    IncompleteProfile {
        /// Missing fields in schema order.
        missing: Vec<FieldName>,
    },
}

/// Joins field names for error messages.
fn join_names(names: &[FieldName]) -> String {
    names.iter().map(FieldName::as_str).collect::<Vec<_>>().join(", ")
}

// ============================================================================
// SECTION: Profile
// ============================================================================

/// Assignment of values to schema fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Profile {
    /// Values keyed by field name.
    values: BTreeMap<FieldName, ParamValue>,
}

impl Profile {
    /// Creates an empty profile.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a profile from `(field, value)` pairs; later pairs win.
    #[must_use]
    pub fn from_values<N, V>(values: impl IntoIterator<Item = (N, V)>) -> Self
    where
        N: Into<FieldName>,
        V: Into<ParamValue>,
    {
        Self {
            values: values.into_iter().map(|(name, value)| (name.into(), value.into())).collect(),
        }
    }

    /// Returns a copy of this profile with one field set.
    ///
    /// Only the field's existence is checked; the value itself is judged
    /// during evaluation.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::UnknownField`] when the schema lacks the field.
    pub fn with_field(
        &self,
        schema: &ParameterSchema,
        name: &str,
        value: impl Into<ParamValue>,
    ) -> Result<Self, SchemaError> {
        let field = schema.describe(name)?;
        let mut next = self.clone();
        next.values.insert(field.name.clone(), value.into());
        Ok(next)
    }

    /// Returns the value of a field, if set.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.values.get(name)
    }

    /// Returns true when the field is set.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Iterates over set fields in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&FieldName, &ParamValue)> {
        self.values.iter()
    }

    /// Returns the number of set fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true when no field is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns true when every schema field is set.
    #[must_use]
    pub fn is_complete(&self, schema: &ParameterSchema) -> bool {
        schema.fields().iter().all(|field| self.values.contains_key(&field.name))
    }

    /// Returns schema fields this profile leaves unset, in schema order.
    #[must_use]
    pub fn missing_fields(&self, schema: &ParameterSchema) -> Vec<FieldName> {
        schema
            .fields()
            .iter()
            .filter(|field| !self.values.contains_key(&field.name))
            .map(|field| field.name.clone())
            .collect()
    }

    /// Returns set fields the schema does not define, in name order.
    #[must_use]
    pub fn unknown_fields(&self, schema: &ParameterSchema) -> Vec<FieldName> {
        self.values.keys().filter(|name| !schema.contains(name.as_str())).cloned().collect()
    }

    /// Fills unset fields from `defaults`; fields already set are kept.
    #[must_use]
    pub fn merge(&self, defaults: &Self) -> Self {
        let mut merged = self.clone();
        for (name, value) in &defaults.values {
            merged.values.entry(name.clone()).or_insert_with(|| value.clone());
        }
        merged
    }

    /// Computes the canonical fingerprint of this profile.
    ///
    /// # Errors
    ///
    /// Returns [`FingerprintError::Canonicalization`] when a value is NaN or
    /// infinite. Canonical JSON has no encoding for those, and rendering them
    /// as `null` would give distinct profiles the same fingerprint.
    pub fn fingerprint(&self) -> Result<Fingerprint, FingerprintError> {
        if let Some((name, value)) = self.values.iter().find(|(_, value)| !value.is_finite()) {
            return Err(FingerprintError::Canonicalization(format!(
                "field {name} holds non-finite value {value}"
            )));
        }
        fingerprint_canonical_json(self)
    }
}

impl<N, V> FromIterator<(N, V)> for Profile
where
    N: Into<FieldName>,
    V: Into<ParamValue>,
{
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        Self::from_values(iter)
    }
}
