// crates/rfid-compliance-core/src/core/schema.rs
// ============================================================================
// Module: Parameter Schema
// Description: Field definitions, legal domains, and type/domain checks.
// Purpose: Act as the type authority for profiles under validation.
// Dependencies: crate::core::{identifiers, profile, value}, serde, thiserror
// ============================================================================

//! ## Overview
//! A [`ParameterSchema`] lists every configurable reader parameter in
//! definition order. Each [`Field`] pairs a semantic type with a non-empty
//! legal domain and an optional default. The schema only answers "is this
//! value well typed and inside its domain"; cross-field logic lives in the
//! constraint set. After [`ParameterSchema::seal`] the schema is read-only.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::core::identifiers::FieldName;
use crate::core::profile::Profile;
use crate::core::value::ParamValue;

// ============================================================================
// SECTION: Semantic Types and Domains
// ============================================================================

/// Semantic type of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SemanticType {
    /// Symbolic value drawn from a fixed set of choices.
    Enum,
    /// Whole number.
    Integer,
    /// Real number; whole numbers are accepted.
    Float,
    /// Closed interval value.
    Range,
}

impl fmt::Display for SemanticType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Enum => "enum",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Range => "range",
        };
        f.write_str(label)
    }
}

/// Legal domain of a field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Domain {
    /// Closed numeric interval. Range values must lie entirely inside it.
    Interval {
        /// Inclusive lower bound.
        min: f64,
        /// Inclusive upper bound.
        max: f64,
    },
    /// Explicit set of permitted integers.
    IntegerSet {
        /// Permitted values.
        values: Vec<i64>,
    },
    /// Explicit set of permitted symbols.
    Choices {
        /// Permitted symbols.
        values: Vec<String>,
    },
}

impl Domain {
    /// Returns a short label for the domain's shape.
    #[must_use]
    pub const fn kind_label(&self) -> &'static str {
        match self {
            Self::Interval {
                ..
            } => "interval",
            Self::IntegerSet {
                ..
            } => "integer_set",
            Self::Choices {
                ..
            } => "choices",
        }
    }

    /// Returns true when the domain admits no value for `semantic_type`.
    fn is_empty_for(&self, semantic_type: SemanticType) -> bool {
        match self {
            Self::Interval {
                min,
                max,
            } => {
                if !(min.is_finite() && max.is_finite() && min <= max) {
                    return true;
                }
                semantic_type == SemanticType::Integer && min.ceil() > max.floor()
            }
            Self::IntegerSet {
                values,
            } => values.is_empty(),
            Self::Choices {
                values,
            } => values.is_empty(),
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Interval {
                min,
                max,
            } => write!(f, "[{min}, {max}]"),
            Self::IntegerSet {
                values,
            } => {
                let joined: Vec<String> = values.iter().map(ToString::to_string).collect();
                write!(f, "{{{}}}", joined.join(", "))
            }
            Self::Choices {
                values,
            } => write!(f, "{{{}}}", values.join(", ")),
        }
    }
}

/// Returns true when a domain shape can describe values of a semantic type.
const fn domain_fits(semantic_type: SemanticType, domain: &Domain) -> bool {
    matches!(
        (semantic_type, domain),
        (SemanticType::Enum, Domain::Choices { .. })
            | (SemanticType::Integer, Domain::Interval { .. } | Domain::IntegerSet { .. })
            | (SemanticType::Float | SemanticType::Range, Domain::Interval { .. })
    )
}

// ============================================================================
// SECTION: Domain Violations
// ============================================================================

/// Reason a value failed its field's type or domain check.
#[derive(Debug, Clone, PartialEq)]
pub enum DomainViolation {
    /// The value's shape does not match the field's semantic type.
    TypeMismatch {
        /// Semantic type the field expects.
        expected: SemanticType,
        /// Shape of the supplied value.
        found: &'static str,
    },
    /// A numeric value is NaN or infinite.
    NotFinite,
    /// A numeric value lies outside the field's interval.
    OutOfRange {
        /// Inclusive lower bound.
        min: f64,
        /// Inclusive upper bound.
        max: f64,
    },
    /// A value is not a member of the field's permitted set.
    NotPermitted {
        /// Rendered domain, e.g. `{S0, S1}`.
        allowed: String,
    },
    /// A range value has its low bound above its high bound.
    InvertedRange,
}

impl DomainViolation {
    /// Returns the violation kind appended to the field's code.
    #[must_use]
    pub const fn kind_suffix(&self) -> &'static str {
        match self {
            Self::TypeMismatch {
                ..
            } => "TypeMismatch",
            Self::NotFinite => "NotFinite",
            Self::OutOfRange {
                ..
            } => "OutOfRange",
            Self::NotPermitted {
                ..
            } => "NotPermitted",
            Self::InvertedRange => "InvertedRange",
        }
    }

    /// Returns the violation code for a field, e.g. `QValueOutOfRange`.
    #[must_use]
    pub fn code(&self, field: &FieldName) -> String {
        format!("{}{}", pascal_case(field.as_str()), self.kind_suffix())
    }

    /// Renders the full verdict message for a field and its offending value.
    #[must_use]
    pub fn message(&self, field: &FieldName, value: &ParamValue) -> String {
        let code = self.code(field);
        match self {
            Self::TypeMismatch {
                expected,
                found,
            } => format!("{code}: {field} expects a {expected} value, found {found} {value}"),
            Self::NotFinite => format!("{code}: {field} = {value} is not a finite number"),
            Self::OutOfRange {
                min,
                max,
            } => format!("{code}: {field} = {value} is outside [{min}, {max}]"),
            Self::NotPermitted {
                allowed,
            } => format!("{code}: {field} = {value} is not one of {allowed}"),
            Self::InvertedRange => {
                format!("{code}: {field} = {value} has its low bound above its high bound")
            }
        }
    }
}

/// Converts `snake_case` or `kebab-case` names to `PascalCase`.
fn pascal_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for part in name.split(['_', '-']).filter(|part| !part.is_empty()) {
        let mut chars = part.chars();
        if let Some(first) = chars.next() {
            out.extend(first.to_uppercase());
            out.push_str(chars.as_str());
        }
    }
    out
}

// ============================================================================
// SECTION: Field
// ============================================================================

/// Definition of one configurable reader parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    /// Unique field name.
    pub name: FieldName,
    /// Semantic type of the field's values.
    pub semantic_type: SemanticType,
    /// Unit label, e.g. `us` or `dBm`.
    #[serde(default)]
    pub unit: Option<String>,
    /// Legal domain; never empty once defined in a schema.
    pub domain: Domain,
    /// Default value used by [`ParameterSchema::default_profile`].
    #[serde(default)]
    pub default: Option<ParamValue>,
}

impl Field {
    /// Creates a field without unit or default.
    #[must_use]
    pub fn new(name: impl Into<FieldName>, semantic_type: SemanticType, domain: Domain) -> Self {
        Self {
            name: name.into(),
            semantic_type,
            unit: None,
            domain,
            default: None,
        }
    }

    /// Sets the unit label.
    #[must_use]
    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    /// Sets the default value.
    #[must_use]
    pub fn with_default(mut self, default: impl Into<ParamValue>) -> Self {
        self.default = Some(default.into());
        self
    }

    /// Checks a value against the field's type and domain.
    ///
    /// # Errors
    ///
    /// Returns the [`DomainViolation`] describing why the value is not legal.
    pub fn check(&self, value: &ParamValue) -> Result<(), DomainViolation> {
        let mismatch = DomainViolation::TypeMismatch {
            expected: self.semantic_type,
            found: value.kind_label(),
        };
        if !domain_fits(self.semantic_type, &self.domain) {
            return Err(mismatch);
        }
        match self.semantic_type {
            SemanticType::Enum => {
                let Some(text) = value.as_text() else {
                    return Err(mismatch);
                };
                self.check_choice(text)
            }
            SemanticType::Integer => {
                let Some(number) = value.as_i64() else {
                    return Err(mismatch);
                };
                self.check_integer(number, value)
            }
            SemanticType::Float => {
                let Some(number) = value.as_f64() else {
                    return Err(mismatch);
                };
                if !number.is_finite() {
                    return Err(DomainViolation::NotFinite);
                }
                self.check_interval(number, number)
            }
            SemanticType::Range => {
                let Some(range) = value.as_range() else {
                    return Err(mismatch);
                };
                if !(range.low.is_finite() && range.high.is_finite()) {
                    return Err(DomainViolation::NotFinite);
                }
                if range.low > range.high {
                    return Err(DomainViolation::InvertedRange);
                }
                self.check_interval(range.low, range.high)
            }
        }
    }

    /// Checks symbol membership.
    fn check_choice(&self, text: &str) -> Result<(), DomainViolation> {
        match &self.domain {
            Domain::Choices {
                values,
            } if values.iter().any(|choice| choice == text) => Ok(()),
            domain => Err(DomainViolation::NotPermitted {
                allowed: domain.to_string(),
            }),
        }
    }

    /// Checks an integer against an interval or explicit set.
    fn check_integer(&self, number: i64, value: &ParamValue) -> Result<(), DomainViolation> {
        match &self.domain {
            Domain::IntegerSet {
                values,
            } => {
                if values.contains(&number) {
                    Ok(())
                } else {
                    Err(DomainViolation::NotPermitted {
                        allowed: self.domain.to_string(),
                    })
                }
            }
            _ => {
                let widened = value.as_f64().unwrap_or(f64::NAN);
                self.check_interval(widened, widened)
            }
        }
    }

    /// Checks that `[low, high]` lies inside the field's interval.
    fn check_interval(&self, low: f64, high: f64) -> Result<(), DomainViolation> {
        match &self.domain {
            Domain::Interval {
                min,
                max,
            } => {
                if low >= *min && high <= *max {
                    Ok(())
                } else {
                    Err(DomainViolation::OutOfRange {
                        min: *min,
                        max: *max,
                    })
                }
            }
            domain => Err(DomainViolation::NotPermitted {
                allowed: domain.to_string(),
            }),
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised while building or querying a schema.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// A field with the same name is already defined.
    #[error("field {0} is already defined")]
    DuplicateField(FieldName),
    /// No field with this name exists.
    #[error("unknown field {0}")]
    UnknownField(FieldName),
    /// The schema was sealed before this definition.
    #[error("schema is sealed; cannot define field {0}")]
    SchemaSealed(FieldName),
    /// The field's domain admits no value.
    #[error("field {0} has an empty domain")]
    EmptyDomain(FieldName),
    /// The domain shape cannot describe the field's semantic type.
    #[error("field {field} of type {semantic_type} cannot use a {domain} domain")]
    IncompatibleDomain {
        /// Field being defined.
        field: FieldName,
        /// Declared semantic type.
        semantic_type: SemanticType,
        /// Declared domain shape.
        domain: &'static str,
    },
    /// The field's default value is outside its own domain.
    #[error("default for field {field} is invalid: {reason}")]
    InvalidDefault {
        /// Field being defined.
        field: FieldName,
        /// Rendered domain violation.
        reason: String,
    },
}

// ============================================================================
// SECTION: Parameter Schema
// ============================================================================

/// Ordered set of field definitions.
#[derive(Debug, Clone, Default)]
pub struct ParameterSchema {
    /// Fields in definition order.
    fields: Vec<Field>,
    /// Position of each field in `fields`.
    index: BTreeMap<FieldName, usize>,
    /// Whether further definitions are rejected.
    sealed: bool,
}

impl ParameterSchema {
    /// Creates an empty, unsealed schema.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Defines a new field.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::SchemaSealed`] after [`Self::seal`],
    /// [`SchemaError::DuplicateField`] on a name collision, and
    /// [`SchemaError::IncompatibleDomain`], [`SchemaError::EmptyDomain`] or
    /// [`SchemaError::InvalidDefault`] when the definition is malformed.
    pub fn define(&mut self, field: Field) -> Result<(), SchemaError> {
        if self.sealed {
            return Err(SchemaError::SchemaSealed(field.name));
        }
        if self.index.contains_key(&field.name) {
            return Err(SchemaError::DuplicateField(field.name));
        }
        if !domain_fits(field.semantic_type, &field.domain) {
            return Err(SchemaError::IncompatibleDomain {
                field: field.name,
                semantic_type: field.semantic_type,
                domain: field.domain.kind_label(),
            });
        }
        if field.domain.is_empty_for(field.semantic_type) {
            return Err(SchemaError::EmptyDomain(field.name));
        }
        if let Some(default) = &field.default
            && let Err(violation) = field.check(default)
        {
            return Err(SchemaError::InvalidDefault {
                reason: violation.message(&field.name, default),
                field: field.name,
            });
        }
        self.index.insert(field.name.clone(), self.fields.len());
        self.fields.push(field);
        Ok(())
    }

    /// Seals the schema; later definitions fail.
    pub const fn seal(&mut self) {
        self.sealed = true;
    }

    /// Returns true once the schema is sealed.
    #[must_use]
    pub const fn is_sealed(&self) -> bool {
        self.sealed
    }

    /// Returns the definition of a field.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::UnknownField`] when the field is not defined.
    pub fn describe(&self, name: &str) -> Result<&Field, SchemaError> {
        self.index
            .get(name)
            .and_then(|position| self.fields.get(*position))
            .ok_or_else(|| SchemaError::UnknownField(FieldName::new(name)))
    }

    /// Returns true when the value is well typed and inside the field's domain.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::UnknownField`] when the field is not defined.
    pub fn validate_type(&self, name: &str, value: &ParamValue) -> Result<bool, SchemaError> {
        Ok(self.describe(name)?.check(value).is_ok())
    }

    /// Returns the domain violation for a value, if any.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::UnknownField`] when the field is not defined.
    pub fn violation(
        &self,
        name: &str,
        value: &ParamValue,
    ) -> Result<Option<DomainViolation>, SchemaError> {
        Ok(self.describe(name)?.check(value).err())
    }

    /// Returns true when a field with this name is defined.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Returns all fields in definition order.
    #[must_use]
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Returns the number of defined fields.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true when no field is defined.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Builds the profile made of every field's default value.
    ///
    /// Fields without a default are left unset, so the result is only
    /// complete when every field declares one.
    #[must_use]
    pub fn default_profile(&self) -> Profile {
        Profile::from_values(self.fields.iter().filter_map(|field| {
            field.default.as_ref().map(|value| (field.name.clone(), value.clone()))
        }))
    }
}
