// crates/rfid-compliance-core/src/core/hashing.rs
// ============================================================================
// Module: Canonical Fingerprints
// Description: RFC 8785 JSON canonicalization and SHA-256 fingerprints.
// Purpose: Give profiles and verdicts stable cache and audit keys.
// Dependencies: serde, serde_jcs, sha2
// ============================================================================

//! ## Overview
//! Profiles and verdicts are fingerprinted over their JCS-canonical JSON, so
//! two structurally equal values always share a fingerprint regardless of map
//! insertion history. Callers use profile fingerprints as verdict cache keys.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::fmt::Write as _;

use serde::Deserialize;
use serde::Serialize;
use sha2::Digest;
use sha2::Sha256;
use thiserror::Error;

// ============================================================================
// SECTION: Fingerprint
// ============================================================================

/// Supported fingerprint algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FingerprintAlgorithm {
    /// SHA-256 over canonical JSON.
    Sha256,
}

/// Content fingerprint with its algorithm.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fingerprint {
    /// Algorithm used to compute the digest.
    pub algorithm: FingerprintAlgorithm,
    /// Lowercase hex digest.
    pub value: String,
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.algorithm {
            FingerprintAlgorithm::Sha256 => write!(f, "sha256:{}", self.value),
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised while fingerprinting.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FingerprintError {
    /// The value could not be rendered as canonical JSON.
    #[error("failed to canonicalize json: {0}")]
    Canonicalization(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Fingerprints a serializable value over its canonical JSON form.
///
/// # Errors
///
/// Returns [`FingerprintError::Canonicalization`] when serialization fails.
/// Non-finite floats serialize as `null`; callers holding floats reject them
/// first.
pub fn fingerprint_canonical_json<T: Serialize + ?Sized>(
    value: &T,
) -> Result<Fingerprint, FingerprintError> {
    let bytes = serde_jcs::to_vec(value)
        .map_err(|err| FingerprintError::Canonicalization(err.to_string()))?;
    let digest = Sha256::digest(&bytes);
    let mut hex = String::with_capacity(digest.len() * 2);
    for byte in digest {
        let _ = write!(hex, "{byte:02x}");
    }
    Ok(Fingerprint {
        algorithm: FingerprintAlgorithm::Sha256,
        value: hex,
    })
}
