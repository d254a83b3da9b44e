// crates/rfid-compliance-core/src/runtime/registry.rs
// ============================================================================
// Module: Profile Registry
// Description: In-memory store of named, versioned profiles.
// Purpose: Resolve reusable profiles such as `industrial-conservative`.
// Dependencies: crate::core::{identifiers, profile}, thiserror
// ============================================================================

//! ## Overview
//! Registration happens during setup under single-writer discipline
//! (`&mut self`). Once built, the registry is read-only and can be shared
//! across evaluating threads. Versions are kept ordered so an omitted version
//! resolves to the highest registered one.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use thiserror::Error;

use crate::core::ProfileName;
use crate::core::ProfileVersion;
use crate::core::profile::Profile;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised by the profile registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// The (name, version) pair is already registered.
    #[error("profile {name} {version} is already registered")]
    VersionConflict {
        /// Profile name.
        name: ProfileName,
        /// Conflicting version.
        version: ProfileVersion,
    },
    /// No matching profile exists.
    #[error("profile {name} not found{}", version_suffix(*version))]
    NotFound {
        /// Requested name.
        name: ProfileName,
        /// Requested version, if any.
        version: Option<ProfileVersion>,
    },
}

/// Renders an optional version for error messages.
fn version_suffix(version: Option<ProfileVersion>) -> String {
    version.map(|version| format!(" at {version}")).unwrap_or_default()
}

// ============================================================================
// SECTION: Registry
// ============================================================================

/// Named, versioned profiles.
#[derive(Debug, Clone, Default)]
pub struct ProfileRegistry {
    /// Profiles by name, then version.
    entries: BTreeMap<ProfileName, BTreeMap<ProfileVersion, Profile>>,
}

impl ProfileRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a profile under `(name, version)`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::VersionConflict`] when the pair exists.
    pub fn register(
        &mut self,
        name: impl Into<ProfileName>,
        version: impl Into<ProfileVersion>,
        profile: Profile,
    ) -> Result<(), RegistryError> {
        let name = name.into();
        let version = version.into();
        let versions = self.entries.entry(name.clone()).or_default();
        if versions.contains_key(&version) {
            return Err(RegistryError::VersionConflict {
                name,
                version,
            });
        }
        versions.insert(version, profile);
        Ok(())
    }

    /// Resolves a profile; without a version the highest one is returned.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotFound`] when nothing matches.
    pub fn resolve(
        &self,
        name: &str,
        version: Option<ProfileVersion>,
    ) -> Result<&Profile, RegistryError> {
        let found = self.entries.get(name).and_then(|versions| match version {
            Some(version) => versions.get(&version),
            None => versions.values().next_back(),
        });
        found.ok_or_else(|| RegistryError::NotFound {
            name: ProfileName::new(name),
            version,
        })
    }

    /// Returns the highest registered version of a profile.
    #[must_use]
    pub fn latest_version(&self, name: &str) -> Option<ProfileVersion> {
        self.entries.get(name).and_then(|versions| versions.keys().next_back().copied())
    }

    /// Returns the registered versions of a profile in ascending order.
    #[must_use]
    pub fn versions(&self, name: &str) -> Vec<ProfileVersion> {
        self.entries
            .get(name)
            .map(|versions| versions.keys().copied().collect())
            .unwrap_or_default()
    }

    /// Iterates over registered names in order.
    pub fn names(&self) -> impl Iterator<Item = &ProfileName> {
        self.entries.keys()
    }

    /// Returns the total number of registered versions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.values().map(BTreeMap::len).sum()
    }

    /// Returns true when nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
