// crates/rfid-compliance-core/src/core/tables.rs
// ============================================================================
// Module: Reference Tables
// Description: Air-interface RF mode and regulatory region reference data.
// Purpose: Supply the lookup data table-driven checks consult.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Reference tables describe the reader's capability and the regulatory
//! envelope it operates in. Each RF mode fixes a backscatter data rate,
//! modulation depth, PIE ratio, Tari window, spectral mask, and forward-link
//! modulation. Each region fixes a conducted-power ceiling and a frequency
//! band. Tables are plain data owned by a constraint set.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::fmt;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: RF Modes
// ============================================================================

/// Spectral mask class of an RF mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpectralMask {
    /// Single-interrogator mask.
    #[serde(rename = "SI")]
    SingleInterrogator,
    /// Multi-interrogator mask.
    #[serde(rename = "MI")]
    MultiInterrogator,
    /// Dense-interrogator mask.
    #[serde(rename = "DI")]
    DenseInterrogator,
}

impl SpectralMask {
    /// Returns the short symbol used in profiles.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::SingleInterrogator => "SI",
            Self::MultiInterrogator => "MI",
            Self::DenseInterrogator => "DI",
        }
    }
}

impl fmt::Display for SpectralMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Forward-link modulation of an RF mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ForwardLinkModulation {
    /// Phase-reversal ASK.
    #[serde(rename = "PR-ASK")]
    PrAsk,
    /// Single-sideband ASK.
    #[serde(rename = "SSB-ASK")]
    SsbAsk,
    /// Double-sideband ASK.
    #[serde(rename = "DSB-ASK")]
    DsbAsk,
}

impl ForwardLinkModulation {
    /// Returns the short symbol used in profiles.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::PrAsk => "PR-ASK",
            Self::SsbAsk => "SSB-ASK",
            Self::DsbAsk => "DSB-ASK",
        }
    }
}

impl fmt::Display for ForwardLinkModulation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// One entry of the reader's RF mode table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RfMode {
    /// Mode identifier selected by the `rf_mode` parameter.
    pub mode_identifier: u32,
    /// Miller modulation depth M (1 means FM0).
    pub modulation_depth: u8,
    /// Backscatter data rate in bits per second.
    pub bdr: u32,
    /// PIE ratio scaled by 1000 (1500 means 1.5:1).
    pub pie: u32,
    /// Shortest supported Tari in microseconds.
    pub min_tari_us: f64,
    /// Longest supported Tari in microseconds.
    pub max_tari_us: f64,
    /// Spectral mask class.
    pub spectral_mask: SpectralMask,
    /// Forward-link modulation.
    pub forward_link_modulation: ForwardLinkModulation,
}

// ============================================================================
// SECTION: Regions
// ============================================================================

/// Regulatory limits for one operating region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionLimits {
    /// Region symbol matched against the `region` parameter.
    pub region: String,
    /// Maximum conducted transmit power in dBm.
    pub max_power_dbm: f64,
    /// Lower edge of the permitted band in MHz.
    pub band_low_mhz: f64,
    /// Upper edge of the permitted band in MHz.
    pub band_high_mhz: f64,
}

// ============================================================================
// SECTION: Tables
// ============================================================================

/// RF mode and region tables consulted by table-driven checks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReferenceTables {
    /// Supported RF modes.
    #[serde(default)]
    pub rf_modes: Vec<RfMode>,
    /// Known regulatory regions.
    #[serde(default)]
    pub regions: Vec<RegionLimits>,
}

impl ReferenceTables {
    /// Returns the RF mode with this identifier.
    #[must_use]
    pub fn mode(&self, mode_identifier: u32) -> Option<&RfMode> {
        self.rf_modes.iter().find(|mode| mode.mode_identifier == mode_identifier)
    }

    /// Returns the limits of a region.
    #[must_use]
    pub fn region(&self, region: &str) -> Option<&RegionLimits> {
        self.regions.iter().find(|limits| limits.region == region)
    }

    /// Checks the tables for duplicate keys and malformed rows.
    ///
    /// # Errors
    ///
    /// Returns a description of the first problem found.
    pub fn validate(&self) -> Result<(), String> {
        let mut mode_ids = BTreeSet::new();
        for mode in &self.rf_modes {
            if !mode_ids.insert(mode.mode_identifier) {
                return Err(format!("duplicate rf mode {}", mode.mode_identifier));
            }
            if mode.modulation_depth == 0 {
                return Err(format!("rf mode {} has zero modulation depth", mode.mode_identifier));
            }
            if !(mode.min_tari_us.is_finite()
                && mode.max_tari_us.is_finite()
                && mode.min_tari_us <= mode.max_tari_us)
            {
                return Err(format!("rf mode {} has an invalid tari window", mode.mode_identifier));
            }
        }
        let mut region_names = BTreeSet::new();
        for limits in &self.regions {
            if !region_names.insert(limits.region.as_str()) {
                return Err(format!("duplicate region {}", limits.region));
            }
            if !limits.max_power_dbm.is_finite() {
                return Err(format!("region {} has a non-finite power ceiling", limits.region));
            }
            if !(limits.band_low_mhz.is_finite()
                && limits.band_high_mhz.is_finite()
                && limits.band_low_mhz <= limits.band_high_mhz)
            {
                return Err(format!("region {} has an invalid band", limits.region));
            }
        }
        Ok(())
    }
}
