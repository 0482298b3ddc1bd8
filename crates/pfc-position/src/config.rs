//! Calculator configuration.
//!
//! # Example TOML
//! ```toml
//! log_weight_denominator = 0.08
//! pos_calc_n_crystals = -1
//! min_allowed_normalization = 1e-9
//! sample_projection = "xyz"
//! ```
//!
//! The camelCase names used by particle-flow parameter sets (`logWeightDenominator`,
//! `posCalcNCrystals`, `minAllowedNormalization`) are accepted as aliases.

use pfc_core::{ClusterError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Which hit coordinates feed the three PCA variables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SampleProjection {
    /// (x, y, z) of the hit.
    #[default]
    Xyz,
    /// (x, x, x): the hit x-coordinate in all three variables. Reproduces the
    /// legacy calculator output, whose cloud is degenerate along (1, 1, 1).
    XOnly,
}

/// Configuration of [`crate::Cluster3DPcaCalculator`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PcaCalculatorConfig {
    /// Energy (GeV) represented by one PCA sample
    #[serde(default = "default_log_weight_denominator", alias = "logWeightDenominator")]
    pub log_weight_denominator: f64,

    /// Number of crystals for position calculation (-1 = all). Carried for
    /// calculators sharing the parameter set; the PCA calculator does not read it.
    #[serde(default = "default_pos_calc_n_crystals", alias = "posCalcNCrystals")]
    pub pos_calc_n_crystals: i32,

    /// Minimum normalization. Carried, not read by the PCA calculator.
    #[serde(
        default = "default_min_allowed_normalization",
        alias = "minAllowedNormalization"
    )]
    pub min_allowed_normalization: f64,

    #[serde(default)]
    pub sample_projection: SampleProjection,
}

fn default_log_weight_denominator() -> f64 {
    0.08
}

fn default_pos_calc_n_crystals() -> i32 {
    -1
}

fn default_min_allowed_normalization() -> f64 {
    1e-9
}

impl Default for PcaCalculatorConfig {
    fn default() -> Self {
        Self {
            log_weight_denominator: default_log_weight_denominator(),
            pos_calc_n_crystals: default_pos_calc_n_crystals(),
            min_allowed_normalization: default_min_allowed_normalization(),
            sample_projection: SampleProjection::default(),
        }
    }
}

impl PcaCalculatorConfig {
    /// Config with the given sample energy and defaults elsewhere.
    pub fn with_log_weight_denominator(log_weight_denominator: f64) -> Self {
        Self {
            log_weight_denominator,
            ..Self::default()
        }
    }

    /// Load configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Parse and validate configuration from a TOML string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate numeric ranges.
    pub fn validate(&self) -> Result<()> {
        if !self.log_weight_denominator.is_finite() || self.log_weight_denominator <= 0.0 {
            return Err(ClusterError::config(format!(
                "log_weight_denominator must be finite and > 0 (got {})",
                self.log_weight_denominator
            )));
        }

        if self.pos_calc_n_crystals != -1 && self.pos_calc_n_crystals <= 0 {
            return Err(ClusterError::config(format!(
                "pos_calc_n_crystals must be -1 or positive (got {})",
                self.pos_calc_n_crystals
            )));
        }

        if !self.min_allowed_normalization.is_finite() || self.min_allowed_normalization < 0.0 {
            return Err(ClusterError::config(format!(
                "min_allowed_normalization must be finite and >= 0 (got {})",
                self.min_allowed_normalization
            )));
        }

        Ok(())
    }
}
