//! Selection configuration.

use crate::error::{Error, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Kinematic thresholds applied to jets.
///
/// All comparisons are strict: a jet sitting exactly on a threshold fails.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct KinematicCuts {
    /// Minimum transverse momentum (exclusive).
    pub pt_min: f32,
    /// Maximum absolute pseudorapidity (exclusive).
    pub abs_eta_max: f32,
    /// Minimum soft-drop mass (exclusive).
    pub mass_min: f32,
}

impl Default for KinematicCuts {
    fn default() -> Self {
        Self {
            pt_min: 170.0,
            abs_eta_max: 2.4,
            mass_min: 40.0,
        }
    }
}

impl KinematicCuts {
    /// Creates cuts from explicit thresholds.
    #[must_use]
    pub fn new(pt_min: f32, abs_eta_max: f32, mass_min: f32) -> Self {
        Self {
            pt_min,
            abs_eta_max,
            mass_min,
        }
    }

    /// Sets the transverse momentum threshold.
    #[must_use]
    pub fn with_pt_min(mut self, pt_min: f32) -> Self {
        self.pt_min = pt_min;
        self
    }

    /// Sets the pseudorapidity acceptance.
    #[must_use]
    pub fn with_abs_eta_max(mut self, abs_eta_max: f32) -> Self {
        self.abs_eta_max = abs_eta_max;
        self
    }

    /// Sets the mass threshold.
    #[must_use]
    pub fn with_mass_min(mut self, mass_min: f32) -> Self {
        self.mass_min = mass_min;
        self
    }

    /// True if a jet with these kinematics survives.
    #[inline]
    #[must_use]
    pub fn passes(&self, pt: f32, eta: f32, mass: f32) -> bool {
        pt > self.pt_min && eta.abs() < self.abs_eta_max && mass > self.mass_min
    }
}

/// Configuration of the per-event selection pipeline.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SelectionConfig {
    /// Jet kinematic thresholds.
    pub cuts: KinematicCuts,
    /// Cone radius for jet-to-truth matching.
    pub delta_r_max: f32,
    /// Number of leading selected jets kept per event.
    pub max_jets: usize,
    /// Minimum PF candidate pt for constituent association.
    pub pf_cand_min_pt: f32,
    /// Drop events whose leading jet fails the pt threshold.
    pub require_leading_jet_pt: bool,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            cuts: KinematicCuts::default(),
            delta_r_max: 0.8,
            max_jets: 2,
            pf_cand_min_pt: 0.0,
            require_leading_jet_pt: true,
        }
    }
}

impl SelectionConfig {
    /// Creates a selection configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the kinematic cuts.
    #[must_use]
    pub fn with_cuts(mut self, cuts: KinematicCuts) -> Self {
        self.cuts = cuts;
        self
    }

    /// Sets the matching radius.
    #[must_use]
    pub fn with_delta_r_max(mut self, delta_r_max: f32) -> Self {
        self.delta_r_max = delta_r_max;
        self
    }

    /// Sets how many selected jets survive per event.
    #[must_use]
    pub fn with_max_jets(mut self, max_jets: usize) -> Self {
        self.max_jets = max_jets;
        self
    }

    /// Sets the PF candidate pt threshold.
    #[must_use]
    pub fn with_pf_cand_min_pt(mut self, pt: f32) -> Self {
        self.pf_cand_min_pt = pt;
        self
    }

    /// Checks that the configuration is usable.
    ///
    /// # Errors
    /// Returns [`Error::InvalidConfig`] for a non-positive matching radius.
    pub fn validate(&self) -> Result<()> {
        if self.delta_r_max.is_nan() || self.delta_r_max <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "delta_r_max must be positive, got {}",
                self.delta_r_max
            )));
        }
        Ok(())
    }
}

/// Largest number of regular bins a mass histogram may have.
pub const MAX_MASS_BINS: usize = 1 << 20;

/// Binning of the mass-flattening histogram.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct FlatMassConfig {
    /// Upper edge of the capped range; heavier jets go to overflow.
    pub mass_max: f32,
    /// Nominal bin width.
    pub bin_width: f32,
}

impl Default for FlatMassConfig {
    fn default() -> Self {
        Self {
            mass_max: 250.0,
            bin_width: 5.0,
        }
    }
}

impl FlatMassConfig {
    /// Sets the upper edge of the capped range.
    #[must_use]
    pub fn with_mass_max(mut self, mass_max: f32) -> Self {
        self.mass_max = mass_max;
        self
    }

    /// Sets the nominal bin width.
    #[must_use]
    pub fn with_bin_width(mut self, bin_width: f32) -> Self {
        self.bin_width = bin_width;
        self
    }

    /// Number of regular bins, `floor(mass_max / bin_width)`.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn n_bins(&self) -> usize {
        (self.mass_max / self.bin_width) as usize
    }

    /// Checks that the binning is usable.
    ///
    /// # Errors
    /// Returns [`Error::InvalidConfig`] unless `bin_width > 0`,
    /// `mass_max >= bin_width` and the binning has at most
    /// [`MAX_MASS_BINS`] bins.
    #[allow(clippy::cast_precision_loss)]
    pub fn validate(&self) -> Result<()> {
        if self.bin_width.is_nan() || self.bin_width <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "bin_width must be positive, got {}",
                self.bin_width
            )));
        }
        if !self.mass_max.is_finite() || self.mass_max < self.bin_width {
            return Err(Error::InvalidConfig(format!(
                "mass_max ({}) must be finite and at least one bin width ({})",
                self.mass_max, self.bin_width
            )));
        }
        if self.mass_max / self.bin_width >= (MAX_MASS_BINS + 1) as f32 {
            return Err(Error::InvalidConfig(format!(
                "mass_max / bin_width ({} / {}) exceeds {} bins",
                self.mass_max, self.bin_width, MAX_MASS_BINS
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinematic_cuts_strict() {
        let cuts = KinematicCuts::new(30.0, 2.4, 50.0);
        assert!(cuts.passes(30.1, 2.3, 50.1));
        assert!(!cuts.passes(30.0, 0.0, 100.0));
        assert!(!cuts.passes(100.0, 2.4, 100.0));
        assert!(!cuts.passes(100.0, -2.4, 100.0));
        assert!(!cuts.passes(100.0, 0.0, 50.0));
        assert!(!cuts.passes(f32::NAN, 0.0, 100.0));
    }

    #[test]
    fn test_selection_config_builder() {
        let config = SelectionConfig::new()
            .with_cuts(KinematicCuts::default().with_pt_min(200.0))
            .with_delta_r_max(0.4)
            .with_max_jets(3)
            .with_pf_cand_min_pt(1.0);

        assert!((config.cuts.pt_min - 200.0).abs() < f32::EPSILON);
        assert!((config.delta_r_max - 0.4).abs() < f32::EPSILON);
        assert_eq!(config.max_jets, 3);
        assert!(config.validate().is_ok());
        assert!(config.with_delta_r_max(0.0).validate().is_err());
    }

    #[test]
    fn test_flat_mass_config() {
        let config = FlatMassConfig::default();
        assert_eq!(config.n_bins(), 50);
        assert!(config.validate().is_ok());

        assert_eq!(config.with_mass_max(252.0).n_bins(), 50);
        assert!(config.with_bin_width(0.0).validate().is_err());
        assert!(config.with_mass_max(1.0).validate().is_err());
    }

    #[test]
    fn test_flat_mass_config_bounds_bin_count() {
        let huge = FlatMassConfig::default()
            .with_mass_max(1e30)
            .with_bin_width(1e-6);
        assert!(matches!(huge.validate(), Err(Error::InvalidConfig(_))));

        let at_limit = FlatMassConfig::default()
            .with_mass_max(1024.0 * 1024.0)
            .with_bin_width(1.0);
        assert_eq!(at_limit.n_bins(), MAX_MASS_BINS);
        assert!(at_limit.validate().is_ok());
        assert!(at_limit.with_bin_width(0.5).validate().is_err());
    }
}
