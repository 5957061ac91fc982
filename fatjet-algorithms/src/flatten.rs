//! Rate-flattening selection in jet mass.
//!
//! [`MassFlattener`] keeps a running histogram of accepted jet masses and
//! rejects a jet once its mass bin has reached the per-bin cap. Fed with a
//! falling spectrum, the accepted sample becomes approximately flat over
//! the capped range. Acceptance depends on history: once a bin is full,
//! every later jet in it is rejected.
//!
//! Bins follow the fixed-width histogram convention: `n_bins` regular bins
//! over `[0, mass_max)`, an underflow bin below zero and an overflow bin at
//! or above `mass_max`. Underflow is capped like a regular bin. Overflow is
//! never capped, since the tail of the spectrum is assumed to be low-rate.

use fatjet_core::error::ensure_len;
use fatjet_core::{FlatMassConfig, JetBatch, KinematicCuts, Result};

use crate::selector::JetSelector;

/// Histogram bin a mass value falls into.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MassBin {
    /// Below the lower edge.
    Underflow,
    /// Regular bin with its zero-based index.
    Regular(usize),
    /// At or above `mass_max` (or NaN).
    Overflow,
}

/// Accepted-jet counts per mass bin.
#[derive(Clone, Debug, PartialEq)]
pub struct MassHistogram {
    config: FlatMassConfig,
    width: f32,
    counts: Vec<u64>,
    underflow: u64,
    overflow: u64,
}

impl MassHistogram {
    /// Create an empty histogram.
    ///
    /// # Errors
    /// Returns an error if the binning is invalid.
    #[allow(clippy::cast_precision_loss)]
    pub fn new(config: FlatMassConfig) -> Result<Self> {
        config.validate()?;
        let n_bins = config.n_bins();
        Ok(Self {
            config,
            width: config.mass_max / n_bins as f32,
            counts: vec![0; n_bins],
            underflow: 0,
            overflow: 0,
        })
    }

    /// Rebuild a histogram from stored counts.
    ///
    /// # Errors
    /// Returns an error if the binning is invalid or `counts` does not
    /// have one entry per regular bin.
    pub fn from_counts(
        config: FlatMassConfig,
        counts: Vec<u64>,
        underflow: u64,
        overflow: u64,
    ) -> Result<Self> {
        let mut histogram = Self::new(config)?;
        ensure_len(
            "MassHistogram",
            "counts",
            histogram.counts.len(),
            counts.len(),
        )?;
        histogram.counts = counts;
        histogram.underflow = underflow;
        histogram.overflow = overflow;
        Ok(histogram)
    }

    /// Binning configuration.
    #[must_use]
    pub fn config(&self) -> &FlatMassConfig {
        &self.config
    }

    /// Number of regular bins.
    #[must_use]
    pub fn n_bins(&self) -> usize {
        self.counts.len()
    }

    /// Actual width of a regular bin.
    #[must_use]
    pub fn bin_width(&self) -> f32 {
        self.width
    }

    /// Counts of the regular bins, in bin order.
    #[must_use]
    pub fn counts(&self) -> &[u64] {
        &self.counts
    }

    /// Entries below the lower edge.
    #[must_use]
    pub fn underflow(&self) -> u64 {
        self.underflow
    }

    /// Entries at or above `mass_max`.
    #[must_use]
    pub fn overflow(&self) -> u64 {
        self.overflow
    }

    /// Sum over all bins including under- and overflow.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.counts.iter().sum::<u64>() + self.underflow + self.overflow
    }

    /// `n_bins + 1` bin edges.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn bin_edges(&self) -> Vec<f32> {
        (0..=self.n_bins()).map(|i| i as f32 * self.width).collect()
    }

    /// Bin that `mass` falls into.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn find_bin(&self, mass: f32) -> MassBin {
        if mass < 0.0 {
            MassBin::Underflow
        } else if mass < self.config.mass_max {
            let bin = (mass / self.width) as usize;
            MassBin::Regular(bin.min(self.n_bins() - 1))
        } else {
            MassBin::Overflow
        }
    }

    /// Current count of a bin.
    #[must_use]
    pub fn count(&self, bin: MassBin) -> u64 {
        match bin {
            MassBin::Underflow => self.underflow,
            MassBin::Regular(i) => self.counts[i],
            MassBin::Overflow => self.overflow,
        }
    }

    /// Adds one entry at `mass`.
    pub fn fill(&mut self, mass: f32) {
        match self.find_bin(mass) {
            MassBin::Underflow => self.underflow += 1,
            MassBin::Regular(i) => self.counts[i] += 1,
            MassBin::Overflow => self.overflow += 1,
        }
    }

    /// Resets every bin to zero.
    pub fn reset(&mut self) {
        self.counts.fill(0);
        self.underflow = 0;
        self.overflow = 0;
    }
}

/// Running totals of a [`MassFlattener`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FlatteningStatistics {
    /// Jets that passed the kinematic cuts.
    pub candidates: usize,
    /// Jets accepted.
    pub accepted: usize,
    /// Jets rejected because their bin was full.
    pub rejected: usize,
}

/// Stateful selector producing an approximately flat mass spectrum.
///
/// One instance is meant to live for a whole run. Selection needs
/// `&mut self`; sharing one flattener between threads requires wrapping it
/// in a lock so that the check and the increment happen together.
#[derive(Clone, Debug)]
pub struct MassFlattener {
    histogram: MassHistogram,
    cuts: KinematicCuts,
    max_per_bin: u64,
    stats: FlatteningStatistics,
}

impl MassFlattener {
    /// Create with the given binning. `cuts` and `max_per_bin` are the
    /// defaults used through [`JetSelector::select`].
    ///
    /// # Errors
    /// Returns an error if the binning is invalid.
    pub fn new(config: FlatMassConfig, cuts: KinematicCuts, max_per_bin: u64) -> Result<Self> {
        Ok(Self {
            histogram: MassHistogram::new(config)?,
            cuts,
            max_per_bin,
            stats: FlatteningStatistics::default(),
        })
    }

    /// Default per-bin cap.
    #[must_use]
    pub fn max_per_bin(&self) -> u64 {
        self.max_per_bin
    }

    /// Default kinematic cuts.
    #[must_use]
    pub fn cuts(&self) -> &KinematicCuts {
        &self.cuts
    }

    /// Histogram of accepted masses.
    #[must_use]
    pub fn histogram(&self) -> &MassHistogram {
        &self.histogram
    }

    /// Consumes the flattener, returning the final histogram.
    #[must_use]
    pub fn into_histogram(self) -> MassHistogram {
        self.histogram
    }

    /// Totals since creation.
    #[must_use]
    pub fn statistics(&self) -> FlatteningStatistics {
        self.stats
    }

    /// Selects jets passing `cuts` whose mass bin holds fewer than
    /// `max_per_bin` entries, and records each accepted jet in the
    /// histogram.
    ///
    /// # Errors
    /// Returns an error if the columns differ in length.
    pub fn select_flat_in_mass(
        &mut self,
        pt: &[f32],
        eta: &[f32],
        mass: &[f32],
        cuts: &KinematicCuts,
        max_per_bin: u64,
    ) -> Result<Vec<usize>> {
        let candidates = crate::selector::select_by_cuts(pt, eta, mass, cuts)?;

        let mut selected = Vec::with_capacity(candidates.len());
        for i in candidates {
            self.stats.candidates += 1;
            let bin = self.histogram.find_bin(mass[i]);
            if bin != MassBin::Overflow && self.histogram.count(bin) >= max_per_bin {
                self.stats.rejected += 1;
                log::trace!("jet {i} rejected, mass bin {bin:?} full");
                continue;
            }
            self.histogram.fill(mass[i]);
            self.stats.accepted += 1;
            selected.push(i);
        }
        Ok(selected)
    }
}

impl JetSelector for MassFlattener {
    fn name(&self) -> &'static str {
        "FlatMass"
    }

    fn select(&mut self, jets: &JetBatch) -> Result<Vec<usize>> {
        jets.validate()?;
        let cuts = self.cuts;
        self.select_flat_in_mass(&jets.pt, &jets.eta, &jets.mass, &cuts, self.max_per_bin)
    }
}

/// Jets passing `cuts` with `low <= mass < high`.
///
/// Used to read the cap off a reference bin (such as 245 to 250) of the
/// unflattened spectrum before a flat-mass run.
///
/// # Errors
/// Returns an error if any batch has columns of different length.
pub fn reference_bin_count<'a, I>(
    events: I,
    cuts: &KinematicCuts,
    low: f32,
    high: f32,
) -> Result<u64>
where
    I: IntoIterator<Item = &'a JetBatch>,
{
    let mut count = 0u64;
    for jets in events {
        jets.validate()?;
        let selected = crate::selector::select_by_cuts(&jets.pt, &jets.eta, &jets.mass, cuts)?;
        count += selected
            .into_iter()
            .filter(|&i| (low..high).contains(&jets.mass[i]))
            .count() as u64;
    }
    Ok(count)
}
