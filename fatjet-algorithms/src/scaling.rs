//! Per-feature standardisation parameters for tagger neuron vectors.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use fatjet_core::error::{ensure_len, Result};

/// Mean and population standard deviation per feature.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ScalingParameters {
    /// Feature means.
    pub mean: Vec<f32>,
    /// Feature standard deviations.
    pub std: Vec<f32>,
}

impl ScalingParameters {
    /// Number of features.
    #[must_use]
    pub fn n_features(&self) -> usize {
        self.mean.len()
    }
}

/// Running accumulator of feature sums and sums of squares.
///
/// The feature width is fixed by the first vector pushed.
#[derive(Clone, Debug, Default)]
pub struct FeatureScaling {
    sum: Vec<f64>,
    sum_sq: Vec<f64>,
    count: usize,
    max_jets: Option<usize>,
}

impl FeatureScaling {
    /// Create an empty accumulator without a jet limit.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stop accumulating after `max_jets` vectors.
    #[must_use]
    pub fn with_max_jets(mut self, max_jets: usize) -> Self {
        self.max_jets = Some(max_jets);
        self
    }

    /// Vectors accumulated so far.
    #[must_use]
    pub fn count(&self) -> usize {
        self.count
    }

    /// True once the jet limit is reached.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.max_jets.is_some_and(|max| self.count >= max)
    }

    /// Adds one feature vector. Returns `false` if the limit was already
    /// reached and the vector was ignored.
    ///
    /// # Errors
    /// Returns [`fatjet_core::Error::LengthMismatch`] if the vector width
    /// differs from the first one.
    pub fn push(&mut self, features: &[f32]) -> Result<bool> {
        if self.is_full() {
            return Ok(false);
        }
        if self.count == 0 {
            self.sum = vec![0.0; features.len()];
            self.sum_sq = vec![0.0; features.len()];
        }
        ensure_len("hidNeurons", "features", self.sum.len(), features.len())?;

        for ((sum, sum_sq), &value) in self.sum.iter_mut().zip(&mut self.sum_sq).zip(features) {
            let value = f64::from(value);
            *sum += value;
            *sum_sq += value * value;
        }
        self.count += 1;
        Ok(true)
    }

    /// Adds every vector of `features` until the limit is reached.
    ///
    /// # Errors
    /// See [`FeatureScaling::push`].
    pub fn extend<'a, I>(&mut self, features: I) -> Result<()>
    where
        I: IntoIterator<Item = &'a [f32]>,
    {
        for vector in features {
            if !self.push(vector)? {
                break;
            }
        }
        Ok(())
    }

    /// Mean and population standard deviation of the accumulated vectors.
    ///
    /// Empty when nothing was accumulated.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    pub fn finish(&self) -> ScalingParameters {
        if self.count == 0 {
            return ScalingParameters::default();
        }
        let n = self.count as f64;
        let (mean, std) = self
            .sum
            .iter()
            .zip(&self.sum_sq)
            .map(|(&sum, &sum_sq)| {
                let mean = sum / n;
                let variance = (sum_sq / n - mean * mean).max(0.0);
                (mean as f32, variance.sqrt() as f32)
            })
            .unzip();
        ScalingParameters { mean, std }
    }
}
