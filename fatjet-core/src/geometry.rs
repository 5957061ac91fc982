//! Angular distance primitives in (pseudorapidity, azimuth) space.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use std::f32::consts::{PI, TAU};

/// Absolute azimuthal difference folded into `[0, π]`.
///
/// Inputs are radians and need not be normalised. `|Δφ|` is first
/// reduced modulo 2π, then a value above π is reflected to `2π - |Δφ|`.
#[inline]
#[must_use]
pub fn delta_phi(phi1: f32, phi2: f32) -> f32 {
    let dphi = (phi1 - phi2).abs().rem_euclid(TAU);
    if dphi > PI {
        TAU - dphi
    } else {
        dphi
    }
}

/// Squared angular distance `Δη² + Δφ²`.
#[inline]
#[must_use]
pub fn delta_r2(eta1: f32, phi1: f32, eta2: f32, phi2: f32) -> f32 {
    let deta = eta1 - eta2;
    let dphi = delta_phi(phi1, phi2);
    deta * deta + dphi * dphi
}

/// Angular distance `sqrt(Δη² + Δφ²)`.
#[inline]
#[must_use]
pub fn delta_r(eta1: f32, phi1: f32, eta2: f32, phi2: f32) -> f32 {
    delta_r2(eta1, phi1, eta2, phi2).sqrt()
}

/// A direction in (η, φ) space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EtaPhi {
    /// Pseudorapidity.
    pub eta: f32,
    /// Azimuthal angle (radians).
    pub phi: f32,
}

impl EtaPhi {
    /// Creates a new coordinate pair.
    #[inline]
    #[must_use]
    pub fn new(eta: f32, phi: f32) -> Self {
        Self { eta, phi }
    }

    /// Angular distance to another direction.
    #[inline]
    #[must_use]
    pub fn delta_r(&self, other: &Self) -> f32 {
        delta_r(self.eta, self.phi, other.eta, other.phi)
    }

    /// Squared angular distance to another direction.
    #[inline]
    #[must_use]
    pub fn delta_r2(&self, other: &Self) -> f32 {
        delta_r2(self.eta, self.phi, other.eta, other.phi)
    }

    /// True if `other` lies strictly inside a cone of radius `radius`.
    #[inline]
    #[must_use]
    pub fn within(&self, other: &Self, radius: f32) -> bool {
        self.delta_r2(other) < radius * radius
    }
}
