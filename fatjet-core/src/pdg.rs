//! PDG particle codes and generator status bits.

use particle_id::ParticleID;

/// Bottom quark.
pub const BOTTOM: ParticleID = ParticleID::new(5);
/// Top quark.
pub const TOP: ParticleID = ParticleID::new(6);
/// Z boson.
pub const Z_BOSON: ParticleID = ParticleID::new(23);
/// W⁺ boson (the W⁻ is its antiparticle).
pub const W_BOSON: ParticleID = ParticleID::new(24);
/// Higgs boson.
pub const HIGGS: ParticleID = ParticleID::new(25);

/// Generator status flag bits.
pub struct GenStatusFlags;

impl GenStatusFlags {
    /// Last copy of the particle before it decays or hadronises.
    pub const IS_LAST_COPY: i32 = 1 << 13;

    /// True if the flags mark a final ("last") copy.
    #[inline]
    #[must_use]
    pub fn is_last_copy(flags: i32) -> bool {
        flags & Self::IS_LAST_COPY != 0
    }
}

/// True if `pdg_id` is `species` or its antiparticle.
#[inline]
#[must_use]
pub fn is_species(pdg_id: i32, species: ParticleID) -> bool {
    pdg_id.abs() == species.id()
}

/// Light quarks in the sense used for W decays: `0 < |id| < 6`.
#[inline]
#[must_use]
pub fn is_light_quark(pdg_id: i32) -> bool {
    (1..TOP.id()).contains(&pdg_id.abs())
}
