//! Matching reconstructed jets to generator-level particles.
//!
//! Matching runs in two phases: first the generator record is reduced to
//! the directions of the qualifying truth particles (last copies of the
//! requested species), then each jet is accepted if it lies within the
//! matching cone of any of them.
//!
//! Two reductions exist. [`GenMatchTarget::Isolated`] keeps a single
//! species and greedily drops truth particles that sit inside the cone of
//! one already kept, so near-degenerate radiation copies are counted once.
//! [`GenMatchTarget::AnyOf`] accepts a list of species and keeps every
//! qualifying particle without that isolation pass. The two behave
//! differently on purpose; callers pick one explicitly.

use std::collections::HashSet;

use fatjet_core::pdg::GenStatusFlags;
use fatjet_core::{EtaPhi, GenParticleBatch, JetBatch, Result};

/// Which truth particles jets are matched against.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GenMatchTarget {
    /// One species (by `|pdgId|`), with isolation deduplication.
    Isolated(i32),
    /// Any of several species (by `|pdgId|`), no deduplication.
    AnyOf(Vec<i32>),
}

impl GenMatchTarget {
    /// Target for a list of species, as used by the selection pipeline.
    #[must_use]
    pub fn any_of(ids: &[i32]) -> Self {
        GenMatchTarget::AnyOf(ids.to_vec())
    }
}

/// True if a last-copy particle with exactly `target_id` (sign included)
/// lies within `max_dr` of `object`.
///
/// # Errors
/// Returns an error if the generator columns disagree in length.
pub fn match_object_to_particle_id(
    gen: &GenParticleBatch,
    object: EtaPhi,
    target_id: i32,
    max_dr: f32,
) -> Result<bool> {
    gen.validate()?;
    Ok((0..gen.len()).any(|i| {
        GenStatusFlags::is_last_copy(gen.status_flags[i])
            && gen.pdg_id[i] == target_id
            && gen.direction(i).delta_r(&object) < max_dr
    }))
}

fn last_copies_of<'a>(
    gen: &'a GenParticleBatch,
    accept: impl Fn(i32) -> bool + 'a,
) -> impl Iterator<Item = EtaPhi> + 'a {
    (0..gen.len())
        .filter(move |&i| {
            GenStatusFlags::is_last_copy(gen.status_flags[i]) && accept(gen.pdg_id[i].abs())
        })
        .map(move |i| gen.direction(i))
}

/// Directions of mutually isolated last copies of `|pdgId| == target_id`.
///
/// Scan order is kept: a particle is dropped if it lies within `max_dr` of
/// any particle retained before it.
#[must_use]
pub fn isolated_gen_directions(
    gen: &GenParticleBatch,
    target_id: i32,
    max_dr: f32,
) -> Vec<EtaPhi> {
    let mut kept: Vec<EtaPhi> = Vec::new();
    for candidate in last_copies_of(gen, move |id| id == target_id) {
        if kept.iter().all(|stored| !stored.within(&candidate, max_dr)) {
            kept.push(candidate);
        }
    }
    kept
}

/// Directions of all last copies whose `|pdgId|` is in `target_ids`.
#[must_use]
pub fn gen_directions_any_of(gen: &GenParticleBatch, target_ids: &[i32]) -> Vec<EtaPhi> {
    last_copies_of(gen, move |id| target_ids.contains(&id)).collect()
}

/// Indices of jets within `max_dr` of at least one truth particle.
///
/// Output follows jet order.
///
/// # Errors
/// Returns an error if jet or generator columns disagree in length.
pub fn match_jets_to_gen_particles(
    jets: &JetBatch,
    gen: &GenParticleBatch,
    target: &GenMatchTarget,
    max_dr: f32,
) -> Result<Vec<usize>> {
    jets.validate()?;
    gen.validate()?;

    let truth = match target {
        GenMatchTarget::Isolated(id) => isolated_gen_directions(gen, *id, max_dr),
        GenMatchTarget::AnyOf(ids) => gen_directions_any_of(gen, ids),
    };
    log::trace!("{} truth particles retained for {target:?}", truth.len());

    Ok((0..jets.len())
        .filter(|&j| {
            let jet = jets.direction(j);
            truth.iter().any(|particle| particle.within(&jet, max_dr))
        })
        .collect())
}

/// Entries of `a` that also occur in `b`, in `a`'s order, each kept once.
#[must_use]
pub fn intersect_indices(a: &[usize], b: &[usize]) -> Vec<usize> {
    let in_b: HashSet<usize> = b.iter().copied().collect();
    let mut seen = HashSet::with_capacity(a.len());
    a.iter()
        .copied()
        .filter(|i| in_b.contains(i) && seen.insert(*i))
        .collect()
}

/// The first `max_count` entries of `indices`.
#[must_use]
pub fn truncate_indices(indices: &[usize], max_count: usize) -> Vec<usize> {
    indices[..indices.len().min(max_count)].to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    const LAST: i32 = GenStatusFlags::IS_LAST_COPY;

    fn jets(directions: &[(f32, f32)]) -> JetBatch {
        let mut jets = JetBatch::default();
        for &(eta, phi) in directions {
            jets.push(300.0, eta, phi, 100.0);
        }
        jets
    }

    #[test]
    fn test_object_match_is_signed() {
        let mut gen = GenParticleBatch::default();
        gen.push(-24, LAST, 0.0, 0.0, None);

        let object = EtaPhi::new(0.1, 0.1);
        assert!(match_object_to_particle_id(&gen, object, -24, 0.8).unwrap());
        assert!(!match_object_to_particle_id(&gen, object, 24, 0.8).unwrap());
    }

    #[test]
    fn test_object_match_radius_is_exclusive() {
        let mut gen = GenParticleBatch::default();
        gen.push(6, LAST, 0.0, 0.0, None);

        let on_edge = EtaPhi::new(0.5, 0.0);
        assert!(!match_object_to_particle_id(&gen, on_edge, 6, 0.5).unwrap());
        assert!(match_object_to_particle_id(&gen, on_edge, 6, 0.501).unwrap());

        let across_wrap = EtaPhi::new(0.0, 0.25 - std::f32::consts::PI);
        gen.push(6, LAST, 0.0, std::f32::consts::PI - 0.25, None);
        assert!(match_object_to_particle_id(&gen, across_wrap, 6, 0.6).unwrap());
    }

    #[test]
    fn test_object_match_requires_last_copy() {
        let mut gen = GenParticleBatch::default();
        gen.push(25, 0, 0.0, 0.0, None);
        assert!(!match_object_to_particle_id(&gen, EtaPhi::default(), 25, 0.8).unwrap());
    }

    #[test]
    fn test_isolation_drops_collinear_copies() {
        let mut gen = GenParticleBatch::default();
        gen.push(25, LAST, 0.0, 0.0, None);
        gen.push(25, LAST, 0.3, 0.0, None);
        gen.push(-25, LAST, 2.0, 1.0, None);
        gen.push(25, 0, 1.0, -2.0, None);

        let isolated = isolated_gen_directions(&gen, 25, 0.8);
        assert_eq!(isolated, vec![EtaPhi::new(0.0, 0.0), EtaPhi::new(2.0, 1.0)]);

        let all = gen_directions_any_of(&gen, &[25]);
        assert_eq!(all.len(), 3);
    }

    #[test]
    fn test_match_jets_variants() {
        let mut gen = GenParticleBatch::default();
        gen.push(25, LAST, 0.0, 0.0, None);
        gen.push(25, LAST, 0.7, 0.0, None);
        gen.push(23, LAST, -1.5, 3.0, None);

        // Jet 1 only sees the second Higgs, which isolation removes.
        let jets = jets(&[(0.1, 0.0), (1.3, 0.0), (-1.5, -3.0), (2.5, 0.0)]);

        let isolated =
            match_jets_to_gen_particles(&jets, &gen, &GenMatchTarget::Isolated(25), 0.8).unwrap();
        assert_eq!(isolated, vec![0]);

        let any = match_jets_to_gen_particles(&jets, &gen, &GenMatchTarget::any_of(&[25]), 0.8)
            .unwrap();
        assert_eq!(any, vec![0, 1]);

        let both = match_jets_to_gen_particles(&jets, &gen, &GenMatchTarget::any_of(&[23, 25]), 0.8)
            .unwrap();
        assert_eq!(both, vec![0, 1, 2]);
    }

    #[test]
    fn test_match_without_truth() {
        let jets = jets(&[(0.0, 0.0)]);
        let gen = GenParticleBatch::default();
        assert!(
            match_jets_to_gen_particles(&jets, &gen, &GenMatchTarget::Isolated(6), 0.8)
                .unwrap()
                .is_empty()
        );
    }

    #[test]
    fn test_intersect_indices() {
        assert_eq!(intersect_indices(&[3, 1, 4], &[4, 3]), vec![3, 4]);
        assert_eq!(intersect_indices(&[2, 0, 2, 5], &[2, 0, 2, 5]), vec![2, 0, 5]);
        assert!(intersect_indices(&[1, 2], &[]).is_empty());
        assert!(intersect_indices(&[], &[1, 2]).is_empty());
    }

    #[test]
    fn test_truncate_indices() {
        assert_eq!(truncate_indices(&[5, 2, 9], 2), vec![5, 2]);
        assert_eq!(truncate_indices(&[5, 2, 9], 3), vec![5, 2, 9]);
        assert_eq!(truncate_indices(&[5, 2, 9], 10), vec![5, 2, 9]);
        assert!(truncate_indices(&[5, 2, 9], 0).is_empty());
    }
}
