//! Top-jet labelling from generator-level decay products.
//!
//! A probe jet is labelled by which daughters of the hadronic top decay
//! `t -> bW, W -> qq'` fall inside its cone. Each predicate scans the whole
//! generator record once; particles without a mother are skipped.

use fatjet_core::pdg::{self, BOTTOM, TOP, W_BOSON};
use fatjet_core::{EtaPhi, GenParticleBatch, JetBatch, Result, TopCategory, NOT_PROBED};

/// Default cone radius of the decay-product predicates.
pub const DEFAULT_CONE_RADIUS: f32 = 0.8;

/// Read-only view of a validated generator record for top labelling.
#[derive(Clone, Copy, Debug)]
pub struct TopTruth<'a> {
    gen: &'a GenParticleBatch,
    cone_radius: f32,
}

impl<'a> TopTruth<'a> {
    /// Wraps `gen` with the default 0.8 cone.
    ///
    /// # Errors
    /// Returns an error if the columns disagree in length or a mother index
    /// points outside the record.
    pub fn new(gen: &'a GenParticleBatch) -> Result<Self> {
        gen.validate()?;
        Ok(Self {
            gen,
            cone_radius: DEFAULT_CONE_RADIUS,
        })
    }

    /// Replaces the cone radius.
    #[must_use]
    pub fn with_cone_radius(mut self, cone_radius: f32) -> Self {
        self.cone_radius = cone_radius;
        self
    }

    /// Cone radius in use.
    #[must_use]
    pub fn cone_radius(&self) -> f32 {
        self.cone_radius
    }

    /// `(daughter, mother)` pairs for every particle that has a mother.
    fn with_mothers(&self) -> impl Iterator<Item = (usize, usize)> + 'a {
        let gen = self.gen;
        gen.mother
            .iter()
            .enumerate()
            .filter_map(|(i, mother)| mother.map(|m| (i, m)))
    }

    fn in_cone(&self, i: usize, jet: EtaPhi) -> bool {
        self.gen.direction(i).within(&jet, self.cone_radius)
    }

    fn is_b_from_top(&self, i: usize, mother: usize) -> bool {
        pdg::is_species(self.gen.pdg_id[i], BOTTOM)
            && pdg::is_species(self.gen.pdg_id[mother], TOP)
    }

    fn is_q_from_w(&self, i: usize, mother: usize) -> bool {
        pdg::is_light_quark(self.gen.pdg_id[i])
            && pdg::is_species(self.gen.pdg_id[mother], W_BOSON)
    }

    /// A b quark from a top decay lies in the cone.
    #[must_use]
    pub fn b_from_top_in_jet(&self, jet: EtaPhi) -> bool {
        self.with_mothers()
            .any(|(i, m)| self.is_b_from_top(i, m) && self.in_cone(i, jet))
    }

    /// A b quark from a top decay and that top both lie in the cone.
    #[must_use]
    pub fn b_from_top_both_in_jet(&self, jet: EtaPhi) -> bool {
        self.with_mothers().any(|(i, m)| {
            self.is_b_from_top(i, m) && self.in_cone(i, jet) && self.in_cone(m, jet)
        })
    }

    /// A light quark from a W decay lies in the cone.
    #[must_use]
    pub fn q_from_w_in_jet(&self, jet: EtaPhi) -> bool {
        self.with_mothers()
            .any(|(i, m)| self.is_q_from_w(i, m) && self.in_cone(i, jet))
    }

    /// At least two light quarks from a W decay lie in the cone together
    /// with their W.
    #[must_use]
    pub fn qq_from_w_all_in_jet(&self, jet: EtaPhi) -> bool {
        self.with_mothers()
            .filter(|&(i, m)| {
                self.is_q_from_w(i, m) && self.in_cone(i, jet) && self.in_cone(m, jet)
            })
            .nth(1)
            .is_some()
    }

    /// Category of a single probe jet.
    ///
    /// `Bqq` takes the loose b test, `Bq` the tight one; the order of the
    /// checks decides between overlapping categories.
    #[must_use]
    pub fn classify_probe_jet(&self, jet: EtaPhi) -> TopCategory {
        let qq_from_w = self.qq_from_w_all_in_jet(jet);
        if self.b_from_top_in_jet(jet) && qq_from_w {
            TopCategory::Bqq
        } else if self.b_from_top_both_in_jet(jet) && self.q_from_w_in_jet(jet) {
            TopCategory::Bq
        } else if qq_from_w {
            TopCategory::Qq
        } else {
            TopCategory::Other
        }
    }
}

/// One label per jet: [`NOT_PROBED`] by default, the [`TopCategory`] label
/// for every jet listed in `probes`.
///
/// Probe indices outside the jet batch are ignored.
///
/// # Errors
/// Returns an error if the jet or generator columns are malformed.
pub fn classify_top_jets(
    jets: &JetBatch,
    probes: &[usize],
    gen: &GenParticleBatch,
) -> Result<Vec<i32>> {
    jets.validate()?;
    let truth = TopTruth::new(gen)?;

    let mut labels = vec![NOT_PROBED; jets.len()];
    for &probe in probes {
        if let Some(label) = labels.get_mut(probe) {
            *label = truth.classify_probe_jet(jets.direction(probe)).label();
        } else {
            log::debug!("probe jet {probe} out of range for {} jets", jets.len());
        }
    }
    Ok(labels)
}

#[cfg(test)]
mod tests {
    use super::*;
    use fatjet_core::GenStatusFlags;

    const LAST: i32 = GenStatusFlags::IS_LAST_COPY;

    /// Hadronic top at the origin: t(0) -> b(1) W(2), W -> q(3) q(4).
    fn merged_top() -> GenParticleBatch {
        let mut gen = GenParticleBatch::default();
        gen.push(6, LAST, 0.0, 0.0, None);
        gen.push(5, LAST, 0.3, 0.1, Some(0));
        gen.push(24, LAST, -0.1, 0.0, Some(0));
        gen.push(2, LAST, -0.3, 0.2, Some(2));
        gen.push(-1, LAST, -0.2, -0.3, Some(2));
        gen
    }

    #[test]
    fn test_b_from_top_scenario() {
        let mut gen = GenParticleBatch::default();
        gen.push(6, 0, 0.0, 0.0, None);
        gen.push(5, LAST, 1.0, 0.5, Some(0));
        let truth = TopTruth::new(&gen).unwrap();

        assert!(truth.b_from_top_in_jet(EtaPhi::new(1.05, 0.52)));
        assert!(!truth.b_from_top_in_jet(EtaPhi::new(3.0, 0.5)));
        // The top itself is outside the cone.
        assert!(!truth.b_from_top_both_in_jet(EtaPhi::new(1.05, 0.52)));
    }

    #[test]
    fn test_root_particles_skipped() {
        let mut gen = GenParticleBatch::default();
        gen.push(5, LAST, 0.0, 0.0, None);
        gen.push(1, LAST, 0.0, 0.0, None);
        let truth = TopTruth::new(&gen).unwrap();
        let jet = EtaPhi::default();
        assert!(!truth.b_from_top_in_jet(jet));
        assert!(!truth.q_from_w_in_jet(jet));
        assert_eq!(truth.classify_probe_jet(jet), TopCategory::Other);
    }

    #[test]
    fn test_fully_merged_top() {
        let gen = merged_top();
        let truth = TopTruth::new(&gen).unwrap();
        let jet = EtaPhi::new(0.0, 0.0);

        assert!(truth.b_from_top_in_jet(jet));
        assert!(truth.b_from_top_both_in_jet(jet));
        assert!(truth.q_from_w_in_jet(jet));
        assert!(truth.qq_from_w_all_in_jet(jet));
        assert_eq!(truth.classify_probe_jet(jet), TopCategory::Bqq);
    }

    #[test]
    fn test_w_jet_is_qq() {
        let mut gen = merged_top();
        // Move the b quark away.
        gen.eta[1] = 2.5;
        let truth = TopTruth::new(&gen).unwrap();
        assert_eq!(truth.classify_probe_jet(EtaPhi::new(0.0, 0.0)), TopCategory::Qq);
    }

    #[test]
    fn test_partially_merged_is_bq() {
        let mut gen = merged_top();
        // One W daughter leaves the cone.
        gen.eta[4] = -2.0;
        let truth = TopTruth::new(&gen).unwrap();
        let jet = EtaPhi::new(0.0, 0.0);
        assert!(!truth.qq_from_w_all_in_jet(jet));
        assert_eq!(truth.classify_probe_jet(jet), TopCategory::Bq);
    }

    #[test]
    fn test_bq_requires_top_in_cone() {
        let mut gen = merged_top();
        gen.eta[4] = -2.0;
        // Top outside the cone: the tight b test fails.
        gen.eta[0] = 1.2;
        let truth = TopTruth::new(&gen).unwrap();
        assert_eq!(truth.classify_probe_jet(EtaPhi::new(0.0, 0.0)), TopCategory::Other);
    }

    #[test]
    fn test_bqq_uses_loose_b_test() {
        let mut gen = merged_top();
        // Top outside the cone still allows the fully merged label.
        gen.eta[0] = 1.2;
        let truth = TopTruth::new(&gen).unwrap();
        let jet = EtaPhi::new(0.0, 0.0);
        assert!(!truth.b_from_top_both_in_jet(jet));
        assert_eq!(truth.classify_probe_jet(jet), TopCategory::Bqq);
    }

    #[test]
    fn test_cone_radius_is_configurable() {
        let gen = merged_top();
        let truth = TopTruth::new(&gen).unwrap().with_cone_radius(0.1);
        assert_eq!(truth.classify_probe_jet(EtaPhi::new(0.0, 0.0)), TopCategory::Other);
    }

    #[test]
    fn test_classify_top_jets() {
        let gen = merged_top();
        let mut jets = JetBatch::default();
        jets.push(500.0, 0.0, 0.0, 175.0);
        jets.push(400.0, 0.0, 3.0, 20.0);
        jets.push(300.0, 2.0, 1.0, 80.0);

        let labels = classify_top_jets(&jets, &[1, 0, 7], &gen).unwrap();
        assert_eq!(labels, vec![3, 0, NOT_PROBED]);

        let labels = classify_top_jets(&jets, &[], &gen).unwrap();
        assert_eq!(labels, vec![NOT_PROBED; 3]);
    }

    #[test]
    fn test_dangling_mother_rejected() {
        let mut gen = GenParticleBatch::default();
        gen.push(5, LAST, 0.0, 0.0, Some(4));
        assert!(TopTruth::new(&gen).is_err());
    }
}
