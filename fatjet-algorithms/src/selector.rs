//! Kinematic jet selection.

use fatjet_core::error::{ensure_len, Result};
use fatjet_core::{JetBatch, KinematicCuts};

/// Common interface of the jet selectors.
///
/// A selector returns positions into the jet batch in scan order. Stateful
/// selectors (see [`crate::MassFlattener`]) update their state on every call.
pub trait JetSelector {
    /// Selector name for logs and reports.
    fn name(&self) -> &'static str;

    /// Selects jets from one event.
    ///
    /// # Errors
    /// Returns an error if the jet columns disagree in length.
    fn select(&mut self, jets: &JetBatch) -> Result<Vec<usize>>;
}

/// Returns the indices `i` with `pt[i] > pt_min`, `|eta[i]| < abs_eta_max`
/// and `mass[i] > mass_min`, in input order.
///
/// # Errors
/// Returns [`fatjet_core::Error::LengthMismatch`] if the columns differ in length.
pub fn select_by_cuts(
    pt: &[f32],
    eta: &[f32],
    mass: &[f32],
    cuts: &KinematicCuts,
) -> Result<Vec<usize>> {
    ensure_len("FatJet", "eta", pt.len(), eta.len())?;
    ensure_len("FatJet", "msoftdrop", pt.len(), mass.len())?;

    Ok(pt
        .iter()
        .zip(eta)
        .zip(mass)
        .enumerate()
        .filter(|&(_, ((&pt, &eta), &mass))| cuts.passes(pt, eta, mass))
        .map(|(i, _)| i)
        .collect())
}

/// Stateless selector applying fixed [`KinematicCuts`].
#[derive(Clone, Debug, Default)]
pub struct KinematicSelector {
    cuts: KinematicCuts,
}

impl KinematicSelector {
    /// Create with the given cuts.
    #[must_use]
    pub fn new(cuts: KinematicCuts) -> Self {
        Self { cuts }
    }

    /// Current cuts.
    #[must_use]
    pub fn cuts(&self) -> &KinematicCuts {
        &self.cuts
    }
}

impl JetSelector for KinematicSelector {
    fn name(&self) -> &'static str {
        "Kinematic"
    }

    fn select(&mut self, jets: &JetBatch) -> Result<Vec<usize>> {
        jets.validate()?;
        select_by_cuts(&jets.pt, &jets.eta, &jets.mass, &self.cuts)
    }
}

/// Per-jet network outputs at `index`, or an empty slice when out of range.
#[must_use]
pub fn neuron_vector_by_index(all_neurons: &[Vec<f32>], index: usize) -> &[f32] {
    all_neurons.get(index).map(Vec::as_slice).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use fatjet_core::Error;

    #[test]
    fn test_select_by_cuts_scenario() {
        // Jet 0 fails the mass cut, jet 1 the eta acceptance.
        let cuts = KinematicCuts::new(30.0, 2.4, 50.0);
        let selected = select_by_cuts(&[50.0, 200.0], &[0.1, 3.0], &[10.0, 100.0], &cuts).unwrap();
        assert!(selected.is_empty());

        let selected = select_by_cuts(&[50.0, 200.0], &[0.1, 1.0], &[10.0, 100.0], &cuts).unwrap();
        assert_eq!(selected, vec![1]);
    }

    #[test]
    fn test_select_by_cuts_boundaries_rejected() {
        let cuts = KinematicCuts::new(30.0, 2.4, 50.0);
        let selected = select_by_cuts(
            &[30.0, 31.0, 31.0, 31.0],
            &[0.0, 2.4, 0.0, -2.39],
            &[60.0, 60.0, 50.0, 50.5],
            &cuts,
        )
        .unwrap();
        assert_eq!(selected, vec![3]);
    }

    #[test]
    fn test_select_by_cuts_length_mismatch() {
        let cuts = KinematicCuts::default();
        let err = select_by_cuts(&[200.0, 300.0], &[0.0], &[80.0, 90.0], &cuts).unwrap_err();
        assert!(matches!(
            err,
            Error::LengthMismatch {
                field: "eta",
                expected: 2,
                actual: 1,
                ..
            }
        ));
    }

    #[test]
    fn test_kinematic_selector_trait() {
        let mut jets = JetBatch::default();
        jets.push(400.0, 0.3, 0.0, 120.0);
        jets.push(100.0, 0.3, 0.0, 120.0);
        jets.push(300.0, -1.0, 2.0, 175.0);

        let mut selector = KinematicSelector::default();
        assert_eq!(selector.name(), "Kinematic");
        assert_eq!(selector.select(&jets).unwrap(), vec![0, 2]);
    }

    #[test]
    fn test_neuron_vector_lookup() {
        let neurons = vec![vec![0.1, 0.2], vec![0.3, 0.4]];
        assert_eq!(neuron_vector_by_index(&neurons, 1), [0.3_f32, 0.4].as_slice());
        assert!(neuron_vector_by_index(&neurons, 2).is_empty());
        assert!(neuron_vector_by_index(&[], 0).is_empty());
    }
}
