//! Per-event input and output records.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{ensure_len, Result};
use crate::soa::{GenParticleBatch, JetBatch, JetTagBatch, PfCandAssociation};

/// Everything the selection needs from one collision event.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Event {
    /// Event number, carried through to the output.
    pub event: u64,
    /// Large-radius jets, pt-ordered.
    pub jets: JetBatch,
    /// Hadron flavour and tagger scores, one row per jet.
    pub jet_tags: Option<JetTagBatch>,
    /// Generator record (simulation only).
    pub gen_particles: Option<GenParticleBatch>,
    /// Jet constituent table.
    pub pf_cands: Option<PfCandAssociation>,
    /// Per-jet tagger hidden-layer outputs.
    pub neurons: Vec<Vec<f32>>,
}

impl Event {
    /// Validates every collection present in the event.
    ///
    /// # Errors
    /// Returns the first shape error found.
    pub fn validate(&self) -> Result<()> {
        self.jets.validate()?;
        if let Some(tags) = &self.jet_tags {
            ensure_len("FatJet", "hadronFlavour", self.jets.len(), tags.len())?;
            tags.validate()?;
        }
        if let Some(gen) = &self.gen_particles {
            gen.validate()?;
        }
        if let Some(cands) = &self.pf_cands {
            cands.validate()?;
        }
        Ok(())
    }
}

/// Result of selecting one event.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SelectedEvent {
    /// Event number of the input.
    pub event: u64,
    /// Raw indices of the kept jets, in selection order.
    pub jet_indices: Vec<usize>,
    /// Kinematics of the kept jets, aligned with `jet_indices`.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "JetBatch::is_empty"))]
    pub jets: JetBatch,
    /// Flavour and tagger scores of the kept jets, aligned with `jet_indices`.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub jet_tags: Option<JetTagBatch>,
    /// Top category label per kept jet (top samples only).
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub top_categories: Option<Vec<i32>>,
    /// PF candidates belonging to the kept jets.
    #[cfg_attr(feature = "serde", serde(default))]
    pub pf_cand_indices: Vec<usize>,
    /// For each entry of `pf_cand_indices`, position of its jet in `jet_indices`.
    #[cfg_attr(feature = "serde", serde(default))]
    pub pf_cand_jet_positions: Vec<usize>,
    /// Tagger hidden-layer outputs per kept jet.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Vec::is_empty"))]
    pub neurons: Vec<Vec<f32>>,
}

impl SelectedEvent {
    /// Number of kept jets.
    #[must_use]
    pub fn n_jets(&self) -> usize {
        self.jet_indices.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::soa::JetTags;

    #[test]
    fn test_validate_checks_optional_collections() {
        let mut event = Event::default();
        event.jets.push(300.0, 0.0, 0.0, 80.0);
        assert!(event.validate().is_ok());

        let mut cands = PfCandAssociation::default();
        cands.push(0, 1, 2.0);
        cands.pt.clear();
        event.pf_cands = Some(cands);
        assert!(matches!(
            event.validate(),
            Err(Error::LengthMismatch {
                collection: "FatJetPFCands",
                ..
            })
        ));
    }

    #[test]
    fn test_validate_checks_tag_rows() {
        let mut event = Event::default();
        event.jets.push(300.0, 0.0, 0.0, 80.0);
        event.jets.push(250.0, 1.0, 2.0, 60.0);

        let mut tags = JetTagBatch::default();
        tags.push(JetTags::default());
        event.jet_tags = Some(tags.clone());
        assert!(matches!(
            event.validate(),
            Err(Error::LengthMismatch {
                field: "hadronFlavour",
                expected: 2,
                actual: 1,
                ..
            })
        ));

        tags.push(JetTags::default());
        event.jet_tags = Some(tags);
        assert!(event.validate().is_ok());
    }

    #[test]
    fn test_selected_event_jet_count() {
        let selected = SelectedEvent {
            event: 7,
            jet_indices: vec![0, 2],
            ..SelectedEvent::default()
        };
        assert_eq!(selected.n_jets(), 2);
    }
}
