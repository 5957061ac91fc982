//! Structure of Arrays (`SoA`) collections for one collision event.
//!
//! Every collection keeps one vector per attribute. An entity is nothing
//! more than its position: attribute `k` of entity `i` is `column_k[i]`.
//! The `validate` methods check that all columns agree in length, and
//! every algorithm calls them before indexing.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{ensure_len, Error, Result};
use crate::geometry::EtaPhi;

/// Large-radius jets in `SoA` layout.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct JetBatch {
    /// Transverse momentum.
    pub pt: Vec<f32>,
    /// Pseudorapidity.
    pub eta: Vec<f32>,
    /// Azimuthal angle.
    pub phi: Vec<f32>,
    /// Groomed (soft-drop) mass.
    pub mass: Vec<f32>,
}

impl JetBatch {
    /// Creates a new empty batch with specified capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            pt: Vec::with_capacity(capacity),
            eta: Vec::with_capacity(capacity),
            phi: Vec::with_capacity(capacity),
            mass: Vec::with_capacity(capacity),
        }
    }

    /// Returns the number of jets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pt.len()
    }

    /// Returns true if there are no jets.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pt.is_empty()
    }

    /// Pushes a single jet.
    pub fn push(&mut self, pt: f32, eta: f32, phi: f32, mass: f32) {
        self.pt.push(pt);
        self.eta.push(eta);
        self.phi.push(phi);
        self.mass.push(mass);
    }

    /// Direction of jet `i`.
    #[inline]
    #[must_use]
    pub fn direction(&self, i: usize) -> EtaPhi {
        EtaPhi::new(self.eta[i], self.phi[i])
    }

    /// Copies the jets at `indices`, in that order.
    ///
    /// Every index must be below [`len`](Self::len).
    #[must_use]
    pub fn take(&self, indices: &[usize]) -> Self {
        let mut kept = Self::with_capacity(indices.len());
        for &i in indices {
            kept.push(self.pt[i], self.eta[i], self.phi[i], self.mass[i]);
        }
        kept
    }

    /// Checks that all columns have the same length.
    ///
    /// # Errors
    /// Returns [`Error::LengthMismatch`] naming the first offending column.
    pub fn validate(&self) -> Result<()> {
        let n = self.len();
        ensure_len("FatJet", "eta", n, self.eta.len())?;
        ensure_len("FatJet", "phi", n, self.phi.len())?;
        ensure_len("FatJet", "mass", n, self.mass.len())
    }
}

/// Truth flavour and tagger scores of a single jet.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct JetTags {
    /// Hadron flavour of the jet (0 light, 4 charm, 5 bottom).
    pub hadron_flavour: i32,
    /// `GlobalParT3` QCD score.
    pub global_part3_qcd: f32,
    /// `GlobalParT3` fully merged top score.
    pub global_part3_top_bwqq: f32,
    /// `GlobalParT3` partially merged top score.
    pub global_part3_top_bwq: f32,
    /// `ParticleNet` QCD score.
    pub particle_net_qcd: f32,
}

/// Per-jet flavour and tagger columns, aligned with a [`JetBatch`].
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct JetTagBatch {
    /// Hadron flavour (0 light, 4 charm, 5 bottom).
    pub hadron_flavour: Vec<i32>,
    /// `GlobalParT3` QCD score.
    pub global_part3_qcd: Vec<f32>,
    /// `GlobalParT3` fully merged top score.
    pub global_part3_top_bwqq: Vec<f32>,
    /// `GlobalParT3` partially merged top score.
    pub global_part3_top_bwq: Vec<f32>,
    /// `ParticleNet` QCD score.
    pub particle_net_qcd: Vec<f32>,
}

impl JetTagBatch {
    /// Creates a new empty batch with specified capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            hadron_flavour: Vec::with_capacity(capacity),
            global_part3_qcd: Vec::with_capacity(capacity),
            global_part3_top_bwqq: Vec::with_capacity(capacity),
            global_part3_top_bwq: Vec::with_capacity(capacity),
            particle_net_qcd: Vec::with_capacity(capacity),
        }
    }

    /// Returns the number of jets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.hadron_flavour.len()
    }

    /// Returns true if there are no jets.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.hadron_flavour.is_empty()
    }

    /// Pushes the tags of a single jet.
    pub fn push(&mut self, tags: JetTags) {
        self.hadron_flavour.push(tags.hadron_flavour);
        self.global_part3_qcd.push(tags.global_part3_qcd);
        self.global_part3_top_bwqq.push(tags.global_part3_top_bwqq);
        self.global_part3_top_bwq.push(tags.global_part3_top_bwq);
        self.particle_net_qcd.push(tags.particle_net_qcd);
    }

    /// Tags of jet `i`.
    #[must_use]
    pub fn get(&self, i: usize) -> Option<JetTags> {
        Some(JetTags {
            hadron_flavour: *self.hadron_flavour.get(i)?,
            global_part3_qcd: *self.global_part3_qcd.get(i)?,
            global_part3_top_bwqq: *self.global_part3_top_bwqq.get(i)?,
            global_part3_top_bwq: *self.global_part3_top_bwq.get(i)?,
            particle_net_qcd: *self.particle_net_qcd.get(i)?,
        })
    }

    /// Copies the tags at `indices`, in that order.
    ///
    /// Indices past the end of the batch are skipped.
    #[must_use]
    pub fn take(&self, indices: &[usize]) -> Self {
        let mut kept = Self::with_capacity(indices.len());
        for tags in indices.iter().filter_map(|&i| self.get(i)) {
            kept.push(tags);
        }
        kept
    }

    /// Checks that all columns have the same length.
    ///
    /// # Errors
    /// Returns [`Error::LengthMismatch`] naming the first offending column.
    pub fn validate(&self) -> Result<()> {
        let n = self.len();
        ensure_len("FatJet", "globalParT3_QCD", n, self.global_part3_qcd.len())?;
        ensure_len("FatJet", "globalParT3_TopbWqq", n, self.global_part3_top_bwqq.len())?;
        ensure_len("FatJet", "globalParT3_TopbWq", n, self.global_part3_top_bwq.len())?;
        ensure_len("FatJet", "particleNet_QCD", n, self.particle_net_qcd.len())
    }
}

/// Generator-level particles in `SoA` layout.
///
/// Ancestry is a forest stored as an arena: `mother[i]` is the position of
/// particle `i`'s parent in the same batch, or `None` for a root.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GenParticleBatch {
    /// Signed PDG identifier.
    pub pdg_id: Vec<i32>,
    /// Status bitmask, see [`crate::pdg::GenStatusFlags`].
    pub status_flags: Vec<i32>,
    /// Pseudorapidity.
    pub eta: Vec<f32>,
    /// Azimuthal angle.
    pub phi: Vec<f32>,
    /// Index of the mother particle.
    #[cfg_attr(feature = "serde", serde(with = "raw_mother_index"))]
    pub mother: Vec<Option<usize>>,
}

impl GenParticleBatch {
    /// Creates a new empty batch with specified capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            pdg_id: Vec::with_capacity(capacity),
            status_flags: Vec::with_capacity(capacity),
            eta: Vec::with_capacity(capacity),
            phi: Vec::with_capacity(capacity),
            mother: Vec::with_capacity(capacity),
        }
    }

    /// Builds a batch from raw columns where a negative mother index
    /// means "no mother".
    ///
    /// # Errors
    /// Returns an error if the columns disagree in length or a mother
    /// index points outside the batch.
    pub fn from_raw(
        pdg_id: Vec<i32>,
        status_flags: Vec<i32>,
        eta: Vec<f32>,
        phi: Vec<f32>,
        mother_raw: &[i32],
    ) -> Result<Self> {
        let mother = mother_raw
            .iter()
            .map(|&m| usize::try_from(m).ok())
            .collect();
        let batch = Self {
            pdg_id,
            status_flags,
            eta,
            phi,
            mother,
        };
        batch.validate()?;
        Ok(batch)
    }

    /// Returns the number of particles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pdg_id.len()
    }

    /// Returns true if there are no particles.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pdg_id.is_empty()
    }

    /// Pushes a single particle.
    pub fn push(
        &mut self,
        pdg_id: i32,
        status_flags: i32,
        eta: f32,
        phi: f32,
        mother: Option<usize>,
    ) {
        self.pdg_id.push(pdg_id);
        self.status_flags.push(status_flags);
        self.eta.push(eta);
        self.phi.push(phi);
        self.mother.push(mother);
    }

    /// Direction of particle `i`.
    #[inline]
    #[must_use]
    pub fn direction(&self, i: usize) -> EtaPhi {
        EtaPhi::new(self.eta[i], self.phi[i])
    }

    /// Checks column lengths and that every mother index is in range.
    ///
    /// # Errors
    /// Returns [`Error::LengthMismatch`] or [`Error::MotherIndexOutOfRange`].
    pub fn validate(&self) -> Result<()> {
        let n = self.len();
        ensure_len("GenPart", "statusFlags", n, self.status_flags.len())?;
        ensure_len("GenPart", "eta", n, self.eta.len())?;
        ensure_len("GenPart", "phi", n, self.phi.len())?;
        ensure_len("GenPart", "genPartIdxMother", n, self.mother.len())?;
        for (particle, mother) in self.mother.iter().enumerate() {
            if let Some(mother) = *mother {
                if mother >= n {
                    return Err(Error::MotherIndexOutOfRange {
                        particle,
                        mother,
                        len: n,
                    });
                }
            }
        }
        Ok(())
    }
}

/// Constituent-to-jet association table (one row per PF candidate link).
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PfCandAssociation {
    /// Raw index of the owning jet.
    pub jet_idx: Vec<i32>,
    /// Index of the candidate in the full PF candidate collection.
    pub cand_idx: Vec<i32>,
    /// Candidate transverse momentum.
    pub pt: Vec<f32>,
}

impl PfCandAssociation {
    /// Returns the number of association rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.jet_idx.len()
    }

    /// Returns true if the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.jet_idx.is_empty()
    }

    /// Pushes a single association row.
    pub fn push(&mut self, jet_idx: i32, cand_idx: i32, pt: f32) {
        self.jet_idx.push(jet_idx);
        self.cand_idx.push(cand_idx);
        self.pt.push(pt);
    }

    /// Checks that all columns have the same length.
    ///
    /// # Errors
    /// Returns [`Error::LengthMismatch`] naming the first offending column.
    pub fn validate(&self) -> Result<()> {
        let n = self.len();
        ensure_len("FatJetPFCands", "pFCandsIdx", n, self.cand_idx.len())?;
        ensure_len("FatJetPFCands", "pt", n, self.pt.len())
    }
}

/// Mother indices on disk use the NanoAOD convention: `-1` for "no mother".
#[cfg(feature = "serde")]
mod raw_mother_index {
    use serde::{Deserialize, Deserializer, Serializer};

    #[allow(clippy::ptr_arg)]
    pub fn serialize<S: Serializer>(
        mothers: &Vec<Option<usize>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(
            mothers
                .iter()
                .map(|m| m.and_then(|m| i64::try_from(m).ok()).unwrap_or(-1)),
        )
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<Option<usize>>, D::Error> {
        let raw = Vec::<i64>::deserialize(deserializer)?;
        Ok(raw.into_iter().map(|m| usize::try_from(m).ok()).collect())
    }
}
