//! fatjet-algorithms: Jet selection and truth-labelling algorithms.
//!
//! This crate provides the per-event selection stages:
//! - **Kinematic** - strict pt, |eta| and mass thresholds
//! - **Association** - PF candidates of the selected jets
//! - **Matching** - jets within a cone of generator-level particles
//! - **FlatMass** - history-dependent per-bin cap in jet mass
//! - **Topology** - top-jet decay-product labels
//!
//! and the pipeline that chains them over many events.
#![warn(missing_docs)]

mod association;
mod flatten;
mod matching;
mod processing;
mod scaling;
mod selector;
pub mod topology;

pub use association::{
    associate_candidates_to_jets, jet_position_slots, map_candidates_to_jet_positions,
};
pub use flatten::{
    reference_bin_count, FlatteningStatistics, MassBin, MassFlattener, MassHistogram,
};
pub use matching::{
    gen_directions_any_of, intersect_indices, isolated_gen_directions,
    match_jets_to_gen_particles, match_object_to_particle_id, truncate_indices, GenMatchTarget,
};
pub use processing::{
    merge_statistics, select_event, select_event_flat_mass, select_events,
    select_events_flat_mass, SelectionStatistics,
};
pub use scaling::{FeatureScaling, ScalingParameters};
pub use selector::{neuron_vector_by_index, select_by_cuts, JetSelector, KinematicSelector};
pub use topology::{classify_top_jets, TopTruth};
