//! fatjet-core: Core types for large-radius jet selection and truth matching.
//!
//! This crate provides the angular geometry, the column-oriented event
//! records, selection configuration and the label types shared by the
//! selection algorithms.
//!

pub mod category;
pub mod config;
pub mod error;
pub mod event;
pub mod geometry;
pub mod pdg;
pub mod process;
pub mod soa;

pub use category::{QcdFlavour, TopCategory, NOT_PROBED};
pub use config::{FlatMassConfig, KinematicCuts, SelectionConfig, MAX_MASS_BINS};
pub use error::{Error, Result};
pub use event::{Event, SelectedEvent};
pub use geometry::{delta_phi, delta_r, delta_r2, EtaPhi};
pub use pdg::GenStatusFlags;
pub use process::Process;
pub use soa::{GenParticleBatch, JetBatch, JetTagBatch, JetTags, PfCandAssociation};
