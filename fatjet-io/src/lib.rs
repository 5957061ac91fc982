//! fatjet-io: Event input and result output for fatjet.
//!
//! Events and selection results are stored as JSON lines. Mass
//! histograms are exported as CSV, or as HDF5 with the `hdf5` feature.
//! Selection output can be split into per-category jet files.

mod error;
#[cfg(feature = "hdf5")]
pub mod hdf5;
mod reader;
mod split;
mod writer;

pub use error::{Error, Result};
#[cfg(feature = "hdf5")]
pub use self::hdf5::{read_mass_histogram_hdf5, write_mass_histogram_hdf5};
pub use reader::{EventReader, JsonLinesReader, SelectionReader};
pub use split::{categorize_jets, split_selection, CategoryJet, SplitMode};
pub use writer::{
    write_histogram_csv, write_histogram_csv_file, write_scaling_json, JsonLinesWriter,
    SelectionWriter,
};
