//! HDF5 export of the mass-flattening histogram.
//!
//! Layout: group `mass_histogram` with datasets `counts` (u64, one entry
//! per regular bin) and `bin_edges` (f32, `n_bins + 1`), plus scalar
//! attributes `underflow`, `overflow`, `mass_max` and `bin_width`.

use crate::{Error, Result};
use fatjet_algorithms::MassHistogram;
use fatjet_core::FlatMassConfig;
use hdf5::types::{H5Type, VarLenUnicode};
use hdf5::{Dataset, File, Group};
use ndarray::ArrayView1;
use std::path::Path;
use std::str::FromStr;

const GROUP: &str = "mass_histogram";

/// Writes `histogram` to a new HDF5 file.
///
/// # Errors
/// Returns an error if HDF5 I/O fails.
pub fn write_mass_histogram_hdf5<P: AsRef<Path>>(
    path: P,
    histogram: &MassHistogram,
) -> Result<()> {
    let file = File::create(path)?;
    set_attr_str_file(&file, "fatjet_format_version", "0.1")?;

    let group = file.create_group(GROUP)?;
    set_attr_str_group(&group, "signal", "counts")?;

    let counts = histogram.counts();
    let counts_ds = create_fixed_dataset::<u64>(&group, "counts", counts.len())?;
    set_dataset_units(&counts_ds, "jets")?;
    counts_ds.write(ArrayView1::from(counts))?;

    let edges = histogram.bin_edges();
    let edges_ds = create_fixed_dataset::<f32>(&group, "bin_edges", edges.len())?;
    set_dataset_units(&edges_ds, "GeV")?;
    edges_ds.write(ArrayView1::from(edges.as_slice()))?;

    let config = histogram.config();
    write_scalar_attr(&group, "underflow", histogram.underflow())?;
    write_scalar_attr(&group, "overflow", histogram.overflow())?;
    write_scalar_attr(&group, "mass_max", config.mass_max)?;
    write_scalar_attr(&group, "bin_width", config.bin_width)?;
    Ok(())
}

/// Reads a histogram written by [`write_mass_histogram_hdf5`].
///
/// # Errors
/// Returns an error if HDF5 I/O fails, a required item is missing or the
/// stored counts do not match the stored binning.
pub fn read_mass_histogram_hdf5<P: AsRef<Path>>(path: P) -> Result<MassHistogram> {
    let file = File::open(path)?;
    let group = file.group(GROUP)?;

    let config = FlatMassConfig::default()
        .with_mass_max(group.attr("mass_max")?.read_scalar::<f32>()?)
        .with_bin_width(group.attr("bin_width")?.read_scalar::<f32>()?);
    let underflow = group.attr("underflow")?.read_scalar::<u64>()?;
    let overflow = group.attr("overflow")?.read_scalar::<u64>()?;

    let counts = read_dataset_vec::<u64>(&group, "counts")?;
    let edges = read_dataset_vec::<f32>(&group, "bin_edges")?;
    if edges.len() != counts.len() + 1 {
        return Err(Error::InvalidFormat(format!(
            "{} bin edges for {} bins",
            edges.len(),
            counts.len()
        )));
    }

    Ok(MassHistogram::from_counts(config, counts, underflow, overflow)?)
}

fn create_fixed_dataset<T: H5Type>(group: &Group, name: &str, len: usize) -> Result<Dataset> {
    Ok(group.new_dataset::<T>().shape((len,)).create(name)?)
}

fn write_scalar_attr<T: H5Type>(group: &Group, name: &str, value: T) -> Result<()> {
    group
        .new_attr::<T>()
        .create(name)?
        .write_scalar(&value)?;
    Ok(())
}

fn set_dataset_units(dataset: &Dataset, units: &str) -> Result<()> {
    let value = to_var_len_unicode(units)?;
    dataset
        .new_attr::<VarLenUnicode>()
        .create("units")?
        .write_scalar(&value)?;
    Ok(())
}

fn set_attr_str_file(file: &File, name: &str, value: &str) -> Result<()> {
    let value = to_var_len_unicode(value)?;
    file.new_attr::<VarLenUnicode>()
        .create(name)?
        .write_scalar(&value)?;
    Ok(())
}

fn set_attr_str_group(group: &Group, name: &str, value: &str) -> Result<()> {
    let value = to_var_len_unicode(value)?;
    group
        .new_attr::<VarLenUnicode>()
        .create(name)?
        .write_scalar(&value)?;
    Ok(())
}

fn read_dataset_vec<T: H5Type>(group: &Group, name: &str) -> Result<Vec<T>> {
    let dataset = group.dataset(name)?;
    Ok(dataset.read_raw::<T>()?)
}

fn to_var_len_unicode(value: &str) -> Result<VarLenUnicode> {
    VarLenUnicode::from_str(value)
        .map_err(|e| Error::InvalidFormat(format!("invalid utf-8 attribute: {e}")))
}
