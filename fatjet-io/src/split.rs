//! Splitting selection output into one jet file per category.
//!
//! Top samples are split by decay topology (`Top_bqq`, `Top_bq`,
//! `Top_qq`), QCD samples by hadron flavour (`QCD_light`, `QCD_c`,
//! `QCD_b`). Each output line is one jet.

use crate::writer::JsonLinesWriter;
use crate::{Error, Result};
use fatjet_core::{JetTags, QcdFlavour, SelectedEvent, TopCategory};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

/// Top categories written by a top split.
const TOP_CATEGORIES: [TopCategory; 3] = [TopCategory::Bqq, TopCategory::Bq, TopCategory::Qq];

/// Which labelling a split uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitMode {
    /// By top decay topology label.
    Top,
    /// By QCD hadron flavour.
    Qcd,
}

impl SplitMode {
    /// Sample names of this mode, in output order.
    #[must_use]
    pub fn sample_names(self) -> Vec<&'static str> {
        match self {
            SplitMode::Top => TOP_CATEGORIES.iter().map(|c| c.sample_name()).collect(),
            SplitMode::Qcd => QcdFlavour::ALL.iter().map(|f| f.sample_name()).collect(),
        }
    }

    fn sample_of(self, event: &SelectedEvent, position: usize) -> Option<&'static str> {
        match self {
            SplitMode::Top => {
                let label = *event.top_categories.as_ref()?.get(position)?;
                TopCategory::from_label(label)
                    .filter(|category| TOP_CATEGORIES.contains(category))
                    .map(TopCategory::sample_name)
            }
            SplitMode::Qcd => {
                let tags = event.jet_tags.as_ref()?.get(position)?;
                QcdFlavour::from_hadron_flavour(tags.hadron_flavour).map(QcdFlavour::sample_name)
            }
        }
    }
}

/// One jet of a split output file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryJet {
    /// Event number.
    pub event: u64,
    /// Raw index of the jet in its event.
    pub jet_index: usize,
    /// Transverse momentum.
    pub pt: f32,
    /// Pseudorapidity.
    pub eta: f32,
    /// Azimuthal angle.
    pub phi: f32,
    /// Soft-drop mass.
    pub mass: f32,
    /// Hadron flavour and tagger scores, when the input carried them.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<JetTags>,
    /// Top category label (top samples only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_category: Option<i32>,
    /// Tagger hidden-layer outputs.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub neurons: Vec<f32>,
}

/// Kept jets of `event` that belong to a sample of `mode`, with that sample.
///
/// Jets without the label `mode` needs are left out.
///
/// # Errors
/// Returns [`Error::InvalidFormat`] if the event lacks the kept-jet columns.
pub fn categorize_jets(
    event: &SelectedEvent,
    mode: SplitMode,
) -> Result<Vec<(&'static str, CategoryJet)>> {
    if event.jets.len() != event.n_jets() {
        return Err(Error::InvalidFormat(format!(
            "event {}: {} kept-jet rows for {} jets",
            event.event,
            event.jets.len(),
            event.n_jets()
        )));
    }

    let mut jets = Vec::new();
    for (position, &jet_index) in event.jet_indices.iter().enumerate() {
        let Some(sample) = mode.sample_of(event, position) else {
            continue;
        };
        let top_category = event
            .top_categories
            .as_ref()
            .and_then(|labels| labels.get(position).copied());
        let neurons = event.neurons.get(position).cloned().unwrap_or_default();
        jets.push((
            sample,
            CategoryJet {
                event: event.event,
                jet_index,
                pt: event.jets.pt[position],
                eta: event.jets.eta[position],
                phi: event.jets.phi[position],
                mass: event.jets.mass[position],
                tags: event.jet_tags.as_ref().and_then(|tags| tags.get(position)),
                top_category,
                neurons,
            },
        ));
    }
    Ok(jets)
}

/// Writes `events` to one `<sample>.jsonl` file per sample of `mode`.
///
/// Returns each written path with its jet count, in sample order.
///
/// # Errors
/// Returns the first read, format or write error.
pub fn split_selection<I, P>(
    events: I,
    mode: SplitMode,
    output_dir: P,
) -> Result<Vec<(PathBuf, usize)>>
where
    I: IntoIterator<Item = Result<SelectedEvent>>,
    P: AsRef<Path>,
{
    let output_dir = output_dir.as_ref();
    fs::create_dir_all(output_dir)?;

    let names = mode.sample_names();
    let mut writers: Vec<(PathBuf, JsonLinesWriter<BufWriter<File>>)> = names
        .iter()
        .map(|name| {
            let path = output_dir.join(format!("{name}.jsonl"));
            JsonLinesWriter::create(&path).map(|writer| (path, writer))
        })
        .collect::<Result<_>>()?;

    let mut unlabelled = 0usize;
    for event in events {
        let event = event?;
        let jets = categorize_jets(&event, mode)?;
        unlabelled += event.n_jets() - jets.len();
        for (sample, jet) in jets {
            if let Some(slot) = names.iter().position(|name| *name == sample) {
                writers[slot].1.write(&jet)?;
            }
        }
    }
    if unlabelled > 0 {
        log::debug!("{unlabelled} jets without a {mode:?} category left out");
    }

    writers
        .into_iter()
        .map(|(path, mut writer)| {
            writer.flush()?;
            Ok((path, writer.records()))
        })
        .collect()
}
