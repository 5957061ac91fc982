//! Per-event selection pipeline combining the individual selectors.

use rayon::prelude::*;

use fatjet_core::{Event, Process, Result, SelectedEvent, SelectionConfig};

use crate::association::{associate_candidates_to_jets, map_candidates_to_jet_positions};
use crate::flatten::MassFlattener;
use crate::matching::{
    intersect_indices, match_jets_to_gen_particles, truncate_indices, GenMatchTarget,
};
use crate::selector::{neuron_vector_by_index, select_by_cuts};
use crate::topology::classify_top_jets;

/// Totals of a selection run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SelectionStatistics {
    /// Events read.
    pub events_seen: usize,
    /// Events with at least one kept jet.
    pub events_selected: usize,
    /// Events skipped because a collection was malformed.
    pub events_malformed: usize,
    /// Jets kept over all events.
    pub jets_selected: usize,
}

impl SelectionStatistics {
    fn record(&mut self, outcome: &Result<Option<SelectedEvent>>) {
        self.events_seen += 1;
        match outcome {
            Ok(Some(selected)) => {
                self.events_selected += 1;
                self.jets_selected += selected.n_jets();
            }
            Ok(None) => {}
            Err(_) => self.events_malformed += 1,
        }
    }

    fn merge(mut self, other: Self) -> Self {
        self.events_seen += other.events_seen;
        self.events_selected += other.events_selected;
        self.events_malformed += other.events_malformed;
        self.jets_selected += other.jets_selected;
        self
    }
}

fn leading_jet_passes(event: &Event, config: &SelectionConfig) -> bool {
    match event.jets.pt.first() {
        None => false,
        Some(&pt) => !config.require_leading_jet_pt || pt > config.cuts.pt_min,
    }
}

/// Copies the kept jets' columns and attaches their constituents and
/// neuron vectors.
fn complete_selection(
    event: &Event,
    jet_indices: Vec<usize>,
    top_categories: Option<Vec<i32>>,
    config: &SelectionConfig,
) -> Result<SelectedEvent> {
    let (pf_cand_indices, pf_cand_jet_positions) = match &event.pf_cands {
        Some(cands) => {
            let selected =
                associate_candidates_to_jets(cands, &jet_indices, config.pf_cand_min_pt)?;
            let positions = map_candidates_to_jet_positions(cands, &jet_indices, &selected)?;
            (selected, positions)
        }
        None => (Vec::new(), Vec::new()),
    };

    let neurons = if event.neurons.is_empty() {
        Vec::new()
    } else {
        jet_indices
            .iter()
            .map(|&j| neuron_vector_by_index(&event.neurons, j).to_vec())
            .collect()
    };

    Ok(SelectedEvent {
        event: event.event,
        jets: event.jets.take(&jet_indices),
        jet_tags: event.jet_tags.as_ref().map(|tags| tags.take(&jet_indices)),
        jet_indices,
        top_categories,
        pf_cand_indices,
        pf_cand_jet_positions,
        neurons,
    })
}

/// Runs the standard selection on one event.
///
/// Returns `None` for events that keep no jet: no jets at all, a leading
/// jet below the pt threshold, no jet passing the cuts and (for processes
/// with truth targets) the generator match, or a missing generator record
/// where one is needed.
///
/// # Errors
/// Returns an error if any collection of the event is malformed.
pub fn select_event(
    event: &Event,
    process: Process,
    config: &SelectionConfig,
) -> Result<Option<SelectedEvent>> {
    event.validate()?;
    if !leading_jet_passes(event, config) {
        return Ok(None);
    }

    let jets = &event.jets;
    let mut kept = select_by_cuts(&jets.pt, &jets.eta, &jets.mass, &config.cuts)?;

    let targets = process.match_ids();
    let needs_truth = !targets.is_empty() || process.classifies_top();
    let gen = match (&event.gen_particles, needs_truth) {
        (Some(gen), true) => Some(gen),
        (None, true) => {
            log::debug!("event {} has no generator record, skipped", event.event);
            return Ok(None);
        }
        (_, false) => None,
    };

    if let Some(gen) = gen.filter(|_| !targets.is_empty()) {
        let target = GenMatchTarget::any_of(targets);
        let matched = match_jets_to_gen_particles(jets, gen, &target, config.delta_r_max)?;
        kept = intersect_indices(&matched, &kept);
    }

    if kept.is_empty() {
        return Ok(None);
    }
    let kept = truncate_indices(&kept, config.max_jets);

    let top_categories = match gen {
        Some(gen) if process.classifies_top() => {
            let labels = classify_top_jets(jets, &kept, gen)?;
            Some(kept.iter().map(|&j| labels[j]).collect())
        }
        _ => None,
    };

    complete_selection(event, kept, top_categories, config).map(Some)
}

/// Runs [`select_event`] over `events` in parallel.
///
/// Malformed events are logged and counted, not propagated. Output keeps
/// input order.
///
/// # Errors
/// Returns an error if `config` is invalid.
pub fn select_events(
    events: &[Event],
    process: Process,
    config: &SelectionConfig,
) -> Result<(Vec<SelectedEvent>, SelectionStatistics)> {
    config.validate()?;

    let outcomes: Vec<_> = events
        .par_iter()
        .map(|event| select_event(event, process, config))
        .collect();

    let (selected, stats) = collect_outcomes(events, outcomes);
    log::debug!(
        "{}: {} of {} events selected, {} jets",
        process,
        stats.events_selected,
        stats.events_seen,
        stats.jets_selected
    );
    Ok((selected, stats))
}

fn collect_outcomes(
    events: &[Event],
    outcomes: Vec<Result<Option<SelectedEvent>>>,
) -> (Vec<SelectedEvent>, SelectionStatistics) {
    let mut stats = SelectionStatistics::default();
    let mut selected = Vec::with_capacity(outcomes.len());
    for (event, outcome) in events.iter().zip(outcomes) {
        stats.record(&outcome);
        match outcome {
            Ok(Some(result)) => selected.push(result),
            Ok(None) => {}
            Err(e) => log::warn!("event {} skipped: {e}", event.event),
        }
    }
    (selected, stats)
}

/// Flat-mass selection of one event through a shared flattener.
///
/// Jets are not truncated and no truth matching is applied.
///
/// # Errors
/// Returns an error if any collection of the event is malformed.
pub fn select_event_flat_mass(
    event: &Event,
    flattener: &mut MassFlattener,
    config: &SelectionConfig,
) -> Result<Option<SelectedEvent>> {
    event.validate()?;
    if !leading_jet_passes(event, config) {
        return Ok(None);
    }

    let jets = &event.jets;
    let max_per_bin = flattener.max_per_bin();
    let kept = flattener.select_flat_in_mass(
        &jets.pt,
        &jets.eta,
        &jets.mass,
        &config.cuts,
        max_per_bin,
    )?;
    if kept.is_empty() {
        return Ok(None);
    }
    complete_selection(event, kept, None, config).map(Some)
}

/// Runs [`select_event_flat_mass`] over `events` in order.
///
/// Acceptance depends on every earlier event, so this runs sequentially.
///
/// # Errors
/// Returns an error if `config` is invalid.
pub fn select_events_flat_mass(
    events: &[Event],
    flattener: &mut MassFlattener,
    config: &SelectionConfig,
) -> Result<(Vec<SelectedEvent>, SelectionStatistics)> {
    config.validate()?;

    let outcomes: Vec<_> = events
        .iter()
        .map(|event| select_event_flat_mass(event, flattener, config))
        .collect();

    let (selected, stats) = collect_outcomes(events, outcomes);
    let flat = flattener.statistics();
    log::debug!(
        "flat mass: {} of {} candidate jets accepted, {} rejected by the cap",
        flat.accepted,
        flat.candidates,
        flat.rejected
    );
    Ok((selected, stats))
}

/// Sums the statistics of several runs.
#[must_use]
pub fn merge_statistics<I>(runs: I) -> SelectionStatistics
where
    I: IntoIterator<Item = SelectionStatistics>,
{
    runs.into_iter()
        .fold(SelectionStatistics::default(), SelectionStatistics::merge)
}

#[cfg(test)]
mod tests {
    use super::*;
    use fatjet_core::pdg::GenStatusFlags;
    use fatjet_core::{
        FlatMassConfig, GenParticleBatch, JetTagBatch, JetTags, PfCandAssociation, TopCategory,
    };

    const LAST: i32 = GenStatusFlags::IS_LAST_COPY;

    fn event_with_jets(number: u64, jets: &[(f32, f32, f32, f32)]) -> Event {
        let mut event = Event {
            event: number,
            ..Event::default()
        };
        for &(pt, eta, phi, mass) in jets {
            event.jets.push(pt, eta, phi, mass);
        }
        event
    }

    #[test]
    fn test_leading_jet_gate() {
        let config = SelectionConfig::default();
        let event = event_with_jets(1, &[(150.0, 0.0, 0.0, 80.0), (400.0, 0.0, 1.0, 80.0)]);
        assert_eq!(select_event(&event, Process::Qcd, &config).unwrap(), None);

        let empty = Event::default();
        assert_eq!(select_event(&empty, Process::Qcd, &config).unwrap(), None);
    }

    #[test]
    fn test_qcd_keeps_two_leading_passing_jets() {
        let config = SelectionConfig::default();
        let event = event_with_jets(
            3,
            &[
                (500.0, 0.1, 0.0, 90.0),
                (400.0, 3.0, 1.0, 90.0),
                (300.0, 0.5, 2.0, 60.0),
                (250.0, -0.5, -2.0, 70.0),
            ],
        );
        let selected = select_event(&event, Process::Qcd, &config).unwrap().unwrap();
        assert_eq!(selected.event, 3);
        assert_eq!(selected.jet_indices, vec![0, 2]);
        assert_eq!(selected.top_categories, None);
        assert!(selected.pf_cand_indices.is_empty());
    }

    #[test]
    fn test_matched_process_requires_truth() {
        let config = SelectionConfig::default();
        let mut event = event_with_jets(1, &[(500.0, 0.0, 0.0, 125.0), (450.0, 1.5, 3.0, 120.0)]);
        assert_eq!(select_event(&event, Process::Hbb, &config).unwrap(), None);

        let mut gen = GenParticleBatch::default();
        gen.push(25, LAST, 1.4, 3.1, None);
        event.gen_particles = Some(gen);
        let selected = select_event(&event, Process::Hbb, &config).unwrap().unwrap();
        assert_eq!(selected.jet_indices, vec![1]);
    }

    #[test]
    fn test_top_sample_is_labelled() {
        let config = SelectionConfig::default();
        let mut event = event_with_jets(9, &[(600.0, 0.0, 0.0, 175.0), (500.0, 0.0, 3.0, 60.0)]);
        let mut gen = GenParticleBatch::default();
        gen.push(6, LAST, 0.0, 0.0, None);
        gen.push(5, LAST, 0.3, 0.1, Some(0));
        gen.push(24, LAST, -0.1, 0.0, Some(0));
        gen.push(2, LAST, -0.3, 0.2, Some(2));
        gen.push(-1, LAST, -0.2, -0.3, Some(2));
        event.gen_particles = Some(gen);

        let selected = select_event(&event, Process::TTto4Q, &config).unwrap().unwrap();
        assert_eq!(selected.jet_indices, vec![0, 1]);
        assert_eq!(
            selected.top_categories,
            Some(vec![TopCategory::Bqq.label(), TopCategory::Other.label()])
        );
    }

    #[test]
    fn test_constituents_and_neurons_follow_kept_jets() {
        let config = SelectionConfig::default();
        let mut event = event_with_jets(
            2,
            &[
                (500.0, 0.0, 0.0, 90.0),
                (400.0, 0.0, 1.0, 10.0),
                (300.0, 0.0, 2.0, 90.0),
            ],
        );
        let mut cands = PfCandAssociation::default();
        cands.push(0, 0, 5.0);
        cands.push(1, 1, 5.0);
        cands.push(2, 2, 5.0);
        cands.push(2, 3, 5.0);
        event.pf_cands = Some(cands);
        event.neurons = vec![vec![0.0, 1.0], vec![2.0, 3.0], vec![4.0, 5.0]];

        let selected = select_event(&event, Process::Data, &config).unwrap().unwrap();
        assert_eq!(selected.jet_indices, vec![0, 2]);
        assert_eq!(selected.pf_cand_indices, vec![0, 2, 3]);
        assert_eq!(selected.pf_cand_jet_positions, vec![0, 1, 1]);
        assert_eq!(selected.neurons, vec![vec![0.0, 1.0], vec![4.0, 5.0]]);
    }

    #[test]
    fn test_kept_jet_columns_follow_selection() {
        let config = SelectionConfig::default();
        let mut event = event_with_jets(
            4,
            &[
                (500.0, 0.1, 0.0, 90.0),
                (400.0, 0.2, 1.0, 10.0),
                (300.0, 0.3, 2.0, 120.0),
            ],
        );
        let mut tags = JetTagBatch::default();
        for (flavour, score) in [(5, 0.2), (0, 0.5), (4, 0.7)] {
            tags.push(JetTags {
                hadron_flavour: flavour,
                particle_net_qcd: score,
                ..JetTags::default()
            });
        }
        event.jet_tags = Some(tags);

        let selected = select_event(&event, Process::Qcd, &config).unwrap().unwrap();
        assert_eq!(selected.jet_indices, vec![0, 2]);
        assert_eq!(selected.jets.pt, vec![500.0, 300.0]);
        assert_eq!(selected.jets.mass, vec![90.0, 120.0]);
        let kept_tags = selected.jet_tags.unwrap();
        assert_eq!(kept_tags.hadron_flavour, vec![5, 4]);
        assert_eq!(kept_tags.particle_net_qcd, vec![0.2, 0.7]);

        let untagged = event_with_jets(5, &[(500.0, 0.0, 0.0, 90.0)]);
        let selected = select_event(&untagged, Process::Qcd, &config).unwrap().unwrap();
        assert_eq!(selected.jets.len(), 1);
        assert_eq!(selected.jet_tags, None);
    }

    #[test]
    fn test_select_events_counts_malformed() {
        let config = SelectionConfig::default();
        let good = event_with_jets(1, &[(500.0, 0.0, 0.0, 90.0)]);
        let rejected = event_with_jets(2, &[(100.0, 0.0, 0.0, 90.0)]);
        let mut malformed = event_with_jets(3, &[(500.0, 0.0, 0.0, 90.0)]);
        malformed.jets.mass.clear();

        let (selected, stats) =
            select_events(&[good, rejected, malformed], Process::Qcd, &config).unwrap();
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].event, 1);
        assert_eq!(
            stats,
            SelectionStatistics {
                events_seen: 3,
                events_selected: 1,
                events_malformed: 1,
                jets_selected: 1,
            }
        );
    }

    #[test]
    fn test_flat_mass_pipeline_caps_bins() {
        let config = SelectionConfig::default();
        let mut flattener = MassFlattener::new(FlatMassConfig::default(), config.cuts, 1).unwrap();
        let events: Vec<Event> = (0..4)
            .map(|i| event_with_jets(i, &[(500.0, 0.0, 0.0, 81.0), (400.0, 0.0, 2.0, 300.0)]))
            .collect();

        let (selected, stats) = select_events_flat_mass(&events, &mut flattener, &config).unwrap();
        assert_eq!(selected.len(), 4);
        assert_eq!(selected[0].jet_indices, vec![0, 1]);
        assert!(selected[1..].iter().all(|s| s.jet_indices == vec![1]));
        assert_eq!(stats.jets_selected, 5);
        assert_eq!(flattener.histogram().overflow(), 4);
    }

    #[test]
    fn test_merge_statistics() {
        let run = SelectionStatistics {
            events_seen: 2,
            events_selected: 1,
            events_malformed: 0,
            jets_selected: 2,
        };
        let total = merge_statistics([run, run]);
        assert_eq!(total.events_seen, 4);
        assert_eq!(total.jets_selected, 4);
    }
}
