//! PF candidate to jet association.
//!
//! The association table links constituent candidates to the raw index of
//! the jet that owns them. These helpers restrict the table to the selected
//! jets and re-express each candidate's owner as a position in the selected
//! jet list, which is how downstream per-jet arrays are laid out.

use std::collections::{HashMap, HashSet};

use fatjet_core::{PfCandAssociation, Result};

/// Candidates owned by one of `selected_jets` with `pt > min_pt`.
///
/// Output follows the table's row order, not grouped by jet. Rows with a
/// negative candidate index are skipped.
///
/// # Errors
/// Returns an error if the table columns disagree in length.
pub fn associate_candidates_to_jets(
    cands: &PfCandAssociation,
    selected_jets: &[usize],
    min_pt: f32,
) -> Result<Vec<usize>> {
    cands.validate()?;

    let selected: HashSet<usize> = selected_jets.iter().copied().collect();
    let result = cands
        .jet_idx
        .iter()
        .zip(&cands.cand_idx)
        .zip(&cands.pt)
        .filter(|&((&jet, _), &pt)| {
            pt > min_pt && usize::try_from(jet).is_ok_and(|jet| selected.contains(&jet))
        })
        .filter_map(|((_, &cand), _)| usize::try_from(cand).ok())
        .collect::<Vec<_>>();

    log::trace!(
        "{} of {} candidates associated to {} jets",
        result.len(),
        cands.len(),
        selected_jets.len()
    );
    Ok(result)
}

/// Position in `selected_jets` of the jet owning each selected candidate.
///
/// One slot per entry of `selected_cands`. A slot is `None` when the
/// candidate is absent from the table or its owner was not selected. The
/// first table row for a candidate and the first occurrence of a jet in
/// `selected_jets` win.
///
/// # Errors
/// Returns an error if the table columns disagree in length.
pub fn jet_position_slots(
    cands: &PfCandAssociation,
    selected_jets: &[usize],
    selected_cands: &[usize],
) -> Result<Vec<Option<usize>>> {
    cands.validate()?;

    let mut owner_of: HashMap<usize, i32> = HashMap::with_capacity(cands.len());
    for (&cand, &jet) in cands.cand_idx.iter().zip(&cands.jet_idx) {
        if let Ok(cand) = usize::try_from(cand) {
            owner_of.entry(cand).or_insert(jet);
        }
    }

    let mut position_of: HashMap<usize, usize> = HashMap::with_capacity(selected_jets.len());
    for (position, &jet) in selected_jets.iter().enumerate() {
        position_of.entry(jet).or_insert(position);
    }

    Ok(selected_cands
        .iter()
        .map(|cand| {
            let jet = usize::try_from(*owner_of.get(cand)?).ok()?;
            position_of.get(&jet).copied()
        })
        .collect())
}

/// Like [`jet_position_slots`], with unresolved slots omitted.
///
/// The output is shorter than `selected_cands` whenever a lookup fails; it
/// is never padded.
///
/// # Errors
/// Returns an error if the table columns disagree in length.
pub fn map_candidates_to_jet_positions(
    cands: &PfCandAssociation,
    selected_jets: &[usize],
    selected_cands: &[usize],
) -> Result<Vec<usize>> {
    let slots = jet_position_slots(cands, selected_jets, selected_cands)?;
    let missed = slots.iter().filter(|slot| slot.is_none()).count();
    if missed > 0 {
        log::debug!("{missed} candidates could not be mapped to a selected jet");
    }
    Ok(slots.into_iter().flatten().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use fatjet_core::Error;

    fn table() -> PfCandAssociation {
        let mut cands = PfCandAssociation::default();
        cands.push(0, 10, 5.0);
        cands.push(1, 11, 0.5);
        cands.push(2, 12, 7.0);
        cands.push(1, 13, 2.0);
        cands.push(0, 14, 1.0);
        cands
    }

    #[test]
    fn test_associate_scan_order() {
        let cands = table();
        let result = associate_candidates_to_jets(&cands, &[1, 0], 0.9).unwrap();
        assert_eq!(result, vec![10, 13, 14]);
    }

    #[test]
    fn test_associate_pt_is_strict() {
        let cands = table();
        let result = associate_candidates_to_jets(&cands, &[0], 1.0).unwrap();
        assert_eq!(result, vec![10]);
    }

    #[test]
    fn test_associate_no_selected_jets() {
        let cands = table();
        assert!(associate_candidates_to_jets(&cands, &[], 0.0)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_associate_rejects_ragged_table() {
        let mut cands = table();
        cands.pt.pop();
        assert!(matches!(
            associate_candidates_to_jets(&cands, &[0], 0.0),
            Err(Error::LengthMismatch { .. })
        ));
    }

    #[test]
    fn test_map_positions() {
        let cands = table();
        let positions = map_candidates_to_jet_positions(&cands, &[2, 0], &[12, 10, 14]).unwrap();
        assert_eq!(positions, vec![0, 1, 1]);
    }

    #[test]
    fn test_map_positions_skips_misses() {
        let cands = table();
        // 99 is not in the table, 11 belongs to jet 1 which is not selected.
        let slots = jet_position_slots(&cands, &[0, 2], &[99, 10, 11, 12]).unwrap();
        assert_eq!(slots, vec![None, Some(0), None, Some(1)]);

        let positions =
            map_candidates_to_jet_positions(&cands, &[0, 2], &[99, 10, 11, 12]).unwrap();
        assert_eq!(positions, vec![0, 1]);
    }

    #[test]
    fn test_map_positions_first_row_wins() {
        let mut cands = table();
        cands.push(2, 10, 3.0);
        let positions = map_candidates_to_jet_positions(&cands, &[2, 0], &[10]).unwrap();
        assert_eq!(positions, vec![1]);
    }
}
