//! Deterministic ranking and boundary-tie selection.
//!
//! Contract:
//! - `rank`: stable total order — score desc, id asc (optionally preceded
//!   by priority tier asc). Independent of input order.
//! - `select_top`: take the `k` best from an already-ranked pool. When the
//!   cut would split a score-tied group, the tie policy decides:
//!     * `IdAscending` — keep the primary order (id asc already breaks the
//!       tie fully);
//!     * `SecondaryCriteria` — re-order the tied group by vulnerability
//!       tier asc, then enrollment timestamp asc, and resolve any residue
//!       of indistinguishable candidates with uniform seeded picks.
//!
//! No RNG is touched unless a residue actually exists, so runs with clean
//! cuts are identical across tie policies.

use alloc::vec::Vec;
use core::cmp::Ordering;

use cupo_core::determinism::{cmp_by_secondary, cmp_for};
use cupo_core::entities::Candidate;
use cupo_core::policy::{RankOrder, TieBreakPolicy};
use cupo_core::rng::TieRng;

/// Sort a pool of candidate indices into the deterministic total order.
pub fn rank(candidates: &[Candidate], pool: &mut Vec<usize>, order: RankOrder) {
    pool.sort_by(|&a, &b| cmp_for(order, &candidates[a], &candidates[b]));
}

/// Select the top `k` indices from `ranked` (already sorted by `rank`).
/// Selection order is preserved in the returned vector.
pub fn select_top(
    candidates: &[Candidate],
    ranked: &[usize],
    k: usize,
    tie_break: TieBreakPolicy,
    rng: &mut TieRng,
) -> Vec<usize> {
    if k >= ranked.len() {
        return ranked.to_vec();
    }
    if k == 0 {
        return Vec::new();
    }

    let boundary = candidates[ranked[k - 1]].score;
    if candidates[ranked[k]].score != boundary {
        // clean cut, no tied group split
        return ranked[..k].to_vec();
    }

    match tie_break {
        TieBreakPolicy::IdAscending => ranked[..k].to_vec(),
        TieBreakPolicy::SecondaryCriteria => {
            // the whole group sharing the boundary score
            let start = ranked
                .iter()
                .position(|&i| candidates[i].score == boundary)
                .unwrap_or(0);
            let end = ranked
                .iter()
                .rposition(|&i| candidates[i].score == boundary)
                .map(|p| p + 1)
                .unwrap_or(ranked.len());

            let mut selected: Vec<usize> = ranked[..start].to_vec();
            let slots = k - start;

            let mut group: Vec<usize> = ranked[start..end].to_vec();
            // stable: equal secondary keys keep the primary (id asc) order
            group.sort_by(|&a, &b| cmp_by_secondary(&candidates[a], &candidates[b]));

            let residue = cmp_by_secondary(
                &candidates[group[slots - 1]],
                &candidates[group[slots]],
            ) == Ordering::Equal;

            if !residue {
                selected.extend_from_slice(&group[..slots]);
                return selected;
            }

            // sub-group of candidates indistinguishable from the cut element
            let sub_start = group
                .iter()
                .position(|&i| {
                    cmp_by_secondary(&candidates[i], &candidates[group[slots - 1]])
                        == Ordering::Equal
                })
                .unwrap_or(0);
            let sub_end = group
                .iter()
                .rposition(|&i| {
                    cmp_by_secondary(&candidates[i], &candidates[group[slots - 1]])
                        == Ordering::Equal
                })
                .map(|p| p + 1)
                .unwrap_or(group.len());

            selected.extend_from_slice(&group[..sub_start]);
            let mut pool: Vec<usize> = group[sub_start..sub_end].to_vec();
            let mut need = slots - sub_start;
            while need > 0 {
                let pick = rng.pick(pool.len()).expect("residue pool is non-empty");
                selected.push(pool.swap_remove(pick));
                need -= 1;
            }
            selected
        }
    }
}
