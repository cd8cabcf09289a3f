//! The per-program allocation state machine.
//!
//! Order of operations (fixed):
//! 1. Precondition — zero Available seats yields an empty result, not an
//!    error.
//! 2. Invariant scan — an Applied candidate already holding a seat, or an
//!    Available seat with an occupant, aborts loudly.
//! 3. Distribute quotas from `program.offer` over the effective segments.
//! 4. Classify eligible candidates into buckets; rank each bucket.
//! 5. Segment pass in priority order: `min(quota, pool, seats left)` per
//!    segment, seats consumed in ordinal order. Unfilled quota is not
//!    reserved — it carries forward.
//! 6. Backfill: union of unassigned eligible candidates, re-ranked
//!    globally, fills whatever is left.
//!
//! Given an identical snapshot, repeated invocation produces an identical
//! result; a run on the mutated output of a prior run is a no-op.

use std::collections::BTreeSet;

use cupo_algo::{
    classify, distribute, effective_segments, eligible_candidates, fallback_bucket_name, rank,
    select_top,
};
use cupo_core::entities::{Candidate, Program};
use cupo_core::ids::{CandidateId, SegmentName};
use cupo_core::policy::AllocationPolicy;
use cupo_core::rng::tie_rng_from_seed;

use crate::result::{AllocationResult, Assignment};
use crate::AllocError;

pub fn allocate(
    program: &mut Program,
    candidates: &mut [Candidate],
    policy: &AllocationPolicy,
) -> Result<AllocationResult, AllocError> {
    let available = program.available_seats();
    if available.is_empty() {
        return Ok(AllocationResult::empty(program.id.clone()));
    }

    check_invariants(program, candidates)?;

    let segments = effective_segments(&program.segments);
    let quotas = distribute(program.offer, &program.segments, policy.remainder);

    let eligible = eligible_candidates(program, candidates);
    let mut buckets = classify(candidates, &eligible, &segments, policy.unmatched);
    for pool in buckets.values_mut() {
        rank(candidates, pool, policy.rank_order);
    }

    let mut rng = tie_rng_from_seed(policy.tie_seed);
    let mut assignments: Vec<Assignment> = Vec::new();
    let mut cursor = 0usize;

    // segment pass
    for seg in &segments {
        if cursor >= available.len() {
            break;
        }
        let quota = quotas.get(&seg.name).copied().unwrap_or(0) as usize;
        if quota == 0 {
            continue;
        }
        let pool = match buckets.get(&seg.name) {
            Some(p) if !p.is_empty() => p.clone(),
            _ => continue,
        };
        let take = quota.min(pool.len()).min(available.len() - cursor);
        let selected = select_top(candidates, &pool, take, policy.tie_break, &mut rng);
        for &ci in &selected {
            place(program, candidates, &available, &mut cursor, ci, seg.name.clone(), &mut assignments)?;
        }
        if let Some(bucket) = buckets.get_mut(&seg.name) {
            bucket.retain(|i| !selected.contains(i));
        }
    }

    // backfill
    if cursor < available.len() {
        let mut leftover: Vec<usize> = buckets
            .values()
            .flatten()
            .copied()
            .filter(|&i| candidates[i].is_applied())
            .collect();
        rank(candidates, &mut leftover, policy.rank_order);

        let take = leftover.len().min(available.len() - cursor);
        if take > 0 {
            let label = fallback_bucket_name(&segments);
            let selected = select_top(candidates, &leftover, take, policy.tie_break, &mut rng);
            for &ci in &selected {
                place(program, candidates, &available, &mut cursor, ci, label.clone(), &mut assignments)?;
            }
        }
    }

    Ok(AllocationResult {
        program_id: program.id.clone(),
        assignments,
        seats_remaining: (available.len() - cursor) as u32,
    })
}

/// Hand the next available seat to candidate `ci` and record the assignment.
fn place(
    program: &mut Program,
    candidates: &mut [Candidate],
    available: &[usize],
    cursor: &mut usize,
    ci: usize,
    segment: SegmentName,
    out: &mut Vec<Assignment>,
) -> Result<(), AllocError> {
    let seat = &mut program.seats[available[*cursor]];
    seat.assign(candidates[ci].id.clone()).map_err(AllocError::SeatTransition)?;
    candidates[ci].assign_to(program.id.clone());
    out.push(Assignment {
        seat_id: seat.id.clone(),
        candidate_id: candidates[ci].id.clone(),
        segment,
        score: candidates[ci].score,
    });
    *cursor += 1;
    Ok(())
}

/// Structural checks that distinguish caller bugs from messy input data.
fn check_invariants(program: &Program, candidates: &[Candidate]) -> Result<(), AllocError> {
    for seat in &program.seats {
        if seat.is_available() {
            if let Some(occupant) = &seat.occupant {
                return Err(AllocError::SeatOccupancyInconsistent {
                    seat: seat.id.clone(),
                    occupant: occupant.clone(),
                });
            }
        }
    }

    let held: BTreeSet<&CandidateId> = program
        .seats
        .iter()
        .filter(|s| !s.is_available())
        .filter_map(|s| s.occupant.as_ref())
        .collect();

    for c in candidates {
        if !c.is_applied() {
            continue;
        }
        if let Some(p) = &c.assigned_program {
            return Err(AllocError::CandidateAlreadyHolding {
                candidate: c.id.clone(),
                program: p.clone(),
            });
        }
        if held.contains(&c.id) {
            return Err(AllocError::CandidateAlreadyHolding {
                candidate: c.id.clone(),
                program: program.id.clone(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cupo_core::domain::{Pct, Score};
    use cupo_core::entities::{Segment, GENERAL_POPULATION};

    fn cand(id: &str, score: f64) -> Candidate {
        Candidate::new(id.parse().unwrap(), Score::from_f64(score))
    }

    #[test]
    fn full_program_returns_empty_result() {
        let mut p = Program::new("001".parse().unwrap(), "Software", 1);
        p.seats[0].assign("X".parse().unwrap()).unwrap();
        let mut cands = [cand("A", 90.0)];
        let res = allocate(&mut p, &mut cands, &AllocationPolicy::default()).unwrap();
        assert!(res.is_empty());
        assert_eq!(res.seats_remaining, 0);
    }

    #[test]
    fn empty_pool_leaves_all_seats_available() {
        let mut p = Program::new("001".parse().unwrap(), "Software", 4);
        let res = allocate(&mut p, &mut [], &AllocationPolicy::default()).unwrap();
        assert!(res.is_empty());
        assert_eq!(res.seats_remaining, 4);
        assert_eq!(p.available_seats().len(), 4);
    }

    #[test]
    fn applied_candidate_holding_a_seat_fails_loudly() {
        let mut p = Program::new("001".parse().unwrap(), "Software", 2);
        let mut c = cand("A", 90.0);
        c.assigned_program = Some("002".parse().unwrap());
        let err = allocate(&mut p, &mut [c], &AllocationPolicy::default()).unwrap_err();
        assert!(matches!(err, AllocError::CandidateAlreadyHolding { .. }));
    }

    #[test]
    fn available_seat_with_occupant_fails_loudly() {
        let mut p = Program::new("001".parse().unwrap(), "Software", 2);
        p.seats[0].occupant = Some("ghost".parse().unwrap());
        let err = allocate(&mut p, &mut [cand("A", 1.0)], &AllocationPolicy::default()).unwrap_err();
        assert!(matches!(err, AllocError::SeatOccupancyInconsistent { .. }));
    }

    #[test]
    fn no_segments_degrades_to_general_population_at_full_offer() {
        let mut p = Program::new("001".parse().unwrap(), "Software", 3);
        let mut cands = [cand("A", 70.0), cand("B", 90.0)];
        let res = allocate(&mut p, &mut cands, &AllocationPolicy::default()).unwrap();
        assert_eq!(res.len(), 2);
        assert_eq!(res.assignments[0].candidate_id.as_str(), "B");
        assert_eq!(res.assignments[0].segment.as_str(), GENERAL_POPULATION);
        assert_eq!(res.seats_remaining, 1);
    }

    #[test]
    fn zero_quota_segments_still_reach_backfill() {
        let mut p = Program::new("001".parse().unwrap(), "Software", 2);
        p.add_segment(Segment::new("Cuotas", Pct::from_percent_f64(0.0), 1)).unwrap();
        p.add_segment(Segment::new("Población general", Pct::from_percent_f64(100.0), 2)).unwrap();
        let mut c = cand("A", 50.0);
        c.segments = vec!["Cuotas".into()];
        c.quota_policy = true;
        let res = allocate(&mut p, &mut [c], &AllocationPolicy::default()).unwrap();
        // the Cuotas bucket got no quota, but its candidate backfills
        assert_eq!(res.len(), 1);
        assert_eq!(res.assignments[0].segment.as_str(), "Población general");
    }
}
