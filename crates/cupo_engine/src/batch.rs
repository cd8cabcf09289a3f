//! Sequential multi-program driver.
//!
//! The engine requires exclusive single-writer access to a Program and its
//! candidate pool for the duration of one `allocate` call; this driver
//! satisfies that by running programs strictly in order and by partitioning
//! the shared candidate pool by `program_applied` before each run.
//! Candidates assigned by an earlier program leave the Applied state and are
//! therefore invisible to later programs, preserving at-most-one-seat.

use cupo_core::entities::{Candidate, Program};
use cupo_core::ids::norm_text;
use cupo_core::policy::AllocationPolicy;

use crate::allocate::allocate;
use crate::result::AllocationResult;
use crate::AllocError;

/// A candidate with no declared program is offered to every program
/// (missing fields degrade to "no filter applied").
fn applies_to(program: &Program, candidate: &Candidate) -> bool {
    match candidate.program_applied.as_deref() {
        None => true,
        Some(s) if s.trim().is_empty() => true,
        Some(s) => {
            let n = norm_text(s);
            n == norm_text(program.id.as_str()) || n == norm_text(&program.name)
        }
    }
}

/// Run `allocate` for every program over a shared candidate pool.
pub fn allocate_all(
    programs: &mut [Program],
    candidates: &mut [Candidate],
    policy: &AllocationPolicy,
) -> Result<Vec<AllocationResult>, AllocError> {
    let mut results = Vec::with_capacity(programs.len());
    for program in programs.iter_mut() {
        let idx: Vec<usize> = candidates
            .iter()
            .enumerate()
            .filter_map(|(i, c)| applies_to(program, c).then_some(i))
            .collect();

        let mut pool: Vec<Candidate> = idx.iter().map(|&i| candidates[i].clone()).collect();
        let result = allocate(program, &mut pool, policy)?;

        // propagate the documented state transitions back into the shared pool
        for (slot, &i) in idx.iter().enumerate() {
            candidates[i] = pool[slot].clone();
        }
        results.push(result);
    }
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cupo_core::domain::Score;
    use cupo_core::entities::CandidateState;

    fn cand(id: &str, score: f64, program: Option<&str>) -> Candidate {
        let mut c = Candidate::new(id.parse().unwrap(), Score::from_f64(score));
        c.program_applied = program.map(Into::into);
        c
    }

    #[test]
    fn shared_pool_candidate_gets_at_most_one_seat() {
        let mut programs = [
            Program::new("001".parse().unwrap(), "Software", 1),
            Program::new("002".parse().unwrap(), "Diseño", 1),
        ];
        // applies everywhere (no declared program)
        let mut cands = vec![cand("A", 90.0, None), cand("B", 80.0, None)];

        let results =
            allocate_all(&mut programs, &mut cands, &AllocationPolicy::default()).unwrap();
        assert_eq!(results[0].len(), 1);
        assert_eq!(results[0].assignments[0].candidate_id.as_str(), "A");
        // A already left the Applied state; program 002 takes B
        assert_eq!(results[1].assignments[0].candidate_id.as_str(), "B");
        assert!(cands.iter().all(|c| c.state == CandidateState::Assigned));
    }

    #[test]
    fn partition_matches_program_by_id_or_name() {
        let mut programs = [
            Program::new("001".parse().unwrap(), "Software", 2),
            Program::new("002".parse().unwrap(), "Diseño", 2),
        ];
        let mut cands = vec![
            cand("A", 90.0, Some("software ")), // name, case/space-insensitive
            cand("B", 80.0, Some("002")),       // id
            cand("C", 70.0, Some("Medicina")),  // applies to neither
        ];
        let results =
            allocate_all(&mut programs, &mut cands, &AllocationPolicy::default()).unwrap();
        assert_eq!(results[0].assignments[0].candidate_id.as_str(), "A");
        assert_eq!(results[1].assignments[0].candidate_id.as_str(), "B");
        assert_eq!(cands[2].state, CandidateState::Applied);
    }

    #[test]
    fn corrupted_pool_stops_the_batch() {
        let mut programs = [Program::new("001".parse().unwrap(), "Software", 1)];
        let mut broken = cand("A", 90.0, None);
        broken.assigned_program = Some("009".parse().unwrap()); // Applied yet holding
        let err = allocate_all(&mut programs, &mut [broken], &AllocationPolicy::default())
            .unwrap_err();
        assert!(matches!(err, AllocError::CandidateAlreadyHolding { .. }));
    }
}
