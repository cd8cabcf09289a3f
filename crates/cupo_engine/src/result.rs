//! Serializable outputs of one allocation run.
//!
//! `AllocationResult` is ephemeral — the engine never persists it. `cupo_io`
//! turns it into timestamped assignment records and a digest.

use serde::{Deserialize, Serialize};

use cupo_core::domain::Score;
use cupo_core::ids::{CandidateId, ProgramId, SeatId, SegmentName};

/// One seat handed to one candidate, tagged with the quota bucket consumed.
/// Backfill assignments carry the general-population label.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    pub seat_id: SeatId,
    pub candidate_id: CandidateId,
    pub segment: SegmentName,
    pub score: Score,
}

/// Candidates newly transitioned to Assigned in one `allocate` run, in
/// assignment order (segment pass first, then backfill).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AllocationResult {
    pub program_id: ProgramId,
    pub assignments: Vec<Assignment>,
    /// Seats still Available after the backfill pass.
    pub seats_remaining: u32,
}

impl AllocationResult {
    pub fn empty(program_id: ProgramId) -> Self {
        AllocationResult { program_id, assignments: Vec::new(), seats_remaining: 0 }
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    pub fn len(&self) -> usize {
        self.assignments.len()
    }
}
