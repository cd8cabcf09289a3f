//! cupo_engine — deterministic allocation surface
//! (precondition → distribute → classify → rank → segment pass → backfill).
//!
//! This crate stays I/O-free: JSON/digests live in `cupo_io` and the math in
//! `cupo_algo`. The only mutations performed are the documented Candidate and
//! Seat transitions, which is what makes a second run on the same mutated
//! state a no-op.

use thiserror::Error;

use cupo_core::ids::{CandidateId, ProgramId, SeatId};

pub mod allocate;
pub mod batch;
pub mod result;

pub use allocate::allocate;
pub use batch::allocate_all;
pub use result::{AllocationResult, Assignment};

/// Contract violations. Data-quality problems never surface here — they are
/// absorbed by construction-time defaults; these mean a caller bug.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AllocError {
    /// An Applied candidate already holds a seat — reconsidering it could
    /// double-assign silently.
    #[error("candidate {candidate} is Applied but already holds a seat in {program}")]
    CandidateAlreadyHolding {
        candidate: CandidateId,
        program: ProgramId,
    },

    /// A seat claims to be Available while still recording an occupant.
    #[error("seat {seat} is Available but records occupant {occupant}")]
    SeatOccupancyInconsistent {
        seat: SeatId,
        occupant: CandidateId,
    },

    /// A seat transition was rejected mid-run; indicates concurrent mutation
    /// of the Program, which the engine's contract forbids.
    #[error("seat transition rejected: {0}")]
    SeatTransition(cupo_core::CoreError),
}
