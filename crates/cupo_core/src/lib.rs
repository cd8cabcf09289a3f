//! cupo_core — Core types, domains, ordering helpers, and deterministic RNG.
//!
//! This crate is **I/O-free**. It defines stable types/APIs used across the
//! engine (`cupo_io`, `cupo_algo`, `cupo_engine`, `cupo_report`, `cupo_cli`).
//!
//! - Registry tokens: `CandidateId`, `ProgramId`, `SeatId`, `SegmentName`
//! - Integer-first numerics: `Pct` (tenths of a percent), `Score` (thousandths)
//! - Entities: `Candidate`, `Segment`, `Seat`, `Program` and lifecycle enums
//! - Policy domains: `AllocationPolicy` and its variant enums
//! - Deterministic ordering helpers
//! - Seedable RNG (ChaCha20) for **ties only**
//!
//! Serialization derives are gated behind the `serde` feature.

#![forbid(unsafe_code)]
#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod errors;
pub mod ids;
pub mod domain;
pub mod entities;
pub mod policy;
pub mod determinism;
pub mod rng;

// Commonly used items (stable symbols used across the workspace)
pub use errors::CoreError;
pub use ids::{CandidateId, ProgramId, SeatId, SegmentName};
pub use domain::{Pct, Score};
pub use entities::{
    Candidate, CandidateState, Program, ProgramError, Seat, SeatState, Segment, SegmentCriteria,
    GENERAL_POPULATION,
};
pub use policy::{
    AllocationPolicy, RankOrder, RemainderPolicy, TieBreakPolicy, UnmatchedPolicy,
    DEFAULT_TIE_SEED,
};
pub use rng::{tie_rng_from_seed, TieRng};
