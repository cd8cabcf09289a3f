// crates/cupo_algo/src/lib.rs
//! Pure allocation arithmetic. Everything here is side-effect free and
//! deterministic; the orchestration (and all mutation) lives in
//! `cupo_engine`.

#![forbid(unsafe_code)]
#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

// File modules (actual implementations)
pub mod quota;
pub mod classify;
pub mod ranking;

// Tight, explicit re-exports (avoid wildcard export drift).
pub use classify::{classify, eligible_candidates, fallback_bucket_name};
pub use quota::{distribute, effective_segments};
pub use ranking::{rank, select_top};
