//! cupo_io — ingestion and persistence boundary.
//!
//! - `records`: loose, alias-tolerant source records → validated core types.
//!   Structure is strict (unknown lifecycle state is an error); data is
//!   permissive (missing scores, campuses, segments all degrade).
//! - `snapshot`: JSON snapshot loading, seat/assignment record persistence
//!   with atomic write-then-rename.
//! - `hasher`: canonical JSON bytes (sorted keys, LF, UTF-8) and lowercase
//!   SHA-256 digests of emitted artifacts.
//!
//! The engine crates never touch the filesystem; everything that does lives
//! here.

#![forbid(unsafe_code)]

use thiserror::Error;

/// Unified error for cupo_io (records/snapshot/hasher).
#[derive(Debug, Error)]
pub enum IoError {
    /// Filesystem / path errors (open, rename, temp file, etc.)
    #[error("io/path error: {0}")]
    Path(String),

    /// JSON serialization/deserialization errors.
    #[error("json error: {0}")]
    Json(String),

    /// A source record that cannot be normalized (index in source order).
    #[error("record {index}: {msg}")]
    Record { index: usize, msg: String },

    /// Generic validation / invariants.
    #[error("invalid: {0}")]
    Invalid(String),
}

pub type IoResult<T> = Result<T, IoError>;

impl From<std::io::Error> for IoError {
    fn from(e: std::io::Error) -> Self {
        IoError::Path(e.to_string())
    }
}

impl From<serde_json::Error> for IoError {
    fn from(e: serde_json::Error) -> Self {
        IoError::Json(e.to_string())
    }
}

pub mod hasher;
pub mod records;
pub mod snapshot;

/* ---------------- Public prelude ----------------
   Lightweight re-exports so downstream crates can do:
     use cupo_io::prelude::*;
------------------------------------------------- */

pub mod prelude {
    pub use crate::{IoError, IoResult};

    pub use crate::hasher::{canonical_json_bytes, run_digest, sha256_canonical, sha256_hex};
    pub use crate::records::{normalize_candidate, normalize_program, RawCandidate, RawProgram};
    pub use crate::snapshot::{
        apply_seat_records, assignment_records, load_snapshot, seat_records, write_json_atomic,
        AssignmentRecord, SeatRecord, Snapshot,
    };
}
