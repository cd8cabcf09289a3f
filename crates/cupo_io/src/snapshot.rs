//! Snapshot loading and record persistence.
//!
//! A snapshot is one JSON document carrying programs and candidates. On the
//! way out, seat and assignment records use the same flat shapes the
//! surrounding admission system has always persisted, and every write is
//! atomic (temp file in the target directory, then rename).

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use cupo_core::determinism::is_ts_utc_z;
use cupo_core::entities::{Candidate, Program, SeatState};
use cupo_engine::AllocationResult;

use crate::records::{normalize_candidate, normalize_program, RawCandidate, RawProgram};
use crate::{IoError, IoResult};

/// Input document: programs plus the shared candidate pool.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Snapshot {
    #[serde(alias = "carreras", alias = "programs")]
    pub programas: Vec<RawProgram>,
    #[serde(alias = "candidates")]
    pub aspirantes: Vec<RawCandidate>,
}

/// Parse and normalize a snapshot file.
pub fn load_snapshot(path: impl AsRef<Path>) -> IoResult<(Vec<Program>, Vec<Candidate>)> {
    let bytes = fs::read(path.as_ref())?;
    let snap: Snapshot = serde_json::from_slice(&bytes)?;

    let programs = snap
        .programas
        .iter()
        .enumerate()
        .map(|(i, rp)| normalize_program(rp, i))
        .collect::<IoResult<Vec<_>>>()?;
    let candidates = snap
        .aspirantes
        .iter()
        .enumerate()
        .map(|(i, rc)| normalize_candidate(rc, i))
        .collect::<IoResult<Vec<_>>>()?;
    Ok((programs, candidates))
}

/// Flat persisted seat state, one record per seat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeatRecord {
    pub carrera_id: String,
    pub carrera_nombre: String,
    pub id_cupo: String,
    pub estado: SeatState,
    pub aspirante_cedula: String,
}

/// Serialize every seat of every program.
pub fn seat_records(programs: &[Program]) -> Vec<SeatRecord> {
    programs
        .iter()
        .flat_map(|p| {
            p.seats.iter().map(move |s| SeatRecord {
                carrera_id: p.id.to_string(),
                carrera_nombre: p.name.clone(),
                id_cupo: s.id.to_string(),
                estado: s.state,
                aspirante_cedula: s
                    .occupant
                    .as_ref()
                    .map(|c| c.to_string())
                    .unwrap_or_default(),
            })
        })
        .collect()
}

/// Re-apply persisted seat records onto freshly built programs (matched by
/// seat id; records for unknown seats are ignored).
pub fn apply_seat_records(programs: &mut [Program], records: &[SeatRecord]) {
    for program in programs.iter_mut() {
        for seat in program.seats.iter_mut() {
            let id = seat.id.to_string();
            if let Some(rec) = records.iter().find(|r| r.id_cupo == id) {
                seat.state = rec.estado;
                seat.occupant = if rec.aspirante_cedula.is_empty() {
                    None
                } else {
                    rec.aspirante_cedula.parse().ok()
                };
            }
        }
    }
}

/// One persisted assignment: seat, candidate, quota bucket, score, stamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignmentRecord {
    pub id_cupo: String,
    pub aspirante_cedula: String,
    pub segmento: String,
    pub puntaje: f64,
    pub timestamp: String,
}

/// Timestamped records for one run. The engine is clockless; the caller
/// supplies an RFC3339-UTC-"Z" stamp.
pub fn assignment_records(
    result: &AllocationResult,
    timestamp: &str,
) -> IoResult<Vec<AssignmentRecord>> {
    if !is_ts_utc_z(timestamp) {
        return Err(IoError::Invalid(format!(
            "timestamp must be RFC3339 UTC like 2025-08-12T10:00:00Z, got {timestamp:?}"
        )));
    }
    Ok(result
        .assignments
        .iter()
        .map(|a| AssignmentRecord {
            id_cupo: a.seat_id.to_string(),
            aspirante_cedula: a.candidate_id.to_string(),
            segmento: a.segment.to_string(),
            puntaje: a.score.as_f64(),
            timestamp: timestamp.to_string(),
        })
        .collect())
}

/// Serialize `value` as pretty JSON and atomically replace `path`.
pub fn write_json_atomic<T: Serialize>(path: impl AsRef<Path>, value: &T) -> IoResult<()> {
    let path = path.as_ref();
    let dir = path.parent().filter(|d| !d.as_os_str().is_empty());
    if let Some(d) = dir {
        fs::create_dir_all(d)?;
    }
    let mut tmp = tempfile::NamedTempFile::new_in(dir.unwrap_or_else(|| Path::new(".")))?;
    serde_json::to_writer_pretty(&mut tmp, value)?;
    tmp.persist(path).map_err(|e| IoError::Path(e.to_string()))?;
    Ok(())
}
