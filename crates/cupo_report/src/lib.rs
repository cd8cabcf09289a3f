//! cupo_report — Pure offline report model + JSON renderer.
//!
//! Determinism rules:
//! - No I/O here. Callers supply post-allocation state already in memory.
//! - Percent strings use one-decimal formatting without float arithmetic.
//! - Stable section order and field names.
//!
//! Everything is computed by simple counting over Seat/Candidate
//! post-conditions; the report never re-derives allocation decisions.

#![forbid(unsafe_code)]

use serde::Serialize;

use cupo_core::entities::{Candidate, CandidateState, Program, SeatState};
use cupo_engine::AllocationResult;

// ===== Errors =====
#[derive(Debug)]
pub enum ReportError {
    Serialize(&'static str),
}

// ===== Model =====

#[derive(Clone, Debug, Serialize)]
pub struct ReportModel {
    pub programs: Vec<ProgramSection>,
    pub candidates: CandidateTotals,
}

#[derive(Clone, Debug, Serialize)]
pub struct ProgramSection {
    pub program_id: String,
    pub name: String,
    pub offer: u32,
    pub seats: SeatTotals,
    pub segments: Vec<SegmentRow>,
}

#[derive(Clone, Copy, Debug, Default, Serialize)]
pub struct SeatTotals {
    pub available: u32,
    pub assigned: u32,
    pub accepted: u32,
}

#[derive(Clone, Debug, Serialize)]
pub struct SegmentRow {
    pub name: String,
    /// e.g. "30.0%"
    pub share: String,
    pub priority: u32,
    /// Seats granted under this segment's label in the reported run.
    pub assigned: u32,
}

#[derive(Clone, Copy, Debug, Default, Serialize)]
pub struct CandidateTotals {
    pub applied: u32,
    pub assigned: u32,
    pub accepted: u32,
    pub rejected: u32,
}

// ===== API =====

/// Build the report model from post-allocation state (pure, offline).
pub fn build_model(
    programs: &[Program],
    candidates: &[Candidate],
    results: &[AllocationResult],
) -> ReportModel {
    let programs = programs
        .iter()
        .map(|p| {
            let mut seats = SeatTotals::default();
            for s in &p.seats {
                match s.state {
                    SeatState::Available => seats.available += 1,
                    SeatState::Assigned => seats.assigned += 1,
                    SeatState::Accepted => seats.accepted += 1,
                }
            }

            let result = results.iter().find(|r| r.program_id == p.id);
            let segments = p
                .ordered_segments()
                .into_iter()
                .map(|seg| {
                    let assigned = result
                        .map(|r| {
                            r.assignments.iter().filter(|a| a.segment == seg.name).count() as u32
                        })
                        .unwrap_or(0);
                    SegmentRow {
                        name: seg.name.to_string(),
                        share: pct_one_decimal(seg.percent.as_tenths()),
                        priority: seg.priority,
                        assigned,
                    }
                })
                .collect();

            ProgramSection {
                program_id: p.id.to_string(),
                name: p.name.clone(),
                offer: p.offer,
                seats,
                segments,
            }
        })
        .collect();

    let mut totals = CandidateTotals::default();
    for c in candidates {
        match c.state {
            CandidateState::Applied => totals.applied += 1,
            CandidateState::Assigned => totals.assigned += 1,
            CandidateState::Accepted => totals.accepted += 1,
            CandidateState::Rejected => totals.rejected += 1,
        }
    }

    ReportModel { programs, candidates: totals }
}

/// Serialize the model as JSON (deterministic field order courtesy of
/// struct layout).
pub fn render_json(model: &ReportModel) -> Result<String, ReportError> {
    serde_json::to_string_pretty(model).map_err(|_| ReportError::Serialize("json_serialize"))
}

// ===== Helpers (pure; no floats) =====

/// One-decimal percent string from tenths: 305 → "30.5%".
fn pct_one_decimal(tenths: u32) -> String {
    format!("{}.{}%", tenths / 10, tenths % 10)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cupo_core::domain::{Pct, Score};
    use cupo_core::entities::Segment;
    use cupo_core::policy::AllocationPolicy;
    use cupo_engine::allocate;

    #[test]
    fn counts_follow_post_allocation_state() {
        let mut p = Program::new("001".parse().unwrap(), "Software", 3);
        p.add_segment(Segment::new("Mérito", Pct::from_percent_f64(34.0), 1)).unwrap();
        p.add_segment(Segment::new("Población general", Pct::from_percent_f64(66.0), 2)).unwrap();

        let mut cands = vec![
            {
                let mut c = Candidate::new("A".parse().unwrap(), Score::from_f64(90.0));
                c.segments = vec!["Mérito".into()];
                c
            },
            Candidate::new("B".parse().unwrap(), Score::from_f64(70.0)),
        ];
        let res = allocate(&mut p, &mut cands, &AllocationPolicy::default()).unwrap();

        let model = build_model(&[p], &cands, &[res]);
        let section = &model.programs[0];
        assert_eq!(section.seats.assigned, 2);
        assert_eq!(section.seats.available, 1);
        assert_eq!(section.segments[0].name, "Mérito");
        assert_eq!(section.segments[0].share, "34.0%");
        assert_eq!(section.segments[0].assigned, 1);
        assert_eq!(model.candidates.assigned, 2);
        assert_eq!(model.candidates.applied, 0);

        let json = render_json(&model).unwrap();
        assert!(json.contains("\"program_id\": \"001\""));
    }
}
