//! Domain entities: candidates, segments, seats, programs.
//!
//! Values are validated and defaulted at construction (ingestion feeds them
//! through `cupo_io`), so the algorithm layer can assume well-formed inputs
//! and reserve error returns for genuine contract violations.
//!
//! Lifecycle wire tokens stay in Spanish ("Postulado", "Disponible", …) to
//! match the persisted records of the surrounding admission system.

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use crate::domain::{Pct, Score};
use crate::errors::CoreError;
use crate::ids::{norm_text, CandidateId, ProgramId, SeatId, SegmentName};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Default name for the fallback segment absorbing unclassified candidates
/// and rounding remainder.
pub const GENERAL_POPULATION: &str = "Población general";

/// Candidate lifecycle. `Applied` is the only state the allocator considers.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum CandidateState {
    #[cfg_attr(feature = "serde", serde(rename = "Postulado"))]
    Applied,
    #[cfg_attr(feature = "serde", serde(rename = "Asignado"))]
    Assigned,
    #[cfg_attr(feature = "serde", serde(rename = "Aceptado"))]
    Accepted,
    #[cfg_attr(feature = "serde", serde(rename = "Rechazado"))]
    Rejected,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Candidate {
    pub id: CandidateId,
    /// Display only; never participates in ordering.
    pub name: String,
    pub score: Score,
    /// Declared segment membership tokens (possibly empty).
    pub segments: Vec<String>,
    /// Lower = higher priority. Ingestion defaults absent values to 2.
    pub priority: u8,
    /// Vulnerability tier, lower first ("alta" → 0). `None` sorts last.
    pub vulnerability: Option<u8>,
    /// Enrollment timestamp, RFC3339-UTC-"Z" shaped; compared lexically.
    pub enrolled_at: Option<String>,
    /// Quota-policy membership flag.
    pub quota_policy: bool,
    /// Graduated under the most recent secondary-school regime.
    pub recent_graduate: bool,
    pub program_applied: Option<String>,
    pub campus: Option<String>,
    pub state: CandidateState,
    pub assigned_program: Option<ProgramId>,
}

impl Candidate {
    pub fn new(id: CandidateId, score: Score) -> Self {
        Candidate {
            id,
            name: String::new(),
            score,
            segments: Vec::new(),
            priority: 2,
            vulnerability: None,
            enrolled_at: None,
            quota_policy: false,
            recent_graduate: false,
            program_applied: None,
            campus: None,
            state: CandidateState::Applied,
            assigned_program: None,
        }
    }

    pub fn is_applied(&self) -> bool {
        self.state == CandidateState::Applied
    }

    /// Allocator transition: Applied → Assigned, remembering the program.
    pub fn assign_to(&mut self, program: ProgramId) {
        self.state = CandidateState::Assigned;
        self.assigned_program = Some(program);
    }

    /// Acceptance-workflow transition.
    pub fn accept(&mut self) {
        self.state = CandidateState::Accepted;
    }

    /// Rejection frees the candidate's claim; a later `allocate` run may
    /// hand the seat to someone else.
    pub fn reject(&mut self) {
        self.state = CandidateState::Rejected;
        self.assigned_program = None;
    }
}

/// Built-in segment eligibility rules, keyed off well-known segment names.
/// These are a second membership route next to declared-token matching.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum SegmentCriteria {
    None,
    /// Highest vulnerability tier only.
    HighVulnerability,
    /// Score at or above the given floor.
    MinScore(Score),
    /// Candidate flagged under the quota policy.
    QuotaPolicy,
    /// Graduated under the most recent secondary-school regime.
    RecentGraduate,
}

impl SegmentCriteria {
    /// Rule inferred from a segment's name. The general-population segment
    /// intentionally maps to `None`: the classifier's fallback already
    /// routes unmatched candidates there.
    pub fn for_name(name: &SegmentName) -> Self {
        let n = name.normalized();
        if n.starts_with("vulnerabilidad") || n.contains("vulnerab") {
            SegmentCriteria::HighVulnerability
        } else if n.starts_with("mérito") || n.starts_with("merito") {
            SegmentCriteria::MinScore(Score::from_thousandths(850_000))
        } else if n.contains("cuota") {
            SegmentCriteria::QuotaPolicy
        } else if n.contains("bachiller") {
            SegmentCriteria::RecentGraduate
        } else {
            SegmentCriteria::None
        }
    }

    pub fn accepts(&self, c: &Candidate) -> bool {
        match *self {
            SegmentCriteria::None => false,
            SegmentCriteria::HighVulnerability => c.vulnerability == Some(0),
            SegmentCriteria::MinScore(floor) => c.score >= floor,
            SegmentCriteria::QuotaPolicy => c.quota_policy,
            SegmentCriteria::RecentGraduate => c.recent_graduate,
        }
    }
}

/// A named quota bucket. Immutable during a single allocation pass.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Segment {
    pub name: SegmentName,
    pub percent: Pct,
    /// Ascending = processed first.
    pub priority: u32,
    /// Optional clamps on the base share, applied before remainder correction.
    pub min_pct: Option<Pct>,
    pub max_pct: Option<Pct>,
    pub criteria: SegmentCriteria,
}

impl Segment {
    pub fn new(name: impl Into<SegmentName>, percent: Pct, priority: u32) -> Self {
        let name = name.into();
        let criteria = SegmentCriteria::for_name(&name);
        Segment { name, percent, priority, min_pct: None, max_pct: None, criteria }
    }

    /// Synthetic fallback segment holding the full offer.
    pub fn general_population() -> Self {
        Segment::new(GENERAL_POPULATION, Pct::FULL, u32::MAX)
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}%)", self.name, self.percent.as_f64())
    }
}

/// Seat lifecycle. `Available` seats are the only ones the allocator fills.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SeatState {
    #[cfg_attr(feature = "serde", serde(rename = "Disponible"))]
    Available,
    #[cfg_attr(feature = "serde", serde(rename = "Asignado"))]
    Assigned,
    #[cfg_attr(feature = "serde", serde(rename = "Aceptado"))]
    Accepted,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Seat {
    pub id: SeatId,
    pub state: SeatState,
    pub occupant: Option<CandidateId>,
}

impl Seat {
    fn new(program: ProgramId, ordinal: u32) -> Self {
        // ordinal ≥ 1 is guaranteed by Program's seat numbering
        let id = SeatId::new(program, ordinal).expect("seat ordinal starts at 1");
        Seat { id, state: SeatState::Available, occupant: None }
    }

    pub fn ordinal(&self) -> u32 { self.id.ordinal() }

    pub fn is_available(&self) -> bool { self.state == SeatState::Available }

    /// Available → Assigned.
    pub fn assign(&mut self, candidate: CandidateId) -> Result<(), CoreError> {
        if self.state != SeatState::Available {
            return Err(CoreError::SeatNotAvailable);
        }
        self.occupant = Some(candidate);
        self.state = SeatState::Assigned;
        Ok(())
    }

    /// Assigned → Accepted (external acceptance workflow).
    pub fn accept(&mut self) -> Result<(), CoreError> {
        if self.state != SeatState::Assigned {
            return Err(CoreError::SeatNotAssigned);
        }
        if self.occupant.is_none() {
            return Err(CoreError::SeatEmpty);
        }
        self.state = SeatState::Accepted;
        Ok(())
    }

    /// Assigned|Accepted → Available, clearing the occupant. A later
    /// `allocate` run backfills the freed seat.
    pub fn release(&mut self) -> Result<(), CoreError> {
        if self.state == SeatState::Available {
            return Err(CoreError::SeatNotAssigned);
        }
        self.occupant = None;
        self.state = SeatState::Available;
        Ok(())
    }
}

/// Capacity-change contract violations. These indicate caller bugs, never
/// messy input data, and are therefore loud.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ProgramError {
    /// New offer is below the number of seats already assigned or accepted.
    OfferBelowCommitted { requested: u32, committed: u32 },
    /// Duplicate (case-insensitive) segment name.
    DuplicateSegment(SegmentName),
}

impl fmt::Display for ProgramError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProgramError::OfferBelowCommitted { requested, committed } => write!(
                f,
                "cannot reduce offer to {requested}: {committed} seats already committed"
            ),
            ProgramError::DuplicateSegment(n) => write!(f, "duplicate segment name: {n}"),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Program {
    pub id: ProgramId,
    pub name: String,
    /// Total seat offer; quota distribution always starts from this number,
    /// not from the count of currently available seats.
    pub offer: u32,
    pub campus: Option<String>,
    pub segments: Vec<Segment>,
    pub seats: Vec<Seat>,
}

impl Program {
    pub fn new(id: ProgramId, name: impl Into<String>, offer: u32) -> Self {
        let seats = (1..=offer).map(|i| Seat::new(id.clone(), i)).collect();
        Program {
            id,
            name: name.into(),
            offer,
            campus: None,
            segments: Vec::new(),
            seats,
        }
    }

    /// Add a segment, rejecting case-insensitive duplicates.
    pub fn add_segment(&mut self, segment: Segment) -> Result<(), ProgramError> {
        let norm = segment.name.normalized();
        if self.segments.iter().any(|s| s.name.normalized() == norm) {
            return Err(ProgramError::DuplicateSegment(segment.name));
        }
        self.segments.push(segment);
        Ok(())
    }

    /// Segments sorted by (priority asc, normalized name asc). This is the
    /// processing order for quota distribution and the segment pass.
    pub fn ordered_segments(&self) -> Vec<Segment> {
        let mut out = self.segments.clone();
        out.sort_by(|a, b| {
            a.priority
                .cmp(&b.priority)
                .then_with(|| a.name.normalized().cmp(&b.name.normalized()))
        });
        out
    }

    /// Indices of available seats in ordinal order.
    pub fn available_seats(&self) -> Vec<usize> {
        let mut idx: Vec<usize> = self
            .seats
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.is_available().then_some(i))
            .collect();
        idx.sort_by_key(|&i| self.seats[i].ordinal());
        idx
    }

    pub fn committed_seats(&self) -> u32 {
        self.seats.iter().filter(|s| !s.is_available()).count() as u32
    }

    /// Case-insensitive campus comparison; either side missing means the
    /// filter does not apply.
    pub fn campus_accepts(&self, candidate_campus: Option<&str>) -> bool {
        match (&self.campus, candidate_campus) {
            (Some(pc), Some(cc)) if !cc.trim().is_empty() => norm_text(pc) == norm_text(cc),
            _ => true,
        }
    }

    /// Grow or shrink the seat collection to `new_offer`.
    ///
    /// Growth appends fresh ordinals; shrinkage removes Available seats from
    /// the tail. Dropping below the committed count fails loudly.
    pub fn resize_offer(&mut self, new_offer: u32) -> Result<(), ProgramError> {
        let committed = self.committed_seats();
        if new_offer < committed {
            return Err(ProgramError::OfferBelowCommitted {
                requested: new_offer,
                committed,
            });
        }

        let current = self.seats.len() as u32;
        if new_offer > current {
            let next = self.seats.iter().map(Seat::ordinal).max().unwrap_or(0);
            for i in 1..=(new_offer - current) {
                self.seats.push(Seat::new(self.id.clone(), next + i));
            }
        } else if new_offer < current {
            let mut to_remove = (current - new_offer) as usize;
            let mut keep: Vec<Seat> = Vec::with_capacity(new_offer as usize);
            for seat in self.seats.drain(..).rev() {
                if to_remove > 0 && seat.is_available() {
                    to_remove -= 1;
                } else {
                    keep.push(seat);
                }
            }
            keep.reverse();
            self.seats = keep;
        }
        self.offer = new_offer;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn program(offer: u32) -> Program {
        Program::new("001".parse().unwrap(), "Software", offer)
    }

    #[test]
    fn new_program_creates_available_seats() {
        let p = program(5);
        assert_eq!(p.seats.len(), 5);
        assert!(p.seats.iter().all(Seat::is_available));
        assert_eq!(p.seats[4].id.to_string(), "001-5");
    }

    #[test]
    fn seat_transitions_are_guarded() {
        let mut p = program(1);
        let cid: CandidateId = "C1".parse().unwrap();
        p.seats[0].assign(cid.clone()).unwrap();
        assert_eq!(p.seats[0].assign(cid.clone()), Err(CoreError::SeatNotAvailable));
        p.seats[0].accept().unwrap();
        assert_eq!(p.seats[0].accept(), Err(CoreError::SeatNotAssigned));
        p.seats[0].release().unwrap();
        assert!(p.seats[0].is_available());
        assert_eq!(p.seats[0].occupant, None);
    }

    #[test]
    fn resize_grows_with_fresh_ordinals_and_shrinks_from_tail() {
        let mut p = program(3);
        p.seats[0].assign("C1".parse().unwrap()).unwrap();

        p.resize_offer(5).unwrap();
        assert_eq!(p.seats.len(), 5);
        assert_eq!(p.seats[4].ordinal(), 5);

        p.resize_offer(2).unwrap();
        assert_eq!(p.seats.len(), 2);
        // the assigned seat survives the shrink
        assert!(p.seats.iter().any(|s| s.state == SeatState::Assigned));

        assert_eq!(
            p.resize_offer(0),
            Err(ProgramError::OfferBelowCommitted { requested: 0, committed: 1 })
        );
    }

    #[test]
    fn duplicate_segments_rejected_case_insensitively() {
        let mut p = program(10);
        p.add_segment(Segment::new("Mérito", Pct::from_percent_f64(30.0), 1)).unwrap();
        let dup = Segment::new("MÉRITO", Pct::from_percent_f64(10.0), 2);
        assert!(matches!(p.add_segment(dup), Err(ProgramError::DuplicateSegment(_))));
    }

    #[test]
    fn criteria_inferred_from_segment_names() {
        let merit = Segment::new("Mérito académico", Pct::from_percent_f64(30.0), 1);
        assert_eq!(merit.criteria, SegmentCriteria::MinScore(Score::from_thousandths(850_000)));

        let general = Segment::general_population();
        assert_eq!(general.criteria, SegmentCriteria::None);

        let mut c = Candidate::new("C1".parse().unwrap(), Score::from_f64(900.0));
        assert!(merit.criteria.accepts(&c));
        c.score = Score::from_f64(800.0);
        assert!(!merit.criteria.accepts(&c));
    }
}
