//! Eligibility filtering and segment-bucket classification.
//!
//! Contract:
//! - Eligible: state == Applied, plus the campus filter when **both** the
//!   program and the candidate carry a campus label. A missing candidate
//!   campus degrades to "no filter applied".
//! - Each eligible candidate joins exactly one bucket: the first segment in
//!   priority order whose name matches a declared token (trim +
//!   case-insensitive) or whose built-in criteria accept the candidate.
//! - No match → the general-population bucket. When no general segment is
//!   configured, the fallback bucket still exists under the canonical name;
//!   only the backfill pass can reach it. Under `Exclude` the candidate
//!   joins no bucket at all.
//!
//! Candidates are addressed by index into the caller's slice, so the engine
//! can mutate state later without re-identifying anyone.

use alloc::collections::BTreeMap;
use alloc::vec::Vec;

use cupo_core::entities::{Candidate, Program, Segment, GENERAL_POPULATION};
use cupo_core::ids::SegmentName;
use cupo_core::policy::UnmatchedPolicy;

/// Indices of candidates the allocator may consider for `program`.
pub fn eligible_candidates(program: &Program, candidates: &[Candidate]) -> Vec<usize> {
    candidates
        .iter()
        .enumerate()
        .filter_map(|(i, c)| {
            (c.is_applied() && program.campus_accepts(c.campus.as_deref())).then_some(i)
        })
        .collect()
}

/// Name of the bucket that absorbs unmatched candidates: the configured
/// general-population segment if present, else the canonical label.
pub fn fallback_bucket_name(segments: &[Segment]) -> SegmentName {
    segments
        .iter()
        .find(|s| s.name.is_general_population())
        .map(|s| s.name.clone())
        .unwrap_or_else(|| SegmentName::from(GENERAL_POPULATION))
}

/// Partition `eligible` into per-segment buckets. Every configured segment
/// gets a bucket (possibly empty); the fallback bucket is always present.
pub fn classify(
    candidates: &[Candidate],
    eligible: &[usize],
    segments: &[Segment],
    policy: UnmatchedPolicy,
) -> BTreeMap<SegmentName, Vec<usize>> {
    let mut buckets: BTreeMap<SegmentName, Vec<usize>> = segments
        .iter()
        .map(|s| (s.name.clone(), Vec::new()))
        .collect();
    let fallback = fallback_bucket_name(segments);
    buckets.entry(fallback.clone()).or_default();

    for &i in eligible {
        let c = &candidates[i];
        match chosen_segment(c, segments) {
            Some(name) => buckets.get_mut(&name).expect("bucket for every segment").push(i),
            None => match policy {
                UnmatchedPolicy::GeneralPopulation => {
                    buckets.get_mut(&fallback).expect("fallback bucket").push(i)
                }
                UnmatchedPolicy::Exclude => {}
            },
        }
    }
    buckets
}

/// First segment, in the given (priority) order, claimed by a declared
/// token or by built-in criteria.
fn chosen_segment(candidate: &Candidate, segments: &[Segment]) -> Option<SegmentName> {
    for seg in segments {
        let token_match = candidate.segments.iter().any(|t| seg.name.matches(t));
        if token_match || seg.criteria.accepts(candidate) {
            return Some(seg.name.clone());
        }
    }
    None
}
