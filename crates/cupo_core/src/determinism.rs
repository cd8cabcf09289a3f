//! Stable ordering helpers.
//!
//! All engine orders reduce to these comparators so output never depends on
//! input iteration order:
//! - merit order: score desc, candidate id asc
//! - priority lanes: priority tier asc, then merit order
//! - secondary tie keys: vulnerability asc, enrollment timestamp asc
//!   (absent values last)

use core::cmp::Ordering;

use crate::entities::Candidate;
use crate::policy::RankOrder;

/// score desc, id asc.
pub fn cmp_by_merit(a: &Candidate, b: &Candidate) -> Ordering {
    b.score
        .cmp(&a.score)
        .then_with(|| a.id.as_str().cmp(b.id.as_str()))
}

/// priority asc, then merit order.
pub fn cmp_by_priority_then_merit(a: &Candidate, b: &Candidate) -> Ordering {
    a.priority.cmp(&b.priority).then_with(|| cmp_by_merit(a, b))
}

pub fn cmp_for(order: RankOrder, a: &Candidate, b: &Candidate) -> Ordering {
    match order {
        RankOrder::ScoreDesc => cmp_by_merit(a, b),
        RankOrder::PriorityThenScore => cmp_by_priority_then_merit(a, b),
    }
}

/// Secondary criteria applied only when a quota cut would split a tied
/// group: vulnerability tier asc, enrollment timestamp asc; `None` values
/// sort after everything concrete.
pub fn cmp_by_secondary(a: &Candidate, b: &Candidate) -> Ordering {
    let va = a.vulnerability.unwrap_or(u8::MAX);
    let vb = b.vulnerability.unwrap_or(u8::MAX);
    va.cmp(&vb).then_with(|| {
        match (&a.enrolled_at, &b.enrolled_at) {
            (Some(x), Some(y)) => x.cmp(y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    })
}

/// Strict RFC3339-like shape check: "YYYY-MM-DDTHH:MM:SSZ" (length 20).
/// Lexicographic order on timestamps of this shape is chronological order.
pub fn is_ts_utc_z(s: &str) -> bool {
    let b = s.as_bytes();
    if b.len() != 20 { return false; }
    matches!(b[4], b'-')
        && matches!(b[7], b'-')
        && matches!(b[10], b'T')
        && matches!(b[13], b':')
        && matches!(b[16], b':')
        && matches!(b[19], b'Z')
        && b.iter().enumerate().all(|(i, c)| match i {
            0..=3 | 5..=6 | 8..=9 | 11..=12 | 14..=15 | 17..=18 => matches!(c, b'0'..=b'9'),
            4 | 7 | 10 | 13 | 16 | 19 => true,
            _ => false,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Score;
    use crate::entities::Candidate;

    fn cand(id: &str, score: f64) -> Candidate {
        Candidate::new(id.parse().unwrap(), Score::from_f64(score))
    }

    #[test]
    fn merit_order_breaks_ties_by_id() {
        let a = cand("A", 88.0);
        let b = cand("B", 88.0);
        assert_eq!(cmp_by_merit(&a, &b), Ordering::Less);
        assert_eq!(cmp_by_merit(&cand("Z", 90.0), &a), Ordering::Less);
    }

    #[test]
    fn priority_lane_precedes_merit() {
        let mut low = cand("A", 99.0);
        low.priority = 2;
        let mut high = cand("B", 10.0);
        high.priority = 1;
        assert_eq!(cmp_by_priority_then_merit(&high, &low), Ordering::Less);
    }

    #[test]
    fn secondary_keys_put_absent_values_last() {
        let mut a = cand("A", 88.0);
        a.vulnerability = Some(0);
        let b = cand("B", 88.0);
        assert_eq!(cmp_by_secondary(&a, &b), Ordering::Less);

        let mut c = cand("C", 88.0);
        c.enrolled_at = Some("2025-01-10T00:00:00Z".into());
        let mut d = cand("D", 88.0);
        d.enrolled_at = Some("2025-01-11T00:00:00Z".into());
        assert_eq!(cmp_by_secondary(&c, &d), Ordering::Less);
    }

    #[test]
    fn timestamp_shape_check() {
        assert!(is_ts_utc_z("2025-08-12T10:00:00Z"));
        assert!(!is_ts_utc_z("2025-08-12 10:00:00"));
        assert!(!is_ts_utc_z("2025-08-12T10:00:00+00:00"));
    }
}
