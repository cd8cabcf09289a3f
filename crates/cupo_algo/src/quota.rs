//! Percentage quotas → integer seats per segment, with remainder correction.
//!
//! Contract:
//! - Base quota per segment: round_half_up(offer × pct), integer arithmetic
//!   on tenths of a percent; optional min/max bounds clamp the base share.
//! - `diff = offer − Σ base` goes to the general-population segment
//!   (normalized-name prefix "pobl"/"general"); if none exists, to the last
//!   segment in priority order, or to the highest-priority segment when the
//!   policy says so.
//! - A negative diff that would underflow the target walks the remaining
//!   segments in reverse priority order.
//! - Empty segment list, or percentages summing to ≤ 0 → one synthetic
//!   "Población general" segment holding the full offer.
//!
//! The function is pure; output quotas are never negative and always sum
//! to `offer`.

use alloc::collections::BTreeMap;
use alloc::vec;
use alloc::vec::Vec;

use cupo_core::entities::Segment;
use cupo_core::ids::SegmentName;
use cupo_core::policy::RemainderPolicy;

/// Priority-ascending copy of the configured segments, replaced by a single
/// synthetic general-population segment when the configuration is unusable.
pub fn effective_segments(segments: &[Segment]) -> Vec<Segment> {
    let mut out: Vec<Segment> = segments.to_vec();
    out.sort_by(|a, b| {
        a.priority
            .cmp(&b.priority)
            .then_with(|| a.name.normalized().cmp(&b.name.normalized()))
    });

    let sum_tenths: u64 = out.iter().map(|s| s.percent.as_tenths() as u64).sum();
    if out.is_empty() || sum_tenths == 0 {
        return vec![Segment::general_population()];
    }
    out
}

/// Integer seats per segment; keys are the effective segments' names.
pub fn distribute(
    offer: u32,
    segments: &[Segment],
    policy: RemainderPolicy,
) -> BTreeMap<SegmentName, u32> {
    let segs = effective_segments(segments);

    let mut quotas: Vec<u32> = segs
        .iter()
        .map(|s| {
            let mut q = s.percent.share_of(offer);
            if let Some(min) = s.min_pct {
                q = q.max(min.share_of(offer));
            }
            if let Some(max) = s.max_pct {
                q = q.min(max.share_of(offer));
            }
            q
        })
        .collect();

    let sum: i64 = quotas.iter().map(|&q| q as i64).sum();
    let mut diff = offer as i64 - sum;

    if diff != 0 {
        let target = remainder_target(&segs, policy);
        let corrected = quotas[target] as i64 + diff;
        if corrected >= 0 {
            quotas[target] = corrected as u32;
            diff = 0;
        } else {
            quotas[target] = 0;
            diff = corrected;
        }
        // Over-allocation left after zeroing the target: trim from the back.
        if diff < 0 {
            for i in (0..quotas.len()).rev() {
                if i == target || diff == 0 {
                    continue;
                }
                let take = (quotas[i] as i64).min(-diff);
                quotas[i] -= take as u32;
                diff += take;
            }
        }
        debug_assert_eq!(diff, 0, "remainder correction must conserve the offer");
    }

    segs.into_iter()
        .map(|s| s.name)
        .zip(quotas.into_iter())
        .collect()
}

fn remainder_target(segs: &[Segment], policy: RemainderPolicy) -> usize {
    match policy {
        RemainderPolicy::GeneralPreferred => segs
            .iter()
            .position(|s| s.name.is_general_population())
            .unwrap_or(segs.len() - 1),
        RemainderPolicy::LastSegment => segs.len() - 1,
        RemainderPolicy::HighestPriority => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cupo_core::domain::Pct;
    use cupo_core::entities::GENERAL_POPULATION;
    use proptest::prelude::*;

    fn seg(name: &str, pct: f64, priority: u32) -> Segment {
        Segment::new(name, Pct::from_percent_f64(pct), priority)
    }

    fn quota(map: &BTreeMap<SegmentName, u32>, name: &str) -> u32 {
        *map.get(&SegmentName::from(name)).unwrap()
    }

    #[test]
    fn no_remainder_when_rounding_is_exact() {
        // 7 × [40, 40, 20] → [3, 3, 1]
        let segs = [seg("A", 40.0, 1), seg("B", 40.0, 2), seg("C", 20.0, 3)];
        let q = distribute(7, &segs, RemainderPolicy::GeneralPreferred);
        assert_eq!(quota(&q, "A"), 3);
        assert_eq!(quota(&q, "B"), 3);
        assert_eq!(quota(&q, "C"), 1);
    }

    #[test]
    fn positive_remainder_goes_to_general_population() {
        // 10 × [33, 33, 34] rounds to [3, 3, 3]; the missing seat lands on
        // the general bucket regardless of its priority position.
        let segs = [
            seg("Mérito", 33.0, 1),
            seg("Población general", 33.0, 2),
            seg("Vulnerabilidad", 34.0, 3),
        ];
        let q = distribute(10, &segs, RemainderPolicy::GeneralPreferred);
        assert_eq!(quota(&q, "Población general"), 4);
        assert_eq!(q.values().sum::<u32>(), 10);
    }

    #[test]
    fn remainder_falls_back_to_last_segment_without_general() {
        let segs = [seg("Mérito", 33.0, 1), seg("Cuotas", 33.0, 2), seg("Otros", 34.0, 3)];
        let q = distribute(10, &segs, RemainderPolicy::GeneralPreferred);
        assert_eq!(quota(&q, "Otros"), 4);
    }

    #[test]
    fn remainder_policy_highest_priority() {
        let segs = [seg("Mérito", 33.0, 1), seg("Cuotas", 33.0, 2), seg("Otros", 34.0, 3)];
        let q = distribute(10, &segs, RemainderPolicy::HighestPriority);
        assert_eq!(quota(&q, "Mérito"), 4);
    }

    #[test]
    fn over_hundred_sum_is_trimmed_to_offer() {
        let segs = [seg("A", 60.0, 1), seg("B", 60.0, 2)];
        let q = distribute(10, &segs, RemainderPolicy::GeneralPreferred);
        assert_eq!(q.values().sum::<u32>(), 10);
        assert_eq!(quota(&q, "A"), 6);
        assert_eq!(quota(&q, "B"), 4);
    }

    #[test]
    fn empty_or_zero_percent_config_degrades_to_general() {
        let q = distribute(12, &[], RemainderPolicy::GeneralPreferred);
        assert_eq!(quota(&q, GENERAL_POPULATION), 12);

        let zeroed = [seg("A", 0.0, 1), seg("B", -5.0, 2)];
        let q = distribute(12, &zeroed, RemainderPolicy::GeneralPreferred);
        assert_eq!(quota(&q, GENERAL_POPULATION), 12);
    }

    #[test]
    fn bounds_clamp_the_base_share() {
        // 5% min on 40 seats = 2; share would round 1% → 0 without the floor.
        let mut cuotas = seg("Política de cuotas", 1.0, 1);
        cuotas.min_pct = Some(Pct::from_percent_f64(5.0));
        cuotas.max_pct = Some(Pct::from_percent_f64(10.0));
        let segs = [cuotas, seg("Población general", 99.0, 2)];
        let q = distribute(40, &segs, RemainderPolicy::GeneralPreferred);
        assert_eq!(quota(&q, "Política de cuotas"), 2);
        assert_eq!(q.values().sum::<u32>(), 40);
    }

    proptest! {
        #[test]
        fn conservation_holds_for_any_configuration(
            offer in 0u32..500,
            pcts in proptest::collection::vec(0.0f64..150.0, 0..8),
        ) {
            let segs: Vec<Segment> = pcts
                .iter()
                .enumerate()
                .map(|(i, &p)| {
                    let mut name = alloc::string::String::from("S");
                    name.push((b'a' + i as u8) as char);
                    seg(&name, p, i as u32)
                })
                .collect();
            let q = distribute(offer, &segs, RemainderPolicy::GeneralPreferred);
            prop_assert_eq!(q.values().sum::<u32>(), offer);
        }
    }
}
