//! Allocation policy domains.
//!
//! Notes:
//! - `tie_seed` only matters when `tie_break == SecondaryCriteria` and the
//!   secondary keys still leave a residue; results stay reproducible for
//!   identical inputs and seed.
//! - Wire tokens are snake_case and explicit, so persisted configurations
//!   never drift with enum renames.

use core::str::FromStr;

use crate::errors::CoreError;

/// Seed used when a policy does not declare one (matches the historical
/// default of the admission system).
pub const DEFAULT_TIE_SEED: u64 = 42;

/// Define an enum with explicit wire tokens plus `FromStr` on those tokens.
macro_rules! policy_enum {
    ($name:ident => { $($variant:ident = $token:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        pub enum $name {
            $(
                #[cfg_attr(feature = "serde", serde(rename = $token))]
                $variant,
            )+
        }

        impl $name {
            pub fn as_token(self) -> &'static str {
                match self { $( $name::$variant => $token, )+ }
            }
        }

        impl FromStr for $name {
            type Err = CoreError;
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim() {
                    $( $token => Ok($name::$variant), )+
                    _ => Err(CoreError::InvalidToken),
                }
            }
        }
    };
}

policy_enum!(UnmatchedPolicy => {
    GeneralPopulation = "general_population",
    Exclude           = "exclude",
});

policy_enum!(RemainderPolicy => {
    GeneralPreferred = "general_preferred",
    LastSegment      = "last_segment",
    HighestPriority  = "highest_priority",
});

policy_enum!(TieBreakPolicy => {
    IdAscending       = "id_ascending",
    SecondaryCriteria = "secondary_criteria",
});

policy_enum!(RankOrder => {
    ScoreDesc         = "score_desc",
    PriorityThenScore = "priority_then_score",
});

/// Knobs of one allocation run. A default policy reproduces the canonical
/// multi-segment behavior; the degenerate strategies (pure merit, priority
/// lanes) are configurations of the same engine, not separate code paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AllocationPolicy {
    pub unmatched: UnmatchedPolicy,
    pub remainder: RemainderPolicy,
    pub tie_break: TieBreakPolicy,
    pub tie_seed: u64,
    pub rank_order: RankOrder,
}

impl Default for AllocationPolicy {
    fn default() -> Self {
        AllocationPolicy {
            unmatched: UnmatchedPolicy::GeneralPopulation,
            remainder: RemainderPolicy::GeneralPreferred,
            tie_break: TieBreakPolicy::IdAscending,
            tie_seed: DEFAULT_TIE_SEED,
            rank_order: RankOrder::ScoreDesc,
        }
    }
}

impl AllocationPolicy {
    /// Strict variant: declared-but-unconfigured segments exclude the
    /// candidate instead of defaulting them to the general population.
    pub fn strict_segments(mut self) -> Self {
        self.unmatched = UnmatchedPolicy::Exclude;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.tie_seed = seed;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_round_trip_via_fromstr() {
        assert_eq!("exclude".parse::<UnmatchedPolicy>().unwrap(), UnmatchedPolicy::Exclude);
        assert_eq!(
            "general_preferred".parse::<RemainderPolicy>().unwrap(),
            RemainderPolicy::GeneralPreferred
        );
        assert_eq!(RankOrder::PriorityThenScore.as_token(), "priority_then_score");
        assert!("no_such_policy".parse::<TieBreakPolicy>().is_err());
    }

    #[test]
    fn default_policy_matches_canonical_run() {
        let p = AllocationPolicy::default();
        assert_eq!(p.unmatched, UnmatchedPolicy::GeneralPopulation);
        assert_eq!(p.tie_seed, DEFAULT_TIE_SEED);
        assert_eq!(p.strict_segments().unmatched, UnmatchedPolicy::Exclude);
    }
}
