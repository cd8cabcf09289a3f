// crates/cupo_cli/src/args.rs
//
// Deterministic, offline CLI argument parsing surface.
//
// Rules:
// - No networked paths (reject any scheme:// like http/https/file)
// - --snapshot is the single required input; --seats optionally overlays
//   persisted seat state before the run
// - Policy knobs map 1:1 to cupo_core::policy tokens
// - Seed override accepts u64 decimal or 0x-hex up to 16 nybbles
// - --validate-only performs load+normalization checks without allocating

use clap::Parser;
use std::path::{Path, PathBuf};

use cupo_core::policy::{
    AllocationPolicy, RankOrder, RemainderPolicy, TieBreakPolicy, UnmatchedPolicy,
};
use cupo_core::determinism::is_ts_utc_z;

/// Parsed CLI arguments (raw).
#[derive(Debug, Parser, Clone)]
#[command(
    name = "cupos",
    disable_help_subcommand = true,
    about = "Offline, deterministic seat allocation for academic programs"
)]
pub struct Args {
    /// Snapshot JSON with programs ("carreras") and candidates ("aspirantes").
    #[arg(long)]
    pub snapshot: PathBuf,

    /// Persisted seat records to overlay onto the snapshot before running.
    #[arg(long)]
    pub seats: Option<PathBuf>,

    /// Output directory (default: current directory).
    #[arg(long, default_value = ".")]
    pub out: PathBuf,

    // --- Policy knobs ---
    /// Exclude candidates whose declared segment is not configured, instead
    /// of defaulting them to the general population.
    #[arg(long)]
    pub strict_segments: bool,

    /// Where rounding remainder lands.
    #[arg(long, default_value = "general_preferred", value_parser = parse_remainder)]
    pub remainder: RemainderPolicy,

    /// Boundary-tie handling within a quota.
    #[arg(long, default_value = "id_ascending", value_parser = parse_tie)]
    pub tie_policy: TieBreakPolicy,

    /// Within-bucket ranking order.
    #[arg(long, default_value = "score_desc", value_parser = parse_rank)]
    pub rank_order: RankOrder,

    /// Tie RNG seed override. Accepts decimal u64 or 0x-hex (≤16 hex digits).
    #[arg(long, value_parser = parse_seed)]
    pub seed: Option<u64>,

    /// Timestamp stamped onto assignment records (RFC3339 UTC "Z").
    /// The engine itself is clockless.
    #[arg(long, default_value = "1970-01-01T00:00:00Z", value_parser = parse_timestamp)]
    pub timestamp: String,

    /// Load + normalize inputs only, do not allocate.
    #[arg(long)]
    pub validate_only: bool,

    /// Suppress non-essential stdout logs.
    #[arg(long)]
    pub quiet: bool,
}

impl Args {
    pub fn policy(&self) -> AllocationPolicy {
        let mut p = AllocationPolicy {
            remainder: self.remainder,
            tie_break: self.tie_policy,
            rank_order: self.rank_order,
            ..AllocationPolicy::default()
        };
        if self.strict_segments {
            p.unmatched = UnmatchedPolicy::Exclude;
        }
        if let Some(seed) = self.seed {
            p.tie_seed = seed;
        }
        p
    }
}

/// Errors surfaced by argument parsing/validation.
/// Keep messages short/stable (handy for scripts/tests).
#[derive(Debug)]
pub enum CliError {
    NonLocalPath(String),
    NotFound(String),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use CliError::*;
        match self {
            NonLocalPath(p) => write!(f, "path must be local file (no scheme): {p}"),
            NotFound(p) => write!(f, "file not found: {p}"),
        }
    }
}
impl std::error::Error for CliError {}

/// Seed parser: decimal u64 or 0x-hex (1..=16 nybbles).
pub fn parse_seed(s: &str) -> Result<u64, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty seed".into());
    }
    if let Some(rest) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        if rest.is_empty() || rest.len() > 16 || !rest.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err("hex seed must be 1..16 hex digits".into());
        }
        u64::from_str_radix(rest, 16).map_err(|_| "hex seed out of range".into())
    } else {
        s.parse::<u64>().map_err(|_| "decimal seed must be a valid u64".into())
    }
}

fn parse_timestamp(s: &str) -> Result<String, String> {
    if is_ts_utc_z(s) {
        Ok(s.to_string())
    } else {
        Err("timestamp must look like 2025-08-12T10:00:00Z".into())
    }
}

fn parse_remainder(s: &str) -> Result<RemainderPolicy, String> {
    s.parse().map_err(|_| "one of: general_preferred | last_segment | highest_priority".into())
}

fn parse_tie(s: &str) -> Result<TieBreakPolicy, String> {
    s.parse().map_err(|_| "one of: id_ascending | secondary_criteria".into())
}

fn parse_rank(s: &str) -> Result<RankOrder, String> {
    s.parse().map_err(|_| "one of: score_desc | priority_then_score".into())
}

/// Reject any explicit URI scheme (e.g., http://, https://, file://).
#[inline]
fn has_scheme(s: &str) -> bool {
    let lower = s.trim().to_ascii_lowercase();
    lower.contains("://") || lower.starts_with("http:") || lower.starts_with("https:") || lower.starts_with("file:")
}

#[inline]
fn ensure_local_path(p: &Path) -> Result<(), CliError> {
    if let Some(s) = p.to_str() {
        if has_scheme(s) {
            return Err(CliError::NonLocalPath(s.to_string()));
        }
    }
    Ok(())
}

fn ensure_local_exists(p: &Path, label: &'static str) -> Result<(), CliError> {
    ensure_local_path(p)?;
    let meta = std::fs::metadata(p)
        .map_err(|_| CliError::NotFound(format!("{label} {}", p.display())))?;
    if !meta.is_file() {
        return Err(CliError::NotFound(format!("{label} {}", p.display())));
    }
    Ok(())
}

/// Entry point used by main.rs
pub fn parse_and_validate() -> Result<Args, CliError> {
    let args = Args::parse();
    ensure_local_exists(&args.snapshot, "--snapshot")?;
    if let Some(seats) = &args.seats {
        ensure_local_exists(seats, "--seats")?;
    }
    ensure_local_path(&args.out)?;
    Ok(args)
}
