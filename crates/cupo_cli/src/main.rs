// crates/cupo_cli/src/main.rs
//
// Wires up: exit codes, typed error mapping, CLI parsing, the validate-only
// short-circuit, and the full run path (load → overlay seats → allocate →
// artifacts → report).

mod args;

mod exitcodes {
    pub const OK: i32 = 0;
    /// Input could not be parsed/normalized (or bad flags).
    pub const VALIDATION: i32 = 2;
    /// Filesystem errors while reading/writing artifacts.
    pub const IO: i32 = 4;
    /// Engine contract violation (caller-bug class, not messy data).
    pub const CONTRACT: i32 = 5;
}

use std::process::ExitCode;

use serde::Serialize;

use args::{parse_and_validate as parse_cli, Args};
use cupo_engine::{allocate_all, AllocError, AllocationResult};
use cupo_io::prelude::*;
use cupo_report::{build_model, render_json};

/// Central error type for CLI → exit-code mapping.
#[derive(Debug)]
enum MainError {
    Validation(String),
    Io(String),
    Contract(String),
}

fn main() -> ExitCode {
    let args = match parse_cli() {
        Ok(a) => a,
        Err(e) => {
            eprintln!("cupos: error: {e}");
            return ExitCode::from(exitcodes::VALIDATION as u8);
        }
    };

    let rc = if args.validate_only {
        match validate_only(&args) {
            Ok(()) => exitcodes::OK,
            Err(e) => report_and_map(&e),
        }
    } else {
        match run_once(&args) {
            Ok(()) => exitcodes::OK,
            Err(e) => report_and_map(&e),
        }
    };

    ExitCode::from(rc as u8)
}

/// Validate-only path: exercise load + normalization, allocate nothing.
fn validate_only(args: &Args) -> Result<(), MainError> {
    let (programs, candidates) = load_snapshot(&args.snapshot).map_err(map_io_err)?;
    if !args.quiet {
        eprintln!(
            "validate-only: inputs OK ({} programs, {} candidates)",
            programs.len(),
            candidates.len()
        );
    }
    Ok(())
}

/// Shape of `asignaciones.json`: run digest + flat records.
#[derive(Serialize)]
struct AssignmentsArtifact {
    digest: String,
    records: Vec<AssignmentRecord>,
}

fn run_once(args: &Args) -> Result<(), MainError> {
    let (mut programs, mut candidates) = load_snapshot(&args.snapshot).map_err(map_io_err)?;

    if let Some(seats_path) = &args.seats {
        let bytes = std::fs::read(seats_path).map_err(|e| MainError::Io(e.to_string()))?;
        let records: Vec<SeatRecord> =
            serde_json::from_slice(&bytes).map_err(|e| MainError::Validation(e.to_string()))?;
        apply_seat_records(&mut programs, &records);
    }

    let policy = args.policy();
    let results =
        allocate_all(&mut programs, &mut candidates, &policy).map_err(map_engine_err)?;

    // Assignment records for every program, stamped with the run timestamp.
    let mut records: Vec<AssignmentRecord> = Vec::new();
    for result in &results {
        records.extend(assignment_records(result, &args.timestamp).map_err(map_io_err)?);
    }
    let digest = run_digest(&records).map_err(map_io_err)?;

    let out = &args.out;
    write_json_atomic(out.join("asignaciones.json"), &AssignmentsArtifact { digest: digest.clone(), records })
        .map_err(map_io_err)?;
    write_json_atomic(out.join("cupos.json"), &seat_records(&programs)).map_err(map_io_err)?;

    let model = build_model(&programs, &candidates, &results);
    let report =
        render_json(&model).map_err(|e| MainError::Io(format!("report: {e:?}")))?;
    std::fs::write(out.join("report.json"), report).map_err(|e| MainError::Io(e.to_string()))?;

    if !args.quiet {
        print_summary(&results, &digest);
    }
    Ok(())
}

fn print_summary(results: &[AllocationResult], digest: &str) {
    for r in results {
        println!(
            "{}: {} assigned, {} seats remaining",
            r.program_id,
            r.len(),
            r.seats_remaining
        );
    }
    println!("run digest: {digest}");
}

fn report_and_map(e: &MainError) -> i32 {
    eprintln!("cupos: error: {}", describe(e));
    match e {
        MainError::Validation(_) => exitcodes::VALIDATION,
        MainError::Io(_) => exitcodes::IO,
        MainError::Contract(_) => exitcodes::CONTRACT,
    }
}

fn describe(e: &MainError) -> &str {
    match e {
        MainError::Validation(m) | MainError::Io(m) | MainError::Contract(m) => m,
    }
}

/// Translate cupo_io::IoError into MainError buckets for exit-code mapping.
fn map_io_err(e: IoError) -> MainError {
    match e {
        IoError::Json(m) => MainError::Validation(format!("json: {m}")),
        IoError::Record { index, msg } => MainError::Validation(format!("record {index}: {msg}")),
        IoError::Invalid(m) => MainError::Validation(m),
        IoError::Path(m) => MainError::Io(format!("path: {m}")),
    }
}

/// Engine errors are contract violations: surface them as a generic
/// "allocation could not complete" with the structured cause attached.
fn map_engine_err(e: AllocError) -> MainError {
    MainError::Contract(format!("allocation could not complete: {e}"))
}
