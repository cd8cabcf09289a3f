//! Newtypes and parsers for registry identifiers.
//!
//! `CandidateId` and `ProgramId` are strict tokens (charset `[A-Za-z0-9_.:-]`,
//! length 1..=64). `SeatId` is `"<program-id>-<ordinal>"`. `SegmentName` keeps
//! the administrator's original spelling and compares case-insensitively.

use crate::errors::CoreError;
use alloc::string::{String, ToString};
use core::fmt;
use core::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

fn is_token(s: &str) -> bool {
    let len = s.len();
    if !(1..=64).contains(&len) { return false; }
    s.bytes().all(|b| matches!(b,
        b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' |
        b'_' | b'-' | b':' | b'.'
    ))
}

/// Trim + ASCII-lowercase + Unicode-lowercase fold used for all
/// case-insensitive text comparisons (segment names, campus labels, states).
pub fn norm_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.trim().chars() {
        for l in c.to_lowercase() {
            out.push(l);
        }
    }
    out
}

macro_rules! def_token {
    ($name:ident) => {
        #[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
        #[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
        pub struct $name(String);

        impl $name {
            pub fn as_str(&self) -> &str { &self.0 }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
        }

        impl FromStr for $name {
            type Err = CoreError;
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                if is_token(s) { Ok(Self(s.to_string())) } else { Err(CoreError::InvalidToken) }
            }
        }
    }
}

def_token!(CandidateId);
def_token!(ProgramId);

/// `"<program-id>-<ordinal>"`, ordinal ≥ 1. Ordering by program then ordinal,
/// so seat consumption order never depends on lexicographic digit quirks.
/// Serializes as the display string.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub struct SeatId {
    program: ProgramId,
    ordinal: u32,
}

#[cfg(feature = "serde")]
impl Serialize for SeatId {
    fn serialize<S: serde::Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(self)
    }
}

#[cfg(feature = "serde")]
impl<'de> Deserialize<'de> for SeatId {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(d)?;
        raw.parse().map_err(|_| serde::de::Error::custom("invalid seat id"))
    }
}

impl SeatId {
    pub fn new(program: ProgramId, ordinal: u32) -> Result<Self, CoreError> {
        if ordinal == 0 { return Err(CoreError::InvalidId); }
        Ok(Self { program, ordinal })
    }

    pub fn program(&self) -> &ProgramId { &self.program }
    pub fn ordinal(&self) -> u32 { self.ordinal }
}

impl fmt::Display for SeatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.program, self.ordinal)
    }
}

impl FromStr for SeatId {
    type Err = CoreError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (prog, ord) = s.rsplit_once('-').ok_or(CoreError::InvalidId)?;
        let ordinal: u32 = ord.parse().map_err(|_| CoreError::InvalidId)?;
        SeatId::new(prog.parse()?, ordinal)
    }
}

/// Segment display name. Uniqueness within a Program is case-insensitive;
/// the raw spelling is preserved for output.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SegmentName(String);

impl SegmentName {
    pub fn new(s: impl Into<String>) -> Self {
        SegmentName(s.into())
    }

    pub fn as_str(&self) -> &str { &self.0 }

    pub fn normalized(&self) -> String { norm_text(&self.0) }

    /// Case-insensitive match against a declared membership token.
    pub fn matches(&self, token: &str) -> bool {
        self.normalized() == norm_text(token)
    }

    /// "Población general" / "General population" detection (prefix match,
    /// case-insensitive). Accent-free spellings match via the "pobl" prefix.
    pub fn is_general_population(&self) -> bool {
        let n = self.normalized();
        n.starts_with("pobl") || n.starts_with("general")
    }
}

impl fmt::Display for SegmentName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

impl From<&str> for SegmentName {
    fn from(s: &str) -> Self { SegmentName(s.to_string()) }
}
