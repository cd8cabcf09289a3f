//! Minimal error set for core-domain validation & parsing.

use core::fmt;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CoreError {
    InvalidId,
    InvalidToken,
    InvalidTimestamp,
    DomainOutOfRange(&'static str),
    SeatNotAvailable,
    SeatNotAssigned,
    SeatEmpty,
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoreError::InvalidId => write!(f, "invalid id"),
            CoreError::InvalidToken => write!(f, "invalid token"),
            CoreError::InvalidTimestamp => write!(f, "invalid timestamp"),
            CoreError::DomainOutOfRange(k) => write!(f, "domain out of range: {k}"),
            CoreError::SeatNotAvailable => write!(f, "seat is not available"),
            CoreError::SeatNotAssigned => write!(f, "seat is not assigned"),
            CoreError::SeatEmpty => write!(f, "seat has no occupant"),
        }
    }
}
