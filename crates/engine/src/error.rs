//! The module contains the error the engine can throw.
//!
//! The errors are:
//!
//! - [`Validation`] thrown when an input is malformed (non-positive points,
//!   empty batches, out-of-range awards). Nothing is written.
//! - [`InsufficientPoints`] thrown when a child cannot cover a purchase or a
//!   deduction with its available points.
//! - [`RewardNotAvailable`] thrown when a reward is missing or inactive.
//! - [`InvalidState`] thrown when a purchase is not `PENDING` anymore.
//! - [`UnknownChild`] thrown when one or more children do not exist.
//! - [`Conflict`] thrown when the per-child critical section could not be
//!   entered, even after one retry.
//!
//!  [`Validation`]: EngineError::Validation
//!  [`InsufficientPoints`]: EngineError::InsufficientPoints
//!  [`RewardNotAvailable`]: EngineError::RewardNotAvailable
//!  [`InvalidState`]: EngineError::InvalidState
//!  [`UnknownChild`]: EngineError::UnknownChild
//!  [`Conflict`]: EngineError::Conflict
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Insufficient points: required {required}, available {available}")]
    InsufficientPoints { required: i64, available: i64 },
    #[error("Reward not available: {0}")]
    RewardNotAvailable(String),
    #[error("Invalid state: {0}")]
    InvalidState(String),
    #[error("Unknown child: {}", format_ids(.0))]
    UnknownChild(Vec<i64>),
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

fn format_ids(ids: &[i64]) -> String {
    ids.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

impl EngineError {
    /// Whether the error is worth one more attempt with a fresh read.
    ///
    /// SQLite reports writer contention as `database is locked` /
    /// `database table is locked`; those are treated like a lost lock race.
    pub(crate) fn is_retryable(&self) -> bool {
        match self {
            Self::Conflict(_) => true,
            Self::Database(err) => err.to_string().contains("is locked"),
            _ => false,
        }
    }
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Validation(a), Self::Validation(b)) => a == b,
            (
                Self::InsufficientPoints {
                    required: r1,
                    available: a1,
                },
                Self::InsufficientPoints {
                    required: r2,
                    available: a2,
                },
            ) => r1 == r2 && a1 == a2,
            (Self::RewardNotAvailable(a), Self::RewardNotAvailable(b)) => a == b,
            (Self::InvalidState(a), Self::InvalidState(b)) => a == b,
            (Self::UnknownChild(a), Self::UnknownChild(b)) => a == b,
            (Self::Forbidden(a), Self::Forbidden(b)) => a == b,
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::Conflict(a), Self::Conflict(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
