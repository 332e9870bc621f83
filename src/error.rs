//! Engine-level error taxonomy.

use derive_more::{Display, Error};

use crate::db::StoreError;

/// Errors surfaced by puzzle generation, the attempt lifecycle, and the
/// service layer.
///
/// `AlreadyUsed` and `AlreadyCompleted` are idempotent-conflict signals
/// rather than hard failures; callers should proceed with the state they
/// already hold. An incorrect guess is a normal negative result and never
/// appears here.
#[derive(Debug, Clone, Display, Error)]
pub enum EngineError {
    /// Puzzle or attempt does not exist (or is not visible to the caller).
    #[display("not found: {_0}")]
    NotFound(#[error(not(source))] String),
    /// The attempt belongs to another user.
    #[display("attempt belongs to another user")]
    Forbidden,
    /// Malformed guess, unknown hint kind, or out-of-range generation
    /// parameter. Generation-time violations are fatal, never coerced.
    #[display("invalid input: {_0}")]
    InvalidInput(#[error(not(source))] String),
    /// Hint quota or practice-puzzle daily quota exhausted.
    #[display("limit reached: {_0}")]
    LimitReached(#[error(not(source))] String),
    /// This hint kind was already consumed in this attempt.
    #[display("hint kind already used in this attempt")]
    AlreadyUsed,
    /// The attempt is already terminal.
    #[display("attempt is already completed")]
    AlreadyCompleted,
    /// Duplicate daily puzzle slot, or an update lost a concurrent race.
    #[display("conflict: {_0}")]
    Conflict(#[error(not(source))] String),
    /// Storage layer failure.
    #[display("storage error: {_0}")]
    Db(#[error(source)] StoreError),
}

impl From<StoreError> for EngineError {
    fn from(err: StoreError) -> Self {
        Self::Db(err)
    }
}
