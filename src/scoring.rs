//! Rank computation and leaderboard listing for solved daily attempts.

use derive_getters::Getters;
use serde::Serialize;
use tracing::{debug, instrument};

use crate::db::{Attempt, PuzzleRepository};
use crate::error::EngineError;
use crate::puzzle::AttemptMode;

/// Computes an attempt's rank among solved daily attempts on its puzzle.
///
/// Total order: `final_time_ms` ascending, ties broken by earlier
/// `completed_at` (arrival order). Returns `None` for practice attempts,
/// give-ups, and attempts that are not yet solved.
///
/// # Errors
///
/// Returns [`EngineError::Db`] on a storage failure.
#[instrument(skip(repo, attempt), fields(attempt_id = attempt.id(), puzzle_id = attempt.puzzle_id()))]
pub fn rank_attempt(
    repo: &PuzzleRepository,
    attempt: &Attempt,
) -> Result<Option<i64>, EngineError> {
    if attempt.parse_mode()? != AttemptMode::Daily {
        return Ok(None);
    }
    if !attempt.is_completed() || *attempt.gave_up() {
        return Ok(None);
    }
    let (Some(final_time_ms), Some(completed_at)) =
        (*attempt.final_time_ms(), *attempt.completed_at())
    else {
        return Ok(None);
    };

    let faster = repo.count_completed_faster(*attempt.puzzle_id(), final_time_ms)?;
    let tied_earlier =
        repo.count_tied_earlier(*attempt.puzzle_id(), final_time_ms, completed_at)?;
    let rank = faster + tied_earlier + 1;

    debug!(faster, tied_earlier, rank, "Rank computed");
    Ok(Some(rank))
}

/// One leaderboard row for a daily puzzle.
#[derive(Debug, Clone, Serialize, Getters)]
pub struct LeaderboardEntry {
    /// Rank, 1-based, unique per puzzle.
    rank: i64,
    /// Opaque user identifier.
    user_id: String,
    /// Ranking metric: solve time plus penalties.
    final_time_ms: i64,
    /// Raw solve time.
    solve_time_ms: i64,
    /// Accumulated hint penalties.
    penalty_ms: i64,
    /// Hints consumed during the attempt.
    hints_used_count: usize,
}

/// Lists the top solved daily attempts on a puzzle in rank order.
///
/// # Errors
///
/// Returns [`EngineError::Db`] on a storage failure.
#[instrument(skip(repo))]
pub fn leaderboard(
    repo: &PuzzleRepository,
    puzzle_id: i32,
    limit: i64,
) -> Result<Vec<LeaderboardEntry>, EngineError> {
    let attempts = repo.leaderboard_attempts(puzzle_id, limit)?;

    let mut entries = Vec::with_capacity(attempts.len());
    for (index, attempt) in attempts.iter().enumerate() {
        // Rows arrive ordered by (final_time_ms, completed_at), the same
        // total order rank_attempt counts, so position is rank.
        entries.push(LeaderboardEntry {
            rank: index as i64 + 1,
            user_id: attempt.user_id().clone(),
            final_time_ms: attempt.final_time_ms().unwrap_or_default(),
            solve_time_ms: attempt.solve_time_ms().unwrap_or_default(),
            penalty_ms: *attempt.penalty_ms(),
            hints_used_count: attempt.parse_hint_events()?.len(),
        });
    }
    Ok(entries)
}
