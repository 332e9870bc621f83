//! Attempt lifecycle: start, hint, submit, and give-up handlers.
//!
//! States: `Active` → `Completed` | `GaveUp`; both terminal, and no
//! transition ever leaves a terminal state. Handlers are stateless against
//! the shared store; every mutation is a version-checked conditional write
//! with a bounded re-read retry, so concurrent client retries cannot
//! overwrite each other's hint penalties or completion times.

use std::str::FromStr;

use chrono::Utc;
use rand::Rng;
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::db::{Attempt, NewAttempt, PuzzleRepository, StoreError};
use crate::error::EngineError;
use crate::hints::{
    CipherHintKind, HintEvent, HintOutcome, MAX_HINTS_PER_ATTEMPT, ScrambleHintKind,
    build_cipher_hint, build_scramble_hint,
};
use crate::puzzle::{AttemptMode, Variant};
use crate::scoring;

/// Practice attempts per day for free users unless configured otherwise.
const DEFAULT_PRACTICE_QUOTA: i64 = 5;

/// Bounded retries when a conditional write loses a version race.
const UPDATE_RETRIES: usize = 3;

/// Result of a successful hint request.
#[derive(Debug, Clone, Serialize)]
pub struct HintReceipt {
    /// Player-facing hint text (or the "finish your guess" prompt).
    pub message: String,
    /// Kind-specific structured payload; `null` when nothing was produced.
    pub meta: serde_json::Value,
    /// Cumulative penalty on the attempt after this request.
    pub penalty_ms: i64,
    /// Hints consumed on the attempt after this request.
    pub hints_used_count: usize,
    /// Whether this request consumed a hint and charged its penalty.
    pub charged: bool,
}

/// Result of a guess submission.
#[derive(Debug, Clone)]
pub enum SubmitOutcome {
    /// Wrong guess: free, no state change.
    Incorrect,
    /// Correct (or idempotent resend): the terminal attempt and, for daily
    /// mode, its rank.
    Solved {
        /// The completed attempt row.
        attempt: Attempt,
        /// Rank among solved daily attempts; `None` for practice.
        rank: Option<i64>,
    },
}

/// Request handlers for the attempt state machine.
///
/// Holds no per-attempt state; safe to share across concurrent requests.
#[derive(Debug, Clone)]
pub struct AttemptEngine {
    repo: PuzzleRepository,
    practice_quota: i64,
}

impl AttemptEngine {
    /// Creates an engine over the given repository with the default
    /// free-user practice quota.
    pub fn new(repo: PuzzleRepository) -> Self {
        Self {
            repo,
            practice_quota: DEFAULT_PRACTICE_QUOTA,
        }
    }

    /// Overrides the free-user daily practice quota.
    pub fn with_practice_quota(mut self, quota: i64) -> Self {
        self.practice_quota = quota;
        self
    }

    /// Starts (or, for daily mode, resumes) an attempt on a puzzle.
    ///
    /// Daily starts are idempotent: a repeat start returns the existing
    /// attempt without resetting its timer or hints. Practice starts
    /// always create a fresh attempt, subject to the free-user quota;
    /// `premium` bypasses the quota.
    ///
    /// # Errors
    ///
    /// [`EngineError::NotFound`] if the puzzle is missing or its kind does
    /// not match the requested mode; [`EngineError::LimitReached`] when
    /// the practice quota is exhausted.
    #[instrument(skip(self))]
    pub fn start(
        &self,
        user_id: &str,
        puzzle_id: i32,
        mode: AttemptMode,
        premium: bool,
    ) -> Result<Attempt, EngineError> {
        let puzzle = self
            .repo
            .get_puzzle(puzzle_id)?
            .ok_or_else(|| EngineError::NotFound(format!("puzzle {puzzle_id}")))?;
        if puzzle.parse_kind()? != mode.expected_kind() {
            return Err(EngineError::NotFound(format!(
                "no {mode} puzzle with id {puzzle_id}"
            )));
        }

        let now = Utc::now().naive_utc();
        let new_attempt = NewAttempt::new(user_id.to_string(), puzzle_id, mode.to_string(), now);

        match mode {
            AttemptMode::Daily => {
                let (attempt, created) = self.repo.start_daily_attempt(new_attempt)?;
                info!(attempt_id = attempt.id(), created, "Daily attempt started");
                Ok(attempt)
            }
            AttemptMode::Practice => {
                let quota = (!premium).then_some(self.practice_quota);
                let attempt = self
                    .repo
                    .insert_practice_attempt(new_attempt, quota)?
                    .ok_or_else(|| {
                        EngineError::LimitReached(format!(
                            "daily practice quota of {} attempts used",
                            self.practice_quota
                        ))
                    })?;
                info!(attempt_id = attempt.id(), "Practice attempt started");
                Ok(attempt)
            }
        }
    }

    /// Consumes a hint on an active attempt.
    ///
    /// On success the hint event is appended and its fixed penalty added
    /// atomically. A `check_positions` request without a full guess is
    /// answered but neither consumed nor charged.
    ///
    /// # Errors
    ///
    /// [`EngineError::Forbidden`] for another user's attempt,
    /// [`EngineError::AlreadyCompleted`] once terminal,
    /// [`EngineError::LimitReached`] after 3 hints,
    /// [`EngineError::AlreadyUsed`] for a repeated kind, and
    /// [`EngineError::InvalidInput`] for a kind outside the puzzle
    /// variant's catalog.
    #[instrument(skip(self, rng))]
    pub fn use_hint<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        user_id: &str,
        attempt_id: i32,
        kind: &str,
        guess: Option<&str>,
    ) -> Result<HintReceipt, EngineError> {
        for _ in 0..UPDATE_RETRIES {
            let attempt = self.load_owned_attempt(user_id, attempt_id)?;
            if *attempt.is_completed() {
                return Err(EngineError::AlreadyCompleted);
            }
            let events = attempt.parse_hint_events()?;
            if events.len() >= MAX_HINTS_PER_ATTEMPT {
                return Err(EngineError::LimitReached(format!(
                    "all {MAX_HINTS_PER_ATTEMPT} hints used"
                )));
            }

            let puzzle = self
                .repo
                .get_puzzle(*attempt.puzzle_id())?
                .ok_or_else(|| EngineError::NotFound(format!("puzzle {}", attempt.puzzle_id())))?;
            let variant = puzzle.parse_variant()?;
            let metadata = puzzle.parse_metadata()?;
            let content = puzzle.content(variant, &metadata);

            // Kind strings parse against the variant's own closed catalog,
            // so a scramble kind on a cipher puzzle is invalid input.
            let (canonical, penalty, outcome) = match variant {
                Variant::Cipher => {
                    let kind = CipherHintKind::from_str(kind).map_err(|_| {
                        EngineError::InvalidInput(format!("unknown cipher hint kind '{kind}'"))
                    })?;
                    if events.iter().any(|e| e.kind == kind.to_string()) {
                        return Err(EngineError::AlreadyUsed);
                    }
                    (
                        kind.to_string(),
                        kind.penalty_ms(),
                        build_cipher_hint(rng, kind, &content, guess),
                    )
                }
                Variant::Scramble => {
                    let kind = ScrambleHintKind::from_str(kind).map_err(|_| {
                        EngineError::InvalidInput(format!("unknown scramble hint kind '{kind}'"))
                    })?;
                    if events.iter().any(|e| e.kind == kind.to_string()) {
                        return Err(EngineError::AlreadyUsed);
                    }
                    (
                        kind.to_string(),
                        kind.penalty_ms(),
                        build_scramble_hint(rng, kind, &content, guess),
                    )
                }
            };

            match outcome {
                HintOutcome::NeedsFullGuess(message) => {
                    debug!(attempt_id, kind = %canonical, "Hint needs a full guess; not charged");
                    return Ok(HintReceipt {
                        message,
                        meta: serde_json::Value::Null,
                        penalty_ms: *attempt.penalty_ms(),
                        hints_used_count: events.len(),
                        charged: false,
                    });
                }
                HintOutcome::Produced(produced) => {
                    let mut events = events;
                    events.push(HintEvent {
                        kind: canonical.clone(),
                        penalty_ms: penalty,
                        used_at: Utc::now().naive_utc(),
                        message: produced.message.clone(),
                        meta: produced.meta.clone(),
                    });
                    let hints_json =
                        serde_json::to_string(&events).map_err(StoreError::from)?;
                    let new_penalty = *attempt.penalty_ms() + penalty;

                    if let Some(updated) = self.repo.update_attempt_hints(
                        attempt_id,
                        *attempt.version(),
                        hints_json,
                        new_penalty,
                    )? {
                        info!(
                            attempt_id,
                            kind = %canonical,
                            penalty_ms = *updated.penalty_ms(),
                            "Hint consumed"
                        );
                        return Ok(HintReceipt {
                            message: produced.message,
                            meta: produced.meta,
                            penalty_ms: *updated.penalty_ms(),
                            hints_used_count: events.len(),
                            charged: true,
                        });
                    }
                    // Lost the version race; re-read and retry.
                    warn!(attempt_id, "Hint update raced; retrying");
                }
            }
        }
        Err(EngineError::Conflict(
            "attempt was modified concurrently; retry".to_string(),
        ))
    }

    /// Submits a guess against an attempt's target word.
    ///
    /// Wrong guesses are free negative results with no state change. A
    /// resend to an already-solved attempt returns the stored result and
    /// never recomputes times. A correct guess computes
    /// `solve_time_ms = max(0, now - started_at)` server-side and hands
    /// off to ranking (daily mode only).
    ///
    /// # Errors
    ///
    /// [`EngineError::Forbidden`]/[`EngineError::NotFound`] as for hints;
    /// [`EngineError::AlreadyCompleted`] on a given-up attempt;
    /// [`EngineError::InvalidInput`] for a malformed guess.
    #[instrument(skip(self))]
    pub fn submit(
        &self,
        user_id: &str,
        attempt_id: i32,
        guess: &str,
    ) -> Result<SubmitOutcome, EngineError> {
        for _ in 0..UPDATE_RETRIES {
            let attempt = self.load_owned_attempt(user_id, attempt_id)?;
            let puzzle = self
                .repo
                .get_puzzle(*attempt.puzzle_id())?
                .ok_or_else(|| EngineError::NotFound(format!("puzzle {}", attempt.puzzle_id())))?;

            if *attempt.gave_up() {
                return Err(EngineError::AlreadyCompleted);
            }
            if *attempt.is_completed() {
                let rank = scoring::rank_attempt(&self.repo, &attempt)?;
                debug!(attempt_id, "Resend of a solved attempt; stored result returned");
                return Ok(SubmitOutcome::Solved { attempt, rank });
            }

            let normalized = guess.trim().to_ascii_uppercase();
            let target = puzzle.target_word();
            if normalized.len() != target.len()
                || !normalized.chars().all(|c| c.is_ascii_uppercase())
            {
                return Err(EngineError::InvalidInput(format!(
                    "guess must be {} letters A-Z",
                    target.len()
                )));
            }

            if &normalized != target {
                debug!(attempt_id, "Incorrect guess; no state change");
                return Ok(SubmitOutcome::Incorrect);
            }

            let now = Utc::now().naive_utc();
            let solve_time_ms = (now - *attempt.started_at()).num_milliseconds().max(0);
            let final_time_ms = solve_time_ms + *attempt.penalty_ms();

            if let Some(updated) = self.repo.complete_attempt(
                attempt_id,
                *attempt.version(),
                now,
                solve_time_ms,
                final_time_ms,
            )? {
                let rank = scoring::rank_attempt(&self.repo, &updated)?;
                info!(attempt_id, solve_time_ms, final_time_ms, ?rank, "Attempt solved");
                return Ok(SubmitOutcome::Solved {
                    attempt: updated,
                    rank,
                });
            }
            // Raced with a concurrent submit or hint; re-read. If the other
            // writer completed the attempt, the next pass returns its
            // stored result.
            warn!(attempt_id, "Completion raced; retrying");
        }
        Err(EngineError::Conflict(
            "attempt was modified concurrently; retry".to_string(),
        ))
    }

    /// Abandons an attempt, revealing the target word.
    ///
    /// Idempotent: a repeat give-up re-returns the target. The terminal
    /// row carries NULL solve/final times, so give-ups never enter
    /// scoring.
    ///
    /// # Errors
    ///
    /// [`EngineError::Forbidden`]/[`EngineError::NotFound`] as for hints;
    /// [`EngineError::AlreadyCompleted`] if the attempt was solved.
    #[instrument(skip(self))]
    pub fn give_up(&self, user_id: &str, attempt_id: i32) -> Result<String, EngineError> {
        for _ in 0..UPDATE_RETRIES {
            let attempt = self.load_owned_attempt(user_id, attempt_id)?;
            let puzzle = self
                .repo
                .get_puzzle(*attempt.puzzle_id())?
                .ok_or_else(|| EngineError::NotFound(format!("puzzle {}", attempt.puzzle_id())))?;

            if *attempt.gave_up() {
                debug!(attempt_id, "Repeat give-up; target re-returned");
                return Ok(puzzle.target_word().clone());
            }
            if *attempt.is_completed() {
                return Err(EngineError::AlreadyCompleted);
            }

            let now = Utc::now().naive_utc();
            if self
                .repo
                .give_up_attempt(attempt_id, *attempt.version(), now)?
                .is_some()
            {
                info!(attempt_id, "Attempt abandoned");
                return Ok(puzzle.target_word().clone());
            }
            warn!(attempt_id, "Give-up raced; retrying");
        }
        Err(EngineError::Conflict(
            "attempt was modified concurrently; retry".to_string(),
        ))
    }

    /// Loads an attempt and enforces ownership.
    fn load_owned_attempt(
        &self,
        user_id: &str,
        attempt_id: i32,
    ) -> Result<Attempt, EngineError> {
        let attempt = self
            .repo
            .get_attempt(attempt_id)?
            .ok_or_else(|| EngineError::NotFound(format!("attempt {attempt_id}")))?;
        if attempt.user_id() != user_id {
            return Err(EngineError::Forbidden);
        }
        Ok(attempt)
    }

    /// The repository this engine operates on.
    pub fn repo(&self) -> &PuzzleRepository {
        &self.repo
    }
}
