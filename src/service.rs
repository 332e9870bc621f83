//! Transport-agnostic operation surface of the engine.
//!
//! Each operation takes the opaque, already-authenticated user identifier
//! supplied by the external auth collaborator (except puzzle reads, which
//! are public). Responses are public views: the target word, cipher shift
//! metadata, and theme text never leave the server except through the
//! dedicated hints.

use chrono::{NaiveDate, NaiveDateTime, Utc};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::{info, instrument};

use crate::db::{Attempt, NewPuzzle, Puzzle, PuzzleRepository};
use crate::error::EngineError;
use crate::generator::{CipherOptions, generate_cipher, generate_scramble};
use crate::hints::HintEvent;
use crate::lifecycle::{AttemptEngine, HintReceipt, SubmitOutcome};
use crate::puzzle::{AttemptMode, PuzzleKind, ShiftDirection, Variant};
use crate::scoring::{self, LeaderboardEntry};

/// Default and maximum leaderboard page sizes.
const DEFAULT_LEADERBOARD_LIMIT: i64 = 25;
const MAX_LEADERBOARD_LIMIT: i64 = 100;

/// Request to seed a puzzle from an externally curated target word.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePuzzleRequest {
    /// Calendar day (UTC) the puzzle belongs to.
    pub date: NaiveDate,
    /// Hour-of-day bucket, 0–23.
    pub slot: i32,
    /// Daily (canonical, unique per slot) or practice.
    pub kind: PuzzleKind,
    /// Disguise variant.
    pub variant: Variant,
    /// Curated target word, uppercase A–Z of the variant's length.
    pub target_word: String,
    /// Author-supplied theme text.
    #[serde(default)]
    pub theme_hint: String,
    /// Cipher only: fixed shift magnitude 1–25 (default random).
    pub shift: Option<u8>,
    /// Cipher only: fixed direction (default random).
    pub direction: Option<ShiftDirection>,
    /// Cipher only: positions to leave unshifted (default 1).
    pub unshifted_count: Option<usize>,
}

/// Request to start an attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartAttemptRequest {
    /// Puzzle to play.
    pub puzzle_id: i32,
    /// "daily" or "practice"; must match the puzzle's kind.
    pub mode: String,
    /// Whether the auth collaborator marked this user premium (bypasses
    /// the practice quota).
    #[serde(default)]
    pub premium: bool,
}

/// Request to consume a hint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UseHintRequest {
    /// Hint kind from the puzzle variant's catalog.
    pub kind: String,
    /// Current full guess, required by `check_positions`.
    pub guess: Option<String>,
}

/// Request to submit a guess.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitRequest {
    /// The guessed word.
    pub guess: String,
}

/// Public puzzle view. Never includes the target word, the generation
/// metadata, or the theme text (sold through `reveal_theme`).
#[derive(Debug, Clone, Serialize)]
pub struct PuzzleView {
    /// Puzzle id.
    pub id: i32,
    /// Calendar day (UTC).
    pub date: NaiveDate,
    /// Hour-of-day bucket.
    pub slot: i32,
    /// Daily or practice.
    pub kind: PuzzleKind,
    /// Disguise variant.
    pub variant: Variant,
    /// The disguised word.
    pub display_word: String,
    /// Candidate letters per position.
    pub letter_menus: Vec<String>,
    /// Initial menu index per position.
    pub start_indices: Vec<usize>,
}

impl PuzzleView {
    fn from_row(puzzle: &Puzzle) -> Result<Self, EngineError> {
        Ok(Self {
            id: *puzzle.id(),
            date: *puzzle.puzzle_date(),
            slot: *puzzle.slot(),
            kind: puzzle.parse_kind()?,
            variant: puzzle.parse_variant()?,
            display_word: puzzle.display_word().clone(),
            letter_menus: puzzle.parse_menus()?,
            start_indices: puzzle.parse_start_indices()?,
        })
    }
}

/// Player-facing attempt view.
#[derive(Debug, Clone, Serialize)]
pub struct AttemptView {
    /// Attempt id.
    pub id: i32,
    /// Puzzle being played.
    pub puzzle_id: i32,
    /// Daily or practice.
    pub mode: AttemptMode,
    /// Server clock start (UTC).
    pub started_at: NaiveDateTime,
    /// Terminal timestamp, if any.
    pub completed_at: Option<NaiveDateTime>,
    /// Raw solve time; NULL until solved and always NULL for give-ups.
    pub solve_time_ms: Option<i64>,
    /// Accumulated hint penalties.
    pub penalty_ms: i64,
    /// Ranking metric once solved.
    pub final_time_ms: Option<i64>,
    /// Consumed hints in order of use.
    pub hints_used: Vec<HintEvent>,
    /// Terminal flag.
    pub is_completed: bool,
    /// Whether the attempt was abandoned.
    pub gave_up: bool,
}

impl AttemptView {
    fn from_row(attempt: &Attempt) -> Result<Self, EngineError> {
        Ok(Self {
            id: *attempt.id(),
            puzzle_id: *attempt.puzzle_id(),
            mode: attempt.parse_mode()?,
            started_at: *attempt.started_at(),
            completed_at: *attempt.completed_at(),
            solve_time_ms: *attempt.solve_time_ms(),
            penalty_ms: *attempt.penalty_ms(),
            final_time_ms: *attempt.final_time_ms(),
            hints_used: attempt.parse_hint_events()?,
            is_completed: *attempt.is_completed(),
            gave_up: *attempt.gave_up(),
        })
    }
}

/// Response to a guess submission.
#[derive(Debug, Clone, Serialize)]
pub struct SubmitResponse {
    /// Whether the guess matched the target.
    pub correct: bool,
    /// The terminal attempt, present when correct.
    pub attempt: Option<AttemptView>,
    /// Rank among solved daily attempts, present for daily mode.
    pub rank: Option<i64>,
}

/// Response to a give-up.
#[derive(Debug, Clone, Serialize)]
pub struct GiveUpResponse {
    /// The revealed answer.
    pub target_word: String,
}

/// The engine's request/response surface.
#[derive(Debug, Clone)]
pub struct PuzzleService {
    engine: AttemptEngine,
}

impl PuzzleService {
    /// Creates the service over a repository.
    pub fn new(repo: PuzzleRepository) -> Self {
        Self {
            engine: AttemptEngine::new(repo),
        }
    }

    /// Creates the service over a preconfigured engine.
    pub fn with_engine(engine: AttemptEngine) -> Self {
        Self { engine }
    }

    fn repo(&self) -> &PuzzleRepository {
        self.engine.repo()
    }

    /// Seeds a puzzle from a curated word and persists it.
    ///
    /// # Errors
    ///
    /// [`EngineError::InvalidInput`] for bad words or parameters;
    /// [`EngineError::Conflict`] for a duplicate daily (date, slot,
    /// variant).
    #[instrument(skip(self, req), fields(date = %req.date, slot = req.slot, kind = %req.kind, variant = %req.variant))]
    pub fn create_puzzle(&self, req: CreatePuzzleRequest) -> Result<PuzzleView, EngineError> {
        if !(0..=23).contains(&req.slot) {
            return Err(EngineError::InvalidInput(format!(
                "slot must be in 0-23, got {}",
                req.slot
            )));
        }

        let mut rng = StdRng::from_os_rng();
        let generated = match req.variant {
            Variant::Cipher => {
                let defaults = CipherOptions::default();
                let opts = CipherOptions {
                    shift: req.shift,
                    direction: req.direction,
                    unshifted_count: req.unshifted_count.unwrap_or(defaults.unshifted_count),
                };
                generate_cipher(&mut rng, &req.target_word, &req.theme_hint, opts)?
            }
            Variant::Scramble => {
                generate_scramble(&mut rng, &req.target_word, &req.theme_hint)?
            }
        };

        let now = Utc::now().naive_utc();
        let row = NewPuzzle::from_generated(&generated, req.date, req.slot, req.kind, now)
            .map_err(EngineError::from)?;
        let puzzle = self.repo().insert_puzzle(row).map_err(|err| {
            if err.is_unique_violation() {
                EngineError::Conflict(format!(
                    "daily {} puzzle already exists for {} slot {}",
                    req.variant, req.date, req.slot
                ))
            } else {
                err.into()
            }
        })?;

        info!(puzzle_id = puzzle.id(), "Puzzle seeded");
        PuzzleView::from_row(&puzzle)
    }

    /// Public lookup of the canonical daily puzzle for a (date, slot,
    /// variant).
    ///
    /// # Errors
    ///
    /// [`EngineError::InvalidInput`] for an unknown variant string;
    /// [`EngineError::NotFound`] when no puzzle exists for the slot.
    #[instrument(skip(self))]
    pub fn get_puzzle(
        &self,
        date: NaiveDate,
        slot: i32,
        variant: &str,
    ) -> Result<PuzzleView, EngineError> {
        let variant = Variant::from_str(variant)
            .map_err(|_| EngineError::InvalidInput(format!("unknown variant '{variant}'")))?;
        let puzzle = self
            .repo()
            .find_daily_puzzle(date, slot, &variant.to_string())?
            .ok_or_else(|| {
                EngineError::NotFound(format!("no daily {variant} puzzle for {date} slot {slot}"))
            })?;
        PuzzleView::from_row(&puzzle)
    }

    /// Starts (or resumes) an attempt for the authenticated user.
    ///
    /// # Errors
    ///
    /// Propagates [`AttemptEngine::start`] errors;
    /// [`EngineError::InvalidInput`] for an unrecognized mode string.
    #[instrument(skip(self, req), fields(puzzle_id = req.puzzle_id, mode = %req.mode))]
    pub fn start_attempt(
        &self,
        user_id: &str,
        req: StartAttemptRequest,
    ) -> Result<AttemptView, EngineError> {
        let mode = AttemptMode::from_str(&req.mode)
            .map_err(|_| EngineError::InvalidInput(format!("invalid mode '{}'", req.mode)))?;
        let attempt = self
            .engine
            .start(user_id, req.puzzle_id, mode, req.premium)?;
        AttemptView::from_row(&attempt)
    }

    /// Consumes a hint for the authenticated user.
    ///
    /// # Errors
    ///
    /// Propagates [`AttemptEngine::use_hint`] errors.
    #[instrument(skip(self, req), fields(kind = %req.kind))]
    pub fn use_hint(
        &self,
        user_id: &str,
        attempt_id: i32,
        req: UseHintRequest,
    ) -> Result<HintReceipt, EngineError> {
        let mut rng = StdRng::from_os_rng();
        self.engine
            .use_hint(&mut rng, user_id, attempt_id, &req.kind, req.guess.as_deref())
    }

    /// Submits a guess for the authenticated user.
    ///
    /// # Errors
    ///
    /// Propagates [`AttemptEngine::submit`] errors.
    #[instrument(skip(self, req))]
    pub fn submit_attempt(
        &self,
        user_id: &str,
        attempt_id: i32,
        req: SubmitRequest,
    ) -> Result<SubmitResponse, EngineError> {
        match self.engine.submit(user_id, attempt_id, &req.guess)? {
            SubmitOutcome::Incorrect => Ok(SubmitResponse {
                correct: false,
                attempt: None,
                rank: None,
            }),
            SubmitOutcome::Solved { attempt, rank } => Ok(SubmitResponse {
                correct: true,
                attempt: Some(AttemptView::from_row(&attempt)?),
                rank,
            }),
        }
    }

    /// Abandons an attempt for the authenticated user, revealing the
    /// target word.
    ///
    /// # Errors
    ///
    /// Propagates [`AttemptEngine::give_up`] errors.
    #[instrument(skip(self))]
    pub fn give_up(&self, user_id: &str, attempt_id: i32) -> Result<GiveUpResponse, EngineError> {
        let target_word = self.engine.give_up(user_id, attempt_id)?;
        Ok(GiveUpResponse { target_word })
    }

    /// Public leaderboard for a daily puzzle, rank order.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Db`] on a storage failure.
    #[instrument(skip(self))]
    pub fn leaderboard(
        &self,
        puzzle_id: i32,
        limit: Option<i64>,
    ) -> Result<Vec<LeaderboardEntry>, EngineError> {
        let limit = limit
            .unwrap_or(DEFAULT_LEADERBOARD_LIMIT)
            .clamp(1, MAX_LEADERBOARD_LIMIT);
        scoring::leaderboard(self.repo(), puzzle_id, limit)
    }
}
