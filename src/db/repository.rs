//! Database repository for puzzles and attempts.
//!
//! Every attempt mutation is a conditional update keyed on the row's
//! `version` counter; a lost race returns `None` so the caller can re-read
//! and retry instead of overwriting a concurrent writer's increment.

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use diesel::prelude::*;
use tracing::{debug, info, instrument};

use crate::db::{Attempt, NewAttempt, NewPuzzle, Puzzle, StoreError, schema};

/// Repository for puzzle and attempt rows.
#[derive(Debug, Clone)]
pub struct PuzzleRepository {
    db_path: String,
}

impl PuzzleRepository {
    /// Creates a repository for the database at the given path.
    ///
    /// Use `":memory:"` for an in-memory database (useful for tests, but
    /// note each connection then sees its own database; tests use a temp
    /// file instead).
    #[instrument(skip(db_path), fields(db_path = %db_path))]
    pub fn new(db_path: String) -> Self {
        info!(path = %db_path, "Creating PuzzleRepository");
        Self { db_path }
    }

    /// Establishes a database connection.
    #[instrument(skip(self))]
    fn connection(&self) -> Result<SqliteConnection, StoreError> {
        debug!(path = %self.db_path, "Establishing connection");
        Ok(SqliteConnection::establish(&self.db_path)?)
    }

    /// Inserts a puzzle row.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::UniqueViolation`] for a duplicate daily
    /// (date, slot, variant), or another [`StoreError`] on failure.
    #[instrument(skip(self, puzzle), fields(date = %puzzle.puzzle_date(), slot = puzzle.slot(), kind = %puzzle.kind(), variant = %puzzle.variant()))]
    pub fn insert_puzzle(&self, puzzle: NewPuzzle) -> Result<Puzzle, StoreError> {
        debug!("Inserting puzzle");
        let mut conn = self.connection()?;

        let row = diesel::insert_into(schema::puzzles::table)
            .values(&puzzle)
            .returning(Puzzle::as_returning())
            .get_result(&mut conn)?;

        info!(puzzle_id = row.id(), "Puzzle created");
        Ok(row)
    }

    /// Gets a puzzle by id. Returns `None` if not found.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on a database error.
    #[instrument(skip(self))]
    pub fn get_puzzle(&self, puzzle_id: i32) -> Result<Option<Puzzle>, StoreError> {
        let mut conn = self.connection()?;

        let puzzle = schema::puzzles::table
            .find(puzzle_id)
            .first::<Puzzle>(&mut conn)
            .optional()?;
        Ok(puzzle)
    }

    /// Finds the canonical daily puzzle for a (date, slot, variant).
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on a database error.
    #[instrument(skip(self))]
    pub fn find_daily_puzzle(
        &self,
        date: NaiveDate,
        slot: i32,
        variant: &str,
    ) -> Result<Option<Puzzle>, StoreError> {
        let mut conn = self.connection()?;

        let puzzle = schema::puzzles::table
            .filter(schema::puzzles::puzzle_date.eq(date))
            .filter(schema::puzzles::slot.eq(slot))
            .filter(schema::puzzles::variant.eq(variant))
            .filter(schema::puzzles::kind.eq("daily"))
            .first::<Puzzle>(&mut conn)
            .optional()?;
        Ok(puzzle)
    }

    /// Gets an attempt by id. Returns `None` if not found.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on a database error.
    #[instrument(skip(self))]
    pub fn get_attempt(&self, attempt_id: i32) -> Result<Option<Attempt>, StoreError> {
        let mut conn = self.connection()?;

        let attempt = schema::attempts::table
            .find(attempt_id)
            .first::<Attempt>(&mut conn)
            .optional()?;
        Ok(attempt)
    }

    /// Atomically gets or creates the canonical daily attempt for
    /// (user, puzzle). Returns the attempt and whether it was created.
    ///
    /// Re-invoking start must never reset a running timer, so the lookup
    /// and insert run inside one immediate transaction.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on a database error.
    #[instrument(skip(self, attempt), fields(user_id = %attempt.user_id(), puzzle_id = attempt.puzzle_id()))]
    pub fn start_daily_attempt(
        &self,
        attempt: NewAttempt,
    ) -> Result<(Attempt, bool), StoreError> {
        let mut conn = self.connection()?;

        conn.immediate_transaction(|conn| {
            let existing = schema::attempts::table
                .filter(schema::attempts::user_id.eq(attempt.user_id()))
                .filter(schema::attempts::puzzle_id.eq(attempt.puzzle_id()))
                .filter(schema::attempts::mode.eq("daily"))
                .first::<Attempt>(conn)
                .optional()?;

            if let Some(found) = existing {
                debug!(attempt_id = found.id(), "Daily attempt already exists");
                return Ok((found, false));
            }

            let created = diesel::insert_into(schema::attempts::table)
                .values(&attempt)
                .returning(Attempt::as_returning())
                .get_result(conn)?;

            info!(attempt_id = created.id(), "Daily attempt created");
            Ok((created, true))
        })
    }

    /// Creates a practice attempt, enforcing the free-user daily quota
    /// inside one immediate transaction (count and insert cannot race).
    ///
    /// Returns `None` when the quota is exhausted; `quota = None` skips the
    /// check (premium users).
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on a database error.
    #[instrument(skip(self, attempt), fields(user_id = %attempt.user_id(), puzzle_id = attempt.puzzle_id()))]
    pub fn insert_practice_attempt(
        &self,
        attempt: NewAttempt,
        quota: Option<i64>,
    ) -> Result<Option<Attempt>, StoreError> {
        let mut conn = self.connection()?;

        conn.immediate_transaction(|conn| {
            if let Some(quota) = quota {
                let day_start = attempt.started_at().date().and_time(chrono::NaiveTime::MIN);
                let day_end = day_start + TimeDelta::days(1);
                let used: i64 = schema::attempts::table
                    .filter(schema::attempts::user_id.eq(attempt.user_id()))
                    .filter(schema::attempts::mode.eq("practice"))
                    .filter(schema::attempts::started_at.ge(day_start))
                    .filter(schema::attempts::started_at.lt(day_end))
                    .count()
                    .get_result(conn)?;

                if used >= quota {
                    debug!(used, quota, "Practice quota exhausted");
                    return Ok(None);
                }
            }

            let created = diesel::insert_into(schema::attempts::table)
                .values(&attempt)
                .returning(Attempt::as_returning())
                .get_result(conn)?;

            info!(attempt_id = created.id(), "Practice attempt created");
            Ok(Some(created))
        })
    }

    /// Conditionally appends hint state: writes the new event list and
    /// cumulative penalty only if the row still has the expected version
    /// and is not terminal. Returns `None` if the condition failed.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on a database error.
    #[instrument(skip(self, hints_json))]
    pub fn update_attempt_hints(
        &self,
        attempt_id: i32,
        expected_version: i32,
        hints_json: String,
        penalty_ms: i64,
    ) -> Result<Option<Attempt>, StoreError> {
        let mut conn = self.connection()?;

        let updated = diesel::update(
            schema::attempts::table
                .filter(schema::attempts::id.eq(attempt_id))
                .filter(schema::attempts::version.eq(expected_version))
                .filter(schema::attempts::is_completed.eq(false)),
        )
        .set((
            schema::attempts::hints_used.eq(hints_json),
            schema::attempts::penalty_ms.eq(penalty_ms),
            schema::attempts::version.eq(schema::attempts::version + 1),
        ))
        .returning(Attempt::as_returning())
        .get_result(&mut conn)
        .optional()?;

        if updated.is_some() {
            info!(attempt_id, penalty_ms, "Hint state updated");
        } else {
            debug!(attempt_id, expected_version, "Hint update lost the race");
        }
        Ok(updated)
    }

    /// Conditionally marks an attempt solved with its computed times.
    /// Returns `None` if the version check failed or the row was already
    /// terminal.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on a database error.
    #[instrument(skip(self))]
    pub fn complete_attempt(
        &self,
        attempt_id: i32,
        expected_version: i32,
        completed_at: NaiveDateTime,
        solve_time_ms: i64,
        final_time_ms: i64,
    ) -> Result<Option<Attempt>, StoreError> {
        let mut conn = self.connection()?;

        let updated = diesel::update(
            schema::attempts::table
                .filter(schema::attempts::id.eq(attempt_id))
                .filter(schema::attempts::version.eq(expected_version))
                .filter(schema::attempts::is_completed.eq(false)),
        )
        .set((
            schema::attempts::completed_at.eq(Some(completed_at)),
            schema::attempts::solve_time_ms.eq(Some(solve_time_ms)),
            schema::attempts::final_time_ms.eq(Some(final_time_ms)),
            schema::attempts::is_completed.eq(true),
            schema::attempts::version.eq(schema::attempts::version + 1),
        ))
        .returning(Attempt::as_returning())
        .get_result(&mut conn)
        .optional()?;

        if updated.is_some() {
            info!(attempt_id, solve_time_ms, final_time_ms, "Attempt completed");
        }
        Ok(updated)
    }

    /// Conditionally marks an attempt given up: terminal, with NULL solve
    /// and final times so it can never enter scoring. Returns `None` if
    /// the version check failed or the row was already terminal.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on a database error.
    #[instrument(skip(self))]
    pub fn give_up_attempt(
        &self,
        attempt_id: i32,
        expected_version: i32,
        completed_at: NaiveDateTime,
    ) -> Result<Option<Attempt>, StoreError> {
        let mut conn = self.connection()?;

        let updated = diesel::update(
            schema::attempts::table
                .filter(schema::attempts::id.eq(attempt_id))
                .filter(schema::attempts::version.eq(expected_version))
                .filter(schema::attempts::is_completed.eq(false)),
        )
        .set((
            schema::attempts::completed_at.eq(Some(completed_at)),
            schema::attempts::solve_time_ms.eq(None::<i64>),
            schema::attempts::final_time_ms.eq(None::<i64>),
            schema::attempts::is_completed.eq(true),
            schema::attempts::gave_up.eq(true),
            schema::attempts::version.eq(schema::attempts::version + 1),
        ))
        .returning(Attempt::as_returning())
        .get_result(&mut conn)
        .optional()?;

        if updated.is_some() {
            info!(attempt_id, "Attempt given up");
        }
        Ok(updated)
    }

    /// Counts solved daily attempts on a puzzle with a strictly smaller
    /// final time.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on a database error.
    #[instrument(skip(self))]
    pub fn count_completed_faster(
        &self,
        puzzle_id: i32,
        final_time_ms: i64,
    ) -> Result<i64, StoreError> {
        let mut conn = self.connection()?;

        let count = Self::ranked_attempts(puzzle_id)
            .filter(schema::attempts::final_time_ms.lt(final_time_ms))
            .count()
            .get_result(&mut conn)?;
        Ok(count)
    }

    /// Counts solved daily attempts on a puzzle tied on final time but
    /// completed earlier.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on a database error.
    #[instrument(skip(self))]
    pub fn count_tied_earlier(
        &self,
        puzzle_id: i32,
        final_time_ms: i64,
        completed_at: NaiveDateTime,
    ) -> Result<i64, StoreError> {
        let mut conn = self.connection()?;

        let count = Self::ranked_attempts(puzzle_id)
            .filter(schema::attempts::final_time_ms.eq(final_time_ms))
            .filter(schema::attempts::completed_at.lt(completed_at))
            .count()
            .get_result(&mut conn)?;
        Ok(count)
    }

    /// Loads the solved daily attempts on a puzzle ordered by
    /// (final time, completion time), up to `limit` rows.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on a database error.
    #[instrument(skip(self))]
    pub fn leaderboard_attempts(
        &self,
        puzzle_id: i32,
        limit: i64,
    ) -> Result<Vec<Attempt>, StoreError> {
        let mut conn = self.connection()?;

        let rows = Self::ranked_attempts(puzzle_id)
            .order((
                schema::attempts::final_time_ms.asc(),
                schema::attempts::completed_at.asc(),
            ))
            .limit(limit)
            .load::<Attempt>(&mut conn)?;

        debug!(puzzle_id, count = rows.len(), "Leaderboard loaded");
        Ok(rows)
    }

    /// Base filter for ranking queries: solved daily attempts on a puzzle,
    /// give-ups excluded (they carry NULL final times).
    fn ranked_attempts(
        puzzle_id: i32,
    ) -> schema::attempts::BoxedQuery<'static, diesel::sqlite::Sqlite> {
        schema::attempts::table
            .filter(schema::attempts::puzzle_id.eq(puzzle_id))
            .filter(schema::attempts::mode.eq("daily"))
            .filter(schema::attempts::is_completed.eq(true))
            .filter(schema::attempts::gave_up.eq(false))
            .filter(schema::attempts::final_time_ms.is_not_null())
            .into_boxed()
    }
}
