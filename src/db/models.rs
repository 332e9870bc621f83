//! Database models and their domain-type parsers.

use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use derive_getters::Getters;
use derive_new::new;
use diesel::prelude::*;

use crate::db::{StoreError, schema};
use crate::hints::HintEvent;
use crate::puzzle::{
    AttemptMode, GeneratedPuzzle, GenerationMetadata, PuzzleContent, PuzzleKind, Variant,
};

/// Persisted puzzle. Immutable after creation.
#[derive(Debug, Clone, Queryable, Identifiable, Selectable, Getters)]
#[diesel(table_name = schema::puzzles)]
pub struct Puzzle {
    id: i32,
    puzzle_date: NaiveDate,
    slot: i32,
    kind: String,
    variant: String,
    target_word: String,
    display_word: String,
    letter_menus: String,
    start_indices: String,
    theme_hint: String,
    metadata: String,
    created_at: NaiveDateTime,
}

impl Puzzle {
    /// Parses the stored kind string.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Corrupt`] if the stored value is not a valid
    /// kind.
    pub fn parse_kind(&self) -> Result<PuzzleKind, StoreError> {
        PuzzleKind::from_str(&self.kind)
            .map_err(|_| StoreError::Corrupt(format!("invalid puzzle kind '{}'", self.kind)))
    }

    /// Parses the stored variant string.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Corrupt`] if the stored value is not a valid
    /// variant.
    pub fn parse_variant(&self) -> Result<Variant, StoreError> {
        Variant::from_str(&self.variant)
            .map_err(|_| StoreError::Corrupt(format!("invalid puzzle variant '{}'", self.variant)))
    }

    /// Parses the stored letter menus JSON column.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Corrupt`] on malformed JSON.
    pub fn parse_menus(&self) -> Result<Vec<String>, StoreError> {
        Ok(serde_json::from_str(&self.letter_menus)?)
    }

    /// Parses the stored start indices JSON column.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Corrupt`] on malformed JSON.
    pub fn parse_start_indices(&self) -> Result<Vec<usize>, StoreError> {
        Ok(serde_json::from_str(&self.start_indices)?)
    }

    /// Parses the stored generation metadata JSON column.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Corrupt`] on malformed JSON.
    pub fn parse_metadata(&self) -> Result<GenerationMetadata, StoreError> {
        Ok(serde_json::from_str(&self.metadata)?)
    }

    /// Builds the hint-catalog view of this puzzle from parsed metadata.
    pub fn content<'a>(
        &'a self,
        variant: Variant,
        metadata: &'a GenerationMetadata,
    ) -> PuzzleContent<'a> {
        PuzzleContent {
            variant,
            target_word: &self.target_word,
            display_word: &self.display_word,
            theme_hint: &self.theme_hint,
            metadata,
        }
    }
}

/// Insertable puzzle model.
#[derive(Debug, Clone, Insertable, new, Getters)]
#[diesel(table_name = schema::puzzles)]
pub struct NewPuzzle {
    puzzle_date: NaiveDate,
    slot: i32,
    kind: String,
    variant: String,
    target_word: String,
    display_word: String,
    letter_menus: String,
    start_indices: String,
    theme_hint: String,
    metadata: String,
    created_at: NaiveDateTime,
}

impl NewPuzzle {
    /// Converts generator output into an insertable row.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Corrupt`] if a JSON column fails to serialize.
    pub fn from_generated(
        generated: &GeneratedPuzzle,
        puzzle_date: NaiveDate,
        slot: i32,
        kind: PuzzleKind,
        created_at: NaiveDateTime,
    ) -> Result<Self, StoreError> {
        Ok(Self::new(
            puzzle_date,
            slot,
            kind.to_string(),
            generated.variant().to_string(),
            generated.target_word().clone(),
            generated.display_word().clone(),
            serde_json::to_string(generated.letter_menus())?,
            serde_json::to_string(generated.start_indices())?,
            generated.theme_hint().clone(),
            serde_json::to_string(generated.metadata())?,
            created_at,
        ))
    }
}

/// Persisted attempt. Mutated only through version-checked updates.
#[derive(Debug, Clone, Queryable, Identifiable, Associations, Selectable, Getters)]
#[diesel(table_name = schema::attempts)]
#[diesel(belongs_to(Puzzle))]
pub struct Attempt {
    id: i32,
    user_id: String,
    puzzle_id: i32,
    mode: String,
    started_at: NaiveDateTime,
    completed_at: Option<NaiveDateTime>,
    solve_time_ms: Option<i64>,
    penalty_ms: i64,
    final_time_ms: Option<i64>,
    hints_used: String,
    is_completed: bool,
    gave_up: bool,
    version: i32,
}

impl Attempt {
    /// Parses the stored mode string.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Corrupt`] if the stored value is not a valid
    /// mode.
    pub fn parse_mode(&self) -> Result<AttemptMode, StoreError> {
        AttemptMode::from_str(&self.mode)
            .map_err(|_| StoreError::Corrupt(format!("invalid attempt mode '{}'", self.mode)))
    }

    /// Parses the stored hint events JSON column, in order of use.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Corrupt`] on malformed JSON.
    pub fn parse_hint_events(&self) -> Result<Vec<HintEvent>, StoreError> {
        Ok(serde_json::from_str(&self.hints_used)?)
    }
}

/// Insertable attempt model; timing and hint columns start at their
/// schema defaults.
#[derive(Debug, Clone, Insertable, new, Getters)]
#[diesel(table_name = schema::attempts)]
pub struct NewAttempt {
    user_id: String,
    puzzle_id: i32,
    mode: String,
    started_at: NaiveDateTime,
}
