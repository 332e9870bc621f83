//! Domain vocabulary for puzzles and attempts.

use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// How the target word is disguised.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Variant {
    /// Every letter rotated by a fixed alphabetic shift, some positions
    /// optionally exempt.
    Cipher,
    /// The target's letters randomly reordered (anagram).
    Scramble,
}

impl Variant {
    /// Fixed target-word length for this variant.
    ///
    /// The length is a variant parameter; nothing else in the crate
    /// hardcodes it.
    pub fn word_len(self) -> usize {
        match self {
            Self::Cipher => 5,
            Self::Scramble => 6,
        }
    }
}

/// Whether a puzzle is the canonical one for its (date, slot) or an
/// on-demand practice instance.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PuzzleKind {
    /// One canonical puzzle per (date, slot, variant), leaderboard-eligible.
    Daily,
    /// Unlimited (quota-limited for free users), non-leaderboard.
    Practice,
}

/// Mode of an attempt; must match the puzzle's kind.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AttemptMode {
    /// Canonical, idempotent, ranked.
    Daily,
    /// Fresh attempt per start, never ranked.
    Practice,
}

impl AttemptMode {
    /// The puzzle kind this mode is allowed to play.
    pub fn expected_kind(self) -> PuzzleKind {
        match self {
            Self::Daily => PuzzleKind::Daily,
            Self::Practice => PuzzleKind::Practice,
        }
    }
}

/// Direction of the cipher's alphabetic rotation.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ShiftDirection {
    /// Toward A (negative rotation).
    Left,
    /// Toward Z (positive rotation).
    Right,
}

impl ShiftDirection {
    /// Unit rotation step for this direction.
    pub fn step(self) -> i32 {
        match self {
            Self::Left => -1,
            Self::Right => 1,
        }
    }
}

/// Variant-specific generation audit data.
///
/// Retained for audit and debugging. Never exposed to players except
/// through the dedicated hint computations in [`crate::hints`]; in
/// particular the cipher shift amount and direction stay server-side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "variant", rename_all = "snake_case")]
pub enum GenerationMetadata {
    /// Cipher generation record.
    Cipher {
        /// Shift magnitude, 1–25.
        shift: u8,
        /// Rotation direction.
        direction: ShiftDirection,
        /// 1-based positions left unshifted, ascending.
        unshifted_positions: Vec<usize>,
    },
    /// Scramble generation record.
    Scramble {
        /// How many permutations were drawn before acceptance.
        permutation_attempts: u32,
        /// Whether the accepted permutation still equals the identity
        /// (best-effort retry exhausted).
        identity: bool,
    },
}

/// Output of the puzzle generator, not yet persisted.
#[derive(Debug, Clone, Getters)]
pub struct GeneratedPuzzle {
    /// Which disguise produced this puzzle.
    variant: Variant,
    /// The hidden answer, uppercase A–Z.
    target_word: String,
    /// The disguised word shown to the player.
    display_word: String,
    /// One candidate-letter menu per position, stored as strings.
    letter_menus: Vec<String>,
    /// Initial menu index per position; never reconstructs the target.
    start_indices: Vec<usize>,
    /// Author-supplied theme text, sold through the `reveal_theme` hint.
    theme_hint: String,
    /// Audit record of the generation parameters.
    metadata: GenerationMetadata,
}

impl GeneratedPuzzle {
    pub(crate) fn new(
        variant: Variant,
        target_word: String,
        display_word: String,
        letter_menus: Vec<String>,
        start_indices: Vec<usize>,
        theme_hint: String,
        metadata: GenerationMetadata,
    ) -> Self {
        Self {
            variant,
            target_word,
            display_word,
            letter_menus,
            start_indices,
            theme_hint,
            metadata,
        }
    }

    /// Borrowed view of the fields the hint catalog consumes.
    pub fn content(&self) -> PuzzleContent<'_> {
        PuzzleContent {
            variant: self.variant,
            target_word: &self.target_word,
            display_word: &self.display_word,
            theme_hint: &self.theme_hint,
            metadata: &self.metadata,
        }
    }
}

/// Borrowed puzzle view consumed by the hint catalog.
///
/// The catalog depends on the generator's output shape only; both the
/// in-memory [`GeneratedPuzzle`] and the persisted puzzle row can produce
/// one of these.
#[derive(Debug, Clone, Copy)]
pub struct PuzzleContent<'a> {
    /// Disguise variant.
    pub variant: Variant,
    /// Hidden answer.
    pub target_word: &'a str,
    /// Disguised word shown to the player.
    pub display_word: &'a str,
    /// Author-supplied theme text.
    pub theme_hint: &'a str,
    /// Generation audit record.
    pub metadata: &'a GenerationMetadata,
}
