//! Per-variant hint catalogs, pricing, and hint computation.
//!
//! Each variant's hint set is its own closed enum, so a scramble hint on a
//! cipher puzzle is unrepresentable. Hint computation depends only on the
//! generator's output shape ([`PuzzleContent`]); the attempt lifecycle owns
//! charging and bookkeeping.

use chrono::NaiveDateTime;
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use serde_json::json;
use strum::{Display, EnumString};

use crate::alphabet::letter_distance;
use crate::puzzle::{GenerationMetadata, PuzzleContent};

/// Maximum hint events per attempt, across all kinds.
pub const MAX_HINTS_PER_ATTEMPT: usize = 3;

/// How many unshifted positions the cipher `unshifted_positions` hint may
/// reveal.
const UNSHIFTED_REVEAL_LIMIT: usize = 2;

/// Hint kinds available on cipher puzzles.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum CipherHintKind {
    /// Counts positions of a full guess that match the target.
    CheckPositions,
    /// Reveals the shift magnitude; direction is withheld.
    ShiftAmount,
    /// Reveals up to 2 positions that were left unshifted.
    UnshiftedPositions,
}

impl CipherHintKind {
    /// Fixed penalty charged the moment this hint is produced.
    pub fn penalty_ms(self) -> i64 {
        match self {
            Self::CheckPositions => 5_000,
            Self::ShiftAmount => 8_000,
            Self::UnshiftedPositions => 10_000,
        }
    }
}

/// Hint kinds available on scramble puzzles.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ScrambleHintKind {
    /// Counts positions of a full guess that match the target.
    CheckPositions,
    /// Reveals one random position's correct letter.
    RevealPosition,
    /// Reveals the puzzle's theme text, title-cased.
    RevealTheme,
}

impl ScrambleHintKind {
    /// Fixed penalty charged the moment this hint is produced.
    pub fn penalty_ms(self) -> i64 {
        match self {
            Self::CheckPositions => 5_000,
            Self::RevealPosition => 8_000,
            Self::RevealTheme => 10_000,
        }
    }
}

/// Player-facing output of a produced hint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HintContent {
    /// Human-readable hint text.
    pub message: String,
    /// Kind-specific structured payload.
    pub meta: serde_json::Value,
}

/// Result of a hint computation.
#[derive(Debug, Clone)]
pub enum HintOutcome {
    /// A hint was produced; the caller must charge its penalty and record
    /// the event.
    Produced(HintContent),
    /// `check_positions` was asked without a full guess. Not charged, not
    /// consumed; the caller relays the message and the player retries.
    NeedsFullGuess(String),
}

/// One consumed hint, stored on the attempt in order of use.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HintEvent {
    /// Canonical snake_case kind string.
    pub kind: String,
    /// Penalty charged at the moment of use.
    pub penalty_ms: i64,
    /// When the hint was consumed (UTC).
    pub used_at: NaiveDateTime,
    /// Player-facing text returned at the time.
    pub message: String,
    /// Kind-specific structured payload.
    pub meta: serde_json::Value,
}

/// Computes a cipher hint from the puzzle content and an optional guess.
pub fn build_cipher_hint<R: Rng + ?Sized>(
    rng: &mut R,
    kind: CipherHintKind,
    puzzle: &PuzzleContent<'_>,
    guess: Option<&str>,
) -> HintOutcome {
    match kind {
        CipherHintKind::CheckPositions => check_positions(puzzle.target_word, guess),
        CipherHintKind::ShiftAmount => shift_amount(puzzle),
        CipherHintKind::UnshiftedPositions => unshifted_positions(rng, puzzle),
    }
}

/// Computes a scramble hint from the puzzle content and an optional guess.
pub fn build_scramble_hint<R: Rng + ?Sized>(
    rng: &mut R,
    kind: ScrambleHintKind,
    puzzle: &PuzzleContent<'_>,
    guess: Option<&str>,
) -> HintOutcome {
    match kind {
        ScrambleHintKind::CheckPositions => check_positions(puzzle.target_word, guess),
        ScrambleHintKind::RevealPosition => reveal_position(rng, puzzle.target_word),
        ScrambleHintKind::RevealTheme => reveal_theme(puzzle.theme_hint),
    }
}

/// Position-by-position comparison of a full guess against the target.
fn check_positions(target: &str, guess: Option<&str>) -> HintOutcome {
    let Some(guess) = guess else {
        return HintOutcome::NeedsFullGuess(
            "Select all letters before checking your guess.".to_string(),
        );
    };
    if guess.len() != target.len() || !guess.chars().all(|c| c.is_ascii_uppercase()) {
        return HintOutcome::NeedsFullGuess(
            "Select all letters before checking your guess.".to_string(),
        );
    }

    let correct: Vec<usize> = target
        .chars()
        .zip(guess.chars())
        .enumerate()
        .filter(|(_, (t, g))| t == g)
        .map(|(i, _)| i + 1)
        .collect();

    let message = if correct.is_empty() {
        format!("0 of {} positions are correct so far.", target.len())
    } else {
        format!(
            "{} of {} positions are correct: {}.",
            correct.len(),
            target.len(),
            join_positions(&correct)
        )
    };
    HintOutcome::Produced(HintContent {
        message,
        meta: json!({
            "correct_count": correct.len(),
            "correct_positions": correct,
        }),
    })
}

/// Reports the shift magnitude from the first shifted position, withholding
/// direction: distance is `min(d, 26 - d)` between cipher and target.
fn shift_amount(puzzle: &PuzzleContent<'_>) -> HintOutcome {
    let shifted = puzzle
        .target_word
        .chars()
        .zip(puzzle.display_word.chars())
        .find(|(t, d)| t != d);

    match shifted {
        Some((t, d)) => {
            let amount = letter_distance(d, t);
            HintOutcome::Produced(HintContent {
                message: format!("The letters are shifted by {amount} places."),
                meta: json!({ "shift_amount": amount }),
            })
        }
        None => HintOutcome::Produced(HintContent {
            message: "No shift detected.".to_string(),
            meta: json!({ "shift_amount": null }),
        }),
    }
}

/// Reveals up to 2 randomly chosen unshifted positions from the generation
/// record.
fn unshifted_positions<R: Rng + ?Sized>(rng: &mut R, puzzle: &PuzzleContent<'_>) -> HintOutcome {
    let mut positions = match puzzle.metadata {
        GenerationMetadata::Cipher {
            unshifted_positions,
            ..
        } => unshifted_positions.clone(),
        // Not reachable through the engine; the catalogs are keyed by
        // variant. Fall back to comparing the words.
        GenerationMetadata::Scramble { .. } => puzzle
            .target_word
            .chars()
            .zip(puzzle.display_word.chars())
            .enumerate()
            .filter(|(_, (t, d))| t == d)
            .map(|(i, _)| i + 1)
            .collect(),
    };

    if positions.is_empty() {
        return HintOutcome::Produced(HintContent {
            message: "All positions are shifted.".to_string(),
            meta: json!({ "unshifted_positions": [] }),
        });
    }

    positions.shuffle(rng);
    let mut revealed: Vec<usize> = positions
        .into_iter()
        .take(UNSHIFTED_REVEAL_LIMIT)
        .collect();
    revealed.sort_unstable();

    let message = if revealed.len() == 1 {
        format!("Position {} was left unshifted.", revealed[0])
    } else {
        format!(
            "Positions {} were left unshifted.",
            join_positions(&revealed)
        )
    };
    HintOutcome::Produced(HintContent {
        message,
        meta: json!({ "unshifted_positions": revealed }),
    })
}

/// Reveals one uniformly random position's correct letter.
fn reveal_position<R: Rng + ?Sized>(rng: &mut R, target: &str) -> HintOutcome {
    let chars: Vec<char> = target.chars().collect();
    let index = rng.random_range(0..chars.len());
    let letter = chars[index];
    HintOutcome::Produced(HintContent {
        message: format!("Position {} is '{letter}'.", index + 1),
        meta: json!({ "position": index + 1, "letter": letter.to_string() }),
    })
}

/// Returns the theme hint, title-cased.
fn reveal_theme(theme_hint: &str) -> HintOutcome {
    if theme_hint.trim().is_empty() {
        return HintOutcome::Produced(HintContent {
            message: "No theme hint available.".to_string(),
            meta: json!({ "theme": null }),
        });
    }
    let themed = title_case(theme_hint);
    HintOutcome::Produced(HintContent {
        message: format!("Theme: {themed}"),
        meta: json!({ "theme": themed }),
    })
}

/// Title-cases a phrase: first letter of each word uppercase, rest lower.
fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Formats 1-based positions as "1", "1 and 3", or "1, 2 and 4".
fn join_positions(positions: &[usize]) -> String {
    match positions {
        [] => String::new(),
        [only] => only.to_string(),
        [rest @ .., last] => {
            let head = rest
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ");
            format!("{head} and {last}")
        }
    }
}
