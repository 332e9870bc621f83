//! Scramble-variant puzzle generation.

use rand::Rng;
use rand::seq::{IndexedRandom, SliceRandom};
use tracing::{debug, instrument, warn};

use crate::alphabet;
use crate::error::EngineError;
use crate::puzzle::{GeneratedPuzzle, GenerationMetadata, Variant};

/// Bounded retries before accepting a permutation that may still equal the
/// identity order.
const MAX_PERMUTATION_ATTEMPTS: u32 = 12;

/// Generates a scramble puzzle from an externally curated target word.
///
/// The display word is a random permutation of the target's letters,
/// retried until it differs from the identity order and accepted
/// best-effort once the retry budget runs out. Every position's menu is an
/// independent shuffle of the entire letter multiset, so each position can
/// cycle through all letters of the word.
///
/// A target whose letters are all identical admits only the identity
/// permutation and would be served pre-solved, so it is rejected.
///
/// # Errors
///
/// Returns [`EngineError::InvalidInput`] if the target is not an uppercase
/// A–Z word of the scramble length, or if all its letters are identical.
#[instrument(skip(rng, theme_hint))]
pub fn generate_scramble<R: Rng + ?Sized>(
    rng: &mut R,
    target: &str,
    theme_hint: &str,
) -> Result<GeneratedPuzzle, EngineError> {
    let word_len = Variant::Scramble.word_len();
    alphabet::validate_word(target)?;
    if target.len() != word_len {
        return Err(EngineError::InvalidInput(format!(
            "scramble target must be {word_len} letters, got {}",
            target.len()
        )));
    }

    let target_chars: Vec<char> = target.chars().collect();
    if target_chars.iter().all(|&c| c == target_chars[0]) {
        return Err(EngineError::InvalidInput(format!(
            "scramble target '{target}' has no non-identity arrangement"
        )));
    }

    let mut display_chars = target_chars.clone();
    let mut attempts = 0;
    while attempts < MAX_PERMUTATION_ATTEMPTS {
        display_chars.shuffle(rng);
        attempts += 1;
        if display_chars != target_chars {
            break;
        }
    }
    let identity = display_chars == target_chars;
    if identity {
        // Statistically unreachable for accepted targets; kept as the
        // documented best-effort edge case.
        warn!(attempts, "Accepted identity permutation after retry budget");
    }

    let mut letter_menus = Vec::with_capacity(word_len);
    let mut start_indices = Vec::with_capacity(word_len);
    for &t in &target_chars {
        let mut menu = target_chars.clone();
        menu.shuffle(rng);
        start_indices.push(pick_start_index(rng, &menu, t));
        letter_menus.push(menu.into_iter().collect());
    }

    debug!(attempts, identity, "Scramble puzzle generated");

    Ok(GeneratedPuzzle::new(
        Variant::Scramble,
        target.to_string(),
        display_chars.iter().collect(),
        letter_menus,
        start_indices,
        theme_hint.to_string(),
        GenerationMetadata::Scramble {
            permutation_attempts: attempts,
            identity,
        },
    ))
}

/// Picks a start index among menu slots holding a different letter than the
/// target at this position, defaulting to 0 in the degenerate case where
/// every slot holds the target letter.
fn pick_start_index<R: Rng + ?Sized>(rng: &mut R, menu: &[char], target: char) -> usize {
    let candidates: Vec<usize> = (0..menu.len()).filter(|&i| menu[i] != target).collect();
    candidates.choose(rng).copied().unwrap_or(0)
}
