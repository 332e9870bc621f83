//! Letter arithmetic over the uppercase A–Z alphabet.
//!
//! All rotation is modulo 26 with A=0 … Z=25. Randomness is injected so
//! generation stays deterministic under a seeded source.

use rand::Rng;

use crate::error::EngineError;

/// Number of letters in the puzzle alphabet.
pub const ALPHABET_LEN: i32 = 26;

/// Rotates an uppercase letter by a signed offset, wrapping around Z/A.
pub fn rotate(letter: char, delta: i32) -> char {
    let index = letter as i32 - 'A' as i32;
    let rotated = (index + delta).rem_euclid(ALPHABET_LEN);
    (b'A' + rotated as u8) as char
}

/// Absolute alphabetic distance between two letters, `min(d, 26 - d)`.
pub fn letter_distance(a: char, b: char) -> u32 {
    let d = (a as i32 - b as i32).rem_euclid(ALPHABET_LEN) as u32;
    d.min(ALPHABET_LEN as u32 - d)
}

/// Draws a uniformly random uppercase letter.
pub fn random_letter<R: Rng + ?Sized>(rng: &mut R) -> char {
    (b'A' + rng.random_range(0..ALPHABET_LEN as u8)) as char
}

/// Validates that a word is non-empty uppercase A–Z.
///
/// # Errors
///
/// Returns [`EngineError::InvalidInput`] if the word is empty or contains
/// anything outside A–Z.
pub fn validate_word(word: &str) -> Result<(), EngineError> {
    if word.is_empty() {
        return Err(EngineError::InvalidInput("word must not be empty".into()));
    }
    if !word.chars().all(|c| c.is_ascii_uppercase()) {
        return Err(EngineError::InvalidInput(format!(
            "word '{word}' must contain only uppercase A-Z letters"
        )));
    }
    Ok(())
}
