//! Cipher-variant puzzle generation.

use rand::Rng;
use rand::seq::{IndexedRandom, SliceRandom};
use tracing::{debug, instrument};

use crate::alphabet::{self, random_letter, rotate};
use crate::error::EngineError;
use crate::puzzle::{GeneratedPuzzle, GenerationMetadata, ShiftDirection, Variant};

/// Number of candidate letters in every cipher menu.
const MENU_SIZE: usize = 5;

/// Optional parameters for cipher generation.
///
/// Unset fields are drawn uniformly at random at generation time.
#[derive(Debug, Clone)]
pub struct CipherOptions {
    /// Shift magnitude, 1–25. Default: random.
    pub shift: Option<u8>,
    /// Rotation direction. Default: random.
    pub direction: Option<ShiftDirection>,
    /// How many positions to leave unshifted, in `[0, word_len - 1]`.
    pub unshifted_count: usize,
}

impl Default for CipherOptions {
    fn default() -> Self {
        Self {
            shift: None,
            direction: None,
            unshifted_count: 1,
        }
    }
}

/// Generates a cipher puzzle from an externally curated target word.
///
/// Every position outside the randomly chosen unshifted set is rotated by
/// the signed shift modulo 26. Each position gets a 5-letter candidate menu
/// guaranteed to contain both its target and display letters, and a start
/// index that is never the correct letter.
///
/// # Errors
///
/// Returns [`EngineError::InvalidInput`] if the target is not an uppercase
/// A–Z word of the cipher length, or if an option is out of range.
#[instrument(skip(rng, theme_hint))]
pub fn generate_cipher<R: Rng + ?Sized>(
    rng: &mut R,
    target: &str,
    theme_hint: &str,
    opts: CipherOptions,
) -> Result<GeneratedPuzzle, EngineError> {
    let word_len = Variant::Cipher.word_len();
    alphabet::validate_word(target)?;
    if target.len() != word_len {
        return Err(EngineError::InvalidInput(format!(
            "cipher target must be {word_len} letters, got {}",
            target.len()
        )));
    }
    if let Some(shift) = opts.shift
        && !(1..=25).contains(&shift)
    {
        return Err(EngineError::InvalidInput(format!(
            "shift must be in 1-25, got {shift}"
        )));
    }
    if opts.unshifted_count >= word_len {
        return Err(EngineError::InvalidInput(format!(
            "unshifted_count must be below {word_len}, got {}",
            opts.unshifted_count
        )));
    }

    let shift = opts.shift.unwrap_or_else(|| rng.random_range(1..=25));
    let direction = opts.direction.unwrap_or_else(|| {
        if rng.random_bool(0.5) {
            ShiftDirection::Right
        } else {
            ShiftDirection::Left
        }
    });
    let delta = i32::from(shift) * direction.step();

    // Uniform selection without replacement of the exempt positions.
    let mut positions: Vec<usize> = (0..word_len).collect();
    positions.shuffle(rng);
    let mut unshifted: Vec<usize> = positions[..opts.unshifted_count].to_vec();
    unshifted.sort_unstable();

    let target_chars: Vec<char> = target.chars().collect();
    let display_chars: Vec<char> = target_chars
        .iter()
        .enumerate()
        .map(|(i, &c)| {
            if unshifted.contains(&i) {
                c
            } else {
                rotate(c, delta)
            }
        })
        .collect();

    let mut letter_menus = Vec::with_capacity(word_len);
    let mut start_indices = Vec::with_capacity(word_len);
    for (&t, &d) in target_chars.iter().zip(&display_chars) {
        let menu = build_menu(rng, t, d, delta, direction);
        start_indices.push(pick_start_index(rng, &menu, t));
        letter_menus.push(menu.into_iter().collect());
    }

    debug!(
        shift,
        %direction,
        unshifted = ?unshifted,
        "Cipher puzzle generated"
    );

    Ok(GeneratedPuzzle::new(
        Variant::Cipher,
        target.to_string(),
        display_chars.iter().collect(),
        letter_menus,
        start_indices,
        theme_hint.to_string(),
        GenerationMetadata::Cipher {
            shift,
            direction,
            unshifted_positions: unshifted.iter().map(|&i| i + 1).collect(),
        },
    ))
}

/// Builds one position's 5-candidate menu, shuffled.
///
/// Seeds in priority order: target, display, neighbors of each, and the
/// target rotated by the shift delta and its direction-step neighbors.
/// Deduplicated, truncated to 5, back-filled first with widening neighbor
/// offsets from the target letter and then with uniform random letters.
fn build_menu<R: Rng + ?Sized>(
    rng: &mut R,
    target: char,
    display: char,
    delta: i32,
    direction: ShiftDirection,
) -> Vec<char> {
    let step = direction.step();
    let seeds = [
        target,
        display,
        rotate(target, 1),
        rotate(target, -1),
        rotate(display, 1),
        rotate(display, -1),
        rotate(target, delta),
        rotate(target, delta + step),
        rotate(target, delta - step),
    ];

    let mut menu: Vec<char> = Vec::with_capacity(MENU_SIZE);
    for c in seeds {
        if menu.len() == MENU_SIZE {
            break;
        }
        if !menu.contains(&c) {
            menu.push(c);
        }
    }

    let mut offset = 2;
    while menu.len() < MENU_SIZE {
        for c in [rotate(target, offset), rotate(target, -offset)] {
            if menu.len() < MENU_SIZE && !menu.contains(&c) {
                menu.push(c);
            }
        }
        offset += 1;
        if offset > alphabet::ALPHABET_LEN {
            break;
        }
    }
    while menu.len() < MENU_SIZE {
        let c = random_letter(rng);
        if !menu.contains(&c) {
            menu.push(c);
        }
    }

    menu.shuffle(rng);
    menu
}

/// Picks a start index uniformly among the menu indices that are not the
/// correct letter, so the initial guess is never already right.
fn pick_start_index<R: Rng + ?Sized>(rng: &mut R, menu: &[char], target: char) -> usize {
    let candidates: Vec<usize> = (0..menu.len()).filter(|&i| menu[i] != target).collect();
    candidates.choose(rng).copied().unwrap_or(0)
}
