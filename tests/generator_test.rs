//! Tests for cipher and scramble puzzle generation.

use std::collections::HashSet;

use rand::SeedableRng;
use rand::rngs::StdRng;

use word_sprint::{
    CipherOptions, GenerationMetadata, ShiftDirection, generate_cipher, generate_scramble, rotate,
};

fn rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

#[test]
fn test_crane_shift_three_right_no_exemptions() {
    let opts = CipherOptions {
        shift: Some(3),
        direction: Some(ShiftDirection::Right),
        unshifted_count: 0,
    };
    let puzzle = generate_cipher(&mut rng(1), "CRANE", "birds", opts).expect("generation failed");

    assert_eq!(puzzle.display_word(), "FUDQH");
    match puzzle.metadata() {
        GenerationMetadata::Cipher {
            shift,
            direction,
            unshifted_positions,
        } => {
            assert_eq!(*shift, 3);
            assert_eq!(*direction, ShiftDirection::Right);
            assert!(unshifted_positions.is_empty());
        }
        other => panic!("Unexpected metadata: {other:?}"),
    }
}

#[test]
fn test_unshifted_positions_keep_target_letters() {
    for seed in 0..20 {
        let opts = CipherOptions {
            shift: None,
            direction: None,
            unshifted_count: 2,
        };
        let puzzle =
            generate_cipher(&mut rng(seed), "CRANE", "", opts).expect("generation failed");

        let (shift, direction, unshifted) = match puzzle.metadata() {
            GenerationMetadata::Cipher {
                shift,
                direction,
                unshifted_positions,
            } => (*shift, *direction, unshifted_positions.clone()),
            other => panic!("Unexpected metadata: {other:?}"),
        };
        assert_eq!(unshifted.len(), 2);
        let delta = i32::from(shift) * direction.step();

        let target: Vec<char> = puzzle.target_word().chars().collect();
        let display: Vec<char> = puzzle.display_word().chars().collect();
        for i in 0..target.len() {
            if unshifted.contains(&(i + 1)) {
                assert_eq!(display[i], target[i], "seed {seed} position {i}");
            } else {
                assert_eq!(display[i], rotate(target[i], delta), "seed {seed} position {i}");
            }
        }
    }
}

#[test]
fn test_cipher_menus_contain_target_and_display_letters() {
    for seed in 0..20 {
        let puzzle = generate_cipher(&mut rng(seed), "SPEAK", "", CipherOptions::default())
            .expect("generation failed");

        let target: Vec<char> = puzzle.target_word().chars().collect();
        let display: Vec<char> = puzzle.display_word().chars().collect();
        assert_eq!(puzzle.letter_menus().len(), 5);

        for (i, menu) in puzzle.letter_menus().iter().enumerate() {
            let letters: Vec<char> = menu.chars().collect();
            assert_eq!(letters.len(), 5, "seed {seed} menu {i}");
            let unique: HashSet<char> = letters.iter().copied().collect();
            assert_eq!(unique.len(), 5, "seed {seed} menu {i} has duplicates");
            assert!(letters.contains(&target[i]), "seed {seed} menu {i} missing target");
            assert!(letters.contains(&display[i]), "seed {seed} menu {i} missing display");
        }
    }
}

#[test]
fn test_cipher_start_indices_never_correct() {
    for seed in 0..50 {
        let puzzle = generate_cipher(&mut rng(seed), "CRANE", "", CipherOptions::default())
            .expect("generation failed");

        let target: Vec<char> = puzzle.target_word().chars().collect();
        for (i, (&index, menu)) in puzzle
            .start_indices()
            .iter()
            .zip(puzzle.letter_menus())
            .enumerate()
        {
            let letters: Vec<char> = menu.chars().collect();
            assert_ne!(
                letters[index], target[i],
                "seed {seed} position {i} starts on the correct letter"
            );
        }
    }
}

#[test]
fn test_cipher_rejects_bad_input() {
    assert!(generate_cipher(&mut rng(1), "FOUR", "", CipherOptions::default()).is_err());
    assert!(generate_cipher(&mut rng(1), "crane", "", CipherOptions::default()).is_err());
    assert!(generate_cipher(&mut rng(1), "CRAN3", "", CipherOptions::default()).is_err());

    let zero_shift = CipherOptions {
        shift: Some(0),
        ..CipherOptions::default()
    };
    assert!(generate_cipher(&mut rng(1), "CRANE", "", zero_shift).is_err());

    let all_unshifted = CipherOptions {
        unshifted_count: 5,
        ..CipherOptions::default()
    };
    assert!(generate_cipher(&mut rng(1), "CRANE", "", all_unshifted).is_err());
}

#[test]
fn test_scramble_display_is_anagram() {
    for seed in 0..20 {
        let puzzle = generate_scramble(&mut rng(seed), "PLANET", "space").expect("generation failed");

        let mut display: Vec<char> = puzzle.display_word().chars().collect();
        let mut target: Vec<char> = puzzle.target_word().chars().collect();
        display.sort_unstable();
        target.sort_unstable();
        assert_eq!(display, target, "seed {seed} display is not an anagram");

        match puzzle.metadata() {
            GenerationMetadata::Scramble {
                permutation_attempts,
                identity,
            } => {
                assert!(*permutation_attempts >= 1);
                assert!(!identity, "seed {seed} accepted the identity order");
            }
            other => panic!("Unexpected metadata: {other:?}"),
        }
    }
}

#[test]
fn test_scramble_menus_shuffle_full_multiset() {
    let puzzle = generate_scramble(&mut rng(7), "BANANA", "").expect("generation failed");

    let mut target: Vec<char> = puzzle.target_word().chars().collect();
    target.sort_unstable();
    assert_eq!(puzzle.letter_menus().len(), 6);
    for menu in puzzle.letter_menus() {
        let mut letters: Vec<char> = menu.chars().collect();
        letters.sort_unstable();
        assert_eq!(letters, target, "menu is not the full letter multiset");
    }
}

#[test]
fn test_scramble_start_indices_never_correct() {
    for seed in 0..50 {
        let puzzle = generate_scramble(&mut rng(seed), "PLANET", "").expect("generation failed");

        let target: Vec<char> = puzzle.target_word().chars().collect();
        for (i, (&index, menu)) in puzzle
            .start_indices()
            .iter()
            .zip(puzzle.letter_menus())
            .enumerate()
        {
            let letters: Vec<char> = menu.chars().collect();
            assert_ne!(
                letters[index], target[i],
                "seed {seed} position {i} starts on the correct letter"
            );
        }
    }
}

#[test]
fn test_scramble_rejects_bad_input() {
    assert!(generate_scramble(&mut rng(1), "PLAN", "").is_err());
    assert!(generate_scramble(&mut rng(1), "planet", "").is_err());
    // Only the identity arrangement exists; the puzzle would be pre-solved.
    assert!(generate_scramble(&mut rng(1), "AAAAAA", "").is_err());
}
