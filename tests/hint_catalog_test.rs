//! Tests for the per-variant hint catalogs.

use rand::SeedableRng;
use rand::rngs::StdRng;

use word_sprint::{
    CipherHintKind, GenerationMetadata, HintContent, HintOutcome, PuzzleContent, ScrambleHintKind,
    ShiftDirection, Variant, build_cipher_hint, build_scramble_hint,
};

fn rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

fn cipher_content<'a>(
    target: &'a str,
    display: &'a str,
    metadata: &'a GenerationMetadata,
) -> PuzzleContent<'a> {
    PuzzleContent {
        variant: Variant::Cipher,
        target_word: target,
        display_word: display,
        theme_hint: "",
        metadata,
    }
}

fn scramble_content<'a>(
    target: &'a str,
    display: &'a str,
    theme_hint: &'a str,
    metadata: &'a GenerationMetadata,
) -> PuzzleContent<'a> {
    PuzzleContent {
        variant: Variant::Scramble,
        target_word: target,
        display_word: display,
        theme_hint,
        metadata,
    }
}

fn scramble_metadata() -> GenerationMetadata {
    GenerationMetadata::Scramble {
        permutation_attempts: 1,
        identity: false,
    }
}

fn expect_produced(outcome: HintOutcome) -> HintContent {
    match outcome {
        HintOutcome::Produced(content) => content,
        HintOutcome::NeedsFullGuess(msg) => panic!("Expected a produced hint, got prompt: {msg}"),
    }
}

#[test]
fn test_check_positions_counts_matches() {
    let metadata = GenerationMetadata::Cipher {
        shift: 3,
        direction: ShiftDirection::Right,
        unshifted_positions: vec![],
    };
    let content = cipher_content("CRANE", "FUDQH", &metadata);

    let hint = expect_produced(build_cipher_hint(
        &mut rng(1),
        CipherHintKind::CheckPositions,
        &content,
        Some("CRXNE"),
    ));
    assert_eq!(hint.meta["correct_count"], 4);
    assert_eq!(
        hint.meta["correct_positions"],
        serde_json::json!([1, 2, 4, 5])
    );
    assert!(hint.message.contains("4 of 5"));
}

#[test]
fn test_check_positions_requires_full_guess() {
    let metadata = GenerationMetadata::Cipher {
        shift: 3,
        direction: ShiftDirection::Right,
        unshifted_positions: vec![],
    };
    let content = cipher_content("CRANE", "FUDQH", &metadata);

    for guess in [None, Some("CRA"), Some("crane"), Some("CRANES")] {
        let outcome = build_cipher_hint(&mut rng(1), CipherHintKind::CheckPositions, &content, guess);
        assert!(
            matches!(outcome, HintOutcome::NeedsFullGuess(_)),
            "guess {guess:?} should prompt for a full guess"
        );
    }
}

#[test]
fn test_shift_amount_reports_magnitude_without_direction() {
    let metadata = GenerationMetadata::Cipher {
        shift: 3,
        direction: ShiftDirection::Right,
        unshifted_positions: vec![],
    };
    let content = cipher_content("CRANE", "FUDQH", &metadata);

    let hint = expect_produced(build_cipher_hint(
        &mut rng(1),
        CipherHintKind::ShiftAmount,
        &content,
        None,
    ));
    assert_eq!(hint.meta["shift_amount"], 3);
    assert!(!hint.message.to_lowercase().contains("right"));
    assert!(!hint.message.to_lowercase().contains("left"));
}

#[test]
fn test_shift_amount_uses_shorter_arc() {
    // Shift 25 right is one step left; the hint reports min(25, 1) = 1.
    let metadata = GenerationMetadata::Cipher {
        shift: 25,
        direction: ShiftDirection::Right,
        unshifted_positions: vec![],
    };
    let content = cipher_content("CRANE", "BQZMD", &metadata);

    let hint = expect_produced(build_cipher_hint(
        &mut rng(1),
        CipherHintKind::ShiftAmount,
        &content,
        None,
    ));
    assert_eq!(hint.meta["shift_amount"], 1);
}

#[test]
fn test_shift_amount_no_shifted_position() {
    let metadata = GenerationMetadata::Cipher {
        shift: 3,
        direction: ShiftDirection::Right,
        unshifted_positions: vec![1, 2, 3, 4, 5],
    };
    let content = cipher_content("CRANE", "CRANE", &metadata);

    let hint = expect_produced(build_cipher_hint(
        &mut rng(1),
        CipherHintKind::ShiftAmount,
        &content,
        None,
    ));
    assert!(hint.message.contains("No shift detected"));
    assert!(hint.meta["shift_amount"].is_null());
}

#[test]
fn test_unshifted_positions_reveals_at_most_two() {
    let metadata = GenerationMetadata::Cipher {
        shift: 3,
        direction: ShiftDirection::Right,
        unshifted_positions: vec![1, 3, 5],
    };
    let content = cipher_content("CRANE", "CUAQE", &metadata);

    for seed in 0..10 {
        let hint = expect_produced(build_cipher_hint(
            &mut rng(seed),
            CipherHintKind::UnshiftedPositions,
            &content,
            None,
        ));
        let revealed: Vec<usize> = hint.meta["unshifted_positions"]
            .as_array()
            .expect("positions array")
            .iter()
            .map(|v| v.as_u64().expect("position") as usize)
            .collect();
        assert_eq!(revealed.len(), 2, "seed {seed}");
        assert!(revealed.iter().all(|p| [1, 3, 5].contains(p)), "seed {seed}");
        assert!(revealed[0] < revealed[1], "seed {seed} not ascending");
    }
}

#[test]
fn test_unshifted_positions_all_shifted() {
    let metadata = GenerationMetadata::Cipher {
        shift: 3,
        direction: ShiftDirection::Right,
        unshifted_positions: vec![],
    };
    let content = cipher_content("CRANE", "FUDQH", &metadata);

    let hint = expect_produced(build_cipher_hint(
        &mut rng(1),
        CipherHintKind::UnshiftedPositions,
        &content,
        None,
    ));
    assert!(hint.message.contains("All positions are shifted"));
}

#[test]
fn test_reveal_position_reports_target_letter() {
    let metadata = scramble_metadata();
    let content = scramble_content("PLANET", "NALPTE", "", &metadata);
    let target: Vec<char> = "PLANET".chars().collect();

    for seed in 0..20 {
        let hint = expect_produced(build_scramble_hint(
            &mut rng(seed),
            ScrambleHintKind::RevealPosition,
            &content,
            None,
        ));
        let position = hint.meta["position"].as_u64().expect("position") as usize;
        let letter = hint.meta["letter"].as_str().expect("letter");
        assert!((1..=6).contains(&position), "seed {seed}");
        assert_eq!(
            letter,
            target[position - 1].to_string(),
            "seed {seed} revealed the wrong letter"
        );
    }
}

#[test]
fn test_reveal_theme_title_cases() {
    let metadata = scramble_metadata();
    let content = scramble_content("PLANET", "NALPTE", "things in SPACE", &metadata);

    let hint = expect_produced(build_scramble_hint(
        &mut rng(1),
        ScrambleHintKind::RevealTheme,
        &content,
        None,
    ));
    assert_eq!(hint.meta["theme"], "Things In Space");
    assert!(hint.message.contains("Things In Space"));
}

#[test]
fn test_reveal_theme_empty() {
    let metadata = scramble_metadata();
    let content = scramble_content("PLANET", "NALPTE", "  ", &metadata);

    let hint = expect_produced(build_scramble_hint(
        &mut rng(1),
        ScrambleHintKind::RevealTheme,
        &content,
        None,
    ));
    assert!(hint.message.contains("No theme hint available"));
    assert!(hint.meta["theme"].is_null());
}

#[test]
fn test_penalty_table() {
    assert_eq!(CipherHintKind::CheckPositions.penalty_ms(), 5_000);
    assert_eq!(CipherHintKind::ShiftAmount.penalty_ms(), 8_000);
    assert_eq!(CipherHintKind::UnshiftedPositions.penalty_ms(), 10_000);
    assert_eq!(ScrambleHintKind::CheckPositions.penalty_ms(), 5_000);
    assert_eq!(ScrambleHintKind::RevealPosition.penalty_ms(), 8_000);
    assert_eq!(ScrambleHintKind::RevealTheme.penalty_ms(), 10_000);
}
