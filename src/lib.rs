//! Word Sprint library - timed word-puzzle engine
//!
//! A hidden target word is disguised (letter-substitution cipher or anagram
//! scramble) and presented as a fixed-length word with per-position letter
//! menus. Players race a clock, may spend up to 3 hints (each adding a fixed
//! time penalty), and are ranked by final time once they guess correctly.
//!
//! # Architecture
//!
//! - **Generator**: pure puzzle generation over an injected CSPRNG
//! - **Hints**: per-variant closed hint catalogs with fixed pricing
//! - **Lifecycle**: start/hint/submit/give-up handlers over the store
//! - **Scoring**: rank and leaderboard queries for daily puzzles
//! - **Service + HTTP**: the request/response surface and JSON transport
//!
//! # Example
//!
//! ```no_run
//! use rand::SeedableRng;
//! use rand::rngs::StdRng;
//! use word_sprint::{CipherOptions, generate_cipher};
//!
//! # fn example() -> Result<(), word_sprint::EngineError> {
//! let mut rng = StdRng::from_os_rng();
//! let puzzle = generate_cipher(&mut rng, "CRANE", "things with wings", CipherOptions::default())?;
//! assert_eq!(puzzle.display_word().len(), 5);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod alphabet;
mod db;
mod error;
mod generator;
mod hints;
mod http;
mod lifecycle;
mod puzzle;
mod scoring;
mod service;

// Crate-level exports - letter arithmetic
pub use alphabet::{ALPHABET_LEN, letter_distance, rotate, validate_word};

// Crate-level exports - storage
pub use db::{Attempt, NewAttempt, NewPuzzle, Puzzle, PuzzleRepository, StoreError};

// Crate-level exports - errors
pub use error::EngineError;

// Crate-level exports - puzzle generation
pub use generator::{CipherOptions, generate_cipher, generate_scramble};

// Crate-level exports - domain vocabulary
pub use puzzle::{
    AttemptMode, GeneratedPuzzle, GenerationMetadata, PuzzleContent, PuzzleKind, ShiftDirection,
    Variant,
};

// Crate-level exports - hint catalog
pub use hints::{
    CipherHintKind, HintContent, HintEvent, HintOutcome, MAX_HINTS_PER_ATTEMPT, ScrambleHintKind,
    build_cipher_hint, build_scramble_hint,
};

// Crate-level exports - attempt lifecycle
pub use lifecycle::{AttemptEngine, HintReceipt, SubmitOutcome};

// Crate-level exports - scoring
pub use scoring::{LeaderboardEntry, leaderboard, rank_attempt};

// Crate-level exports - service + transport
pub use http::router;
pub use service::{
    AttemptView, CreatePuzzleRequest, GiveUpResponse, PuzzleService, PuzzleView,
    StartAttemptRequest, SubmitRequest, SubmitResponse, UseHintRequest,
};
