//! Puzzle generation for the cipher and scramble variants.
//!
//! Generators are pure functions over an injected random source. Production
//! call sites pass a CSPRNG ([`rand::rngs::StdRng`] seeded from the OS);
//! tests pass a seeded generator for determinism. All selections are
//! uniform and all shuffles are Fisher-Yates.

mod cipher;
mod scramble;

pub use cipher::{CipherOptions, generate_cipher};
pub use scramble::generate_scramble;
