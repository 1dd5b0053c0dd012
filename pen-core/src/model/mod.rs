//! Top-level module for the suffix-index generation system.
//!
//! This module provides the pieces of the generator, including:
//! - Token ordering rules (`Comparer`, `Ordinal`, `OrdinalIgnoreCase`)
//! - The immutable token corpus (`Corpus`)
//! - The sorted position index and pattern locator (`SuffixIndex`)
//! - The lazily-pulled generation cursor (`Render`)
//! - The high-level generator itself (`Pen`)

/// Token ordering rules.
///
/// A comparer supplies the single total order used everywhere tokens are
/// compared: index construction, pattern search and sentinel detection.
pub mod comparer;

/// The immutable token corpus and the optional interning pass.
pub mod corpus;

/// Contract errors raised by construction, queries and rendering.
pub mod error;

/// The high-level generator: construction, queries, rendering, snapshots.
pub mod pen;

/// Default random picker backed by a per-thread seeded RNG.
///
/// Core logic never requires it; an explicit picker keeps determinism
/// entirely in the caller's hands.
pub mod picker;

/// The generation state machine behind `Pen::render`.
///
/// Internal phases are not exposed publicly; consumers only see an
/// `Iterator` of tokens.
pub mod render;

/// Sorted position index over the corpus and the pattern-locating
/// binary search. Not exposed publicly.
mod suffix_index;

pub use comparer::{Comparer, Ordinal, OrdinalIgnoreCase};
pub use corpus::{Corpus, Token, token};
pub use error::PenError;
pub use pen::{Pen, PenSnapshot};
pub use render::Render;
