//! Corpus-driven, order-preserving random text generation.
//!
//! This crate provides a suffix-index based text generation system including:
//! - An immutable token corpus with a pluggable ordering rule
//! - A sorted position index enabling binary search for n-gram occurrences
//! - A lazily-pulled generation cursor with a bounded sliding context window
//! - Snapshot persistence and a line-oriented token reader
//!
//! Only the high-level API is exposed publicly. Low-level components
//! are kept internal to ensure consistency and prevent misuse.

/// Core generation types: the comparers, the suffix index and the `Pen`.
///
/// This module exposes the high-level generator interface while keeping
/// internal search structures private.
pub mod model;

/// Line-oriented token reader and its splitting policy.
pub mod reader;

/// I/O utilities (file loading, path helpers).
pub mod io;
