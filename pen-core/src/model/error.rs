use thiserror::Error;

/// Contract errors raised by the generator.
///
/// All of these are programming-contract violations, not transient
/// conditions; nothing is retried. Construction errors abort construction
/// entirely, render errors abort the in-progress token sequence at the
/// failing step (tokens already delivered remain valid).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PenError {
	/// A requested start position lies outside `[0, corpus length]`.
	#[error("start position {position} is outside the corpus (length {length})")]
	StartOutOfRange { position: usize, length: usize },

	/// A picker returned a value outside its contracted range
	/// `[0, max(candidates, 1))`. Detected at the call site.
	#[error("picker returned {picked} for {candidates} candidate(s)")]
	PickOutOfRange { picked: usize, candidates: usize },

	/// A snapshot was written by an unsupported format version.
	#[error("unsupported snapshot version {0}")]
	SnapshotVersion(u32),

	/// A snapshot names a comparer this build does not provide.
	#[error("unknown comparer descriptor '{0}'")]
	UnknownComparer(String),

	/// A snapshot's index length disagrees with its corpus length.
	#[error("snapshot index length {index} does not match corpus length {context}")]
	SnapshotShape { index: usize, context: usize },
}
