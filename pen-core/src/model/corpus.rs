use std::collections::HashSet;
use std::sync::Arc;

use crate::model::comparer::Comparer;

/// A single corpus token.
///
/// Tokens are string-like and may be absent: `None` is a legal token value,
/// distinct from the empty string unless a comparer says otherwise. The
/// `Arc` backing keeps clones cheap and lets the interning pass share
/// storage between equal tokens.
pub type Token = Option<Arc<str>>;

/// Builds a present token from text.
pub fn token(text: &str) -> Token {
	Some(Arc::from(text))
}

/// The immutable, 0-indexed token sequence a generator draws from.
///
/// # Invariants
/// - Fixed for the lifetime of the owning `Pen`; never mutated.
/// - Built from its own defensive storage: construction takes ownership of
///   the tokens, so no external aliasing can change them afterwards.
#[derive(Clone, Debug)]
pub struct Corpus {
	tokens: Vec<Token>,
}

impl Corpus {
	/// Creates a corpus, optionally interning token text.
	///
	/// # Behavior
	/// - With `intern` set, equal token texts share a single allocation.
	///   This is a memory optimization performed once here; it is invisible
	///   to the index and search logic, which compare values, not pointers.
	pub(crate) fn new<I>(tokens: I, intern: bool) -> Self
	where
		I: IntoIterator<Item = Token>,
	{
		let tokens = if intern {
			let mut arena: HashSet<Arc<str>> = HashSet::new();
			tokens
				.into_iter()
				.map(|t| {
					t.map(|text| match arena.get(text.as_ref()) {
						Some(shared) => shared.clone(),
						None => {
							arena.insert(text.clone());
							text
						}
					})
				})
				.collect()
		} else {
			tokens.into_iter().collect()
		};
		Self { tokens }
	}

	/// Number of tokens.
	pub fn len(&self) -> usize {
		self.tokens.len()
	}

	/// True when the corpus holds no tokens.
	pub fn is_empty(&self) -> bool {
		self.tokens.is_empty()
	}

	/// Token at `position`. Panics if out of range; internal callers only
	/// ever pass validated positions.
	pub(crate) fn at(&self, position: usize) -> &Token {
		&self.tokens[position]
	}

	/// The full token slice.
	pub(crate) fn tokens(&self) -> &[Token] {
		&self.tokens
	}

	/// True when every token compares equal to `sentinel` under `comparer`.
	///
	/// Vacuously true for an empty corpus.
	pub(crate) fn all_equal(&self, comparer: &dyn Comparer, sentinel: &Token) -> bool {
		self.tokens
			.iter()
			.all(|t| comparer.equal(t.as_deref(), sentinel.as_deref()))
	}
}
