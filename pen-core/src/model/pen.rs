use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::io;
use crate::model::comparer::{self, Comparer, Ordinal};
use crate::model::corpus::{Corpus, Token};
use crate::model::error::PenError;
use crate::model::render::Render;
use crate::model::suffix_index::{Located, SuffixIndex};
use crate::reader::{self, ReaderConfig};

/// Snapshot format version accepted by this build.
const SNAPSHOT_VERSION: u32 = 1;

/// A corpus-driven, order-preserving random text generator.
///
/// # Responsibilities
/// - Own the immutable corpus, its ordering rule and the sorted index
/// - Answer occurrence queries for arbitrary token samples
/// - Hand out lazily-pulled render sequences
///
/// # Concurrency
/// Everything inside a `Pen` is immutable after construction, so a `Pen`
/// (or a clone, which shares storage) can serve any number of concurrent
/// renders without locking. Each render owns its own context window.
#[derive(Clone, Debug)]
pub struct Pen {
	intern: bool,
	comparer: Arc<dyn Comparer>,
	sentinel: Token,
	context: Corpus,
	index: SuffixIndex,
	all_sentinels: bool,
}

impl Pen {
	/// Creates a pen over `tokens` with the default byte-ordinal order, no
	/// sentinel value and no interning.
	pub fn new(tokens: Vec<Token>) -> Self {
		Self::with_options(tokens, None, Arc::new(Ordinal), false)
	}

	/// Creates a pen with explicit options.
	///
	/// # Parameters
	/// - `sentinel`: token value that terminates generation and is never
	///   emitted. It may legitimately occur in the corpus; if it does not,
	///   only the virtual end slot can end a render.
	/// - `comparer`: the total order used everywhere tokens are compared.
	/// - `intern`: share storage between equal token texts.
	///
	/// # Behavior
	/// The corpus is copied defensively, the index is sorted once, and both
	/// stay immutable for the pen's lifetime.
	pub fn with_options(
		tokens: Vec<Token>,
		sentinel: Token,
		comparer: Arc<dyn Comparer>,
		intern: bool,
	) -> Self {
		let context = Corpus::new(tokens, intern);
		let index = SuffixIndex::build(&context, comparer.as_ref());
		let all_sentinels = context.all_equal(comparer.as_ref(), &sentinel);
		Self { intern, comparer, sentinel, context, index, all_sentinels }
	}

	/// Loads a pen from a text file, with snapshot caching.
	///
	/// # Behavior
	/// - If a sibling `.bin` snapshot exists it is decoded directly,
	///   skipping tokenization and the index sort.
	/// - Otherwise the file is tokenized with the default reader policy,
	///   a pen is built and its snapshot is written next to the input.
	pub fn load<P: AsRef<Path>>(filepath: P) -> Result<Self, Box<dyn std::error::Error>> {
		let binary_path = io::build_output_path(&filepath, "bin")?;
		if binary_path.exists() {
			log::info!("loading snapshot {}", binary_path.display());
			let bytes = std::fs::read(binary_path)?;
			return Self::from_bytes(&bytes);
		}

		let text = io::read_text(&filepath)?;
		let tokens = reader::tokens_from_str(&text, &ReaderConfig::default());
		log::info!(
			"indexing {} ({} tokens)",
			io::get_filename(&filepath)?,
			tokens.len()
		);
		let pen = Self::new(tokens);
		std::fs::write(binary_path, pen.to_bytes()?)?;
		Ok(pen)
	}

	/// Number of corpus tokens.
	pub fn len(&self) -> usize {
		self.context.len()
	}

	/// True when the corpus holds no tokens.
	pub fn is_empty(&self) -> bool {
		self.context.is_empty()
	}

	/// The sentinel token value.
	pub fn sentinel(&self) -> &Token {
		&self.sentinel
	}

	/// Copies the pen under a possibly different interning policy.
	///
	/// With the same policy this is a cheap clone sharing all storage.
	/// Changing the policy builds a fresh copy of the corpus; the index is
	/// unaffected because token values do not change.
	pub fn duplicate(&self, intern: bool) -> Self {
		if intern == self.intern {
			return self.clone();
		}
		let tokens: Vec<Token> = if intern {
			self.context.tokens().to_vec()
		} else {
			self.context
				.tokens()
				.iter()
				.map(|t| t.as_deref().map(Arc::from))
				.collect()
		};
		Self {
			intern,
			comparer: self.comparer.clone(),
			sentinel: self.sentinel.clone(),
			context: Corpus::new(tokens, intern),
			index: self.index.clone(),
			all_sentinels: self.all_sentinels,
		}
	}

	/// All start positions of `sample` in the corpus.
	///
	/// The empty sample matches in front of every position, so it returns
	/// every position of a non-empty corpus.
	pub fn positions_of(&self, sample: &[Token]) -> HashSet<usize> {
		let hit = self.located(sample);
		(hit.first..hit.first + hit.count)
			.map(|slot| self.index.position(slot))
			.collect()
	}

	/// Smallest start position of `sample`, or the corpus length if the
	/// sample does not occur.
	pub fn first_position_of(&self, sample: &[Token]) -> usize {
		self.positions_of(sample)
			.into_iter()
			.min()
			.unwrap_or(self.context.len())
	}

	/// Largest start position of `sample`, or the corpus length if the
	/// sample does not occur.
	pub fn last_position_of(&self, sample: &[Token]) -> usize {
		self.positions_of(sample)
			.into_iter()
			.max()
			.unwrap_or(self.context.len())
	}

	/// Number of occurrences of `sample` in the corpus.
	pub fn count(&self, sample: &[Token]) -> usize {
		self.located(sample).count
	}

	/// Starts a render: a lazy token sequence driven by `picker`.
	///
	/// # Parameters
	/// - `relevant_tokens`: size of the trailing context window used to
	///   pick continuations. Zero means history is ignored entirely.
	/// - `picker`: given a candidate count `n`, must return a value in
	///   `[0, max(n, 1))`. The sole source of randomness or determinism.
	/// - `from_position`: start by copying up to `max(relevant_tokens, 1)`
	///   tokens straight out of the corpus at this position instead of
	///   drawing the opening tokens through `picker`. Passing the corpus
	///   length is allowed and yields an empty render.
	///
	/// # Errors
	/// `StartOutOfRange` when `from_position` exceeds the corpus length.
	/// Picker contract violations surface inside the returned sequence.
	pub fn render<P>(
		&self,
		relevant_tokens: usize,
		picker: P,
		from_position: Option<usize>,
	) -> Result<Render<'_, P>, PenError>
	where
		P: FnMut(usize) -> usize,
	{
		if let Some(position) = from_position {
			if position > self.context.len() {
				return Err(PenError::StartOutOfRange {
					position,
					length: self.context.len(),
				});
			}
		}
		Ok(Render::new(self, relevant_tokens, picker, from_position))
	}

	/// `render` bound to the built-in per-thread random picker.
	pub fn render_random(
		&self,
		relevant_tokens: usize,
		from_position: Option<usize>,
	) -> Result<Render<'_, fn(usize) -> usize>, PenError> {
		self.render(
			relevant_tokens,
			crate::model::picker::random_pick as fn(usize) -> usize,
			from_position,
		)
	}

	/// `render` bound to a caller-supplied RNG, handy for seeded runs.
	pub fn render_with_rng<'r, R: Rng>(
		&self,
		relevant_tokens: usize,
		rng: &'r mut R,
		from_position: Option<usize>,
	) -> Result<Render<'_, impl FnMut(usize) -> usize + 'r>, PenError> {
		self.render(
			relevant_tokens,
			move |candidates: usize| {
				if candidates == 0 { 0 } else { rng.random_range(0..candidates) }
			},
			from_position,
		)
	}

	/// Captures the pen as its persistable six-field tuple.
	pub fn snapshot(&self) -> PenSnapshot {
		PenSnapshot {
			version: SNAPSHOT_VERSION,
			intern: self.intern,
			comparer: self.comparer.descriptor().to_owned(),
			sentinel: self.sentinel.clone(),
			context: self.context.tokens().to_vec(),
			index: self.index.slots().to_vec(),
			all_sentinels: self.all_sentinels,
		}
	}

	/// Rebuilds a pen from a snapshot without re-sorting the index.
	///
	/// # Errors
	/// - `SnapshotVersion` for a version this build does not understand.
	/// - `UnknownComparer` when the descriptor names no provided comparer.
	/// - `SnapshotShape` when index and corpus lengths disagree. Beyond
	///   the length check the index is trusted, per the usage contract.
	pub fn from_snapshot(snapshot: PenSnapshot) -> Result<Self, PenError> {
		if snapshot.version != SNAPSHOT_VERSION {
			return Err(PenError::SnapshotVersion(snapshot.version));
		}
		let comparer = comparer::from_descriptor(&snapshot.comparer)
			.ok_or(PenError::UnknownComparer(snapshot.comparer))?;
		if snapshot.index.len() != snapshot.context.len() {
			return Err(PenError::SnapshotShape {
				index: snapshot.index.len(),
				context: snapshot.context.len(),
			});
		}
		Ok(Self {
			intern: snapshot.intern,
			comparer,
			sentinel: snapshot.sentinel,
			context: Corpus::new(snapshot.context, snapshot.intern),
			index: SuffixIndex::from_slots(snapshot.index),
			all_sentinels: snapshot.all_sentinels,
		})
	}

	/// Serializes the snapshot with postcard.
	pub fn to_bytes(&self) -> Result<Vec<u8>, postcard::Error> {
		postcard::to_stdvec(&self.snapshot())
	}

	/// Decodes a pen from snapshot bytes.
	pub fn from_bytes(bytes: &[u8]) -> Result<Self, Box<dyn std::error::Error>> {
		let snapshot: PenSnapshot = postcard::from_bytes(bytes)?;
		Ok(Self::from_snapshot(snapshot)?)
	}

	fn located(&self, sample: &[Token]) -> Located {
		self.index
			.locate(&self.context, self.comparer.as_ref(), sample, 0, None)
	}

	pub(crate) fn context(&self) -> &Corpus {
		&self.context
	}

	pub(crate) fn all_sentinels(&self) -> bool {
		self.all_sentinels
	}

	pub(crate) fn is_sentinel(&self, token: &Token) -> bool {
		self.comparer
			.equal(token.as_deref(), self.sentinel.as_deref())
	}

	pub(crate) fn locate_cyclic(&self, sample: &[Token], cycle_start: usize) -> Located {
		self.index
			.locate(&self.context, self.comparer.as_ref(), sample, cycle_start, None)
	}

	pub(crate) fn position_at(&self, slot: usize) -> usize {
		self.index.position(slot)
	}
}

/// The persisted form of a `Pen`: exactly the six fields needed to
/// reconstruct one without recomputing the index.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct PenSnapshot {
	version: u32,
	intern: bool,
	comparer: String,
	sentinel: Token,
	context: Vec<Token>,
	index: Vec<usize>,
	all_sentinels: bool,
}
